//! `relatesTo` cross-reference resolution.
//!
//! References are path queries into the root document, e.g. `$.authenticators.value[0]` or
//! `$.currentAuthenticatorEnrollment`. Evaluation goes through a [`ReferenceResolver`] so a
//! richer evaluator can be injected; [`JsonPathResolver`] covers the shapes the server emits.

// self
use crate::_prelude::*;

const RELATES_TO: &str = "relatesTo";

/// Evaluates a path query against the root document.
pub trait ReferenceResolver
where
	Self: Send + Sync,
{
	/// Returns the first value matched by `query`, or `None`.
	fn resolve(&self, root: &Value, query: &str) -> Option<Value>;
}

/// Restricted path evaluator: `$` followed by `.name`, `['name']`, `["name"]`, and `[index]`
/// segments. Wildcards, filters, and slices evaluate to nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPathResolver;
impl ReferenceResolver for JsonPathResolver {
	fn resolve(&self, root: &Value, query: &str) -> Option<Value> {
		let mut current = root;

		for segment in parse_path(query)? {
			current = match segment {
				Segment::Key(key) => current.get(key.as_str())?,
				Segment::Index(idx) => current.get(idx)?,
			};
		}

		Some(current.clone())
	}
}

#[derive(Debug, PartialEq, Eq)]
enum Segment {
	Key(String),
	Index(usize),
}

fn parse_path(query: &str) -> Option<Vec<Segment>> {
	let mut rest = query.trim().strip_prefix('$')?;
	let mut segments = Vec::new();

	while !rest.is_empty() {
		if let Some(tail) = rest.strip_prefix('.') {
			let end = tail.find(['.', '[']).unwrap_or(tail.len());
			let key = &tail[..end];

			if key.is_empty() || key == "*" {
				return None;
			}

			segments.push(Segment::Key(key.to_owned()));
			rest = &tail[end..];
		} else if let Some(tail) = rest.strip_prefix('[') {
			let end = tail.find(']')?;
			let inner = tail[..end].trim();

			segments.push(parse_bracket(inner)?);
			rest = &tail[end + 1..];
		} else {
			return None;
		}
	}

	Some(segments)
}

fn parse_bracket(inner: &str) -> Option<Segment> {
	for quote in ['\'', '"'] {
		if let Some(key) = inner.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
			return Some(Segment::Key(key.to_owned()));
		}
	}

	inner.parse().ok().map(Segment::Index)
}

/// Replaces every `relatesTo` query inside `value` with the node it points at.
///
/// The query is the key's string value or the first element of its array value. Truthy
/// results other than strings replace the reference, so running the pass again leaves the
/// tree unchanged.
/// Array-valued entries are scanned recursively.
pub fn expand_relates_to(root: &Value, value: &mut Value, resolver: &dyn ReferenceResolver) {
	let Value::Object(object) = value else { return };

	for (key, entry) in object.iter_mut() {
		if key == RELATES_TO {
			let query = match entry {
				Value::String(query) => Some(query.as_str()),
				Value::Array(items) => items.first().and_then(Value::as_str),
				_ => None,
			};

			if let Some(resolved) =
				query.and_then(|q| resolver.resolve(root, q)).filter(replaces_reference)
			{
				*entry = resolved;

				continue;
			}
		}
		if let Value::Array(items) = entry {
			for item in items {
				expand_relates_to(root, item, resolver);
			}
		}
	}
}

/// Truthy results replace a reference; strings are excluded so expansion stays idempotent.
fn replaces_reference(resolved: &Value) -> bool {
	match resolved {
		Value::Null | Value::String(_) => false,
		Value::Bool(flag) => *flag,
		Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
		Value::Array(_) | Value::Object(_) => true,
	}
}
