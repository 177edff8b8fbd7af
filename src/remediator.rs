//! Remediators: per-step readiness, data mapping, and next-step descriptions.
//!
//! A [`Remediator`] pairs one offered [`Remediation`] with the caller's
//! [`RemediationValues`]. Step-specific behaviour lives in a [`RemediationStep`] whose
//! [`FieldRule`] table maps each server field to candidate aliases, an optional data mapper,
//! and an optional input builder. Steps are registered by name in a [`RemediationFlow`].

pub mod identify;
pub mod redirect_idp;
pub mod select_authenticator;
pub mod values;
pub mod verify;

pub use identify::*;
pub use redirect_idp::*;
pub use select_authenticator::*;
pub use values::*;
pub use verify::*;

// self
use crate::{
	_prelude::*,
	document::{IdxField, IdxMessage, Input, Remediation},
	error::ConfigError,
};

/// Maps the caller's values into the payload for one field.
pub type FieldMapper = fn(&Remediator, &IdxField) -> Option<Value>;
/// Builds the caller-facing inputs for one field.
pub type InputBuilder = fn(&Remediator, &IdxField) -> Vec<Input>;

/// How one server field is filled from the value bag.
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
	/// Server field name.
	pub field: &'static str,
	/// Value-bag keys that may supply the field, in priority order.
	pub aliases: &'static [&'static str],
	/// Custom data mapper; replaces alias resolution when present.
	pub map: Option<FieldMapper>,
	/// Custom input builder; replaces the alias-derived input when present.
	pub input: Option<InputBuilder>,
}
impl FieldRule {
	/// Rule resolved purely through aliases.
	pub const fn aliased(field: &'static str, aliases: &'static [&'static str]) -> Self {
		Self { field, aliases, map: None, input: None }
	}

	/// Rule with a custom mapper and input builder.
	pub const fn custom(field: &'static str, map: FieldMapper, input: InputBuilder) -> Self {
		Self { field, aliases: &[], map: Some(map), input: Some(input) }
	}
}

/// Step-specific behaviour shared by every remediator of one kind.
pub trait RemediationStep
where
	Self: Send + Sync + Debug,
{
	/// Remediation name this step handles.
	fn name(&self) -> &'static str;

	/// Field rule table.
	fn fields(&self) -> &'static [FieldRule];

	/// Adjusts the normalized value bag before any lookup.
	fn prepare(&self, _remediation: &Remediation, values: RemediationValues) -> RemediationValues {
		values
	}

	/// Readiness check.
	fn can_remediate(&self, remediator: &Remediator) -> bool {
		remediator.required_fields_satisfied()
	}

	/// Decorates the generic next-step description.
	fn next_step(&self, _remediator: &Remediator, step: NextStep) -> NextStep {
		step
	}

	/// Adjusts the bag left after the generic input reduction.
	fn values_after_proceed(
		&self,
		_remediator: &Remediator,
		values: RemediationValues,
	) -> RemediationValues {
		values
	}
}

/// Caller-facing description of a pending step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NextStep {
	/// Step name.
	pub name: String,
	/// Values the caller can supply.
	pub inputs: Vec<Input>,
	/// Authenticator type, when the step relates to one.
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Related authenticator, when any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authenticator: Option<Value>,
	/// Redirect target for steps completed outside the exchange.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub href: Option<String>,
	/// Identity provider for redirect steps.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub idp: Option<Value>,
}

/// One offered remediation paired with the caller's values.
#[derive(Clone, Debug)]
pub struct Remediator {
	step: &'static dyn RemediationStep,
	remediation: Remediation,
	values: RemediationValues,
}
impl Remediator {
	/// Builds a remediator, normalizing the authenticator candidates in `values`.
	pub fn new(
		step: &'static dyn RemediationStep,
		remediation: Remediation,
		values: &RemediationValues,
	) -> Self {
		let values = step.prepare(&remediation, normalize_authenticators(values));

		Self { step, remediation, values }
	}

	/// Step name.
	pub fn name(&self) -> &str {
		&self.remediation.name
	}

	/// The offered remediation.
	pub fn remediation(&self) -> &Remediation {
		&self.remediation
	}

	/// Normalized value bag.
	pub fn values(&self) -> &RemediationValues {
		&self.values
	}

	/// Step behaviour.
	pub fn step(&self) -> &'static dyn RemediationStep {
		self.step
	}

	/// Returns `true` when the step has enough data to proceed.
	pub fn can_remediate(&self) -> bool {
		self.step.can_remediate(self)
	}

	/// Default readiness: a rule table exists and every required field has data.
	pub fn required_fields_satisfied(&self) -> bool {
		!self.step.fields().is_empty()
			&& self.remediation.value.iter().filter(|f| f.required).all(|f| self.has_data(&f.name))
	}

	/// Resolves the payload for one field.
	///
	/// Order: the rule's mapper, else the first alias holding a truthy value, else the raw
	/// entry named after the field.
	pub fn data(&self, key: &str) -> Option<Value> {
		let rule = self.rule(key);

		if let Some((map, field)) = rule.and_then(|r| r.map).zip(self.remediation.field(key)) {
			return map(self, field);
		}
		if let Some(value) = rule
			.into_iter()
			.flat_map(|r| r.aliases.iter())
			.filter_map(|alias| self.values.lookup(alias))
			.find(is_truthy)
		{
			return Some(value);
		}

		self.values.lookup(key)
	}

	/// Resolves every field the remediation declares.
	pub fn all_data(&self) -> Map<String, Value> {
		self.remediation
			.value
			.iter()
			.filter_map(|f| {
				self.data(&f.name).filter(|v| !v.is_null()).map(|v| (f.name.clone(), v))
			})
			.collect()
	}

	/// Truthiness of [`Remediator::data`]; composite data is truthy when any member is.
	pub fn has_data(&self, key: &str) -> bool {
		match self.data(key) {
			Some(Value::Object(members)) => members.values().any(is_truthy),
			Some(Value::Array(items)) => items.iter().any(is_truthy),
			Some(value) => is_truthy(&value),
			None => false,
		}
	}

	/// Builds the caller-facing inputs.
	///
	/// Rules whose field the remediation does not declare are skipped. A rule that has
	/// neither a builder nor a usable alias is a configuration defect.
	pub fn inputs(&self) -> Result<Vec<Input>, ConfigError> {
		let mut inputs = Vec::new();

		for rule in self.step.fields() {
			if let Some(field) = self.remediation.field(rule.field) {
				inputs.extend(self.rule_inputs(rule, field)?);
			}
		}

		Ok(inputs)
	}

	/// Names of the inputs still lacking data.
	///
	/// Inputs of required fields without data come first. A step that is not ready although
	/// no required field is missing reports every input the bag holds no truthy value for.
	pub fn missing_inputs(&self) -> Result<Vec<String>, ConfigError> {
		let mut missing = Vec::new();

		for rule in self.step.fields() {
			let Some(field) = self.remediation.field(rule.field) else { continue };

			if field.required && !self.has_data(rule.field) {
				missing.extend(self.rule_inputs(rule, field)?.into_iter().map(|i| i.name));
			}
		}

		if missing.is_empty() && !self.can_remediate() {
			missing = self
				.inputs()?
				.into_iter()
				.filter(|i| !self.values.lookup(&i.name).is_some_and(|v| is_truthy(&v)))
				.map(|i| i.name)
				.collect();
		}

		Ok(missing)
	}

	/// Describes this step for the caller.
	pub fn next_step(&self) -> Result<NextStep, ConfigError> {
		let authenticator = self.authenticator().cloned();
		let step = NextStep {
			name: self.name().to_owned(),
			inputs: self.inputs()?,
			kind: authenticator
				.as_ref()
				.and_then(|a| a.get("type"))
				.and_then(Value::as_str)
				.map(str::to_owned),
			authenticator,
			..Default::default()
		};

		Ok(self.step.next_step(self, step))
	}

	/// Server messages attached to this remediation's form.
	pub fn messages(&self) -> Vec<IdxMessage> {
		self.remediation.messages()
	}

	/// Bag for the next iteration: every emitted input name removed, then the step hook.
	pub fn values_after_proceed(&self) -> Result<RemediationValues, ConfigError> {
		let inputs = self.inputs()?;
		let reduced = self.values.without(inputs.iter().map(|i| i.name.as_str()));

		Ok(self.step.values_after_proceed(self, reduced))
	}

	/// Authenticator attached through `relatesTo`.
	pub fn authenticator(&self) -> Option<&Value> {
		self.remediation.authenticator()
	}

	fn rule(&self, field: &str) -> Option<&'static FieldRule> {
		self.step.fields().iter().find(|r| r.field == field)
	}

	fn rule_inputs(&self, rule: &FieldRule, field: &IdxField) -> Result<Vec<Input>, ConfigError> {
		if let Some(build) = rule.input {
			return Ok(build(self, field));
		}

		let name = match rule.aliases {
			[only] => Some(*only),
			aliases => aliases.iter().copied().find(|alias| self.values.contains_key(alias)),
		};

		match name {
			Some(name) if !field.is_composite() => Ok(vec![Input::from_field(field, name)]),
			_ => Err(ConfigError::MissingInputBuilder {
				field: rule.field.to_owned(),
				step: self.name().to_owned(),
			}),
		}
	}
}

/// Folds the singular candidate into the list and records metadata-carrying candidates.
fn normalize_authenticators(values: &RemediationValues) -> RemediationValues {
	let mut authenticators = values.authenticators().to_vec();

	if let Some(candidate) =
		values.authenticator().filter(|c| !authenticators.iter().any(|e| e.matches(c)))
	{
		authenticators.push(candidate.clone());
	}

	let mut data = values.authenticators_data().to_vec();

	for authenticator in authenticators.iter().filter(|a| a.has_metadata()) {
		if !data.iter().any(|existing| existing.matches(authenticator)) {
			data.push(authenticator.clone());
		}
	}

	values.clone().with_authenticators(authenticators).with_authenticators_data(data)
}

/// Registry of step name to step behaviour.
#[derive(Clone, Debug, Default)]
pub struct RemediationFlow {
	steps: Vec<&'static dyn RemediationStep>,
}
impl RemediationFlow {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a step, replacing any step with the same name.
	pub fn register(mut self, step: &'static dyn RemediationStep) -> Self {
		self.steps.retain(|s| s.name() != step.name());
		self.steps.push(step);

		self
	}

	/// Looks up a step by name.
	pub fn get(&self, name: &str) -> Option<&'static dyn RemediationStep> {
		self.steps.iter().copied().find(|s| s.name() == name)
	}

	/// Returns `true` when `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Registered step names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.steps.iter().map(|s| s.name())
	}

	/// Builds the remediator for an offered remediation.
	pub fn build(
		&self,
		remediation: &Remediation,
		values: &RemediationValues,
	) -> Result<Remediator, ConfigError> {
		let step = self
			.get(&remediation.name)
			.ok_or_else(|| ConfigError::UnknownRemediation { step: remediation.name.clone() })?;

		Ok(Remediator::new(step, remediation.clone(), values))
	}
}
