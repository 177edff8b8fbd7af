//! Shared request plumbing: build one JSON request, send it, and classify the response.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{Request, header},
};
// self
use crate::{
	_prelude::*,
	config::ion_media_type,
	document::{IdxAction, IdxDocument},
	error::{ConfigError, DocumentError, TransportError},
	flows::{IdxClient, IdxResponse},
	http::{IdxHttpClient, TransportErrorMapper},
};

const DEFAULT_ACCEPTS: &str = "application/json";

/// Outbound request description shared by introspection and action invocation.
#[derive(Clone, Debug)]
pub(crate) struct JsonRequest<'a> {
	pub method: &'a str,
	pub url: &'a str,
	pub content_type: &'a str,
	pub accept: &'a str,
	pub body: Value,
}

/// Invokes a bound action with caller data.
pub(crate) async fn invoke<C, M>(
	client: &IdxClient<C, M>,
	action: &IdxAction,
	data: &Map<String, Value>,
	with_credentials: bool,
) -> Result<IdxResponse>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let produces = ion_media_type(&client.config.version);
	let request = JsonRequest {
		method: &action.method,
		url: &action.href,
		content_type: action.accepts.as_deref().unwrap_or(DEFAULT_ACCEPTS),
		accept: action.produces.as_deref().unwrap_or(&produces),
		body: Value::Object(action.payload(data)),
	};

	send(client, request, with_credentials).await
}

/// Sends a request and decomposes whatever exchange document comes back.
///
/// A 2xx body must be a document. A non-2xx body that is still a document is decomposed with
/// `request_did_succeed = false`; anything else becomes [`TransportError::HttpStatus`].
pub(crate) async fn send<C, M>(
	client: &IdxClient<C, M>,
	request: JsonRequest<'_>,
	with_credentials: bool,
) -> Result<IdxResponse>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let body = serde_json::to_vec(&request.body)
		.map_err(|source| ConfigError::RequestBody { source })?;
	let http_request: HttpRequest = Request::builder()
		.method(request.method)
		.uri(request.url)
		.header(header::CONTENT_TYPE, request.content_type)
		.header(header::ACCEPT, request.accept)
		.body(body)
		.map_err(ConfigError::from)?;
	let handle = client.http_client.handle(with_credentials);
	let response = handle
		.call(http_request)
		.await
		.map_err(|e| client.transport_mapper.map_transport_error(e))?;
	let status = response.status();
	let document = classify(status.as_u16(), status.is_success(), response.body())?;

	Ok(IdxResponse::decompose_with(document, status.is_success(), client.resolver.as_ref())?
		.with_credentials(with_credentials))
}

fn classify(status: u16, success: bool, body: &[u8]) -> Result<IdxDocument> {
	if success {
		let document = IdxDocument::from_slice(body).map_err(DocumentError::from)?;

		if !IdxDocument::is_idx_document(document.as_value()) {
			return Err(DocumentError::NotAnIdxDocument.into());
		}

		return Ok(document);
	}

	match serde_json::from_slice::<Value>(body) {
		Ok(value) if IdxDocument::is_idx_document(&value) => Ok(IdxDocument(value)),
		_ => Err(TransportError::http_status(status, body).into()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rejected_document_is_data() {
		let body =
			br#"{"version":"1.0.0","messages":{"value":[{"message":"nope","class":"ERROR"}]}}"#;
		let document = classify(401, false, body).expect("Document-shaped rejection is data.");

		assert_eq!(document.version(), Some("1.0.0"));
	}

	#[test]
	fn rejected_plain_body_is_transport_error() {
		let err = classify(502, false, b"<html>bad gateway</html>")
			.expect_err("Plain error bodies should fail.");

		assert!(matches!(
			err,
			Error::Transport(TransportError::HttpStatus { status: 502, ref body })
				if body.contains("bad gateway")
		));
	}

	#[test]
	fn successful_body_must_be_a_document() {
		assert!(matches!(
			classify(200, true, br#"{"ok":true}"#),
			Err(Error::Document(DocumentError::NotAnIdxDocument))
		));
		assert!(matches!(
			classify(200, true, b"not json"),
			Err(Error::Document(DocumentError::Json(_)))
		));
	}
}
