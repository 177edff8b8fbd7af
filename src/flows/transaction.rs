//! Decomposed responses and the transactions flows hand back to callers.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	document::{
		IdxAction, IdxContext, IdxDocument, IdxMessage, JsonPathResolver, ReferenceResolver,
		Remediation, decompose_with,
	},
	error::DocumentError,
	remediator::{NextStep, Remediator},
};

/// One server response, decomposed.
#[derive(Clone, Debug, PartialEq)]
pub struct IdxResponse {
	/// Raw document as received or loaded.
	pub raw: IdxDocument,
	/// Offered steps in document order.
	pub remediations: Vec<Remediation>,
	/// Non-actionable data.
	pub context: IdxContext,
	/// Top-level actions such as `cancel`.
	pub actions: BTreeMap<String, IdxAction>,
	/// `false` when the server answered with an error status and a document body.
	pub request_did_succeed: bool,
	/// Whether the caller asked for credentialed requests when the exchange started.
	pub with_credentials: bool,
}
impl IdxResponse {
	/// Decomposes `raw` with the default resolver.
	pub fn decompose(raw: IdxDocument, request_did_succeed: bool) -> Result<Self, DocumentError> {
		Self::decompose_with(raw, request_did_succeed, &JsonPathResolver)
	}

	/// Decomposes `raw`, resolving references through `resolver`.
	pub fn decompose_with(
		raw: IdxDocument,
		request_did_succeed: bool,
		resolver: &dyn ReferenceResolver,
	) -> Result<Self, DocumentError> {
		let decomposed = decompose_with(&raw, resolver)?;

		Ok(Self {
			raw,
			remediations: decomposed.remediations,
			context: decomposed.context,
			actions: decomposed.actions,
			request_did_succeed,
			with_credentials: false,
		})
	}

	/// Sets the credentialed-request flag.
	pub fn with_credentials(mut self, with_credentials: bool) -> Self {
		self.with_credentials = with_credentials;

		self
	}

	/// Looks up an offered step by name.
	pub fn remediation(&self, name: &str) -> Option<&Remediation> {
		self.remediations.iter().find(|r| r.name == name)
	}

	/// Looks up a top-level action by name.
	pub fn action(&self, name: &str) -> Option<&IdxAction> {
		self.actions.get(name)
	}

	/// Names of the offered steps in document order.
	pub fn remediation_names(&self) -> Vec<String> {
		self.remediations.iter().map(|r| r.name.clone()).collect()
	}

	/// Resume token carried by the document.
	pub fn state_handle(&self) -> Option<Secret> {
		self.raw.state_handle()
	}

	/// Top-level messages.
	pub fn messages(&self) -> Vec<IdxMessage> {
		self.raw.messages()
	}

	/// Returns `true` once the exchange produced an interaction code.
	pub fn is_success(&self) -> bool {
		self.raw.is_success()
	}

	/// Interaction code carried by a successful exchange.
	pub fn interaction_code(&self) -> Option<Secret> {
		self.raw.interaction_code()
	}
}

/// Where a flow stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdxStatus {
	/// A step needs more input from the caller, or must be completed outside the exchange.
	Pending,
	/// The exchange produced an interaction code.
	Success,
	/// The exchange ended without an interaction code, or offers nothing this flow handles.
	Terminal,
	/// The server rejected the last request and offered no way forward.
	Failure,
	/// The exchange was canceled.
	Canceled,
}
impl IdxStatus {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			IdxStatus::Pending => "pending",
			IdxStatus::Success => "success",
			IdxStatus::Terminal => "terminal",
			IdxStatus::Failure => "failure",
			IdxStatus::Canceled => "canceled",
		}
	}
}
impl Display for IdxStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of a flow run.
#[derive(Clone, Debug, PartialEq)]
pub struct IdxTransaction {
	/// Where the flow stopped.
	pub status: IdxStatus,
	/// Pending step, when the flow stopped on one.
	pub next_step: Option<NextStep>,
	/// Offered step names when no registered step could handle the document.
	pub available_steps: Vec<String>,
	/// Input names the pending step still lacks.
	pub missing_inputs: Vec<String>,
	/// Document messages followed by the pending step's field messages.
	pub messages: Vec<IdxMessage>,
	/// Interaction code, on success.
	pub interaction_code: Option<Secret>,
	/// Last decomposed response.
	pub response: IdxResponse,
}
impl IdxTransaction {
	/// Successful completion.
	pub fn success(response: IdxResponse) -> Self {
		Self {
			interaction_code: response.interaction_code(),
			..Self::bare(IdxStatus::Success, response)
		}
	}

	/// No remediation left: [`IdxStatus::Failure`] when the server rejected the last request,
	/// [`IdxStatus::Terminal`] otherwise.
	pub fn terminal(response: IdxResponse) -> Self {
		let status =
			if response.request_did_succeed { IdxStatus::Terminal } else { IdxStatus::Failure };

		Self::bare(status, response)
	}

	/// Remediations are offered, but none is registered or allowed.
	pub fn unhandled(response: IdxResponse) -> Self {
		Self {
			available_steps: response.remediation_names(),
			..Self::bare(IdxStatus::Terminal, response)
		}
	}

	/// The flow stopped on `remediator`.
	pub fn pending(remediator: &Remediator, response: IdxResponse) -> Result<Self> {
		let mut transaction = Self::bare(IdxStatus::Pending, response);

		transaction.next_step = Some(remediator.next_step()?);
		transaction.missing_inputs = remediator.missing_inputs()?;
		transaction.messages.extend(remediator.messages());

		Ok(transaction)
	}

	/// The exchange was canceled.
	pub fn canceled(response: IdxResponse) -> Self {
		Self::bare(IdxStatus::Canceled, response)
	}

	fn bare(status: IdxStatus, response: IdxResponse) -> Self {
		Self {
			status,
			next_step: None,
			available_steps: Vec::new(),
			missing_inputs: Vec::new(),
			messages: response.messages(),
			interaction_code: None,
			response,
		}
	}
}
