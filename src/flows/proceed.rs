//! Direct invocation of one offered remediation or of the top-level `cancel` action.

// self
use crate::{
	_prelude::*,
	document::IdxAction,
	error::ConfigError,
	flows::{IdxClient, IdxResponse, IdxTransaction, common},
	http::{IdxHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const CANCEL: &str = "cancel";

impl<C, M> IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Submits `data` to the remediation named `step` and returns the next document.
	///
	/// The payload is filtered to the fields the remediation declares and always carries the
	/// bound resume token. The returned document replaces the stored one, or clears it once
	/// the exchange succeeds.
	pub async fn proceed(
		&self,
		response: &IdxResponse,
		step: &str,
		data: &Map<String, Value>,
	) -> Result<IdxResponse> {
		const KIND: FlowKind = FlowKind::Proceed;

		let span = FlowSpan::new(KIND, "proceed");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _guard = self.flow_guard.lock().await;
				let remediation = response
					.remediation(step)
					.ok_or_else(|| ConfigError::UnknownRemediation { step: step.to_owned() })?;
				let action = bound_action(remediation.action.as_ref(), step)?;
				let next = common::invoke(self, action, data, response.with_credentials).await?;

				if next.is_success() {
					self.store.clear().await?;
				} else {
					self.store.save(next.raw.clone()).await?;
				}

				Ok(next)
			})
			.await;

		if result.is_err() {
			obs::record_flow_outcome(KIND, FlowOutcome::Failure);
		}

		result
	}

	/// Invokes the document's `cancel` action and clears the stored exchange.
	pub async fn cancel(&self, response: &IdxResponse) -> Result<IdxTransaction> {
		const KIND: FlowKind = FlowKind::Cancel;

		let span = FlowSpan::new(KIND, "cancel");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _guard = self.flow_guard.lock().await;
				let action = bound_action(response.action(CANCEL), CANCEL)?;
				let next =
					common::invoke(self, action, &Map::new(), response.with_credentials).await?;

				self.store.clear().await?;

				Ok(IdxTransaction::canceled(next))
			})
			.await;

		match &result {
			Ok(transaction) =>
				obs::record_flow_outcome(KIND, FlowOutcome::Finished(transaction.status)),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

fn bound_action<'a>(action: Option<&'a IdxAction>, step: &str) -> Result<&'a IdxAction> {
	action.ok_or_else(|| ConfigError::MissingAction { step: step.to_owned() }.into())
}
