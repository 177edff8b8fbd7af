//! The remediation loop: select a step, check readiness, proceed, repeat.
//!
//! Each iteration persists the current document, stops on success or when nothing is left
//! to remediate, and otherwise picks one offered step. Selection ranks the candidates that
//! the registry knows: entry steps (any registered step on the first iteration, or the step
//! just proceeded when the server offers it again) come first, then allow-listed steps in
//! allow-list order, with document order breaking ties. The first ready candidate wins; when
//! none is ready the flow stops on the highest-ranked one.

// self
use crate::{
	_prelude::*,
	document::Remediation,
	error::ConfigError,
	flows::{IdxClient, IdxResponse, IdxTransaction, IntrospectOptions, common},
	http::{IdxHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, StepOutcome},
	remediator::{RemediationFlow, RemediationValues, Remediator, keys::STATE_HANDLE},
};

/// Inputs for [`IdxClient::run`].
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
	/// Registry of steps this run may drive.
	pub flow: RemediationFlow,
	/// Steps allowed after the first iteration, in precedence order.
	pub allowed_next_steps: Vec<String>,
	/// Caller-supplied values.
	pub values: RemediationValues,
	/// Step to take on the first iteration, bypassing selection.
	pub step: Option<String>,
	/// Bootstrap options.
	pub introspect: IntrospectOptions,
}
impl RunOptions {
	/// Creates options driving `flow`.
	pub fn new(flow: RemediationFlow) -> Self {
		Self { flow, ..Default::default() }
	}

	/// Replaces the allow-list.
	pub fn allow<I, S>(mut self, steps: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.allowed_next_steps = steps.into_iter().map(Into::into).collect();

		self
	}

	/// Replaces the value bag.
	pub fn values(mut self, values: RemediationValues) -> Self {
		self.values = values;

		self
	}

	/// Forces the first step.
	pub fn step(mut self, step: impl Into<String>) -> Self {
		self.step = Some(step.into());

		self
	}

	/// Replaces the bootstrap options.
	pub fn introspect(mut self, options: IntrospectOptions) -> Self {
		self.introspect = options;

		self
	}
}

/// Data submitted for the step proceeded in the previous iteration.
struct Submitted {
	step: String,
	data: Map<String, Value>,
}

impl<C, M> IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Drives the exchange until it succeeds, ends, or needs input the caller did not supply.
	pub async fn run(&self, options: RunOptions) -> Result<IdxTransaction> {
		self.run_as(FlowKind::Run, options).await
	}

	pub(crate) async fn run_as(
		&self,
		kind: FlowKind,
		options: RunOptions,
	) -> Result<IdxTransaction> {
		let span = FlowSpan::new(kind, "run");

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _guard = self.flow_guard.lock().await;

				self.run_locked(options).await
			})
			.await;

		match &result {
			Ok(transaction) =>
				obs::record_flow_outcome(kind, FlowOutcome::Finished(transaction.status)),
			Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
		}

		result
	}

	async fn run_locked(&self, options: RunOptions) -> Result<IdxTransaction> {
		let RunOptions { flow, allowed_next_steps, mut values, mut step, introspect } = options;
		let mut response = self.load_or_introspect(&introspect).await?;
		let mut previous: Option<Submitted> = None;

		loop {
			self.store.save(response.raw.clone()).await?;

			if response.is_success() {
				self.store.clear().await?;

				return Ok(IdxTransaction::success(response));
			}
			if response.remediations.is_empty() {
				self.store.clear().await?;

				return Ok(IdxTransaction::terminal(response));
			}
			if let Some(handle) = response.state_handle() {
				values = values.with(STATE_HANDLE, handle.expose());
			}

			let selection = Selection {
				flow: &flow,
				allowed: &allowed_next_steps,
				first: previous.is_none(),
				previous: previous.as_ref().map(|p| p.step.as_str()),
			};
			let forced = step.take().and_then(|name| response.remediation(&name));
			let selected = match forced {
				Some(remediation) => Some(flow.build(remediation, &values)?),
				None => selection.select(&response.remediations, &values)?,
			};
			let Some(remediator) = selected else {
				return Ok(IdxTransaction::unhandled(response));
			};

			if !remediator.can_remediate() {
				obs::record_step_outcome(remediator.name(), StepOutcome::Pending);

				return IdxTransaction::pending(&remediator, response);
			}

			let data = remediator.all_data();

			if previous.as_ref().is_some_and(|p| p.step == remediator.name() && p.data == data) {
				obs::record_step_outcome(remediator.name(), StepOutcome::Repeated);

				return IdxTransaction::pending(&remediator, response);
			}

			let action = remediator
				.remediation()
				.action
				.as_ref()
				.ok_or_else(|| ConfigError::MissingAction { step: remediator.name().to_owned() })?;
			let next = common::invoke(self, action, &data, response.with_credentials).await?;

			obs::record_step_outcome(remediator.name(), StepOutcome::Proceeded);

			values = remediator.values_after_proceed()?;
			previous = Some(Submitted { step: remediator.name().to_owned(), data });
			response = next;
		}
	}
}

/// Candidate ranking for one iteration.
struct Selection<'a> {
	flow: &'a RemediationFlow,
	allowed: &'a [String],
	first: bool,
	previous: Option<&'a str>,
}
impl Selection<'_> {
	fn rank(&self, name: &str) -> Option<usize> {
		if !self.flow.contains(name) {
			return None;
		}
		if let Some(position) = self.allowed.iter().position(|allowed| allowed == name) {
			return Some(position + 1);
		}

		(self.first || self.previous == Some(name)).then_some(0)
	}

	fn select(
		&self,
		offered: &[Remediation],
		values: &RemediationValues,
	) -> Result<Option<Remediator>> {
		let mut ranked = offered
			.iter()
			.filter_map(|remediation| self.rank(&remediation.name).map(|rank| (rank, remediation)))
			.collect::<Vec<_>>();

		ranked.sort_by_key(|(rank, _)| *rank);

		let mut candidates = Vec::with_capacity(ranked.len());

		for (_, remediation) in ranked {
			candidates.push(self.flow.build(remediation, values)?);
		}

		let count = candidates.len();
		let position = candidates.iter().position(Remediator::can_remediate).unwrap_or(0);
		let selected = candidates.into_iter().nth(position);

		if let Some(remediator) = &selected {
			obs::trace_step_selected(remediator.name(), remediator.can_remediate(), count);
		}

		Ok(selected)
	}
}
