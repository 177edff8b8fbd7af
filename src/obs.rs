//! Optional observability helpers for exchange flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `idx_flow.flow` with the `flow` and
//!   `stage` fields, plus debug events whenever the orchestrator picks a step.
//! - Enable `metrics` to increment the `idx_flow_flow_total` counter for every flow outcome,
//!   labeled by `flow` + `outcome`, and `idx_flow_step_total` for every step the orchestrator
//!   proceeds or stops on, labeled by `step` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, flows::IdxStatus};

/// Flow entry points observed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Transaction bootstrap.
	Introspect,
	/// Generic remediation loop.
	Run,
	/// Sign-in loop.
	Authenticate,
	/// Direct invocation of one remediation.
	Proceed,
	/// Top-level cancel action.
	Cancel,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Introspect => "introspect",
			FlowKind::Run => "run",
			FlowKind::Authenticate => "authenticate",
			FlowKind::Proceed => "proceed",
			FlowKind::Cancel => "cancel",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow helper.
	Attempt,
	/// The flow returned a transaction with the given status.
	Finished(IdxStatus),
	/// Error propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Finished(status) => status.as_str(),
			FlowOutcome::Failure => "error",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// What the orchestrator did with a selected step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
	/// The step was ready and its action was invoked.
	Proceeded,
	/// The step lacked input and the flow stopped on it.
	Pending,
	/// The step would have replayed identical data and the flow stopped on it.
	Repeated,
}
impl StepOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepOutcome::Proceeded => "proceeded",
			StepOutcome::Pending => "pending",
			StepOutcome::Repeated => "repeated",
		}
	}
}
impl Display for StepOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn finished_outcome_reuses_status_label() {
		assert_eq!(FlowOutcome::Finished(IdxStatus::Pending).as_str(), "pending");
		assert_eq!(FlowOutcome::Failure.to_string(), "error");
	}
}
