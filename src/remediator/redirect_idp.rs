//! `redirect-idp`: social or enterprise login completed in the browser.

// self
use crate::remediator::{FieldRule, NextStep, RemediationStep, Remediator};

/// Never proceeds on its own; the caller follows `href` to the identity provider.
#[derive(Debug)]
pub struct RedirectIdp;
impl RemediationStep for RedirectIdp {
	fn name(&self) -> &'static str {
		"redirect-idp"
	}

	fn fields(&self) -> &'static [FieldRule] {
		&[]
	}

	fn can_remediate(&self, _remediator: &Remediator) -> bool {
		false
	}

	fn next_step(&self, remediator: &Remediator, step: NextStep) -> NextStep {
		let remediation = remediator.remediation();

		NextStep {
			name: step.name,
			inputs: Vec::new(),
			kind: remediation.kind.clone(),
			authenticator: None,
			href: remediation.href.clone(),
			idp: remediation.idp.clone(),
		}
	}
}

/// Shared [`RedirectIdp`] instance for registries.
pub static REDIRECT_IDP: RedirectIdp = RedirectIdp;
