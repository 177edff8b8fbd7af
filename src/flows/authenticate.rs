//! Sign-in: identify, pick an authenticator, answer its challenge, repeat until done.

// self
use crate::{
	_prelude::*,
	auth::{Authenticator, Secret},
	flows::{IdxClient, IdxTransaction, IntrospectOptions, RunOptions},
	http::{IdxHttpClient, TransportErrorMapper},
	obs::FlowKind,
	remediator::{
		CHALLENGE_AUTHENTICATOR, IDENTIFY, REDIRECT_IDP, REENROLL_AUTHENTICATOR,
		RemediationFlow, RemediationValues, SELECT_AUTHENTICATOR_AUTHENTICATE, is_truthy,
	},
};

/// Steps the sign-in flow may take after the first iteration, in precedence order.
pub const AUTHENTICATE_NEXT_STEPS: [&str; 4] = [
	"select-authenticator-authenticate",
	"challenge-authenticator",
	"reenroll-authenticator",
	"redirect-idp",
];

const PASSWORD_AUTHENTICATOR: &str = "password";

/// Registry of the steps the sign-in flow can drive.
pub fn authenticate_flow() -> RemediationFlow {
	RemediationFlow::new()
		.register(&IDENTIFY)
		.register(&SELECT_AUTHENTICATOR_AUTHENTICATE)
		.register(&CHALLENGE_AUTHENTICATOR)
		.register(&REENROLL_AUTHENTICATOR)
		.register(&REDIRECT_IDP)
}

/// Inputs for [`IdxClient::authenticate`].
///
/// Every setter writes into the value bag the remediators read from, so values the server
/// never asks for are ignored.
#[derive(Clone, Debug, Default)]
pub struct AuthenticationOptions {
	/// Caller-supplied values.
	pub values: RemediationValues,
	/// Step to take on the first iteration, bypassing selection.
	pub step: Option<String>,
	/// Bootstrap options.
	pub introspect: IntrospectOptions,
}
impl AuthenticationOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the username used by `identify`.
	pub fn username(self, username: impl Into<String>) -> Self {
		self.value("username", username.into())
	}

	/// Sets the password; it also pre-selects the password authenticator.
	pub fn password(self, password: impl Into<Secret>) -> Self {
		self.value("password", password.into().expose())
	}

	/// Sets the one-time code answering a non-password challenge.
	pub fn verification_code(self, code: impl Into<Secret>) -> Self {
		self.value("verificationCode", code.into().expose())
	}

	/// Sets the replacement password for an expired one.
	pub fn new_password(self, password: impl Into<Secret>) -> Self {
		self.value("newPassword", password.into().expose())
	}

	/// Sets the remember-me flag sent with `identify`.
	pub fn remember_me(self, remember: bool) -> Self {
		self.value("rememberMe", remember)
	}

	/// Sets the singular authenticator candidate.
	pub fn authenticator(mut self, authenticator: impl Into<Authenticator>) -> Self {
		self.values = self.values.with_authenticator(authenticator);

		self
	}

	/// Replaces the authenticator candidates, in preference order.
	pub fn authenticators<I, A>(mut self, authenticators: I) -> Self
	where
		I: IntoIterator<Item = A>,
		A: Into<Authenticator>,
	{
		self.values = self.values.with_authenticators(authenticators);

		self
	}

	/// Sets an arbitrary value.
	pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values = self.values.with(key, value);

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

	/// Converts into run options for the sign-in registry.
	///
	/// A supplied password puts the `password` candidate first unless it is already listed.
	pub fn into_run_options(self) -> RunOptions {
		let Self { values, step, introspect } = self;
		let values = fold_password(values);

		RunOptions {
			flow: authenticate_flow(),
			allowed_next_steps: AUTHENTICATE_NEXT_STEPS.iter().map(|s| (*s).to_owned()).collect(),
			values,
			step,
			introspect,
		}
	}
}

fn fold_password(values: RemediationValues) -> RemediationValues {
	let has_password = values.get("password").is_some_and(is_truthy);
	let listed = values
		.authenticators()
		.iter()
		.any(|a| a.key.as_deref() == Some(PASSWORD_AUTHENTICATOR));

	if !has_password || listed {
		return values;
	}

	let authenticators = std::iter::once(Authenticator::from_key(PASSWORD_AUTHENTICATOR))
		.chain(values.authenticators().iter().cloned())
		.collect::<Vec<_>>();

	values.with_authenticators(authenticators)
}

impl<C, M> IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Signs a user in, proceeding through every step the supplied values can satisfy.
	pub async fn authenticate(&self, options: AuthenticationOptions) -> Result<IdxTransaction> {
		self.run_as(FlowKind::Authenticate, options.into_run_options()).await
	}
}
