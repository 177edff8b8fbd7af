//! Auth-domain models: authenticator selectors and redacted secrets.

pub mod authenticator;
pub mod secret;

pub use authenticator::*;
pub use secret::*;
