//! Authentication module
//!
//! The access token is obtained by the OAuth flow outside this crate and
//! handed over in the configuration. The `Authenticator` puts it on every
//! outgoing request as `Authorization: Bearer`.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
