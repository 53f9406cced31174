//! Pre-processors run before a handler: authentication and authorization.
//!
//! Pre-processors are composed into an ordered chain. The dispatch adapter
//! runs them one after the other, passing the [`CallContext`] returned by
//! one into the next; the first error aborts the call before the handler.

pub mod authentication;
pub mod authorization;
pub mod context;
pub mod scope;
pub mod token;

pub use authentication::Authentication;
pub use authorization::Authorization;
pub use context::{CallContext, Identity, AUTHORIZATION_HEADER};
pub use scope::Scope;
pub use token::{sign_token, Ed25519TokenVerifier, TokenClaims, TokenError, TokenVerifier};

use crate::error::Result;
use async_trait::async_trait;

/// A unit of work run ahead of the handler for every call of a service.
///
/// Implementations are constructed once with their collaborators and shared
/// by all concurrent calls. They may establish or inspect the identity held
/// by the context but never see the request payload.
#[async_trait]
pub trait PreProcessor: Send + Sync {
    async fn process(&self, ctx: CallContext) -> Result<CallContext>;
}
