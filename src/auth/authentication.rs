//! Advisory authentication.
//!
//! A valid token attaches an [`Identity`](super::Identity) to the call. A
//! missing or rejected token does not fail the call: it proceeds
//! anonymously and [`Authorization`](super::Authorization) decides whether
//! that is acceptable.

use super::{CallContext, PreProcessor, TokenVerifier};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Authentication {
    verifier: Arc<dyn TokenVerifier>,
}

impl Authentication {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl PreProcessor for Authentication {
    async fn process(&self, ctx: CallContext) -> Result<CallContext> {
        let Some(token) = ctx.bearer_token().map(str::to_owned) else {
            debug!(method = ctx.method(), "No token supplied, proceeding anonymously");
            return Ok(ctx);
        };

        match self.verifier.verify(&token).await {
            Ok(identity) => {
                debug!(method = ctx.method(), subject = %identity.subject, "Caller authenticated");
                Ok(ctx.with_identity(identity))
            }
            Err(e) => {
                debug!(method = ctx.method(), error = %e, "Token rejected, proceeding anonymously");
                Ok(ctx)
            }
        }
    }
}
