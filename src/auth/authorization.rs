//! Authorization enforcement point.
//!
//! Rejects anonymous calls unless explicitly allowed, and calls whose
//! identity lacks a scope registered for the method. What the scopes mean is
//! up to the service.

use super::{CallContext, PreProcessor, Scope};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Authorization {
    allow_anonymous: bool,
    required_scopes: HashMap<String, Vec<Scope>>,
}

impl Authorization {
    pub fn new(allow_anonymous: bool) -> Self {
        Self {
            allow_anonymous,
            required_scopes: HashMap::new(),
        }
    }

    /// Require `scope` for calls to `method` (`/package.Service/Method`).
    pub fn require_scope(mut self, method: impl Into<String>, scope: Scope) -> Self {
        self.required_scopes.entry(method.into()).or_default().push(scope);
        self
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let mut authorization = Self::new(config.allow_anonymous);
        for rule in &config.rules {
            for scope in &rule.scopes {
                authorization = authorization.require_scope(rule.method.clone(), Scope::parse(scope)?);
            }
        }
        Ok(authorization)
    }

    pub fn allows_anonymous(&self) -> bool {
        self.allow_anonymous
    }
}

#[async_trait]
impl PreProcessor for Authorization {
    async fn process(&self, ctx: CallContext) -> Result<CallContext> {
        let required = self
            .required_scopes
            .get(ctx.method())
            .map(Vec::as_slice)
            .unwrap_or_default();

        match ctx.identity() {
            None if !self.allow_anonymous || !required.is_empty() => {
                debug!(method = ctx.method(), "Anonymous call rejected");
                return Err(Error::AuthorizationDenied(format!(
                    "{} requires an authenticated caller",
                    ctx.method()
                )));
            }
            Some(identity) => {
                if let Some(missing) = required.iter().find(|scope| !identity.has_scope(scope)) {
                    debug!(method = ctx.method(), subject = %identity.subject, scope = %missing, "Missing scope");
                    return Err(Error::AuthorizationDenied(format!(
                        "{} requires scope {}",
                        ctx.method(),
                        missing
                    )));
                }
            }
            None => {}
        }

        Ok(ctx)
    }
}
