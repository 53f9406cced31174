//! Per-call context threaded through pre-processors and into the handler.

use super::Scope;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tonic::metadata::MetadataMap;

/// Metadata key carrying the caller's token.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub admin: bool,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            name: None,
            scopes: Vec::new(),
            admin: false,
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    /// FAIL-SECURE: empty scopes deny everything unless admin.
    pub fn has_scope(&self, required: &Scope) -> bool {
        if self.admin {
            return true;
        }
        self.scopes.iter().any(|s| s.grants(required))
    }
}

/// Call-scoped state: route, transport metadata and, once established, the
/// caller identity.
///
/// Pre-processors receive the context by value and hand back the next one;
/// nothing is attached to the call behind the handler's back.
#[derive(Debug, Clone)]
pub struct CallContext {
    method: Arc<str>,
    metadata: MetadataMap,
    identity: Option<Identity>,
}

impl CallContext {
    pub fn new(method: impl Into<Arc<str>>, metadata: MetadataMap) -> Self {
        Self {
            method: method.into(),
            metadata,
            identity: None,
        }
    }

    /// Route of the called method, `/package.Service/Method`.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn with_identity(self, identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..self
        }
    }

    /// Token from the `authorization` metadata, without a `Bearer ` prefix.
    pub fn bearer_token(&self) -> Option<&str> {
        let raw = self.metadata.get(AUTHORIZATION_HEADER)?.to_str().ok()?.trim();
        let token = match raw.split_once(' ') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            _ => raw,
        };
        (!token.is_empty()).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with(header: &str) -> CallContext {
        let mut metadata = MetadataMap::new();
        metadata.insert(AUTHORIZATION_HEADER, header.parse().unwrap());
        CallContext::new("/test.Service/Method", metadata)
    }

    #[test]
    fn test_bearer_prefix_is_optional() {
        assert_eq!(context_with("Bearer abc.def.ghi").bearer_token(), Some("abc.def.ghi"));
        assert_eq!(context_with("abc.def.ghi").bearer_token(), Some("abc.def.ghi"));
        assert_eq!(context_with("bearer  abc").bearer_token(), Some("abc"));
        assert_eq!(context_with("").bearer_token(), None);
    }

    #[test]
    fn test_missing_header() {
        let ctx = CallContext::new("/test.Service/Method", MetadataMap::new());
        assert_eq!(ctx.bearer_token(), None);
        assert!(ctx.identity().is_none());
    }

    #[test]
    fn test_identity_fail_secure() {
        let required = Scope::parse("read:run:1").unwrap();
        assert!(!Identity::new("alice").has_scope(&required));
        assert!(Identity::new("root").with_admin(true).has_scope(&required));
        assert!(Identity::new("bob")
            .with_scopes(vec![Scope::parse("read:run:*").unwrap()])
            .has_scope(&required));
    }
}
