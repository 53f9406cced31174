//! Structured scope for fine-grained authorization.
//!
//! Format: action:resource:identifier
//! Examples:
//!   read:run:*          - Read any run
//!   write:run:42        - Modify run 42
//!   create:log:*        - Create logs

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub action: String,
    pub resource: String,
    pub identifier: String,
}

impl Scope {
    pub fn new(
        action: impl Into<String>,
        resource: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
            identifier: identifier.into(),
        }
    }

    /// Parse from string format "action:resource:identifier"
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [action, resource, identifier] if parts.iter().all(|p| !p.is_empty()) => {
                Ok(Self::new(*action, *resource, *identifier))
            }
            _ => Err(Error::BadParameter(format!("Invalid scope format: {s}"))),
        }
    }

    /// Check if this scope grants permission for the required scope.
    ///
    /// Actions and resources must match exactly; only the identifier
    /// accepts the `*` wildcard.
    pub fn grants(&self, required: &Scope) -> bool {
        if self.action != required.action || self.resource != required.resource {
            return false;
        }

        match self.identifier.as_str() {
            "*" => true,
            id => id == required.identifier,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.action, self.resource, self.identifier)
    }
}
