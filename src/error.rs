//! Error types for the gRPC bridge.
//!
//! Bind-time errors (schema resolution) abort service registration. Every
//! per-call error is turned into a [`tonic::Status`] at the dispatch boundary
//! through the single `From<Error> for Status` conversion below.

use thiserror::Error;
use tonic::Status;

use crate::auth::TokenError;

/// A specialized Result type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for bridge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced message type is not declared in any enclosing scope.
    #[error("Message definition not found {name} from context {context}")]
    SchemaResolution { name: String, context: String },

    /// A wire enum symbol does not carry the prefix of its declared enum.
    #[error("Invalid enum value {value} for enum {enum_name}")]
    InvalidEnumValue { value: String, enum_name: String },

    /// A 64-bit integer could not be converted.
    #[error("Invalid 64-bit integer value: {0}")]
    InvalidInt64(String),

    /// A timestamp could not be converted.
    #[error("Invalid timestamp value: {0}")]
    InvalidTimestamp(String),

    /// The handler completed without producing a response.
    #[error("Handler for {0} returned a null response")]
    NullResponse(String),

    /// The call does not satisfy the authorization requirements.
    #[error("Access denied: {0}")]
    AuthorizationDenied(String),

    /// No handler is registered for the called method.
    #[error("No handler registered for {0}")]
    Unimplemented(String),

    /// Domain entity not found.
    #[error("{0}")]
    NotFound(String),

    /// Domain parameter rejected by a handler.
    #[error("{0}")]
    BadParameter(String),

    /// A handler-supplied protocol status, forwarded untouched.
    #[error("{}", .0.message())]
    Status(Status),

    /// Unclassified handler failure.
    #[error("{0}")]
    Handler(#[from] anyhow::Error),

    /// Token verification failure. Never reaches a caller through the
    /// authentication pre-processor, which treats it as "no identity".
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Descriptor set decoding errors
    #[error("Descriptor decoding error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Service or schema lookups that fail outside of type resolution.
    #[error("{0}")]
    Schema(String),
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::Status(status)
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidEnumValue { .. } | Error::InvalidInt64(_) | Error::InvalidTimestamp(_) => {
                Status::invalid_argument(err.to_string())
            }
            Error::BadParameter(msg) => Status::invalid_argument(msg),
            Error::NotFound(msg) => Status::not_found(msg),
            Error::AuthorizationDenied(_) => Status::permission_denied(err.to_string()),
            Error::Unimplemented(_) => Status::unimplemented(err.to_string()),
            Error::Token(_) => Status::unauthenticated(err.to_string()),
            Error::NullResponse(_) | Error::Handler(_) => Status::unknown(err.to_string()),
            Error::Status(status) => status,
            Error::SchemaResolution { .. }
            | Error::Schema(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Decode(_) => Status::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_null_response_maps_to_unknown() {
        let status: Status = Error::NullResponse("/test.Service/Method".to_string()).into();
        assert_eq!(status.code(), Code::Unknown);
        assert_eq!(
            status.message(),
            "Handler for /test.Service/Method returned a null response"
        );
    }

    #[test]
    fn test_authorization_denied_has_distinct_code() {
        let status: Status = Error::AuthorizationDenied("anonymous call".to_string()).into();
        assert_eq!(status.code(), Code::PermissionDenied);

        let generic: Status = Error::Handler(anyhow::anyhow!("boom")).into();
        assert_eq!(generic.code(), Code::Unknown);
        assert_ne!(status.code(), generic.code());
    }

    #[test]
    fn test_generic_error_preserves_message() {
        let status: Status = Error::Handler(anyhow::anyhow!("database is down")).into();
        assert_eq!(status.message(), "database is down");
    }

    #[test]
    fn test_status_is_forwarded() {
        let status: Status = Error::from(Status::already_exists("run 42")).into();
        assert_eq!(status.code(), Code::AlreadyExists);
        assert_eq!(status.message(), "run 42");
    }

    #[test]
    fn test_conversion_errors_are_invalid_argument() {
        let err = Error::InvalidEnumValue {
            value: "INVALID_VALUE".to_string(),
            enum_name: "MyEnum".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid enum value INVALID_VALUE for enum MyEnum");
        let status: Status = err.into();
        assert_eq!(status.code(), Code::InvalidArgument);
    }
}
