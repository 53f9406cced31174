//! Schema-driven adapter between gRPC wire payloads and domain handlers.
//!
//! Given protobuf descriptors, the bridge works out which fields of a
//! method's request and response need converting (enum symbols, 64-bit
//! integers, timestamps), rewrites payloads in both directions around a
//! domain handler and runs authentication and authorization ahead of it.

pub mod auth;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod logging;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use auth::{Authentication, Authorization, CallContext, Identity, PreProcessor};
pub use config::BridgeConfig;
pub use dispatch::{bind, handler_fn, Handler, Handlers, ServiceDefinition, WireCall, WireService};
pub use error::{Error, Result};
pub use extract::{extract_converters, FieldConverter};
pub use schema::SchemaIndex;
pub use value::{Message, Value};
