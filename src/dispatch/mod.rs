//! Schema-driven dispatch of wire calls to domain handlers.

pub mod adapter;
pub mod handler;
pub mod service;
pub mod tree;

pub use adapter::{bind, WireCall, WireMethod, WireService};
pub use handler::{handler_fn, Handler, HandlerFn, Handlers};
pub use service::{MethodDefinition, ServiceDefinition};
