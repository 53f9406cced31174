//! Stateless value converters between wire and domain representations.
//!
//! Each converter handles one scalar shape:
//! - [`EnumConverter`]: `ENUM_NAME_VALUE` symbols to domain strings
//! - [`Int64Converter`]: two-word 64-bit integers to arbitrary-precision integers
//! - [`TimestampConverter`]: `{seconds, nanos}` messages to millisecond timestamps
//!
//! [`Value::Null`](crate::value::Value::Null) passes through every converter
//! unchanged in both directions.

pub mod enums;
pub mod int64;
pub mod timestamp;

pub use enums::{EnumCase, EnumConverter, EnumNaming};
pub use int64::{Int64Converter, Signedness};
pub use timestamp::TimestampConverter;

use crate::error::Result;
use crate::value::Value;
use serde::Serialize;
use std::fmt::Debug;

/// Bidirectional conversion of a single field value.
///
/// Implementations hold no per-call state and are shared across concurrent
/// calls.
pub trait ValueConverter: Send + Sync + Debug {
    /// Wire value to domain value.
    fn to_domain(&self, value: Value) -> Result<Value>;

    /// Domain value to wire value.
    fn to_wire(&self, value: Value) -> Result<Value>;

    /// What this converter handles, for inspection and tests.
    fn kind(&self) -> ConverterKind;
}

/// Description of a converter, independent of its implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConverterKind {
    Enum { name: String },
    Int64 { signed: bool },
    Timestamp,
}
