//! `google.protobuf.Timestamp` conversion at millisecond resolution.
//!
//! Nanoseconds below the millisecond are dropped when reading from the wire.

use super::{ConverterKind, ValueConverter};
use crate::error::{Error, Result};
use crate::value::{Long, Message, Value};
use chrono::{DateTime, Utc};

/// Fully qualified name of the well-known timestamp message.
pub const TIMESTAMP_TYPE_NAME: &str = "google.protobuf.Timestamp";

const NANOS_PER_MILLI: i64 = 1_000_000;
const MILLIS_PER_SECOND: i64 = 1_000;
const MAX_NANOS: i64 = 999_999_999;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampConverter;

impl TimestampConverter {
    pub fn new() -> Self {
        Self
    }

    /// `{seconds, nanos}` to milliseconds since the epoch.
    pub fn to_millis(message: &Message) -> Result<i64> {
        let seconds = match message.get("seconds") {
            None | Some(Value::Null) => 0,
            Some(Value::Long(long)) => long.as_i64(),
            Some(Value::Int(i)) => *i,
            Some(other) => {
                return Err(Error::InvalidTimestamp(format!(
                    "seconds must be an integer, got {}",
                    other.type_name()
                )))
            }
        };
        let nanos = match message.get("nanos") {
            None | Some(Value::Null) => 0,
            Some(Value::Int(i)) => *i,
            Some(other) => {
                return Err(Error::InvalidTimestamp(format!(
                    "nanos must be an integer, got {}",
                    other.type_name()
                )))
            }
        };
        if !(0..=MAX_NANOS).contains(&nanos) {
            return Err(Error::InvalidTimestamp(format!(
                "nanos must be within 0..={MAX_NANOS}, got {nanos}"
            )));
        }

        seconds
            .checked_mul(MILLIS_PER_SECOND)
            .and_then(|ms| ms.checked_add(nanos / NANOS_PER_MILLI))
            .ok_or_else(|| Error::InvalidTimestamp(format!("{seconds}s overflows the millisecond range")))
    }

    /// Milliseconds since the epoch to `{seconds, nanos}`.
    pub fn from_millis(millis: i64) -> Message {
        let mut message = Message::new();
        message.insert(
            "seconds".to_owned(),
            Value::Long(Long::from_i64(millis.div_euclid(MILLIS_PER_SECOND))),
        );
        message.insert(
            "nanos".to_owned(),
            Value::Int(millis.rem_euclid(MILLIS_PER_SECOND) * NANOS_PER_MILLI),
        );
        message
    }
}

impl ValueConverter for TimestampConverter {
    fn to_domain(&self, value: Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Message(message) => {
                let millis = Self::to_millis(&message)?;
                DateTime::<Utc>::from_timestamp_millis(millis)
                    .map(Value::Timestamp)
                    .ok_or_else(|| Error::InvalidTimestamp(format!("{millis}ms is out of range")))
            }
            other => Err(Error::InvalidTimestamp(format!(
                "expected a timestamp message, got {}",
                other.type_name()
            ))),
        }
    }

    fn to_wire(&self, value: Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Timestamp(t) => Ok(Value::Message(Self::from_millis(t.timestamp_millis()))),
            other => Err(Error::InvalidTimestamp(format!(
                "expected a timestamp, got {}",
                other.type_name()
            ))),
        }
    }

    fn kind(&self) -> ConverterKind {
        ConverterKind::Timestamp
    }
}
