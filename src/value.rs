//! Dynamic payload tree shared by the wire and domain sides of a call.
//!
//! A decoded protobuf message arrives as a [`Message`] whose 64-bit integers
//! are [`Value::Long`] halves, enums are `SCREAMING_SNAKE` strings and
//! timestamps are `{seconds, nanos}` sub-messages. Converters rewrite those
//! leaves in place into [`Value::BigInt`], plain strings and
//! [`Value::Timestamp`] before a handler sees the request, and back again for
//! the response.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::collections::BTreeMap;

/// A message body keyed by field name.
pub type Message = BTreeMap<String, Value>;

/// A single node of a payload tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicitly unset
    #[default]
    Null,
    Bool(bool),
    /// 32-bit protobuf integers
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Wire form of a 64-bit integer
    Long(Long),
    /// Domain form of a 64-bit integer
    BigInt(BigInt),
    /// Domain form of a timestamp, millisecond resolution
    Timestamp(DateTime<Utc>),
    /// Repeated field
    List(Vec<Value>),
    /// Nested message
    Message(Message),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Short name of the variant, used in conversion error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Long(_) => "long",
            Value::BigInt(_) => "bigint",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Message(_) => "message",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<Long> for Value {
    fn from(l: Long) -> Self {
        Value::Long(l)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::BigInt(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Message> for Value {
    fn from(m: Message) -> Self {
        Value::Message(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Wire representation of a 64-bit integer as two 32-bit words.
///
/// The words are raw bits: whether they denote a signed or an unsigned
/// quantity is decided by the field declaration, not by the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Long {
    pub low: u32,
    pub high: u32,
}

impl Long {
    pub fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    pub fn from_u64(n: u64) -> Self {
        Self {
            low: n as u32,
            high: (n >> 32) as u32,
        }
    }

    pub fn from_i64(n: i64) -> Self {
        Self::from_u64(n as u64)
    }

    pub fn as_u64(&self) -> u64 {
        (u64::from(self.high) << 32) | u64::from(self.low)
    }

    pub fn as_i64(&self) -> i64 {
        self.as_u64() as i64
    }
}

/// Build a [`Message`] from `(field, value)` pairs.
///
/// ```
/// use grpcbridge::value::{message, Value};
///
/// let msg = message([("a", Value::from("ENUM_A_1"))]);
/// assert_eq!(msg["a"], Value::from("ENUM_A_1"));
/// ```
pub fn message<K, I>(fields: I) -> Message
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
