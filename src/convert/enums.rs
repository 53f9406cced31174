//! Enum symbol conversion.
//!
//! Wire symbols follow the protobuf style guide: every value of enum
//! `RunQuality` is prefixed with `RUN_QUALITY_`. The domain value is what
//! remains after the prefix, optionally re-cased per enum (see [`EnumCase`]).

use super::{ConverterKind, ValueConverter};
use crate::error::{Error, Result};
use crate::value::Value;
use heck::ToShoutySnakeCase;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the part of a wire symbol after the enum prefix maps to a domain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumCase {
    /// `MY_ENUM_VALUE` <-> `VALUE`
    #[default]
    Preserve,
    /// `RUN_QUALITY_GOOD` <-> `good`
    Lower,
    /// `RUN_QUALITY_BAD_RUN` <-> `bad-run`
    Kebab,
}

impl EnumCase {
    fn to_domain(self, suffix: &str) -> String {
        match self {
            EnumCase::Preserve => suffix.to_owned(),
            EnumCase::Lower => suffix.to_lowercase(),
            EnumCase::Kebab => suffix.to_lowercase().replace('_', "-"),
        }
    }

    /// `None` for a domain value this case could never have produced.
    fn to_wire(self, domain: &str) -> Option<String> {
        match self {
            EnumCase::Preserve => domain
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
                .then(|| domain.to_owned()),
            EnumCase::Lower | EnumCase::Kebab => Some(domain.to_uppercase().replace('-', "_")),
        }
    }
}

/// Per-enum case rules, keyed by the enum's short name.
#[derive(Debug, Clone, Default)]
pub struct EnumNaming {
    cases: HashMap<String, EnumCase>,
}

impl EnumNaming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case(mut self, enum_name: impl Into<String>, case: EnumCase) -> Self {
        self.cases.insert(enum_name.into(), case);
        self
    }

    pub fn case_for(&self, enum_name: &str) -> EnumCase {
        self.cases.get(enum_name).copied().unwrap_or_default()
    }
}

impl From<HashMap<String, EnumCase>> for EnumNaming {
    fn from(cases: HashMap<String, EnumCase>) -> Self {
        Self { cases }
    }
}

#[derive(Debug, Clone)]
pub struct EnumConverter {
    enum_name: String,
    prefix: String,
    case: EnumCase,
}

impl EnumConverter {
    pub fn new(enum_name: impl Into<String>, case: EnumCase) -> Self {
        let enum_name = enum_name.into();
        let prefix = format!("{}_", enum_name.to_shouty_snake_case());
        Self {
            enum_name,
            prefix,
            case,
        }
    }

    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }

    /// `ENUM_A_1` -> `1` for enum `EnumA`.
    pub fn to_domain_symbol(&self, symbol: &str) -> Result<String> {
        match symbol.strip_prefix(&self.prefix) {
            Some(suffix) if !suffix.is_empty() => Ok(self.case.to_domain(suffix)),
            _ => Err(self.invalid(symbol)),
        }
    }

    /// `1` -> `ENUM_A_1` for enum `EnumA`.
    pub fn to_wire_symbol(&self, domain: &str) -> Result<String> {
        match self.case.to_wire(domain) {
            Some(suffix) if !suffix.is_empty() => Ok(format!("{}{}", self.prefix, suffix)),
            _ => Err(self.invalid(domain)),
        }
    }

    fn invalid(&self, value: &str) -> Error {
        Error::InvalidEnumValue {
            value: value.to_owned(),
            enum_name: self.enum_name.clone(),
        }
    }
}

impl ValueConverter for EnumConverter {
    fn to_domain(&self, value: Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(symbol) => self.to_domain_symbol(&symbol).map(Value::String),
            other => Err(self.invalid(other.type_name())),
        }
    }

    fn to_wire(&self, value: Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(domain) => self.to_wire_symbol(&domain).map(Value::String),
            other => Err(self.invalid(other.type_name())),
        }
    }

    fn kind(&self) -> ConverterKind {
        ConverterKind::Enum {
            name: self.enum_name.clone(),
        }
    }
}
