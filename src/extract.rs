//! Discovery of the fields that need wire/domain conversion.
//!
//! [`extract_converters`] walks a message type depth-first, following nested
//! message fields through the [`SchemaIndex`], and returns one
//! [`FieldConverter`] per convertible field occurrence. A converter is
//! addressed by the field names leading from the root message to the
//! field's container (`path`) plus the field's own name.
//!
//! Every occurrence is kept. When the same nested type is reachable through
//! several fields, each route yields its own converters, even if two of them
//! end up addressing the same container.

use crate::convert::{
    ConverterKind, EnumConverter, Int64Converter, TimestampConverter, ValueConverter,
};
use crate::convert::timestamp::TIMESTAMP_TYPE_NAME;
use crate::error::Result;
use crate::schema::{MessageRef, SchemaIndex, ScopeStack};
use crate::value::Value;
use prost_types::field_descriptor_proto::Type;
use prost_types::DescriptorProto;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{trace, warn};

/// Conversion of one field, addressed from the root of a request or response.
#[derive(Debug, Clone)]
pub struct FieldConverter {
    /// Field names from the root message down to the field's container.
    pub path: Vec<String>,
    /// The field's own name inside its container.
    pub name: String,
    converter: Arc<dyn ValueConverter>,
}

impl FieldConverter {
    pub fn new(path: Vec<String>, name: impl Into<String>, converter: Arc<dyn ValueConverter>) -> Self {
        Self {
            path,
            name: name.into(),
            converter,
        }
    }

    pub fn to_domain(&self, value: Value) -> Result<Value> {
        self.converter.to_domain(value)
    }

    pub fn to_wire(&self, value: Value) -> Result<Value> {
        self.converter.to_wire(value)
    }

    pub fn kind(&self) -> ConverterKind {
        self.converter.kind()
    }

    pub fn summary(&self) -> ConverterSummary {
        ConverterSummary {
            path: self.path.clone(),
            name: self.name.clone(),
            kind: self.kind(),
        }
    }
}

/// Plain-data view of a [`FieldConverter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterSummary {
    pub path: Vec<String>,
    pub name: String,
    #[serde(flatten)]
    pub kind: ConverterKind,
}

/// Extract the converters of every convertible field reachable from `root`.
///
/// Fails with [`Error::SchemaResolution`](crate::error::Error::SchemaResolution)
/// when a nested message type cannot be resolved from its scope.
pub fn extract_converters(root: MessageRef<'_>, index: &SchemaIndex<'_>) -> Result<Vec<FieldConverter>> {
    let mut extraction = Extraction::new(index);
    let scope = ScopeStack::root(root.qualified_name);
    extraction.walk(root, &[], &scope)?;
    trace!(
        root = root.qualified_name,
        count = extraction.converters.len(),
        "Extracted field converters"
    );
    Ok(extraction.converters)
}

struct Extraction<'x, 'i> {
    index: &'x SchemaIndex<'i>,
    enums: HashMap<String, Arc<dyn ValueConverter>>,
    signed: Arc<dyn ValueConverter>,
    unsigned: Arc<dyn ValueConverter>,
    timestamp: Arc<dyn ValueConverter>,
    converters: Vec<FieldConverter>,
}

impl<'x, 'i> Extraction<'x, 'i> {
    fn new(index: &'x SchemaIndex<'i>) -> Self {
        Self {
            index,
            enums: HashMap::new(),
            signed: Arc::new(Int64Converter::signed()),
            unsigned: Arc::new(Int64Converter::unsigned()),
            timestamp: Arc::new(TimestampConverter::new()),
            converters: Vec::new(),
        }
    }

    fn walk(&mut self, message: MessageRef<'_>, path: &[String], scope: &ScopeStack<'_>) -> Result<()> {
        let index = self.index;

        for field in &message.descriptor.field {
            let name = field.name();
            match field.r#type() {
                Type::Enum => {
                    let converter = self.enum_converter(field.type_name());
                    self.emit(path, name, converter);
                }
                Type::Int64 | Type::Sint64 | Type::Sfixed64 => {
                    let converter = Arc::clone(&self.signed);
                    self.emit(path, name, converter);
                }
                Type::Uint64 | Type::Fixed64 => {
                    let converter = Arc::clone(&self.unsigned);
                    self.emit(path, name, converter);
                }
                Type::Message | Type::Group => {
                    if is_well_known_timestamp(field.type_name()) {
                        let converter = Arc::clone(&self.timestamp);
                        self.emit(path, name, converter);
                        continue;
                    }

                    let nested = index.resolve(field.type_name(), scope)?;
                    if is_timestamp_shaped(nested.descriptor) {
                        let converter = Arc::clone(&self.timestamp);
                        self.emit(path, name, converter);
                        continue;
                    }

                    if scope.occurrences(nested.qualified_name) >= index.recursion_limit() {
                        warn!(
                            field = name,
                            message = nested.qualified_name,
                            context = %scope,
                            "Recursion limit reached, deeper fields are passed through unconverted"
                        );
                        continue;
                    }

                    let mut nested_path = path.to_vec();
                    nested_path.push(name.to_owned());
                    let inner = scope.push(nested.qualified_name);
                    self.walk(nested, &nested_path, &inner)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn emit(&mut self, path: &[String], name: &str, converter: Arc<dyn ValueConverter>) {
        self.converters
            .push(FieldConverter::new(path.to_vec(), name, converter));
    }

    fn enum_converter(&mut self, type_name: &str) -> Arc<dyn ValueConverter> {
        let enum_name = short_name(type_name);
        let index = self.index;
        Arc::clone(self.enums.entry(enum_name.to_owned()).or_insert_with(|| {
            let converter: Arc<dyn ValueConverter> = Arc::new(EnumConverter::new(
                enum_name,
                index.enum_naming().case_for(enum_name),
            ));
            converter
        }))
    }
}

fn short_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

fn is_well_known_timestamp(type_name: &str) -> bool {
    type_name.strip_prefix('.').unwrap_or(type_name) == TIMESTAMP_TYPE_NAME
}

/// Exactly `int64 seconds` and `int32 nanos`.
fn is_timestamp_shaped(descriptor: &DescriptorProto) -> bool {
    descriptor.field.len() == 2
        && descriptor.field.iter().all(|field| {
            matches!(
                (field.name(), field.r#type()),
                ("seconds", Type::Int64) | ("nanos", Type::Int32)
            )
        })
        && descriptor.field[0].name() != descriptor.field[1].name()
}
