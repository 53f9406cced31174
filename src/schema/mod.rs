//! Message schema index and scoped type resolution.
//!
//! The index flattens every message of a loaded schema, at any nesting
//! depth, into a map keyed by its qualified name (`Outer.Inner.Leaf`, package
//! excluded). Enums and services are not indexed.
//!
//! Short type names are resolved the way protobuf scopes them: from the
//! innermost enclosing message outwards, then globally. Two messages may
//! therefore each declare a nested `D` without the references colliding.

mod scope;

pub use scope::ScopeStack;

use crate::convert::EnumNaming;
use crate::error::{Error, Result};
use prost::Message as _;
use prost_types::{DescriptorProto, FileDescriptorProto, FileDescriptorSet};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Default number of times a self-referencing type is expanded on one path.
pub const DEFAULT_RECURSION_LIMIT: usize = 3;

/// A message descriptor together with the name it is indexed under.
#[derive(Debug, Clone, Copy)]
pub struct MessageRef<'i> {
    pub qualified_name: &'i str,
    pub descriptor: &'i DescriptorProto,
}

/// Read-only map from qualified name to message descriptor.
///
/// Also carries the settings the converter extractor reads while walking
/// the schema (enum naming, recursion limit).
#[derive(Debug, Clone)]
pub struct SchemaIndex<'a> {
    messages: HashMap<String, &'a DescriptorProto>,
    packages: Vec<String>,
    enum_naming: EnumNaming,
    recursion_limit: usize,
}

impl<'a> SchemaIndex<'a> {
    /// Index top-level messages and, recursively, their nested messages.
    pub fn index<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = &'a DescriptorProto>,
    {
        let mut index = Self::empty();
        for message in messages {
            index.insert(None, message);
        }
        index
    }

    /// Index every message declared by the given files.
    pub fn from_files<I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a FileDescriptorProto>,
    {
        let mut index = Self::empty();
        for file in files {
            if let Some(package) = file.package.as_deref().filter(|p| !p.is_empty()) {
                if !index.packages.iter().any(|p| p == package) {
                    index.packages.push(package.to_owned());
                }
            }
            for message in &file.message_type {
                index.insert(None, message);
            }
        }
        // Longest package first so nested packages strip before their parents.
        index.packages.sort_by(|a, b| b.len().cmp(&a.len()));
        index
    }

    pub fn from_file_descriptor_set(set: &'a FileDescriptorSet) -> Self {
        Self::from_files(&set.file)
    }

    fn empty() -> Self {
        Self {
            messages: HashMap::new(),
            packages: Vec::new(),
            enum_naming: EnumNaming::default(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    fn insert(&mut self, parent: Option<&str>, message: &'a DescriptorProto) {
        let qualified = match parent {
            Some(parent) => format!("{}.{}", parent, message.name()),
            None => message.name().to_owned(),
        };
        for nested in &message.nested_type {
            self.insert(Some(&qualified), nested);
        }
        if self.messages.insert(qualified.clone(), message).is_some() {
            warn!(message = %qualified, "Message declared more than once, keeping the last declaration");
        }
    }

    pub fn with_enum_naming(mut self, enum_naming: EnumNaming) -> Self {
        self.enum_naming = enum_naming;
        self
    }

    pub fn with_recursion_limit(mut self, recursion_limit: usize) -> Self {
        self.recursion_limit = recursion_limit.max(1);
        self
    }

    pub fn enum_naming(&self) -> &EnumNaming {
        &self.enum_naming
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Indexed qualified names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.messages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Exact lookup by qualified name.
    pub fn get(&self, qualified_name: &str) -> Option<MessageRef<'_>> {
        self.messages
            .get_key_value(qualified_name)
            .map(|(name, descriptor)| MessageRef {
                qualified_name: name.as_str(),
                descriptor: *descriptor,
            })
    }

    /// Look up a type named outside of any message, e.g. a method's request type.
    ///
    /// Accepts fully qualified names (`.pkg.Outer.Inner`) and qualified
    /// names with or without the package.
    pub fn message(&self, type_name: &str) -> Result<MessageRef<'_>> {
        let name = type_name.strip_prefix('.').unwrap_or(type_name);
        self.get(name)
            .or_else(|| self.get(self.strip_package(name)))
            .ok_or_else(|| Error::SchemaResolution {
                name: type_name.to_owned(),
                context: String::new(),
            })
    }

    /// Resolve a type referenced by a field of the innermost type on `scope`.
    ///
    /// Fully qualified references (leading `.`) are looked up exactly. For a
    /// relative reference `T` seen inside `A.B.C`, the candidates are
    /// `A.B.C.T`, `A.B.T`, `A.T` and finally `T`; the first hit wins.
    pub fn resolve(&self, type_name: &str, scope: &ScopeStack<'_>) -> Result<MessageRef<'_>> {
        let not_found = || Error::SchemaResolution {
            name: type_name.to_owned(),
            context: scope.to_string(),
        };

        if let Some(absolute) = type_name.strip_prefix('.') {
            return self.get(self.strip_package(absolute)).ok_or_else(not_found);
        }

        let mut enclosing = Some(scope.innermost()).filter(|s| !s.is_empty());
        while let Some(prefix) = enclosing {
            if let Some(found) = self.get(&format!("{prefix}.{type_name}")) {
                return Ok(found);
            }
            enclosing = prefix.rsplit_once('.').map(|(outer, _)| outer);
        }

        self.get(type_name)
            .or_else(|| self.get(self.strip_package(type_name)))
            .ok_or_else(not_found)
    }

    fn strip_package<'n>(&self, name: &'n str) -> &'n str {
        self.packages
            .iter()
            .find_map(|package| {
                name.strip_prefix(package.as_str())
                    .and_then(|rest| rest.strip_prefix('.'))
            })
            .unwrap_or(name)
    }
}

/// Read a descriptor set produced by `protoc --include_imports --descriptor_set_out`.
pub async fn load_descriptor_set(path: impl AsRef<Path>) -> Result<FileDescriptorSet> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    Ok(FileDescriptorSet::decode(bytes.as_slice())?)
}
