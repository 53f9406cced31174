//! Service and method definitions taken from protobuf service descriptors.

use crate::error::{Error, Result};
use prost_types::{FileDescriptorSet, ServiceDescriptorProto};

/// One RPC of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefinition {
    pub name: String,
    /// Fully qualified request type, e.g. `.pkg.Request`.
    pub request_type: String,
    /// Fully qualified response type.
    pub response_type: String,
    /// gRPC route, `/pkg.Service/Method`.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Fully qualified service name, `pkg.Service`.
    pub name: String,
    pub methods: Vec<MethodDefinition>,
}

impl ServiceDefinition {
    pub fn from_descriptor(package: Option<&str>, service: &ServiceDescriptorProto) -> Self {
        let name = match package.filter(|p| !p.is_empty()) {
            Some(package) => format!("{package}.{}", service.name()),
            None => service.name().to_owned(),
        };

        let methods = service
            .method
            .iter()
            .map(|method| MethodDefinition {
                name: method.name().to_owned(),
                request_type: method.input_type().to_owned(),
                response_type: method.output_type().to_owned(),
                path: format!("/{name}/{}", method.name()),
            })
            .collect();

        Self { name, methods }
    }

    /// Find `pkg.Service` among the files of a descriptor set.
    pub fn from_file_descriptor_set(set: &FileDescriptorSet, full_name: &str) -> Result<Self> {
        set.file
            .iter()
            .flat_map(|file| {
                file.service
                    .iter()
                    .map(move |service| Self::from_descriptor(file.package.as_deref(), service))
            })
            .find(|service| service.name == full_name)
            .ok_or_else(|| Error::Schema(format!("Service {full_name} not found in descriptor set")))
    }

    pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.name == name)
    }
}
