use prost_reflect::{MethodDescriptor, ServiceDescriptor};
use serde::Serialize;

use crate::doc;

/// The externally visible projection of a service, per `spec.md` §3/§6.2.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub package: String,
    pub methods: Vec<MethodInfo>,
    pub documentation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub documentation: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl ServiceInfo {
    pub fn project(service: &ServiceDescriptor) -> Self {
        Self {
            name: service.full_name().to_string(),
            package: service.parent_file().package_name().to_string(),
            methods: service.methods().map(|m| MethodInfo::project(&m)).collect(),
            documentation: doc::service_doc(service),
        }
    }
}

impl MethodInfo {
    pub fn project(method: &MethodDescriptor) -> Self {
        Self {
            name: method.name().to_string(),
            input_type: method.input().full_name().to_string(),
            output_type: method.output().full_name().to_string(),
            documentation: doc::method_doc(method),
            client_streaming: method.is_client_streaming(),
            server_streaming: method.is_server_streaming(),
        }
    }
}
