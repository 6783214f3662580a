//! Canonical JSON request/response shapes from `spec.md` §6.2, plus the
//! conversions between them and the engine's internal types.

use std::collections::HashMap;
use std::path::PathBuf;

use explorer_invoker::{InvokeResponse, Transport};
use explorer_loader::{ReflectionOptions, Source};
use explorer_registry::{MethodInfo, ServiceInfo};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReflectionOptionsWire {
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
}

/// `LoadProtosRequest.source`: a Rust-native `oneof` over the four
/// acquisition strategies. Construction from the wire shape validates that
/// exactly one arm is set (`source_from_request`); this type itself carries
/// no such invariant, matching `Source` in `explorer_loader`.
#[derive(Debug, Default, Deserialize)]
pub struct LoadProtosRequest {
    #[serde(default)]
    pub proto_path: Option<String>,
    #[serde(default)]
    pub proto_repo: Option<String>,
    #[serde(default)]
    pub buf_module: Option<String>,
    #[serde(default)]
    pub reflection_endpoint: Option<String>,
    #[serde(default)]
    pub reflection_options: Option<ReflectionOptionsWire>,
}

#[derive(Debug, Default, Serialize)]
pub struct LoadProtosResponse {
    pub success: bool,
    #[serde(default)]
    pub error: String,
    pub service_count: i32,
    pub file_count: i32,
}

#[derive(Debug, Serialize)]
pub struct ListServicesResponse {
    pub services: Vec<ServiceInfoWire>,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfoWire {
    pub name: String,
    pub package: String,
    pub methods: Vec<MethodInfoWire>,
    pub documentation: String,
}

#[derive(Debug, Serialize)]
pub struct MethodInfoWire {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub documentation: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl From<ServiceInfo> for ServiceInfoWire {
    fn from(info: ServiceInfo) -> Self {
        Self {
            name: info.name,
            package: info.package,
            methods: info.methods.into_iter().map(MethodInfoWire::from).collect(),
            documentation: info.documentation,
        }
    }
}

impl From<MethodInfo> for MethodInfoWire {
    fn from(info: MethodInfo) -> Self {
        Self {
            name: info.name,
            input_type: info.input_type,
            output_type: info.output_type,
            documentation: info.documentation,
            client_streaming: info.client_streaming,
            server_streaming: info.server_streaming,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GetServiceSchemaRequest {
    #[serde(default)]
    pub service_name: String,
}

#[derive(Debug, Default, Serialize)]
pub struct GetServiceSchemaResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceInfoWire>,
    pub message_schemas: HashMap<String, String>,
    #[serde(default)]
    pub error: String,
}

/// Mirrors the proto3 enum `transport` from `spec.md` §6.2; `GrpcWeb` is
/// currently aliased to `Connect` by the Invoker itself (`spec.md` §4.3,
/// §9), so no translation happens here.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportWire {
    #[default]
    Connect,
    Grpc,
    GrpcWeb,
}

impl From<TransportWire> for Transport {
    fn from(value: TransportWire) -> Self {
        match value {
            TransportWire::Connect => Transport::Connect,
            TransportWire::Grpc => Transport::Grpc,
            TransportWire::GrpcWeb => Transport::GrpcWeb,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InvokeGRPCRequest {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub request_json: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub timeout_seconds: f64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub transport: TransportWire,
}

#[derive(Debug, Default, Serialize)]
pub struct InvokeGRPCResponse {
    pub success: bool,
    pub response_json: String,
    #[serde(default)]
    pub error: String,
    pub metadata: HashMap<String, String>,
    pub status_code: i32,
    pub status_message: String,
}

impl From<InvokeResponse> for InvokeGRPCResponse {
    fn from(response: InvokeResponse) -> Self {
        Self {
            success: response.success,
            response_json: response.response_json,
            error: response.error_message,
            metadata: response.metadata,
            status_code: response.status_code,
            status_message: response.status_message,
        }
    }
}

/// Validates the `oneof source` discipline from `spec.md` §6.2 (exactly one
/// arm set) and converts the wire shape to the Loader's native [`Source`].
/// Anything else is a caller-side contract violation, surfaced as a
/// transport-level `validation` error per `spec.md` §7.
pub fn source_from_request(req: &LoadProtosRequest) -> Result<Source, String> {
    let arms: Vec<&str> = [
        req.proto_path.as_ref().map(|_| "proto_path"),
        req.proto_repo.as_ref().map(|_| "proto_repo"),
        req.buf_module.as_ref().map(|_| "buf_module"),
        req.reflection_endpoint.as_ref().map(|_| "reflection_endpoint"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if arms.len() != 1 {
        return Err(format!(
            "exactly one of proto_path, proto_repo, buf_module, reflection_endpoint must be set, got {}: [{}]",
            arms.len(),
            arms.join(", ")
        ));
    }

    if let Some(path) = &req.proto_path {
        return Ok(Source::Path(PathBuf::from(path)));
    }
    if let Some(repo) = &req.proto_repo {
        return Ok(Source::Git(repo.clone()));
    }
    if let Some(module) = &req.buf_module {
        return Ok(Source::Module(module.clone()));
    }
    let endpoint = req.reflection_endpoint.clone().expect("validated above: exactly one arm set");
    let opts = req.reflection_options.clone().unwrap_or_default();
    Ok(Source::Reflection(
        endpoint,
        ReflectionOptions {
            use_tls: opts.use_tls,
            server_name: opts.server_name,
            timeout_seconds: opts.timeout_seconds,
        },
    ))
}
