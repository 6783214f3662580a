use std::collections::HashMap;

use prost_reflect::MethodDescriptor;

/// Wire protocol to dispatch a call over. `GrpcWeb` is currently aliased to
/// `Connect` (`spec.md` §4.3, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Connect,
    Grpc,
    GrpcWeb,
}

#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub endpoint: String,
    pub service_fqn: String,
    pub method_simple_name: String,
    pub request_json: String,
    pub use_tls: bool,
    pub tls_server_name: Option<String>,
    pub timeout_seconds: f64,
    pub metadata: HashMap<String, String>,
    pub method: MethodDescriptor,
    pub transport: Transport,
}

#[derive(Debug, Clone, Default)]
pub struct InvokeResponse {
    pub success: bool,
    pub response_json: String,
    pub error_message: String,
    pub metadata: HashMap<String, String>,
    pub status_code: i32,
    pub status_message: String,
}

impl InvokeResponse {
    pub fn success(response_json: String, metadata: HashMap<String, String>) -> Self {
        Self {
            success: true,
            response_json,
            metadata,
            status_code: 0,
            status_message: "OK".to_string(),
            ..Default::default()
        }
    }

    pub fn failure(error_message: impl Into<String>) -> Self {
        Self { success: false, error_message: error_message.into(), ..Default::default() }
    }
}
