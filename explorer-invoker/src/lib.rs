//! Dispatches one resolved RPC call over its selected transport and pools
//! the wire-level connections gRPC calls use. See `spec.md` §4.3.

mod codec;
mod connect;
mod error;
mod grpc;
mod pool;
mod types;

pub use codec::JsonCodec;
pub use error::InvokeError;
pub use types::{InvokeRequest, InvokeResponse, Transport};

use pool::ChannelPool;
use std::sync::Once;

static GRPC_WEB_ALIAS_LOGGED: Once = Once::new();

#[derive(Default)]
pub struct Invoker {
    pool: ChannelPool,
}

impl Invoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates, then dispatches by transport. Every documented failure
    /// mode — including pre-transport validation — degrades to a
    /// response-level `InvokeResponse { success: false, .. }`, never a
    /// `Result::Err`; there is nothing for a caller to propagate.
    pub async fn invoke(&self, request: InvokeRequest) -> InvokeResponse {
        if let Err(e) = validate(&request) {
            return InvokeResponse::failure(e.to_string());
        }

        match request.transport {
            Transport::Connect => connect::invoke(&request).await,
            Transport::GrpcWeb => {
                GRPC_WEB_ALIAS_LOGGED
                    .call_once(|| tracing::info!("gRPC-Web transport requested; dispatching as Connect"));
                connect::invoke(&request).await
            }
            Transport::Grpc => grpc::invoke(&self.pool, &request).await,
        }
    }

    /// Drops every pooled channel. Called when the owning session is torn
    /// down (`spec.md` §4.4, SessionManager `Delete`/`Close`).
    pub fn close(&self) {
        self.pool.clear();
    }
}

fn validate(request: &InvokeRequest) -> Result<(), InvokeError> {
    if request.endpoint.is_empty() {
        return Err(InvokeError::MissingField("endpoint"));
    }
    if request.service_fqn.is_empty() {
        return Err(InvokeError::MissingField("service_fqn"));
    }
    if request.method_simple_name.is_empty() {
        return Err(InvokeError::MissingField("method_simple_name"));
    }
    if request.request_json.is_empty() {
        return Err(InvokeError::MissingField("request_json"));
    }
    if serde_json::from_str::<serde_json::Value>(&request.request_json).is_err() {
        return Err(InvokeError::InvalidRequestJson(
            "request_json is not syntactically valid JSON".to_string(),
        ));
    }
    if request.method.is_client_streaming() || request.method.is_server_streaming() {
        return Err(InvokeError::StreamingUnsupported);
    }
    Ok(())
}
