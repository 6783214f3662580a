use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use tonic::Request;
use tonic::client::Grpc;
use tonic::metadata::{KeyAndValueRef, MetadataKey, MetadataMap, MetadataValue};

use crate::codec::JsonCodec;
use crate::error::InvokeError;
use crate::pool::{ChannelPool, PoolKey};
use crate::types::{InvokeRequest, InvokeResponse};

const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

pub async fn invoke(pool: &ChannelPool, request: &InvokeRequest) -> InvokeResponse {
    match do_invoke(pool, request).await {
        Ok(response) => response,
        Err(e) => InvokeResponse::failure(e.to_string()),
    }
}

async fn do_invoke(pool: &ChannelPool, request: &InvokeRequest) -> Result<InvokeResponse, InvokeError> {
    let key = PoolKey {
        endpoint: request.endpoint.clone(),
        tls: request.use_tls,
        server_name: request.tls_server_name.clone(),
    };
    let channel = pool.get_or_connect(&key).await?;

    let payload: serde_json::Value = serde_json::from_str(&request.request_json)
        .map_err(|e| InvokeError::InvalidRequestJson(e.to_string()))?;

    let mut client = Grpc::new(channel);
    client
        .ready()
        .await
        .map_err(|e| InvokeError::TransportError(format!("channel not ready: {e}")))?;

    let codec = JsonCodec::new(request.method.input(), request.method.output());
    let path = http_path(&request.method);

    let mut tonic_request = Request::new(payload);
    attach_metadata(&mut tonic_request, &request.metadata)?;
    tonic_request.set_timeout(effective_timeout(request.timeout_seconds));

    match client.unary(tonic_request, path, codec).await {
        Ok(response) => {
            let (headers, body, _extensions) = response.into_parts();
            // Trailers aren't exposed on a successful unary response by
            // tonic's high-level client; only initial headers are merged.
            let metadata = metadata_to_map(&headers);
            let response_json = serde_json::to_string(&body)
                .map_err(|e| InvokeError::TransportError(format!("failed to serialize response: {e}")))?;
            Ok(InvokeResponse::success(response_json, metadata))
        }
        Err(status) => {
            let trailers = prefixed(metadata_to_map(status.metadata()));
            Ok(InvokeResponse {
                success: false,
                response_json: String::new(),
                error_message: status.message().to_string(),
                metadata: trailers,
                status_code: status.code() as i32,
                status_message: status.message().to_string(),
            })
        }
    }
}

fn http_path(method: &prost_reflect::MethodDescriptor) -> http::uri::PathAndQuery {
    let path = format!("/{}/{}", method.parent_service().full_name(), method.name());
    http::uri::PathAndQuery::from_str(&path).expect("service and method names form a valid path")
}

fn attach_metadata<T>(
    request: &mut Request<T>,
    metadata: &HashMap<String, String>,
) -> Result<(), InvokeError> {
    for (k, v) in metadata {
        let key = MetadataKey::from_bytes(k.as_bytes())
            .map_err(|e| InvokeError::TransportError(format!("invalid metadata key '{k}': {e}")))?;
        let value = MetadataValue::try_from(v.as_str())
            .map_err(|e| InvokeError::TransportError(format!("invalid metadata value for '{k}': {e}")))?;
        request.metadata_mut().insert(key, value);
    }
    Ok(())
}

/// First-value-wins projection of a metadata map to plain strings. Binary
/// (`-bin`-suffixed) entries are skipped; the invoker's wire contract is
/// string metadata only (`spec.md` §4.3).
fn metadata_to_map(map: &MetadataMap) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for kv in map.iter() {
        if let KeyAndValueRef::Ascii(key, value) = kv {
            if let Ok(v) = value.to_str() {
                out.entry(key.as_str().to_string()).or_insert_with(|| v.to_string());
            }
        }
    }
    out
}

fn prefixed(map: HashMap<String, String>) -> HashMap<String, String> {
    map.into_iter().map(|(k, v)| (format!("trailer-{k}"), v)).collect()
}

fn effective_timeout(seconds: f64) -> Duration {
    if seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS)
    }
}
