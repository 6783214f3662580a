use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::InvokeError;
use crate::types::{InvokeRequest, InvokeResponse};

const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

pub async fn invoke(request: &InvokeRequest) -> InvokeResponse {
    match do_invoke(request).await {
        Ok(response) => response,
        Err(e) => InvokeResponse::failure(e.to_string()),
    }
}

async fn do_invoke(request: &InvokeRequest) -> Result<InvokeResponse, InvokeError> {
    let timeout = effective_timeout(request.timeout_seconds);
    let scheme = if request.use_tls { "https" } else { "http" };

    let mut builder = reqwest::Client::builder().timeout(timeout);
    let mut host = request.endpoint.clone();

    // SNI override: tell the connector to dial the endpoint's resolved
    // address whenever it sees `tls_server_name` in the URL, and name the
    // URL host after `tls_server_name` so the TLS handshake presents it.
    if let Some(server_name) = request.tls_server_name.as_deref() {
        if let Ok(addr) = resolve_socket_addr(&request.endpoint).await {
            let override_host = format!("{server_name}:{}", addr.port());
            builder = builder.resolve(server_name, addr);
            host = override_host;
        }
    }

    let client = builder
        .build()
        .map_err(|e| InvokeError::TransportError(format!("failed to build http client: {e}")))?;

    let url = format!("{scheme}://{host}/{}/{}", request.service_fqn, request.method_simple_name);

    let mut req = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header("Connect-Protocol-Version", "1")
        .body(request.request_json.clone());

    for (k, v) in &request.metadata {
        req = req.header(k, v);
    }

    let response = req
        .send()
        .await
        .map_err(|e| InvokeError::TransportError(format!("connect request failed: {e}")))?;

    let status = status_code(&response);
    let mut metadata: HashMap<String, String> = HashMap::new();
    for (k, v) in response.headers().iter() {
        metadata.entry(k.to_string()).or_insert_with(|| v.to_str().unwrap_or_default().to_string());
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| InvokeError::TransportError(format!("failed to read response body: {e}")))?;

    if (200..300).contains(&status) {
        return Ok(InvokeResponse::success(String::from_utf8_lossy(&body).into_owned(), metadata));
    }

    let body_text = String::from_utf8_lossy(&body);
    if let Ok(parsed) = serde_json::from_str::<ConnectErrorBody>(&body_text) {
        if !parsed.message.is_empty() {
            return Ok(InvokeResponse {
                success: false,
                response_json: String::new(),
                error_message: parsed.message,
                metadata,
                status_code: status,
                status_message: parsed.code,
            });
        }
    }

    Ok(InvokeResponse {
        success: false,
        response_json: String::new(),
        error_message: format!("HTTP {status}: {body_text}"),
        metadata,
        status_code: status,
        status_message: String::new(),
    })
}

#[derive(Deserialize)]
struct ConnectErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn status_code(response: &reqwest::Response) -> i32 {
    response.status().as_u16() as i32
}

fn effective_timeout(seconds: f64) -> Duration {
    if seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS)
    }
}

async fn resolve_socket_addr(endpoint: &str) -> std::io::Result<SocketAddr> {
    tokio::net::lookup_host(endpoint)
        .await?
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"))
}
