//! Maps the four external RPCs onto Loader/Registry/Invoker calls and
//! routes every call by its `X-Session-ID` header. See `spec.md` §4.5, §6.

mod error;
mod handlers;
pub mod wire;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use axum::routing::post;
use explorer_loader::Loader;
use explorer_session::SessionManager;

/// The façade's own fully-qualified service name, used as the `service_fqn`
/// segment of the Connect path template `/<service_fqn>/<method>`
/// (`spec.md` §6.1).
pub const SERVICE_FQN: &str = "catalog.v1.ExplorerService";

const SESSION_HEADER: &str = "x-session-id";

#[derive(Clone)]
pub struct FacadeState {
    pub sessions: SessionManager,
    pub loader: Arc<Loader>,
}

/// Builds the Axum router for the four RPCs. The caller is responsible for
/// serving it with an h2c-capable listener (`spec.md` §6.1); this crate
/// only describes the routes and their handlers.
pub fn router(state: FacadeState) -> Router {
    let load_protos_path = format!("/{SERVICE_FQN}/LoadProtos");
    let list_services_path = format!("/{SERVICE_FQN}/ListServices");
    let get_service_schema_path = format!("/{SERVICE_FQN}/GetServiceSchema");
    let invoke_grpc_path = format!("/{SERVICE_FQN}/InvokeGRPC");

    Router::new()
        .route(&load_protos_path, post(handlers::load_protos))
        .route(&list_services_path, post(handlers::list_services))
        .route(&get_service_schema_path, post(handlers::get_service_schema))
        .route(&invoke_grpc_path, post(handlers::invoke_grpc))
        .with_state(state)
}

/// Reads the incoming session identifier. Absent or unparseable is treated
/// identically to "empty" — `SessionManager::get_or_create` mints a fresh
/// session either way (`spec.md` §3, "Lifetime invariant").
pub(crate) fn session_id(headers: &HeaderMap) -> Option<String> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()).map(str::to_string)
}

/// Per-request discipline step 5 (`spec.md` §4.5): always echo the
/// effective session identifier back, regardless of whether the operation
/// itself succeeded.
pub(crate) fn with_session_header(id: &str, mut response: Response) -> Response {
    if let Ok(value) = HeaderValue::from_str(id) {
        response.headers_mut().insert(HeaderName::from_static("x-session-id"), value);
    } else {
        tracing::warn!(session_id = %id, "session id is not a valid header value");
    }
    response
}
