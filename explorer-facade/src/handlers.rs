use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::error::FacadeError;
use crate::{FacadeState, session_id, with_session_header};
use crate::wire;

const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// `LoadProtos`: mint/resolve a session, delegate to the Loader, register
/// the result into the session's Registry. Loader and registration
/// failures are response-level (`spec.md` §4.5, §7); only an unset/multi-set
/// source `oneof` is a transport-level rejection.
pub async fn load_protos(
    State(state): State<FacadeState>,
    headers: HeaderMap,
    Json(req): Json<wire::LoadProtosRequest>,
) -> Response {
    let session = state.sessions.get_or_create(session_id(&headers).as_deref()).await;

    let source = match wire::source_from_request(&req) {
        Ok(source) => source,
        Err(message) => {
            return with_session_header(&session.id, FacadeError::InvalidArgument(message).into_response());
        }
    };

    let fds = match state.loader.load(source).await {
        Ok(fds) => fds,
        Err(err) => {
            let body = wire::LoadProtosResponse { error: err.to_string(), ..Default::default() };
            return with_session_header(&session.id, Json(body).into_response());
        }
    };

    let info = explorer_loader::summarize(&fds);

    if let Err(err) = session.registry.register(fds) {
        let body = wire::LoadProtosResponse { error: err.to_string(), ..Default::default() };
        return with_session_header(&session.id, Json(body).into_response());
    }

    let body = wire::LoadProtosResponse {
        success: true,
        error: String::new(),
        service_count: info.service_fqns.len() as i32,
        file_count: info.file_count as i32,
    };
    with_session_header(&session.id, Json(body).into_response())
}

/// `ListServices`: a plain snapshot of the session's Registry.
pub async fn list_services(State(state): State<FacadeState>, headers: HeaderMap) -> Response {
    let session = state.sessions.get_or_create(session_id(&headers).as_deref()).await;

    let services = session.registry.list_services().into_iter().map(wire::ServiceInfoWire::from).collect();
    let body = wire::ListServicesResponse { services };
    with_session_header(&session.id, Json(body).into_response())
}

/// `GetServiceSchema`: empty `service_name` is a caller-side contract
/// violation (transport-level); an unknown service name is a legitimate
/// "no", surfaced in `error` (`spec.md` §4.5).
pub async fn get_service_schema(
    State(state): State<FacadeState>,
    headers: HeaderMap,
    Json(req): Json<wire::GetServiceSchemaRequest>,
) -> Response {
    let session = state.sessions.get_or_create(session_id(&headers).as_deref()).await;

    if req.service_name.is_empty() {
        return with_session_header(
            &session.id,
            FacadeError::InvalidArgument("service_name is required".to_string()).into_response(),
        );
    }

    let body = match session.registry.get_service_schema(&req.service_name) {
        Ok((info, schemas)) => {
            wire::GetServiceSchemaResponse { service: Some(info.into()), message_schemas: schemas, error: String::new() }
        }
        Err(err) => wire::GetServiceSchemaResponse { error: err.to_string(), ..Default::default() },
    };
    with_session_header(&session.id, Json(body).into_response())
}

/// `InvokeGRPC`: resolve the method descriptor, substitute `"{}"` for an
/// empty request body, default the timeout, and delegate to the session's
/// Invoker. Streaming rejection happens inside the Invoker itself
/// (`spec.md` §4.3's pre-transport validation already covers it).
pub async fn invoke_grpc(
    State(state): State<FacadeState>,
    headers: HeaderMap,
    Json(req): Json<wire::InvokeGRPCRequest>,
) -> Response {
    let session = state.sessions.get_or_create(session_id(&headers).as_deref()).await;

    if req.endpoint.is_empty() || req.service.is_empty() || req.method.is_empty() {
        return with_session_header(
            &session.id,
            FacadeError::InvalidArgument("endpoint, service, and method are required".to_string())
                .into_response(),
        );
    }

    let method = match session.registry.get_method_descriptor(&req.service, &req.method) {
        Ok(method) => method,
        Err(err) => {
            let body = wire::InvokeGRPCResponse { error: err.to_string(), ..Default::default() };
            return with_session_header(&session.id, Json(body).into_response());
        }
    };

    let request_json = if req.request_json.is_empty() { "{}".to_string() } else { req.request_json };
    let timeout_seconds = if req.timeout_seconds > 0.0 { req.timeout_seconds } else { DEFAULT_TIMEOUT_SECS };

    let invoke_request = explorer_invoker::InvokeRequest {
        endpoint: req.endpoint,
        service_fqn: req.service,
        method_simple_name: req.method,
        request_json,
        use_tls: req.use_tls,
        tls_server_name: req.server_name,
        timeout_seconds,
        metadata: req.metadata,
        method,
        transport: req.transport.into(),
    };

    let response = session.invoker.invoke(invoke_request).await;
    let body: wire::InvokeGRPCResponse = response.into();
    with_session_header(&session.id, Json(body).into_response())
}
