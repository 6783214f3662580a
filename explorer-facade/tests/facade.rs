use std::net::SocketAddr;
use std::sync::Arc;

use explorer_facade::{FacadeState, router};
use explorer_loader::subprocess::fake::FakeSubprocess;
use explorer_loader::{Loader, LoaderConfig};
use explorer_session::SessionManager;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const ECHO_PROTO: &str = r#"
syntax = "proto3";
package explorer.test.v1;

message SayRequest {
  string sentence = 1;
}

message SayResponse {
  string sentence = 1;
}

service EchoService {
  rpc Say(SayRequest) returns (SayResponse);
}
"#;

/// Wires a real `FacadeState` whose Loader's `buf` subprocess is faked to
/// write the precompiled `ECHO_PROTO` descriptor set, and starts the router
/// on an ephemeral local port.
async fn spawn_facade() -> (SocketAddr, reqwest::Client) {
    let fds = explorer_test_support::compile_protos(&[("echo.proto", ECHO_PROTO)]);
    let encoded = {
        use prost::Message;
        fds.encode_to_vec()
    };

    let subprocess = FakeSubprocess::new(move |_program, args, _cwd| {
        let out_path = args[3];
        std::fs::write(out_path, &encoded).unwrap();
        Ok(explorer_loader::subprocess::SubprocessOutput::ok(""))
    });

    let state = FacadeState {
        sessions: SessionManager::new(explorer_session::SessionManagerConfig::default()),
        loader: Arc::new(Loader::new(Arc::new(subprocess), LoaderConfig::default())),
    };

    let app = router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, reqwest::Client::new())
}

fn url(addr: SocketAddr, method: &str) -> String {
    format!("http://{addr}/{}/{method}", explorer_facade::SERVICE_FQN)
}

/// The path loader only checks that the directory exists before shelling
/// out (the fake subprocess ignores its contents), so any real temp dir
/// works; it's dropped only after the request has been fully handled.
async fn load_protos(addr: SocketAddr, client: &reqwest::Client, session: Option<&str>) -> reqwest::Response {
    let dir = tempfile::tempdir().unwrap();
    let mut req =
        client.post(url(addr, "LoadProtos")).json(&json!({ "proto_path": dir.path().to_string_lossy() }));
    if let Some(session) = session {
        req = req.header("X-Session-ID", session);
    }
    req.send().await.unwrap()
}

#[tokio::test]
async fn load_then_list_returns_consistent_counts_and_mints_a_session() {
    let (addr, client) = spawn_facade().await;

    let response = load_protos(addr, &client, None).await;
    let session_id = response.headers().get("x-session-id").unwrap().to_str().unwrap().to_string();
    assert!(!session_id.is_empty());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["service_count"].as_i64().unwrap() >= 1);
    assert!(body["file_count"].as_i64().unwrap() >= 1);

    let list_response = client
        .post(url(addr, "ListServices"))
        .header("X-Session-ID", &session_id)
        .body("{}")
        .send()
        .await
        .unwrap();
    let list_body: Value = list_response.json().await.unwrap();
    let services = list_body["services"].as_array().unwrap();
    assert_eq!(services.len() as i64, body["service_count"].as_i64().unwrap());

    let method = &services[0]["methods"][0];
    assert!(!method["name"].as_str().unwrap().is_empty());
    assert!(!method["input_type"].as_str().unwrap().is_empty());
    assert!(!method["output_type"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_path_yields_success_false_but_still_mints_a_session() {
    let (addr, client) = spawn_facade().await;

    let response = client
        .post(url(addr, "LoadProtos"))
        .json(&json!({ "proto_path": "/definitely/not/a/real/path" }))
        .send()
        .await
        .unwrap();

    let session_id = response.headers().get("x-session-id").unwrap().to_str().unwrap().to_string();
    assert!(!session_id.is_empty());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn get_service_schema_matches_the_spec_shape() {
    let (addr, client) = spawn_facade().await;

    let load_response = load_protos(addr, &client, None).await;
    let session_id = load_response.headers().get("x-session-id").unwrap().to_str().unwrap().to_string();

    let response = client
        .post(url(addr, "GetServiceSchema"))
        .header("X-Session-ID", &session_id)
        .json(&json!({ "service_name": "explorer.test.v1.EchoService" }))
        .send()
        .await
        .unwrap();

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["service"]["name"], "explorer.test.v1.EchoService");

    let schemas = body["message_schemas"].as_object().unwrap();
    let request_schema: Value =
        serde_json::from_str(schemas["explorer.test.v1.SayRequest"].as_str().unwrap()).unwrap();
    assert_eq!(request_schema["title"], "SayRequest");
    assert_eq!(request_schema["type"], "object");
    assert_eq!(request_schema["properties"]["sentence"]["type"], "string");
}

#[tokio::test]
async fn get_service_schema_with_empty_name_is_a_transport_error() {
    let (addr, client) = spawn_facade().await;

    let response =
        client.post(url(addr, "GetServiceSchema")).json(&json!({ "service_name": "" })).send().await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invoke_grpc_with_missing_endpoint_is_a_transport_error() {
    let (addr, client) = spawn_facade().await;

    let response = client
        .post(url(addr, "InvokeGRPC"))
        .json(&json!({ "endpoint": "", "service": "x", "method": "y", "request_json": "{}" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invoke_grpc_round_trips_against_a_real_upstream() {
    let (addr, client) = spawn_facade().await;

    let load_response = load_protos(addr, &client, None).await;
    let session_id = load_response.headers().get("x-session-id").unwrap().to_str().unwrap().to_string();

    let upstream = explorer_test_service::spawn().await;

    let response = client
        .post(url(addr, "InvokeGRPC"))
        .header("X-Session-ID", &session_id)
        .json(&json!({
            "endpoint": upstream.to_string(),
            "service": "explorer.test.v1.EchoService",
            "method": "Say",
            "request_json": r#"{"sentence":"hi"}"#,
            "transport": "GRPC",
        }))
        .send()
        .await
        .unwrap();

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true, "response: {body}");
    let response_json: Value = serde_json::from_str(body["response_json"].as_str().unwrap()).unwrap();
    assert!(response_json["sentence"].as_str().unwrap().contains("hi"));
}

#[tokio::test]
async fn two_fresh_clients_get_different_sessions_and_do_not_see_each_other() {
    let (addr, client) = spawn_facade().await;

    let a = load_protos(addr, &client, None).await;
    let a_session = a.headers().get("x-session-id").unwrap().to_str().unwrap().to_string();

    let b_response = client
        .post(url(addr, "ListServices"))
        .body("{}")
        .send()
        .await
        .unwrap();
    let b_session = b_response.headers().get("x-session-id").unwrap().to_str().unwrap().to_string();
    assert_ne!(a_session, b_session);

    let b_body: Value = b_response.json().await.unwrap();
    assert_eq!(b_body["services"].as_array().unwrap().len(), 0);
}
