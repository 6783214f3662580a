use std::collections::HashMap;

use explorer_invoker::{InvokeRequest, Invoker, Transport};
use prost_reflect::DescriptorPool;

fn say_method() -> prost_reflect::MethodDescriptor {
    let pool = DescriptorPool::decode(explorer_test_service::FILE_DESCRIPTOR_SET)
        .expect("decode embedded descriptor set");
    pool.get_service_by_name("explorer.test.v1.EchoService")
        .expect("EchoService present")
        .methods()
        .find(|m| m.name() == "Say")
        .expect("Say method present")
}

#[tokio::test]
async fn unary_call_round_trips_through_json_codec() {
    let addr = explorer_test_service::spawn().await;
    let invoker = Invoker::new();

    let request = InvokeRequest {
        endpoint: addr.to_string(),
        service_fqn: "explorer.test.v1.EchoService".to_string(),
        method_simple_name: "Say".to_string(),
        request_json: r#"{"sentence":"hi"}"#.to_string(),
        use_tls: false,
        tls_server_name: None,
        timeout_seconds: 5.0,
        metadata: HashMap::new(),
        method: say_method(),
        transport: Transport::Grpc,
    };

    let response = invoker.invoke(request).await;

    assert!(response.success, "expected success, got {response:?}");
    let body: serde_json::Value = serde_json::from_str(&response.response_json).unwrap();
    assert_eq!(body["sentence"], "Hello! How can I help you today? (you said: hi)");
    assert_eq!(response.status_code, 0);
}

#[tokio::test]
async fn invalid_request_json_is_response_level_failure() {
    let addr = explorer_test_service::spawn().await;
    let invoker = Invoker::new();

    let request = InvokeRequest {
        endpoint: addr.to_string(),
        service_fqn: "explorer.test.v1.EchoService".to_string(),
        method_simple_name: "Say".to_string(),
        request_json: "not json".to_string(),
        use_tls: false,
        tls_server_name: None,
        timeout_seconds: 5.0,
        metadata: HashMap::new(),
        method: say_method(),
        transport: Transport::Grpc,
    };

    let response = invoker.invoke(request).await;

    assert!(!response.success);
    assert!(response.error_message.contains("invalid-request-json"));
}

#[tokio::test]
async fn unreachable_endpoint_is_response_level_failure() {
    let invoker = Invoker::new();

    let request = InvokeRequest {
        endpoint: "127.0.0.1:1".to_string(),
        service_fqn: "explorer.test.v1.EchoService".to_string(),
        method_simple_name: "Say".to_string(),
        request_json: r#"{"sentence":"hi"}"#.to_string(),
        use_tls: false,
        tls_server_name: None,
        timeout_seconds: 5.0,
        metadata: HashMap::new(),
        method: say_method(),
        transport: Transport::Grpc,
    };

    let response = invoker.invoke(request).await;

    assert!(!response.success);
    assert!(!response.error_message.is_empty());
}

#[tokio::test]
async fn empty_endpoint_is_rejected_before_any_dial() {
    let invoker = Invoker::new();

    let request = InvokeRequest {
        endpoint: String::new(),
        service_fqn: "explorer.test.v1.EchoService".to_string(),
        method_simple_name: "Say".to_string(),
        request_json: r#"{"sentence":"hi"}"#.to_string(),
        use_tls: false,
        tls_server_name: None,
        timeout_seconds: 5.0,
        metadata: HashMap::new(),
        method: say_method(),
        transport: Transport::Grpc,
    };

    let response = invoker.invoke(request).await;

    assert!(!response.success);
    assert!(response.error_message.contains("missing-field"));
}
