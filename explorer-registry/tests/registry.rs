use explorer_registry::{LookupError, Registry};
use explorer_test_support::compile_protos;

const GREETER_PROTO: &str = r#"
syntax = "proto3";
package explorer.catalog.v1;

// Address embedded in a greeting request.
message Address {
  string city = 1;
  string country = 2;
}

// A request to greet someone.
message GreetRequest {
  string name = 1;
  Address address = 2;
}

message GreetResponse {
  string sentence = 1;
}

// Greets people politely.
service Greeter {
  // Greet says hello to one person.
  rpc Greet(GreetRequest) returns (GreetResponse);
}
"#;

fn sample_descriptors() -> prost_types::FileDescriptorSet {
    compile_protos(&[("greeter.proto", GREETER_PROTO)])
}

#[test]
fn register_then_list_services_reflects_descriptors() {
    let registry = Registry::new();
    registry.register(sample_descriptors()).expect("register should succeed");

    let services = registry.list_services();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "explorer.catalog.v1.Greeter");
    assert_eq!(services[0].methods.len(), 1);
    assert_eq!(services[0].methods[0].name, "Greet");
    assert_eq!(services[0].methods[0].input_type, "explorer.catalog.v1.GreetRequest");
}

#[test]
fn re_registering_same_file_is_idempotent() {
    let registry = Registry::new();
    let fds = sample_descriptors();

    registry.register(fds.clone()).unwrap();
    let first = registry.get_stats();

    registry.register(fds).unwrap();
    let second = registry.get_stats();

    assert_eq!(first, second);
    assert_eq!(registry.list_services().len(), 1);
}

#[test]
fn service_schema_closure_includes_nested_message_types() {
    let registry = Registry::new();
    registry.register(sample_descriptors()).unwrap();

    let (info, schemas) = registry.get_service_schema("explorer.catalog.v1.Greeter").unwrap();
    assert_eq!(info.name, "explorer.catalog.v1.Greeter");

    assert!(schemas.contains_key("explorer.catalog.v1.GreetRequest"));
    assert!(schemas.contains_key("explorer.catalog.v1.GreetResponse"));
    assert!(schemas.contains_key("explorer.catalog.v1.Address"));

    let request_schema: serde_json::Value =
        serde_json::from_str(&schemas["explorer.catalog.v1.GreetRequest"]).unwrap();
    assert_eq!(request_schema["properties"]["address"]["$ref"], "explorer.catalog.v1.Address");
    assert_eq!(request_schema["properties"]["name"]["type"], "string");
}

#[test]
fn unknown_service_lookup_is_not_found() {
    let registry = Registry::new();
    registry.register(sample_descriptors()).unwrap();

    let err = registry.get_method_descriptor("does.not.Exist", "Anything").unwrap_err();
    assert_eq!(err, LookupError::ServiceNotFound("does.not.Exist".to_string()));
}

#[test]
fn unknown_method_lookup_is_not_found() {
    let registry = Registry::new();
    registry.register(sample_descriptors()).unwrap();

    let err = registry.get_method_descriptor("explorer.catalog.v1.Greeter", "Nope").unwrap_err();
    assert_eq!(
        err,
        LookupError::MethodNotFound {
            service: "explorer.catalog.v1.Greeter".to_string(),
            method: "Nope".to_string(),
        }
    );
}

#[test]
fn clear_empties_the_registry() {
    let registry = Registry::new();
    registry.register(sample_descriptors()).unwrap();
    assert!(registry.has_service("explorer.catalog.v1.Greeter"));

    registry.clear();

    assert!(!registry.has_service("explorer.catalog.v1.Greeter"));
    assert_eq!(registry.get_stats().files, 0);
}

#[test]
fn marshal_then_unmarshal_round_trips_into_a_fresh_registry() {
    let original = Registry::new();
    original.register(sample_descriptors()).unwrap();
    let bytes = original.marshal_binary();

    let restored = Registry::new();
    restored.unmarshal_binary(&bytes).unwrap();

    assert_eq!(restored.get_stats(), original.get_stats());
    assert!(restored.has_service("explorer.catalog.v1.Greeter"));
}

#[test]
fn snapshot_is_independent_of_later_mutation() {
    let registry = Registry::new();
    registry.register(sample_descriptors()).unwrap();

    let snapshot = registry.snapshot();
    registry.clear();

    assert!(!registry.has_service("explorer.catalog.v1.Greeter"));
    assert!(snapshot.has_service("explorer.catalog.v1.Greeter"));
}

#[test]
fn doc_comments_are_extracted_for_services_and_methods() {
    let registry = Registry::new();
    registry.register(sample_descriptors()).unwrap();

    let services = registry.list_services();
    let greeter = &services[0];
    assert!(greeter.documentation.contains("Greets people politely"));
    assert!(greeter.methods[0].documentation.contains("Greet says hello"));
}
