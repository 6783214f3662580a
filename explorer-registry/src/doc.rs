use prost_reflect::{MethodDescriptor, ServiceDescriptor};
use prost_types::SourceCodeInfo;

/// Field numbers of `FileDescriptorProto` and `ServiceDescriptorProto` used
/// to build `SourceCodeInfo.Location.path` values, per the protobuf
/// descriptor.proto convention.
const FILE_SERVICE_FIELD: i32 = 6;
const SERVICE_METHOD_FIELD: i32 = 2;

/// The leading doc comment attached to a service, looked up via the file's
/// `SourceCodeInfo`. Returns an empty string if the compiler didn't emit
/// source info (it's opt-in) or the service has no comment.
pub fn service_doc(service: &ServiceDescriptor) -> String {
    let path = [FILE_SERVICE_FIELD, service.index() as i32];
    leading_comment(service.parent_file().file_descriptor_proto().source_code_info.as_ref(), &path)
}

/// Same as [`service_doc`] but for a method, nested one level under its
/// parent service.
pub fn method_doc(method: &MethodDescriptor) -> String {
    let service = method.parent_service();
    let path =
        [FILE_SERVICE_FIELD, service.index() as i32, SERVICE_METHOD_FIELD, method.index() as i32];
    leading_comment(service.parent_file().file_descriptor_proto().source_code_info.as_ref(), &path)
}

fn leading_comment(info: Option<&SourceCodeInfo>, path: &[i32]) -> String {
    let Some(info) = info else { return String::new() };
    info.location
        .iter()
        .find(|loc| loc.path == path)
        .and_then(|loc| loc.leading_comments.clone())
        .map(|c| c.trim().to_string())
        .unwrap_or_default()
}
