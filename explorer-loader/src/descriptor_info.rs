use prost_types::FileDescriptorSet;

/// A flat, non-recursive summary of a raw `FileDescriptorSet`, used to
/// report counts back to the caller of `LoadProtos` before the descriptors
/// are handed to a Registry for full (nested-aware) indexing.
#[derive(Debug, Clone, Default)]
pub struct DescriptorInfo {
    pub file_count: usize,
    pub service_fqns: Vec<String>,
    pub message_fqns: Vec<String>,
    pub enum_fqns: Vec<String>,
}

pub fn summarize(fds: &FileDescriptorSet) -> DescriptorInfo {
    let mut info = DescriptorInfo { file_count: fds.file.len(), ..Default::default() };

    for file in &fds.file {
        let package = file.package().to_string();
        let prefix = |name: &str| {
            if package.is_empty() { name.to_string() } else { format!("{package}.{name}") }
        };

        for service in &file.service {
            info.service_fqns.push(prefix(service.name()));
        }
        for message in &file.message_type {
            info.message_fqns.push(prefix(message.name()));
        }
        for en in &file.enum_type {
            info.enum_fqns.push(prefix(en.name()));
        }
    }

    info
}
