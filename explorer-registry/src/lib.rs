//! Maintains the descriptor index for one client session and answers
//! catalog/schema queries against it. See `spec.md` §4.2.

mod doc;
mod error;
mod projection;
mod schema;

pub use error::{LookupError, RegisterError};
pub use projection::{MethodInfo, ServiceInfo};
pub use prost_reflect::{MessageDescriptor, MethodDescriptor, ServiceDescriptor};
pub use prost_types::FileDescriptorSet;
pub use schema::MessageSchema;

use prost::Message;
use prost_reflect::DescriptorPool;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub files: usize,
    pub services: usize,
    pub messages: usize,
}

struct Inner {
    /// Raw file descriptors keyed by file name, the source of truth for
    /// idempotent re-registration (last write wins, no double counting).
    raw_files: HashMap<String, prost_types::FileDescriptorProto>,
    pool: DescriptorPool,
}

impl Default for Inner {
    fn default() -> Self {
        Self { raw_files: HashMap::new(), pool: DescriptorPool::new() }
    }
}

/// A single read/write lock protects all three conceptual mappings
/// (file-by-name, service-by-FQN, message-by-FQN); they're actually one
/// `DescriptorPool` rebuilt from `raw_files` on every `register`, which
/// keeps them trivially mutually consistent (invariant 1 in `spec.md` §3).
pub struct Registry {
    inner: RwLock<Inner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self { inner: RwLock::new(Inner::default()) }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `fds` into the held file set and rebuilds the descriptor pool.
    /// Re-registering a file replaces its entry; the rebuild either succeeds
    /// wholesale or leaves previously-registered state untouched.
    pub fn register(&self, fds: FileDescriptorSet) -> Result<(), RegisterError> {
        let mut inner = self.inner.write().unwrap();

        let mut candidate = inner.raw_files.clone();
        for file in fds.file {
            candidate.insert(file.name().to_string(), file);
        }

        let merged = FileDescriptorSet { file: candidate.values().cloned().collect() };
        let pool = DescriptorPool::from_file_descriptor_set(merged)
            .map_err(|e| RegisterError::Invalid(e.to_string()))?;

        inner.raw_files = candidate;
        inner.pool = pool;
        Ok(())
    }

    pub fn list_services(&self) -> Vec<ServiceInfo> {
        let inner = self.inner.read().unwrap();
        inner.pool.services().map(|s| ServiceInfo::project(&s)).collect()
    }

    pub fn get_service(&self, fqn: &str) -> Option<ServiceDescriptor> {
        self.inner.read().unwrap().pool.get_service_by_name(fqn)
    }

    pub fn has_service(&self, fqn: &str) -> bool {
        self.get_service(fqn).is_some()
    }

    pub fn get_method_descriptor(
        &self,
        service_fqn: &str,
        method_name: &str,
    ) -> Result<MethodDescriptor, LookupError> {
        let service = self
            .get_service(service_fqn)
            .ok_or_else(|| LookupError::ServiceNotFound(service_fqn.to_string()))?;

        service.methods().find(|m| m.name() == method_name).ok_or_else(|| {
            LookupError::MethodNotFound {
                service: service_fqn.to_string(),
                method: method_name.to_string(),
            }
        })
    }

    pub fn get_message_descriptor(&self, fqn: &str) -> Result<MessageDescriptor, LookupError> {
        self.inner
            .read()
            .unwrap()
            .pool
            .get_message_by_name(fqn)
            .ok_or_else(|| LookupError::MessageNotFound(fqn.to_string()))
    }

    /// Projects a service plus every message transitively reachable from its
    /// methods to the JSON-schema shape, serialized as strings keyed by
    /// fully-qualified message name (`spec.md` §4.2, §6.2).
    pub fn get_service_schema(
        &self,
        service_fqn: &str,
    ) -> Result<(ServiceInfo, HashMap<String, String>), LookupError> {
        let inner = self.inner.read().unwrap();
        let service = inner
            .pool
            .get_service_by_name(service_fqn)
            .ok_or_else(|| LookupError::ServiceNotFound(service_fqn.to_string()))?;

        let info = ServiceInfo::project(&service);
        let schemas = schema::collect_transitive_messages(service.methods());
        let serialized = schemas
            .into_iter()
            .map(|(fqn, schema)| {
                (fqn, serde_json::to_string(&schema).expect("schema serialization is infallible"))
            })
            .collect();

        Ok((info, serialized))
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.raw_files.clear();
        inner.pool = DescriptorPool::new();
    }

    /// An independent `Registry` whose containers don't alias this one's,
    /// but whose descriptor objects are the same cheaply-`Arc`-shared data
    /// (`DescriptorPool::clone` is a shallow clone).
    pub fn snapshot(&self) -> Registry {
        let inner = self.inner.read().unwrap();
        Registry {
            inner: RwLock::new(Inner { raw_files: inner.raw_files.clone(), pool: inner.pool.clone() }),
        }
    }

    pub fn marshal_binary(&self) -> Vec<u8> {
        let inner = self.inner.read().unwrap();
        let fds = FileDescriptorSet { file: inner.raw_files.values().cloned().collect() };
        fds.encode_to_vec()
    }

    pub fn unmarshal_binary(&self, bytes: &[u8]) -> Result<(), RegisterError> {
        let fds = FileDescriptorSet::decode(bytes)
            .map_err(|e| RegisterError::Invalid(format!("malformed descriptor bytes: {e}")))?;
        self.register(fds)
    }

    pub fn get_stats(&self) -> Stats {
        let inner = self.inner.read().unwrap();
        Stats {
            files: inner.raw_files.len(),
            services: inner.pool.services().count(),
            messages: inner.pool.all_messages().count(),
        }
    }
}
