//! Produces a `FileDescriptorSet` from one of four source kinds: a local
//! proto directory, a shallow-cloned git repository, a schema-registry
//! module, or a live reflection-enabled endpoint. See [`Loader::load`].

mod config;
mod descriptor_info;
mod error;
mod git_loader;
mod module_loader;
mod path_loader;
mod reflection_loader;
pub mod source;
pub mod subprocess;

pub use config::LoaderConfig;
pub use descriptor_info::{DescriptorInfo, summarize};
pub use error::LoaderError;
pub use prost_types::FileDescriptorSet;
pub use source::{ReflectionOptions, Source};

use std::sync::Arc;
use subprocess::{RealSubprocess, Subprocess};

/// The dispatcher described in `spec.md` §4.1: routes a [`Source`] to its
/// acquisition strategy and returns a raw `FileDescriptorSet`. Holds no
/// state of its own besides its subprocess abstraction and tunables, so a
/// single `Loader` can be shared (by reference) across every session.
pub struct Loader {
    subprocess: Arc<dyn Subprocess>,
    config: LoaderConfig,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(Arc::new(RealSubprocess), LoaderConfig::default())
    }
}

impl Loader {
    pub fn new(subprocess: Arc<dyn Subprocess>, config: LoaderConfig) -> Self {
        Self { subprocess, config }
    }

    pub async fn load(&self, source: Source) -> Result<FileDescriptorSet, LoaderError> {
        let result = match &source {
            Source::Path(dir) => path_loader::load(self.subprocess.as_ref(), &self.config, dir).await,
            Source::Git(spec) => git_loader::load(self.subprocess.as_ref(), &self.config, spec).await,
            Source::Module(module) => {
                module_loader::load(self.subprocess.as_ref(), &self.config, module).await
            }
            Source::Reflection(endpoint, opts) => reflection_loader::load(endpoint, opts).await,
        };

        match &result {
            Ok(fds) => tracing::debug!(
                source = %source_label(&source),
                file_count = fds.file.len(),
                "loaded descriptor set"
            ),
            Err(err) => tracing::warn!(
                source = %source_label(&source),
                error = %err,
                "failed to load descriptor set"
            ),
        }

        result
    }
}

fn source_label(source: &Source) -> &'static str {
    match source {
        Source::Path(_) => "path",
        Source::Git(_) => "git",
        Source::Module(_) => "module",
        Source::Reflection(..) => "reflection",
    }
}
