use std::path::PathBuf;

/// Options accompanying a `reflection_endpoint` source.
#[derive(Debug, Clone, Default)]
pub struct ReflectionOptions {
    pub use_tls: bool,
    pub server_name: Option<String>,
    /// Connect timeout; `None` means the Loader's default (10s) applies.
    pub timeout_seconds: Option<f64>,
}

/// The tagged variant over the four acquisition strategies. This is the
/// Rust-native stand-in for the wire `oneof source` in `spec.md` §6.2 —
/// constructing one already guarantees exactly one arm is set, so the
/// "reject if unset or multiple arms set" validation lives entirely at the
/// wire-decoding boundary in the Façade, not here.
#[derive(Debug, Clone)]
pub enum Source {
    /// A local directory containing a compilable proto module.
    Path(PathBuf),
    /// `host/owner/repo[/subdir]`.
    Git(String),
    /// `registry/owner/module`.
    Module(String),
    /// `host:port` of a live reflection-enabled server.
    Reflection(String, ReflectionOptions),
}
