/// Tunables for the Loader. Defaults match `spec.md`; overriding the tool
/// names is how tests (and operators without `buf`/`git` on `PATH` under
/// that exact name) can point at alternates.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub buf_bin: String,
    pub git_bin: String,
    pub default_reflection_timeout_secs: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            buf_bin: "buf".to_string(),
            git_bin: "git".to_string(),
            default_reflection_timeout_secs: 10.0,
        }
    }
}
