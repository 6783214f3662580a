use std::env;
use std::net::SocketAddr;

use explorer_loader::LoaderConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Reads the server's bind address and external-tool paths from environment
/// variables, falling back to the defaults documented in `SPEC_FULL.md` §6.
/// Flag parsing for *operator* input stays out of scope (`spec.md` §1), so
/// this is deliberately env-var-only rather than a `clap` surface.
pub struct ExplorerConfig {
    pub bind_addr: SocketAddr,
    pub loader: LoaderConfig,
}

impl ExplorerConfig {
    pub fn from_env() -> Result<Self, String> {
        let bind_addr_str =
            env::var("EXPLORER_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_str
            .parse()
            .map_err(|e| format!("invalid EXPLORER_BIND_ADDR '{bind_addr_str}': {e}"))?;

        let mut loader = LoaderConfig::default();
        if let Ok(buf_bin) = env::var("EXPLORER_BUF_BIN") {
            loader.buf_bin = buf_bin;
        }
        if let Ok(git_bin) = env::var("EXPLORER_GIT_BIN") {
            loader.git_bin = git_bin;
        }

        Ok(Self { bind_addr, loader })
    }
}
