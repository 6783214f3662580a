//! Abstraction over invoking external tools (`buf`, `git`) as subprocesses.
//!
//! Production code shells out for real; tests inject a [`fake::FakeSubprocess`]
//! with a scripted handler so the Loader's decision logic can be exercised
//! without a `buf`/`git` binary on the test runner's `PATH`.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// The outcome of running one subprocess to completion.
#[derive(Debug, Clone)]
pub struct SubprocessOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub exit_code: i32,
}

impl SubprocessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self { stdout: stdout.into(), stderr: String::new(), exit_code: 0 }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self { stdout: Vec::new(), stderr: stderr.into(), exit_code }
    }
}

#[async_trait]
pub trait Subprocess: Send + Sync {
    /// Runs `program` with `args` in `cwd` (or the current directory if
    /// `None`), capturing stdout and stderr fully in memory. Never returns
    /// `Err` for a non-zero exit; that's surfaced via `exit_code`. `Err` is
    /// reserved for failing to even spawn the process (missing binary).
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> std::io::Result<SubprocessOutput>;
}

/// Real subprocess execution via `tokio::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSubprocess;

#[async_trait]
impl Subprocess for RealSubprocess {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> std::io::Result<SubprocessOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await?;
        Ok(SubprocessOutput {
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

pub mod fake {
    use super::*;
    use std::sync::Mutex;

    type Handler = Box<
        dyn Fn(&str, &[&str], Option<&Path>) -> std::io::Result<SubprocessOutput> + Send + Sync,
    >;

    /// A scripted `Subprocess` for tests. The handler closure receives the
    /// exact program/args/cwd the Loader would have passed to the real
    /// tool, so it can assert on them and, e.g., write the descriptor bytes
    /// a real `buf build -o <path>` invocation would have produced.
    pub struct FakeSubprocess {
        handler: Mutex<Handler>,
    }

    impl FakeSubprocess {
        pub fn new(
            handler: impl Fn(&str, &[&str], Option<&Path>) -> std::io::Result<SubprocessOutput>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            Self { handler: Mutex::new(Box::new(handler)) }
        }
    }

    #[async_trait]
    impl Subprocess for FakeSubprocess {
        async fn run(
            &self,
            program: &str,
            args: &[&str],
            cwd: Option<&Path>,
        ) -> std::io::Result<SubprocessOutput> {
            (self.handler.lock().unwrap())(program, args, cwd)
        }
    }
}
