use prost_types::FileDescriptorSet;

use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::path_loader;
use crate::subprocess::Subprocess;

/// Materializes a `registry/owner/module` reference to a scratch directory
/// via the schema-compiler's `export` subcommand, then delegates to the
/// path loader. Both the exported directory and the compiled descriptor
/// file are removed on every exit path.
pub async fn load(
    subprocess: &dyn Subprocess,
    config: &LoaderConfig,
    module: &str,
) -> Result<FileDescriptorSet, LoaderError> {
    let temp_dir = tempfile::tempdir()?;
    let dest = temp_dir.path().to_path_buf();
    let dest_str = dest.to_string_lossy();

    let args = ["export", module, "-o", &dest_str];
    let output = subprocess.run(&config.buf_bin, &args, None).await?;

    if !output.success() {
        return Err(LoaderError::SourceUnreachable(format!(
            "failed to export module '{module}': {}",
            output.stderr
        )));
    }

    path_loader::load(subprocess, config, &dest).await
    // `temp_dir` drops here on every exit path; `path_loader::load` already
    // cleans up the descriptor tempfile it creates internally.
}
