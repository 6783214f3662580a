use std::path::Path;

use prost::Message;
use prost_types::FileDescriptorSet;

use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::subprocess::Subprocess;

/// Compiles a local directory into a `FileDescriptorSet` by shelling out to
/// the configured schema-compiler binary. The directory must exist and
/// contain a compilable module (a `buf.yaml`/`buf.gen.yaml` at the root, or
/// a layout the compiler otherwise recognizes); that recognition is the
/// compiler's job, not ours — we only check the path itself exists.
pub async fn load(
    subprocess: &dyn Subprocess,
    config: &LoaderConfig,
    dir: &Path,
) -> Result<FileDescriptorSet, LoaderError> {
    if !dir.is_dir() {
        return Err(LoaderError::SourceInvalid(format!(
            "proto path does not exist or is not a directory: {}",
            dir.display()
        )));
    }

    let temp_file = tempfile::NamedTempFile::new()?;
    let out_path = temp_file.path().to_path_buf();

    let dir_str = dir.to_string_lossy();
    let out_str = out_path.to_string_lossy();
    let args = ["build", &dir_str, "-o", &out_str];

    let output = subprocess.run(&config.buf_bin, &args, None).await?;

    if !output.success() {
        return Err(LoaderError::CompilerFailed(output.stderr));
    }

    let bytes = tokio::fs::read(&out_path).await?;
    // `temp_file` drops (and deletes) here regardless of the decode outcome.

    FileDescriptorSet::decode(bytes.as_slice())
        .map_err(|e| LoaderError::DecodeFailed(e.to_string()))
}
