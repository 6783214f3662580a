use prost_types::FileDescriptorSet;

use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::path_loader;
use crate::subprocess::Subprocess;

/// Shallow-clones `host/owner/repo[/subdir]` into a scratch directory and
/// delegates to the path loader. The temp directory is removed on every
/// exit path, success or failure.
pub async fn load(
    subprocess: &dyn Subprocess,
    config: &LoaderConfig,
    spec: &str,
) -> Result<FileDescriptorSet, LoaderError> {
    let (clone_url, subdir) = parse_repo_spec(spec)?;

    let temp_dir = tempfile::tempdir()?;
    let dest = temp_dir.path().to_path_buf();
    let dest_str = dest.to_string_lossy();

    let args = ["clone", "--depth", "1", &clone_url, &dest_str];
    let output = subprocess.run(&config.git_bin, &args, None).await?;

    if !output.success() {
        return Err(LoaderError::SourceUnreachable(format!(
            "git clone of '{clone_url}' failed: {}",
            output.stderr
        )));
    }

    let build_dir = match &subdir {
        Some(sub) => dest.join(sub),
        None => dest.clone(),
    };

    path_loader::load(subprocess, config, &build_dir).await
    // `temp_dir` drops (recursively removing the clone) here regardless of
    // the build outcome.
}

fn parse_repo_spec(spec: &str) -> Result<(String, Option<String>), LoaderError> {
    let mut parts = spec.splitn(4, '/');
    let host = parts.next().filter(|s| !s.is_empty());
    let owner = parts.next().filter(|s| !s.is_empty());
    let repo = parts.next().filter(|s| !s.is_empty());
    let subdir = parts.next().map(|s| s.to_string());

    let (host, owner, repo) = match (host, owner, repo) {
        (Some(h), Some(o), Some(r)) => (h, o, r),
        _ => {
            return Err(LoaderError::SourceInvalid(format!(
                "expected 'host/owner/repo[/subdir]', got '{spec}'"
            )));
        }
    };

    Ok((format!("https://{host}/{owner}/{repo}.git"), subdir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repo_without_subdir() {
        let (url, sub) = parse_repo_spec("github.com/acme/widgets").unwrap();
        assert_eq!(url, "https://github.com/acme/widgets.git");
        assert_eq!(sub, None);
    }

    #[test]
    fn parses_repo_with_subdir() {
        let (url, sub) = parse_repo_spec("github.com/acme/widgets/proto").unwrap();
        assert_eq!(url, "https://github.com/acme/widgets.git");
        assert_eq!(sub.as_deref(), Some("proto"));
    }

    #[test]
    fn rejects_incomplete_spec() {
        assert!(parse_repo_spec("github.com/acme").is_err());
    }
}
