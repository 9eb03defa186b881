use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cli::{Checksum, VersionSelector};
use crate::error::{InstallError, Result};
use crate::platform::{resolved_binary_name, PlatformTag};
use crate::utils;

/// Name of the external fetch tool looked up on PATH.
pub const FETCH_TOOL: &str = "fetch";

/// Repository subdirectory that holds installable modules.
pub const MODULES_SOURCE_ROOT: &str = "modules";

/// Narrow interface over the external fetch collaborator: resolve a version
/// selector against a repository and materialize either a source
/// subdirectory or a named release asset. Implementations own revision
/// resolution and checksum verification; the resolver owns staging.
pub trait FetchBackend {
    /// Place the contents of `source_path` (at the resolved tag/branch)
    /// into `dest`.
    fn fetch_source_path(
        &self,
        repo: &str,
        selector: &VersionSelector,
        source_path: &str,
        dest: &Path,
    ) -> Result<()>;

    /// Download the named release asset for `tag` into `dest_dir`,
    /// verifying `checksum` before reporting success when one is given.
    fn fetch_release_asset(
        &self,
        repo: &str,
        tag: &str,
        asset: &str,
        dest_dir: &Path,
        checksum: Option<&Checksum>,
    ) -> Result<()>;
}

/// Production backend: spawns the `fetch` tool. It reads the credential
/// environment variable itself, so no token plumbing happens here.
pub struct FetchCli {
    program: PathBuf,
}

impl FetchCli {
    /// Locate the fetch tool on PATH. Runs at startup so a missing
    /// dependency is reported before any network or filesystem work.
    pub fn locate() -> Result<Self> {
        let path_var = env::var_os("PATH").unwrap_or_default();
        for dir in env::split_paths(&path_var) {
            let candidate = dir.join(FETCH_TOOL);
            if utils::is_executable_file(&candidate) {
                return Ok(Self { program: candidate });
            }
        }
        Err(InstallError::DependencyMissing {
            tool: FETCH_TOOL.to_string(),
        })
    }

    fn run(&self, args: &[String], target: &str, repo: &str) -> Result<()> {
        tracing::debug!("Running {} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program).args(args).output()?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = if !stderr.trim().is_empty() {
            stderr.trim().to_string()
        } else if !stdout.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            format!("exit status {}", output.status.code().unwrap_or(1))
        };

        Err(InstallError::Fetch {
            target: target.to_string(),
            repo: repo.to_string(),
            message,
        })
    }
}

impl FetchBackend for FetchCli {
    fn fetch_source_path(
        &self,
        repo: &str,
        selector: &VersionSelector,
        source_path: &str,
        dest: &Path,
    ) -> Result<()> {
        let args = source_path_args(repo, selector, source_path, dest);
        self.run(&args, &format!("source path '{source_path}'"), repo)
    }

    fn fetch_release_asset(
        &self,
        repo: &str,
        tag: &str,
        asset: &str,
        dest_dir: &Path,
        checksum: Option<&Checksum>,
    ) -> Result<()> {
        let args = release_asset_args(repo, tag, asset, dest_dir, checksum);
        self.run(&args, &format!("release asset '{asset}'"), repo)
    }
}

/// Build the argument list for a source-path fetch. Tag and branch are both
/// forwarded when given; the fetch tool gives the branch precedence. Absent
/// both, it resolves the latest tag.
fn source_path_args(
    repo: &str,
    selector: &VersionSelector,
    source_path: &str,
    dest: &Path,
) -> Vec<String> {
    let mut args = vec![format!("--repo={repo}")];
    if let Some(tag) = &selector.tag {
        args.push(format!("--tag={tag}"));
    }
    if let Some(branch) = &selector.branch {
        args.push(format!("--branch={branch}"));
    }
    args.push(format!("--source-path=/{source_path}"));
    args.push(dest.display().to_string());
    args
}

/// Build the argument list for a release-asset fetch. Binary installs are
/// tag-only; the checksum, when given, is verified by the fetch tool.
fn release_asset_args(
    repo: &str,
    tag: &str,
    asset: &str,
    dest_dir: &Path,
    checksum: Option<&Checksum>,
) -> Vec<String> {
    let mut args = vec![
        format!("--repo={repo}"),
        format!("--tag={tag}"),
        format!("--release-asset={asset}"),
    ];
    if let Some(checksum) = checksum {
        args.push(format!("--release-asset-checksum={}", checksum.value));
        args.push(format!(
            "--release-asset-checksum-algo={}",
            checksum.algorithm
        ));
    }
    args.push(dest_dir.display().to_string());
    args
}

/// Guarantee an empty staging directory: parents created, leaf removed and
/// recreated. Population is the backend's job.
pub fn prepare_staging_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else if path.exists() {
        fs::remove_file(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}

/// Wraps a fetch backend with the host platform and the fixed installation
/// directory, exposing the two artifact-level operations the installer needs.
pub struct ArtifactResolver<B> {
    backend: B,
    platform: PlatformTag,
    install_dir: PathBuf,
}

impl<B: FetchBackend> ArtifactResolver<B> {
    pub fn new(backend: B, platform: PlatformTag, install_dir: PathBuf) -> Self {
        Self {
            backend,
            platform,
            install_dir,
        }
    }

    /// Fetch `modules/<module>` at the selected version into a fresh
    /// staging directory and return its path.
    pub fn fetch_module(
        &self,
        module: &str,
        selector: &VersionSelector,
        download_dir: &Path,
        repo: &str,
    ) -> Result<PathBuf> {
        let staging = download_dir.join(module);
        prepare_staging_dir(&staging)?;

        let source_path = format!("{MODULES_SOURCE_ROOT}/{module}");
        self.backend
            .fetch_source_path(repo, selector, &source_path, &staging)?;
        Ok(staging)
    }

    /// Download the platform-suffixed release asset for `binary`, then
    /// relocate it to the installation directory under the unsuffixed name
    /// with the execute bit set. Returns the installed path.
    pub fn fetch_binary(
        &self,
        binary: &str,
        tag: &str,
        download_dir: &Path,
        repo: &str,
        checksum: Option<&Checksum>,
    ) -> Result<PathBuf> {
        let resolved = resolved_binary_name(binary, &self.platform);
        tracing::debug!("Resolved release asset name: {resolved}");

        fs::create_dir_all(download_dir)?;
        let staged = download_dir.join(&resolved);
        if staged.exists() {
            fs::remove_file(&staged)?;
        }

        self.backend
            .fetch_release_asset(repo, tag, &resolved, download_dir, checksum)?;

        let dest = self.install_dir.join(binary);
        tracing::info!("Moving {} to {}", staged.display(), dest.display());

        // Copy-then-remove rather than rename: the staging directory and
        // the installation directory may sit on different filesystems.
        fs::create_dir_all(&self.install_dir)?;
        fs::copy(&staged, &dest)?;
        utils::make_executable(&dest)?;
        fs::remove_file(&staged)?;

        Ok(dest)
    }
}
