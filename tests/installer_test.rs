//! End-to-end runs of the installer with the fetch collaborator and the
//! access classifier swapped for test doubles.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use modinstall::access::AccessClassifier;
use modinstall::cli::{Checksum, InstallRequest, InstallTarget, VersionSelector};
use modinstall::config::Environment;
use modinstall::error::{InstallError, Result as InstallResult};
use modinstall::fetch::{ArtifactResolver, FetchBackend};
use modinstall::installer::Installer;
use modinstall::platform::{Arch, PlatformTag};

struct StubProbe {
    public: bool,
}

impl AccessClassifier for StubProbe {
    fn is_public(&self, _repo_url: &str) -> bool {
        self.public
    }
}

/// Records invocations without touching the filesystem.
struct CountingBackend {
    calls: Arc<AtomicUsize>,
}

impl FetchBackend for CountingBackend {
    fn fetch_source_path(
        &self,
        _repo: &str,
        _selector: &VersionSelector,
        _source_path: &str,
        _dest: &Path,
    ) -> InstallResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn fetch_release_asset(
        &self,
        _repo: &str,
        _tag: &str,
        _asset: &str,
        _dest_dir: &Path,
        _checksum: Option<&Checksum>,
    ) -> InstallResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Populates staging with the given files on module fetches and writes a
/// fixed payload on asset fetches.
struct WritingBackend {
    files: Vec<(&'static str, String)>,
}

impl FetchBackend for WritingBackend {
    fn fetch_source_path(
        &self,
        _repo: &str,
        _selector: &VersionSelector,
        _source_path: &str,
        dest: &Path,
    ) -> InstallResult<()> {
        for (name, contents) in &self.files {
            fs::write(dest.join(name), contents)?;
        }
        Ok(())
    }

    fn fetch_release_asset(
        &self,
        _repo: &str,
        _tag: &str,
        asset: &str,
        dest_dir: &Path,
        _checksum: Option<&Checksum>,
    ) -> InstallResult<()> {
        fs::write(dest_dir.join(asset), b"\x7fELF payload")?;
        Ok(())
    }
}

const REPO: &str = "https://github.com/acme/infra";

fn linux_amd64() -> PlatformTag {
    PlatformTag {
        os: "linux".to_string(),
        arch: Arch::Amd64,
    }
}

fn environment(install_dir: PathBuf, token: Option<&str>) -> Environment {
    Environment {
        github_token: token.map(str::to_string),
        install_dir,
    }
}

fn module_request(module: &str, download_dir: PathBuf, params: &[&str]) -> InstallRequest {
    InstallRequest {
        repo: REPO.to_string(),
        selector: VersionSelector {
            tag: Some("v0.1.0".to_string()),
            branch: None,
        },
        target: InstallTarget::Module {
            name: module.to_string(),
        },
        module_params: params.iter().map(|p| p.parse().unwrap()).collect(),
        download_dir,
    }
}

fn binary_request(binary: &str, tag: Option<&str>, download_dir: PathBuf) -> InstallRequest {
    InstallRequest {
        repo: REPO.to_string(),
        selector: VersionSelector {
            tag: tag.map(str::to_string),
            branch: None,
        },
        target: InstallTarget::Binary {
            name: binary.to_string(),
            checksum: None,
        },
        module_params: Vec::new(),
        download_dir,
    }
}

fn installer<B: FetchBackend>(
    request: InstallRequest,
    env: Environment,
    backend: B,
    public: bool,
) -> Installer<B, StubProbe> {
    let install_dir = env.install_dir.clone();
    let resolver = ArtifactResolver::new(backend, linux_amd64(), install_dir);
    Installer::from_parts(request, env, resolver, StubProbe { public })
}

#[test]
fn test_private_repo_without_token_fails_before_fetch() {
    let dir = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let result = installer(
        module_request("vpc", dir.path().join("downloads"), &[]),
        environment(dir.path().join("bin"), None),
        CountingBackend {
            calls: calls.clone(),
        },
        false,
    )
    .run();

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InstallError>(),
        Some(InstallError::CredentialMissing { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "fetch must never run");
}

#[test]
fn test_private_repo_with_token_reaches_fetch() {
    let dir = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    // The counting backend populates nothing, so the run still fails later
    // with an empty module; the point is that fetch was attempted.
    let result = installer(
        module_request("vpc", dir.path().join("downloads"), &[]),
        environment(dir.path().join("bin"), Some("ghp_token")),
        CountingBackend {
            calls: calls.clone(),
        },
        false,
    )
    .run();

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_module_fetch_fails_with_diagnostic() {
    let dir = TempDir::new().unwrap();

    let result = installer(
        module_request("vpc", dir.path().join("downloads"), &[]),
        environment(dir.path().join("bin"), None),
        WritingBackend { files: Vec::new() },
        true,
    )
    .run();

    let err = result.unwrap_err();
    match err.downcast_ref::<InstallError>() {
        Some(InstallError::EmptyModule {
            module,
            repo,
            tag,
            branch,
            ..
        }) => {
            assert_eq!(module, "vpc");
            assert_eq!(repo, REPO);
            assert_eq!(tag, "v0.1.0");
            assert_eq!(branch, "none");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_binary_install_is_executable_and_unsuffixed() {
    let dir = TempDir::new().unwrap();
    let bin_dir = dir.path().join("bin");

    installer(
        binary_request("vpcctl", Some("v0.1.0"), dir.path().join("downloads")),
        environment(bin_dir.clone(), None),
        WritingBackend { files: Vec::new() },
        true,
    )
    .run()
    .unwrap();

    let installed = bin_dir.join("vpcctl");
    assert!(installed.exists());
    assert!(!bin_dir.join("vpcctl_linux_amd64").exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&installed).unwrap().permissions().mode();
        assert!(mode & 0o111 != 0);
    }
}

#[test]
fn test_binary_install_without_tag_is_rejected() {
    let dir = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let result = installer(
        binary_request("vpcctl", None, dir.path().join("downloads")),
        environment(dir.path().join("bin"), None),
        CountingBackend {
            calls: calls.clone(),
        },
        true,
    )
    .run();

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InstallError>(),
        Some(InstallError::TagRequired { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
#[cfg(unix)]
fn test_module_entrypoint_runs_with_translated_params() {
    let dir = TempDir::new().unwrap();
    let script = "#!/bin/sh\nprintf '%s ' \"$@\" > \"$(dirname \"$0\")/args.txt\"\n";

    installer(
        module_request(
            "vpc",
            dir.path().join("downloads"),
            &["user=deploy", "version=1.2.3"],
        ),
        environment(dir.path().join("bin"), None),
        WritingBackend {
            files: vec![("install.sh", script.to_string())],
        },
        true,
    )
    .run()
    .unwrap();

    let recorded = fs::read_to_string(dir.path().join("downloads/vpc/args.txt")).unwrap();
    assert_eq!(recorded.trim(), "--user deploy --version 1.2.3");
}

#[test]
#[cfg(unix)]
fn test_failing_module_entrypoint_propagates_status() {
    let dir = TempDir::new().unwrap();
    let script = "#!/bin/sh\nexit 3\n";

    let result = installer(
        module_request("vpc", dir.path().join("downloads"), &[]),
        environment(dir.path().join("bin"), None),
        WritingBackend {
            files: vec![("install.sh", script.to_string())],
        },
        true,
    )
    .run();

    let err = result.unwrap_err();
    match err.downcast_ref::<InstallError>() {
        Some(InstallError::ModuleExecution { module, code }) => {
            assert_eq!(module, "vpc");
            assert_eq!(*code, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
#[cfg(unix)]
fn test_rerun_leaves_only_second_runs_contents() {
    let dir = TempDir::new().unwrap();
    let downloads = dir.path().join("downloads");
    let noop = "#!/bin/sh\nexit 0\n";

    installer(
        module_request("vpc", downloads.clone(), &[]),
        environment(dir.path().join("bin"), None),
        WritingBackend {
            files: vec![("install.sh", noop.to_string()), ("first.tf", "a".to_string())],
        },
        true,
    )
    .run()
    .unwrap();
    assert!(downloads.join("vpc/first.tf").exists());

    installer(
        module_request("vpc", downloads.clone(), &[]),
        environment(dir.path().join("bin"), None),
        WritingBackend {
            files: vec![
                ("install.sh", noop.to_string()),
                ("second.tf", "b".to_string()),
            ],
        },
        true,
    )
    .run()
    .unwrap();

    assert!(!downloads.join("vpc/first.tf").exists());
    assert!(downloads.join("vpc/second.tf").exists());
}
