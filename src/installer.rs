use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::access::{self, AccessClassifier, RepoProbe};
use crate::cli::{Args, Checksum, InstallRequest, InstallTarget};
use crate::config::Environment;
use crate::error::InstallError;
use crate::fetch::{ArtifactResolver, FetchBackend, FetchCli};
use crate::params;
use crate::platform::PlatformTag;
use crate::utils;

/// Install entrypoint expected at the root of every fetched module.
pub const MODULE_INSTALL_SCRIPT: &str = "install.sh";

/// Orchestrates one installation run: authorize, resolve, then execute a
/// module's install script or place a binary. Generic over the fetch
/// backend and the access classifier so tests can swap both.
pub struct Installer<B, P> {
    request: InstallRequest,
    env: Environment,
    resolver: ArtifactResolver<B>,
    probe: P,
}

impl Installer<FetchCli, RepoProbe> {
    pub fn new(args: Args) -> Result<Self> {
        let request = args.into_request()?;
        let env = Environment::capture();

        let backend = FetchCli::locate()?;
        let resolver =
            ArtifactResolver::new(backend, PlatformTag::identify(), env.install_dir.clone());
        let probe = RepoProbe::new()?;

        Ok(Self::from_parts(request, env, resolver, probe))
    }
}

impl<B: FetchBackend, P: AccessClassifier> Installer<B, P> {
    pub fn from_parts(
        request: InstallRequest,
        env: Environment,
        resolver: ArtifactResolver<B>,
        probe: P,
    ) -> Self {
        Self {
            request,
            env,
            resolver,
            probe,
        }
    }

    pub fn run(&self) -> Result<()> {
        self.authorize()?;

        match &self.request.target {
            InstallTarget::Module { name } => self.install_module(name)?,
            InstallTarget::Binary { name, checksum } => {
                self.install_binary(name, checksum.as_ref())?
            }
        }

        tracing::info!("Installation completed successfully");
        Ok(())
    }

    /// Gate on credentials before any fetch so the user gets an actionable
    /// error ahead of network calls on the artifact.
    fn authorize(&self) -> Result<()> {
        if self.probe.is_public(&self.request.repo) {
            tracing::debug!(
                "{} is publicly reachable; no credentials required",
                self.request.repo
            );
            return Ok(());
        }
        access::require_credential(&self.request.repo, self.env.github_token.as_deref())?;
        Ok(())
    }

    fn install_module(&self, name: &str) -> Result<()> {
        let (tag, branch) = self.request.selector.describe();
        tracing::info!(
            "Installing module '{}' from {} (tag: {}, branch: {})",
            name,
            self.request.repo,
            tag,
            branch
        );

        let staging = self.resolver.fetch_module(
            name,
            &self.request.selector,
            &self.request.download_dir,
            &self.request.repo,
        )?;

        if module_staging_is_empty(&staging)? {
            return Err(InstallError::EmptyModule {
                module: name.to_string(),
                repo: self.request.repo.clone(),
                tag,
                branch,
                path: staging.display().to_string(),
            }
            .into());
        }

        self.execute_module_script(name, &staging)
    }

    /// The install script comes from the fetched repository and runs
    /// unsandboxed with the invoking user's privileges. Containing it is
    /// out of scope; this step only derives its arguments and streams.
    fn execute_module_script(&self, name: &str, staging: &Path) -> Result<()> {
        let entrypoint = staging.join(MODULE_INSTALL_SCRIPT);
        utils::make_executable(&entrypoint)?;

        let script_args = params::to_args(&self.request.module_params);
        tracing::info!("Executing {}", entrypoint.display());

        let status = Command::new(&entrypoint).args(&script_args).status()?;
        if !status.success() {
            return Err(InstallError::ModuleExecution {
                module: name.to_string(),
                code: status.code().unwrap_or(1),
            }
            .into());
        }

        tracing::info!("Module '{}' installed", name);
        Ok(())
    }

    fn install_binary(&self, name: &str, checksum: Option<&Checksum>) -> Result<()> {
        let tag = self
            .request
            .selector
            .tag
            .as_deref()
            .ok_or_else(|| InstallError::TagRequired {
                binary: name.to_string(),
            })?;

        tracing::info!(
            "Installing binary '{}' from {} (tag: {})",
            name,
            self.request.repo,
            tag
        );

        let installed = self.resolver.fetch_binary(
            name,
            tag,
            &self.request.download_dir,
            &self.request.repo,
            checksum,
        )?;
        tracing::info!("Installed {}", installed.display());
        Ok(())
    }
}

/// A missing staging path counts as empty: the fetch reported success but
/// produced nothing usable either way.
fn module_staging_is_empty(path: &Path) -> std::io::Result<bool> {
    match fs::read_dir(path) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(err) => Err(err),
    }
}
