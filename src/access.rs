use std::time::Duration;

use crate::config::CREDENTIAL_ENV_VAR;
use crate::error::{InstallError, Result};

/// Classifies whether a repository is reachable without credentials. A trait
/// so tests can stub reachability without touching the network.
pub trait AccessClassifier {
    fn is_public(&self, repo_url: &str) -> bool;
}

/// Probes a repository URL with an unauthenticated GET request.
pub struct RepoProbe {
    client: reqwest::blocking::Client,
}

impl RepoProbe {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("modinstall")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl AccessClassifier for RepoProbe {
    /// A successful, non-empty response means the repository is public.
    /// Any error (network, DNS, non-2xx) classifies it as non-public, which
    /// routes the run through the credential gate.
    fn is_public(&self, repo_url: &str) -> bool {
        match self.client.get(repo_url).send() {
            Ok(response) if response.status().is_success() => response
                .text()
                .map(|body| !body.trim().is_empty())
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Fail fast when a non-public repository is targeted without a token, so
/// the user gets an actionable error before any fetch is attempted.
pub fn require_credential(repo: &str, token: Option<&str>) -> Result<()> {
    match token {
        Some(token) if !token.trim().is_empty() => Ok(()),
        _ => Err(InstallError::CredentialMissing {
            repo: repo.to_string(),
            var: CREDENTIAL_ENV_VAR.to_string(),
        }),
    }
}
