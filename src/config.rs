use std::env;
use std::path::PathBuf;

/// Environment variable holding the token used for non-public repositories.
/// The fetch tool reads it from the process environment itself.
pub const CREDENTIAL_ENV_VAR: &str = "GITHUB_OAUTH_TOKEN";

/// Fixed installation directory for binaries; assumed to be on PATH.
pub const DEFAULT_INSTALL_DIR: &str = "/usr/local/bin";

/// Process environment captured once at startup and threaded through the
/// pipeline, instead of ad-hoc reads scattered across the run.
#[derive(Debug, Clone)]
pub struct Environment {
    pub github_token: Option<String>,
    pub install_dir: PathBuf,
}

impl Environment {
    pub fn capture() -> Self {
        Self {
            github_token: env::var(CREDENTIAL_ENV_VAR)
                .ok()
                .filter(|token| !token.trim().is_empty()),
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
        }
    }
}
