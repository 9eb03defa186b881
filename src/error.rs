use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("exactly one of --module-name or --binary-name must be given")]
    TargetSelection,

    #[error("--binary-sha256-checksum and --binary-sha512-checksum are mutually exclusive")]
    ChecksumConflict,

    #[error("checksum flags apply only to binary installs")]
    ChecksumRequiresBinary,

    #[error("invalid {algorithm} checksum '{value}': {reason}")]
    ChecksumFormat {
        algorithm: String,
        value: String,
        reason: String,
    },

    #[error("a release tag is required to install binary '{binary}'")]
    TagRequired { binary: String },

    #[error("required tool '{tool}' was not found on PATH. Install it and retry")]
    DependencyMissing { tool: String },

    #[error("repository {repo} is not publicly reachable and {var} is not set. Export a token with access to the repository and retry")]
    CredentialMissing { repo: String, var: String },

    #[error("failed to fetch {target} from {repo}: {message}")]
    Fetch {
        target: String,
        repo: String,
        message: String,
    },

    #[error("module '{module}' from {repo} (tag: {tag}, branch: {branch}) produced no files in {path}")]
    EmptyModule {
        module: String,
        repo: String,
        tag: String,
        branch: String,
        path: String,
    },

    #[error("install script for module '{module}' exited with status {code}")]
    ModuleExecution { module: String, code: i32 },
}

pub type Result<T> = std::result::Result<T, InstallError>;
