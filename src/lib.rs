//! # modinstall
//!
//! A one-shot installer for modules and binaries published in GitHub
//! repositories.
//!
//! ## Overview
//!
//! `modinstall` resolves a version selector (tag constraint or branch)
//! against a repository via the external `fetch` tool, then either runs a
//! module's `install.sh` entrypoint with translated parameters or places a
//! checksum-verified release binary into `/usr/local/bin`.
//!
//! ## Features
//!
//! - Module installs from the repository's `modules/` directory
//! - Binary installs from platform-suffixed release assets
//!   (`<name>_<os>_<arch>`), with optional SHA256/SHA512 verification
//! - Tag-constraint resolution delegated to the fetch tool
//! - Private repository support via `GITHUB_OAUTH_TOKEN`
//!
//! ## Usage
//!
//! ```bash
//! # Install a module at the latest tag
//! modinstall --repo https://github.com/acme/infra --module-name vpc
//!
//! # Install a module with parameters
//! modinstall --repo https://github.com/acme/infra --module-name vpc \
//!   --tag '~>0.1.0' --module-param user=deploy
//!
//! # Install a release binary
//! modinstall --repo https://github.com/acme/infra --binary-name vpcctl \
//!   --tag v0.1.0 --binary-sha256-checksum <64 hex chars>
//! ```

/// Command-line interface definitions and the validated install request
pub mod cli;

/// Process environment captured once at startup
pub mod config;

/// Error types and the crate-wide Result alias
pub mod error;

/// Repository reachability probe and credential gate
pub mod access;

/// Fetch collaborator interface, staging, and artifact resolution
pub mod fetch;

/// Core orchestration of one installation run
pub mod installer;

/// Module parameter parsing and flag translation
pub mod params;

/// Host operating system and architecture identification
pub mod platform;

/// Executable-bit and path helpers
pub mod utils;
