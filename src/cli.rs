use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::error::{InstallError, Result};
use crate::params::ModuleParam;
use crate::utils;

/// Default staging root for downloaded artifacts.
pub const DEFAULT_DOWNLOAD_DIR: &str = "/tmp/modinstall-downloads";

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "modinstall",
    version,
    about = "Install modules and binaries from GitHub repositories",
    long_about = None,
    group = clap::ArgGroup::new("target").required(true)
)]
pub struct Args {
    /// Repository to install from (e.g. https://github.com/acme/infra-modules)
    #[clap(long, value_name = "URL")]
    pub repo: String,

    /// Tag constraint to install; version ranges are resolved to a concrete
    /// release tag by the fetch tool. Absent tag and branch means the latest tag
    #[clap(long, value_name = "CONSTRAINT")]
    pub tag: Option<String>,

    /// Branch to install from instead of a tag; overrides --tag when both are given
    #[clap(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Module to install from the repository's modules/ directory
    #[clap(long, value_name = "NAME", group = "target")]
    pub module_name: Option<String>,

    /// Release asset to install as a binary; requires --tag
    #[clap(long, value_name = "NAME", group = "target", requires = "tag")]
    pub binary_name: Option<String>,

    /// Expected SHA256 checksum of the release asset (64 hex chars)
    #[clap(
        long,
        value_name = "HEX",
        requires = "binary_name",
        conflicts_with = "binary_sha512_checksum"
    )]
    pub binary_sha256_checksum: Option<String>,

    /// Expected SHA512 checksum of the release asset (128 hex chars)
    #[clap(long, value_name = "HEX", requires = "binary_name")]
    pub binary_sha512_checksum: Option<String>,

    /// Parameter passed to the module's install script as --key value (repeatable)
    #[clap(long = "module-param", value_name = "KEY=VALUE")]
    pub module_params: Vec<ModuleParam>,

    /// Directory used to stage downloads
    #[clap(long, value_name = "PATH", default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: String,
}

/// Version selector forwarded to the fetch tool. Both fields absent means
/// "latest tag"; when both are given the branch takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSelector {
    pub tag: Option<String>,
    pub branch: Option<String>,
}

impl VersionSelector {
    /// Human-readable form for logs and diagnostics.
    pub fn describe(&self) -> (String, String) {
        (
            self.tag.clone().unwrap_or_else(|| "latest".to_string()),
            self.branch.clone().unwrap_or_else(|| "none".to_string()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha512,
}

impl ChecksumAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Sha512 => "sha512",
        }
    }

    /// Expected length of the hex-encoded digest.
    fn hex_len(&self) -> usize {
        match self {
            ChecksumAlgorithm::Sha256 => 64,
            ChecksumAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected digest of a release asset, verified by the fetch tool before it
/// reports success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    pub value: String,
}

impl Checksum {
    pub fn parse(algorithm: ChecksumAlgorithm, value: String) -> Result<Self> {
        if value.len() != algorithm.hex_len() {
            return Err(InstallError::ChecksumFormat {
                algorithm: algorithm.to_string(),
                value,
                reason: format!("expected {} hex characters", algorithm.hex_len()),
            });
        }
        if hex::decode(&value).is_err() {
            return Err(InstallError::ChecksumFormat {
                algorithm: algorithm.to_string(),
                value,
                reason: "not a hex string".to_string(),
            });
        }
        Ok(Self { algorithm, value })
    }
}

/// What to install: exactly one of a module directory or a release binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallTarget {
    Module { name: String },
    Binary { name: String, checksum: Option<Checksum> },
}

/// Fully validated input for one installation run.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub repo: String,
    pub selector: VersionSelector,
    pub target: InstallTarget,
    pub module_params: Vec<ModuleParam>,
    pub download_dir: PathBuf,
}

impl Args {
    /// Convert parsed flags into a validated request. The flag combination
    /// rules are enforced by clap for command-line input; they are re-checked
    /// here as typed errors so programmatic construction cannot bypass them.
    pub fn into_request(self) -> Result<InstallRequest> {
        let target = match (self.module_name, self.binary_name) {
            (Some(name), None) => {
                if self.binary_sha256_checksum.is_some() || self.binary_sha512_checksum.is_some() {
                    return Err(InstallError::ChecksumRequiresBinary);
                }
                InstallTarget::Module { name }
            }
            (None, Some(name)) => {
                if self.tag.is_none() {
                    return Err(InstallError::TagRequired { binary: name });
                }
                let checksum = match (self.binary_sha256_checksum, self.binary_sha512_checksum) {
                    (Some(value), None) => Some(Checksum::parse(ChecksumAlgorithm::Sha256, value)?),
                    (None, Some(value)) => Some(Checksum::parse(ChecksumAlgorithm::Sha512, value)?),
                    (None, None) => None,
                    (Some(_), Some(_)) => return Err(InstallError::ChecksumConflict),
                };
                InstallTarget::Binary { name, checksum }
            }
            (Some(_), Some(_)) | (None, None) => return Err(InstallError::TargetSelection),
        };

        Ok(InstallRequest {
            repo: self.repo,
            selector: VersionSelector {
                tag: self.tag,
                branch: self.branch,
            },
            target,
            module_params: self.module_params,
            download_dir: utils::expand_tilde(&self.download_dir),
        })
    }
}
