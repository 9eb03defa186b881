use std::fmt;

/// CPU architecture tag embedded in release asset names.
///
/// Classification works on substrings of the raw machine string, in order:
/// "64" wins over "arm", so aarch64 hosts resolve to `Amd64`. Unrecognized
/// machines classify as `Unknown`, which renders as an empty tag in asset
/// names rather than failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    I386,
    Arm,
    Unknown,
}

impl Arch {
    pub fn classify(machine: &str) -> Self {
        if machine.contains("64") {
            Arch::Amd64
        } else if machine.contains("386") {
            Arch::I386
        } else if machine.contains("arm") {
            Arch::Arm
        } else {
            Arch::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::I386 => "386",
            Arch::Arm => "arm",
            Arch::Unknown => "",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system and architecture of the host, derived once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTag {
    pub os: String,
    pub arch: Arch,
}

impl PlatformTag {
    /// Identify the current host. Never fails; unrecognized architectures
    /// produce an empty tag and a warning.
    pub fn identify() -> Self {
        let os = kernel_name(std::env::consts::OS);
        let arch = Arch::classify(std::env::consts::ARCH);
        if arch == Arch::Unknown {
            tracing::warn!(
                "unrecognized machine architecture '{}'; release asset names will carry an empty architecture tag",
                std::env::consts::ARCH
            );
        }
        Self { os, arch }
    }
}

/// Lowercased kernel name as used in release asset conventions.
fn kernel_name(os: &str) -> String {
    match os {
        "macos" => "darwin".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

/// Release assets are published as `<name>_<os>_<arch>`.
pub fn resolved_binary_name(binary: &str, platform: &PlatformTag) -> String {
    format!("{}_{}_{}", binary, platform.os, platform.arch)
}
