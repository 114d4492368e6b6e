use anyhow::{Result, bail};
use std::fmt;
use std::process::Command;
use std::str::FromStr;

/// Host CPU architecture as reported by `uname -m`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostArch {
    Arm64,
    Amd64,
    /// Anything we don't map to a build platform. Keeps the raw string for diagnostics.
    Unknown(String),
}

impl HostArch {
    /// Parses a raw machine string. Only the exact `arm64` identifier (Apple Silicon)
    /// selects an explicit arm64 build.
    pub fn from_machine(raw: &str) -> Self {
        match raw.trim() {
            "arm64" => Self::Arm64,
            "x86_64" | "amd64" => Self::Amd64,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Detects the host architecture.
    ///
    /// Runs `uname -m`; when that is unavailable falls back to the architecture
    /// the binary was compiled for.
    pub fn detect() -> Self {
        let output = Command::new("uname").arg("-m").output();

        match output {
            Ok(out) if out.status.success() => {
                Self::from_machine(&String::from_utf8_lossy(&out.stdout))
            }
            _ => Self::from_machine(std::env::consts::ARCH),
        }
    }

    /// Platform the primary build should target, if any.
    pub fn preferred_platform(&self) -> Option<Platform> {
        match self {
            Self::Arm64 => Some(Platform::LinuxArm64),
            Self::Amd64 | Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for HostArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arm64 => write!(f, "arm64"),
            Self::Amd64 => write!(f, "x86_64"),
            Self::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

/// Target platform passed to the engine's `--platform` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    LinuxArm64,
    LinuxAmd64,
}

impl Platform {
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::LinuxArm64 => "linux/arm64",
            Self::LinuxAmd64 => "linux/amd64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "linux/arm64" | "arm64" => Ok(Self::LinuxArm64),
            "linux/amd64" | "amd64" => Ok(Self::LinuxAmd64),
            other => bail!("unknown platform '{other}' (expected linux/amd64 or linux/arm64)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm64_selects_arm_platform() {
        let arch = HostArch::from_machine("arm64\n");
        assert_eq!(arch, HostArch::Arm64);
        assert_eq!(arch.preferred_platform(), Some(Platform::LinuxArm64));
    }

    #[test]
    fn test_x86_has_no_explicit_platform() {
        let arch = HostArch::from_machine("x86_64");
        assert_eq!(arch, HostArch::Amd64);
        assert_eq!(arch.preferred_platform(), None);
    }

    #[test]
    fn test_aarch64_is_not_treated_as_apple_silicon() {
        let arch = HostArch::from_machine("aarch64");
        assert_eq!(arch, HostArch::Unknown("aarch64".to_string()));
        assert_eq!(arch.preferred_platform(), None);
        assert_eq!(arch.to_string(), "aarch64");
    }

    #[test]
    fn test_platform_parsing() {
        assert_eq!("linux/amd64".parse::<Platform>().unwrap(), Platform::LinuxAmd64);
        assert_eq!("arm64".parse::<Platform>().unwrap(), Platform::LinuxArm64);
        assert!("windows/386".parse::<Platform>().is_err());
    }

    #[test]
    fn test_detect_does_not_panic() {
        let arch = HostArch::detect();
        assert!(!arch.to_string().is_empty());
    }
}
