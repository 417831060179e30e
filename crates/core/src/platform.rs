//! Platform identification for selecting a downloadable tool build.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Name of the verification tool, shared by release assets and binaries.
pub const TOOL_NAME: &str = "c2patool";

/// Platform identifier combining OS and architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Get the current platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] when the process runs on an OS or
    /// architecture without a published tool build.
    pub fn current() -> Result<Self> {
        let os = Os::parse(std::env::consts::OS);
        let arch = Arch::parse(std::env::consts::ARCH);
        match (os, arch) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(Error::unsupported_platform(
                std::env::consts::OS,
                std::env::consts::ARCH,
            )),
        }
    }

    /// Release target identifiers acceptable for this platform, most specific first.
    ///
    /// Linux prefers the statically linked musl build so the binary does not
    /// depend on the host's glibc version.
    #[must_use]
    pub fn target_identifiers(&self) -> Vec<String> {
        let arch = self.arch.triple_prefix();
        match self.os {
            Os::Linux => vec![
                format!("{arch}-unknown-linux-musl"),
                format!("{arch}-unknown-linux-gnu"),
            ],
            Os::Darwin => vec![
                "universal-apple-darwin".to_string(),
                format!("{arch}-apple-darwin"),
            ],
            Os::Windows => vec![format!("{arch}-pc-windows-msvc")],
        }
    }

    /// Loose platform hint used when no target identifier matches.
    #[must_use]
    pub fn platform_hint(&self) -> &'static str {
        match self.os {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
        }
    }

    /// File name of the tool binary on this platform.
    #[must_use]
    pub fn binary_name(&self) -> &'static str {
        self.os.binary_name()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "darwin" | "macos" => Some(Self::Darwin),
            "windows" | "win32" => Some(Self::Windows),
            _ => None,
        }
    }

    /// File name of the tool binary on this OS.
    #[must_use]
    pub fn binary_name(self) -> &'static str {
        match self {
            Self::Windows => "c2patool.exe",
            Self::Linux | Self::Darwin => TOOL_NAME,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Darwin => write!(f, "darwin"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Some(Self::X64),
            "arm64" | "aarch64" => Some(Self::Arm64),
            _ => None,
        }
    }

    /// Architecture component of a Rust target triple.
    #[must_use]
    pub fn triple_prefix(self) -> &'static str {
        match self {
            Self::X64 => "x86_64",
            Self::Arm64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X64 => write!(f, "x64"),
            Self::Arm64 => write!(f, "arm64"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_arm64_prefers_musl() {
        let platform = Platform::new(Os::Linux, Arch::Arm64);
        assert_eq!(
            platform.target_identifiers(),
            vec!["aarch64-unknown-linux-musl", "aarch64-unknown-linux-gnu"]
        );
    }

    #[test]
    fn test_linux_x64_identifiers() {
        let platform = Platform::new(Os::Linux, Arch::X64);
        assert_eq!(
            platform.target_identifiers(),
            vec!["x86_64-unknown-linux-musl", "x86_64-unknown-linux-gnu"]
        );
    }

    #[test]
    fn test_darwin_prefers_universal() {
        let platform = Platform::new(Os::Darwin, Arch::Arm64);
        assert_eq!(
            platform.target_identifiers(),
            vec!["universal-apple-darwin", "aarch64-apple-darwin"]
        );
    }

    #[test]
    fn test_windows_identifiers() {
        let platform = Platform::new(Os::Windows, Arch::X64);
        assert_eq!(platform.target_identifiers(), vec!["x86_64-pc-windows-msvc"]);
        assert_eq!(platform.binary_name(), "c2patool.exe");
        assert_eq!(platform.platform_hint(), "windows");
    }

    #[test]
    fn test_binary_name() {
        assert_eq!(Platform::new(Os::Linux, Arch::X64).binary_name(), "c2patool");
        assert_eq!(Platform::new(Os::Darwin, Arch::Arm64).binary_name(), "c2patool");
    }

    #[test]
    fn test_host_name_parsing() {
        assert_eq!(Os::parse("macos"), Some(Os::Darwin));
        assert_eq!(Os::parse("linux"), Some(Os::Linux));
        assert_eq!(Arch::parse("x86_64"), Some(Arch::X64));
        assert_eq!(Arch::parse("aarch64"), Some(Arch::Arm64));
        assert!(Os::parse("freebsd").is_none());
        assert!(Arch::parse("riscv64").is_none());
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::new(Os::Linux, Arch::Arm64).to_string(), "linux-arm64");
        assert_eq!(Platform::new(Os::Windows, Arch::X64).to_string(), "windows-x64");
    }

    #[test]
    fn test_current_platform_is_supported_here() {
        // The test suite only runs on supported hosts.
        let platform = Platform::current().unwrap();
        assert!(!platform.target_identifiers().is_empty());
    }
}
