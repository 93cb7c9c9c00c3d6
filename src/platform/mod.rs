//! Host platform detection
//!
//! Maps the host's CPU architecture and operating system identifiers to the
//! names release artifacts are published under. Both Node-style (`x64`,
//! `win32`) and Rust-style (`x86_64`, `windows`) identifiers are understood.

use anyhow::{Result, anyhow};
use std::fmt;

/// CPU architecture, named the way release artifacts spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Arm,
    Arm64,
    I386,
    Mips,
    Mipsle,
    Ppc,
    Ppc64,
    S390,
    S390x,
    Amd64,
}

impl Arch {
    pub const ALL: [Arch; 10] = [
        Arch::Arm,
        Arch::Arm64,
        Arch::I386,
        Arch::Mips,
        Arch::Mipsle,
        Arch::Ppc,
        Arch::Ppc64,
        Arch::S390,
        Arch::S390x,
        Arch::Amd64,
    ];

    /// Look up a host architecture identifier. Unknown identifiers yield `None`.
    pub fn from_host_id(id: &str) -> Option<Self> {
        let arch = match id {
            "arm" => Arch::Arm,
            "arm64" | "aarch64" => Arch::Arm64,
            "ia32" | "x86" => Arch::I386,
            "mips" => Arch::Mips,
            "mipsel" => Arch::Mipsle,
            "ppc" | "powerpc" => Arch::Ppc,
            "ppc64" | "powerpc64" => Arch::Ppc64,
            "s390" => Arch::S390,
            "s390x" => Arch::S390x,
            "x64" | "x86_64" => Arch::Amd64,
            _ => return None,
        };
        Some(arch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::I386 => "386",
            Arch::Mips => "mips",
            Arch::Mipsle => "mipsle",
            Arch::Ppc => "ppc",
            Arch::Ppc64 => "ppc64",
            Arch::S390 => "s390",
            Arch::S390x => "s390x",
            Arch::Amd64 => "amd64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system, named the way release artifacts spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Darwin,
    FreeBsd,
    Linux,
    OpenBsd,
    Solaris,
    Windows,
    Aix,
}

impl Os {
    pub const ALL: [Os; 7] = [
        Os::Darwin,
        Os::FreeBsd,
        Os::Linux,
        Os::OpenBsd,
        Os::Solaris,
        Os::Windows,
        Os::Aix,
    ];

    /// Look up a host OS identifier. Unknown identifiers yield `None`.
    pub fn from_host_id(id: &str) -> Option<Self> {
        let os = match id {
            "darwin" | "macos" => Os::Darwin,
            "freebsd" => Os::FreeBsd,
            "linux" => Os::Linux,
            "openbsd" => Os::OpenBsd,
            "sunos" | "solaris" | "illumos" => Os::Solaris,
            "win32" | "windows" => Os::Windows,
            "aix" => Os::Aix,
            _ => return None,
        };
        Some(os)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::FreeBsd => "freebsd",
            Os::Linux => "linux",
            Os::OpenBsd => "openbsd",
            Os::Solaris => "solaris",
            Os::Windows => "windows",
            Os::Aix => "aix",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Os::Windows)
    }

    /// Suffix executables carry on this platform.
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw identifiers of the machine we are running on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIds {
    pub arch: String,
    pub os: String,
}

impl HostIds {
    pub fn new(arch: impl Into<String>, os: impl Into<String>) -> Self {
        Self {
            arch: arch.into(),
            os: os.into(),
        }
    }

    /// Detect the current host using compile-time target information
    pub fn detect() -> Self {
        Self::new(Self::detect_arch(), std::env::consts::OS)
    }

    fn detect_arch() -> &'static str {
        // consts::ARCH reports "mips" regardless of endianness
        #[cfg(all(target_arch = "mips", target_endian = "little"))]
        {
            "mipsel"
        }
        #[cfg(not(all(target_arch = "mips", target_endian = "little")))]
        {
            std::env::consts::ARCH
        }
    }

    pub fn resolve(&self) -> ResolvedHost {
        ResolvedHost {
            arch: Arch::from_host_id(&self.arch),
            platform: Os::from_host_id(&self.os),
        }
    }

    /// Resolve both identifiers, failing when either has no published name.
    pub fn descriptor(&self) -> Result<HostDescriptor> {
        let resolved = self.resolve();
        let arch = resolved
            .arch
            .ok_or_else(|| anyhow!("Unsupported architecture: {}", self.arch))?;
        let platform = resolved
            .platform
            .ok_or_else(|| anyhow!("Unsupported platform: {}", self.os))?;
        Ok(HostDescriptor { arch, platform })
    }
}

/// Result of mapping [`HostIds`] through the lookup tables. A `None` field
/// means the host identifier has no published artifact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedHost {
    pub arch: Option<Arch>,
    pub platform: Option<Os>,
}

/// Fully resolved host: both the architecture and OS are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostDescriptor {
    pub arch: Arch,
    pub platform: Os,
}
