//! Platform and backend tables.
//!
//! Everything that differs between host platforms or between the two
//! compiler backends lives in the tables below, so the resolver and the
//! pipeline never branch on the platform themselves.

use std::fmt;

/// Host platform family, as far as the harness cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Platform the harness is running on. Unknown Unix flavors are
    /// treated as Linux.
    pub fn host() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` string to a platform.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            _ => Self::Linux,
        }
    }

    /// Suffix appended to executable names (`""` or `".exe"`).
    pub fn exe_suffix(self) -> &'static str {
        self.row().exe_suffix
    }

    /// Build-configuration subdirectories to try when the compiler is not
    /// directly inside the build directory, in search order.
    pub fn alternate_build_dirs(self) -> &'static [&'static str] {
        self.row().alternate_build_dirs
    }

    /// Add the platform's executable suffix to `stem`.
    pub fn executable_name(self, stem: &str) -> String {
        format!("{stem}{}", self.exe_suffix())
    }

    fn row(self) -> &'static PlatformRow {
        // Every variant has exactly one row.
        PLATFORM_TABLE
            .iter()
            .find(|row| row.platform == self)
            .unwrap_or(&PLATFORM_TABLE[PLATFORM_TABLE.len() - 1])
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        })
    }
}

/// Which artifact format the compiler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendMode {
    /// Native ARM64 assembly (`out.s`), assembled by the C toolchain.
    #[default]
    Asm,
    /// LLVM IR text (`out.ll`), compiled by clang.
    Llvm,
}

impl BackendMode {
    /// Parse a backend name as accepted on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asm" | "native" => Some(Self::Asm),
            "llvm" | "ir" => Some(Self::Llvm),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Asm => "asm",
            Self::Llvm => "llvm",
        }
    }

    /// File name the compiler writes into its working directory.
    pub fn artifact_name(self) -> &'static str {
        match self {
            Self::Asm => "out.s",
            Self::Llvm => "out.ll",
        }
    }

    /// Executable stem the harness links to (before the platform suffix).
    pub fn executable_stem(self) -> &'static str {
        match self {
            Self::Asm => "test_bin",
            Self::Llvm => "test_bin_llvm",
        }
    }

    /// The compiler only reports success through its exit code in asm mode;
    /// in IR mode the harness also checks that the artifact appeared.
    pub fn verifies_artifact(self) -> bool {
        matches!(self, Self::Llvm)
    }

    /// Emitted assembly targets ARM64 only.
    pub fn requires_arm64_host(self) -> bool {
        matches!(self, Self::Asm)
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- Tables ---

struct PlatformRow {
    platform: Platform,
    exe_suffix: &'static str,
    alternate_build_dirs: &'static [&'static str],
}

const PLATFORM_TABLE: &[PlatformRow] = &[
    PlatformRow {
        platform: Platform::Windows,
        exe_suffix: ".exe",
        // Multi-configuration generators nest outputs per configuration.
        alternate_build_dirs: &["Debug", "Release"],
    },
    PlatformRow {
        platform: Platform::MacOs,
        exe_suffix: "",
        alternate_build_dirs: &[],
    },
    PlatformRow {
        platform: Platform::Linux,
        exe_suffix: "",
        alternate_build_dirs: &[],
    },
];

struct LinkRow {
    platform: Option<Platform>,
    backend: BackendMode,
    flags: &'static [&'static str],
}

/// First matching row wins; `platform: None` matches any platform.
const LINK_TABLE: &[LinkRow] = &[
    LinkRow {
        platform: Some(Platform::Windows),
        backend: BackendMode::Llvm,
        // printf and friends live in the legacy stdio shim on the UCRT.
        flags: &[
            "-Wno-override-module",
            "-llegacy_stdio_definitions",
            "-lucrt",
        ],
    },
    LinkRow {
        platform: None,
        backend: BackendMode::Llvm,
        // The emitted module's triple may not match the host's.
        flags: &["-Wno-override-module"],
    },
    LinkRow {
        platform: None,
        backend: BackendMode::Asm,
        flags: &[],
    },
];

/// Extra flags passed to the system toolchain after the artifact.
pub fn link_flags(platform: Platform, backend: BackendMode) -> &'static [&'static str] {
    LINK_TABLE
        .iter()
        .find(|row| row.backend == backend && row.platform.is_none_or(|p| p == platform))
        .map(|row| row.flags)
        .unwrap_or_default()
}

/// Whether the harness runs on a 64-bit ARM host.
pub fn host_is_arm64() -> bool {
    is_arm64(std::env::consts::ARCH)
}

fn is_arm64(arch: &str) -> bool {
    matches!(arch, "aarch64" | "arm64")
}
