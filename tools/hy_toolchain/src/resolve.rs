//! Toolchain Resolver
//!
//! Finds the compiler binary and fixes every path the pipeline will touch,
//! once per suite invocation.
//!
//! # Compiler search order
//!
//! 1. `<build_dir>/compiler[.exe]`
//! 2. `<build_dir>/<config>/compiler[.exe]` for each of the platform's
//!    alternate build-configuration directories (see
//!    [`Platform::alternate_build_dirs`])
//!
//! The result is an immutable [`ToolchainPaths`] that is passed explicitly
//! to everything downstream.

use std::path::{Path, PathBuf};

use crate::platform::{link_flags, BackendMode, Platform};

/// File stem of the compiler executable inside the build directory.
pub const COMPILER_STEM: &str = "compiler";

/// Error when the toolchain cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolchainError {
    /// No candidate location holds a compiler binary.
    #[error("Compiler not found at {}. Please build it first.", join_paths(.searched))]
    ToolchainNotFound { searched: Vec<PathBuf> },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// What to resolve.
#[derive(Debug, Clone)]
pub struct ToolchainRequest {
    /// Compiler build output directory.
    pub build_dir: PathBuf,
    /// Directory holding the test sources; the compiler runs here.
    pub suite_dir: PathBuf,
    /// System toolchain front end (e.g. `clang`).
    pub system_compiler: String,
    pub platform: Platform,
    pub backend: BackendMode,
}

/// Every file the pipeline creates, for one backend in one suite directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    backend: BackendMode,
    asm: PathBuf,
    llvm: PathBuf,
    executable: PathBuf,
}

impl ArtifactSet {
    pub fn new(suite_dir: &Path, platform: Platform, backend: BackendMode) -> Self {
        Self {
            backend,
            asm: suite_dir.join(BackendMode::Asm.artifact_name()),
            llvm: suite_dir.join(BackendMode::Llvm.artifact_name()),
            executable: suite_dir.join(platform.executable_name(backend.executable_stem())),
        }
    }

    /// Artifact the compiler is expected to produce for this backend.
    pub fn artifact(&self) -> &Path {
        match self.backend {
            BackendMode::Asm => &self.asm,
            BackendMode::Llvm => &self.llvm,
        }
    }

    /// Where the system toolchain writes the linked executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Both artifact variants plus the executable. Either backend may have
    /// left either artifact behind, so cleanup always covers both.
    pub fn all(&self) -> [&Path; 3] {
        [&self.asm, &self.llvm, &self.executable]
    }
}

/// Resolved toolchain for one suite invocation. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainPaths {
    pub compiler_path: PathBuf,
    pub system_compiler: String,
    pub suite_dir: PathBuf,
    pub artifacts: ArtifactSet,
    /// Backend/platform flags appended to the link command.
    pub link_flags: Vec<String>,
    pub platform: Platform,
    pub backend: BackendMode,
}

impl ToolchainPaths {
    /// The `.s` or `.ll` file the compiler must produce.
    pub fn artifact_path(&self) -> &Path {
        self.artifacts.artifact()
    }

    pub fn executable_path(&self) -> &Path {
        self.artifacts.executable()
    }
}

/// Candidate compiler locations for `platform`, in search order.
pub fn compiler_candidates(build_dir: &Path, platform: Platform) -> Vec<PathBuf> {
    let name = platform.executable_name(COMPILER_STEM);

    std::iter::once(build_dir.join(&name))
        .chain(
            platform
                .alternate_build_dirs()
                .iter()
                .map(|config| build_dir.join(config).join(&name)),
        )
        .collect()
}

/// Resolve the toolchain for a suite run.
///
/// # Errors
///
/// Returns [`ToolchainError::ToolchainNotFound`] when no candidate location
/// holds the compiler binary.
pub fn resolve(request: &ToolchainRequest) -> Result<ToolchainPaths, ToolchainError> {
    let candidates = compiler_candidates(&request.build_dir, request.platform);

    let Some(compiler_path) = candidates.iter().find(|path| path.is_file()).cloned() else {
        return Err(ToolchainError::ToolchainNotFound {
            searched: candidates,
        });
    };

    let paths = ToolchainPaths {
        compiler_path,
        system_compiler: request.system_compiler.clone(),
        suite_dir: request.suite_dir.clone(),
        artifacts: ArtifactSet::new(&request.suite_dir, request.platform, request.backend),
        link_flags: link_flags(request.platform, request.backend)
            .iter()
            .map(ToString::to_string)
            .collect(),
        platform: request.platform,
        backend: request.backend,
    };

    tracing::info!(
        compiler = %paths.compiler_path.display(),
        cc = %paths.system_compiler,
        backend = %paths.backend,
        platform = %paths.platform,
        "resolved toolchain"
    );

    Ok(paths)
}
