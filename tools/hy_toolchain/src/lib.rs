//! Toolchain plumbing for the hy conformance harness.
//!
//! Everything here talks to the outside world: spawning processes, finding
//! the compiler and the system C toolchain on disk, and removing the files
//! those tools leave behind.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 resolve()                     │
//! │  - Locates the compiler binary                │
//! │  - Consults the platform/backend table        │
//! │  - Produces an immutable ToolchainPaths       │
//! └───────────────┬───────────────────────────────┘
//!                 │
//!        ┌────────┴────────┐
//!        ▼                 ▼
//! ┌─────────────┐   ┌─────────────┐
//! │  Command    │   │  Artifact   │
//! │  Executor   │   │  Janitor    │
//! └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use hy_toolchain::{
//!     resolve, BackendMode, CommandExecutor, Invocation, Platform, ToolchainRequest,
//! };
//!
//! let paths = resolve(&ToolchainRequest {
//!     build_dir: "build".into(),
//!     suite_dir: "tests".into(),
//!     system_compiler: "clang".into(),
//!     platform: Platform::host(),
//!     backend: BackendMode::Llvm,
//! })?;
//!
//! let output = CommandExecutor::new().run(&Invocation::new(&paths.compiler_path))?;
//! ```

pub mod exec;
pub mod janitor;
pub mod platform;
pub mod resolve;

pub use exec::{CommandExecutor, CommandOutput, ExecError, Invocation};
pub use janitor::{cleanup, remove_if_exists, CleanupGuard};
pub use platform::{host_is_arm64, link_flags, BackendMode, Platform};
pub use resolve::{
    compiler_candidates, resolve, ArtifactSet, ToolchainError, ToolchainPaths, ToolchainRequest,
    COMPILER_STEM,
};
