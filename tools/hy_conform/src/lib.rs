//! hy conformance harness.
//!
//! Drives an externally built `hy` compiler through every case in a fixed
//! table and checks the exit code of each produced program.
//!
//! # Architecture
//!
//! ```text
//! run(config)
//!     │
//!     ├─► resolve() ──► ToolchainPaths        (abort if no compiler)
//!     │
//!     ▼
//! run_suite() ──► for each TestCase:
//!     │               PipelineRunner::run_one()
//!     │                   compile ─► [check .ll] ─► link ─► execute
//!     │                   └─► CaseOutcome { verdict, stages }
//!     ▼
//! SuiteReport ──► table on stdout, process exit code
//! ```
//!
//! Artifacts (`out.s`, `out.ll`, the linked test binary) are removed when
//! [`run`] returns, whichever way it returns.

pub mod case;
pub mod config;
pub mod pipeline;
pub mod suite;
#[cfg(unix)]
pub mod testing;
pub mod verdict;

pub use case::{TestCase, CASES};
pub use config::{CliAction, ConfigError, HarnessConfig};
pub use pipeline::PipelineRunner;
pub use suite::{run, run_suite, HarnessError, ReportRow, SuiteReport};
pub use verdict::{CaseOutcome, Diagnostic, Stage, StageResult, Verdict};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=hy_conform=debug,hy_toolchain=debug`. Output goes
/// to stderr so the report on stdout stays byte-for-byte stable.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
