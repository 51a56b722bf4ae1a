//! Test Suite Driver
//!
//! Runs the case table through the [`PipelineRunner`], streams one report
//! row per case, and tallies the result:
//!
//! ```text
//! Test File            | Status     | Expected   | Actual
//! ------------------------------------------------------------
//! test.hy              | PASS       | 5          | 5
//! test2.hy             | COMPILE ERR | 5          | -
//!   Compiler Error: Expected ';'
//! ------------------------------------------------------------
//! Results: 1 Passed, 1 Failed
//! ```
//!
//! Labels wider than their column push the rest of the row right rather
//! than being cut.

use std::fmt::Write as _;
use std::io::{self, Write};

use hy_toolchain::{
    host_is_arm64, resolve, BackendMode, CleanupGuard, CommandExecutor, ToolchainError,
    ToolchainPaths,
};

use crate::case::{TestCase, CASES};
use crate::config::HarnessConfig;
use crate::pipeline::PipelineRunner;
use crate::verdict::{CaseOutcome, Verdict};

/// Width of the horizontal rules around the rows.
pub const RULE_WIDTH: usize = 60;

/// Error that stops the suite before it can produce a report.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// One line of the table, plus the diagnostic printed beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub file: &'static str,
    pub verdict: Verdict,
    pub status: &'static str,
    pub expected: i32,
    /// `None` prints as `-`.
    pub actual: Option<i32>,
    /// `(title, text)`, e.g. `("Compiler Error", "Expected ';'")`.
    pub diagnostic: Option<(&'static str, String)>,
}

impl ReportRow {
    pub fn from_outcome(outcome: &CaseOutcome, backend: BackendMode) -> Self {
        Self {
            file: outcome.case.file,
            verdict: outcome.verdict,
            status: outcome.verdict.label(backend),
            expected: outcome.case.expected_exit_code,
            actual: outcome.actual_exit_code(),
            diagnostic: outcome
                .diagnostic()
                .map(|d| (d.title(backend), d.text)),
        }
    }

    /// The row and, if present, its diagnostic line, newline-terminated.
    pub fn render(&self) -> String {
        let actual = self
            .actual
            .map_or_else(|| "-".to_string(), |code| code.to_string());

        let mut out = table_line(self.file, self.status, &self.expected.to_string(), &actual);
        if let Some((title, text)) = &self.diagnostic {
            let _ = writeln!(out, "  {title}: {text}");
        }
        out
    }
}

/// Tallies and rows for one suite invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub backend: BackendMode,
    pub passed: usize,
    pub failed: usize,
    pub rows: Vec<ReportRow>,
}

impl SuiteReport {
    pub fn new(backend: BackendMode) -> Self {
        Self {
            backend,
            passed: 0,
            failed: 0,
            rows: Vec::new(),
        }
    }

    /// Count `outcome` and append its row, returning the row.
    pub fn record(&mut self, outcome: &CaseOutcome) -> &ReportRow {
        if outcome.verdict.is_pass() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.rows.push(ReportRow::from_outcome(outcome, self.backend));
        &self.rows[self.rows.len() - 1]
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Process exit code: 0 when every case passed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_failures())
    }

    /// The whole table, exactly as [`run_suite`] streams it.
    pub fn render(&self) -> String {
        let mut out = header();
        for row in &self.rows {
            out.push_str(&row.render());
        }
        out.push_str(&footer(self.passed, self.failed));
        out
    }
}

fn table_line(file: &str, status: &str, expected: &str, actual: &str) -> String {
    format!("{file:<20} | {status:<10} | {expected:<10} | {actual:<10}\n")
}

fn rule() -> String {
    let mut line = "-".repeat(RULE_WIDTH);
    line.push('\n');
    line
}

fn header() -> String {
    let mut out = table_line("Test File", "Status", "Expected", "Actual");
    out.push_str(&rule());
    out
}

fn footer(passed: usize, failed: usize) -> String {
    format!("{}Results: {passed} Passed, {failed} Failed\n", rule())
}

/// Advisory printed before the table when the assembly backend runs on a
/// host that cannot execute ARM64 code. The suite still runs.
pub fn arch_warning(arch: &str) -> String {
    format!(
        "WARNING: You are running on {arch}, but this test suite relies on ARM64 assembly.\n\
         It will likely fail. Please use --backend=llvm instead.\n{}",
        rule()
    )
}

/// Run `cases` against `paths`, writing each row to `out` as soon as its
/// case finishes.
///
/// Per-case failures never stop the loop; every case gets a row.
///
/// # Errors
///
/// Only when writing to `out` fails.
pub fn run_suite<W: Write>(
    cases: &[TestCase],
    paths: &ToolchainPaths,
    executor: CommandExecutor,
    out: &mut W,
) -> io::Result<SuiteReport> {
    let runner = PipelineRunner::new(paths, executor);
    let mut report = SuiteReport::new(paths.backend);

    out.write_all(header().as_bytes())?;
    for case in cases {
        let outcome = runner.run_one(case);
        let row = report.record(&outcome);
        out.write_all(row.render().as_bytes())?;
        out.flush()?;
    }
    out.write_all(footer(report.passed, report.failed).as_bytes())?;
    out.flush()?;

    tracing::info!(
        passed = report.passed,
        failed = report.failed,
        backend = %paths.backend,
        "suite finished"
    );

    Ok(report)
}

/// Run the full suite for `config`, writing the report to `out`.
///
/// Artifacts of both backends and the test executable are removed before
/// this returns, including when the compiler is missing.
///
/// # Errors
///
/// [`HarnessError::Toolchain`] when no compiler binary is found (no case
/// runs), [`HarnessError::Io`] when the report cannot be written.
pub fn run<W: Write>(config: &HarnessConfig, out: &mut W) -> Result<SuiteReport, HarnessError> {
    let artifacts =
        hy_toolchain::ArtifactSet::new(&config.suite_dir, config.platform, config.backend);
    let _janitor = CleanupGuard::new(artifacts.all());

    let paths = resolve(&config.toolchain_request())?;

    if config.backend.requires_arm64_host() && !host_is_arm64() {
        tracing::warn!(
            arch = std::env::consts::ARCH,
            "assembly backend targets ARM64 but the host is not ARM64"
        );
        out.write_all(arch_warning(std::env::consts::ARCH).as_bytes())?;
    }

    let executor = CommandExecutor::with_timeout(config.timeout);
    Ok(run_suite(CASES, &paths, executor, out)?)
}
