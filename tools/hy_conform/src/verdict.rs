//! Stage results and verdicts.

use std::fmt;

use hy_toolchain::{BackendMode, CommandOutput, ExecError};

use crate::case::TestCase;

/// One external-process step of a case's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Link,
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compile => "compile",
            Self::Link => "link",
            Self::Execute => "execute",
        })
    }
}

/// What one stage invocation did. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub stage: Stage,
    /// `None` when the process never produced an exit code (spawn failure).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl StageResult {
    pub fn from_output(stage: Stage, output: CommandOutput) -> Self {
        Self {
            stage,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            timed_out: output.timed_out,
        }
    }

    /// The process could not be run; the error text stands in for stderr.
    #[cold]
    pub fn spawn_failure(stage: Stage, error: &ExecError) -> Self {
        Self {
            stage,
            exit_code: None,
            stdout: String::new(),
            stderr: error.to_string(),
            timed_out: false,
        }
    }

    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Final classification of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Program exited with the expected code.
    Pass,
    /// Program ran but exited with some other code: a compiler correctness
    /// bug rather than a pipeline failure.
    Fail,
    /// Source file absent; no stage ran.
    MissingSource,
    /// Compiler exited non-zero.
    CompileError,
    /// System toolchain exited non-zero.
    LinkError,
    /// Compiler claimed success but wrote no IR file.
    NoIntermediateOutput,
    /// A stage outlived the configured timeout and was killed.
    Timeout,
}

impl Verdict {
    /// Status column text. The link label names the tool the backend uses.
    pub fn label(self, backend: BackendMode) -> &'static str {
        match (self, backend) {
            (Self::Pass, _) => "PASS",
            (Self::Fail, _) => "FAIL",
            (Self::MissingSource, _) => "MISSING",
            (Self::CompileError, _) => "COMPILE ERR",
            (Self::LinkError, BackendMode::Asm) => "ASM ERR",
            (Self::LinkError, BackendMode::Llvm) => "CLANG ERR",
            (Self::NoIntermediateOutput, _) => "NO LLVM OUT",
            (Self::Timeout, _) => "TIMEOUT",
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Text printed beneath a failing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub text: String,
}

impl Diagnostic {
    /// Line prefix naming the tool that produced the text.
    pub fn title(&self, backend: BackendMode) -> &'static str {
        match (self.stage, backend) {
            (Stage::Compile, _) => "Compiler Error",
            (Stage::Link, BackendMode::Asm) => "Assembler Error",
            (Stage::Link, BackendMode::Llvm) => "Clang Error",
            (Stage::Execute, _) => "Run Error",
        }
    }
}

/// Verdict for one case together with every stage that ran for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub case: TestCase,
    pub verdict: Verdict,
    pub stages: Vec<StageResult>,
}

impl CaseOutcome {
    /// The program's exit code, when it ran to completion.
    pub fn actual_exit_code(&self) -> Option<i32> {
        match self.verdict {
            Verdict::Pass | Verdict::Fail => self
                .stages
                .last()
                .filter(|s| s.stage == Stage::Execute)
                .and_then(|s| s.exit_code),
            _ => None,
        }
    }

    /// Stage that ended the pipeline early, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        if self.verdict.is_pass() {
            return None;
        }
        self.stages.last().map(|s| s.stage)
    }

    /// What to print under the row.
    ///
    /// Compile and link failures always carry their stderr, even when
    /// empty. Other failures only carry text when there is some, such as
    /// a test binary that could not be started.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        let last = self.stages.last()?;
        let text = last.stderr.trim_end();

        let always = matches!(self.verdict, Verdict::CompileError | Verdict::LinkError);
        let when_present = matches!(self.verdict, Verdict::Fail | Verdict::Timeout);

        if always || (when_present && !text.is_empty()) {
            Some(Diagnostic {
                stage: last.stage,
                text: text.to_string(),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests;
