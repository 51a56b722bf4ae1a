//! Pipeline Runner
//!
//! Takes one case through compile → (IR check) → link → execute,
//! stopping at the first stage that fails. One runner serves both backends;
//! everything backend-specific comes from the resolved [`ToolchainPaths`].
//!
//! No stage is retried. Every stage is deterministic, and a retry would
//! hide exactly the defects the harness exists to find.

use std::path::Path;

use hy_toolchain::{cleanup, CommandExecutor, Invocation, ToolchainPaths};

use crate::case::TestCase;
use crate::verdict::{CaseOutcome, Stage, StageResult, Verdict};

/// Runs single cases against a resolved toolchain.
pub struct PipelineRunner<'a> {
    paths: &'a ToolchainPaths,
    executor: CommandExecutor,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(paths: &'a ToolchainPaths, executor: CommandExecutor) -> Self {
        Self { paths, executor }
    }

    /// Run one case and classify it.
    pub fn run_one(&self, case: &TestCase) -> CaseOutcome {
        let span = tracing::debug_span!("case", file = case.file);
        let _enter = span.enter();

        let mut stages = Vec::new();
        let verdict = match self.run_stages(case, &mut stages) {
            Ok(verdict) | Err(verdict) => verdict,
        };

        tracing::debug!(?verdict, stages = stages.len(), "case finished");

        CaseOutcome {
            case: *case,
            verdict,
            stages,
        }
    }

    /// `Err` carries the verdict of the stage that stopped the pipeline.
    fn run_stages(
        &self,
        case: &TestCase,
        stages: &mut Vec<StageResult>,
    ) -> Result<Verdict, Verdict> {
        let source = case.source_path(&self.paths.suite_dir);
        if !source.is_file() {
            return Err(Verdict::MissingSource);
        }

        // An artifact left by the previous case must not stand in for this
        // case's output.
        cleanup([self.paths.artifact_path(), self.paths.executable_path()]);

        let compile = self.run_stage(Stage::Compile, &self.compile_invocation(&source));
        let gate = check(&compile, Verdict::CompileError);
        stages.push(compile);
        gate?;

        if self.paths.backend.verifies_artifact() && !self.paths.artifact_path().is_file() {
            return Err(Verdict::NoIntermediateOutput);
        }

        let link = self.run_stage(Stage::Link, &self.link_invocation());
        let gate = check(&link, Verdict::LinkError);
        stages.push(link);
        gate?;

        let execute = self.run_stage(Stage::Execute, &self.execute_invocation());
        let verdict = if execute.timed_out {
            Verdict::Timeout
        } else if execute.exit_code == Some(case.expected_exit_code) {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        stages.push(execute);

        Ok(verdict)
    }

    fn run_stage(&self, stage: Stage, invocation: &Invocation) -> StageResult {
        match self.executor.run(invocation) {
            Ok(output) => StageResult::from_output(stage, output),
            Err(e) => {
                tracing::warn!(%stage, error = %e, "stage could not be started");
                StageResult::spawn_failure(stage, &e)
            }
        }
    }

    /// `<compiler> <source>`, run in the suite directory so `out.s` /
    /// `out.ll` land next to the sources.
    pub fn compile_invocation(&self, source: &Path) -> Invocation {
        Invocation::new(&self.paths.compiler_path)
            .arg(source)
            .current_dir(&self.paths.suite_dir)
    }

    /// `<cc> -o <executable> <artifact> [flags]`
    pub fn link_invocation(&self) -> Invocation {
        Invocation::new(&self.paths.system_compiler)
            .arg("-o")
            .arg(self.paths.executable_path())
            .arg(self.paths.artifact_path())
            .args(&self.paths.link_flags)
            .current_dir(&self.paths.suite_dir)
    }

    /// The linked program takes no arguments; only its exit code matters.
    pub fn execute_invocation(&self) -> Invocation {
        Invocation::new(self.paths.executable_path())
            .current_dir(&self.paths.suite_dir)
            .discard_output()
    }
}

fn check(result: &StageResult, on_failure: Verdict) -> Result<(), Verdict> {
    if result.timed_out {
        Err(Verdict::Timeout)
    } else if result.succeeded() {
        Ok(())
    } else {
        Err(on_failure)
    }
}
