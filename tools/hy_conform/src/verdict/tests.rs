use super::*;
use pretty_assertions::assert_eq;

fn stage(stage: Stage, exit_code: Option<i32>, stderr: &str) -> StageResult {
    StageResult {
        stage,
        exit_code,
        stdout: String::new(),
        stderr: stderr.to_string(),
        timed_out: false,
    }
}

fn outcome(verdict: Verdict, stages: Vec<StageResult>) -> CaseOutcome {
    CaseOutcome {
        case: TestCase::new("test.hy", 5),
        verdict,
        stages,
    }
}

#[test]
fn test_labels() {
    use BackendMode::{Asm, Llvm};

    assert_eq!(Verdict::Pass.label(Asm), "PASS");
    assert_eq!(Verdict::Fail.label(Llvm), "FAIL");
    assert_eq!(Verdict::MissingSource.label(Asm), "MISSING");
    assert_eq!(Verdict::CompileError.label(Llvm), "COMPILE ERR");
    assert_eq!(Verdict::LinkError.label(Asm), "ASM ERR");
    assert_eq!(Verdict::LinkError.label(Llvm), "CLANG ERR");
    assert_eq!(Verdict::NoIntermediateOutput.label(Llvm), "NO LLVM OUT");
    assert_eq!(Verdict::Timeout.label(Asm), "TIMEOUT");
}

#[test]
fn test_stage_result_success() {
    assert!(stage(Stage::Compile, Some(0), "").succeeded());
    assert!(!stage(Stage::Compile, Some(1), "").succeeded());
    assert!(!stage(Stage::Link, None, "").succeeded());

    let mut timed_out = stage(Stage::Execute, Some(0), "");
    timed_out.timed_out = true;
    assert!(!timed_out.succeeded());
}

#[test]
fn test_actual_exit_code_only_after_execution() {
    let pass = outcome(
        Verdict::Pass,
        vec![
            stage(Stage::Compile, Some(0), ""),
            stage(Stage::Link, Some(0), ""),
            stage(Stage::Execute, Some(5), ""),
        ],
    );
    assert_eq!(pass.actual_exit_code(), Some(5));
    assert_eq!(pass.failed_stage(), None);

    let compile_err = outcome(
        Verdict::CompileError,
        vec![stage(Stage::Compile, Some(1), "bad token")],
    );
    assert_eq!(compile_err.actual_exit_code(), None);
    assert_eq!(compile_err.failed_stage(), Some(Stage::Compile));
}

#[test]
fn test_compile_diagnostic_is_trimmed_stderr() {
    let compile_err = outcome(
        Verdict::CompileError,
        vec![stage(Stage::Compile, Some(1), "Expected ';'\n")],
    );

    let diag = compile_err.diagnostic().unwrap();
    assert_eq!(diag.stage, Stage::Compile);
    assert_eq!(diag.text, "Expected ';'");
    assert_eq!(diag.title(BackendMode::Asm), "Compiler Error");
}

#[test]
fn test_link_diagnostic_present_even_when_empty() {
    let link_err = outcome(
        Verdict::LinkError,
        vec![
            stage(Stage::Compile, Some(0), ""),
            stage(Stage::Link, Some(1), ""),
        ],
    );

    let diag = link_err.diagnostic().unwrap();
    assert_eq!(diag.text, "");
    assert_eq!(diag.title(BackendMode::Asm), "Assembler Error");
    assert_eq!(diag.title(BackendMode::Llvm), "Clang Error");
}

#[test]
fn test_plain_fail_has_no_diagnostic() {
    let fail = outcome(
        Verdict::Fail,
        vec![
            stage(Stage::Compile, Some(0), ""),
            stage(Stage::Link, Some(0), ""),
            stage(Stage::Execute, Some(4), ""),
        ],
    );
    assert_eq!(fail.diagnostic(), None);
    assert_eq!(fail.actual_exit_code(), Some(4));
}

#[test]
fn test_unstartable_binary_reports_run_error() {
    let fail = outcome(
        Verdict::Fail,
        vec![
            stage(Stage::Compile, Some(0), ""),
            stage(Stage::Link, Some(0), ""),
            stage(Stage::Execute, None, "failed to spawn 'test_bin': permission denied"),
        ],
    );

    assert_eq!(fail.actual_exit_code(), None);
    let diag = fail.diagnostic().unwrap();
    assert_eq!(diag.title(BackendMode::Llvm), "Run Error");
}

#[test]
fn test_missing_source_has_no_stages() {
    let missing = outcome(Verdict::MissingSource, vec![]);
    assert_eq!(missing.diagnostic(), None);
    assert_eq!(missing.failed_stage(), None);
    assert_eq!(missing.actual_exit_code(), None);
}
