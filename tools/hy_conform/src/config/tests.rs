use super::*;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<CliAction, ConfigError> {
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    HarnessConfig::from_args(
        args.iter().copied(),
        |name| env.get(name).cloned(),
        Path::new("/work"),
    )
}

fn config(args: &[&str], env: &[(&str, &str)]) -> HarnessConfig {
    match parse(args, env) {
        Ok(CliAction::Run(config)) => config,
        other => panic!("expected a run configuration, got {other:?}"),
    }
}

#[test]
fn test_defaults() {
    let config = config(&[], &[]);

    assert_eq!(config.backend, BackendMode::Asm);
    assert_eq!(config.suite_dir, PathBuf::from("/work/tests"));
    assert_eq!(config.build_dir, PathBuf::from("/work/build"));
    assert_eq!(config.system_compiler, "clang");
    assert_eq!(config.timeout, None);
    assert_eq!(config.platform, Platform::host());
}

#[test]
fn test_backend_flag() {
    assert_eq!(config(&["--backend=llvm"], &[]).backend, BackendMode::Llvm);
    assert_eq!(config(&["--backend=asm"], &[]).backend, BackendMode::Asm);
}

#[test]
fn test_backend_flag_beats_environment() {
    let config = config(&["--backend=asm"], &[("HY_BACKEND", "llvm")]);
    assert_eq!(config.backend, BackendMode::Asm);
}

#[test]
fn test_backend_from_environment() {
    assert_eq!(config(&[], &[("HY_BACKEND", "llvm")]).backend, BackendMode::Llvm);
}

#[test]
fn test_empty_environment_values_are_unset() {
    let config = config(
        &[],
        &[("HY_BACKEND", ""), ("HY_CC", ""), ("HY_TIMEOUT_SECS", "")],
    );

    assert_eq!(config.backend, BackendMode::Asm);
    assert_eq!(config.system_compiler, "clang");
    assert_eq!(config.timeout, None);
}

#[test]
fn test_directories_resolve_against_cwd() {
    let config = config(
        &[],
        &[("HY_SUITE_DIR", "suite/cases"), ("HY_BUILD_DIR", "/opt/hy/build")],
    );

    assert_eq!(config.suite_dir, PathBuf::from("/work/suite/cases"));
    assert_eq!(config.build_dir, PathBuf::from("/opt/hy/build"));
}

#[test]
fn test_system_compiler_override() {
    assert_eq!(config(&[], &[("HY_CC", "gcc")]).system_compiler, "gcc");
}

#[test]
fn test_timeout() {
    assert_eq!(
        config(&[], &[("HY_TIMEOUT_SECS", "30")]).timeout,
        Some(Duration::from_secs(30))
    );
    assert_eq!(config(&[], &[("HY_TIMEOUT_SECS", "0")]).timeout, None);
}

#[test]
fn test_huge_timeout_is_accepted() {
    let config = config(&[], &[("HY_TIMEOUT_SECS", "18446744073709551615")]);
    assert_eq!(config.timeout, Some(Duration::from_secs(u64::MAX)));
}

#[test]
fn test_invalid_timeout() {
    let err = parse(&[], &[("HY_TIMEOUT_SECS", "soon")]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
    assert_eq!(
        err.to_string(),
        "invalid HY_TIMEOUT_SECS 'soon' (expected a whole number of seconds)"
    );
}

#[test]
fn test_help() {
    assert_eq!(parse(&["--help"], &[]).unwrap(), CliAction::Help);
    assert_eq!(parse(&["--backend=llvm", "-h"], &[]).unwrap(), CliAction::Help);
}

#[test]
fn test_unknown_argument() {
    let err = parse(&["--verbose"], &[]).unwrap_err();
    assert_eq!(err.to_string(), "unknown argument '--verbose'");
}

#[test]
fn test_invalid_backend() {
    let err = parse(&["--backend=wasm"], &[]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBackend(ref name) if name == "wasm"));

    let err = parse(&[], &[("HY_BACKEND", "jvm")]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBackend(_)));
}

#[test]
fn test_toolchain_request_carries_config() {
    let config = config(&["--backend=llvm"], &[("HY_CC", "gcc")]);
    let request = config.toolchain_request();

    assert_eq!(request.backend, BackendMode::Llvm);
    assert_eq!(request.build_dir, config.build_dir);
    assert_eq!(request.suite_dir, config.suite_dir);
    assert_eq!(request.system_compiler, "gcc");
}
