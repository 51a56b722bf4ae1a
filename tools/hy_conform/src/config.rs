//! Harness configuration.
//!
//! Command-line flags are parsed by hand, then environment variables fill
//! in whatever the flags leave open. Running with no arguments and no
//! environment gives the asm backend against `tests/` and `build/` in the
//! current directory.
//!
//! | source                 | meaning                            | default  |
//! |------------------------|------------------------------------|----------|
//! | `--backend=<mode>`     | backend mode                       | `asm`    |
//! | `HY_BACKEND`           | backend mode when no flag is given | `asm`    |
//! | `HY_SUITE_DIR`         | directory holding the `.hy` files  | `tests`  |
//! | `HY_BUILD_DIR`         | compiler build output directory    | `build`  |
//! | `HY_CC`                | system toolchain front end         | `clang`  |
//! | `HY_TIMEOUT_SECS`      | per-stage limit, `0` for none      | none     |

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hy_toolchain::{BackendMode, Platform, ToolchainRequest};

pub const DEFAULT_SUITE_DIR: &str = "tests";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_SYSTEM_COMPILER: &str = "clang";

pub const ENV_BACKEND: &str = "HY_BACKEND";
pub const ENV_SUITE_DIR: &str = "HY_SUITE_DIR";
pub const ENV_BUILD_DIR: &str = "HY_BUILD_DIR";
pub const ENV_SYSTEM_COMPILER: &str = "HY_CC";
pub const ENV_TIMEOUT_SECS: &str = "HY_TIMEOUT_SECS";

/// Usage text for `--help`.
pub const USAGE: &str = "\
Usage: hy-conform [--backend=asm|llvm]

Compiles, links and runs every case of the hy conformance suite and
reports one row per case. Exits 0 when every case passes, 1 otherwise.

Options:
  --backend=asm    Native ARM64 assembly backend (default)
  --backend=llvm   LLVM IR backend
  -h, --help       Print this message

Environment:
  HY_BACKEND       Backend when no --backend flag is given
  HY_SUITE_DIR     Directory holding the .hy sources (default: tests)
  HY_BUILD_DIR     Compiler build directory (default: build)
  HY_CC            System C toolchain front end (default: clang)
  HY_TIMEOUT_SECS  Per-stage time limit in seconds (default: none)
  RUST_LOG         Enable debug logging on stderr";

/// Bad command line or environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown argument '{0}'")]
    UnknownArgument(String),

    #[error("invalid backend '{0}' (expected 'asm' or 'llvm')")]
    InvalidBackend(String),

    #[error("invalid {var} '{value}' (expected a whole number of seconds)")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[source] io::Error),
}

/// Everything one suite invocation needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub backend: BackendMode,
    /// Absolute path of the directory holding the sources.
    pub suite_dir: PathBuf,
    /// Absolute path of the compiler's build directory.
    pub build_dir: PathBuf,
    pub system_compiler: String,
    /// `None` waits on each stage indefinitely.
    pub timeout: Option<Duration>,
    pub platform: Platform,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(HarnessConfig),
    Help,
}

impl HarnessConfig {
    /// Build a configuration from arguments (without the program name),
    /// an environment lookup, and the directory relative paths resolve
    /// against.
    ///
    /// Empty environment values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown argument, an unrecognized
    /// backend name, or a timeout that is not a whole number of seconds.
    pub fn from_args<I, S, F>(args: I, env: F, cwd: &Path) -> Result<CliAction, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| env(name).filter(|v| !v.is_empty());

        let mut backend_flag = None;
        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                return Ok(CliAction::Help);
            } else if let Some(value) = arg.strip_prefix("--backend=") {
                backend_flag = Some(parse_backend(value)?);
            } else {
                return Err(ConfigError::UnknownArgument(arg.to_string()));
            }
        }

        let backend = match backend_flag {
            Some(backend) => backend,
            None => env(ENV_BACKEND)
                .map(|v| parse_backend(&v))
                .transpose()?
                .unwrap_or_default(),
        };

        let dir = |var: &str, default: &str| {
            let raw = env(var).map_or_else(|| PathBuf::from(default), PathBuf::from);
            absolutize(cwd, raw)
        };

        let timeout = match env(ENV_TIMEOUT_SECS) {
            Some(value) => parse_timeout(&value)?,
            None => None,
        };

        Ok(CliAction::Run(HarnessConfig {
            backend,
            suite_dir: dir(ENV_SUITE_DIR, DEFAULT_SUITE_DIR),
            build_dir: dir(ENV_BUILD_DIR, DEFAULT_BUILD_DIR),
            system_compiler: env(ENV_SYSTEM_COMPILER)
                .unwrap_or_else(|| DEFAULT_SYSTEM_COMPILER.to_string()),
            timeout,
            platform: Platform::host(),
        }))
    }

    /// [`from_args`](Self::from_args) against the real process environment.
    ///
    /// # Errors
    ///
    /// As [`from_args`](Self::from_args), plus [`ConfigError::CurrentDir`]
    /// when the working directory cannot be read.
    pub fn from_process_env<I, S>(args: I) -> Result<CliAction, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Self::from_args(args, |name| std::env::var(name).ok(), &cwd)
    }

    /// The part of the configuration the toolchain resolver needs.
    pub fn toolchain_request(&self) -> ToolchainRequest {
        ToolchainRequest {
            build_dir: self.build_dir.clone(),
            suite_dir: self.suite_dir.clone(),
            system_compiler: self.system_compiler.clone(),
            platform: self.platform,
            backend: self.backend,
        }
    }
}

fn parse_backend(value: &str) -> Result<BackendMode, ConfigError> {
    BackendMode::parse(value).ok_or_else(|| ConfigError::InvalidBackend(value.to_string()))
}

fn parse_timeout(value: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout {
            var: ENV_TIMEOUT_SECS,
            value: value.to_string(),
        })?;
    Ok((secs > 0).then_some(Duration::from_secs(secs)))
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests;
