#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test fixtures; panics give clear failure messages"
)]
//! Shell-script stand-ins for the compiler and the system toolchain.
//!
//! Lets the whole pipeline run without a real `hy` compiler or clang. The
//! first line of each `.hy` source tells the fakes what to do:
//!
//! | first line     | fake compiler              | fake cc                | program      |
//! |----------------|----------------------------|------------------------|--------------|
//! | `<n>`          | writes artifact            | links                  | exits `<n>`  |
//! | `error <msg>`  | prints `<msg>`, exits 1    |                        |              |
//! | `silent`       | exits 0, writes nothing    |                        |              |
//! | `compile-hang` | sleeps                     |                        |              |
//! | `compile-fork` | sleeps in a child process  |                        |              |
//! | `linkfail`     | writes artifact            | prints error, exits 1  |              |
//! | `hang`         | writes artifact            | links                  | sleeps       |
//!
//! Every fake cc invocation appends its arguments to `cc.log` in the root.
//!
//! # Usage
//!
//! ```ignore
//! let root = tempfile::tempdir()?;
//! let fake = FakeToolchain::install(root.path(), BackendMode::Llvm);
//! fake.write_source("test.hy", "5");
//! let config = fake.config(BackendMode::Llvm);
//! ```

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use hy_toolchain::{resolve, BackendMode, Platform, ToolchainPaths};

use crate::config::HarnessConfig;

const FAKE_COMPILER: &str = r#"#!/bin/sh
line=$(head -n 1 "$1")
case "$line" in
  error*) echo "${line#error }" >&2; exit 1 ;;
  silent) exit 0 ;;
  compile-hang) exec sleep 30 ;;
  compile-fork) sleep 8; exit 0 ;;
esac
printf '%s\n' "$line" > @ARTIFACT@
"#;

const FAKE_CC: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> "@LOG@"
out=""
input=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    -*) shift ;;
    *) input="$1"; shift ;;
  esac
done
line=$(head -n 1 "$input")
case "$line" in
  linkfail) echo "undefined symbol: _main" >&2; exit 1 ;;
  hang) printf '#!/bin/sh\nexec sleep 30\n' > "$out" ;;
  *) printf '#!/bin/sh\nexit %s\n' "$line" > "$out" ;;
esac
chmod +x "$out"
"#;

/// A scratch project: `tests/` for sources, `build/compiler`, `bin/cc`.
#[derive(Debug, Clone)]
pub struct FakeToolchain {
    pub root: PathBuf,
    pub suite_dir: PathBuf,
    pub build_dir: PathBuf,
    pub cc: PathBuf,
}

impl FakeToolchain {
    /// Lay out the scratch project under `root`, with a compiler that
    /// emits `backend`'s artifact.
    pub fn install(root: &Path, backend: BackendMode) -> Self {
        Self::install_emitting(root, backend.artifact_name())
    }

    /// Like [`install`](Self::install) but the compiler writes `artifact`
    /// whatever the backend is.
    pub fn install_emitting(root: &Path, artifact: &str) -> Self {
        let fake = Self::without_compiler(root);
        fs::create_dir_all(&fake.build_dir).unwrap();
        write_script(
            &fake.build_dir.join("compiler"),
            &FAKE_COMPILER.replace("@ARTIFACT@", artifact),
        );
        fake
    }

    /// Scratch project whose build directory holds no compiler.
    pub fn without_compiler(root: &Path) -> Self {
        let fake = Self {
            root: root.to_path_buf(),
            suite_dir: root.join("tests"),
            build_dir: root.join("build"),
            cc: root.join("bin").join("cc"),
        };
        fs::create_dir_all(&fake.suite_dir).unwrap();
        fs::create_dir_all(root.join("bin")).unwrap();
        let log = fake.cc_log();
        write_script(&fake.cc, &FAKE_CC.replace("@LOG@", &log.display().to_string()));
        fake
    }

    /// Write a source file whose first line drives the fakes.
    pub fn write_source(&self, file: &str, behavior: &str) {
        fs::write(self.suite_dir.join(file), format!("{behavior}\n")).unwrap();
    }

    /// Write a source for every case so the whole suite passes.
    pub fn write_passing_sources(&self) {
        for case in crate::case::CASES {
            self.write_source(case.file, &case.expected_exit_code.to_string());
        }
    }

    pub fn cc_log(&self) -> PathBuf {
        self.root.join("cc.log")
    }

    /// Lines logged by the fake cc, one per invocation.
    pub fn cc_invocations(&self) -> Vec<String> {
        fs::read_to_string(self.cc_log())
            .map(|s| s.lines().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Harness configuration pointing at this project.
    pub fn config(&self, backend: BackendMode) -> HarnessConfig {
        HarnessConfig {
            backend,
            suite_dir: self.suite_dir.clone(),
            build_dir: self.build_dir.clone(),
            system_compiler: self.cc.display().to_string(),
            timeout: None,
            platform: Platform::host(),
        }
    }

    /// Resolved toolchain for this project.
    pub fn paths(&self, backend: BackendMode) -> ToolchainPaths {
        resolve(&self.config(backend).toolchain_request()).expect("fake compiler is installed")
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
