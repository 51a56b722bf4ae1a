//! hy conformance harness CLI
//!
//! Exit status 0 when every case passes, 1 when any case fails, the
//! compiler is missing, or the command line is invalid.

use std::io::{self, Write};

use hy_conform::config::USAGE;
use hy_conform::{init_tracing, run, CliAction, HarnessConfig, HarnessError};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match HarnessConfig::from_process_env(&args) {
        Ok(CliAction::Run(config)) => config,
        Ok(CliAction::Help) => {
            println!("{USAGE}");
            return;
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(&config, &mut out) {
        Ok(report) => {
            let _ = out.flush();
            std::process::exit(report.exit_code());
        }
        Err(HarnessError::Toolchain(e)) => {
            let _ = writeln!(out, "Error: {e}");
            let _ = out.flush();
            std::process::exit(1);
        }
        Err(e) => {
            let _ = out.flush();
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
