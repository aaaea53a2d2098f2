//! Confetti - command-line tool for inspecting and previewing confetti emissions

use std::process::ExitCode;

use confetti::cli;

fn main() -> ExitCode {
    cli::run()
}
