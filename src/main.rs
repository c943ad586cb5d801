//! Binary entry point for the `brstate` command-line tool.
//!
//! Parses arguments with `clap`, hands them to [`brotli_state::cli::dispatch`]
//! and maps failures to exit code 1. Errors are printed with their full
//! context chain unless the display level is 0.

use clap::Parser;

use brotli_state::cli::args::Cli;
use brotli_state::cli::constants::display_level;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = brotli_state::cli::dispatch(&cli) {
        if display_level() >= 1 {
            brotli_state::display!("brstate: {:#}\n", e);
        }
        std::process::exit(1);
    }
}
