//! Command-line interface for the `brstate` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|---------------|
//! | [`constants`] | Program identity, the shared `DISPLAY_LEVEL` atomic and the `display*` macros used crate-wide. |
//! | [`arg_utils`] | Size parsing with `K`/`M` suffixes. |
//! | [`args`]      | `clap` definition of the global flags and subcommands. |
//! | [`layout`]    | `brstate layout`: tree-group memory layout. |
//! | [`probe`]     | `brstate probe`: stream header decode and stream-level allocation on a file. |
//! | [`bench`]     | `brstate bench`: parallel lifecycle runs with leak checking. |
//!
//! Typical call sequence: `Cli::parse` → `constants::set_display_level` → [`dispatch`].

pub mod constants;
pub mod arg_utils;
pub mod args;
pub mod layout;
pub mod probe;
pub mod bench;

use args::{Cli, Command};

/// Applies the verbosity flags and runs the selected subcommand.
pub fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    constants::set_display_level(constants::level_from_flags(cli.verbose, cli.quiet));
    crate::displaylevel!(
        3,
        "*** {} v{} {}-bit, by {} ***\n",
        constants::PROGRAM_NAME,
        crate::VERSION_STRING,
        std::mem::size_of::<*const ()>() * 8,
        constants::AUTHOR
    );
    match &cli.command {
        Command::Layout(a) => layout::run(a),
        Command::Probe(a) => probe::run(a),
        Command::Bench(a) => bench::run(a),
    }
}
