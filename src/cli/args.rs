// args.rs: command-line definition for `brstate`

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::cli::arg_utils::parse_size;
use crate::config::{NUM_LITERAL_SYMBOLS, PROBE_CHUNK_SIZE_DEFAULT};

/// Inspect and exercise Brotli decoder state.
#[derive(Debug, Parser)]
#[command(name = "brstate", version, about)]
pub struct Cli {
    /// Increase verbosity (repeatable; -vv traces every allocation)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the memory layout of a Huffman tree group
    Layout(LayoutArgs),
    /// Decode a stream header and allocate the stream-level buffers
    Probe(ProbeArgs),
    /// Run full decoder lifecycles in parallel and check for leaks
    Bench(BenchArgs),
}

#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// Alphabet size of every tree in the group
    #[arg(long, default_value_t = NUM_LITERAL_SYMBOLS)]
    pub alphabet: u32,

    /// Number of trees in the group
    #[arg(long, default_value_t = 1)]
    pub trees: u32,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Compressed input file
    pub file: PathBuf,

    /// Bytes fed to the decoder per step (accepts K/M suffixes)
    #[arg(long, value_parser = parse_size, default_value_t = PROBE_CHUNK_SIZE_DEFAULT)]
    pub chunk_size: usize,

    /// Custom dictionary installed before the first byte
    #[arg(long)]
    pub dict: Option<PathBuf>,

    /// Fail allocations once this many bytes are live (accepts K/M suffixes)
    #[arg(long, value_parser = parse_size)]
    pub mem_limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct BenchArgs {
    /// Number of complete lifecycles to run
    #[arg(long, short = 'i', default_value_t = 1000)]
    pub iterations: usize,

    /// Worker threads (default: BRSTATE_NBWORKERS or the core count)
    #[arg(long, short = 'T')]
    pub threads: Option<usize>,

    /// Window size announced by each synthetic stream header
    #[arg(long, default_value_t = 16)]
    pub window_bits: u32,
}
