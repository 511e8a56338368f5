use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// JSON toolchain configuration
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile and run a probe that writes Rust bindings
    Grovel {
        /// Specification file
        input: PathBuf,
        /// Output directory (defaults to the input's directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
    /// Build a shared library of forwarding shims and its bindings
    Wrap {
        /// Specification file
        input: PathBuf,
        /// Output directory (defaults to the input's directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}
