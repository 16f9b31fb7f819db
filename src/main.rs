//! Command-line entry point: converts the control catalog and writes it as
//! YAML to the path given on the command line.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
