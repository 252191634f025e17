//! Command-line entry point for the Yojimbo to Tomboy migration.

mod cli;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
