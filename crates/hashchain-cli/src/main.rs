mod render;
mod shell;

use anyhow::Result;
use clap::Parser;
use hashchain_core::constants::DEFAULT_GENESIS_DATA;
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

use crate::shell::{Shell, ShellOptions};

#[derive(Parser, Debug)]
#[command(name = "hashchain")]
#[command(about = "Interactive shell over a hash-linked chain of Merkle-committed blocks")]
struct Args {
    /// Genesis payload used when `create` is given no text
    #[arg(long, default_value = DEFAULT_GENESIS_DATA)]
    genesis_data: String,

    /// Print blocks and Merkle trees as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut shell = Shell::new(
        io::stdin().lock(),
        io::stdout().lock(),
        ShellOptions {
            genesis_data: args.genesis_data,
            json: args.json,
        },
    );
    shell.run()
}
