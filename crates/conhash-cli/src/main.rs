use std::io::{self, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use conhash_cli::commands;
use conhash_ring::RingManager;

#[derive(Parser)]
#[command(name = "conhash", about = "Consistent hash ring walkthrough and tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Virtual positions per physical node
    #[arg(long, default_value = "150", global = true)]
    virtual_nodes: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scripted walkthrough
    Demo {
        /// Continue in interactive mode afterwards
        #[arg(long)]
        interactive: bool,
    },
    /// Interactive ring console on stdin
    Interactive,
    /// Print a scaling report across ring sizes
    Bench {
        /// Ring sizes to measure
        #[arg(long, value_delimiter = ',', default_value = "10,50,100,500,1000")]
        nodes: Vec<usize>,
        /// Lookups timed per ring size
        #[arg(long, default_value = "10000")]
        lookups: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conhash=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let ring = RingManager::with_virtual_nodes(cli.virtual_nodes)?;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Demo { interactive } => {
            commands::demo::run(&ring, &mut out)?;
            if interactive {
                writeln!(out)?;
                commands::interactive::run(&ring, io::stdin().lock(), &mut out)?;
            }
        }
        Commands::Interactive => {
            commands::interactive::run(&ring, io::stdin().lock(), &mut out)?;
        }
        Commands::Bench { nodes, lookups } => {
            commands::bench::run(cli.virtual_nodes, &nodes, lookups, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
