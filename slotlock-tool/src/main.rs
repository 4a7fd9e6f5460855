//! Command-line host for slotlock: keeps a container snapshot in a JSON file
//! and raises lock, search and sort events against it.

mod commands;
mod config;
mod error;
mod snapshot;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use slotlock_core::{BitOrder, ContainerKind};
use tracing::info;

use crate::commands::{Event, put_stack, run_event};
use crate::config::{load_config, resolve_lock_config};
use crate::snapshot::create_snapshot;

#[derive(Parser)]
#[command(name = "slk")]
#[command(about = "Lock, search and sort container slots", long_about = None)]
struct Cli {
    /// Path to the container snapshot
    #[arg(long, global = true, default_value = "container.json")]
    container: PathBuf,

    /// Tag of the lock record in the container's user list
    #[arg(long, global = true)]
    tag: Option<String>,

    /// Bit order of the record payload: msb0 or lsb0
    #[arg(long, global = true)]
    bit_order: Option<BitOrder>,

    /// Toggle slot locks without holding the lock modifier
    #[arg(long, global = true)]
    individual_locking: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty container snapshot
    Init {
        /// Number of slots
        #[arg(long)]
        slots: usize,

        /// The container has an owner list
        #[arg(long)]
        secure: bool,

        /// The container was placed by a player
        #[arg(long)]
        player_storage: bool,

        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Put a stack into a slot (a count of 0 empties it, at most the max stack size)
    Put {
        index: usize,
        item: String,
        count: u32,

        #[arg(long, default_value = "64")]
        max_stack: u32,
    },

    #[command(flatten)]
    Event(Event),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let locks = resolve_lock_config(
        load_config(),
        cli.tag,
        cli.bit_order,
        cli.individual_locking,
    );
    let path = cli.container;

    match cli.command {
        Command::Init {
            slots,
            secure,
            player_storage,
            force,
        } => {
            let kind = ContainerKind {
                secure,
                player_storage,
            };
            create_snapshot(&path, kind, slots, force)?;
            info!(path = %path.display(), slots, "created container");
        }
        Command::Put {
            index,
            item,
            count,
            max_stack,
        } => put_stack(&path, index, item, count, max_stack)?,
        Command::Event(event) => {
            for line in run_event(&path, &locks, event)? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("SLK_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("slotlock_core=debug,slotlock_tool=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
