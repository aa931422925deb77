#![forbid(unsafe_code)]

mod commands;
mod runtime;

use clap::{Parser, Subcommand};
use ks_core::{Handle, MergeField, RecordKind};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "kinship",
    about = "Merge duplicate sources, repositories, media and notes in a family tree store"
)]
struct Cli {
    /// Store directory. Falls back to $KINSHIP_STORAGE_DIR, then ./.kinship
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Add every record of a JSON array file in one transaction
    Import { file: PathBuf },
    /// Print one record
    Show { kind: RecordKind, handle: Handle },
    /// Print the handles of every record of a kind
    List { kind: RecordKind },
    /// Print every record that references the given one
    Referrers { kind: RecordKind, handle: Handle },
    /// Fold the donor into the survivor and move its references over
    Merge {
        kind: RecordKind,
        #[arg(long)]
        survivor: Handle,
        #[arg(long)]
        donor: Handle,
        /// Fields for which the donor's value wins, comma separated
        #[arg(long, value_delimiter = ',')]
        take: Vec<MergeField>,
    },
    /// Delete a record, refusing while it is referenced unless --detach is given
    Delete {
        kind: RecordKind,
        handle: Handle,
        #[arg(long)]
        detach: bool,
    },
    /// Print the most recent transactions
    Log {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    runtime::init_tracing(cli.verbose);

    let storage_dir = runtime::storage_dir_from_env(cli.storage_dir);
    match commands::run(&storage_dir, cli.cmd) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
