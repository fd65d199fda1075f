//! Bestiary CLI
//!
//! Manage the monster registry file from the command line.
//!
//! Usage:
//!   cargo run --bin bestiary -- add Drowner necrophage Igni
//!   cargo run --bin bestiary -- remove Drowner
//!   cargo run --bin bestiary -- search igni
//!   cargo run --bin bestiary -- --file ./data/bestiary.json list

use anyhow::{Context, Result};
use bestiary_backend::config::{load_env, DEFAULT_BESTIARY_FILE};
use bestiary_backend::store::{RegistryCollection, StoreError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Monster registry manager
#[derive(Parser, Debug)]
#[command(name = "bestiary")]
#[command(about = "Add, remove and search monsters in the bestiary")]
struct Cli {
    /// Path to the bestiary JSON file
    #[arg(short, long, env = "BESTIARY_PATH", default_value = DEFAULT_BESTIARY_FILE)]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a monster
    Add {
        /// Monster name
        name: String,
        /// Monster type
        #[arg(value_name = "TYPE")]
        kind: String,
        /// What the monster is weak to
        weakness: String,
    },

    /// Remove a monster by name
    Remove {
        /// Monster name
        name: String,
    },

    /// Find monsters whose weakness contains the given text (case-insensitive)
    Search {
        /// Weakness to look for
        weakness: String,
    },

    /// List every monster
    List,
}

fn main() -> Result<ExitCode> {
    load_env();
    init_tracing();
    let cli = Cli::parse();
    let registry = RegistryCollection::new(cli.file.clone());

    let outcome = match cli.command {
        Commands::Add {
            name,
            kind,
            weakness,
        } => registry.add(&name, &kind, &weakness).map(|()| {
            println!("Added monster '{}'.", name);
        }),
        Commands::Remove { name } => registry.remove(&name).map(|_| {
            println!("Removed monster '{}'.", name);
        }),
        Commands::Search { weakness } => registry.search_by_weakness(&weakness).map(|found| {
            if found.is_empty() {
                println!("No monsters vulnerable to '{}' found.", weakness);
            } else {
                println!("Monsters vulnerable to '{}':", weakness);
                for (name, kind) in found {
                    println!(" - {} (Type: {})", name, kind);
                }
            }
        }),
        Commands::List => registry.list_all().map(|bestiary| {
            if bestiary.is_empty() {
                println!("The bestiary is empty.");
            }
            for (name, monster) in bestiary.iter() {
                println!(
                    " - {} (Type: {}, Weakness: {})",
                    name, monster.kind, monster.weakness
                );
            }
        }),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(StoreError::DuplicateKey(name)) => {
            eprintln!("Monster '{}' is already in the bestiary.", name);
            Ok(ExitCode::FAILURE)
        }
        Err(StoreError::NotFound(name)) => {
            eprintln!("Monster '{}' not found.", name);
            Ok(ExitCode::FAILURE)
        }
        Err(e @ StoreError::Validation(_)) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            Err(e).with_context(|| format!("Bestiary file {} is unusable", cli.file.display()))
        }
    }
}

/// Logs go to stderr so command output stays clean on stdout.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();
}
