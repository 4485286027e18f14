use std::io::{self, Write as _};
use std::path::PathBuf;

use addressbook::codec::json;
use addressbook::{print, store, JsonRules, RecordStore, StoreConfig};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod prompt;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prompt for one person and append them to the store.
    AddPerson {
        /// The store file. It is created if it's missing.
        #[arg(default_value = store::DEFAULT_PATH)]
        store: PathBuf,

        /// Skip fsync when writing the store.
        #[arg(long)]
        no_sync: bool,
    },

    /// Print every person in the store.
    ListPeople {
        /// The store file.
        #[arg(default_value = store::DEFAULT_PATH)]
        store: PathBuf,

        /// Print the book as JSON instead of the plain listing.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::AddPerson { store, no_sync } => add_person(store, !no_sync),
        Command::ListPeople { store, json } => list_people(store, json),
    }
}

fn add_person(path: PathBuf, sync: bool) -> anyhow::Result<()> {
    let mut store = RecordStore::open(StoreConfig {
        path: path.clone(),
        sync,
    })
    .with_context(|| format!("failed to load `{}`", path.display()))?;

    let person = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        prompt::prompt_for_person(&mut stdin.lock(), &mut stdout.lock())?
    };

    store.append(person)?;
    store
        .save()
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    Ok(())
}

fn list_people(path: PathBuf, as_json: bool) -> anyhow::Result<()> {
    let book =
        store::load(&path).with_context(|| format!("failed to load `{}`", path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if as_json {
        writeln!(out, "{}", json::to_string_pretty(&book, &JsonRules::listing())?)?;
    } else {
        print::write_book(&mut out, &book)?;
    }
    out.flush()?;
    Ok(())
}
