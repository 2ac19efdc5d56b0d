mod cache;
mod config;
mod service;
mod settings;
mod state;
mod storage;

use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::Result;
use bookshelf_core::book::{BookPatch, NewBook};
use bookshelf_core::storage::{repository_error_to_status_code, RepositoryError};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Settings,
    settings::{watch_settings, SettingsProvider},
    state::AppState,
};

/// Debounce window for settings file changes.
const SETTINGS_DEBOUNCE: Duration = Duration::from_millis(250);

/// Bookshelf - Look books up through a cache-aside data access layer
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file, watched for changes
    #[arg(long, short, global = true, env = "BOOKSHELF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a book by name
    Get {
        /// Book name
        name: String,
    },
    /// List the books of one kind
    List {
        /// Kind to filter by
        #[arg(long)]
        kind: i64,
    },
    /// Create a book
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        isbn: String,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long = "book-version", default_value = "")]
        book_version: String,
        #[arg(long)]
        kind: i64,
    },
    /// Update fields of an existing book
    Update {
        /// Book name
        name: String,
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long = "book-version")]
        book_version: Option<String>,
        #[arg(long)]
        kind: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = SettingsProvider::new(Settings::load(cli.config.as_deref())?);

    // Keep the watcher alive for the life of the process.
    let _watcher = match &cli.config {
        Some(path) => Some(watch_settings(
            settings.clone(),
            path.clone(),
            SETTINGS_DEBOUNCE,
        )?),
        None => None,
    };

    let state = AppState::new(settings).await?;

    match run(&state, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            let status = repository_error_to_status_code(&err);
            tracing::debug!(error = %err, status, "Command failed");
            eprintln!("error ({status}): {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(state: &AppState, command: Command) -> Result<(), RepositoryError> {
    match command {
        Command::Get { name } => print_json(&state.books.find_book_by_name(&name).await?),
        Command::List { kind } => print_json(&state.books.list_books_by_kind(kind).await?),
        Command::Create {
            name,
            isbn,
            author,
            book_version,
            kind,
        } => {
            let book = NewBook::new(name, kind)
                .with_isbn(isbn)
                .with_author(author)
                .with_version(book_version);
            print_json(&state.books.save_book(&book).await?)
        }
        Command::Update {
            name,
            isbn,
            author,
            book_version,
            kind,
        } => {
            let patch = BookPatch {
                isbn,
                author,
                version: book_version,
                kind,
            };
            let updated = state.books.update_book(&name, &patch).await?;
            if let Some(err) = &updated.cache_error {
                tracing::warn!(name = %name, error = %err, "Update committed but cache write failed");
            }
            print_json(&updated.book)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), RepositoryError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    println!("{json}");
    Ok(())
}
