use anyhow::Context;
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use umrah_core::{
    open_storage, Bookmark, BookmarkFilter, BookmarkRepository, BookmarkType, Config, Flight,
    Hotel, UmrahPackage,
};
use umrah_storage::{StorageArea, StorageService};

#[derive(Parser)]
#[command(name = "umrah")]
#[command(version, about = "Bookmarks and local storage for the Umrah travel companion", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "UMRAH_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Saved hotels, flights and packages
    Bookmarks {
        #[command(subcommand)]
        action: BookmarkCommand,
    },
    /// Raw key-value storage
    Storage {
        #[command(subcommand)]
        action: StorageCommand,
    },
}

#[derive(clap::Subcommand)]
enum BookmarkCommand {
    /// List bookmarks
    List {
        /// Only this type (hotel, flight, package)
        #[arg(long = "type")]
        kind: Option<BookmarkType>,
        /// Match against name and description
        #[arg(long)]
        search: Option<String>,
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Bookmark a hotel, flight or package from its JSON record
    Add {
        kind: BookmarkType,
        /// JSON file with the entity, or - for stdin
        source: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a bookmark by id
    Remove { id: String },
    /// Replace the notes on a bookmark
    Notes { id: String, text: String },
    /// Remove every bookmark
    Clear,
}

#[derive(clap::Subcommand)]
enum StorageCommand {
    Get {
        key: String,
        #[arg(long, default_value_t = StorageArea::Local)]
        area: StorageArea,
    },
    /// Store a JSON value (anything that isn't JSON is stored as a string)
    Set {
        key: String,
        value: String,
        #[arg(long, default_value_t = StorageArea::Local)]
        area: StorageArea,
    },
    Has {
        key: String,
        #[arg(long, default_value_t = StorageArea::Local)]
        area: StorageArea,
    },
    Remove {
        key: String,
        #[arg(long, default_value_t = StorageArea::Local)]
        area: StorageArea,
    },
    Clear {
        #[arg(long, default_value_t = StorageArea::Local)]
        area: StorageArea,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "umrah=debug,umrah_core=debug,umrah_storage=debug"
    } else {
        "umrah=info,umrah_core=info,umrah_storage=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;
    tracing::debug!("Configuration: {:?}", config);

    // Built once here and handed to whatever needs it
    let storage = Arc::new(open_storage(&config).context("opening storage")?);

    match cli.command {
        Some(Commands::Bookmarks { action }) => {
            let repo = BookmarkRepository::with_key(
                storage,
                config.bookmarks.storage_key.clone(),
                config.storage.bookmark_area,
            );
            run_bookmarks(&repo, action).await?;
        }
        Some(Commands::Storage { action }) => run_storage(&storage, action).await?,
        None => {
            println!("No command specified. Try --help");
        }
    }

    Ok(())
}

async fn run_bookmarks(repo: &BookmarkRepository, action: BookmarkCommand) -> anyhow::Result<()> {
    match action {
        BookmarkCommand::List { kind, search, json } => {
            let bookmarks = repo.filter(&BookmarkFilter { kind, query: search }).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&bookmarks)?);
            } else if bookmarks.is_empty() {
                println!("No bookmarks yet. Browse hotels, flights or packages and save them for later.");
            } else {
                for bookmark in &bookmarks {
                    print_bookmark(bookmark);
                }
            }
        }
        BookmarkCommand::Add { kind, source, notes } => {
            let raw = read_source(&source)?;
            let added = match kind {
                BookmarkType::Hotel => {
                    let hotel: Hotel = serde_json::from_str(&raw).context("parsing hotel JSON")?;
                    repo.add_hotel_bookmark(&hotel, notes).await?
                }
                BookmarkType::Flight => {
                    let flight: Flight = serde_json::from_str(&raw).context("parsing flight JSON")?;
                    repo.add_flight_bookmark(&flight, notes).await?
                }
                BookmarkType::Package => {
                    let pkg: UmrahPackage =
                        serde_json::from_str(&raw).context("parsing package JSON")?;
                    repo.add_package_bookmark(&pkg, notes).await?
                }
            };

            if added {
                println!("Added to your bookmarks.");
            } else {
                println!("This {} is already in your bookmarks.", kind);
            }
        }
        BookmarkCommand::Remove { id } => {
            if repo.remove_bookmark(&id).await? {
                println!("Bookmark removed.");
            } else {
                println!("No bookmark with id {}.", id);
            }
        }
        BookmarkCommand::Notes { id, text } => {
            if repo.update_bookmark_notes(&id, text).await? {
                println!("Notes saved.");
            } else {
                println!("No bookmark with id {}.", id);
            }
        }
        BookmarkCommand::Clear => {
            repo.clear_all_bookmarks().await?;
            println!("All bookmarks cleared.");
        }
    }

    Ok(())
}

async fn run_storage(storage: &StorageService, action: StorageCommand) -> anyhow::Result<()> {
    match action {
        StorageCommand::Get { key, area } => {
            match storage.get_value(&key, area).await? {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => println!("null"),
            }
        }
        StorageCommand::Set { key, value, area } => {
            let value: serde_json::Value = serde_json::from_str(&value)
                .unwrap_or(serde_json::Value::String(value));
            storage.set(&key, &value, area).await?;
        }
        StorageCommand::Has { key, area } => {
            println!("{}", storage.has(&key, area).await?);
        }
        StorageCommand::Remove { key, area } => storage.remove(&key, area).await?,
        StorageCommand::Clear { area } => storage.clear(area).await?,
    }

    Ok(())
}

fn read_source(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(Path::new(source)).with_context(|| format!("reading {}", source))
    }
}

fn print_bookmark(bookmark: &Bookmark) {
    println!("{}  [{}]  {}", bookmark.id, bookmark.kind, bookmark.name);
    let saved = bookmark
        .created_at_utc()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| bookmark.created_at.clone());
    println!("    {} · saved {}", bookmark.description, saved);
    if let Some(notes) = &bookmark.notes {
        println!("    notes: {}", notes);
    }
}
