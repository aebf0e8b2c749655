//! # Offline Bible CLI (`bible`)
//!
//! ## Usage
//!
//! ```bash
//! bible --config ./config/bible.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bible init` | Create the SQLite database and run schema migrations |
//! | `bible load` | Load the corpus (cache or fetch) and print counts |
//! | `bible stats` | Book, chapter and verse counts |
//! | `bible ref "<reference>"` | Resolve a reference such as `John 3:16` |
//! | `bible search "<keyword>"` | Keyword or phrase search |
//! | `bible read "<query>"` | Reference lookup, falling back to search |
//! | `bible random` | A random verse |
//! | `bible popular [index]` | A popular verse (today's when no index) |
//! | `bible favorites ...` | Add, remove, list or check saved verses |
//! | `bible serve` | Start the JSON HTTP API |
//!
//! Logs go to stderr, filtered by `BIBLE_LOG` (default `warn`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use offline_bible::app::App;
use offline_bible::config;
use offline_bible::migrate;
use offline_bible::server;
use offline_bible_core::models::{Favorite, NewFavorite, SearchResult};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Offline Bible: reference lookup, keyword search and favorites over a
/// locally cached scripture corpus.
#[derive(Parser)]
#[command(name = "bible", version, about = "Offline-first Bible reading engine")]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/bible.toml")]
    config: PathBuf,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Log at info level unless `BIBLE_LOG` says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Load the corpus and report where it came from.
    Load,

    /// Count books, chapters and verses.
    Stats,

    /// Resolve a verse reference.
    Ref {
        /// e.g. `John 3:16`, `Romans 8:28-30`, `Psalm 23`.
        reference: String,
    },

    /// Search verse text.
    ///
    /// A single word uses the token index with partial matching; several
    /// words are matched as an exact phrase.
    Search { keyword: String },

    /// Resolve a reference, or search when it is not one.
    Read { query: String },

    /// Show a random verse.
    Random,

    /// Show a well-known verse. Without an index, today's verse.
    Popular {
        #[arg(allow_negative_numbers = true)]
        index: Option<i64>,
    },

    /// Manage saved verses.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Start the JSON HTTP API on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Save every verse a reference resolves to.
    Add { reference: String },

    /// Remove a favorite by id (`Book-chapter-verse`).
    Remove { id: String },

    /// List favorites, newest first.
    List {
        /// Group by book instead.
        #[arg(long)]
        by_book: bool,
    },

    /// Check whether a verse is saved.
    Check { book: String, chapter: u32, verse: u32 },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("BIBLE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    if let Commands::Init = cli.command {
        migrate::run_migrations(&cfg).await?;
        println!("Database initialized successfully.");
        return Ok(());
    }

    let app = App::open(cfg).await?;
    let json = cli.json;

    match cli.command {
        Commands::Init => {}
        Commands::Load => {
            app.engine.load_corpus().await?;
            let stats = app.engine.stats().await?;
            if json {
                print_json(&stats)?;
            } else {
                println!(
                    "Corpus loaded: {} books, {} chapters, {} verses.",
                    stats.books, stats.chapters, stats.verses
                );
            }
        }
        Commands::Stats => {
            let stats = app.engine.stats().await?;
            if json {
                print_json(&stats)?;
            } else {
                println!("  Books:       {}", stats.books);
                println!("  Chapters:    {}", stats.chapters);
                println!("  Verses:      {}", stats.verses);
            }
        }
        Commands::Ref { reference } => {
            print_result(&app.engine.resolve_reference(&reference).await?, json)?;
        }
        Commands::Search { keyword } => {
            print_result(&app.engine.search(&keyword).await?, json)?;
        }
        Commands::Read { query } => {
            print_result(&app.engine.book_content(&query).await?, json)?;
        }
        Commands::Random => {
            print_result(&app.engine.random_verse().await?, json)?;
        }
        Commands::Popular { index } => {
            let result = match index {
                Some(i) => app.engine.popular_verse(i).await?,
                None => app.engine.daily_verse().await?,
            };
            print_result(&result, json)?;
        }
        Commands::Favorites { action } => run_favorites(&app, action, json).await?,
        Commands::Serve => server::run_server(Arc::new(app)).await?,
    }

    Ok(())
}

async fn run_favorites(app: &App, action: FavoritesAction, json: bool) -> Result<()> {
    match action {
        FavoritesAction::Add { reference } => {
            let result = app.engine.resolve_reference(&reference).await?;
            let mut added = Vec::with_capacity(result.verses.len());
            for verse in &result.verses {
                added.push(app.favorites.add(NewFavorite::from_verse(verse)).await?);
            }
            if json {
                print_json(&added)?;
            } else {
                for fav in &added {
                    println!("Saved {} ({})", fav.reference, fav.id);
                }
            }
        }
        FavoritesAction::Remove { id } => {
            app.favorites.remove(&id).await?;
            if !json {
                println!("Removed {}", id);
            }
        }
        FavoritesAction::List { by_book } => {
            if by_book {
                let grouped = app.favorites.by_book().await?;
                if json {
                    print_json(&grouped)?;
                } else {
                    for (book, favorites) in &grouped {
                        println!("{}", book);
                        for fav in favorites {
                            print_favorite(fav);
                        }
                    }
                }
            } else {
                let favorites = app.favorites.all().await?;
                if json {
                    print_json(&favorites)?;
                } else if favorites.is_empty() {
                    println!("No favorites.");
                } else {
                    for fav in &favorites {
                        print_favorite(fav);
                    }
                }
            }
        }
        FavoritesAction::Check {
            book,
            chapter,
            verse,
        } => {
            let saved = app.favorites.is_favorite(&book, chapter, verse).await?;
            if json {
                print_json(&serde_json::json!({ "favorite": saved }))?;
            } else {
                println!("{}", if saved { "yes" } else { "no" });
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_result(result: &SearchResult, json: bool) -> Result<()> {
    if json {
        return print_json(result);
    }
    println!("{} [{}]", result.reference, result.translation_id);
    println!();
    for v in &result.verses {
        println!("  {} {}:{}  {}", v.book_name, v.chapter, v.verse, v.text);
    }
    Ok(())
}

fn print_favorite(fav: &Favorite) {
    println!(
        "  {:<24} {}  (saved {})",
        fav.reference,
        fav.text,
        fav.date_added.format("%Y-%m-%d")
    );
}
