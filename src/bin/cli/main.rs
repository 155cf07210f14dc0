mod app;
mod commands;
mod render;
#[cfg(feature = "tui")]
mod tui;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "flashcards",
    about = "Flashcard collections with a learning mode and translation lookup",
    version
)]
struct Cli {
    /// Config file (default: <config dir>/flashcards/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Manage collections
    #[command(subcommand)]
    Collection(CollectionCommand),

    /// Manage cards
    #[command(subcommand)]
    Card(CardCommand),

    /// Suggest a definition for a term via the translation proxy
    Lookup {
        /// Word to translate
        term: String,
        /// Collection whose language the term is in (default: first collection)
        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Launch interactive TUI
    #[cfg(feature = "tui")]
    Tui,
}

#[derive(Subcommand)]
enum CollectionCommand {
    /// List collections in display order
    List,

    /// Register a new collection
    Add {
        /// Collection name (trimmed and lowercased)
        name: String,
    },

    /// Remove a collection and delete its cards
    Remove {
        /// Collection name
        name: String,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// List the cards of a collection
    List {
        /// Collection name (default: first collection)
        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Add a card
    Add {
        term: String,
        definition: String,
        /// Collection name (default: first collection)
        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Replace the term and definition of a card
    Edit {
        /// Card id
        id: String,
        term: String,
        definition: String,
        /// Collection name (default: first collection)
        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Delete a card
    Delete {
        /// Card id
        id: String,
        /// Collection name (default: first collection)
        #[arg(long, short)]
        collection: Option<String>,
    },
}

/// Log to stderr, or to a file while the TUI owns the terminal
fn init_logging(to_file: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if to_file {
        let dir = flashcards_lib::config::default_data_dir();
        let file = std::fs::create_dir_all(&dir).and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("flashcards.log"))
        });
        match file {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // Without a log file, stay silent rather than draw over the UI
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "tui")]
    let wants_tui = matches!(cli.command, None | Some(Command::Tui));
    #[cfg(not(feature = "tui"))]
    let wants_tui = false;
    init_logging(wants_tui);

    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let config = cli.config.as_deref();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            #[cfg(feature = "tui")]
            {
                tui::run(config)?;
            }
            #[cfg(not(feature = "tui"))]
            {
                eprintln!("TUI not available (built without 'tui' feature). Use a subcommand.");
                eprintln!("Run with --help for usage.");
                std::process::exit(1);
            }
        }
        Some(Command::Collection(subcmd)) => {
            let app = app::App::new(config)?;
            match subcmd {
                CollectionCommand::List => {
                    commands::collection::run_list(&app, &cli.format, use_color)?;
                }
                CollectionCommand::Add { name } => {
                    commands::collection::run_add(&app, &name, &cli.format, use_color)?;
                }
                CollectionCommand::Remove { name } => {
                    commands::collection::run_remove(&app, &name, &cli.format, use_color)?;
                }
            }
        }
        Some(Command::Card(subcmd)) => {
            let app = app::App::new(config)?;
            match subcmd {
                CardCommand::List { collection } => {
                    commands::card::run_list(&app, collection.as_deref(), &cli.format, use_color)?;
                }
                CardCommand::Add {
                    term,
                    definition,
                    collection,
                } => {
                    commands::card::run_add(
                        &app,
                        collection.as_deref(),
                        &term,
                        &definition,
                        &cli.format,
                        use_color,
                    )?;
                }
                CardCommand::Edit {
                    id,
                    term,
                    definition,
                    collection,
                } => {
                    commands::card::run_edit(
                        &app,
                        collection.as_deref(),
                        &id,
                        &term,
                        &definition,
                        &cli.format,
                        use_color,
                    )?;
                }
                CardCommand::Delete { id, collection } => {
                    commands::card::run_delete(
                        &app,
                        collection.as_deref(),
                        &id,
                        &cli.format,
                        use_color,
                    )?;
                }
            }
        }
        Some(Command::Lookup { term, collection }) => {
            let app = app::App::new(config)?;
            commands::lookup::run(&app, &term, collection.as_deref(), &cli.format, use_color)?;
        }
        #[cfg(feature = "tui")]
        Some(Command::Tui) => {
            tui::run(config)?;
        }
    }

    Ok(())
}
