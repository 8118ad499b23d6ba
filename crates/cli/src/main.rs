// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use earshot_config::ConfigManager;
use std::path::PathBuf;

mod commands;
mod library;
mod player;

fn build_cli() -> Command {
    Command::new("earshot")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Earshot Contributors")
        .about("Terminal audiobook player")
        .arg(
            Arg::new("library")
                .short('l')
                .long("library")
                .value_name("PATH")
                .help("Library JSON file (defaults to app.library_path from the config)")
                .global(true),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .global(true),
        )
        .subcommand(Command::new("list").about("List all books in the library"))
        .subcommand(
            Command::new("info")
                .about("Show chapters and saved position of a book")
                .arg(Arg::new("book").required(true).value_name("BOOK").help("Book id or name")),
        )
        .subcommand(
            Command::new("play")
                .about("Play a book, driven by commands typed on stdin")
                .arg(Arg::new("book").required(true).value_name("BOOK").help("Book id or name")),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the configuration file")
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("init").about("Write a default configuration file")),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    let manager = match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    };
    manager.context("Failed to locate configuration directory")
}

fn book_arg(matches: &ArgMatches) -> Result<&str> {
    matches
        .get_one::<String>("book")
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow::anyhow!("Book is required"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(&matches)?;

    let config = match manager.load_with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}; using defaults", e);
            manager.load_or_default()
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.as_filter()),
    )
    .init();

    let library = match matches.get_one::<String>("library") {
        Some(path) => PathBuf::from(path),
        None => manager.resolve(&config.app.library_path),
    };

    match matches.subcommand() {
        Some(("list", _)) => commands::list_books(&library),
        Some(("info", sub_matches)) => commands::show_book_info(&library, book_arg(sub_matches)?),
        Some(("play", sub_matches)) => {
            commands::play_book(&library, book_arg(sub_matches)?, &config).await
        }
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("init", _)) => commands::init_config(&manager),
            _ => commands::show_config(&manager, &config),
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
