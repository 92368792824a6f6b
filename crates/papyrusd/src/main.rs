//! Command line interface for the papyrus paper library.
//!
//! This crate provides the `papyrus` binary on top of the [`papyrus`] library. It supports:
//! - Searching arXiv and downloading papers into the unread collection
//! - Listing papers and moving them between the unread and read collections
//! - Starring, archiving, tagging and removing papers
//! - Converting PDFs to Markdown, optionally extracting embedded images
//! - Inspecting and pruning the conversion cache
//! - Auditing the library for metadata and PDF mismatches
//!
//! # Usage
//!
//! ```bash
//! # Write a configuration and create the collections
//! papyrus init
//!
//! # Find and download a paper
//! papyrus search "verifiable homomorphic encryption"
//! papyrus download 2301.07041
//!
//! # Work through the reading list
//! papyrus list --status unread
//! papyrus convert 2301.07041 --output paper.md --images figures/
//! papyrus read 2301.07041
//! ```
//!
//! Destructive commands ask for confirmation unless `--accept-defaults` is passed. Logging
//! verbosity is raised with `-v` (up to `-vvvv`) or set through `RUST_LOG`.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use papyrus::{
  catalog::{ArxivClient, CatalogEntry, SearchQuery, SortBy, SortOrder},
  convert::Part,
  paper::LocalPaper,
  prelude::*,
  Config, Papyrus,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Manage a local library of academic papers")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. Defaults to `~/.papyrus/config.toml`.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// Directory holding the paper collections, overriding the configuration file
  #[arg(long, global = true)]
  storage: Option<PathBuf>,

  /// Directory for the conversion cache, overriding the configuration file
  #[arg(long, global = true)]
  cache: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

impl Cli {
  /// Path of the configuration file in effect.
  fn config_path(&self) -> PathBuf { self.config.clone().unwrap_or_else(Config::default_path) }

  /// Loads the configuration file and applies the command line overrides.
  async fn load_config(&self) -> Result<Config> {
    let mut config = Config::load(self.config_path()).await?;
    if let Some(storage) = &self.storage {
      config = config.with_storage_path(storage);
    }
    if let Some(cache) = &self.cache {
      config = config.with_cache_path(cache);
    }
    trace!("Using configuration {config:?}");
    Ok(config)
  }
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Runs the parsed command.
async fn run(cli: &Cli) -> Result<()> {
  let config = cli.load_config().await?;

  let catalog = ArxivClient::new();

  match &cli.command {
    Commands::Init => return init(cli, config, &cli.config_path()).await,
    Commands::Search(options) => return search(cli, &catalog, options.clone()).await,
    _ => {},
  }

  let mut papyrus = Papyrus::open(config).await?;
  match &cli.command {
    Commands::Init | Commands::Search(_) => unreachable!("handled before the library is opened"),
    Commands::Download { identifier } => download(cli, &catalog, &papyrus, identifier).await,
    Commands::List(options) => list(cli, &papyrus, options.clone()).await,
    Commands::Show { identifier } => show(cli, &papyrus, identifier).await,
    Commands::Read { identifier } =>
      transition(cli, &papyrus, identifier, Collection::Read).await,
    Commands::Unread { identifier } =>
      transition(cli, &papyrus, identifier, Collection::Unread).await,
    Commands::Remove { identifier } => remove(cli, &papyrus, identifier).await,
    Commands::Star { identifier } => flag(cli, &papyrus, identifier, Flag::Starred(true)).await,
    Commands::Unstar { identifier } => flag(cli, &papyrus, identifier, Flag::Starred(false)).await,
    Commands::Archive { identifier } =>
      flag(cli, &papyrus, identifier, Flag::Archived(true)).await,
    Commands::Unarchive { identifier } =>
      flag(cli, &papyrus, identifier, Flag::Archived(false)).await,
    Commands::Tag { cmd } => tag(cli, &papyrus, cmd.clone()).await,
    Commands::Convert(options) => convert(cli, &mut papyrus, options.clone()).await,
    Commands::Cache { cmd } => cache(cli, &mut papyrus, cmd.clone()).await,
    Commands::Audit => audit(cli, &papyrus).await,
  }
}

/// Entry point for the papyrus CLI application
///
/// Parses arguments, sets up logging and executes the requested command. Failures are reported as
/// a status line and end the process with a non-zero exit code.
#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  if let Err(e) = run(&cli).await {
    debug!("Command failed: {e:?}");
    let _ = cli.reply(ResponseContent::Error(e));
    std::process::exit(1);
  }
}
