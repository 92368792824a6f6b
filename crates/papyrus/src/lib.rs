//! Local academic paper library with read tracking and PDF-to-Markdown conversion.
//!
//! `papyrus` keeps downloaded papers on disk and provides:
//!
//! - Catalog search against arXiv
//! - PDF downloads into an "unread" collection
//! - Moving papers between the "unread" and "read" collections
//! - Starring, archiving and tagging papers
//! - Converting PDFs to Markdown with an external tool, with a small LRU result cache
//! - Splitting converted Markdown into text and embedded image parts
//!
//! # Storage
//!
//! There is no database. Each collection is a directory holding `<id>.pdf` files next to a
//! `metadata.json` sidecar that maps paper identifiers to their [`paper::PaperMetadata`]:
//!
//! ```text
//! <storage>/unreadPapers/metadata.json
//! <storage>/unreadPapers/<id>.pdf
//! <storage>/readPapers/metadata.json
//! <storage>/readPapers/<id>.pdf
//! <cache>/cache_metadata.json
//! <cache>/docling-<name>-<suffix>.md
//! ```
//!
//! # Getting Started
//!
//! ```no_run
//! use papyrus::{
//!   catalog::{ArxivClient, SearchQuery},
//!   prelude::*,
//!   Config, Papyrus,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let mut papyrus = Papyrus::open(Config::default()).await?;
//!
//!   // Find something to read
//!   let entries = ArxivClient::new().search(&SearchQuery::new("homomorphic encryption")).await?;
//!
//!   // Download it into the unread collection
//!   let paper = papyrus.repository.download(&entries[0]).await?;
//!
//!   // Convert it to Markdown parts
//!   let parts = papyrus.pipeline.parts(&paper.path).await?;
//!
//!   // Done with it
//!   papyrus.repository.mark_as_read(&paper.id).await?;
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`paper`]: Paper metadata, collections and tags
//! - [`store`]: The per-collection `metadata.json` sidecar files
//! - [`repository`]: Paper operations coordinating metadata and PDF files
//! - [`cache`]: The LRU cache of converter outputs
//! - [`convert`]: The external converter pipeline and Markdown part extraction
//! - [`catalog`]: Remote catalog search
//! - [`config`]: Paths and converter settings
//!
//! # Concurrency
//!
//! All operations assume a single process driving one mutation at a time. Metadata files and the
//! cache index are rewritten with read-modify-write and no file locking, so two processes writing
//! the same library race and the last writer wins.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::BTreeMap,
  fmt::Display,
  io::ErrorKind,
  path::{Path, PathBuf},
  str::FromStr,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod cache;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod paper;
pub mod repository;
pub mod store;

pub use crate::config::Config;
use crate::{
  cache::ConversionCache,
  convert::ConversionPipeline,
  error::*,
  paper::*,
  repository::PaperRepository,
  store::MetadataStore,
};

/// Everything a session needs, opened from one [`Config`].
///
/// Building a `Papyrus` initializes the collection directories and loads the conversion cache
/// index, so it is safe (and intended) to do on every process start.
pub struct Papyrus {
  /// The configuration this instance was opened with
  pub config:     Config,
  /// Paper storage and status transitions
  pub repository: PaperRepository,
  /// PDF to Markdown conversion backed by the result cache
  pub pipeline:   ConversionPipeline,
}

impl Papyrus {
  /// Opens the library described by `config`.
  ///
  /// # Errors
  ///
  /// Fails if the storage or cache directories cannot be created.
  pub async fn open(config: Config) -> Result<Self> {
    let store = MetadataStore::new(&config.storage_path);
    store.initialize().await?;
    let repository = PaperRepository::new(store);

    let cache = ConversionCache::open(&config.cache_path).await?;
    let pipeline = ConversionPipeline::new(cache, &config.converter);

    debug!("Opened papyrus with storage {:?} and cache {:?}", config.storage_path, config.cache_path);
    Ok(Self { config, repository, pipeline })
  }
}

/// Removes a file, treating "already gone" as success.
///
/// Any other error is handed back to the caller.
async fn remove_file_if_exists(path: &Path) -> std::io::Result<()> {
  match tokio::fs::remove_file(path).await {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == ErrorKind::NotFound => {
      trace!("{path:?} was already removed");
      Ok(())
    },
    Err(e) => Err(e),
  }
}

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use papyrus::{catalog::ArxivClient, catalog::SearchQuery, prelude::*};
///
/// async fn example() -> Result<(), PapyrusError> {
///   // `Catalog` brings `search` into scope
///   let entries = ArxivClient::new().search(&SearchQuery::new("lattices")).await?;
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    catalog::Catalog,
    error::{ConversionError, PapyrusError},
    paper::Collection,
  };
}
