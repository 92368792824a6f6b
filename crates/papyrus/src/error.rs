//! Error types for the papyrus library.
//!
//! Two enums live here:
//! - [`PapyrusError`]: the crate-wide error returned by every fallible operation
//! - [`ConversionError`]: failures of the external PDF-to-Markdown converter
//!
//! Not every failure becomes an error. Missing or corrupt metadata files are treated as empty
//! collections (see [`crate::store::MetadataLoad`]), removing a PDF that is already gone counts as
//! success, and mutations on an unknown paper identifier are silent no-ops.
//!
//! # Examples
//!
//! ```no_run
//! use papyrus::{error::PapyrusError, Config, Papyrus};
//!
//! # async fn example() -> Result<(), PapyrusError> {
//! let mut papyrus = Papyrus::open(Config::default()).await?;
//! match papyrus.pipeline.parts("paper.pdf").await {
//!   Err(PapyrusError::Conversion(e)) => println!("Converter failed: {e}"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(parts) => println!("{} parts", parts.len()),
//! }
//! # Ok(())
//! # }
//! ```

use std::{path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// Error type alias used for the [`papyrus`](crate) crate.
pub type Result<T> = core::result::Result<T, PapyrusError>;

/// Errors that can occur when working with the papyrus library.
#[derive(Error, Debug)]
pub enum PapyrusError {
  /// A file system operation failed.
  ///
  /// This covers reading and writing PDFs, metadata files, the cache index and the converter
  /// output. Removing a file that no longer exists is never reported through this variant.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// Serializing a metadata mapping or cache index failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A network request to the catalog or a PDF host failed.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The catalog returned a feed that could not be decoded.
  #[error(transparent)]
  Xml(#[from] quick_xml::DeError),

  /// The configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be written back out.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// The external converter failed or produced nothing usable.
  #[error(transparent)]
  Conversion(#[from] ConversionError),

  /// The provided collection name couldn't be parsed.
  ///
  /// The string parameter contains the rejected value for debugging.
  #[error("Invalid collection \"{0}\", expected `unread` or `read`")]
  InvalidCollection(String),

  /// The requested paper is not in either collection.
  #[error("Paper not found: {0}")]
  NotFound(String),

  /// A paper with this identifier is already stored locally.
  ///
  /// Returned by downloads so an identifier never lives in two collections at once. The title is
  /// carried along to make the message readable.
  #[error("Tried to add a paper titled \"{0}\" that is already stored locally.")]
  DuplicatePaper(String),

  /// Metadata references a paper whose PDF is not on disk.
  #[error("PDF for paper {id} is missing at {path:?}")]
  PdfMissing {
    /// Identifier of the paper
    id:   String,
    /// Where the PDF was expected
    path: PathBuf,
  },

  /// A remote API answered with an error or unusable payload.
  #[error("API error: {0}")]
  ApiError(String),

  /// An image part did not carry a decodable `data:` URI.
  #[error("Invalid embedded image: {0}")]
  InvalidImage(String),

  /// Configuration is missing or inconsistent.
  #[error("{0}")]
  Config(String),
}

/// Failures of the external document converter.
#[derive(Error, Debug)]
pub enum ConversionError {
  /// The PDF to convert could not be found or read
  #[error("Cannot read source PDF {path:?}: {source}")]
  MissingSource {
    /// The source path as given
    path:   PathBuf,
    /// Underlying error
    source: std::io::Error,
  },

  /// The converter process could not be started at all.
  #[error("Failed to launch converter `{tool}`: {source}")]
  Spawn {
    /// The command that was invoked
    tool:   String,
    /// Underlying OS error
    source: std::io::Error,
  },

  /// The converter ran but exited unsuccessfully.
  #[error("Converter exited with {status}: {stderr}")]
  Failed {
    /// Exit status reported by the process
    status: ExitStatus,
    /// Captured standard error, trimmed
    stderr: String,
  },

  /// No Markdown output could be found where the converter was told to write it.
  #[error("No Markdown output found at {0:?}")]
  MissingMarkdown(PathBuf),

  /// The Markdown output exists but could not be read.
  #[error("Failed to read converted output {path:?}: {source}")]
  Read {
    /// The Markdown file
    path:   PathBuf,
    /// Underlying OS error
    source: std::io::Error,
  },
}
