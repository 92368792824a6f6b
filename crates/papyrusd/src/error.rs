//! Error types for the papyrus CLI.

use thiserror::Error;

use super::*;

/// Error type alias used for the [`papyrusd`](crate) binary.
pub type Result<T> = core::result::Result<T, PapyrusdError>;

/// Errors that can occur while running a CLI command.
#[derive(Error, Debug)]
pub enum PapyrusdError {
  /// An error from the library.
  #[error(transparent)]
  Papyrus(#[from] PapyrusError),

  /// A file system operation in the CLI itself failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Reading an answer from the terminal failed.
  #[error(transparent)]
  Dialog(#[from] dialoguer::Error),

  /// A file pattern could not be compiled.
  #[error(transparent)]
  Glob(#[from] glob::PatternError),
}
