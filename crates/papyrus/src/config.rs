//! Paths and converter settings.
//!
//! A [`Config`] says where the collections live, where converter output is cached and which
//! command converts PDFs to Markdown. It is stored as TOML:
//!
//! ```toml
//! storage_path = "/home/user/.local/share/papyrus/papers"
//! cache_path = "/home/user/project/.docling_cache"
//! converter = "docling"
//! ```
//!
//! Every field is optional in the file; anything left out takes its default.

use super::*;

/// Name of the cache directory created below the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".docling_cache";

/// Converter invoked when none is configured.
pub const DEFAULT_CONVERTER: &str = "docling";

/// Library configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base directory holding the `unreadPapers` and `readPapers` collections
  pub storage_path: PathBuf,
  /// Directory for the conversion cache index and converter output
  pub cache_path:   PathBuf,
  /// Converter command, looked up on `PATH` unless it is a path itself
  pub converter:    String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      storage_path: Self::default_storage_path(),
      cache_path:   Self::default_cache_path(),
      converter:    DEFAULT_CONVERTER.to_string(),
    }
  }
}

impl Config {
  /// Default location of the configuration file.
  ///
  /// - On Unix and macOS: `~/.papyrus/config.toml`
  /// - On Windows: `%USERPROFILE%\.papyrus\config.toml`
  /// - Fallback: `./.papyrus/config.toml`
  pub fn default_path() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".papyrus").join("config.toml")
  }

  /// Default base directory for the paper collections.
  ///
  /// - On Unix: `~/.local/share/papyrus/papers`
  /// - On macOS: `~/Library/Application Support/papyrus/papers`
  /// - On Windows: `%APPDATA%\papyrus\papers`
  /// - Fallback: `./papers`
  pub fn default_storage_path() -> PathBuf {
    dirs::data_dir()
      .map(|dir| dir.join("papyrus").join("papers"))
      .unwrap_or_else(|| PathBuf::from("papers"))
  }

  /// Default cache directory, `.docling_cache` below the current working directory.
  pub fn default_cache_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(DEFAULT_CACHE_DIR)
  }

  /// Reads the configuration at `path`, falling back to defaults when there is no file.
  ///
  /// # Errors
  ///
  /// Fails if the file exists but cannot be read or is not valid TOML.
  pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    match tokio::fs::read_to_string(path).await {
      Ok(content) => {
        let config = toml::from_str(&content)?;
        debug!("Loaded configuration from {path:?}");
        Ok(config)
      },
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!("No configuration at {path:?}, using defaults");
        Ok(Self::default())
      },
      Err(e) => Err(e.into()),
    }
  }

  /// Writes the configuration to `path`, creating parent directories as needed.
  pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, toml::to_string_pretty(self)?).await?;
    info!("Saved configuration to {path:?}");
    Ok(())
  }

  /// Sets the storage base directory.
  pub fn with_storage_path(mut self, storage_path: impl AsRef<Path>) -> Self {
    self.storage_path = storage_path.as_ref().to_path_buf();
    self
  }

  /// Sets the cache directory.
  pub fn with_cache_path(mut self, cache_path: impl AsRef<Path>) -> Self {
    self.cache_path = cache_path.as_ref().to_path_buf();
    self
  }

  /// Sets the converter command.
  pub fn with_converter(mut self, converter: impl Into<String>) -> Self {
    self.converter = converter.into();
    self
  }
}
