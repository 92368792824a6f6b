//! The LRU cache of converter outputs.
//!
//! Converting a PDF is slow, so the [`ConversionCache`] remembers where the Markdown for a source
//! path was written. The index is a single JSON array in `cache_metadata.json`, most recently used
//! first; its order is the recency order, so there is no separate access log.
//!
//! Keys are source paths made absolute and cleaned lexically. Two different paths to the same
//! bytes are two entries, and symlinks are not resolved.
//!
//! The cache holds at most [`MAX_CACHE_SIZE`] entries. Inserting past that evicts the least
//! recently used entry and deletes its output from disk.

use std::path::Component;

use super::*;

/// Maximum number of cached conversions.
pub const MAX_CACHE_SIZE: usize = 5;

/// Name of the index file inside the cache directory.
pub const CACHE_INDEX_FILE: &str = "cache_metadata.json";

/// One cached conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
  /// Normalized source path, the lookup key
  pub pdf_path:    PathBuf,
  /// Converter output, a Markdown file or a directory containing one
  pub output_path: PathBuf,
  /// When the entry was created or last hit
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp:   DateTime<Utc>,
}

/// Cache of converter outputs rooted at one directory.
#[derive(Debug)]
pub struct ConversionCache {
  /// Directory holding the index and the converter outputs
  dir:     PathBuf,
  /// Entries, most recently used first
  entries: Vec<CacheEntry>,
}

impl ConversionCache {
  /// Opens the cache in `dir`, creating the directory if needed.
  ///
  /// A missing or unreadable index starts the cache empty.
  ///
  /// # Errors
  ///
  /// Fails only if the directory cannot be created.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = normalize_path(dir)?;
    tokio::fs::create_dir_all(&dir).await?;

    let index = dir.join(CACHE_INDEX_FILE);
    let entries = match tokio::fs::read_to_string(&index).await {
      Ok(content) => serde_json::from_str::<Vec<CacheEntry>>(&content).unwrap_or_else(|e| {
        warn!("Corrupt cache index at {index:?}, starting empty: {e}");
        Vec::new()
      }),
      Err(e) => {
        debug!("No cache index at {index:?} ({e}), starting empty");
        Vec::new()
      },
    };

    debug!("Opened conversion cache at {dir:?} with {} entries", entries.len());
    Ok(Self { dir, entries })
  }

  /// The cache directory.
  pub fn dir(&self) -> &Path { &self.dir }

  /// Entries, most recently used first.
  pub fn entries(&self) -> &[CacheEntry] { &self.entries }

  /// Number of entries.
  pub fn len(&self) -> usize { self.entries.len() }

  /// Whether the cache is empty.
  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Looks up the converter output for `path`.
  ///
  /// A hit moves the entry to the front and refreshes its timestamp. An entry whose output has
  /// disappeared from disk is dropped and reported as a miss. Either change is persisted before
  /// returning. If the output cannot be checked at all the entry is kept and the error returned.
  pub async fn lookup(&mut self, path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let key = normalize_path(path)?;
    let Some(position) = self.entries.iter().position(|e| e.pdf_path == key) else {
      trace!("Cache miss for {key:?}");
      return Ok(None);
    };

    match tokio::fs::try_exists(&self.entries[position].output_path).await {
      Ok(true) => {},
      Ok(false) => {
        let stale = self.entries.remove(position);
        info!("Dropping stale cache entry for {key:?}, {:?} is gone", stale.output_path);
        self.persist().await?;
        return Ok(None);
      },
      Err(e) => {
        warn!("Cannot check cached output {:?}: {e}", self.entries[position].output_path);
        return Err(e.into());
      },
    }

    debug!("Cache hit for {key:?}");
    let mut entry = self.entries.remove(position);
    entry.timestamp = now_millis();
    let output = entry.output_path.clone();
    self.entries.insert(0, entry);
    self.persist().await?;
    Ok(Some(output))
  }

  /// Records `output` as the conversion of `path`.
  ///
  /// The entry goes to the front, replacing any earlier entry for the same path and deleting that
  /// entry's output unless it is the same location. If the cache then holds more than
  /// [`MAX_CACHE_SIZE`] entries the oldest are evicted and their outputs deleted; failures to
  /// delete are logged and ignored.
  pub async fn insert(&mut self, path: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let key = normalize_path(path)?;
    let output = output.as_ref().to_path_buf();
    if let Some(position) = self.entries.iter().position(|e| e.pdf_path == key) {
      let replaced = self.entries.remove(position);
      if replaced.output_path != output {
        debug!("Replacing cached output {:?} for {key:?}", replaced.output_path);
        remove_artifact(&replaced.output_path).await;
      }
    }
    self.entries.insert(0, CacheEntry {
      pdf_path:    key,
      output_path: output,
      timestamp:   now_millis(),
    });

    while self.entries.len() > MAX_CACHE_SIZE {
      if let Some(evicted) = self.entries.pop() {
        debug!("Evicting cache entry for {:?}", evicted.pdf_path);
        remove_artifact(&evicted.output_path).await;
      }
    }
    self.persist().await
  }

  /// Removes every entry together with its output.
  pub async fn clear(&mut self) -> Result<()> {
    for entry in self.entries.drain(..) {
      remove_artifact(&entry.output_path).await;
    }
    info!("Cleared conversion cache at {:?}", self.dir);
    self.persist().await
  }

  /// Writes the index.
  async fn persist(&self) -> Result<()> {
    let index = self.dir.join(CACHE_INDEX_FILE);
    let json = serde_json::to_string_pretty(&self.entries)?;
    tokio::fs::write(&index, json).await.map_err(|e| {
      error!("Failed to write cache index {index:?}: {e}");
      e.into()
    })
  }
}

/// Deletes a converter output, file or directory, ignoring failures.
pub(crate) async fn remove_artifact(path: &Path) {
  let result = match tokio::fs::metadata(path).await {
    Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
    Ok(_) => tokio::fs::remove_file(path).await,
    Err(e) => Err(e),
  };
  if let Err(e) = result {
    debug!("Could not remove cached output {path:?}: {e}");
  }
}

/// Makes `path` absolute and removes `.` and `..` components without touching the file system.
pub fn normalize_path(path: impl AsRef<Path>) -> Result<PathBuf> {
  let absolute = std::path::absolute(path.as_ref())?;
  let mut normalized = PathBuf::new();
  for component in absolute.components() {
    match component {
      Component::CurDir => {},
      Component::ParentDir => {
        normalized.pop();
      },
      other => normalized.push(other),
    }
  }
  Ok(normalized)
}
