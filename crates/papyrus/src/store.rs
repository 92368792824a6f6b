//! The per-collection `metadata.json` sidecar files.
//!
//! Each collection directory carries one JSON object mapping paper identifiers to
//! [`PaperMetadata`]. The store is the only code that touches those files and it deliberately
//! fails open on reads: a missing or corrupt file is an empty collection. The distinction is not
//! lost though; [`MetadataStore::read`] returns a [`MetadataLoad`] saying which case applied and
//! logs it.
//!
//! Writes overwrite the whole file and are not atomic. A crash mid-write can leave invalid JSON
//! behind, which the next read treats as empty.

use super::*;

/// Identifier to metadata mapping for one collection.
pub type MetadataMap = BTreeMap<String, PaperMetadata>;

/// Name of the sidecar file inside each collection directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Outcome of reading a collection's metadata file.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataLoad {
  /// The file parsed successfully
  Loaded(MetadataMap),
  /// There is no file (or it could not be opened)
  Missing,
  /// The file exists but does not hold a valid mapping
  Corrupt {
    /// Parser or I/O error message
    reason: String,
  },
}

impl MetadataLoad {
  /// The mapping to work with; empty for both fallback cases.
  pub fn into_map(self) -> MetadataMap {
    match self {
      MetadataLoad::Loaded(map) => map,
      MetadataLoad::Missing | MetadataLoad::Corrupt { .. } => MetadataMap::new(),
    }
  }

  /// Whether the file was read as-is rather than replaced by the empty fallback.
  pub fn is_loaded(&self) -> bool { matches!(self, MetadataLoad::Loaded(_)) }
}

/// Reads and writes the metadata files below a storage root.
#[derive(Debug, Clone)]
pub struct MetadataStore {
  /// Directory containing the collection directories
  root: PathBuf,
}

impl MetadataStore {
  /// Creates a store rooted at `root`. Nothing is touched on disk until [`initialize`] or the
  /// first write.
  ///
  /// [`initialize`]: MetadataStore::initialize
  pub fn new(root: impl AsRef<Path>) -> Self { Self { root: root.as_ref().to_path_buf() } }

  /// The storage root.
  pub fn root(&self) -> &Path { &self.root }

  /// Directory of a collection.
  pub fn collection_dir(&self, collection: Collection) -> PathBuf {
    self.root.join(collection.dir_name())
  }

  /// Path of a collection's metadata file.
  pub fn metadata_path(&self, collection: Collection) -> PathBuf {
    self.collection_dir(collection).join(METADATA_FILE)
  }

  /// Absolute path of a paper's PDF in `collection`.
  pub fn pdf_path(&self, id: &str, collection: Collection) -> PathBuf {
    self.collection_dir(collection).join(pdf_file_name(id))
  }

  /// Makes sure both collection directories and their metadata files exist.
  ///
  /// A metadata file that is empty or does not parse is reset to `{}`. Valid files are left alone,
  /// so calling this on every start is safe.
  ///
  /// # Errors
  ///
  /// Fails when a directory cannot be created or a reset file cannot be written.
  pub async fn initialize(&self) -> Result<()> {
    for collection in Collection::ALL {
      tokio::fs::create_dir_all(self.collection_dir(collection)).await?;
      match self.read(collection).await {
        MetadataLoad::Loaded(_) => trace!("{collection} metadata is valid"),
        MetadataLoad::Missing | MetadataLoad::Corrupt { .. } => {
          info!("Resetting {collection} metadata at {:?}", self.metadata_path(collection));
          self.write(collection, &MetadataMap::new()).await?;
        },
      }
    }
    Ok(())
  }

  /// Reads the mapping of `collection`, never failing.
  ///
  /// A file that cannot be opened is [`MetadataLoad::Missing`]; one that cannot be parsed (an
  /// empty file included) is [`MetadataLoad::Corrupt`] and logged as a warning.
  pub async fn read(&self, collection: Collection) -> MetadataLoad {
    let path = self.metadata_path(collection);
    let content = match tokio::fs::read_to_string(&path).await {
      Ok(content) => content,
      Err(e) => {
        debug!("No {collection} metadata at {path:?} ({e}), using an empty collection");
        return MetadataLoad::Missing;
      },
    };

    match serde_json::from_str::<MetadataMap>(&content) {
      Ok(map) => MetadataLoad::Loaded(map),
      Err(e) => {
        warn!("Corrupt {collection} metadata at {path:?}, using an empty collection: {e}");
        MetadataLoad::Corrupt { reason: e.to_string() }
      },
    }
  }

  /// Overwrites the metadata file of `collection` with `map`.
  ///
  /// The collection directory is created if needed. Failures are logged here and returned so
  /// the caller can report them.
  pub async fn write(&self, collection: Collection, map: &MetadataMap) -> Result<()> {
    let path = self.metadata_path(collection);
    let result = async {
      let json = serde_json::to_string_pretty(map)?;
      tokio::fs::create_dir_all(self.collection_dir(collection)).await?;
      tokio::fs::write(&path, json).await?;
      Ok::<_, PapyrusError>(())
    }
    .await;

    match &result {
      Ok(()) => trace!("Wrote {} {collection} entries to {path:?}", map.len()),
      Err(e) => error!("Failed to write {collection} metadata to {path:?}: {e}"),
    }
    result
  }
}
