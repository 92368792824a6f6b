//! Paper operations that keep metadata and PDF files in step.
//!
//! [`PaperRepository`] is the only component allowed to change a paper's metadata and its PDF
//! together. It reads and writes collections through the [`MetadataStore`] and moves, writes and
//! deletes the PDFs next to them.
//!
//! Mutations keyed by an identifier that is not stored anywhere are silent no-ops and return
//! `Ok(None)`. Lookups return `None`.
//!
//! # Status transitions
//!
//! Moving a paper between collections happens in this order:
//!
//! 1. read the source PDF
//! 2. write it to the destination collection
//! 3. delete the source PDF
//! 4. drop the identifier from the source `metadata.json`
//! 5. add it to the destination `metadata.json`
//!
//! A crash after step 3 and before step 5 leaves the PDF in the destination while metadata still
//! points at the source (or at neither). Nothing repairs that automatically;
//! [`PaperRepository::audit`] reports it.
//!
//! # Examples
//!
//! ```no_run
//! use papyrus::{repository::PaperRepository, store::MetadataStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = PaperRepository::new(MetadataStore::new("papers"));
//! repository.add_tag("2301.07041", "fhe").await?;
//! if let Some(paper) = repository.mark_as_read("2301.07041").await? {
//!   println!("Moved {} to {}", paper.title, paper.path.display());
//! }
//! # Ok(())
//! # }
//! ```

use super::*;
use crate::{
  catalog::CatalogEntry,
  store::{MetadataMap, MetadataStore},
};

/// Stores papers on disk and moves them between collections.
#[derive(Debug, Clone)]
pub struct PaperRepository {
  /// Metadata persistence
  store:  MetadataStore,
  /// HTTP client used for PDF downloads
  client: reqwest::Client,
}

/// Inconsistencies found by [`PaperRepository::audit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
  /// Identifiers present in both collections' metadata
  pub duplicated:    Vec<String>,
  /// Metadata entries whose PDF is not on disk
  pub missing_pdfs:  Vec<(Collection, String)>,
  /// PDFs in a collection directory that no metadata entry refers to
  pub orphaned_pdfs: Vec<PathBuf>,
}

impl AuditReport {
  /// Whether nothing was found.
  pub fn is_clean(&self) -> bool {
    self.duplicated.is_empty() && self.missing_pdfs.is_empty() && self.orphaned_pdfs.is_empty()
  }
}

impl PaperRepository {
  /// Creates a repository on top of `store`.
  pub fn new(store: MetadataStore) -> Self { Self { store, client: reqwest::Client::new() } }

  /// The underlying metadata store.
  pub fn store(&self) -> &MetadataStore { &self.store }

  /// Loads a collection, falling back to empty.
  async fn load(&self, collection: Collection) -> MetadataMap {
    self.store.read(collection).await.into_map()
  }

  /// Builds the in-memory view of a stored paper.
  fn local_paper(&self, metadata: PaperMetadata, collection: Collection) -> LocalPaper {
    let path = self.store.pdf_path(&metadata.id, collection);
    LocalPaper { metadata, collection, path }
  }

  /// Lists stored papers.
  ///
  /// With `Some(collection)` only that collection is listed. With `None` both are merged; callers
  /// should not rely on the order across collections.
  pub async fn list(&self, status: Option<Collection>) -> Vec<LocalPaper> {
    let collections = match status {
      Some(collection) => vec![collection],
      None => Collection::ALL.to_vec(),
    };

    let mut papers = Vec::new();
    for collection in collections {
      let map = self.load(collection).await;
      papers.extend(map.into_values().map(|metadata| self.local_paper(metadata, collection)));
    }
    papers
  }

  /// Finds a paper by identifier.
  ///
  /// Collections are scanned unread first, so an identifier present in both is reported from
  /// `unread`.
  pub async fn get(&self, id: &str) -> Option<LocalPaper> {
    for collection in Collection::ALL {
      if let Some(metadata) = self.load(collection).await.remove(id) {
        return Some(self.local_paper(metadata, collection));
      }
    }
    None
  }

  /// Stores a new paper in the unread collection.
  ///
  /// The PDF is written to `<unread>/<id>.pdf`, `downloaded_at` is set to now and `file_size` is
  /// set from `pdf`.
  ///
  /// # Errors
  ///
  /// - [`PapyrusError::DuplicatePaper`] if the identifier is already stored in either collection
  /// - I/O errors writing the PDF or metadata
  pub async fn create(&self, mut metadata: PaperMetadata, pdf: &[u8]) -> Result<LocalPaper> {
    if let Some(existing) = self.get(&metadata.id).await {
      return Err(PapyrusError::DuplicatePaper(existing.metadata.title));
    }

    let collection = Collection::Unread;
    let path = self.store.pdf_path(&metadata.id, collection);
    tokio::fs::create_dir_all(self.store.collection_dir(collection)).await?;
    debug!("Writing PDF to path: {path:?}");
    tokio::fs::write(&path, pdf).await?;

    metadata.downloaded_at = now_millis();
    metadata.file_size = pdf.len() as u64;
    let mut map = self.load(collection).await;
    map.insert(metadata.id.clone(), metadata.clone());
    self.store.write(collection, &map).await?;

    info!("Stored {} in {collection}", metadata.id);
    Ok(LocalPaper { metadata, collection, path })
  }

  /// Downloads the PDF of a catalog entry and stores it in the unread collection.
  ///
  /// # Errors
  ///
  /// - [`PapyrusError::DuplicatePaper`] if the paper is already stored
  /// - [`PapyrusError::Network`] or [`PapyrusError::ApiError`] if the download fails
  pub async fn download(&self, entry: &CatalogEntry) -> Result<LocalPaper> {
    if let Some(existing) = self.get(&entry.id).await {
      return Err(PapyrusError::DuplicatePaper(existing.metadata.title));
    }

    let response = self.client.get(&entry.pdf_url).send().await?;
    if !response.status().is_success() {
      trace!("{} pdf_url response: {response:?}", entry.id);
      return Err(PapyrusError::ApiError(format!(
        "Failed to download PDF: {}",
        response.status()
      )));
    }

    let bytes = response.bytes().await?;
    self.create(PaperMetadata::from_entry(entry, bytes.len() as u64), &bytes).await
  }

  /// Moves a paper from `unread` to `read`.
  ///
  /// Returns the paper as stored afterwards, or `None` if it was not in `unread`.
  pub async fn mark_as_read(&self, id: &str) -> Result<Option<LocalPaper>> {
    self.transition(id, Collection::Unread, Collection::Read).await
  }

  /// Moves a paper from `read` back to `unread`.
  ///
  /// Returns the paper as stored afterwards, or `None` if it was not in `read`.
  pub async fn mark_as_unread(&self, id: &str) -> Result<Option<LocalPaper>> {
    self.transition(id, Collection::Read, Collection::Unread).await
  }

  /// Moves a paper's PDF and metadata from `from` to `to`.
  ///
  /// See the [module documentation](self) for the order of steps and the window a crash leaves
  /// behind. The metadata record is carried over unchanged.
  ///
  /// # Errors
  ///
  /// - [`PapyrusError::PdfMissing`] if the source PDF is not on disk; nothing is changed
  /// - I/O errors from writing the destination PDF, removing the source PDF (other than it already
  ///   being gone) or writing either metadata file
  pub async fn transition(
    &self,
    id: &str,
    from: Collection,
    to: Collection,
  ) -> Result<Option<LocalPaper>> {
    if from == to {
      return Ok(None);
    }

    let mut source = self.load(from).await;
    let Some(metadata) = source.get(id).cloned() else {
      debug!("{id} is not in {from}, nothing to move");
      return Ok(None);
    };

    let source_path = self.store.pdf_path(id, from);
    let destination_path = self.store.pdf_path(id, to);

    let bytes = match tokio::fs::read(&source_path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound =>
        return Err(PapyrusError::PdfMissing { id: id.to_string(), path: source_path }),
      Err(e) => return Err(e.into()),
    };

    tokio::fs::create_dir_all(self.store.collection_dir(to)).await?;
    tokio::fs::write(&destination_path, &bytes).await?;
    remove_file_if_exists(&source_path).await?;
    trace!("Moved {source_path:?} to {destination_path:?}");

    source.remove(id);
    self.store.write(from, &source).await?;

    let mut destination = self.load(to).await;
    destination.insert(id.to_string(), metadata.clone());
    self.store.write(to, &destination).await?;

    info!("Moved {id} from {from} to {to}");
    Ok(Some(LocalPaper { metadata, collection: to, path: destination_path }))
  }

  /// Deletes a paper's PDF and metadata.
  ///
  /// Returns the removed paper, or `None` if no collection held it. Calling it again for the same
  /// identifier is a no-op.
  ///
  /// # Errors
  ///
  /// I/O errors removing the PDF (a missing PDF is fine) or writing the metadata file.
  pub async fn delete(&self, id: &str) -> Result<Option<LocalPaper>> {
    for collection in Collection::ALL {
      let mut map = self.load(collection).await;
      let Some(metadata) = map.remove(id) else {
        continue;
      };

      let paper = self.local_paper(metadata, collection);
      remove_file_if_exists(&paper.path).await?;
      self.store.write(collection, &map).await?;

      info!("Deleted {id} from {collection}");
      return Ok(Some(paper));
    }

    debug!("{id} is not stored, nothing to delete");
    Ok(None)
  }

  /// Stars or un-stars a paper.
  pub async fn set_starred(&self, id: &str, starred: bool) -> Result<Option<LocalPaper>> {
    self.update(id, |metadata| metadata.starred = starred).await
  }

  /// Archives or un-archives a paper.
  pub async fn set_archived(&self, id: &str, archived: bool) -> Result<Option<LocalPaper>> {
    self.update(id, |metadata| metadata.archived = archived).await
  }

  /// Adds a tag to a paper. Adding a tag the paper already has changes nothing.
  pub async fn add_tag(&self, id: &str, tag: &str) -> Result<Option<LocalPaper>> {
    self
      .update(id, |metadata| {
        metadata.tags.insert(tag);
      })
      .await
  }

  /// Removes a tag from a paper by exact match.
  pub async fn remove_tag(&self, id: &str, tag: &str) -> Result<Option<LocalPaper>> {
    self
      .update(id, |metadata| {
        metadata.tags.remove(tag);
      })
      .await
  }

  /// Applies `transform` to the first stored record for `id` and persists that collection only.
  async fn update(
    &self,
    id: &str,
    transform: impl FnOnce(&mut PaperMetadata),
  ) -> Result<Option<LocalPaper>> {
    for collection in Collection::ALL {
      let mut map = self.load(collection).await;
      if let Some(metadata) = map.get_mut(id) {
        transform(metadata);
        let paper = self.local_paper(metadata.clone(), collection);
        self.store.write(collection, &map).await?;
        return Ok(Some(paper));
      }
    }

    debug!("{id} is not stored, nothing to update");
    Ok(None)
  }

  /// Checks metadata against the PDFs on disk without changing anything.
  ///
  /// # Errors
  ///
  /// Fails if a collection directory exists but cannot be listed.
  pub async fn audit(&self) -> Result<AuditReport> {
    let mut report = AuditReport::default();
    let unread = self.load(Collection::Unread).await;
    let read = self.load(Collection::Read).await;

    report.duplicated = unread.keys().filter(|id| read.contains_key(*id)).cloned().collect();

    for (collection, map) in [(Collection::Unread, &unread), (Collection::Read, &read)] {
      for id in map.keys() {
        if !tokio::fs::try_exists(self.store.pdf_path(id, collection)).await? {
          report.missing_pdfs.push((collection, id.clone()));
        }
      }

      let dir = self.store.collection_dir(collection);
      let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => continue,
        Err(e) => return Err(e.into()),
      };
      while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "pdf")
          && !map.keys().any(|id| entry.file_name().to_string_lossy() == pdf_file_name(id))
        {
          report.orphaned_pdfs.push(path);
        }
      }
    }

    if !report.is_clean() {
      warn!("Audit found inconsistencies: {report:?}");
    }
    Ok(report)
  }
}
