//! Paper metadata, collections and tags.
//!
//! A paper lives in exactly one [`Collection`]. Its [`PaperMetadata`] is what gets persisted in
//! the collection's `metadata.json`; a [`LocalPaper`] is the in-memory view handed to callers, which
//! adds the collection the paper was found in and the absolute path of its PDF.
//!
//! # Examples
//!
//! ```
//! use papyrus::paper::{Collection, Tags};
//!
//! let mut tags = Tags::default();
//! assert!(tags.insert("crypto"));
//! assert!(!tags.insert("crypto"));
//! assert_eq!(tags.as_slice(), ["crypto"]);
//!
//! assert_eq!("read".parse::<Collection>().unwrap(), Collection::Read);
//! ```

use std::ops::Deref;

use super::*;
use crate::catalog::CatalogEntry;

/// One of the two partitions papers are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
  /// Papers that were downloaded but not read yet
  Unread,
  /// Papers marked as read
  Read,
}

impl Collection {
  /// Both collections in scan order. Lookups check `Unread` first, so a paper that somehow ended up
  /// in both is reported from `Unread`.
  pub const ALL: [Collection; 2] = [Collection::Unread, Collection::Read];

  /// Name of the directory holding this collection below the storage root.
  pub fn dir_name(self) -> &'static str {
    match self {
      Collection::Unread => "unreadPapers",
      Collection::Read => "readPapers",
    }
  }

  /// The collection a status transition out of `self` ends in.
  pub fn other(self) -> Self {
    match self {
      Collection::Unread => Collection::Read,
      Collection::Read => Collection::Unread,
    }
  }
}

impl Display for Collection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Collection::Unread => write!(f, "unread"),
      Collection::Read => write!(f, "read"),
    }
  }
}

impl FromStr for Collection {
  type Err = PapyrusError;

  fn from_str(s: &str) -> Result<Self> {
    match &s.to_lowercase() as &str {
      "unread" => Ok(Collection::Unread),
      "read" => Ok(Collection::Read),
      _ => Err(PapyrusError::InvalidCollection(s.to_owned())),
    }
  }
}

/// Ordered set of tags.
///
/// JSON has no set type, so tags are stored as a list. Every mutation keeps the list free of
/// duplicates and preserves first-seen order, and deserialization drops repeated entries from
/// hand-edited files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
  /// Appends `tag` unless it is already present. Returns whether the tag was added.
  pub fn insert(&mut self, tag: impl Into<String>) -> bool {
    let tag = tag.into();
    if self.contains(&tag) {
      false
    } else {
      self.0.push(tag);
      true
    }
  }

  /// Removes `tag` by exact match. Returns whether anything was removed.
  pub fn remove(&mut self, tag: &str) -> bool {
    let before = self.0.len();
    self.0.retain(|t| t != tag);
    self.0.len() != before
  }

  /// Whether `tag` is present.
  pub fn contains(&self, tag: &str) -> bool { self.0.iter().any(|t| t == tag) }

  /// Tags in insertion order.
  pub fn as_slice(&self) -> &[String] { &self.0 }

  /// Number of tags.
  pub fn len(&self) -> usize { self.0.len() }

  /// Whether there are no tags.
  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<S: Into<String>> FromIterator<S> for Tags {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let mut tags = Tags::default();
    for tag in iter {
      tags.insert(tag);
    }
    tags
  }
}

impl<'de> Deserialize<'de> for Tags {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
  where D: serde::Deserializer<'de> {
    Ok(Vec::<String>::deserialize(deserializer)?.into_iter().collect())
  }
}

/// Everything persisted about a downloaded paper.
///
/// Field names follow the `metadata.json` format: camelCase keys, ISO-8601 strings for
/// `published`/`updated` and epoch milliseconds for `downloadedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperMetadata {
  /// Catalog identifier, also the PDF filename stem
  pub id:               String,
  /// Full title
  pub title:            String,
  /// Abstract text
  #[serde(rename = "abstract")]
  pub abstract_text:    String,
  /// Author names in catalog order
  pub authors:          Vec<String>,
  /// Subject categories in catalog order
  pub categories:       Vec<String>,
  /// The catalog's primary category
  pub primary_category: String,
  /// Where the PDF was downloaded from
  pub pdf_url:          String,
  /// Optional DOI
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub doi:              Option<String>,
  /// Optional journal reference
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub journal_ref:      Option<String>,
  /// Optional author comment
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment:          Option<String>,
  /// First publication date
  pub published:        DateTime<Utc>,
  /// Last update date
  pub updated:          DateTime<Utc>,
  /// When the PDF was stored locally
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub downloaded_at:    DateTime<Utc>,
  /// Size of the stored PDF in bytes
  pub file_size:        u64,
  /// Starred by the user
  #[serde(default)]
  pub starred:          bool,
  /// Archived by the user
  #[serde(default)]
  pub archived:         bool,
  /// User tags
  #[serde(default)]
  pub tags:             Tags,
}

impl PaperMetadata {
  /// Seeds metadata for a freshly downloaded catalog entry.
  ///
  /// `downloaded_at` is truncated to whole milliseconds, matching what survives a round trip
  /// through `metadata.json`.
  pub fn from_entry(entry: &CatalogEntry, file_size: u64) -> Self {
    Self {
      id: entry.id.clone(),
      title: entry.title.clone(),
      abstract_text: entry.abstract_text.clone(),
      authors: entry.authors.clone(),
      categories: entry.categories.clone(),
      primary_category: entry.primary_category.clone(),
      pdf_url: entry.pdf_url.clone(),
      doi: entry.doi.clone(),
      journal_ref: entry.journal_ref.clone(),
      comment: entry.comment.clone(),
      published: entry.published,
      updated: entry.updated,
      downloaded_at: now_millis(),
      file_size,
      starred: false,
      archived: false,
      tags: Tags::default(),
    }
  }
}

/// Current time at millisecond precision.
pub(crate) fn now_millis() -> DateTime<Utc> {
  let now = Utc::now();
  DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// File name of the PDF for a paper identifier.
///
/// Old-style arXiv identifiers such as `math.AG/0601001` contain a slash, which is replaced so the
/// PDF stays directly inside its collection directory.
pub fn pdf_file_name(id: &str) -> String { format!("{}.pdf", id.replace('/', "_")) }

/// A stored paper together with where it lives.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPaper {
  /// The persisted metadata
  pub metadata:   PaperMetadata,
  /// The collection whose `metadata.json` holds this paper
  pub collection: Collection,
  /// Absolute path of the PDF, derived from the identifier and collection
  pub path:       PathBuf,
}

impl Deref for LocalPaper {
  type Target = PaperMetadata;

  fn deref(&self) -> &Self::Target { &self.metadata }
}
