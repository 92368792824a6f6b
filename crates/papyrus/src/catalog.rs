//! Remote catalog search.
//!
//! The [`Catalog`] trait is the seam between the library and whatever remote index papers are
//! found in. [`ArxivClient`] implements it over the arXiv Atom API. Search results come back as
//! [`CatalogEntry`] records, which is exactly what [`PaperRepository::download`] consumes.
//!
//! [`PaperRepository::download`]: crate::repository::PaperRepository::download
//!
//! # Examples
//!
//! ```no_run
//! use papyrus::{
//!   catalog::{ArxivClient, SearchQuery, SortBy},
//!   prelude::*,
//! };
//!
//! # async fn example() -> Result<(), PapyrusError> {
//! let query = SearchQuery::new("zero knowledge").with_max_results(5).with_sort_by(SortBy::SubmittedDate);
//! for entry in ArxivClient::new().search(&query).await? {
//!   println!("{}: {}", entry.id, entry.title);
//! }
//! # Ok(())
//! # }
//! ```

use super::*;

/// Default arXiv API endpoint.
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// A paper as returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
  /// Catalog identifier, including any version suffix (`2301.07041v2`)
  pub id:               String,
  /// Title with whitespace collapsed
  pub title:            String,
  /// Abstract with whitespace collapsed
  pub abstract_text:    String,
  /// Author names in order
  pub authors:          Vec<String>,
  /// All categories in order
  pub categories:       Vec<String>,
  /// Primary category
  pub primary_category: String,
  /// Direct PDF link
  pub pdf_url:          String,
  /// Optional DOI
  pub doi:              Option<String>,
  /// Optional journal reference
  pub journal_ref:      Option<String>,
  /// Optional author comment
  pub comment:          Option<String>,
  /// First publication date
  pub published:        DateTime<Utc>,
  /// Last update date
  pub updated:          DateTime<Utc>,
}

/// Field results are ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
  /// Best match first
  #[default]
  Relevance,
  /// By last update
  LastUpdatedDate,
  /// By original submission
  SubmittedDate,
}

/// Direction of the ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
  /// Smallest first
  Ascending,
  /// Largest first
  #[default]
  Descending,
}

impl Display for SortBy {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SortBy::Relevance => write!(f, "relevance"),
      SortBy::LastUpdatedDate => write!(f, "lastUpdatedDate"),
      SortBy::SubmittedDate => write!(f, "submittedDate"),
    }
  }
}

impl FromStr for SortBy {
  type Err = PapyrusError;

  fn from_str(s: &str) -> Result<Self> {
    match &s.to_lowercase() as &str {
      "relevance" => Ok(SortBy::Relevance),
      "lastupdateddate" | "updated" => Ok(SortBy::LastUpdatedDate),
      "submitteddate" | "submitted" => Ok(SortBy::SubmittedDate),
      s => Err(PapyrusError::Config(format!("Unknown sort field \"{s}\""))),
    }
  }
}

impl Display for SortOrder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SortOrder::Ascending => write!(f, "ascending"),
      SortOrder::Descending => write!(f, "descending"),
    }
  }
}

impl FromStr for SortOrder {
  type Err = PapyrusError;

  fn from_str(s: &str) -> Result<Self> {
    match &s.to_lowercase() as &str {
      "ascending" | "asc" => Ok(SortOrder::Ascending),
      "descending" | "desc" => Ok(SortOrder::Descending),
      s => Err(PapyrusError::Config(format!("Unknown sort order \"{s}\""))),
    }
  }
}

/// Free-text search with pagination and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
  /// The search text
  pub text:        String,
  /// Offset of the first result
  pub start:       usize,
  /// Page size
  pub max_results: usize,
  /// Ordering field
  pub sort_by:     SortBy,
  /// Ordering direction
  pub sort_order:  SortOrder,
}

impl SearchQuery {
  /// A query for `text` returning the first ten results by relevance.
  pub fn new(text: impl Into<String>) -> Self {
    Self {
      text:        text.into(),
      start:       0,
      max_results: 10,
      sort_by:     SortBy::default(),
      sort_order:  SortOrder::default(),
    }
  }

  /// Sets the offset of the first result.
  pub fn with_start(mut self, start: usize) -> Self {
    self.start = start;
    self
  }

  /// Sets the page size.
  pub fn with_max_results(mut self, max_results: usize) -> Self {
    self.max_results = max_results;
    self
  }

  /// Sets the ordering field.
  pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
    self.sort_by = sort_by;
    self
  }

  /// Sets the ordering direction.
  pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
    self.sort_order = sort_order;
    self
  }
}

/// A remote index that can be searched for papers.
#[async_trait]
pub trait Catalog: Send + Sync {
  /// Runs `query` and returns one page of results.
  async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogEntry>>;

  /// Fetches a single paper by its catalog identifier.
  async fn lookup(&self, id: &str) -> Result<Option<CatalogEntry>>;
}

/// Client for the arXiv Atom API.
#[derive(Debug, Clone)]
pub struct ArxivClient {
  /// HTTP client
  client:   reqwest::Client,
  /// Query endpoint
  base_url: String,
}

impl Default for ArxivClient {
  fn default() -> Self { Self::new() }
}

impl ArxivClient {
  /// A client for the public arXiv endpoint.
  pub fn new() -> Self { Self { client: reqwest::Client::new(), base_url: ARXIV_API_URL.into() } }

  /// Points the client at a different endpoint, e.g. a mirror.
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }
}

#[async_trait]
impl Catalog for ArxivClient {
  async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogEntry>> {
    debug!("Searching arXiv for {query:?}");
    let response = self
      .client
      .get(&self.base_url)
      .query(&[
        ("search_query", format!("all:{}", query.text)),
        ("start", query.start.to_string()),
        ("max_results", query.max_results.to_string()),
        ("sortBy", query.sort_by.to_string()),
        ("sortOrder", query.sort_order.to_string()),
      ])
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(PapyrusError::ApiError(format!("arXiv search failed: {}", response.status())));
    }

    let body = response.text().await?;
    trace!("arXiv response: {body}");
    parse_feed(&body)
  }

  async fn lookup(&self, id: &str) -> Result<Option<CatalogEntry>> {
    debug!("Looking up {id} on arXiv");
    let response = self.client.get(&self.base_url).query(&[("id_list", id)]).send().await?;
    if !response.status().is_success() {
      return Err(PapyrusError::ApiError(format!("arXiv lookup failed: {}", response.status())));
    }
    Ok(parse_feed(&response.text().await?)?.into_iter().next())
  }
}

/// Atom feed, namespaces stripped.
#[derive(Debug, Deserialize)]
struct Feed {
  /// Result entries
  #[serde(rename = "entry", default)]
  entries: Vec<Entry>,
}

/// One Atom entry.
#[derive(Debug, Deserialize)]
struct Entry {
  /// `http://arxiv.org/abs/<id>`
  id:               String,
  /// Last update
  updated:          DateTime<Utc>,
  /// First publication
  published:        DateTime<Utc>,
  /// Title, may span lines
  title:            String,
  /// Abstract, may span lines
  summary:          String,
  /// Authors
  #[serde(rename = "author", default)]
  authors:          Vec<AtomAuthor>,
  /// Abstract page, PDF and DOI links
  #[serde(rename = "link", default)]
  links:            Vec<Link>,
  /// Primary category
  primary_category: Option<Category>,
  /// All categories
  #[serde(rename = "category", default)]
  categories:       Vec<Category>,
  /// DOI
  doi:              Option<String>,
  /// Journal reference
  journal_ref:      Option<String>,
  /// Author comment
  comment:          Option<String>,
}

/// Atom author element.
#[derive(Debug, Deserialize)]
struct AtomAuthor {
  /// Display name
  name: String,
}

/// Atom link element.
#[derive(Debug, Deserialize)]
struct Link {
  /// Target
  #[serde(rename = "@href")]
  href:  String,
  /// `pdf` or `doi` on the related links
  #[serde(rename = "@title")]
  title: Option<String>,
}

/// Atom category element.
#[derive(Debug, Deserialize)]
struct Category {
  /// Category name such as `cs.CR`
  #[serde(rename = "@term")]
  term: String,
}

/// Removes namespace declarations and prefixes so elements can be matched by local name.
fn strip_xml_namespaces(xml: &str) -> String {
  lazy_static! {
    static ref XMLNS: Regex = Regex::new(r#"\s+xmlns(?::\w+)?="[^"]*""#).unwrap();
    static ref PREFIX: Regex = Regex::new(r"<(/?)\w+:").unwrap();
  }
  let result = XMLNS.replace_all(xml, "");
  PREFIX.replace_all(&result, "<$1").into_owned()
}

/// Collapses runs of whitespace into single spaces.
fn collapse_whitespace(text: &str) -> String {
  lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
  }
  WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Parses an arXiv Atom response into catalog entries.
///
/// # Errors
///
/// - [`PapyrusError::Xml`] if the feed is malformed
/// - [`PapyrusError::ApiError`] if arXiv reported a query error in place of results
pub fn parse_feed(xml: &str) -> Result<Vec<CatalogEntry>> {
  let feed: Feed = quick_xml::de::from_str(&strip_xml_namespaces(xml))?;
  feed.entries.into_iter().map(CatalogEntry::try_from).collect()
}

impl TryFrom<Entry> for CatalogEntry {
  type Error = PapyrusError;

  fn try_from(entry: Entry) -> Result<Self> {
    if entry.id.contains("/api/errors") {
      return Err(PapyrusError::ApiError(collapse_whitespace(&entry.summary)));
    }

    let id = entry
      .id
      .rsplit_once("/abs/")
      .map(|(_, id)| id.to_string())
      .ok_or_else(|| PapyrusError::ApiError(format!("Unexpected entry id {}", entry.id)))?;

    let pdf_url = entry
      .links
      .iter()
      .find(|link| link.title.as_deref() == Some("pdf"))
      .map(|link| link.href.clone())
      .unwrap_or_else(|| entry.id.replace("/abs/", "/pdf/"));

    let categories: Vec<String> = entry.categories.into_iter().map(|c| c.term).collect();
    let primary_category = entry
      .primary_category
      .map(|c| c.term)
      .or_else(|| categories.first().cloned())
      .unwrap_or_default();

    Ok(CatalogEntry {
      id,
      title: collapse_whitespace(&entry.title),
      abstract_text: collapse_whitespace(&entry.summary),
      authors: entry.authors.into_iter().map(|a| collapse_whitespace(&a.name)).collect(),
      categories,
      primary_category,
      pdf_url,
      doi: entry.doi.map(|s| s.trim().to_string()),
      journal_ref: entry.journal_ref.map(|s| collapse_whitespace(&s)),
      comment: entry.comment.map(|s| collapse_whitespace(&s)),
      published: entry.published,
      updated: entry.updated,
    })
  }
}
