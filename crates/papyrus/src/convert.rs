//! The external converter pipeline and Markdown part extraction.
//!
//! PDFs are turned into Markdown by an external command (`docling` by default) invoked as
//!
//! ```text
//! <tool> <absolute input> --to md --output <absolute output>
//! ```
//!
//! Depending on the tool and document, the output path ends up as the Markdown file itself or as a
//! directory holding one Markdown file next to its assets. [`ConversionOutput`] tells the two apart
//! once, right after the tool has run or a cached location was looked up.
//!
//! Converted Markdown embeds figures as `data:image/...` URIs. [`extract_parts`] splits it into
//! alternating [`Part::Text`] and [`Part::Image`] segments for display.
//!
//! # Examples
//!
//! ```
//! use papyrus::convert::{extract_parts, Part};
//!
//! let parts = extract_parts("A ![x](data:image/png;base64,Zm9v) B");
//! assert_eq!(parts, vec![
//!   Part::Text("A ".into()),
//!   Part::Image("data:image/png;base64,Zm9v".into()),
//!   Part::Text(" B".into()),
//! ]);
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::process::Command;

use super::*;
use crate::cache::{normalize_path, remove_artifact, ConversionCache};

/// A contiguous segment of converted Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
  /// Plain Markdown text, never empty
  Text(String),
  /// The full `data:image/...` URI of an embedded image
  Image(String),
}

impl Part {
  /// Decodes an image part into its MIME type and raw bytes.
  ///
  /// # Errors
  ///
  /// Returns [`PapyrusError::InvalidImage`] for text parts, URIs that are not base64 encoded and
  /// payloads that do not decode.
  pub fn decode_image(&self) -> Result<(String, Vec<u8>)> {
    let Part::Image(uri) = self else {
      return Err(PapyrusError::InvalidImage("not an image part".into()));
    };

    let (header, payload) = uri
      .strip_prefix("data:")
      .and_then(|rest| rest.split_once(','))
      .ok_or_else(|| PapyrusError::InvalidImage(format!("malformed data URI {uri:.40}")))?;
    let mime = header
      .strip_suffix(";base64")
      .ok_or_else(|| PapyrusError::InvalidImage(format!("{header} is not base64 encoded")))?;
    let bytes = BASE64
      .decode(payload.trim())
      .map_err(|e| PapyrusError::InvalidImage(format!("{mime} payload: {e}")))?;
    Ok((mime.to_string(), bytes))
  }

  /// Whether this is a text part.
  pub fn is_text(&self) -> bool { matches!(self, Part::Text(_)) }
}

/// Splits Markdown into text and embedded image parts, in document order.
///
/// Only inline images whose target is a `data:image/` URI count; links to image files stay in the
/// text. Empty text segments are never emitted, so a document made of one image yields exactly one
/// part and a document with no images yields its whole text.
pub fn extract_parts(markdown: &str) -> Vec<Part> {
  lazy_static! {
    static ref DATA_IMAGE: Regex = Regex::new(r"!\[[^\]]*\]\((data:image/[^)\s]+)\)").unwrap();
  }

  let mut parts = Vec::new();
  let mut last = 0;
  for captures in DATA_IMAGE.captures_iter(markdown) {
    let (Some(whole), Some(uri)) = (captures.get(0), captures.get(1)) else { continue };
    if whole.start() > last {
      parts.push(Part::Text(markdown[last..whole.start()].to_string()));
    }
    parts.push(Part::Image(uri.as_str().to_string()));
    last = whole.end();
  }
  if last < markdown.len() {
    parts.push(Part::Text(markdown[last..].to_string()));
  }
  parts
}

/// Where a conversion left its Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutput {
  /// The output path is the Markdown file
  SingleFile(PathBuf),
  /// The output path is a directory; `markdown` is the Markdown file inside it
  DirectoryWithMarkdown {
    /// The output directory
    dir:      PathBuf,
    /// The first Markdown file found in it
    markdown: PathBuf,
  },
}

impl ConversionOutput {
  /// Inspects `path` and works out which kind of output it is.
  ///
  /// For directories the first `.md` or `.markdown` file by name is taken.
  ///
  /// # Errors
  ///
  /// [`ConversionError::MissingMarkdown`] if `path` does not exist or is a directory without a
  /// Markdown file.
  pub async fn resolve(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let missing = || ConversionError::MissingMarkdown(path.to_path_buf());

    let meta = tokio::fs::metadata(path).await.map_err(|_| missing())?;
    if !meta.is_dir() {
      return Ok(ConversionOutput::SingleFile(path.to_path_buf()));
    }

    let mut candidates = Vec::new();
    let mut read_dir = tokio::fs::read_dir(path).await?;
    while let Some(entry) = read_dir.next_entry().await? {
      let candidate = entry.path();
      let is_markdown = candidate
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"));
      if is_markdown && entry.file_type().await?.is_file() {
        candidates.push(candidate);
      }
    }
    candidates.sort();

    let markdown = candidates.into_iter().next().ok_or_else(missing)?;
    Ok(ConversionOutput::DirectoryWithMarkdown { dir: path.to_path_buf(), markdown })
  }

  /// The location recorded in the cache.
  pub fn location(&self) -> &Path {
    match self {
      ConversionOutput::SingleFile(path) => path,
      ConversionOutput::DirectoryWithMarkdown { dir, .. } => dir,
    }
  }

  /// The Markdown file.
  pub fn markdown_path(&self) -> &Path {
    match self {
      ConversionOutput::SingleFile(path) => path,
      ConversionOutput::DirectoryWithMarkdown { markdown, .. } => markdown,
    }
  }

  /// Reads the Markdown text.
  pub async fn read(&self) -> Result<String> {
    let path = self.markdown_path();
    tokio::fs::read_to_string(path)
      .await
      .map_err(|source| ConversionError::Read { path: path.to_path_buf(), source }.into())
  }
}

/// Converts PDFs to Markdown through the external tool, reusing cached results.
#[derive(Debug)]
pub struct ConversionPipeline {
  /// Results of earlier conversions
  cache: ConversionCache,
  /// Converter command
  tool:  String,
}

impl ConversionPipeline {
  /// A pipeline running `tool` and caching into `cache`.
  pub fn new(cache: ConversionCache, tool: impl Into<String>) -> Self {
    Self { cache, tool: tool.into() }
  }

  /// The converter command.
  pub fn tool(&self) -> &str { &self.tool }

  /// The result cache.
  pub fn cache(&self) -> &ConversionCache { &self.cache }

  /// The result cache, for maintenance such as [`ConversionCache::clear`].
  pub fn cache_mut(&mut self) -> &mut ConversionCache { &mut self.cache }

  /// Converts `path` and splits the result into parts.
  ///
  /// The parts are recomputed from the Markdown on every call; only the conversion is cached.
  pub async fn parts(&mut self, path: impl AsRef<Path>) -> Result<Vec<Part>> {
    Ok(extract_parts(&self.markdown(path).await?))
  }

  /// Converts `path` to Markdown, or reads the cached conversion.
  ///
  /// # Errors
  ///
  /// Every failure specific to conversion is a [`PapyrusError::Conversion`]: the source file
  /// cannot be read, the tool cannot be started or exits unsuccessfully, no Markdown is left
  /// behind, or a cached directory no longer contains Markdown.
  pub async fn markdown(&mut self, path: impl AsRef<Path>) -> Result<String> {
    let source = normalize_path(path)?;

    if let Some(location) = self.cache.lookup(&source).await? {
      return ConversionOutput::resolve(&location).await?.read().await;
    }

    if let Err(e) = tokio::fs::metadata(&source).await {
      return Err(ConversionError::MissingSource { path: source, source: e }.into());
    }
    let output = self.output_path_for(&source);
    match self.run(&source, &output).await {
      Ok((resolved, markdown)) => {
        self.cache.insert(&source, resolved.location()).await?;
        Ok(markdown)
      },
      Err(e) => {
        warn!("Conversion of {source:?} failed, cleaning up {output:?}: {e}");
        remove_artifact(&output).await;
        Err(e)
      },
    }
  }

  /// Runs the tool and reads what it produced.
  async fn run(&self, source: &Path, output: &Path) -> Result<(ConversionOutput, String)> {
    info!("Converting {source:?} with `{}`", self.tool);
    let result = Command::new(&self.tool)
      .arg(source)
      .args(["--to", "md", "--output"])
      .arg(output)
      .output()
      .await
      .map_err(|source| ConversionError::Spawn { tool: self.tool.clone(), source })?;

    if !result.status.success() {
      return Err(
        ConversionError::Failed {
          status: result.status,
          stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        }
        .into(),
      );
    }
    trace!("Converter stdout: {}", String::from_utf8_lossy(&result.stdout));

    let resolved = ConversionOutput::resolve(output).await?;
    let markdown = resolved.read().await?;
    debug!("Converted {source:?} into {:?}", resolved.markdown_path());
    Ok((resolved, markdown))
  }

  /// A fresh output path in the cache directory that no other conversion will pick.
  fn output_path_for(&self, source: &Path) -> PathBuf {
    let stem = source.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    self.cache.dir().join(format!(
      "docling-{}-{}-{}.md",
      sanitize_name(&stem),
      Utc::now().timestamp_millis(),
      &suffix[..8]
    ))
  }
}

/// Replaces everything but ASCII letters, digits, `.`, `_` and `-` with `_`.
fn sanitize_name(name: &str) -> String {
  lazy_static! {
    static ref UNSAFE: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
  }
  let sanitized = UNSAFE.replace_all(name, "_");
  if sanitized.is_empty() {
    "document".to_string()
  } else {
    sanitized.into_owned()
  }
}
