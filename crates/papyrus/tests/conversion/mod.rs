use super::*;

mod cache;
#[cfg(unix)]
mod pipeline;

/// Writes a Markdown artifact into the cache directory and returns its path.
pub fn write_artifact(cache_dir: &Path, name: &str) -> PathBuf {
  let path = cache_dir.join(format!("docling-{name}.md"));
  std::fs::write(&path, format!("# {name}")).unwrap();
  path
}
