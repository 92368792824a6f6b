//! Module for maintaining the conversion cache.

use super::*;

/// Cache operations
#[derive(Subcommand, Clone)]
pub enum CacheCommands {
  /// List cached conversions, most recently used first
  List,
  /// Remove every cached conversion after confirmation
  Clear,
  /// Delete converter outputs the cache index no longer refers to
  Prune,
}

/// Function for the [`Commands::Cache`] in the CLI.
pub async fn cache<I: UserInteraction>(
  interaction: &I,
  papyrus: &mut Papyrus,
  cmd: CacheCommands,
) -> Result<()> {
  let cache = papyrus.pipeline.cache_mut();
  match cmd {
    CacheCommands::List => {
      if cache.is_empty() {
        return interaction.reply(ResponseContent::Info("The conversion cache is empty"));
      }
      for entry in cache.entries() {
        println!(
          "{} {} {} {}",
          style(BULLET).dim(),
          style(entry.pdf_path.display()).yellow(),
          style("→").dim(),
          entry.output_path.display()
        );
      }
      interaction.reply(ResponseContent::Info(&format!(
        "{} cached conversions in {}",
        cache.len(),
        cache.dir().display()
      )))
    },
    CacheCommands::Clear => {
      if !interaction.confirm(&format!("Remove all {} cached conversions?", cache.len()))? {
        return interaction.reply(ResponseContent::Info("Operation cancelled"));
      }
      cache.clear().await?;
      interaction.reply(ResponseContent::Success("Conversion cache cleared"))
    },
    CacheCommands::Prune => {
      let pattern = format!(
        "{}/docling-*",
        glob::Pattern::escape(&cache.dir().to_string_lossy())
      );
      let orphans: Vec<PathBuf> = glob::glob(&pattern)?
        .flatten()
        .filter(|path| !cache.entries().iter().any(|entry| &entry.output_path == path))
        .collect();
      if orphans.is_empty() {
        return interaction.reply(ResponseContent::Info("No orphaned outputs to prune"));
      }
      if !interaction.confirm(&format!("Delete {} orphaned outputs?", orphans.len()))? {
        return interaction.reply(ResponseContent::Info("Operation cancelled"));
      }

      for path in &orphans {
        trace!("Pruning {path:?}");
        if path.is_dir() {
          tokio::fs::remove_dir_all(path).await?;
        } else {
          tokio::fs::remove_file(path).await?;
        }
      }
      interaction
        .reply(ResponseContent::Success(&format!("Pruned {} orphaned outputs", orphans.len())))
    },
  }
}
