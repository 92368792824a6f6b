//! Module for listing stored papers and showing one of them.

use super::*;

/// Arguments for [`Commands::List`]
#[derive(Args, Clone)]
pub struct ListOptions {
  /// Only list one collection (unread or read)
  #[arg(long, short)]
  pub status: Option<Collection>,

  /// Only starred papers
  #[arg(long)]
  pub starred: bool,

  /// Include archived papers, which are hidden by default
  #[arg(long)]
  pub archived: bool,

  /// Only papers carrying this tag
  #[arg(long)]
  pub tag: Option<String>,
}

/// Function for the [`Commands::List`] in the CLI.
pub async fn list<I: UserInteraction>(
  interaction: &I,
  papyrus: &Papyrus,
  options: ListOptions,
) -> Result<()> {
  let ListOptions { status, starred, archived, tag } = options;

  let mut papers = papyrus.repository.list(status).await;
  papers.retain(|paper| {
    (!starred || paper.starred)
      && (archived || !paper.archived)
      && tag.as_deref().map_or(true, |tag| paper.tags.contains(tag))
  });
  papers.sort_by(|a, b| b.downloaded_at.cmp(&a.downloaded_at).then_with(|| a.id.cmp(&b.id)));
  trace!("Listing {} papers", papers.len());

  interaction.reply(ResponseContent::Papers(&papers))
}

/// Function for the [`Commands::Show`] in the CLI.
pub async fn show<I: UserInteraction>(
  interaction: &I,
  papyrus: &Papyrus,
  identifier: &str,
) -> Result<()> {
  match papyrus.repository.get(identifier).await {
    Some(paper) => interaction.reply(ResponseContent::Paper(&paper)),
    None => interaction.reply(ResponseContent::Info(&format!("No paper found for {identifier}"))),
  }
}
