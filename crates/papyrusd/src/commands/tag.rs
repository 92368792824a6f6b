//! Module for tagging papers.

use super::*;

/// Tag operations
#[derive(Subcommand, Clone)]
pub enum TagCommands {
  /// Add a tag to a paper
  Add {
    /// Paper identifier
    identifier: String,
    /// The tag
    tag:        String,
  },
  /// Remove a tag from a paper
  Remove {
    /// Paper identifier
    identifier: String,
    /// The tag
    tag:        String,
  },
}

/// Function for the [`Commands::Tag`] in the CLI.
pub async fn tag<I: UserInteraction>(
  interaction: &I,
  papyrus: &Papyrus,
  cmd: TagCommands,
) -> Result<()> {
  let (identifier, updated) = match cmd {
    TagCommands::Add { identifier, tag } => {
      let tag = tag.trim();
      if tag.is_empty() {
        interaction.reply(ResponseContent::Warning("Tags cannot be empty"))?;
        return Ok(());
      }
      let updated = papyrus.repository.add_tag(&identifier, tag).await?;
      (identifier, updated)
    },
    TagCommands::Remove { identifier, tag } => {
      let updated = papyrus.repository.remove_tag(&identifier, &tag).await?;
      (identifier, updated)
    },
  };

  match updated {
    Some(paper) if paper.tags.is_empty() =>
      interaction.reply(ResponseContent::Success(&format!("\"{}\" has no tags", paper.title))),
    Some(paper) => interaction.reply(ResponseContent::Success(&format!(
      "Tags of \"{}\": {}",
      paper.title,
      paper.tags.as_slice().join(", ")
    ))),
    None => interaction.reply(ResponseContent::Info(&format!("No paper found for {identifier}"))),
  }
}
