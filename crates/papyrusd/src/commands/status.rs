//! Module for status transitions and the starred/archived flags.

use super::*;

/// A flag to set on a paper.
#[derive(Debug, Clone, Copy)]
pub enum Flag {
  /// Starred or not
  Starred(bool),
  /// Archived or not
  Archived(bool),
}

/// Function for [`Commands::Read`] and [`Commands::Unread`] in the CLI.
pub async fn transition<I: UserInteraction>(
  interaction: &I,
  papyrus: &Papyrus,
  identifier: &str,
  to: Collection,
) -> Result<()> {
  let from = to.other();
  match papyrus.repository.transition(identifier, from, to).await? {
    Some(paper) => interaction.reply(ResponseContent::Success(&format!(
      "Moved \"{}\" to {to}",
      paper.title
    ))),
    None => match papyrus.repository.get(identifier).await {
      Some(paper) if paper.collection == to =>
        interaction.reply(ResponseContent::Info(&format!("Paper is already marked as {to}"))),
      _ => interaction.reply(ResponseContent::Info(&format!("No paper found for {identifier}"))),
    },
  }
}

/// Function for the star and archive commands in the CLI.
pub async fn flag<I: UserInteraction>(
  interaction: &I,
  papyrus: &Papyrus,
  identifier: &str,
  flag: Flag,
) -> Result<()> {
  let (updated, message) = match flag {
    Flag::Starred(starred) => (
      papyrus.repository.set_starred(identifier, starred).await?,
      if starred { "Starred" } else { "Unstarred" },
    ),
    Flag::Archived(archived) => (
      papyrus.repository.set_archived(identifier, archived).await?,
      if archived { "Archived" } else { "Unarchived" },
    ),
  };

  match updated {
    Some(paper) =>
      interaction.reply(ResponseContent::Success(&format!("{message} \"{}\"", paper.title))),
    None => interaction.reply(ResponseContent::Info(&format!("No paper found for {identifier}"))),
  }
}
