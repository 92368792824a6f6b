//! Module for the "remove" command.

use super::*;

/// Function for the [`Commands::Remove`] in the CLI.
pub async fn remove<I: UserInteraction>(
  interaction: &I,
  papyrus: &Papyrus,
  identifier: &str,
) -> Result<()> {
  let Some(paper) = papyrus.repository.get(identifier).await else {
    interaction.reply(ResponseContent::Info(&format!("No paper found for {identifier}")))?;
    return Ok(());
  };

  interaction.reply(ResponseContent::Paper(&paper))?;
  if !interaction.confirm("Are you sure you want to delete this paper and its PDF?")? {
    interaction.reply(ResponseContent::Info("Operation cancelled"))?;
    return Ok(());
  }

  match papyrus.repository.delete(identifier).await? {
    Some(paper) =>
      interaction.reply(ResponseContent::Success(&format!("Removed \"{}\"", paper.title))),
    None => interaction.reply(ResponseContent::Info(&format!("No paper found for {identifier}"))),
  }
}
