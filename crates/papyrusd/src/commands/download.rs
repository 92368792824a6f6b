//! Module for the "download" command.

use super::*;

/// Function for the [`Commands::Download`] in the CLI.
///
/// A paper that is already stored is reported, not downloaded again.
pub async fn download<I: UserInteraction, C: Catalog>(
  interaction: &I,
  catalog: &C,
  papyrus: &Papyrus,
  identifier: &str,
) -> Result<()> {
  if let Some(paper) = papyrus.repository.get(identifier).await {
    interaction.reply(ResponseContent::Info(&format!(
      "Paper is already in your library ({}): {}",
      paper.collection, paper.title
    )))?;
    return Ok(());
  }

  interaction.reply(ResponseContent::Info(&format!("Fetching paper: {identifier}")))?;
  let Some(entry) = catalog.lookup(identifier).await? else {
    interaction.reply(ResponseContent::Warning(&format!("No paper found for {identifier}")))?;
    return Ok(());
  };

  match papyrus.repository.download(&entry).await {
    Ok(paper) => {
      interaction.reply(ResponseContent::Paper(&paper))?;
      interaction.reply(ResponseContent::Success("Paper downloaded"))
    },
    Err(PapyrusError::DuplicatePaper(title)) => interaction.reply(ResponseContent::Info(
      &format!("Paper is already in your library: {title}"),
    )),
    Err(e) => Err(e.into()),
  }
}
