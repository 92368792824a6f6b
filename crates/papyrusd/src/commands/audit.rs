//! Module for the "audit" command.

use super::*;

/// Function for the [`Commands::Audit`] in the CLI.
///
/// Only reports; nothing is repaired.
pub async fn audit<I: UserInteraction>(interaction: &I, papyrus: &Papyrus) -> Result<()> {
  let report = papyrus.repository.audit().await?;
  if report.is_clean() {
    return interaction.reply(ResponseContent::Success("Library is consistent"));
  }

  for id in &report.duplicated {
    interaction.reply(ResponseContent::Warning(&format!("{id} is listed as both unread and read")))?;
  }
  for (collection, id) in &report.missing_pdfs {
    interaction.reply(ResponseContent::Warning(&format!("{id} ({collection}) has no PDF on disk")))?;
  }
  for path in &report.orphaned_pdfs {
    interaction
      .reply(ResponseContent::Warning(&format!("{} has no metadata entry", path.display())))?;
  }
  interaction.reply(ResponseContent::Info(&format!(
    "Found {} problems",
    report.duplicated.len() + report.missing_pdfs.len() + report.orphaned_pdfs.len()
  )))
}
