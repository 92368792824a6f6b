//! Module for setting up a papyrus library.

use super::*;

/// Function for the [`Commands::Init`] in the CLI.
///
/// Writes the configuration (including any `--storage`/`--cache` overrides) to `config_path` and
/// creates both collections.
pub async fn init<I: UserInteraction>(
  interaction: &I,
  config: Config,
  config_path: &Path,
) -> Result<()> {
  debug!("Initializing with configuration path {config_path:?}");

  if config_path.exists()
    && !interaction.confirm(&format!(
      "A configuration already exists at {config_path:?}, do you want to overwrite it?"
    ))?
  {
    interaction.reply(ResponseContent::Info(
      "Keeping the existing configuration. Pass --config to initialize somewhere else",
    ))?;
    return Ok(());
  }

  let converter = interaction.prompt("Converter command", &config.converter)?;
  let config = config.with_converter(converter);
  config.save(config_path).await?;

  let papyrus = Papyrus::open(config).await?;
  interaction.reply(ResponseContent::Success(&format!(
    "Initialized papyrus with\nConfig path: {:?}\nPaper storage: {:?}\nConversion cache: {:?}",
    config_path, papyrus.config.storage_path, papyrus.config.cache_path,
  )))?;
  Ok(())
}
