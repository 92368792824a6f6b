//! Module for converting PDFs to Markdown.

use super::*;

/// Arguments for [`Commands::Convert`]
#[derive(Args, Clone)]
pub struct ConvertOptions {
  /// Identifier of a stored paper, or a path to any PDF
  pub source: String,

  /// Write the Markdown here instead of printing it
  #[arg(long, short)]
  pub output: Option<PathBuf>,

  /// Extract embedded images into this directory and link them from the Markdown
  #[arg(long)]
  pub images: Option<PathBuf>,
}

/// Function for the [`Commands::Convert`] in the CLI.
pub async fn convert<I: UserInteraction>(
  interaction: &I,
  papyrus: &mut Papyrus,
  options: ConvertOptions,
) -> Result<()> {
  let ConvertOptions { source, output, images } = options;

  let path = match papyrus.repository.get(&source).await {
    Some(paper) => paper.path,
    None => PathBuf::from(&source),
  };
  debug!("Converting {path:?}");
  if output.is_some() {
    println!("{}Converting {}", style(WORKING_PREFIX).cyan(), style(path.display()).yellow());
  }

  let parts = papyrus.pipeline.parts(&path).await?;

  if let Some(dir) = &images {
    tokio::fs::create_dir_all(dir).await?;
  }
  let mut markdown = String::new();
  let mut image_count = 0;
  for part in &parts {
    match part {
      Part::Text(text) => markdown.push_str(text),
      Part::Image(uri) => {
        image_count += 1;
        let link = match &images {
          Some(dir) => match save_image(part, dir, image_count).await {
            Ok(file) => file.display().to_string(),
            Err(e) => {
              interaction
                .reply(ResponseContent::Warning(&format!("Kept image {image_count} inline: {e}")))?;
              uri.clone()
            },
          },
          None => uri.clone(),
        };
        markdown.push_str(&format!("![image {image_count}]({link})"));
      },
    }
  }

  match output {
    Some(output) => {
      tokio::fs::write(&output, &markdown).await?;
      interaction.reply(ResponseContent::Success(&format!(
        "Wrote {} parts ({image_count} images) to {}",
        parts.len(),
        output.display()
      )))
    },
    None => {
      println!("{markdown}");
      Ok(())
    },
  }
}

/// Decodes an image part and writes it to `dir` as `image_<n>.<ext>`.
async fn save_image(part: &Part, dir: &Path, n: usize) -> Result<PathBuf> {
  let (mime, bytes) = part.decode_image()?;
  let extension = match mime.trim_start_matches("image/") {
    "jpeg" => "jpg",
    "svg+xml" => "svg",
    other => other,
  };
  let file = dir.join(format!("image_{n:03}.{extension}"));
  tokio::fs::write(&file, bytes).await?;
  trace!("Saved {mime} image to {file:?}");
  Ok(file)
}
