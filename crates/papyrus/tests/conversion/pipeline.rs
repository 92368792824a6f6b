use std::os::unix::fs::PermissionsExt;

use super::*;

const MARKDOWN: &str = "Intro ![fig](data:image/png;base64,Zm9v) outro";

/// Installs a shell script standing in for the converter. `body` runs with `$1` as the input and
/// `$5` as the output path; every invocation is appended to `calls` next to the script.
fn install_converter(dir: &Path, body: &str) -> PathBuf {
  let script = dir.join("fake-docling");
  let calls = dir.join("calls");
  std::fs::write(
    &script,
    format!("#!/bin/sh\necho \"$@\" >> \"{}\"\n{body}\n", calls.display()),
  )
  .unwrap();
  std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
  script
}

fn call_count(dir: &Path) -> usize {
  std::fs::read_to_string(dir.join("calls")).map(|s| s.lines().count()).unwrap_or(0)
}

fn docling_outputs(cache_dir: &Path) -> Vec<PathBuf> {
  std::fs::read_dir(cache_dir)
    .unwrap()
    .map(|entry| entry.unwrap().path())
    .filter(|path| path.file_name().unwrap().to_string_lossy().starts_with("docling-"))
    .collect()
}

struct Fixture {
  _dir:      TempDir,
  tools:     PathBuf,
  cache_dir: PathBuf,
  pdf:       PathBuf,
}

fn setup(body: &str) -> (Fixture, String) {
  let dir = tempdir().unwrap();
  let tools = dir.path().join("tools");
  let cache_dir = dir.path().join("cache");
  std::fs::create_dir_all(&tools).unwrap();
  let pdf = dir.path().join("My Paper.pdf");
  std::fs::write(&pdf, PDF_BYTES).unwrap();
  let tool = install_converter(&tools, body).to_string_lossy().into_owned();
  (Fixture { _dir: dir, tools, cache_dir, pdf }, tool)
}

#[tokio::test]
async fn test_single_file_conversion_is_cached() -> TestResult {
  let (fixture, tool) = setup(&format!("printf '%s' '{MARKDOWN}' > \"$5\""));
  let cache = ConversionCache::open(&fixture.cache_dir).await?;
  let mut pipeline = ConversionPipeline::new(cache, tool);

  let parts = pipeline.parts(&fixture.pdf).await?;
  assert_eq!(parts, vec![
    Part::Text("Intro ".into()),
    Part::Image("data:image/png;base64,Zm9v".into()),
    Part::Text(" outro".into()),
  ]);
  assert_eq!(call_count(&fixture.tools), 1);

  let outputs = docling_outputs(&fixture.cache_dir);
  assert_eq!(outputs.len(), 1);
  let name = outputs[0].file_name().unwrap().to_string_lossy().into_owned();
  assert!(name.starts_with("docling-My_Paper-"), "unexpected output name {name}");
  assert!(name.ends_with(".md"));

  // Second request is served from the cache
  assert_eq!(pipeline.parts(&fixture.pdf).await?, parts);
  assert_eq!(call_count(&fixture.tools), 1);
  assert_eq!(pipeline.cache().len(), 1);
  Ok(())
}

#[tokio::test]
async fn test_converter_arguments() -> TestResult {
  let (fixture, tool) = setup("printf 'ok' > \"$5\"");
  let mut pipeline = ConversionPipeline::new(ConversionCache::open(&fixture.cache_dir).await?, tool);
  pipeline.markdown(&fixture.pdf).await?;

  let call = std::fs::read_to_string(fixture.tools.join("calls"))?;
  let output = &docling_outputs(&fixture.cache_dir)[0];
  assert_eq!(
    call.trim_end(),
    format!("{} --to md --output {}", fixture.pdf.display(), output.display())
  );
  Ok(())
}

#[tokio::test]
async fn test_directory_output() -> TestResult {
  let (fixture, tool) =
    setup(&format!("mkdir -p \"$5\"\nprintf 'png' > \"$5/image_000.png\"\nprintf '%s' '{MARKDOWN}' > \"$5/paper.md\""));
  let mut pipeline = ConversionPipeline::new(ConversionCache::open(&fixture.cache_dir).await?, tool);

  assert_eq!(pipeline.markdown(&fixture.pdf).await?, MARKDOWN);
  let entry = &pipeline.cache().entries()[0];
  assert!(entry.output_path.is_dir());

  // Cache hit resolves the directory again
  assert_eq!(pipeline.markdown(&fixture.pdf).await?, MARKDOWN);
  assert_eq!(call_count(&fixture.tools), 1);
  Ok(())
}

#[tokio::test]
async fn test_failed_conversion_cleans_up() -> TestResult {
  let (fixture, tool) =
    setup("printf 'partial' > \"$5\"\necho 'unsupported document' >&2\nexit 3");
  let mut pipeline = ConversionPipeline::new(ConversionCache::open(&fixture.cache_dir).await?, tool);

  let result = pipeline.parts(&fixture.pdf).await;
  match result {
    Err(PapyrusError::Conversion(ConversionError::Failed { status, stderr })) => {
      assert_eq!(status.code(), Some(3));
      assert_eq!(stderr, "unsupported document");
    },
    other => panic!("expected a failed conversion, got {other:?}"),
  }
  assert!(docling_outputs(&fixture.cache_dir).is_empty());
  assert!(pipeline.cache().is_empty());
  Ok(())
}

#[tokio::test]
async fn test_missing_markdown_output() -> TestResult {
  let (fixture, tool) = setup("mkdir -p \"$5\"\nprintf 'png' > \"$5/image_000.png\"");
  let mut pipeline = ConversionPipeline::new(ConversionCache::open(&fixture.cache_dir).await?, tool);

  let result = pipeline.markdown(&fixture.pdf).await;
  assert!(matches!(result, Err(PapyrusError::Conversion(ConversionError::MissingMarkdown(_)))));
  assert!(docling_outputs(&fixture.cache_dir).is_empty());
  Ok(())
}

#[tokio::test]
async fn test_missing_converter() -> TestResult {
  let (fixture, _) = setup("true");
  let tool = fixture.tools.join("no-such-converter").to_string_lossy().into_owned();
  let mut pipeline = ConversionPipeline::new(ConversionCache::open(&fixture.cache_dir).await?, tool);

  let result = pipeline.markdown(&fixture.pdf).await;
  assert!(matches!(result, Err(PapyrusError::Conversion(ConversionError::Spawn { .. }))));
  Ok(())
}

#[tokio::test]
async fn test_missing_source_is_conversion_error() -> TestResult {
  let (fixture, tool) = setup(&format!("printf '%s' '{MARKDOWN}' > \"$5\""));
  let mut pipeline = ConversionPipeline::new(ConversionCache::open(&fixture.cache_dir).await?, tool);
  let absent = fixture.pdf.with_file_name("absent.pdf");

  let result = pipeline.parts(&absent).await;
  assert!(matches!(
    result,
    Err(PapyrusError::Conversion(ConversionError::MissingSource { path, .. })) if path == absent
  ));
  assert_eq!(call_count(&fixture.tools), 0);
  assert!(pipeline.cache().is_empty());
  Ok(())
}

#[tokio::test]
async fn test_stale_cache_entry_reconverts() -> TestResult {
  let (fixture, tool) = setup(&format!("printf '%s' '{MARKDOWN}' > \"$5\""));
  let mut pipeline = ConversionPipeline::new(ConversionCache::open(&fixture.cache_dir).await?, tool);

  pipeline.markdown(&fixture.pdf).await?;
  for output in docling_outputs(&fixture.cache_dir) {
    std::fs::remove_file(output)?;
  }

  assert_eq!(pipeline.markdown(&fixture.pdf).await?, MARKDOWN);
  assert_eq!(call_count(&fixture.tools), 2);
  assert_eq!(pipeline.cache().len(), 1);
  Ok(())
}

#[tokio::test]
async fn test_papyrus_open_wires_config() -> TestResult {
  let (fixture, tool) = setup(&format!("printf '%s' '{MARKDOWN}' > \"$5\""));
  let storage = tempdir()?;
  let config = Config::default()
    .with_storage_path(storage.path())
    .with_cache_path(&fixture.cache_dir)
    .with_converter(tool);

  let mut papyrus = Papyrus::open(config).await?;
  assert!(storage.path().join("unreadPapers").join("metadata.json").exists());
  assert!(storage.path().join("readPapers").join("metadata.json").exists());

  let paper = papyrus.repository.create(create_test_metadata("2301.07041"), PDF_BYTES).await?;
  let parts = papyrus.pipeline.parts(&paper.path).await?;
  assert_eq!(parts.len(), 3);
  assert!(papyrus.pipeline.cache().dir().starts_with(&fixture.cache_dir));
  Ok(())
}
