use super::*;

#[tokio::test]
async fn test_cache_never_exceeds_capacity() -> TestResult {
  let dir = tempdir()?;
  let mut cache = ConversionCache::open(dir.path()).await?;

  let mut artifacts = Vec::new();
  for i in 0..8 {
    let artifact = write_artifact(dir.path(), &format!("paper{i}"));
    cache.insert(dir.path().join(format!("paper{i}.pdf")), &artifact).await?;
    artifacts.push(artifact);
    assert!(cache.len() <= MAX_CACHE_SIZE);
  }

  assert_eq!(cache.len(), MAX_CACHE_SIZE);
  // The three oldest were evicted together with their files
  for artifact in &artifacts[..3] {
    assert!(!artifact.exists());
  }
  for artifact in &artifacts[3..] {
    assert!(artifact.exists());
  }
  assert_eq!(cache.entries()[0].output_path, artifacts[7]);
  Ok(())
}

#[tokio::test]
async fn test_eviction_follows_recency_not_insertion() -> TestResult {
  let dir = tempdir()?;
  let mut cache = ConversionCache::open(dir.path()).await?;

  let mut artifacts = Vec::new();
  for i in 0..MAX_CACHE_SIZE {
    let artifact = write_artifact(dir.path(), &format!("paper{i}"));
    cache.insert(dir.path().join(format!("paper{i}.pdf")), &artifact).await?;
    artifacts.push(artifact);
  }

  // Touching the oldest entry makes paper1 the least recently used
  assert_eq!(cache.lookup(dir.path().join("paper0.pdf")).await?, Some(artifacts[0].clone()));

  let newest = write_artifact(dir.path(), "paper5");
  cache.insert(dir.path().join("paper5.pdf"), &newest).await?;

  assert!(artifacts[0].exists());
  assert!(!artifacts[1].exists());
  assert_eq!(cache.lookup(dir.path().join("paper1.pdf")).await?, None);
  assert!(cache.lookup(dir.path().join("paper0.pdf")).await?.is_some());
  Ok(())
}

#[tokio::test]
async fn test_stale_entry_is_purged() -> TestResult {
  let dir = tempdir()?;
  let mut cache = ConversionCache::open(dir.path()).await?;
  let artifact = write_artifact(dir.path(), "paper");
  cache.insert(dir.path().join("paper.pdf"), &artifact).await?;

  std::fs::remove_file(&artifact)?;

  assert_eq!(cache.lookup(dir.path().join("paper.pdf")).await?, None);
  assert!(cache.is_empty());

  // The removal was persisted
  let reopened = ConversionCache::open(dir.path()).await?;
  assert!(reopened.is_empty());
  Ok(())
}

#[tokio::test]
async fn test_index_survives_reopen() -> TestResult {
  let dir = tempdir()?;
  let first = write_artifact(dir.path(), "first");
  let second = write_artifact(dir.path(), "second");
  {
    let mut cache = ConversionCache::open(dir.path()).await?;
    cache.insert(dir.path().join("first.pdf"), &first).await?;
    cache.insert(dir.path().join("second.pdf"), &second).await?;
    cache.lookup(dir.path().join("first.pdf")).await?;
  }

  let cache = ConversionCache::open(dir.path()).await?;
  let outputs: Vec<&Path> = cache.entries().iter().map(|e| e.output_path.as_path()).collect();
  assert_eq!(outputs, vec![first.as_path(), second.as_path()]);

  let raw: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(dir.path().join(CACHE_INDEX_FILE))?)?;
  let entry = &raw[0];
  assert!(entry["pdfPath"].as_str().unwrap().ends_with("first.pdf"));
  assert!(entry["outputPath"].as_str().unwrap().ends_with("docling-first.md"));
  assert!(entry["timestamp"].is_i64());
  Ok(())
}

#[tokio::test]
async fn test_relative_and_absolute_paths_share_an_entry() -> TestResult {
  let dir = tempdir()?;
  let mut cache = ConversionCache::open(dir.path()).await?;
  let artifact = write_artifact(dir.path(), "paper");

  let absolute = std::env::current_dir()?.join("papers").join("paper.pdf");
  cache.insert("papers/./sub/../paper.pdf", &artifact).await?;

  assert_eq!(cache.entries()[0].pdf_path, absolute);
  assert_eq!(cache.lookup(&absolute).await?, Some(artifact));
  Ok(())
}
