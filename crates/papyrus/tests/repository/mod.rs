use super::*;

mod mutations;
mod transitions;

#[tokio::test]
async fn test_create_and_get() -> TestResult {
  let (repository, _dir) = setup_test_repository().await;

  let created = repository.create(create_test_metadata("2301.07041"), PDF_BYTES).await?;
  assert_eq!(created.collection, Collection::Unread);
  assert_eq!(created.file_size, PDF_BYTES.len() as u64);
  assert_eq!(std::fs::read(&created.path)?, PDF_BYTES);

  let found = repository.get("2301.07041").await.unwrap();
  assert_eq!(found, created);
  assert!(repository.get("0000.00000").await.is_none());
  Ok(())
}

#[tokio::test]
async fn test_create_refuses_duplicates() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041"]).await;
  repository.mark_as_read("2301.07041").await?;

  let result = repository.create(create_test_metadata("2301.07041"), PDF_BYTES).await;
  assert!(matches!(result, Err(PapyrusError::DuplicatePaper(title)) if title.contains("2301.07041")));
  assert!(repository.list(Some(Collection::Unread)).await.is_empty());
  Ok(())
}

#[tokio::test]
async fn test_list_by_collection() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["a", "b", "c"]).await;
  repository.mark_as_read("b").await?;

  let unread: Vec<String> =
    repository.list(Some(Collection::Unread)).await.into_iter().map(|p| p.id.clone()).collect();
  let read: Vec<String> =
    repository.list(Some(Collection::Read)).await.into_iter().map(|p| p.id.clone()).collect();
  assert_eq!(unread, vec!["a", "c"]);
  assert_eq!(read, vec!["b"]);

  let mut all: Vec<String> = repository.list(None).await.into_iter().map(|p| p.id.clone()).collect();
  all.sort();
  assert_eq!(all, vec!["a", "b", "c"]);
  Ok(())
}

#[tokio::test]
async fn test_old_style_identifier() -> TestResult {
  let (repository, dir) = setup_populated_repository(&["math.AG/0601001"]).await;

  let paper = repository.get("math.AG/0601001").await.unwrap();
  assert_eq!(paper.path, dir.path().join("unreadPapers").join("math.AG_0601001.pdf"));
  assert!(paper.path.exists());

  let moved = repository.mark_as_read("math.AG/0601001").await?.unwrap();
  assert_eq!(moved.path, dir.path().join("readPapers").join("math.AG_0601001.pdf"));
  assert!(repository.audit().await?.is_clean());
  Ok(())
}

#[tokio::test]
async fn test_delete_is_idempotent() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041", "2401.00001"]).await;
  let path = repository.get("2301.07041").await.unwrap().path;

  let deleted = repository.delete("2301.07041").await?;
  assert_eq!(deleted.map(|p| p.id.clone()), Some("2301.07041".to_string()));
  assert!(!path.exists());

  assert!(repository.delete("2301.07041").await?.is_none());
  assert!(repository.get("2301.07041").await.is_none());
  for collection in Collection::ALL {
    let map = repository.store().read(collection).await.into_map();
    assert!(!map.contains_key("2301.07041"));
  }
  assert!(repository.get("2401.00001").await.is_some());
  Ok(())
}

#[tokio::test]
async fn test_delete_tolerates_missing_pdf() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041"]).await;
  let paper = repository.get("2301.07041").await.unwrap();
  std::fs::remove_file(&paper.path)?;

  assert!(repository.delete("2301.07041").await?.is_some());
  assert!(repository.get("2301.07041").await.is_none());
  Ok(())
}

#[tokio::test]
async fn test_corrupt_collection_reads_as_empty() -> TestResult {
  let (repository, dir) = setup_populated_repository(&["2301.07041"]).await;
  std::fs::write(dir.path().join("unreadPapers").join("metadata.json"), "{\"truncated\": ")?;

  assert!(repository.list(None).await.is_empty());
  assert!(repository.get("2301.07041").await.is_none());

  // The PDF is still on disk and now unaccounted for
  let report = repository.audit().await?;
  assert_eq!(report.orphaned_pdfs.len(), 1);
  Ok(())
}
