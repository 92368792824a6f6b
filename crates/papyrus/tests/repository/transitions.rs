use super::*;

#[tokio::test]
async fn test_mark_as_read() -> TestResult {
  let (repository, dir) = setup_populated_repository(&["2301.07041"]).await;

  let moved = repository.mark_as_read("2301.07041").await?.unwrap();
  assert_eq!(moved.collection, Collection::Read);
  assert_eq!(std::fs::read(&moved.path)?, PDF_BYTES);
  assert!(!dir.path().join("unreadPapers").join("2301.07041.pdf").exists());

  let found = repository.get("2301.07041").await.unwrap();
  assert_eq!(found.collection, Collection::Read);
  let unread = repository.store().read(Collection::Unread).await.into_map();
  assert!(!unread.contains_key("2301.07041"));
  Ok(())
}

#[tokio::test]
async fn test_read_unread_round_trip() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041"]).await;
  repository.add_tag("2301.07041", "fhe").await?;
  let before = repository.get("2301.07041").await.unwrap();

  repository.mark_as_read("2301.07041").await?;
  let after = repository.mark_as_unread("2301.07041").await?.unwrap();

  assert_eq!(after, before);
  assert_eq!(after.downloaded_at, before.downloaded_at);
  assert_eq!(after.file_size, before.file_size);
  assert!(repository.audit().await?.is_clean());
  Ok(())
}

#[tokio::test]
async fn test_transition_of_absent_paper_is_noop() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041"]).await;

  assert!(repository.mark_as_read("does-not-exist").await?.is_none());
  // Already unread, so there is nothing to move back
  assert!(repository.mark_as_unread("2301.07041").await?.is_none());
  assert_eq!(repository.get("2301.07041").await.unwrap().collection, Collection::Unread);
  Ok(())
}

#[tokio::test]
async fn test_transition_without_pdf_changes_nothing() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041"]).await;
  let paper = repository.get("2301.07041").await.unwrap();
  std::fs::remove_file(&paper.path)?;

  let result = repository.mark_as_read("2301.07041").await;
  assert!(matches!(result, Err(PapyrusError::PdfMissing { id, .. }) if id == "2301.07041"));
  assert_eq!(repository.get("2301.07041").await.unwrap().collection, Collection::Unread);
  assert!(repository.list(Some(Collection::Read)).await.is_empty());
  Ok(())
}
