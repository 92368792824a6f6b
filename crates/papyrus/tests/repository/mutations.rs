use super::*;

#[tokio::test]
async fn test_add_tag_twice_keeps_one() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041"]).await;

  repository.add_tag("2301.07041", "crypto").await?;
  let paper = repository.add_tag("2301.07041", "crypto").await?.unwrap();
  assert_eq!(paper.tags.as_slice(), ["crypto"]);

  let stored = repository.get("2301.07041").await.unwrap();
  assert_eq!(stored.tags.as_slice(), ["crypto"]);
  Ok(())
}

#[tokio::test]
async fn test_tags_keep_insertion_order() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041"]).await;

  for tag in ["zk", "fhe", "mpc"] {
    repository.add_tag("2301.07041", tag).await?;
  }
  let paper = repository.remove_tag("2301.07041", "fhe").await?.unwrap();
  assert_eq!(paper.tags.as_slice(), ["zk", "mpc"]);

  let unchanged = repository.remove_tag("2301.07041", "lattices").await?.unwrap();
  assert_eq!(unchanged.tags, paper.tags);
  Ok(())
}

#[tokio::test]
async fn test_star_and_archive() -> TestResult {
  let (repository, _dir) = setup_populated_repository(&["2301.07041", "2401.00001"]).await;
  repository.mark_as_read("2401.00001").await?;

  repository.set_starred("2301.07041", true).await?;
  repository.set_archived("2401.00001", true).await?;

  let starred = repository.get("2301.07041").await.unwrap();
  assert!(starred.starred);
  assert!(!starred.archived);

  let archived = repository.get("2401.00001").await.unwrap();
  assert_eq!(archived.collection, Collection::Read);
  assert!(archived.archived);

  repository.set_starred("2301.07041", false).await?;
  assert!(!repository.get("2301.07041").await.unwrap().starred);
  Ok(())
}

#[tokio::test]
async fn test_mutations_on_absent_paper_are_noops() -> TestResult {
  let (repository, dir) = setup_test_repository().await;
  let before = std::fs::read_to_string(dir.path().join("unreadPapers").join("metadata.json"))?;

  assert!(repository.set_starred("missing", true).await?.is_none());
  assert!(repository.set_archived("missing", true).await?.is_none());
  assert!(repository.add_tag("missing", "x").await?.is_none());
  assert!(repository.remove_tag("missing", "x").await?.is_none());

  let after = std::fs::read_to_string(dir.path().join("unreadPapers").join("metadata.json"))?;
  assert_eq!(before, after);
  Ok(())
}
