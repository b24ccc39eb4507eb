use sqlx::PgPool;
use std::sync::Arc;
use shortlinks::domain::entities::{LinkVersion, NewLinkVersion};
use shortlinks::domain::repositories::VersionRepository;
use shortlinks::infrastructure::persistence::PgVersionRepository;

fn version(link_id: &str, destination: &str, created_by: &str) -> NewLinkVersion {
    NewLinkVersion {
        link_id: link_id.to_string(),
        destination: destination.to_string(),
        owner: "alice".to_string(),
        created_by: created_by.to_string(),
        modified_by: created_by.to_string(),
    }
}

fn destinations(versions: &[LinkVersion]) -> Vec<&str> {
    versions.iter().map(|v| v.destination.as_str()).collect()
}

#[sqlx::test]
async fn test_append_version(pool: PgPool) {
    let repo = PgVersionRepository::new(Arc::new(pool));

    let saved = repo
        .append(version("lid-1", "https://a.example", "alice"))
        .await
        .unwrap();

    assert_eq!(saved.link_id, "lid-1");
    assert_eq!(saved.destination, "https://a.example");
    assert_eq!(saved.owner, "alice");
    assert_eq!(repo.find_by_id(saved.id).await.unwrap(), Some(saved));
}

#[sqlx::test]
async fn test_find_by_link_id_newest_first(pool: PgPool) {
    let repo = PgVersionRepository::new(Arc::new(pool));

    for destination in ["https://1.example", "https://2.example", "https://3.example"] {
        repo.append(version("lid-1", destination, "alice")).await.unwrap();
    }
    repo.append(version("lid-2", "https://other.example", "alice"))
        .await
        .unwrap();

    let versions = repo.find_by_link_id("lid-1").await.unwrap();

    assert_eq!(
        destinations(&versions),
        vec!["https://3.example", "https://2.example", "https://1.example"]
    );
    assert!(repo.find_by_link_id("lid-missing").await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_same_timestamp_falls_back_to_id(pool: PgPool) {
    let repo = PgVersionRepository::new(Arc::new(pool.clone()));

    // Both rows share one transaction timestamp.
    let mut tx = pool.begin().await.unwrap();
    for destination in ["https://old.example", "https://new.example"] {
        sqlx::query(
            "INSERT INTO link_versions (link_id, destination, owner, created_by, modified_by) \
             VALUES ('lid-1', $1, 'alice', 'alice', 'alice')",
        )
        .bind(destination)
        .execute(&mut *tx)
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();

    let versions = repo.find_by_link_id("lid-1").await.unwrap();

    assert_eq!(versions[0].created, versions[1].created);
    assert_eq!(
        destinations(&versions),
        vec!["https://new.example", "https://old.example"]
    );
}

#[sqlx::test]
async fn test_find_by_created_by(pool: PgPool) {
    let repo = PgVersionRepository::new(Arc::new(pool));

    repo.append(version("lid-1", "https://a.example", "alice")).await.unwrap();
    repo.append(version("lid-2", "https://b.example", "bob")).await.unwrap();
    repo.append(version("lid-3", "https://c.example", "alice")).await.unwrap();

    let versions = repo.find_by_created_by("alice").await.unwrap();

    assert_eq!(
        destinations(&versions),
        vec!["https://c.example", "https://a.example"]
    );
}

#[sqlx::test]
async fn test_delete_version(pool: PgPool) {
    let repo = PgVersionRepository::new(Arc::new(pool));
    let saved = repo
        .append(version("lid-1", "https://a.example", "alice"))
        .await
        .unwrap();

    assert!(repo.delete(saved.id).await.unwrap());
    assert!(!repo.delete(saved.id).await.unwrap());
    assert!(repo.find_by_link_id("lid-1").await.unwrap().is_empty());
}
