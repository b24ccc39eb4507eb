use sqlx::PgPool;
use std::sync::Arc;
use shortlinks::domain::repositories::{ClickStatsRepository, SiteConfigRepository};
use shortlinks::infrastructure::persistence::{PgClickStatsRepository, PgSiteConfigRepository};

#[sqlx::test]
async fn test_increment_creates_then_counts(pool: PgPool) {
    let repo = PgClickStatsRepository::new(Arc::new(pool));

    assert!(repo.find_by_link_id("lid-1").await.unwrap().is_none());

    let first = repo.increment("lid-1").await.unwrap();
    assert_eq!(first.count, 1);

    let second = repo.increment("lid-1").await.unwrap();
    assert_eq!(second.count, 2);
    assert_eq!(second.id, first.id);

    let stored = repo.find_by_link_id("lid-1").await.unwrap().unwrap();
    assert_eq!(stored.count, 2);
    assert_eq!(repo.find_by_id(first.id).await.unwrap().unwrap().link_id, "lid-1");
}

#[sqlx::test]
async fn test_concurrent_increments_are_not_lost(pool: PgPool) {
    let repo = Arc::new(PgClickStatsRepository::new(Arc::new(pool)));

    let mut handles = Vec::new();
    for _ in 0..20 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.increment("lid-hot").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = repo.find_by_link_id("lid-hot").await.unwrap().unwrap();
    assert_eq!(stats.count, 20);
}

#[sqlx::test]
async fn test_counters_are_per_link(pool: PgPool) {
    let repo = PgClickStatsRepository::new(Arc::new(pool));

    repo.increment("lid-1").await.unwrap();
    repo.increment("lid-1").await.unwrap();
    repo.increment("lid-2").await.unwrap();

    assert_eq!(repo.find_by_link_id("lid-1").await.unwrap().unwrap().count, 2);
    assert_eq!(repo.find_by_link_id("lid-2").await.unwrap().unwrap().count, 1);
}

#[sqlx::test]
async fn test_delete_click_stats(pool: PgPool) {
    let repo = PgClickStatsRepository::new(Arc::new(pool));
    let stats = repo.increment("lid-1").await.unwrap();

    assert!(repo.delete(stats.id).await.unwrap());
    assert!(!repo.delete(stats.id).await.unwrap());

    // A click after a purge starts a fresh counter.
    assert_eq!(repo.increment("lid-1").await.unwrap().count, 1);
}

#[sqlx::test]
async fn test_site_config_upsert(pool: PgPool) {
    let repo = PgSiteConfigRepository::new(Arc::new(pool));

    assert!(repo.get().await.unwrap().is_none());

    let created = repo
        .save("go.example".to_string(), Some("root@example.com".to_string()))
        .await
        .unwrap();
    assert_eq!(created.id, 1);
    assert!(created.is_admin("root@example.com"));

    let updated = repo.save("s.example".to_string(), None).await.unwrap();
    assert_eq!(updated.id, 1);
    assert_eq!(updated.domain, "s.example");
    assert_eq!(updated.admin_users, None);
    assert_eq!(updated.created, created.created);
    assert!(updated.modified >= created.modified);

    assert_eq!(repo.get().await.unwrap(), Some(updated));
}
