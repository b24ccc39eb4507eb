mod common;

use sqlx::PgPool;
use std::sync::Arc;
use shortlinks::domain::entities::NewShortLink;
use shortlinks::domain::repositories::{LinkOrder, LinkQuery, LinkRepository};
use shortlinks::error::AppError;
use shortlinks::infrastructure::persistence::PgLinkRepository;

fn query(owner: Option<&str>, order: LinkOrder, offset: i64, limit: i64) -> LinkQuery {
    LinkQuery {
        owner: owner.map(str::to_string),
        order,
        offset,
        limit,
    }
}

#[sqlx::test]
async fn test_insert_link(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let new_link = NewShortLink::new("docs", "alice@example.com", "bob@example.com", "https://docs.rs");
    let link_id = new_link.link_id.clone();

    let link = repo.insert(new_link).await.unwrap();

    assert_eq!(link.name, "docs");
    assert_eq!(link.destination, "https://docs.rs");
    assert_eq!(link.link_id, link_id);
    assert_eq!(link.owner, "bob@example.com");
    assert_eq!(link.created_by, "alice@example.com");
    assert_eq!(link.modified_by, "alice@example.com");
}

#[sqlx::test]
async fn test_insert_duplicate_name_is_conflict(pool: PgPool) {
    common::create_pg_link(&pool, "taken", "alice", "https://a.example").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let result = repo
        .insert(NewShortLink::new("taken", "bob", "bob", "https://b.example"))
        .await;

    let err = result.unwrap_err();
    assert!(err.is_conflict(), "expected conflict, got {err:?}");
}

#[sqlx::test]
async fn test_find_by_name(pool: PgPool) {
    let id = common::create_pg_link(&pool, "wiki", "alice", "https://wikipedia.org").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.find_by_name("wiki").await.unwrap().unwrap();
    assert_eq!(link.id, id);
    assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().name, "wiki");

    assert!(repo.find_by_name("missing").await.unwrap().is_none());
    assert!(repo.find_by_name("Wiki").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_update_link(pool: PgPool) {
    let id = common::create_pg_link(&pool, "go", "alice", "https://golang.org").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let mut link = repo.find_by_id(id).await.unwrap().unwrap();
    link.destination = "https://go.dev".to_string();
    link.owner = "bob".to_string();
    link.modified_by = "carol".to_string();

    let updated = repo.update(&link).await.unwrap();
    assert_eq!(updated.destination, "https://go.dev");
    assert_eq!(updated.owner, "bob");
    assert_eq!(updated.modified_by, "carol");
    assert_eq!(updated.created_by, "alice");
    assert!(updated.modified >= updated.created);
}

#[sqlx::test]
async fn test_update_missing_link_is_not_found(pool: PgPool) {
    let id = common::create_pg_link(&pool, "gone", "alice", "https://a.example").await;
    let repo = PgLinkRepository::new(Arc::new(pool));
    let link = repo.find_by_id(id).await.unwrap().unwrap();
    assert!(repo.delete(id).await.unwrap());

    let result = repo.update(&link).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_list_filters_by_owner_and_pages(pool: PgPool) {
    for name in ["c", "a", "b", "d"] {
        common::create_pg_link(&pool, name, "alice", "https://example.org").await;
    }
    common::create_pg_link(&pool, "aa", "bob", "https://example.org").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let first = repo.list(query(Some("alice"), LinkOrder::Name, 0, 2)).await.unwrap();
    assert_eq!(common::names(&first), vec!["a", "b"]);

    let second = repo.list(query(Some("alice"), LinkOrder::Name, 2, 2)).await.unwrap();
    assert_eq!(common::names(&second), vec!["c", "d"]);

    let past_end = repo.list(query(Some("alice"), LinkOrder::Name, 4, 2)).await.unwrap();
    assert!(past_end.is_empty());

    let everyone = repo.list(query(None, LinkOrder::Name, 0, 10)).await.unwrap();
    assert_eq!(common::names(&everyone), vec!["a", "aa", "b", "c", "d"]);

    assert_eq!(repo.count(Some("alice".to_string())).await.unwrap(), 4);
    assert_eq!(repo.count(Some("nobody".to_string())).await.unwrap(), 0);
    assert_eq!(repo.count(None).await.unwrap(), 5);
}

#[sqlx::test]
async fn test_list_orders_by_destination_bytes_then_id(pool: PgPool) {
    common::create_pg_link(&pool, "lower", "alice", "https://b.example").await;
    common::create_pg_link(&pool, "upper", "alice", "https://B.example").await;
    common::create_pg_link(&pool, "first", "alice", "https://a.example").await;
    common::create_pg_link(&pool, "twin", "alice", "https://a.example").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let links = repo.list(query(None, LinkOrder::Destination, 0, 10)).await.unwrap();

    // Uppercase sorts before lowercase in byte order.
    assert_eq!(common::names(&links), vec!["upper", "first", "twin", "lower"]);
}

#[sqlx::test]
async fn test_delete_link(pool: PgPool) {
    let id = common::create_pg_link(&pool, "bye", "alice", "https://a.example").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.delete(id).await.unwrap());
    assert!(!repo.delete(id).await.unwrap());
    assert!(repo.find_by_name("bye").await.unwrap().is_none());
}
