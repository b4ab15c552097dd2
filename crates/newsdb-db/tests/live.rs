//! Live integration tests for newsdb-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. `"../../migrations"` is relative to `crates/newsdb-db/`.

use chrono::{TimeZone, Utc};
use newsdb_core::NewsCandidate;
use newsdb_db::{
    count_news, get_news_by_id, insert_news, list_news, list_news_by_category, search_news,
    InsertOutcome,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn candidate(link: &str) -> NewsCandidate {
    NewsCandidate {
        title: format!("Title for {link}"),
        description: Some("Body text".to_string()),
        link: link.to_string(),
        image: None,
        published_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        category: None,
    }
}

// ---------------------------------------------------------------------------
// Section 1: insert-or-ignore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn insert_news_returns_generated_id(pool: sqlx::PgPool) {
    let outcome = insert_news(&pool, &candidate("https://example.com/1"))
        .await
        .expect("insert_news failed");

    let InsertOutcome::Inserted(id) = outcome else {
        panic!("expected Inserted, got {outcome:?}");
    };
    let row = get_news_by_id(&pool, id)
        .await
        .expect("get_news_by_id failed")
        .expect("row should exist");
    assert_eq!(row.link, "https://example.com/1");
    assert_eq!(row.description.as_deref(), Some("Body text"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_link_is_a_no_op(pool: sqlx::PgPool) {
    let first = insert_news(&pool, &candidate("https://example.com/dup"))
        .await
        .expect("first insert");
    assert!(matches!(first, InsertOutcome::Inserted(_)));

    let mut changed = candidate("https://example.com/dup");
    changed.title = "Different title".to_string();
    let second = insert_news(&pool, &changed).await.expect("second insert");
    assert_eq!(second, InsertOutcome::Duplicate);

    assert_eq!(count_news(&pool).await.expect("count"), 1);
    let rows = list_news(&pool).await.expect("list");
    assert_eq!(rows[0].title, "Title for https://example.com/dup");
}

#[sqlx::test(migrations = "../../migrations")]
async fn oversized_link_fails_without_affecting_other_rows(pool: sqlx::PgPool) {
    insert_news(&pool, &candidate("https://example.com/ok-1"))
        .await
        .expect("first insert");

    let long_link = format!("https://example.com/{}", "x".repeat(3000));
    let result = insert_news(&pool, &candidate(&long_link)).await;
    assert!(result.is_err(), "oversized link should be rejected");

    insert_news(&pool, &candidate("https://example.com/ok-2"))
        .await
        .expect("insert after failure");

    assert_eq!(count_news(&pool).await.expect("count"), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn long_image_url_is_stored_intact(pool: sqlx::PgPool) {
    let image = format!("https://cdn.example.com/{}.jpg", "i".repeat(3000));
    let mut item = candidate("https://example.com/long-image");
    item.image = Some(image.clone());

    let InsertOutcome::Inserted(id) = insert_news(&pool, &item).await.expect("insert") else {
        panic!("expected Inserted");
    };
    let row = get_news_by_id(&pool, id)
        .await
        .expect("get_news_by_id")
        .expect("row exists");
    assert_eq!(row.image_url.as_deref(), Some(image.as_str()));
}

#[sqlx::test(migrations = "../../migrations")]
async fn absent_optional_fields_are_stored_as_null(pool: sqlx::PgPool) {
    let mut item = candidate("https://example.com/nulls");
    item.description = None;
    item.image = None;
    item.category = None;
    let InsertOutcome::Inserted(id) = insert_news(&pool, &item).await.expect("insert") else {
        panic!("expected insert");
    };

    let (description, image_url, category): (Option<String>, Option<String>, Option<String>) =
        sqlx::query_as("SELECT description, image_url, category FROM news WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .expect("select");
    assert!(description.is_none());
    assert!(image_url.is_none());
    assert!(category.is_none());
}

// ---------------------------------------------------------------------------
// Section 2: reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_news_orders_newest_first(pool: sqlx::PgPool) {
    let mut old = candidate("https://example.com/old");
    old.published_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut new = candidate("https://example.com/new");
    new.published_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    insert_news(&pool, &old).await.expect("insert old");
    insert_news(&pool, &new).await.expect("insert new");

    let rows = list_news(&pool).await.expect("list");
    let links: Vec<&str> = rows.iter().map(|r| r.link.as_str()).collect();
    assert_eq!(
        links,
        vec!["https://example.com/new", "https://example.com/old"]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_news_by_category_filters_exactly(pool: sqlx::PgPool) {
    let mut world = candidate("https://example.com/world");
    world.category = Some("world".to_string());
    let mut tech = candidate("https://example.com/tech");
    tech.category = Some("technology".to_string());
    insert_news(&pool, &world).await.expect("insert world");
    insert_news(&pool, &tech).await.expect("insert tech");
    insert_news(&pool, &candidate("https://example.com/none"))
        .await
        .expect("insert uncategorized");

    let rows = list_news_by_category(&pool, "world").await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].link, "https://example.com/world");
    assert_eq!(rows[0].category.as_deref(), Some("world"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn blank_category_reads_back_as_none(pool: sqlx::PgPool) {
    sqlx::query(
        "INSERT INTO news (title, link, published_at, category) \
         VALUES ('Legacy', 'https://example.com/legacy', NOW(), '')",
    )
    .execute(&pool)
    .await
    .expect("seed legacy row");

    let rows = list_news(&pool).await.expect("list");
    assert_eq!(rows.len(), 1);
    assert!(rows[0].category.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_news_by_id_returns_none_for_unknown_id(pool: sqlx::PgPool) {
    let row = get_news_by_id(&pool, 987_654).await.expect("query");
    assert!(row.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_news_matches_title_or_description_case_insensitively(pool: sqlx::PgPool) {
    let mut by_title = candidate("https://example.com/t");
    by_title.title = "Rust Compiler Release".to_string();
    by_title.description = None;
    let mut by_description = candidate("https://example.com/d");
    by_description.title = "Weekly roundup".to_string();
    by_description.description = Some("notes on the rust borrow checker".to_string());
    let mut unrelated = candidate("https://example.com/u");
    unrelated.title = "Gardening".to_string();
    unrelated.description = Some("tomatoes".to_string());
    for item in [&by_title, &by_description, &unrelated] {
        insert_news(&pool, item).await.expect("insert");
    }

    let rows = search_news(&pool, "RUST").await.expect("search");
    let mut links: Vec<&str> = rows.iter().map(|r| r.link.as_str()).collect();
    links.sort_unstable();
    assert_eq!(links, vec!["https://example.com/d", "https://example.com/t"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_news_treats_wildcards_literally(pool: sqlx::PgPool) {
    let mut percent = candidate("https://example.com/percent");
    percent.title = "Prices drop 50% overnight".to_string();
    let mut plain = candidate("https://example.com/plain");
    plain.title = "Prices drop 50 cents".to_string();
    insert_news(&pool, &percent).await.expect("insert");
    insert_news(&pool, &plain).await.expect("insert");

    let rows = search_news(&pool, "50%").await.expect("search");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].link, "https://example.com/percent");
}
