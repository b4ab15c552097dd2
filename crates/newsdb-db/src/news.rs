//! Database operations for the `news` table.

use chrono::{DateTime, Utc};
use newsdb_core::NewsCandidate;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `news` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NewsRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    /// Blank values written by older tooling are read back as `NULL`.
    pub category: Option<String>,
}

/// Result of [`insert_news`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written; carries its generated id.
    Inserted(i64),
    /// A row with the same `link` already exists; nothing was written.
    Duplicate,
}

const NEWS_COLUMNS: &str =
    "id, title, description, link, image_url, published_at, NULLIF(category, '') AS category";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert a news item unless a row with the same `link` already exists.
///
/// Each call is its own statement, so a failure here never undoes rows
/// written by earlier calls.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] for any failure other than a `link` conflict
/// (e.g. a value exceeding a column limit, or a lost connection).
pub async fn insert_news(pool: &PgPool, item: &NewsCandidate) -> Result<InsertOutcome, DbError> {
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO news (title, description, link, image_url, published_at, category) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (link) DO NOTHING \
         RETURNING id",
    )
    .bind(&item.title)
    .bind(item.description.as_deref())
    .bind(&item.link)
    .bind(item.image.as_deref())
    .bind(item.published_at)
    .bind(item.category.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(id.map_or(InsertOutcome::Duplicate, InsertOutcome::Inserted))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// List every news item, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_news(pool: &PgPool) -> Result<Vec<NewsRow>, DbError> {
    let rows = sqlx::query_as::<_, NewsRow>(&format!(
        "SELECT {NEWS_COLUMNS} FROM news ORDER BY published_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List news items whose category equals `category` exactly, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_news_by_category(
    pool: &PgPool,
    category: &str,
) -> Result<Vec<NewsRow>, DbError> {
    let rows = sqlx::query_as::<_, NewsRow>(&format!(
        "SELECT {NEWS_COLUMNS} FROM news \
         WHERE category = $1 \
         ORDER BY published_at DESC, id DESC"
    ))
    .bind(category)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch one news item by id, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_news_by_id(pool: &PgPool, id: i64) -> Result<Option<NewsRow>, DbError> {
    let row = sqlx::query_as::<_, NewsRow>(&format!(
        "SELECT {NEWS_COLUMNS} FROM news WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Case-insensitive substring search over `title` and `description`.
///
/// `%` and `_` in `keyword` match literally.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_news(pool: &PgPool, keyword: &str) -> Result<Vec<NewsRow>, DbError> {
    let pattern = format!("%{}%", escape_like(keyword));
    let rows = sqlx::query_as::<_, NewsRow>(&format!(
        "SELECT {NEWS_COLUMNS} FROM news \
         WHERE title ILIKE $1 ESCAPE '\\' OR description ILIKE $1 ESCAPE '\\' \
         ORDER BY published_at DESC, id DESC"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Total number of rows in `news`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_news(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
