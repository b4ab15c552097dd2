use std::future::Future;

use newsdb_core::NewsCandidate;
use newsdb_db::{DbError, InsertOutcome};
use sqlx::PgPool;

/// Persistence seam for the runner.
///
/// Implementations must treat a repeated `link` as
/// [`InsertOutcome::Duplicate`], never as an error, and must not let one
/// failed write undo another.
pub trait NewsStore: Sync {
    fn insert_news(
        &self,
        item: &NewsCandidate,
    ) -> impl Future<Output = Result<InsertOutcome, DbError>> + Send;
}

impl NewsStore for PgPool {
    fn insert_news(
        &self,
        item: &NewsCandidate,
    ) -> impl Future<Output = Result<InsertOutcome, DbError>> + Send {
        newsdb_db::insert_news(self, item)
    }
}
