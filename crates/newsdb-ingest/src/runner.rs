//! Orchestrates fetch, extract, resolve, normalize, sanitize and persist
//! across all configured feeds.

use futures::stream::{self, StreamExt};
use newsdb_core::{FeedSource, NewsCandidate};
use newsdb_db::InsertOutcome;

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::events::{EventSink, IngestEvent};
use crate::extract::extract;
use crate::fetcher::FeedFetcher;
use crate::image::ImageResolver;
use crate::sanitize::sanitize;
use crate::store::NewsStore;
use crate::timestamp::normalize;
use crate::types::IngestReport;

/// Candidates prepared from one source, ready for the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedBatch {
    /// Raw entries the feed yielded.
    pub entries: usize,
    pub candidates: Vec<NewsCandidate>,
    /// Entries dropped because their link was empty.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct IngestionRunner {
    fetcher: FeedFetcher,
    images: ImageResolver,
    max_concurrent_feeds: usize,
}

impl IngestionRunner {
    /// Build a runner with one HTTP client shared by feed and page fetches.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &IngestConfig) -> Result<Self, IngestError> {
        let client = config.build_client()?;
        Ok(Self {
            fetcher: FeedFetcher::new(client.clone(), config),
            images: ImageResolver::new(client, config.max_feed_bytes),
            max_concurrent_feeds: config.max_concurrent_feeds.max(1),
        })
    }

    /// Fetch one source and turn its entries into sanitized candidates
    /// tagged with the source's category. Nothing is persisted.
    pub async fn collect<E: EventSink>(&self, source: &FeedSource, events: &E) -> PreparedBatch {
        let entries = self.fetcher.fetch(source).await;
        events.emit(IngestEvent::EntriesCollected {
            feed_url: source.url.clone(),
            count: entries.len(),
        });

        let mut batch = PreparedBatch {
            entries: entries.len(),
            ..PreparedBatch::default()
        };

        for entry in entries {
            let fields = extract(entry);
            let image = self.images.resolve(&fields).await;
            let published_at = normalize(&fields.published);
            let candidate =
                sanitize(fields.into_candidate(image, published_at, source.category.clone()));

            if candidate.link.is_empty() {
                tracing::warn!(
                    feed_url = %source.url,
                    title = %candidate.title,
                    "entry has no link, skipping"
                );
                batch.skipped += 1;
                continue;
            }
            batch.candidates.push(candidate);
        }

        batch
    }

    /// Ingest every source in input order.
    ///
    /// Sources are fetched up to `max_concurrent_feeds` at a time, but their
    /// candidates reach the store one source after another. A record the
    /// store rejects, including on a dropped connection, is logged and
    /// counted; the run moves on.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Db`] only when the pool has been closed (see
    /// [`newsdb_db::DbError::is_pool_closed`]). Rows written before that
    /// point stay written.
    pub async fn run<S, E>(
        &self,
        sources: &[FeedSource],
        store: &S,
        events: &E,
    ) -> Result<IngestReport, IngestError>
    where
        S: NewsStore,
        E: EventSink,
    {
        let mut report = IngestReport::default();

        // Futures are built eagerly so the stream holds no borrowing closure;
        // that keeps the returned future `Send` for spawned callers.
        let pending: Vec<_> = sources
            .iter()
            .map(|source| async move { (source, self.collect(source, events).await) })
            .collect();
        let mut batches = stream::iter(pending).buffered(self.max_concurrent_feeds);

        while let Some((source, batch)) = batches.next().await {
            report.sources += 1;
            report.entries += batch.entries;
            report.skipped += batch.skipped;

            let before = report;
            for candidate in &batch.candidates {
                report.attempted += 1;
                persist(store, candidate, events, &mut report).await?;
            }

            tracing::info!(
                feed_url = %source.url,
                category = ?source.category,
                entries = batch.entries,
                inserted = report.inserted - before.inserted,
                duplicates = report.duplicates - before.duplicates,
                failed = report.failed - before.failed,
                "source ingested"
            );
        }

        tracing::info!(
            sources = report.sources,
            entries = report.entries,
            attempted = report.attempted,
            inserted = report.inserted,
            duplicates = report.duplicates,
            failed = report.failed,
            skipped = report.skipped,
            "ingestion run complete"
        );

        Ok(report)
    }
}

async fn persist<S, E>(
    store: &S,
    candidate: &NewsCandidate,
    events: &E,
    report: &mut IngestReport,
) -> Result<(), IngestError>
where
    S: NewsStore,
    E: EventSink,
{
    match store.insert_news(candidate).await {
        Ok(InsertOutcome::Inserted(id)) => {
            report.inserted += 1;
            tracing::debug!(id, link = %candidate.link, "news item saved");
            events.emit(IngestEvent::ItemSaved {
                link: candidate.link.clone(),
            });
        }
        Ok(InsertOutcome::Duplicate) => {
            report.duplicates += 1;
            events.emit(IngestEvent::ItemDuplicate {
                link: candidate.link.clone(),
            });
        }
        Err(e) => {
            report.failed += 1;
            tracing::error!(
                link = %candidate.link,
                title = %candidate.title,
                description = ?candidate.description,
                image = ?candidate.image,
                published_at = %candidate.published_at,
                category = ?candidate.category,
                error = %e,
                "failed to save news item"
            );
            events.emit(IngestEvent::ItemSaveFailed {
                link: candidate.link.clone(),
                error: e.to_string(),
            });
            if e.is_pool_closed() {
                return Err(e.into());
            }
        }
    }
    Ok(())
}
