use std::path::Path;

use anyhow::Context;
use newsdb_core::AppConfig;
use newsdb_ingest::{IngestConfig, IngestReport, IngestionRunner, TracingSink};

/// Run one ingestion pass over the configured feeds.
///
/// With `dry_run` the database is never touched; prepared candidates are
/// printed instead.
pub(crate) async fn run_ingest(
    config: &AppConfig,
    feeds_path: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let path = feeds_path.unwrap_or(config.feeds_path.as_path());
    let feeds = newsdb_core::load_feeds(path)
        .with_context(|| format!("loading feed list from {}", path.display()))?;
    tracing::info!(
        count = feeds.feeds.len(),
        path = %path.display(),
        dry_run,
        "starting ingestion"
    );

    let runner = IngestionRunner::new(&IngestConfig::from_app_config(config))?;

    if dry_run {
        let mut total = 0usize;
        for source in &feeds.feeds {
            let batch = runner.collect(source, &TracingSink).await;
            println!(
                "{} ({} entries, {} skipped)",
                source.url, batch.entries, batch.skipped
            );
            for candidate in &batch.candidates {
                println!(
                    "  {}  {}  image={}",
                    candidate.published_at.to_rfc3339(),
                    candidate.link,
                    candidate.image.as_deref().unwrap_or("-")
                );
            }
            total += batch.candidates.len();
        }
        println!("dry run: {total} candidate(s), nothing written");
        return Ok(());
    }

    let pool_config = newsdb_db::PoolConfig::from_app_config(config);
    let pool = newsdb_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("connecting to database")?;
    newsdb_db::run_migrations(&pool).await?;

    let report = runner.run(&feeds.feeds, &pool, &TracingSink).await?;
    println!("{}", format_report(&report));

    pool.close().await;
    Ok(())
}

fn format_report(report: &IngestReport) -> String {
    format!(
        "sources={} entries={} attempted={} inserted={} duplicates={} failed={} skipped={}",
        report.sources,
        report.entries,
        report.attempted,
        report.inserted,
        report.duplicates,
        report.failed,
        report.skipped
    )
}
