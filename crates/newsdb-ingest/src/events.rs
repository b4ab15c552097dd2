//! Observational side-channel for ingestion runs.
//!
//! Sinks cannot fail and the pipeline never reads anything back from them.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    EntriesCollected { feed_url: String, count: usize },
    ItemSaved { link: String },
    ItemDuplicate { link: String },
    ItemSaveFailed { link: String, error: String },
}

impl IngestEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EntriesCollected { .. } => "entries collected",
            Self::ItemSaved { .. } => "item saved",
            Self::ItemDuplicate { .. } => "item duplicate",
            Self::ItemSaveFailed { .. } => "item save failed",
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: IngestEvent);
}

/// Forwards events to `tracing` under the `newsdb::events` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: IngestEvent) {
        let name = event.name();
        match event {
            IngestEvent::EntriesCollected { feed_url, count } => {
                tracing::info!(target: "newsdb::events", event = name, %feed_url, count);
            }
            IngestEvent::ItemSaved { link } | IngestEvent::ItemDuplicate { link } => {
                tracing::debug!(target: "newsdb::events", event = name, %link);
            }
            IngestEvent::ItemSaveFailed { link, error } => {
                tracing::warn!(target: "newsdb::events", event = name, %link, %error);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: IngestEvent) {}
}
