//! Producer/consumer pipeline for scraped records
//!
//! The crawl loop is the only producer and the [`Collector`] the only
//! consumer. They are connected by a bounded queue: a full queue makes the
//! crawl loop wait, which bounds memory regardless of catalog size. Closing
//! the sender ends input; [`CollectorHandle::finish`] returns only after the
//! collector has applied every buffered record, and is the synchronization
//! point before anything is persisted.

mod collector;
mod queue;

pub use collector::{CollectStats, Collected, Collector, CollectorHandle};
pub use queue::{bounded, RecordReceiver, RecordSender};

use thiserror::Error;

/// Errors that can occur while moving records through the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Collector stopped before accepting record for {url}")]
    CollectorGone { url: String },

    #[error("Collector task failed: {0}")]
    CollectorFailed(String),
}
