//! The collector: single consumer and single writer of the run's stores

use crate::pipeline::{PipelineError, RecordReceiver};
use crate::storage::{Dataset, ResumeStore, Upsert};
use tokio::task::JoinHandle;

/// Counts of what the collector did during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Records received from the queue
    pub received: usize,

    /// Records for URLs not yet in the dataset
    pub inserted: usize,

    /// Records that overwrote an existing dataset entry
    pub replaced: usize,
}

/// Everything the collector hands back once the queue is drained
#[derive(Debug)]
pub struct Collected {
    pub dataset: Dataset,
    pub resume: ResumeStore,
    pub stats: CollectStats,
}

/// Owns the dataset and resume set for the duration of a run
///
/// Nothing else mutates the stores while the collector runs, so they need no
/// locking.
pub struct Collector {
    dataset: Dataset,
    resume: ResumeStore,
    stats: CollectStats,
}

impl Collector {
    pub fn new(dataset: Dataset, resume: ResumeStore) -> Self {
        Self {
            dataset,
            resume,
            stats: CollectStats::default(),
        }
    }

    /// Applies every record from the queue until it is closed and drained
    pub async fn run(mut self, mut receiver: RecordReceiver) -> Collected {
        while let Some(record) = receiver.pop().await {
            self.stats.received += 1;
            let url = record.url.clone();

            match self.dataset.upsert(record) {
                Upsert::Inserted => self.stats.inserted += 1,
                Upsert::Replaced => self.stats.replaced += 1,
            }
            self.resume.merge(url);
        }

        tracing::debug!(
            "Collector drained: {} received, {} inserted, {} replaced",
            self.stats.received,
            self.stats.inserted,
            self.stats.replaced
        );

        Collected {
            dataset: self.dataset,
            resume: self.resume,
            stats: self.stats,
        }
    }

    /// Runs the collector on its own task
    pub fn spawn(self, receiver: RecordReceiver) -> CollectorHandle {
        CollectorHandle {
            handle: tokio::spawn(self.run(receiver)),
        }
    }
}

/// Handle to a spawned collector
pub struct CollectorHandle {
    handle: JoinHandle<Collected>,
}

impl CollectorHandle {
    /// Waits until the collector has drained the queue and returns the stores
    ///
    /// The queue's sender must be closed first, or this waits forever.
    pub async fn finish(self) -> Result<Collected, PipelineError> {
        self.handle
            .await
            .map_err(|e| PipelineError::CollectorFailed(e.to_string()))
    }
}
