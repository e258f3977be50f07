//! Bounded record queue between the crawl loop and the collector

use crate::pipeline::PipelineError;
use crate::storage::Record;
use tokio::sync::mpsc;

/// Creates a bounded queue holding at most `capacity` records
///
/// # Panics
///
/// Panics if `capacity` is zero; configuration validation rejects that.
pub fn bounded(capacity: usize) -> (RecordSender, RecordReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (RecordSender { tx }, RecordReceiver { rx })
}

/// Producing half of the record queue, owned by the crawl loop
#[derive(Debug)]
pub struct RecordSender {
    tx: mpsc::Sender<Record>,
}

impl RecordSender {
    /// Pushes a record, waiting while the queue is full
    pub async fn push(&self, record: Record) -> Result<(), PipelineError> {
        self.tx
            .send(record)
            .await
            .map_err(|e| PipelineError::CollectorGone { url: e.0.url })
    }

    /// Closes the queue; the receiver still gets every record already pushed
    pub fn close(self) {
        drop(self);
    }
}

/// Consuming half of the record queue, owned by the collector
#[derive(Debug)]
pub struct RecordReceiver {
    rx: mpsc::Receiver<Record>,
}

impl RecordReceiver {
    /// Next record, waiting while the queue is empty
    ///
    /// Returns `None` only once the sender is closed and every buffered
    /// record has been returned.
    pub async fn pop(&mut self) -> Option<Record> {
        self.rx.recv().await
    }
}
