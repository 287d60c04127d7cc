//! Bounded channel that merges page results into one stream.
//!
//! Writers share clones of [`ResultSink`]; the single reader owns the
//! [`ResultStream`]. The stream ends once every sink handle has been dropped,
//! so closing cannot race a writer that still holds a handle.

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::trace;

use super::models::ResultItem;
use crate::errors::{EolError, Result};

/// Default sink capacity.
pub const DEFAULT_SINK_CAPACITY: usize = 5;

/// Creates a connected sink/stream pair with the given capacity.
///
/// A capacity of zero is treated as one.
#[must_use]
pub fn result_sink(capacity: usize) -> (ResultSink, ResultStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ResultSink { tx }, ResultStream { rx })
}

/// Write side of the result channel.
#[derive(Debug, Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<ResultItem>,
}

impl ResultSink {
    /// Writes one item, waiting while the channel is full.
    pub async fn put(&self, item: ResultItem) -> Result<()> {
        self.tx
            .send(item)
            .await
            .map_err(|_| EolError::Internal("result stream was dropped by its reader".to_string()))
    }

    /// Writes every item in order. Returns how many were written.
    pub async fn put_all(&self, items: Vec<ResultItem>) -> Result<usize> {
        let count = items.len();
        for item in items {
            self.put(item).await?;
        }
        Ok(count)
    }

    /// Whether the reader has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Releases this handle. The stream ends when the last handle is closed.
    pub fn close(self) {
        trace!(
            remaining_capacity = self.tx.capacity(),
            "Releasing result sink handle"
        );
        drop(self);
    }
}

/// Read side of the result channel.
#[derive(Debug)]
pub struct ResultStream {
    rx: mpsc::Receiver<ResultItem>,
}

impl ResultStream {
    /// Receives the next item, or `None` once all writers are gone and the
    /// buffer is empty.
    pub async fn next_item(&mut self) -> Option<ResultItem> {
        self.rx.recv().await
    }

    /// Reads every remaining item until the channel closes.
    pub async fn drain(mut self) -> Vec<ResultItem> {
        let mut items = Vec::new();
        while let Some(item) = self.rx.recv().await {
            items.push(item);
        }
        items
    }
}

impl Stream for ResultStream {
    type Item = ResultItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
