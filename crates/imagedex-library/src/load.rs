use futures::Stream;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::info;

use imagedex_core::error::{Error, Result};
use imagedex_core::scan;
use imagedex_index::ImageIndex;

use crate::{BusyGuard, Inner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// Sent once, after the inputs have been expanded to image files.
    Started { total: usize },
    /// Sent after each record is built; `processed` counts from 1.
    Progress { processed: usize, total: usize, path: PathBuf },
    /// The new index is installed and the library accepts reads again.
    Finished { records: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub total: usize,
    pub records: usize,
    pub elapsed: Duration,
}

/// A running load: a stream of `LoadEvent`s and a terminal summary.
pub struct LoadTask {
    events: UnboundedReceiver<LoadEvent>,
    handle: JoinHandle<Result<LoadSummary>>,
}

impl LoadTask {
    pub(crate) fn new(events: UnboundedReceiver<LoadEvent>, handle: JoinHandle<Result<LoadSummary>>) -> Self {
        Self { events, handle }
    }

    /// Wait for the worker. Unread events are dropped.
    pub async fn wait(self) -> Result<LoadSummary> {
        self.handle.await.map_err(|e| Error::Operation(format!("load worker failed: {}", e)))?
    }
}

impl Stream for LoadTask {
    type Item = LoadEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<LoadEvent>> {
        self.events.poll_recv(cx)
    }
}

/// Body of the blocking load worker.
pub(crate) fn run(inner: &Arc<Inner>, guard: BusyGuard, inputs: &[PathBuf], events: &UnboundedSender<LoadEvent>) -> Result<LoadSummary> {
    let started = Instant::now();
    let files = scan::image_files(inputs, &inner.scan);
    let total = files.len();
    info!(inputs = inputs.len(), total, "loading images");
    // A dropped receiver only means nobody is watching progress.
    let _ = events.send(LoadEvent::Started { total });

    let mut index = ImageIndex::new();
    for (i, path) in files.into_iter().enumerate() {
        let record = inner.builder.build(&path);
        index.push(record);
        let _ = events.send(LoadEvent::Progress { processed: i + 1, total, path });
    }
    let records = index.len();

    {
        let mut shared = inner.write()?;
        let query = shared.query().unwrap_or_default().to_string();
        index.search(&query);
        *shared = index;
    }
    drop(guard);

    let elapsed = started.elapsed();
    info!(records, elapsed_ms = elapsed.as_millis() as u64, "load finished");
    let _ = events.send(LoadEvent::Finished { records });
    Ok(LoadSummary { total, records, elapsed })
}
