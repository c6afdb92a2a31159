//! imagedex-library
//!
//! Owned image store with a single mutation entry point. `load` resolves the
//! selected files and folders, classifies every image on one blocking worker
//! and reports progress as a stream; reads and search go through `Library`
//! and are refused while a load is running.

pub mod load;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::warn;

use imagedex_core::config::Settings;
use imagedex_core::error::{Error, Result};
use imagedex_core::scan::ScanOptions;
use imagedex_core::types::{ImageRecord, LabelRow};
use imagedex_index::{detail_rows, ImageIndex};
use imagedex_vision::RecordBuilder;

pub use load::{LoadEvent, LoadSummary, LoadTask};

/// One section with its records resolved, for display.
#[derive(Debug, Clone)]
pub struct SectionView {
    pub name: String,
    pub records: Vec<ImageRecord>,
}

pub(crate) struct Inner {
    pub(crate) index: RwLock<ImageIndex>,
    pub(crate) loading: AtomicBool,
    pub(crate) builder: RecordBuilder,
    pub(crate) scan: ScanOptions,
}

impl Inner {
    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, ImageIndex>> {
        self.index.write().map_err(|_| Error::Operation("image index lock poisoned".into()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ImageIndex>> {
        self.index.read().map_err(|_| Error::Operation("image index lock poisoned".into()))
    }
}

/// Clears the busy flag when the load worker is done, whatever the outcome.
pub(crate) struct BusyGuard(Arc<Inner>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.loading.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct Library {
    inner: Arc<Inner>,
}

impl Library {
    pub fn new(builder: RecordBuilder, scan: ScanOptions) -> Self {
        let inner = Inner { index: RwLock::new(ImageIndex::new()), loading: AtomicBool::new(false), builder, scan };
        Self { inner: Arc::new(inner) }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(RecordBuilder::from_settings(settings), settings.scan.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::Acquire)
    }

    /// Start a bulk load on the current Tokio runtime.
    ///
    /// Clears the existing records before returning. Fails with
    /// `Error::LoadInProgress` while another load runs.
    pub fn load<I, P>(&self, inputs: I) -> Result<LoadTask>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let runtime = Handle::try_current().map_err(|e| Error::Operation(format!("load needs a Tokio runtime: {}", e)))?;
        if self.inner.loading.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            warn!("rejecting load while another load is running");
            return Err(Error::LoadInProgress);
        }
        let guard = BusyGuard(self.inner.clone());
        self.inner.write()?.clear();

        let inputs: Vec<PathBuf> = inputs.into_iter().map(Into::into).collect();
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = self.inner.clone();
        let handle = runtime.spawn_blocking(move || load::run(&inner, guard, &inputs, &tx));
        Ok(LoadTask::new(rx, handle))
    }

    /// Set or clear (empty `query`) the search filter.
    pub fn search(&self, query: &str) -> Result<()> {
        self.ensure_ready()?;
        let mut index = self.inner.write()?;
        self.ensure_ready()?;
        index.search(query);
        Ok(())
    }

    /// Run `f` against a read snapshot of the index.
    pub fn read<R>(&self, f: impl FnOnce(&ImageIndex) -> R) -> Result<R> {
        self.ensure_ready()?;
        let index = self.inner.read()?;
        // A load may have started between the check and the lock.
        self.ensure_ready()?;
        Ok(f(&*index))
    }

    pub fn section_count(&self) -> Result<usize> {
        self.read(ImageIndex::section_count)
    }

    pub fn section_name(&self, section: usize) -> Result<String> {
        self.read(|index| index.section_name(section).map(str::to_string))?
    }

    pub fn image_count(&self, section: usize) -> Result<usize> {
        self.read(|index| index.image_count(section))?
    }

    pub fn image_at(&self, row: usize, section: usize) -> Result<ImageRecord> {
        self.read(|index| index.image_at(row, section).cloned())?
    }

    /// Detail rows for the record at (`row`, `section`).
    pub fn details(&self, row: usize, section: usize) -> Result<Vec<LabelRow>> {
        self.read(|index| index.image_at(row, section).map(|record| detail_rows(record.categories())))?
    }

    pub fn sections(&self) -> Result<Vec<SectionView>> {
        self.read(|index| {
            index
                .sections()
                .into_iter()
                .map(|section| SectionView {
                    name: section.name.to_string(),
                    records: section.positions.iter().filter_map(|&p| index.records().get(p).cloned()).collect(),
                })
                .collect()
        })
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_loading() { Err(Error::Busy) } else { Ok(()) }
    }
}
