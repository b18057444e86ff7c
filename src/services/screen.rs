//! Management screen service
//!
//! Ties one list controller to the source it lists:
//! - mount/unmount lifecycle with a background fetch
//! - refetch after every successful mutation (no optimistic updates)
//! - results that arrive after unmount are discarded

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::config::{ScreenDefinition, ScreenPreset};
use crate::list::{ListController, ListError};
use crate::models::Record;
use crate::services::serial::next_serial;
use crate::source::{RecordMutations, RecordSource, SourceError};

/// Error types for screen operations
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    /// Fetch or mutation failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Screen definition was rejected by the controller
    #[error("Invalid screen definition: {0}")]
    Definition(#[from] ListError),

    /// The screen was unmounted; the result was discarded
    #[error("Screen is not mounted")]
    Unmounted,
}

struct ScreenInner<S> {
    preset: ScreenPreset,
    title: &'static str,
    source: S,
    controller: ListController<Record>,
    mounted: AtomicBool,
}

impl<S> ScreenInner<S>
where
    S: RecordSource + RecordMutations,
{
    fn ensure_mounted(&self) -> Result<(), ScreenError> {
        if self.mounted.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ScreenError::Unmounted)
        }
    }

    async fn refresh(&self) -> Result<usize, ScreenError> {
        self.ensure_mounted()?;
        let records = self.source.fetch_records().await?;

        // Unmounted while the request was in flight
        self.ensure_mounted()?;

        let count = records.len();
        self.controller.set_records(records);
        tracing::info!("{}: loaded {} records", self.title, count);
        Ok(count)
    }
}

/// One admin management screen
pub struct ManagementScreen<S> {
    inner: Arc<ScreenInner<S>>,
    fetch: Mutex<Option<JoinHandle<()>>>,
}

impl<S> ManagementScreen<S>
where
    S: RecordSource + RecordMutations + 'static,
{
    /// Create an unmounted screen
    pub fn new(definition: ScreenDefinition, source: S) -> Result<Self, ScreenError> {
        let controller = ListController::new(definition.list)?;
        Ok(Self {
            inner: Arc::new(ScreenInner {
                preset: definition.preset,
                title: definition.title,
                source,
                controller,
                mounted: AtomicBool::new(false),
            }),
            fetch: Mutex::new(None),
        })
    }

    /// Which preset this screen was built from
    pub fn preset(&self) -> ScreenPreset {
        self.inner.preset
    }

    /// Heading shown above the table
    pub fn title(&self) -> &'static str {
        self.inner.title
    }

    /// The list controller backing the table
    pub fn controller(&self) -> &ListController<Record> {
        &self.inner.controller
    }

    /// The underlying record source
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Whether the screen is mounted
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    /// Mount and start loading records in the background.
    ///
    /// Must be called from within a tokio runtime. Fetch failures are logged;
    /// the table keeps its previous records.
    pub fn mount(&self) {
        self.inner.mounted.store(true, Ordering::SeqCst);
        tracing::info!("{}: mounted", self.inner.title);

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            match inner.refresh().await {
                Ok(_) => {}
                Err(ScreenError::Unmounted) => {
                    tracing::debug!("{}: discarded fetch after unmount", inner.title);
                }
                Err(e) => {
                    tracing::warn!("{}: failed to load records: {}", inner.title, e);
                }
            }
        });

        if let Some(previous) = self.lock_fetch().replace(task) {
            previous.abort();
        }
    }

    /// Mount and wait for the first load
    pub async fn open(&self) -> Result<usize, ScreenError> {
        self.inner.mounted.store(true, Ordering::SeqCst);
        tracing::info!("{}: mounted", self.inner.title);
        self.refresh().await
    }

    /// Wait for the background fetch started by `mount`, if one is running
    pub async fn loaded(&self) {
        let task = self.lock_fetch().take();
        if let Some(task) = task {
            // An aborted fetch has nothing to report
            let _ = task.await;
        }
    }

    /// Refetch the whole collection and replace the controller's records
    pub async fn refresh(&self) -> Result<usize, ScreenError> {
        self.inner.refresh().await
    }

    /// Unmount: abort the in-flight fetch and drop any pending search
    pub fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::SeqCst);
        if let Some(task) = self.lock_fetch().take() {
            task.abort();
        }
        self.inner.controller.shutdown();
        tracing::info!("{}: unmounted", self.inner.title);
    }

    /// Create a record, then refetch
    pub async fn create(&self, record: &Record) -> Result<usize, ScreenError> {
        self.inner.ensure_mounted()?;
        self.inner.source.create(record).await?;
        self.refresh().await
    }

    /// Update a record, then refetch
    pub async fn update(&self, id: &str, record: &Record) -> Result<usize, ScreenError> {
        self.inner.ensure_mounted()?;
        self.inner.source.update(id, record).await?;
        self.refresh().await
    }

    /// Delete a record, then refetch
    pub async fn delete(&self, id: &str) -> Result<usize, ScreenError> {
        self.inner.ensure_mounted()?;
        self.inner.source.delete(id).await?;
        self.refresh().await
    }

    /// Approve a submission, then refetch
    pub async fn approve(&self, id: &str) -> Result<usize, ScreenError> {
        self.inner.ensure_mounted()?;
        self.inner.source.approve(id).await?;
        self.refresh().await
    }

    /// Reject a submission with a reason, then refetch
    pub async fn reject(&self, id: &str, reason: &str) -> Result<usize, ScreenError> {
        self.inner.ensure_mounted()?;
        self.inner.source.reject(id, reason).await?;
        self.refresh().await
    }

    /// Next serial for `field` over the loaded records, e.g. `RAD-004`
    pub fn next_serial(&self, field: &str, prefix: &str, width: usize) -> String {
        self.inner
            .controller
            .with_records(|records| next_serial(records, field, prefix, width))
    }

    fn lock_fetch(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.fetch.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S> Drop for ManagementScreen<S> {
    fn drop(&mut self) {
        let task = self.fetch.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            task.abort();
        }
    }
}
