//! Async access to the gateway
//!
//! Writes are queued to one dedicated writer thread so they never run on
//! the caller's thread and never overlap. Reads run on the blocking pool.
//! Dropping a returned future does not cancel work already queued.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Sender};
use tokio::sync::oneshot;

use crate::gateway::{ListQuery, SaleOutcome, StockGateway};
use crate::notify::panic_message;
use crate::record::{Filter, RowSet, StockFields};
use crate::storage::StoreStats;
use crate::uri::ResourceUri;
use crate::{Error, Result};

type Job = Box<dyn FnOnce(&StockGateway) + Send>;

/// Cloneable handle to a gateway and its writer thread.
#[derive(Clone)]
pub struct StockService {
    gateway: Arc<StockGateway>,
    jobs: Sender<Job>,
}

impl StockService {
    /// Spawn the writer thread for `gateway`.
    ///
    /// The thread exits once every handle has been dropped.
    pub fn start(gateway: StockGateway) -> Result<Self> {
        let gateway = Arc::new(gateway);
        let (jobs, queue) = channel::unbounded::<Job>();

        let writer = Arc::clone(&gateway);
        thread::Builder::new()
            .name("shopit-writer".to_string())
            .spawn(move || {
                tracing::debug!("Writer thread started");
                for job in queue {
                    // The reply sender is dropped with the job, so the caller sees `Worker`.
                    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| job(&writer))) {
                        tracing::error!("Write job panicked: {}", panic_message(panic.as_ref()));
                    }
                }
                tracing::debug!("Writer thread stopped");
            })?;

        Ok(Self { gateway, jobs })
    }

    pub fn gateway(&self) -> &Arc<StockGateway> {
        &self.gateway
    }

    /// Queue a write and wait for its outcome
    async fn write<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&StockGateway) -> Result<T> + Send + 'static,
    {
        let (reply, outcome) = oneshot::channel();
        let job: Job = Box::new(move |gateway| {
            // The caller may have stopped waiting; the write still happened.
            let _ = reply.send(op(gateway));
        });
        self.jobs
            .send(job)
            .map_err(|_| Error::Worker("writer thread is not running".to_string()))?;
        outcome
            .await
            .map_err(|_| Error::Worker("writer dropped the request".to_string()))?
    }

    /// Run a read on the blocking pool
    async fn read<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&StockGateway) -> Result<T> + Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        tokio::task::spawn_blocking(move || op(&gateway))
            .await
            .map_err(|e| Error::Worker(e.to_string()))?
    }

    pub async fn list(&self, resource: impl Into<String>, query: ListQuery) -> Result<RowSet> {
        let resource = resource.into();
        self.read(move |g| g.list(&resource, &query)).await
    }

    pub async fn content_type(&self, resource: impl Into<String>) -> Result<String> {
        let resource = resource.into();
        self.read(move |g| g.content_type(&resource)).await
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        self.read(|g| g.stats()).await
    }

    pub async fn create(&self, resource: impl Into<String>, fields: StockFields) -> Result<ResourceUri> {
        let resource = resource.into();
        self.write(move |g| g.create(&resource, &fields)).await
    }

    pub async fn update(
        &self,
        resource: impl Into<String>,
        fields: StockFields,
        filter: Option<Filter>,
    ) -> Result<usize> {
        let resource = resource.into();
        self.write(move |g| g.update(&resource, &fields, filter.as_ref())).await
    }

    pub async fn delete(&self, resource: impl Into<String>, filter: Option<Filter>) -> Result<usize> {
        let resource = resource.into();
        self.write(move |g| g.delete(&resource, filter.as_ref())).await
    }

    pub async fn record_sale(&self, resource: impl Into<String>) -> Result<Option<SaleOutcome>> {
        let resource = resource.into();
        self.write(move |g| g.record_sale(&resource)).await
    }

    pub async fn insert_sample(&self) -> Result<ResourceUri> {
        self.write(|g| g.insert_sample()).await
    }
}
