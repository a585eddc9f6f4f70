//! Admission control for asynchronous calls.
//!
//! Every async call a client issues holds one permit of a counting semaphore from the moment
//! it is admitted until the spawned call finishes. Submission waits for a permit instead of
//! dropping work, so at most `capacity` calls are ever in flight per client.
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::FaroError;

#[derive(Debug)]
pub struct AsyncJobThrottle {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AsyncJobThrottle {
    pub fn new(max_async: usize) -> Self {
        let capacity = max_async.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of admitted calls that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Waits for capacity, then spawns `call` onto the runtime. The returned handle resolves to
    /// the call's result; dropping it detaches the call without cancelling it.
    #[tracing::instrument(skip_all, fields(capacity = self.capacity))]
    pub async fn submit<F, T>(&self, call: F) -> Result<JobHandle<T>, FaroError>
    where
        F: Future<Output = Result<T, FaroError>> + Send + 'static,
        T: Send + 'static,
    {
        if self.permits.available_permits() == 0 {
            log::debug!(
                "{} async calls in flight, waiting for one to finish",
                self.capacity
            );
        }
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|err| {
                FaroError::InvalidArgument(format!("admission unavailable: {err}"))
            })?;
        let inner = tokio::spawn(async move {
            let result = call.await;
            drop(permit);
            result
        });
        Ok(JobHandle { inner })
    }
}

/// An admitted asynchronous call
#[derive(Debug)]
pub struct JobHandle<T> {
    inner: JoinHandle<Result<T, FaroError>>,
}

impl<T> JobHandle<T> {
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<T> Future for JobHandle<T> {
    type Output = Result<T, FaroError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(err) => Err(FaroError::JobAborted(err)),
        })
    }
}
