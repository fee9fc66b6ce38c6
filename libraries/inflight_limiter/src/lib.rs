use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

///
/// Caps the number of futures running through it at the same time.
///
/// A limiter without a cap is a no-op, so callers don't need to special-case
/// the unbounded configuration. Cloning shares the same permits.
///
#[derive(Clone, Default)]
pub struct InFlightLimiter {
    permits: Option<Arc<Semaphore>>,
    max_in_flight: Option<usize>,
}

impl InFlightLimiter {
    ///
    /// `None` and `Some(0)` both mean unbounded.
    ///
    pub fn new(max_in_flight: Option<usize>) -> Self {
        match max_in_flight {
            Some(max) if max > 0 => Self {
                permits: Some(Arc::new(Semaphore::new(max))),
                max_in_flight: Some(max),
            },
            _ => Self::unbounded(),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            permits: None,
            max_in_flight: None,
        }
    }

    pub fn max_in_flight(&self) -> Option<usize> {
        self.max_in_flight
    }

    ///
    /// Runs `fut` once a permit is available. The permit is released as soon
    /// as `fut` completes, so nested calls through the same limiter from
    /// inside `fut` would wait on the cap; keep `fut` to a single operation.
    ///
    pub async fn run<F: Future>(&self, fut: F) -> F::Output {
        match &self.permits {
            None => fut.await,
            Some(permits) => {
                // The semaphore is never closed, acquisition only fails after `close()`.
                let _permit = permits.acquire().await.ok();
                fut.await
            }
        }
    }

    ///
    /// Number of futures that could start right now without waiting.
    ///
    pub fn available(&self) -> Option<usize> {
        self.permits
            .as_ref()
            .map(|permits| permits.available_permits())
    }
}
