use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

/// Fetch counters kept by a client, readable while it is in use.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub num_fetches: Arc<AtomicUsize>,
    pub num_fetch_errors: Arc<AtomicUsize>,
    pub num_upstream_errors: Arc<AtomicUsize>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            num_fetches: Arc::new(AtomicUsize::new(0)),
            num_fetch_errors: Arc::new(AtomicUsize::new(0)),
            num_upstream_errors: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Statistics {
    pub fn fetches(&self) -> usize {
        self.num_fetches.load(Ordering::Relaxed)
    }

    pub fn fetch_errors(&self) -> usize {
        self.num_fetch_errors.load(Ordering::Relaxed)
    }

    pub fn upstream_errors(&self) -> usize {
        self.num_upstream_errors.load(Ordering::Relaxed)
    }

    pub fn write_to_log(&self, running_time: Duration) {
        tracing::info!(
            num_fetches = self.fetches(),
            num_fetch_errors = self.fetch_errors(),
            num_upstream_errors = self.upstream_errors(),
            running_time = ?running_time,
            "statistics"
        );
    }
}
