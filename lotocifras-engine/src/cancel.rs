//! Jeton d'annulation coopératif.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Partagé entre l'appelant et les étapes longues (ingestion, agrégation),
/// qui le consultent entre deux unités de travail.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
