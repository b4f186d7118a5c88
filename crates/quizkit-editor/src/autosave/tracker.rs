//! Dirty state tracking for the active page.

use std::time::Instant;

use super::AutoSaveConfig;

/// Tracks edits to the active page that have not reached the page cache.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    last_edit: Option<Instant>,
    /// Reset on every successful flush.
    first_unflushed: Option<Instant>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.first_unflushed.is_some()
    }

    pub fn mark_dirty(&mut self) {
        let now = Instant::now();
        self.last_edit = Some(now);
        self.first_unflushed.get_or_insert(now);
    }

    /// The buffer now matches the cache.
    pub fn mark_flushed(&mut self) {
        self.first_unflushed = None;
    }

    pub fn ms_since_last_edit(&self) -> Option<u64> {
        self.last_edit.map(elapsed_ms)
    }

    pub fn ms_since_first_unflushed(&self) -> Option<u64> {
        self.first_unflushed.map(elapsed_ms)
    }

    pub fn should_flush(&self, config: &AutoSaveConfig) -> bool {
        match (self.ms_since_last_edit(), self.ms_since_first_unflushed()) {
            (Some(since_last), Some(since_first)) => config.should_flush(since_last, since_first),
            _ => false,
        }
    }
}

fn elapsed_ms(instant: Instant) -> u64 {
    u64::try_from(instant.elapsed().as_millis()).unwrap_or(u64::MAX)
}
