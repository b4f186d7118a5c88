//! Deferred flushing of the active page.
//!
//! Provides:
//! - `DirtyTracker` - Tracks edits the page cache has not seen yet
//! - `AutoSaveConfig` - When a dirty buffer should be flushed

mod config;
mod tracker;

pub use config::AutoSaveConfig;
pub use tracker::DirtyTracker;
