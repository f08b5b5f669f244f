// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Filtering out changes under ignored directories (`[watch].ignore`).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Collapsing bursts of notifications into one debounced trigger.
//!
//! It knows nothing about the pipeline; it only turns filesystem changes into
//! `RuntimeEvent::Triggered`.

pub mod debounce;
pub mod filter;
pub mod watcher;

pub use debounce::debounce_changes;
pub use filter::ChangeFilter;
pub use watcher::{WatcherHandle, spawn_watcher};
