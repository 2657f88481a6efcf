//! Progress-callback trait for unlock events.
//!
//! Inject an [`Arc<dyn UnlockProgressCallback>`] via
//! [`crate::config::UnlockConfigBuilder::progress_callback`] to hear about
//! each strategy as it starts or gives up, and each candidate password as it
//! is tried. The CLI uses it to drive a spinner; a server could forward the
//! events to a websocket.
//!
//! # Example
//!
//! ```rust
//! use pdf_unlock::{Method, UnlockConfig, UnlockProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct AttemptCounter(AtomicUsize);
//!
//! impl UnlockProgressCallback for AttemptCounter {
//!     fn on_attempt(&self, _method: Method, _index: usize, _total: usize) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let counter = Arc::new(AttemptCounter(AtomicUsize::new(0)));
//! let config = UnlockConfig::builder()
//!     .progress_callback(counter as Arc<dyn UnlockProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::Method;
use std::sync::Arc;

/// Called by the unlock pipeline as it works through strategies.
///
/// Implementations must be `Send + Sync`: strategy B runs on tokio's blocking
/// pool, so `on_attempt` may fire from a different thread than the one that
/// called [`crate::unlock`]. All methods default to no-ops.
pub trait UnlockProgressCallback: Send + Sync {
    /// Called once before the first strategy runs.
    ///
    /// # Arguments
    /// * `input_bytes`: size of the PDF buffer
    /// * `candidates`: number of candidate passwords per strategy
    fn on_unlock_start(&self, input_bytes: usize, candidates: usize) {
        let _ = (input_bytes, candidates);
    }

    /// Called when a strategy begins.
    fn on_strategy_start(&self, method: Method) {
        let _ = method;
    }

    /// Called before each candidate password is tried.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the candidate list
    /// * `total`: candidate list length
    fn on_attempt(&self, method: Method, index: usize, total: usize) {
        let _ = (method, index, total);
    }

    /// Called when a strategy gives up.
    fn on_strategy_failed(&self, method: Method, error: &str) {
        let _ = (method, error);
    }

    /// Called once when the pipeline finishes.
    ///
    /// `method` is `Some` on success.
    fn on_unlock_complete(&self, method: Option<Method>) {
        let _ = method;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl UnlockProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::UnlockConfig`].
pub type ProgressCallback = Arc<dyn UnlockProgressCallback>;
