//! Pipeline stages for PDF unlocking.
//!
//! Each decryption technique is one [`Strategy`]; the orchestrator in
//! [`crate::unlock`] runs them in a fixed order and stops at the first
//! success.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ qpdf (A) ──✗──▶ password (B) ──✗──▶ reconstruct (C) ──✗──▶ Failed
//!              │ ✓              │ ✓                  │ ✓
//!              └────────────────┴────────────────────┴──▶ Unlocked
//! ```
//!
//! 1. [`input`] turns the user-supplied path or URL into bytes
//! 2. [`qpdf`] is strategy A, the external tool, once per candidate
//! 3. [`password`] is strategy B, lopdf decrypt, once per candidate
//! 4. [`reconstruct`] is strategy C, pages copied into a fresh document
//! 5. [`metadata`] gathers document facts for `inspect`, independent of 2-4

pub mod document;
pub mod input;
pub mod metadata;
pub mod password;
pub mod qpdf;
pub mod reconstruct;

use crate::config::UnlockConfig;
use crate::error::UnlockError;
use crate::output::Method;
use crate::progress::ProgressCallback;
use futures::future::BoxFuture;
use std::sync::Arc;

/// What a strategy returns on success.
#[derive(Debug, Clone)]
pub struct Decrypted {
    pub pdf: Vec<u8>,
    pub message: String,
    pub password: Option<String>,
    pub attempts: usize,
}

/// Shared inputs for one strategy run.
///
/// Cheap to clone so that blocking strategies can move it onto the blocking
/// pool.
#[derive(Clone)]
pub struct AttemptContext {
    /// Candidate passwords in the order they must be tried.
    pub candidates: Arc<[String]>,
    pub progress: Option<ProgressCallback>,
}

impl AttemptContext {
    pub fn new(candidates: Vec<String>, progress: Option<ProgressCallback>) -> Self {
        Self {
            candidates: candidates.into(),
            progress,
        }
    }

    pub(crate) fn report_attempt(&self, method: Method, index: usize) {
        if let Some(ref cb) = self.progress {
            cb.on_attempt(method, index + 1, self.candidates.len());
        }
    }
}

/// One self-contained decryption technique.
///
/// A strategy either returns the unencrypted document or an error explaining
/// why it gave up. Per-password failures are the strategy's own business and
/// must not surface as errors unless every candidate failed.
pub trait Strategy: Send + Sync {
    fn method(&self) -> Method;

    fn attempt(
        &self,
        pdf: Arc<[u8]>,
        ctx: AttemptContext,
    ) -> BoxFuture<'_, Result<Decrypted, UnlockError>>;
}

/// The default A → B → C chain for a config.
///
/// Strategy A is left out when `config.external_tool` is false.
pub fn default_strategies(config: &UnlockConfig) -> Vec<Box<dyn Strategy>> {
    let mut strategies: Vec<Box<dyn Strategy>> = Vec::with_capacity(3);
    if config.external_tool {
        strategies.push(Box::new(qpdf::QpdfStrategy::from_config(config)));
    }
    strategies.push(Box::new(password::PasswordStrategy));
    strategies.push(Box::new(reconstruct::ReconstructStrategy));
    strategies
}

/// Run blocking PDF work on tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(what: &'static str, f: F) -> Result<T, UnlockError>
where
    F: FnOnce() -> Result<T, UnlockError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| UnlockError::Internal(format!("{what} task panicked: {e}")))?
}
