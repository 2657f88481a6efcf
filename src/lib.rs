//! # pdf-unlock
//!
//! Best-effort removal of password protection from PDF documents.
//!
//! ## Why this crate?
//!
//! A PDF can be locked in two ways: a *user* password that blocks opening it,
//! or an *owner* password that only restricts printing, copying and editing.
//! No single technique handles every file in the wild, so this crate chains
//! three of them and keeps the first that works.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ A. qpdf         external tool, once per candidate password
//!  ├─ B. lopdf        in-process decrypt, once per candidate password
//!  ├─ C. reconstruct  copy every page into a fresh unencrypted document
//!  └─ Outcome         Unlocked { pdf, method, message, .. } | Failed { message }
//! ```
//!
//! Candidates are the configured hint, then any extra passwords, then the
//! built-in dictionary (which starts with the empty password).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_unlock::{unlock_to_file, UnlockConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UnlockConfig::builder().password("quarterly").build()?;
//!     let report = unlock_to_file("locked.pdf", "unlocked.pdf", &config).await?;
//!     eprintln!("{} via {}", report.message, report.method);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfunlock` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf-unlock = { version = "0.1", default-features = false }
//! ```
//!
//! ## External Tool
//!
//! Strategy A needs `qpdf` on `PATH` (or [`UnlockConfig::qpdf_program`]).
//! When it is missing, strategy A fails fast and B and C still run.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod passwords;
pub mod pipeline;
pub mod progress;
pub mod unlock;

#[cfg(test)]
mod fixtures;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{UnlockConfig, UnlockConfigBuilder};
pub use error::UnlockError;
pub use output::{
    DocumentInfo, Method, UnlockOutcome, UnlockReport, UnlockRequest, UnlockResponse,
};
pub use passwords::DictionaryTier;
pub use pipeline::{AttemptContext, Decrypted, Strategy};
pub use progress::{NoopProgressCallback, ProgressCallback, UnlockProgressCallback};
pub use unlock::{
    inspect, inspect_bytes, unlock, unlock_envelope, unlock_file, unlock_sync, unlock_to_file,
    Pipeline,
};
