//! Error types for the pdf-unlock library.
//!
//! One error type, [`UnlockError`], covers every failure the library can
//! name. Most of them never reach the caller of [`crate::unlock`]:
//!
//! * **Per-attempt** failures (wrong password, tool exit) are swallowed inside
//!   a strategy and only drive the next loop iteration.
//! * **Per-strategy** failures (passwords exhausted, tool missing, temp file
//!   I/O) are logged by the orchestrator, which then moves on to the next
//!   strategy.
//! * **Input/output** failures (file not found, download failed, output not
//!   writable) are returned as `Err(UnlockError)` from the file-oriented
//!   entry points such as [`crate::unlock_to_file`].
//!
//! The in-memory entry point [`crate::unlock`] never returns an error: its
//! result is always an [`crate::UnlockOutcome`].

use crate::output::Method;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pdf-unlock library.
#[derive(Debug, Error)]
pub enum UnlockError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The JSON request envelope could not be parsed.
    #[error("JSON parsing error: {0}")]
    InvalidEnvelope(String),

    /// `pdf_data` in the request envelope is not valid base64.
    #[error("Invalid base64 PDF data: {0}")]
    InvalidBase64(String),

    // ── Strategy errors ───────────────────────────────────────────────────
    /// The external decryption tool could not be started.
    #[error("External tool '{program}' not found.\nInstall qpdf or point --qpdf at the binary.")]
    ToolNotFound { program: String },

    /// The external decryption tool did not finish in time and was killed.
    #[error("External tool '{program}' timed out after {secs}s")]
    ToolTimeout { program: String, secs: u64 },

    /// Creating, writing or reading a strategy temporary file failed.
    #[error("Temporary file error: {source}")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    /// A candidate password did not open the document.
    #[error("Incorrect password")]
    WrongPassword,

    /// Every candidate password was tried without success.
    #[error("{method} decryption failed after {tried} passwords")]
    PasswordsExhausted { method: Method, tried: usize },

    /// The document could not be parsed at all.
    #[error("Failed to parse PDF: {detail}")]
    Parse { detail: String },

    /// Page content is encrypted under a user password the empty password
    /// does not open, so a copy would carry ciphertext.
    #[error("PDF content is encrypted with an unknown user password")]
    ContentEncrypted,

    /// The document parsed but has an empty page tree.
    #[error("No pages found in PDF")]
    NoPages,

    /// The decrypted or reconstructed document could not be serialised.
    #[error("Failed to serialise PDF: {detail}")]
    Serialise { detail: String },

    // ── Outcome errors ────────────────────────────────────────────────────
    /// Every strategy failed; carries the message of the failed outcome.
    #[error("{message}")]
    Unrecoverable { message: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (blocking task panicked, runtime failure).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl UnlockError {
    /// Wrap an I/O error raised while handling strategy temporaries.
    pub(crate) fn temp(source: std::io::Error) -> Self {
        UnlockError::TempFile { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_display_names_method() {
        let e = UnlockError::PasswordsExhausted {
            method: Method::Qpdf,
            tried: 74,
        };
        let msg = e.to_string();
        assert!(msg.contains("strategy-A"), "got: {msg}");
        assert!(msg.contains("74"), "got: {msg}");
    }

    #[test]
    fn tool_not_found_display() {
        let e = UnlockError::ToolNotFound {
            program: "/opt/qpdf/bin/qpdf".into(),
        };
        assert!(e.to_string().contains("/opt/qpdf/bin/qpdf"));
    }

    #[test]
    fn tool_timeout_display() {
        let e = UnlockError::ToolTimeout {
            program: "qpdf".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn no_pages_display() {
        assert_eq!(UnlockError::NoPages.to_string(), "No pages found in PDF");
    }

    #[test]
    fn envelope_errors_keep_detail() {
        let e = UnlockError::InvalidEnvelope("expected value at line 1".into());
        assert!(e.to_string().starts_with("JSON parsing error"));
        let e = UnlockError::InvalidBase64("Invalid byte 33".into());
        assert!(e.to_string().contains("Invalid byte 33"));
    }

    #[test]
    fn temp_file_error_has_source() {
        use std::error::Error as _;
        let e = UnlockError::temp(std::io::Error::new(
            std::io::ErrorKind::StorageFull,
            "disk full",
        ));
        assert!(e.source().is_some());
        assert!(e.to_string().contains("disk full"));
    }
}
