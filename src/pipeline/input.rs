//! Input resolution: turn a user-supplied path, URL or JSON envelope into
//! PDF bytes.
//!
//! The unlock pipeline works on an in-memory buffer, so a URL is downloaded
//! straight into memory. Local files and downloads are checked for the PDF
//! magic bytes (`%PDF`) before returning, so a mistyped path to a `.zip`
//! fails with a clear message instead of three strategies' worth of noise.
//! Envelope input is not checked: its caller expects a JSON failure response,
//! which the pipeline produces anyway.

use crate::error::UnlockError;
use crate::output::UnlockRequest;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The resolved input: bytes plus where they came from.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was a local file.
    Local { path: PathBuf, bytes: Vec<u8> },
    /// Input was a URL; the PDF was downloaded into memory.
    Downloaded { filename: String, bytes: Vec<u8> },
}

impl ResolvedInput {
    pub fn bytes(&self) -> &[u8] {
        match self {
            ResolvedInput::Local { bytes, .. } | ResolvedInput::Downloaded { bytes, .. } => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResolvedInput::Local { bytes, .. } | ResolvedInput::Downloaded { bytes, .. } => bytes,
        }
    }

    /// File name of the input, for log lines.
    pub fn file_name(&self) -> String {
        match self {
            ResolvedInput::Local { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document.pdf".to_string()),
            ResolvedInput::Downloaded { filename, .. } => filename.clone(),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Default output name for an input file name: `report.pdf` → `report-unlocked.pdf`.
pub fn unlocked_file_name(input_name: &str) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());
    format!("{stem}-unlocked.pdf")
}

/// Resolve the input string to PDF bytes.
///
/// If the input is a URL, download it. If the input is a local file,
/// validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, UnlockError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else if input.trim().is_empty() {
        Err(UnlockError::InvalidInput {
            input: input.to_string(),
        })
    } else {
        resolve_local(input).await
    }
}

/// Read a local file, validating existence and PDF magic bytes.
async fn resolve_local(path_str: &str) -> Result<ResolvedInput, UnlockError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(UnlockError::PermissionDenied { path });
        }
        Err(_) => return Err(UnlockError::FileNotFound { path }),
    };

    check_magic(&bytes, &path)?;
    debug!("Resolved local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(ResolvedInput::Local { path, bytes })
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, UnlockError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| UnlockError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            UnlockError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            UnlockError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(UnlockError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = extract_filename(url);
    let bytes = response
        .bytes()
        .await
        .map_err(|e| UnlockError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_vec();

    check_magic(&bytes, Path::new(&filename))?;
    info!("Downloaded {} bytes as {}", bytes.len(), filename);

    Ok(ResolvedInput::Downloaded { filename, bytes })
}

/// Reject buffers that do not start with `%PDF`.
///
/// Buffers shorter than four bytes pass; the parser reports them better.
fn check_magic(bytes: &[u8], path: &Path) -> Result<(), UnlockError> {
    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(UnlockError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

/// Decode a JSON request envelope into PDF bytes and an optional hint.
pub fn decode_envelope(json: &str) -> Result<(Vec<u8>, Option<String>), UnlockError> {
    let request: UnlockRequest =
        serde_json::from_str(json).map_err(|e| UnlockError::InvalidEnvelope(e.to_string()))?;
    let bytes = STANDARD
        .decode(request.pdf_data.trim())
        .map_err(|e| UnlockError::InvalidBase64(e.to_string()))?;
    Ok((bytes, request.password.filter(|p| !p.is_empty())))
}
