//! Strategy A: decrypt by shelling out to `qpdf`, once per candidate.
//!
//! qpdf is the most forgiving decryptor around: it copes with damaged xref
//! tables and every standard security handler. It only works on files, so
//! each call gets its own temporary directory holding `input.pdf` and
//! `output.pdf`. The directory is a [`tempfile::TempDir`], removed on every
//! exit path including early returns and panics.
//!
//! Exit codes: 0 is success, 3 is success with warnings, 2 is failure
//! (wrong password among them).

use super::{AttemptContext, Decrypted, Strategy};
use crate::config::UnlockConfig;
use crate::error::UnlockError;
use crate::output::{password_message, Method};
use futures::future::BoxFuture;
use futures::FutureExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, trace};

/// qpdf's wording for a rejected password.
static WRONG_PASSWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)invalid password").expect("static regex"));

/// Strategy A.
#[derive(Debug, Clone)]
pub struct QpdfStrategy {
    program: PathBuf,
    temp_root: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl QpdfStrategy {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            temp_root: None,
            timeout: None,
        }
    }

    pub fn from_config(config: &UnlockConfig) -> Self {
        Self {
            program: config.qpdf_program.clone(),
            temp_root: config.temp_dir.clone(),
            timeout: config.tool_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Per-call scratch directory, named with a millisecond timestamp plus a
    /// random suffix so concurrent calls never collide.
    fn scratch_dir(&self) -> Result<TempDir, UnlockError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let prefix = format!("pdfunlock-{millis}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match self.temp_root {
            Some(ref root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(UnlockError::temp)
    }

    async fn run(&self, pdf: &[u8], ctx: &AttemptContext) -> Result<Decrypted, UnlockError> {
        let scratch = self.scratch_dir()?;
        let input = scratch.path().join("input.pdf");
        let output = scratch.path().join("output.pdf");

        tokio::fs::write(&input, pdf)
            .await
            .map_err(UnlockError::temp)?;
        debug!("qpdf scratch dir: {}", scratch.path().display());

        for (index, password) in ctx.candidates.iter().enumerate() {
            ctx.report_attempt(Method::Qpdf, index);
            remove_stale(&output).await?;

            let result = self.invoke(&input, &output, password).await?;
            let ok = matches!(result.status.code(), Some(0) | Some(3));
            if ok && tokio::fs::try_exists(&output).await.unwrap_or(false) {
                let decrypted = tokio::fs::read(&output)
                    .await
                    .map_err(UnlockError::temp)?;
                info!(
                    "qpdf decrypted the document on attempt {}/{}",
                    index + 1,
                    ctx.candidates.len()
                );
                return Ok(Decrypted {
                    pdf: decrypted,
                    message: password_message(password),
                    password: Some(password.clone()),
                    attempts: index + 1,
                });
            }
            log_rejection(index, &result);
        }

        // `scratch` drops here and takes input/output with it.
        Err(UnlockError::PasswordsExhausted {
            method: Method::Qpdf,
            tried: ctx.candidates.len(),
        })
    }

    async fn invoke(
        &self,
        input: &Path,
        output: &Path,
        password: &str,
    ) -> Result<Output, UnlockError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("--password={password}"))
            .arg("--decrypt")
            .arg(input)
            .arg(output)
            .kill_on_drop(true);

        let running = cmd.output();
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, running).await {
                Ok(r) => r,
                Err(_) => {
                    return Err(UnlockError::ToolTimeout {
                        program: self.program_name(),
                        secs: limit.as_secs(),
                    })
                }
            },
            None => running.await,
        };

        result.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                UnlockError::ToolNotFound {
                    program: self.program_name(),
                }
            }
            _ => UnlockError::Internal(format!("failed to run {}: {e}", self.program_name())),
        })
    }
}

impl Strategy for QpdfStrategy {
    fn method(&self) -> Method {
        Method::Qpdf
    }

    fn attempt(
        &self,
        pdf: Arc<[u8]>,
        ctx: AttemptContext,
    ) -> BoxFuture<'_, Result<Decrypted, UnlockError>> {
        async move { self.run(&pdf, &ctx).await }.boxed()
    }
}

async fn remove_stale(path: &Path) -> Result<(), UnlockError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(UnlockError::temp(e)),
    }
}

fn log_rejection(index: usize, result: &Output) {
    let stderr = String::from_utf8_lossy(&result.stderr);
    if WRONG_PASSWORD.is_match(&stderr) {
        trace!("qpdf attempt {}: wrong password", index + 1);
    } else {
        debug!(
            "qpdf attempt {} exited with {:?}: {}",
            index + 1,
            result.status.code(),
            stderr.trim()
        );
    }
}
