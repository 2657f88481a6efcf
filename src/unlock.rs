//! Unlock entry points and the strategy orchestrator.
//!
//! [`unlock`] is the in-memory core: bytes in, [`UnlockOutcome`] out, never an
//! error and never a panic. The other entry points wrap it with input
//! resolution ([`unlock_file`]), output writing ([`unlock_to_file`]) or the
//! JSON envelope ([`unlock_envelope`]).

use crate::config::UnlockConfig;
use crate::error::UnlockError;
use crate::output::{DocumentInfo, Method, UnlockOutcome, UnlockReport, UnlockResponse};
use crate::pipeline::{self, input, metadata, AttemptContext, Strategy};
use crate::progress::ProgressCallback;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Message of the outcome when every strategy failed.
pub const ALL_FAILED_MESSAGE: &str = "Unable to process PDF with any available method. \
The encryption may be too strong or the file may be corrupted.";

/// An ordered chain of strategies plus the candidates they share.
///
/// [`unlock`] builds the default A → B → C chain from a config. Build one
/// directly with [`Pipeline::with_strategies`] to plug in a different chain.
pub struct Pipeline {
    strategies: Vec<Box<dyn Strategy>>,
    candidates: Vec<String>,
    progress: Option<ProgressCallback>,
    deadline: Option<Duration>,
}

impl Pipeline {
    pub fn from_config(config: &UnlockConfig) -> Self {
        Self::with_strategies(pipeline::default_strategies(config), config)
    }

    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>, config: &UnlockConfig) -> Self {
        Self {
            strategies,
            candidates: config.candidates(),
            progress: config.progress_callback.clone(),
            deadline: config.pipeline_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Strategies in the order they will run.
    pub fn methods(&self) -> Vec<Method> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    /// Run the chain over `pdf`.
    ///
    /// Strategies run strictly in order; the first success ends the run.
    /// A panic anywhere in the chain becomes a failed outcome, and so does
    /// running past the configured deadline.
    pub async fn run(&self, pdf: &[u8]) -> UnlockOutcome {
        let chain = AssertUnwindSafe(self.run_chain(pdf)).catch_unwind();
        let guarded = match self.deadline {
            Some(limit) => match tokio::time::timeout(limit, chain).await {
                Ok(guarded) => guarded,
                Err(_) => {
                    warn!("unlock pipeline exceeded {}s, giving up", limit.as_secs());
                    Ok(UnlockOutcome::failed(format!(
                        "Processing timed out after {}s",
                        limit.as_secs()
                    )))
                }
            },
            None => chain.await,
        };
        let outcome = match guarded {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                warn!("unlock pipeline panicked: {detail}");
                UnlockOutcome::failed(format!("Processing error: {detail}"))
            }
        };
        if let Some(ref cb) = self.progress {
            cb.on_unlock_complete(outcome.method());
        }
        outcome
    }

    async fn run_chain(&self, pdf: &[u8]) -> UnlockOutcome {
        let shared: Arc<[u8]> = Arc::from(pdf);
        let ctx = AttemptContext::new(self.candidates.clone(), self.progress.clone());
        if let Some(ref cb) = self.progress {
            cb.on_unlock_start(pdf.len(), self.candidates.len());
        }
        debug!(
            "unlock chain {:?} with {} candidate(s)",
            self.methods(),
            self.candidates.len()
        );

        for strategy in &self.strategies {
            let method = strategy.method();
            info!("Attempting {} ({}) decryption…", method, method.label());
            if let Some(ref cb) = self.progress {
                cb.on_strategy_start(method);
            }

            match strategy.attempt(Arc::clone(&shared), ctx.clone()).await {
                Ok(done) => {
                    info!("{} succeeded: {}", method, done.message);
                    return UnlockOutcome::Unlocked {
                        pdf: done.pdf,
                        method,
                        message: done.message,
                        password: done.password,
                        attempts: done.attempts,
                    };
                }
                Err(e) => {
                    debug!("{} failed: {}", method, e);
                    if let Some(ref cb) = self.progress {
                        cb.on_strategy_failed(method, &e.to_string());
                    }
                }
            }
        }

        UnlockOutcome::failed(ALL_FAILED_MESSAGE)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Remove password protection from PDF bytes.
///
/// This is the primary entry point for the library. Runs strategy A (qpdf),
/// then B (lopdf with candidate passwords), then C (page reconstruction),
/// stopping at the first success.
///
/// # Example
/// ```rust,no_run
/// use pdf_unlock::{unlock, UnlockConfig, UnlockOutcome};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("locked.pdf")?;
/// match unlock(&bytes, &UnlockConfig::default()).await {
///     UnlockOutcome::Unlocked { pdf, method, message, .. } => {
///         eprintln!("{method}: {message}");
///         std::fs::write("unlocked.pdf", pdf)?;
///     }
///     UnlockOutcome::Failed { message } => eprintln!("{message}"),
/// }
/// # Ok(())
/// # }
/// ```
pub async fn unlock(pdf: &[u8], config: &UnlockConfig) -> UnlockOutcome {
    Pipeline::from_config(config).run(pdf).await
}

/// Synchronous wrapper around [`unlock`].
///
/// Creates a temporary tokio runtime internally. Runtime creation failure is
/// reported as a failed outcome.
pub fn unlock_sync(pdf: &[u8], config: &UnlockConfig) -> UnlockOutcome {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(unlock(pdf, config)),
        Err(e) => UnlockOutcome::failed(format!("Failed to create tokio runtime: {e}")),
    }
}

/// Resolve a local path or URL, then [`unlock`] its bytes.
pub async fn unlock_file(
    input_str: impl AsRef<str>,
    config: &UnlockConfig,
) -> Result<UnlockOutcome, UnlockError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    Ok(unlock(resolved.bytes(), config).await)
}

/// Unlock a path or URL and write the decrypted PDF to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files. A failed
/// outcome is returned as [`UnlockError::Unrecoverable`].
pub async fn unlock_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &UnlockConfig,
) -> Result<UnlockReport, UnlockError> {
    let start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting unlock: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let input_bytes = resolved.bytes().len();
    debug!("Resolved {} ({} bytes)", resolved.file_name(), input_bytes);
    let outcome = unlock(resolved.bytes(), config).await;

    let (pdf, method, message, password, attempts) = match outcome {
        UnlockOutcome::Unlocked {
            pdf,
            method,
            message,
            password,
            attempts,
        } => (pdf, method, message, password, attempts),
        UnlockOutcome::Failed { message } => {
            return Err(UnlockError::Unrecoverable { message });
        }
    };

    let path = output_path.as_ref();
    write_atomic(path, &pdf).await?;

    let report = UnlockReport {
        method,
        message,
        password,
        attempts,
        input_bytes,
        output_bytes: pdf.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Unlock complete: {} via {} in {}ms",
        path.display(),
        report.method,
        report.duration_ms
    );
    Ok(report)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), UnlockError> {
    let write_err = |e| UnlockError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

/// Process a JSON request envelope and produce the JSON response.
///
/// Never fails: malformed JSON or base64 becomes a failure response. A
/// `password` field in the envelope is tried before `config.password`.
pub async fn unlock_envelope(json: &str, config: &UnlockConfig) -> UnlockResponse {
    let (bytes, hint) = match input::decode_envelope(json) {
        Ok(decoded) => decoded,
        Err(e) => return UnlockResponse::failure(e.to_string()),
    };

    let outcome = match hint {
        Some(password) => {
            let mut config = config.clone();
            if let Some(previous) = config.password.replace(password) {
                config.extra_passwords.insert(0, previous);
            }
            unlock(&bytes, &config).await
        }
        None => unlock(&bytes, config).await,
    };
    UnlockResponse::from(&outcome)
}

/// Extract document facts from a path or URL without unlocking it.
///
/// Only `config.download_timeout_secs` is consulted.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &UnlockConfig,
) -> Result<DocumentInfo, UnlockError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    metadata::extract_metadata(resolved.into_bytes()).await
}

/// Extract document facts from bytes.
pub async fn inspect_bytes(pdf: &[u8]) -> Result<DocumentInfo, UnlockError> {
    metadata::extract_metadata(pdf.to_vec()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Decrypted;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    /// Strategy stub that records calls and returns a canned result.
    struct Scripted {
        method: Method,
        succeed: bool,
        panic: bool,
        calls: Arc<Mutex<Vec<Method>>>,
    }

    impl Scripted {
        fn boxed(
            method: Method,
            succeed: bool,
            calls: &Arc<Mutex<Vec<Method>>>,
        ) -> Box<dyn Strategy> {
            Box::new(Self {
                method,
                succeed,
                panic: false,
                calls: Arc::clone(calls),
            })
        }
    }

    impl Strategy for Scripted {
        fn method(&self) -> Method {
            self.method
        }

        fn attempt(
            &self,
            _pdf: Arc<[u8]>,
            ctx: AttemptContext,
        ) -> BoxFuture<'_, Result<Decrypted, UnlockError>> {
            async move {
                self.calls.lock().unwrap().push(self.method);
                if self.panic {
                    panic!("scripted failure in {}", self.method);
                }
                if self.succeed {
                    Ok(Decrypted {
                        pdf: b"%PDF-unlocked".to_vec(),
                        message: format!("{} ok", self.method),
                        password: ctx.candidates.first().cloned(),
                        attempts: 1,
                    })
                } else {
                    Err(UnlockError::PasswordsExhausted {
                        method: self.method,
                        tried: ctx.candidates.len(),
                    })
                }
            }
            .boxed()
        }
    }

    fn calls() -> Arc<Mutex<Vec<Method>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Strategy that never finishes within a test's lifetime.
    struct Stalled;

    impl Strategy for Stalled {
        fn method(&self) -> Method {
            Method::Qpdf
        }

        fn attempt(
            &self,
            _pdf: Arc<[u8]>,
            _ctx: AttemptContext,
        ) -> BoxFuture<'_, Result<Decrypted, UnlockError>> {
            async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(UnlockError::Internal("woke up".to_string()))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let log = calls();
        let pipeline = Pipeline::with_strategies(
            vec![
                Scripted::boxed(Method::Qpdf, false, &log),
                Scripted::boxed(Method::Password, true, &log),
                Scripted::boxed(Method::Reconstruct, true, &log),
            ],
            &UnlockConfig::default(),
        );
        let outcome = pipeline.run(b"%PDF").await;
        assert_eq!(outcome.method(), Some(Method::Password));
        assert_eq!(*log.lock().unwrap(), vec![Method::Qpdf, Method::Password]);
    }

    #[tokio::test]
    async fn all_failures_give_uniform_message() {
        let log = calls();
        let pipeline = Pipeline::with_strategies(
            vec![
                Scripted::boxed(Method::Qpdf, false, &log),
                Scripted::boxed(Method::Password, false, &log),
                Scripted::boxed(Method::Reconstruct, false, &log),
            ],
            &UnlockConfig::default(),
        );
        let outcome = pipeline.run(b"").await;
        assert_eq!(outcome, UnlockOutcome::failed(ALL_FAILED_MESSAGE));
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let log = calls();
        let panicking: Box<dyn Strategy> = Box::new(Scripted {
            method: Method::Qpdf,
            succeed: false,
            panic: true,
            calls: Arc::clone(&log),
        });
        let pipeline = Pipeline::with_strategies(
            vec![panicking, Scripted::boxed(Method::Password, true, &log)],
            &UnlockConfig::default(),
        );
        let outcome = pipeline.run(b"%PDF").await;
        match outcome {
            UnlockOutcome::Failed { message } => {
                assert!(message.starts_with("Processing error"), "got: {message}");
                assert!(message.contains("scripted failure"), "got: {message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(*log.lock().unwrap(), vec![Method::Qpdf]);
    }

    #[tokio::test]
    async fn candidates_follow_config() {
        let log = calls();
        let config = UnlockConfig::builder().password("hint").build().unwrap();
        let pipeline =
            Pipeline::with_strategies(vec![Scripted::boxed(Method::Password, true, &log)], &config);
        match pipeline.run(b"%PDF").await {
            UnlockOutcome::Unlocked { password, .. } => {
                assert_eq!(password.as_deref(), Some("hint"))
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_turns_a_stalled_chain_into_a_failure() {
        let log = calls();
        let config = UnlockConfig::builder()
            .pipeline_timeout_secs(1)
            .build()
            .unwrap();
        let pipeline = Pipeline::with_strategies(
            vec![Box::new(Stalled), Scripted::boxed(Method::Password, true, &log)],
            &config,
        );

        let started = Instant::now();
        let outcome = pipeline.run(b"%PDF").await;
        assert_eq!(
            outcome,
            UnlockOutcome::failed("Processing timed out after 1s")
        );
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn deadline_does_not_affect_a_quick_chain() {
        let log = calls();
        let config = UnlockConfig::builder()
            .pipeline_timeout_secs(30)
            .build()
            .unwrap();
        let pipeline =
            Pipeline::with_strategies(vec![Scripted::boxed(Method::Password, true, &log)], &config);
        assert_eq!(pipeline.run(b"%PDF").await.method(), Some(Method::Password));
    }

    #[test]
    fn methods_follow_the_configured_chain() {
        let with_tool = Pipeline::from_config(&UnlockConfig::default());
        assert_eq!(
            with_tool.methods(),
            vec![Method::Qpdf, Method::Password, Method::Reconstruct]
        );

        let config = UnlockConfig::builder().external_tool(false).build().unwrap();
        assert_eq!(
            Pipeline::from_config(&config).methods(),
            vec![Method::Password, Method::Reconstruct]
        );
    }

    #[test]
    fn panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }

    #[tokio::test]
    async fn envelope_with_bad_json_is_a_failure_response() {
        let resp = unlock_envelope("not json", &UnlockConfig::default()).await;
        assert!(!resp.success);
        assert!(resp.message.starts_with("JSON parsing error"));
        assert!(resp.output_data.is_none());
    }
}
