//! Configuration types for PDF unlocking.
//!
//! All pipeline behaviour is controlled through [`UnlockConfig`], built via
//! its [`UnlockConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks and to log exactly what a run used.

use crate::error::UnlockError;
use crate::passwords::DictionaryTier;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default program name for strategy A, resolved through `PATH`.
pub const DEFAULT_QPDF_PROGRAM: &str = "qpdf";

/// Default download timeout for URL inputs, in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Configuration for an unlock run.
///
/// Built via [`UnlockConfig::builder()`] or using [`UnlockConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_unlock::{DictionaryTier, UnlockConfig};
///
/// let config = UnlockConfig::builder()
///     .password("quarterly-2024")
///     .dictionary(DictionaryTier::Extended)
///     .tool_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert!(config.external_tool);
/// ```
#[derive(Clone)]
pub struct UnlockConfig {
    /// Password hint, tried before anything else.
    pub password: Option<String>,

    /// Additional candidates, tried after the hint and before the dictionary.
    pub extra_passwords: Vec<String>,

    /// Dictionary tier. Default: [`DictionaryTier::Common`].
    pub dictionary: DictionaryTier,

    /// Run strategy A (external qpdf). Default: true.
    ///
    /// Hosts without qpdf installed lose nothing by leaving this on: a missing
    /// binary is detected on the first spawn and the strategy is abandoned.
    pub external_tool: bool,

    /// Program invoked by strategy A. Default: `qpdf` from `PATH`.
    pub qpdf_program: PathBuf,

    /// Root directory for strategy A temporaries. Default: the OS temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Per-invocation timeout for the external tool. Default: none.
    ///
    /// Without a timeout a hung qpdf hangs the call. When set, the child is
    /// killed and strategy A gives up.
    pub tool_timeout_secs: Option<u64>,

    /// Deadline for the whole strategy chain. Default: none.
    ///
    /// When it expires the run ends with a failed outcome. Blocking lopdf
    /// work already in flight finishes in the background and is discarded.
    pub pipeline_timeout_secs: Option<u64>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback for strategy and attempt events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            password: None,
            extra_passwords: Vec::new(),
            dictionary: DictionaryTier::default(),
            external_tool: true,
            qpdf_program: PathBuf::from(DEFAULT_QPDF_PROGRAM),
            temp_dir: None,
            tool_timeout_secs: None,
            pipeline_timeout_secs: None,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for UnlockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("extra_passwords", &self.extra_passwords.len())
            .field("dictionary", &self.dictionary)
            .field("external_tool", &self.external_tool)
            .field("qpdf_program", &self.qpdf_program)
            .field("temp_dir", &self.temp_dir)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field("pipeline_timeout_secs", &self.pipeline_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn UnlockProgressCallback>"),
            )
            .finish()
    }
}

impl UnlockConfig {
    /// Create a new builder for `UnlockConfig`.
    pub fn builder() -> UnlockConfigBuilder {
        UnlockConfigBuilder {
            config: Self::default(),
        }
    }

    /// The ordered candidate list this config produces.
    pub fn candidates(&self) -> Vec<String> {
        crate::passwords::candidates(
            self.password.as_deref(),
            &self.extra_passwords,
            self.dictionary,
        )
    }
}

/// Builder for [`UnlockConfig`].
pub struct UnlockConfigBuilder {
    config: UnlockConfig,
}

impl fmt::Debug for UnlockConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl UnlockConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn extra_passwords<I, S>(mut self, passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .extra_passwords
            .extend(passwords.into_iter().map(Into::into));
        self
    }

    pub fn dictionary(mut self, tier: DictionaryTier) -> Self {
        self.config.dictionary = tier;
        self
    }

    pub fn external_tool(mut self, enabled: bool) -> Self {
        self.config.external_tool = enabled;
        self
    }

    pub fn qpdf_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.qpdf_program = program.into();
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = Some(secs);
        self
    }

    pub fn pipeline_timeout_secs(mut self, secs: u64) -> Self {
        self.config.pipeline_timeout_secs = Some(secs);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<UnlockConfig, UnlockError> {
        let c = &self.config;
        if c.external_tool && c.qpdf_program.as_os_str().is_empty() {
            return Err(UnlockError::InvalidConfig(
                "qpdf program path must not be empty".into(),
            ));
        }
        if c.tool_timeout_secs == Some(0) {
            return Err(UnlockError::InvalidConfig(
                "Tool timeout must be ≥ 1 second".into(),
            ));
        }
        if c.pipeline_timeout_secs == Some(0) {
            return Err(UnlockError::InvalidConfig(
                "Pipeline timeout must be ≥ 1 second".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(UnlockError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = UnlockConfig::default();
        assert!(c.external_tool);
        assert_eq!(c.qpdf_program, PathBuf::from("qpdf"));
        assert_eq!(c.tool_timeout_secs, None);
        assert_eq!(c.pipeline_timeout_secs, None);
        assert_eq!(c.download_timeout_secs, DEFAULT_DOWNLOAD_TIMEOUT_SECS);
        assert_eq!(c.dictionary, DictionaryTier::Common);
        assert_eq!(c.candidates()[0], "");
    }

    #[test]
    fn hint_leads_candidates() {
        let c = UnlockConfig::builder()
            .password("letmein")
            .extra_passwords(["alpha", "beta"])
            .build()
            .unwrap();
        assert_eq!(&c.candidates()[..4], &["letmein", "alpha", "beta", ""]);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = UnlockConfig::builder().tool_timeout_secs(0).build().unwrap_err();
        assert!(matches!(err, UnlockError::InvalidConfig(_)));
        let err = UnlockConfig::builder()
            .pipeline_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Pipeline timeout"));
        assert!(UnlockConfig::builder().download_timeout_secs(0).build().is_err());
    }

    #[test]
    fn empty_program_rejected_only_when_tool_enabled() {
        assert!(UnlockConfig::builder().qpdf_program("").build().is_err());
        assert!(UnlockConfig::builder()
            .qpdf_program("")
            .external_tool(false)
            .build()
            .is_ok());
    }

    #[test]
    fn debug_redacts_password() {
        let c = UnlockConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
