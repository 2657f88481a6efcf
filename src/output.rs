//! Result types crossing the pipeline boundary.
//!
//! [`UnlockOutcome`] is the in-process result: a tagged union, so a success
//! always carries both the decrypted bytes and the method that produced them.
//! [`UnlockResponse`] is its JSON shape for the stdin/stdout envelope, with
//! the PDF base64-encoded.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which strategy produced a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Strategy A: the external `qpdf` tool, once per candidate password.
    #[serde(rename = "strategy-A")]
    Qpdf,
    /// Strategy B: in-process lopdf decryption, once per candidate password.
    #[serde(rename = "strategy-B")]
    Password,
    /// Strategy C: pages copied into a fresh, unencrypted document.
    #[serde(rename = "strategy-C")]
    Reconstruct,
}

impl Method {
    /// Wire name used in JSON responses and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Qpdf => "strategy-A",
            Method::Password => "strategy-B",
            Method::Reconstruct => "strategy-C",
        }
    }

    /// Short human label for progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Method::Qpdf => "qpdf",
            Method::Password => "lopdf",
            Method::Reconstruct => "reconstruct",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one [`crate::unlock`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// A strategy produced an unencrypted document.
    Unlocked {
        /// Decrypted (or reconstructed) PDF bytes.
        pdf: Vec<u8>,
        /// Strategy that succeeded.
        method: Method,
        /// Human-readable description, naming the password when one was used.
        message: String,
        /// Password that opened the document. `None` for strategy C.
        password: Option<String>,
        /// Candidate passwords tried by the winning strategy, including the winner.
        attempts: usize,
    },
    /// Every strategy failed, or the pipeline hit an unexpected error.
    Failed {
        /// Human-readable explanation; never empty.
        message: String,
    },
}

impl UnlockOutcome {
    pub(crate) fn failed(message: impl Into<String>) -> Self {
        UnlockOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UnlockOutcome::Unlocked { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            UnlockOutcome::Unlocked { message, .. } | UnlockOutcome::Failed { message } => message,
        }
    }

    pub fn method(&self) -> Option<Method> {
        match self {
            UnlockOutcome::Unlocked { method, .. } => Some(*method),
            UnlockOutcome::Failed { .. } => None,
        }
    }

    /// Decrypted bytes, if any.
    pub fn pdf(&self) -> Option<&[u8]> {
        match self {
            UnlockOutcome::Unlocked { pdf, .. } => Some(pdf),
            UnlockOutcome::Failed { .. } => None,
        }
    }
}

/// Message reported when a candidate password opened the document.
///
/// The empty password is rendered as `(empty)`.
pub fn password_message(password: &str) -> String {
    let shown = if password.is_empty() {
        "(empty)"
    } else {
        password
    };
    format!("PDF successfully decrypted using password: \"{shown}\"")
}

/// JSON request envelope read by [`crate::unlock_envelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockRequest {
    /// Base64-encoded PDF.
    pub pdf_data: String,
    /// Optional password hint, tried before the dictionary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// JSON response envelope.
///
/// `output_data` and `method` are present exactly when `success` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
}

impl UnlockResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output_data: None,
            method: None,
        }
    }

    /// Decode `output_data` back into PDF bytes.
    pub fn decode_output(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.output_data.as_ref().map(|data| STANDARD.decode(data))
    }
}

impl From<&UnlockOutcome> for UnlockResponse {
    fn from(outcome: &UnlockOutcome) -> Self {
        match outcome {
            UnlockOutcome::Unlocked {
                pdf,
                method,
                message,
                ..
            } => Self {
                success: true,
                message: message.clone(),
                output_data: Some(STANDARD.encode(pdf)),
                method: Some(*method),
            },
            UnlockOutcome::Failed { message } => Self::failure(message.clone()),
        }
    }
}

/// Summary returned by [`crate::unlock_to_file`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockReport {
    pub method: Method,
    pub message: String,
    pub password: Option<String>,
    pub attempts: usize,
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub duration_ms: u64,
}

/// Document facts gathered without unlocking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pdf_version: String,
    pub is_encrypted: bool,
    /// Encrypted and the empty user password does not open it, so the
    /// content cannot be read without guessing.
    pub requires_user_password: bool,
    pub file_size: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_is_rendered_as_placeholder() {
        assert_eq!(
            password_message(""),
            "PDF successfully decrypted using password: \"(empty)\""
        );
        assert!(password_message("admin").contains("\"admin\""));
    }

    #[test]
    fn success_response_shape() {
        let outcome = UnlockOutcome::Unlocked {
            pdf: b"%PDF-1.5 test".to_vec(),
            method: Method::Password,
            message: password_message("admin"),
            password: Some("admin".into()),
            attempts: 4,
        };
        let resp = UnlockResponse::from(&outcome);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["method"], "strategy-B");
        assert_eq!(
            resp.decode_output().unwrap().unwrap(),
            b"%PDF-1.5 test".to_vec()
        );
    }

    #[test]
    fn failure_response_omits_output_and_method() {
        let resp = UnlockResponse::from(&UnlockOutcome::failed("nope"));
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"nope"}"#);
    }

    #[test]
    fn method_wire_names() {
        for (m, name) in [
            (Method::Qpdf, "\"strategy-A\""),
            (Method::Password, "\"strategy-B\""),
            (Method::Reconstruct, "\"strategy-C\""),
        ] {
            assert_eq!(serde_json::to_string(&m).unwrap(), name);
            assert_eq!(format!("\"{m}\""), name);
        }
    }

    #[test]
    fn request_password_is_optional() {
        let req: UnlockRequest = serde_json::from_str(r#"{"pdf_data":"JVBERg=="}"#).unwrap();
        assert!(req.password.is_none());
        let req: UnlockRequest =
            serde_json::from_str(r#"{"pdf_data":"JVBERg==","password":"hunter2"}"#).unwrap();
        assert_eq!(req.password.as_deref(), Some("hunter2"));
    }
}
