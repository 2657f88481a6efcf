//! Strategy B: decrypt in-process with lopdf, once per candidate.
//!
//! Every candidate gets a fresh parse: a failed decrypt may leave the
//! document half-processed, and re-parsing is cheap next to the cost of a
//! wrong guess. The loop runs on tokio's blocking pool because parsing is
//! CPU-bound.

use super::{document, run_blocking, AttemptContext, Decrypted, Strategy};
use crate::error::UnlockError;
use crate::output::{password_message, Method};
use futures::future::BoxFuture;
use futures::FutureExt;
use lopdf::Document;
use std::sync::Arc;
use tracing::{info, trace};

/// Strategy B.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordStrategy;

impl Strategy for PasswordStrategy {
    fn method(&self) -> Method {
        Method::Password
    }

    fn attempt(
        &self,
        pdf: Arc<[u8]>,
        ctx: AttemptContext,
    ) -> BoxFuture<'_, Result<Decrypted, UnlockError>> {
        run_blocking("password", move || try_candidates(&pdf, &ctx)).boxed()
    }
}

/// Try each candidate in order; first one that decrypts wins.
pub fn try_candidates(pdf: &[u8], ctx: &AttemptContext) -> Result<Decrypted, UnlockError> {
    for (index, password) in ctx.candidates.iter().enumerate() {
        ctx.report_attempt(Method::Password, index);
        let mut doc = match open_with_password(pdf, password) {
            Ok(doc) => doc,
            Err(e) => {
                trace!("lopdf attempt {}: {e}", index + 1);
                continue;
            }
        };

        let bytes = document::serialise(&mut doc)?;
        info!(
            "lopdf decrypted the document on attempt {}/{}",
            index + 1,
            ctx.candidates.len()
        );
        return Ok(Decrypted {
            pdf: bytes,
            message: password_message(password),
            password: Some(password.clone()),
            attempts: index + 1,
        });
    }

    Err(UnlockError::PasswordsExhausted {
        method: Method::Password,
        tried: ctx.candidates.len(),
    })
}

/// Parse `pdf` and decrypt it with `password`, returning a document with no
/// encryption left on it.
///
/// Decryption must actually succeed; an encrypted document is never returned
/// as-is. The empty candidate only opens documents that carry no encryption
/// at all: an encrypted file the empty user password opens (owner-only
/// protection) is left to reconstruction.
pub fn open_with_password(pdf: &[u8], password: &str) -> Result<Document, UnlockError> {
    let mut doc = document::load(pdf)?;
    if password.is_empty() && document::is_encrypted(&doc) {
        return Err(UnlockError::WrongPassword);
    }
    document::authenticate(&mut doc, password)?;
    document::strip_encryption(&mut doc);
    Ok(doc)
}
