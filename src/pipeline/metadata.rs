//! Document inspection: page count, version, encryption flag and the Info
//! dictionary, without unlocking anything.

use super::{document, run_blocking};
use crate::error::UnlockError;
use crate::output::DocumentInfo;
use lopdf::{Document, Object};

/// Inspect PDF bytes on the blocking pool.
pub async fn extract_metadata(pdf: Vec<u8>) -> Result<DocumentInfo, UnlockError> {
    run_blocking("metadata", move || extract_metadata_blocking(&pdf)).await
}

/// Blocking implementation of metadata extraction.
///
/// An encrypted document reports `is_encrypted: true`. Its Info strings are
/// read only if the empty user password opens it; otherwise they are
/// ciphertext, are left out, and `requires_user_password` is set.
pub fn extract_metadata_blocking(pdf: &[u8]) -> Result<DocumentInfo, UnlockError> {
    let mut doc = document::load(pdf)?;
    let is_encrypted = document::is_encrypted(&doc);
    let readable = document::authenticate(&mut doc, "").is_ok();

    let info = if readable { info_dictionary(&doc) } else { None };
    let get = |key: &[u8]| -> Option<String> {
        let value = info.as_ref()?.get(key).ok()?;
        let text = match value {
            Object::String(bytes, _) => document::decode_text(bytes),
            _ => return None,
        };
        let text = text.trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    };

    Ok(DocumentInfo {
        page_count: doc.get_pages().len(),
        pdf_version: doc.version.clone(),
        is_encrypted,
        requires_user_password: is_encrypted && !readable,
        file_size: pdf.len(),
        title: get(b"Title"),
        author: get(b"Author"),
        subject: get(b"Subject"),
        creator: get(b"Creator"),
        producer: get(b"Producer"),
    })
}

fn info_dictionary(doc: &Document) -> Option<lopdf::Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    let dict = match info {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    Some(dict.clone())
}
