//! Thin helpers over `lopdf::Document` shared by strategies B and C and by
//! inspection.

use crate::error::UnlockError;
use lopdf::Document;

/// Parse a PDF buffer without applying any password.
pub fn load(pdf: &[u8]) -> Result<Document, UnlockError> {
    Document::load_mem(pdf).map_err(|e| UnlockError::Parse {
        detail: e.to_string(),
    })
}

/// True when the document still carries an encryption dictionary or the
/// parser recorded an encryption state for it.
pub fn is_encrypted(doc: &Document) -> bool {
    doc.is_encrypted() || doc.encryption_state.is_some()
}

/// Apply `password` to a freshly loaded document.
///
/// The parser applies the empty user password on its own when that is
/// enough, recording an encryption state; such a document then only accepts
/// the empty password here, so a success always names the password that
/// actually opened it.
pub fn authenticate(doc: &mut Document, password: &str) -> Result<(), UnlockError> {
    if doc.encryption_state.is_some() {
        return if password.is_empty() {
            Ok(())
        } else {
            Err(UnlockError::WrongPassword)
        };
    }
    if doc.is_encrypted() {
        doc.decrypt(password)
            .map_err(|_| UnlockError::WrongPassword)?;
    }
    Ok(())
}

/// Drop every trace of encryption so the document serialises in the clear.
pub fn strip_encryption(doc: &mut Document) {
    doc.trailer.remove(b"Encrypt");
    doc.encryption_state = None;
}

/// Serialise a document to bytes.
pub fn serialise(doc: &mut Document) -> Result<Vec<u8>, UnlockError> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).map_err(|e| UnlockError::Serialise {
        detail: e.to_string(),
    })?;
    Ok(buf)
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8, or Latin-1).
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
