//! Strategy C: copy every page into a brand-new, unencrypted document.
//!
//! No candidate password is involved. The source is parsed without
//! authentication and only the empty user password is applied, which is all
//! an owner-restricted document needs for its streams to come out readable.
//! A document whose content needs a real user password is rejected rather
//! than copied as ciphertext. Each page is then deep-copied, with its
//! resources, into a fresh page tree.
//!
//! Attributes a page inherits from its ancestors in the page tree
//! (`Resources`, `MediaBox`, `CropBox`, `Rotate`) are materialised on the
//! copied page, since the new tree has a single flat parent.

use super::{document, run_blocking, AttemptContext, Decrypted, Strategy};
use crate::error::UnlockError;
use crate::output::Method;
use futures::future::BoxFuture;
use futures::FutureExt;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Message reported on success.
pub const RECONSTRUCTED_MESSAGE: &str =
    "PDF content extracted and reconstructed without password protection";

const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Strategy C.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconstructStrategy;

impl Strategy for ReconstructStrategy {
    fn method(&self) -> Method {
        Method::Reconstruct
    }

    fn attempt(
        &self,
        pdf: Arc<[u8]>,
        _ctx: AttemptContext,
    ) -> BoxFuture<'_, Result<Decrypted, UnlockError>> {
        run_blocking("reconstruct", move || {
            let bytes = reconstruct(&pdf)?;
            Ok(Decrypted {
                pdf: bytes,
                message: RECONSTRUCTED_MESSAGE.to_string(),
                password: None,
                attempts: 0,
            })
        })
        .boxed()
    }
}

/// Parse `pdf` ignoring encryption and rebuild it page by page.
pub fn reconstruct(pdf: &[u8]) -> Result<Vec<u8>, UnlockError> {
    let mut source = document::load(pdf)?;
    if document::is_encrypted(&source) {
        if document::authenticate(&mut source, "").is_err() {
            debug!("reconstruct: empty user password rejected");
            return Err(UnlockError::ContentEncrypted);
        }
        debug!("reconstruct: empty user password accepted");
    }
    document::strip_encryption(&mut source);

    let pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    if pages.is_empty() {
        return Err(UnlockError::NoPages);
    }

    let mut target = rebuild(&source, &pages)?;
    let bytes = document::serialise(&mut target)?;
    info!("reconstructed {} pages into a fresh document", pages.len());
    Ok(bytes)
}

/// Build the fresh document from `pages` (in order).
fn rebuild(source: &Document, pages: &[ObjectId]) -> Result<Document, UnlockError> {
    let mut target = Document::with_version(source.version.clone());
    let pages_id = target.new_object_id();

    let mut copier = Copier::new(source);
    // Reserve page ids first so links between pages (annotations, outlines in
    // page resources) resolve to the copies instead of duplicating pages.
    let new_ids: Vec<ObjectId> = pages
        .iter()
        .map(|&old| {
            let new = target.new_object_id();
            copier.mapped.insert(old, new);
            new
        })
        .collect();

    for (&old, &new) in pages.iter().zip(&new_ids) {
        let mut page = source
            .get_dictionary(old)
            .map_err(|e| UnlockError::Parse {
                detail: format!("page object {old:?}: {e}"),
            })?
            .clone();
        for (key, value) in inherited_attributes(source, &page) {
            page.set(key, value);
        }
        let mut copied = copier.copy_dict(&page, &mut target);
        copied.set("Parent", pages_id);
        target.objects.insert(new, Object::Dictionary(copied));
    }

    let kids: Vec<Object> = new_ids.iter().map(|&id| id.into()).collect();
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => new_ids.len() as i64,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);
    Ok(target)
}

/// Inheritable attributes missing from `page` but set on an ancestor.
fn inherited_attributes(source: &Document, page: &Dictionary) -> Vec<(Vec<u8>, Object)> {
    let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
    let mut missing: Vec<&[u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut visited: HashSet<ObjectId> = HashSet::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(id) = parent {
        if missing.is_empty() || !visited.insert(id) {
            break;
        }
        let Ok(node) = source.get_dictionary(id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    found
}

/// Deep copy of objects from one document into another, remapping ids.
///
/// `Parent` links are dropped: they point back into the source page tree,
/// which is exactly what we are leaving behind.
struct Copier<'a> {
    source: &'a Document,
    mapped: HashMap<ObjectId, ObjectId>,
}

impl<'a> Copier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            mapped: HashMap::new(),
        }
    }

    fn copy_ref(&mut self, id: ObjectId, target: &mut Document) -> ObjectId {
        if let Some(&new) = self.mapped.get(&id) {
            return new;
        }
        let new = target.new_object_id();
        self.mapped.insert(id, new);
        let copied = match self.source.get_object(id) {
            Ok(obj) => self.copy_object(obj, target),
            Err(_) => Object::Null,
        };
        target.objects.insert(new, copied);
        new
    }

    fn copy_object(&mut self, obj: &Object, target: &mut Document) -> Object {
        match obj {
            Object::Reference(id) => Object::Reference(self.copy_ref(*id, target)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy_object(item, target))
                    .collect(),
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dict(dict, target)),
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.copy_dict(&stream.dict, target);
                Object::Stream(copied)
            }
            other => other.clone(),
        }
    }

    fn copy_dict(&mut self, dict: &Dictionary, target: &mut Document) -> Dictionary {
        let mut out = Dictionary::new();
        for (key, value) in dict.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            out.set(key.clone(), self.copy_object(value, target));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn keeps_page_count_and_order() {
        let pdf = fixtures::plain_pdf(3);
        let out = reconstruct(&pdf).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        assert_eq!(fixtures::page_labels(&doc), vec!["Page 1", "Page 2", "Page 3"]);
        assert!(!doc.is_encrypted());
    }

    #[test]
    fn inherited_resources_land_on_pages() {
        let pdf = fixtures::plain_pdf(2);
        let out = reconstruct(&pdf).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        for (_, id) in doc.get_pages() {
            let page = doc.get_dictionary(id).unwrap();
            assert!(page.has(b"Resources"));
            assert!(page.has(b"MediaBox"));
        }
    }

    #[test]
    fn empty_page_tree_is_no_pages() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let pdf = fixtures::to_bytes(doc);
        assert!(matches!(reconstruct(&pdf), Err(UnlockError::NoPages)));
    }

    #[test]
    fn owner_only_document_is_rebuilt_readable() {
        let pdf = fixtures::encrypted_pdf(3, "", "owner-secret");
        let out = reconstruct(&pdf).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        assert!(!doc.is_encrypted());
        assert_eq!(fixtures::page_labels(&doc), vec!["Page 1", "Page 2", "Page 3"]);
    }

    #[test]
    fn user_password_document_is_refused() {
        let pdf = fixtures::encrypted_pdf(1, "x9!Qz#long-and-unusual", "owner");
        assert!(matches!(reconstruct(&pdf), Err(UnlockError::ContentEncrypted)));
    }

    #[test]
    fn unparseable_input_reports_parser_error() {
        let err = reconstruct(b"%PDF-1.7\ngarbage").unwrap_err();
        assert!(matches!(err, UnlockError::Parse { .. }));
    }
}
