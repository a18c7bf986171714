use duplexer_config::TransformSettings;
use duplexer_pipeline::{DocumentTransform, TransformError, ValidationError};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, info};

use crate::plan::{plan_interleave, InterleaveOptions, PageSlot};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when no MediaBox can be resolved for the blank page.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Page tree depth limit when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Duplex interleave for manually scanned PDFs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDuplexer {
    options: InterleaveOptions,
}

impl PdfDuplexer {
    /// Create a duplexer with explicit options.
    pub fn new(options: InterleaveOptions) -> Self {
        Self { options }
    }

    /// Create a duplexer from transform settings.
    pub fn from_settings(settings: &TransformSettings) -> Self {
        Self::new(InterleaveOptions {
            reverse_backs: settings.reverse_backs,
            insert_blank_lastback: settings.insert_blank_lastback,
        })
    }

    /// Interleave options in use.
    pub fn options(&self) -> InterleaveOptions {
        self.options
    }

    /// Interleave `input` and write the result to `output`.
    ///
    /// Returns the number of pages written.
    pub fn interleave(&self, input: &Path, output: &Path) -> Result<usize, TransformError> {
        info!("Interleaving {} -> {}", input.display(), output.display());
        debug!(
            "Options: reverse_backs={}, insert_blank_lastback={}",
            self.options.reverse_backs, self.options.insert_blank_lastback
        );

        let mut doc = Document::load(input)
            .map_err(|e| TransformError::Read(format!("failed to read PDF: {e}")))?;
        if doc.is_encrypted() {
            return Err(TransformError::Read("PDF is password-protected".to_string()));
        }

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        debug!("Total pages: {}", pages.len());
        let plan = plan_interleave(pages.len(), self.options)?;

        for &page_id in &pages {
            push_down_inherited(&mut doc, page_id)?;
        }

        let tree_root = page_tree_root(&doc)?;
        let mut kids = Vec::with_capacity(plan.len());
        for slot in &plan {
            let page_id = match *slot {
                PageSlot::Page(index) => pages[index],
                PageSlot::Blank => {
                    let last_front = pages[plan.len() / 2 - 1];
                    let media_box = media_box_of(&doc, last_front);
                    debug!("Adding blank back page: {:?}", media_box);
                    doc.add_object(dictionary! {
                        "Type" => "Page",
                        "MediaBox" => media_box,
                        "Resources" => Dictionary::new(),
                    })
                }
            };
            set_parent(&mut doc, page_id, tree_root)?;
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len();
        let root = doc
            .get_dictionary_mut(tree_root)
            .map_err(|e| TransformError::Read(format!("page tree root: {e}")))?;
        root.set("Kids", Object::Array(kids));
        root.set("Count", count as i64);

        // Intermediate page tree nodes are unreachable now.
        doc.prune_objects();

        doc.save(output)
            .map_err(|e| TransformError::Write(e.to_string()))?;
        info!("Successfully wrote {} pages to {}", count, output.display());
        Ok(count)
    }
}

impl DocumentTransform for PdfDuplexer {
    fn name(&self) -> &'static str {
        "pdf-duplex"
    }

    fn validate(&self, input: &Path) -> Result<(), ValidationError> {
        let doc = Document::load(input)
            .map_err(|e| ValidationError::Unreadable(format!("failed to read PDF: {e}")))?;
        if doc.is_encrypted() {
            return Err(ValidationError::AccessRestricted);
        }
        if doc.get_pages().is_empty() {
            return Err(ValidationError::Empty);
        }
        Ok(())
    }

    fn transform(&self, input: &Path, output: &Path) -> Result<(), TransformError> {
        self.interleave(input, output).map(|_| ())
    }
}

fn page_tree_root(doc: &Document) -> Result<ObjectId, TransformError> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(|pages| pages.as_reference())
        .map_err(|e| TransformError::Read(format!("missing page tree: {e}")))
}

/// Resolve `key` on the page or the nearest ancestor that defines it.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Copy inherited attributes onto the page itself so it survives being
/// re-parented under the flattened tree.
fn push_down_inherited(doc: &mut Document, page_id: ObjectId) -> Result<(), TransformError> {
    let resolved: Vec<(&[u8], Object)> = INHERITABLE
        .iter()
        .filter_map(|key| inherited(doc, page_id, key).map(|value| (*key, value)))
        .collect();

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| TransformError::Read(format!("page {page_id:?}: {e}")))?;
    for (key, value) in resolved {
        if !page.has(key) {
            page.set(key, value);
        }
    }
    Ok(())
}

fn set_parent(doc: &mut Document, page_id: ObjectId, parent: ObjectId) -> Result<(), TransformError> {
    doc.get_dictionary_mut(page_id)
        .map_err(|e| TransformError::Read(format!("page {page_id:?}: {e}")))?
        .set("Parent", parent);
    Ok(())
}

fn media_box_of(doc: &Document, page_id: ObjectId) -> Object {
    inherited(doc, page_id, b"MediaBox")
        .and_then(|value| match value {
            Object::Reference(id) => doc.get_object(id).ok().cloned(),
            other => Some(other),
        })
        .unwrap_or_else(|| {
            Object::Array(DEFAULT_MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect())
        })
}
