//! Reference Resolver
//!
//! Indexes every schema node by document and JSON pointer, and follows `$ref`
//! strings to their target nodes.
//!
//! Supported reference forms:
//! - `#/definitions/address` (same document)
//! - `address.json`, `./common/address.json#/definitions/street` (relative to the referring document)
//! - `http://example.com/address.json#/properties/street` (by document `$id`)
//! - `#anchor` or any embedded `$id` value

use std::collections::HashMap;

use crate::error::{Result, StructgenError};
use crate::schema::{unescape_pointer, DocumentId, NodeId, SchemaSet};

pub struct RefResolver<'a> {
    schemas: &'a SchemaSet,
    /// Document lookup by `$id`, path and file name
    documents: HashMap<String, DocumentId>,
    /// Node lookup by document and JSON pointer
    pointers: HashMap<(DocumentId, String), NodeId>,
    /// Node lookup by embedded `$id`
    anchors: HashMap<String, NodeId>,
    resolved: HashMap<NodeId, NodeId>,
}

impl<'a> RefResolver<'a> {
    pub fn new(schemas: &'a SchemaSet) -> Self {
        Self {
            schemas,
            documents: HashMap::new(),
            pointers: HashMap::new(),
            anchors: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// Build the indexes and check every `$ref` is well formed
    pub fn init(&mut self) -> Result<()> {
        for (id, document) in self.schemas.documents() {
            let path = normalize(&document.path.display().to_string());
            if let Some(file_name) = document.path.file_name() {
                self.documents.entry(file_name.to_string_lossy().to_string()).or_insert(id);
            }
            self.documents.insert(path, id);
            self.documents.insert(normalize(&document.id), id);
        }

        for (id, node) in self.schemas.nodes() {
            self.pointers.insert((node.document, node.pointer.clone()), id);
            if let Some(anchor) = &node.id {
                if !node.is_root() {
                    self.anchors.entry(anchor.clone()).or_insert(id);
                }
            }
            if let Some(reference) = &node.reference {
                if !is_well_formed(reference) {
                    return Err(StructgenError::UnresolvedReference {
                        reference: reference.clone(),
                        path: self.schemas.path_of(id),
                    });
                }
            }
        }

        tracing::debug!(
            documents = self.schemas.document_count(),
            pointers = self.pointers.len(),
            "reference index built"
        );
        Ok(())
    }

    /// Follow the `$ref` of `node` to its target.
    ///
    /// Resolving the same node twice returns the same target.
    pub fn resolve(&mut self, node: NodeId) -> Result<NodeId> {
        if let Some(target) = self.resolved.get(&node) {
            return Ok(*target);
        }

        let schemas = self.schemas;
        let source = schemas.node(node);
        let reference = source.reference.as_deref().ok_or_else(|| StructgenError::ReferenceNotFound {
            reference: String::new(),
            path: schemas.path_of(node),
        })?;
        let not_found = || StructgenError::ReferenceNotFound {
            reference: reference.to_string(),
            path: schemas.path_of(node),
        };

        // A whole reference may name an embedded `$id`
        let target = match self.anchors.get(reference) {
            Some(target) => *target,
            None => {
                let (base, fragment) = reference.split_once('#').unwrap_or((reference, ""));
                let document = if base.is_empty() {
                    source.document
                } else {
                    self.find_document(source.document, base).ok_or_else(not_found)?
                };
                self.find_in_document(document, fragment).ok_or_else(not_found)?
            }
        };

        tracing::debug!(
            reference = %reference,
            from = %schemas.path_of(node),
            to = %schemas.path_of(target),
            "resolved reference"
        );
        self.resolved.insert(node, target);
        Ok(target)
    }

    fn find_document(&self, from: DocumentId, base: &str) -> Option<DocumentId> {
        let current = self.schemas.document(from);
        let candidates = [
            join(&current.id, base),
            join(&current.path.display().to_string(), base),
            normalize(base),
            base.rsplit('/').next().unwrap_or(base).to_string(),
        ];
        candidates.iter().find_map(|c| self.documents.get(c).copied())
    }

    fn find_in_document(&self, document: DocumentId, fragment: &str) -> Option<NodeId> {
        if fragment.is_empty() || fragment == "/" {
            return Some(self.schemas.document(document).root);
        }
        if fragment.starts_with('/') {
            let pointer: String = fragment
                .split('/')
                .skip(1)
                .map(|segment| format!("/{}", crate::schema::escape_pointer(&unescape_pointer(segment))))
                .collect();
            return self.pointers.get(&(document, pointer)).copied();
        }

        // Plain-name fragment: an embedded `$id` of `#name`
        let anchor = format!("#{}", fragment);
        self.anchors
            .get(&anchor)
            .copied()
            .filter(|target| self.schemas.node(*target).document == document)
    }
}

fn is_well_formed(reference: &str) -> bool {
    !reference.is_empty() && !reference.chars().any(char::is_whitespace) && reference.matches('#').count() <= 1
}

/// Resolve `relative` against the location of `base`
fn join(base: &str, relative: &str) -> String {
    if relative.contains("://") || relative.starts_with('/') {
        return normalize(relative);
    }
    match base.rfind('/') {
        Some(index) => normalize(&format!("{}/{}", &base[..index], relative)),
        None => normalize(relative),
    }
}

/// Collapse `.` and `..` segments
fn normalize(path: &str) -> String {
    let (scheme, rest) = match path.find("://") {
        Some(index) => path.split_at(index + 3),
        None => ("", path),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "." => {}
            ".." if segments.last().is_some_and(|last| *last != ".." && !last.is_empty()) => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    format!("{}{}", scheme, segments.join("/"))
}
