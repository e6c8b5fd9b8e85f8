//! Schema documents and nodes
//!
//! Parsed JSON Schema documents live in a single [`SchemaSet`] arena. Every
//! sub-schema becomes a [`SchemaNode`] addressed by a [`NodeId`], carrying a
//! back-link to its parent, the key it was declared under and its JSON
//! pointer inside the owning document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{Result, Stage, StructgenError};

/// Index of a node in the [`SchemaSet`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Index of a document in the [`SchemaSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(usize);

/// The `additionalProperties` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalProperties {
    /// A sub-schema every extra key must satisfy
    Schema(NodeId),
    /// `true` (anything goes) or `false` (closed object)
    Allowed(bool),
}

/// One fragment of a schema document
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub document: DocumentId,
    pub parent: Option<NodeId>,
    /// Key this node was declared under in `properties` or `definitions`
    pub json_key: Option<String>,
    /// JSON pointer inside the document, empty for the root
    pub pointer: String,
    /// Declared directly inside a `definitions`/`$defs` block
    pub is_definition: bool,
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub types: Vec<String>,
    pub properties: BTreeMap<String, NodeId>,
    pub required: Vec<String>,
    pub items: Option<NodeId>,
    pub additional_properties: Option<AdditionalProperties>,
    pub reference: Option<String>,
    pub definitions: BTreeMap<String, NodeId>,
}

impl SchemaNode {
    /// Declared types, falling back to structural hints when none are given
    pub fn effective_types(&self) -> Vec<String> {
        if !self.types.is_empty() {
            return self.types.clone();
        }
        if !self.properties.is_empty() {
            return vec!["object".to_string()];
        }
        if self.items.is_some() {
            return vec!["array".to_string()];
        }
        Vec::new()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }
}

/// A loaded schema file
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub path: PathBuf,
    /// `$id` of the root, or the file name when the document declares none
    pub id: String,
    pub root: NodeId,
}

/// Arena of every loaded document and its nodes
#[derive(Debug, Default)]
pub struct SchemaSet {
    nodes: Vec<SchemaNode>,
    documents: Vec<SchemaDocument>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one document into the arena
    pub fn add_document(&mut self, path: impl Into<PathBuf>, json: &Value) -> Result<DocumentId> {
        let path = path.into();
        if !json.is_object() {
            return Err(StructgenError::InvalidDocument {
                path: path.display().to_string(),
                message: "root schema must be a JSON object".to_string(),
            });
        }

        let document = DocumentId(self.documents.len());
        let id = json
            .get("$id")
            .or_else(|| json.get("id"))
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            });

        // Reserve the slot so nodes can point back at the document
        self.documents.push(SchemaDocument {
            path,
            id,
            root: NodeId(self.nodes.len()),
        });
        let root = self.add_node(json, document, None, None, String::new(), false);
        self.documents[document.0].root = root;
        Ok(document)
    }

    fn add_node(
        &mut self,
        json: &Value,
        document: DocumentId,
        parent: Option<NodeId>,
        json_key: Option<String>,
        pointer: String,
        is_definition: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let text = |key: &str| {
            json.get(key)
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_default()
        };

        let types = match json.get("type") {
            Some(Value::String(t)) => vec![t.clone()],
            Some(Value::Array(ts)) => ts.iter().filter_map(|t| t.as_str().map(String::from)).collect(),
            _ => Vec::new(),
        };

        let required = json
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default();

        // Draft-04 documents use a bare `id`; only trust it when it is a string
        let node_id = json
            .get("$id")
            .or_else(|| json.get("id").filter(|v| v.is_string()))
            .and_then(|v| v.as_str())
            .map(String::from);

        self.nodes.push(SchemaNode {
            document,
            parent,
            json_key,
            pointer: pointer.clone(),
            is_definition,
            id: node_id,
            title: text("title"),
            description: text("description"),
            types,
            properties: BTreeMap::new(),
            required,
            items: None,
            additional_properties: None,
            reference: json.get("$ref").and_then(|v| v.as_str()).map(String::from),
            definitions: BTreeMap::new(),
        });

        for block in ["definitions", "$defs"] {
            if let Some(defs) = json.get(block).and_then(|v| v.as_object()) {
                for (key, def) in defs {
                    let child_pointer = format!("{}/{}/{}", pointer, block, escape_pointer(key));
                    let child = self.add_node(def, document, Some(id), Some(key.clone()), child_pointer, true);
                    self.nodes[id.0].definitions.insert(key.clone(), child);
                }
            }
        }

        if let Some(props) = json.get("properties").and_then(|v| v.as_object()) {
            for (key, prop) in props {
                let child_pointer = format!("{}/properties/{}", pointer, escape_pointer(key));
                let child = self.add_node(prop, document, Some(id), Some(key.clone()), child_pointer, false);
                self.nodes[id.0].properties.insert(key.clone(), child);
            }
        }

        let items = match json.get("items") {
            Some(items @ Value::Object(_)) => Some((items, format!("{}/items", pointer))),
            // Tuple form: only the first position shapes the element type
            Some(Value::Array(tuple)) => tuple.first().map(|first| (first, format!("{}/items/0", pointer))),
            _ => None,
        };
        if let Some((items, child_pointer)) = items {
            let child = self.add_node(items, document, Some(id), None, child_pointer, false);
            self.nodes[id.0].items = Some(child);
        }

        match json.get("additionalProperties") {
            Some(Value::Bool(allowed)) => {
                self.nodes[id.0].additional_properties = Some(AdditionalProperties::Allowed(*allowed));
            }
            Some(ap @ Value::Object(_)) => {
                let child_pointer = format!("{}/additionalProperties", pointer);
                let child = self.add_node(ap, document, Some(id), None, child_pointer, false);
                self.nodes[id.0].additional_properties = Some(AdditionalProperties::Schema(child));
            }
            _ => {}
        }

        id
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SchemaNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn document(&self, id: DocumentId) -> &SchemaDocument {
        &self.documents[id.0]
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &SchemaDocument)> {
        self.documents.iter().enumerate().map(|(i, d)| (DocumentId(i), d))
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// `document.json#/pointer` location of a node, used in messages and as record source id
    pub fn path_of(&self, id: NodeId) -> String {
        let node = self.node(id);
        format!("{}#{}", self.document(node.document).path.display(), node.pointer)
    }
}

/// Escape a key for use inside a JSON pointer
pub fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Undo [`escape_pointer`]
pub fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Expand input paths into the sorted list of schema files they name.
///
/// Directories are listed one level deep and filtered by `extension`.
pub fn collect_schema_paths(inputs: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let metadata = fs::metadata(input)?;
        if !metadata.is_dir() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().map(|e| e == extension).unwrap_or(false) {
                files.push(path.to_path_buf());
            }
        }
    }
    // Sorted order keeps anonymous names and collision suffixes stable between runs
    files.sort();
    files.dedup();
    Ok(files)
}

/// Read and parse schema files in sorted path order
pub fn read_schema_documents(paths: &[PathBuf]) -> Result<SchemaSet> {
    let mut sorted: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
    sorted.sort();

    let mut set = SchemaSet::new();
    for path in sorted {
        let document = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| StructgenError::from(e).in_stage(Stage::Read, &document))?;
        let json: Value = serde_json::from_str(&content)
            .map_err(|e| StructgenError::from(e).in_stage(Stage::Read, &document))?;
        set.add_document(path, &json)
            .map_err(|e| e.in_stage(Stage::Read, &document))?;
        tracing::debug!(document = %document, "loaded schema document");
    }
    tracing::info!(documents = set.document_count(), "schema documents loaded");
    Ok(set)
}
