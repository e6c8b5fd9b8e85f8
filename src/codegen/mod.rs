//! Code Generation
//!
//! Emits the consolidated record set as a single Rust source file.
//!
//! Layout of the generated file:
//! - header comment naming the source schemas
//! - `pub mod <package>` wrapping everything below
//! - imports, computed from what was emitted
//! - the `FieldRequired` helper, when any validator exists
//! - aliases, records, then routines, each sorted by name
//!
//! Output is a pure function of the record set: every collection walked here
//! is ordered by name.

pub mod names;
pub mod rust;

pub use rust::{RustEmitter, Usage};

use crate::error::{Result, Stage};
use crate::graph::Consolidated;

/// Output from code generation
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Generated code as a string
    pub code: String,
    /// Number of records emitted
    pub record_count: usize,
    /// Number of aliases emitted
    pub alias_count: usize,
}

const HEADER: &str = "// Code generated by familiar-structgen. DO NOT EDIT.";

const ALLOWED_LINTS: &str =
    "#[allow(non_camel_case_types, non_snake_case, unused_imports, unused_mut, unused_variables, dead_code, clippy::all)]";

const FIELD_REQUIRED: &str = r#"/// A required field was absent from the decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequired {
    pub field: &'static str,
}

impl std::fmt::Display for FieldRequired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" is required but was not present: field required validation failed", self.field)
    }
}

impl std::error::Error for FieldRequired {}
"#;

/// Render records and aliases into one source file
pub fn emit(consolidated: &Consolidated, source_paths: &[String], package: &str) -> Result<GeneratedOutput> {
    let graph = &consolidated.graph;
    let mut emitter = RustEmitter::new(graph);

    let mut aliases = Vec::new();
    for (name, alias) in &consolidated.aliases {
        let mut output = String::new();
        emitter
            .emit_alias(&mut output, name, graph.field(*alias))
            .map_err(|e| e.in_stage(Stage::Emit, name))?;
        aliases.push(output);
    }

    let mut records = Vec::new();
    let mut routines = Vec::new();
    for (name, id) in &consolidated.records {
        let record = graph.strukt(*id);
        let mut output = String::new();
        emitter
            .emit_record(&mut output, record)
            .map_err(|e| e.in_stage(Stage::Emit, name))?;
        records.push(output);

        if record.generate_code {
            let mut output = String::new();
            emitter
                .emit_routines(&mut output, record)
                .map_err(|e| e.in_stage(Stage::Emit, name))?;
            routines.push(output);
        }
    }

    let usage = emitter.usage();
    let mut sections = Vec::new();
    let imports = imports(usage);
    if !imports.is_empty() {
        sections.push(imports);
    }
    if usage.field_required {
        sections.push(FIELD_REQUIRED.to_string());
    }
    if !aliases.is_empty() {
        sections.push(aliases.concat());
    }
    sections.extend(records);
    sections.extend(routines);

    let mut code = String::new();
    code.push_str(HEADER);
    code.push('\n');
    code.push_str(&format!("// Source paths: {}\n\n", source_paths.join(":")));
    code.push_str(ALLOWED_LINTS);
    code.push('\n');
    code.push_str(&format!("pub mod {} {{\n", names::package_ident(package)));
    code.push_str(&indent(&sections.join("\n")));
    code.push_str("}\n");

    tracing::info!(
        records = consolidated.records.len(),
        aliases = consolidated.aliases.len(),
        bytes = code.len(),
        "code emitted"
    );
    Ok(GeneratedOutput {
        code,
        record_count: consolidated.records.len(),
        alias_count: consolidated.aliases.len(),
    })
}

fn imports(usage: Usage) -> String {
    let mut imports = String::new();
    if usage.serde {
        imports.push_str("use serde::{Deserialize, Serialize};\n");
    }
    if usage.serialize_map {
        imports.push_str("use serde::ser::SerializeMap;\n");
    }
    if usage.ser_error {
        imports.push_str("use serde::ser::Error as _;\n");
    }
    if usage.de_error {
        imports.push_str("use serde::de::Error as _;\n");
    }
    if usage.btree_map {
        imports.push_str("use std::collections::BTreeMap;\n");
    }
    imports
}

fn indent(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + text.len() / 8);
    for line in text.lines() {
        if !line.is_empty() {
            output.push_str("    ");
            output.push_str(line);
        }
        output.push('\n');
    }
    output
}
