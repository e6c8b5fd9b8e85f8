//! Familiar Record Generator
//!
//! Turns a set of JSON Schema documents into Rust record definitions with
//! serde routines that enforce required fields and additional-properties rules.
//!
//! ## Pipeline
//!
//! ```text
//! *.json ──read──▶ SchemaSet ──resolve/lower──▶ TypeGraph + candidates
//!                                                     │
//!                                                  unify
//!                                                     ▼
//!            models.rs ◀──emit── records + aliases (Consolidated)
//! ```
//!
//! - **Resolver**: maps every `$ref` to the schema node it names, across documents
//! - **Lowerer**: builds the type graph, one candidate record per object schema
//! - **Unification**: merges structurally equal candidates and names the rest
//! - **Emitter**: writes a deterministic Rust source file
//!
//! The [`codec`] module applies the generated reader/writer rules to
//! `serde_json::Value` data without compiling the output.

pub mod codec;
pub mod codegen;
pub mod config;
pub mod error;
pub mod graph;
pub mod schema;

pub use codec::{Codec, DecodeError, Decoded, EncodeError, RecordInstance, RequiredFieldFault};
pub use codegen::GeneratedOutput;
pub use config::StructgenConfig;
pub use error::{Result, Stage, StructgenError};
pub use graph::{consolidate, Consolidated, Lowerer, TypeGraph};
pub use schema::{collect_schema_paths, read_schema_documents, SchemaSet};

use std::path::{Path, PathBuf};

/// Schemas compiled into a consolidated record set
#[derive(Debug)]
pub struct Compiled {
    /// Schema files in the order they were read
    pub sources: Vec<PathBuf>,
    pub consolidated: Consolidated,
}

/// Lower and unify an already-loaded document set
pub fn compile_documents(schemas: &SchemaSet, root_name: &str) -> Result<Consolidated> {
    let lowered = Lowerer::new(schemas, root_name).lower_all()?;
    consolidate(lowered)
}

/// Read every schema under `inputs` and compile them together
pub fn compile(inputs: &[PathBuf], extension: &str, root_name: &str) -> Result<Compiled> {
    let sources = collect_schema_paths(inputs, extension)?;
    if sources.is_empty() {
        return Err(StructgenError::InvalidDocument {
            path: inputs
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(":"),
            message: format!("no .{} schema files found", extension),
        });
    }
    let schemas = read_schema_documents(&sources)?;
    let consolidated = compile_documents(&schemas, root_name)?;
    Ok(Compiled { sources, consolidated })
}

/// Compile the inputs a configuration names, with its extension and root name
pub fn compile_config(config: &StructgenConfig) -> Result<Compiled> {
    compile(&config.input.paths, &config.input.extension, &config.naming.root_name)
}

/// Run the whole pipeline for a configuration and return the generated source
pub fn generate(config: &StructgenConfig) -> Result<GeneratedOutput> {
    let compiled = compile_config(config)?;
    let source_paths: Vec<String> = compiled.sources.iter().map(|p| p.display().to_string()).collect();
    codegen::emit(&compiled.consolidated, &source_paths, &config.output.package)
}

/// Write generated code, creating parent directories as needed
pub fn write_output(code: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, code)?;
    tracing::info!(path = %path.display(), bytes = code.len(), "generated code written");
    Ok(())
}
