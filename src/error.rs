//! Error types for the record generator

use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, StructgenError>;

/// Pipeline stage an error surfaced in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Resolve,
    Lower,
    Unify,
    Emit,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Resolve => "resolve",
            Self::Lower => "lower",
            Self::Unify => "unify",
            Self::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// Record generator errors
#[derive(Error, Debug)]
pub enum StructgenError {
    #[error("Malformed reference \"{reference}\" at \"{path}\"")]
    UnresolvedReference { reference: String, path: String },

    #[error("Reference \"{reference}\" not found at \"{path}\"")]
    ReferenceNotFound { reference: String, path: String },

    #[error("Malformed type {type_name}: {message}")]
    Shape { type_name: String, message: String },

    #[error("Record with the name '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Unsupported type keyword \"{keyword}\" at \"{path}\"")]
    UnsupportedType { keyword: String, path: String },

    #[error("Invalid schema document {path}: {message}")]
    InvalidDocument { path: String, message: String },

    #[error("{stage} failed for {document}: {source}")]
    Stage {
        stage: Stage,
        document: String,
        #[source]
        source: Box<StructgenError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl StructgenError {
    /// Wrap this error with the stage and document it occurred in
    pub fn in_stage(self, stage: Stage, document: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            document: document.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping stage wrappers
    pub fn root_cause(&self) -> &StructgenError {
        match self {
            Self::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
