use std::io;

use thiserror::Error;

use crate::models::EntityKind;

/// Fatal failures raised while compiling the ontology.
///
/// Duplicate natural keys are not represented here: they are a silent
/// first-wins suppression counted in [`StageStats`](crate::stats::StageStats).
#[derive(Debug, Error)]
pub enum CompileError {
    /// A column the row schema needs is missing from the source header.
    #[error("source '{source_name}' is missing required column '{column}'")]
    Schema { source_name: String, column: String },
    /// A cross reference did not resolve against the earlier stage's collection.
    #[error("{stage} '{entity}' references unknown {target} '{key}'")]
    Reference {
        stage: EntityKind,
        entity: String,
        target: EntityKind,
        key: String,
    },
    #[error("cannot open source '{path}': {error}")]
    Open {
        path: String,
        #[source]
        error: io::Error,
    },
    #[error("malformed CSV in '{source_name}': {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },
    #[error("failed to write ontology document: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CompileError {
    pub fn schema(source_name: &str, column: &str) -> Self {
        Self::Schema {
            source_name: source_name.to_string(),
            column: column.to_string(),
        }
    }

    pub fn csv(source_name: &str, error: csv::Error) -> Self {
        Self::Csv {
            source_name: source_name.to_string(),
            error,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
