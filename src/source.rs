//! Row source: typed row schemas for the four CSV exports and the readers that
//! produce them.
//!
//! Each schema is validated against the file header once, before any row is
//! deserialized, so a missing column surfaces as [`CompileError::Schema`]
//! instead of failing on first access. Values are kept exactly as exported;
//! trimming and case folding belong to the stage that consumes them.

use crate::config::{CLASSIFICATION_FILE, ITEMS_FILE, METADATA_FILE, QUESTIONS_FILE};
use crate::error::{CompileError, Result};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A fixed row layout with named columns.
pub trait RowSchema: DeserializeOwned {
    const COLUMNS: &'static [&'static str];

    /// Value of a schema column by its header name.
    fn column(&self, name: &str) -> Option<&str>;
}

macro_rules! row_schema {
    ($(#[$meta:meta])* $name:ident { $($field:ident => $column:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, Deserialize)]
        pub struct $name {
            $(#[serde(rename = $column)] pub $field: String,)+
        }

        impl RowSchema for $name {
            const COLUMNS: &'static [&'static str] = &[$($column),+];

            fn column(&self, name: &str) -> Option<&str> {
                match name {
                    $($column => Some(self.$field.as_str()),)+
                    _ => None,
                }
            }
        }
    };
}

row_schema! {
    /// Harmonised component metadata: measures, qualities and components.
    MetadataRow {
        measure => "Harmonised measure",
        quality => "Quality",
        id => "ID",
        component => "harmonised questionare Component",
        theoretical_background => "Theoretical background",
        definition => "Definition",
    }
}

row_schema! {
    /// One classification instance per row.
    ClassificationRow {
        id => "ID",
        classification => "Classification",
        definition => "Definiton within a specific classification",
        instance => "Instances: ",
    }
}

row_schema! {
    /// Harmonised components export: one question per row.
    QuestionRow {
        label => "Annotation: Label",
        text => "Annotation: hadQuestion",
        classification => "Linked classification ID",
        question_type => "Question",
        component => "ComponentId",
    }
}

row_schema! {
    /// Matrix items export: one statement per row.
    ItemRow {
        question => "Question name",
        item => "Item name",
        item_label => "Item label",
        component => "ComponentId",
    }
}

/// A deserialized row with its 1-based line in the source file.
#[derive(Debug, Clone)]
pub struct Row<R> {
    pub line: u64,
    pub data: R,
}

/// The four source exports consumed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFile {
    Metadata,
    Classifications,
    Questions,
    Items,
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFile::Metadata => "component metadata",
            SourceFile::Classifications => "classifications",
            SourceFile::Questions => "questions",
            SourceFile::Items => "items",
        };
        f.write_str(name)
    }
}

/// Produces ordered, typed rows for a source export.
pub trait RowSource {
    fn rows<R: RowSchema>(&self, file: SourceFile) -> Result<Vec<Row<R>>>;
}

/// Reads and validates every row of a CSV stream.
pub fn read_csv<R: RowSchema, Rd: Read>(
    reader: Rd,
    source_name: &str,
) -> Result<Vec<Row<R>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| CompileError::csv(source_name, e))?
        .clone();

    if let Some(missing) = R::COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(CompileError::schema(source_name, missing));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| record_error::<R>(source_name, &headers, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let data: R = record
            .deserialize(Some(&headers))
            .map_err(|e| CompileError::csv(source_name, e))?;
        rows.push(Row { line, data });
    }

    debug!(source = source_name, rows = rows.len(), "Read source rows");
    Ok(rows)
}

/// A short row lacks the fields of every trailing column; when one of those
/// belongs to the schema the row is reported as missing it.
fn record_error<R: RowSchema>(
    source_name: &str,
    headers: &csv::StringRecord,
    error: csv::Error,
) -> CompileError {
    if let csv::ErrorKind::UnequalLengths { len, .. } = error.kind() {
        let missing = headers
            .iter()
            .skip(*len as usize)
            .find(|header| R::COLUMNS.contains(header));
        if let Some(column) = missing {
            return CompileError::schema(source_name, column);
        }
    }
    CompileError::csv(source_name, error)
}

/// Paths of the four exports on disk.
#[derive(Debug, Clone)]
pub struct CsvFiles {
    pub metadata: PathBuf,
    pub classifications: PathBuf,
    pub questions: PathBuf,
    pub items: PathBuf,
}

impl CsvFiles {
    /// Default file names inside one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            metadata: dir.join(METADATA_FILE),
            classifications: dir.join(CLASSIFICATION_FILE),
            questions: dir.join(QUESTIONS_FILE),
            items: dir.join(ITEMS_FILE),
        }
    }

    pub fn path(&self, file: SourceFile) -> &Path {
        match file {
            SourceFile::Metadata => &self.metadata,
            SourceFile::Classifications => &self.classifications,
            SourceFile::Questions => &self.questions,
            SourceFile::Items => &self.items,
        }
    }
}

impl RowSource for CsvFiles {
    fn rows<R: RowSchema>(&self, file: SourceFile) -> Result<Vec<Row<R>>> {
        let path = self.path(file);
        let display = path.display().to_string();
        let handle = File::open(path).map_err(|error| CompileError::Open {
            path: display.clone(),
            error,
        })?;
        read_csv(BufReader::new(handle), &display)
    }
}

/// CSV text held in memory, keyed by export.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: FxHashMap<SourceFile, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, file: SourceFile, csv: impl Into<String>) -> Self {
        self.tables.insert(file, csv.into());
        self
    }
}

impl RowSource for MemorySource {
    fn rows<R: RowSchema>(&self, file: SourceFile) -> Result<Vec<Row<R>>> {
        let name = file.to_string();
        let text = self.tables.get(&file).ok_or_else(|| CompileError::Open {
            path: name.clone(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "no such table"),
        })?;
        read_csv(text.as_bytes(), &name)
    }
}
