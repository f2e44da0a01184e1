use crate::error::{CompileError, Result};
use crate::ids::IdAuthority;
use crate::models::{Entity, EntityKind};
use crate::source::{Row, RowSchema};
use crate::stages::{BuildContext, Stage};
use crate::stats::StageStats;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Committed entities of one kind, keyed by natural key, in first-seen order.
#[derive(Debug, Clone)]
pub struct Collection<E> {
    kind: EntityKind,
    entries: Vec<(String, E)>,
    index: FxHashMap<String, usize>,
}

impl<E> Collection<E> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&E> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut E> {
        self.index.get(key).map(|&i| &mut self.entries[i].1)
    }

    /// First insert wins; returns `false` and drops `entity` if `key` exists.
    pub fn insert(&mut self, key: String, entity: E) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, entity));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &E)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.entries.iter().map(|(_, e)| e)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.entries.iter_mut().map(|(_, e)| e)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// Underscore-joined, individually trimmed key column values.
pub fn natural_key<R: RowSchema>(
    row: &R,
    columns: &[&str],
    source_name: &str,
) -> Result<String> {
    let mut parts = Vec::with_capacity(columns.len());
    for column in columns {
        let value = row
            .column(column)
            .ok_or_else(|| CompileError::schema(source_name, column))?;
        parts.push(value.trim());
    }
    Ok(parts.join("_"))
}

/// Deduplicates `rows` into a keyed collection of admitted entities.
///
/// Every construction attempt consumes exactly one identifier, excluded or
/// not. Rows whose key is already committed go to [`Stage::on_duplicate`];
/// keys of excluded entities are never committed, so later rows sharing them
/// are attempted again.
pub fn normalize<S: Stage>(
    stage: &mut S,
    rows: &[Row<S::Row>],
    ctx: &BuildContext<'_>,
    ids: &mut IdAuthority,
    stats: &mut StageStats,
) -> Result<Collection<S::Entity>> {
    let kind = stage.kind();
    let source_name = S::SOURCE.to_string();
    let columns = stage.key_columns();
    if let Some(missing) = columns
        .iter()
        .find(|column| !S::Row::COLUMNS.contains(*column))
    {
        return Err(CompileError::schema(&source_name, missing));
    }

    let mut collection = Collection::new(kind);

    for row in rows {
        stats.rows += 1;
        let key = natural_key(&row.data, columns, &source_name)?;

        if let Some(existing) = collection.get_mut(&key) {
            if stage.on_duplicate(existing, &row.data, ids) {
                stats.merged += 1;
            } else {
                stats.duplicates += 1;
                debug!(stage = %kind, key = %key, line = row.line, "Duplicate key ignored");
            }
            continue;
        }

        let id = ids.peek();
        let mut entity = stage.construct(&row.data, id, ctx);
        let excluded = stage.excluded(&entity, ctx);
        ids.advance();

        if excluded {
            stats.excluded += 1;
            debug!(stage = %kind, key = %key, label = entity.label(), "Entity excluded");
            continue;
        }

        stage.on_commit(&mut entity, &row.data, ids);
        collection.insert(key, entity);
        stats.committed += 1;
    }

    info!(
        stage = %kind,
        rows = stats.rows,
        committed = stats.committed,
        duplicates = stats.duplicates,
        excluded = stats.excluded,
        "Normalized source rows"
    );

    Ok(collection)
}
