//! Assembly-time lookups of raw reference values in earlier stages'
//! collections. There is no fallback: an unresolved key is fatal.

use crate::error::{CompileError, Result};
use crate::models::{Entity, EntityKind};
use crate::normalize::Collection;

/// The entity holding a reference, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct Referrer<'a> {
    pub kind: EntityKind,
    pub label: &'a str,
}

impl<'a> Referrer<'a> {
    pub fn of<E: Entity>(kind: EntityKind, entity: &'a E) -> Self {
        Self {
            kind,
            label: entity.label(),
        }
    }
}

/// Looks `key` up verbatim and returns the target's IRI.
pub fn resolve_iri<'c, E: Entity>(
    collection: &'c Collection<E>,
    key: &str,
    referrer: Referrer<'_>,
) -> Result<&'c str> {
    collection
        .get(key)
        .map(|target| target.iri())
        .ok_or_else(|| CompileError::Reference {
            stage: referrer.kind,
            entity: referrer.label.to_string(),
            target: collection.kind(),
            key: key.to_string(),
        })
}
