use crate::config::{INDIVIDUAL_BASE_IRI, IRI_ID_WIDTH, SEED_ID};
use std::fmt;

/// Numeric identifier minted by the [`IdAuthority`]. Embedded in permanent IRIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Class IRI: `base` followed by the zero-padded identifier.
    pub fn iri(self, base: &str) -> String {
        format!("{base}{:0width$}", self.0, width = IRI_ID_WIDTH)
    }

    /// Named individual IRI, unpadded.
    pub fn individual_iri(self) -> String {
        format!("{INDIVIDUAL_BASE_IRI}{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run-wide monotonic identifier counter.
///
/// Callers `peek` the identifier for a new construction attempt and then
/// `advance` unconditionally, whether or not the entity is admitted. Identifiers
/// are therefore strictly increasing and unique but not contiguous.
#[derive(Debug)]
pub struct IdAuthority {
    next: u64,
}

impl IdAuthority {
    pub fn new(seed: u64) -> Self {
        Self { next: seed }
    }

    pub fn peek(&self) -> EntityId {
        EntityId(self.next)
    }

    pub fn advance(&mut self) {
        self.next += 1;
    }

    /// Peeks and advances in one step.
    pub fn take(&mut self) -> EntityId {
        let id = self.peek();
        self.advance();
        id
    }
}

impl Default for IdAuthority {
    fn default() -> Self {
        Self::new(SEED_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENTITY_BASE_IRI;

    #[test]
    fn peek_does_not_advance() {
        let ids = IdAuthority::new(10);
        assert_eq!(ids.peek().value(), 10);
        assert_eq!(ids.peek().value(), 10);
    }

    #[test]
    fn advance_moves_by_one() {
        let mut ids = IdAuthority::default();
        assert_eq!(ids.peek().value(), SEED_ID);
        ids.advance();
        ids.advance();
        assert_eq!(ids.peek().value(), SEED_ID + 2);
    }

    #[test]
    fn take_returns_current_then_advances() {
        let mut ids = IdAuthority::new(5);
        assert_eq!(ids.take().value(), 5);
        assert_eq!(ids.take().value(), 6);
        assert_eq!(ids.peek().value(), 7);
    }

    #[test]
    fn class_iri_is_zero_padded() {
        let iri = IdAuthority::new(701).peek().iri(ENTITY_BASE_IRI);
        assert!(iri.starts_with(ENTITY_BASE_IRI));
        assert!(iri.ends_with("00000000000000000701"));
        assert_eq!(iri.len(), ENTITY_BASE_IRI.len() + IRI_ID_WIDTH);
    }

    #[test]
    fn individual_iri_is_unpadded() {
        assert_eq!(
            IdAuthority::new(42).peek().individual_iri(),
            "#OWLNamedIndividual_42"
        );
    }
}
