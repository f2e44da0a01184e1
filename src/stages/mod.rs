//! Per-kind normalizer/assembler pairs.
//!
//! Each stage is a unit-like struct implementing [`Stage`]: how one source row
//! becomes an entity, which entities are never imported, and which axioms an
//! admitted entity contributes to the document. The pipeline drives them in a
//! fixed order through [`normalize`](crate::normalize::normalize) and
//! [`assemble`].
//!
//! Assembly appends, per entity: the class declaration, label, creator and
//! date annotations, kind-specific literals, the parent relation, then the
//! cross-reference restrictions. References are resolved only here.

pub mod classification;
pub mod component;
pub mod measure;
pub mod quality;
pub mod question;
pub mod statement;

pub use classification::ClassificationStage;
pub use component::{ComponentLinks, ComponentStage};
pub use measure::MeasureStage;
pub use quality::QualityStage;
pub use question::{QuestionLinks, QuestionStage};
pub use statement::{StatementLinks, StatementStage};

use crate::config::Settings;
use crate::error::Result;
use crate::ids::{EntityId, IdAuthority};
use crate::models::{Clock, Entity, EntityCore, EntityKind};
use crate::normalize::Collection;
use crate::owl::{AnnotationValue, ClassExpression, Document};
use crate::source::{RowSchema, SourceFile};
use crate::stats::StageStats;
use crate::vocabulary::Vocabulary;
use tracing::info;

/// Read-only inputs shared by every construction call.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub settings: &'a Settings,
    pub clock: Clock,
}

impl<'a> BuildContext<'a> {
    pub fn new(settings: &'a Settings, clock: Clock) -> Self {
        Self { settings, clock }
    }

    pub fn vocabulary(&self) -> &'a Vocabulary {
        &self.settings.vocabulary
    }

    /// Core record for a new entity, IRI minted from `id`.
    pub fn core(&self, id: EntityId, parent_iri: Option<&str>, label: String) -> EntityCore {
        EntityCore::new(
            id,
            &self.settings.vocabulary.entity_base,
            parent_iri,
            label,
            &self.clock,
        )
    }
}

pub trait Stage {
    type Row: RowSchema;
    type Entity: Entity;
    /// Earlier collections this stage resolves references against.
    type Links<'a>;

    const SOURCE: SourceFile;

    fn kind(&self) -> EntityKind;

    fn key_columns(&self) -> &'static [&'static str];

    fn construct(
        &mut self,
        row: &Self::Row,
        id: EntityId,
        ctx: &BuildContext<'_>,
    ) -> Self::Entity;

    /// Kind-specific "do not import" rule, checked before admission.
    fn excluded(&self, entity: &Self::Entity, ctx: &BuildContext<'_>) -> bool;

    /// Runs once, right after an entity is admitted.
    fn on_commit(
        &mut self,
        _entity: &mut Self::Entity,
        _row: &Self::Row,
        _ids: &mut IdAuthority,
    ) {
    }

    /// Handles a row whose key is already committed. Returns `true` when the
    /// row was folded into `existing`, `false` when it was ignored.
    fn on_duplicate(
        &mut self,
        _existing: &mut Self::Entity,
        _row: &Self::Row,
        _ids: &mut IdAuthority,
    ) -> bool {
        false
    }

    fn assemble(
        &self,
        entity: &Self::Entity,
        links: &Self::Links<'_>,
        doc: &mut Document,
        vocab: &Vocabulary,
    ) -> Result<()>;

    /// Runs after every entity of one assembly call is emitted.
    fn finish(&self, _emitted: &[&Self::Entity], _doc: &mut Document, _vocab: &Vocabulary) {}
}

/// Emits every not-yet-emitted entity of `collection` and flags it.
///
/// A failure stops at the offending entity: axioms already appended stay in
/// the document and entities emitted before it remain flagged.
pub fn assemble<S: Stage>(
    stage: &S,
    collection: &mut Collection<S::Entity>,
    links: &S::Links<'_>,
    doc: &mut Document,
    vocab: &Vocabulary,
    stats: &mut StageStats,
) -> Result<()> {
    let before = doc.len();
    let mut emitted = vec![false; collection.len()];
    let mut failure = None;

    for (i, entity) in collection.values().enumerate() {
        if entity.core().emitted {
            continue;
        }
        if let Err(e) = stage.assemble(entity, links, doc, vocab) {
            failure = Some(e);
            break;
        }
        emitted[i] = true;
    }

    for (entity, done) in collection.values_mut().zip(&emitted) {
        if *done {
            entity.core_mut().emitted = true;
        }
    }

    if let Some(e) = failure {
        stats.axioms += doc.len() - before;
        return Err(e);
    }

    let batch: Vec<&S::Entity> = collection
        .values()
        .zip(&emitted)
        .filter_map(|(entity, done)| done.then_some(entity))
        .collect();
    stage.finish(&batch, doc, vocab);
    stats.axioms += doc.len() - before;

    info!(
        stage = %stage.kind(),
        entities = batch.len(),
        axioms = doc.len() - before,
        "Assembled entities"
    );
    Ok(())
}

/// Declaration, label, creator and date of a class-level entity.
pub(crate) fn emit_header(doc: &mut Document, core: &EntityCore, vocab: &Vocabulary) {
    doc.declare_class(&core.iri);
    doc.annotate(
        &vocab.label,
        &core.iri,
        AnnotationValue::tagged(core.label.as_str(), &vocab.language),
    );
    doc.annotate(
        &vocab.creator_property,
        &core.iri,
        AnnotationValue::Iri(vocab.creator.clone()),
    );
    doc.annotate(
        &vocab.date_property,
        &core.iri,
        AnnotationValue::typed(core.date_literal(), &vocab.date_time_datatype),
    );
}

pub(crate) fn emit_parent(doc: &mut Document, core: &EntityCore) {
    if let Some(parent) = &core.parent_iri {
        doc.subclass_of(&core.iri, ClassExpression::Class(parent.clone()));
    }
}
