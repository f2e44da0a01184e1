use super::{emit_header, emit_parent, BuildContext, Stage};
use crate::config::CLASSIFICATION_KEY;
use crate::error::Result;
use crate::ids::{EntityId, IdAuthority};
use crate::models::{Classification, EntityKind};
use crate::owl::{AnnotationValue, Document};
use crate::source::{ClassificationRow, SourceFile};
use crate::vocabulary::Vocabulary;

/// Classifications and their instances. Every row of a committed key adds
/// one instance; the first row's instance is added on commit.
#[derive(Debug, Default)]
pub struct ClassificationStage;

fn instance_label(row: &ClassificationRow) -> String {
    row.instance.trim().to_lowercase()
}

impl Stage for ClassificationStage {
    type Row = ClassificationRow;
    type Entity = Classification;
    type Links<'a> = ();

    const SOURCE: SourceFile = SourceFile::Classifications;

    fn kind(&self) -> EntityKind {
        EntityKind::Classification
    }

    fn key_columns(&self) -> &'static [&'static str] {
        CLASSIFICATION_KEY
    }

    fn construct(
        &mut self,
        row: &ClassificationRow,
        id: EntityId,
        ctx: &BuildContext<'_>,
    ) -> Classification {
        let parent = &ctx.vocabulary().parents.classification;
        Classification {
            core: ctx.core(id, Some(parent), row.classification.trim().to_lowercase()),
            definition: row.definition.trim().to_string(),
            instances: Vec::new(),
        }
    }

    fn excluded(&self, entity: &Classification, ctx: &BuildContext<'_>) -> bool {
        ctx.settings
            .exclusions
            .classifications
            .iter()
            .any(|c| c.to_lowercase() == entity.core.label)
    }

    fn on_commit(
        &mut self,
        entity: &mut Classification,
        row: &ClassificationRow,
        ids: &mut IdAuthority,
    ) {
        entity.add_instance(ids.take(), instance_label(row));
    }

    fn on_duplicate(
        &mut self,
        existing: &mut Classification,
        row: &ClassificationRow,
        ids: &mut IdAuthority,
    ) -> bool {
        existing.add_instance(ids.take(), instance_label(row));
        true
    }

    fn assemble(
        &self,
        entity: &Classification,
        _links: &(),
        doc: &mut Document,
        vocab: &Vocabulary,
    ) -> Result<()> {
        emit_header(doc, &entity.core, vocab);
        doc.annotate(
            &vocab.definition,
            &entity.core.iri,
            AnnotationValue::plain(entity.definition.as_str()),
        );
        emit_parent(doc, &entity.core);

        for instance in &entity.instances {
            doc.declare_individual(&instance.iri);
            doc.annotate(
                &vocab.label,
                &instance.iri,
                AnnotationValue::tagged(instance.label.as_str(), &vocab.language),
            );
            doc.class_assertion(&instance.class_iri, &instance.iri);
        }
        Ok(())
    }
}
