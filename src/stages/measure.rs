use super::{emit_header, emit_parent, BuildContext, Stage};
use crate::config::MEASURE_KEY;
use crate::error::Result;
use crate::ids::EntityId;
use crate::models::{EntityKind, Measure};
use crate::owl::{ClassExpression, Document};
use crate::source::{MetadataRow, SourceFile};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Default)]
pub struct MeasureStage;

impl Stage for MeasureStage {
    type Row = MetadataRow;
    type Entity = Measure;
    type Links<'a> = ();

    const SOURCE: SourceFile = SourceFile::Metadata;

    fn kind(&self) -> EntityKind {
        EntityKind::Measure
    }

    fn key_columns(&self) -> &'static [&'static str] {
        MEASURE_KEY
    }

    fn construct(&mut self, row: &MetadataRow, id: EntityId, ctx: &BuildContext<'_>) -> Measure {
        let parent = &ctx.vocabulary().parents.measure;
        Measure {
            core: ctx.core(id, Some(parent), row.measure.trim().to_string()),
        }
    }

    fn excluded(&self, entity: &Measure, ctx: &BuildContext<'_>) -> bool {
        ctx.settings
            .exclusions
            .measures
            .iter()
            .any(|m| *m == entity.core.label)
    }

    fn assemble(
        &self,
        entity: &Measure,
        _links: &(),
        doc: &mut Document,
        vocab: &Vocabulary,
    ) -> Result<()> {
        emit_header(doc, &entity.core, vocab);
        emit_parent(doc, &entity.core);
        // every component class only measures harmonised measures
        doc.subclass_of(
            &vocab.parents.component,
            ClassExpression::AllValuesFrom {
                property: vocab.relations.measured_by.clone(),
                filler: entity.core.iri.clone(),
            },
        );
        Ok(())
    }
}
