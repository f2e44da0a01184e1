use super::{emit_header, emit_parent, BuildContext, Stage};
use crate::config::QUALITY_KEY;
use crate::error::Result;
use crate::ids::EntityId;
use crate::models::{EntityKind, Quality};
use crate::owl::Document;
use crate::source::{MetadataRow, SourceFile};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Default)]
pub struct QualityStage;

impl Stage for QualityStage {
    type Row = MetadataRow;
    type Entity = Quality;
    type Links<'a> = ();

    const SOURCE: SourceFile = SourceFile::Metadata;

    fn kind(&self) -> EntityKind {
        EntityKind::Quality
    }

    fn key_columns(&self) -> &'static [&'static str] {
        QUALITY_KEY
    }

    fn construct(&mut self, row: &MetadataRow, id: EntityId, ctx: &BuildContext<'_>) -> Quality {
        let parent = &ctx.vocabulary().parents.quality;
        Quality {
            core: ctx.core(id, Some(parent), row.quality.trim().to_lowercase()),
            measure: row.measure.trim().to_string(),
        }
    }

    fn excluded(&self, entity: &Quality, ctx: &BuildContext<'_>) -> bool {
        ctx.settings
            .exclusions
            .measures
            .iter()
            .any(|m| *m == entity.measure)
    }

    fn assemble(
        &self,
        entity: &Quality,
        _links: &(),
        doc: &mut Document,
        vocab: &Vocabulary,
    ) -> Result<()> {
        emit_header(doc, &entity.core, vocab);
        emit_parent(doc, &entity.core);
        Ok(())
    }
}
