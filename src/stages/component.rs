use super::{emit_header, emit_parent, BuildContext, Stage};
use crate::config::COMPONENT_KEY;
use crate::error::Result;
use crate::ids::EntityId;
use crate::models::{Component, EntityKind, Measure, Quality};
use crate::normalize::Collection;
use crate::owl::{AnnotationValue, ClassExpression, Document};
use crate::resolve::{resolve_iri, Referrer};
use crate::source::{MetadataRow, SourceFile};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Default)]
pub struct ComponentStage;

pub struct ComponentLinks<'a> {
    pub measures: &'a Collection<Measure>,
    pub qualities: &'a Collection<Quality>,
}

impl Stage for ComponentStage {
    type Row = MetadataRow;
    type Entity = Component;
    type Links<'a> = ComponentLinks<'a>;

    const SOURCE: SourceFile = SourceFile::Metadata;

    fn kind(&self) -> EntityKind {
        EntityKind::Component
    }

    fn key_columns(&self) -> &'static [&'static str] {
        COMPONENT_KEY
    }

    fn construct(
        &mut self,
        row: &MetadataRow,
        id: EntityId,
        ctx: &BuildContext<'_>,
    ) -> Component {
        let parent = &ctx.vocabulary().parents.component;
        Component {
            core: ctx.core(id, Some(parent), row.component.trim().to_string()),
            theoretical_background: row.theoretical_background.trim().to_string(),
            definition: row.definition.trim().to_string(),
            measure: row.measure.trim().to_string(),
            quality: row.quality.trim().to_string(),
        }
    }

    fn excluded(&self, entity: &Component, ctx: &BuildContext<'_>) -> bool {
        ctx.settings
            .exclusions
            .measures
            .iter()
            .any(|m| *m == entity.measure)
    }

    fn assemble(
        &self,
        entity: &Component,
        links: &ComponentLinks<'_>,
        doc: &mut Document,
        vocab: &Vocabulary,
    ) -> Result<()> {
        let iri = &entity.core.iri;
        emit_header(doc, &entity.core, vocab);
        doc.annotate(
            &vocab.theoretical_background,
            iri,
            AnnotationValue::tagged(entity.theoretical_background.as_str(), &vocab.language),
        );
        doc.annotate(
            &vocab.definition,
            iri,
            AnnotationValue::plain(entity.definition.as_str()),
        );
        emit_parent(doc, &entity.core);

        let referrer = Referrer::of(self.kind(), entity);
        let measure = resolve_iri(links.measures, &entity.measure, referrer)?;
        doc.subclass_of(
            iri,
            ClassExpression::SomeValuesFrom {
                property: vocab.relations.part_of.clone(),
                filler: measure.to_string(),
            },
        );

        let quality = resolve_iri(links.qualities, &entity.quality, referrer)?;
        doc.subclass_of(
            quality,
            ClassExpression::SomeValuesFrom {
                property: vocab.relations.quality_of.clone(),
                filler: iri.clone(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::ids::IdAuthority;
    use crate::normalize::normalize;
    use crate::owl::Axiom;
    use crate::stages::{assemble, test_support::*, MeasureStage, QualityStage};
    use crate::stats::StageStats;

    const HEADER: &str = "Harmonised measure,Quality,ID,harmonised questionare Component,\
                          Theoretical background,Definition\n";

    struct Built {
        measures: Collection<Measure>,
        qualities: Collection<Quality>,
        components: Collection<Component>,
    }

    fn build(csv: &str) -> Built {
        let settings = settings();
        let ctx = ctx(&settings);
        let rows = rows::<MetadataRow>(csv);
        let mut ids = IdAuthority::default();
        let mut stats = StageStats::default();
        Built {
            measures: normalize(&mut MeasureStage, &rows, &ctx, &mut ids, &mut stats).unwrap(),
            qualities: normalize(&mut QualityStage, &rows, &ctx, &mut ids, &mut stats).unwrap(),
            components: normalize(&mut ComponentStage, &rows, &ctx, &mut ids, &mut stats).unwrap(),
        }
    }

    #[test]
    fn ids_continue_across_stages() {
        let built = build(&format!(
            "{HEADER}Stress,Intensity,C1,Perceived stress,Lazarus,How stressed\n\
             Sleep,Duration,C2,Sleep length,None,Hours\n"
        ));
        let measure_ids: Vec<u64> = built
            .measures
            .values()
            .map(|m| m.core.id.value())
            .collect();
        let quality_ids: Vec<u64> = built
            .qualities
            .values()
            .map(|q| q.core.id.value())
            .collect();
        let component_ids: Vec<u64> = built
            .components
            .values()
            .map(|c| c.core.id.value())
            .collect();
        assert_eq!(measure_ids, vec![701, 702]);
        assert_eq!(quality_ids, vec![703, 704]);
        assert_eq!(component_ids, vec![705, 706]);
    }

    #[test]
    fn emits_literals_then_parent_then_references() {
        let mut built = build(&format!(
            "{HEADER}Stress,Intensity,C1,Perceived stress,Lazarus,How stressed\n"
        ));
        let settings = settings();
        let vocab = &settings.vocabulary;
        let mut doc = document();
        let mut stats = StageStats::default();
        let links = ComponentLinks {
            measures: &built.measures,
            qualities: &built.qualities,
        };

        assemble(
            &ComponentStage,
            &mut built.components,
            &links,
            &mut doc,
            vocab,
            &mut stats,
        )
        .unwrap();

        let component = built.components.get("C1").unwrap();
        let measure_iri = &built.measures.get("Stress").unwrap().core.iri;
        let quality_iri = &built.qualities.get("Intensity").unwrap().core.iri;
        let axioms = doc.axioms();
        assert_eq!(axioms.len(), 9);
        assert!(matches!(
            &axioms[4],
            Axiom::AnnotationAssertion { property, .. } if property == "#theoretical_background"
        ));
        assert!(matches!(
            &axioms[5],
            Axiom::AnnotationAssertion { property, .. } if property == "obo:IAO_0000115"
        ));
        assert_eq!(
            subclass_targets(&doc, &component.core.iri),
            vec![
                &ClassExpression::Class(vocab.parents.component.clone()),
                &ClassExpression::SomeValuesFrom {
                    property: vocab.relations.part_of.clone(),
                    filler: measure_iri.clone(),
                },
            ]
        );
        assert_eq!(
            subclass_targets(&doc, quality_iri),
            vec![&ClassExpression::SomeValuesFrom {
                property: vocab.relations.quality_of.clone(),
                filler: component.core.iri.clone(),
            }]
        );
    }

    #[test]
    fn unknown_measure_fails_at_assembly_not_normalization() {
        let settings = settings();
        let ctx = ctx(&settings);
        let mut ids = IdAuthority::default();
        let mut stats = StageStats::default();
        let measure_rows = rows::<MetadataRow>(&format!("{HEADER}Stress,Intensity,C0,x,tb,d\n"));
        let component_rows = rows::<MetadataRow>(
            &format!("{HEADER}Anxiety,Intensity,C1,Worry,tb,d\n"),
        );

        let measures = normalize(
            &mut MeasureStage,
            &measure_rows,
            &ctx,
            &mut ids,
            &mut stats,
        )
        .unwrap();
        let qualities = normalize(
            &mut QualityStage,
            &measure_rows,
            &ctx,
            &mut ids,
            &mut stats,
        )
        .unwrap();
        let mut components = normalize(
            &mut ComponentStage,
            &component_rows,
            &ctx,
            &mut ids,
            &mut stats,
        )
        .unwrap();
        assert_eq!(components.len(), 1);

        let mut doc = document();
        let links = ComponentLinks {
            measures: &measures,
            qualities: &qualities,
        };
        let err = assemble(
            &ComponentStage,
            &mut components,
            &links,
            &mut doc,
            &settings.vocabulary,
            &mut stats,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CompileError::Reference {
                stage: EntityKind::Component,
                target: EntityKind::Measure,
                ref key,
                ..
            } if key == "Anxiety"
        ));
        // header, literals and parent were appended before the failure
        assert_eq!(doc.len(), 7);
        assert!(!components.get("C1").unwrap().core.emitted);
    }
}
