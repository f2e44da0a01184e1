use super::{emit_header, BuildContext, Stage};
use crate::config::STATEMENT_KEY;
use crate::error::Result;
use crate::ids::EntityId;
use crate::models::{EntityKind, Question, Statement};
use crate::normalize::Collection;
use crate::owl::{AnnotationValue, ClassExpression, Document};
use crate::resolve::{resolve_iri, Referrer};
use crate::source::{ItemRow, SourceFile};
use crate::vocabulary::Vocabulary;
use rustc_hash::FxHashMap;

/// Matrix statements. Labels number the items of each question from 1 in row
/// order; the counter is keyed by the raw question name.
#[derive(Debug, Default)]
pub struct StatementStage {
    counters: FxHashMap<String, u32>,
}

pub struct StatementLinks<'a> {
    pub questions: &'a Collection<Question>,
}

impl StatementStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for StatementStage {
    type Row = ItemRow;
    type Entity = Statement;
    type Links<'a> = StatementLinks<'a>;

    const SOURCE: SourceFile = SourceFile::Items;

    fn kind(&self) -> EntityKind {
        EntityKind::Statement
    }

    fn key_columns(&self) -> &'static [&'static str] {
        STATEMENT_KEY
    }

    fn construct(&mut self, row: &ItemRow, id: EntityId, ctx: &BuildContext<'_>) -> Statement {
        let counter = self.counters.entry(row.question.clone()).or_insert(0);
        *counter += 1;
        let label = format!("{}_{}", row.question.trim().to_lowercase(), counter);
        Statement {
            core: ctx.core(id, None, label),
            description: row.item.trim().to_string(),
            question: row.question.clone(),
            component: row.component.clone(),
        }
    }

    fn excluded(&self, entity: &Statement, ctx: &BuildContext<'_>) -> bool {
        ctx.settings
            .exclusions
            .components
            .iter()
            .any(|c| *c == entity.component)
    }

    fn assemble(
        &self,
        entity: &Statement,
        links: &StatementLinks<'_>,
        doc: &mut Document,
        vocab: &Vocabulary,
    ) -> Result<()> {
        let iri = &entity.core.iri;
        emit_header(doc, &entity.core, vocab);
        doc.annotate(
            &vocab.description,
            iri,
            AnnotationValue::plain(entity.description.as_str()),
        );

        let referrer = Referrer::of(self.kind(), entity);
        let question = resolve_iri(links.questions, &entity.question, referrer)?;
        doc.subclass_of(iri, ClassExpression::Class(question.to_string()));
        Ok(())
    }

    /// One disjointness axiom per question, listing its statements in
    /// emission order. Questions appear in first-seen order.
    fn finish(&self, emitted: &[&Statement], doc: &mut Document, _vocab: &Vocabulary) {
        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();

        for statement in emitted {
            let slot = *index.entry(statement.question.as_str()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(statement.core.iri.clone());
        }

        for group in groups {
            doc.disjoint(group);
        }
    }
}
