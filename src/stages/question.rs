use super::{emit_header, emit_parent, BuildContext, Stage};
use crate::config::{CHOICE_QUESTION_KEY, MATRIX_QUESTION_KEY, OPEN_CLASSIFICATION};
use crate::error::Result;
use crate::ids::EntityId;
use crate::models::{Classification, Component, EntityKind, Question, QuestionKind};
use crate::normalize::Collection;
use crate::owl::{AnnotationValue, ClassExpression, Document};
use crate::resolve::{resolve_iri, Referrer};
use crate::source::{QuestionRow, SourceFile};
use crate::vocabulary::Vocabulary;

/// One pass over the questions export, admitting a single question kind.
///
/// The three variants read the same file; rows of other kinds are built,
/// excluded, and still consume an identifier.
#[derive(Debug)]
pub struct QuestionStage {
    accepts: QuestionKind,
}

pub struct QuestionLinks<'a> {
    pub components: &'a Collection<Component>,
    pub classifications: &'a Collection<Classification>,
}

impl QuestionStage {
    pub fn single_choice() -> Self {
        Self {
            accepts: QuestionKind::SingleChoice,
        }
    }

    pub fn open() -> Self {
        Self {
            accepts: QuestionKind::Open,
        }
    }

    pub fn matrix() -> Self {
        Self {
            accepts: QuestionKind::Matrix,
        }
    }

    fn parent<'v>(&self, vocab: &'v Vocabulary) -> &'v str {
        match self.accepts {
            QuestionKind::Open => &vocab.parents.open_question,
            QuestionKind::Matrix => &vocab.parents.matrix_question,
            _ => &vocab.parents.single_choice_question,
        }
    }
}

impl Stage for QuestionStage {
    type Row = QuestionRow;
    type Entity = Question;
    type Links<'a> = QuestionLinks<'a>;

    const SOURCE: SourceFile = SourceFile::Questions;

    fn kind(&self) -> EntityKind {
        match self.accepts {
            QuestionKind::Open => EntityKind::OpenQuestion,
            QuestionKind::Matrix => EntityKind::MatrixQuestion,
            _ => EntityKind::SingleChoiceQuestion,
        }
    }

    fn key_columns(&self) -> &'static [&'static str] {
        match self.accepts {
            QuestionKind::Matrix => MATRIX_QUESTION_KEY,
            _ => CHOICE_QUESTION_KEY,
        }
    }

    fn construct(&mut self, row: &QuestionRow, id: EntityId, ctx: &BuildContext<'_>) -> Question {
        let classification = match self.accepts {
            QuestionKind::Open => OPEN_CLASSIFICATION.to_string(),
            _ => row.classification.clone(),
        };
        Question {
            core: ctx.core(
                id,
                Some(self.parent(ctx.vocabulary())),
                row.label.trim().to_lowercase(),
            ),
            question_kind: QuestionKind::parse(&row.question_type),
            text: row.text.trim().to_string(),
            classification,
            component: row.component.clone(),
        }
    }

    fn excluded(&self, entity: &Question, ctx: &BuildContext<'_>) -> bool {
        entity.question_kind != Some(self.accepts)
            || ctx
                .settings
                .exclusions
                .components
                .iter()
                .any(|c| *c == entity.component)
    }

    fn assemble(
        &self,
        entity: &Question,
        links: &QuestionLinks<'_>,
        doc: &mut Document,
        vocab: &Vocabulary,
    ) -> Result<()> {
        let iri = &entity.core.iri;
        emit_header(doc, &entity.core, vocab);
        doc.annotate(
            &vocab.has_question,
            iri,
            AnnotationValue::tagged(entity.text.as_str(), &vocab.language),
        );
        emit_parent(doc, &entity.core);

        let referrer = Referrer::of(self.kind(), entity);
        let component = resolve_iri(links.components, &entity.component, referrer)?;
        doc.subclass_of(
            iri,
            ClassExpression::SomeValuesFrom {
                property: vocab.relations.part_of.clone(),
                filler: component.to_string(),
            },
        );

        let classification = resolve_iri(links.classifications, &entity.classification, referrer)?;
        doc.subclass_of(
            iri,
            ClassExpression::ExactCardinality {
                cardinality: 1,
                property: vocab.relations.has_answer.clone(),
                filler: classification.to_string(),
            },
        );
        doc.subclass_of(
            classification,
            ClassExpression::ExactCardinality {
                cardinality: 1,
                property: vocab.relations.is_answer_of.clone(),
                filler: iri.clone(),
            },
        );
        Ok(())
    }
}
