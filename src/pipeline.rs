//! Drives the stages in their fixed order and hands the finished document to
//! a sink.
//!
//! Order: measures, qualities, components, classifications, single-choice
//! questions, open questions, matrix questions, matrix statements. Each stage
//! is normalized and then assembled before the next one starts, and later
//! stages resolve their references against the collections built earlier.

use crate::config::Settings;
use crate::error::Result;
use crate::ids::IdAuthority;
use crate::models::Clock;
use crate::normalize::{normalize, Collection};
use crate::owl::Document;
use crate::source::{
    ClassificationRow, ItemRow, MetadataRow, QuestionRow, Row, RowSource, SourceFile,
};
use crate::stages::{
    assemble, BuildContext, ClassificationStage, ComponentLinks, ComponentStage, MeasureStage,
    QualityStage, QuestionLinks, QuestionStage, Stage, StatementLinks, StatementStage,
};
use crate::stats::{CompileStats, StageStats};
use crate::writer::DocumentSink;
use indicatif::ProgressBar;
use std::time::Instant;
use tracing::info;

/// Number of stages a run goes through, for sizing progress bars.
pub const STAGE_COUNT: u64 = 8;

/// Result of a run that has not been persisted yet.
#[derive(Debug)]
pub struct Compiled {
    pub document: Document,
    pub stats: CompileStats,
}

struct Run<'a> {
    ctx: BuildContext<'a>,
    ids: IdAuthority,
    doc: Document,
    stats: CompileStats,
    progress: &'a ProgressBar,
}

impl Run<'_> {
    fn stage<S: Stage>(
        &mut self,
        mut stage: S,
        rows: &[Row<S::Row>],
        links: &S::Links<'_>,
    ) -> Result<Collection<S::Entity>> {
        let kind = stage.kind();
        self.progress.set_message(kind.name());

        let mut stage_stats = StageStats::default();
        let normalized = normalize(&mut stage, rows, &self.ctx, &mut self.ids, &mut stage_stats);
        let mut collection = match normalized {
            Ok(collection) => collection,
            Err(e) => {
                self.stats.record(kind, stage_stats);
                return Err(e);
            }
        };

        let vocab = self.ctx.vocabulary();
        let assembled = assemble(
            &stage,
            &mut collection,
            links,
            &mut self.doc,
            vocab,
            &mut stage_stats,
        );
        self.stats.record(kind, stage_stats);
        assembled?;

        self.progress.inc(1);
        Ok(collection)
    }
}

/// Builds the whole document from `source` without persisting it.
pub fn run<R: RowSource>(
    source: &R,
    settings: &Settings,
    clock: Clock,
    progress: &ProgressBar,
) -> Result<Compiled> {
    let started = Instant::now();
    progress.set_length(STAGE_COUNT);

    let mut run = Run {
        ctx: BuildContext::new(settings, clock),
        ids: IdAuthority::new(settings.seed),
        doc: Document::new(settings.header.clone()),
        stats: CompileStats::new(),
        progress,
    };

    let metadata: Vec<Row<MetadataRow>> = source.rows(SourceFile::Metadata)?;
    let measures = run.stage(MeasureStage, &metadata, &())?;
    let qualities = run.stage(QualityStage, &metadata, &())?;
    let components = run.stage(
        ComponentStage,
        &metadata,
        &ComponentLinks {
            measures: &measures,
            qualities: &qualities,
        },
    )?;

    let classification_rows: Vec<Row<ClassificationRow>> =
        source.rows(SourceFile::Classifications)?;
    let classifications = run.stage(ClassificationStage, &classification_rows, &())?;

    let question_rows: Vec<Row<QuestionRow>> = source.rows(SourceFile::Questions)?;
    let question_links = QuestionLinks {
        components: &components,
        classifications: &classifications,
    };
    run.stage(QuestionStage::single_choice(), &question_rows, &question_links)?;
    run.stage(QuestionStage::open(), &question_rows, &question_links)?;
    let matrix_questions = run.stage(QuestionStage::matrix(), &question_rows, &question_links)?;

    let item_rows: Vec<Row<ItemRow>> = source.rows(SourceFile::Items)?;
    run.stage(
        StatementStage::new(),
        &item_rows,
        &StatementLinks {
            questions: &matrix_questions,
        },
    )?;

    progress.finish_and_clear();
    info!(
        entities = run.stats.committed(),
        axioms = run.doc.len(),
        next_id = run.ids.peek().value(),
        duration_secs = started.elapsed().as_secs_f64(),
        "Document assembled"
    );

    Ok(Compiled {
        document: run.doc,
        stats: run.stats,
    })
}

/// Builds the document and persists it through `sink`.
pub fn compile<R: RowSource, K: DocumentSink>(
    source: &R,
    sink: &mut K,
    settings: &Settings,
    clock: Clock,
    progress: &ProgressBar,
) -> Result<CompileStats> {
    let compiled = run(source, settings, clock, progress)?;
    sink.persist(&compiled.document)?;
    Ok(compiled.stats)
}
