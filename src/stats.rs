use crate::models::EntityKind;
use serde::Serialize;

/// Counters for one stage of a compile run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageStats {
    /// Source rows read by the stage.
    pub rows: u64,
    /// Entities admitted into the collection.
    pub committed: u64,
    /// Rows whose key was already committed and which were ignored.
    pub duplicates: u64,
    /// Rows whose key was already committed and which were folded into the
    /// existing entity, such as extra classification instances.
    pub merged: u64,
    pub excluded: u64,
    pub axioms: usize,
}

/// Statistics for a whole run, one entry per stage in execution order.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CompileStats {
    pub stages: Vec<(EntityKind, StageStats)>,
}

impl CompileStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: EntityKind, stats: StageStats) {
        self.stages.push((kind, stats));
    }

    pub fn stage(&self, kind: EntityKind) -> Option<&StageStats> {
        self.stages
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s)
    }

    pub fn committed(&self) -> u64 {
        self.stages.iter().map(|(_, s)| s.committed).sum()
    }

    pub fn duplicates(&self) -> u64 {
        self.stages.iter().map(|(_, s)| s.duplicates).sum()
    }

    pub fn excluded(&self) -> u64 {
        self.stages.iter().map(|(_, s)| s.excluded).sum()
    }

    pub fn instances(&self) -> u64 {
        self.stages.iter().map(|(_, s)| s.merged).sum()
    }

    pub fn axioms(&self) -> usize {
        self.stages.iter().map(|(_, s)| s.axioms).sum()
    }

    /// Renders the per-stage table and totals printed after a run.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<24} {:>7} {:>9} {:>10} {:>7} {:>8} {:>7}\n",
            "Stage", "Rows", "Committed", "Duplicates", "Merged", "Excluded", "Axioms"
        ));
        for (kind, s) in &self.stages {
            out.push_str(&format!(
                "{:<24} {:>7} {:>9} {:>10} {:>7} {:>8} {:>7}\n",
                kind.name(),
                s.rows,
                s.committed,
                s.duplicates,
                s.merged,
                s.excluded,
                s.axioms
            ));
        }
        out.push('\n');
        out.push_str(&format!("Entities committed: {}\n", self.committed()));
        out.push_str(&format!("Duplicates ignored: {}\n", self.duplicates()));
        out.push_str(&format!("Entities excluded:  {}\n", self.excluded()));
        out.push_str(&format!("Instances merged:   {}\n", self.instances()));
        out.push_str(&format!("Axioms emitted:     {}\n", self.axioms()));
        out
    }
}
