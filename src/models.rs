use crate::ids::EntityId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

/// Closed set of entity kinds, one per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Measure,
    Quality,
    Component,
    Classification,
    SingleChoiceQuestion,
    OpenQuestion,
    MatrixQuestion,
    Statement,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Measure => "measure",
            EntityKind::Quality => "quality",
            EntityKind::Component => "component",
            EntityKind::Classification => "classification",
            EntityKind::SingleChoiceQuestion => "single-choice question",
            EntityKind::OpenQuestion => "open question",
            EntityKind::MatrixQuestion => "matrix question",
            EntityKind::Statement => "matrix statement",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Question type tag from the `Question` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Bipolar,
    Matrix,
    MultipleChoice,
    Open,
    SingleChoice,
}

impl QuestionKind {
    /// Exact match on the export's spelling; anything else is unknown.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Bipolar" => Some(QuestionKind::Bipolar),
            "Matrix" => Some(QuestionKind::Matrix),
            "Multiple choice" => Some(QuestionKind::MultipleChoice),
            "Open" => Some(QuestionKind::Open),
            "Single choice" => Some(QuestionKind::SingleChoice),
            _ => None,
        }
    }
}

/// Source of `created_at` stamps. Pinned in tests and with `--timestamp`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Fields shared by every class-level entity.
#[derive(Debug, Clone)]
pub struct EntityCore {
    pub id: EntityId,
    pub iri: String,
    /// `None` for statements, which are parented to their question at assembly
    pub parent_iri: Option<String>,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub emitted: bool,
}

impl EntityCore {
    pub fn new(
        id: EntityId,
        entity_base: &str,
        parent_iri: Option<&str>,
        label: String,
        clock: &Clock,
    ) -> Self {
        Self {
            id,
            iri: id.iri(entity_base),
            parent_iri: parent_iri.map(str::to_string),
            label,
            created_at: clock.now(),
            emitted: false,
        }
    }

    /// `xsd:dateTime` lexical form, second precision, `Z` suffix.
    pub fn date_literal(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Access to the shared core of an entity record.
pub trait Entity {
    fn core(&self) -> &EntityCore;
    fn core_mut(&mut self) -> &mut EntityCore;

    fn iri(&self) -> &str {
        &self.core().iri
    }

    fn label(&self) -> &str {
        &self.core().label
    }
}

macro_rules! impl_entity {
    ($($ty:ty),+ $(,)?) => {
        $(impl Entity for $ty {
            fn core(&self) -> &EntityCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut EntityCore {
                &mut self.core
            }
        })+
    };
}

#[derive(Debug, Clone)]
pub struct Measure {
    pub core: EntityCore,
}

#[derive(Debug, Clone)]
pub struct Quality {
    pub core: EntityCore,
    pub measure: String,
}

#[derive(Debug, Clone)]
pub struct Component {
    pub core: EntityCore,
    pub theoretical_background: String,
    pub definition: String,
    pub measure: String,
    pub quality: String,
}

/// Named individual belonging to exactly one [`Classification`].
#[derive(Debug, Clone)]
pub struct Instance {
    pub id: EntityId,
    pub iri: String,
    pub class_iri: String,
    pub label: String,
}

impl Instance {
    pub fn new(id: EntityId, label: String, class_iri: &str) -> Self {
        Self {
            id,
            iri: id.individual_iri(),
            class_iri: class_iri.to_string(),
            label,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub core: EntityCore,
    pub definition: String,
    pub instances: Vec<Instance>,
}

impl Classification {
    pub fn add_instance(&mut self, id: EntityId, label: String) {
        let instance = Instance::new(id, label, &self.core.iri);
        self.instances.push(instance);
    }
}

#[derive(Debug, Clone)]
pub struct Question {
    pub core: EntityCore,
    /// `None` when the `Question` column holds an unknown tag
    pub question_kind: Option<QuestionKind>,
    pub text: String,
    /// Raw `Linked classification ID`, resolved at assembly
    pub classification: String,
    /// Raw `ComponentId`, resolved at assembly
    pub component: String,
}

/// One item of a matrix question.
#[derive(Debug, Clone)]
pub struct Statement {
    pub core: EntityCore,
    pub description: String,
    /// Raw `Question name`, resolved at assembly
    pub question: String,
    pub component: String,
}

impl_entity!(Measure, Quality, Component, Classification, Question, Statement);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENTITY_BASE_IRI;
    use crate::ids::IdAuthority;
    use chrono::TimeZone;

    fn fixed_clock() -> Clock {
        Clock::Fixed(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
    }

    #[test]
    fn question_kind_parses_known_tags() {
        assert_eq!(QuestionKind::parse("Single choice"), Some(QuestionKind::SingleChoice));
        assert_eq!(QuestionKind::parse("Matrix"), Some(QuestionKind::Matrix));
        assert_eq!(QuestionKind::parse("Open"), Some(QuestionKind::Open));
        assert_eq!(QuestionKind::parse("Multiple choice"), Some(QuestionKind::MultipleChoice));
        assert_eq!(QuestionKind::parse("Bipolar"), Some(QuestionKind::Bipolar));
    }

    #[test]
    fn question_kind_is_case_sensitive() {
        assert_eq!(QuestionKind::parse("single choice"), None);
        assert_eq!(QuestionKind::parse(" Open"), None);
        assert_eq!(QuestionKind::parse(""), None);
    }

    #[test]
    fn core_derives_iri_from_id() {
        let ids = IdAuthority::new(702);
        let core = EntityCore::new(
            ids.peek(),
            ENTITY_BASE_IRI,
            Some("#Parent"),
            "x".into(),
            &fixed_clock(),
        );
        assert_eq!(core.iri, format!("{ENTITY_BASE_IRI}00000000000000000702"));
        assert_eq!(core.parent_iri.as_deref(), Some("#Parent"));
        assert!(!core.emitted);
    }

    #[test]
    fn date_literal_uses_z_suffix() {
        let ids = IdAuthority::default();
        let core =
            EntityCore::new(ids.peek(), ENTITY_BASE_IRI, None, "x".into(), &fixed_clock());
        assert_eq!(core.date_literal(), "2024-03-01T09:30:00Z");
    }

    #[test]
    fn instances_point_at_owning_classification() {
        let mut ids = IdAuthority::default();
        let core = EntityCore::new(
            ids.take(),
            ENTITY_BASE_IRI,
            None,
            "sleep".into(),
            &fixed_clock(),
        );
        let mut classification = Classification {
            core,
            definition: String::new(),
            instances: Vec::new(),
        };
        classification.add_instance(ids.take(), "never".into());
        classification.add_instance(ids.take(), "often".into());

        assert_eq!(classification.instances.len(), 2);
        assert_eq!(classification.instances[0].iri, "#OWLNamedIndividual_702");
        assert_eq!(classification.instances[1].iri, "#OWLNamedIndividual_703");
        assert!(classification
            .instances
            .iter()
            .all(|i| i.class_iri == classification.core.iri));
    }
}
