//! Assertion vocabulary: every property, parent class and literal convention the
//! assemblers emit. Defaults reproduce the Comfocus ontology conventions; a
//! settings file may override any subset.

use crate::config::{CONTEXT_BASE_IRI, CREATOR_IRI, ENTITY_BASE_IRI};
use serde::{Deserialize, Serialize};

const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Prefix for minted class IRIs
    pub entity_base: String,
    pub creator: String,
    /// Language tag attached to labels and free-text literals
    pub language: String,
    pub date_time_datatype: String,
    pub label: String,
    pub creator_property: String,
    pub date_property: String,
    pub definition: String,
    pub description: String,
    pub theoretical_background: String,
    pub has_question: String,
    pub parents: ParentClasses,
    pub relations: Relations,
}

/// Fixed parent category of each entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentClasses {
    pub measure: String,
    pub quality: String,
    pub component: String,
    pub classification: String,
    pub single_choice_question: String,
    pub open_question: String,
    pub matrix_question: String,
}

/// Object properties used by cross-reference restrictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relations {
    /// Component class restricted to measures (universal)
    pub measured_by: String,
    /// Component to measure, question to component (existential)
    pub part_of: String,
    /// Quality to component (existential)
    pub quality_of: String,
    /// Question to classification (exactly one)
    pub has_answer: String,
    /// Classification to question (exactly one)
    pub is_answer_of: String,
}

fn entity(suffix: &str) -> String {
    format!("{ENTITY_BASE_IRI}{suffix}")
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            entity_base: ENTITY_BASE_IRI.to_string(),
            creator: CREATOR_IRI.to_string(),
            language: "en".to_string(),
            date_time_datatype: XSD_DATE_TIME.to_string(),
            label: "rdfs:label".to_string(),
            creator_property: "dc:creator".to_string(),
            date_property: "dc:date".to_string(),
            definition: "obo:IAO_0000115".to_string(),
            description: "dc:description".to_string(),
            theoretical_background: "#theoretical_background".to_string(),
            has_question: "#hasQuestion".to_string(),
            parents: ParentClasses::default(),
            relations: Relations::default(),
        }
    }
}

impl Default for ParentClasses {
    fn default() -> Self {
        Self {
            measure: "#OWLClass_832ab481_6bdd_49e2_86dd_6042773f6aef".to_string(),
            quality: entity("00000000000000000610"),
            component: entity("00000000000000000549"),
            classification: format!("{CONTEXT_BASE_IRI}00000000000000000002"),
            single_choice_question: entity("00000000000000000388"),
            open_question: entity("00000000000000000358"),
            matrix_question: entity("00000000000000000533"),
        }
    }
}

impl Default for Relations {
    fn default() -> Self {
        Self {
            measured_by: entity("00000000000000000333"),
            part_of: entity("00000000000000000350"),
            quality_of: "#OWLObjectProperty_aebfc327_8e90_47ec_afa4_23b12c522631".to_string(),
            has_answer: entity("00000000000000000362"),
            is_answer_of: entity("00000000000000000543"),
        }
    }
}
