use crate::error::Result;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// First identifier handed out by the [`IdAuthority`](crate::ids::IdAuthority)
pub const SEED_ID: u64 = 701;

/// Width of the zero-padded numeric suffix in entity IRIs
pub const IRI_ID_WIDTH: usize = 20;

/// Prefix of every class IRI minted by the compiler
pub const ENTITY_BASE_IRI: &str =
    "http://www.semanticweb.org/bkorousicseljak/ontologies/2023/5/Comfocus_v1/COMFOCUS_";

/// Prefix of class IRIs that live in the context ontology
pub const CONTEXT_BASE_IRI: &str =
    "http://www.semanticweb.org/bkorousicseljak/ontologies/2023/5/Comfocus_Contextv4#COMFOCUS_";

/// Prefix of named individual IRIs (classification instances)
pub const INDIVIDUAL_BASE_IRI: &str = "#OWLNamedIndividual_";

/// Recorded as `dc:creator` on every declared class
pub const CREATOR_IRI: &str = "http://orcid.org/0000-0001-7597-2590";

pub const ONTOLOGY_IRI: &str =
    "http://www.semanticweb.org/bkorousicseljak/ontologies/2023/5/Comfocus_Contextv4";

pub const VERSION_IRI: &str =
    "http://www.semanticweb.org/bkorousicseljak/ontologies/2023/5/Comfocus_v1/1.0.1";

/// Default source file names, resolved against `--input-dir`
pub const METADATA_FILE: &str = "harmonised_component_metadata.csv";
pub const CLASSIFICATION_FILE: &str = "classifications.csv";
pub const QUESTIONS_FILE: &str = "harmonised_components.csv";
pub const ITEMS_FILE: &str = "items.csv";
pub const OUTPUT_FILE: &str = "ontology.owl";

/// Natural key columns, one list per stage
pub const MEASURE_KEY: &[&str] = &["Harmonised measure"];
pub const QUALITY_KEY: &[&str] = &["Quality"];
pub const COMPONENT_KEY: &[&str] = &["ID"];
pub const CLASSIFICATION_KEY: &[&str] = &["ID"];
pub const CHOICE_QUESTION_KEY: &[&str] = &[
    "Annotation: Label",
    "Annotation: hadQuestion",
    "Linked classification ID",
];
pub const MATRIX_QUESTION_KEY: &[&str] = &["Annotation: Label"];
pub const STATEMENT_KEY: &[&str] = &["Question name", "Item name", "Item label"];

/// Measures that are never imported
pub const EXCLUDED_MEASURES: &[&str] = &["InformedConsent"];

/// Components whose questions and statements are never imported
pub const EXCLUDED_COMPONENTS: &[&str] = &["209"];

/// Classification every open question links to
pub const OPEN_CLASSIFICATION: &str = "open";

/// Run settings. Every field is optional in the JSON file and falls back to
/// the constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub seed: u64,
    pub exclusions: Exclusions,
    pub vocabulary: Vocabulary,
    pub header: OntologyHeader,
}

/// Kind-specific "do not import" values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    /// Measure labels; also drops qualities and components of these measures
    pub measures: Vec<String>,
    /// Classification labels (compared after lower-casing)
    pub classifications: Vec<String>,
    /// Component ids whose questions and statements are dropped
    pub components: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefix {
    pub name: String,
    pub iri: String,
}

/// Root element attributes and prefix table of the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OntologyHeader {
    pub ontology_iri: String,
    pub version_iri: String,
    pub prefixes: Vec<Prefix>,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: SEED_ID,
            exclusions: Exclusions::default(),
            vocabulary: Vocabulary::default(),
            header: OntologyHeader::default(),
        }
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            measures: owned(EXCLUDED_MEASURES),
            classifications: Vec::new(),
            components: owned(EXCLUDED_COMPONENTS),
        }
    }
}

impl Default for OntologyHeader {
    fn default() -> Self {
        let base = format!("{ONTOLOGY_IRI}#");
        let prefixes = [
            ("", base.as_str()),
            ("dc", "http://purl.org/dc/elements/1.1/"),
            ("obo", "http://purl.obolibrary.org/obo/"),
            ("owl", "http://www.w3.org/2002/07/owl#"),
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("xml", "http://www.w3.org/XML/1998/namespace"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
            ("foaf", "http://xmlns.com/foaf/0.1/"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("terms", "http://purl.org/dc/terms/"),
            ("schema", "https://schema.org/"),
            (
                "OntoV24",
                "http://www.semanticweb.org/clarisse/ontologies/2023/5/OntoV24#",
            ),
            ("oboInOwl", "http://www.geneontology.org/formats/oboInOwl#"),
            ("Comfocus_Contextv4", base.as_str()),
        ];
        Self {
            ontology_iri: ONTOLOGY_IRI.to_string(),
            version_iri: VERSION_IRI.to_string(),
            prefixes: prefixes
                .iter()
                .map(|(name, iri)| Prefix {
                    name: name.to_string(),
                    iri: iri.to_string(),
                })
                .collect(),
        }
    }
}
