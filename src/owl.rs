//! In-memory ontology document: an ordered list of OWL axioms under a fixed
//! header. Assemblers only append; the sink serializes once at the end.

use crate::config::OntologyHeader;

/// Declared entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Class(String),
    NamedIndividual(String),
}

/// Value of an annotation assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    Literal {
        text: String,
        lang: Option<String>,
        datatype: Option<String>,
    },
    Iri(String),
}

impl AnnotationValue {
    pub fn plain(text: impl Into<String>) -> Self {
        AnnotationValue::Literal {
            text: text.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn tagged(text: impl Into<String>, lang: &str) -> Self {
        AnnotationValue::Literal {
            text: text.into(),
            lang: Some(lang.to_string()),
            datatype: None,
        }
    }

    pub fn typed(text: impl Into<String>, datatype: &str) -> Self {
        AnnotationValue::Literal {
            text: text.into(),
            lang: None,
            datatype: Some(datatype.to_string()),
        }
    }
}

/// Right-hand side of a `SubClassOf` axiom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassExpression {
    Class(String),
    SomeValuesFrom { property: String, filler: String },
    AllValuesFrom { property: String, filler: String },
    ExactCardinality {
        cardinality: u32,
        property: String,
        filler: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axiom {
    Declaration(Declaration),
    AnnotationAssertion {
        property: String,
        subject: String,
        value: AnnotationValue,
    },
    SubClassOf {
        sub: String,
        sup: ClassExpression,
    },
    DisjointClasses(Vec<String>),
    ClassAssertion {
        class: String,
        individual: String,
    },
}

#[derive(Debug, Clone)]
pub struct Document {
    pub header: OntologyHeader,
    axioms: Vec<Axiom>,
}

impl Document {
    pub fn new(header: OntologyHeader) -> Self {
        Self {
            header,
            axioms: Vec::new(),
        }
    }

    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    pub fn push(&mut self, axiom: Axiom) {
        self.axioms.push(axiom);
    }

    pub fn declare_class(&mut self, iri: &str) {
        self.push(Axiom::Declaration(Declaration::Class(iri.to_string())));
    }

    pub fn declare_individual(&mut self, iri: &str) {
        self.push(Axiom::Declaration(Declaration::NamedIndividual(
            iri.to_string(),
        )));
    }

    pub fn annotate(&mut self, property: &str, subject: &str, value: AnnotationValue) {
        self.push(Axiom::AnnotationAssertion {
            property: property.to_string(),
            subject: subject.to_string(),
            value,
        });
    }

    pub fn subclass_of(&mut self, sub: &str, sup: ClassExpression) {
        self.push(Axiom::SubClassOf {
            sub: sub.to_string(),
            sup,
        });
    }

    pub fn disjoint(&mut self, classes: Vec<String>) {
        self.push(Axiom::DisjointClasses(classes));
    }

    pub fn class_assertion(&mut self, class: &str, individual: &str) {
        self.push(Axiom::ClassAssertion {
            class: class.to_string(),
            individual: individual.to_string(),
        });
    }
}
