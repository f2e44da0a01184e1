//! OWL/XML serialization of a finished [`Document`].
//!
//! The output mirrors what Protégé writes for this ontology: an `Ontology`
//! root carrying the namespace and IRI attributes, one `Prefix` per prefix
//! table entry, then every axiom in emission order.

use crate::config::Prefix;
use crate::error::{CompileError, Result};
use crate::owl::{AnnotationValue, Axiom, ClassExpression, Declaration, Document};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// Terminal step of a run: persists the assembled document somewhere.
pub trait DocumentSink {
    fn persist(&mut self, doc: &Document) -> Result<()>;
}

/// Writes the document as OWL/XML to a file, replacing it atomically.
#[derive(Debug, Clone)]
pub struct OwlXmlSink {
    path: PathBuf,
}

impl OwlXmlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_and_replace(&self, doc: &Document, tmp_path: &Path) -> Result<()> {
        let file = File::create(tmp_path)?;
        let mut out = BufWriter::new(file);
        write_owl_xml(doc, &mut out)?;
        out.flush()?;
        drop(out);
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

impl DocumentSink for OwlXmlSink {
    fn persist(&mut self, doc: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path();
        if let Err(e) = self.write_and_replace(doc, &tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        info!(
            path = %self.path.display(),
            axioms = doc.len(),
            "Ontology written"
        );
        Ok(())
    }
}

/// Serializes `doc` as indented OWL/XML into `out`.
pub fn write_owl_xml<W: Write>(doc: &Document, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let header = &doc.header;
    let root = BytesStart::new("Ontology").with_attributes([
        ("xmlns", OWL_NAMESPACE),
        ("xml:base", header.ontology_iri.as_str()),
        ("xmlns:rdf", RDF_NAMESPACE),
        ("xmlns:xml", XML_NAMESPACE),
        ("xmlns:xsd", XSD_NAMESPACE),
        ("xmlns:rdfs", RDFS_NAMESPACE),
        ("ontologyIRI", header.ontology_iri.as_str()),
        ("versionIRI", header.version_iri.as_str()),
    ]);
    writer.write_event(Event::Start(root))?;

    for prefix in &header.prefixes {
        writer
            .create_element("Prefix")
            .with_attributes([("name", prefix.name.as_str()), ("IRI", prefix.iri.as_str())])
            .write_empty()?;
    }

    let prefixes = Prefixes(&header.prefixes);
    for axiom in doc.axioms() {
        write_axiom(&mut writer, &prefixes, axiom)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Ontology")))?;
    writer.into_inner().flush().map_err(CompileError::Io)?;
    Ok(())
}

/// Prefix table of the document being written.
struct Prefixes<'a>(&'a [Prefix]);

impl Prefixes<'_> {
    /// Attribute naming an IRI: `abbreviatedIRI` when the text before the
    /// first `:` is a declared prefix name, `IRI` otherwise.
    fn attribute<'i>(&self, iri: &'i str) -> (&'static str, &'i str) {
        let declared = iri
            .split_once(':')
            .is_some_and(|(name, _)| self.0.iter().any(|p| p.name == name));
        if declared {
            ("abbreviatedIRI", iri)
        } else {
            ("IRI", iri)
        }
    }
}

fn named<W: Write>(
    writer: &mut Writer<W>,
    prefixes: &Prefixes,
    element: &str,
    iri: &str,
) -> quick_xml::Result<()> {
    writer
        .create_element(element)
        .with_attribute(prefixes.attribute(iri))
        .write_empty()?;
    Ok(())
}

fn restriction<W: Write>(
    writer: &mut Writer<W>,
    prefixes: &Prefixes,
    element: &str,
    cardinality: Option<u32>,
    property: &str,
    filler: &str,
) -> quick_xml::Result<()> {
    let count = cardinality.map(|c| c.to_string());
    let mut start = writer.create_element(element);
    if let Some(count) = &count {
        start = start.with_attribute(("cardinality", count.as_str()));
    }
    start.write_inner_content(|w| {
        named(w, prefixes, "ObjectProperty", property)?;
        named(w, prefixes, "Class", filler)
    })?;
    Ok(())
}

fn write_class_expression<W: Write>(
    writer: &mut Writer<W>,
    prefixes: &Prefixes,
    expr: &ClassExpression,
) -> quick_xml::Result<()> {
    match expr {
        ClassExpression::Class(iri) => named(writer, prefixes, "Class", iri),
        ClassExpression::SomeValuesFrom { property, filler } => restriction(
            writer,
            prefixes,
            "ObjectSomeValuesFrom",
            None,
            property,
            filler,
        ),
        ClassExpression::AllValuesFrom { property, filler } => restriction(
            writer,
            prefixes,
            "ObjectAllValuesFrom",
            None,
            property,
            filler,
        ),
        ClassExpression::ExactCardinality {
            cardinality,
            property,
            filler,
        } => restriction(
            writer,
            prefixes,
            "ObjectExactCardinality",
            Some(*cardinality),
            property,
            filler,
        ),
    }
}

fn write_value<W: Write>(
    writer: &mut Writer<W>,
    value: &AnnotationValue,
) -> quick_xml::Result<()> {
    match value {
        AnnotationValue::Iri(iri) => {
            writer
                .create_element("IRI")
                .write_text_content(BytesText::new(iri))?;
        }
        AnnotationValue::Literal {
            text,
            lang,
            datatype,
        } => {
            let mut literal = writer.create_element("Literal");
            if let Some(lang) = lang {
                literal = literal.with_attribute(("xml:lang", lang.as_str()));
            }
            if let Some(datatype) = datatype {
                literal = literal.with_attribute(("datatypeIRI", datatype.as_str()));
            }
            literal.write_text_content(BytesText::new(text))?;
        }
    }
    Ok(())
}

fn write_axiom<W: Write>(
    writer: &mut Writer<W>,
    prefixes: &Prefixes,
    axiom: &Axiom,
) -> quick_xml::Result<()> {
    match axiom {
        Axiom::Declaration(declaration) => {
            writer
                .create_element("Declaration")
                .write_inner_content(|w| match declaration {
                    Declaration::Class(iri) => named(w, prefixes, "Class", iri),
                    Declaration::NamedIndividual(iri) => {
                        named(w, prefixes, "NamedIndividual", iri)
                    }
                })?;
        }
        Axiom::AnnotationAssertion {
            property,
            subject,
            value,
        } => {
            writer
                .create_element("AnnotationAssertion")
                .write_inner_content(|w| {
                    named(w, prefixes, "AnnotationProperty", property)?;
                    w.create_element("IRI")
                        .write_text_content(BytesText::new(subject))?;
                    write_value(w, value)
                })?;
        }
        Axiom::SubClassOf { sub, sup } => {
            writer
                .create_element("SubClassOf")
                .write_inner_content(|w| {
                    named(w, prefixes, "Class", sub)?;
                    write_class_expression(w, prefixes, sup)
                })?;
        }
        Axiom::DisjointClasses(classes) => {
            writer
                .create_element("DisjointClasses")
                .write_inner_content(|w| {
                    for class in classes {
                        named(w, prefixes, "Class", class)?;
                    }
                    Ok::<(), quick_xml::Error>(())
                })?;
        }
        Axiom::ClassAssertion { class, individual } => {
            writer
                .create_element("ClassAssertion")
                .write_inner_content(|w| {
                    named(w, prefixes, "Class", class)?;
                    named(w, prefixes, "NamedIndividual", individual)
                })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OntologyHeader, VERSION_IRI};
    use tempfile::TempDir;

    fn render(doc: &Document) -> String {
        let mut out = Vec::new();
        write_owl_xml(doc, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn document() -> Document {
        Document::new(OntologyHeader::default())
    }

    #[test]
    fn empty_document_has_root_and_prefixes() {
        let xml = render(&document());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<Ontology xmlns=\"http://www.w3.org/2002/07/owl#\""));
        assert!(xml.contains(&format!("versionIRI=\"{VERSION_IRI}\"")));
        assert!(xml.contains("<Prefix name=\"dc\" IRI=\"http://purl.org/dc/elements/1.1/\"/>"));
        assert_eq!(xml.matches("<Prefix ").count(), 14);
        assert!(xml.trim_end().ends_with("</Ontology>"));
    }

    #[test]
    fn indents_with_four_spaces() {
        let mut doc = document();
        doc.declare_class("http://example.org/A");
        let xml = render(&doc);
        assert!(xml.contains(
            "\n    <Declaration>\n        <Class IRI=\"http://example.org/A\"/>\n    </Declaration>"
        ));
    }

    #[test]
    fn annotation_property_uses_abbreviated_iri_for_prefixed_names() {
        let mut doc = document();
        doc.annotate(
            "rdfs:label",
            "http://example.org/A",
            AnnotationValue::tagged("sleep", "en"),
        );
        doc.annotate(
            "#theoretical_background",
            "http://example.org/A",
            AnnotationValue::plain("x"),
        );
        let xml = render(&doc);
        assert!(xml.contains("<AnnotationProperty abbreviatedIRI=\"rdfs:label\"/>"));
        assert!(xml.contains("<IRI>http://example.org/A</IRI>"));
        assert!(xml.contains("<Literal xml:lang=\"en\">sleep</Literal>"));
        assert!(xml.contains("<AnnotationProperty IRI=\"#theoretical_background\"/>"));
        assert!(xml.contains("<Literal>x</Literal>"));
    }

    #[test]
    fn undeclared_scheme_is_written_as_full_iri() {
        let mut doc = document();
        doc.annotate(
            "urn:example:label",
            "http://example.org/A",
            AnnotationValue::plain("x"),
        );
        doc.subclass_of(
            "http://example.org/A",
            ClassExpression::SomeValuesFrom {
                property: "tag:example.org,2024:partOf".into(),
                filler: "obo:IAO_0000030".into(),
            },
        );
        let xml = render(&doc);
        assert!(xml.contains("<AnnotationProperty IRI=\"urn:example:label\"/>"));
        assert!(xml.contains("<ObjectProperty IRI=\"tag:example.org,2024:partOf\"/>"));
        assert!(xml.contains("<Class abbreviatedIRI=\"obo:IAO_0000030\"/>"));
    }

    #[test]
    fn prefix_names_follow_the_header_table() {
        let mut header = OntologyHeader::default();
        header.prefixes.retain(|p| p.name != "rdfs");
        let mut doc = Document::new(header);
        doc.annotate("rdfs:label", "http://example.org/A", AnnotationValue::plain("x"));
        let xml = render(&doc);
        assert!(xml.contains("<AnnotationProperty IRI=\"rdfs:label\"/>"));
    }

    #[test]
    fn typed_literal_and_iri_values() {
        let mut doc = document();
        doc.annotate(
            "dc:date",
            "http://example.org/A",
            AnnotationValue::typed(
                "2024-05-06T07:08:09Z",
                "http://www.w3.org/2001/XMLSchema#dateTime",
            ),
        );
        doc.annotate(
            "dc:creator",
            "http://example.org/A",
            AnnotationValue::Iri("http://orcid.org/0000-0001-7597-2590".into()),
        );
        let xml = render(&doc);
        assert!(xml.contains(
            "<Literal datatypeIRI=\"http://www.w3.org/2001/XMLSchema#dateTime\">\
             2024-05-06T07:08:09Z</Literal>"
        ));
        assert!(xml.contains("<IRI>http://orcid.org/0000-0001-7597-2590</IRI>"));
    }

    #[test]
    fn restrictions_and_disjointness() {
        let mut doc = document();
        doc.subclass_of(
            "http://example.org/Q",
            ClassExpression::ExactCardinality {
                cardinality: 1,
                property: "http://example.org/hasAnswer".into(),
                filler: "http://example.org/F".into(),
            },
        );
        doc.subclass_of(
            "http://example.org/C",
            ClassExpression::AllValuesFrom {
                property: "http://example.org/measuredBy".into(),
                filler: "http://example.org/M".into(),
            },
        );
        doc.disjoint(vec![
            "http://example.org/S1".into(),
            "http://example.org/S2".into(),
        ]);
        doc.class_assertion("http://example.org/F", "#OWLNamedIndividual_702");
        let xml = render(&doc);
        assert!(xml.contains("<ObjectExactCardinality cardinality=\"1\">"));
        assert!(xml.contains("<ObjectAllValuesFrom>"));
        assert!(xml.contains("<ObjectProperty IRI=\"http://example.org/measuredBy\"/>"));
        assert!(xml.contains("<DisjointClasses>"));
        assert_eq!(xml.matches("<Class IRI=\"http://example.org/S").count(), 2);
        assert!(xml.contains("<NamedIndividual IRI=\"#OWLNamedIndividual_702\"/>"));
    }

    #[test]
    fn literal_text_is_escaped() {
        let mut doc = document();
        doc.annotate(
            "dc:description",
            "http://example.org/S",
            AnnotationValue::plain("Tom & Jerry <3"),
        );
        let xml = render(&doc);
        assert!(xml.contains("<Literal>Tom &amp; Jerry &lt;3</Literal>"));
    }

    #[test]
    fn sink_writes_file_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("ontology.owl");
        let mut doc = document();
        doc.declare_class("http://example.org/A");

        let mut sink = OwlXmlSink::new(&path);
        sink.persist(&doc).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<Class IRI=\"http://example.org/A\"/>"));
        assert!(!dir.path().join("out").join("ontology.owl.tmp").exists());
    }

    #[test]
    fn sink_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ontology.owl");
        fs::write(&path, "stale").unwrap();

        OwlXmlSink::new(&path).persist(&document()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml"));
    }

    #[test]
    fn failed_replace_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ontology.owl");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let result = OwlXmlSink::new(&path).persist(&document());

        assert!(matches!(result, Err(CompileError::Io(_))));
        assert!(!dir.path().join("ontology.owl.tmp").exists());
        assert!(path.join("keep").exists());
    }
}
