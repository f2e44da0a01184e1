//! surveyowl: harmonised survey metadata to OWL ontology compiler
//!
//! This crate turns four CSV exports of a survey harmonisation project into a
//! single OWL/XML ontology:
//!
//! 1. **Normalization** -- Each stage reads its export, derives a natural key
//!    per row, keeps the first row per key and drops entities that match the
//!    configured exclusions. Every construction attempt consumes one
//!    identifier from a shared counter, so IRIs are stable for a given input.
//! 2. **Assembly** -- Admitted entities become declarations, annotations and
//!    class restrictions. Cross references are resolved against the
//!    collections of earlier stages at this point and fail loudly.
//! 3. **Persistence** -- The finished document is written as indented
//!    OWL/XML through a temp file and a rename.
//!
//! # Architecture
//!
//! - **Typed rows** -- One serde struct per export, header checked once
//! - **Static stages** -- Unit structs implementing [`stages::Stage`], run in a
//!   fixed order by [`pipeline`]
//! - **Pluggable vocabulary** -- Property IRIs, parent classes and the creator
//!   come from [`vocabulary::Vocabulary`] and can be overridden by settings
//! - **Pinned clock** -- `created_at` stamps come from a [`models::Clock`] so
//!   runs can be made reproducible
//!
//! # Key Modules
//!
//! - [`source`] -- Row schemas and the CSV/in-memory row sources
//! - [`normalize`] -- Keyed, first-wins collections and the deduplication loop
//! - [`stages`] -- Per-kind construction, exclusion and assembly rules
//! - [`resolve`] -- Cross-reference lookup
//! - [`owl`] -- In-memory axiom list
//! - [`writer`] -- OWL/XML serialization and the file sink
//! - [`ids`] -- Identifier authority and IRI minting
//! - [`stats`] -- Per-stage counters and the run summary
//! - [`config`] -- Constants and JSON-loadable settings
//!
//! # Example Usage
//!
//! ```bash
//! # Compile exports found in ./exports into ontology.owl
//! surveyowl compile -i exports/ -o ontology.owl
//!
//! # Show what would be compiled, as JSON
//! surveyowl inspect -i exports/ --json
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod normalize;
pub mod owl;
pub mod pipeline;
pub mod resolve;
pub mod source;
pub mod stages;
pub mod stats;
pub mod vocabulary;
pub mod writer;
