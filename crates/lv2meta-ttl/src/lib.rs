//! Turtle-like RDF parsing for LV2 metadata.
//!
//! This crate turns Turtle-ish text into `(subject, predicate, object)`
//! triples:
//!
//! - [`lexer`] is a lazy tokenizer (prefixes, IRIs, literals, punctuation).
//! - [`parser`] is the statement state machine: `@prefix` declarations,
//!   relative-IRI resolution against the document base, `[ ... ]` blank
//!   nodes, `( ... )` collections and the `.`/`;`/`,` terminators.
//! - [`term`] holds the shared triple model and the [`TripleSink`] seam the
//!   triple store plugs into.
//!
//! It deliberately covers the practical subset used by LV2 bundles, not all
//! of Turtle: no `@base`, no booleans, and literal language tags/datatypes
//! are accepted but dropped.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod term;
pub mod vocab;

pub use error::{LexError, ParseError};
pub use parser::{
    parse_document, parse_into, resolve_iri, Document, ParseOptions, ParseStats, Strictness,
};
pub use term::{is_blank_id, DumpSink, Literal, Term, Triple, TripleSink};
