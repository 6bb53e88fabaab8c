//! Triple/term model shared by the parser and the triple store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Write;

// ============================================================================
// Terms
// ============================================================================

/// An untyped literal. Language tags and datatypes are not modeled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value", rename_all = "snake_case")]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; strings are parsed if they look numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::String(s) => s.trim().parse().ok(),
            Literal::Integer(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::String(s) => s.trim().parse().ok(),
            Literal::Integer(i) => Some(*i),
            Literal::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Literal::Float(_) => None,
        }
    }
}

// Floats compare by bit pattern so literals can live in hash sets.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::String(a), Literal::String(b)) => a == b,
            (Literal::Integer(a), Literal::Integer(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Literal::String(s) => s.hash(state),
            Literal::Integer(i) => i.hash(state),
            Literal::Float(f) => f.to_bits().hash(state),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// Marks parser-generated ids for `[ ... ]` and collection cells.
pub const ANON_MARKER: &str = "$anon$";
/// Marks ids of labelled `_:x` blank nodes.
pub const BNODE_MARKER: &str = "$bnode$";

/// Whether `id` was synthesized for a blank node.
pub fn is_blank_id(id: &str) -> bool {
    id.contains(ANON_MARKER) || id.contains(BNODE_MARKER)
}

/// Object position of a triple. Subjects are always node ids (IRIs or
/// synthesized blank-node ids), so they are plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    /// A node term for a subject id, keeping blank ids blank.
    pub fn node(id: impl Into<String>) -> Self {
        let id = id.into();
        if is_blank_id(&id) {
            Term::Blank(id)
        } else {
            Term::Iri(id)
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Term::Literal(Literal::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Term::Literal(Literal::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Term::Literal(Literal::Float(value))
    }

    /// The node id if this term can also be used as a subject.
    pub fn as_node(&self) -> Option<&str> {
        match self {
            Term::Iri(id) | Term::Blank(id) => Some(id),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Node id or string literal contents.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Term::Iri(id) | Term::Blank(id) => Some(id),
            Term::Literal(lit) => lit.as_str(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(id) => write!(f, "[{id}]"),
            Term::Literal(lit) => lit.fmt(f),
        }
    }
}

// ============================================================================
// Triples and sinks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.subject, self.predicate, self.object)
    }
}

/// Receiver of parsed statements.
pub trait TripleSink {
    fn add_triple(&mut self, triple: Triple);
}

impl TripleSink for Vec<Triple> {
    fn add_triple(&mut self, triple: Triple) {
        self.push(triple);
    }
}

impl<S: TripleSink + ?Sized> TripleSink for &mut S {
    fn add_triple(&mut self, triple: Triple) {
        (**self).add_triple(triple);
    }
}

/// Writes every triple as one line (`subject [predicate] object`).
///
/// Write failures are remembered and reported by [`DumpSink::finish`].
pub struct DumpSink<W: Write> {
    out: W,
    written: usize,
    error: Option<std::io::Error>,
}

impl<W: Write> DumpSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            written: 0,
            error: None,
        }
    }

    /// Flush and return the number of lines written.
    pub fn finish(mut self) -> std::io::Result<usize> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.written)
    }
}

impl<W: Write> TripleSink for DumpSink<W> {
    fn add_triple(&mut self, triple: Triple) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.out, "{triple}") {
            Ok(()) => self.written += 1,
            Err(err) => self.error = Some(err),
        }
    }
}
