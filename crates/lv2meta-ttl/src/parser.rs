//! Statement parser: drives the lexer and emits triples into a [`TripleSink`].
//!
//! The parser keeps a stack of frames. The bottom frame is the top-level
//! statement; `[` pushes a statement frame for the anonymous node and `(`
//! pushes a collection frame. Closing either one hands the node (or the
//! list head) back to the enclosing frame as its next object.
//!
//! Collections are expanded into proper `rdf:first`/`rdf:rest` cells ending
//! in `rdf:nil`; `()` is `rdf:nil` itself.

use crate::error::{line_col, ParseError};
use crate::lexer::{Lexer, Punct, Spanned, Token};
use crate::term::{Literal, Term, Triple, TripleSink, ANON_MARKER, BNODE_MARKER};
use crate::vocab::{RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

// ============================================================================
// Options and results
// ============================================================================

/// How malformed input is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Any lexical or grammatical problem fails the document.
    #[default]
    Strict,
    /// Unknown tokens, lex errors and misplaced terminators are logged and
    /// skipped. Undefined prefixes and bracket nesting errors stay fatal.
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default)]
    pub strictness: Strictness,
    /// Commit triples as they are parsed, so a failing document still leaves
    /// what came before the error behind. Diagnostic use only.
    #[serde(default)]
    pub keep_partial: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self {
            strictness: Strictness::Lenient,
            keep_partial: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub triples: usize,
    pub prefixes: usize,
    pub blank_nodes: usize,
    /// Problems skipped in lenient mode.
    pub skipped: usize,
}

/// A fully parsed document, not yet committed anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub base_uri: String,
    pub triples: Vec<Triple>,
    pub prefixes: BTreeMap<String, String>,
    pub stats: ParseStats,
}

/// Parse a whole document. Nothing is emitted unless parsing succeeds.
pub fn parse_document(
    base_uri: &str,
    content: &str,
    options: &ParseOptions,
) -> Result<Document, ParseError> {
    let mut triples = Vec::new();
    let (prefixes, stats) =
        StatementParser::new(base_uri, content, options.strictness, &mut triples).run()?;
    Ok(Document {
        base_uri: base_uri.to_string(),
        triples,
        prefixes,
        stats,
    })
}

/// Stream triples into `sink` as they are recognized.
///
/// On error the sink keeps whatever was emitted before the failure.
pub fn parse_into<S: TripleSink + ?Sized>(
    base_uri: &str,
    content: &str,
    options: &ParseOptions,
    sink: &mut S,
) -> Result<ParseStats, ParseError> {
    StatementParser::new(base_uri, content, options.strictness, sink)
        .run()
        .map(|(_, stats)| stats)
}

/// Resolve an IRI reference against a document's base URI.
///
/// `<>` is the document itself, `#frag` is resolved against the document,
/// and other relative references (no scheme, not filesystem-absolute) against
/// the document's directory.
pub fn resolve_iri(base_uri: &str, reference: &str) -> String {
    if reference.is_empty() {
        return base_uri.to_string();
    }
    if reference.starts_with('#') {
        return format!("{base_uri}{reference}");
    }
    if reference.contains(':') || reference.starts_with('/') {
        return reference.to_string();
    }
    match base_uri.rfind('/') {
        Some(slash) => format!("{}/{reference}", &base_uri[..slash]),
        None => reference.to_string(),
    }
}

// ============================================================================
// Parser state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Subject,
    Predicate,
    Object,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StatementKind {
    Triples,
    /// `@prefix name: <iri> .`: the predicate slot holds the prefix name.
    Prefix,
    /// Body of `[ ... ]`; the subject is the synthesized node id.
    Anonymous(String),
}

#[derive(Debug)]
struct Statement {
    kind: StatementKind,
    subject: Option<String>,
    predicate: Option<String>,
    object: Option<Term>,
    slot: Slot,
    /// The predicate slot was reached through `;`.
    continued: bool,
}

impl Statement {
    fn top_level() -> Self {
        Self {
            kind: StatementKind::Triples,
            subject: None,
            predicate: None,
            object: None,
            slot: Slot::Subject,
            continued: false,
        }
    }

    fn anonymous(id: String) -> Self {
        Self {
            kind: StatementKind::Anonymous(id.clone()),
            subject: Some(id),
            predicate: None,
            object: None,
            slot: Slot::Predicate,
            continued: false,
        }
    }
}

#[derive(Debug, Default)]
struct Collection {
    head: Option<String>,
    tail: Option<String>,
}

#[derive(Debug)]
enum Frame {
    Statement(Statement),
    Collection(Collection),
}

struct StatementParser<'s, S: TripleSink + ?Sized> {
    uri: &'s str,
    content: &'s str,
    strictness: Strictness,
    sink: &'s mut S,
    prefixes: BTreeMap<String, String>,
    frames: Vec<Frame>,
    anon_count: usize,
    stats: ParseStats,
    /// Offset of the token being processed, for error reporting.
    offset: usize,
}

impl<'s, S: TripleSink + ?Sized> StatementParser<'s, S> {
    fn new(uri: &'s str, content: &'s str, strictness: Strictness, sink: &'s mut S) -> Self {
        Self {
            uri,
            content,
            strictness,
            sink,
            prefixes: BTreeMap::new(),
            frames: vec![Frame::Statement(Statement::top_level())],
            anon_count: 0,
            stats: ParseStats::default(),
            offset: 0,
        }
    }

    fn run(mut self) -> Result<(BTreeMap<String, String>, ParseStats), ParseError> {
        debug!(uri = self.uri, bytes = self.content.len(), "parsing document");
        for item in Lexer::new(self.content) {
            match item {
                Ok(spanned) => self.step(spanned)?,
                Err(source) => {
                    self.offset = source.offset;
                    self.recover(ParseError::Lex {
                        uri: self.uri.to_string(),
                        source,
                    })?
                }
            }
        }
        self.finish()?;
        debug!(
            uri = self.uri,
            triples = self.stats.triples,
            prefixes = self.stats.prefixes,
            "parsed document"
        );
        Ok((self.prefixes, self.stats))
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        if self.frames.len() > 1 {
            return Err(ParseError::UnexpectedEof {
                uri: self.uri.to_string(),
                reason: "unclosed `[` or `(`",
            });
        }
        let pending = match self.frames.last() {
            Some(Frame::Statement(stmt)) => {
                stmt.slot != Slot::Subject && !(stmt.slot == Slot::Predicate && stmt.continued)
            }
            _ => false,
        };
        if pending {
            self.offset = self.content.len();
            return self.recover(ParseError::UnexpectedEof {
                uri: self.uri.to_string(),
                reason: "statement not terminated with `.`",
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Error helpers
    // ------------------------------------------------------------------------

    fn line(&self) -> usize {
        line_col(self.content, self.offset).0
    }

    /// Recoverable problem: fatal in strict mode, logged and skipped otherwise.
    fn recover(&mut self, err: ParseError) -> Result<(), ParseError> {
        match self.strictness {
            Strictness::Strict => Err(err),
            Strictness::Lenient => {
                warn!(uri = self.uri, error = %err, "skipping malformed input");
                self.stats.skipped += 1;
                Ok(())
            }
        }
    }

    fn unexpected(&self, token: &Token<'_>, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            uri: self.uri.to_string(),
            line: self.line(),
            token: token.to_string(),
            expected,
        }
    }

    fn unbalanced(&self, bracket: char) -> ParseError {
        ParseError::UnbalancedBracket {
            uri: self.uri.to_string(),
            line: self.line(),
            bracket,
        }
    }

    // ------------------------------------------------------------------------
    // Token dispatch
    // ------------------------------------------------------------------------

    fn step(&mut self, spanned: Spanned<'_>) -> Result<(), ParseError> {
        self.offset = spanned.offset;
        let token = spanned.token;

        if matches!(
            self.frames.last(),
            Some(Frame::Statement(Statement {
                kind: StatementKind::Prefix,
                ..
            }))
        ) {
            return self.step_prefix(token);
        }

        match token {
            Token::PrefixKeyword => self.begin_prefix(&token),
            Token::Punct(Punct::Dot) => self.terminate(Punct::Dot),
            Token::Punct(Punct::Semicolon) => self.terminate(Punct::Semicolon),
            Token::Punct(Punct::Comma) => self.terminate(Punct::Comma),
            Token::Punct(Punct::OpenBracket) => self.open_anonymous(),
            Token::Punct(Punct::CloseBracket) => self.close_anonymous(),
            Token::Punct(Punct::OpenParen) => self.open_collection(),
            Token::Punct(Punct::CloseParen) => self.close_collection(),
            Token::Iri(reference) => self.push_term(Term::Iri(resolve_iri(self.uri, reference))),
            Token::PrefixedName(name) => {
                let term = self.expand_prefixed(name)?;
                self.push_term(term)
            }
            Token::String(s) => self.push_term(Term::Literal(Literal::String(s.into_owned()))),
            Token::Integer(i) => self.push_term(Term::Literal(Literal::Integer(i))),
            Token::Float(x) => self.push_term(Term::Literal(Literal::Float(x))),
            Token::Symbol("a") => self.push_type_keyword(&token),
            Token::Symbol(_) => {
                let err = self.unexpected(&token, "a term or punctuation");
                self.recover(err)
            }
        }
    }

    fn begin_prefix(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        let at_statement_start = self.frames.len() == 1
            && matches!(
                self.frames.last(),
                Some(Frame::Statement(Statement {
                    slot: Slot::Subject,
                    ..
                }))
            );
        if !at_statement_start {
            let err = self.unexpected(token, "a statement before `@prefix`");
            return self.recover(err);
        }
        if let Some(Frame::Statement(stmt)) = self.frames.last_mut() {
            stmt.kind = StatementKind::Prefix;
            stmt.slot = Slot::Predicate;
        }
        Ok(())
    }

    fn step_prefix(&mut self, token: Token<'_>) -> Result<(), ParseError> {
        let slot = match self.frames.last() {
            Some(Frame::Statement(stmt)) => stmt.slot,
            _ => return Err(self.unexpected(&token, "a prefix declaration")),
        };
        match (slot, &token) {
            (Slot::Predicate, Token::PrefixedName(name)) if name.ends_with(':') => {
                let label = name.trim_end_matches(':').to_string();
                self.with_statement(|stmt| {
                    stmt.predicate = Some(label);
                    stmt.slot = Slot::Object;
                });
                Ok(())
            }
            (Slot::Object, Token::Iri(reference)) => {
                let namespace = resolve_iri(self.uri, reference);
                self.with_statement(|stmt| {
                    stmt.object = Some(Term::Iri(namespace));
                    stmt.slot = Slot::Complete;
                });
                Ok(())
            }
            (Slot::Complete, Token::Punct(Punct::Dot)) => {
                let mut stmt = Statement::top_level();
                if let Some(Frame::Statement(done)) = self.frames.last_mut() {
                    std::mem::swap(done, &mut stmt);
                }
                if let (Some(label), Some(Term::Iri(namespace))) = (stmt.predicate, stmt.object) {
                    self.prefixes.insert(label, namespace);
                    self.stats.prefixes += 1;
                }
                Ok(())
            }
            _ => {
                let expected = match slot {
                    Slot::Predicate => "a prefix name such as `ex:`",
                    Slot::Object => "a namespace IRI",
                    _ => "`.` after a prefix declaration",
                };
                let err = self.unexpected(&token, expected);
                // A broken declaration is dropped as a whole in lenient mode.
                self.recover(err)?;
                self.with_statement(|stmt| *stmt = Statement::top_level());
                Ok(())
            }
        }
    }

    fn with_statement(&mut self, f: impl FnOnce(&mut Statement)) {
        if let Some(Frame::Statement(stmt)) = self.frames.last_mut() {
            f(stmt);
        }
    }

    fn expand_prefixed(&self, name: &str) -> Result<Term, ParseError> {
        let (prefix, local) = name.split_once(':').unwrap_or(("", name));
        if prefix == "_" {
            return Ok(Term::Blank(format!("{}{BNODE_MARKER}{local}", self.uri)));
        }
        match self.prefixes.get(prefix) {
            Some(namespace) => Ok(Term::Iri(format!("{namespace}{local}"))),
            None => Err(ParseError::UndefinedPrefix {
                uri: self.uri.to_string(),
                line: self.line(),
                prefix: prefix.to_string(),
            }),
        }
    }

    fn next_anon(&mut self) -> String {
        self.anon_count += 1;
        self.stats.blank_nodes += 1;
        format!("{}{ANON_MARKER}{}", self.uri, self.anon_count)
    }

    fn emit(&mut self, subject: String, predicate: String, object: Term) {
        self.sink.add_triple(Triple {
            subject,
            predicate,
            object,
        });
        self.stats.triples += 1;
    }

    // ------------------------------------------------------------------------
    // Terms
    // ------------------------------------------------------------------------

    fn push_type_keyword(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        match self.frames.last_mut() {
            Some(Frame::Statement(stmt)) if stmt.slot == Slot::Predicate => {
                stmt.predicate = Some(RDF_TYPE.to_string());
                stmt.slot = Slot::Object;
                stmt.continued = false;
                Ok(())
            }
            _ => {
                let err = self.unexpected(token, "`a` only in predicate position");
                self.recover(err)
            }
        }
    }

    fn push_term(&mut self, term: Term) -> Result<(), ParseError> {
        let slot = match self.frames.last() {
            Some(Frame::Collection(_)) => return self.append_member(term),
            Some(Frame::Statement(stmt)) => stmt.slot,
            None => return Err(self.unbalanced(']')),
        };

        match slot {
            Slot::Subject | Slot::Predicate if term.is_literal() => {
                let err = ParseError::LiteralNotAllowed {
                    uri: self.uri.to_string(),
                    line: self.line(),
                    position: if slot == Slot::Subject {
                        "subject"
                    } else {
                        "predicate"
                    },
                };
                self.recover(err)
            }
            Slot::Predicate if matches!(term, Term::Blank(_)) => {
                let err = ParseError::UnexpectedToken {
                    uri: self.uri.to_string(),
                    line: self.line(),
                    token: term.to_string(),
                    expected: "an IRI as predicate",
                };
                self.recover(err)
            }
            Slot::Complete => {
                let err = ParseError::UnexpectedToken {
                    uri: self.uri.to_string(),
                    line: self.line(),
                    token: term.to_string(),
                    expected: "`.`, `;` or `,`",
                };
                self.recover(err)
            }
            _ => {
                self.with_statement(|stmt| match slot {
                    Slot::Subject => {
                        stmt.subject = term.as_node().map(str::to_string);
                        stmt.slot = Slot::Predicate;
                        stmt.continued = false;
                    }
                    Slot::Predicate => {
                        stmt.predicate = term.as_node().map(str::to_string);
                        stmt.slot = Slot::Object;
                        stmt.continued = false;
                    }
                    _ => {
                        stmt.object = Some(term);
                        stmt.slot = Slot::Complete;
                    }
                });
                Ok(())
            }
        }
    }

    /// Append `value` to the innermost collection as a new list cell.
    fn append_member(&mut self, value: Term) -> Result<(), ParseError> {
        let cell = self.next_anon();
        let previous = match self.frames.last_mut() {
            Some(Frame::Collection(list)) => {
                let previous = list.tail.replace(cell.clone());
                if previous.is_none() {
                    list.head = Some(cell.clone());
                }
                previous
            }
            _ => return Err(self.unbalanced('(')),
        };
        if let Some(previous) = previous {
            self.emit(previous, RDF_REST.to_string(), Term::Blank(cell.clone()));
        }
        self.emit(cell, RDF_FIRST.to_string(), value);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Nesting
    // ------------------------------------------------------------------------

    fn expects_nested_object(&self) -> bool {
        match self.frames.last() {
            Some(Frame::Statement(stmt)) => stmt.slot == Slot::Object,
            Some(Frame::Collection(_)) => true,
            None => false,
        }
    }

    fn open_anonymous(&mut self) -> Result<(), ParseError> {
        if !self.expects_nested_object() {
            return Err(self.unbalanced('['));
        }
        let id = self.next_anon();
        self.frames.push(Frame::Statement(Statement::anonymous(id)));
        Ok(())
    }

    fn open_collection(&mut self) -> Result<(), ParseError> {
        if !self.expects_nested_object() {
            return Err(self.unbalanced('('));
        }
        self.frames.push(Frame::Collection(Collection::default()));
        Ok(())
    }

    fn close_anonymous(&mut self) -> Result<(), ParseError> {
        let id = match self.frames.last() {
            Some(Frame::Statement(Statement {
                kind: StatementKind::Anonymous(id),
                ..
            })) => id.clone(),
            _ => return Err(self.unbalanced(']')),
        };
        let Some(Frame::Statement(stmt)) = self.frames.pop() else {
            return Err(self.unbalanced(']'));
        };
        match stmt.slot {
            Slot::Complete => self.emit_statement(stmt),
            Slot::Predicate => {}
            Slot::Subject | Slot::Object => {
                let err = ParseError::IncompleteStatement {
                    uri: self.uri.to_string(),
                    line: self.line(),
                    terminator: ']',
                };
                self.recover(err)?;
            }
        }
        self.deliver(Term::Blank(id))
    }

    fn close_collection(&mut self) -> Result<(), ParseError> {
        let Some(Frame::Collection(list)) = self.frames.last() else {
            return Err(self.unbalanced(')'));
        };
        let head = list.head.clone();
        let tail = list.tail.clone();
        self.frames.pop();
        if let Some(tail) = tail {
            self.emit(tail, RDF_REST.to_string(), Term::Iri(RDF_NIL.to_string()));
        }
        let value = match head {
            Some(head) => Term::Blank(head),
            None => Term::Iri(RDF_NIL.to_string()),
        };
        self.deliver(value)
    }

    /// Hand a finished nested node to the enclosing frame.
    fn deliver(&mut self, value: Term) -> Result<(), ParseError> {
        match self.frames.last_mut() {
            Some(Frame::Statement(stmt)) if stmt.slot == Slot::Object => {
                stmt.object = Some(value);
                stmt.slot = Slot::Complete;
                Ok(())
            }
            Some(Frame::Collection(_)) => self.append_member(value),
            _ => Err(self.unbalanced(']')),
        }
    }

    fn emit_statement(&mut self, stmt: Statement) {
        if let (Some(subject), Some(predicate), Some(object)) =
            (stmt.subject, stmt.predicate, stmt.object)
        {
            self.emit(subject, predicate, object);
        }
    }

    // ------------------------------------------------------------------------
    // Terminators
    // ------------------------------------------------------------------------

    fn terminate(&mut self, punct: Punct) -> Result<(), ParseError> {
        let (slot, continued, anonymous) = match self.frames.last() {
            Some(Frame::Statement(stmt)) => (
                stmt.slot,
                stmt.continued,
                matches!(stmt.kind, StatementKind::Anonymous(_)),
            ),
            _ => {
                let err = self.unexpected(&Token::Punct(punct), "a list member or `)`");
                return self.recover(err);
            }
        };

        if punct == Punct::Dot && anonymous {
            let err = self.unexpected(&Token::Punct(punct), "`]` to close the blank node");
            return self.recover(err);
        }

        match (slot, punct) {
            (Slot::Complete, _) => {
                let (subject, predicate, object) = match self.frames.last_mut() {
                    Some(Frame::Statement(stmt)) => {
                        (stmt.subject.clone(), stmt.predicate.clone(), stmt.object.take())
                    }
                    _ => (None, None, None),
                };
                if let (Some(s), Some(p), Some(o)) = (subject, predicate, object) {
                    self.emit(s, p, o);
                }
                self.with_statement(|stmt| match punct {
                    Punct::Dot => *stmt = Statement::top_level(),
                    Punct::Semicolon => {
                        stmt.predicate = None;
                        stmt.slot = Slot::Predicate;
                        stmt.continued = true;
                    }
                    _ => stmt.slot = Slot::Object,
                });
                Ok(())
            }
            // Empty statement.
            (Slot::Subject, Punct::Dot) => Ok(()),
            // Trailing or repeated `;`.
            (Slot::Predicate, Punct::Dot) if continued => {
                self.with_statement(|stmt| *stmt = Statement::top_level());
                Ok(())
            }
            (Slot::Predicate, Punct::Semicolon) if continued => Ok(()),
            _ => {
                let err = ParseError::IncompleteStatement {
                    uri: self.uri.to_string(),
                    line: self.line(),
                    terminator: punct.as_char(),
                };
                self.recover(err)?;
                if punct == Punct::Dot {
                    self.with_statement(|stmt| *stmt = Statement::top_level());
                }
                Ok(())
            }
        }
    }
}
