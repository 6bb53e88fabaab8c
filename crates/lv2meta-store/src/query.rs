//! Property-path queries.
//!
//! A path is a list of predicates walked from a starting subject. Each step
//! collects the objects of one predicate (de-duplicated, first occurrence
//! wins) and uses them as the subjects of the next step.
//!
//! There are two modes:
//!
//! - multi ([`TripleStore::property_values`]): union of every branch.
//! - single ([`TripleStore::property_value`]): the first branch that yields a
//!   value. The last step must find at most one distinct value, otherwise the
//!   query fails with [`QueryError::Ambiguous`].
//!
//! The `_trans` variants also match every transitive subproperty of each
//! step's predicate, which needs an up-to-date [`TripleStore::reindex`].

use crate::{canonical_predicate, PredicateMap, TripleStore};
use ahash::AHashSet;
use lv2meta_ttl::vocab::RDF_VALUE;
use lv2meta_ttl::Term;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{subject} has {count} distinct values of `{predicate}`, expected at most one")]
    Ambiguous {
        subject: String,
        predicate: String,
        count: usize,
    },
}

/// Where a path query starts.
#[derive(Debug, Clone, Copy)]
pub enum SubjectRef<'a> {
    /// A subject id looked up in the store.
    Iri(&'a str),
    /// A subject row already fetched with [`TripleStore::row`].
    Predicates(&'a PredicateMap),
    /// An object term from a previous query. Literals have no row.
    Term(&'a Term),
}

impl<'a> From<&'a str> for SubjectRef<'a> {
    fn from(subject: &'a str) -> Self {
        SubjectRef::Iri(subject)
    }
}

impl<'a> From<&'a String> for SubjectRef<'a> {
    fn from(subject: &'a String) -> Self {
        SubjectRef::Iri(subject)
    }
}

impl<'a> From<&'a Term> for SubjectRef<'a> {
    fn from(term: &'a Term) -> Self {
        SubjectRef::Term(term)
    }
}

impl<'a> From<&'a PredicateMap> for SubjectRef<'a> {
    fn from(row: &'a PredicateMap) -> Self {
        SubjectRef::Predicates(row)
    }
}

impl SubjectRef<'_> {
    fn describe(&self) -> String {
        match self {
            SubjectRef::Iri(s) => (*s).to_string(),
            SubjectRef::Predicates(_) => "<row>".to_string(),
            SubjectRef::Term(t) => t.to_string(),
        }
    }
}

impl TripleStore {
    /// All values at the end of `path`, de-duplicated in first-seen order.
    pub fn property_values<'a>(
        &self,
        subject: impl Into<SubjectRef<'a>>,
        path: &[&str],
    ) -> Vec<Term> {
        self.walk_multi(subject.into(), path, false)
    }

    /// At most one value at the end of `path`.
    pub fn property_value<'a>(
        &self,
        subject: impl Into<SubjectRef<'a>>,
        path: &[&str],
    ) -> Result<Option<Term>, QueryError> {
        self.walk_single(subject.into(), path, false)
    }

    /// Like [`TripleStore::property_values`], also following subproperties.
    pub fn property_values_trans<'a>(
        &self,
        subject: impl Into<SubjectRef<'a>>,
        path: &[&str],
    ) -> Vec<Term> {
        self.walk_multi(subject.into(), path, true)
    }

    /// Like [`TripleStore::property_value`], also following subproperties.
    pub fn property_value_trans<'a>(
        &self,
        subject: impl Into<SubjectRef<'a>>,
        path: &[&str],
    ) -> Result<Option<Term>, QueryError> {
        self.walk_single(subject.into(), path, true)
    }

    // ------------------------------------------------------------------------
    // Walking
    // ------------------------------------------------------------------------

    fn resolve<'s>(&'s self, subject: SubjectRef<'s>) -> Option<&'s PredicateMap> {
        match subject {
            SubjectRef::Iri(id) => self.row(id),
            SubjectRef::Predicates(row) => Some(row),
            SubjectRef::Term(term) => term.as_node().and_then(|id| self.row(id)),
        }
    }

    /// Distinct objects of one step.
    fn step(&self, subject: SubjectRef<'_>, predicate: &str, trans: bool) -> Vec<Term> {
        let predicate = canonical_predicate(predicate);

        if let SubjectRef::Term(term) = subject {
            if trans && predicate == RDF_VALUE && term.is_literal() {
                return vec![term.clone()];
            }
        }

        let Some(row) = self.resolve(subject) else {
            return Vec::new();
        };

        let mut predicates = vec![predicate];
        if trans {
            predicates.extend(self.subproperties_of(predicate));
        }

        let mut seen = AHashSet::new();
        let mut out = Vec::new();
        for p in predicates {
            for object in row.get(p).into_iter().flatten() {
                if seen.insert(object) {
                    out.push(object.clone());
                }
            }
        }
        out
    }

    fn walk_multi(&self, subject: SubjectRef<'_>, path: &[&str], trans: bool) -> Vec<Term> {
        let Some((first, rest)) = path.split_first() else {
            return Vec::new();
        };
        let values = self.step(subject, first, trans);
        if rest.is_empty() {
            return values;
        }

        let mut seen = AHashSet::new();
        let mut out = Vec::new();
        for value in &values {
            for found in self.walk_multi(SubjectRef::Term(value), rest, trans) {
                if seen.insert(found.clone()) {
                    out.push(found);
                }
            }
        }
        out
    }

    fn walk_single(
        &self,
        subject: SubjectRef<'_>,
        path: &[&str],
        trans: bool,
    ) -> Result<Option<Term>, QueryError> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(None);
        };
        let mut values = self.step(subject, first, trans);

        if rest.is_empty() {
            return match values.len() {
                0 | 1 => Ok(values.pop()),
                count => Err(QueryError::Ambiguous {
                    subject: subject.describe(),
                    predicate: (*first).to_string(),
                    count,
                }),
            };
        }

        for value in &values {
            if let Some(found) = self.walk_single(SubjectRef::Term(value), rest, trans)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}
