//! In-memory triple store for LV2 metadata.
//!
//! A [`TripleStore`] keeps the same triples in two indexes:
//!
//! - `by_subject`: subject -> predicate -> objects
//! - `by_predicate`: predicate -> subject -> objects
//!
//! Object lists keep insertion order and are never de-duplicated on insert.
//! `rdf:type` is stored under the short predicate `"a"`, and every typed
//! subject is also recorded under the reserved `"$classes"` subject so that
//! "all instances of a class" is a single lookup.
//!
//! Subclass/subproperty queries read closure tables that are only rebuilt by
//! [`TripleStore::reindex`]; see [`closure`].

pub mod closure;
pub mod loader;
pub mod query;

use ahash::AHashMap;
use lv2meta_ttl::vocab::RDF_TYPE;
use lv2meta_ttl::{Term, Triple, TripleSink};
use std::collections::BTreeSet;
use std::io::{self, Write};

pub use closure::{CycleBreak, HierarchyKind, ReindexReport};
pub use loader::LoadError;
pub use query::{QueryError, SubjectRef};

/// Reserved pseudo-subject of the reverse type index.
pub const CLASSES: &str = "$classes";

/// Canonical in-store spelling of `rdf:type`.
pub const TYPE: &str = "a";

/// Outgoing edges of one subject: predicate -> objects in insertion order.
pub type PredicateMap = AHashMap<String, Vec<Term>>;

/// Map a predicate to the spelling used inside the store.
pub fn canonical_predicate(predicate: &str) -> &str {
    if predicate == RDF_TYPE {
        TYPE
    } else {
        predicate
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TripleStore {
    by_subject: AHashMap<String, PredicateMap>,
    by_predicate: AHashMap<String, AHashMap<String, Vec<Term>>>,
    closure: closure::ClosureTables,
    /// Triples added by callers (not counting `$classes` entries).
    len: usize,
    /// Bumped on every insert; compared against the closure's generation.
    generation: u64,
}

impl TripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triples added, excluding the synthetic `$classes` entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when triples were added after the last [`TripleStore::reindex`].
    pub fn needs_reindex(&self) -> bool {
        self.closure.generation != self.generation
    }

    /// Insert one triple into both indexes.
    pub fn add_triple(&mut self, subject: &str, predicate: &str, object: Term) {
        let predicate = canonical_predicate(predicate);
        self.len += 1;
        self.insert(subject, predicate, object);
    }

    fn insert(&mut self, subject: &str, predicate: &str, object: Term) {
        self.generation += 1;

        // Typed node objects also land in the reverse type index.
        let class = match (&object, predicate) {
            (Term::Iri(class) | Term::Blank(class), TYPE) if subject != CLASSES => {
                Some(class.clone())
            }
            _ => None,
        };

        self.by_predicate
            .entry(predicate.to_string())
            .or_default()
            .entry(subject.to_string())
            .or_default()
            .push(object.clone());
        self.by_subject
            .entry(subject.to_string())
            .or_default()
            .entry(predicate.to_string())
            .or_default()
            .push(object);

        if let Some(class) = class {
            self.insert(CLASSES, &class, Term::node(subject));
        }
    }

    /// Re-add every triple of `other`.
    ///
    /// `$classes` entries are regenerated by the type side effect, not
    /// copied, so they do not double up.
    pub fn copy_from(&mut self, other: &TripleStore) {
        for triple in other.triples() {
            self.add_triple(&triple.subject, &triple.predicate, triple.object);
        }
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// All predicates and objects of `subject`.
    pub fn row(&self, subject: &str) -> Option<&PredicateMap> {
        self.by_subject.get(subject)
    }

    /// Objects of `(subject, predicate)` in insertion order.
    pub fn objects(&self, subject: &str, predicate: &str) -> &[Term] {
        self.by_subject
            .get(subject)
            .and_then(|row| row.get(canonical_predicate(predicate)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every subject with at least one `predicate` edge, with its objects.
    pub fn by_property<'a>(
        &'a self,
        predicate: &str,
    ) -> impl Iterator<Item = (&'a str, &'a [Term])> + 'a {
        self.by_predicate
            .get(canonical_predicate(predicate))
            .into_iter()
            .flat_map(|subjects| subjects.iter())
            .map(|(s, objects)| (s.as_str(), objects.as_slice()))
    }

    /// Subjects of caller-added triples. Excludes `$classes`.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.by_subject
            .keys()
            .map(String::as_str)
            .filter(|s| *s != CLASSES)
    }

    /// Direct instances of `class`.
    pub fn by_type(&self, class: &str) -> BTreeSet<&str> {
        self.objects(CLASSES, class)
            .iter()
            .filter_map(Term::as_node)
            .collect()
    }

    /// Instances of `class` or any of its transitive subclasses.
    ///
    /// Reads the closure tables, so call [`TripleStore::reindex`] first.
    pub fn by_type_with_subclasses(&self, class: &str) -> BTreeSet<&str> {
        let mut out = self.by_type(class);
        for sub in self.subclasses_of(class) {
            out.extend(self.by_type(sub));
        }
        out
    }

    /// Every caller-added triple, `rdf:type` spelled as `"a"`.
    pub fn triples(&self) -> impl Iterator<Item = Triple> + '_ {
        self.by_subject
            .iter()
            .filter(|(s, _)| s.as_str() != CLASSES)
            .flat_map(|(s, row)| {
                row.iter().flat_map(move |(p, objects)| {
                    objects
                        .iter()
                        .map(move |o| Triple::new(s.as_str(), p.as_str(), o.clone()))
                })
            })
    }

    /// Write every subject row as `subject predicate [objects]`, sorted.
    pub fn dump<W: Write>(&self, mut out: W) -> io::Result<()> {
        let mut subjects: Vec<_> = self.by_subject.iter().collect();
        subjects.sort_by(|a, b| a.0.cmp(b.0));
        for (subject, row) in subjects {
            let mut predicates: Vec<_> = row.iter().collect();
            predicates.sort_by(|a, b| a.0.cmp(b.0));
            for (predicate, objects) in predicates {
                let rendered: Vec<String> = objects.iter().map(Term::to_string).collect();
                writeln!(out, "{subject} {predicate} [{}]", rendered.join(", "))?;
            }
        }
        out.flush()
    }
}

impl TripleSink for TripleStore {
    fn add_triple(&mut self, triple: Triple) {
        TripleStore::add_triple(self, &triple.subject, &triple.predicate, triple.object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_indexes_see_every_triple() {
        let mut store = TripleStore::new();
        store.add_triple("s1", "p1", Term::iri("o1"));
        store.add_triple("s2", "p2", Term::integer(2));

        assert_eq!(store.objects("s1", "p1"), &[Term::iri("o1")]);
        let via_predicate: Vec<_> = store.by_property("p1").collect();
        assert_eq!(via_predicate, vec![("s1", &[Term::iri("o1")][..])]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn rdf_type_is_stored_as_a_and_indexed_by_class() {
        let mut store = TripleStore::new();
        store.add_triple("plug", RDF_TYPE, Term::iri("Plugin"));
        store.add_triple("other", TYPE, Term::iri("Plugin"));

        assert_eq!(store.objects("plug", TYPE), &[Term::iri("Plugin")]);
        assert_eq!(store.objects("plug", RDF_TYPE), &[Term::iri("Plugin")]);
        assert_eq!(
            store.by_type("Plugin").into_iter().collect::<Vec<_>>(),
            vec!["other", "plug"]
        );
        assert!(store.by_type("Missing").is_empty());
        // `$classes` entries are not caller triples.
        assert_eq!(store.len(), 2);
        assert_eq!(store.subjects().count(), 2);
    }

    #[test]
    fn literal_types_do_not_reach_the_class_index() {
        let mut store = TripleStore::new();
        store.add_triple("s", TYPE, Term::string("not a class"));
        assert!(store.row(CLASSES).is_none());
    }

    #[test]
    fn blank_subjects_stay_blank_in_the_class_index() {
        let mut store = TripleStore::new();
        store.add_triple("d.ttl$anon$1", TYPE, Term::iri("Port"));
        store.add_triple("d.ttl$anon$1", "index", Term::integer(0));
        store.add_triple("http://e/p", TYPE, Term::iri("Port"));

        let members = store.objects(CLASSES, "Port");
        assert_eq!(
            members,
            &[Term::Blank("d.ttl$anon$1".into()), Term::iri("http://e/p")]
        );
        assert_eq!(
            store.property_values(&members[0], &["index"]),
            vec![Term::integer(0)]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let mut store = TripleStore::new();
        store.add_triple("s", "p", Term::integer(1));
        store.add_triple("s", "p", Term::integer(1));
        assert_eq!(store.objects("s", "p").len(), 2);
    }

    #[test]
    fn copy_from_does_not_double_class_entries() {
        let mut source = TripleStore::new();
        source.add_triple("plug", TYPE, Term::iri("Plugin"));
        source.add_triple("plug", "name", Term::string("Amp"));

        let mut copy = TripleStore::new();
        copy.copy_from(&source);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.objects(CLASSES, "Plugin"), &[Term::iri("plug")]);
    }

    #[test]
    fn generation_tracks_pending_reindex() {
        let mut store = TripleStore::new();
        assert!(!store.needs_reindex());
        store.add_triple("s", "p", Term::integer(1));
        assert!(store.needs_reindex());
        store.reindex();
        assert!(!store.needs_reindex());
    }

    #[test]
    fn dump_is_sorted() {
        let mut store = TripleStore::new();
        store.add_triple("b", "p", Term::integer(2));
        store.add_triple("a", "p", Term::integer(1));
        store.add_triple("a", "p", Term::string("x"));
        let mut out = Vec::new();
        store.dump(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a p [1, \"x\"]\nb p [2]\n"
        );
    }
}
