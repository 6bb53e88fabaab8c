//! Subclass and subproperty closure tables.
//!
//! [`TripleStore::reindex`] scans the `rdfs:subClassOf` and
//! `rdfs:subPropertyOf` rows and, for every URI, computes the set of all
//! direct and indirect descendants by a memoized depth-first walk.
//!
//! Cycles are cut, not followed: a URI whose expansion is still in progress
//! contributes nothing when it is reached again, and the cut edge is reported
//! in the [`ReindexReport`].
//!
//! Cutting is order dependent. A URI finished inside a cycle keeps the set it
//! had when the cut happened, and URIs outside the cycle that reach it
//! through that member inherit the shorter set. Roots are expanded in sorted
//! order, so the result is deterministic for a given set of triples. With
//! `E ⊂ A`, `A ⊂ B`, `B ⊂ A` and `B ⊂ X`, `A` is expanded first and finishes
//! `B` before reaching `E`, so `X` gets `{A, B}` without `E`.

use crate::TripleStore;
use lv2meta_ttl::vocab::{RDFS_SUBCLASS_OF, RDFS_SUBPROPERTY_OF};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyKind {
    Class,
    Property,
}

impl HierarchyKind {
    fn predicate(self) -> &'static str {
        match self {
            HierarchyKind::Class => RDFS_SUBCLASS_OF,
            HierarchyKind::Property => RDFS_SUBPROPERTY_OF,
        }
    }
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyKind::Class => f.write_str("class"),
            HierarchyKind::Property => f.write_str("property"),
        }
    }
}

/// An edge dropped because following it would re-enter a URI that is still
/// being expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleBreak {
    pub kind: HierarchyKind,
    /// URI whose expansion reached `node` again.
    pub via: String,
    /// URI already in progress.
    pub node: String,
}

/// Outcome of one [`TripleStore::reindex`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Classes with at least one subclass.
    pub classes: usize,
    /// Properties with at least one subproperty.
    pub properties: usize,
    pub cycles: Vec<CycleBreak>,
}

impl ReindexReport {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    Visiting,
    Done,
}

/// Direct and transitive descendants for one kind of hierarchy.
#[derive(Debug, Clone, Default)]
pub(crate) struct Hierarchy {
    direct: BTreeMap<String, BTreeSet<String>>,
    transitive: BTreeMap<String, BTreeSet<String>>,
}

impl Hierarchy {
    fn build(store: &TripleStore, kind: HierarchyKind, cycles: &mut Vec<CycleBreak>) -> Self {
        let mut hierarchy = Hierarchy::default();
        for (child, parents) in store.by_property(kind.predicate()) {
            for parent in parents.iter().filter_map(|p| p.as_node()) {
                hierarchy
                    .direct
                    .entry(parent.to_string())
                    .or_default()
                    .insert(child.to_string());
            }
        }

        let mut visit: BTreeMap<String, Visit> = BTreeMap::new();
        let roots: Vec<String> = hierarchy.direct.keys().cloned().collect();
        for root in roots {
            if state(&visit, &root) == Visit::Unvisited {
                hierarchy.expand(&root, kind, &mut visit, cycles);
            }
        }
        hierarchy
    }

    /// Depth-first expansion from `root` with an explicit frame stack, so
    /// arbitrarily deep hierarchies do not grow the call stack.
    fn expand(
        &mut self,
        root: &str,
        kind: HierarchyKind,
        visit: &mut BTreeMap<String, Visit>,
        cycles: &mut Vec<CycleBreak>,
    ) {
        let mut stack = vec![Frame::enter(&self.direct, root, visit)];

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.children.get(frame.next).cloned() else {
                if let Some(done) = stack.pop() {
                    visit.insert(done.node.clone(), Visit::Done);
                    self.transitive.insert(done.node, done.all);
                }
                continue;
            };

            match state(visit, &child) {
                Visit::Unvisited => {
                    // Revisit this child once its own frame is done.
                    stack.push(Frame::enter(&self.direct, &child, visit));
                    continue;
                }
                Visit::Visiting => {
                    warn!(%kind, via = %frame.node, node = %child, "hierarchy cycle, edge ignored");
                    cycles.push(CycleBreak {
                        kind,
                        via: frame.node.clone(),
                        node: child.clone(),
                    });
                }
                Visit::Done => {}
            }

            frame.next += 1;
            if let Some(below) = self.transitive.get(&child) {
                frame.all.extend(below.iter().cloned());
            }
            frame.all.insert(child);
        }
    }

    fn direct_of(&self, node: &str) -> impl Iterator<Item = &str> {
        self.direct.get(node).into_iter().flatten().map(String::as_str)
    }

    fn transitive_of(&self, node: &str) -> impl Iterator<Item = &str> {
        self.transitive
            .get(node)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    fn descends(&self, node: &str, ancestor: &str) -> bool {
        node == ancestor
            || self
                .transitive
                .get(ancestor)
                .is_some_and(|below| below.contains(node))
    }
}

/// One URI whose children are being expanded.
struct Frame {
    node: String,
    children: Vec<String>,
    next: usize,
    all: BTreeSet<String>,
}

impl Frame {
    fn enter(
        direct: &BTreeMap<String, BTreeSet<String>>,
        node: &str,
        visit: &mut BTreeMap<String, Visit>,
    ) -> Self {
        visit.insert(node.to_string(), Visit::Visiting);
        Frame {
            node: node.to_string(),
            children: direct
                .get(node)
                .map(|c| c.iter().cloned().collect())
                .unwrap_or_default(),
            next: 0,
            all: BTreeSet::new(),
        }
    }
}

fn state(visit: &BTreeMap<String, Visit>, node: &str) -> Visit {
    visit.get(node).copied().unwrap_or(Visit::Unvisited)
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ClosureTables {
    subclasses: Hierarchy,
    subprops: Hierarchy,
    /// Store generation the tables were computed at.
    pub(crate) generation: u64,
}

// ============================================================================
// Store API
// ============================================================================

impl TripleStore {
    /// Rebuild the subclass and subproperty closure tables from scratch.
    ///
    /// Idempotent: calling it twice without inserts in between yields the
    /// same tables and the same report.
    pub fn reindex(&mut self) -> ReindexReport {
        let mut cycles = Vec::new();
        let subclasses = Hierarchy::build(self, HierarchyKind::Class, &mut cycles);
        let subprops = Hierarchy::build(self, HierarchyKind::Property, &mut cycles);

        let report = ReindexReport {
            classes: subclasses.direct.len(),
            properties: subprops.direct.len(),
            cycles,
        };
        debug!(
            classes = report.classes,
            properties = report.properties,
            cycles = report.cycles.len(),
            "reindexed closure tables"
        );

        self.closure = ClosureTables {
            subclasses,
            subprops,
            generation: self.generation,
        };
        report
    }

    /// Direct subclasses of `class`.
    pub fn direct_subclasses_of(&self, class: &str) -> impl Iterator<Item = &str> {
        self.closure.subclasses.direct_of(class)
    }

    /// All direct and indirect subclasses of `class`, sorted.
    pub fn subclasses_of(&self, class: &str) -> impl Iterator<Item = &str> {
        self.closure.subclasses.transitive_of(class)
    }

    pub fn direct_subproperties_of(&self, property: &str) -> impl Iterator<Item = &str> {
        self.closure.subprops.direct_of(property)
    }

    /// All direct and indirect subproperties of `property`, sorted.
    pub fn subproperties_of(&self, property: &str) -> impl Iterator<Item = &str> {
        self.closure.subprops.transitive_of(property)
    }

    /// `class` is `ancestor` or one of its transitive subclasses.
    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.closure.subclasses.descends(class, ancestor)
    }

    /// `property` is `ancestor` or one of its transitive subproperties.
    pub fn is_subproperty_of(&self, property: &str, ancestor: &str) -> bool {
        self.closure.subprops.descends(property, ancestor)
    }
}
