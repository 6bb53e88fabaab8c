use lv2meta_store::{HierarchyKind, TripleStore, CLASSES, TYPE};
use lv2meta_ttl::vocab::{RDFS_SUBCLASS_OF, RDFS_SUBPROPERTY_OF};
use lv2meta_ttl::Term;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const MAX_NODES: usize = 12;

fn node(i: usize) -> String {
    format!("http://e/#C{i}")
}

/// Edges `(child, parent)` with `child > parent`, so the graph is acyclic.
fn dag_edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((1..MAX_NODES, 0..MAX_NODES), 0..30).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(a, b)| (a, b % a))
            .collect()
    })
}

fn any_edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..MAX_NODES, 0..MAX_NODES), 0..30)
}

fn build(edges: &[(usize, usize)]) -> TripleStore {
    let mut store = TripleStore::new();
    for (child, parent) in edges {
        store.add_triple(&node(*child), RDFS_SUBCLASS_OF, Term::iri(node(*parent)));
    }
    store
}

/// Reference closure: everything that reaches `class` by following
/// child -> parent edges one or more times.
fn descendants(edges: &[(usize, usize)], class: usize) -> BTreeSet<String> {
    let mut children: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (child, parent) in edges {
        children.entry(*parent).or_default().push(*child);
    }
    let mut out = BTreeSet::new();
    let mut stack = children.get(&class).cloned().unwrap_or_default();
    while let Some(next) = stack.pop() {
        if out.insert(node(next)) {
            stack.extend(children.get(&next).cloned().unwrap_or_default());
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn closure_matches_reachability_on_dags(edges in dag_edges()) {
        let mut store = build(&edges);
        let report = store.reindex();
        prop_assert!(report.cycles.is_empty());
        for class in 0..MAX_NODES {
            let got: BTreeSet<String> =
                store.subclasses_of(&node(class)).map(str::to_string).collect();
            prop_assert_eq!(got, descendants(&edges, class));
        }
    }

    /// Any graph, cycles included: reindex terminates, never invents classes,
    /// and running it again changes nothing.
    #[test]
    fn reindex_is_total_and_idempotent(edges in any_edges()) {
        let mut store = build(&edges);
        let first = store.reindex();
        let tables: Vec<Vec<String>> = (0..MAX_NODES)
            .map(|c| store.subclasses_of(&node(c)).map(str::to_string).collect())
            .collect();

        for (class, below) in tables.iter().enumerate() {
            let reachable = descendants(&edges, class);
            for sub in below {
                prop_assert!(reachable.contains(sub));
            }
        }

        let second = store.reindex();
        prop_assert_eq!(first, second);
        let again: Vec<Vec<String>> = (0..MAX_NODES)
            .map(|c| store.subclasses_of(&node(c)).map(str::to_string).collect())
            .collect();
        prop_assert_eq!(tables, again);
    }

    /// Subproperty graphs, cycles included: only property breaks are
    /// reported and transitive lookups return each stored value once.
    #[test]
    fn subproperty_reindex_is_total(edges in any_edges()) {
        let mut store = TripleStore::new();
        for (child, parent) in &edges {
            store.add_triple(&node(*child), RDFS_SUBPROPERTY_OF, Term::iri(node(*parent)));
        }
        for p in 0..MAX_NODES {
            store.add_triple("http://e/#s", &node(p), Term::integer(p as i64));
        }

        let first = store.reindex();
        prop_assert!(first.cycles.iter().all(|c| c.kind == HierarchyKind::Property));
        prop_assert_eq!(&first, &store.reindex());

        for p in 0..MAX_NODES {
            let reachable = descendants(&edges, p);
            let below: Vec<&str> = store.subproperties_of(&node(p)).collect();
            for sub in &below {
                prop_assert!(reachable.contains(*sub));
            }
            let values = store.property_values_trans("http://e/#s", &[node(p).as_str()]);
            let distinct: BTreeSet<String> = values.iter().map(|t| t.to_string()).collect();
            prop_assert_eq!(values.len(), distinct.len());
            prop_assert!(values.len() <= MAX_NODES);
        }
    }

    /// Every triple is visible through both indexes, and typed subjects show
    /// up under `$classes`.
    #[test]
    fn indexes_agree(
        rows in prop::collection::vec((0..6usize, 0..4usize, 0..6usize), 1..40)
    ) {
        let mut store = TripleStore::new();
        for (s, p, o) in &rows {
            let predicate = if *p == 0 { TYPE.to_string() } else { format!("p{p}") };
            store.add_triple(&format!("s{s}"), &predicate, Term::iri(format!("o{o}")));
        }
        prop_assert_eq!(store.len(), rows.len());

        for (s, p, o) in &rows {
            let subject = format!("s{s}");
            let predicate = if *p == 0 { TYPE.to_string() } else { format!("p{p}") };
            let object = Term::iri(format!("o{o}"));

            prop_assert!(store.objects(&subject, &predicate).contains(&object));
            let in_predicate_index = store
                .by_property(&predicate)
                .any(|(s, objects)| s == subject && objects.contains(&object));
            prop_assert!(in_predicate_index);

            if *p == 0 {
                let obj = format!("o{o}");
                prop_assert!(store.by_type(&obj).contains(subject.as_str()));
                prop_assert!(store
                    .objects(CLASSES, &obj)
                    .contains(&Term::iri(subject.clone())));
            }
        }
    }
}
