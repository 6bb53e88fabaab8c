//! Registry tests over on-disk bundle fixtures.

use lv2meta_registry::vocab::MIDI_EVENT;
use lv2meta_registry::{Lv2Registry, RegistryConfig, RegistryError};
use lv2meta_ttl::Literal;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PREFIXES: &str = r#"
@prefix lv2:  <http://lv2plug.in/ns/lv2core#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix doap: <http://usefulinc.com/ns/doap#> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix ev:   <http://lv2plug.in/ns/ext/event#> .
"#;

const CORE_MANIFEST: &str = r#"
<http://lv2plug.in/ns/lv2core> a lv2:Specification ;
    rdfs:seeAlso <lv2.ttl> .
"#;

const CORE_SPEC: &str = r#"
lv2:Plugin a rdfs:Class ; rdfs:label "Plugin" .
lv2:FilterPlugin rdfs:subClassOf lv2:Plugin ; rdfs:label "Filter" .
lv2:LowpassPlugin rdfs:subClassOf lv2:FilterPlugin ; rdfs:label "Lowpass" .
lv2:DelayPlugin rdfs:subClassOf lv2:Plugin ; rdfs:label "Delay" .
"#;

const AMP_MANIFEST: &str = r#"
<http://e/amp> a lv2:Plugin ; rdfs:seeAlso <amp.ttl> .
"#;

const AMP: &str = r#"
<http://e/ns#SidechainPort> rdfs:subClassOf lv2:AudioPort .

<http://e/amp>
    a lv2:Plugin ;
    doap:name "Amp"@en , "Verstaerker"@de ;
    doap:license <http://opensource.org/licenses/isc> ;
    doap:maintainer [ foaf:name "Jane" ; foaf:mbox <mailto:jane@example.org> ] ;
    lv2:optionalFeature lv2:hardRTCapable ;
    lv2:port [
        a lv2:AudioPort , lv2:OutputPort ;
        lv2:index 2 ; lv2:symbol "out" ; lv2:name "Out"
    ] , [
        a lv2:ControlPort , lv2:InputPort ;
        lv2:index 0 ; lv2:symbol "gain" ; lv2:name "Gain" ;
        lv2:default 0.0 ; lv2:minimum -90.0 ; lv2:maximum 24 ;
        lv2:scalePoint [ rdfs:label "unity" ; <http://www.w3.org/1999/02/22-rdf-syntax-ns#value> 0.0 ] ,
                       [ rdfs:label "no value" ]
    ] , [
        a <http://e/ns#SidechainPort> , lv2:InputPort ;
        lv2:index 1 ; lv2:symbol "in" ; lv2:name "In"
    ] , [
        a ev:EventPort , lv2:InputPort ;
        lv2:index 3 ; lv2:symbol "midi" ; lv2:name "MIDI In" ;
        ev:supportsEvent <http://lv2plug.in/ns/ext/midi#MidiEvent>
    ] .
"#;

const DELAY_MANIFEST: &str = r#"
<http://e/delay> a lv2:DelayPlugin ; rdfs:seeAlso <delay.ttl> .
"#;

const DELAY: &str = r#"
<http://e/delay> doap:name "Delay" .
"#;

const BROKEN_MANIFEST: &str = r#"
<http://e/broken> a lv2:LowpassPlugin ; rdfs:seeAlso <missing.ttl> .
"#;

fn write_bundle(root: &Path, bundle: &str, files: &[(&str, &str)]) {
    let dir = root.join(bundle);
    fs::create_dir_all(&dir).expect("bundle dir");
    for (name, body) in files {
        fs::write(dir.join(name), format!("{PREFIXES}{body}")).expect("write fixture");
    }
}

fn fixture() -> TempDir {
    let root = tempfile::tempdir().expect("tempdir");
    write_bundle(
        root.path(),
        "core.lv2",
        &[("manifest.ttl", CORE_MANIFEST), ("lv2.ttl", CORE_SPEC)],
    );
    write_bundle(
        root.path(),
        "amp.lv2",
        &[("manifest.ttl", AMP_MANIFEST), ("amp.ttl", AMP)],
    );
    write_bundle(
        root.path(),
        "delay.lv2",
        &[("manifest.ttl", DELAY_MANIFEST), ("delay.ttl", DELAY)],
    );
    write_bundle(root.path(), "broken.lv2", &[("manifest.ttl", BROKEN_MANIFEST)]);
    // Malformed manifest: skipped without affecting the others.
    write_bundle(root.path(), "garbage.lv2", &[("manifest.ttl", "<http://e/x> a undefined:Thing .")]);
    // Not a bundle.
    write_bundle(root.path(), "notes", &[("manifest.ttl", "<http://e/ignored> a lv2:Plugin .")]);
    root
}

fn registry(root: &TempDir) -> Lv2Registry {
    let config = RegistryConfig::default().with_search_paths([root.path().to_path_buf()]);
    Lv2Registry::load(config)
}

#[test]
fn test_plugin_list_includes_subclass_typed_plugins() {
    let root = fixture();
    let registry = registry(&root);
    let uris: Vec<&str> = registry.plugin_uris().collect();
    assert_eq!(uris, vec!["http://e/amp", "http://e/broken", "http://e/delay"]);
}

#[test]
fn test_categories_come_from_specification_documents() {
    let root = fixture();
    let registry = registry(&root);
    let categories: Vec<(Vec<Option<String>>, &str)> = registry
        .categories()
        .iter()
        .map(|c| (c.path.clone(), c.class.as_str()))
        .collect();
    let label = |s: &str| Some(s.to_string());
    assert_eq!(
        categories,
        vec![
            (vec![], "http://lv2plug.in/ns/lv2core#Plugin"),
            (vec![label("Delay")], "http://lv2plug.in/ns/lv2core#DelayPlugin"),
            (vec![label("Filter")], "http://lv2plug.in/ns/lv2core#FilterPlugin"),
            (
                vec![label("Filter"), label("Lowpass")],
                "http://lv2plug.in/ns/lv2core#LowpassPlugin"
            ),
        ]
    );
}

#[test]
fn test_one_unreadable_plugin_does_not_block_the_others() {
    let root = fixture();
    let mut registry = registry(&root);
    let infos = registry.plugin_infos();
    let uris: Vec<&str> = infos.iter().map(|i| i.uri.as_str()).collect();
    assert_eq!(uris, vec!["http://e/amp", "http://e/delay"]);

    let err = registry.plugin_info("http://e/broken").unwrap_err();
    assert!(matches!(err, RegistryError::Document { .. }));
    assert!(registry.world("http://e/broken").is_none());
}

#[test]
fn test_unknown_plugin_is_not_found() {
    let root = fixture();
    let mut registry = registry(&root);
    let err = registry.plugin_info("http://e/ignored").unwrap_err();
    assert!(matches!(err, RegistryError::PluginNotFound { .. }));
}

#[test]
fn test_plugin_record_runs_the_full_query_battery() {
    let root = fixture();
    let mut registry = registry(&root);
    let info = registry.plugin_info("http://e/amp").expect("amp");

    assert_eq!(info.name, "Amp");
    assert_eq!(info.license.as_deref(), Some("http://opensource.org/licenses/isc"));
    assert_eq!(info.classes, vec!["http://lv2plug.in/ns/lv2core#Plugin"]);
    assert!(info
        .optional_features
        .contains("http://lv2plug.in/ns/lv2core#hardRTCapable"));
    assert!(info.required_features.is_empty());
    assert_eq!(info.maintainers.len(), 1);
    assert_eq!(info.maintainers[0].name, "Jane");
    assert_eq!(info.maintainers[0].mbox.as_deref(), Some("mailto:jane@example.org"));
    assert_eq!(info.maintainers[0].homepage, None);

    let symbols: Vec<&str> = info.ports.iter().map(|p| p.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["gain", "in", "out", "midi"]);

    let gain = info.port_by_symbol("gain").expect("gain");
    assert!(gain.kinds.control && gain.kinds.input);
    assert_eq!(gain.default_value, Some(Literal::Float(0.0)));
    assert_eq!(gain.minimum, Some(Literal::Float(-90.0)));
    assert_eq!(gain.maximum, Some(Literal::Integer(24)));
    assert_eq!(gain.scale_points.len(), 1);
    assert_eq!(gain.scale_points[0].label, "unity");
    assert_eq!(gain.scale_points[0].value, Literal::Float(0.0));

    // Classified through the subclass closure.
    let sidechain = info.port_by_symbol("in").expect("in");
    assert!(sidechain.kinds.audio && sidechain.kinds.input);
    assert_eq!(sidechain.default_value, None);

    let out = info.port_by_symbol("out").expect("out");
    assert!(out.connectable_to(sidechain));
    assert!(sidechain.connectable_to(out));
    assert!(!out.connectable_to(gain));
    assert!(info.port(&out.uri).is_some());

    let midi = info.port_by_symbol("midi").expect("midi");
    assert!(midi.kinds.event);
    assert!(midi.events.contains(MIDI_EVENT));
    assert_eq!(midi.event_type_names().collect::<Vec<_>>(), vec!["MIDI"]);

    // The world is cached after the first load.
    assert!(registry.world("http://e/amp").is_some());
    let again = registry.plugin_info("http://e/amp").expect("cached");
    assert_eq!(again, info);
}

#[test]
fn test_plugin_records_serialize() {
    let root = fixture();
    let mut registry = registry(&root);
    let info = registry.plugin_info("http://e/delay").expect("delay");
    let json = serde_json::to_value(&info).expect("json");
    assert_eq!(json["name"], "Delay");
    assert_eq!(json["ports"], serde_json::json!([]));
}

#[test]
fn test_missing_search_paths_yield_an_empty_registry() {
    let config = RegistryConfig::default().with_search_paths(["/nonexistent/lv2meta"]);
    let registry = Lv2Registry::load(config);
    assert_eq!(registry.plugin_uris().count(), 0);
    assert_eq!(registry.categories().len(), 1);
}
