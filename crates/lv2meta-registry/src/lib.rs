//! LV2 plugin discovery on top of the triple store.
//!
//! [`Lv2Registry::load`] builds one shared store from every bundle manifest
//! on the search path. Plugin records are produced lazily: each plugin gets
//! its own world (the manifests plus the plugin's `rdfs:seeAlso` documents),
//! which is cached after the first successful load.

pub mod config;
pub mod error;
pub mod plugin;
pub mod vocab;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use plugin::{event_type_name, Maintainer, PluginInfo, PortInfo, PortKinds, ScalePoint};

use ahash::AHashMap;
use lv2meta_store::TripleStore;
use lv2meta_ttl::vocab::{RDFS_LABEL, RDFS_SEE_ALSO};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One node of the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Labels from just below the root down to this class. `None` where a
    /// class has no `rdfs:label`.
    pub path: Vec<Option<String>>,
    pub class: String,
}

pub struct Lv2Registry {
    config: RegistryConfig,
    manifests: TripleStore,
    plugins: BTreeSet<String>,
    categories: Vec<Category>,
    worlds: AHashMap<String, TripleStore>,
}

impl Lv2Registry {
    /// Scan the search paths and build the manifest store.
    ///
    /// Unreadable or malformed manifests are logged and skipped.
    pub fn load(config: RegistryConfig) -> Self {
        let mut manifests = TripleStore::new();
        let mut loaded = 0usize;

        for manifest in find_manifests(&config.search_paths) {
            let uri = manifest.to_string_lossy();
            match manifests.load_file(&uri, &config.parse) {
                Ok(_) => loaded += 1,
                Err(err) => warn!(uri = %uri, error = %err, "skipping manifest"),
            }
        }

        if config.load_specifications {
            let documents: BTreeSet<String> = manifests
                .by_type(vocab::LV2_SPECIFICATION)
                .into_iter()
                .flat_map(|spec| see_also(&manifests, spec))
                .collect();
            for uri in documents {
                if let Err(err) = manifests.load_file(&uri, &config.parse) {
                    warn!(uri = %uri, error = %err, "skipping specification document");
                }
            }
        }

        manifests.reindex();

        let plugins: BTreeSet<String> = manifests
            .by_type_with_subclasses(&config.root_class)
            .into_iter()
            .map(str::to_string)
            .collect();
        let categories = build_categories(&manifests, &config.root_class);

        info!(
            manifests = loaded,
            plugins = plugins.len(),
            categories = categories.len(),
            "loaded LV2 registry"
        );

        Self {
            config,
            manifests,
            plugins,
            categories,
            worlds: AHashMap::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The shared store built from all manifests.
    pub fn manifests(&self) -> &TripleStore {
        &self.manifests
    }

    /// Category tree in depth-first order, root first.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// URIs of every plugin, sorted.
    pub fn plugin_uris(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(String::as_str)
    }

    /// Cached world of a plugin whose record was loaded before.
    pub fn world(&self, uri: &str) -> Option<&TripleStore> {
        self.worlds.get(uri)
    }

    /// Full record of one plugin.
    pub fn plugin_info(&mut self, uri: &str) -> Result<PluginInfo, RegistryError> {
        if !self.plugins.contains(uri) {
            return Err(RegistryError::PluginNotFound {
                uri: uri.to_string(),
            });
        }

        if !self.worlds.contains_key(uri) {
            let world = self.load_world(uri)?;
            self.worlds.insert(uri.to_string(), world);
        }
        let world = self
            .worlds
            .get(uri)
            .ok_or_else(|| RegistryError::PluginNotFound {
                uri: uri.to_string(),
            })?;
        plugin::read_plugin(world, uri)
    }

    /// Records of every plugin. Plugins that fail are logged and left out.
    pub fn plugin_infos(&mut self) -> Vec<PluginInfo> {
        let uris: Vec<String> = self.plugins.iter().cloned().collect();
        let mut out = Vec::with_capacity(uris.len());
        for uri in uris {
            match self.plugin_info(&uri) {
                Ok(info) => out.push(info),
                Err(err) => warn!(plugin = %uri, error = %err, "skipping plugin"),
            }
        }
        out
    }

    fn load_world(&self, uri: &str) -> Result<TripleStore, RegistryError> {
        let mut world = self.manifests.clone();
        for document in see_also(&self.manifests, uri) {
            debug!(plugin = uri, document = %document, "loading plugin document");
            world
                .load_file(&document, &self.config.parse)
                .map_err(|source| RegistryError::Document {
                    plugin: uri.to_string(),
                    source,
                })?;
        }
        world.reindex();
        Ok(world)
    }
}

fn see_also(store: &TripleStore, subject: &str) -> Vec<String> {
    store
        .objects(subject, RDFS_SEE_ALSO)
        .iter()
        .filter_map(|t| t.as_node().map(str::to_string))
        .collect()
}

/// `<dir>/*.lv2/manifest.ttl` for every search directory, sorted per
/// directory. Missing directories are skipped.
fn find_manifests(search_paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for dir in search_paths {
        let bundles = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in bundles {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    debug!(dir = %dir.display(), error = %err, "cannot scan LV2 directory");
                    continue;
                }
            };
            if !entry.file_type().is_dir() || !is_bundle(entry.path()) {
                continue;
            }
            let manifest = entry.path().join("manifest.ttl");
            if manifest.is_file() {
                out.push(manifest);
            }
        }
    }
    out
}

fn is_bundle(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "lv2")
}

fn label_of(store: &TripleStore, class: &str) -> Option<String> {
    store
        .property_values(class, &[RDFS_LABEL])
        .into_iter()
        .find_map(|t| t.as_str().map(str::to_string))
}

/// Depth-first walk down the subclass edges from `root`. Each class is
/// listed once, under the first parent that reaches it.
fn build_categories(store: &TripleStore, root: &str) -> Vec<Category> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    let mut stack = vec![(Vec::new(), root.to_string())];
    seen.insert(root.to_string());

    while let Some((parents, class)) = stack.pop() {
        let mut chain: Vec<Option<String>> = parents;
        chain.push(label_of(store, &class));

        // Children are pushed in reverse so the walk visits them in order.
        let children: Vec<String> = store
            .direct_subclasses_of(&class)
            .filter(|c| seen.insert(c.to_string()))
            .map(str::to_string)
            .collect();
        for child in children.into_iter().rev() {
            stack.push((chain.clone(), child));
        }

        out.push(Category {
            path: chain.into_iter().skip(1).collect(),
            class,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv2meta_ttl::vocab::RDFS_SUBCLASS_OF;
    use lv2meta_ttl::Term;

    #[test]
    fn categories_follow_the_subclass_tree() {
        let mut store = TripleStore::new();
        let edges = [("Filter", "Plugin"), ("Lowpass", "Filter"), ("Delay", "Plugin")];
        for (child, parent) in edges {
            store.add_triple(child, RDFS_SUBCLASS_OF, Term::iri(parent));
        }
        store.add_triple("Plugin", RDFS_LABEL, Term::string("Plugin"));
        store.add_triple("Filter", RDFS_LABEL, Term::string("Filters"));
        store.add_triple("Lowpass", RDFS_LABEL, Term::string("Lowpass"));
        store.reindex();

        let categories = build_categories(&store, "Plugin");
        let rendered: Vec<(Vec<Option<&str>>, &str)> = categories
            .iter()
            .map(|c| {
                (
                    c.path.iter().map(|l| l.as_deref()).collect(),
                    c.class.as_str(),
                )
            })
            .collect();
        assert_eq!(
            rendered,
            vec![
                (vec![], "Plugin"),
                (vec![None], "Delay"),
                (vec![Some("Filters")], "Filter"),
                (vec![Some("Filters"), Some("Lowpass")], "Lowpass"),
            ]
        );
    }

    #[test]
    fn category_walk_survives_cycles() {
        let mut store = TripleStore::new();
        store.add_triple("A", RDFS_SUBCLASS_OF, Term::iri("Plugin"));
        store.add_triple("B", RDFS_SUBCLASS_OF, Term::iri("A"));
        store.add_triple("A", RDFS_SUBCLASS_OF, Term::iri("B"));
        store.reindex();

        let classes: Vec<String> = build_categories(&store, "Plugin")
            .into_iter()
            .map(|c| c.class)
            .collect();
        assert_eq!(classes, vec!["Plugin", "A", "B"]);
    }

    #[test]
    fn bundle_directories_need_the_lv2_extension() {
        assert!(is_bundle(Path::new("/usr/lib/lv2/amp.lv2")));
        assert!(!is_bundle(Path::new("/usr/lib/lv2/amp")));
    }
}
