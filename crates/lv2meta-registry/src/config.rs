use crate::vocab::LV2_PLUGIN;
use lv2meta_ttl::ParseOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable with a colon-separated list of bundle directories.
pub const LV2_PATH_ENV: &str = "LV2_PATH";

/// Where to look for bundles and how to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directories scanned for `*.lv2` bundles, in order.
    pub search_paths: Vec<PathBuf>,
    /// Root of the category tree and of the plugin list.
    pub root_class: String,
    /// Load the `rdfs:seeAlso` documents of every `lv2:Specification` into
    /// the manifest store.
    pub load_specifications: bool,
    pub parse: ParseOptions,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![
                PathBuf::from("/usr/lib/lv2"),
                PathBuf::from("/usr/local/lib/lv2"),
            ],
            root_class: LV2_PLUGIN.to_string(),
            load_specifications: true,
            parse: ParseOptions::default(),
        }
    }
}

impl RegistryConfig {
    /// Defaults, with search paths taken from `LV2_PATH` when it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(paths) = env::var_os(LV2_PATH_ENV) {
            let paths: Vec<PathBuf> = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !paths.is_empty() {
                config.search_paths = paths;
            }
        }
        config
    }

    pub fn with_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}
