use lv2meta_store::{LoadError, QueryError};
use thiserror::Error;

/// Why a plugin record could not be produced.
///
/// `PluginNotFound` means the URI is unknown; every other variant means the
/// plugin exists but its metadata is unreadable or malformed.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("plugin {uri} not found")]
    PluginNotFound { uri: String },

    #[error("plugin {plugin}: {source}")]
    Document {
        plugin: String,
        #[source]
        source: LoadError,
    },

    #[error("plugin {plugin}: {source}")]
    Query {
        plugin: String,
        #[source]
        source: QueryError,
    },

    #[error("{subject} has no `{property}`")]
    MissingProperty {
        subject: String,
        property: &'static str,
    },

    #[error("{subject}: `{property}` has unusable value {value}")]
    InvalidValue {
        subject: String,
        property: &'static str,
        value: String,
    },
}
