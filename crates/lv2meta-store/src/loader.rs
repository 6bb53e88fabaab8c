//! Loading documents into a store.
//!
//! By default a document is parsed completely before any of its triples are
//! committed, so a failing document contributes nothing. With
//! [`ParseOptions::keep_partial`] triples are committed as they are parsed,
//! which leaves a prefix of a broken document behind for inspection.

use crate::TripleStore;
use lv2meta_ttl::{parse_document, parse_into, ParseError, ParseOptions, ParseStats};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {uri} ({}): {source}", .path.display())]
    Io {
        uri: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot load {uri}: only file paths and file:// URIs are supported")]
    UnsupportedUri { uri: String },
}

impl LoadError {
    /// The document that failed to load.
    pub fn uri(&self) -> &str {
        match self {
            LoadError::Io { uri, .. } | LoadError::UnsupportedUri { uri } => uri,
            LoadError::Parse(err) => err.uri(),
        }
    }
}

/// Map a document URI to a local path.
///
/// `file://` URIs and bare paths are accepted; any other scheme is not.
pub fn document_path(uri: &str) -> Result<PathBuf, LoadError> {
    if let Some(path) = uri.strip_prefix("file://") {
        // `file://localhost/x` names the same file as `file:///x`.
        let path = path.strip_prefix("localhost").unwrap_or(path);
        return Ok(PathBuf::from(path));
    }
    if has_scheme(uri) {
        return Err(LoadError::UnsupportedUri {
            uri: uri.to_string(),
        });
    }
    Ok(PathBuf::from(uri))
}

fn has_scheme(uri: &str) -> bool {
    match uri.split_once(':') {
        Some((scheme, _)) => {
            // A one-letter "scheme" is a drive letter.
            scheme.len() > 1
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

impl TripleStore {
    /// Parse `content` as the document `uri` and add its triples.
    pub fn load_str(
        &mut self,
        uri: &str,
        content: &str,
        options: &ParseOptions,
    ) -> Result<ParseStats, LoadError> {
        let stats = if options.keep_partial {
            parse_into(uri, content, options, self)?
        } else {
            let doc = parse_document(uri, content, options)?;
            for triple in doc.triples {
                self.add_triple(&triple.subject, &triple.predicate, triple.object);
            }
            doc.stats
        };
        debug!(
            uri,
            triples = stats.triples,
            skipped = stats.skipped,
            "loaded document"
        );
        Ok(stats)
    }

    /// Read the document at `uri` and add its triples.
    ///
    /// The file is read completely before parsing starts.
    pub fn load_file(&mut self, uri: &str, options: &ParseOptions) -> Result<ParseStats, LoadError> {
        let path = document_path(uri)?;
        let content = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            uri: uri.to_string(),
            path,
            source,
        })?;
        self.load_str(uri, &content, options)
    }
}
