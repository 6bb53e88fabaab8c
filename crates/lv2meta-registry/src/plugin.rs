//! Plugin and port records, and the queries that fill them in.

use crate::error::RegistryError;
use crate::vocab::*;
use lv2meta_store::{TripleStore, TYPE};
use lv2meta_ttl::vocab::{RDFS_LABEL, RDF_VALUE};
use lv2meta_ttl::{Literal, Term};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Records
// ============================================================================

/// Port classification flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortKinds {
    pub audio: bool,
    pub control: bool,
    pub event: bool,
    pub string: bool,
    pub input: bool,
    pub output: bool,
    pub larsl_midi: bool,
}

impl PortKinds {
    /// Classify from the port's classes. Subclasses of a port class count.
    pub fn from_classes<'a>(
        world: &TripleStore,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let classes: Vec<&str> = classes.into_iter().collect();
        let is = |ancestor: &str| classes.iter().any(|c| world.is_subclass_of(c, ancestor));
        Self {
            audio: is(LV2_AUDIO_PORT),
            control: is(LV2_CONTROL_PORT),
            event: is(EVENT_PORT),
            string: is(STRING_PORT),
            input: is(LV2_INPUT_PORT),
            output: is(LV2_OUTPUT_PORT),
            larsl_midi: is(LARSL_MIDI_PORT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalePoint {
    pub label: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortInfo {
    pub uri: String,
    pub index: u32,
    pub symbol: String,
    pub name: String,
    pub classes: BTreeSet<String>,
    pub kinds: PortKinds,
    pub scale_points: Vec<ScalePoint>,
    pub default_value: Option<Literal>,
    pub minimum: Option<Literal>,
    pub maximum: Option<Literal>,
    pub tiny_name: Option<String>,
    pub properties: BTreeSet<String>,
    pub events: BTreeSet<String>,
}

impl PortInfo {
    /// Whether an output of one port may feed an input of the other.
    ///
    /// Directions must be opposite and the audio/control/event flags must
    /// agree; ports of none of those kinds never connect.
    pub fn connectable_to(&self, other: &PortInfo) -> bool {
        let (a, b) = (&self.kinds, &other.kinds);
        if !((a.input && b.output) || (a.output && b.input)) {
            return false;
        }
        if a.audio != b.audio || a.control != b.control || a.event != b.event {
            return false;
        }
        a.audio || a.control || a.event
    }

    /// Friendly names of the event types this port supports, where known.
    pub fn event_type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.events.iter().filter_map(|uri| event_type_name(uri))
    }
}

/// Short display name of an event type URI.
pub fn event_type_name(uri: &str) -> Option<&'static str> {
    match uri {
        MIDI_EVENT => Some("MIDI"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    pub homepage: Option<String>,
    pub mbox: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub uri: String,
    pub name: String,
    pub license: Option<String>,
    pub classes: Vec<String>,
    pub required_features: BTreeSet<String>,
    pub optional_features: BTreeSet<String>,
    pub tiny_name: Option<String>,
    pub maintainers: Vec<Maintainer>,
    /// Sorted by index.
    pub ports: Vec<PortInfo>,
}

impl PluginInfo {
    pub fn port(&self, uri: &str) -> Option<&PortInfo> {
        self.ports.iter().find(|p| p.uri == uri)
    }

    pub fn port_by_symbol(&self, symbol: &str) -> Option<&PortInfo> {
        self.ports.iter().find(|p| p.symbol == symbol)
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Query helpers bound to one plugin's world.
struct Reader<'w> {
    world: &'w TripleStore,
    plugin: &'w str,
}

impl<'w> Reader<'w> {
    fn single(&self, subject: &Term, property: &str) -> Result<Option<Term>, RegistryError> {
        self.world
            .property_value_trans(subject, &[property])
            .map_err(|source| RegistryError::Query {
                plugin: self.plugin.to_string(),
                source,
            })
    }

    fn single_literal(
        &self,
        subject: &Term,
        property: &'static str,
    ) -> Result<Option<Literal>, RegistryError> {
        match self.single(subject, property)? {
            None => Ok(None),
            Some(Term::Literal(lit)) => Ok(Some(lit)),
            Some(other) => Err(invalid(subject, property, &other)),
        }
    }

    /// First value in insertion order, for properties that may carry one
    /// value per language.
    fn first(&self, subject: &Term, property: &str) -> Option<Term> {
        self.world
            .property_values(subject, &[property])
            .into_iter()
            .next()
    }

    fn first_text(&self, subject: &Term, property: &str) -> Option<String> {
        self.first(subject, property)
            .and_then(|t| t.as_str().map(str::to_string))
    }

    fn required_text(&self, subject: &Term, property: &'static str) -> Result<String, RegistryError> {
        self.first_text(subject, property)
            .ok_or_else(|| missing(subject, property))
    }

    /// Distinct node objects, keeping their blank/IRI kind.
    fn node_terms(&self, subject: &Term, property: &str) -> Vec<Term> {
        self.world
            .property_values(subject, &[property])
            .into_iter()
            .filter(|t| !t.is_literal())
            .collect()
    }

    fn node_set(&self, subject: &Term, property: &str) -> BTreeSet<String> {
        self.world
            .property_values(subject, &[property])
            .iter()
            .filter_map(|t| t.as_node().map(str::to_string))
            .collect()
    }

    fn plugin_info(&self) -> Result<PluginInfo, RegistryError> {
        let plugin = Term::iri(self.plugin);

        let maintainers = self
            .node_terms(&plugin, DOAP_MAINTAINER)
            .iter()
            .map(|m| self.maintainer(m))
            .collect::<Result<Vec<_>, _>>()?;

        let mut ports = self
            .node_terms(&plugin, LV2_PORT)
            .iter()
            .map(|p| self.port(p))
            .collect::<Result<Vec<_>, _>>()?;
        ports.sort_by_key(|p| p.index);

        Ok(PluginInfo {
            uri: self.plugin.to_string(),
            name: self.required_text(&plugin, DOAP_NAME)?,
            license: self.first_text(&plugin, DOAP_LICENSE),
            classes: self
                .node_terms(&plugin, TYPE)
                .iter()
                .filter_map(|t| t.as_node().map(str::to_string))
                .collect(),
            required_features: self.node_set(&plugin, LV2_REQUIRED_FEATURE),
            optional_features: self.node_set(&plugin, LV2_OPTIONAL_FEATURE),
            tiny_name: self.first_text(&plugin, TINY_NAME),
            maintainers,
            ports,
        })
    }

    fn maintainer(&self, subject: &Term) -> Result<Maintainer, RegistryError> {
        Ok(Maintainer {
            name: self.required_text(subject, FOAF_NAME)?,
            homepage: self.first_text(subject, FOAF_HOMEPAGE),
            mbox: self.first_text(subject, FOAF_MBOX),
        })
    }

    fn port(&self, port: &Term) -> Result<PortInfo, RegistryError> {
        let index_term = self
            .first(port, LV2_INDEX)
            .ok_or_else(|| missing(port, LV2_INDEX))?;
        let index = index_term
            .as_literal()
            .and_then(Literal::as_i64)
            .and_then(|i| u32::try_from(i).ok())
            .ok_or_else(|| invalid(port, LV2_INDEX, &index_term))?;

        let classes = self.node_set(port, TYPE);
        let kinds = PortKinds::from_classes(self.world, classes.iter().map(String::as_str));

        let default_value = if kinds.control {
            self.single_literal(port, LV2_DEFAULT)?
        } else if kinds.string {
            self.single_literal(port, STRING_DEFAULT)?
        } else {
            None
        };

        Ok(PortInfo {
            uri: port.as_str().unwrap_or_default().to_string(),
            index,
            symbol: self
                .first_text(port, LV2_SYMBOL)
                .ok_or_else(|| missing(port, LV2_SYMBOL))?,
            name: self
                .first_text(port, LV2_NAME)
                .ok_or_else(|| missing(port, LV2_NAME))?,
            scale_points: self.scale_points(port)?,
            default_value,
            minimum: self.single_literal(port, LV2_MINIMUM)?,
            maximum: self.single_literal(port, LV2_MAXIMUM)?,
            tiny_name: self.first_text(port, TINY_NAME),
            properties: self.node_set(port, LV2_PORT_PROPERTY),
            events: self.node_set(port, EVENT_SUPPORTS_EVENT),
            classes,
            kinds,
        })
    }

    /// Scale points with both a label and a literal value; others are skipped.
    fn scale_points(&self, port: &Term) -> Result<Vec<ScalePoint>, RegistryError> {
        let mut points = Vec::new();
        for point in self.world.property_values(port, &[LV2_SCALE_POINT]) {
            let Some(label) = self.single(&point, RDFS_LABEL)? else {
                continue;
            };
            let Some(label) = label.as_str().map(str::to_string) else {
                continue;
            };
            if let Some(Term::Literal(value)) = self.single(&point, RDF_VALUE)? {
                points.push(ScalePoint { label, value });
            }
        }
        Ok(points)
    }
}

fn missing(subject: &Term, property: &'static str) -> RegistryError {
    RegistryError::MissingProperty {
        subject: subject.as_str().unwrap_or_default().to_string(),
        property,
    }
}

fn invalid(subject: &Term, property: &'static str, value: &Term) -> RegistryError {
    RegistryError::InvalidValue {
        subject: subject.as_str().unwrap_or_default().to_string(),
        property,
        value: value.to_string(),
    }
}

/// Run the full query battery for `plugin` against its world.
pub(crate) fn read_plugin(world: &TripleStore, plugin: &str) -> Result<PluginInfo, RegistryError> {
    Reader { world, plugin }.plugin_info()
}
