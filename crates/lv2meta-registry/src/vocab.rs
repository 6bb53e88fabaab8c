//! LV2 and related vocabulary IRIs.

pub const LV2: &str = "http://lv2plug.in/ns/lv2core#";
pub const LV2_PLUGIN: &str = "http://lv2plug.in/ns/lv2core#Plugin";
pub const LV2_SPECIFICATION: &str = "http://lv2plug.in/ns/lv2core#Specification";
pub const LV2_PORT: &str = "http://lv2plug.in/ns/lv2core#port";
pub const LV2_INDEX: &str = "http://lv2plug.in/ns/lv2core#index";
pub const LV2_SYMBOL: &str = "http://lv2plug.in/ns/lv2core#symbol";
pub const LV2_NAME: &str = "http://lv2plug.in/ns/lv2core#name";
pub const LV2_DEFAULT: &str = "http://lv2plug.in/ns/lv2core#default";
pub const LV2_MINIMUM: &str = "http://lv2plug.in/ns/lv2core#minimum";
pub const LV2_MAXIMUM: &str = "http://lv2plug.in/ns/lv2core#maximum";
pub const LV2_SCALE_POINT: &str = "http://lv2plug.in/ns/lv2core#scalePoint";
pub const LV2_PORT_PROPERTY: &str = "http://lv2plug.in/ns/lv2core#portProperty";
pub const LV2_REQUIRED_FEATURE: &str = "http://lv2plug.in/ns/lv2core#requiredFeature";
pub const LV2_OPTIONAL_FEATURE: &str = "http://lv2plug.in/ns/lv2core#optionalFeature";

pub const LV2_AUDIO_PORT: &str = "http://lv2plug.in/ns/lv2core#AudioPort";
pub const LV2_CONTROL_PORT: &str = "http://lv2plug.in/ns/lv2core#ControlPort";
pub const LV2_INPUT_PORT: &str = "http://lv2plug.in/ns/lv2core#InputPort";
pub const LV2_OUTPUT_PORT: &str = "http://lv2plug.in/ns/lv2core#OutputPort";

pub const EVENT_PORT: &str = "http://lv2plug.in/ns/ext/event#EventPort";
pub const EVENT_SUPPORTS_EVENT: &str = "http://lv2plug.in/ns/ext/event#supportsEvent";
pub const MIDI_EVENT: &str = "http://lv2plug.in/ns/ext/midi#MidiEvent";

pub const STRING_PORT: &str = "http://lv2plug.in/ns/dev/string-port#StringPort";
pub const STRING_DEFAULT: &str = "http://lv2plug.in/ns/dev/string-port#default";

/// Pre-standard MIDI port class used by the ll-plugins collection.
pub const LARSL_MIDI_PORT: &str = "http://ll-plugins.nongnu.org/lv2/ext/MidiPort";

pub const TINY_NAME: &str = "http://lv2plug.in/ns/dev/tiny-name";

pub const DOAP_NAME: &str = "http://usefulinc.com/ns/doap#name";
pub const DOAP_LICENSE: &str = "http://usefulinc.com/ns/doap#license";
pub const DOAP_MAINTAINER: &str = "http://usefulinc.com/ns/doap#maintainer";

pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";
pub const FOAF_HOMEPAGE: &str = "http://xmlns.com/foaf/0.1/homepage";
pub const FOAF_MBOX: &str = "http://xmlns.com/foaf/0.1/mbox";
