// Option-selection decoding
//
// OPNsense reads back every selectable field as a map of all candidate options:
//
//   "scheduler": {
//     "":   { "value": "Weighted fair queueing", "selected": 0 },
//     "rr": { "value": "Deficit round robin",    "selected": 1 }
//   }
//
// The map key is the wire code, `value` the display text. `OptionMap` keeps
// the entries in document order and reduces them to the selected key(s).

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wire::Flag;

/// One candidate of a selectable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    /// Wire code (the map key).
    pub key: String,
    /// Display text shown in the firewall UI.
    pub value: String,
    pub selected: bool,
}

impl OptionEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, selected: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            selected,
        }
    }
}

/// A decoded option-selection map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionMap {
    entries: Vec<OptionEntry>,
}

impl OptionMap {
    pub fn from_entries(entries: Vec<OptionEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key of the selected option, or `""` when nothing is selected.
    ///
    /// If the firewall flags more than one entry, the first in document
    /// order wins.
    pub fn selected(&self) -> &str {
        self.entries
            .iter()
            .find(|e| e.selected)
            .map_or("", |e| e.key.as_str())
    }

    /// Keys of every selected option, in document order (multi-select fields).
    pub fn selected_all(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.key.as_str())
            .collect()
    }
}

// ── Deserialization ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawOption {
    #[serde(default)]
    value: Value,
    #[serde(default)]
    selected: Flag,
}

impl<'de> Deserialize<'de> for OptionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OptionMapVisitor)
    }
}

struct OptionMapVisitor;

impl<'de> Visitor<'de> for OptionMapVisitor {
    type Value = OptionMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of option -> {value, selected}")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<OptionMap, A::Error> {
        let mut entries = Vec::new();
        while let Some((key, raw)) = map.next_entry::<String, RawOption>()? {
            let value = match raw.value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            entries.push(OptionEntry {
                key,
                value,
                selected: raw.selected.0,
            });
        }
        Ok(OptionMap { entries })
    }

    // An empty option list is serialized by PHP as `[]`.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<OptionMap, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(OptionMap::default())
    }

    // Some firmware versions flatten a single-select field to its bare key.
    fn visit_str<E: de::Error>(self, v: &str) -> Result<OptionMap, E> {
        if v.is_empty() {
            return Ok(OptionMap::default());
        }
        Ok(OptionMap {
            entries: vec![OptionEntry::new(v, v, true)],
        })
    }

    fn visit_unit<E: de::Error>(self) -> Result<OptionMap, E> {
        Ok(OptionMap::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<OptionMap, E> {
        Ok(OptionMap::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(v: Value) -> OptionMap {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn picks_the_selected_key() {
        let map = decode(json!({
            "": { "value": "Weighted fair queueing", "selected": 0 },
            "rr": { "value": "Deficit round robin", "selected": 1 },
            "qfq": { "value": "Quick fair queueing", "selected": 0 }
        }));
        assert_eq!(map.selected(), "rr");
    }

    #[test]
    fn selection_does_not_depend_on_entry_order() {
        let a = decode(json!({
            "Kbit": { "value": "Kbit/s", "selected": 1 },
            "bit": { "value": "bit/s", "selected": 0 },
            "Mbit": { "value": "Mbit/s", "selected": 0 }
        }));
        let b = decode(json!({
            "Mbit": { "value": "Mbit/s", "selected": 0 },
            "bit": { "value": "bit/s", "selected": 0 },
            "Kbit": { "value": "Kbit/s", "selected": 1 }
        }));
        assert_eq!(a.selected(), "Kbit");
        assert_eq!(b.selected(), "Kbit");
    }

    #[test]
    fn nothing_selected_is_empty_not_an_error() {
        let map = decode(json!({
            "none": { "value": "(none)", "selected": 0 },
            "src-ip": { "value": "Source", "selected": 0 }
        }));
        assert_eq!(map.selected(), "");
        assert!(map.selected_all().is_empty());
    }

    #[test]
    fn multiple_selected_takes_the_first() {
        let map = OptionMap::from_entries(vec![
            OptionEntry::new("in", "in", true),
            OptionEntry::new("out", "out", true),
        ]);
        assert_eq!(map.selected(), "in");
    }

    #[test]
    fn multi_select_collects_every_flagged_key() {
        let map = decode(json!({
            "be": { "value": "Best Effort", "selected": 1 },
            "ef": { "value": "Expedited Forwarding", "selected": 0 },
            "af11": { "value": "AF11", "selected": 1 }
        }));
        let mut keys = map.selected_all();
        keys.sort_unstable();
        assert_eq!(keys, vec!["af11", "be"]);
    }

    #[test]
    fn accepts_boolean_and_string_flags() {
        let map = decode(json!({
            "lan": { "value": "LAN", "selected": true },
            "wan": { "value": "WAN", "selected": "0" }
        }));
        assert_eq!(map.selected(), "lan");
    }

    #[test]
    fn bare_string_is_a_single_selection() {
        assert_eq!(decode(json!("fq_codel")).selected(), "fq_codel");
        assert!(decode(json!("")).is_empty());
        assert!(decode(Value::Null).is_empty());
        assert_eq!(decode(json!([])).selected(), "");
    }
}
