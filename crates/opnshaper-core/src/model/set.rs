// ── Unordered string set ──
//
// Network lists and DSCP classes are sets: order and duplicates carry no
// meaning, so two values are equal when their members are. The wire and
// serde forms are sorted so output is stable.

use std::collections::HashSet;
use std::collections::hash_set;
use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// A set of unique strings with membership equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringSet(HashSet<String>);

impl StringSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. Returns `false` if it was already present.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.0.insert(value.into())
    }

    pub fn remove(&mut self, value: &str) -> bool {
        self.0.remove(value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in arbitrary order.
    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.0.iter()
    }

    /// Members in lexicographic order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut members: Vec<&str> = self.0.iter().map(String::as_str).collect();
        members.sort_unstable();
        members
    }

    /// Comma-joined sorted members, as the firewall stores list fields.
    pub fn to_wire(&self) -> String {
        self.sorted().join(",")
    }

    /// Parse a comma-joined list. Items are trimmed; blanks and duplicates
    /// are dropped.
    pub fn from_wire(text: &str) -> Self {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl fmt::Display for StringSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for StringSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for StringSet {
    type Item = String;
    type IntoIter = hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a StringSet {
    type Item = &'a String;
    type IntoIter = hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Serde ────────────────────────────────────────────────────────────

impl Serialize for StringSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}

/// Accepts a list of strings or a single comma-joined string.
impl<'de> Deserialize<'de> for StringSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StringSetVisitor)
    }
}

struct StringSetVisitor;

impl<'de> Visitor<'de> for StringSetVisitor {
    type Value = StringSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of strings or a comma-separated string")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<StringSet, A::Error> {
        let mut set = StringSet::new();
        while let Some(item) = seq.next_element::<String>()? {
            let item = item.trim();
            if !item.is_empty() {
                set.insert(item);
            }
        }
        Ok(set)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<StringSet, E> {
        Ok(StringSet::from_wire(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<StringSet, E> {
        Ok(StringSet::new())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut set = StringSet::new();
        assert!(set.insert("af11"));
        assert!(!set.insert("af11"));
        assert_eq!(set.len(), 1);
        assert!(set.contains("af11"));
    }

    #[test]
    fn equality_ignores_order_and_duplicates() {
        let a: StringSet = ["10.0.0.0/24", "10.1.0.0/24"].into_iter().collect();
        let b: StringSet = ["10.1.0.0/24", "10.0.0.0/24", "10.1.0.0/24"]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn wire_form_is_sorted_and_parses_back() {
        let set: StringSet = ["be", "af11", "cs1"].into_iter().collect();
        assert_eq!(set.to_wire(), "af11,be,cs1");
        assert_eq!(StringSet::from_wire(&set.to_wire()), set);
    }

    #[test]
    fn from_wire_trims_and_drops_blanks() {
        let set = StringSet::from_wire(" any , ,any,");
        assert_eq!(set.sorted(), vec!["any"]);
        assert!(StringSet::from_wire("").is_empty());
    }

    #[test]
    fn serde_accepts_list_or_joined_text() {
        let from_list: StringSet = serde_json::from_value(json!(["b", "a"])).unwrap();
        let from_text: StringSet = serde_json::from_value(json!("a,b")).unwrap();
        assert_eq!(from_list, from_text);
        assert_eq!(serde_json::to_value(&from_list).unwrap(), json!(["a", "b"]));
    }
}
