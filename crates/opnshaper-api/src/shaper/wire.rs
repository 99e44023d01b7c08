// Scalar wire encodings
//
// The firewall stores every field as text. Booleans travel as "0"/"1",
// integers as quoted decimals, and a blank integer means "use the firewall's
// default". Reads are lenient and accept bare JSON numbers/booleans too,
// since some endpoints (search rows, older firmware) emit them unquoted.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Value meaning "unset, use the firewall default" on sentinel-capable fields.
pub const SENTINEL_UNSET: i32 = -1;

// ── Flag ────────────────────────────────────────────────────────────

/// Boolean encoded as `"0"` / `"1"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flag(pub bool);

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if self.0 { "1" } else { "0" })
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(b) => Ok(Self(b)),
            Value::Number(n) => Ok(Self(n.as_i64() == Some(1))),
            Value::String(s) => {
                let s = s.trim();
                Ok(Self(s == "1" || s.eq_ignore_ascii_case("true")))
            }
            Value::Null => Ok(Self(false)),
            other => Err(de::Error::custom(format!("expected a 0/1 flag, got {other}"))),
        }
    }
}

// ── Sentinel ────────────────────────────────────────────────────────

/// 32-bit integer where `-1` travels as a blank string.
///
/// Round-trips: `-1` → `""` → `-1`. Any other value is sent as its decimal
/// text; range checking is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sentinel(pub i32);

impl Sentinel {
    pub const UNSET: Self = Self(SENTINEL_UNSET);

    pub fn is_unset(self) -> bool {
        self.0 == SENTINEL_UNSET
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::UNSET
    }
}

impl From<i32> for Sentinel {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

impl Serialize for Sentinel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_unset() {
            serializer.serialize_str("")
        } else {
            serializer.collect_str(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Sentinel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::UNSET),
            Value::String(s) if s.trim().is_empty() => Ok(Self::UNSET),
            Value::String(s) => s
                .trim()
                .parse()
                .map(Self)
                .map_err(|e| de::Error::custom(format!("invalid integer '{s}': {e}"))),
            Value::Number(n) => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self)
                .ok_or_else(|| de::Error::custom(format!("integer out of range: {n}"))),
            other => Err(de::Error::custom(format!("expected an integer, got {other}"))),
        }
    }
}

// ── Quoted ──────────────────────────────────────────────────────────

/// Number without a sentinel, sent as quoted decimal text.
///
/// A blank read-back decodes to `T::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Quoted<T>(pub T);

impl<T> From<T> for Quoted<T> {
    fn from(v: T) -> Self {
        Self(v)
    }
}

impl<T: Display> Serialize for Quoted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de, T> Deserialize<'de> for Quoted<T>
where
    T: FromStr + Default,
    T::Err: Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match Value::deserialize(deserializer)? {
            Value::Null => return Ok(Self(T::default())),
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => return Err(de::Error::custom(format!("expected a number, got {other}"))),
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self(T::default()));
        }
        text.parse()
            .map(Self)
            .map_err(|e| de::Error::custom(format!("invalid number '{text}': {e}")))
    }
}

// ── ListField ───────────────────────────────────────────────────────

/// Comma-separated multi-value text field (network lists).
///
/// Sent as a plain joined string by the caller. On read the firewall may
/// answer with the joined text, a JSON array, or an option map in which
/// the selected keys are the members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListField(pub Vec<String>);

impl ListField {
    fn from_text(text: &str) -> Self {
        Self(
            text.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ListField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::default()),
            Value::String(s) => Ok(Self::from_text(&s)),
            Value::Array(items) => Ok(Self(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
                        _ => None,
                    })
                    .collect(),
            )),
            map @ Value::Object(_) => {
                let options: super::options::OptionMap =
                    serde_json::from_value(map).map_err(de::Error::custom)?;
                Ok(Self(
                    options
                        .selected_all()
                        .into_iter()
                        .filter(|k| !k.is_empty())
                        .map(str::to_owned)
                        .collect(),
                ))
            }
            other => Err(de::Error::custom(format!("expected a list, got {other}"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flag_encodes_as_digit_text() {
        assert_eq!(serde_json::to_value(Flag(true)).unwrap(), json!("1"));
        assert_eq!(serde_json::to_value(Flag(false)).unwrap(), json!("0"));
    }

    #[test]
    fn flag_reads_every_firewall_spelling() {
        for (raw, expected) in [
            (json!("1"), true),
            (json!("0"), false),
            (json!(1), true),
            (json!(0), false),
            (json!(true), true),
            (json!(""), false),
            (Value::Null, false),
        ] {
            let flag: Flag = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(flag.0, expected, "decoding {raw}");
        }
    }

    #[test]
    fn sentinel_round_trips_through_blank() {
        assert_eq!(serde_json::to_value(Sentinel::UNSET).unwrap(), json!(""));
        let back: Sentinel = serde_json::from_value(json!("")).unwrap();
        assert!(back.is_unset());
    }

    #[test]
    fn sentinel_values_are_quoted() {
        assert_eq!(serde_json::to_value(Sentinel(250)).unwrap(), json!("250"));
        let back: Sentinel = serde_json::from_value(json!("250")).unwrap();
        assert_eq!(back, Sentinel(250));
        let bare: Sentinel = serde_json::from_value(json!(12)).unwrap();
        assert_eq!(bare, Sentinel(12));
    }

    #[test]
    fn sentinel_rejects_garbage() {
        assert!(serde_json::from_value::<Sentinel>(json!("abc")).is_err());
        assert!(serde_json::from_value::<Sentinel>(json!(4_294_967_296_i64)).is_err());
    }

    #[test]
    fn quoted_numbers() {
        assert_eq!(serde_json::to_value(Quoted(10_u64)).unwrap(), json!("10"));
        let q: Quoted<u64> = serde_json::from_value(json!("10")).unwrap();
        assert_eq!(q.0, 10);
        let blank: Quoted<u32> = serde_json::from_value(json!("")).unwrap();
        assert_eq!(blank.0, 0);
    }

    #[test]
    fn list_field_accepts_text_array_and_options() {
        let text: ListField = serde_json::from_value(json!("10.0.0.0/24, 10.1.0.0/24,")).unwrap();
        assert_eq!(text.0, vec!["10.0.0.0/24", "10.1.0.0/24"]);

        let array: ListField = serde_json::from_value(json!(["any"])).unwrap();
        assert_eq!(array.0, vec!["any"]);

        let options: ListField = serde_json::from_value(json!({
            "any": { "value": "any", "selected": 1 },
            "lan": { "value": "LAN net", "selected": 0 }
        }))
        .unwrap();
        assert_eq!(options.0, vec!["any"]);
    }
}
