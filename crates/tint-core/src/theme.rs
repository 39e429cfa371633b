//! Persisted theme record ↔ `StyleMap`.
//!
//! ```json
//! {
//!   "version": 1,
//!   "name": "dark",
//!   "meta": { "updated_at": "2025-01-01T12:00:00Z" },
//!   "defaults": { "stroke-width": "2" },
//!   "groups": { "Wire": { "fill": "#000000", "stroke": "#FF0000", "stroke-width": "1" } }
//! }
//! ```
//!
//! `defaults` is optional; a group field that is absent falls back to it.
//! A field set to `null` is empty and does not fall back.

use crate::error::Result;
use crate::model::{StyleMap, StyleSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Current on-disk format version.
pub const THEME_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeMeta {
    #[serde(default)]
    pub updated_at: String,
}

/// A group entry as stored; `None` marks a field the file leaves out.
///
/// An explicit `null` reads as an empty value, not as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeGroup {
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub fill: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        rename = "stroke-width",
        alias = "stroke_width",
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke_width: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(Option::<String>::deserialize(deserializer)?.unwrap_or_default()))
}

impl From<&StyleSpec> for ThemeGroup {
    fn from(spec: &StyleSpec) -> Self {
        Self {
            fill: Some(spec.fill.clone()),
            stroke: Some(spec.stroke.clone()),
            stroke_width: Some(spec.stroke_width.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub meta: ThemeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<ThemeGroup>,
    #[serde(default)]
    pub groups: IndexMap<String, ThemeGroup>,
}

fn default_version() -> u32 {
    THEME_VERSION
}

impl Theme {
    /// Parse a theme from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Two-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a theme from a style map, stamped with the current UTC time.
    pub fn from_style_map(name: &str, styles: &StyleMap) -> Self {
        let updated_at = chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        Self {
            version: THEME_VERSION,
            name: name.to_string(),
            meta: ThemeMeta { updated_at },
            defaults: None,
            groups: styles
                .iter()
                .map(|(id, spec)| (id.clone(), ThemeGroup::from(spec)))
                .collect(),
        }
    }

    /// Resolve into a `StyleMap`, in file order.
    ///
    /// Each field falls back to `defaults`, then to empty; values are trimmed.
    pub fn style_map(&self) -> StyleMap {
        let defaults = self.defaults.clone().unwrap_or_default();
        let pick = |own: &Option<String>, fallback: &Option<String>| {
            own.as_deref()
                .or(fallback.as_deref())
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        self.groups
            .iter()
            .map(|(id, group)| {
                let spec = StyleSpec {
                    fill: pick(&group.fill, &defaults.fill),
                    stroke: pick(&group.stroke, &defaults.stroke),
                    stroke_width: pick(&group.stroke_width, &defaults.stroke_width),
                };
                (id.clone(), spec)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TintError;

    #[test]
    fn parse_theme_with_defaults() {
        let theme = Theme::from_json(
            r##"{
  "version": 1,
  "name": "dark",
  "meta": { "updated_at": "2025-01-01T12:00:00Z" },
  "defaults": { "stroke-width": "2", "fill": "none" },
  "groups": {
    "Wire": { "stroke": " #FF0000 " },
    "Pin": { "fill": "#00FF00", "stroke": "#000000", "stroke_width": "1" }
  }
}"##,
        )
        .unwrap();
        assert_eq!(theme.name, "dark");
        let map = theme.style_map();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["Wire", "Pin"]);
        assert_eq!(map["Wire"], StyleSpec::new("none", "#FF0000", "2"));
        assert_eq!(map["Pin"], StyleSpec::new("#00FF00", "#000000", "1"));
    }

    #[test]
    fn missing_fields_resolve_to_empty() {
        let theme = Theme::from_json(r#"{"groups": {"A": {}}}"#).unwrap();
        assert_eq!(theme.version, THEME_VERSION);
        assert_eq!(theme.style_map()["A"], StyleSpec::default());
    }

    #[test]
    fn null_field_is_empty_not_defaulted() {
        let theme = Theme::from_json(
            r##"{"defaults": {"fill": "#111111", "stroke": null},
                 "groups": {"A": {"fill": null, "stroke-width": "1"}}}"##,
        )
        .unwrap();
        assert_eq!(theme.style_map()["A"], StyleSpec::new("", "", "1"));
    }

    #[test]
    fn from_style_map_round_trips_through_json() {
        let mut styles = StyleMap::new();
        styles.insert("Wire".into(), StyleSpec::new("#000000", "#FF0000", "2"));
        styles.insert("Pin".into(), StyleSpec::new("", "none", ""));
        let theme = Theme::from_style_map("light", &styles);
        assert_eq!(theme.version, 1);
        assert!(theme.meta.updated_at.ends_with('Z'));
        assert_eq!(theme.meta.updated_at.len(), "2025-01-01T12:00:00Z".len());

        let json = theme.to_json_pretty().unwrap();
        assert!(json.contains("\"stroke-width\": \"2\""));
        let back = Theme::from_json(&json).unwrap();
        assert_eq!(back.style_map(), styles);
    }

    #[test]
    fn invalid_json_is_a_theme_error() {
        let err = Theme::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TintError::Theme(_)), "{err}");
    }
}
