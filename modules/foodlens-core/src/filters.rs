//! Filter sets extracted from model output.

use ai_client::{strip_code_blocks, truncate_to_char_boundary};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Field vocabulary
// ---------------------------------------------------------------------------

/// A search field the model is taught to fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub concept: &'static str,
    pub name: &'static str,
    pub format: &'static str,
}

pub const KNOWN_FIELDS: &[FieldSpec] = &[
    FieldSpec { concept: "Product category", name: "categories_tags", format: "kebab-case" },
    FieldSpec { concept: "Brand", name: "brands_tags", format: "lowercase" },
    FieldSpec { concept: "Store", name: "stores_tags", format: "lowercase" },
    FieldSpec { concept: "Labels/Claims", name: "labels_tags", format: "kebab-case" },
    FieldSpec { concept: "NutriScore", name: "nutriscore_grade", format: "lowercase (a-e)" },
    FieldSpec { concept: "Countries", name: "countries_tags", format: "kebab-case" },
    FieldSpec { concept: "Ingredients", name: "ingredients_tags", format: "kebab-case" },
    FieldSpec { concept: "Packaging", name: "packaging_tags", format: "kebab-case" },
    FieldSpec { concept: "Ecoscore", name: "ecoscore_grade", format: "lowercase (a-e)" },
    FieldSpec { concept: "Nova group", name: "nova_group", format: "Integer (1-4)" },
    FieldSpec { concept: "Additives", name: "additives_tags", format: "kebab-case" },
    FieldSpec { concept: "Origins", name: "origins_tags", format: "kebab-case" },
    FieldSpec { concept: "Allergens", name: "allergens_tags", format: "kebab-case" },
];

/// Free-text terms; not a tag field but used by the prompt's worked example.
pub const SEARCH_TERMS: &str = "search_terms";

pub fn is_known_field(name: &str) -> bool {
    name == SEARCH_TERMS || KNOWN_FIELDS.iter().any(|f| f.name == name)
}

// ---------------------------------------------------------------------------
// FilterValue / FilterSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Null,
    Single(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// Null, an empty string, or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Null => true,
            FilterValue::Single(s) => s.is_empty(),
            FilterValue::Many(items) => items.is_empty(),
        }
    }

    /// Schema check for one filter value taken from model output.
    ///
    /// A top-level `false` or numeric zero means "no filter" and becomes `Null`;
    /// inside a list every entry is kept.
    fn from_json(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null | Value::Bool(false) => Ok(FilterValue::Null),
            Value::Number(n) if n.as_f64() == Some(0.0) => Ok(FilterValue::Null),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        PipelineError::Schema(format!(
                            "filter {key:?} has a list entry that is not a string or number: {item}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(FilterValue::Many),
            other => scalar_to_string(other).map(FilterValue::Single).ok_or_else(|| {
                PipelineError::Schema(format!(
                    "filter {key:?} must be a string, number or list, got {other}"
                ))
            }),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FilterValue::Null => serializer.serialize_none(),
            FilterValue::Single(s) => serializer.serialize_str(s),
            FilterValue::Many(items) => items.serialize(serializer),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Single(s.to_string())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(items: Vec<&str>) -> Self {
        FilterValue::Many(items.into_iter().map(str::to_string).collect())
    }
}

/// Filter field name → value, in the order the model wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<(String, FilterValue)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert or replace, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

impl Serialize for FilterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Remove code fences and surrounding whitespace from a model reply.
pub fn sanitize(text: &str) -> String {
    strip_code_blocks(text)
}

/// Parse a model reply into a filter set.
///
/// The reply must be JSON once fences are removed. The filter set is the object
/// under `filters`; anything else yields an empty set. Keys outside the known
/// vocabulary are kept.
pub fn parse_filters(raw: &str) -> Result<FilterSet> {
    let text = sanitize(raw);

    let value: Value = serde_json::from_str(&text).map_err(|e| {
        tracing::warn!(
            error = %e,
            raw = truncate_to_char_boundary(raw, 500),
            "Failed to parse filters JSON"
        );
        PipelineError::Parse {
            raw: raw.to_string(),
            reason: e.to_string(),
        }
    })?;

    let Some(filters) = value.get("filters").and_then(Value::as_object) else {
        tracing::debug!("Model reply has no filters object");
        return Ok(FilterSet::new());
    };

    let mut set = FilterSet::new();
    for (key, value) in filters {
        if !is_known_field(key) {
            tracing::debug!(key = %key, "Forwarding unrecognized filter field");
        }
        set.insert(key.clone(), FilterValue::from_json(key, value)?);
    }
    Ok(set)
}
