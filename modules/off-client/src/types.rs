use serde::{Deserialize, Deserializer, Serialize};

// --- Search ---

/// Response of `/cgi/search.pl?json=1`. Products are forwarded as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub products: Option<Vec<serde_json::Value>>,
}

impl SearchResponse {
    /// The products array, empty when the service omitted it.
    pub fn into_products(self) -> Vec<serde_json::Value> {
        self.products.unwrap_or_default()
    }
}

// --- Product lookup ---

/// Response of `/api/v0/product/{barcode}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductLookup {
    #[serde(default)]
    pub code: Option<String>,
    /// 1 when the product exists.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub status: Option<i64>,
    #[serde(default)]
    pub status_verbose: Option<String>,
    #[serde(default)]
    pub product: Option<serde_json::Value>,
}

impl ProductLookup {
    pub fn is_found(&self) -> bool {
        self.status == Some(1) && self.product.is_some()
    }

    /// Typed view over the raw product record, if one was found.
    pub fn details(&self) -> Option<Product> {
        if !self.is_found() {
            return None;
        }
        self.product
            .as_ref()
            .and_then(|p| serde_json::from_value(p.clone()).ok())
    }
}

/// The subset of product fields used to describe a product to a language model.
/// Open Food Facts records are user-contributed, so every field is optional and
/// numeric fields accept numbers or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub categories_tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub labels_tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub allergens_tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub ingredients_analysis_tags: Vec<String>,
    #[serde(default)]
    pub nutriscore_grade: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub nova_group: Option<i64>,
    #[serde(default)]
    pub ingredients_text_with_allergens: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub nutriments: Nutriments,
}

/// Nutrition facts per 100 g.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutriments {
    #[serde(default, rename = "energy_100g", deserialize_with = "lenient::opt_f64")]
    pub energy_kj: Option<f64>,
    #[serde(default, rename = "fat_100g", deserialize_with = "lenient::opt_f64")]
    pub fat: Option<f64>,
    #[serde(default, rename = "saturated-fat_100g", deserialize_with = "lenient::opt_f64")]
    pub saturated_fat: Option<f64>,
    #[serde(default, rename = "sugars_100g", deserialize_with = "lenient::opt_f64")]
    pub sugars: Option<f64>,
    #[serde(default, rename = "salt_100g", deserialize_with = "lenient::opt_f64")]
    pub salt: Option<f64>,
    #[serde(default, rename = "proteins_100g", deserialize_with = "lenient::opt_f64")]
    pub proteins: Option<f64>,
    #[serde(default, rename = "fiber_100g", deserialize_with = "lenient::opt_f64")]
    pub fiber: Option<f64>,
}

mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    fn to_f64(value: Option<NumberOrString>) -> Option<f64> {
        match value? {
            NumberOrString::Number(n) => Some(n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
            NumberOrString::Other(_) => None,
        }
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(to_f64(Option::deserialize(d)?))
    }

    /// Tag lists: `null` is empty, non-string entries are dropped.
    pub fn tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        match serde_json::Value::deserialize(d)? {
            serde_json::Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(to_f64(Option::deserialize(d)?)
            .filter(|n| n.fract() == 0.0)
            .map(|n| n as i64))
    }
}
