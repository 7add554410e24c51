//! Prompt templates sent to the language model.
//!
//! Templates are plain data with `{{var}}` placeholders, rendered through
//! [`resolve_runtime_vars`](crate::template::resolve_runtime_vars).

use std::collections::HashMap;

use off_client::Product;

use crate::filters::KNOWN_FIELDS;
use crate::template::resolve_runtime_vars;

pub const FILTER_VARS: &[&str] = &["fields", "query"];
pub const PRODUCT_QUESTION_VARS: &[&str] = &["product", "question"];
pub const COMPARE_VARS: &[&str] = &["products"];

pub const FILTER_TEMPLATE: &str = r#"You are an assistant that converts natural language food queries into structured JSON filters for the Open Food Facts search API.

Instructions:
Extract relevant fields and values from the user query and return a valid JSON filter object using Open Food Facts field names and formats.

Field Name Mapping and Formatting
Query Concept	Field Name	Format
{{fields}}

Behavior Notes
- You may extract and normalize multiple filters from the query.
- Convert user-friendly terms to corresponding tag values when necessary (e.g. "vegan" -> labels_tags: "vegan").
- Use a list when a field has several values, e.g. "labels_tags": ["organic", "gluten-free"].
- Put the object under a top-level "filters" key.

Example
Given the query:

"Find vegan snacks with NutriScore B sold in Germany with eco-friendly packaging"

Return:

{
  "filters": {
    "search_terms": "vegan+snacks",
    "categories_tags": "snacks",
    "nutriscore_grade": "b",
    "countries_tags": "germany",
    "packaging_tags": "eco-friendly"
  }
}

Query: "{{query}}"
Respond with JSON only."#;

pub const PRODUCT_QUESTION_TEMPLATE: &str = "You are a helpful assistant that helps people find the best products. Here is the product info:
{{product}}

Please answer the following question as best you can.
{{question}}";

pub const COMPARE_TEMPLATE: &str = "You are a helpful assistant that helps people find the best products. Here is the product info:
{{products}}

Compare the products and tell some insights about them.";

/// One line per known field: concept, field name, value format.
pub fn field_table() -> String {
    KNOWN_FIELDS
        .iter()
        .map(|f| format!("{}\t{}\t{}", f.concept, f.name, f.format))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instruction asking the model to turn `query` into a filters object.
pub fn filter_prompt(query: &str) -> String {
    let fields = field_table();
    resolve_runtime_vars(
        FILTER_TEMPLATE,
        &HashMap::from([("fields", fields.as_str()), ("query", query)]),
    )
}

/// Question about a single product, prefixed with its facts.
pub fn product_prompt(product: &Product, question: &str) -> String {
    let facts = describe_product(product);
    resolve_runtime_vars(
        PRODUCT_QUESTION_TEMPLATE,
        &HashMap::from([("product", facts.as_str()), ("question", question)]),
    )
}

/// Comparison request over several `(barcode, product)` pairs, numbered in order.
pub fn compare_prompt(products: &[(String, Product)]) -> String {
    let sections = products
        .iter()
        .enumerate()
        .map(|(i, (barcode, product))| {
            format!("Product No {} ({barcode})\n{}", i + 1, describe_product(product))
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    resolve_runtime_vars(
        COMPARE_TEMPLATE,
        &HashMap::from([("products", sections.as_str())]),
    )
}

/// Product facts in a fixed line layout. Missing facts render as `unknown`.
pub fn describe_product(product: &Product) -> String {
    let n = &product.nutriments;
    [
        format!("Product Name: {}", text(&product.product_name)),
        format!("Brand: {}", text(&product.brands)),
        format!("Categories: {}", tags(&product.categories_tags)),
        format!("Labels: {}", tags(&product.labels_tags)),
        format!("NutriScore: {}", text(&product.nutriscore_grade)),
        format!("Nova Group: {}", number(product.nova_group)),
        format!("Allergens: {}", tags(&product.allergens_tags)),
        format!(
            "Ingredient Analysis: {}",
            tags(&product.ingredients_analysis_tags)
        ),
        format!(
            "Ingredients: {}",
            text(&product.ingredients_text_with_allergens)
        ),
        "Nutrition Facts per 100g:".to_string(),
        format!("- Energy: {}", amount(n.energy_kj, "kJ")),
        format!("- Fat: {}", amount(n.fat, "g")),
        format!("- Saturated Fat: {}", amount(n.saturated_fat, "g")),
        format!("- Sugars: {}", amount(n.sugars, "g")),
        format!("- Salt: {}", amount(n.salt, "g")),
        format!("- Proteins: {}", amount(n.proteins, "g")),
        format!("- Fiber: {}", amount(n.fiber, "g")),
    ]
    .join("\n")
}

const UNKNOWN: &str = "unknown";

fn text(value: &Option<String>) -> &str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN,
    }
}

fn tags(values: &[String]) -> String {
    if values.is_empty() {
        UNKNOWN.to_string()
    } else {
        values.join(", ")
    }
}

fn number(value: Option<i64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

fn amount(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| format!("{v} {unit}"))
}
