//! Filter-to-query translation for the product search endpoint.

use url::form_urlencoded;

use crate::filters::{FilterSet, FilterValue};

/// Constants the search endpoint needs on every request.
pub const BASE_PARAMS: &[(&str, &str)] = &[("json", "1"), ("page_size", "50"), ("action", "process")];

/// Ordered query parameters. Repeated keys are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pairs: Vec<(String, String)>,
}

impl SearchParameters {
    pub fn empty() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Parameters holding only [`BASE_PARAMS`].
    pub fn base() -> Self {
        let mut params = Self::empty();
        for (k, v) in BASE_PARAMS {
            params.append(*k, *v);
        }
        params
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Replace the first entry for `key` and drop any later ones, or append when absent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || *k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.pairs.iter().any(|(k, v)| k == key && v == value)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// `application/x-www-form-urlencoded` rendering, in insertion order.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }
}

/// `labelsTags` -> `labels_tags`. Keys without uppercase letters are unchanged.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn is_reserved(key: &str) -> bool {
    BASE_PARAMS.iter().any(|(k, _)| *k == key)
}

/// Build search parameters from a filter set.
///
/// Empty values are skipped. Lists append one entry per element; scalars
/// overwrite any earlier entry for the same key. Filters that would override a
/// base parameter are dropped.
pub fn translate(filters: &FilterSet) -> SearchParameters {
    let mut params = SearchParameters::base();

    for (key, value) in filters.iter() {
        if value.is_empty() {
            continue;
        }

        let api_key = to_snake_case(key);
        if is_reserved(&api_key) {
            tracing::warn!(key = %key, "Ignoring filter that overrides a fixed search parameter");
            continue;
        }

        match value {
            FilterValue::Many(items) => {
                for item in items {
                    params.append(api_key.as_str(), item.as_str());
                }
            }
            FilterValue::Single(v) => params.set(api_key, v.as_str()),
            FilterValue::Null => {}
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::parse_filters;

    fn set(entries: Vec<(&str, FilterValue)>) -> FilterSet {
        entries.into_iter().collect()
    }

    fn assert_base(params: &SearchParameters) {
        assert_eq!(params.get_all("json"), vec!["1"]);
        assert_eq!(params.get_all("page_size"), vec!["50"]);
        assert_eq!(params.get_all("action"), vec!["process"]);
    }

    #[test]
    fn empty_filters_yield_base_params() {
        let params = translate(&FilterSet::new());
        assert_eq!(params.to_query_string(), "json=1&page_size=50&action=process");
    }

    #[test]
    fn vegan_snacks_in_germany() {
        let raw = "```json\n{\"filters\":{\"labels_tags\":\"vegan\",\"categories_tags\":\"snacks\",\"countries_tags\":\"germany\"}}\n```";
        let params = translate(&parse_filters(raw).unwrap());

        assert_base(&params);
        assert!(params.contains("labels_tags", "vegan"));
        assert!(params.contains("categories_tags", "snacks"));
        assert!(params.contains("countries_tags", "germany"));
        assert_eq!(
            params.to_query_string(),
            "json=1&page_size=50&action=process&labels_tags=vegan&categories_tags=snacks&countries_tags=germany"
        );
    }

    #[test]
    fn list_values_expand_into_repeated_keys() {
        let params = translate(&set(vec![(
            "labels_tags",
            FilterValue::from(vec!["vegan", "organic"]),
        )]));
        assert_eq!(params.get_all("labels_tags"), vec!["vegan", "organic"]);
        assert_eq!(params.len(), BASE_PARAMS.len() + 2);
    }

    #[test]
    fn n_element_list_yields_n_entries() {
        for n in 0..5 {
            let items: Vec<String> = (0..n).map(|i| format!("tag-{i}")).collect();
            let params = translate(&set(vec![("labelsTags", FilterValue::Many(items))]));
            assert_eq!(params.get_all("labels_tags").len(), n);
        }
    }

    #[test]
    fn empty_values_are_skipped() {
        let params = translate(&set(vec![
            ("brands_tags", FilterValue::Null),
            ("stores_tags", FilterValue::from("")),
            ("labels_tags", FilterValue::Many(vec![])),
        ]));
        assert_eq!(params, SearchParameters::base());
    }

    #[test]
    fn false_and_zero_filters_are_skipped() {
        let filters = parse_filters(r#"{"filters":{"palm_oil":false,"nova_group":0}}"#).unwrap();
        let params = translate(&filters);
        assert_eq!(params.to_query_string(), "json=1&page_size=50&action=process");

        let filters = parse_filters(r#"{"filters":{"nova_group":4,"palm_oil":true}}"#).unwrap();
        let params = translate(&filters);
        assert_eq!(params.get("nova_group"), Some("4"));
        assert_eq!(params.get("palm_oil"), Some("true"));
    }

    #[test]
    fn camel_case_keys_are_converted() {
        let params = translate(&set(vec![("nutriscoreGrade", FilterValue::from("b"))]));
        assert_eq!(params.get("nutriscore_grade"), Some("b"));
        assert_eq!(params.get("nutriscoreGrade"), None);
    }

    #[test]
    fn key_transform_is_idempotent() {
        for key in ["labels_tags", "labelsTags", "NovaGroup", "x", "", "ÄpfelTags"] {
            let once = to_snake_case(key);
            assert_eq!(to_snake_case(&once), once, "key {key:?}");
        }
        assert_eq!(to_snake_case("labels_tags"), "labels_tags");
        assert_eq!(to_snake_case("ecoscoreGradeTags"), "ecoscore_grade_tags");
    }

    #[test]
    fn colliding_scalars_last_write_wins() {
        let params = translate(&set(vec![
            ("nutriscore_grade", FilterValue::from("a")),
            ("nutriscoreGrade", FilterValue::from("b")),
        ]));
        assert_eq!(params.get_all("nutriscore_grade"), vec!["b"]);
    }

    #[test]
    fn list_entries_accumulate_after_scalar() {
        let params = translate(&set(vec![
            ("labels_tags", FilterValue::from("vegan")),
            ("labelsTags", FilterValue::from(vec!["organic", "fair-trade"])),
        ]));
        assert_eq!(
            params.get_all("labels_tags"),
            vec!["vegan", "organic", "fair-trade"]
        );
    }

    #[test]
    fn scalar_after_list_collapses_entries() {
        let params = translate(&set(vec![
            ("labelsTags", FilterValue::from(vec!["organic", "fair-trade"])),
            ("labels_tags", FilterValue::from("vegan")),
        ]));
        assert_eq!(params.get_all("labels_tags"), vec!["vegan"]);
    }

    #[test]
    fn base_params_survive_overriding_filters() {
        let params = translate(&set(vec![
            ("page_size", FilterValue::from("1000")),
            ("json", FilterValue::from(vec!["0"])),
            ("pageSize", FilterValue::from("5")),
        ]));
        assert_base(&params);
        assert_eq!(params.len(), BASE_PARAMS.len());
    }

    #[test]
    fn query_string_is_form_encoded() {
        let params = translate(&set(vec![("search_terms", FilterValue::from("dark chocolate & nuts"))]));
        assert!(params
            .to_query_string()
            .ends_with("search_terms=dark+chocolate+%26+nuts"));
    }

    #[test]
    fn set_replaces_first_and_drops_rest() {
        let mut params = SearchParameters::empty();
        params.append("a", "1");
        params.append("b", "2");
        params.append("a", "3");
        params.set("a", "4");
        assert_eq!(params.to_query_string(), "a=4&b=2");
    }
}
