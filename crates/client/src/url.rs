// crates/client/src/url.rs

//! Filter state ↔ URL query string.
//!
//! One parameter per taxonomy holding a comma-separated slug list, one for
//! the free text. Empty values are never written. Parameters the filter
//! doesn't own are carried through untouched.

use domain::query::FilterQuery;

/// A taxonomy and the URL parameter it is mirrored into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    pub taxonomy: String,
    pub param: String,
}

impl ParamBinding {
    pub fn new(taxonomy: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            param: param.into(),
        }
    }
}

fn pairs(search: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

pub fn parse_search(search: &str, text_param: &str, bindings: &[ParamBinding]) -> FilterQuery {
    let mut query = FilterQuery::new();

    for (key, value) in pairs(search) {
        if key == text_param {
            query.text = value.trim().to_owned();
            continue;
        }
        if let Some(binding) = bindings.iter().find(|b| b.param == key) {
            let mut slugs: Vec<String> = query
                .selection(&binding.taxonomy)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default();
            slugs.extend(value.split(',').map(str::to_owned));
            query.set_selection(&binding.taxonomy, slugs);
        }
    }

    query
}

/// `current` with the filter's own parameters replaced by `query`'s state.
/// Returns the string without a leading `?`.
pub fn merge_search(
    current: &str,
    query: &FilterQuery,
    text_param: &str,
    bindings: &[ParamBinding],
    min_query_len: usize,
) -> String {
    let owned = |key: &str| key == text_param || bindings.iter().any(|b| b.param == key);

    let mut out = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs(current) {
        if !owned(&key) {
            out.append_pair(&key, &value);
        }
    }

    for binding in bindings {
        if let Some(slugs) = query.selection(&binding.taxonomy) {
            let joined = slugs.iter().map(String::as_str).collect::<Vec<_>>().join(",");
            out.append_pair(&binding.param, &joined);
        }
    }

    if query.has_active_text(min_query_len) {
        out.append_pair(text_param, query.text.trim());
    }

    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::query::MIN_QUERY_LEN;

    fn bindings() -> Vec<ParamBinding> {
        vec![
            ParamBinding::new("bucket", "bucket"),
            ParamBinding::new("material_type", "material"),
            ParamBinding::new("service_area", "area"),
        ]
    }

    #[test]
    fn parses_comma_lists_and_text() {
        let q = parse_search("?material=METAL%2Cmetal-roof&area=sarasota&q=st%C3%A9+seam", "q", &bindings());

        assert_eq!(
            q.selection("material_type").unwrap().iter().collect::<Vec<_>>(),
            vec!["metal", "metal-roof"]
        );
        assert!(q.is_selected("service_area", "sarasota"));
        assert_eq!(q.text, "sté seam");
        assert!(!q.has_selection("bucket"));
    }

    #[test]
    fn empty_params_are_omitted() {
        let q = FilterQuery::new().with_text("x");
        assert_eq!(merge_search("", &q, "q", &bindings(), MIN_QUERY_LEN), "");

        let q = parse_search("bucket=&q=", "q", &bindings());
        assert!(q.is_empty(MIN_QUERY_LEN));
    }

    #[test]
    fn unrelated_params_survive() {
        let q = FilterQuery::new().with_selection("bucket", ["accolades"]);
        let s = merge_search("utm_source=mail&bucket=old&q=gone", &q, "q", &bindings(), MIN_QUERY_LEN);
        assert_eq!(s, "utm_source=mail&bucket=accolades");
    }

    #[test]
    fn round_trip_reproduces_the_query() {
        let q = FilterQuery::new()
            .with_text("hail damage")
            .with_selection("material_type", ["tile", "metal"])
            .with_selection("service_area", ["tampa"]);

        let s = merge_search("", &q, "q", &bindings(), MIN_QUERY_LEN);
        assert_eq!(s, "material=metal%2Ctile&area=tampa&q=hail+damage");
        assert_eq!(parse_search(&s, "q", &bindings()), q);
    }
}
