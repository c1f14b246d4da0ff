// crates/domain/src/page.rs

use serde::Serialize;

use crate::facet::FacetGroup;
use crate::item::NormalizedItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Cursor to pass as `after` for the next page; `None` on an empty page.
    pub end_cursor: Option<String>,
    /// Set when a pool was still saturated at the fetch-size cap, so items
    /// beyond the cap were never seen.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// One page of a filtered collection plus facet counts over the whole of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub items: Vec<NormalizedItem>,
    pub page_info: PageInfo,
    /// Size of the filtered collection before slicing.
    pub total: usize,
    pub facets: Vec<FacetGroup>,
}

impl PageResult {
    pub fn facet(&self, taxonomy: &str) -> Option<&FacetGroup> {
        self.facets.iter().find(|f| f.taxonomy == taxonomy)
    }
}
