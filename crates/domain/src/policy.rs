// crates/domain/src/policy.rs

//! Bucket exclusivity.
//!
//! Only the anchor bucket (`roofing-project`) carries the secondary
//! taxonomies (material, service area). The rule sits on top of the
//! predicate:
//!
//! - a secondary selection with no bucket selected behaves as if the anchor
//!   were selected;
//! - selecting a secondary value forces the bucket selection to the anchor;
//! - selecting any other bucket, or deselecting the anchor, clears every
//!   secondary selection.

use crate::query::FilterQuery;
use crate::taxonomy::{TaxonomyKey, BUCKET, MATERIAL_TYPE, ROOFING_PROJECT, SERVICE_AREA};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketExclusivity {
    pub bucket: TaxonomyKey,
    pub anchor: String,
    pub secondary: Vec<TaxonomyKey>,
}

impl Default for BucketExclusivity {
    fn default() -> Self {
        Self {
            bucket: BUCKET.to_owned(),
            anchor: ROOFING_PROJECT.to_owned(),
            secondary: vec![MATERIAL_TYPE.to_owned(), SERVICE_AREA.to_owned()],
        }
    }
}

impl BucketExclusivity {
    pub fn is_secondary(&self, taxonomy: &str) -> bool {
        self.secondary.iter().any(|t| t == taxonomy)
    }

    fn has_secondary_selection(&self, query: &FilterQuery) -> bool {
        self.secondary.iter().any(|t| query.has_selection(t))
    }

    /// The query as the predicate should see it.
    pub fn resolve(&self, query: &FilterQuery) -> FilterQuery {
        let mut out = query.clone();
        if self.has_secondary_selection(query) && !query.has_selection(&self.bucket) {
            out.set_selection(&self.bucket, [self.anchor.as_str()]);
        }
        out
    }

    /// Toggle one value and apply the exclusivity rule; returns whether the
    /// value is selected afterwards.
    pub fn toggle(&self, query: &mut FilterQuery, taxonomy: &str, slug: &str) -> bool {
        let selected = query.toggle(taxonomy, slug);

        if self.is_secondary(taxonomy) {
            if selected {
                query.set_selection(&self.bucket, [self.anchor.as_str()]);
            }
        } else if taxonomy == self.bucket {
            let is_anchor = slug_eq(slug, &self.anchor);
            if (selected && !is_anchor) || (!selected && is_anchor) {
                self.clear_secondary(query);
            }
        }

        selected
    }

    pub fn clear_secondary(&self, query: &mut FilterQuery) {
        for taxonomy in &self.secondary {
            query.clear(taxonomy);
        }
    }
}

fn slug_eq(raw: &str, slug: &str) -> bool {
    crate::text::slugify(raw) == slug
}
