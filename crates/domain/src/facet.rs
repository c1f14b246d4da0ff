// crates/domain/src/facet.rs

//! Independent facet counts.
//!
//! For a taxonomy `T` and a value `v`:
//!
//! ```text
//! count(T = v) = |{ item : matches(item, query, omit = T) ∧ v ∈ item.tags[T] }|
//! ```
//!
//! `T`'s own selection never narrows `T`'s counts; every other taxonomy's
//! selection and the free text still do.
//!
//! Bucket order: catalog values first (in catalog order), then every other
//! observed or selected value by slug. Catalog and selected values are listed
//! even at count 0.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::filter::{matches, Filterable};
use crate::query::CompiledQuery;
use crate::taxonomy::TaxonomyKey;
use crate::text::TextCache;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub slug: String,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetGroup {
    pub taxonomy: TaxonomyKey,
    pub buckets: Vec<FacetBucket>,
}

impl FacetGroup {
    pub fn bucket(&self, slug: &str) -> Option<&FacetBucket> {
        self.buckets.iter().find(|b| b.slug == slug)
    }

    pub fn count(&self, slug: &str) -> Option<usize> {
        self.bucket(slug).map(|b| b.count)
    }
}

/// A taxonomy to count, with values that must always be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRequest {
    pub taxonomy: TaxonomyKey,
    /// `(slug, display name)`, listed first and kept at count 0.
    pub catalog: Vec<(String, String)>,
}

impl FacetRequest {
    pub fn new(taxonomy: impl Into<TaxonomyKey>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            catalog: Vec::new(),
        }
    }

    pub fn with_catalog<I, S, N>(mut self, catalog: I) -> Self
    where
        I: IntoIterator<Item = (S, N)>,
        S: Into<String>,
        N: Into<String>,
    {
        self.catalog = catalog
            .into_iter()
            .map(|(s, n)| (s.into(), n.into()))
            .collect();
        self
    }
}

/// Count every requested taxonomy over the whole (unsliced) collection.
#[tracing::instrument(skip_all, fields(items = items.len(), facets = requests.len()))]
pub fn count_facets<F>(
    items: &[F],
    query: &CompiledQuery,
    requests: &[FacetRequest],
    cache: &mut TextCache,
) -> Vec<FacetGroup>
where
    F: Filterable,
{
    requests
        .iter()
        .map(|req| count_one(items, query, req, cache))
        .collect()
}

fn count_one<F>(
    items: &[F],
    query: &CompiledQuery,
    req: &FacetRequest,
    cache: &mut TextCache,
) -> FacetGroup
where
    F: Filterable,
{
    let taxonomy = req.taxonomy.as_str();
    let mut catalog: Vec<FacetBucket> = Vec::new();
    let mut others: Vec<FacetBucket> = Vec::new();
    // slug → (is_catalog, index)
    let mut index: HashMap<String, (bool, usize)> = HashMap::new();

    for (slug, name) in &req.catalog {
        if index.contains_key(slug) {
            continue;
        }
        index.insert(slug.clone(), (true, catalog.len()));
        catalog.push(FacetBucket {
            slug: slug.clone(),
            name: name.clone(),
            count: 0,
        });
    }

    for item in items {
        if !matches(item, query, Some(taxonomy), cache) {
            continue;
        }
        for (slug, name) in item.tags(taxonomy) {
            let bucket = match index.get(slug) {
                Some(&(true, i)) => &mut catalog[i],
                Some(&(false, i)) => &mut others[i],
                None => {
                    index.insert(slug.to_owned(), (false, others.len()));
                    others.push(FacetBucket {
                        slug: slug.to_owned(),
                        name: name.to_owned(),
                        count: 0,
                    });
                    let last = others.len() - 1;
                    &mut others[last]
                }
            };
            bucket.count += 1;
        }
    }

    if let Some(selected) = query.selection(taxonomy) {
        for slug in selected {
            if !index.contains_key(slug) {
                index.insert(slug.clone(), (false, others.len()));
                others.push(FacetBucket {
                    slug: slug.clone(),
                    name: slug.clone(),
                    count: 0,
                });
            }
        }
    }

    others.sort_by(|a, b| a.slug.cmp(&b.slug));
    catalog.extend(others);

    FacetGroup {
        taxonomy: req.taxonomy.clone(),
        buckets: catalog,
    }
}
