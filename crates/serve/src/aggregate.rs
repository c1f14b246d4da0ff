// crates/serve/src/aggregate.rs

//! Content pool aggregation.
//!
//! One [`Aggregator`] serves one collection (a fixed set of pools and facet
//! taxonomies). Per request it:
//!
//!   1. drops selections on taxonomies the collection doesn't expose,
//!   2. skips pools that can't carry every selected taxonomy,
//!   3. fetches the remaining pools concurrently (fan-out / fan-in),
//!   4. normalizes, classifies and merges the records,
//!   5. counts facets over the merged, unsliced set,
//!   6. filters, sorts and slices the page.
//!
//! Pool errors propagate. Nothing is substituted for a failed pool.

use domain::facet::{count_facets, FacetRequest};
use domain::filter::matches;
use domain::item::NormalizedItem;
use domain::page::PageResult;
use domain::query::{CompiledQuery, FilterQuery};
use domain::setting::DiscoverySettings;
use domain::taxonomy::{BUCKET, CATEGORY, MATERIAL_TYPE, SERVICE_AREA, VIDEO_CATEGORY};
use domain::text::TextCache;
use futures::future::try_join_all;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::normalize::{taxonomies, Normalizer};
use crate::paginate::{clamp_first, compare, decode_cursor, paginate, sort_items};
use crate::pool::ContentPool;
use crate::Error;

/// `first` / `after` plus the filter, as it arrives from the edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub query: FilterQuery,
    pub first: Option<usize>,
    pub after: Option<String>,
}

pub struct Aggregator {
    name: String,
    pools: Vec<Arc<dyn ContentPool>>,
    facets: Vec<FacetRequest>,
    normalizer: Normalizer,
    settings: DiscoverySettings,
}

struct Fetched {
    items: Vec<NormalizedItem>,
    truncated: bool,
}

impl Aggregator {
    pub fn new(
        name: impl Into<String>,
        pools: Vec<Arc<dyn ContentPool>>,
        facets: Vec<FacetRequest>,
        normalizer: Normalizer,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            name: name.into(),
            pools,
            facets,
            normalizer,
            settings,
        }
    }

    /// Video entries and projects, faceted by bucket, video category,
    /// material and service area.
    pub fn videos(
        video_entries: Arc<dyn ContentPool>,
        projects: Arc<dyn ContentPool>,
        settings: DiscoverySettings,
    ) -> Self {
        let normalizer = Normalizer::default();
        let facets = vec![
            FacetRequest::new(BUCKET).with_catalog(normalizer.classifier().catalog()),
            FacetRequest::new(VIDEO_CATEGORY),
            FacetRequest::new(MATERIAL_TYPE),
            FacetRequest::new(SERVICE_AREA),
        ];
        Self::new("videos", vec![video_entries, projects], facets, normalizer, settings)
    }

    /// Blog posts, faceted by category.
    pub fn posts(posts: Arc<dyn ContentPool>, settings: DiscoverySettings) -> Self {
        Self::new(
            "posts",
            vec![posts],
            vec![FacetRequest::new(CATEGORY)],
            Normalizer::default(),
            settings,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    /// Taxonomies this collection filters and counts on.
    pub fn taxonomies(&self) -> impl Iterator<Item = &str> {
        self.facets.iter().map(|f| f.taxonomy.as_str())
    }

    /// How many records to ask each pool for.
    ///
    /// Pools are read in bounded batches, never in full, so the batch has to
    /// grow with the requested offset or deep pages would run off the end of
    /// what was fetched: `min(max_pool, max(min_batch, offset + first * multiplier))`.
    /// The multiplier leaves headroom for filters that reject part of the
    /// batch. `max_pool` bounds the cost of one request; past it, results can
    /// be incomplete, which [`Aggregator::aggregate`] reports as `truncated`.
    pub fn fetch_size(&self, offset: usize, first: usize) -> usize {
        let s = &self.settings;
        offset
            .saturating_add(first.saturating_mul(s.multiplier))
            .max(s.min_batch)
            .min(s.max_pool)
            .max(1)
    }

    fn scoped(&self, query: &FilterQuery) -> FilterQuery {
        let mut scoped = query.clone();
        let known: HashSet<&str> = self.taxonomies().collect();
        scoped.selected.retain(|t, slugs| known.contains(t.as_str()) && !slugs.is_empty());
        scoped
    }

    /// A pool whose records can't carry a selected taxonomy contributes
    /// nothing: its items fail the predicate for every facet except that
    /// taxonomy's own, where they have no values to count.
    fn relevant_pools(&self, query: &FilterQuery) -> Vec<&Arc<dyn ContentPool>> {
        self.pools
            .iter()
            .filter(|pool| {
                let carried = taxonomies(pool.kind());
                query
                    .selected
                    .keys()
                    .all(|t| carried.contains(&t.as_str()))
            })
            .collect()
    }

    #[tracing::instrument(skip_all, fields(collection = %self.name))]
    pub async fn aggregate(&self, request: &PageRequest) -> Result<PageResult, Error> {
        let query = self.scoped(&request.query);
        let compiled = query.compile(self.settings.min_query_len);
        let first = clamp_first(request.first, self.settings.max_first);
        let offset = decode_cursor(request.after.as_deref());

        let pools = self.relevant_pools(&query);
        tracing::debug!(
            pools = pools.len(),
            skipped = self.pools.len() - pools.len(),
            first,
            offset,
            "aggregating"
        );

        let mut cache = TextCache::new();
        let Fetched { mut items, truncated } = self
            .fetch_until_filled(&pools, &compiled, offset, first, &mut cache)
            .await?;

        let facets = count_facets(&items, &compiled, &self.facets, &mut cache);

        items.retain(|item| matches(item, &compiled, None, &mut cache));
        sort_items(&mut items);

        let mut page = paginate(items, request.after.as_deref(), first);
        page.page_info.truncated = truncated;

        if truncated {
            tracing::warn!(
                collection = %self.name,
                max_pool = self.settings.max_pool,
                offset,
                "pool still saturated at the fetch cap; page may be incomplete"
            );
        }

        Ok(PageResult {
            items: page.items,
            page_info: page.page_info,
            total: page.total,
            facets,
        })
    }

    /// Fetch at the sized batch, doubling until the window provably holds the
    /// page plus one item past it.
    ///
    /// A pool that came back full may hold more records. Its unfetched records
    /// are all older than the oldest one in its batch, so the window is only
    /// complete once that oldest record sorts at or after the
    /// `(offset + first + 1)`-th match of the merged set, for every full pool.
    async fn fetch_until_filled(
        &self,
        pools: &[&Arc<dyn ContentPool>],
        query: &CompiledQuery,
        offset: usize,
        first: usize,
        cache: &mut TextCache,
    ) -> Result<Fetched, Error> {
        let max_pool = self.settings.max_pool.max(1);
        let mut size = self.fetch_size(offset, first);

        loop {
            let batches = try_join_all(pools.iter().map(|pool| pool.fetch(size))).await?;

            let mut seen = HashSet::new();
            let mut items: Vec<NormalizedItem> = Vec::new();
            // Oldest item of each full batch, `None` when nothing in it normalized.
            let mut horizons: Vec<Option<usize>> = Vec::new();
            for batch in &batches {
                let start = items.len();
                items.extend(
                    batch
                        .iter()
                        .filter_map(|record| self.normalizer.normalize(record))
                        .filter(|item| seen.insert(item.id.clone())),
                );
                if batch.len() >= size {
                    horizons.push((start..items.len()).max_by(|&a, &b| compare(&items[a], &items[b])));
                }
            }

            if horizons.is_empty() {
                return Ok(Fetched {
                    items,
                    truncated: false,
                });
            }

            let mut matching: Vec<&NormalizedItem> = items
                .iter()
                .filter(|item| matches(*item, query, None, cache))
                .collect();
            matching.sort_by(|a, b| compare(a, b));

            let complete = matching.get(offset + first).is_some_and(|past_page| {
                horizons.iter().all(|horizon| {
                    horizon.is_some_and(|i| compare(&items[i], past_page) != Ordering::Less)
                })
            });
            let matched = matching.len();

            if complete {
                return Ok(Fetched {
                    items,
                    truncated: false,
                });
            }
            if size >= max_pool {
                return Ok(Fetched {
                    items,
                    truncated: true,
                });
            }

            size = size.saturating_mul(2).min(max_pool);
            tracing::debug!(size, matching = matched, "escalating pool fetch");
        }
    }
}
