//! Shared vocabulary for content discovery.
//!
//! Everything here is pure data shaping: no I/O, no runtime. The server
//! engine (`serve`) and the markup-side synchronizer (`client`) both filter
//! through [`filter::matches`] and count through [`facet::count_facets`], so
//! a page rendered by one and re-filtered by the other agree on what a query
//! means.

pub mod facet;
pub mod filter;
pub mod item;
pub mod page;
pub mod policy;
pub mod query;
pub mod setting;
pub mod taxonomy;
pub mod text;

pub use facet::{count_facets, FacetBucket, FacetGroup, FacetRequest};
pub use filter::{matches, Filterable};
pub use item::{NormalizedItem, PoolKind, VideoPlatform, VideoRef};
pub use page::{PageInfo, PageResult};
pub use policy::BucketExclusivity;
pub use query::{CompiledQuery, FilterQuery, MIN_QUERY_LEN};
pub use taxonomy::{TagMap, TaxonomyKey};
pub use text::TextCache;
