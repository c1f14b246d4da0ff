//! Server-side discovery engine.
//!
//! Pools hand out raw records, the normalizer and classifier turn them into
//! [`domain::NormalizedItem`]s, and the [`aggregate::Aggregator`] merges,
//! counts facets over, filters and paginates them into one
//! [`domain::PageResult`] per request. [`render`] emits the item markup the
//! client synchronizer reads back.

pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod normalize;
pub mod paginate;
pub mod pool;
pub mod render;
pub mod video;

use http::StatusCode;
use thiserror::Error;

use crate::pool::PoolError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("pool fetch failed: {0}")]
    Pool(#[from] PoolError),
}

impl Error {
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::Pool(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
