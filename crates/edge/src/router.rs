// crates/edge/src/router.rs

use axum::{
    extract::{RawQuery, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use domain::query::FilterQuery;
use domain::taxonomy::{BUCKET, CATEGORY, MATERIAL_TYPE, SERVICE_AREA, VIDEO_CATEGORY};
use serde_json::json;
use serve::aggregate::{Aggregator, PageRequest};
use std::sync::Arc;
use tracing::{debug, error};

/// URL parameter → taxonomy. Each parameter carries a comma-separated slug list.
pub const TAXONOMY_PARAMS: &[(&str, &str)] = &[
    ("bucket", BUCKET),
    ("topic", VIDEO_CATEGORY),
    ("material", MATERIAL_TYPE),
    ("area", SERVICE_AREA),
    ("category", CATEGORY),
];

/// Free-text parameter.
pub const TEXT_PARAM: &str = "q";

/// Aggregators shared by every request.
#[derive(Clone)]
pub struct AppState {
    videos: Arc<Aggregator>,
    posts: Arc<Aggregator>,
}

impl AppState {
    pub fn new(videos: Aggregator, posts: Aggregator) -> Self {
        Self {
            videos: Arc::new(videos),
            posts: Arc::new(posts),
        }
    }

    /// Aggregator for a collection name (`videos` or `posts`).
    pub fn collection(&self, name: &str) -> Option<&Aggregator> {
        match name {
            "videos" => Some(&self.videos),
            "posts" => Some(&self.posts),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Router construction
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub fn build_app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/videos", get(videos_handler))
        .route("/api/posts", get(posts_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Query string → page request. Unknown parameters are ignored; an
/// unparseable `first` counts as absent.
pub fn page_request(raw_query: &str) -> PageRequest {
    let mut query = FilterQuery::new();
    let mut first = None;
    let mut after = None;

    for (key, value) in form_urlencoded::parse(raw_query.as_bytes()) {
        match key.as_ref() {
            "first" => first = value.trim().parse::<usize>().ok(),
            "after" => after = Some(value.into_owned()).filter(|a| !a.is_empty()),
            TEXT_PARAM => query.text = value.trim().to_owned(),
            other => {
                let Some((_, taxonomy)) = TAXONOMY_PARAMS.iter().find(|(p, _)| *p == other) else {
                    continue;
                };
                let mut slugs: Vec<String> = query
                    .selection(taxonomy)
                    .map(|s| s.iter().cloned().collect())
                    .unwrap_or_default();
                slugs.extend(value.split(',').map(str::to_owned));
                query.set_selection(taxonomy, slugs);
            }
        }
    }

    PageRequest {
        query,
        first,
        after,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn videos_handler(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    page_response(&state.videos, raw.as_deref().unwrap_or_default()).await
}

async fn posts_handler(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    page_response(&state.posts, raw.as_deref().unwrap_or_default()).await
}

#[tracing::instrument(skip_all, fields(collection = aggregator.name()))]
async fn page_response(aggregator: &Aggregator, raw_query: &str) -> Response {
    let request = page_request(raw_query);
    debug!(?request, "page request");

    match aggregator.aggregate(&request).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => {
            error!("aggregation failed for {}: {}", aggregator.name(), e);
            (e.to_status(), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_map_to_taxonomies() {
        let req = page_request("first=12&after=YXJyYXljb25uZWN0aW9uOjEx&q=+hail+&material=metal,tile&area=tampa&utm=x");

        assert_eq!(req.first, Some(12));
        assert_eq!(req.after.as_deref(), Some("YXJyYXljb25uZWN0aW9uOjEx"));
        assert_eq!(req.query.text, "hail");
        assert!(req.query.is_selected(MATERIAL_TYPE, "tile"));
        assert!(req.query.is_selected(SERVICE_AREA, "tampa"));
        assert_eq!(req.query.selected.len(), 2);
    }

    #[test]
    fn garbage_never_fails() {
        let req = page_request("first=lots&after=&bucket=");
        assert_eq!(req.first, None);
        assert_eq!(req.after, None);
        assert!(req.query.is_empty(2));
    }
}
