// crates/domain/src/item.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::filter::Filterable;
use crate::taxonomy::TagMap;

// ─────────────────────────────────────────────────────────────────────────────
// Source pools
// ─────────────────────────────────────────────────────────────────────────────

/// Backing collection an item was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    /// Generic video entries; bucket inferred from their categories.
    VideoEntry,
    /// Roofing projects that carry a showcase video.
    Project,
    /// Blog articles.
    Post,
}

impl PoolKind {
    /// Prefix used to keep identities unique across pools that share slugs.
    pub fn prefix(&self) -> &'static str {
        match self {
            PoolKind::VideoEntry => "video",
            PoolKind::Project => "project",
            PoolKind::Post => "post",
        }
    }

    pub fn identity(&self, slug: &str) -> String {
        format!("{}:{}", self.prefix(), slug)
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PoolKind::VideoEntry => "video_entry",
            PoolKind::Project => "project",
            PoolKind::Post => "post",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Video reference
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoPlatform {
    Youtube,
    Vimeo,
}

/// A playable video resolved to its platform id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub platform: VideoPlatform,
    pub id: String,
}

impl VideoRef {
    pub fn embed_url(&self) -> String {
        match self.platform {
            VideoPlatform::Youtube => format!("https://www.youtube.com/embed/{}", self.id),
            VideoPlatform::Vimeo => format!("https://player.vimeo.com/video/{}", self.id),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NormalizedItem
// ─────────────────────────────────────────────────────────────────────────────

/// One record from any pool, reshaped into the common filterable form.
///
/// `id` is unique within a merged collection (pool prefix + slug). Items are
/// built per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub source_pool: PoolKind,
    pub excerpt_text: String,
    /// Markup-free body; searched, never serialized.
    #[serde(skip)]
    pub body_text: String,
    pub tags: TagMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoRef>,
}

impl NormalizedItem {
    /// Slugs carried under `taxonomy`, in slug order.
    pub fn tag_slugs(&self, taxonomy: &str) -> impl Iterator<Item = &str> {
        self.tags
            .get(taxonomy)
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }
}

impl Filterable for NormalizedItem {
    fn identity(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn tags(&self, taxonomy: &str) -> Vec<(&str, &str)> {
        self.tags
            .get(taxonomy)
            .map(|m| m.iter().map(|(s, n)| (s.as_str(), n.as_str())).collect())
            .unwrap_or_default()
    }

    fn has_tag(&self, taxonomy: &str, slug: &str) -> bool {
        self.tags
            .get(taxonomy)
            .is_some_and(|m| m.contains_key(slug))
    }

    fn quick_terms(&self) -> Vec<&str> {
        self.tags
            .values()
            .flat_map(|m| m.values().map(String::as_str))
            .collect()
    }

    fn body_source(&self) -> Option<Cow<'_, str>> {
        if self.excerpt_text.is_empty() {
            Some(Cow::Borrowed(&self.body_text))
        } else {
            Some(Cow::Owned(format!("{} {}", self.excerpt_text, self.body_text)))
        }
    }
}
