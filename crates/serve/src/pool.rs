// crates/serve/src/pool.rs

//! Backing content pools.
//!
//! A pool hands out raw records in publish order (newest first), bounded by
//! the batch size the aggregator asks for. Pools know nothing about queries:
//! filtering and faceting happen after normalization.

use async_trait::async_trait;
use domain::item::PoolKind;
use serde::Deserialize;
use serde_json::Value as Json;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Raw records
// ─────────────────────────────────────────────────────────────────────────────

/// A taxonomy term as the CMS hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TermRef {
    #[serde(default)]
    pub slug: String,
    pub name: String,
}

impl TermRef {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntryRecord {
    pub slug: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub video_url: String,
    #[serde(default)]
    pub categories: Vec<TermRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub slug: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub material_types: Vec<TermRef>,
    #[serde(default)]
    pub service_areas: Vec<TermRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub slug: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub categories: Vec<TermRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    VideoEntry(VideoEntryRecord),
    Project(ProjectRecord),
    Post(PostRecord),
}

impl RawRecord {
    pub fn kind(&self) -> PoolKind {
        match self {
            RawRecord::VideoEntry(_) => PoolKind::VideoEntry,
            RawRecord::Project(_) => PoolKind::Project,
            RawRecord::Post(_) => PoolKind::Post,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            RawRecord::VideoEntry(r) => &r.slug,
            RawRecord::Project(r) => &r.slug,
            RawRecord::Post(r) => &r.slug,
        }
    }

    /// Decode one JSON record of the given pool.
    pub fn from_json(kind: PoolKind, value: Json) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            PoolKind::VideoEntry => RawRecord::VideoEntry(serde_json::from_value(value)?),
            PoolKind::Project => RawRecord::Project(serde_json::from_value(value)?),
            PoolKind::Post => RawRecord::Post(serde_json::from_value(value)?),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("{pool} pool I/O error: {source}")]
    Io {
        pool: PoolKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{pool} pool returned malformed JSON: {source}")]
    Json {
        pool: PoolKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{pool} pool unavailable: {message}")]
    Unavailable { pool: PoolKind, message: String },
}

impl PoolError {
    pub fn pool(&self) -> PoolKind {
        match self {
            PoolError::Io { pool, .. }
            | PoolError::Json { pool, .. }
            | PoolError::Unavailable { pool, .. } => *pool,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Port
// ─────────────────────────────────────────────────────────────────────────────

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentPool: Send + Sync {
    fn kind(&self) -> PoolKind;

    /// Up to `first` records, newest first. Fewer than `first` means the pool
    /// is exhausted.
    async fn fetch(&self, first: usize) -> Result<Vec<RawRecord>, PoolError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON file pool
// ─────────────────────────────────────────────────────────────────────────────

/// Pool backed by a JSON array on disk, already in publish order.
///
/// The file is re-read on every fetch; wrap it in
/// [`CachedPool`](crate::cache::CachedPool) to revalidate on a cadence
/// instead. Entries that don't decode as the pool's record type are skipped.
#[derive(Debug, Clone)]
pub struct JsonPool {
    kind: PoolKind,
    path: PathBuf,
}

impl JsonPool {
    pub fn new(kind: PoolKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// The conventional file for `kind` inside a pools directory.
    pub fn in_dir(kind: PoolKind, dir: &Path) -> Self {
        Self::new(kind, dir.join(file_name(kind)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn file_name(kind: PoolKind) -> &'static str {
    match kind {
        PoolKind::VideoEntry => "video_entries.json",
        PoolKind::Project => "projects.json",
        PoolKind::Post => "posts.json",
    }
}

#[async_trait]
impl ContentPool for JsonPool {
    fn kind(&self) -> PoolKind {
        self.kind
    }

    #[tracing::instrument(skip_all, fields(pool = %self.kind, first))]
    async fn fetch(&self, first: usize) -> Result<Vec<RawRecord>, PoolError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| PoolError::Io {
                pool: self.kind,
                source,
            })?;

        let values: Vec<Json> =
            serde_json::from_slice(&bytes).map_err(|source| PoolError::Json {
                pool: self.kind,
                source,
            })?;

        let mut out = Vec::with_capacity(first.min(values.len()));
        for value in values {
            if out.len() >= first {
                break;
            }
            match RawRecord::from_json(self.kind, value) {
                Ok(record) => out.push(record),
                Err(e) => tracing::debug!(pool = %self.kind, "skipping undecodable record: {e}"),
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn json_pool_reads_in_file_order_and_honours_first() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("posts.json"),
            r#"[
                {"slug":"c","title":"C","date":"2024-03-01"},
                {"slug":"b","title":"B","date":"2024-02-01","categories":[{"slug":"news","name":"News"}]},
                {"slug":"a","title":"A","date":"2024-01-01"}
            ]"#,
        )
        .unwrap();

        let pool = JsonPool::in_dir(PoolKind::Post, dir.path());
        let records = pool.fetch(2).await.unwrap();

        assert_eq!(
            records.iter().map(RawRecord::slug).collect::<Vec<_>>(),
            vec!["c", "b"]
        );
        let RawRecord::Post(b) = &records[1] else {
            panic!("expected a post record");
        };
        assert_eq!(b.categories, vec![TermRef::new("news", "News")]);
    }

    #[tokio::test]
    async fn undecodable_entries_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("video_entries.json"),
            r#"[
                {"slug":"no-url","title":"Missing","date":"2024-01-01"},
                {"slug":"ok","title":"Ok","date":"2024-01-01","videoUrl":"https://youtu.be/dQw4w9WgXcQ"}
            ]"#,
        )
        .unwrap();

        let pool = JsonPool::in_dir(PoolKind::VideoEntry, dir.path());
        let records = pool.fetch(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].slug(), "ok");
    }

    #[tokio::test]
    async fn missing_file_is_an_error_naming_the_pool() {
        let dir = tempdir().unwrap();
        let pool = JsonPool::in_dir(PoolKind::Project, dir.path());

        let err = pool.fetch(10).await.unwrap_err();
        assert_eq!(err.pool(), PoolKind::Project);
        assert!(matches!(err, PoolError::Io { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("projects.json"), "{ not json").unwrap();

        let pool = JsonPool::in_dir(PoolKind::Project, dir.path());
        assert!(matches!(
            pool.fetch(10).await,
            Err(PoolError::Json { .. })
        ));
    }
}
