// crates/serve/src/normalize.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use domain::item::{NormalizedItem, PoolKind};
use domain::taxonomy::{TagMap, BUCKET, CATEGORY, MATERIAL_TYPE, SERVICE_AREA, VIDEO_CATEGORY};
use domain::text::{collapse_whitespace, slugify, strip_markup};

use crate::classify::BucketClassifier;
use crate::pool::{PostRecord, ProjectRecord, RawRecord, TermRef, VideoEntryRecord};
use crate::video::parse_video_url;

/// Taxonomies whose values records of `pool` can carry.
pub fn taxonomies(pool: PoolKind) -> &'static [&'static str] {
    match pool {
        PoolKind::VideoEntry => &[BUCKET, VIDEO_CATEGORY],
        PoolKind::Project => &[BUCKET, MATERIAL_TYPE, SERVICE_AREA],
        PoolKind::Post => &[CATEGORY],
    }
}

/// Raw pool records → [`NormalizedItem`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    classifier: BucketClassifier,
}

impl Normalizer {
    pub fn new(classifier: BucketClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &BucketClassifier {
        &self.classifier
    }

    /// `None` when the record can't be shown: an unparseable video URL, a
    /// missing project video, or an unreadable publish date.
    pub fn normalize(&self, record: &RawRecord) -> Option<NormalizedItem> {
        let item = match record {
            RawRecord::VideoEntry(r) => self.video_entry(r),
            RawRecord::Project(r) => self.project(r),
            RawRecord::Post(r) => self.post(r),
        };

        if item.is_none() {
            tracing::debug!(pool = %record.kind(), slug = record.slug(), "dropping unusable record");
        }
        item
    }

    fn video_entry(&self, r: &VideoEntryRecord) -> Option<NormalizedItem> {
        let video = parse_video_url(&r.video_url)?;
        let mut item = base(PoolKind::VideoEntry, &r.slug, &r.title, &r.date, r.excerpt.as_deref(), r.content.as_deref())?;

        insert_terms(&mut item.tags, VIDEO_CATEGORY, &r.categories);
        if let Some(bucket) = self.classifier.classify(PoolKind::VideoEntry, &r.categories) {
            insert_one(&mut item.tags, BUCKET, bucket);
        }
        item.video = Some(video);
        Some(item)
    }

    fn project(&self, r: &ProjectRecord) -> Option<NormalizedItem> {
        let video = parse_video_url(r.video_url.as_deref()?)?;
        let mut item = base(PoolKind::Project, &r.slug, &r.title, &r.date, r.excerpt.as_deref(), r.content.as_deref())?;

        insert_terms(&mut item.tags, MATERIAL_TYPE, &r.material_types);
        insert_terms(&mut item.tags, SERVICE_AREA, &r.service_areas);
        if let Some(bucket) = self.classifier.classify(PoolKind::Project, &[]) {
            insert_one(&mut item.tags, BUCKET, bucket);
        }
        item.video = Some(video);
        Some(item)
    }

    fn post(&self, r: &PostRecord) -> Option<NormalizedItem> {
        let mut item = base(PoolKind::Post, &r.slug, &r.title, &r.date, r.excerpt.as_deref(), r.content.as_deref())?;
        insert_terms(&mut item.tags, CATEGORY, &r.categories);
        Some(item)
    }
}

fn base(
    pool: PoolKind,
    slug: &str,
    title: &str,
    date: &str,
    excerpt: Option<&str>,
    content: Option<&str>,
) -> Option<NormalizedItem> {
    let published_at = parse_date(date)?;
    let slug = slug.trim();
    if slug.is_empty() {
        return None;
    }

    Some(NormalizedItem {
        id: pool.identity(slug),
        slug: slug.to_owned(),
        title: strip_markup(title),
        published_at,
        source_pool: pool,
        excerpt_text: excerpt.map(strip_markup).unwrap_or_default(),
        body_text: content.map(strip_markup).unwrap_or_default(),
        tags: TagMap::new(),
        video: None,
    })
}

/// Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a date.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn insert_terms(tags: &mut TagMap, taxonomy: &str, terms: &[TermRef]) {
    for term in terms {
        let name = collapse_whitespace(&term.name);
        let slug = if term.slug.trim().is_empty() {
            slugify(&name)
        } else {
            slugify(&term.slug)
        };
        if slug.is_empty() {
            continue;
        }
        let name = if name.is_empty() { slug.clone() } else { name };
        insert_one(tags, taxonomy, (slug, name));
    }
}

fn insert_one(tags: &mut TagMap, taxonomy: &str, (slug, name): (String, String)) {
    tags.entry(taxonomy.to_owned())
        .or_default()
        .entry(slug)
        .or_insert(name);
}
