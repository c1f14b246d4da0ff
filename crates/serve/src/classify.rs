// crates/serve/src/classify.rs

//! Bucket classification.
//!
//! The bucket taxonomy is a view-layer concept: the CMS never assigns it.
//! Project items are always `roofing-project`; generic video entries are
//! bucketed by matching their own tags (slug or name, case-insensitive)
//! against curated alias lists. No match → `other`.

use domain::item::PoolKind;
use domain::taxonomy::ROOFING_PROJECT;
use domain::text::slugify;

use crate::pool::TermRef;

pub const OTHER: &str = "other";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDef {
    pub slug: String,
    pub name: String,
    /// Slugified aliases, matched against slugified tag slugs and names.
    pub aliases: Vec<String>,
}

impl BucketDef {
    fn new(slug: &str, name: &str, aliases: &[&str]) -> Self {
        Self {
            slug: slug.to_owned(),
            name: name.to_owned(),
            aliases: aliases.iter().map(|a| slugify(a)).collect(),
        }
    }

    fn matches(&self, term: &TermRef) -> bool {
        let slug = slugify(&term.slug);
        let name = slugify(&term.name);
        self.aliases.iter().any(|a| *a == slug || *a == name)
    }
}

#[derive(Debug, Clone)]
pub struct BucketClassifier {
    /// Catalog order; the first matching bucket wins.
    buckets: Vec<BucketDef>,
}

impl Default for BucketClassifier {
    fn default() -> Self {
        Self {
            buckets: vec![
                BucketDef::new(
                    ROOFING_PROJECT,
                    "Roofing Projects",
                    &["roofing project", "roofing projects", "project", "projects"],
                ),
                BucketDef::new(
                    "commercials",
                    "Commercials",
                    &["commercial", "commercials", "tv spot", "ad", "ads", "advertisement"],
                ),
                BucketDef::new(
                    "accolades",
                    "Accolades",
                    &["accolade", "accolades", "award", "awards", "recognition"],
                ),
                BucketDef::new(
                    "explainers",
                    "Explainers",
                    &["explainer", "explainers", "how to", "education", "educational"],
                ),
                BucketDef::new(
                    "testimonials",
                    "Testimonials",
                    &["testimonial", "testimonials", "review", "reviews", "customer story"],
                ),
                BucketDef::new(OTHER, "Other", &[]),
            ],
        }
    }
}

impl BucketClassifier {
    pub fn new(buckets: Vec<BucketDef>) -> Self {
        Self { buckets }
    }

    /// `(slug, name)` of every bucket, in catalog order.
    pub fn catalog(&self) -> Vec<(String, String)> {
        self.buckets
            .iter()
            .map(|b| (b.slug.clone(), b.name.clone()))
            .collect()
    }

    fn def(&self, slug: &str) -> Option<&BucketDef> {
        self.buckets.iter().find(|b| b.slug == slug)
    }

    /// The bucket for a record, or `None` for pools outside the bucket facet.
    pub fn classify(&self, pool: PoolKind, tags: &[TermRef]) -> Option<(String, String)> {
        match pool {
            PoolKind::Project => self
                .def(ROOFING_PROJECT)
                .map(|b| (b.slug.clone(), b.name.clone())),
            PoolKind::VideoEntry => Some(
                self.buckets
                    .iter()
                    .find(|b| tags.iter().any(|t| b.matches(t)))
                    .map(|b| (b.slug.clone(), b.name.clone()))
                    .unwrap_or_else(|| self.fallback()),
            ),
            PoolKind::Post => None,
        }
    }

    fn fallback(&self) -> (String, String) {
        self.def(OTHER)
            .map(|b| (b.slug.clone(), b.name.clone()))
            .unwrap_or_else(|| (OTHER.to_owned(), "Other".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TermRef {
        TermRef::new(slugify(name), name)
    }

    #[test]
    fn projects_are_always_roofing_project() {
        let c = BucketClassifier::default();
        let got = c.classify(PoolKind::Project, &[tag("Awards")]);
        assert_eq!(got.map(|(s, _)| s), Some(ROOFING_PROJECT.to_owned()));
    }

    #[test]
    fn video_entries_match_aliases_case_insensitively() {
        let c = BucketClassifier::default();
        let slug = |tags: &[TermRef]| c.classify(PoolKind::VideoEntry, tags).map(|(s, _)| s);

        assert_eq!(slug(&[tag("Awards")]).as_deref(), Some("accolades"));
        assert_eq!(slug(&[tag("EXPLAINER")]).as_deref(), Some("explainers"));
        assert_eq!(slug(&[TermRef::new("", "TV Spot")]).as_deref(), Some("commercials"));
        assert_eq!(
            slug(&[tag("Storm season"), tag("Customer Story")]).as_deref(),
            Some("testimonials")
        );
    }

    #[test]
    fn unmatched_video_entries_fall_into_other() {
        let c = BucketClassifier::default();
        let got = c.classify(PoolKind::VideoEntry, &[tag("Behind the scenes")]);
        assert_eq!(got, Some(("other".to_owned(), "Other".to_owned())));
        assert_eq!(
            c.classify(PoolKind::VideoEntry, &[]).map(|(s, _)| s).as_deref(),
            Some("other")
        );
    }

    #[test]
    fn posts_have_no_bucket() {
        assert_eq!(BucketClassifier::default().classify(PoolKind::Post, &[]), None);
    }

    #[test]
    fn catalog_keeps_declared_order() {
        let slugs: Vec<_> = BucketClassifier::default()
            .catalog()
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        assert_eq!(
            slugs,
            vec!["roofing-project", "commercials", "accolades", "explainers", "testimonials", "other"]
        );
    }
}
