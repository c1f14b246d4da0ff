// crates/domain/src/filter.rs

//! The filter predicate.
//!
//! `matches(item, query, omit, cache)` is true when:
//!   1. for every taxonomy with a selection (except `omit`), the item carries at
//!      least one selected slug, and
//!   2. the folded needle (if any) is a substring of the title, a tag name, or
//!      the body text.
//!
//! Taxonomies are checked first. Text is checked cheapest-first: title and tag
//! names are folded on the spot, the body is folded once per identity and kept
//! in the [`TextCache`].

use std::borrow::Cow;

use crate::query::CompiledQuery;
use crate::text::{fold, TextCache};

/// Anything the predicate can evaluate: server items and rendered item nodes.
pub trait Filterable {
    /// Stable identity; keys the body-text cache.
    fn identity(&self) -> &str;

    fn title(&self) -> &str;

    /// `(slug, display name)` pairs carried under `taxonomy`.
    fn tags(&self, taxonomy: &str) -> Vec<(&str, &str)>;

    fn has_tag(&self, taxonomy: &str, slug: &str) -> bool {
        self.tags(taxonomy).iter().any(|(s, _)| *s == slug)
    }

    /// Short strings searched before the body (tag names).
    fn quick_terms(&self) -> Vec<&str>;

    /// Raw body text, only consulted when the quick fields miss and the cache
    /// has no entry for this identity yet.
    fn body_source(&self) -> Option<Cow<'_, str>>;
}

pub fn matches<F>(item: &F, query: &CompiledQuery, omit: Option<&str>, cache: &mut TextCache) -> bool
where
    F: Filterable + ?Sized,
{
    let taxonomies_match = query
        .selected()
        .iter()
        .filter(|(taxonomy, _)| Some(taxonomy.as_str()) != omit)
        .all(|(taxonomy, wanted)| wanted.iter().any(|slug| item.has_tag(taxonomy, slug)));

    if !taxonomies_match {
        return false;
    }

    let Some(needle) = query.needle() else {
        return true;
    };

    if fold(item.title()).contains(needle) {
        return true;
    }
    if item.quick_terms().iter().any(|t| fold(t).contains(needle)) {
        return true;
    }

    cache
        .get_or_fill(item.identity(), || {
            item.body_source().map(Cow::into_owned).unwrap_or_default()
        })
        .contains(needle)
}
