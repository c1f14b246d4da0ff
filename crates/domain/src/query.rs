// crates/domain/src/query.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::taxonomy::TaxonomyKey;
use crate::text::{fold, slugify};

/// Shortest free-text query that filters anything.
pub const MIN_QUERY_LEN: usize = 2;

/// Free text plus selected slugs per taxonomy.
///
/// Slugs are stored slugified, so `"METAL"` and `"metal"` select the same
/// value. Taxonomies with an empty selection impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    pub text: String,
    pub selected: BTreeMap<TaxonomyKey, BTreeSet<String>>,
}

impl FilterQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder-style `set_selection`.
    pub fn with_selection<I, S>(mut self, taxonomy: &str, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_selection(taxonomy, slugs);
        self
    }

    /// Replace the selection for `taxonomy`. Blank slugs are ignored; an
    /// empty result removes the taxonomy entirely.
    pub fn set_selection<I, S>(&mut self, taxonomy: &str, slugs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = slugs
            .into_iter()
            .map(|s| slugify(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();

        if set.is_empty() {
            self.selected.remove(taxonomy);
        } else {
            self.selected.insert(taxonomy.to_owned(), set);
        }
    }

    pub fn clear(&mut self, taxonomy: &str) {
        self.selected.remove(taxonomy);
    }

    pub fn selection(&self, taxonomy: &str) -> Option<&BTreeSet<String>> {
        self.selected.get(taxonomy).filter(|s| !s.is_empty())
    }

    pub fn has_selection(&self, taxonomy: &str) -> bool {
        self.selection(taxonomy).is_some()
    }

    pub fn is_selected(&self, taxonomy: &str, slug: &str) -> bool {
        self.selected
            .get(taxonomy)
            .is_some_and(|s| s.contains(&slugify(slug)))
    }

    /// Flip one value; returns whether it is selected afterwards.
    pub fn toggle(&mut self, taxonomy: &str, slug: &str) -> bool {
        let slug = slugify(slug);
        if slug.is_empty() {
            return false;
        }

        let set = self.selected.entry(taxonomy.to_owned()).or_default();
        let now_selected = if set.remove(&slug) {
            false
        } else {
            set.insert(slug);
            true
        };

        if set.is_empty() {
            self.selected.remove(taxonomy);
        }
        now_selected
    }

    /// Whether the text is long enough to filter.
    pub fn has_active_text(&self, min_len: usize) -> bool {
        let trimmed = self.text.trim();
        !trimmed.is_empty() && trimmed.chars().count() >= min_len
    }

    pub fn is_empty(&self, min_len: usize) -> bool {
        !self.has_active_text(min_len) && self.selected.values().all(BTreeSet::is_empty)
    }

    /// Fold the text once and drop empty selections, ready for repeated
    /// evaluation.
    pub fn compile(&self, min_len: usize) -> CompiledQuery {
        let needle = if self.has_active_text(min_len) {
            Some(fold(&self.text)).filter(|n| !n.is_empty())
        } else {
            None
        };

        CompiledQuery {
            needle,
            selected: self
                .selected
                .iter()
                .filter(|(_, slugs)| !slugs.is_empty())
                .map(|(t, slugs)| (t.clone(), slugs.clone()))
                .collect(),
        }
    }
}

/// Evaluation form of a [`FilterQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    needle: Option<String>,
    selected: BTreeMap<TaxonomyKey, BTreeSet<String>>,
}

impl CompiledQuery {
    /// Folded free text, `None` when below the minimum length.
    pub fn needle(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    pub fn selected(&self) -> &BTreeMap<TaxonomyKey, BTreeSet<String>> {
        &self.selected
    }

    pub fn selection(&self, taxonomy: &str) -> Option<&BTreeSet<String>> {
        self.selected.get(taxonomy)
    }
}
