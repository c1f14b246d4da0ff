// crates/client/src/kinds.rs

//! Per-kind synchronizer configuration.
//!
//! Every content kind runs the same engine; what differs is where its
//! controls live, which taxonomies it filters on, what its URL parameters
//! are called, and whether it applies bucket exclusivity or grouping.

use domain::policy::BucketExclusivity;
use domain::query::MIN_QUERY_LEN;
use domain::taxonomy::{data_attribute, BUCKET, CATEGORY, MATERIAL_TYPE, SERVICE_AREA, VIDEO_CATEGORY};

use crate::url::ParamBinding;

/// Items organized into named sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConfig {
    /// Section element, hidden when none of its items is visible.
    pub section: String,
    /// Set `open` on visible items while a text query is active.
    pub expand_on_text: bool,
}

/// One filterable taxonomy: where it lives on an item and in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetBinding {
    pub taxonomy: String,
    /// Item attribute holding the slugs, `|`- or `,`-separated.
    pub attribute: String,
    pub param: String,
}

impl FacetBinding {
    pub fn new(taxonomy: &str, param: &str) -> Self {
        Self {
            taxonomy: taxonomy.to_owned(),
            attribute: data_attribute(taxonomy),
            param: param.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConfig {
    pub name: String,
    /// Element wrapping this kind's controls and containers.
    pub scope: String,
    /// Item containers within the scope; watched for appended items.
    pub containers: String,
    pub item: String,
    pub group: Option<GroupConfig>,
    pub search_input: String,
    /// Facet toggles; each carries `data-facet` (taxonomy) and `data-value`.
    pub toggle: String,
    pub count: String,
    pub empty: String,
    pub chips: String,
    pub facets: Vec<FacetBinding>,
    pub text_param: String,
    pub min_query_len: usize,
    pub exclusivity: Option<BucketExclusivity>,
    /// Items whose body text is normalized at mount.
    pub prewarm: usize,
}

impl KindConfig {
    /// Defaults shared by every kind; `name` keys the scope selector.
    pub fn base(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            scope: format!(r#"[data-discovery="{name}"]"#),
            containers: "[data-discovery-items]".into(),
            item: "[data-id]".into(),
            group: None,
            search_input: "[data-discovery-search]".into(),
            toggle: "[data-facet][data-value]".into(),
            count: "[data-discovery-count]".into(),
            empty: "[data-discovery-empty]".into(),
            chips: "[data-discovery-chips]".into(),
            facets: Vec::new(),
            text_param: "q".into(),
            min_query_len: MIN_QUERY_LEN,
            exclusivity: None,
            prewarm: 6,
        }
    }

    pub fn with_facet(mut self, taxonomy: &str, param: &str) -> Self {
        self.facets.push(FacetBinding::new(taxonomy, param));
        self
    }

    /// Blog article list.
    pub fn articles() -> Self {
        Self::base("articles").with_facet(CATEGORY, "category")
    }

    /// Project case studies.
    pub fn projects() -> Self {
        Self::base("projects")
            .with_facet(MATERIAL_TYPE, "material")
            .with_facet(SERVICE_AREA, "area")
    }

    /// Merged video list; secondary taxonomies only apply to project videos.
    pub fn videos() -> Self {
        let mut config = Self::base("videos")
            .with_facet(BUCKET, "bucket")
            .with_facet(VIDEO_CATEGORY, "topic")
            .with_facet(MATERIAL_TYPE, "material")
            .with_facet(SERVICE_AREA, "area");
        config.exclusivity = Some(BucketExclusivity::default());
        config
    }

    /// Question/answer list grouped into sections of `<details>` items.
    pub fn faqs() -> Self {
        let mut config = Self::base("faqs").with_facet(CATEGORY, "topic");
        config.group = Some(GroupConfig {
            section: "[data-faq-group]".into(),
            expand_on_text: true,
        });
        config
    }

    pub fn param_bindings(&self) -> Vec<ParamBinding> {
        self.facets
            .iter()
            .map(|f| ParamBinding::new(f.taxonomy.clone(), f.param.clone()))
            .collect()
    }

    pub fn facet(&self, taxonomy: &str) -> Option<&FacetBinding> {
        self.facets.iter().find(|f| f.taxonomy == taxonomy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_differ_only_in_configuration() {
        let videos = KindConfig::videos();
        assert_eq!(videos.scope, r#"[data-discovery="videos"]"#);
        assert!(videos.exclusivity.is_some());
        assert_eq!(videos.facet(MATERIAL_TYPE).unwrap().attribute, "data-material-type");

        let faqs = KindConfig::faqs();
        assert!(faqs.group.as_ref().is_some_and(|g| g.expand_on_text));
        assert!(faqs.exclusivity.is_none());

        assert_eq!(
            KindConfig::projects()
                .param_bindings()
                .into_iter()
                .map(|b| b.param)
                .collect::<Vec<_>>(),
            vec!["material", "area"]
        );
    }
}
