// crates/client/src/engine.rs

//! One synchronizer per content kind.
//!
//! A pass reads every rendered item under the kind's containers, evaluates
//! the shared predicate with the current query, and writes visibility, facet
//! counts, the result count, the empty state, chips, and the URL. Passes run
//! at mount, after every input or toggle, and once per drained batch of
//! container mutations.

use std::borrow::Cow;

use domain::facet::{count_facets, FacetGroup, FacetRequest};
use domain::filter::{matches, Filterable};
use domain::query::FilterQuery;
use domain::taxonomy::TAG_SEPARATOR;
use domain::text::TextCache;
use tracing::{debug, warn};

use crate::chips::{render_chips, Chip, CHIP_SELECTOR};
use crate::dom::{Dom, NodeId, ObserverId};
use crate::history::History;
use crate::kinds::{FacetBinding, KindConfig};
use crate::selector::Selector;
use crate::url::{merge_search, parse_search, ParamBinding};
use crate::SyncError;

/// User interaction routed to a synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// The search input's `value` changed.
    Input(NodeId),
    Click(NodeId),
}

// ─────────────────────────────────────────────────────────────────────────────
// Compiled selectors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Selectors {
    containers: Selector,
    item: Selector,
    section: Option<Selector>,
    search_input: Selector,
    toggle: Selector,
    count: Selector,
    empty: Selector,
    chips: Selector,
    chip: Selector,
}

impl Selectors {
    fn compile(config: &KindConfig) -> Result<Self, SyncError> {
        Ok(Self {
            containers: Selector::parse(&config.containers)?,
            item: Selector::parse(&config.item)?,
            section: config
                .group
                .as_ref()
                .map(|g| Selector::parse(&g.section))
                .transpose()?,
            search_input: Selector::parse(&config.search_input)?,
            toggle: Selector::parse(&config.toggle)?,
            count: Selector::parse(&config.count)?,
            empty: Selector::parse(&config.empty)?,
            chips: Selector::parse(&config.chips)?,
            chip: Selector::parse(CHIP_SELECTOR)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendered items as filterable values
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of one item node's filter-relevant attributes.
struct DomItem<'a, D: Dom + ?Sized> {
    dom: &'a D,
    node: NodeId,
    id: String,
    title: String,
    tags: Vec<(String, Vec<String>)>,
    terms: Vec<String>,
}

impl<'a, D: Dom + ?Sized> DomItem<'a, D> {
    fn read(dom: &'a D, node: NodeId, facets: &[FacetBinding]) -> Self {
        let id = dom
            .attribute(node, "data-id")
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("node-{}", node.index()));
        let title = dom.attribute(node, "data-title").unwrap_or_default();

        let mut tags = Vec::with_capacity(facets.len());
        let mut terms = Vec::new();
        for facet in facets {
            let slugs: Vec<String> = dom
                .attribute(node, &facet.attribute)
                .map(|raw| split_slugs(&raw))
                .unwrap_or_default();
            terms.extend(slugs.iter().map(|s| s.replace('-', " ")));
            tags.push((facet.taxonomy.clone(), slugs));
        }

        Self {
            dom,
            node,
            id,
            title,
            tags,
            terms,
        }
    }
}

fn split_slugs(raw: &str) -> Vec<String> {
    raw.split([TAG_SEPARATOR, ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

impl<D: Dom + ?Sized> Filterable for DomItem<'_, D> {
    fn identity(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn tags(&self, taxonomy: &str) -> Vec<(&str, &str)> {
        self.tags
            .iter()
            .find(|(t, _)| t == taxonomy)
            .map(|(_, slugs)| slugs.iter().map(|s| (s.as_str(), s.as_str())).collect())
            .unwrap_or_default()
    }

    fn quick_terms(&self) -> Vec<&str> {
        self.terms.iter().map(String::as_str).collect()
    }

    fn body_source(&self) -> Option<Cow<'_, str>> {
        let template = self
            .dom
            .attribute(self.node, "data-search-template")
            .and_then(|id| self.dom.element_by_id(&id));

        let text = match template {
            Some(t) => self.dom.text_content(t),
            None => match self.dom.attribute(self.node, "data-search-text") {
                Some(text) => text,
                None => self.dom.text_content(self.node),
            },
        };
        Some(Cow::Owned(text))
    }
}

fn snapshot<'a, D: Dom + ?Sized>(
    dom: &'a D,
    containers: &[NodeId],
    item: &Selector,
    facets: &[FacetBinding],
) -> Vec<DomItem<'a, D>> {
    containers
        .iter()
        .flat_map(|c| dom.query_all(*c, item))
        .map(|node| DomItem::read(dom, node, facets))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Synchronizer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Toggle {
    node: NodeId,
    taxonomy: String,
    slug: String,
    label: String,
}

#[derive(Debug)]
pub struct Synchronizer {
    config: KindConfig,
    selectors: Selectors,
    bindings: Vec<ParamBinding>,
    scope: NodeId,
    containers: Vec<NodeId>,
    observers: Vec<ObserverId>,
    query: FilterQuery,
    cache: TextCache,
    last_search: String,
    visible: usize,
    passes: usize,
}

impl Synchronizer {
    /// Bind to the kind's scope, restore the query from the URL, and run the
    /// first pass. Fails with [`SyncError::NotFound`] when the page has no
    /// scope or no container for this kind.
    #[tracing::instrument(skip_all, fields(kind = %config.name))]
    pub fn mount<D, H>(config: KindConfig, dom: &mut D, history: &mut H) -> Result<Self, SyncError>
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        let selectors = Selectors::compile(&config)?;
        let scope_selector = Selector::parse(&config.scope)?;

        let scope = dom
            .query(dom.root(), &scope_selector)
            .ok_or_else(|| SyncError::NotFound(config.scope.clone()))?;
        let containers = dom.query_all(scope, &selectors.containers);
        if containers.is_empty() {
            return Err(SyncError::NotFound(config.containers.clone()));
        }

        let bindings = config.param_bindings();
        let current = history.search();
        let query = parse_search(&current, &config.text_param, &bindings);
        let last_search = merge_search(
            &current,
            &query,
            &config.text_param,
            &bindings,
            config.min_query_len,
        );

        let observers = containers.iter().map(|c| dom.observe(*c)).collect();

        let mut sync = Self {
            config,
            selectors,
            bindings,
            scope,
            containers,
            observers,
            query,
            cache: TextCache::new(),
            last_search,
            visible: 0,
            passes: 0,
        };

        sync.reflect_input(dom);
        sync.prewarm(dom);
        sync.apply(dom, history);

        debug!(visible = sync.visible, "mounted");
        Ok(sync)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Explicit query: what the user selected, before exclusivity.
    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Completed filter passes since mount.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Route one event; returns whether it belonged to this kind.
    pub fn handle<D, H>(&mut self, dom: &mut D, history: &mut H, event: UiEvent) -> bool
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        match event {
            UiEvent::Input(node) => {
                if !dom.contains(self.scope, node)
                    || dom.closest(node, &self.selectors.search_input) != Some(node)
                {
                    return false;
                }
                let value = dom.attribute(node, "value").unwrap_or_default();
                if value != self.query.text {
                    self.query.text = value;
                    self.apply(dom, history);
                }
                true
            }
            UiEvent::Click(node) => {
                if !dom.contains(self.scope, node) {
                    return false;
                }

                let view: &D = dom;
                let target = view
                    .closest(node, &self.selectors.chip)
                    .filter(|chip| self.in_chip_area(view, *chip))
                    .map(|chip| (chip, "data-chip", true))
                    .or_else(|| {
                        view.closest(node, &self.selectors.toggle)
                            .map(|t| (t, "data-facet", false))
                    });

                let Some((el, taxonomy_attr, removal)) = target else {
                    return false;
                };
                let (Some(taxonomy), Some(slug)) =
                    (view.attribute(el, taxonomy_attr), view.attribute(el, "data-value"))
                else {
                    return false;
                };
                if self.config.facet(&taxonomy).is_none() {
                    debug!(%taxonomy, "toggle for an unbound taxonomy");
                    return false;
                }
                if removal && !self.query.is_selected(&taxonomy, &slug) {
                    return true;
                }

                self.toggle(&taxonomy, &slug);
                self.apply(dom, history);
                true
            }
        }
    }

    /// Drain pending container mutations; any number of them costs one pass.
    pub fn pump<D, H>(&mut self, dom: &mut D, history: &mut H) -> bool
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        let mut changed = false;
        for observer in &self.observers {
            if !dom.take_records(*observer).is_empty() {
                changed = true;
            }
        }
        if changed {
            self.apply(dom, history);
        }
        changed
    }

    /// Re-run the filter pass with the current query.
    pub fn refresh<D, H>(&mut self, dom: &mut D, history: &mut H)
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        self.apply(dom, history);
    }

    pub fn unmount<D: Dom + ?Sized>(self, dom: &mut D) {
        for observer in self.observers {
            dom.disconnect(observer);
        }
        debug!(kind = %self.config.name, "unmounted");
    }

    // ── internals ──────────────────────────────────────────────────────────

    fn toggle(&mut self, taxonomy: &str, slug: &str) {
        match &self.config.exclusivity {
            Some(rule) => rule.toggle(&mut self.query, taxonomy, slug),
            None => self.query.toggle(taxonomy, slug),
        };
    }

    fn in_chip_area<D: Dom + ?Sized>(&self, dom: &D, node: NodeId) -> bool {
        dom.parent(node)
            .and_then(|p| dom.closest(p, &self.selectors.chips))
            .is_some()
    }

    fn reflect_input<D: Dom + ?Sized>(&self, dom: &mut D) {
        for input in dom.query_all(self.scope, &self.selectors.search_input) {
            dom.set_attribute(input, "value", &self.query.text);
        }
    }

    fn prewarm<D: Dom + ?Sized>(&mut self, dom: &D) {
        let items = snapshot(dom, &self.containers, &self.selectors.item, &self.config.facets);
        for item in items.iter().take(self.config.prewarm) {
            self.cache.get_or_fill(item.identity(), || {
                item.body_source().map(Cow::into_owned).unwrap_or_default()
            });
        }
    }

    fn toggles<D: Dom + ?Sized>(&self, dom: &D) -> Vec<Toggle> {
        dom.query_all(self.scope, &self.selectors.toggle)
            .into_iter()
            .filter(|node| dom.closest(*node, &self.selectors.chips).is_none())
            .filter_map(|node| {
                let taxonomy = dom.attribute(node, "data-facet")?;
                let slug = dom.attribute(node, "data-value")?;
                let label = dom.text_content(node).trim().to_owned();
                Some(Toggle {
                    node,
                    taxonomy,
                    slug,
                    label,
                })
            })
            .collect()
    }

    fn facet_requests(&self, toggles: &[Toggle]) -> Vec<FacetRequest> {
        self.config
            .facets
            .iter()
            .map(|f| {
                FacetRequest::new(f.taxonomy.as_str()).with_catalog(
                    toggles
                        .iter()
                        .filter(|t| t.taxonomy == f.taxonomy)
                        .map(|t| (t.slug.clone(), t.label.clone())),
                )
            })
            .collect()
    }

    #[tracing::instrument(skip_all, fields(kind = %self.config.name))]
    fn apply<D, H>(&mut self, dom: &mut D, history: &mut H)
    where
        D: Dom + ?Sized,
        H: History + ?Sized,
    {
        for container in &self.containers {
            dom.set_attribute(*container, "data-busy", "true");
            dom.set_attribute(*container, "aria-busy", "true");
        }

        let effective = match &self.config.exclusivity {
            Some(rule) => rule.resolve(&self.query),
            None => self.query.clone(),
        };
        let compiled = effective.compile(self.config.min_query_len);
        let toggles = self.toggles(&*dom);
        let requests = self.facet_requests(&toggles);

        let (visibility, facets): (Vec<(NodeId, bool)>, Vec<FacetGroup>) = {
            let items = snapshot(&*dom, &self.containers, &self.selectors.item, &self.config.facets);
            let visibility = items
                .iter()
                .map(|item| (item.node, matches(item, &compiled, None, &mut self.cache)))
                .collect();
            let facets = count_facets(&items, &compiled, &requests, &mut self.cache);
            (visibility, facets)
        };

        let text_active = compiled.needle().is_some();
        let expand = text_active && self.config.group.as_ref().is_some_and(|g| g.expand_on_text);

        for (node, shown) in &visibility {
            if *shown {
                dom.remove_attribute(*node, "hidden");
                if expand {
                    dom.set_attribute(*node, "open", "");
                }
            } else {
                dom.set_attribute(*node, "hidden", "");
            }
        }
        self.visible = visibility.iter().filter(|(_, shown)| *shown).count();

        if let Some(section) = &self.selectors.section {
            for container in &self.containers {
                for group in dom.query_all(*container, section) {
                    let any = visibility
                        .iter()
                        .any(|(node, shown)| *shown && dom.contains(group, *node));
                    if any {
                        dom.remove_attribute(group, "hidden");
                    } else {
                        dom.set_attribute(group, "hidden", "");
                    }
                }
            }
        }

        for toggle in &toggles {
            let pressed = self.query.is_selected(&toggle.taxonomy, &toggle.slug);
            let count = facets
                .iter()
                .find(|g| g.taxonomy == toggle.taxonomy)
                .and_then(|g| g.count(&toggle.slug))
                .unwrap_or(0);

            dom.set_attribute(toggle.node, "aria-pressed", if pressed { "true" } else { "false" });
            dom.set_attribute(toggle.node, "data-count", &count.to_string());
            if count == 0 && !pressed {
                dom.set_attribute(toggle.node, "aria-disabled", "true");
            } else {
                dom.remove_attribute(toggle.node, "aria-disabled");
            }
        }

        if let Some(count) = dom.query(self.scope, &self.selectors.count) {
            dom.set_text(count, &self.visible.to_string());
        }

        if let Some(empty) = dom.query(self.scope, &self.selectors.empty) {
            if self.query.has_active_text(self.config.min_query_len) && self.visible == 0 {
                dom.remove_attribute(empty, "hidden");
            } else {
                dom.set_attribute(empty, "hidden", "");
            }
        }

        self.render_chips(dom, &toggles);

        let search = merge_search(
            &history.search(),
            &self.query,
            &self.config.text_param,
            &self.bindings,
            self.config.min_query_len,
        );
        if search != self.last_search {
            history.push(&search);
            self.last_search = search;
        }

        for container in &self.containers {
            dom.remove_attribute(*container, "data-busy");
            dom.remove_attribute(*container, "aria-busy");
        }

        // Our own writes are not new items.
        for observer in &self.observers {
            dom.take_records(*observer);
        }

        self.passes += 1;
        debug!(visible = self.visible, total = visibility.len(), "filter pass");
    }

    fn render_chips<D: Dom + ?Sized>(&self, dom: &mut D, toggles: &[Toggle]) {
        let Some(area) = dom.query(self.scope, &self.selectors.chips) else {
            return;
        };

        let chips: Vec<Chip> = self
            .config
            .facets
            .iter()
            .filter_map(|f| Some((f, self.query.selection(&f.taxonomy)?)))
            .flat_map(|(f, slugs)| {
                slugs.iter().map(move |slug| {
                    let label = toggles
                        .iter()
                        .find(|t| t.taxonomy == f.taxonomy && t.slug == *slug)
                        .map(|t| t.label.clone())
                        .filter(|l| !l.is_empty())
                        .unwrap_or_else(|| slug.clone());
                    Chip {
                        taxonomy: f.taxonomy.clone(),
                        slug: slug.clone(),
                        label,
                    }
                })
            })
            .collect();

        if let Err(err) = dom.set_inner_html(area, &render_chips(&chips)) {
            warn!(kind = %self.config.name, error = %err, "chip render failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::memory::MemoryDom;

    const VIDEOS: &str = r#"
<section data-discovery="videos">
  <input data-discovery-search value="">
  <div class="toggles">
    <button data-facet="bucket" data-value="roofing-project">Roofing Projects</button>
    <button data-facet="bucket" data-value="accolades">Accolades</button>
    <button data-facet="bucket" data-value="commercials">Commercials</button>
    <button data-facet="material_type" data-value="metal">Metal</button>
    <button data-facet="service_area" data-value="sarasota">Sarasota</button>
  </div>
  <p data-discovery-count></p>
  <div data-discovery-empty hidden>Nothing found</div>
  <div data-discovery-chips></div>
  <ul data-discovery-items>
    <li data-id="video:awards" data-title="Awards night" data-bucket="accolades" data-search-template="search-video-awards">
      <template id="search-video-awards">A gala evening downtown</template>
    </li>
    <li data-id="video:flashing" data-title="How flashing works" data-bucket="explainers"></li>
    <li data-id="project:metal-roof" data-title="Standing seam install" data-bucket="roofing-project" data-material-type="metal" data-service-area="sarasota"></li>
  </ul>
</section>
"#;

    fn mount(search: &str) -> (MemoryDom, MemoryHistory, Synchronizer) {
        let mut dom = MemoryDom::parse(VIDEOS).unwrap();
        let mut history = MemoryHistory::new(search);
        let sync = Synchronizer::mount(KindConfig::videos(), &mut dom, &mut history).unwrap();
        (dom, history, sync)
    }

    fn node(dom: &MemoryDom, selector: &str) -> NodeId {
        dom.select(selector).unwrap().unwrap()
    }

    fn hidden_ids(dom: &MemoryDom) -> Vec<String> {
        dom.select_all("[data-id]")
            .unwrap()
            .into_iter()
            .filter(|n| dom.has_attribute(*n, "hidden"))
            .filter_map(|n| dom.attribute(n, "data-id"))
            .collect()
    }

    fn toggle(dom: &MemoryDom, taxonomy: &str, slug: &str) -> NodeId {
        node(dom, &format!(r#"[data-facet="{taxonomy}"][data-value="{slug}"]"#))
    }

    fn type_text(dom: &mut MemoryDom, history: &mut MemoryHistory, sync: &mut Synchronizer, text: &str) {
        let input = node(dom, "[data-discovery-search]");
        dom.set_attribute(input, "value", text);
        assert!(sync.handle(dom, history, UiEvent::Input(input)));
    }

    #[test]
    fn empty_url_shows_everything() {
        let (dom, history, sync) = mount("");

        assert!(hidden_ids(&dom).is_empty());
        assert_eq!(sync.visible(), 3);
        assert_eq!(history.pushes(), 0);

        let count = node(&dom, "[data-discovery-count]");
        assert_eq!(dom.text_content(count), "3");

        let accolades = toggle(&dom, "bucket", "accolades");
        assert_eq!(dom.attribute(accolades, "data-count").as_deref(), Some("1"));
        assert_eq!(dom.attribute(accolades, "aria-pressed").as_deref(), Some("false"));

        let commercials = toggle(&dom, "bucket", "commercials");
        assert_eq!(dom.attribute(commercials, "data-count").as_deref(), Some("0"));
        assert_eq!(dom.attribute(commercials, "aria-disabled").as_deref(), Some("true"));

        let list = node(&dom, "[data-discovery-items]");
        assert!(!dom.has_attribute(list, "data-busy"));
    }

    #[test]
    fn url_state_is_restored_at_mount() {
        let (dom, history, sync) = mount("material=metal&q=st");

        assert_eq!(hidden_ids(&dom), vec!["video:awards", "video:flashing"]);
        assert!(sync.query().is_selected("material_type", "metal"));
        assert_eq!(history.pushes(), 0);

        let input = node(&dom, "[data-discovery-search]");
        assert_eq!(dom.attribute(input, "value").as_deref(), Some("st"));

        let metal = toggle(&dom, "material_type", "metal");
        assert_eq!(dom.attribute(metal, "aria-pressed").as_deref(), Some("true"));

        // Bucket counts ignore the bucket itself but honor the anchored secondary.
        let project = toggle(&dom, "bucket", "roofing-project");
        assert_eq!(dom.attribute(project, "data-count").as_deref(), Some("1"));
        let accolades = toggle(&dom, "bucket", "accolades");
        assert_eq!(dom.attribute(accolades, "data-count").as_deref(), Some("0"));
    }

    #[test]
    fn text_searches_the_body_template_and_writes_the_url_once() {
        let (mut dom, mut history, mut sync) = mount("utm=x");

        type_text(&mut dom, &mut history, &mut sync, "Gala");
        assert_eq!(hidden_ids(&dom), vec!["video:flashing", "project:metal-roof"]);
        assert_eq!(history.search(), "utm=x&q=Gala");
        assert_eq!(history.pushes(), 1);

        sync.refresh(&mut dom, &mut history);
        assert_eq!(history.pushes(), 1);
    }

    #[test]
    fn short_text_does_not_filter() {
        let (mut dom, mut history, mut sync) = mount("");

        type_text(&mut dom, &mut history, &mut sync, "z");
        assert!(hidden_ids(&dom).is_empty());
        assert_eq!(history.pushes(), 0);

        let empty = node(&dom, "[data-discovery-empty]");
        assert!(dom.has_attribute(empty, "hidden"));
    }

    #[test]
    fn empty_state_follows_text_with_no_results() {
        let (mut dom, mut history, mut sync) = mount("");

        type_text(&mut dom, &mut history, &mut sync, "zzzz");
        assert_eq!(sync.visible(), 0);
        let empty = node(&dom, "[data-discovery-empty]");
        assert!(!dom.has_attribute(empty, "hidden"));

        type_text(&mut dom, &mut history, &mut sync, "");
        assert!(dom.has_attribute(empty, "hidden"));
        assert_eq!(sync.visible(), 3);
    }

    #[test]
    fn secondary_toggle_anchors_and_other_bucket_clears() {
        let (mut dom, mut history, mut sync) = mount("");

        let metal = toggle(&dom, "material_type", "metal");
        assert!(sync.handle(&mut dom, &mut history, UiEvent::Click(metal)));
        assert!(sync.query().is_selected("bucket", "roofing-project"));
        assert_eq!(hidden_ids(&dom), vec!["video:awards", "video:flashing"]);
        assert_eq!(history.search(), "bucket=roofing-project&material=metal");

        let accolades = toggle(&dom, "bucket", "accolades");
        assert!(sync.handle(&mut dom, &mut history, UiEvent::Click(accolades)));
        assert!(!sync.query().has_selection("material_type"));
        assert!(sync.query().is_selected("bucket", "accolades"));
        // roofing-project is still selected alongside accolades.
        assert_eq!(hidden_ids(&dom), vec!["video:flashing"]);
    }

    #[test]
    fn chips_mirror_selections_and_remove_them() {
        let (mut dom, mut history, mut sync) = mount("bucket=accolades");

        let chip = node(&dom, r#"[data-chip="bucket"][data-value="accolades"]"#);
        assert_eq!(dom.text_content(chip), "Accolades");

        assert!(sync.handle(&mut dom, &mut history, UiEvent::Click(chip)));
        assert!(sync.query().is_empty(2));
        assert!(dom.select("[data-chip]").unwrap().is_none());
        assert_eq!(history.search(), "");
    }

    #[test]
    fn clicks_outside_the_scope_are_ignored() {
        let mut dom = MemoryDom::parse(&format!("{VIDEOS}<button id=\"other\" data-facet=\"bucket\" data-value=\"accolades\"></button>")).unwrap();
        let mut history = MemoryHistory::new("");
        let mut sync = Synchronizer::mount(KindConfig::videos(), &mut dom, &mut history).unwrap();

        let other = node(&dom, "#other");
        assert!(!sync.handle(&mut dom, &mut history, UiEvent::Click(other)));
        assert!(sync.query().is_empty(2));
    }

    #[test]
    fn appended_items_are_filtered_in_one_pass() {
        let (mut dom, mut history, mut sync) = mount("bucket=accolades");
        let list = node(&dom, "[data-discovery-items]");
        let before = sync.passes();

        dom.append_html(list, r#"<li data-id="video:trophy" data-title="Trophy" data-bucket="accolades"></li>"#)
            .unwrap();
        dom.append_html(list, r#"<li data-id="video:ad" data-title="Spot" data-bucket="commercials"></li>"#)
            .unwrap();

        assert!(sync.pump(&mut dom, &mut history));
        assert_eq!(sync.passes(), before + 1);
        assert_eq!(sync.visible(), 2);
        assert!(hidden_ids(&dom).contains(&"video:ad".to_owned()));

        assert!(!sync.pump(&mut dom, &mut history));
    }

    #[test]
    fn passes_are_idempotent() {
        let (mut dom, mut history, mut sync) = mount("bucket=accolades,roofing-project");
        let first = hidden_ids(&dom);
        sync.refresh(&mut dom, &mut history);
        assert_eq!(hidden_ids(&dom), first);
        assert_eq!(history.pushes(), 0);
    }

    #[test]
    fn missing_scope_is_not_found() {
        let mut dom = MemoryDom::parse("<main></main>").unwrap();
        let mut history = MemoryHistory::new("");
        let err = Synchronizer::mount(KindConfig::faqs(), &mut dom, &mut history).unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[test]
    fn unmount_disconnects_observers() {
        let (mut dom, _history, sync) = mount("");
        assert_eq!(dom.observer_count(), 1);
        sync.unmount(&mut dom);
        assert_eq!(dom.observer_count(), 0);
    }

    const FAQS: &str = r#"
<div data-discovery="faqs">
  <input data-discovery-search>
  <button data-facet="category" data-value="billing">Billing</button>
  <button data-facet="category" data-value="storms">Storms</button>
  <div data-discovery-items>
    <section data-faq-group="billing">
      <details data-id="faq:pay" data-title="How do I pay?" data-category="billing"><summary>How do I pay?</summary>Card or check.</details>
    </section>
    <section data-faq-group="storms">
      <details data-id="faq:hail" data-title="Hail damage" data-category="storms"><summary>Hail damage</summary>We inspect for free.</details>
      <details data-id="faq:wind" data-title="Wind uplift" data-category="storms"><summary>Wind uplift</summary>Shingles rated to 130 mph.</details>
    </section>
  </div>
</div>
"#;

    #[test]
    fn faq_sections_hide_and_matches_expand() {
        let mut dom = MemoryDom::parse(FAQS).unwrap();
        let mut history = MemoryHistory::new("");
        let mut sync = Synchronizer::mount(KindConfig::faqs(), &mut dom, &mut history).unwrap();

        let billing = node(&dom, r#"[data-faq-group="billing"]"#);
        let storms = node(&dom, r#"[data-faq-group="storms"]"#);
        let wind = node(&dom, r#"[data-id="faq:wind"]"#);
        assert!(!dom.has_attribute(wind, "open"));

        let input = node(&dom, "[data-discovery-search]");
        dom.set_attribute(input, "value", "130 mph");
        sync.handle(&mut dom, &mut history, UiEvent::Input(input));

        assert!(dom.has_attribute(billing, "hidden"));
        assert!(!dom.has_attribute(storms, "hidden"));
        assert!(dom.has_attribute(wind, "open"));
        assert_eq!(history.search(), "q=130+mph");

        let storms_toggle = toggle(&dom, "category", "storms");
        assert_eq!(dom.attribute(storms_toggle, "data-count").as_deref(), Some("1"));
    }
}
