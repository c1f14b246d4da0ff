// crates/client/src/memory.rs

//! In-memory [`Dom`] built from markup with `lol_html`.
//!
//! Every element start tag opens a node; its end-tag handler closes it.
//! Void elements close immediately. Text chunks are kept raw and decoded on
//! read. Children replaced by `set_text` or `set_inner_html` are freed and
//! their arena slots reused, so an id from a `removed` record may later name
//! a different node.

use html_escape::decode_html_entities;
use lol_html::html_content::{Element, EndTag, TextChunk};
use lol_html::{doc_text, element, rewrite_str, HandlerResult, Settings};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::{Dom, MutationRecord, NodeId, ObserverId};
use crate::selector::{ElementView, Selector};
use crate::SyncError;

#[derive(Debug, Clone)]
enum Kind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl ElementView for Node {
    fn tag_name(&self) -> &str {
        match &self.kind {
            Kind::Element { tag, .. } => tag,
            Kind::Text(_) => "",
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            Kind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            Kind::Text(_) => None,
        }
    }
}

#[derive(Debug)]
struct Observer {
    target: NodeId,
    records: Vec<MutationRecord>,
}

#[derive(Debug)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    observers: HashMap<ObserverId, Observer>,
    next_observer: u64,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: Kind::Element {
                    tag: "#document".into(),
                    attrs: Vec::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
            free: Vec::new(),
            observers: HashMap::new(),
            next_observer: 0,
        }
    }

    pub fn parse(html: &str) -> Result<Self, SyncError> {
        let mut dom = Self::new();
        let root = dom.root();
        dom.insert_markup(root, html)?;
        Ok(dom)
    }

    /// First element in the document matching `selector`.
    pub fn select(&self, selector: &str) -> Result<Option<NodeId>, SyncError> {
        Ok(self.query(self.root(), &Selector::parse(selector)?))
    }

    pub fn select_all(&self, selector: &str) -> Result<Vec<NodeId>, SyncError> {
        Ok(self.query_all(self.root(), &Selector::parse(selector)?))
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(|n| &n.kind), Some(Kind::Element { .. }))
    }

    fn descendants(&self, scope: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.node(scope) {
            for child in &node.children {
                out.push(*child);
                self.descendants(*child, out);
            }
        }
    }

    /// Parse `html` and append the resulting nodes under `parent`.
    fn insert_markup(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, SyncError> {
        if !self.is_element(parent) {
            return Ok(Vec::new());
        }

        let builder = Rc::new(RefCell::new(TreeBuilder::new(self.nodes.len(), parent)));

        let settings = Settings {
            element_content_handlers: vec![element!("*", |el: &mut Element| {
                let attrs = el
                    .attributes()
                    .iter()
                    .map(|a| (a.name(), decode_html_entities(&a.value()).into_owned()))
                    .collect();
                let id = builder.borrow_mut().open(el.tag_name(), attrs);

                match el.end_tag_handlers() {
                    Some(handlers) => {
                        let builder = Rc::clone(&builder);
                        handlers.push(Box::new(move |_end: &mut EndTag<'_>| -> HandlerResult {
                            builder.borrow_mut().close(id);
                            Ok(())
                        }));
                    }
                    None => builder.borrow_mut().close(id),
                }
                Ok(())
            })],
            document_content_handlers: vec![doc_text!(|t: &mut TextChunk| {
                builder.borrow_mut().text(t.as_str());
                Ok(())
            })],
            ..Settings::default()
        };

        rewrite_str(html, settings).map_err(|e| SyncError::Markup(e.to_string()))?;

        let built = std::mem::take(&mut *builder.borrow_mut());
        let top = self.adopt(built);
        if let Some(p) = self.node_mut(parent) {
            p.children.extend(top.iter().copied());
        }
        Ok(top)
    }

    /// Move built nodes into the arena, filling freed slots first.
    fn adopt(&mut self, built: TreeBuilder) -> Vec<NodeId> {
        let base = built.base;
        let len = built.nodes.len();
        let mut fresh = self.nodes.len();
        let slots: Vec<NodeId> = (0..len)
            .map(|_| {
                self.free.pop().unwrap_or_else(|| {
                    fresh += 1;
                    NodeId(fresh - 1)
                })
            })
            .collect();
        let remap = |id: NodeId| match id.0.checked_sub(base) {
            Some(i) if i < len => slots[i],
            _ => id,
        };

        for (slot, mut node) in slots.iter().zip(built.nodes) {
            node.parent = node.parent.map(remap);
            node.children = node.children.into_iter().map(remap).collect();
            self.place(*slot, node);
        }
        built.top.into_iter().map(remap).collect()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = self.free.pop().unwrap_or(NodeId(self.nodes.len()));
        self.place(id, node);
        id
    }

    fn place(&mut self, id: NodeId, node: Node) {
        match self.nodes.get_mut(id.0) {
            Some(slot) => *slot = node,
            None => self.nodes.push(node),
        }
    }

    /// Return detached subtrees to the free list.
    fn release(&mut self, roots: &[NodeId]) {
        let mut gone = roots.to_vec();
        for root in roots {
            self.descendants(*root, &mut gone);
        }
        for id in &gone {
            if let Some(n) = self.node_mut(*id) {
                n.kind = Kind::Text(String::new());
                n.children.clear();
            }
        }
        self.free.extend(gone);
    }

    /// Arena size, freed slots included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    fn detach_children(&mut self, node: NodeId) -> Vec<NodeId> {
        let removed = match self.node_mut(node) {
            Some(n) => std::mem::take(&mut n.children),
            None => return Vec::new(),
        };
        for child in &removed {
            if let Some(c) = self.node_mut(*child) {
                c.parent = None;
            }
        }
        removed
    }

    fn notify(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if added.is_empty() && removed.is_empty() {
            return;
        }
        let watching: Vec<ObserverId> = self
            .observers
            .iter()
            .filter(|(_, o)| self.contains(o.target, target))
            .map(|(id, _)| *id)
            .collect();

        for id in watching {
            if let Some(o) = self.observers.get_mut(&id) {
                o.records.push(MutationRecord {
                    target,
                    added: added.clone(),
                    removed: removed.clone(),
                });
            }
        }
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for MemoryDom {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.descendants(scope, &mut all);
        all.into_iter()
            .filter(|id| {
                self.node(*id)
                    .is_some_and(|n| matches!(n.kind, Kind::Element { .. }) && selector.matches(n))
            })
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut all = Vec::new();
        self.descendants(self.root(), &mut all);
        all.into_iter()
            .find(|n| self.node(*n).is_some_and(|node| node.attribute("id") == Some(id)))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.node(node)?.kind {
            Kind::Element { tag, .. } => Some(tag.clone()),
            Kind::Text(_) => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)?.attribute(name).map(str::to_owned)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(Node {
            kind: Kind::Element { attrs, .. },
            ..
        }) = self.node_mut(node)
        {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_owned(),
                None => attrs.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(Node {
            kind: Kind::Element { attrs, .. },
            ..
        }) = self.node_mut(node)
        {
            attrs.retain(|(n, _)| n != name);
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut all = vec![node];
        self.descendants(node, &mut all);

        let raw: String = all
            .into_iter()
            .filter_map(|id| match &self.node(id)?.kind {
                Kind::Text(t) => Some(t.as_str()),
                Kind::Element { .. } => None,
            })
            .collect();
        decode_html_entities(&raw).into_owned()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if !self.is_element(node) {
            return;
        }
        let removed = self.detach_children(node);
        self.release(&removed);
        let id = self.alloc(Node {
            kind: Kind::Text(html_escape::encode_text(text).into_owned()),
            parent: Some(node),
            children: Vec::new(),
        });
        if let Some(n) = self.node_mut(node) {
            n.children.push(id);
        }
        self.notify(node, vec![id], removed);
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<Vec<NodeId>, SyncError> {
        if !self.is_element(node) {
            return Ok(Vec::new());
        }
        let removed = self.detach_children(node);
        self.release(&removed);
        let added = self.insert_markup(node, html)?;
        self.notify(node, added.clone(), removed);
        Ok(added)
    }

    fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, SyncError> {
        let added = self.insert_markup(parent, html)?;
        self.notify(parent, added.clone(), Vec::new());
        Ok(added)
    }

    fn observe(&mut self, target: NodeId) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.insert(
            id,
            Observer {
                target,
                records: Vec::new(),
            },
        );
        id
    }

    fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(&observer)
            .map(|o| std::mem::take(&mut o.records))
            .unwrap_or_default()
    }

    fn disconnect(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(id) = cur {
            let n = self.node(id)?;
            if matches!(n.kind, Kind::Element { .. }) && selector.matches(n) {
                return Some(id);
            }
            cur = n.parent;
        }
        None
    }
}

impl MemoryDom {
    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree builder fed by lol_html handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct TreeBuilder {
    base: usize,
    parent: Option<NodeId>,
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    top: Vec<NodeId>,
}

impl TreeBuilder {
    fn new(base: usize, parent: NodeId) -> Self {
        Self {
            base,
            parent: Some(parent),
            ..Self::default()
        }
    }

    fn local(&mut self, id: NodeId) -> Option<&mut Node> {
        id.0.checked_sub(self.base).and_then(|i| self.nodes.get_mut(i))
    }

    fn current(&self) -> Option<NodeId> {
        self.stack.last().copied().or(self.parent)
    }

    fn push(&mut self, kind: Kind) -> NodeId {
        let id = NodeId(self.base + self.nodes.len());
        let parent = self.current();
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });

        match self.stack.last().copied() {
            Some(open) => {
                if let Some(p) = self.local(open) {
                    p.children.push(id);
                }
            }
            None => self.top.push(id),
        }
        id
    }

    fn open(&mut self, tag: String, attrs: Vec<(String, String)>) -> NodeId {
        let id = self.push(Kind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs,
        });
        self.stack.push(id);
        id
    }

    /// Close `id` and anything left open inside it.
    fn close(&mut self, id: NodeId) {
        if let Some(pos) = self.stack.iter().rposition(|open| *open == id) {
            self.stack.truncate(pos);
        }
    }

    fn text(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }

        let last_child = match self.stack.last().copied() {
            Some(open) => self.local(open).and_then(|p| p.children.last().copied()),
            None => self.top.last().copied(),
        };
        if let Some(last) = last_child {
            if let Some(Node {
                kind: Kind::Text(existing),
                ..
            }) = self.local(last)
            {
                existing.push_str(chunk);
                return;
            }
        }
        self.push(Kind::Text(chunk.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <section data-kind="videos">
          <input type="search" data-search value="">
          <ul data-items>
            <li data-id="a" class="card">Storm &amp; hail<template id="t-a">Full <b>body</b></template></li>
            <li data-id="b" class="card">Second</li>
          </ul>
          <p data-count>0</p>
        </section>
    "#;

    #[test]
    fn parses_nesting_attributes_and_text() {
        let dom = MemoryDom::parse(PAGE).unwrap();

        let items = dom.select_all("li.card").unwrap();
        assert_eq!(items.len(), 2);

        let list = dom.select("[data-items]").unwrap().unwrap();
        assert_eq!(dom.parent(items[0]), Some(list));
        assert_eq!(dom.attribute(items[1], "data-id").as_deref(), Some("b"));

        // void element doesn't swallow its siblings
        let input = dom.select("input").unwrap().unwrap();
        assert_eq!(dom.parent(list), dom.parent(input));

        assert_eq!(dom.text_content(items[0]), "Storm & hailFull body");
        let template = dom.element_by_id("t-a").unwrap();
        assert_eq!(dom.text_content(template), "Full body");
    }

    #[test]
    fn attributes_can_be_set_and_removed() {
        let mut dom = MemoryDom::parse(PAGE).unwrap();
        let li = dom.select("[data-id=b]").unwrap().unwrap();

        dom.set_attribute(li, "hidden", "");
        assert!(dom.has_attribute(li, "hidden"));
        assert_eq!(dom.select_all("[hidden]").unwrap(), vec![li]);

        dom.remove_attribute(li, "hidden");
        assert!(!dom.has_attribute(li, "hidden"));
    }

    #[test]
    fn appends_are_reported_to_observers_of_ancestors() {
        let mut dom = MemoryDom::parse(PAGE).unwrap();
        let section = dom.select("section").unwrap().unwrap();
        let list = dom.select("[data-items]").unwrap().unwrap();
        let count = dom.select("[data-count]").unwrap().unwrap();

        let watcher = dom.observe(list);
        let outer = dom.observe(section);

        let added = dom
            .append_html(list, r#"<li data-id="c" class="card">Third</li><li data-id="d" class="card">Fourth</li>"#)
            .unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(dom.select_all("li.card").unwrap().len(), 4);

        // text outside the observed list doesn't reach `watcher`
        dom.set_text(count, "4");

        let records = dom.take_records(watcher);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].added, added);
        assert!(dom.take_records(watcher).is_empty());

        assert_eq!(dom.take_records(outer).len(), 2);

        dom.disconnect(watcher);
        dom.append_html(list, "<li>Fifth</li>").unwrap();
        assert!(dom.take_records(watcher).is_empty());
        assert_eq!(dom.observer_count(), 1);
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let mut dom = MemoryDom::parse(r#"<div id="chips"><span>old</span></div>"#).unwrap();
        let chips = dom.element_by_id("chips").unwrap();

        dom.set_inner_html(chips, r#"<button data-chip="bucket">A &amp; B</button>"#)
            .unwrap();
        assert_eq!(dom.text_content(chips), "A & B");
        assert!(dom.select("span").unwrap().is_none());
    }

    #[test]
    fn repeated_rewrites_reuse_freed_slots() {
        let mut dom = MemoryDom::parse(r#"<div id="chips"><span>old</span></div><p data-count>0</p>"#).unwrap();
        let chips = dom.element_by_id("chips").unwrap();
        let count = dom.select("[data-count]").unwrap().unwrap();
        let markup = r#"<button data-chip="bucket" data-value="a">A</button><button data-chip="bucket" data-value="b">B &amp; C</button>"#;

        dom.set_inner_html(chips, markup).unwrap();
        dom.set_text(count, "2");
        let settled = dom.arena_len();

        for n in 0..50 {
            dom.set_inner_html(chips, markup).unwrap();
            dom.set_text(count, &n.to_string());
        }

        assert_eq!(dom.arena_len(), settled);
        assert_eq!(dom.select_all("[data-chip]").unwrap().len(), 2);
        assert_eq!(dom.text_content(chips), "AB & C");
        assert_eq!(dom.text_content(count), "49");
        let b = dom.select(r#"[data-value="b"]"#).unwrap().unwrap();
        assert_eq!(dom.parent(b), Some(chips));
    }

    #[test]
    fn set_text_escapes_markup() {
        let mut dom = MemoryDom::parse("<p></p>").unwrap();
        let p = dom.select("p").unwrap().unwrap();
        dom.set_text(p, "1 < 2 & 3");
        assert_eq!(dom.text_content(p), "1 < 2 & 3");
        assert!(dom.select("p > b").is_err());
    }

    #[test]
    fn closest_walks_up_to_a_match() {
        let dom = MemoryDom::parse(PAGE).unwrap();
        let template = dom.element_by_id("t-a").unwrap();
        let li = dom.closest(template, &Selector::parse("li").unwrap());
        assert_eq!(li, dom.select("[data-id=a]").unwrap());
    }
}
