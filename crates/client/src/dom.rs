// crates/client/src/dom.rs

//! The rendering layer the synchronizer drives.
//!
//! Node creation belongs to the page (or to an external "load more" loader
//! calling [`Dom::append_html`]); the synchronizer reads attributes, toggles
//! visibility attributes, and only writes markup into containers it owns
//! (chips). Appends are reported to observers as [`MutationRecord`]s, drained
//! with [`Dom::take_records`].

use crate::selector::Selector;
use crate::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

/// Child-list change under an observed subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

pub trait Dom {
    fn root(&self) -> NodeId;

    /// Element descendants of `scope` matching `selector`, in document order.
    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId>;

    fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Concatenated, entity-decoded text of every descendant text node.
    fn text_content(&self, node: NodeId) -> String;

    /// Replace the children of `node` with a single text node.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Replace the children of `node` with parsed markup.
    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<Vec<NodeId>, SyncError>;

    /// Append parsed markup to `parent`; returns the new top-level nodes.
    fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, SyncError>;

    /// Watch `target` and its subtree for child-list changes.
    fn observe(&mut self, target: NodeId) -> ObserverId;

    /// Pending records for `observer`, oldest first; clears them.
    fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord>;

    fn disconnect(&mut self, observer: ObserverId);

    /// `node` itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId>;

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }
}
