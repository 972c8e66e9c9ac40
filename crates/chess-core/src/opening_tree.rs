//! Opening tree shared by concurrent extraction workers.
//!
//! Each node guards its child list with its own lock; counts are atomics so
//! that walking an existing line never takes a write lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::ser::{Serialize, SerializeStruct, Serializer};

pub const ROOT_LABEL: &str = "start";

#[derive(Debug)]
pub struct OpeningNode {
    count: AtomicU64,
    label: String,
    children: RwLock<Vec<Arc<OpeningNode>>>,
}

impl OpeningNode {
    fn new(label: &str, count: u64) -> Self {
        Self {
            count: AtomicU64::new(count),
            label: label.to_string(),
            children: RwLock::new(Vec::new()),
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Snapshot of the children in insertion order.
    pub fn children(&self) -> Vec<Arc<OpeningNode>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn find(&self, label: &str) -> Option<Arc<OpeningNode>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|c| c.label == label)
            .cloned()
    }

    /// Find the child labelled `label` and bump its count, creating it with a
    /// count of one if it does not exist yet.
    pub fn record(&self, label: &str) -> Arc<OpeningNode> {
        if let Some(child) = self.find(label) {
            child.count.fetch_add(1, Ordering::Relaxed);
            return child;
        }

        let mut children = self
            .children
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // Another worker may have created it between the read and write lock
        if let Some(child) = children.iter().find(|c| c.label == label) {
            child.count.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(child);
        }

        let child = Arc::new(OpeningNode::new(label, 1));
        children.push(Arc::clone(&child));
        child
    }

    /// Recursively drop children whose count is below `threshold`.
    pub fn prune(&self, threshold: u64) {
        let mut children = self
            .children
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        children.retain(|c| c.count() >= threshold);
        for child in children.iter() {
            child.prune(threshold);
        }
    }

    /// Children ordered by count (most played first), ties by label.
    fn sorted_children(&self) -> Vec<Arc<OpeningNode>> {
        let mut children = self.children();
        children.sort_by(|a, b| {
            b.count()
                .cmp(&a.count())
                .then_with(|| a.label.cmp(&b.label))
        });
        children
    }
}

impl Serialize for OpeningNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let children = self.sorted_children();
        let children: Vec<&OpeningNode> = children.iter().map(Arc::as_ref).collect();

        let mut node = serializer.serialize_struct("OpeningNode", 3)?;
        node.serialize_field("count", &self.count())?;
        node.serialize_field("label", &self.label)?;
        node.serialize_field("children", &children)?;
        node.end()
    }
}

/// Opening repertoire tree rooted at the `"start"` sentinel.
#[derive(Debug)]
pub struct OpeningTrie {
    root: OpeningNode,
}

impl Default for OpeningTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl OpeningTrie {
    pub fn new() -> Self {
        Self {
            root: OpeningNode::new(ROOT_LABEL, 0),
        }
    }

    pub fn root(&self) -> &OpeningNode {
        &self.root
    }

    /// Start traversing for a new game; counts the game at the root.
    pub fn begin_game(&self) -> OpeningCursor<'_> {
        self.root.count.fetch_add(1, Ordering::Relaxed);
        OpeningCursor {
            trie: self,
            current: None,
        }
    }

    pub fn prune(&self, threshold: u64) {
        self.root.prune(threshold);
    }
}

impl Serialize for OpeningTrie {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

/// Position of one game's walk down the trie.
pub struct OpeningCursor<'a> {
    trie: &'a OpeningTrie,
    current: Option<Arc<OpeningNode>>,
}

impl OpeningCursor<'_> {
    pub fn advance(&mut self, san: &str) {
        let next = match &self.current {
            Some(node) => node.record(san),
            None => self.trie.root.record(san),
        };
        self.current = Some(next);
    }
}
