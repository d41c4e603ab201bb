//! Element tree: an ordered forest of owned elements.

use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

use crate::element::{DrawingElement, ElementGuid};

/// Tree mutation errors. The rejected node is handed back.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("A child with guid {guid} already exists")]
    DuplicateGuid {
        guid: ElementGuid,
        node: Box<ElementTreeNode>,
    },
    #[error("Parent {parent} not found")]
    ParentNotFound {
        parent: ElementGuid,
        node: Box<ElementTreeNode>,
    },
}

impl TreeError {
    /// Recover the node that was not inserted.
    pub fn into_node(self) -> ElementTreeNode {
        match self {
            TreeError::DuplicateGuid { node, .. } | TreeError::ParentNotFound { node, .. } => *node,
        }
    }
}

/// One element and its children, keyed by guid in insertion order.
pub struct ElementTreeNode {
    guid: ElementGuid,
    el: Box<dyn DrawingElement>,
    children: IndexMap<ElementGuid, ElementTreeNode>,
}

impl ElementTreeNode {
    /// Node keyed by the element's own guid.
    pub fn from_element(el: Box<dyn DrawingElement>) -> Self {
        Self::with_guid(el.guid(), el)
    }

    /// Node under an explicit key, e.g. when restoring a grouping.
    pub fn with_guid(guid: ElementGuid, el: Box<dyn DrawingElement>) -> Self {
        Self {
            guid,
            el,
            children: IndexMap::new(),
        }
    }

    pub fn guid(&self) -> ElementGuid {
        self.guid
    }

    pub fn element(&self) -> &dyn DrawingElement {
        self.el.as_ref()
    }

    pub fn element_mut(&mut self) -> &mut dyn DrawingElement {
        self.el.as_mut()
    }

    pub fn children(&self) -> impl Iterator<Item = &ElementTreeNode> {
        self.children.values()
    }

    /// Insert `child` keyed by its guid, after any existing children.
    /// A guid already present among the children is rejected.
    pub fn append_child(&mut self, child: ElementTreeNode) -> Result<(), TreeError> {
        if self.children.contains_key(&child.guid) {
            return Err(TreeError::DuplicateGuid {
                guid: child.guid,
                node: Box::new(child),
            });
        }
        self.children.insert(child.guid, child);
        Ok(())
    }

    pub fn find(&self, guid: ElementGuid) -> Option<&ElementTreeNode> {
        if self.guid == guid {
            return Some(self);
        }
        self.children.values().find_map(|child| child.find(guid))
    }

    pub fn find_mut(&mut self, guid: ElementGuid) -> Option<&mut ElementTreeNode> {
        if self.guid == guid {
            return Some(self);
        }
        self.children.values_mut().find_map(|child| child.find_mut(guid))
    }

    fn take_descendant(&mut self, guid: ElementGuid) -> Option<ElementTreeNode> {
        if let Some(child) = self.children.shift_remove(&guid) {
            return Some(child);
        }
        self.children
            .values_mut()
            .find_map(|child| child.take_descendant(guid))
    }

    /// Number of nodes in this subtree, itself included.
    pub fn len(&self) -> usize {
        1 + self.children.values().map(ElementTreeNode::len).sum::<usize>()
    }

    /// Call `remove()` on every element of the subtree.
    pub fn dispose(&mut self) {
        for child in self.children.values_mut() {
            child.dispose();
        }
        self.el.remove();
    }
}

impl fmt::Debug for ElementTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementTreeNode")
            .field("guid", &self.guid)
            .field("kind", &self.el.kind())
            .field("children", &self.children.len())
            .finish()
    }
}

/// Ordered forest of element nodes.
#[derive(Debug, Default)]
pub struct ElementTree {
    root: Vec<ElementTreeNode>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node at the end of the root list.
    pub fn append_child(&mut self, node: ElementTreeNode) {
        self.root.push(node);
    }

    /// Append `node` under the node keyed `parent`.
    pub fn insert_child(&mut self, parent: ElementGuid, node: ElementTreeNode) -> Result<(), TreeError> {
        match self.find_mut(parent) {
            Some(parent_node) => parent_node.append_child(node),
            None => Err(TreeError::ParentNotFound {
                parent,
                node: Box::new(node),
            }),
        }
    }

    /// Root-level nodes in order.
    pub fn roots(&self) -> &[ElementTreeNode] {
        &self.root
    }

    pub fn find(&self, guid: ElementGuid) -> Option<&ElementTreeNode> {
        self.root.iter().find_map(|node| node.find(guid))
    }

    pub fn find_mut(&mut self, guid: ElementGuid) -> Option<&mut ElementTreeNode> {
        self.root.iter_mut().find_map(|node| node.find_mut(guid))
    }

    /// Detach the node keyed `guid` without touching its elements.
    pub fn take(&mut self, guid: ElementGuid) -> Option<ElementTreeNode> {
        if let Some(index) = self.root.iter().position(|node| node.guid == guid) {
            return Some(self.root.remove(index));
        }
        self.root.iter_mut().find_map(|node| node.take_descendant(guid))
    }

    /// Detach the node keyed `guid` and remove every element under it.
    pub fn remove(&mut self, guid: ElementGuid) -> Option<ElementTreeNode> {
        let mut node = self.take(guid)?;
        node.dispose();
        Some(node)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.root.iter().map(ElementTreeNode::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Depth-first, pre-order walk over every node.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.root.iter().rev().collect(),
        }
    }
}

/// Iterator returned by [`ElementTree::iter`].
pub struct Iter<'a> {
    stack: Vec<&'a ElementTreeNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ElementTreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.values().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a ElementTree {
    type Item = &'a ElementTreeNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
