//! Canvas: the drawing stage.
//!
//! Owns the root container, the element tree and the update queue every
//! element on it schedules into. The host calls [`Canvas::flush`] once per
//! frame to run the coalesced updates.

use std::rc::Rc;

use crate::element::{DrawingElement, ElementContext, ElementGuid};
use crate::error::{ElementResult, RenderResult};
use crate::event::EventBus;
use crate::geometry::Size;
use crate::target::{RenderHost, RenderTarget, format_number};
use crate::tree::{ElementTree, ElementTreeNode};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Runtime stage state.
pub struct Canvas {
    /// Context handed to factories building elements for this canvas.
    ctx: ElementContext,
    /// Root `svg` container.
    root: Box<dyn RenderTarget>,
    /// Elements on the canvas.
    tree: ElementTree,
    /// Currently selected element.
    selection: Option<ElementGuid>,
    size: Size,
}

impl Canvas {
    /// Create a new, empty canvas of the given size.
    pub fn new(host: Rc<dyn RenderHost>, bus: EventBus, size: Size) -> RenderResult<Self> {
        let root = host.create_element("svg");
        root.set_attribute("xmlns", SVG_NS)?;
        let width = format_number("width", size.width())?;
        let height = format_number("height", size.height())?;
        root.set_attribute("width", &width)?;
        root.set_attribute("height", &height)?;
        root.set_attribute("viewBox", &format!("0 0 {} {}", width, height))?;
        Ok(Self {
            ctx: ElementContext::new(host, bus),
            root,
            tree: ElementTree::new(),
            selection: None,
            size,
        })
    }

    /// Context to build elements with.
    pub fn context(&self) -> &ElementContext {
        &self.ctx
    }

    pub fn bus(&self) -> &EventBus {
        &self.ctx.bus
    }

    pub fn root(&self) -> &dyn RenderTarget {
        self.root.as_ref()
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Mount an element at the top level.
    pub fn add(&mut self, mut element: Box<dyn DrawingElement>) -> ElementResult<ElementGuid> {
        element.render_to(self.root.as_ref())?;
        let guid = element.guid();
        self.tree.append_child(ElementTreeNode::from_element(element));
        Ok(guid)
    }

    /// Mount an element grouped under `parent`.
    ///
    /// The element is rendered only once the tree has accepted it, so a
    /// rejected node comes back in the error still detached.
    pub fn add_child(&mut self, parent: ElementGuid, element: Box<dyn DrawingElement>) -> ElementResult<ElementGuid> {
        let guid = element.guid();
        self.tree.insert_child(parent, ElementTreeNode::from_element(element))?;
        let rendered = match self.tree.find_mut(guid) {
            Some(node) => node.element_mut().render_to(self.root.as_ref()).map(|_| ()),
            None => Ok(()),
        };
        if let Err(err) = rendered {
            self.tree.remove(guid);
            return Err(err.into());
        }
        Ok(guid)
    }

    pub fn element(&self, guid: ElementGuid) -> Option<&dyn DrawingElement> {
        self.tree.find(guid).map(ElementTreeNode::element)
    }

    pub fn element_mut(&mut self, guid: ElementGuid) -> Option<&mut dyn DrawingElement> {
        self.tree.find_mut(guid).map(ElementTreeNode::element_mut)
    }

    /// All elements, depth-first.
    pub fn elements(&self) -> impl Iterator<Item = &dyn DrawingElement> {
        self.tree.iter().map(ElementTreeNode::element)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Run one update per element mutated since the last flush.
    ///
    /// Returns how many elements updated. On a render error the remaining
    /// guids are put back on the queue and the error is returned.
    pub fn flush(&mut self) -> ElementResult<usize> {
        let pending = self.ctx.queue.drain();
        let mut updated = 0;
        for (index, guid) in pending.iter().enumerate() {
            let Some(node) = self.tree.find_mut(*guid) else {
                log::debug!("Element {} is not on the canvas, skipping", guid);
                continue;
            };
            match node.element_mut().settle() {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(err) => {
                    for rest in &pending[index + 1..] {
                        self.ctx.queue.schedule(*rest);
                    }
                    return Err(err.into());
                }
            }
        }
        Ok(updated)
    }

    /// Select `guid`, unselecting the previous selection. Returns false if
    /// the element is not on the canvas.
    pub fn select(&mut self, guid: ElementGuid) -> ElementResult<bool> {
        if self.tree.find(guid).is_none() {
            return Ok(false);
        }
        if let Some(previous) = self.selection.filter(|previous| *previous != guid) {
            if let Some(node) = self.tree.find_mut(previous) {
                node.element_mut().unselect()?;
            }
        }
        self.selection = Some(guid);
        if let Some(node) = self.tree.find_mut(guid) {
            node.element_mut().select()?;
        }
        Ok(true)
    }

    pub fn clear_selection(&mut self) -> ElementResult<()> {
        if let Some(previous) = self.selection.take() {
            if let Some(node) = self.tree.find_mut(previous) {
                node.element_mut().unselect()?;
            }
        }
        Ok(())
    }

    pub fn selection(&self) -> Option<ElementGuid> {
        self.selection
    }

    /// Remove an element and everything grouped under it.
    pub fn remove(&mut self, guid: ElementGuid) -> bool {
        let Some(node) = self.tree.remove(guid) else {
            return false;
        };
        if self
            .selection
            .is_some_and(|selected| node.guid() == selected || node_contains(&node, selected))
        {
            self.selection = None;
        }
        true
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        let roots: Vec<_> = self.tree.roots().iter().map(ElementTreeNode::guid).collect();
        for guid in roots {
            self.tree.remove(guid);
        }
        self.selection = None;
    }
}

fn node_contains(node: &ElementTreeNode, guid: ElementGuid) -> bool {
    node.find(guid).is_some()
}
