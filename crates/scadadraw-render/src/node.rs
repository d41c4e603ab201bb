//! In-memory SVG document nodes.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use scadadraw_core::{MouseEvent, MouseListener, RenderError, RenderHost, RenderResult, RenderTarget};
use svg::node::Text as TextNode;
use svg::node::element::Element;
use svg::{Document, Node};

#[derive(Default)]
struct NodeData {
    tag: String,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    text: String,
    children: Vec<SvgNode>,
    parent: Weak<RefCell<NodeData>>,
    listeners: Vec<MouseListener>,
}

/// Shared handle to one SVG element. Clones refer to the same node.
#[derive(Clone)]
pub struct SvgNode(Rc<RefCell<NodeData>>);

impl SvgNode {
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            tag: tag.to_string(),
            ..NodeData::default()
        })))
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn style(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .styles
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    pub fn children(&self) -> Vec<SvgNode> {
        self.0.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<SvgNode> {
        self.0.borrow().parent.upgrade().map(SvgNode)
    }

    /// Every descendant with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<SvgNode> {
        let mut found = Vec::new();
        for child in self.0.borrow().children.iter() {
            if child.0.borrow().tag == tag {
                found.push(child.clone());
            }
            found.extend(child.find_all(tag));
        }
        found
    }

    pub fn ptr_eq(&self, other: &SvgNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Deliver a mouse-down to this node, then to each ancestor until a
    /// listener stops propagation.
    pub fn dispatch_mouse_down(&self, event: &mut MouseEvent) {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            node.run_listeners(event);
            if event.is_propagation_stopped() {
                break;
            }
            current = node.parent();
        }
    }

    fn run_listeners(&self, event: &mut MouseEvent) {
        let mut listeners = std::mem::take(&mut self.0.borrow_mut().listeners);
        for listener in listeners.iter_mut() {
            listener(event);
        }
        // Listeners added during dispatch run after the existing ones next time.
        let mut data = self.0.borrow_mut();
        listeners.append(&mut data.listeners);
        data.listeners = listeners;
    }

    fn is_ancestor_or_self(&self, other: &SvgNode) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Convert this node and its subtree into an `svg` crate element.
    pub fn to_element(&self) -> Element {
        let mut element = Element::new(self.tag());
        self.write_into(&mut element);
        element
    }

    /// Wrap this node's attributes and subtree in a standalone document.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        self.write_into(&mut document);
        document
    }

    /// Serialize this node and its subtree as SVG markup.
    pub fn to_svg(&self) -> String {
        self.to_element().to_string()
    }

    fn write_into<N: Node>(&self, node: &mut N) {
        let data = self.0.borrow();
        for (name, value) in &data.attributes {
            node.assign(name.as_str(), value.as_str());
        }
        if !data.styles.is_empty() {
            let style = data
                .styles
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            node.assign("style", style);
        }
        if !data.text.is_empty() {
            node.append(TextNode::new(data.text.as_str()));
        }
        for child in &data.children {
            node.append(child.to_element());
        }
    }
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

fn upsert(entries: &mut Vec<(String, String)>, name: &str, value: &str) {
    match entries.iter_mut().find(|(key, _)| key == name) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((name.to_string(), value.to_string())),
    }
}

impl fmt::Debug for SvgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("SvgNode")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .field("children", &data.children.len())
            .finish()
    }
}

impl RenderTarget for SvgNode {
    fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    fn set_attribute(&self, name: &str, value: &str) -> RenderResult<()> {
        if !valid_name(name) {
            return Err(RenderError::InvalidAttribute {
                name: name.to_string(),
                reason: "not a valid attribute name".to_string(),
            });
        }
        upsert(&mut self.0.borrow_mut().attributes, name, value);
        Ok(())
    }

    fn remove_attribute(&self, name: &str) -> RenderResult<()> {
        self.0.borrow_mut().attributes.retain(|(key, _)| key != name);
        Ok(())
    }

    fn set_style(&self, name: &str, value: &str) -> RenderResult<()> {
        if !valid_name(name) {
            return Err(RenderError::InvalidAttribute {
                name: name.to_string(),
                reason: "not a valid style property".to_string(),
            });
        }
        let mut data = self.0.borrow_mut();
        if value.is_empty() {
            data.styles.retain(|(key, _)| key != name);
        } else {
            upsert(&mut data.styles, name, value);
        }
        Ok(())
    }

    fn set_text(&self, text: &str) -> RenderResult<()> {
        self.0.borrow_mut().text = text.to_string();
        Ok(())
    }

    fn append_child(&self, child: &dyn RenderTarget) -> RenderResult<()> {
        let child = child
            .as_any()
            .downcast_ref::<SvgNode>()
            .ok_or(RenderError::ForeignNode)?
            .clone();
        if child.is_ancestor_or_self(self) {
            return Err(RenderError::Hierarchy);
        }
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child);
        Ok(())
    }

    fn remove(&self) {
        let parent = std::mem::take(&mut self.0.borrow_mut().parent);
        if let Some(parent) = parent.upgrade() {
            parent
                .borrow_mut()
                .children
                .retain(|child| !Rc::ptr_eq(&child.0, &self.0));
        }
    }

    fn has_parent(&self) -> bool {
        self.0.borrow().parent.upgrade().is_some()
    }

    fn on_mouse_down(&self, listener: MouseListener) {
        self.0.borrow_mut().listeners.push(listener);
    }

    fn clone_handle(&self) -> Box<dyn RenderTarget> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Render host creating [`SvgNode`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgHost;

impl SvgHost {
    pub fn new() -> Self {
        Self
    }
}

impl RenderHost for SvgHost {
    fn create_element(&self, tag: &str) -> Box<dyn RenderTarget> {
        log::trace!("Creating <{}>", tag);
        Box::new(SvgNode::new(tag))
    }
}

/// Serialize a target created by [`SvgHost`] to SVG markup. A root `svg`
/// node is written as a standalone [`Document`].
pub fn export_svg(target: &dyn RenderTarget) -> RenderResult<String> {
    let node = target
        .as_any()
        .downcast_ref::<SvgNode>()
        .ok_or(RenderError::ForeignNode)?;
    if node.tag() == "svg" {
        Ok(node.to_document().to_string())
    } else {
        Ok(node.to_svg())
    }
}
