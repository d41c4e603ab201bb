//! In-memory render target and a minimal element kind for unit tests.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::element::{DrawingElement, ElementContext, ElementCore, mount};
use crate::error::{ElementResult, RenderError, RenderResult};
use crate::event::EventBus;
use crate::property::ElementProperty;
use crate::schema::layout_schema;
use crate::target::{MouseEvent, MouseListener, RenderHost, RenderTarget, format_number};

#[derive(Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    children: Vec<RecordingTarget>,
    parent: Option<Weak<RefCell<Node>>>,
    listeners: Vec<MouseListener>,
}

/// Render target that records every write.
#[derive(Clone)]
pub struct RecordingTarget {
    node: Rc<RefCell<Node>>,
}

impl RecordingTarget {
    pub fn new(tag: &str) -> Self {
        Self {
            node: Rc::new(RefCell::new(Node {
                tag: tag.to_string(),
                ..Node::default()
            })),
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.node.borrow().attributes.get(name).cloned()
    }

    pub fn style_value(&self, name: &str) -> Option<String> {
        self.node.borrow().styles.get(name).cloned()
    }

    pub fn text(&self) -> String {
        self.node.borrow().text.clone()
    }

    pub fn child_count(&self) -> usize {
        self.node.borrow().children.len()
    }

    pub fn fire_mouse_down(&self, event: &mut MouseEvent) {
        let mut listeners = std::mem::take(&mut self.node.borrow_mut().listeners);
        for listener in listeners.iter_mut() {
            listener(event);
        }
        self.node.borrow_mut().listeners = listeners;
    }
}

impl RenderTarget for RecordingTarget {
    fn tag(&self) -> String {
        self.node.borrow().tag.clone()
    }

    fn set_attribute(&self, name: &str, value: &str) -> RenderResult<()> {
        self.node
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&self, name: &str) -> RenderResult<()> {
        self.node.borrow_mut().attributes.remove(name);
        Ok(())
    }

    fn set_style(&self, name: &str, value: &str) -> RenderResult<()> {
        let mut node = self.node.borrow_mut();
        if value.is_empty() {
            node.styles.remove(name);
        } else {
            node.styles.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn set_text(&self, text: &str) -> RenderResult<()> {
        self.node.borrow_mut().text = text.to_string();
        Ok(())
    }

    fn append_child(&self, child: &dyn RenderTarget) -> RenderResult<()> {
        let child = child
            .as_any()
            .downcast_ref::<RecordingTarget>()
            .ok_or(RenderError::ForeignNode)?
            .clone();
        child.remove();
        child.node.borrow_mut().parent = Some(Rc::downgrade(&self.node));
        self.node.borrow_mut().children.push(child);
        Ok(())
    }

    fn remove(&self) {
        let parent = self.node.borrow_mut().parent.take();
        if let Some(parent) = parent.and_then(|p| p.upgrade()) {
            parent
                .borrow_mut()
                .children
                .retain(|c| !Rc::ptr_eq(&c.node, &self.node));
        }
    }

    fn has_parent(&self) -> bool {
        self.node.borrow().parent.is_some()
    }

    fn on_mouse_down(&self, listener: MouseListener) {
        self.node.borrow_mut().listeners.push(listener);
    }

    fn clone_handle(&self) -> Box<dyn RenderTarget> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Host handing out [`RecordingTarget`]s and remembering them.
#[derive(Default)]
pub struct RecordingHost {
    created: RefCell<Vec<RecordingTarget>>,
}

impl RecordingHost {
    pub fn last_created(&self) -> Option<RecordingTarget> {
        self.created.borrow().last().cloned()
    }
}

impl RenderHost for RecordingHost {
    fn create_element(&self, tag: &str) -> Box<dyn RenderTarget> {
        let target = RecordingTarget::new(tag);
        self.created.borrow_mut().push(target.clone());
        Box::new(target)
    }
}

/// Fresh context backed by a recording host.
pub fn context() -> (ElementContext, Rc<RecordingHost>) {
    let host = Rc::new(RecordingHost::default());
    let ctx = ElementContext::new(host.clone(), EventBus::new());
    (ctx, host)
}

/// Element kind that writes its layout and counts updates.
pub struct Fixture {
    core: ElementCore,
    updates: Rc<Cell<usize>>,
}

impl Fixture {
    pub fn create(ctx: &ElementContext, property: ElementProperty) -> ElementResult<Self> {
        let core = ElementCore::new("fixture", property, layout_schema(), "rect", ctx, None)?;
        mount(Self {
            core,
            updates: Rc::new(Cell::new(0)),
        })
    }

    pub fn updates(&self) -> usize {
        self.updates.get()
    }

    pub fn update_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.updates)
    }

    pub fn target_attr(&self, name: &str) -> Option<String> {
        self.core
            .target()
            .as_any()
            .downcast_ref::<RecordingTarget>()
            .and_then(|target| target.attr(name))
    }
}

impl DrawingElement for Fixture {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn update(&mut self) -> RenderResult<()> {
        self.updates.set(self.updates.get() + 1);
        let property = self.core.property();
        let layout = &property.layout;
        let target = self.core.target();
        target.set_attribute("x", &format_number("x", layout.position().x())?)?;
        target.set_attribute("y", &format_number("y", layout.position().y())?)?;
        target.set_attribute("width", &format_number("width", layout.size().width())?)?;
        target.set_attribute("height", &format_number("height", layout.size().height())?)?;
        Ok(())
    }
}
