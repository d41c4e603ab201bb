//! Render target abstraction.
//!
//! Elements never talk to a concrete document model. They write attributes,
//! inline styles and text into a [`RenderTarget`] handed out by the host's
//! [`RenderHost`]. Handles use interior mutability so one node can be shared
//! between an element and the container it is mounted into.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::geometry::Position;

/// Mouse button of a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// Pointer event delivered to render target listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub position: Position,
    pub button: MouseButton,
    propagation_stopped: bool,
}

impl MouseEvent {
    pub fn new(position: Position, button: MouseButton) -> Self {
        Self {
            position,
            button,
            propagation_stopped: false,
        }
    }

    /// Keep the event from reaching enclosing targets.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

pub type MouseListener = Box<dyn FnMut(&mut MouseEvent)>;

/// A node in the host's document tree.
pub trait RenderTarget {
    fn tag(&self) -> String;

    fn set_attribute(&self, name: &str, value: &str) -> RenderResult<()>;

    /// Drop an attribute. No-op when it is not set.
    fn remove_attribute(&self, name: &str) -> RenderResult<()>;

    /// Set an inline style property. An empty value removes it.
    fn set_style(&self, name: &str, value: &str) -> RenderResult<()>;

    fn set_text(&self, text: &str) -> RenderResult<()>;

    /// Append `child`, detaching it from any previous parent.
    fn append_child(&self, child: &dyn RenderTarget) -> RenderResult<()>;

    /// Detach from the parent. No-op when already detached.
    fn remove(&self);

    fn has_parent(&self) -> bool;

    fn on_mouse_down(&self, listener: MouseListener);

    /// Another handle to the same node.
    fn clone_handle(&self) -> Box<dyn RenderTarget>;

    fn as_any(&self) -> &dyn Any;
}

/// Format a numeric attribute value, refusing NaN and infinities.
pub fn format_number(name: &str, value: f64) -> RenderResult<String> {
    if !value.is_finite() {
        return Err(RenderError::InvalidAttribute {
            name: name.to_string(),
            reason: format!("`{}` is not a finite number", value),
        });
    }
    Ok(value.to_string())
}

/// Factory for render targets.
pub trait RenderHost {
    fn create_element(&self, tag: &str) -> Box<dyn RenderTarget>;
}
