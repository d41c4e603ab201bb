//! Named-topic event bus.
//!
//! Components publish [`BusEvent`]s without knowing who listens. Handlers are
//! invoked synchronously, in registration order, on the emitting thread.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::drawing_box::DrawingBoxState;
use crate::element::ElementRef;
use crate::geometry::Position;
use crate::registry::FactoryRef;

/// Topics understood by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    DrawingBoxStateChange,
    ElementSelected,
    ElementUnselected,
    ElementResizeStart,
    ElementResize,
    ElementResizeEnd,
    ElementMoveStart,
    ElementMove,
    ElementMoveEnd,
    ListPanelSelectItem,
    ListPanelEnterCursorMode,
}

impl Topic {
    pub const ALL: [Topic; 11] = [
        Topic::DrawingBoxStateChange,
        Topic::ElementSelected,
        Topic::ElementUnselected,
        Topic::ElementResizeStart,
        Topic::ElementResize,
        Topic::ElementResizeEnd,
        Topic::ElementMoveStart,
        Topic::ElementMove,
        Topic::ElementMoveEnd,
        Topic::ListPanelSelectItem,
        Topic::ListPanelEnterCursorMode,
    ];

    /// Wire name of the topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::DrawingBoxStateChange => "drawing-box-state-change",
            Topic::ElementSelected => "el-selected",
            Topic::ElementUnselected => "el-unselected",
            Topic::ElementResizeStart => "el-resize-start",
            Topic::ElementResize => "el-resize",
            Topic::ElementResizeEnd => "el-resize-end",
            Topic::ElementMoveStart => "el-move-start",
            Topic::ElementMove => "el-move",
            Topic::ElementMoveEnd => "el-move-end",
            Topic::ListPanelSelectItem => "el-list-panel-select-item",
            Topic::ListPanelEnterCursorMode => "el-list-panel-enter-cursor-mode",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of element selection, resize and move events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementEvent {
    pub element: ElementRef,
    /// Pointer position for resize/move events.
    pub position: Option<Position>,
}

impl ElementEvent {
    pub fn new(element: ElementRef) -> Self {
        Self {
            element,
            position: None,
        }
    }

    pub fn at(element: ElementRef, position: Position) -> Self {
        Self {
            element,
            position: Some(position),
        }
    }
}

/// Payload of [`Topic::ListPanelSelectItem`].
#[derive(Debug, Clone)]
pub struct ListPanelEvent {
    /// Registry id of the picked kind.
    pub kind: String,
    pub creator: FactoryRef,
}

/// An event together with its payload.
#[derive(Debug, Clone)]
pub enum BusEvent {
    DrawingBoxStateChange(DrawingBoxState),
    ElementSelected(ElementEvent),
    ElementUnselected(ElementEvent),
    ElementResizeStart(ElementEvent),
    ElementResize(ElementEvent),
    ElementResizeEnd(ElementEvent),
    ElementMoveStart(ElementEvent),
    ElementMove(ElementEvent),
    ElementMoveEnd(ElementEvent),
    ListPanelSelectItem(ListPanelEvent),
    ListPanelEnterCursorMode,
}

impl BusEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BusEvent::DrawingBoxStateChange(_) => Topic::DrawingBoxStateChange,
            BusEvent::ElementSelected(_) => Topic::ElementSelected,
            BusEvent::ElementUnselected(_) => Topic::ElementUnselected,
            BusEvent::ElementResizeStart(_) => Topic::ElementResizeStart,
            BusEvent::ElementResize(_) => Topic::ElementResize,
            BusEvent::ElementResizeEnd(_) => Topic::ElementResizeEnd,
            BusEvent::ElementMoveStart(_) => Topic::ElementMoveStart,
            BusEvent::ElementMove(_) => Topic::ElementMove,
            BusEvent::ElementMoveEnd(_) => Topic::ElementMoveEnd,
            BusEvent::ListPanelSelectItem(_) => Topic::ListPanelSelectItem,
            BusEvent::ListPanelEnterCursorMode => Topic::ListPanelEnterCursorMode,
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Rc<RefCell<dyn FnMut(&BusEvent)>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    handlers: Vec<(ListenerId, Topic, Handler)>,
}

/// Shared publish/subscribe hub. Clones refer to the same listener list.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Rc<RefCell<Listeners>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `topic`.
    pub fn on(&self, topic: Topic, handler: impl FnMut(&BusEvent) + 'static) -> ListenerId {
        let mut listeners = self.listeners.borrow_mut();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        listeners.handlers.push((id, topic, handler));
        id
    }

    /// Unsubscribe. Returns false if `id` was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.handlers.len();
        listeners.handlers.retain(|(listener, _, _)| *listener != id);
        listeners.handlers.len() != before
    }

    /// Deliver `event` to every handler of its topic.
    ///
    /// Handlers may subscribe, unsubscribe or emit further events. A handler
    /// that is already running further up the stack is skipped.
    pub fn emit(&self, event: BusEvent) {
        let topic = event.topic();
        let handlers: Vec<Handler> = self
            .listeners
            .borrow()
            .handlers
            .iter()
            .filter(|(_, t, _)| *t == topic)
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();

        for handler in handlers {
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(&event),
                Err(_) => log::warn!("Skipping reentrant handler for {}", topic),
            }
        }
    }

    pub fn listener_count(&self, topic: Topic) -> usize {
        self.listeners
            .borrow()
            .handlers
            .iter()
            .filter(|(_, t, _)| *t == topic)
            .count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handler_count", &self.listeners.borrow().handlers.len())
            .finish()
    }
}
