//! Pick-a-tool-then-draw workflow.

use serde::{Deserialize, Serialize};

use crate::element::{ClickCallback, DrawingElement, ElementContext};
use crate::error::{ElementError, ElementResult};
use crate::event::{BusEvent, EventBus};
use crate::geometry::Layout;
use crate::property::ElementProperty;
use crate::registry::FactoryRef;

/// Phase of the drawing workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawingBoxState {
    #[default]
    Idle,
    ReadyToDraw,
    Drawing,
}

/// Three-state machine. Every transition is allowed from every state and
/// emits exactly one `drawing-box-state-change` carrying the new state.
#[derive(Debug)]
pub struct DrawingBoxStateMachine {
    state: DrawingBoxState,
    bus: EventBus,
}

impl DrawingBoxStateMachine {
    pub fn new(bus: EventBus) -> Self {
        Self {
            state: DrawingBoxState::Idle,
            bus,
        }
    }

    pub fn state(&self) -> DrawingBoxState {
        self.state
    }

    /// A tool was picked.
    pub fn load(&mut self) {
        self.transition(DrawingBoxState::ReadyToDraw);
    }

    /// The user started drawing.
    pub fn draw(&mut self) {
        self.transition(DrawingBoxState::Drawing);
    }

    /// The element was placed.
    pub fn draw_complete(&mut self) {
        self.transition(DrawingBoxState::Idle);
    }

    fn transition(&mut self, next: DrawingBoxState) {
        log::debug!("Drawing box {:?} -> {:?}", self.state, next);
        self.state = next;
        self.bus.emit(BusEvent::DrawingBoxStateChange(next));
    }
}

/// The drawing box: holds the picked factory and drives the state machine.
#[derive(Debug)]
pub struct DrawingBox {
    state_machine: DrawingBoxStateMachine,
    current_factory: Option<FactoryRef>,
}

impl DrawingBox {
    pub fn new(bus: EventBus) -> Self {
        Self {
            state_machine: DrawingBoxStateMachine::new(bus),
            current_factory: None,
        }
    }

    pub fn state(&self) -> DrawingBoxState {
        self.state_machine.state()
    }

    pub fn state_machine(&self) -> &DrawingBoxStateMachine {
        &self.state_machine
    }

    pub fn state_machine_mut(&mut self) -> &mut DrawingBoxStateMachine {
        &mut self.state_machine
    }

    pub fn current_factory(&self) -> Option<&FactoryRef> {
        self.current_factory.as_ref()
    }

    /// Bind `factory` as the active tool and move to `ReadyToDraw`.
    pub fn load_factory(&mut self, factory: FactoryRef) {
        self.current_factory = Some(factory);
        self.state_machine.load();
    }

    pub fn begin_draw(&mut self) {
        self.state_machine.draw();
    }

    /// Build an element with the bound factory at `layout` and go back to
    /// `Idle`. The state returns to `Idle` even if construction fails.
    pub fn finish_draw(
        &mut self,
        ctx: &ElementContext,
        layout: Layout,
        on_click: Option<ClickCallback>,
    ) -> ElementResult<Box<dyn DrawingElement>> {
        let result = match &self.current_factory {
            Some(factory) => factory.create(ctx, ElementProperty::new(layout), on_click),
            None => Err(ElementError::NoFactoryLoaded),
        };
        self.state_machine.draw_complete();
        result
    }

    /// Drop the active tool and go back to `Idle`.
    pub fn cancel(&mut self) {
        self.current_factory = None;
        self.state_machine.draw_complete();
    }
}
