//! Element list panel: the catalog front-end over the registry.

use crate::event::{BusEvent, EventBus, ListPanelEvent};
use crate::registry::{ElementMeta, ElementRegistry, RegistryError};

/// Lists registered kinds and announces the user's pick on the bus.
#[derive(Debug)]
pub struct ElementListPanel<'r> {
    registry: &'r ElementRegistry,
    bus: EventBus,
}

impl<'r> ElementListPanel<'r> {
    pub fn new(registry: &'r ElementRegistry, bus: EventBus) -> Self {
        Self { registry, bus }
    }

    /// Emit `el-list-panel-select-item` with the factory of kind `id`.
    pub fn select_element(&self, id: &str) -> Result<(), RegistryError> {
        let creator = self.registry.factory(id)?;
        self.bus.emit(BusEvent::ListPanelSelectItem(ListPanelEvent {
            kind: id.to_string(),
            creator,
        }));
        Ok(())
    }

    /// Emit `el-list-panel-enter-cursor-mode`.
    pub fn enter_cursor_mode(&self) {
        self.bus.emit(BusEvent::ListPanelEnterCursorMode);
    }

    pub fn all_element_meta(&self) -> Vec<&'r ElementMeta> {
        self.registry.metas().collect()
    }

    /// True until plugin loading has populated the registry.
    pub fn is_loading(&self) -> bool {
        !self.registry.is_populated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Topic;
    use crate::registry::{ElementDescriptor, FactoryRef};
    use crate::test_support::Fixture;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn registry() -> ElementRegistry {
        let mut registry = ElementRegistry::new();
        registry.register(
            "fixture",
            ElementDescriptor::new("Fixture"),
            FactoryRef::from_fn(|ctx, property, _| Ok(Box::new(Fixture::create(ctx, property)?))),
        );
        registry
    }

    #[test]
    fn test_select_element_emits_creator() {
        let registry = registry();
        let bus = EventBus::new();
        let picked = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&picked);
        bus.on(Topic::ListPanelSelectItem, move |event| {
            if let BusEvent::ListPanelSelectItem(payload) = event {
                *sink.borrow_mut() = Some(payload.clone());
            }
        });

        let panel = ElementListPanel::new(&registry, bus);
        panel.select_element("fixture").unwrap();

        let payload = picked.borrow_mut().take().unwrap();
        assert_eq!(payload.kind, "fixture");
        assert!(payload.creator.ptr_eq(&registry.factory("fixture").unwrap()));
    }

    #[test]
    fn test_select_unknown_element_fails_without_event() {
        let registry = registry();
        let bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        bus.on(Topic::ListPanelSelectItem, move |_| *counter.borrow_mut() += 1);

        let panel = ElementListPanel::new(&registry, bus);
        assert!(matches!(panel.select_element("valve"), Err(RegistryError::NotFound(_))));
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn test_cursor_mode_and_catalog() {
        let mut registry = registry();
        let bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        bus.on(Topic::ListPanelEnterCursorMode, move |_| *counter.borrow_mut() += 1);

        {
            let panel = ElementListPanel::new(&registry, bus.clone());
            assert!(panel.is_loading());
            panel.enter_cursor_mode();
            let metas = panel.all_element_meta();
            let labels: Vec<_> = metas.iter().map(|m| m.label.as_str()).collect();
            assert_eq!(labels, vec!["Fixture"]);
        }
        assert_eq!(*hits.borrow(), 1);

        registry.mark_populated();
        assert!(!ElementListPanel::new(&registry, bus).is_loading());
    }
}
