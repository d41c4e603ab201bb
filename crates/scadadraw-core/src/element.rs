//! Drawing elements: placed shapes and widgets that keep a render target in
//! sync with their property.
//!
//! Concrete kinds embed an [`ElementCore`] and implement [`DrawingElement`]'s
//! `update()`. Everything else (selection, mounting, removal, settling a
//! pending update) is provided by the trait on top of the core.

use std::cell::Ref;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ElementResult, RenderResult};
use crate::event::{BusEvent, ElementEvent, EventBus};
use crate::geometry::Size;
use crate::property::ElementProperty;
use crate::reactive::{Reactive, Subscription, UpdateQueue};
use crate::schema::PropertySchema;
use crate::target::{MouseEvent, RenderHost, RenderTarget, format_number};

/// Unique, immutable identity of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementGuid(Uuid);

impl ElementGuid {
    /// Generate a fresh guid.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ElementGuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lightweight reference to an element carried by bus events and callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub guid: ElementGuid,
    pub kind: &'static str,
}

/// Invoked when the element's target receives a mouse-down.
pub type ClickCallback = Rc<dyn Fn(ElementRef, &MouseEvent)>;

/// Everything an element needs from its surroundings at construction.
#[derive(Clone)]
pub struct ElementContext {
    pub host: Rc<dyn RenderHost>,
    pub bus: EventBus,
    pub queue: UpdateQueue,
}

impl ElementContext {
    pub fn new(host: Rc<dyn RenderHost>, bus: EventBus) -> Self {
        Self {
            host,
            bus,
            queue: UpdateQueue::new(),
        }
    }
}

impl fmt::Debug for ElementContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementContext")
            .field("bus", &self.bus)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

/// State shared by every element kind.
pub struct ElementCore {
    guid: ElementGuid,
    id: String,
    kind: &'static str,
    property: Reactive<ElementProperty>,
    schema: PropertySchema,
    target: Box<dyn RenderTarget>,
    selected: bool,
    bus: EventBus,
    subscription: Option<Subscription>,
    removed: bool,
}

impl ElementCore {
    /// Create the core of a new element of `kind`, rendered into a fresh
    /// `tag` node.
    ///
    /// Fails if any schema path does not resolve in `property`. The caller
    /// still has to run the first `update()`, see [`mount`].
    pub fn new(
        kind: &'static str,
        property: ElementProperty,
        schema: PropertySchema,
        tag: &str,
        ctx: &ElementContext,
        on_click: Option<ClickCallback>,
    ) -> ElementResult<Self> {
        schema.check(kind, &property)?;

        let guid = ElementGuid::new();
        let property = Reactive::new(property);
        let subscription = property.watch(guid, ctx.queue.clone());
        let target = ctx.host.create_element(tag);

        let element = ElementRef { guid, kind };
        target.on_mouse_down(Box::new(move |event| {
            event.stop_propagation();
            if let Some(callback) = &on_click {
                callback(element, event);
            }
        }));

        log::debug!("Created {} element {}", kind, guid);
        Ok(Self {
            guid,
            id: guid.to_string(),
            kind,
            property,
            schema,
            target,
            selected: false,
            bus: ctx.bus.clone(),
            subscription: Some(subscription),
            removed: false,
        })
    }

    pub fn guid(&self) -> ElementGuid {
        self.guid
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Override the display id. The guid is unaffected.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn element_ref(&self) -> ElementRef {
        ElementRef {
            guid: self.guid,
            kind: self.kind,
        }
    }

    /// Borrow the current property value.
    pub fn property(&self) -> Ref<'_, ElementProperty> {
        self.property.get()
    }

    pub fn reactive(&self) -> &Reactive<ElementProperty> {
        &self.property
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub fn target(&self) -> &dyn RenderTarget {
        self.target.as_ref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl fmt::Debug for ElementCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCore")
            .field("guid", &self.guid)
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("tag", &self.target.tag())
            .field("selected", &self.selected)
            .field("removed", &self.removed)
            .finish()
    }
}

/// Common behaviour of all element kinds.
pub trait DrawingElement {
    /// Get the shared element state.
    fn core(&self) -> &ElementCore;

    /// Get the shared element state mutably.
    fn core_mut(&mut self) -> &mut ElementCore;

    /// Write the current property and selection state onto the render target.
    fn update(&mut self) -> RenderResult<()>;

    fn guid(&self) -> ElementGuid {
        self.core().guid
    }

    fn id(&self) -> &str {
        self.core().id()
    }

    fn kind(&self) -> &'static str {
        self.core().kind
    }

    fn element_ref(&self) -> ElementRef {
        self.core().element_ref()
    }

    /// The live property handle. Mutations through it schedule an update.
    fn reactive(&self) -> Reactive<ElementProperty> {
        self.core().property.clone()
    }

    fn schema(&self) -> &PropertySchema {
        &self.core().schema
    }

    fn target(&self) -> &dyn RenderTarget {
        self.core().target()
    }

    fn is_selected(&self) -> bool {
        self.core().selected
    }

    /// Mark selected, notify the bus, re-render. Repeated calls notify again.
    /// A removed element ignores the call.
    fn select(&mut self) -> RenderResult<()> {
        if self.is_removed() {
            return Ok(());
        }
        self.core_mut().selected = true;
        let core = self.core();
        core.bus.emit(BusEvent::ElementSelected(ElementEvent::new(core.element_ref())));
        self.update()
    }

    /// Mark unselected, notify the bus, re-render.
    fn unselect(&mut self) -> RenderResult<()> {
        if self.is_removed() {
            return Ok(());
        }
        self.core_mut().selected = false;
        let core = self.core();
        core.bus.emit(BusEvent::ElementUnselected(ElementEvent::new(core.element_ref())));
        self.update()
    }

    /// Stop observing the property, then detach the target from its parent.
    fn remove(&mut self) {
        let core = self.core_mut();
        if core.removed {
            return;
        }
        core.subscription = None;
        core.target.remove();
        core.removed = true;
        log::debug!("Removed {} element {}", core.kind, core.guid);
    }

    fn is_removed(&self) -> bool {
        self.core().removed
    }

    /// Run the coalesced update if a mutation is pending. Returns whether
    /// `update()` ran.
    fn settle(&mut self) -> RenderResult<bool> {
        let pending = self
            .core()
            .subscription
            .as_ref()
            .is_some_and(Subscription::take_pending);
        if pending {
            self.update()?;
        }
        Ok(pending)
    }
}

impl<'a> dyn DrawingElement + 'a {
    /// Append the target to `container`. Concrete kinds reach this through
    /// `&mut dyn DrawingElement`.
    pub fn render_to(&mut self, container: &dyn RenderTarget) -> RenderResult<&mut (dyn DrawingElement + 'a)> {
        container.append_child(self.target())?;
        Ok(self)
    }
}

impl fmt::Debug for dyn DrawingElement + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.core().fmt(f)
    }
}

/// Run the initial synchronous update of a freshly built element.
pub fn mount<E: DrawingElement>(mut element: E) -> ElementResult<E> {
    element.update()?;
    Ok(element)
}

fn format_rotation(property: &ElementProperty) -> RenderResult<String> {
    let layout = &property.layout;
    Ok(format!(
        "rotate({} {} {})",
        format_number("transform", layout.rotation())?,
        format_number("transform", layout.position().x())?,
        format_number("transform", layout.position().y())?
    ))
}

fn set_optional(target: &dyn RenderTarget, name: &str, value: Option<&str>) -> RenderResult<()> {
    match value {
        Some(value) => target.set_attribute(name, value),
        None => target.remove_attribute(name),
    }
}

fn apply_selection(target: &dyn RenderTarget, selected: bool) -> RenderResult<()> {
    target.set_style("border", if selected { "solid 1px blue" } else { "" })
}

/// Fill, stroke, rotation and selection border shared by native vector shapes.
pub fn apply_vector_style(
    target: &dyn RenderTarget,
    property: &ElementProperty,
    selected: bool,
) -> RenderResult<()> {
    let style = property.style();
    let fill = style.and_then(|s| s.fill.as_deref()).unwrap_or("none");
    let stroke = style.and_then(|s| s.stroke.as_deref()).unwrap_or("none");
    let stroke_width = style.and_then(|s| s.stroke_width).unwrap_or(0.0);

    target.set_attribute("fill", fill)?;
    target.set_attribute("stroke", stroke)?;
    target.set_attribute("stroke-width", &format_number("stroke-width", stroke_width)?)?;
    set_optional(target, "stroke-linecap", style.and_then(|s| s.stroke_linecap.as_deref()))?;
    set_optional(target, "stroke-linejoin", style.and_then(|s| s.stroke_linejoin.as_deref()))?;
    set_optional(
        target,
        "stroke-dasharray",
        style.and_then(|s| s.stroke_dasharray.as_deref()).filter(|d| !d.is_empty()),
    )?;
    target.set_attribute("transform", &format_rotation(property)?)?;
    apply_selection(target, selected)
}

/// Content embedded in a [`ForeignElement`], such as a chart.
pub trait ForeignWidget {
    /// Fit the widget to the element's new size.
    fn resize(&mut self, size: Size) -> RenderResult<()>;
}

/// Element hosting foreign content inside a `foreignObject` node.
pub struct ForeignElement {
    core: ElementCore,
    content: Box<dyn RenderTarget>,
    widget: Box<dyn ForeignWidget>,
}

impl ForeignElement {
    pub const XHTML_NS: &'static str = "http://www.w3.org/1999/xhtml";

    /// Build the `foreignObject` and its `div` container, hand the container
    /// to `build` to create the widget, then run the first update.
    pub fn new(
        kind: &'static str,
        property: ElementProperty,
        schema: PropertySchema,
        ctx: &ElementContext,
        on_click: Option<ClickCallback>,
        build: impl FnOnce(&dyn RenderTarget) -> RenderResult<Box<dyn ForeignWidget>>,
    ) -> ElementResult<Self> {
        let core = ElementCore::new(kind, property, schema, "foreignObject", ctx, on_click)?;

        let content = ctx.host.create_element("div");
        content.set_attribute("xmlns", Self::XHTML_NS)?;
        content.set_style("display", "inline-block")?;
        content.set_style("width", "100%")?;
        content.set_style("height", "100%")?;
        core.target().append_child(content.as_ref())?;

        let widget = build(content.as_ref())?;
        mount(Self {
            core,
            content,
            widget,
        })
    }

    /// The `div` the widget draws into.
    pub fn content(&self) -> &dyn RenderTarget {
        self.content.as_ref()
    }
}

impl DrawingElement for ForeignElement {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn update(&mut self) -> RenderResult<()> {
        let size = {
            let property = self.core.property();
            let layout = &property.layout;
            let target = self.core.target();
            target.set_attribute("x", &format_number("x", layout.position().x())?)?;
            target.set_attribute("y", &format_number("y", layout.position().y())?)?;
            target.set_attribute("width", &format_number("width", layout.size().width())?)?;
            target.set_attribute("height", &format_number("height", layout.size().height())?)?;
            target.set_attribute("transform", &format_rotation(&property)?)?;
            apply_selection(target, self.core.selected)?;
            layout.size()
        };
        self.widget.resize(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ElementError, RenderError};
    use crate::event::Topic;
    use crate::geometry::{Layout, LayoutSpec, Position};
    use crate::property::Style;
    use crate::schema::{layout_schema, style_schema};
    use crate::target::MouseButton;
    use crate::test_support::{Fixture, RecordingTarget, context};
    use std::cell::{Cell, RefCell};

    fn rect_prop() -> ElementProperty {
        ElementProperty::new(Layout::of(LayoutSpec::new(1.0, 2.0, 30.0, 40.0)))
    }

    #[test]
    fn test_construction_runs_one_update() {
        let (ctx, _) = context();
        let fixture = Fixture::create(&ctx, rect_prop()).unwrap();
        assert_eq!(fixture.updates(), 1);
        assert_eq!(fixture.target_attr("width").as_deref(), Some("30"));
        assert!(ctx.queue.is_empty());
    }

    #[test]
    fn test_guid_is_stable_and_id_defaults_to_it() {
        let (ctx, _) = context();
        let mut fixture = Fixture::create(&ctx, rect_prop()).unwrap();
        let guid = fixture.guid();
        assert_eq!(fixture.id(), guid.to_string());

        fixture.core_mut().set_id("pump-1");
        fixture.reactive().mutate(|p| { p.layout.set(0.0, 0.0, 1.0, 1.0); });
        fixture.settle().unwrap();
        assert_eq!(fixture.id(), "pump-1");
        assert_eq!(fixture.guid(), guid);
    }

    #[test]
    fn test_batch_of_mutations_updates_once_with_final_values() {
        let (ctx, _) = context();
        let mut fixture = Fixture::create(&ctx, rect_prop()).unwrap();
        let property = fixture.reactive();

        property.mutate(|p| {
            p.layout.size_mut().set(50.0, 60.0);
        });
        property.mutate(|p| {
            p.layout.position_mut().set(7.0, 8.0);
        });
        property.mutate(|p| {
            p.layout.size_mut().set(70.0, 80.0);
        });
        assert_eq!(fixture.updates(), 1);
        assert_eq!(ctx.queue.len(), 1);

        assert!(fixture.settle().unwrap());
        assert!(!fixture.settle().unwrap());
        assert_eq!(fixture.updates(), 2);
        assert_eq!(fixture.target_attr("width").as_deref(), Some("70"));
        assert_eq!(fixture.target_attr("x").as_deref(), Some("7"));
    }

    #[test]
    fn test_select_twice_notifies_twice() {
        let (ctx, _) = context();
        let mut fixture = Fixture::create(&ctx, rect_prop()).unwrap();
        let selected = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&selected);
        ctx.bus.on(Topic::ElementSelected, move |event| {
            if let BusEvent::ElementSelected(payload) = event {
                seen.borrow_mut().push(payload.element);
            }
        });

        fixture.select().unwrap();
        fixture.select().unwrap();
        assert!(fixture.is_selected());
        assert_eq!(*selected.borrow(), vec![fixture.element_ref(); 2]);
        assert_eq!(fixture.updates(), 3);

        fixture.unselect().unwrap();
        assert!(!fixture.is_selected());
    }

    #[test]
    fn test_remove_stops_updates_and_detaches() {
        let (ctx, _) = context();
        let mut fixture = Fixture::create(&ctx, rect_prop()).unwrap();
        let container = RecordingTarget::new("g");
        (&mut fixture as &mut dyn DrawingElement).render_to(&container).unwrap();
        assert!(fixture.target().has_parent());

        let property = fixture.reactive();
        fixture.remove();
        assert!(fixture.is_removed());
        assert!(!fixture.target().has_parent());
        assert!(!property.is_watched());

        property.mutate(|p| { p.layout.set(9.0, 9.0, 9.0, 9.0); });
        assert!(ctx.queue.is_empty());
        assert!(!fixture.settle().unwrap());
        assert_eq!(fixture.updates(), 1);

        // Second call is a no-op.
        fixture.remove();
    }

    #[test]
    fn test_render_to_on_trait_object_chains() {
        let (ctx, _) = context();
        let mut boxed: Box<dyn DrawingElement> = Box::new(Fixture::create(&ctx, rect_prop()).unwrap());
        let container = RecordingTarget::new("svg");
        let kind = boxed.render_to(&container).unwrap().kind();
        assert_eq!(kind, "fixture");
        assert_eq!(container.child_count(), 1);
    }

    #[test]
    fn test_unresolved_schema_path_is_rejected() {
        let (ctx, _) = context();
        let err = ElementCore::new("fixture", rect_prop(), style_schema(), "rect", &ctx, None).unwrap_err();
        assert!(matches!(err, ElementError::Schema(_)));
    }

    #[test]
    fn test_mouse_down_stops_propagation_and_calls_back() {
        let (ctx, host) = context();
        let clicked = Rc::new(Cell::new(None));
        let sink = Rc::clone(&clicked);
        let callback: ClickCallback = Rc::new(move |element, _| sink.set(Some(element)));
        let core = ElementCore::new("fixture", rect_prop(), layout_schema(), "rect", &ctx, Some(callback)).unwrap();

        let node = host.last_created().unwrap();
        let mut event = MouseEvent::new(Position::of(3.0, 4.0), MouseButton::Left);
        node.fire_mouse_down(&mut event);

        assert!(event.is_propagation_stopped());
        assert_eq!(clicked.get(), Some(core.element_ref()));
    }

    #[test]
    fn test_apply_vector_style_defaults_and_selection() {
        let target = RecordingTarget::new("rect");
        let prop = rect_prop();
        apply_vector_style(&target, &prop, false).unwrap();
        assert_eq!(target.attr("fill").as_deref(), Some("none"));
        assert_eq!(target.attr("stroke-width").as_deref(), Some("0"));
        assert_eq!(target.attr("transform").as_deref(), Some("rotate(0 1 2)"));
        assert_eq!(target.style_value("border"), None);

        let styled = prop.with_style_defaults(&Style::fill_stroke_defaults());
        apply_vector_style(&target, &styled, true).unwrap();
        assert_eq!(target.attr("fill").as_deref(), Some("yellow"));
        assert_eq!(target.attr("stroke-linejoin").as_deref(), Some("miter"));
        assert_eq!(target.attr("stroke-dasharray"), None);
        assert_eq!(target.style_value("border").as_deref(), Some("solid 1px blue"));
    }

    #[test]
    fn test_apply_vector_style_clears_unset_stroke_options() {
        let target = RecordingTarget::new("line");
        let mut prop = rect_prop();
        prop.style = Some(Style {
            stroke_linecap: Some("round".to_string()),
            stroke_dasharray: Some("5,5".to_string()),
            ..Style::default()
        });
        apply_vector_style(&target, &prop, false).unwrap();
        assert_eq!(target.attr("stroke-linecap").as_deref(), Some("round"));
        assert_eq!(target.attr("stroke-dasharray").as_deref(), Some("5,5"));

        if let Some(style) = prop.style.as_mut() {
            style.stroke_dasharray = Some(String::new());
        }
        apply_vector_style(&target, &prop, false).unwrap();
        assert_eq!(target.attr("stroke-dasharray"), None);
        assert_eq!(target.attr("stroke-linecap").as_deref(), Some("round"));

        prop.style = None;
        apply_vector_style(&target, &prop, false).unwrap();
        assert_eq!(target.attr("stroke-linecap"), None);
        assert_eq!(target.attr("fill").as_deref(), Some("none"));
    }

    #[test]
    fn test_non_finite_rotation_is_rejected() {
        let target = RecordingTarget::new("rect");
        let mut prop = rect_prop();
        prop.layout.set_rotation(f64::INFINITY);
        let err = apply_vector_style(&target, &prop, false).unwrap_err();
        assert!(matches!(err, RenderError::InvalidAttribute { name, .. } if name == "transform"));
    }

    #[test]
    fn test_removed_element_ignores_selection() {
        let (ctx, _) = context();
        let mut fixture = Fixture::create(&ctx, rect_prop()).unwrap();
        let notified = Rc::new(Cell::new(0));
        let seen = Rc::clone(&notified);
        ctx.bus.on(Topic::ElementSelected, move |_| seen.set(seen.get() + 1));
        let seen = Rc::clone(&notified);
        ctx.bus.on(Topic::ElementUnselected, move |_| seen.set(seen.get() + 1));

        fixture.remove();
        fixture.select().unwrap();
        assert!(!fixture.is_selected());
        fixture.unselect().unwrap();

        assert_eq!(notified.get(), 0);
        assert_eq!(fixture.updates(), 1);
    }

    struct SizeLog(Rc<RefCell<Vec<Size>>>);

    impl ForeignWidget for SizeLog {
        fn resize(&mut self, size: Size) -> RenderResult<()> {
            self.0.borrow_mut().push(size);
            Ok(())
        }
    }

    struct Broken;

    impl ForeignWidget for Broken {
        fn resize(&mut self, _size: Size) -> RenderResult<()> {
            Err(RenderError::Widget("chart disposed".to_string()))
        }
    }

    #[test]
    fn test_foreign_element_resizes_widget_on_update() {
        let (ctx, _) = context();
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&sizes);
        let mut chart = ForeignElement::new("chart", rect_prop(), layout_schema(), &ctx, None, move |content| {
            assert_eq!(content.tag(), "div");
            Ok(Box::new(SizeLog(log)) as Box<dyn ForeignWidget>)
        })
        .unwrap();

        assert_eq!(chart.target().tag(), "foreignObject");
        assert_eq!(chart.content().tag(), "div");
        assert!(chart.content().has_parent());

        chart.reactive().mutate(|p| {
            p.layout.size_mut().set(300.0, 200.0);
        });
        chart.settle().unwrap();
        assert_eq!(*sizes.borrow(), vec![Size::of(30.0, 40.0), Size::of(300.0, 200.0)]);
    }

    #[test]
    fn test_foreign_widget_error_propagates() {
        let (ctx, _) = context();
        let result = ForeignElement::new("chart", rect_prop(), layout_schema(), &ctx, None, |_| {
            Ok(Box::new(Broken) as Box<dyn ForeignWidget>)
        });
        assert!(matches!(result, Err(ElementError::Render(RenderError::Widget(_)))));
    }
}
