//! SCADA-Draw Core Library
//!
//! Platform-agnostic element model for the SCADA-Draw diagram editor: geometry
//! value types, editable property schemas, drawing elements that keep a render
//! target in sync with their properties, the element registry and the
//! pick-a-tool-then-draw workflow.

pub mod canvas;
pub mod drawing_box;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod math;
pub mod panel;
pub mod plugin;
pub mod property;
pub mod reactive;
pub mod registry;
pub mod schema;
pub mod target;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

pub use canvas::Canvas;
pub use drawing_box::{DrawingBox, DrawingBoxState, DrawingBoxStateMachine};
pub use element::{
    ClickCallback, DrawingElement, ElementContext, ElementCore, ElementGuid, ElementRef,
    ForeignElement, ForeignWidget, apply_vector_style, mount,
};
pub use error::{ElementError, ElementResult, RenderError, RenderResult};
pub use event::{BusEvent, ElementEvent, EventBus, ListPanelEvent, ListenerId, Topic};
pub use geometry::{Layout, LayoutSpec, Position, Size};
pub use panel::ElementListPanel;
pub use plugin::{LoaderError, PluginCatalog, PluginManifest, PluginPackage, load_all};
pub use property::{ElementProperty, PropertyError, Style, TextContent};
pub use reactive::{Reactive, Subscription, UpdateQueue};
pub use registry::{ElementDescriptor, ElementFactory, ElementMeta, ElementRegistry, FactoryRef, RegistryError};
pub use schema::{
    Control, PropertySchema, SchemaError, SchemaGroup, SchemaItem, SchemaValue, SelectOption,
    default_instance_from_schema, prop_views,
};
pub use target::{MouseButton, MouseEvent, MouseListener, RenderHost, RenderTarget, format_number};
pub use tree::{ElementTree, ElementTreeNode, TreeError};
