//! Element registry: kind id → factory and catalog metadata.
//!
//! One registry is created at startup, filled by plugin registration
//! functions and then passed by reference to whoever needs to build
//! elements. Registering an id twice replaces both entries.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::element::{ClickCallback, DrawingElement, ElementContext};
use crate::error::ElementResult;
use crate::property::ElementProperty;

/// Registry lookup errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Element kind `{0}` not found")]
    NotFound(String),
}

/// Builds elements of one kind.
pub trait ElementFactory {
    fn create(
        &self,
        ctx: &ElementContext,
        property: ElementProperty,
        on_click: Option<ClickCallback>,
    ) -> ElementResult<Box<dyn DrawingElement>>;
}

impl<F> ElementFactory for F
where
    F: Fn(&ElementContext, ElementProperty, Option<ClickCallback>) -> ElementResult<Box<dyn DrawingElement>>,
{
    fn create(
        &self,
        ctx: &ElementContext,
        property: ElementProperty,
        on_click: Option<ClickCallback>,
    ) -> ElementResult<Box<dyn DrawingElement>> {
        self(ctx, property, on_click)
    }
}

/// Shared handle to a factory.
#[derive(Clone)]
pub struct FactoryRef(Rc<dyn ElementFactory>);

impl FactoryRef {
    pub fn new(factory: impl ElementFactory + 'static) -> Self {
        Self(Rc::new(factory))
    }

    /// Wrap a closure or function with the factory signature.
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(&ElementContext, ElementProperty, Option<ClickCallback>) -> ElementResult<Box<dyn DrawingElement>>
            + 'static,
    {
        Self(Rc::new(factory))
    }

    pub fn create(
        &self,
        ctx: &ElementContext,
        property: ElementProperty,
        on_click: Option<ClickCallback>,
    ) -> ElementResult<Box<dyn DrawingElement>> {
        self.0.create(ctx, property, on_click)
    }

    /// True if both handles point at the same factory.
    pub fn ptr_eq(&self, other: &FactoryRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FactoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactoryRef({:p})", Rc::as_ptr(&self.0))
    }
}

/// Catalog data supplied at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDescriptor {
    pub label: String,
    pub icon: Option<String>,
}

impl ElementDescriptor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Catalog entry for one registered kind.
#[derive(Debug, Clone)]
pub struct ElementMeta {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub factory: FactoryRef,
}

/// Kind id → factory and metadata, in first-registration order.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    entries: IndexMap<String, ElementMeta>,
    populated: bool,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `id`, replacing any previous registration.
    /// A replaced kind keeps its original position.
    pub fn register(&mut self, id: impl Into<String>, descriptor: ElementDescriptor, factory: FactoryRef) {
        let id = id.into();
        let meta = ElementMeta {
            id: id.clone(),
            label: descriptor.label,
            icon: descriptor.icon,
            factory,
        };
        if let Some(previous) = self.entries.insert(id, meta) {
            log::warn!("Element kind `{}` registered twice, replacing", previous.id);
        }
    }

    pub fn factory(&self, id: &str) -> Result<FactoryRef, RegistryError> {
        self.meta(id).map(|meta| meta.factory.clone())
    }

    pub fn meta(&self, id: &str) -> Result<&ElementMeta, RegistryError> {
        self.entries
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// All entries in first-registration order.
    pub fn metas(&self) -> impl Iterator<Item = &ElementMeta> {
        self.entries.values()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once plugin loading has finished.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn mark_populated(&mut self) {
        self.populated = true;
    }

    /// Build an element of kind `id`.
    pub fn create(
        &self,
        id: &str,
        ctx: &ElementContext,
        property: ElementProperty,
        on_click: Option<ClickCallback>,
    ) -> ElementResult<Box<dyn DrawingElement>> {
        self.factory(id)?.create(ctx, property, on_click)
    }
}
