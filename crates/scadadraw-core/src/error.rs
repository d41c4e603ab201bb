//! Error types shared across the element model.

use thiserror::Error;

use crate::registry::RegistryError;
use crate::schema::SchemaError;
use crate::tree::TreeError;

/// Errors raised while writing to a render target.
///
/// A failed render means the target no longer mirrors the property state, so
/// these always propagate to whoever triggered the update.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Child node was created by a different render host")]
    ForeignNode,
    #[error("Cannot append a node to itself or to one of its descendants")]
    Hierarchy,
    #[error("Invalid value for attribute `{name}`: {reason}")]
    InvalidAttribute { name: String, reason: String },
    #[error("Embedded widget failed: {0}")]
    Widget(String),
}

/// Result type for render target operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised while building, drawing or managing elements.
#[derive(Debug, Error)]
pub enum ElementError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("No element factory is loaded into the drawing box")]
    NoFactoryLoaded,
}

/// Result type for element operations.
pub type ElementResult<T> = Result<T, ElementError>;
