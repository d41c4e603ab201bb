//! SCADA-Draw Render Library
//!
//! Headless render host: an in-memory SVG node tree implementing the core
//! render-target interface. Nodes serialize to SVG markup and dispatch
//! bubbling mouse-down events, which is all the element model needs to be
//! exercised and exported without a browser.

mod node;

pub use node::{SvgHost, SvgNode, export_svg};
