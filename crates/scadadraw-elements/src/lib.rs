//! SCADA-Draw Elements
//!
//! Built-in element kinds, grouped into plugins the way a manifest lists
//! them: basic shapes, basic controls and charts. Each plugin module exposes
//! a `register` function that adds its kinds to an [`ElementRegistry`].
//!
//! [`ElementRegistry`]: scadadraw_core::ElementRegistry

pub mod charts;
pub mod controls;
pub mod shapes;

use scadadraw_core::{PluginCatalog, PluginManifest};

pub use charts::{ChartWidget, bar_chart, line_chart};
pub use controls::Input;
pub use shapes::{Circle, Line, Rect, Text};

/// Plugin path of [`shapes::register`].
pub const BASIC_SHAPES: &str = "basic-shapes";
/// Plugin path of [`controls::register`].
pub const BASIC_CONTROLS: &str = "basic-controls";
/// Plugin path of [`charts::register`].
pub const ECHARTS: &str = "echarts";

/// Catalog of every plugin compiled into this crate.
pub fn builtin_catalog() -> PluginCatalog {
    let mut catalog = PluginCatalog::new();
    catalog
        .add(BASIC_SHAPES, shapes::register)
        .add(BASIC_CONTROLS, controls::register)
        .add(ECHARTS, charts::register);
    catalog
}

/// Manifest loading every built-in plugin.
pub fn default_manifest() -> PluginManifest {
    PluginManifest::new([BASIC_SHAPES, BASIC_CONTROLS, ECHARTS])
}
