//! SCADA-Draw CLI.
//!
//! Loads the configuration and plugin manifest, populates the element
//! registry, draws the configured scene through the element list panel and
//! the drawing box, then exports the canvas as SVG.

mod args;
mod config;

pub use args::Args;
pub use config::{AppConfig, CanvasConfig, ConfigError, SceneItem, load_config};

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use scadadraw_core::{
    BusEvent, Canvas, DrawingBox, ElementError, ElementListPanel, ElementRegistry, EventBus, Layout,
    LoaderError, PluginManifest, RegistryError, RenderError, Size, Topic, load_all,
};
use scadadraw_elements::{builtin_catalog, default_manifest};
use scadadraw_render::{SvgHost, export_svg};

/// Top-level CLI errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Element(#[from] ElementError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run the CLI: draw the configured scene and write it to `args.output`.
///
/// # Errors
///
/// Returns `AppError` if the configuration or manifest cannot be loaded, a
/// scene item names an unknown kind, an element fails to render, or the
/// output cannot be written.
pub fn run(args: &Args) -> Result<(), AppError> {
    let config = load_config(args.config.as_ref())?;
    let manifest_path = args.manifest.as_ref().map(PathBuf::from).or_else(|| config.manifest.clone());

    let registry = load_registry(manifest_path.as_deref())?;
    let canvas = draw_scene(&registry, &config)?;
    let svg = export_svg(canvas.root())?;

    fs::write(&args.output, svg).map_err(|source| AppError::Write {
        path: PathBuf::from(&args.output),
        source,
    })?;
    info!("SVG exported to {}", args.output);
    Ok(())
}

/// Populate a registry from the manifest at `path`, or from the built-in
/// manifest when no path is given.
pub fn load_registry(path: Option<&Path>) -> Result<ElementRegistry, AppError> {
    let manifest = match path {
        Some(path) => {
            info!("Loading plugin manifest from {}", path.display());
            PluginManifest::from_path(path)?
        }
        None => default_manifest(),
    };
    let mut registry = ElementRegistry::new();
    load_all(&manifest, &builtin_catalog(), &mut registry)?;
    Ok(registry)
}

/// Draw every scene item onto a fresh canvas.
///
/// Style overrides are applied as property mutations and settled by one flush.
pub fn draw_scene(registry: &ElementRegistry, config: &AppConfig) -> Result<Canvas, AppError> {
    let size = Size::of(config.canvas.width, config.canvas.height);
    let mut canvas = Canvas::new(Rc::new(SvgHost::new()), EventBus::new(), size)?;
    draw_items(&mut canvas, registry, &config.scene)?;

    let updated = canvas.flush()?;
    info!("Drew {} elements ({} restyled)", canvas.len(), updated);
    Ok(canvas)
}

/// Add `items` to `canvas`.
///
/// Each item goes through the same path as an interactive session: the panel
/// picks the kind, the drawing box builds the element, the canvas adopts it.
/// The drawing box listens on the canvas bus only while the items are drawn,
/// whether or not drawing succeeds.
pub fn draw_items(canvas: &mut Canvas, registry: &ElementRegistry, items: &[SceneItem]) -> Result<(), AppError> {
    let bus = canvas.bus().clone();
    let drawing_box = Rc::new(RefCell::new(DrawingBox::new(bus.clone())));
    let tool = Rc::clone(&drawing_box);
    let listener = bus.on(Topic::ListPanelSelectItem, move |event| {
        if let BusEvent::ListPanelSelectItem(payload) = event {
            tool.borrow_mut().load_factory(payload.creator.clone());
        }
    });

    let panel = ElementListPanel::new(registry, bus.clone());
    let drawn = items
        .iter()
        .try_for_each(|item| draw_item(canvas, &panel, &drawing_box, item));
    bus.off(listener);
    drawn
}

fn draw_item(
    canvas: &mut Canvas,
    panel: &ElementListPanel,
    drawing_box: &RefCell<DrawingBox>,
    item: &SceneItem,
) -> Result<(), AppError> {
    panel.select_element(&item.kind)?;
    let element = {
        let mut drawing_box = drawing_box.borrow_mut();
        drawing_box.begin_draw();
        drawing_box.finish_draw(canvas.context(), Layout::of(item.layout_spec()), None)?
    };
    if let Some(style) = &item.style {
        element.reactive().mutate(|property| {
            let current = property.style.take().unwrap_or_default();
            property.style = Some(style.clone().merged_over(&current));
        });
    }
    let guid = canvas.add(element)?;
    debug!("Drew {} as {}", item.kind, guid);
    Ok(())
}
