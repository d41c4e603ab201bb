//! Basic input controls.

use scadadraw_core::schema::{layout_schema, style_schema};
use scadadraw_core::{
    ClickCallback, DrawingElement, ElementContext, ElementCore, ElementDescriptor, ElementProperty,
    ElementRegistry, ElementResult, FactoryRef, RenderResult, Style, format_number, mount, prop_views,
};

/// Input field placeholder drawn as an underline across the layout box.
#[derive(Debug)]
pub struct Input {
    core: ElementCore,
}

impl Input {
    pub const KIND: &'static str = "input";

    pub fn new(ctx: &ElementContext, property: ElementProperty, on_click: Option<ClickCallback>) -> ElementResult<Self> {
        let property = property.with_style_defaults(&Style::fill_stroke_defaults());
        let schema = prop_views([&layout_schema(), &style_schema()]);
        let core = ElementCore::new(Self::KIND, property, schema, "line", ctx, on_click)?;
        mount(Self { core })
    }
}

impl DrawingElement for Input {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn update(&mut self) -> RenderResult<()> {
        let property = self.core.property();
        let layout = &property.layout;
        let target = self.core.target();
        let (x, y) = (layout.position().x(), layout.position().y());
        target.set_attribute("x1", &format_number("x1", x)?)?;
        target.set_attribute("y1", &format_number("y1", y)?)?;
        target.set_attribute("x2", &format_number("x2", x + layout.size().width())?)?;
        target.set_attribute("y2", &format_number("y2", y + layout.size().height())?)?;

        let style = property.style();
        target.set_attribute("stroke", style.and_then(|s| s.stroke.as_deref()).unwrap_or("none"))?;
        let stroke_width = style.and_then(|s| s.stroke_width).unwrap_or(0.0);
        target.set_attribute("stroke-width", &format_number("stroke-width", stroke_width)?)?;
        target.set_style("border", if self.core.is_selected() { "solid 1px blue" } else { "" })
    }
}

const INPUT_ICON: &str = r##"<svg viewBox="0 0 1024 1024" width="14" height="14"><path d="M341 213h128v597H341v85h341v-85H555V213h128V128H341v85zM85 299a43 43 0 0 0-43 43v341a43 43 0 0 0 43 43h256v-85H128V384h213V299H85zm597 85h213v256H683v85h256a43 43 0 0 0 43-43V341a43 43 0 0 0-43-43H683v85z" fill="#000000"/></svg>"##;

fn create_input(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<Box<dyn DrawingElement>> {
    Ok(Box::new(Input::new(ctx, property, on_click)?))
}

/// Register the input control.
pub fn register(registry: &mut ElementRegistry) {
    registry.register(
        Input::KIND,
        ElementDescriptor::new("Input").with_icon(INPUT_ICON),
        FactoryRef::from_fn(create_input),
    );
}
