//! Basic vector shapes: circle, rect, line and text.

use scadadraw_core::schema::{layout_schema, style_schema, text_content_schema};
use scadadraw_core::{
    ClickCallback, DrawingElement, ElementContext, ElementCore, ElementDescriptor, ElementProperty,
    ElementRegistry, ElementResult, FactoryRef, Position, PropertySchema, RenderResult, RenderTarget, Style,
    TextContent, apply_vector_style, format_number, mount, prop_views,
};

fn shape_schema() -> PropertySchema {
    prop_views([&layout_schema(), &style_schema()])
}

fn set_number(target: &dyn RenderTarget, name: &str, value: f64) -> RenderResult<()> {
    target.set_attribute(name, &format_number(name, value)?)
}

fn set_or_remove(target: &dyn RenderTarget, name: &str, value: Option<&str>) -> RenderResult<()> {
    match value {
        Some(value) => target.set_attribute(name, value),
        None => target.remove_attribute(name),
    }
}

/// Ellipse inscribed in the layout box.
#[derive(Debug)]
pub struct Circle {
    core: ElementCore,
}

impl Circle {
    pub const KIND: &'static str = "circle";

    pub fn new(ctx: &ElementContext, property: ElementProperty, on_click: Option<ClickCallback>) -> ElementResult<Self> {
        let property = property.with_style_defaults(&Style::fill_stroke_defaults());
        let core = ElementCore::new(Self::KIND, property, shape_schema(), "ellipse", ctx, on_click)?;
        mount(Self { core })
    }
}

impl DrawingElement for Circle {
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
        let rx = layout.size().width() / 2.0;
        let ry = layout.size().height() / 2.0;
        set_number(target, "cx", layout.position().x() + rx)?;
        set_number(target, "cy", layout.position().y() + ry)?;
        set_number(target, "rx", rx)?;
        set_number(target, "ry", ry)?;
        apply_vector_style(target, &property, self.core.is_selected())
    }
}

/// Axis-aligned rectangle.
#[derive(Debug)]
pub struct Rect {
    core: ElementCore,
}

impl Rect {
    pub const KIND: &'static str = "rect";

    pub fn new(ctx: &ElementContext, property: ElementProperty, on_click: Option<ClickCallback>) -> ElementResult<Self> {
        let property = property.with_style_defaults(&Style::fill_stroke_defaults());
        let core = ElementCore::new(Self::KIND, property, shape_schema(), "rect", ctx, on_click)?;
        mount(Self { core })
    }
}

impl DrawingElement for Rect {
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
        set_number(target, "x", layout.position().x())?;
        set_number(target, "y", layout.position().y())?;
        set_number(target, "width", layout.size().width())?;
        set_number(target, "height", layout.size().height())?;
        apply_vector_style(target, &property, self.core.is_selected())
    }
}

/// Segment from the layout's top-left to its bottom-right corner.
#[derive(Debug)]
pub struct Line {
    core: ElementCore,
}

impl Line {
    pub const KIND: &'static str = "line";

    pub fn new(ctx: &ElementContext, property: ElementProperty, on_click: Option<ClickCallback>) -> ElementResult<Self> {
        let property = property.with_style_defaults(&Style::fill_stroke_defaults());
        let core = ElementCore::new(Self::KIND, property, shape_schema(), "line", ctx, on_click)?;
        mount(Self { core })
    }
}

impl DrawingElement for Line {
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
        let end = layout
            .position()
            .add(Position::of(layout.size().width(), layout.size().height()));
        set_number(target, "x1", layout.position().x())?;
        set_number(target, "y1", layout.position().y())?;
        set_number(target, "x2", end.x())?;
        set_number(target, "y2", end.y())?;
        apply_vector_style(target, &property, self.core.is_selected())
    }
}

/// Single-line text anchored at its top-left corner.
#[derive(Debug)]
pub struct Text {
    core: ElementCore,
}

impl Text {
    pub const KIND: &'static str = "text";

    /// Font and content defaults layered over the fill/stroke defaults.
    pub fn style_defaults() -> Style {
        Style {
            font_size: Some(14.0),
            font_family: Some("Arial".to_string()),
            content: Some(TextContent::default()),
            ..Style::font_defaults()
        }
        .merged_over(&Style::fill_stroke_defaults())
    }

    pub fn new(ctx: &ElementContext, property: ElementProperty, on_click: Option<ClickCallback>) -> ElementResult<Self> {
        let property = property.with_style_defaults(&Self::style_defaults());
        let schema = prop_views([&layout_schema(), &style_schema(), &text_content_schema()]);
        let core = ElementCore::new(Self::KIND, property, schema, "text", ctx, on_click)?;
        core.target().set_attribute("dominant-baseline", "hanging")?;
        mount(Self { core })
    }
}

impl DrawingElement for Text {
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
        set_number(target, "x", layout.position().x())?;
        set_number(target, "y", layout.position().y())?;
        let style = property.style();
        match style.and_then(|s| s.font_size) {
            Some(size) => set_number(target, "font-size", size)?,
            None => target.remove_attribute("font-size")?,
        }
        set_or_remove(target, "font-family", style.and_then(|s| s.font_family.as_deref()))?;
        set_or_remove(target, "font-weight", style.and_then(|s| s.font_weight.as_deref()))?;
        let text = style
            .and_then(|s| s.content.as_ref())
            .map(|c| c.text.as_str())
            .unwrap_or_default();
        target.set_text(text)?;
        apply_vector_style(target, &property, self.core.is_selected())
    }
}

fn create_circle(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<Box<dyn DrawingElement>> {
    Ok(Box::new(Circle::new(ctx, property, on_click)?))
}

fn create_rect(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<Box<dyn DrawingElement>> {
    Ok(Box::new(Rect::new(ctx, property, on_click)?))
}

fn create_line(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<Box<dyn DrawingElement>> {
    Ok(Box::new(Line::new(ctx, property, on_click)?))
}

fn create_text(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<Box<dyn DrawingElement>> {
    Ok(Box::new(Text::new(ctx, property, on_click)?))
}

const CIRCLE_ICON: &str = r#"<svg height="14" width="14" xmlns="http://www.w3.org/2000/svg"><circle r="6" cx="7" cy="7" stroke="black" stroke-width="1" fill="none"/></svg>"#;
const RECT_ICON: &str = r#"<svg height="14" width="14" xmlns="http://www.w3.org/2000/svg"><rect x="1" y="3" width="12" height="8" stroke="black" stroke-width="1" fill="none"/></svg>"#;
const LINE_ICON: &str = r#"<svg height="14" width="14" xmlns="http://www.w3.org/2000/svg"><line x1="1" y1="13" x2="13" y2="1" stroke="black" stroke-width="1"/></svg>"#;

/// Register circle, rect, line and text.
pub fn register(registry: &mut ElementRegistry) {
    registry.register(
        Circle::KIND,
        ElementDescriptor::new("Circle").with_icon(CIRCLE_ICON),
        FactoryRef::from_fn(create_circle),
    );
    registry.register(
        Rect::KIND,
        ElementDescriptor::new("Rect").with_icon(RECT_ICON),
        FactoryRef::from_fn(create_rect),
    );
    registry.register(
        Line::KIND,
        ElementDescriptor::new("Line").with_icon(LINE_ICON),
        FactoryRef::from_fn(create_line),
    );
    registry.register(Text::KIND, ElementDescriptor::new("Text"), FactoryRef::from_fn(create_text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use scadadraw_core::{EventBus, Layout, LayoutSpec, RenderError};
    use scadadraw_render::{SvgHost, SvgNode};
    use std::rc::Rc;

    fn ctx() -> ElementContext {
        ElementContext::new(Rc::new(SvgHost::new()), EventBus::new())
    }

    fn node(element: &dyn DrawingElement) -> SvgNode {
        element.target().as_any().downcast_ref::<SvgNode>().unwrap().clone()
    }

    fn prop(x: f64, y: f64, w: f64, h: f64) -> ElementProperty {
        ElementProperty::new(Layout::of(LayoutSpec::new(x, y, w, h)))
    }

    #[test]
    fn test_circle_attributes() {
        let circle = Circle::new(&ctx(), prop(10.0, 20.0, 40.0, 30.0), None).unwrap();
        let node = node(&circle);
        assert_eq!(node.tag(), "ellipse");
        assert_eq!(node.attribute("cx").as_deref(), Some("30"));
        assert_eq!(node.attribute("cy").as_deref(), Some("35"));
        assert_eq!(node.attribute("rx").as_deref(), Some("20"));
        assert_eq!(node.attribute("ry").as_deref(), Some("15"));
        assert_eq!(node.attribute("fill").as_deref(), Some("yellow"));
        assert_eq!(node.attribute("stroke").as_deref(), Some("gray"));
        assert_eq!(node.attribute("transform").as_deref(), Some("rotate(0 10 20)"));
    }

    #[test]
    fn test_rect_keeps_caller_style() {
        let property = prop(1.0, 2.0, 3.0, 4.0).with_style(Style {
            fill: Some("red".to_string()),
            ..Style::default()
        });
        let rect = Rect::new(&ctx(), property, None).unwrap();
        let node = node(&rect);
        for (name, value) in [
            ("x", "1"),
            ("y", "2"),
            ("width", "3"),
            ("height", "4"),
            ("fill", "red"),
            ("stroke", "gray"),
            ("stroke-width", "1"),
            ("stroke-linecap", "butt"),
            ("stroke-linejoin", "miter"),
            ("transform", "rotate(0 1 2)"),
        ] {
            assert_eq!(node.attribute(name).as_deref(), Some(value), "{}", name);
        }
        assert_eq!(node.attribute("stroke-dasharray"), None);
    }

    #[test]
    fn test_cleared_dasharray_is_removed() {
        let property = prop(0.0, 0.0, 10.0, 0.0).with_style(Style {
            stroke_dasharray: Some("5,5".to_string()),
            ..Style::default()
        });
        let mut line = Line::new(&ctx(), property, None).unwrap();
        let node = node(&line);
        assert_eq!(node.attribute("stroke-dasharray").as_deref(), Some("5,5"));

        line.reactive().mutate(|p| {
            p.style_mut().stroke_dasharray = Some(String::new());
        });
        assert!(line.settle().unwrap());
        assert_eq!(node.attribute("stroke-dasharray"), None);

        line.reactive().mutate(|p| {
            p.style_mut().stroke_linecap = None;
        });
        assert!(line.settle().unwrap());
        assert_eq!(node.attribute("stroke-linecap"), None);
        assert!(!node.to_svg().contains("stroke-linecap"));
    }

    #[test]
    fn test_text_style_reset_clears_content_and_font() {
        let property = prop(0.0, 0.0, 100.0, 20.0).with_style(Style {
            content: Some(TextContent {
                text: "Tank".to_string(),
            }),
            ..Style::default()
        });
        let mut text = Text::new(&ctx(), property, None).unwrap();
        let node = node(&text);
        assert_eq!(node.text(), "Tank");

        text.reactive().mutate(|p| p.style = None);
        assert!(text.settle().unwrap());
        assert_eq!(node.text(), "");
        assert_eq!(node.attribute("font-size"), None);
        assert_eq!(node.attribute("font-family"), None);
        assert_eq!(node.attribute("font-weight"), None);
        assert_eq!(node.attribute("fill").as_deref(), Some("none"));
    }

    #[test]
    fn test_infinite_size_is_rejected() {
        let mut rect = Rect::new(&ctx(), prop(0.0, 0.0, 1.0, 1.0), None).unwrap();
        rect.reactive().mutate(|p| {
            p.layout.size_mut().set(f64::INFINITY, 1.0);
        });
        let err = rect.settle().unwrap_err();
        assert!(matches!(err, RenderError::InvalidAttribute { name, .. } if name == "width"));
    }

    #[test]
    fn test_line_endpoints_follow_layout() {
        let line = Line::new(&ctx(), prop(5.0, 5.0, 10.0, -5.0), None).unwrap();
        let node = node(&line);
        assert_eq!(node.attribute("x2").as_deref(), Some("15"));
        assert_eq!(node.attribute("y2").as_deref(), Some("0"));
    }

    #[test]
    fn test_text_content_and_font() {
        let property = prop(0.0, 0.0, 100.0, 20.0).with_style(Style {
            content: Some(TextContent {
                text: "Tank level".to_string(),
            }),
            ..Style::default()
        });
        let mut text = Text::new(&ctx(), property, None).unwrap();
        let node = node(&text);
        assert_eq!(node.text(), "Tank level");
        assert_eq!(node.attribute("font-size").as_deref(), Some("14"));
        assert_eq!(node.attribute("font-family").as_deref(), Some("Arial"));
        assert_eq!(node.attribute("font-weight").as_deref(), Some("normal"));
        assert_eq!(node.attribute("dominant-baseline").as_deref(), Some("hanging"));

        text.reactive().mutate(|p| {
            p.style_mut().content = Some(TextContent {
                text: "Pressure".to_string(),
            });
            p.style_mut().font_size = Some(18.0);
        });
        assert!(text.settle().unwrap());
        assert_eq!(node.text(), "Pressure");
        assert_eq!(node.attribute("font-size").as_deref(), Some("18"));
    }

    #[test]
    fn test_selection_border() {
        let mut rect = Rect::new(&ctx(), prop(0.0, 0.0, 1.0, 1.0), None).unwrap();
        let node = node(&rect);
        rect.select().unwrap();
        assert_eq!(node.style("border").as_deref(), Some("solid 1px blue"));
        rect.unselect().unwrap();
        assert_eq!(node.style("border"), None);
    }

    #[test]
    fn test_register_adds_four_kinds() {
        let mut registry = ElementRegistry::new();
        register(&mut registry);
        assert_eq!(registry.len(), 4);
        assert!(registry.meta("circle").unwrap().icon.is_some());
        assert_eq!(registry.meta("text").unwrap().label, "Text");

        let element = registry.create("line", &ctx(), prop(0.0, 0.0, 1.0, 1.0), None).unwrap();
        assert_eq!(element.kind(), "line");
        assert_eq!(element.target().tag(), "line");
    }
}
