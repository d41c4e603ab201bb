//! Chart kinds hosted in a `foreignObject`.
//!
//! The chart itself is drawn by whatever charting library the host embeds.
//! Here a [`ChartWidget`] only hands its option document and current size to
//! the container as `data-*` attributes.

use scadadraw_core::schema::layout_schema;
use scadadraw_core::{
    ClickCallback, DrawingElement, ElementContext, ElementDescriptor, ElementProperty, ElementRegistry,
    ElementResult, FactoryRef, ForeignElement, ForeignWidget, RenderResult, RenderTarget, Size, format_number,
};
use serde_json::{Value, json};

pub const BAR_CHART: &str = "echarts-bar-chart";
pub const LINE_CHART: &str = "echarts-line-chart";

/// Option document plus the size it was last fitted to.
pub struct ChartWidget {
    content: Box<dyn RenderTarget>,
    option: Value,
    size: Size,
}

impl ChartWidget {
    /// Attach `option` to the `content` container.
    pub fn new(content: &dyn RenderTarget, option: Value) -> RenderResult<Self> {
        content.set_attribute("data-option", &option.to_string())?;
        Ok(Self {
            content: content.clone_handle(),
            option,
            size: Size::zero(),
        })
    }

    pub fn option(&self) -> &Value {
        &self.option
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

impl ForeignWidget for ChartWidget {
    fn resize(&mut self, size: Size) -> RenderResult<()> {
        self.content.set_attribute("data-width", &format_number("data-width", size.width())?)?;
        self.content.set_attribute("data-height", &format_number("data-height", size.height())?)?;
        self.size = size;
        Ok(())
    }
}

fn chart(
    kind: &'static str,
    option: Value,
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<ForeignElement> {
    log::debug!("Building {} chart", kind);
    ForeignElement::new(kind, property, layout_schema(), ctx, on_click, move |content| {
        Ok(Box::new(ChartWidget::new(content, option)?) as Box<dyn ForeignWidget>)
    })
}

fn bar_option() -> Value {
    let data = [
        220, 182, 191, 234, 290, 330, 310, 123, 442, 321, 90, 149, 210, 122, 133, 334, 198, 123, 125, 220,
    ];
    let axis: Vec<String> = (1..=data.len()).map(|i| i.to_string()).collect();
    json!({
        "grid": { "top": "0px", "left": "0px", "right": "0px", "bottom": "0px" },
        "xAxis": {
            "data": axis,
            "axisLabel": { "inside": true, "color": "#fff" },
            "axisTick": { "show": false },
            "axisLine": { "show": false },
            "z": 10
        },
        "yAxis": {
            "axisLine": { "show": false },
            "axisTick": { "show": false },
            "axisLabel": { "color": "#999" }
        },
        "dataZoom": [{ "type": "inside" }],
        "series": [{
            "type": "bar",
            "showBackground": true,
            "itemStyle": { "color": "#188df0" },
            "data": data
        }]
    })
}

fn line_option() -> Value {
    json!({
        "grid": { "top": "0px", "left": "0px", "right": "0px", "bottom": "0px" },
        "xAxis": { "type": "category", "boundaryGap": false },
        "yAxis": { "type": "value", "boundaryGap": [0, "30%"] },
        "series": [{
            "type": "line",
            "smooth": 0.6,
            "symbol": "none",
            "lineStyle": { "color": "#5470C6", "width": 5 },
            "areaStyle": {},
            "data": [
                ["2019-10-10", 200],
                ["2019-10-11", 560],
                ["2019-10-12", 750],
                ["2019-10-13", 580],
                ["2019-10-14", 250],
                ["2019-10-15", 300],
                ["2019-10-16", 450],
                ["2019-10-17", 300],
                ["2019-10-18", 100]
            ]
        }]
    })
}

/// Bar chart with a sample series.
pub fn bar_chart(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<ForeignElement> {
    chart(BAR_CHART, bar_option(), ctx, property, on_click)
}

/// Smoothed line chart with a sample series.
pub fn line_chart(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<ForeignElement> {
    chart(LINE_CHART, line_option(), ctx, property, on_click)
}

const BAR_ICON: &str = r##"<svg width="14" height="14" viewBox="0 0 48 48" fill="none" xmlns="http://www.w3.org/2000/svg"><path d="M6 6V42H42M14 30V34M22 22V34M30 6V34M38 14V34" stroke="#333" stroke-width="4" stroke-linecap="round" stroke-linejoin="round"/></svg>"##;
const LINE_ICON: &str = r##"<svg width="14" height="14" viewBox="0 0 48 48" fill="none" xmlns="http://www.w3.org/2000/svg"><path d="M6 6V42H42M14 34L22 18L32 27L42 6" stroke="#333" stroke-width="4" stroke-linecap="round" stroke-linejoin="round"/></svg>"##;

fn create_bar_chart(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<Box<dyn DrawingElement>> {
    Ok(Box::new(bar_chart(ctx, property, on_click)?))
}

fn create_line_chart(
    ctx: &ElementContext,
    property: ElementProperty,
    on_click: Option<ClickCallback>,
) -> ElementResult<Box<dyn DrawingElement>> {
    Ok(Box::new(line_chart(ctx, property, on_click)?))
}

/// Register the bar and line charts.
pub fn register(registry: &mut ElementRegistry) {
    registry.register(
        BAR_CHART,
        ElementDescriptor::new("Bar Chart").with_icon(BAR_ICON),
        FactoryRef::from_fn(create_bar_chart),
    );
    registry.register(
        LINE_CHART,
        ElementDescriptor::new("Line Chart").with_icon(LINE_ICON),
        FactoryRef::from_fn(create_line_chart),
    );
}
