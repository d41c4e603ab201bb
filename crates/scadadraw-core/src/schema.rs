//! Property schemas: which fields of an element are user-editable and how.
//!
//! A schema is an ordered list of groups, each an ordered list of items. Every
//! item carries one control type and a dot-path (`propPath`) into the element's
//! property object. The serde representation is the descriptor consumed by
//! property panels:
//!
//! ```json
//! { "groups": [{ "id": "layout", "label": "Layout", "items": [
//!     { "type": "number", "label": "W", "propPath": "layout.size.width" }
//! ] }] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::property::{ElementProperty, PropertyError, resolve_path};

/// Schema/property mismatches.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema paths do not resolve in `{kind}` property: {paths:?}")]
    UnresolvedPaths { kind: String, paths: Vec<String> },
    #[error("Value of type `{found}` does not fit a `{expected}` item")]
    TypeMismatch { expected: &'static str, found: &'static str },
}

/// One choice of a select item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Control type of a schema item, with its type-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Control {
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        digits: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Color,
    Select {
        options: Vec<SelectOption>,
    },
    Text,
    Boolean,
    Json,
}

impl Control {
    pub fn number() -> Self {
        Control::Number {
            digits: None,
            step: None,
            min: None,
            max: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Control::Number { .. } => "number",
            Control::Color => "color",
            Control::Select { .. } => "select",
            Control::Text => "text",
            Control::Boolean => "boolean",
            Control::Json => "json",
        }
    }

    /// Default value for a freshly created instance.
    ///
    /// # Panics
    ///
    /// A select item without options is a malformed schema and panics.
    pub fn default_value(&self) -> Value {
        match self {
            Control::Number { .. } => Value::from(0),
            Control::Color => Value::from("#000000"),
            Control::Select { options } => {
                assert!(!options.is_empty(), "select item has no options");
                Value::from(options[0].value.clone())
            }
            Control::Text => Value::from(""),
            Control::Boolean => Value::Bool(false),
            Control::Json => Value::Object(Map::new()),
        }
    }
}

/// One editable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaItem {
    pub label: String,
    #[serde(default)]
    pub prop_path: String,
    #[serde(flatten)]
    pub control: Control,
}

impl SchemaItem {
    pub fn new(label: impl Into<String>, prop_path: impl Into<String>, control: Control) -> Self {
        Self {
            label: label.into(),
            prop_path: prop_path.into(),
            control,
        }
    }

    pub fn number(label: impl Into<String>, prop_path: impl Into<String>) -> Self {
        Self::new(label, prop_path, Control::number())
    }

    pub fn color(label: impl Into<String>, prop_path: impl Into<String>) -> Self {
        Self::new(label, prop_path, Control::Color)
    }

    pub fn select(
        label: impl Into<String>,
        prop_path: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(label, prop_path, Control::Select { options })
    }

    pub fn text(label: impl Into<String>, prop_path: impl Into<String>) -> Self {
        Self::new(label, prop_path, Control::Text)
    }

    pub fn boolean(label: impl Into<String>, prop_path: impl Into<String>) -> Self {
        Self::new(label, prop_path, Control::Boolean)
    }

    pub fn json(label: impl Into<String>, prop_path: impl Into<String>) -> Self {
        Self::new(label, prop_path, Control::Json)
    }

    /// Read this item's current value from a property, typed by the control.
    ///
    /// Returns `None` when the path is unset or holds a value of another type.
    pub fn read(&self, property: &ElementProperty) -> Option<SchemaValue> {
        let value = property.value_at(&self.prop_path)?;
        SchemaValue::from_json(&self.control, value).ok()
    }

    /// Write a typed value through this item's path.
    pub fn write(&self, property: &mut ElementProperty, value: SchemaValue) -> Result<(), PropertyError> {
        property.set_value_at(&self.prop_path, value.into_json())
    }
}

/// Titled, ordered group of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub items: Vec<SchemaItem>,
}

impl SchemaGroup {
    pub fn new(id: impl Into<String>, label: impl Into<String>, items: Vec<SchemaItem>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            items,
        }
    }
}

/// Description of the editable fields of one element kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub groups: Vec<SchemaGroup>,
}

impl PropertySchema {
    pub fn new(groups: Vec<SchemaGroup>) -> Self {
        Self { groups }
    }

    /// All items in group order.
    pub fn items(&self) -> impl Iterator<Item = &SchemaItem> {
        self.groups.iter().flat_map(|group| group.items.iter())
    }

    pub fn item(&self, label: &str) -> Option<&SchemaItem> {
        self.items().find(|item| item.label == label)
    }

    /// Paths of items that do not resolve inside `property`.
    pub fn unresolved_paths(&self, property: &ElementProperty) -> Vec<String> {
        let root = match property.to_value() {
            Ok(root) => root,
            Err(_) => return self.items().map(|item| item.prop_path.clone()).collect(),
        };
        self.items()
            .filter(|item| resolve_path(&root, &item.prop_path).is_none())
            .map(|item| item.prop_path.clone())
            .collect()
    }

    /// Fail with [`SchemaError::UnresolvedPaths`] unless every path resolves.
    pub fn check(&self, kind: &str, property: &ElementProperty) -> Result<(), SchemaError> {
        let paths = self.unresolved_paths(property);
        if paths.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::UnresolvedPaths {
                kind: kind.to_string(),
                paths,
            })
        }
    }
}

/// A typed value of one schema item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SchemaValue {
    Number(f64),
    Color(String),
    Select(String),
    Text(String),
    Boolean(bool),
    Json(Value),
}

impl SchemaValue {
    fn from_json(control: &Control, value: Value) -> Result<Self, SchemaError> {
        let found = json_type_name(&value);
        let mismatch = || SchemaError::TypeMismatch {
            expected: control.type_name(),
            found,
        };
        match control {
            Control::Number { .. } => value.as_f64().map(SchemaValue::Number).ok_or_else(mismatch),
            Control::Color => value.as_str().map(|s| SchemaValue::Color(s.to_string())).ok_or_else(mismatch),
            Control::Select { .. } => value.as_str().map(|s| SchemaValue::Select(s.to_string())).ok_or_else(mismatch),
            Control::Text => value.as_str().map(|s| SchemaValue::Text(s.to_string())).ok_or_else(mismatch),
            Control::Boolean => value.as_bool().map(SchemaValue::Boolean).ok_or_else(mismatch),
            Control::Json => Ok(SchemaValue::Json(value)),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            SchemaValue::Number(n) => Value::from(n),
            SchemaValue::Color(s) | SchemaValue::Select(s) | SchemaValue::Text(s) => Value::from(s),
            SchemaValue::Boolean(b) => Value::Bool(b),
            SchemaValue::Json(v) => v,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Flat instance keyed by item label, with type-appropriate defaults:
/// number → 0, color → `#000000`, select → first option, text → `""`,
/// boolean → `false`, json → `{}`.
///
/// # Panics
///
/// Panics on a select item without options.
pub fn default_instance_from_schema(schema: &PropertySchema) -> Map<String, Value> {
    schema
        .items()
        .map(|item| (item.label.clone(), item.control.default_value()))
        .collect()
}

/// Concatenate the groups of several schemas, in argument order.
pub fn prop_views<'a>(views: impl IntoIterator<Item = &'a PropertySchema>) -> PropertySchema {
    PropertySchema {
        groups: views.into_iter().flat_map(|view| view.groups.iter().cloned()).collect(),
    }
}

/// Position, size and rotation.
pub fn layout_schema() -> PropertySchema {
    PropertySchema::new(vec![SchemaGroup::new(
        "layout",
        "Layout",
        vec![
            SchemaItem::number("W", "layout.size.width"),
            SchemaItem::number("H", "layout.size.height"),
            SchemaItem::number("X", "layout.position.x"),
            SchemaItem::number("Y", "layout.position.y"),
            SchemaItem::number("Rotation", "layout.rotation"),
        ],
    )])
}

/// Fill and stroke.
pub fn style_schema() -> PropertySchema {
    PropertySchema::new(vec![SchemaGroup::new(
        "style",
        "Style",
        vec![
            SchemaItem::text("Fill", "style.fill"),
            SchemaItem::text("Stroke", "style.stroke"),
            SchemaItem::number("Stroke Width", "style.strokeWidth"),
        ],
    )])
}

/// Text content and font.
pub fn text_content_schema() -> PropertySchema {
    PropertySchema::new(vec![SchemaGroup::new(
        "text",
        "Text",
        vec![
            SchemaItem::text("Content", "style.content.text"),
            SchemaItem::number("Font Size", "style.fontSize"),
            SchemaItem::text("Font Family", "style.fontFamily"),
            SchemaItem::text("Font Weight", "style.fontWeight"),
        ],
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Layout, LayoutSpec};
    use crate::property::Style;
    use serde_json::json;

    #[test]
    fn test_default_instance_number_and_boolean() {
        let schema: PropertySchema = serde_json::from_value(json!({
            "groups": [{ "items": [
                { "type": "number", "label": "W" },
                { "type": "boolean", "label": "On" }
            ] }]
        }))
        .unwrap();

        let instance = default_instance_from_schema(&schema);
        assert_eq!(Value::Object(instance), json!({ "W": 0, "On": false }));
    }

    #[test]
    fn test_default_instance_all_types() {
        let schema = PropertySchema::new(vec![SchemaGroup::new(
            "all",
            "All",
            vec![
                SchemaItem::number("n", "a"),
                SchemaItem::color("c", "b"),
                SchemaItem::select(
                    "s",
                    "c",
                    vec![SelectOption::new("Solid", "solid"), SelectOption::new("Dashed", "dashed")],
                ),
                SchemaItem::text("t", "d"),
                SchemaItem::boolean("b", "e"),
                SchemaItem::json("j", "f"),
            ],
        )]);

        let instance = default_instance_from_schema(&schema);
        assert_eq!(
            Value::Object(instance),
            json!({ "n": 0, "c": "#000000", "s": "solid", "t": "", "b": false, "j": {} })
        );
    }

    #[test]
    fn test_default_instance_keys_by_label_not_path() {
        let instance = default_instance_from_schema(&layout_schema());
        assert!(instance.contains_key("W"));
        assert!(!instance.contains_key("layout.size.width"));
    }

    #[test]
    #[should_panic(expected = "no options")]
    fn test_select_without_options_panics() {
        let schema = PropertySchema::new(vec![SchemaGroup::new(
            "g",
            "G",
            vec![SchemaItem::select("s", "x", Vec::new())],
        )]);
        default_instance_from_schema(&schema);
    }

    #[test]
    fn test_prop_views_concatenates_in_order() {
        let combined = prop_views([&layout_schema(), &style_schema(), &text_content_schema()]);
        let ids: Vec<_> = combined.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["layout", "style", "text"]);
        assert_eq!(combined.groups[1], style_schema().groups[0]);
    }

    #[test]
    fn test_descriptor_round_trip_shape() {
        let value = serde_json::to_value(style_schema()).unwrap();
        let item = &value["groups"][0]["items"][2];
        assert_eq!(item["type"], "number");
        assert_eq!(item["propPath"], "style.strokeWidth");
        assert_eq!(item["label"], "Stroke Width");

        let parsed: PropertySchema = serde_json::from_value(json!({
            "groups": [{ "id": "x", "label": "X", "items": [
                { "type": "number", "label": "Size", "propPath": "style.fontSize", "min": 1, "max": 96, "step": 1 },
                { "type": "select", "label": "Cap", "propPath": "style.strokeLinecap",
                  "options": [{ "label": "Butt", "value": "butt" }] }
            ] }]
        }))
        .unwrap();
        assert_eq!(
            parsed.groups[0].items[0].control,
            Control::Number { digits: None, step: Some(1.0), min: Some(1.0), max: Some(96.0) }
        );
    }

    #[test]
    fn test_unresolved_paths() {
        let prop = ElementProperty::new(Layout::of(LayoutSpec::new(0.0, 0.0, 1.0, 1.0)));
        assert!(layout_schema().unresolved_paths(&prop).is_empty());
        assert_eq!(
            style_schema().unresolved_paths(&prop),
            vec!["style.fill", "style.stroke", "style.strokeWidth"]
        );

        let styled = prop.with_style_defaults(&Style::fill_stroke_defaults());
        assert!(style_schema().check("rect", &styled).is_ok());
        assert!(matches!(
            text_content_schema().check("rect", &styled),
            Err(SchemaError::UnresolvedPaths { .. })
        ));
    }

    #[test]
    fn test_item_read_and_write() {
        let mut prop = ElementProperty::new(Layout::zero()).with_style_defaults(&Style::fill_stroke_defaults());
        let schema = prop_views([&layout_schema(), &style_schema()]);

        let width = schema.item("W").unwrap();
        width.write(&mut prop, SchemaValue::Number(25.0)).unwrap();
        assert_eq!(width.read(&prop), Some(SchemaValue::Number(25.0)));
        assert_eq!(prop.layout.size().width(), 25.0);

        let fill = schema.item("Fill").unwrap();
        assert_eq!(fill.read(&prop), Some(SchemaValue::Text("yellow".to_string())));
        fill.write(&mut prop, SchemaValue::Text("#ff0000".to_string())).unwrap();
        assert_eq!(prop.style().unwrap().fill.as_deref(), Some("#ff0000"));
    }
}
