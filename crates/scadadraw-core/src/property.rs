//! Element property data: the mutable state an element renders from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::geometry::{Layout, Position, Size};

/// Errors raised when reading or writing a property by dot-path.
#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("Property path `{0}` does not resolve")]
    UnresolvedPath(String),
    #[error("Invalid value for `{path}`: {source}")]
    InvalidValue {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Text payload of text-like elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

/// Sparse union of font, fill/stroke and transform styling.
///
/// Every field is optional; element kinds merge their own defaults underneath
/// whatever the caller supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_linecap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_linejoin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TextContent>,
}

impl Style {
    /// Default font settings.
    pub fn font_defaults() -> Self {
        Self {
            font_size: Some(12.0),
            font_weight: Some("normal".to_string()),
            font_family: Some("Arial".to_string()),
            ..Self::default()
        }
    }

    /// Default fill and stroke settings.
    pub fn fill_stroke_defaults() -> Self {
        Self {
            fill: Some("yellow".to_string()),
            stroke: Some("gray".to_string()),
            stroke_width: Some(1.0),
            stroke_linecap: Some("butt".to_string()),
            stroke_linejoin: Some("miter".to_string()),
            stroke_dasharray: Some(String::new()),
            ..Self::default()
        }
    }

    /// Identity transform.
    pub fn transform_defaults() -> Self {
        Self {
            translate: Some(Position::zero()),
            scale: Some(Size::one()),
            ..Self::default()
        }
    }

    /// Fill every unset field from `defaults`. Fields already set win.
    pub fn merged_over(self, defaults: &Style) -> Style {
        Style {
            font_size: self.font_size.or(defaults.font_size),
            font_weight: self.font_weight.or_else(|| defaults.font_weight.clone()),
            font_family: self.font_family.or_else(|| defaults.font_family.clone()),
            fill: self.fill.or_else(|| defaults.fill.clone()),
            stroke: self.stroke.or_else(|| defaults.stroke.clone()),
            stroke_width: self.stroke_width.or(defaults.stroke_width),
            stroke_linecap: self.stroke_linecap.or_else(|| defaults.stroke_linecap.clone()),
            stroke_linejoin: self.stroke_linejoin.or_else(|| defaults.stroke_linejoin.clone()),
            stroke_dasharray: self.stroke_dasharray.or_else(|| defaults.stroke_dasharray.clone()),
            translate: self.translate.or(defaults.translate),
            scale: self.scale.or(defaults.scale),
            content: self.content.or_else(|| defaults.content.clone()),
        }
    }
}

/// Editable state of one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementProperty {
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl ElementProperty {
    pub fn new(layout: Layout) -> Self {
        Self { layout, style: None }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Merge kind defaults underneath the current style.
    pub fn with_style_defaults(mut self, defaults: &Style) -> Self {
        let style = self.style.take().unwrap_or_default();
        self.style = Some(style.merged_over(defaults));
        self
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    /// Mutable style, created empty if absent.
    pub fn style_mut(&mut self) -> &mut Style {
        self.style.get_or_insert_with(Style::default)
    }

    pub fn to_value(&self) -> Result<Value, PropertyError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Read the value at a dot-path such as `layout.size.width`.
    pub fn value_at(&self, path: &str) -> Option<Value> {
        let root = self.to_value().ok()?;
        resolve_path(&root, path).cloned()
    }

    /// Write the value at a dot-path.
    ///
    /// The parent of the last segment must exist; the leaf may be missing,
    /// which is how unset optional style fields get filled in. A leaf the
    /// property has no field for is rejected. Writing `null` clears an
    /// optional field.
    pub fn set_value_at(&mut self, path: &str, value: Value) -> Result<(), PropertyError> {
        let clears = value.is_null();
        let mut root = self.to_value()?;
        let (parent_path, leaf) = match path.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, path),
        };
        let parent = match parent_path {
            Some(parent) => resolve_path_mut(&mut root, parent),
            None => Some(&mut root),
        };
        let Some(Value::Object(parent)) = parent else {
            return Err(PropertyError::UnresolvedPath(path.to_string()));
        };
        parent.insert(leaf.to_string(), value);

        let updated: Self = serde_json::from_value(root).map_err(|source| PropertyError::InvalidValue {
            path: path.to_string(),
            source,
        })?;
        if !clears && resolve_path(&updated.to_value()?, path).is_none() {
            return Err(PropertyError::UnresolvedPath(path.to_string()));
        }
        *self = updated;
        Ok(())
    }
}

pub(crate) fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |value, segment| value.as_object()?.get(segment))
}

fn resolve_path_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.')
        .try_fold(root, |value, segment| value.as_object_mut()?.get_mut(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LayoutSpec;
    use serde_json::json;

    fn sample() -> ElementProperty {
        ElementProperty::new(Layout::of(LayoutSpec::new(0.0, 0.0, 10.0, 10.0))).with_style(Style {
            fill: Some("red".to_string()),
            stroke: Some("black".to_string()),
            stroke_width: Some(1.0),
            ..Style::default()
        })
    }

    #[test]
    fn test_merge_keeps_caller_values() {
        let prop = sample().with_style_defaults(&Style::fill_stroke_defaults());
        let style = prop.style().unwrap();
        assert_eq!(style.fill.as_deref(), Some("red"));
        assert_eq!(style.stroke_linecap.as_deref(), Some("butt"));
        assert_eq!(style.font_size, None);
    }

    #[test]
    fn test_merge_without_style() {
        let prop = ElementProperty::default().with_style_defaults(&Style::font_defaults());
        assert_eq!(prop.style().unwrap().font_family.as_deref(), Some("Arial"));
    }

    #[test]
    fn test_value_at() {
        let prop = sample();
        assert_eq!(prop.value_at("layout.size.width"), Some(json!(10.0)));
        assert_eq!(prop.value_at("style.fill"), Some(json!("red")));
        assert_eq!(prop.value_at("style.fontSize"), None);
        assert_eq!(prop.value_at("layout.nope"), None);
    }

    #[test]
    fn test_set_value_at() {
        let mut prop = sample();
        prop.set_value_at("layout.position.x", json!(42.0)).unwrap();
        assert_eq!(prop.layout.position().x(), 42.0);

        // Unset optional leaf gets created.
        prop.set_value_at("style.fontSize", json!(18)).unwrap();
        assert_eq!(prop.style().unwrap().font_size, Some(18.0));
    }

    #[test]
    fn test_set_value_at_rejects_bad_input() {
        let mut prop = sample();
        let err = prop.set_value_at("layout.size.width", json!("wide")).unwrap_err();
        assert!(matches!(err, PropertyError::InvalidValue { .. }));
        // Failed writes leave the property untouched.
        assert_eq!(prop.layout.size().width(), 10.0);

        let err = prop.set_value_at("style.content.text", json!("hi")).unwrap_err();
        assert!(matches!(err, PropertyError::UnresolvedPath(_)));
    }

    #[test]
    fn test_set_value_at_rejects_unknown_leaf() {
        let mut prop = sample();
        let before = prop.clone();
        let err = prop.set_value_at("layout.size.widht", json!(99.0)).unwrap_err();
        assert!(matches!(err, PropertyError::UnresolvedPath(path) if path == "layout.size.widht"));
        assert_eq!(prop, before);

        let err = prop.set_value_at("style.fontSzie", json!(12)).unwrap_err();
        assert!(matches!(err, PropertyError::UnresolvedPath(_)));
        assert_eq!(prop, before);
    }

    #[test]
    fn test_set_value_at_null_clears_optional_leaf() {
        let mut prop = sample();
        prop.set_value_at("style.fill", json!("red")).unwrap();
        assert_eq!(prop.style().unwrap().fill.as_deref(), Some("red"));
        prop.set_value_at("style.fill", Value::Null).unwrap();
        assert_eq!(prop.style().unwrap().fill, None);
    }
}
