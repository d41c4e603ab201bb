//! Geometry value types: positions, sizes and element layouts.
//!
//! Values are only built through the static factories (`of`, `zero`, `one`).
//! `set` mutates in place and hands back the same value so property observers
//! keep watching one object; everything else is pure.

use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::math::deg_to_rad;

/// A point on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f64,
    y: f64,
}

#[allow(clippy::should_implement_trait)]
impl Position {
    pub fn of(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::of(0.0, 0.0)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Overwrite both coordinates in place.
    pub fn set(&mut self, x: f64, y: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn add(&self, other: Position) -> Position {
        Position::of(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: Position) -> Position {
        Position::of(self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: Position) -> f64 {
        Point::from(*self).distance(Point::from(other))
    }
}

impl From<Position> for Point {
    fn from(position: Position) -> Self {
        Point::new(position.x, position.y)
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Position::of(point.x, point.y)
    }
}

/// A 2D extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

#[allow(clippy::should_implement_trait)]
impl Size {
    pub fn of(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::of(0.0, 0.0)
    }

    pub fn one() -> Self {
        Self::of(1.0, 1.0)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Overwrite both dimensions in place.
    pub fn set(&mut self, width: f64, height: f64) -> &mut Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn add(&self, other: Size) -> Size {
        Size::of(self.width + other.width, self.height + other.height)
    }

    pub fn subtract(&self, other: Size) -> Size {
        Size::of(self.width - other.width, self.height - other.height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl From<Size> for kurbo::Size {
    fn from(size: Size) -> Self {
        kurbo::Size::new(size.width, size.height)
    }
}

impl From<kurbo::Size> for Size {
    fn from(size: kurbo::Size) -> Self {
        Size::of(size.width, size.height)
    }
}

/// Arguments for [`Layout::of`]. Rotation and z-index fall back to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutSpec {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: Option<f64>,
    pub z_index: Option<i32>,
}

impl LayoutSpec {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: None,
            z_index: None,
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }
}

/// Placement of an element: top-left position, size, rotation in degrees
/// (about the position) and stacking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    position: Position,
    size: Size,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    z_index: i32,
}

impl Layout {
    pub fn of(spec: LayoutSpec) -> Self {
        Self {
            position: Position::of(spec.x, spec.y),
            size: Size::of(spec.width, spec.height),
            rotation: spec.rotation.unwrap_or(0.0),
            z_index: spec.z_index.unwrap_or(0),
        }
    }

    pub fn zero() -> Self {
        Self::of(LayoutSpec::default())
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn size_mut(&mut self) -> &mut Size {
        &mut self.size
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) -> &mut Self {
        self.rotation = degrees;
        self
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn set_z_index(&mut self, z_index: i32) -> &mut Self {
        self.z_index = z_index;
        self
    }

    /// Move and resize in place. Rotation and z-index are left alone.
    pub fn set(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.position.set(x, y);
        self.size.set(width, height);
        self
    }

    /// Copy position and size into fresh values.
    ///
    /// Rotation and z-index are reset to 0 on the copy: a duplicated element
    /// starts upright at the bottom of the stack. Use `Clone` for a full copy.
    pub fn duplicate(&self) -> Layout {
        Layout {
            position: Position::of(self.position.x, self.position.y),
            size: Size::of(self.size.width, self.size.height),
            rotation: 0.0,
            z_index: 0,
        }
    }

    /// Unrotated bounds.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::from(self.position), kurbo::Size::from(self.size))
    }

    /// Axis-aligned bounds after rotating about the position.
    pub fn rotated_bounds(&self) -> Rect {
        if self.rotation == 0.0 {
            return self.bounds();
        }
        Affine::rotate_about(deg_to_rad(self.rotation), Point::from(self.position))
            .transform_rect_bbox(self.bounds())
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::zero()
    }
}
