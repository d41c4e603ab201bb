//! Angle helpers shared by shapes and gauges.

use std::f64::consts::PI;

use crate::geometry::Position;

pub const DEG_TO_RAD_FACTOR: f64 = PI / 180.0;
pub const RAD_TO_DEG_FACTOR: f64 = 180.0 / PI;

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * DEG_TO_RAD_FACTOR
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians * RAD_TO_DEG_FACTOR
}

/// Point on a circle of radius `r` around `center`.
///
/// `theta` is in degrees, measured clockwise from 12 o'clock (screen
/// coordinates, y grows downwards).
pub fn point_on_circle(center: Position, r: f64, theta: f64) -> Position {
    let theta = deg_to_rad(theta);
    Position::of(center.x() + r * theta.sin(), center.y() - r * theta.cos())
}
