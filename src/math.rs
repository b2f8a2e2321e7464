//! Mathematical structs and functions.

use cgmath::prelude::*;
use cgmath::{Point2, Vector2};
use std::f64::consts::PI;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// Rotates a vector 90 degrees clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Wraps an angle into the interval (-pi, pi].
pub fn wrap_to_pi(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn wrap_to_pi_stays_in_range() {
        for i in -100..100 {
            let angle = 0.37 * i as f64;
            let wrapped = wrap_to_pi(angle);
            assert!(wrapped > -PI && wrapped <= PI);
            assert_approx_eq!(angle.sin(), wrapped.sin(), 1e-9);
            assert_approx_eq!(angle.cos(), wrapped.cos(), 1e-9);
        }
    }

    #[test]
    fn rot90_is_perpendicular() {
        let v = Vector2d::new(3.0, 4.0);
        assert_approx_eq!(v.dot(rot90(v)), 0.0, 1e-12);
    }
}
