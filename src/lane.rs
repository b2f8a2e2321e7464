use crate::math::{project_local, rot90, wrap_to_pi, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;
use std::f64::consts::FRAC_PI_2;

/// Longitudinal slack, in m, granted beyond a lane's end points when testing
/// whether a position is still on the lane.
const LONGITUDINAL_MARGIN: f64 = 5.0;

/// The type of road marking along one edge of a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineType {
    None,
    Striped,
    Continuous,
}

/// The reference-path geometry of a lane.
#[derive(Clone, Copy, Debug)]
pub enum LaneKind {
    /// A straight path between two end points.
    Straight { start: Point2d, end: Point2d },
    /// A circular arc swept around a centre point.
    ///
    /// Longitudinal position advances with increasing phase when `clockwise`
    /// is set, and with decreasing phase otherwise.
    CircularArc {
        center: Point2d,
        radius: f64,
        start_phase: f64,
        end_phase: f64,
        clockwise: bool,
    },
}

/// One drivable path within a track segment.
#[derive(Clone, Debug)]
pub struct Lane {
    /// The lane's reference-path geometry.
    kind: LaneKind,
    /// The lane width in m.
    width: f64,
    /// The left and right road markings.
    lines: [LineType; 2],
    /// Speed limit in m/s.
    speed_limit: f64,
    /// Cached arc length of the reference path in m.
    length: f64,
}

impl Lane {
    /// Creates a straight lane between two end points.
    pub fn straight(
        start: Point2d,
        end: Point2d,
        lines: [LineType; 2],
        width: f64,
        speed_limit: f64,
    ) -> Self {
        let length = (end - start).magnitude();
        Self {
            kind: LaneKind::Straight { start, end },
            width,
            lines,
            speed_limit,
            length,
        }
    }

    /// Creates a circular-arc lane. Phases are in radians.
    #[allow(clippy::too_many_arguments)]
    pub fn circular(
        center: Point2d,
        radius: f64,
        start_phase: f64,
        end_phase: f64,
        clockwise: bool,
        lines: [LineType; 2],
        width: f64,
        speed_limit: f64,
    ) -> Self {
        let direction = if clockwise { 1.0 } else { -1.0 };
        let length = radius * (end_phase - start_phase) * direction;
        Self {
            kind: LaneKind::CircularArc {
                center,
                radius,
                start_phase,
                end_phase,
                clockwise,
            },
            width,
            lines,
            speed_limit,
            length,
        }
    }

    /// Gets the length of the lane's reference path in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Gets the lane width in m.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Gets the speed limit in m/s.
    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    /// Gets the left and right road markings.
    pub fn lines(&self) -> [LineType; 2] {
        self.lines
    }

    /// Gets the lane's geometry.
    pub fn kind(&self) -> &LaneKind {
        &self.kind
    }

    /// Whether the lane is a circular arc, and so wraps longitudinally.
    pub fn is_circular(&self) -> bool {
        matches!(self.kind, LaneKind::CircularArc { .. })
    }

    /// The range of longitudinal positions covered by the lane.
    pub fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, self.length)
    }

    /// Decomposes a world position into (longitudinal, lateral) lane
    /// coordinates. Longitudinal is the distance along the reference path
    /// from the lane's start; lateral is the signed perpendicular offset.
    pub fn local_coordinates(&self, position: Point2d) -> (f64, f64) {
        match self.kind {
            LaneKind::Straight { start, end } => {
                let dir = self.straight_direction(start, end);
                let local = project_local(position, start, dir, rot90(dir));
                (local.x, local.y)
            }
            LaneKind::CircularArc {
                center,
                radius,
                start_phase,
                ..
            } => {
                let direction = self.arc_direction();
                let delta = position - center;
                let phi = start_phase + wrap_to_pi(delta.y.atan2(delta.x) - start_phase);
                let r = delta.magnitude();
                let longitudinal = direction * (phi - start_phase) * radius;
                let lateral = direction * (radius - r);
                (longitudinal, lateral)
            }
        }
    }

    /// Reconstructs a world position from (longitudinal, lateral) lane
    /// coordinates. The inverse of [local_coordinates](Self::local_coordinates).
    pub fn position(&self, longitudinal: f64, lateral: f64) -> Point2d {
        match self.kind {
            LaneKind::Straight { start, end } => {
                let dir = self.straight_direction(start, end);
                start + longitudinal * dir + lateral * rot90(dir)
            }
            LaneKind::CircularArc {
                center,
                radius,
                start_phase,
                ..
            } => {
                let direction = self.arc_direction();
                let phi = direction * longitudinal / radius + start_phase;
                center + (radius - lateral * direction) * Vector2d::new(phi.cos(), phi.sin())
            }
        }
    }

    /// Gets the heading of the reference path, in radians, at the given
    /// longitudinal position.
    pub fn heading_at(&self, longitudinal: f64) -> f64 {
        match self.kind {
            LaneKind::Straight { start, end } => {
                let dir = self.straight_direction(start, end);
                dir.y.atan2(dir.x)
            }
            LaneKind::CircularArc {
                radius, start_phase, ..
            } => {
                let direction = self.arc_direction();
                let phi = direction * longitudinal / radius + start_phase;
                phi + direction * FRAC_PI_2
            }
        }
    }

    /// Returns true if the position lies within the lane's width, with a
    /// small longitudinal margin past either end.
    pub fn on_lane(&self, position: Point2d) -> bool {
        let (longitudinal, lateral) = self.local_coordinates(position);
        lateral.abs() <= 0.5 * self.width
            && (-LONGITUDINAL_MARGIN..self.length + LONGITUDINAL_MARGIN).contains(&longitudinal)
    }

    /// Unit direction of a straight lane, falling back to +x for a
    /// degenerate zero-length lane.
    fn straight_direction(&self, start: Point2d, end: Point2d) -> Vector2d {
        if self.length > 0.0 {
            (end - start) / self.length
        } else {
            Vector2d::new(1.0, 0.0)
        }
    }

    fn arc_direction(&self) -> f64 {
        match self.kind {
            LaneKind::CircularArc { clockwise: true, .. } => 1.0,
            _ => -1.0,
        }
    }
}
