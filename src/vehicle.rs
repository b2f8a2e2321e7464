use crate::math::Point2d;
use crate::track::{LaneId, RoadGraph};

/// Distinguishes the externally controlled vehicle(s) from autonomous bots.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VehicleKind {
    Controlled,
    Bot,
}

/// A per-step snapshot of one vehicle's state.
///
/// The kinematics are owned and advanced by the external dynamics
/// collaborator between steps; this crate only reads them. The fields are
/// therefore public, like a plain record.
#[derive(Clone, Copy, Debug)]
pub struct Vehicle {
    pub kind: VehicleKind,
    /// The world-space position of the vehicle's centre.
    pub position: Point2d,
    /// The lane the vehicle is currently assigned to.
    pub lane: LaneId,
    /// Whether the vehicle is within its lane's bounds.
    pub on_road: bool,
    /// Whether the vehicle has collided this episode.
    pub crashed: bool,
    /// The target speed in m/s.
    pub speed: f64,
}

impl Vehicle {
    /// Creates a vehicle centred on the given lane at the given
    /// longitudinal offset.
    pub fn make_on_lane(
        road: &RoadGraph,
        lane: LaneId,
        longitudinal: f64,
        speed: f64,
        kind: VehicleKind,
    ) -> Self {
        let position = road.lane(lane).position(longitudinal, 0.0);
        Self {
            kind,
            position,
            lane,
            on_road: true,
            crashed: false,
            speed,
        }
    }

    /// The vehicle's longitudinal position along its current lane.
    pub fn longitudinal(&self, road: &RoadGraph) -> f64 {
        road.lane(self.lane).local_coordinates(self.position).0
    }
}
