use crate::track::RoadGraph;
use crate::{VehicleId, VehicleSet};

/// The nearest same-lane vehicle ahead of a subject, if any.
#[derive(Clone, Copy, Debug)]
pub struct Proximity {
    /// The vehicle ahead, or `None` when no lane-mate qualifies.
    pub vehicle: Option<VehicleId>,
    /// Longitudinal distance to that vehicle, or `+inf` when there is none.
    pub distance: f64,
}

impl Proximity {
    fn none() -> Self {
        Self {
            vehicle: None,
            distance: f64::INFINITY,
        }
    }
}

/// Finds the closest vehicle ahead of the subject on its exact lane.
///
/// Candidates are restricted to on-road vehicles sharing the subject's lane
/// identifier; world-space distance is never consulted. On circular lanes
/// the longitudinal difference is wrapped into `(-length/2, length/2]` so
/// that "ahead" always means the shorter arc direction.
pub fn closest_ahead(subject: VehicleId, vehicles: &VehicleSet, road: &RoadGraph) -> Proximity {
    let vehicle = &vehicles[subject];
    let lane = road.lane(vehicle.lane);
    let own = lane.local_coordinates(vehicle.position).0;

    let mut closest = Proximity::none();
    for (id, other) in vehicles {
        if id == subject || other.lane != vehicle.lane || !other.on_road {
            continue;
        }
        let mut distance = lane.local_coordinates(other.position).0 - own;
        if lane.is_circular() {
            let length = lane.length();
            if distance > 0.5 * length {
                distance -= length;
            } else if distance < -0.5 * length {
                distance += length;
            }
        }
        if distance >= 0.0 && distance < closest.distance {
            closest = Proximity {
                vehicle: Some(id),
                distance,
            };
        }
    }
    closest
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::track::{LaneId, Topology, FEEDER_SEGMENT, START_SEGMENT};
    use crate::vehicle::{Vehicle, VehicleKind};
    use assert_approx_eq::assert_approx_eq;

    fn setup() -> (RoadGraph, VehicleSet) {
        (RoadGraph::build(Topology::Small), VehicleSet::default())
    }

    fn add(
        vehicles: &mut VehicleSet,
        road: &RoadGraph,
        lane: LaneId,
        longitudinal: f64,
    ) -> VehicleId {
        vehicles.insert(Vehicle::make_on_lane(
            road,
            lane,
            longitudinal,
            6.0,
            VehicleKind::Bot,
        ))
    }

    #[test]
    fn nearest_ahead_wins() {
        let (road, mut vehicles) = setup();
        let lane = LaneId {
            segment: START_SEGMENT,
            index: 0,
        };
        let subject = add(&mut vehicles, &road, lane, 10.0);
        let near = add(&mut vehicles, &road, lane, 22.0);
        let _far = add(&mut vehicles, &road, lane, 40.0);
        let _behind = add(&mut vehicles, &road, lane, 5.0);

        let result = closest_ahead(subject, &vehicles, &road);
        assert_eq!(result.vehicle, Some(near));
        assert_approx_eq!(result.distance, 12.0, 1e-9);
    }

    #[test]
    fn wrapped_distance_uses_the_shorter_arc() {
        let (road, mut vehicles) = setup();
        let lane = LaneId {
            segment: FEEDER_SEGMENT,
            index: 0,
        };
        let length = road.lane(lane).length();
        let subject = add(&mut vehicles, &road, lane, length - 1.0);
        let ahead = add(&mut vehicles, &road, lane, 1.0);

        let result = closest_ahead(subject, &vehicles, &road);
        assert_eq!(result.vehicle, Some(ahead));
        assert_approx_eq!(result.distance, 2.0, 1e-6);

        // From the other vehicle's perspective the subject is behind, not
        // length - 2 ahead.
        let result = closest_ahead(ahead, &vehicles, &road);
        assert!(result.vehicle.is_none());
        assert!(result.distance.is_infinite());
    }

    #[test]
    fn other_lanes_are_never_considered() {
        let (road, mut vehicles) = setup();
        let lane0 = LaneId {
            segment: START_SEGMENT,
            index: 0,
        };
        let lane1 = LaneId {
            segment: START_SEGMENT,
            index: 1,
        };
        let subject = add(&mut vehicles, &road, lane0, 10.0);
        // Geometrically 5m away, but on the parallel lane.
        let _neighbour = add(&mut vehicles, &road, lane1, 10.0);

        let result = closest_ahead(subject, &vehicles, &road);
        assert!(result.vehicle.is_none());
    }

    #[test]
    fn off_road_vehicles_are_ignored() {
        let (road, mut vehicles) = setup();
        let lane = LaneId {
            segment: START_SEGMENT,
            index: 0,
        };
        let subject = add(&mut vehicles, &road, lane, 10.0);
        let ahead = add(&mut vehicles, &road, lane, 20.0);
        vehicles[ahead].on_road = false;

        let result = closest_ahead(subject, &vehicles, &road);
        assert!(result.vehicle.is_none());
    }
}
