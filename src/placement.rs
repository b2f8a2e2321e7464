use crate::track::{LaneId, RoadGraph, FEEDER_SEGMENT, START_SEGMENT};
use crate::util::Interval;
use crate::vehicle::{Vehicle, VehicleKind};
use crate::{VehicleId, VehicleSet};
use cgmath::MetricSpace;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Range of start-line longitudinal offsets for controlled vehicles, in m.
const START_OFFSET: Interval<f64> = Interval::new(20.0, 50.0);

/// Minimum world-space clearance between a candidate bot and any vehicle
/// already placed, in m.
const MIN_CLEARANCE: f64 = 20.0;

/// Mean bot cruise speed in m/s.
const BOT_SPEED: f64 = 6.0;

/// Places the controlled vehicle(s) and up to `bot_count` bots on the track.
///
/// The first controlled vehicle starts on the start segment in a random
/// lane; any further controlled vehicles take uniformly random lanes. The
/// first bot is always fed in on the feeder segment in the last controlled
/// vehicle's lane; the rest land on uniformly random lanes.
///
/// A candidate bot within [MIN_CLEARANCE] of any already-placed vehicle is
/// dropped outright, never retried, so dense traffic requests under-fill
/// rather than loop.
///
/// Returns the vehicle set and the IDs of the controlled vehicles.
pub fn place_vehicles(
    road: &RoadGraph,
    rng: &mut impl Rng,
    controlled_count: usize,
    bot_count: usize,
    controlled_speed: f64,
) -> (VehicleSet, Vec<VehicleId>) {
    let mut vehicles = VehicleSet::default();
    let mut controlled = Vec::with_capacity(controlled_count);

    let mut lane = LaneId {
        segment: START_SEGMENT,
        index: rng.gen_range(0..road.lane_count(START_SEGMENT)),
    };
    for i in 0..controlled_count {
        if i > 0 {
            lane = road.random_lane(rng);
        }
        let longitudinal = rng.gen_range(START_OFFSET.min..START_OFFSET.max);
        controlled.push(vehicles.insert(Vehicle::make_on_lane(
            road,
            lane,
            longitudinal,
            controlled_speed,
            VehicleKind::Controlled,
        )));
    }

    if bot_count > 0 {
        let speed_jitter = Uniform::new(-1.0, 1.0);

        // The mandatory feeder bot shares the last controlled vehicle's
        // lane index and is exempt from the clearance check.
        let feeder = LaneId {
            segment: FEEDER_SEGMENT,
            index: lane.index,
        };
        let longitudinal = rng.gen_range(0.0..road.lane(feeder).length());
        vehicles.insert(Vehicle::make_on_lane(
            road,
            feeder,
            longitudinal,
            BOT_SPEED + speed_jitter.sample(rng),
            VehicleKind::Bot,
        ));

        for _ in 1..bot_count {
            let lane = road.random_lane(rng);
            let longitudinal = rng.gen_range(0.0..road.lane(lane).length());
            let candidate = Vehicle::make_on_lane(
                road,
                lane,
                longitudinal,
                BOT_SPEED + speed_jitter.sample(rng),
                VehicleKind::Bot,
            );
            let blocked = vehicles
                .values()
                .any(|v| v.position.distance(candidate.position) < MIN_CLEARANCE);
            if blocked {
                log::trace!("dropped bot on {lane}: too close to existing traffic");
                continue;
            }
            vehicles.insert(candidate);
        }
    }

    (vehicles, controlled)
}
