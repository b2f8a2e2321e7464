use crate::config::EnvConfig;
use crate::lane::Lane;
use crate::vehicle::Vehicle;
use serde::{Deserialize, Serialize};

/// Distance to a leading vehicle, in m, below which proximity shaping kicks in.
const PROXIMITY_DISTANCE: f64 = 15.0;

/// Minimum lateral action magnitude that counts as a deliberate lane change.
const LATERAL_ACTION_THRESHOLD: f64 = 0.25;

/// One step's continuous control input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Action {
    /// Steering command, positive towards increasing lateral offset.
    pub lateral: f64,
    /// Acceleration command.
    pub longitudinal: f64,
}

impl Action {
    pub const fn new(lateral: f64, longitudinal: f64) -> Self {
        Self {
            lateral,
            longitudinal,
        }
    }

    /// The Euclidean norm of the action vector.
    pub fn magnitude(&self) -> f64 {
        self.lateral.hypot(self.longitudinal)
    }
}

/// The named terms making up one step's reward.
///
/// Field names are part of the outward contract; external metrics tooling
/// matches on them when the breakdown is serialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub lane_centering_reward: f64,
    pub action_reward: f64,
    pub on_road_reward: f64,
    pub proximity_penalty: f64,
    pub lane_change_reward: f64,
    pub collision_reward: f64,
    pub off_track_penalty: f64,
}

impl RewardBreakdown {
    /// The scalar reward: the sum of every named term.
    pub fn total(&self) -> f64 {
        self.lane_centering_reward
            + self.action_reward
            + self.on_road_reward
            + self.proximity_penalty
            + self.lane_change_reward
            + self.collision_reward
            + self.off_track_penalty
    }
}

/// Computes the reward breakdown for one step.
///
/// Pure in everything except the off-track streak, which is owned by the
/// episode state: the caller advances it before this runs, and the penalty
/// compounds with the streak's current value.
///
/// # Parameters
/// * `config` - The reward weights
/// * `lane` - The controlled vehicle's current lane
/// * `vehicle` - The controlled vehicle's snapshot
/// * `action` - The action applied this step
/// * `distance_to_front` - Longitudinal distance to the nearest same-lane
///   vehicle ahead, `+inf` when there is none
/// * `off_track_streak` - Seconds the vehicle has continuously been off-road
pub fn compute(
    config: &EnvConfig,
    lane: &Lane,
    vehicle: &Vehicle,
    action: &Action,
    distance_to_front: f64,
    off_track_streak: f64,
) -> RewardBreakdown {
    let (_, lateral) = lane.local_coordinates(vehicle.position);

    let mut proximity_penalty = 0.0;
    let mut lane_change_reward = 0.0;
    if distance_to_front <= PROXIMITY_DISTANCE {
        proximity_penalty = config.proximity_penalty * 10.0 / (1.0 + distance_to_front);
        // Reward only deliberate lateral moves, and only while the threat
        // is present.
        if action.lateral.abs() >= LATERAL_ACTION_THRESHOLD {
            lane_change_reward = config.lane_change_reward;
        }
    }

    RewardBreakdown {
        lane_centering_reward: config.lane_centering_reward
            / (1.0 + config.lane_centering_cost * lateral * lateral),
        action_reward: config.action_reward * action.magnitude(),
        on_road_reward: if vehicle.on_road {
            config.on_road_reward
        } else {
            0.0
        },
        proximity_penalty,
        lane_change_reward,
        collision_reward: if vehicle.crashed {
            config.collision_reward
        } else {
            0.0
        },
        off_track_penalty: config.off_track_penalty * off_track_streak,
    }
}
