use crate::util::Interval;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A construction-time configuration contract violation.
///
/// Raised before any episode begins; nothing in this crate errors once an
/// episode is running.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be finite, got {1}")]
    NonFiniteWeight(&'static str, f64),
    #[error("{0} must be positive, got {1}")]
    NonPositive(&'static str, f64),
    #[error("vehicle speed range {0:?} is empty")]
    EmptySpeedRange(Interval<f64>),
    #[error("at least one controlled vehicle is required")]
    NoControlledVehicle,
}

/// Environment configuration, read at reset.
///
/// Only the scenario-randomized values (topology, bot count, target speed,
/// duration) vary between episodes; everything else is fixed for the
/// lifetime of the instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Steps per simulated second at which the external dynamics runs.
    pub simulation_frequency: f64,
    /// Steps per simulated second at which this core runs.
    pub policy_frequency: f64,
    /// Episode duration cap in s. Scenario selection overrides this per
    /// topology when `different_scenarios` is set.
    pub duration: f64,
    /// Cumulative off-track seconds after which the episode truncates.
    pub off_track_threshold: f64,
    /// Weight of the collision penalty.
    pub collision_reward: f64,
    /// Steepness of the lane-centering decay.
    pub lane_centering_cost: f64,
    /// Weight of the lane-centering reward.
    pub lane_centering_reward: f64,
    /// Weight of the action-magnitude penalty.
    pub action_reward: f64,
    /// Weight of the on-road reward.
    pub on_road_reward: f64,
    /// Weight of the proximity penalty.
    pub proximity_penalty: f64,
    /// Weight of the evasive lane-change reward.
    pub lane_change_reward: f64,
    /// Weight of the compounding off-track penalty.
    pub off_track_penalty: f64,
    /// Number of controlled vehicles to place.
    pub controlled_vehicles: usize,
    /// Bot count when `different_scenarios` is off.
    pub other_vehicles: usize,
    /// Controlled-vehicle target speed when `different_scenarios` is off.
    pub vehicle_speed: f64,
    /// Range the controlled-vehicle target speed is drawn from per reset.
    pub vehicle_speed_range: Interval<f64>,
    /// Whether each reset picks a fresh topology, traffic density and
    /// target speed. When off, every episode uses the small track with
    /// `other_vehicles` bots.
    pub different_scenarios: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            simulation_frequency: 15.0,
            policy_frequency: 10.0,
            duration: 60.0,
            off_track_threshold: 5.0,
            collision_reward: -500.0,
            lane_centering_cost: 1.25,
            lane_centering_reward: 2.0,
            action_reward: -0.75,
            on_road_reward: 1.0,
            proximity_penalty: -7.5,
            lane_change_reward: 6.0,
            off_track_penalty: -7.5,
            controlled_vehicles: 1,
            other_vehicles: 1,
            vehicle_speed: 8.0,
            vehicle_speed_range: Interval::new(14.0, 20.0),
            different_scenarios: true,
        }
    }
}

impl EnvConfig {
    /// Checks the configuration before any episode begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("collision_reward", self.collision_reward),
            ("lane_centering_cost", self.lane_centering_cost),
            ("lane_centering_reward", self.lane_centering_reward),
            ("action_reward", self.action_reward),
            ("on_road_reward", self.on_road_reward),
            ("proximity_penalty", self.proximity_penalty),
            ("lane_change_reward", self.lane_change_reward),
            ("off_track_penalty", self.off_track_penalty),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight(name, value));
            }
        }
        let positives = [
            ("simulation_frequency", self.simulation_frequency),
            ("policy_frequency", self.policy_frequency),
            ("duration", self.duration),
            ("off_track_threshold", self.off_track_threshold),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive(name, value));
            }
        }
        if !(self.vehicle_speed_range.min <= self.vehicle_speed_range.max) {
            return Err(ConfigError::EmptySpeedRange(self.vehicle_speed_range));
        }
        if self.controlled_vehicles == 0 {
            return Err(ConfigError::NoControlledVehicle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EnvConfig::default().validate().is_ok());
    }

    #[test]
    fn non_finite_weight_is_rejected() {
        let mut config = EnvConfig::default();
        config.proximity_penalty = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteWeight("proximity_penalty", _))
        ));
    }

    #[test]
    fn zero_policy_frequency_is_rejected() {
        let mut config = EnvConfig::default();
        config.policy_frequency = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("policy_frequency", _))
        ));
    }

    #[test]
    fn inverted_speed_range_is_rejected() {
        let mut config = EnvConfig::default();
        config.vehicle_speed_range = Interval::new(20.0, 14.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptySpeedRange(_))
        ));
    }

    #[test]
    fn zero_controlled_vehicles_is_rejected() {
        let mut config = EnvConfig::default();
        config.controlled_vehicles = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoControlledVehicle)
        ));
    }
}
