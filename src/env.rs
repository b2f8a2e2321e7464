use crate::config::{ConfigError, EnvConfig};
use crate::episode::{EpisodeMetrics, EpisodeState, EpisodeStatus};
use crate::placement::place_vehicles;
use crate::proximity::closest_ahead;
use crate::reward::{self, Action, RewardBreakdown};
use crate::track::{RoadGraph, Topology};
use crate::vehicle::Vehicle;
use crate::{VehicleId, VehicleSet};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Episode duration cap on the small track, in s.
const SMALL_DURATION: f64 = 60.0;

/// Episode duration cap on the large track, in s. The bigger circuit gets
/// more time.
const LARGE_DURATION: f64 = 120.0;

/// Bot-count ranges per topology.
const SMALL_BOTS: (usize, usize) = (1, 5);
const LARGE_BOTS: (usize, usize) = (10, 15);

/// The configuration drawn for one episode.
#[derive(Clone, Copy, Debug)]
pub struct Scenario {
    pub topology: Topology,
    pub bot_count: usize,
    pub vehicle_speed: f64,
    pub duration: f64,
}

impl Scenario {
    /// Draws a fresh scenario.
    ///
    /// Topology and traffic density both derive from one draw, so a fixed
    /// seed reproduces the full scenario without any draw-ordering hazard.
    fn sample(rng: &mut SmallRng, config: &EnvConfig) -> Self {
        let range = config.vehicle_speed_range;
        let (lo, hi) = (range.min as i64, range.max as i64);
        let vehicle_speed = if lo < hi {
            rng.gen_range(lo..hi) as f64
        } else {
            range.midpoint()
        };

        let draw = rng.gen_range(0..1000u32) as usize;
        if draw % 2 == 0 {
            Scenario {
                topology: Topology::Small,
                bot_count: SMALL_BOTS.0 + (draw / 2) % (SMALL_BOTS.1 - SMALL_BOTS.0),
                vehicle_speed,
                duration: SMALL_DURATION,
            }
        } else {
            Scenario {
                topology: Topology::Large,
                bot_count: LARGE_BOTS.0 + (draw / 2) % (LARGE_BOTS.1 - LARGE_BOTS.0),
                vehicle_speed,
                duration: LARGE_DURATION,
            }
        }
    }

    /// The fixed scenario used when scenario randomisation is off.
    fn fixed(config: &EnvConfig) -> Self {
        Scenario {
            topology: Topology::Small,
            bot_count: config.other_vehicles,
            vehicle_speed: config.vehicle_speed,
            duration: config.duration,
        }
    }
}

/// Everything the training collaborator receives from one step.
#[derive(Clone, Copy, Debug)]
pub struct StepOutcome {
    /// The scalar total reward.
    pub reward: f64,
    /// The episode ended with a crash.
    pub terminated: bool,
    /// The episode ended by timeout or sustained off-track driving.
    pub truncated: bool,
    pub info: StepInfo,
}

/// Diagnostic info exposed alongside each step's reward.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StepInfo {
    /// The named reward terms for this step.
    pub rewards: RewardBreakdown,
    /// The episode's cumulative metrics so far.
    #[serde(flatten)]
    pub metrics: EpisodeMetrics,
}

/// A closed-loop racetrack environment.
///
/// Owns one road graph, one vehicle set and one episode's state. Instances
/// are fully independent; run one per thread or process for parallel data
/// collection.
///
/// The external dynamics collaborator advances vehicle kinematics between
/// calls via [vehicles_mut](Self::vehicles_mut); [step](Self::step) then
/// scores the resulting snapshots.
pub struct RacetrackEnv {
    config: EnvConfig,
    rng: SmallRng,
    scenario: Scenario,
    road: RoadGraph,
    vehicles: VehicleSet,
    controlled: Vec<VehicleId>,
    episode: EpisodeState,
    status: EpisodeStatus,
}

impl RacetrackEnv {
    /// Creates an environment and starts its first episode.
    ///
    /// Fails fast on a malformed configuration; nothing errors once the
    /// environment is running.
    pub fn new(config: EnvConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let scenario = Scenario::fixed(&config);
        let mut env = Self {
            rng: SmallRng::seed_from_u64(seed),
            scenario,
            road: RoadGraph::build(scenario.topology),
            vehicles: VehicleSet::default(),
            controlled: vec![],
            episode: EpisodeState::default(),
            status: EpisodeStatus::Running,
            config,
        };
        env.reset();
        Ok(env)
    }

    /// Starts a new episode: draws a scenario, rebuilds the track, places
    /// the traffic and zeroes every counter.
    pub fn reset(&mut self) {
        self.scenario = if self.config.different_scenarios {
            Scenario::sample(&mut self.rng, &self.config)
        } else {
            Scenario::fixed(&self.config)
        };
        log::debug!(
            "reset: {:?} track, {} bots, target speed {} m/s",
            self.scenario.topology,
            self.scenario.bot_count,
            self.scenario.vehicle_speed
        );
        self.road = RoadGraph::build(self.scenario.topology);
        let (vehicles, controlled) = place_vehicles(
            &self.road,
            &mut self.rng,
            self.config.controlled_vehicles,
            self.scenario.bot_count,
            self.scenario.vehicle_speed,
        );
        self.vehicles = vehicles;
        self.controlled = controlled;
        self.episode.reset();
        self.status = EpisodeStatus::Running;
    }

    /// Scores the current vehicle snapshots against the applied action and
    /// advances the episode lifecycle by one step.
    pub fn step(&mut self, action: Action) -> StepOutcome {
        let dt = 1.0 / self.config.policy_frequency;
        let subject = self.controlled[0];
        let vehicle = self.vehicles[subject];

        let proximity = closest_ahead(subject, &self.vehicles, &self.road);
        self.episode.update_streak(vehicle.on_road, dt);
        let rewards = reward::compute(
            &self.config,
            self.road.lane(vehicle.lane),
            &vehicle,
            &action,
            proximity.distance,
            self.episode.off_track_streak,
        );
        let reward = rewards.total();

        self.episode.record_step(
            dt,
            reward,
            vehicle.crashed,
            vehicle.on_road,
            rewards.proximity_penalty != 0.0,
        );
        self.status = self.episode.evaluate(
            vehicle.crashed,
            self.scenario.duration,
            self.config.off_track_threshold,
        );
        if self.status.is_terminal() {
            log::debug!("episode over: {:?} after {:.1}s", self.status, self.episode.time);
        }

        StepOutcome {
            reward,
            terminated: self.status == EpisodeStatus::Terminated,
            truncated: self.status == EpisodeStatus::Truncated,
            info: StepInfo {
                rewards,
                metrics: self.episode.metrics,
            },
        }
    }

    /// The first controlled vehicle.
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicles[self.controlled[0]]
    }

    /// The IDs of the controlled vehicles, in placement order.
    pub fn controlled_ids(&self) -> &[VehicleId] {
        &self.controlled
    }

    /// All vehicle snapshots.
    pub fn vehicles(&self) -> &VehicleSet {
        &self.vehicles
    }

    /// Mutable access for the dynamics collaborator to advance kinematics
    /// between steps.
    pub fn vehicles_mut(&mut self) -> &mut VehicleSet {
        &mut self.vehicles
    }

    /// The current episode's road graph.
    pub fn road(&self) -> &RoadGraph {
        &self.road
    }

    /// The current episode's scenario.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// The episode lifecycle state.
    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    /// The episode counters.
    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    /// The environment configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }
}
