pub use cgmath;
pub use config::{ConfigError, EnvConfig};
pub use env::{RacetrackEnv, Scenario, StepInfo, StepOutcome};
pub use episode::{EpisodeMetrics, EpisodeState, EpisodeStatus};
pub use lane::{Lane, LaneKind, LineType};
pub use placement::place_vehicles;
pub use proximity::{closest_ahead, Proximity};
pub use reward::{Action, RewardBreakdown};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use track::{LaneId, Node, RoadGraph, SegmentId, Topology, FEEDER_SEGMENT, START_SEGMENT};
pub use util::Interval;
pub use vehicle::{Vehicle, VehicleKind};

mod config;
mod env;
mod episode;
mod lane;
pub mod math;
mod placement;
mod proximity;
mod reward;
mod track;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

/// The set of vehicle snapshots currently on the track.
pub type VehicleSet = SlotMap<VehicleId, Vehicle>;
