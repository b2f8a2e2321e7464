use serde::{Deserialize, Serialize};

/// The lifecycle state of an episode.
///
/// `Terminated` and `Truncated` are both terminal; a reset is required to
/// re-enter `Running`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EpisodeStatus {
    /// The episode is in progress.
    Running,
    /// The controlled vehicle crashed.
    Terminated,
    /// The episode ran out of time, or the vehicle spent too long off-track.
    Truncated,
}

impl EpisodeStatus {
    /// Whether the episode has ended, for either reason.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EpisodeStatus::Running)
    }
}

/// Cumulative per-episode metrics, exposed through the step info.
///
/// Field names are part of the outward contract; the external metrics
/// aggregator matches on them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetrics {
    /// Sum of every step's total reward.
    pub episode_reward: f64,
    /// Elapsed simulated time in s.
    pub episode_length: f64,
    /// Time spent with a nonzero proximity penalty, in s.
    pub proximity_time: f64,
    /// Time spent on the track, in s.
    pub on_track_time: f64,
    /// Time spent off the track, in s.
    pub off_track_time: f64,
    /// Number of steps on which the vehicle was crashed.
    pub collision: u32,
}

/// Mutable per-episode state: counters plus the off-track streak.
///
/// Owned by one environment instance and zeroed on every reset; nothing here
/// is shared between instances.
#[derive(Clone, Copy, Debug, Default)]
pub struct EpisodeState {
    /// Elapsed simulated time in s.
    pub time: f64,
    /// Seconds the vehicle has been continuously off-road. Resets to zero
    /// the moment the vehicle returns to the track.
    pub off_track_streak: f64,
    /// The episode's cumulative metrics.
    pub metrics: EpisodeMetrics,
}

impl EpisodeState {
    /// Zeroes every counter, re-entering a fresh episode.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advances the off-track streak by one tick, or clears it.
    pub fn update_streak(&mut self, on_road: bool, dt: f64) {
        if on_road {
            self.off_track_streak = 0.0;
        } else {
            self.off_track_streak += dt;
        }
    }

    /// Accumulates one step into the episode counters.
    ///
    /// Exactly one of the on-track/off-track buckets advances, depending on
    /// the current on-road flag.
    pub fn record_step(
        &mut self,
        dt: f64,
        reward: f64,
        crashed: bool,
        on_road: bool,
        proximity_active: bool,
    ) {
        self.time += dt;
        self.metrics.episode_reward += reward;
        self.metrics.episode_length += dt;
        if crashed {
            self.metrics.collision += 1;
        }
        if on_road {
            self.metrics.on_track_time += dt;
        } else {
            self.metrics.off_track_time += dt;
        }
        if proximity_active {
            self.metrics.proximity_time += dt;
        }
    }

    /// Evaluates the lifecycle transition for this step.
    ///
    /// A crash terminates; otherwise running out the clock or accumulating
    /// too much off-track time truncates.
    pub fn evaluate(&self, crashed: bool, duration: f64, off_track_threshold: f64) -> EpisodeStatus {
        if crashed {
            EpisodeStatus::Terminated
        } else if self.time >= duration || self.metrics.off_track_time >= off_track_threshold {
            EpisodeStatus::Truncated
        } else {
            EpisodeStatus::Running
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const DT: f64 = 0.1;

    #[test]
    fn timeout_truncates_rather_than_terminates() {
        let mut state = EpisodeState::default();
        // One extra step absorbs the float error of accumulating 0.1s ticks.
        for _ in 0..601 {
            state.record_step(DT, 1.0, false, true, false);
        }
        assert!(state.time >= 60.0);
        assert_eq!(state.evaluate(false, 60.0, 5.0), EpisodeStatus::Truncated);
        assert_approx_eq!(state.metrics.off_track_time, 0.0);
    }

    #[test]
    fn crash_wins_over_timeout() {
        let mut state = EpisodeState::default();
        state.time = 120.0;
        assert_eq!(state.evaluate(true, 60.0, 5.0), EpisodeStatus::Terminated);
    }

    #[test]
    fn sustained_off_track_truncates() {
        let mut state = EpisodeState::default();
        for _ in 0..51 {
            state.record_step(DT, -1.0, false, false, false);
        }
        assert_approx_eq!(state.metrics.off_track_time, 5.1, 1e-9);
        assert_eq!(state.evaluate(false, 60.0, 5.0), EpisodeStatus::Truncated);
    }

    #[test]
    fn streak_grows_off_road_and_clears_on_return() {
        let mut state = EpisodeState::default();
        state.update_streak(false, DT);
        state.update_streak(false, DT);
        assert_approx_eq!(state.off_track_streak, 2.0 * DT, 1e-12);
        state.update_streak(true, DT);
        assert_eq!(state.off_track_streak, 0.0);
        // Going off-road again restarts from one tick, not the old streak.
        state.update_streak(false, DT);
        assert_approx_eq!(state.off_track_streak, DT, 1e-12);
    }

    #[test]
    fn each_step_fills_exactly_one_time_bucket() {
        let mut state = EpisodeState::default();
        state.record_step(DT, 0.5, false, true, true);
        state.record_step(DT, -0.5, true, false, false);
        assert_approx_eq!(state.metrics.on_track_time, DT, 1e-12);
        assert_approx_eq!(state.metrics.off_track_time, DT, 1e-12);
        assert_approx_eq!(state.metrics.proximity_time, DT, 1e-12);
        assert_approx_eq!(state.metrics.episode_length, 2.0 * DT, 1e-12);
        assert_approx_eq!(state.metrics.episode_reward, 0.0, 1e-12);
        assert_eq!(state.metrics.collision, 1);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut state = EpisodeState::default();
        state.record_step(DT, 3.0, true, false, true);
        state.update_streak(false, DT);
        state.reset();
        assert_eq!(state.time, 0.0);
        assert_eq!(state.off_track_streak, 0.0);
        assert_eq!(state.metrics, EpisodeMetrics::default());
    }
}
