use crate::core::horse::{Horse, CONDITION_MAX};
use helpers::general::{check_positive, InputValueError};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// (ms/m) Calibrates race meters to milliseconds of animation.
pub const BASE_TIME_PER_METER: f64 = 5.0;

/// Tuning constants of the race duration model.
/// * `base_time_per_meter` - (ms/m) Time per meter of race distance
/// * `condition_penalty_factor` - Penalty weight per missing condition point
/// * `condition_penalty_scale` - (ms) Scale applied on top of the penalty weight
/// * `jitter_ms` - (ms) Half-width of the uniform random jitter window
/// * `min_duration_ms` - (ms) Hard lower bound of every duration
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RaceConstants {
    pub base_time_per_meter: f64,
    pub condition_penalty_factor: f64,
    pub condition_penalty_scale: f64,
    pub jitter_ms: f64,
    pub min_duration_ms: u64,
}

impl Default for RaceConstants {
    fn default() -> Self {
        RaceConstants {
            base_time_per_meter: BASE_TIME_PER_METER,
            condition_penalty_factor: 0.05,
            condition_penalty_scale: 100.0,
            jitter_ms: 500.0,
            min_duration_ms: 2000,
        }
    }
}

impl RaceConstants {
    /// validate checks that the constants keep the model monotonic and well defined.
    pub fn validate(&self) -> Result<(), InputValueError> {
        check_positive("base_time_per_meter", self.base_time_per_meter)?;
        check_positive("condition_penalty_factor", self.condition_penalty_factor)?;
        check_positive("condition_penalty_scale", self.condition_penalty_scale)?;
        if !(self.jitter_ms >= 0.0) || !self.jitter_ms.is_finite() {
            return Err(InputValueError::NotPositive {
                name: "jitter_ms",
                value: self.jitter_ms,
            });
        }
        check_positive("min_duration_ms", self.min_duration_ms as f64)?;
        Ok(())
    }
}

/// calc_duration returns the completion time (ms) of a single horse for a given jitter draw:
/// max(min_duration, floor(distance * base_time_per_meter + penalty + jitter)).
pub fn calc_duration(condition: u32, distance: u32, jitter_ms: f64, consts: &RaceConstants) -> u64 {
    let base_time = distance as f64 * consts.base_time_per_meter;
    let condition_penalty = CONDITION_MAX.saturating_sub(condition) as f64
        * consts.condition_penalty_factor
        * consts.condition_penalty_scale;
    let raw_duration = (base_time + condition_penalty + jitter_ms).floor();

    if raw_duration > consts.min_duration_ms as f64 {
        raw_duration as u64
    } else {
        consts.min_duration_ms
    }
}

/// calc_race_durations returns the completion time (ms) of every horse, keyed by horse id, using
/// the default constants and the thread-local random source.
pub fn calc_race_durations(horses: &[Horse], distance: u32) -> HashMap<u32, u64> {
    calc_race_durations_with_rng(
        horses,
        distance,
        &RaceConstants::default(),
        &mut rand::thread_rng(),
    )
}

/// calc_race_durations_with_rng draws an independent jitter per horse from
/// [-jitter_ms, +jitter_ms] and applies the duration model. Draws happen in slice order, so a
/// seeded random source reproduces the same jitters for the same horse list.
pub fn calc_race_durations_with_rng<R: Rng>(
    horses: &[Horse],
    distance: u32,
    consts: &RaceConstants,
    rng: &mut R,
) -> HashMap<u32, u64> {
    let jitter_distr = if consts.jitter_ms > 0.0 {
        Some(Uniform::new_inclusive(-consts.jitter_ms, consts.jitter_ms))
    } else {
        None
    };

    let mut durations = HashMap::with_capacity(horses.len());

    for horse in horses {
        let jitter = jitter_distr.as_ref().map_or(0.0, |distr| distr.sample(rng));
        let duration = calc_duration(horse.condition, distance, jitter, consts);
        debug!(
            horse_id = horse.id,
            condition = horse.condition,
            distance,
            jitter,
            duration,
            "calculated race duration"
        );
        durations.insert(horse.id, duration);
    }

    durations
}
