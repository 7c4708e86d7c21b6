use crate::core::program::Round;
use crate::interfaces::race_interface::{HorseState, RaceCommand, RaceState, MAX_UPDATE_FREQUENCY};
use crate::post::race_result::RaceResult;
use anyhow::Context;
use flume::{Receiver, Sender};
use std::collections::HashMap;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// handle_race plays one round on the basis of the precomputed durations and returns its result.
/// Without a sender the result is returned immediately. With a sender the round is played in
/// real time: the elapsed race time advances in steps of `timestep_size` seconds (scaled by
/// `realtime_factor`), and snapshots are sent at most MAX_UPDATE_FREQUENCY times per second. Pause
/// commands freeze the elapsed race time; the durations are never recomputed. Returns None if the
/// round has no horses or an abort command was received.
pub fn handle_race(
    round: &Round,
    durations: &HashMap<u32, u64>,
    timestep_size: f64,
    tx: Option<&Sender<RaceState>>,
    rx_cmd: Option<&Receiver<RaceCommand>>,
    realtime_factor: f64,
) -> anyhow::Result<Option<RaceResult>> {
    let result = RaceResult::from_durations(round, durations);

    let tx = match tx {
        Some(tx) => tx,
        None => return Ok(result),
    };

    let mut race_state = RaceState {
        round_no: round.round_no,
        distance: round.distance,
        elapsed_ms: 0,
        horse_states: round
            .horses
            .iter()
            .map(HorseState::new)
            .collect::<anyhow::Result<Vec<HorseState>>>()?,
        is_paused: false,
        final_result: None,
    };
    let horse_durations = get_horse_durations(round, durations);
    let t_race_end = horse_durations.iter().copied().max().unwrap_or(0);
    let step_ms = timestep_size * 1000.0;

    info!(
        round_no = round.round_no,
        t_race_end, "playing round in real time"
    );

    let mut elapsed_ms = 0.0;
    let mut t_update = Instant::now();

    while (elapsed_ms as u64) < t_race_end {
        let t_start = Instant::now();

        if let Some(rx_cmd) = rx_cmd {
            for cmd in rx_cmd.try_iter() {
                match cmd {
                    RaceCommand::TogglePause => {
                        race_state.is_paused = !race_state.is_paused;
                        debug!(is_paused = race_state.is_paused, "received pause toggle");
                    }
                    RaceCommand::Abort => {
                        info!(round_no = round.round_no, "round aborted");
                        return Ok(None);
                    }
                }
            }
        }

        if !race_state.is_paused {
            elapsed_ms += step_ms;
        }

        if t_update.elapsed().as_secs_f64() >= 1.0 / MAX_UPDATE_FREQUENCY {
            update_horse_states(&mut race_state, &horse_durations, elapsed_ms);
            tx.send(race_state.clone())
                .context("Failed to send race state!")?;
            t_update = Instant::now();
        }

        // sleep until time step is finished in real-time as well (calculation in ms)
        let t_sleep = (step_ms / realtime_factor) as i64 - t_start.elapsed().as_millis() as i64;

        if t_sleep > 0 {
            sleep(Duration::from_millis(t_sleep as u64));
        } else {
            warn!("Could not keep up with real-time!")
        }
    }

    // every horse arrived, send final result once
    update_horse_states(&mut race_state, &horse_durations, elapsed_ms);
    race_state.final_result = result.clone();
    tx.send(race_state)
        .context("Failed to send final race result!")?;

    Ok(result)
}

/// get_horse_durations returns the duration of every horse in lane order. Horses without a
/// duration arrive together with the slowest horse, matching their last place in the ranking.
fn get_horse_durations(round: &Round, durations: &HashMap<u32, u64>) -> Vec<u64> {
    let t_slowest = round
        .horses
        .iter()
        .filter_map(|horse| durations.get(&horse.id).copied())
        .max()
        .unwrap_or(0);

    round
        .horses
        .iter()
        .map(|horse| durations.get(&horse.id).copied().unwrap_or(t_slowest))
        .collect()
}

fn update_horse_states(race_state: &mut RaceState, horse_durations: &[u64], elapsed_ms: f64) {
    race_state.elapsed_ms = elapsed_ms as u64;

    for (horse_state, &duration) in race_state.horse_states.iter_mut().zip(horse_durations) {
        horse_state.arrived = elapsed_ms as u64 >= duration;
        horse_state.race_prog = if duration == 0 {
            1.0
        } else {
            (elapsed_ms / duration as f64).min(1.0)
        };
    }
}
