use anyhow::Context;
use clap::Parser;
use horsesim::core::durations::{calc_race_durations_with_rng, RaceConstants};
use horsesim::core::handle_race::handle_race;
use horsesim::core::state_handler::ProgramState;
use horsesim::interfaces::race_interface::{RaceCommand, RaceState};
use horsesim::post::race_result::{print_standings, write_results_to_file, RaceResult};
use horsesim::pre::read_sim_pars::read_race_constants;
use horsesim::pre::sim_opts::SimOpts;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

enum Event {
    Race(Result<RaceState, flume::RecvError>),
    Input(Result<String, flume::RecvError>),
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// program_rngs returns one random source per program. The per-program seeds are drawn from a
/// single source, seeded if a seed was given, so both modes play the same programs for a seed.
fn program_rngs(seed: Option<u64>, no_programs: u32) -> Vec<StdRng> {
    let mut seed_rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..no_programs)
        .map(|_| StdRng::seed_from_u64(seed_rng.gen()))
        .collect()
}

/// play_program generates a program and plays all of its rounds without real-time animation.
fn play_program(race_consts: &RaceConstants, mut rng: StdRng) -> anyhow::Result<Vec<RaceResult>> {
    let mut state = ProgramState::new();
    state.generate_program_with_rng(&mut rng);

    while let Some(round) = state.get_current_round().cloned() {
        state.start_round();
        let durations =
            calc_race_durations_with_rng(&round.horses, round.distance, race_consts, &mut rng);
        let result = handle_race(&round, &durations, 0.0, None, None, 1.0)?
            .context("Round without horses!")?;
        state.complete_round(result);
    }

    Ok(state.get_results().to_vec())
}

/// play_programs_live plays the programs one after another in real time. The program state is
/// owned by the calling thread; every round runs on its own thread and reports back over a
/// channel, while pause and regenerate commands are read from stdin.
fn play_programs_live(
    sim_opts: &SimOpts,
    race_consts: &RaceConstants,
) -> anyhow::Result<Vec<Vec<RaceResult>>> {
    let (tx_input, rx_input) = flume::unbounded();
    // keep one sender alive so that a closed stdin does not disconnect the channel
    let _tx_input_keepalive = tx_input.clone();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx_input.send(line).is_err() {
                        break;
                    }
                }
                _ => break,
            }
        }
    });

    println!("INFO: Type `p` + Enter to pause/resume, `g` + Enter to regenerate the program");

    let mut rngs = program_rngs(sim_opts.seed, sim_opts.no_programs).into_iter();
    let mut rng = rngs.next().context("No program to play!")?;
    let mut state = ProgramState::new();
    let mut all_results = Vec::with_capacity(sim_opts.no_programs as usize);
    state.generate_program_with_rng(&mut rng);

    loop {
        let round = match state.get_current_round() {
            Some(round) => round.clone(),
            None => {
                all_results.push(state.get_results().to_vec());
                rng = match rngs.next() {
                    Some(rng) => rng,
                    None => break,
                };
                state.generate_program_with_rng(&mut rng);
                continue;
            }
        };

        state.start_round();
        let durations =
            calc_race_durations_with_rng(&round.horses, round.distance, race_consts, &mut rng);

        let (tx, rx) = flume::unbounded();
        let (tx_cmd, rx_cmd) = flume::unbounded();
        let timestep_size = sim_opts.timestep_size;
        let realtime_factor = sim_opts.realtime_factor;
        let race_thread = thread::spawn(move || {
            handle_race(
                &round,
                &durations,
                timestep_size,
                Some(&tx),
                Some(&rx_cmd),
                realtime_factor,
            )
        });

        let mut regenerate = false;
        let final_result = loop {
            let event = flume::Selector::new()
                .recv(&rx, Event::Race)
                .recv(&rx_input, Event::Input)
                .wait();

            match event {
                Event::Race(Ok(race_state)) => {
                    if race_state.final_result.is_some() {
                        break race_state.final_result;
                    }
                    let no_arrived = race_state.horse_states.iter().filter(|h| h.arrived).count();
                    debug!(
                        round_no = race_state.round_no,
                        elapsed_ms = race_state.elapsed_ms,
                        no_arrived,
                        "race progress"
                    );
                }
                // race thread stopped without a final result
                Event::Race(Err(_)) => break None,
                Event::Input(Ok(line)) => match line.trim() {
                    "p" => {
                        state.toggle_pause();
                        if tx_cmd.send(RaceCommand::TogglePause).is_err() {
                            warn!("Race thread is not listening anymore!");
                        }
                        info!(is_paused = state.is_paused(), "toggled pause");
                    }
                    "g" => {
                        let _ = tx_cmd.send(RaceCommand::Abort);
                        regenerate = true;
                        break None;
                    }
                    other => warn!("Unknown command {:?}", other),
                },
                Event::Input(Err(_)) => break None,
            }
        };

        race_thread
            .join()
            .map_err(|_| anyhow::anyhow!("Race thread panicked!"))?
            .context("Failed to play round!")?;

        if regenerate {
            info!("regenerating program, discarding current round");
            state.generate_program_with_rng(&mut rng);
            continue;
        }

        let result = final_result.context("Round ended without a result!")?;
        result.print_rankings();
        state.complete_round(result);
    }

    Ok(all_results)
}

/// output_path_for returns the result file path of the i-th program. With more than one program
/// the index is appended to the file stem.
fn output_path_for(path: &Path, program_idx: usize, no_programs: usize) -> PathBuf {
    if no_programs <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_owned());
    let file_name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, program_idx + 1, ext.to_string_lossy()),
        None => format!("{}_{}", stem, program_idx + 1),
    };
    path.with_file_name(file_name)
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();
    init_logging(sim_opts.debug);
    sim_opts.validate().context("Invalid command line option!")?;

    // get race constants
    let race_consts = if let Some(parfile_path) = &sim_opts.parfile_path {
        info!("Reading race constants from {:?}", parfile_path);
        read_race_constants(parfile_path)?
    } else {
        RaceConstants::default()
    };

    // EXECUTION -----------------------------------------------------------------------------------
    let all_results = if !sim_opts.live {
        info!(no_programs = sim_opts.no_programs, "Running programs without animation...");
        let t_start = Instant::now();

        let all_results = program_rngs(sim_opts.seed, sim_opts.no_programs)
            .into_par_iter()
            .map(|rng| play_program(&race_consts, rng))
            .collect::<anyhow::Result<Vec<Vec<RaceResult>>>>()?;

        info!("Execution time: {}ms", t_start.elapsed().as_millis());

        for (i, results) in all_results.iter().enumerate() {
            println!("RESULT: Program {}", i + 1);
            for result in results {
                result.print_rankings();
            }
        }
        all_results
    } else {
        info!("Running programs in real-time...");
        play_programs_live(&sim_opts, &race_consts)?
    };

    // POST-PROCESSING -----------------------------------------------------------------------------
    for (i, results) in all_results.iter().enumerate() {
        print_standings(results);

        if let Some(output_path) = &sim_opts.output_path {
            let path = output_path_for(output_path, i, all_results.len());
            write_results_to_file(results, &path)?;
            info!("Results written to {:?}", path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_programs_are_reproducible() {
        let consts = RaceConstants::default();
        let first = play_program(&consts, program_rngs(Some(11), 1).remove(0)).unwrap();
        let second = play_program(&consts, program_rngs(Some(11), 1).remove(0)).unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
    }

    #[test]
    fn neighbouring_seeds_do_not_share_programs() {
        let consts = RaceConstants::default();
        let seed_zero = program_rngs(Some(0), 2);
        let seed_one = program_rngs(Some(1), 2);
        let second_of_zero = play_program(&consts, seed_zero[1].clone()).unwrap();
        let first_of_one = play_program(&consts, seed_one[0].clone()).unwrap();
        assert_ne!(second_of_zero, first_of_one);
    }

    #[test]
    fn program_seeds_do_not_depend_on_program_count() {
        let consts = RaceConstants::default();
        let few = program_rngs(Some(5), 2);
        let many = program_rngs(Some(5), 4);
        assert_eq!(many.len(), 4);
        for (a, b) in few.into_iter().zip(many.into_iter()) {
            assert_eq!(play_program(&consts, a).unwrap(), play_program(&consts, b).unwrap());
        }
    }

    #[test]
    fn output_paths_are_numbered_for_several_programs() {
        let path = Path::new("out/results.csv");
        assert_eq!(output_path_for(path, 0, 1), PathBuf::from("out/results.csv"));
        assert_eq!(output_path_for(path, 1, 3), PathBuf::from("out/results_2.csv"));
        assert_eq!(
            output_path_for(Path::new("results"), 0, 2),
            PathBuf::from("results_1")
        );
    }
}
