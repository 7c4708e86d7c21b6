use crate::core::horse::{generate_horse_list_with_rng, Horse};
use crate::core::program::{generate_program_list, Round, NO_ROUNDS};
use crate::post::race_result::RaceResult;
use rand::Rng;
use tracing::{debug, info, warn};

/// Observable state of a program. `RoundComplete` is passed through inside `complete_round` and is
/// therefore never observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    ProgramReady,
    Racing,
    Paused,
    Finished,
}

/// ProgramState is the single owner of the roster, the program, the result log and the race
/// flags. Calls outside their preconditions are no-ops.
#[derive(Debug, Clone)]
pub struct ProgramState {
    all_horses: Vec<Horse>,
    program_list: Vec<Round>,
    results: Vec<RaceResult>,
    cur_round_no: u32,
    is_racing: bool,
    is_paused: bool,
    is_program_generated: bool,
}

impl Default for ProgramState {
    fn default() -> Self {
        ProgramState {
            all_horses: Vec::new(),
            program_list: Vec::new(),
            results: Vec::new(),
            cur_round_no: 1,
            is_racing: false,
            is_paused: false,
            is_program_generated: false,
        }
    }
}

impl ProgramState {
    pub fn new() -> ProgramState {
        ProgramState::default()
    }

    // ---------------------------------------------------------------------------------------------
    // OPERATIONS ----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// generate_program discards all previous state and generates a new roster and program using
    /// the thread-local random source.
    pub fn generate_program(&mut self) {
        self.generate_program_with_rng(&mut rand::thread_rng())
    }

    /// generate_program_with_rng discards all previous state, generates a new roster of 20 horses
    /// and draws one round per race distance from it.
    pub fn generate_program_with_rng<R: Rng>(&mut self, rng: &mut R) {
        let all_horses = generate_horse_list_with_rng(rng);
        let program_list = generate_program_list(&all_horses, rng);

        // replace everything at once so that no partial state survives a regeneration
        *self = ProgramState {
            all_horses,
            program_list,
            is_program_generated: true,
            ..ProgramState::default()
        };

        info!(
            no_horses = self.all_horses.len(),
            no_rounds = self.program_list.len(),
            "generated new program"
        );
    }

    /// start_round starts the race of the current round. Returns false (and changes nothing) if
    /// a race is already running or there is no current round.
    pub fn start_round(&mut self) -> bool {
        if self.is_racing {
            warn!(round_no = self.cur_round_no, "race is already running");
            return false;
        }

        let (round_no, distance) = match self.get_current_round() {
            Some(round) => (round.round_no, round.distance),
            None => {
                warn!("no round left to start");
                return false;
            }
        };

        self.is_racing = true;
        self.is_paused = false;
        info!(round_no, distance, "started round");
        true
    }

    /// toggle_pause pauses or resumes the running race. Has no effect if no race is running.
    pub fn toggle_pause(&mut self) {
        if self.is_racing {
            self.is_paused = !self.is_paused;
            debug!(is_paused = self.is_paused, "toggled pause");
        }
    }

    /// complete_round appends the result to the log, stops the race and advances to the next
    /// round. Calls without a program or after the final round are ignored.
    pub fn complete_round(&mut self, result: RaceResult) {
        if !self.is_program_generated {
            warn!(round_no = result.round_no, "no program generated, ignoring result");
            return;
        }
        if self.is_finished() {
            warn!(
                round_no = result.round_no,
                "program is finished, ignoring result"
            );
            return;
        }

        info!(
            round_no = result.round_no,
            winner = %result.winner.name,
            "completed round"
        );
        self.results.push(result);
        self.is_racing = false;
        self.is_paused = false;
        self.cur_round_no += 1;
    }

    // ---------------------------------------------------------------------------------------------
    // QUERIES -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// get_current_round returns the round matching the round pointer, or None if the program is
    /// finished or was not generated yet.
    pub fn get_current_round(&self) -> Option<&Round> {
        if self.is_finished() {
            return None;
        }
        self.program_list
            .iter()
            .find(|round| round.round_no == self.cur_round_no)
    }

    pub fn is_finished(&self) -> bool {
        self.cur_round_no as usize > NO_ROUNDS
    }

    pub fn get_state(&self) -> State {
        if !self.is_program_generated {
            State::Idle
        } else if self.is_finished() {
            State::Finished
        } else if self.is_paused {
            State::Paused
        } else if self.is_racing {
            State::Racing
        } else {
            State::ProgramReady
        }
    }

    pub fn get_all_horses(&self) -> &[Horse] {
        &self.all_horses
    }

    pub fn get_program_list(&self) -> &[Round] {
        &self.program_list
    }

    pub fn get_results(&self) -> &[RaceResult] {
        &self.results
    }

    pub fn get_cur_round_no(&self) -> u32 {
        self.cur_round_no
    }

    pub fn is_racing(&self) -> bool {
        self.is_racing
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_program_generated(&self) -> bool {
        self.is_program_generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::durations::calc_race_durations;
    use crate::core::program::{HORSES_PER_ROUND, RACE_DISTANCES};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generated_state() -> ProgramState {
        let mut state = ProgramState::new();
        state.generate_program_with_rng(&mut StdRng::seed_from_u64(3));
        state
    }

    fn play_current_round(state: &ProgramState) -> RaceResult {
        let round = state.get_current_round().unwrap().clone();
        let durations = calc_race_durations(&round.horses, round.distance);
        RaceResult::from_durations(&round, &durations).unwrap()
    }

    #[test]
    fn initial_state_is_idle() {
        let state = ProgramState::new();
        assert!(state.get_all_horses().is_empty());
        assert!(state.get_program_list().is_empty());
        assert!(state.get_results().is_empty());
        assert_eq!(state.get_cur_round_no(), 1);
        assert!(!state.is_racing());
        assert!(!state.is_paused());
        assert!(!state.is_program_generated());
        assert!(!state.is_finished());
        assert_eq!(state.get_state(), State::Idle);
        assert!(state.get_current_round().is_none());
    }

    #[test]
    fn generated_program_matches_race_distances() {
        let state = generated_state();
        assert_eq!(state.get_state(), State::ProgramReady);
        assert_eq!(state.get_all_horses().len(), 20);

        let distances: Vec<u32> = state.get_program_list().iter().map(|r| r.distance).collect();
        assert_eq!(distances, RACE_DISTANCES.to_vec());
        assert_eq!(distances, vec![1200, 1400, 1600, 1800, 2000, 2200]);

        for round in state.get_program_list() {
            assert_eq!(round.horses.len(), HORSES_PER_ROUND);
            assert!(round
                .horses
                .iter()
                .all(|h| state.get_all_horses().contains(h)));
        }
        assert_eq!(state.get_current_round().unwrap().round_no, 1);
    }

    #[test]
    fn regeneration_resets_everything() {
        let mut state = generated_state();
        state.start_round();
        let result = play_current_round(&state);
        state.complete_round(result);
        state.start_round();
        state.toggle_pause();
        assert_eq!(state.get_state(), State::Paused);

        for seed in 0..3 {
            state.generate_program_with_rng(&mut StdRng::seed_from_u64(seed));
            assert_eq!(state.get_program_list().len(), NO_ROUNDS);
            assert!(state.get_results().is_empty());
            assert_eq!(state.get_cur_round_no(), 1);
            assert!(!state.is_racing());
            assert!(!state.is_paused());
            assert!(state.is_program_generated());
            assert_eq!(state.get_state(), State::ProgramReady);
        }
    }

    #[test]
    fn start_round_requires_a_program() {
        let mut state = ProgramState::new();
        assert!(!state.start_round());
        assert!(!state.is_racing());
    }

    #[test]
    fn start_round_while_racing_is_a_no_op() {
        let mut state = generated_state();
        assert!(state.start_round());
        state.toggle_pause();
        assert!(!state.start_round());
        assert!(state.is_racing());
        assert!(state.is_paused());
    }

    #[test]
    fn toggle_pause_without_race_keeps_flag() {
        let mut state = generated_state();
        state.toggle_pause();
        assert!(!state.is_paused());
    }

    #[test]
    fn toggle_pause_flips_flag_while_racing() {
        let mut state = generated_state();
        state.start_round();
        state.toggle_pause();
        assert!(state.is_paused());
        assert_eq!(state.get_state(), State::Paused);
        state.toggle_pause();
        assert!(!state.is_paused());
        assert_eq!(state.get_state(), State::Racing);
    }

    #[test]
    fn completing_a_round_clears_flags() {
        let mut state = generated_state();
        state.start_round();
        state.toggle_pause();
        let result = play_current_round(&state);
        state.complete_round(result);

        assert!(!state.is_racing());
        assert!(!state.is_paused());
        assert_eq!(state.get_cur_round_no(), 2);
        assert_eq!(state.get_results().len(), 1);
        assert_eq!(state.get_current_round().unwrap().distance, 1400);
    }

    #[test]
    fn six_rounds_finish_the_program() {
        let mut state = generated_state();

        for round_no in 1..=NO_ROUNDS as u32 {
            assert_eq!(state.get_cur_round_no(), round_no);
            assert!(!state.is_finished());
            assert!(state.start_round());
            let result = play_current_round(&state);
            assert_eq!(result.round_no, round_no);
            state.complete_round(result);
            assert!(state.get_results().len() as u32 <= state.get_cur_round_no() - 1);
        }

        assert_eq!(state.get_cur_round_no(), 7);
        assert!(state.is_finished());
        assert_eq!(state.get_state(), State::Finished);
        assert_eq!(state.get_results().len(), 6);
        assert!(state.get_current_round().is_none());
        assert!(!state.start_round());
    }

    #[test]
    fn pointer_only_reaches_finish_on_seventh_round() {
        let mut state = generated_state();
        let result = play_current_round(&state);

        for round_no in 1..=NO_ROUNDS as u32 {
            assert_eq!(state.get_cur_round_no(), round_no);
            assert!(!state.is_finished());
            state.complete_round(result.clone());
        }
        assert_eq!(state.get_cur_round_no(), 7);
        assert!(state.is_finished());
    }

    #[test]
    fn results_without_program_are_ignored() {
        let result = play_current_round(&generated_state());
        let mut state = ProgramState::new();
        state.complete_round(result);

        assert_eq!(state.get_cur_round_no(), 1);
        assert!(state.get_results().is_empty());
        assert_eq!(state.get_state(), State::Idle);
    }

    #[test]
    fn results_after_finish_are_ignored() {
        let mut state = generated_state();
        let mut last = None;
        for _ in 0..NO_ROUNDS {
            state.start_round();
            let result = play_current_round(&state);
            last = Some(result.clone());
            state.complete_round(result);
        }

        state.complete_round(last.unwrap());
        assert_eq!(state.get_cur_round_no(), 7);
        assert_eq!(state.get_results().len(), 6);
    }
}
