use crate::core::horse::Horse;
use crate::core::program::Round;
use anyhow::Context;
use helpers::general::{argsort, SortOrder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::path::Path;

/// RaceResult is the recorded outcome of one completed round.
/// * `round_no` - Round number the result belongs to
/// * `winner` - Horse with the smallest duration
/// * `rankings` - All horses of the round, fastest first
/// * `finish_times_ms` - (ms) Durations aligned with `rankings`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RaceResult {
    pub round_no: u32,
    pub winner: Horse,
    pub rankings: Vec<Horse>,
    pub finish_times_ms: Vec<u64>,
}

/// One line of the result file.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    round: u32,
    position: usize,
    horse_id: u32,
    name: &'a str,
    condition: u32,
    color: &'a str,
    time_ms: u64,
}

impl RaceResult {
    /// from_durations ranks the horses of a round by ascending duration. Equal durations keep the
    /// lane order. Horses without a duration are ranked last. Returns None for a round without
    /// horses since there is no winner.
    pub fn from_durations(round: &Round, durations: &HashMap<u32, u64>) -> Option<RaceResult> {
        let times: Vec<u64> = round
            .horses
            .iter()
            .map(|horse| durations.get(&horse.id).copied().unwrap_or(u64::MAX))
            .collect();
        let order = argsort(&times, SortOrder::Ascending);

        let rankings: Vec<Horse> = order.iter().map(|&i| round.horses[i].clone()).collect();
        let finish_times_ms = order.iter().map(|&i| times[i]).collect();

        Some(RaceResult {
            round_no: round.round_no,
            winner: rankings.first()?.clone(),
            rankings,
            finish_times_ms,
        })
    }

    /// print_rankings prints the ranking table of the round to the console output.
    pub fn print_rankings(&self) {
        let mut tmp_string = String::new();

        for (i, (horse, time)) in self
            .rankings
            .iter()
            .zip(self.finish_times_ms.iter())
            .enumerate()
        {
            // writing into a String cannot fail
            let _ = writeln!(
                &mut tmp_string,
                "{:3}, {:3}, {:20}, {:3}%, {:8}, {:8.3}s",
                i + 1,
                horse.id,
                horse.name,
                horse.condition,
                horse.color_name,
                *time as f64 / 1000.0
            );
        }

        println!("RESULT: Round {} (winner: {})", self.round_no, self.winner.name);
        println!("pos,  id, name                , cond, color   ,      time");
        print!("{}", tmp_string);
    }
}

/// write_results_to_file writes the result log as CSV, one line per ranked horse.
pub fn write_results_to_file(results: &[RaceResult], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create result file {}!", path.display()))?;

    for result in results {
        for (i, (horse, &time_ms)) in result
            .rankings
            .iter()
            .zip(result.finish_times_ms.iter())
            .enumerate()
        {
            writer
                .serialize(ResultRow {
                    round: result.round_no,
                    position: i + 1,
                    horse_id: horse.id,
                    name: &horse.name,
                    condition: horse.condition,
                    color: &horse.color_hex,
                    time_ms,
                })
                .context("Failed to write result row!")?;
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush result file {}!", path.display()))?;
    Ok(())
}

/// count_wins returns the number of won rounds per horse name.
pub fn count_wins(results: &[RaceResult]) -> BTreeMap<&str, u32> {
    let mut wins = BTreeMap::new();
    for result in results {
        *wins.entry(result.winner.name.as_str()).or_insert(0) += 1;
    }
    wins
}

/// print_standings prints the number of won rounds per horse to the console output.
pub fn print_standings(results: &[RaceResult]) {
    let mut standings: Vec<(&str, u32)> = count_wins(results).into_iter().collect();
    standings.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    println!("RESULT: Standings after {} rounds", results.len());
    for (name, wins) in standings {
        println!("{:20}, {} win(s)", name, wins);
    }
}
