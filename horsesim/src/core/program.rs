use crate::core::horse::Horse;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of rounds in a program.
pub const NO_ROUNDS: usize = 6;

/// Number of horses racing in a single round.
pub const HORSES_PER_ROUND: usize = 10;

/// (m) Race distance of every round, strictly increasing.
pub const RACE_DISTANCES: [u32; NO_ROUNDS] = [1200, 1400, 1600, 1800, 2000, 2200];

/// * `round_no` - Round number (1-based)
/// * `distance` - (m) Race distance
/// * `horses` - Horses racing in this round, in lane order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub round_no: u32,
    pub distance: u32,
    pub horses: Vec<Horse>,
}

/// generate_program_list builds one round per race distance. Every round samples its horses
/// uniformly without replacement from the full pool; draws of different rounds are independent
/// and may overlap arbitrarily.
pub fn generate_program_list<R: Rng>(all_horses: &[Horse], rng: &mut R) -> Vec<Round> {
    RACE_DISTANCES
        .iter()
        .enumerate()
        .map(|(i, &distance)| Round {
            round_no: i as u32 + 1,
            distance,
            horses: all_horses
                .choose_multiple(rng, HORSES_PER_ROUND)
                .cloned()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::horse::generate_horse_list_with_rng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn distances_are_strictly_increasing() {
        assert!(RACE_DISTANCES.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn program_has_six_rounds_of_ten_distinct_horses() {
        let mut rng = StdRng::seed_from_u64(42);
        let horses = generate_horse_list_with_rng(&mut rng);
        let program_list = generate_program_list(&horses, &mut rng);

        assert_eq!(program_list.len(), NO_ROUNDS);
        for (i, round) in program_list.iter().enumerate() {
            assert_eq!(round.round_no, i as u32 + 1);
            assert_eq!(round.distance, RACE_DISTANCES[i]);
            assert_eq!(round.horses.len(), HORSES_PER_ROUND);

            let ids: HashSet<u32> = round.horses.iter().map(|h| h.id).collect();
            assert_eq!(ids.len(), HORSES_PER_ROUND);
            assert!(round.horses.iter().all(|h| horses.contains(h)));
        }
    }

    #[test]
    fn small_pool_yields_short_rounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let horses: Vec<Horse> = generate_horse_list_with_rng(&mut rng)
            .into_iter()
            .take(4)
            .collect();
        let program_list = generate_program_list(&horses, &mut rng);
        assert!(program_list.iter().all(|r| r.horses.len() == 4));
    }
}
