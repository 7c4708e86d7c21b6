use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of horses generated per program.
pub const NO_HORSES: usize = 20;

/// Condition bounds (inclusive).
pub const CONDITION_MIN: u32 = 1;
pub const CONDITION_MAX: u32 = 100;

pub const HORSE_NAMES: [&str; NO_HORSES] = [
    "Ada Lovelace",
    "Grace Hopper",
    "Margaret Hamilton",
    "Hedy Lamarr",
    "Katherine Johnson",
    "Joan Clarke",
    "Radia Perlman",
    "Barbara Liskov",
    "Frances Allen",
    "Annie Easley",
    "Mary Jackson",
    "Dorothy Vaughan",
    "Jean Bartik",
    "Karen Jones",
    "Sophie Wilson",
    "Adele Goldberg",
    "Shafi Goldwasser",
    "Carol Shaw",
    "Lynn Conway",
    "Evelyn Boyd",
];

/// HorseColor is a (hex code, human readable name) pair used to paint a horse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorseColor {
    pub color_hex: &'static str,
    pub color_name: &'static str,
}

const fn color(color_hex: &'static str, color_name: &'static str) -> HorseColor {
    HorseColor {
        color_hex,
        color_name,
    }
}

pub const HORSE_COLORS: [HorseColor; NO_HORSES] = [
    color("#E53935", "Red"),
    color("#1E88E5", "Blue"),
    color("#43A047", "Green"),
    color("#FDD835", "Yellow"),
    color("#FB8C00", "Orange"),
    color("#8E24AA", "Purple"),
    color("#D81B60", "Pink"),
    color("#00ACC1", "Cyan"),
    color("#6D4C41", "Brown"),
    color("#000000", "Black"),
    color("#FFFFFF", "White"),
    color("#757575", "Gray"),
    color("#C0CA33", "Lime"),
    color("#3949AB", "Indigo"),
    color("#00897B", "Teal"),
    color("#FFB300", "Amber"),
    color("#5E35B1", "Violet"),
    color("#800000", "Maroon"),
    color("#000080", "Navy"),
    color("#808000", "Olive"),
];

/// * `id` - Per-generation label in 1..=20, not tied to name or color
/// * `name` - Display name, unique within a roster
/// * `condition` - Relative ability in [1, 100], higher is faster
/// * `color_hex` - Hex color code, e.g. #E53935
/// * `color_name` - Human readable color name, e.g. Red
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horse {
    pub id: u32,
    pub name: String,
    pub condition: u32,
    pub color_hex: String,
    pub color_name: String,
}

/// generate_horse_list creates a fresh roster of 20 horses using the thread-local random source.
pub fn generate_horse_list() -> Vec<Horse> {
    generate_horse_list_with_rng(&mut rand::thread_rng())
}

/// generate_horse_list_with_rng creates a fresh roster of 20 horses. Names and colors are both
/// uniform permutations of their pools (shuffled independently), ids are assigned positionally
/// after shuffling, and every condition is drawn uniformly from [1, 100].
pub fn generate_horse_list_with_rng<R: Rng>(rng: &mut R) -> Vec<Horse> {
    let mut names = HORSE_NAMES;
    let mut colors = HORSE_COLORS;
    names.shuffle(rng);
    colors.shuffle(rng);

    names
        .iter()
        .zip(colors.iter())
        .enumerate()
        .map(|(i, (name, color))| Horse {
            id: i as u32 + 1,
            name: (*name).to_owned(),
            condition: rng.gen_range(CONDITION_MIN..=CONDITION_MAX),
            color_hex: color.color_hex.to_owned(),
            color_name: color.color_name.to_owned(),
        })
        .collect()
}
