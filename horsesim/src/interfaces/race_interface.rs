use crate::core::horse::Horse;
use crate::post::race_result::RaceResult;
use anyhow::Context;

pub const MAX_UPDATE_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// from_hex parses a CSS hex color such as #E53935.
    pub fn from_hex(color_hex: &str) -> anyhow::Result<RgbColor> {
        let tmp_color = color_hex
            .parse::<css_color_parser::Color>()
            .with_context(|| format!("Could not parse hex color {}!", color_hex))?;
        Ok(RgbColor {
            r: tmp_color.r,
            g: tmp_color.g,
            b: tmp_color.b,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct HorseState {
    pub horse_id: u32,
    pub name: String,
    pub color: RgbColor,
    // fraction of the race distance covered, in [0, 1]
    pub race_prog: f64,
    pub arrived: bool,
}

impl HorseState {
    pub fn new(horse: &Horse) -> anyhow::Result<HorseState> {
        Ok(HorseState {
            horse_id: horse.id,
            name: horse.name.to_owned(),
            color: RgbColor::from_hex(&horse.color_hex)?,
            race_prog: 0.0,
            arrived: false,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RaceState {
    pub round_no: u32,
    pub distance: u32,
    pub elapsed_ms: u64,
    pub horse_states: Vec<HorseState>,
    pub is_paused: bool,

    // final results payload (sent once when every horse arrived)
    pub final_result: Option<RaceResult>,
}

/// Commands sent from the owner of the program state to a running round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceCommand {
    TogglePause,
    Abort,
}
