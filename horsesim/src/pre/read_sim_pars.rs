use crate::core::durations::RaceConstants;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;

/// read_race_constants reads the JSON file and decodes it into the race constants. Fields missing
/// in the file keep their default values. The constants are validated before they are returned.
pub fn read_race_constants(filepath: &Path) -> anyhow::Result<RaceConstants> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .with_context(|| format!("Failed to open race constants file {}!", filepath.display()))?;
    let consts: RaceConstants = serde_json::from_reader(&fh)
        .with_context(|| format!("Failed to parse race constants file {}!", filepath.display()))?;
    consts
        .validate()
        .with_context(|| format!("Invalid race constants in file {}!", filepath.display()))?;
    Ok(consts)
}
