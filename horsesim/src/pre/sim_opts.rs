use clap::Parser;
use helpers::general::{check_positive, check_range, InputValueError};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "horsesim",
    about = "A horse race program simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Play rounds in real-time (type `p` + Enter to pause/resume, `g` + Enter to regenerate)
    #[clap(short, long)]
    pub live: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of programs played in sequence (a new program is generated for each)
    #[clap(short, long, default_value = "1")]
    pub no_programs: u32,

    /// Set path to a JSON file with race constants (OPTIONAL: if not set, defaults are used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set path of the CSV file the result log is written to (OPTIONAL)
    #[clap(short, long)]
    pub output_path: Option<PathBuf>,

    /// Set seed of the random source for reproducible programs (OPTIONAL)
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Set real-time factor (only relevant in live mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set timestep size in seconds (only relevant in live mode), should be in the range
    /// [0.001, 1.0]
    #[clap(short, long, default_value = "0.05")]
    pub timestep_size: f64,
}

impl SimOpts {
    /// validate checks the numeric options for sensible values.
    pub fn validate(&self) -> Result<(), InputValueError> {
        check_positive("no_programs", self.no_programs as f64)?;
        check_positive("realtime_factor", self.realtime_factor)?;
        check_range("timestep_size", self.timestep_size, 0.001, 1.0)?;
        Ok(())
    }
}
