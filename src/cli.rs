use clap::{Parser, command};
use std::path::PathBuf;

use crate::checks::Stage;

/// Validate the configuration and input files of a land cover run
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the run configuration (YAML)
    pub config: PathBuf,

    /// Pipeline stage about to run
    #[arg(value_enum)]
    pub stage: Stage,

    /// Directory holding the run's input data
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,
}

pub fn get_args() -> Args {
    Args::parse()
}
