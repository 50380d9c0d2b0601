use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

mod checks;
mod cli;
mod config;
mod error;
mod io;
mod namelist;
mod scenario;

use checks::{resolve_stage_checks, run_check};
use cli::get_args;
use config::Config;
use io::dataset::NetcdfOpener;
use namelist::Namelist;
use scenario::NamingTables;

fn main() -> Result<()> {
    let args = get_args();

    // Schema and cross-field validation come first, before any file I/O
    let text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read config file: {:?}", args.config))?;
    let raw: serde_yaml::Value = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {:?}", args.config))?;
    let config = Config::from_yaml(&raw)?;

    println!(
        "Validating {:?} inputs for region {} ({:?})",
        args.stage,
        config.region.name(),
        config.scenario
    );

    let namelist = Namelist::build(&config, &args.data_dir);
    let tables = NamingTables::default();
    let checks = resolve_stage_checks(args.stage, &config, &namelist, &tables, &args.data_dir)?;

    println!("Resolved {} file checks", checks.len());

    let pb = ProgressBar::new(checks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")?
            .progress_chars("#>-"),
    );

    let opener = NetcdfOpener;
    for check in &checks {
        run_check(check, &config, &opener)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "All {} required files are present and consistent",
        checks.len()
    );
    Ok(())
}
