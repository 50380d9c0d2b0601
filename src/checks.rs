//! Per-stage file requirement resolution and execution.
//!
//! Each validation pass is resolved into an ordered list of [`FileCheck`]
//! rows (a pure function of configuration and namelist), then the rows are
//! executed in order, stopping at the first failure. Keeping resolution and
//! execution apart makes every row inspectable on its own.

use crate::config::Config;
use crate::error::CheckError;
use crate::io::dataset::{DatasetOpener, DimMode, check_dimensions};
use crate::namelist::{self, Namelist};
use crate::scenario::{NamingTables, resolve_scenario_files};
use std::path::{Path, PathBuf};

pub const HINT_MCGRATH_SOURCE: &str =
    "Consider adding the missing file or disabling option 'prepare_mcgrath'.";
pub const HINT_RUN_PREPARE_MCGRATH: &str =
    "Consider enabling the option 'prepare_mcgrath' to prepare the missing file or disabling 'mcgrath'.";
pub const HINT_RUN_PREPARE_LUH2: &str =
    "Consider enabling the option 'prepare_luh2_data' to prepare the missing file.";

/// Pipeline stage about to run, selecting which validation pass applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Stage {
    /// Before any data preparation.
    RawInput,
    /// After the McGrath preparation step.
    McgrathPrepared,
    /// After the LUH2 preparation step.
    Preprocessed,
}

/// One row of a pass's resolved requirement set.
#[derive(Debug, Clone)]
pub struct FileCheck {
    pub key: String,
    pub file: PathBuf,
    pub base_dir: Option<PathBuf>,
    pub must_exist: bool,
    pub hint: Option<&'static str>,
    pub dims: Option<DimMode>,
    pub require_var: Option<String>,
}

impl FileCheck {
    fn exists(key: &str, file: impl Into<PathBuf>) -> Self {
        FileCheck {
            key: key.to_string(),
            file: file.into(),
            base_dir: None,
            must_exist: true,
            hint: None,
            dims: None,
            require_var: None,
        }
    }

    fn dims_only(key: &str, file: impl Into<PathBuf>, mode: DimMode) -> Self {
        FileCheck {
            key: key.to_string(),
            file: file.into(),
            base_dir: None,
            must_exist: false,
            hint: None,
            dims: Some(mode),
            require_var: None,
        }
    }

    fn under(mut self, dir: &Path) -> Self {
        self.base_dir = Some(dir.to_path_buf());
        self
    }

    fn hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    fn dims(mut self, mode: DimMode) -> Self {
        self.dims = Some(mode);
        self
    }

    fn variable(mut self, name: &str) -> Self {
        self.require_var = Some(name.to_string());
        self
    }

    /// Full path this row probes, with the base directory applied.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.base_dir {
            // join() keeps absolute files as-is
            Some(dir) => dir.join(&self.file),
            None => self.file.clone(),
        }
    }
}

/// Confirm a file exists, optionally under a base directory.
///
/// The error names the full resolved path and carries the caller's
/// remediation hint verbatim.
pub fn check_file_exists(
    file: &Path,
    base_dir: Option<&Path>,
    hint: Option<&'static str>,
) -> Result<PathBuf, CheckError> {
    let path = match base_dir {
        Some(dir) => dir.join(file),
        None => file.to_path_buf(),
    };
    if path.is_file() {
        Ok(path)
    } else {
        Err(CheckError::MissingFile { path, hint })
    }
}

pub fn resolve_stage_checks(
    stage: Stage,
    config: &Config,
    namelist: &Namelist,
    tables: &NamingTables,
    data_dir: &Path,
) -> Result<Vec<FileCheck>, CheckError> {
    match stage {
        Stage::RawInput => raw_input_checks(config, namelist, tables, data_dir),
        Stage::McgrathPrepared => Ok(mcgrath_prepared_checks(namelist)),
        Stage::Preprocessed => Ok(preprocessed_checks(config, namelist)),
    }
}

/// Requirements before any data preparation has run.
pub fn raw_input_checks(
    config: &Config,
    namelist: &Namelist,
    tables: &NamingTables,
    data_dir: &Path,
) -> Result<Vec<FileCheck>, CheckError> {
    let mut checks = Vec::new();

    for (key, path) in namelist.iter() {
        if key == namelist::F_GRID {
            // the grid file defines its own extent, no size comparison here
            checks.push(FileCheck::exists(key, path));
        } else if key == namelist::F_LC_IN {
            checks.push(FileCheck::exists(key, path).dims(DimMode::Exact));
        } else if key.starts_with(namelist::GLOBAL_BACK_PREFIX) && config.backgrd {
            checks.push(FileCheck::exists(key, path).dims(DimMode::AtLeast));
        }
    }

    if let Some(lsm) = &config.path_file_lsm {
        checks.push(
            FileCheck::exists("path_file_lsm", lsm)
                .dims(DimMode::Exact)
                .variable(&config.rcm_lsm_var),
        );
    }

    let files = resolve_scenario_files(config, tables)?;

    if config.prepare_mcgrath {
        let mcgrath_eyear = config.mcgrath_eyear.unwrap_or(config.eyear);
        let source = tables.mcgrath_source_filename(config.syear, mcgrath_eyear);
        checks.push(
            FileCheck::exists("mcgrath_source", source)
                .under(data_dir)
                .hint(HINT_MCGRATH_SOURCE),
        );
    }
    if config.prepare_luh2_data {
        checks.push(FileCheck::exists("transitions", &files.transitions).under(data_dir));
        checks.push(FileCheck::exists("states", &files.states).under(data_dir));
    }
    if config.irri {
        if !config.scenario.is_historical() {
            checks.push(FileCheck::exists("states", &files.states).under(data_dir));
        }
        checks.push(FileCheck::exists("management", &files.management).under(data_dir));
    }
    if config.addtree {
        match &files.added_tree {
            Some(path) => checks.push(FileCheck::exists("added_tree", path).under(data_dir)),
            None => {
                return Err(CheckError::CrossField(
                    "Option 'addtree' is enabled but the historical scenario family has no \
                     added tree cover file; set path_file_addtree"
                        .into(),
                ));
            }
        }
    }

    Ok(checks)
}

/// Requirements after the McGrath preparation stage.
pub fn mcgrath_prepared_checks(namelist: &Namelist) -> Vec<FileCheck> {
    let mut checks = Vec::new();
    for (key, path) in namelist.iter() {
        if key == namelist::F_MCGRATH {
            checks.push(
                FileCheck::exists(key, path)
                    .hint(HINT_RUN_PREPARE_MCGRATH)
                    .dims(DimMode::Exact),
            );
        }
    }
    checks
}

// Keys the preprocessed pass never requires: produced later (F_LC_OUT) or
// covered by their own flag-conditional rows below.
const PREPARED_EXEMPT: [&str; 4] = [
    namelist::F_IRRI_IN,
    namelist::F_ADDTREE,
    namelist::F_MCGRATH,
    namelist::F_LC_OUT,
];

/// Requirements after the LUH2 preparation stage.
pub fn preprocessed_checks(config: &Config, namelist: &Namelist) -> Vec<FileCheck> {
    let mut checks = Vec::new();
    for (key, path) in namelist.iter() {
        let background = key.starts_with(namelist::BACK_PREFIX)
            || key.starts_with(namelist::GLOBAL_BACK_PREFIX);

        if key == namelist::F_GRID {
            checks.push(FileCheck::exists(key, path));
        } else if !PREPARED_EXEMPT.contains(&key) && !background {
            checks.push(
                FileCheck::exists(key, path)
                    .hint(HINT_RUN_PREPARE_LUH2)
                    .dims(DimMode::Exact),
            );
        }

        if background && config.backgrd {
            checks.push(FileCheck::dims_only(key, path, DimMode::Exact));
        }
        if key == namelist::F_ADDTREE && config.addtree {
            checks.push(FileCheck::exists(key, path).dims(DimMode::Exact));
        }
        if key == namelist::F_IRRI_IN && config.irri {
            checks.push(
                FileCheck::exists(key, path)
                    .hint(HINT_RUN_PREPARE_LUH2)
                    .dims(DimMode::Exact),
            );
        }
    }
    checks
}

/// Execute one resolved row.
pub fn run_check(
    check: &FileCheck,
    config: &Config,
    opener: &dyn DatasetOpener,
) -> Result<(), CheckError> {
    let path = if check.must_exist {
        check_file_exists(&check.file, check.base_dir.as_deref(), check.hint)?
    } else {
        check.resolved_path()
    };

    if check.dims.is_none() && check.require_var.is_none() {
        return Ok(());
    }

    let dataset = opener.open(&path)?;
    if let Some(mode) = check.dims {
        check_dimensions(dataset.as_ref(), &path, config.xsize, config.ysize, mode)?;
    }
    if let Some(variable) = &check.require_var
        && !dataset.has_variable(variable)
    {
        return Err(CheckError::MissingVariable {
            variable: variable.clone(),
            path,
        });
    }
    Ok(())
}

/// Execute a pass's rows in order, aborting at the first failure.
pub fn run_checks(
    checks: &[FileCheck],
    config: &Config,
    opener: &dyn DatasetOpener,
) -> Result<(), CheckError> {
    for check in checks {
        run_check(check, config, opener)?;
    }
    Ok(())
}
