//! Logical file keys and the per-run namelist mapping them to paths.
//!
//! Keys are fixed identifiers; values are concrete paths, some of which only
//! come into existence as the pipeline advances through its stages.

use crate::config::Config;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const F_GRID: &str = "F_GRID";
pub const F_LC_IN: &str = "F_LC_IN";
pub const F_LC_OUT: &str = "F_LC_OUT";
pub const F_RCM_LSM_IN: &str = "F_RCM_LSM_IN";
pub const F_IRRI_IN: &str = "F_IRRI_IN";
pub const F_ADDTREE: &str = "F_ADDTREE";
pub const F_MCGRATH: &str = "F_MCGRATH";

/// Prefix shared by the four global background-fraction keys.
pub const GLOBAL_BACK_PREFIX: &str = "F_GLOBAL_BACK";
/// Prefix shared by the five region-level background-fraction keys.
pub const BACK_PREFIX: &str = "F_BACK";

const GLOBAL_BACK_KEYS: [(&str, &str); 4] = [
    ("F_GLOBAL_BACKGRA", "backgra_global.nc"),
    ("F_GLOBAL_BACKSHR", "backshr_global.nc"),
    ("F_GLOBAL_BACKFOR", "backfor_global.nc"),
    ("F_GLOBAL_BACKURB", "backurb_global.nc"),
];

/// Mapping of logical file keys to filesystem paths for one run.
///
/// Iteration is in key order, which fixes the order checks execute in.
#[derive(Debug, Clone, Default)]
pub struct Namelist {
    entries: BTreeMap<String, PathBuf>,
}

impl Namelist {
    pub fn new() -> Self {
        Namelist::default()
    }

    pub fn insert(&mut self, key: &str, path: impl Into<PathBuf>) {
        self.entries.insert(key.to_string(), path.into());
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries.get(key).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Derive the default namelist for a validated configuration.
    ///
    /// Every path lives under `data_dir` unless a configured override (which
    /// may be absolute) replaces it.
    pub fn build(config: &Config, data_dir: &Path) -> Namelist {
        let region = config.region.name();
        let mut namelist = Namelist::new();

        namelist.insert(F_GRID, data_dir.join(format!("grid_{region}.txt")));
        namelist.insert(
            F_LC_IN,
            resolve(
                data_dir,
                &config.path_file_lc_in,
                format!("{region}_landcover_{}_{}.nc", config.syear, config.eyear),
            ),
        );
        namelist.insert(
            F_LC_OUT,
            data_dir.join(format!(
                "{region}_landcover_processed_{}_{}.nc",
                config.syear, config.eyear
            )),
        );
        namelist.insert(
            F_RCM_LSM_IN,
            resolve(
                data_dir,
                &config.path_file_rcm_lsm_in,
                format!("lsm_{region}.nc"),
            ),
        );
        namelist.insert(F_IRRI_IN, data_dir.join(format!("irrigation_{region}.nc")));
        namelist.insert(F_ADDTREE, data_dir.join(format!("addtree_{region}.nc")));
        let mcgrath_eyear = config.mcgrath_eyear.unwrap_or(config.eyear);
        namelist.insert(
            F_MCGRATH,
            data_dir.join(format!(
                "mcgrath_{}_{}_{region}.nc",
                config.syear, mcgrath_eyear
            )),
        );

        for ((key, default), override_path) in GLOBAL_BACK_KEYS.iter().zip([
            &config.path_file_backgra_global,
            &config.path_file_backshr_global,
            &config.path_file_backfor_global,
            &config.path_file_backurb_global,
        ]) {
            namelist.insert(key, resolve(data_dir, override_path, default.to_string()));
        }

        let regional_back: [(&str, &Option<PathBuf>); 5] = [
            ("F_BACKGRA", &config.path_file_backgra),
            ("F_BACKSHR", &config.path_file_backshr),
            ("F_BACKFOR", &config.path_file_backfor),
            ("F_BACKURB", &config.path_file_backurb),
            ("F_BACKCRO", &config.path_file_backcro),
        ];
        for (key, override_path) in regional_back {
            let stem = key.trim_start_matches("F_").to_lowercase();
            namelist.insert(
                key,
                resolve(data_dir, override_path, format!("{stem}_{region}.nc")),
            );
        }

        namelist
    }
}

fn resolve(data_dir: &Path, override_path: &Option<PathBuf>, default: String) -> PathBuf {
    match override_path {
        // join() keeps absolute overrides as-is
        Some(p) => data_dir.join(p),
        None => data_dir.join(default),
    }
}
