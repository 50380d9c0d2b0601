//! Naming tables for scenario-dependent input files.
//!
//! The LUH2 ScenarioMIP products embed an IAM naming token per scenario in a
//! fixed filename template; the historical family uses plain filenames. The
//! tables are passed into the requirement resolver explicitly so tests can
//! substitute synthetic ones.

use crate::config::{Config, Scenario};
use crate::error::CheckError;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const CAT_ADDED_TREE: &str = "added_tree_cover";
pub const CAT_STATES: &str = "multiple-states";
pub const CAT_TRANSITIONS: &str = "multiple-transitions";
pub const CAT_MANAGEMENT: &str = "multiple-management";

/// Scenario → ScenarioMIP naming token, plus the McGrath source token.
#[derive(Debug, Clone)]
pub struct NamingTables {
    tokens: BTreeMap<Scenario, String>,
    mcgrath_source: String,
}

impl Default for NamingTables {
    fn default() -> Self {
        let tokens = [
            (Scenario::Rcp19, "IMAGE-ssp119"),
            (Scenario::Rcp26, "IMAGE-ssp126"),
            (Scenario::Rcp34, "GCAM-ssp434"),
            (Scenario::Rcp45, "MESSAGE-ssp245"),
            (Scenario::Rcp60, "GCAM-ssp460"),
            (Scenario::Rcp70, "AIM-ssp370"),
            (Scenario::Rcp85, "MAGPIE-ssp585"),
        ]
        .into_iter()
        .map(|(s, t)| (s, t.to_string()))
        .collect();
        NamingTables {
            tokens,
            mcgrath_source: "McGrath2015_forest_frac".to_string(),
        }
    }
}

impl NamingTables {
    #[cfg(test)]
    pub(crate) fn synthetic(tokens: &[(Scenario, &str)], mcgrath_source: &str) -> Self {
        NamingTables {
            tokens: tokens
                .iter()
                .map(|(s, t)| (*s, t.to_string()))
                .collect(),
            mcgrath_source: mcgrath_source.to_string(),
        }
    }

    pub fn token(&self, scenario: Scenario) -> Option<&str> {
        self.tokens.get(&scenario).map(String::as_str)
    }

    /// Canonical LUH2 ScenarioMIP filename for one category under the given
    /// scenario, covering the fixed 2015-2100 window.
    pub fn luh2_filename(&self, category: &str, scenario: Scenario) -> Option<String> {
        self.token(scenario).map(|token| {
            format!(
                "{category}_input4MIPs_landState_ScenarioMIP_UofMD-{token}-2-1-f_gn_2015-2100.nc"
            )
        })
    }

    /// Source filename for the McGrath forest-fraction preparation step.
    pub fn mcgrath_source_filename(&self, syear: i32, mcgrath_eyear: i32) -> String {
        format!("{}_{}_{}.nc", self.mcgrath_source, syear, mcgrath_eyear)
    }
}

/// Scenario-dependent input filenames for one run, after path overrides.
///
/// `added_tree` is `None` for historical scenarios without an override; the
/// historical LUH2 family has no added-tree-cover product.
#[derive(Debug, Clone)]
pub struct ScenarioFiles {
    pub states: PathBuf,
    pub transitions: PathBuf,
    pub management: PathBuf,
    pub added_tree: Option<PathBuf>,
}

pub fn resolve_scenario_files(
    config: &Config,
    tables: &NamingTables,
) -> Result<ScenarioFiles, CheckError> {
    if config.scenario.is_historical() {
        return Ok(ScenarioFiles {
            states: config
                .path_file_states
                .clone()
                .unwrap_or_else(|| PathBuf::from("states.nc")),
            transitions: config
                .path_file_trans
                .clone()
                .unwrap_or_else(|| PathBuf::from("transitions.nc")),
            management: config
                .path_file_manag
                .clone()
                .unwrap_or_else(|| PathBuf::from("management.nc")),
            added_tree: config.path_file_addtree.clone(),
        });
    }

    let templated = |category: &str| -> Result<PathBuf, CheckError> {
        tables
            .luh2_filename(category, config.scenario)
            .map(PathBuf::from)
            .ok_or_else(|| {
                CheckError::CrossField(format!(
                    "No ScenarioMIP naming token known for scenario {:?}",
                    config.scenario
                ))
            })
    };

    Ok(ScenarioFiles {
        states: match &config.path_file_states {
            Some(p) => p.clone(),
            None => templated(CAT_STATES)?,
        },
        transitions: match &config.path_file_trans {
            Some(p) => p.clone(),
            None => templated(CAT_TRANSITIONS)?,
        },
        management: match &config.path_file_manag {
            Some(p) => p.clone(),
            None => templated(CAT_MANAGEMENT)?,
        },
        added_tree: Some(match &config.path_file_addtree {
            Some(p) => p.clone(),
            None => templated(CAT_ADDED_TREE)?,
        }),
    })
}
