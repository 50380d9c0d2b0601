//! Run configuration: typed fields, table-driven schema checking over the
//! raw YAML mapping, and the cross-field rules that tie years, the McGrath
//! window and the coordinate box together.

use crate::error::{CheckError, FieldViolation};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Region {
    Germany,
    Europe,
    WestAfrica,
    NorthAmerica,
    Australasia,
}

impl Region {
    pub const ALLOWED: &'static [&'static str] = &[
        "Germany",
        "Europe",
        "WestAfrica",
        "NorthAmerica",
        "Australasia",
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Germany => "Germany",
            Region::Europe => "Europe",
            Region::WestAfrica => "WestAfrica",
            Region::NorthAmerica => "NorthAmerica",
            Region::Australasia => "Australasia",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Historical,
    HistoricalHigh,
    HistoricalLow,
    Rcp19,
    Rcp26,
    Rcp34,
    Rcp45,
    Rcp60,
    Rcp70,
    Rcp85,
}

impl Scenario {
    pub const ALLOWED: &'static [&'static str] = &[
        "historical",
        "historical_high",
        "historical_low",
        "rcp19",
        "rcp26",
        "rcp34",
        "rcp45",
        "rcp60",
        "rcp70",
        "rcp85",
    ];

    /// The three historical variants share plain LUH2 filenames and skip the
    /// ScenarioMIP naming scheme.
    pub fn is_historical(self) -> bool {
        matches!(
            self,
            Scenario::Historical | Scenario::HistoricalHigh | Scenario::HistoricalLow
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remap {
    Bilinear,
    Con2,
}

impl Remap {
    pub const ALLOWED: &'static [&'static str] = &["bilinear", "con2"];
}

/// Validated run configuration. Constructed once via [`Config::from_yaml`],
/// read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub region: Region,
    pub scenario: Scenario,
    pub forward: bool,
    pub addtree: bool,
    pub backgrd: bool,
    pub mcgrath: bool,
    pub irri: bool,
    pub prepare_luh2_data: bool,
    pub prepare_mcgrath: bool,
    pub syear: i32,
    pub eyear: i32,
    #[serde(default)]
    pub mcgrath_eyear: Option<i32>,
    pub npfts: i32,
    pub vers: i32,
    pub gradef: i32,
    pub crodef: i32,
    pub shrdef: i32,
    pub xsize: usize,
    pub ysize: usize,
    pub grid: f64,
    pub remap: Remap,
    pub rcm_lsm_var: String,
    #[serde(default)]
    pub coords: Option<String>,
    #[serde(default)]
    pub path_file_states: Option<PathBuf>,
    #[serde(default)]
    pub path_file_trans: Option<PathBuf>,
    #[serde(default)]
    pub path_file_manag: Option<PathBuf>,
    #[serde(default)]
    pub path_file_addtree: Option<PathBuf>,
    #[serde(default)]
    pub path_file_rcm_lsm_in: Option<PathBuf>,
    #[serde(default)]
    pub path_file_lc_in: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backgra_global: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backshr_global: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backfor_global: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backurb_global: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backgra: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backshr: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backfor: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backurb: Option<PathBuf>,
    #[serde(default)]
    pub path_file_backcro: Option<PathBuf>,
    #[serde(default)]
    pub path_file_lsm: Option<PathBuf>,
}

// Declared kind of a configuration field, cerberus-style.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Bool,
    Int,
    PosInt,
    OptInt,
    Float,
    Str,
    OptStr,
    Enum(&'static [&'static str]),
}

const SCHEMA: &[(&str, Kind)] = &[
    ("region", Kind::Enum(Region::ALLOWED)),
    ("scenario", Kind::Enum(Scenario::ALLOWED)),
    ("forward", Kind::Bool),
    ("addtree", Kind::Bool),
    ("backgrd", Kind::Bool),
    ("mcgrath", Kind::Bool),
    ("irri", Kind::Bool),
    ("prepare_luh2_data", Kind::Bool),
    ("prepare_mcgrath", Kind::Bool),
    ("syear", Kind::Int),
    ("eyear", Kind::Int),
    ("mcgrath_eyear", Kind::OptInt),
    ("npfts", Kind::Int),
    ("vers", Kind::Int),
    ("gradef", Kind::Int),
    ("crodef", Kind::Int),
    ("shrdef", Kind::Int),
    ("xsize", Kind::PosInt),
    ("ysize", Kind::PosInt),
    ("grid", Kind::Float),
    ("remap", Kind::Enum(Remap::ALLOWED)),
    ("rcm_lsm_var", Kind::Str),
    ("coords", Kind::OptStr),
    ("path_file_states", Kind::OptStr),
    ("path_file_trans", Kind::OptStr),
    ("path_file_manag", Kind::OptStr),
    ("path_file_addtree", Kind::OptStr),
    ("path_file_rcm_lsm_in", Kind::OptStr),
    ("path_file_lc_in", Kind::OptStr),
    ("path_file_backgra_global", Kind::OptStr),
    ("path_file_backshr_global", Kind::OptStr),
    ("path_file_backfor_global", Kind::OptStr),
    ("path_file_backurb_global", Kind::OptStr),
    ("path_file_backgra", Kind::OptStr),
    ("path_file_backshr", Kind::OptStr),
    ("path_file_backfor", Kind::OptStr),
    ("path_file_backurb", Kind::OptStr),
    ("path_file_backcro", Kind::OptStr),
    ("path_file_lsm", Kind::OptStr),
];

impl Config {
    /// Validate the raw YAML mapping against the schema, then build the
    /// typed configuration and apply the cross-field rules.
    ///
    /// Schema violations are collected across all fields and reported as one
    /// error; the cross-field rules then fail one at a time.
    pub fn from_yaml(raw: &Value) -> Result<Config, CheckError> {
        let violations = check_schema(raw);
        if !violations.is_empty() {
            return Err(CheckError::Schema { violations });
        }
        let config: Config = serde_yaml::from_value(raw.clone()).map_err(|e| CheckError::Schema {
            violations: vec![FieldViolation {
                field: "config".into(),
                message: e.to_string(),
            }],
        })?;
        config.check_cross_fields()?;
        Ok(config)
    }

    fn check_cross_fields(&self) -> Result<(), CheckError> {
        if self.syear >= self.eyear {
            return Err(CheckError::CrossField(
                "Starting year (syear) must be smaller than ending year (eyear)".into(),
            ));
        }
        if self.mcgrath
            && let Some(mcgrath_eyear) = self.mcgrath_eyear
        {
            if mcgrath_eyear > self.eyear {
                return Err(CheckError::CrossField(
                    "Mcgrath year (mcgrath_eyear) must be equal or smaller than ending year (eyear)"
                        .into(),
                ));
            }
            if mcgrath_eyear < self.syear {
                return Err(CheckError::CrossField(
                    "Mcgrath year (mcgrath_eyear) must be equal or bigger than starting year (syear)"
                        .into(),
                ));
            }
        }
        if let Some(coords) = &self.coords {
            let parts: Vec<&str> = coords.split(',').collect();
            if parts.len() != 4 {
                return Err(CheckError::CrossField(
                    "Coordinates must be given as 4 values (lonmin,lonmax,latmin,latmax) separated by commas"
                        .into(),
                ));
            }
            if parts.iter().any(|p| p.trim().parse::<f64>().is_err()) {
                return Err(CheckError::CrossField(
                    "Coordinates must be given as float values".into(),
                ));
            }
        }
        Ok(())
    }
}

fn check_schema(raw: &Value) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    let Some(map) = raw.as_mapping() else {
        violations.push(FieldViolation {
            field: "config".into(),
            message: "configuration must be a mapping of fields to values".into(),
        });
        return violations;
    };

    for (name, kind) in SCHEMA {
        check_field(map.get(*name), name, *kind, &mut violations);
    }

    for key in map.keys() {
        let Some(key) = key.as_str() else {
            violations.push(FieldViolation {
                field: format!("{key:?}"),
                message: "field names must be strings".into(),
            });
            continue;
        };
        if !SCHEMA.iter().any(|(name, _)| *name == key) {
            violations.push(FieldViolation {
                field: key.into(),
                message: "unknown field".into(),
            });
        }
    }

    violations
}

fn check_field(
    value: Option<&Value>,
    name: &str,
    kind: Kind,
    violations: &mut Vec<FieldViolation>,
) {
    let optional = matches!(kind, Kind::OptInt | Kind::OptStr);
    let value = match value {
        None => {
            if !optional {
                violations.push(FieldViolation {
                    field: name.into(),
                    message: "required field is missing".into(),
                });
            }
            return;
        }
        Some(Value::Null) if optional => return,
        Some(v) => v,
    };

    let message = match kind {
        Kind::Bool if value.as_bool().is_none() => Some("must be a boolean"),
        Kind::Int | Kind::OptInt if value.as_i64().is_none() => Some("must be an integer"),
        Kind::PosInt if value.as_i64().is_none_or(|n| n <= 0) => {
            Some("must be a positive integer")
        }
        Kind::Float if value.as_f64().is_none() => Some("must be a float"),
        Kind::Str | Kind::OptStr if value.as_str().is_none() => Some("must be a string"),
        Kind::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => None,
            Some(s) => {
                violations.push(FieldViolation {
                    field: name.into(),
                    message: format!(
                        "unallowed value {s} --> Select one of the following values: {allowed:?}"
                    ),
                });
                None
            }
            None => Some("must be a string"),
        },
        _ => None,
    };

    if let Some(message) = message {
        violations.push(FieldViolation {
            field: name.into(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BASE_YAML: &str = "\
region: Germany
scenario: historical
forward: false
addtree: false
backgrd: false
mcgrath: false
irri: false
prepare_luh2_data: false
prepare_mcgrath: false
syear: 1979
eyear: 2015
mcgrath_eyear: 2010
npfts: 16
vers: 1
gradef: 9
crodef: 13
shrdef: 11
xsize: 100
ysize: 50
grid: 0.11
remap: bilinear
rcm_lsm_var: FR_LAND
";

    pub(crate) fn config_with(overrides: &[(&str, Value)]) -> Result<Config, CheckError> {
        let mut raw: Value = serde_yaml::from_str(BASE_YAML).expect("base fixture parses");
        let map = raw.as_mapping_mut().expect("base fixture is a mapping");
        for (key, value) in overrides {
            map.insert(Value::from(*key), value.clone());
        }
        Config::from_yaml(&raw)
    }

    pub(crate) fn base_config() -> Config {
        config_with(&[]).expect("base fixture is valid")
    }

    fn violations(result: Result<Config, CheckError>) -> Vec<FieldViolation> {
        match result {
            Err(CheckError::Schema { violations }) => violations,
            other => panic!("expected schema violations, got {other:?}"),
        }
    }

    // -- schema ------------------------------------------------------------

    #[test]
    fn base_fixture_is_accepted() {
        let config = base_config();
        assert_eq!(config.region, Region::Germany);
        assert_eq!(config.scenario, Scenario::Historical);
        assert_eq!(config.xsize, 100);
        assert_eq!(config.mcgrath_eyear, Some(2010));
        assert!(config.coords.is_none());
    }

    #[test]
    fn all_bad_fields_are_reported_together() {
        let bad = violations(config_with(&[
            ("region", Value::from("Mars")),
            ("syear", Value::from("nineteen")),
            ("irri", Value::from(5)),
        ]));
        assert_eq!(bad.len(), 3);
        let fields: Vec<&str> = bad.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"region"));
        assert!(fields.contains(&"syear"));
        assert!(fields.contains(&"irri"));
    }

    #[test]
    fn enum_violation_names_the_allowed_set() {
        let bad = violations(config_with(&[("scenario", Value::from("rcp99"))]));
        assert_eq!(bad.len(), 1);
        assert!(bad[0].message.contains("unallowed value rcp99"));
        assert!(bad[0].message.contains("Select one of the following values"));
        assert!(bad[0].message.contains("rcp85"));
    }

    #[test]
    fn unknown_field_is_a_violation() {
        let bad = violations(config_with(&[("nyears", Value::from(10))]));
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].field, "nyears");
        assert_eq!(bad[0].message, "unknown field");
    }

    #[test]
    fn missing_required_field_is_a_violation() {
        let raw: Value = serde_yaml::from_str("region: Germany").expect("parses");
        let bad = violations(Config::from_yaml(&raw));
        assert!(bad.iter().any(|v| v.field == "eyear"));
        assert!(bad.iter().all(|v| v.field != "region"));
        // optional fields never show up as missing
        assert!(bad.iter().all(|v| v.field != "coords"));
    }

    #[test]
    fn grid_size_must_be_positive() {
        let bad = violations(config_with(&[("xsize", Value::from(-100))]));
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].field, "xsize");
        assert_eq!(bad[0].message, "must be a positive integer");
    }

    #[test]
    fn null_optional_fields_are_accepted() {
        let config = config_with(&[("mcgrath_eyear", Value::Null), ("coords", Value::Null)])
            .expect("nullable fields accept null");
        assert!(config.mcgrath_eyear.is_none());
        assert!(config.coords.is_none());
    }

    // -- cross-field rules -------------------------------------------------

    #[test]
    fn syear_must_precede_eyear() {
        let err = config_with(&[("syear", Value::from(2020))]).unwrap_err();
        match err {
            CheckError::CrossField(msg) => assert!(msg.contains("syear")),
            other => panic!("expected CrossField, got {other:?}"),
        }
    }

    #[test]
    fn equal_years_are_rejected() {
        let err = config_with(&[("syear", Value::from(2015))]).unwrap_err();
        assert!(matches!(err, CheckError::CrossField(_)));
    }

    #[test]
    fn mcgrath_eyear_outside_window_is_rejected() {
        let late = config_with(&[
            ("mcgrath", Value::from(true)),
            ("mcgrath_eyear", Value::from(2020)),
        ])
        .unwrap_err();
        match late {
            CheckError::CrossField(msg) => assert!(msg.contains("smaller than ending year")),
            other => panic!("expected CrossField, got {other:?}"),
        }

        let early = config_with(&[
            ("mcgrath", Value::from(true)),
            ("mcgrath_eyear", Value::from(1950)),
        ])
        .unwrap_err();
        match early {
            CheckError::CrossField(msg) => assert!(msg.contains("bigger than starting year")),
            other => panic!("expected CrossField, got {other:?}"),
        }
    }

    #[test]
    fn mcgrath_window_is_ignored_when_flag_is_off() {
        let config = config_with(&[("mcgrath_eyear", Value::from(2050))])
            .expect("mcgrath_eyear unchecked without the mcgrath flag");
        assert_eq!(config.mcgrath_eyear, Some(2050));
    }

    #[test]
    fn coords_must_be_four_float_tokens() {
        assert!(config_with(&[("coords", Value::from("5.0,10.0,45.0,50.0"))]).is_ok());

        let short = config_with(&[("coords", Value::from("5.0,10.0,45.0"))]).unwrap_err();
        match short {
            CheckError::CrossField(msg) => assert!(msg.contains("4 values")),
            other => panic!("expected CrossField, got {other:?}"),
        }

        let non_numeric = config_with(&[("coords", Value::from("a,b,c,d"))]).unwrap_err();
        match non_numeric {
            CheckError::CrossField(msg) => assert!(msg.contains("float values")),
            other => panic!("expected CrossField, got {other:?}"),
        }
    }
}
