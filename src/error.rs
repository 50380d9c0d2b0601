use std::path::PathBuf;
use thiserror::Error;

/// One field that failed the schema check, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Everything that can go wrong while validating a run.
///
/// Schema violations are collected and reported together; all other kinds
/// abort the current validation pass at the first failure.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("configuration failed schema validation:\n{}", format_violations(.violations))]
    Schema { violations: Vec<FieldViolation> },

    #[error("{0}")]
    CrossField(String),

    #[error("File {} does not exist.{}", .path.display(), format_hint(.hint))]
    MissingFile {
        path: PathBuf,
        hint: Option<&'static str>,
    },

    #[error("File {} has wrong dimensions. Expected 2D but got {:?}", .path.display(), .axes)]
    MissingAxes { path: PathBuf, axes: Vec<String> },

    #[error(
        "File {} has wrong dimensions. Expected {}x{} but got {}x{}",
        .path.display(),
        .expected_x,
        .expected_y,
        .actual_x,
        .actual_y
    )]
    DimensionMismatch {
        path: PathBuf,
        expected_x: usize,
        expected_y: usize,
        actual_x: usize,
        actual_y: usize,
    },

    #[error("Variable {} not found in file {}", .variable, .path.display())]
    MissingVariable { variable: String, path: PathBuf },

    #[error("Failed to open dataset {}: {}", .path.display(), .source)]
    Dataset {
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_hint(hint: &Option<&'static str>) -> String {
    match hint {
        Some(h) => format!(" {h}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_every_violation() {
        let err = CheckError::Schema {
            violations: vec![
                FieldViolation {
                    field: "syear".into(),
                    message: "must be an integer".into(),
                },
                FieldViolation {
                    field: "region".into(),
                    message: "unallowed value Mars".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("syear: must be an integer"));
        assert!(msg.contains("region: unallowed value Mars"));
    }

    #[test]
    fn missing_file_appends_hint_verbatim() {
        let err = CheckError::MissingFile {
            path: PathBuf::from("/data/states.nc"),
            hint: Some(
                "Consider enabling the option 'prepare_luh2_data' to prepare the missing file.",
            ),
        };
        assert_eq!(
            err.to_string(),
            "File /data/states.nc does not exist. Consider enabling the option 'prepare_luh2_data' to prepare the missing file."
        );
    }

    #[test]
    fn missing_file_without_hint_has_no_trailing_text() {
        let err = CheckError::MissingFile {
            path: PathBuf::from("grid.txt"),
            hint: None,
        };
        assert_eq!(err.to_string(), "File grid.txt does not exist.");
    }

    #[test]
    fn dimension_mismatch_names_expected_and_actual() {
        let err = CheckError::DimensionMismatch {
            path: PathBuf::from("lc.nc"),
            expected_x: 100,
            expected_y: 50,
            actual_x: 100,
            actual_y: 51,
        };
        assert_eq!(
            err.to_string(),
            "File lc.nc has wrong dimensions. Expected 100x50 but got 100x51"
        );
    }
}
