//! Dataset header inspection for gridded NetCDF inputs.
//!
//! Only axis names, axis lengths and variable presence are read; file
//! contents are never decoded. Handles are opened, inspected and dropped
//! immediately, never held across two checks.

use crate::error::CheckError;
use std::path::Path;

// Horizontal axis candidates, probed in this order; first match wins.
const X_AXES: [&str; 3] = ["x", "lon", "rlon"];
const Y_AXES: [&str; 3] = ["y", "lat", "rlat"];

/// Comparison mode for [`check_dimensions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimMode {
    /// Axis lengths must equal the expected grid size.
    Exact,
    /// Axis lengths must be no smaller than the expected grid size. Global
    /// background files are cropped to the regional window downstream, so
    /// oversize inputs are valid there.
    AtLeast,
}

/// Minimal read-only view over a gridded file's header.
pub trait GridInspect {
    fn axis_length(&self, name: &str) -> Option<usize>;
    fn axis_names(&self) -> Vec<String>;
    fn has_variable(&self, name: &str) -> bool;
}

/// Opens dataset handles at given paths; swapped for an in-memory fake in
/// tests.
pub trait DatasetOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn GridInspect>, CheckError>;
}

/// Opener backed by the netcdf crate.
pub struct NetcdfOpener;

impl DatasetOpener for NetcdfOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn GridInspect>, CheckError> {
        let file = netcdf::open(path).map_err(|source| CheckError::Dataset {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Box::new(NetcdfDataset { file }))
    }
}

struct NetcdfDataset {
    file: netcdf::File,
}

impl GridInspect for NetcdfDataset {
    fn axis_length(&self, name: &str) -> Option<usize> {
        self.file.dimension(name).map(|d| d.len())
    }

    fn axis_names(&self) -> Vec<String> {
        self.file.dimensions().map(|d| d.name().to_string()).collect()
    }

    fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }
}

/// Check a dataset's horizontal extent against the configured grid size.
///
/// The west-east axis is the first of `x`, `lon`, `rlon` present, the
/// north-south axis the first of `y`, `lat`, `rlat`. A dataset where either
/// pair has no match is rejected as not 2-D.
pub fn check_dimensions(
    dataset: &dyn GridInspect,
    path: &Path,
    xsize: usize,
    ysize: usize,
    mode: DimMode,
) -> Result<(), CheckError> {
    let actual_x = X_AXES.iter().find_map(|a| dataset.axis_length(a));
    let actual_y = Y_AXES.iter().find_map(|a| dataset.axis_length(a));
    let (Some(actual_x), Some(actual_y)) = (actual_x, actual_y) else {
        return Err(CheckError::MissingAxes {
            path: path.to_path_buf(),
            axes: dataset.axis_names(),
        });
    };

    let mismatch = match mode {
        DimMode::Exact => actual_x != xsize || actual_y != ysize,
        DimMode::AtLeast => actual_x < xsize || actual_y < ysize,
    };
    if mismatch {
        return Err(CheckError::DimensionMismatch {
            path: path.to_path_buf(),
            expected_x: xsize,
            expected_y: ysize,
            actual_x,
            actual_y,
        });
    }
    Ok(())
}
