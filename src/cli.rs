//! Command-Line Interface Module
//!
//! Argument parsing for the pvcurve binary. The eight physical input fields
//! are accepted as raw text and only checked to be numeric here; the model
//! performs the binding parse and the invariant checks, so values typed on
//! the command line and values loaded from the parameter file travel the
//! same path.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::model::{DEFAULT_PARALLEL_STRINGS, DEFAULT_SERIES_CELLS};
use crate::params::DEFAULT_PARAMETERS_FILE;

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Module width in millimeters
    #[arg(long, allow_hyphen_values = true, value_parser = parse_numeric, env = "PVCURVE_MODULE_WIDTH")]
    pub module_width: Option<String>,

    /// Module length in millimeters
    #[arg(long, allow_hyphen_values = true, value_parser = parse_numeric, env = "PVCURVE_MODULE_LENGTH")]
    pub module_length: Option<String>,

    /// Light intensity in W/m²
    #[arg(long, allow_hyphen_values = true, value_parser = parse_numeric, env = "PVCURVE_LIGHT_INTENSITY")]
    pub light_intensity: Option<String>,

    /// Diode ideality factor (dimensionless, typically 1-2)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_numeric, env = "PVCURVE_IDEALITY_FACTOR")]
    pub ideality_factor: Option<String>,

    /// Dark saturation current density in mA/cm²
    #[arg(long, allow_hyphen_values = true, value_parser = parse_numeric, env = "PVCURVE_DARK_SATURATION_CURRENT")]
    pub dark_saturation_current: Option<String>,

    /// Normalized short-circuit current density in mA/cm²
    #[arg(long, allow_hyphen_values = true, value_parser = parse_numeric, env = "PVCURVE_NORMALIZED_JSC")]
    pub normalized_jsc: Option<String>,

    /// Intrinsic series resistance in Ω·cm²
    #[arg(long, allow_hyphen_values = true, value_parser = parse_numeric, env = "PVCURVE_SERIES_RESISTANCE")]
    pub series_resistance: Option<String>,

    /// Shunt resistance in Ω·cm²
    #[arg(long, allow_hyphen_values = true, value_parser = parse_numeric, env = "PVCURVE_SHUNT_RESISTANCE")]
    pub shunt_resistance: Option<String>,

    // ===================== PANEL LAYOUT =====================
    /// Number of series-connected cells
    #[arg(long, default_value_t = DEFAULT_SERIES_CELLS, value_parser = parse_cell_count, env = "PVCURVE_SERIES_CELLS")]
    pub series_cells: u32,

    /// Number of parallel strings
    #[arg(long, default_value_t = DEFAULT_PARALLEL_STRINGS, value_parser = parse_cell_count, env = "PVCURVE_PARALLEL_STRINGS")]
    pub parallel_strings: u32,

    /// Number of voltage samples in the sweep; defaults to the saved
    /// number_of_IV_points, or 2000
    #[arg(long, value_parser = parse_sweep_points, env = "PVCURVE_POINTS")]
    pub points: Option<usize>,

    // ===================== PARAMETER FILE =====================
    /// Parameter file path
    #[arg(long, default_value = DEFAULT_PARAMETERS_FILE, env = "PVCURVE_PARAMETERS")]
    pub parameters: PathBuf,

    /// Fill unspecified fields from the parameter file
    #[arg(long)]
    pub load: bool,

    /// Save the assembled fields back to the parameter file
    #[arg(long)]
    pub save: bool,

    // ===================== OUTPUT =====================
    /// Emit the full curve as JSON on stdout instead of the report
    #[arg(long)]
    pub json: bool,

    /// Skip the sample table under the report
    #[arg(long)]
    pub no_table: bool,

    /// Show build info from Cargo.lock at time of building
    #[arg(long)]
    pub show_build_info: bool,
}

// Matches the records build.rs serializes from Cargo.lock
#[derive(Debug, Deserialize)]
pub struct DepInfo {
    pub name: String,
    pub version: String,
    pub checksum: Option<String>,
    pub source: Option<String>,
}

// ===================== CLI VALUE PARSERS =====================

/// Accept any text that parses as a real number, but keep the original
/// spelling so it can be persisted and re-parsed losslessly.
fn parse_numeric(s: &str) -> Result<String, String> {
    match s.trim().parse::<f64>() {
        Ok(_) => Ok(s.to_string()),
        Err(_) => Err(format!("Invalid number: {}", s)),
    }
}

fn parse_cell_count(s: &str) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    if v < 1 {
        return Err(format!("Cell count must be at least 1, got {}", v));
    }
    Ok(v)
}

fn parse_sweep_points(s: &str) -> Result<usize, String> {
    let v: usize = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    if v < 2 {
        return Err(format!("Sweep needs at least 2 points, got {}", v));
    }
    Ok(v)
}
