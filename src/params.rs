//! Parameter Persistence Module
//!
//! Saves and loads the input form's raw text fields as a flat string-keyed
//! JSON document. Values round-trip exactly as entered; keys missing from a
//! saved file default to empty strings so an older or partial file still
//! loads.

use std::fs;
use std::io;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

/// Default parameter file name
pub const DEFAULT_PARAMETERS_FILE: &str = "parameters.json";

// ===================== RECORD =====================

/// Raw text of every input field, keyed exactly as stored on disk.
///
/// The fields beyond the eight the I-V model consumes belong to other
/// sections of the input form (scribe-line geometry, sheet resistances);
/// they are carried verbatim so that saving after a partial edit never
/// discards them. `thermal_voltage` in particular is display-only: the
/// computation always derives V_T from the physical constants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredParameters {
    pub module_width: String,
    pub module_length: String,
    pub left_right_margin: String,
    pub up_down_margin: String,
    pub light_intensity: String,
    #[serde(rename = "number_of_IV_points")]
    pub number_of_iv_points: String,
    pub ideality_factor: String,
    pub thermal_voltage: String,
    pub dark_saturation_current: String,
    pub intrinsic_series_resistance: String,
    pub p1_width: String,
    pub p2_width: String,
    pub p3_width: String,
    pub p1_p2_distance: String,
    pub p2_p3_distance: String,
    pub cell_width: String,
    pub ito_sheet_resistance: String,
    pub carbon_sheet_resistance: String,
    pub shunt_resistance: String,
    pub normalized_jsc: String,
    pub p2_contact_resistivity: String,
}

/// Outcome of a load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The file existed and parsed
    Loaded,
    /// No usable file; defaults were returned
    Missing,
}

// ===================== SAVE / LOAD =====================

/// Write the record as pretty-printed JSON.
pub fn save_parameters(path: &Path, params: &StoredParameters) -> io::Result<()> {
    let text = serde_json::to_string_pretty(params).map_err(io::Error::other)?;
    fs::write(path, text)
}

/// Read the record, tolerating a missing or corrupt file.
///
/// Never fails: the caller gets a defaulted record plus a status it can
/// surface as a "no saved parameters" notice.
pub fn load_parameters(path: &Path) -> (StoredParameters, LoadStatus) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return (StoredParameters::default(), LoadStatus::Missing),
    };
    match serde_json::from_str(&text) {
        Ok(params) => (params, LoadStatus::Loaded),
        Err(err) => {
            warn!("parameter file {} is corrupt ({}); using defaults", path.display(), err);
            (StoredParameters::default(), LoadStatus::Missing)
        }
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;

    fn temp_file(name: &str) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("pvcurve-params-{}-{}.json", std::process::id(), name));
        path
    }

    #[test]
    fn test_save_then_load_is_lossless() {
        let path = temp_file("roundtrip");

        // Deliberately awkward spellings; they must survive untouched
        let params = StoredParameters {
            module_width: "100".into(),
            module_length: "100.0".into(),
            light_intensity: "1e3".into(),
            ideality_factor: "1.20".into(),
            dark_saturation_current: "0.0010".into(),
            normalized_jsc: " 35 ".into(),
            intrinsic_series_resistance: "1".into(),
            shunt_resistance: "1000".into(),
            number_of_iv_points: "2000".into(),
            p2_contact_resistivity: "0.5".into(),
            ..Default::default()
        };

        save_parameters(&path, &params).unwrap();
        let (loaded, status) = load_parameters(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(status, LoadStatus::Loaded);
        assert_eq!(loaded, params, "every field must round-trip exactly");
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = temp_file("does-not-exist");
        let (loaded, status) = load_parameters(&path);

        assert_eq!(status, LoadStatus::Missing);
        assert_eq!(loaded, StoredParameters::default());
        assert!(loaded.module_width.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_returns_defaults() {
        let path = temp_file("corrupt");
        fs::write(&path, "{ this is not json").unwrap();

        let (loaded, status) = load_parameters(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(status, LoadStatus::Missing);
        assert_eq!(loaded, StoredParameters::default());
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let path = temp_file("partial");
        fs::write(&path, r#"{"module_width": "120", "shunt_resistance": "800"}"#).unwrap();

        let (loaded, status) = load_parameters(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(status, LoadStatus::Loaded);
        assert_eq!(loaded.module_width, "120");
        assert_eq!(loaded.shunt_resistance, "800");
        assert!(loaded.module_length.is_empty(), "absent keys load as empty text");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let path = temp_file("unknown");
        fs::write(&path, r#"{"module_width": "90", "some_future_field": "7"}"#).unwrap();

        let (loaded, status) = load_parameters(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(status, LoadStatus::Loaded);
        assert_eq!(loaded.module_width, "90");
    }

    #[test]
    fn test_stored_key_spelling_matches_disk_format() {
        // The camel-ish IV key is the one historical exception to snake_case
        let params = StoredParameters { number_of_iv_points: "500".into(), ..Default::default() };
        let text = serde_json::to_string(&params).unwrap();
        assert!(text.contains("\"number_of_IV_points\":\"500\""));
    }
}
