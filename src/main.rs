//! pvcurve — I-V characteristic calculator for photovoltaic modules.
//!
//! Reads the module description from the command line and/or a saved
//! parameter file, runs the single-diode model and prints the curve with
//! its maximum-power point and conversion efficiency.

use clap::Parser;
use log::debug;

mod cli;
mod error;
mod model;
mod output;
mod params;

use cli::{Args, DepInfo};
use error::{ModelError, ModelResult};
use model::{
    DiodeParameters, Illumination, ModuleGeometry, ModuleModel, PanelLayout, ParasiticResistances,
    SweepSettings, parse_field,
};
use params::{LoadStatus, StoredParameters, load_parameters, save_parameters};

// ===================== MAIN =====================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.show_build_info {
        print_build_info();
        return Ok(());
    }

    // Parameter file first, command line on top
    let mut stored = if args.load {
        let (stored, status) = load_parameters(&args.parameters);
        if status == LoadStatus::Missing {
            eprintln!(
                "No saved parameters at {}; using command-line values only.",
                args.parameters.display()
            );
        }
        stored
    } else {
        StoredParameters::default()
    };
    apply_cli_overrides(&mut stored, &args);

    let model = assemble_model(&stored, &args)?;
    let curve = model.compute()?;

    debug!(
        "Voc estimate {:.4} V, area {:.4} m², incident {:.3} W, max power {:.6} W at sample {}",
        curve.estimated_voc_v,
        curve.diagnostics.area_m2,
        curve.incident_power_w,
        curve.max_power_w,
        curve.diagnostics.max_power_index
    );

    if args.save {
        save_parameters(&args.parameters, &stored)?;
        eprintln!("Parameters saved to {}.", args.parameters.display());
    }

    if args.json {
        output::write_json(&curve, &mut std::io::stdout().lock())?;
    } else {
        output::print_report(&model, &curve);
        if !args.no_table {
            output::print_curve_table(&curve, 20);
        }
    }

    Ok(())
}

// ===================== INPUT ASSEMBLY =====================

/// Copy command-line fields over the stored record; command-line text wins.
fn apply_cli_overrides(stored: &mut StoredParameters, args: &Args) {
    let fields: [(&Option<String>, &mut String); 8] = [
        (&args.module_width, &mut stored.module_width),
        (&args.module_length, &mut stored.module_length),
        (&args.light_intensity, &mut stored.light_intensity),
        (&args.ideality_factor, &mut stored.ideality_factor),
        (&args.dark_saturation_current, &mut stored.dark_saturation_current),
        (&args.normalized_jsc, &mut stored.normalized_jsc),
        (&args.series_resistance, &mut stored.intrinsic_series_resistance),
        (&args.shunt_resistance, &mut stored.shunt_resistance),
    ];
    for (source, target) in fields {
        if let Some(text) = source {
            *target = text.clone();
        }
    }
    if let Some(points) = args.points {
        stored.number_of_iv_points = points.to_string();
    }
}

/// Parse the merged text fields into model inputs.
///
/// The model owns the numeric conversion; the first malformed or absent
/// field is the single error reported for the run.
fn assemble_model(stored: &StoredParameters, args: &Args) -> ModelResult<ModuleModel> {
    let field = |name: &str, text: &str| -> ModelResult<f64> {
        if text.trim().is_empty() {
            return Err(ModelError::MissingParameter(name.to_string()));
        }
        parse_field(name, text)
    };

    let geometry = ModuleGeometry::new(
        field("module_width", &stored.module_width)?,
        field("module_length", &stored.module_length)?,
    );
    let illumination =
        Illumination { intensity_w_per_m2: field("light_intensity", &stored.light_intensity)? };
    let diode = DiodeParameters {
        ideality_factor: field("ideality_factor", &stored.ideality_factor)?,
        dark_saturation_ma_per_cm2: field(
            "dark_saturation_current",
            &stored.dark_saturation_current,
        )?,
        normalized_jsc_ma_per_cm2: field("normalized_jsc", &stored.normalized_jsc)?,
    };
    let resistances = ParasiticResistances {
        series_ohm_cm2: field(
            "intrinsic_series_resistance",
            &stored.intrinsic_series_resistance,
        )?,
        shunt_ohm_cm2: field("shunt_resistance", &stored.shunt_resistance)?,
    };
    let layout =
        PanelLayout { series_cells: args.series_cells, parallel_strings: args.parallel_strings };

    // Sweep resolution: --points already landed in the stored record, so a
    // saved number_of_IV_points and a command-line override read the same way
    let mut sweep = SweepSettings::default();
    let points_text = stored.number_of_iv_points.trim();
    if !points_text.is_empty() {
        sweep.points = points_text.parse().map_err(|_| ModelError::MalformedInput {
            field: "number_of_IV_points".to_string(),
            value: stored.number_of_iv_points.clone(),
        })?;
    }

    Ok(ModuleModel::new(geometry, illumination, diode, resistances)
        .with_layout(layout)
        .with_sweep(sweep))
}

// ===================== BUILD INFO =====================

/// Print the git revision and the locked dependency list embedded at build
/// time.
fn print_build_info() {
    println!("Built from Git commit: {}\n", env!("PVCURVE_GIT_HASH"));
    const DEP_INFO_RAW: &str = include_str!(env!("PVCURVE_DEPS_PATH"));
    let deps: Vec<DepInfo> = match serde_json::from_str(DEP_INFO_RAW) {
        Ok(deps) => deps,
        Err(err) => {
            eprintln!("Embedded dependency list is unreadable: {}", err);
            return;
        }
    };

    println!("Found {} dependencies.", deps.len());
    for dep in deps {
        println!("- {} v{}", dep.name, dep.version);
        if let Some(sum) = dep.checksum {
            println!("    Checksum: {}", sum);
        }
        if let Some(src) = dep.source {
            println!("    Source:   {}", src);
        }
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> StoredParameters {
        StoredParameters {
            module_width: "100".into(),
            module_length: "100".into(),
            light_intensity: "1000".into(),
            ideality_factor: "1.2".into(),
            dark_saturation_current: "0.001".into(),
            normalized_jsc: "35".into(),
            intrinsic_series_resistance: "1".into(),
            shunt_resistance: "1000".into(),
            ..Default::default()
        }
    }

    fn default_args() -> Args {
        Args::parse_from(["pvcurve"])
    }

    #[test]
    fn test_assemble_model_from_stored_text() {
        let model = assemble_model(&full_record(), &default_args()).unwrap();
        assert_eq!(model.geometry.width_mm, 100.0);
        assert_eq!(model.resistances.shunt_ohm_cm2, 1000.0);
        assert_eq!(model.layout.series_cells, 36);
        assert_eq!(model.sweep.points, 2000);
        assert!(model.compute().is_ok());
    }

    #[test]
    fn test_assemble_model_reports_missing_field() {
        let mut stored = full_record();
        stored.light_intensity.clear();
        let err = assemble_model(&stored, &default_args()).unwrap_err();
        assert!(matches!(err, ModelError::MissingParameter(_)));
        assert!(err.to_string().contains("light_intensity"));
    }

    #[test]
    fn test_assemble_model_reports_malformed_field() {
        let mut stored = full_record();
        stored.module_width = "wide".into();
        let err = assemble_model(&stored, &default_args()).unwrap_err();
        assert!(matches!(err, ModelError::MalformedInput { .. }));
    }

    #[test]
    fn test_saved_iv_points_set_sweep_resolution() {
        let mut stored = full_record();
        stored.number_of_iv_points = "500".into();
        let model = assemble_model(&stored, &default_args()).unwrap();
        assert_eq!(model.sweep.points, 500);

        stored.number_of_iv_points = "many".into();
        assert!(assemble_model(&stored, &default_args()).is_err());
    }

    #[test]
    fn test_cli_overrides_beat_stored_text() {
        let mut stored = full_record();
        let args = Args::parse_from(["pvcurve", "--module-width", "125.5", "--points", "300"]);
        apply_cli_overrides(&mut stored, &args);

        assert_eq!(stored.module_width, "125.5");
        assert_eq!(stored.module_length, "100", "untouched fields keep their stored text");
        assert_eq!(stored.number_of_iv_points, "300");
    }
}
