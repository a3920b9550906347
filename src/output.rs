//! Output Formatting Module
//!
//! Terminal report, curve table and JSON export for computed I-V curves.
//! Rendering only consumes the result; the computation is identical whether
//! or not anything here runs.

use std::io::{self, Write};

use serde::Serialize;

use crate::model::{IvCurve, ModuleModel};

// ===================== FORMATTING HELPERS =====================

/// Format power for display
pub fn format_power(watts: f64) -> String {
    if watts.abs() >= 1000.0 {
        format!("{:.2} kW", watts / 1000.0)
    } else if watts.abs() >= 1.0 {
        format!("{:.2} W", watts)
    } else {
        format!("{:.1} mW", watts * 1000.0)
    }
}

/// Format current for display
pub fn format_current(amps: f64) -> String {
    if amps.abs() >= 1.0 { format!("{:.3} A", amps) } else { format!("{:.1} mA", amps * 1000.0) }
}

// ===================== TERMINAL REPORT =====================

/// Print the module summary and the derived scalar figures.
pub fn print_report(model: &ModuleModel, curve: &IvCurve) {
    println!("=== Photovoltaic Module I-V Curve (Single-Diode Model) ===");
    println!(
        "Module    : {:.1} x {:.1} mm ({:.4} m²)",
        model.geometry.width_mm, model.geometry.length_mm, curve.diagnostics.area_m2
    );
    println!(
        "Layout    : {} series cells x {} parallel strings",
        model.layout.series_cells, model.layout.parallel_strings
    );
    println!(
        "Diode     : n = {:.2}, J0 = {} mA/cm², Jsc = {} mA/cm²",
        model.diode.ideality_factor,
        model.diode.dark_saturation_ma_per_cm2,
        model.diode.normalized_jsc_ma_per_cm2
    );
    println!(
        "Parasitics: Rs = {} Ω·cm², Rsh = {} Ω·cm²",
        model.resistances.series_ohm_cm2, model.resistances.shunt_ohm_cm2
    );
    println!();
    println!("Conditions:");
    println!("  Irradiance    : {:8.1} W/m²", model.illumination.intensity_w_per_m2);
    println!("  Cell temp     : {:8.1} K", model.constants.temperature_k);
    println!("  Thermal volt. : {:8.4} V", curve.diagnostics.thermal_voltage_v);
    println!("  Est. Voc      : {:8.3} V", curve.estimated_voc_v);
    println!();
    println!("Maximum power point:");
    println!("  Voltage       : {:8.4} V", curve.max_power_voltage_v);
    println!("  Current       : {:>10}", format_current(curve.max_power_current_a));
    println!("  Power         : {:>10}", format_power(curve.max_power_w));
    println!();
    println!("Short-circuit I : {}", format_current(curve.diagnostics.short_circuit_current_a));
    println!("Incident power  : {}", format_power(curve.incident_power_w));
    println!("Efficiency (PCE): {:.2} %", curve.efficiency_percent);
}

/// Print a downsampled (V, I, P) table with the maximum-power row marked.
pub fn print_curve_table(curve: &IvCurve, rows: usize) {
    if curve.is_empty() || rows == 0 {
        return;
    }
    let len = curve.len();
    let stride = len.div_ceil(rows).max(1);
    let mpp = curve.diagnostics.max_power_index;
    let samples: Vec<(f64, f64, f64)> = curve.samples().collect();

    println!();
    println!("Curve ({} samples, every {}th shown):", len, stride);
    println!("{:-<46}", "");
    println!("{:>10} {:>14} {:>14}", "V (V)", "I (A)", "P (W)");
    println!("{:-<46}", "");

    let mut printed_mpp = false;
    for i in (0..len).step_by(stride) {
        // Keep the table sorted by voltage even when the MPP row falls
        // between two stride rows
        if !printed_mpp && mpp < i {
            print_sample_row(samples[mpp], true);
            printed_mpp = true;
        }
        print_sample_row(samples[i], i == mpp);
        if i == mpp {
            printed_mpp = true;
        }
    }
    if !printed_mpp {
        print_sample_row(samples[mpp], true);
    }
    println!("{:-<46}", "");
}

fn print_sample_row((v, i, p): (f64, f64, f64), is_mpp: bool) {
    let marker = if is_mpp { "  ← MPP" } else { "" };
    println!("{:>10.4} {:>14.6} {:>14.6}{}", v, i, p, marker);
}

// ===================== JSON EXPORT =====================

/// Serializable view of a computed curve for external plotting tools.
#[derive(Serialize)]
struct CurveExport<'a> {
    voltage_v: &'a [f64],
    current_a: &'a [f64],
    power_w: &'a [f64],
    estimated_voc_v: f64,
    max_power_w: f64,
    max_power_voltage_v: f64,
    max_power_current_a: f64,
    incident_power_w: f64,
    efficiency_percent: f64,
}

/// Write the full curve as pretty-printed JSON.
pub fn write_json(curve: &IvCurve, out: &mut impl Write) -> io::Result<()> {
    let export = CurveExport {
        voltage_v: &curve.voltage_v,
        current_a: &curve.current_a,
        power_w: &curve.power_w,
        estimated_voc_v: curve.estimated_voc_v,
        max_power_w: curve.max_power_w,
        max_power_voltage_v: curve.max_power_voltage_v,
        max_power_current_a: curve.max_power_current_a,
        incident_power_w: curve.incident_power_w,
        efficiency_percent: curve.efficiency_percent,
    };
    serde_json::to_writer_pretty(&mut *out, &export)?;
    writeln!(out)
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DiodeParameters, Illumination, ModuleGeometry, ModuleModel, ParasiticResistances,
    };

    fn sample_curve() -> IvCurve {
        ModuleModel::new(
            ModuleGeometry::new(100.0, 100.0),
            Illumination { intensity_w_per_m2: 1000.0 },
            DiodeParameters {
                ideality_factor: 1.2,
                dark_saturation_ma_per_cm2: 0.001,
                normalized_jsc_ma_per_cm2: 35.0,
            },
            ParasiticResistances { series_ohm_cm2: 1.0, shunt_ohm_cm2: 1000.0 },
        )
        .compute()
        .unwrap()
    }

    #[test]
    fn test_format_helpers_pick_sensible_units() {
        assert_eq!(format_power(1500.0), "1.50 kW");
        assert_eq!(format_power(2.5), "2.50 W");
        assert_eq!(format_power(0.0365), "36.5 mW");
        assert_eq!(format_current(1.25), "1.250 A");
        assert_eq!(format_current(0.0243), "24.3 mA");
    }

    #[test]
    fn test_json_export_is_parseable_and_complete() {
        let curve = sample_curve();
        let mut buffer = Vec::new();
        write_json(&curve, &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["voltage_v"].as_array().unwrap().len(), curve.len());
        assert_eq!(value["current_a"].as_array().unwrap().len(), curve.len());
        assert_eq!(value["power_w"].as_array().unwrap().len(), curve.len());
        assert!(value["efficiency_percent"].as_f64().unwrap() > 0.0);
        assert_eq!(value["max_power_w"].as_f64().unwrap(), curve.max_power_w);
    }
}
