//! Single-Diode I-V Curve Model
//!
//! Computes the current-voltage characteristic of a photovoltaic module from
//! a single-diode equivalent circuit with series and shunt resistance, then
//! derives the maximum-power point and the conversion efficiency.
//!
//! References:
//! - Green, M. A. (1982). "Solar Cells: Operating Principles, Technology and
//!   System Applications"
//! - Sze, S. M. and Ng, K. K. (2007). "Physics of Semiconductor Devices",
//!   ch. 14 (p-n junction under illumination)

use crate::error::{ModelError, ModelResult};

// ===================== CONSTANTS =====================

/// Boltzmann constant (J/K)
pub const BOLTZMANN_J_PER_K: f64 = 1.38e-23;

/// Elementary charge (C)
pub const ELEMENTARY_CHARGE_C: f64 = 1.6e-19;

/// Cell temperature (K); fixed in this version
pub const DEFAULT_TEMPERATURE_K: f64 = 300.0;

/// Default number of series-connected cells per string
pub const DEFAULT_SERIES_CELLS: u32 = 36;

/// Default number of parallel strings
pub const DEFAULT_PARALLEL_STRINGS: u32 = 4;

/// Default number of voltage samples in the sweep
pub const DEFAULT_SWEEP_POINTS: usize = 2000;

/// Upper end of the terminal-voltage sweep (V); the lower end is 0
pub const SWEEP_MAX_VOLTAGE_V: f64 = 1.5;

/// 1 mA/cm² = 10 A/m²
const MA_PER_CM2_TO_A_PER_M2: f64 = 10.0;

/// Clamp for the diode exponent; exp(±50) stays comfortably finite in f64
const EXPONENT_LIMIT: f64 = 50.0;

// ===================== INPUT TYPES =====================

/// Physical module dimensions as entered on the form, in millimeters.
#[derive(Debug, Clone, Copy)]
pub struct ModuleGeometry {
    pub width_mm: f64,
    pub length_mm: f64,
}

impl ModuleGeometry {
    pub fn new(width_mm: f64, length_mm: f64) -> Self {
        Self { width_mm, length_mm }
    }

    /// Module area in m².
    pub fn area_m2(&self) -> f64 {
        (self.width_mm / 1000.0) * (self.length_mm / 1000.0)
    }
}

/// Illumination incident on the module plane.
#[derive(Debug, Clone, Copy)]
pub struct Illumination {
    /// Irradiance in W/m²
    pub intensity_w_per_m2: f64,
}

/// Diode branch of the equivalent circuit.
///
/// Current densities are entered in mA/cm² (form units) and converted to
/// A/m² internally.
#[derive(Debug, Clone, Copy)]
pub struct DiodeParameters {
    /// Ideality factor (dimensionless, typically 1-2)
    pub ideality_factor: f64,
    /// Dark saturation current density J0 (mA/cm²)
    pub dark_saturation_ma_per_cm2: f64,
    /// Normalized short-circuit current density Jsc (mA/cm²)
    pub normalized_jsc_ma_per_cm2: f64,
}

/// Parasitic resistances of the equivalent circuit.
#[derive(Debug, Clone, Copy)]
pub struct ParasiticResistances {
    /// Intrinsic series resistance Rs (Ω·cm²)
    pub series_ohm_cm2: f64,
    /// Shunt resistance Rsh (Ω·cm²)
    pub shunt_ohm_cm2: f64,
}

/// Electrical arrangement of cells within the panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelLayout {
    /// Number of series-connected cells (Ns)
    pub series_cells: u32,
    /// Number of parallel strings (Np)
    pub parallel_strings: u32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self { series_cells: DEFAULT_SERIES_CELLS, parallel_strings: DEFAULT_PARALLEL_STRINGS }
    }
}

/// Physical constants and cell temperature used by the diode equation.
///
/// Carried explicitly on the model inputs so concurrent computations with
/// different assumptions never share global state.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalConstants {
    pub boltzmann_j_per_k: f64,
    pub elementary_charge_c: f64,
    pub temperature_k: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            boltzmann_j_per_k: BOLTZMANN_J_PER_K,
            elementary_charge_c: ELEMENTARY_CHARGE_C,
            temperature_k: DEFAULT_TEMPERATURE_K,
        }
    }
}

impl PhysicalConstants {
    /// Thermal voltage V_T = k_B·T/q (≈25.9 mV at 300 K).
    pub fn thermal_voltage_v(&self) -> f64 {
        self.boltzmann_j_per_k * self.temperature_k / self.elementary_charge_c
    }
}

/// Voltage sweep shape.
#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    /// Number of evenly spaced samples (at least 2)
    pub points: usize,
    /// Upper end of the terminal-voltage range (V)
    pub max_voltage_v: f64,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self { points: DEFAULT_SWEEP_POINTS, max_voltage_v: SWEEP_MAX_VOLTAGE_V }
    }
}

// ===================== MODEL =====================

/// Complete set of inputs for one I-V curve computation.
///
/// All fields are value types; a computation never mutates them and holds no
/// state of its own, so independent computations can run concurrently.
#[derive(Debug, Clone, Copy)]
pub struct ModuleModel {
    pub geometry: ModuleGeometry,
    pub illumination: Illumination,
    pub diode: DiodeParameters,
    pub resistances: ParasiticResistances,
    pub layout: PanelLayout,
    pub constants: PhysicalConstants,
    pub sweep: SweepSettings,
}

impl ModuleModel {
    pub fn new(
        geometry: ModuleGeometry,
        illumination: Illumination,
        diode: DiodeParameters,
        resistances: ParasiticResistances,
    ) -> Self {
        Self {
            geometry,
            illumination,
            diode,
            resistances,
            layout: PanelLayout::default(),
            constants: PhysicalConstants::default(),
            sweep: SweepSettings::default(),
        }
    }

    pub fn with_layout(mut self, layout: PanelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_sweep(mut self, sweep: SweepSettings) -> Self {
        self.sweep = sweep;
        self
    }

    /// Check every input invariant before any arithmetic.
    ///
    /// # Errors
    /// Returns `InvalidParameter` naming the first offending field.
    fn validate(&self) -> ModelResult<()> {
        positive("module width (mm)", self.geometry.width_mm)?;
        positive("module length (mm)", self.geometry.length_mm)?;
        positive("light intensity (W/m²)", self.illumination.intensity_w_per_m2)?;
        positive("ideality factor", self.diode.ideality_factor)?;
        positive("dark saturation current (mA/cm²)", self.diode.dark_saturation_ma_per_cm2)?;
        non_negative("normalized Jsc (mA/cm²)", self.diode.normalized_jsc_ma_per_cm2)?;
        non_negative("series resistance (Ω·cm²)", self.resistances.series_ohm_cm2)?;
        positive("shunt resistance (Ω·cm²)", self.resistances.shunt_ohm_cm2)?;
        if self.layout.series_cells < 1 {
            return Err(ModelError::InvalidParameter(
                "number of series cells must be at least 1".into(),
            ));
        }
        if self.layout.parallel_strings < 1 {
            return Err(ModelError::InvalidParameter(
                "number of parallel strings must be at least 1".into(),
            ));
        }
        if self.sweep.points < 2 {
            return Err(ModelError::InvalidParameter(format!(
                "voltage sweep needs at least 2 points, got {}",
                self.sweep.points
            )));
        }
        positive("sweep voltage range (V)", self.sweep.max_voltage_v)?;
        Ok(())
    }

    /// Compute the I-V characteristic, maximum-power point and efficiency.
    ///
    /// The sweep covers the closed interval [0, `sweep.max_voltage_v`] with
    /// `sweep.points` evenly spaced terminal-voltage samples. The diode
    /// current is evaluated twice per sample: once at the sweep voltage and
    /// once at the voltage corrected for the series-resistance drop. Exactly
    /// two passes; this is a fixed approximation, not a convergence loop.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if any input violates its invariant; once
    /// validation passes the computation always succeeds.
    pub fn compute(&self) -> ModelResult<IvCurve> {
        self.validate()?;

        // Form units to SI: mA/cm² -> A/m², mm -> m
        let j0 = self.diode.dark_saturation_ma_per_cm2 * MA_PER_CM2_TO_A_PER_M2;
        let jsc = self.diode.normalized_jsc_ma_per_cm2 * MA_PER_CM2_TO_A_PER_M2;
        let area_m2 = self.geometry.area_m2();

        let thermal_voltage_v = self.constants.thermal_voltage_v();
        let nvt = self.diode.ideality_factor * thermal_voltage_v;
        let ns = self.layout.series_cells as f64;
        let np = self.layout.parallel_strings as f64;

        // Analytic Voc estimate, informational only. ln(1+x) keeps this
        // stable as Jsc/J0 -> 0.
        let estimated_voc_v = ns * nvt * (jsc / j0).ln_1p();

        let points = self.sweep.points;
        let mut voltage_v = Vec::with_capacity(points);
        let mut current_a = Vec::with_capacity(points);
        let mut power_w = Vec::with_capacity(points);

        for i in 0..points {
            let v = self.sweep.max_voltage_v * i as f64 / (points - 1) as f64;

            // First pass: full terminal voltage across the diode
            let j_diode = diode_current_density(v, j0, nvt);

            // Series-resistance drop; a sample pushed below zero is held at
            // zero, not extrapolated
            let v_eff = (v - j_diode * self.resistances.series_ohm_cm2 * ns).max(0.0);

            // Second pass at the corrected voltage
            let j_diode = diode_current_density(v_eff, j0, nvt);

            // Shunt leakage; non-physical negative totals are floored
            let j_total = (jsc - j_diode - v_eff / self.resistances.shunt_ohm_cm2).max(0.0);

            // Current density (A/m²) to panel-level current (A)
            let current = j_total * area_m2 / (ns * np);

            voltage_v.push(v);
            current_a.push(current);
            power_w.push(v * current);
        }

        // Argmax over the power sequence; strict comparison keeps the
        // lowest-voltage sample on ties
        let mut max_power_index = 0;
        for (i, &p) in power_w.iter().enumerate() {
            if p > power_w[max_power_index] {
                max_power_index = i;
            }
        }

        let max_power_w = power_w[max_power_index];
        let max_power_voltage_v = voltage_v[max_power_index];
        let max_power_current_a = current_a[max_power_index];
        let short_circuit_current_a = current_a[0];

        // Validation guarantees intensity and area are positive
        let incident_power_w = self.illumination.intensity_w_per_m2 * area_m2;
        let efficiency_percent = 100.0 * max_power_w / incident_power_w;

        Ok(IvCurve {
            voltage_v,
            current_a,
            power_w,
            estimated_voc_v,
            max_power_w,
            max_power_voltage_v,
            max_power_current_a,
            incident_power_w,
            efficiency_percent,
            diagnostics: Diagnostics {
                thermal_voltage_v,
                area_m2,
                short_circuit_current_a,
                max_power_index,
            },
        })
    }
}

/// Diode current density J0·(exp(V/(n·V_T)) − 1) in A/m².
///
/// The exponent is clamped to ±[`EXPONENT_LIMIT`] before exponentiation so
/// the sweep never overflows to infinity.
fn diode_current_density(v: f64, j0_a_per_m2: f64, nvt_v: f64) -> f64 {
    let exponent = (v / nvt_v).clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT);
    j0_a_per_m2 * (exponent.exp() - 1.0)
}

// ===================== TEXT ENTRY POINT =====================

/// Parse one raw text field into a real number.
///
/// This is the binding numeric conversion for values arriving from the input
/// form or the parameter file; the first failing field aborts the run with a
/// single reported error.
pub fn parse_field(field: &str, text: &str) -> ModelResult<f64> {
    text.trim().parse::<f64>().map_err(|_| ModelError::MalformedInput {
        field: field.to_string(),
        value: text.to_string(),
    })
}

fn positive(name: &str, value: f64) -> ModelResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter(format!("{} must be positive, got {}", name, value)))
    }
}

fn non_negative(name: &str, value: f64) -> ModelResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter(format!("{} must not be negative, got {}", name, value)))
    }
}

// ===================== RESULT TYPES =====================

/// One computed I-V characteristic with its derived scalar figures.
#[derive(Debug, Clone)]
pub struct IvCurve {
    /// Terminal voltage samples (V), ascending from 0
    pub voltage_v: Vec<f64>,
    /// Panel-level current at each sample (A)
    pub current_a: Vec<f64>,
    /// Electrical power at each sample (W)
    pub power_w: Vec<f64>,
    /// Analytic open-circuit voltage estimate (V); the sweep does not
    /// depend on it
    pub estimated_voc_v: f64,
    /// Power at the maximum-power point (W)
    pub max_power_w: f64,
    /// Voltage at the maximum-power point (V)
    pub max_power_voltage_v: f64,
    /// Current at the maximum-power point (A)
    pub max_power_current_a: f64,
    /// Optical power incident on the module (W)
    pub incident_power_w: f64,
    /// Conversion efficiency at the maximum-power point (%)
    pub efficiency_percent: f64,
    pub diagnostics: Diagnostics,
}

impl IvCurve {
    /// Iterate (voltage, current, power) triples in sweep order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.voltage_v
            .iter()
            .zip(&self.current_a)
            .zip(&self.power_w)
            .map(|((&v, &i), &p)| (v, i, p))
    }

    pub fn len(&self) -> usize {
        self.voltage_v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltage_v.is_empty()
    }
}

/// Intermediate quantities useful for inspection and logging.
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics {
    /// Thermal voltage k_B·T/q (V)
    pub thermal_voltage_v: f64,
    /// Module area (m²)
    pub area_m2: f64,
    /// Panel-level current at V = 0 (A)
    pub short_circuit_current_a: f64,
    /// Index of the maximum-power sample
    pub max_power_index: usize,
}

// ===================== TESTS =====================
