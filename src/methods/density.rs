//! Layer density, kg/m^3.
//!
//! Field estimates regress density on the hand-hardness index, per grain
//! class. Every method returns the undefined sentinel outside the range its
//! table covers.

use super::{in_range, RHO_ICE};
use crate::graph::definitions as names;
use crate::store::MethodInputs;
use crate::value::UValue;

/// Geldsetzer & Jamieson: `rho = A + B * h`. Columns: grain code, A, B, standard error.
const GELDSETZER: &[(&str, f64, f64, f64)] = &[
    ("PP", 45.0, 36.0, 27.0),
    ("PPgp", 83.0, 37.0, 37.0),
    ("DF", 65.0, 36.0, 30.0),
    ("RG", 91.0, 42.0, 32.0),
    ("RGmx", 73.0, 47.0, 35.0),
    ("FC", 112.0, 46.0, 43.0),
    ("FCxr", 99.0, 48.0, 40.0),
    ("DH", 185.0, 25.0, 41.0),
    ("MF", 213.0, 20.0, 65.0),
];

/// Kim & Jamieson, hardness-only fit: `rho = A + B * h`.
const KIM_JAMIESON_T2: &[(&str, f64, f64, f64)] = &[
    ("PP", 27.0, 53.0, 40.0),
    ("DF", 39.0, 51.0, 36.0),
    ("RG", 96.0, 44.0, 43.0),
    ("RGmx", 82.0, 47.0, 45.0),
    ("FC", 103.0, 47.0, 48.0),
    ("FCxr", 97.0, 48.0, 46.0),
    ("DH", 158.0, 34.0, 46.0),
    ("MF", 192.0, 28.0, 69.0),
];

/// Kim & Jamieson, hardness and grain size: `rho = A + B * h + C * gs`.
const KIM_JAMIESON_T5: &[(&str, f64, f64, f64, f64)] = &[
    ("FC", 121.0, 49.0, -14.0, 44.0),
    ("FCxr", 115.0, 50.0, -12.0, 42.0),
    ("DH", 213.0, 30.0, -16.0, 40.0),
    ("RG", 120.0, 42.0, -19.0, 39.0),
];

pub const GELDSETZER_GRAINS: &[&str] = &["PP", "PPgp", "DF", "RG", "RGmx", "FC", "FCxr", "DH", "MF"];
pub const KIM_JAMIESON_T2_GRAINS: &[&str] = &["PP", "DF", "RG", "RGmx", "FC", "FCxr", "DH", "MF"];
pub const KIM_JAMIESON_T5_GRAINS: &[&str] = &["FC", "FCxr", "DH", "RG"];

/// Physically admissible density for a snow layer.
fn admissible(rho: UValue) -> UValue {
    if rho.nominal > 0.0 && rho.nominal < RHO_ICE { rho } else { UValue::undefined() }
}

/// Uses the measured density as-is.
pub fn data_flow(inputs: &MethodInputs) -> UValue {
    inputs.number(names::MEASURED_DENSITY).map(admissible).unwrap_or_else(UValue::undefined)
}

fn hardness_regression(table: &[(&str, f64, f64, f64)], inputs: &MethodInputs) -> UValue {
    let (Some(h), Some(grain)) = (inputs.number(names::HAND_HARDNESS), inputs.code(names::GRAIN_FORM)) else {
        return UValue::undefined();
    };
    let Some(&(_, a, b, se)) = table.iter().find(|row| row.0 == grain) else {
        return UValue::undefined();
    };
    if !in_range(h.nominal, 1.0, 6.0) {
        return UValue::undefined();
    }
    admissible(UValue::new(a + b * h.nominal, se))
}

pub fn geldsetzer(inputs: &MethodInputs) -> UValue {
    hardness_regression(GELDSETZER, inputs)
}

pub fn kim_jamieson_table2(inputs: &MethodInputs) -> UValue {
    hardness_regression(KIM_JAMIESON_T2, inputs)
}

pub fn kim_jamieson_table5(inputs: &MethodInputs) -> UValue {
    let (Some(h), Some(grain), Some(gs)) = (
        inputs.number(names::HAND_HARDNESS),
        inputs.code(names::GRAIN_FORM),
        inputs.number(names::GRAIN_SIZE),
    ) else {
        return UValue::undefined();
    };
    let Some(&(_, a, b, c, se)) = KIM_JAMIESON_T5.iter().find(|row| row.0 == grain) else {
        return UValue::undefined();
    };
    if !in_range(h.nominal, 1.0, 6.0) || !in_range(gs.nominal, 0.1, 10.0) {
        return UValue::undefined();
    }
    admissible(UValue::new(a + b * h.nominal + c * gs.nominal, se))
}
