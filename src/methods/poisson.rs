//! Poisson's ratio of a layer.
use super::in_range;
use crate::graph::definitions as names;
use crate::slab::codes::basic_grain_class;
use crate::store::MethodInputs;
use crate::value::UValue;

pub const KOCHLE_GRAINS: &[&str] = &["RG", "FC", "DH"];
pub const SRIVASTAVA_GRAINS: &[&str] = &["RG", "RGmx", "FC", "DH"];

/// Köchle & Schneebeli: a constant per basic grain class.
pub fn kochle(inputs: &MethodInputs) -> UValue {
    match inputs.code(names::GRAIN_FORM).and_then(basic_grain_class) {
        Some("RG") => UValue::new(0.171, 0.026),
        Some("FC") => UValue::new(0.130, 0.070),
        Some("DH") => UValue::new(0.087, 0.020),
        _ => UValue::undefined(),
    }
}

/// Srivastava et al.: linear in density, 150 to 500 kg/m^3.
pub fn srivastava(inputs: &MethodInputs) -> UValue {
    let Some(rho) = inputs.number(names::DENSITY).filter(|r| in_range(r.nominal, 150.0, 500.0)) else {
        return UValue::undefined();
    };
    if inputs.code(names::GRAIN_FORM).is_none() {
        return UValue::undefined();
    }
    rho.scale(5.8e-4) + UValue::new(0.0175, 0.03)
}
