//! Elastic and shear modulus of a layer, MPa, from density.
use super::{in_range, E_ICE, RHO_ICE};
use crate::graph::definitions as names;
use crate::store::MethodInputs;
use crate::value::UValue;

pub const BERGFELD_GRAINS: &[&str] = &["PP", "DF", "RG", "RGmx", "FC"];
pub const KOCHLE_GRAINS: &[&str] = &["RG", "RGmx", "FC", "FCxr", "DH"];
pub const SCHOTTNER_GRAINS: &[&str] = &["PP", "DF", "RG"];

/// Density within `[lo, hi]`, or `None`.
fn density_within(inputs: &MethodInputs, lo: f64, hi: f64) -> Option<UValue> {
    inputs.number(names::DENSITY).filter(|rho| in_range(rho.nominal, lo, hi))
}

/// `scale * (rho / rho_ice)^n`
fn power_law(rho: UValue, scale: f64, n: f64) -> UValue {
    rho.scale(1.0 / RHO_ICE).powf(n).scale(scale)
}

/// Bergfeld et al.: `E = 6500 (rho / rho_ice)^4.4`.
pub fn bergfeld(inputs: &MethodInputs) -> UValue {
    density_within(inputs, 100.0, 450.0)
        .map(|rho| power_law(rho, 6.5e3, 4.4))
        .unwrap_or_else(UValue::undefined)
}

/// Köchle & Schneebeli: exponential fits, split at 250 kg/m^3.
pub fn kochle(inputs: &MethodInputs) -> UValue {
    let Some(rho) = density_within(inputs, 150.0, 450.0) else {
        return UValue::undefined();
    };
    let (c0, c1) = if rho.nominal < 250.0 { (0.0061, 0.0396) } else { (6.0457, 0.011) };
    rho.scale(c1).exp().scale(c0)
}

/// Wautier et al.: `E = 0.78 E_ice (rho / rho_ice)^2.34`.
pub fn wautier(inputs: &MethodInputs) -> UValue {
    density_within(inputs, 100.0, 550.0)
        .map(|rho| power_law(rho, 0.78 * E_ICE, 2.34))
        .unwrap_or_else(UValue::undefined)
}

/// Schöttner et al.: `E = 0.95 E_ice (rho / rho_ice)^3.9`.
pub fn schottner(inputs: &MethodInputs) -> UValue {
    density_within(inputs, 100.0, 450.0)
        .map(|rho| power_law(rho, 0.95 * E_ICE, 3.9))
        .unwrap_or_else(UValue::undefined)
}

/// Wautier et al. shear modulus: `G = 0.36 E_ice (rho / rho_ice)^2.51`.
pub fn wautier_shear(inputs: &MethodInputs) -> UValue {
    density_within(inputs, 100.0, 550.0)
        .map(|rho| power_law(rho, 0.36 * E_ICE, 2.51))
        .unwrap_or_else(UValue::undefined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(rho: f64) -> MethodInputs {
        MethodInputs::new()
            .with_number(names::DENSITY, UValue::new(rho, 10.0))
            .with_code(names::GRAIN_FORM, "RG")
    }

    #[rstest]
    #[case(bergfeld as fn(&MethodInputs) -> UValue)]
    #[case(kochle)]
    #[case(wautier)]
    #[case(schottner)]
    #[case(wautier_shear)]
    fn test_modulus_increases_with_density(#[case] f: fn(&MethodInputs) -> UValue) {
        let low = f(&at(200.0));
        let high = f(&at(350.0));
        assert!(low.nominal > 0.0);
        assert!(high.nominal > low.nominal);
        assert!(high.std_dev > 0.0);
    }

    #[rstest]
    #[case(bergfeld as fn(&MethodInputs) -> UValue, 50.0)]
    #[case(kochle, 100.0)]
    #[case(wautier, 700.0)]
    fn test_outside_fit_range_is_undefined(#[case] f: fn(&MethodInputs) -> UValue, #[case] rho: f64) {
        assert!(f(&at(rho)).is_undefined());
    }

    #[test]
    fn test_kochle_branches() {
        let low = kochle(&at(200.0));
        assert!((low.nominal - 0.0061 * (0.0396f64 * 200.0).exp()).abs() < 1e-9);
        let high = kochle(&at(300.0));
        assert!((high.nominal - 6.0457 * (0.011f64 * 300.0).exp()).abs() < 1e-9);
    }
}
