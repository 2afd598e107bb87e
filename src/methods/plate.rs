//! Laminate plate stiffnesses of a layered slab (Weißgraeber & Rosendahl).
//!
//! The slab is a stack of isotropic plies, top to bottom. `z` runs downward
//! from the mid-plane. Thickness arrives in cm and is integrated in mm, so
//! with moduli in MPa: A11, A55 in N/mm, B11 in N, D11 in N mm.
use crate::graph::definitions as names;
use crate::store::MethodInputs;
use crate::value::UValue;

/// Timoshenko shear correction factor for a rectangular cross-section.
pub const SHEAR_CORRECTION: f64 = 5.0 / 6.0;
pub const SHEAR_CORRECTION_INPUT: &str = "shear_correction";

struct Ply {
    stiffness: UValue,
    z_top: f64,
    z_bottom: f64,
}

/// Thicknesses in mm, or `None` if any is missing or non-positive.
fn thicknesses(layers: &[MethodInputs]) -> Option<Vec<f64>> {
    layers
        .iter()
        .map(|l| l.number(names::LAYER_THICKNESS).map(|h| h.nominal * 10.0).filter(|h| *h > 0.0))
        .collect()
}

/// Plane-strain ply stiffness `E / (1 - nu^2)` with mid-plane coordinates.
fn plies(layers: &[MethodInputs]) -> Option<Vec<Ply>> {
    let h = thicknesses(layers)?;
    let total: f64 = h.iter().sum();
    let mut z = -total / 2.0;
    let mut out = Vec::with_capacity(layers.len());
    for (layer, hi) in layers.iter().zip(h) {
        let e = layer.number(names::ELASTIC_MODULUS)?;
        let nu = layer.number(names::POISSONS_RATIO)?;
        if nu.nominal.abs() >= 1.0 {
            return None;
        }
        let stiffness = e / (UValue::exact(1.0) - nu * nu);
        out.push(Ply { stiffness, z_top: z, z_bottom: z + hi });
        z += hi;
    }
    Some(out)
}

/// `sum_i Q_i (z_b^(k+1) - z_t^(k+1)) / (k + 1)`
fn moment(layers: &[MethodInputs], k: i32) -> UValue {
    if layers.is_empty() {
        return UValue::undefined();
    }
    let Some(plies) = plies(layers) else {
        return UValue::undefined();
    };
    plies.iter().fold(UValue::exact(0.0), |acc, ply| {
        let span = (ply.z_bottom.powi(k + 1) - ply.z_top.powi(k + 1)) / f64::from(k + 1);
        acc + ply.stiffness.scale(span)
    })
}

pub fn a11(layers: &[MethodInputs]) -> UValue {
    moment(layers, 0)
}

pub fn b11(layers: &[MethodInputs]) -> UValue {
    moment(layers, 1)
}

pub fn d11(layers: &[MethodInputs]) -> UValue {
    moment(layers, 2)
}

/// `kappa * sum_i G_i h_i`
pub fn a55(layers: &[MethodInputs]) -> UValue {
    if layers.is_empty() {
        return UValue::undefined();
    }
    let Some(h) = thicknesses(layers) else {
        return UValue::undefined();
    };
    let kappa = layers[0].number(SHEAR_CORRECTION_INPUT).map_or(SHEAR_CORRECTION, |k| k.nominal);
    let mut sum = UValue::exact(0.0);
    for (layer, hi) in layers.iter().zip(h) {
        let Some(g) = layer.number(names::SHEAR_MODULUS) else {
            return UValue::undefined();
        };
        sum = sum + g.scale(hi);
    }
    sum.scale(kappa)
}
