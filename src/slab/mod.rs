//! The input data object: an ordered stack of layers plus slope angle.
pub mod codes;
pub mod layer;
pub mod pit;

pub use layer::Layer;
pub use pit::{SnowPit, StabilityTest, TestKind, WeakLayerDefinition};

use crate::graph::definitions as names;
use crate::value::UValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A slab: layers ordered top to bottom, the slope angle, and the
/// slab-aggregate plate stiffnesses.
///
/// Layers are held behind `Arc` so pathway execution can rebuild a slab that
/// shares every layer it did not touch with the original.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    pub layers: Vec<Arc<Layer>>,
    /// Slope angle, degrees.
    pub angle: f64,
    /// Extensional stiffness, N/mm.
    #[serde(default)]
    pub a11: Option<UValue>,
    /// Bending-extension coupling stiffness, N.
    #[serde(default)]
    pub b11: Option<UValue>,
    /// Bending stiffness, N mm.
    #[serde(default)]
    pub d11: Option<UValue>,
    /// Shear stiffness, N/mm.
    #[serde(default)]
    pub a55: Option<UValue>,
}

impl Slab {
    pub fn new(layers: Vec<Layer>, angle: f64) -> Self {
        Self {
            layers: layers.into_iter().map(Arc::new).collect(),
            angle,
            ..Default::default()
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Sum of layer thicknesses in cm, `None` if any layer lacks one.
    pub fn total_thickness(&self) -> Option<f64> {
        self.layers.iter().map(|l| l.thickness).sum()
    }

    pub fn calculated(&self, parameter: &str) -> Option<UValue> {
        match parameter {
            names::A11 => self.a11,
            names::B11 => self.b11,
            names::D11 => self.d11,
            names::A55 => self.a55,
            _ => None,
        }
    }

    /// Writes a slab-aggregate field. Returns `false` if `parameter` is not one.
    pub fn set_calculated(&mut self, parameter: &str, value: Option<UValue>) -> bool {
        let slot = match parameter {
            names::A11 => &mut self.a11,
            names::B11 => &mut self.b11,
            names::D11 => &mut self.d11,
            names::A55 => &mut self.a55,
            _ => return false,
        };
        *slot = value;
        true
    }
}
