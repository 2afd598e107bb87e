//! A single snow layer: measured observations plus calculated parameters.

use crate::graph::definitions as names;
use crate::value::UValue;
use serde::{Deserialize, Serialize};

/// One layer of a snow pit, top-to-bottom order is kept by the owning slab.
///
/// Measured fields come from the field observation. Calculated fields are
/// written by pathway execution on a copy of the layer; a caller may also
/// pre-populate them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer {
    /// Depth of the layer top below the surface, cm.
    pub depth_top: Option<f64>,
    /// Layer thickness, cm.
    pub thickness: Option<f64>,
    pub hand_hardness: Option<String>,
    pub grain_form: Option<String>,
    /// Average grain size, mm.
    pub grain_size_avg: Option<f64>,
    /// Directly measured density, kg/m^3.
    pub density_measured: Option<f64>,

    pub density_calculated: Option<UValue>,
    /// MPa.
    pub elastic_modulus: Option<UValue>,
    pub poissons_ratio: Option<UValue>,
    /// MPa.
    pub shear_modulus: Option<UValue>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thickness(mut self, cm: f64) -> Self {
        self.thickness = Some(cm);
        self
    }

    pub fn with_hand_hardness(mut self, code: &str) -> Self {
        self.hand_hardness = Some(code.to_string());
        self
    }

    pub fn with_grain_form(mut self, code: &str) -> Self {
        self.grain_form = Some(code.to_string());
        self
    }

    pub fn with_grain_size(mut self, mm: f64) -> Self {
        self.grain_size_avg = Some(mm);
        self
    }

    pub fn with_measured_density(mut self, kg_m3: f64) -> Self {
        self.density_measured = Some(kg_m3);
        self
    }

    /// The calculated value stored for `parameter`, if it is a calculated field.
    pub fn calculated(&self, parameter: &str) -> Option<UValue> {
        match parameter {
            names::DENSITY => self.density_calculated,
            names::ELASTIC_MODULUS => self.elastic_modulus,
            names::POISSONS_RATIO => self.poissons_ratio,
            names::SHEAR_MODULUS => self.shear_modulus,
            _ => None,
        }
    }

    /// Writes a calculated field. Returns `false` if `parameter` is not one.
    pub fn set_calculated(&mut self, parameter: &str, value: Option<UValue>) -> bool {
        let slot = match parameter {
            names::DENSITY => &mut self.density_calculated,
            names::ELASTIC_MODULUS => &mut self.elastic_modulus,
            names::POISSONS_RATIO => &mut self.poissons_ratio,
            names::SHEAR_MODULUS => &mut self.shear_modulus,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Numeric field lookup by graph parameter name, without special resolution.
    pub fn numeric(&self, name: &str) -> Option<UValue> {
        match name {
            names::MEASURED_DENSITY => self.density_measured.map(UValue::exact),
            names::LAYER_THICKNESS => self.thickness.map(UValue::exact),
            names::GRAIN_SIZE => self.grain_size_avg.map(UValue::exact),
            other => self.calculated(other),
        }
    }

    /// Best available density: calculated first, measured second.
    pub fn best_density(&self) -> Option<UValue> {
        self.density_calculated.or_else(|| self.density_measured.map(UValue::exact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_density_prefers_calculated() {
        let mut layer = Layer::new().with_measured_density(210.0);
        assert_eq!(layer.best_density(), Some(UValue::exact(210.0)));
        layer.set_calculated(names::DENSITY, Some(UValue::new(250.0, 20.0)));
        assert_eq!(layer.best_density(), Some(UValue::new(250.0, 20.0)));
    }

    #[test]
    fn test_set_calculated_rejects_measured_fields() {
        let mut layer = Layer::new();
        assert!(!layer.set_calculated(names::LAYER_THICKNESS, Some(UValue::exact(1.0))));
        assert!(layer.set_calculated(names::SHEAR_MODULUS, Some(UValue::exact(1.0))));
        assert_eq!(layer.numeric(names::SHEAR_MODULUS), Some(UValue::exact(1.0)));
    }

    #[test]
    fn test_deserialize_partial_layer() {
        let layer: Layer = serde_json::from_str(r#"{"thickness": 12.5, "grain_form": "RGmx"}"#).unwrap();
        assert_eq!(layer.thickness, Some(12.5));
        assert_eq!(layer.grain_form.as_deref(), Some("RGmx"));
        assert!(layer.hand_hardness.is_none());
    }
}
