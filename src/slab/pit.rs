//! Snow pit observations and slab extraction above a weak layer.

use super::{Layer, Slab};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    /// Compression test.
    CT,
    /// Extended column test.
    ECT,
    /// Propagation saw test.
    PST,
}

/// One stability test result, pointing at the layer where it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityTest {
    pub kind: TestKind,
    /// Index into the pit's layers (top to bottom).
    pub failure_layer: usize,
    /// Whether the fracture propagated across the column, when observed.
    #[serde(default)]
    pub propagation: Option<bool>,
}

/// How the weak layer of a pit is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeakLayerDefinition {
    LayerOfConcern,
    CtFailureLayer,
    EctpFailureLayer,
    EctnFailureLayer,
    PstFailureLayer,
}

impl WeakLayerDefinition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LayerOfConcern => "layer_of_concern",
            Self::CtFailureLayer => "CT_failure_layer",
            Self::EctpFailureLayer => "ECTP_failure_layer",
            Self::EctnFailureLayer => "ECTN_failure_layer",
            Self::PstFailureLayer => "PST_failure_layer",
        }
    }
}

impl FromStr for WeakLayerDefinition {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "layer_of_concern" => Ok(Self::LayerOfConcern),
            "CT_failure_layer" => Ok(Self::CtFailureLayer),
            "ECTP_failure_layer" => Ok(Self::EctpFailureLayer),
            "ECTN_failure_layer" => Ok(Self::EctnFailureLayer),
            "PST_failure_layer" => Ok(Self::PstFailureLayer),
            other => Err(EngineError::UnknownWeakLayerDefinition(other.to_string())),
        }
    }
}

impl fmt::Display for WeakLayerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A full pit profile as handed over by the ingestion collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnowPit {
    pub layers: Vec<Layer>,
    /// Slope angle, degrees.
    pub slope_angle: f64,
    #[serde(default)]
    pub layer_of_concern: Option<usize>,
    #[serde(default)]
    pub stability_tests: Vec<StabilityTest>,
}

impl SnowPit {
    /// Index of the weak layer under `definition`, if the pit has one.
    pub fn weak_layer_index(&self, definition: WeakLayerDefinition) -> Option<usize> {
        let first_test = |kind: TestKind, propagation: Option<bool>| {
            self.stability_tests
                .iter()
                .find(|t| t.kind == kind && (propagation.is_none() || t.propagation == propagation))
                .map(|t| t.failure_layer)
        };
        let index = match definition {
            WeakLayerDefinition::LayerOfConcern => self.layer_of_concern,
            WeakLayerDefinition::CtFailureLayer => first_test(TestKind::CT, None),
            WeakLayerDefinition::EctpFailureLayer => first_test(TestKind::ECT, Some(true)),
            WeakLayerDefinition::EctnFailureLayer => first_test(TestKind::ECT, Some(false)),
            WeakLayerDefinition::PstFailureLayer => first_test(TestKind::PST, None),
        }?;
        (index < self.layers.len()).then_some(index)
    }

    /// The slab above the weak layer named by `definition`.
    ///
    /// An unknown definition string is rejected. `Ok(None)` means the pit
    /// has no such weak layer, or nothing lies above it.
    pub fn slab_above(&self, definition: &str) -> Result<Option<Slab>, EngineError> {
        let definition: WeakLayerDefinition = definition.parse()?;
        let Some(weak) = self.weak_layer_index(definition) else {
            return Ok(None);
        };
        if weak == 0 {
            return Ok(None);
        }
        Ok(Some(Slab::new(self.layers[..weak].to_vec(), self.slope_angle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pit() -> SnowPit {
        SnowPit {
            layers: (0..5).map(|i| Layer::new().with_thickness(10.0 + i as f64)).collect(),
            slope_angle: 38.0,
            layer_of_concern: Some(3),
            stability_tests: vec![
                StabilityTest { kind: TestKind::ECT, failure_layer: 2, propagation: Some(false) },
                StabilityTest { kind: TestKind::ECT, failure_layer: 4, propagation: Some(true) },
                StabilityTest { kind: TestKind::CT, failure_layer: 1, propagation: None },
            ],
        }
    }

    #[rstest]
    #[case("layer_of_concern", Some(3))]
    #[case("CT_failure_layer", Some(1))]
    #[case("ECTP_failure_layer", Some(4))]
    #[case("ECTN_failure_layer", Some(2))]
    #[case("PST_failure_layer", None)]
    fn test_slab_above_definition(#[case] definition: &str, #[case] expected_layers: Option<usize>) {
        let slab = pit().slab_above(definition).unwrap();
        assert_eq!(slab.map(|s| s.layer_count()), expected_layers);
    }

    #[test]
    fn test_slab_above_keeps_angle_and_order() {
        let slab = pit().slab_above("layer_of_concern").unwrap().unwrap();
        assert_eq!(slab.angle, 38.0);
        let thicknesses: Vec<_> = slab.layers.iter().map(|l| l.thickness.unwrap()).collect();
        assert_eq!(thicknesses, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_unknown_definition_is_rejected() {
        let err = pit().slab_above("deepest_layer").unwrap_err();
        assert_eq!(err, EngineError::UnknownWeakLayerDefinition("deepest_layer".into()));
    }

    #[test]
    fn test_weak_layer_on_surface_has_no_slab() {
        let mut p = pit();
        p.layer_of_concern = Some(0);
        assert_eq!(p.slab_above("layer_of_concern").unwrap(), None);
    }
}
