//! The empirical formula library and its registration table.
//!
//! Each formula takes named inputs and returns a [`UValue`](crate::value::UValue),
//! or the undefined sentinel when its inputs fall outside the range it was
//! fitted for.
pub mod density;
pub mod elastic;
pub mod plate;
pub mod poisson;

use crate::error::EngineError;
use crate::graph::definitions as names;
use crate::graph::DATA_FLOW;
use crate::store::{InputValue, MethodRegistry, MethodSpec};
use crate::value::UValue;

/// Density of ice, kg/m^3.
pub const RHO_ICE: f64 = 917.0;
/// Young's modulus of ice, MPa.
pub const E_ICE: f64 = 10_000.0;

#[inline]
pub(crate) fn in_range(x: f64, lo: f64, hi: f64) -> bool {
    (lo..=hi).contains(&x)
}

/// Registers every built-in method.
///
/// Density methods read only measured fields, so they are the only
/// root-safe entries. Everything downstream of density is recomputed on
/// every pathway.
pub fn register_defaults(registry: &mut MethodRegistry, shear_correction: f64) -> Result<(), EngineError> {
    use names::*;

    let specs = [
        MethodSpec::layer(DENSITY, DATA_FLOW, &[MEASURED_DENSITY], density::data_flow).root_safe(),
        MethodSpec::layer(DENSITY, "geldsetzer", &[HAND_HARDNESS, GRAIN_FORM], density::geldsetzer)
            .valid_for(density::GELDSETZER_GRAINS)
            .root_safe(),
        MethodSpec::layer(DENSITY, "kim_jamieson_table2", &[HAND_HARDNESS, GRAIN_FORM], density::kim_jamieson_table2)
            .valid_for(density::KIM_JAMIESON_T2_GRAINS)
            .root_safe(),
        MethodSpec::layer(
            DENSITY,
            "kim_jamieson_table5",
            &[HAND_HARDNESS, GRAIN_FORM, GRAIN_SIZE],
            density::kim_jamieson_table5,
        )
        .valid_for(density::KIM_JAMIESON_T5_GRAINS)
        .root_safe(),
        MethodSpec::layer(ELASTIC_MODULUS, "bergfeld", &[DENSITY, GRAIN_FORM], elastic::bergfeld)
            .valid_for(elastic::BERGFELD_GRAINS),
        MethodSpec::layer(ELASTIC_MODULUS, "kochle", &[DENSITY, GRAIN_FORM], elastic::kochle)
            .valid_for(elastic::KOCHLE_GRAINS),
        MethodSpec::layer(ELASTIC_MODULUS, "wautier", &[DENSITY, GRAIN_FORM], elastic::wautier),
        MethodSpec::layer(ELASTIC_MODULUS, "schottner", &[DENSITY, GRAIN_FORM], elastic::schottner)
            .valid_for(elastic::SCHOTTNER_GRAINS),
        MethodSpec::layer(SHEAR_MODULUS, "wautier", &[DENSITY, GRAIN_FORM], elastic::wautier_shear),
        MethodSpec::layer(POISSONS_RATIO, "kochle", &[GRAIN_FORM], poisson::kochle)
            .valid_for(poisson::KOCHLE_GRAINS),
        MethodSpec::layer(POISSONS_RATIO, "srivastava", &[DENSITY, GRAIN_FORM], poisson::srivastava)
            .valid_for(poisson::SRIVASTAVA_GRAINS),
        MethodSpec::slab(A11, "weissgraeber_rosendahl", &[ELASTIC_MODULUS, POISSONS_RATIO, LAYER_THICKNESS], plate::a11),
        MethodSpec::slab(B11, "weissgraeber_rosendahl", &[ELASTIC_MODULUS, POISSONS_RATIO, LAYER_THICKNESS], plate::b11),
        MethodSpec::slab(D11, "weissgraeber_rosendahl", &[ELASTIC_MODULUS, POISSONS_RATIO, LAYER_THICKNESS], plate::d11),
        MethodSpec::slab(A55, "weissgraeber_rosendahl", &[SHEAR_MODULUS, LAYER_THICKNESS], plate::a55).with_optional(
            plate::SHEAR_CORRECTION_INPUT,
            InputValue::Number(UValue::exact(shear_correction)),
        ),
    ];

    for spec in specs {
        registry.register(spec)?;
    }
    Ok(())
}

impl MethodRegistry {
    /// A registry holding every built-in method.
    pub fn with_defaults() -> Self {
        Self::with_shear_correction(plate::SHEAR_CORRECTION)
    }

    /// Built-in methods, with a custom default for A55's shear correction.
    pub fn with_shear_correction(shear_correction: f64) -> Self {
        let mut registry = Self::new();
        register_defaults(&mut registry, shear_correction)
            .expect("BUG: the built-in method table must not contain duplicates");
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CachePolicy, Scope};

    #[test]
    fn test_default_table() {
        let r = MethodRegistry::with_defaults();
        assert_eq!(r.len(), 15);
        assert_eq!(r.methods_for(names::DENSITY).len(), 4);
        assert_eq!(r.methods_for(names::ELASTIC_MODULUS).len(), 4);
        assert_eq!(r.lookup(names::D11, "weissgraeber_rosendahl").unwrap().scope(), Scope::Slab);
    }

    #[test]
    fn test_only_density_is_root_safe() {
        let r = MethodRegistry::with_defaults();
        for parameter in [names::DENSITY, names::ELASTIC_MODULUS, names::POISSONS_RATIO, names::SHEAR_MODULUS, names::A11, names::A55] {
            for spec in r.methods_for(parameter) {
                let expected = if parameter == names::DENSITY { CachePolicy::RootSafe } else { CachePolicy::AlwaysRecompute };
                assert_eq!(spec.cache_policy, expected, "{}/{}", spec.parameter, spec.method);
            }
        }
    }

    #[test]
    fn test_every_graph_method_is_registered() {
        let g = names::authored_graph();
        let r = MethodRegistry::with_defaults();
        for edge in g.edges() {
            let Some(method) = edge.method.as_deref() else { continue };
            assert!(r.lookup(&edge.target, method).is_some(), "{} via {}", edge.target, method);
        }
        assert!(r.lookup(names::DENSITY, DATA_FLOW).is_some());
    }
}
