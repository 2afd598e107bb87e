//! End-to-end properties of enumeration and execution on the authored graph.

use rstest::rstest;
use slab_mechparams_core::compute::PathwayExecutor;
use slab_mechparams_core::compute::ComputationCache;
use slab_mechparams_core::graph::GraphBuilder;
use slab_mechparams_core::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

fn field_slab() -> Slab {
    Slab::new(
        vec![
            Layer::new()
                .with_thickness(12.0)
                .with_hand_hardness("4F")
                .with_grain_form("RGmx")
                .with_grain_size(0.75)
                .with_measured_density(190.0),
            Layer::new()
                .with_thickness(18.0)
                .with_hand_hardness("4F")
                .with_grain_form("RG")
                .with_grain_size(1.0)
                .with_measured_density(240.0),
            Layer::new()
                .with_thickness(25.0)
                .with_hand_hardness("1F")
                .with_grain_form("FCxr")
                .with_grain_size(1.5)
                .with_measured_density(290.0),
        ],
        36.0,
    )
}

#[rstest]
#[case(names::GRAIN_FORM, 1)]
#[case(names::ELASTIC_MODULUS, 16)]
#[case(names::D11, 80)]
fn raw_counts(#[case] target: &str, #[case] expected: usize) {
    let graph = authored_graph();
    assert_eq!(PathwayEnumerator::new(&graph).count_raw(target).unwrap(), expected);
}

#[test]
fn raw_count_is_sum_at_parameters_and_product_at_merges() {
    let graph = authored_graph();
    let e = PathwayEnumerator::new(&graph);
    let density = e.count_raw(names::DENSITY).unwrap();
    let grain = e.count_raw(names::GRAIN_FORM).unwrap();
    let merge = e.count_raw(names::MERGE_DENSITY_GRAIN).unwrap();
    assert_eq!(merge, density * grain);
    assert_eq!(e.count_raw(names::ELASTIC_MODULUS).unwrap(), 4 * merge);
    assert_eq!(e.count_raw(names::POISSONS_RATIO).unwrap(), grain + merge);
}

#[test]
fn data_flow_parameter_has_single_linear_pathway() {
    let graph = authored_graph();
    let found = PathwayEnumerator::new(&graph).find_parameterizations(names::LAYER_THICKNESS).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].merge_points.is_empty());
}

#[test]
fn dedup_is_idempotent() {
    let graph = authored_graph();
    let e = PathwayEnumerator::new(&graph);
    let once = e.find_parameterizations(names::D11).unwrap();
    let fingerprints: HashSet<String> = once.iter().map(|p| p.fingerprint()).collect();
    assert_eq!(fingerprints.len(), once.len());
    assert_eq!(once.len(), 32);

    let again = e.find_parameterizations(names::D11).unwrap();
    assert_eq!(once, again);
}

#[test]
fn empty_merge_starves_every_dependent() {
    let mut b = GraphBuilder::new("pit");
    let root = b.root();
    let h = b.param("h");
    let dead = b.merge("dead_merge");
    let e = b.param("e");
    let joined = b.merge("e_h");
    let stiffness = b.param("stiffness");
    b.flow(root, h)
        .method(dead, e, "orphan")
        .flow(e, joined)
        .flow(h, joined)
        .method(joined, stiffness, "plate");
    let graph = b.build().unwrap();

    let en = PathwayEnumerator::new(&graph);
    for target in ["e", "e_h", "stiffness"] {
        assert_eq!(en.count_raw(target).unwrap(), 0, "{target}");
        assert!(en.find_parameterizations(target).unwrap().is_empty(), "{target}");
    }
}

#[test]
fn repeated_execution_is_identical() {
    let graph = authored_graph();
    let registry = MethodRegistry::with_defaults();
    let slab = field_slab();
    let mut engine = SlabEngine::new(&graph, &registry);

    let first = engine.execute_all(&slab, names::D11).unwrap();
    let second = engine.execute_all(&slab, names::D11).unwrap();
    assert_eq!(first.total, 32);
    assert_eq!(first.successful, second.successful);
    for (key, a) in &first.pathways {
        let b = &second.pathways[key];
        assert_eq!(a.slab, b.slab, "{key}");
        assert_eq!(a.target_values(), b.target_values(), "{key}");
    }
    // The second pass reads density from the cache.
    assert!(second.cache.hits > first.cache.hits);
}

#[test]
fn original_slab_is_never_mutated() {
    let graph = authored_graph();
    let registry = MethodRegistry::with_defaults();
    let slab = field_slab();
    let snapshot = slab.clone();
    let pointers: Vec<Arc<Layer>> = slab.layers.iter().map(Arc::clone).collect();

    let mut engine = SlabEngine::new(&graph, &registry);
    for target in [names::DENSITY, names::ELASTIC_MODULUS, names::D11, names::A55] {
        engine.execute_all(&slab, target).unwrap();
    }

    assert_eq!(slab, snapshot);
    for (layer, before) in slab.layers.iter().zip(&pointers) {
        assert!(Arc::ptr_eq(layer, before));
        assert!(layer.density_calculated.is_none());
        assert!(layer.elastic_modulus.is_none());
    }
    assert!(slab.d11.is_none() && slab.a55.is_none());
}

#[test]
fn execution_order_does_not_leak_between_pathways() {
    let graph = authored_graph();
    let registry = MethodRegistry::with_defaults();
    let slab = field_slab();
    let e = PathwayEnumerator::new(&graph);
    let pathways = e.find_parameterizations(names::ELASTIC_MODULUS).unwrap();
    let a = pathways.iter().find(|p| p.method_map()[names::DENSITY] == "geldsetzer").unwrap();
    let b = pathways.iter().find(|p| p.method_map()[names::DENSITY] == "data_flow").unwrap();
    let executor = PathwayExecutor::new(&graph, &registry);

    let mut cache = ComputationCache::new();
    executor.execute(a, &slab, &mut cache);
    let b_after_a = executor.execute(b, &slab, &mut cache);

    let b_alone = executor.execute(b, &slab, &mut ComputationCache::new());
    assert_eq!(b_after_a.slab, b_alone.slab);
    assert_eq!(b_after_a.target_values(), b_alone.target_values());
}

#[test]
fn a_then_b_equals_b_then_a() {
    let graph = authored_graph();
    let registry = MethodRegistry::with_defaults();
    let slab = field_slab();

    let mut ab = SlabEngine::new(&graph, &registry);
    ab.execute_all(&slab, names::POISSONS_RATIO).unwrap();
    let b1 = ab.execute_all(&slab, names::SHEAR_MODULUS).unwrap();

    let mut fresh = SlabEngine::new(&graph, &registry);
    let b2 = fresh.execute_all(&slab, names::SHEAR_MODULUS).unwrap();

    assert_eq!(b1.successful, b2.successful);
    for (key, r) in &b2.pathways {
        assert_eq!(b1.pathways[key].target_values(), r.target_values(), "{key}");
    }
}

#[test]
fn execute_single_without_data_flow_entries() {
    let graph = authored_graph();
    let registry = MethodRegistry::with_defaults();
    let mut engine = SlabEngine::new(&graph, &registry);

    let methods: BTreeMap<String, String> = [
        (names::DENSITY, "geldsetzer"),
        (names::ELASTIC_MODULUS, "bergfeld"),
        (names::POISSONS_RATIO, "srivastava"),
        (names::D11, "weissgraeber_rosendahl"),
    ]
    .into_iter()
    .map(|(p, m)| (p.to_string(), m.to_string()))
    .collect();

    let result = engine.execute_single(&field_slab(), names::D11, &methods).unwrap();
    assert!(result.success, "{:#?}", result.traces);
    assert!(result.slab.d11.unwrap().nominal > 0.0);
    assert_eq!(result.description, "density:geldsetzer -> elastic_modulus:bergfeld -> poissons_ratio:srivastava -> D11:weissgraeber_rosendahl");
}

#[test]
fn pit_to_results_as_json() {
    let pit: SnowPit = serde_json::from_str(
        r#"{
            "layers": [
                {"thickness": 15.0, "hand_hardness": "4F", "grain_form": "RG", "density_measured": 220.0},
                {"thickness": 30.0, "hand_hardness": "1F", "grain_form": "FC", "density_measured": 280.0},
                {"thickness": 2.0, "hand_hardness": "F", "grain_form": "SH"}
            ],
            "slope_angle": 38.0,
            "layer_of_concern": 2
        }"#,
    )
    .unwrap();
    let slab = pit.slab_above("layer_of_concern").unwrap().unwrap();
    assert_eq!(slab.layer_count(), 2);
    assert!(matches!(pit.slab_above("whumpf"), Err(EngineError::UnknownWeakLayerDefinition(_))));

    let graph = authored_graph();
    let registry = MethodRegistry::with_defaults();
    let results = SlabEngine::new(&graph, &registry).execute_all(&slab, names::A55).unwrap();
    let json: serde_json::Value = serde_json::from_str(&results.to_json().unwrap()).unwrap();
    assert_eq!(json["target"], "A55");
    assert_eq!(json["total"], 4);
    assert_eq!(json["pathways"].as_object().unwrap().len(), 4);
}
