//! The hand-authored parameter graph and the parameter names it uses.
//!
//! ```text
//! snow_pit ─┬─ measured_density ─────────────────────────────── density (data_flow)
//!           ├─ measured_hand_hardness ── hand_hardness ─┐
//!           ├─ measured_grain_form ───── grain_form ────┼─ <hand_hardness+grain_form> ── density (geldsetzer, kim_jamieson_table2)
//!           ├─ measured_grain_size ───── grain_size ────┴─ <…+grain_size> ─────────────── density (kim_jamieson_table5)
//!           └─ measured_layer_thickness ─ layer_thickness
//!
//! density + grain_form ── <density+grain_form> ─┬─ elastic_modulus (bergfeld, kochle, wautier, schottner)
//!                                               ├─ shear_modulus (wautier)
//!                                               └─ poissons_ratio (srivastava)
//! grain_form ─────────────────────────────────────── poissons_ratio (kochle)
//! elastic_modulus + poissons_ratio + layer_thickness ── <E+nu+h> ── A11, B11, D11 (weissgraeber_rosendahl)
//! shear_modulus + layer_thickness ── <G+h> ── A55 (weissgraeber_rosendahl)
//! ```

use super::builder::GraphBuilder;
use super::dag::ParameterGraph;

pub const ROOT: &str = "snow_pit";

pub const MEASURED_DENSITY: &str = "measured_density";
pub const MEASURED_HAND_HARDNESS: &str = "measured_hand_hardness";
pub const MEASURED_GRAIN_FORM: &str = "measured_grain_form";
pub const MEASURED_GRAIN_SIZE: &str = "measured_grain_size";
pub const MEASURED_LAYER_THICKNESS: &str = "measured_layer_thickness";

pub const DENSITY: &str = "density";
pub const HAND_HARDNESS: &str = "hand_hardness";
pub const GRAIN_FORM: &str = "grain_form";
pub const GRAIN_SIZE: &str = "grain_size";
pub const LAYER_THICKNESS: &str = "layer_thickness";
pub const ELASTIC_MODULUS: &str = "elastic_modulus";
pub const POISSONS_RATIO: &str = "poissons_ratio";
pub const SHEAR_MODULUS: &str = "shear_modulus";

pub const A11: &str = "A11";
pub const B11: &str = "B11";
pub const D11: &str = "D11";
pub const A55: &str = "A55";

pub const MERGE_HARDNESS_GRAIN: &str = "merge_hand_hardness_grain_form";
pub const MERGE_HARDNESS_GRAIN_SIZE: &str = "merge_hand_hardness_grain_form_grain_size";
pub const MERGE_DENSITY_GRAIN: &str = "merge_density_grain_form";
pub const MERGE_E_NU_THICKNESS: &str = "merge_E_nu_thickness";
pub const MERGE_G_THICKNESS: &str = "merge_G_thickness";

/// Builds the authored graph.
pub fn build_authored_graph() -> GraphBuilder {
    let mut b = GraphBuilder::new(ROOT);
    let root = b.root();

    let measured_density = b.param(MEASURED_DENSITY);
    let measured_hardness = b.param(MEASURED_HAND_HARDNESS);
    let measured_grain_form = b.param(MEASURED_GRAIN_FORM);
    let measured_grain_size = b.param(MEASURED_GRAIN_SIZE);
    let measured_thickness = b.param(MEASURED_LAYER_THICKNESS);
    for measured in [measured_density, measured_hardness, measured_grain_form, measured_grain_size, measured_thickness] {
        b.flow(root, measured);
    }

    let density = b.param(DENSITY);
    let hardness = b.param(HAND_HARDNESS);
    let grain_form = b.param(GRAIN_FORM);
    let grain_size = b.param(GRAIN_SIZE);
    let thickness = b.param(LAYER_THICKNESS);
    b.flow(measured_hardness, hardness)
        .flow(measured_grain_form, grain_form)
        .flow(measured_grain_size, grain_size)
        .flow(measured_thickness, thickness);

    // Density: measured directly, or estimated from hardness and grain type.
    b.flow(measured_density, density);
    let hg = b.merge(MERGE_HARDNESS_GRAIN);
    b.flow(hardness, hg).flow(grain_form, hg);
    b.method(hg, density, "geldsetzer").method(hg, density, "kim_jamieson_table2");
    let hgs = b.merge(MERGE_HARDNESS_GRAIN_SIZE);
    b.flow(hardness, hgs).flow(grain_form, hgs).flow(grain_size, hgs);
    b.method(hgs, density, "kim_jamieson_table5");

    // Layer elastic properties from density and grain type.
    let dg = b.merge(MERGE_DENSITY_GRAIN);
    b.flow(density, dg).flow(grain_form, dg);
    let elastic = b.param(ELASTIC_MODULUS);
    for method in ["bergfeld", "kochle", "wautier", "schottner"] {
        b.method(dg, elastic, method);
    }
    let shear = b.param(SHEAR_MODULUS);
    b.method(dg, shear, "wautier");
    let poisson = b.param(POISSONS_RATIO);
    b.method(grain_form, poisson, "kochle");
    b.method(dg, poisson, "srivastava");

    // Slab plate stiffnesses.
    let ent = b.merge(MERGE_E_NU_THICKNESS);
    b.flow(elastic, ent).flow(poisson, ent).flow(thickness, ent);
    for stiffness in [A11, B11, D11] {
        let node = b.param(stiffness);
        b.method(ent, node, "weissgraeber_rosendahl");
    }
    let gt = b.merge(MERGE_G_THICKNESS);
    b.flow(shear, gt).flow(thickness, gt);
    let a55 = b.param(A55);
    b.method(gt, a55, "weissgraeber_rosendahl");

    b
}

/// The authored graph, validated.
pub fn authored_graph() -> ParameterGraph {
    build_authored_graph()
        .build()
        .expect("BUG: the authored parameter graph must be consistent and acyclic")
}
