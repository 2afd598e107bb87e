//! report.rs
//! Plain-text rendering of pathways and execution results.

use crate::compute::{ExecutionResults, PathwayResult};
use crate::pathways::{Parameterization, Segment};
use std::fmt::Write;

/// Renders a pathway as an indented tree, target side first.
///
/// ```text
/// PATHWAY to 'elastic_modulus':
/// --------------------------------------------------
/// <merge_density_grain_form> --kochle--> elastic_modulus
///   |- snow_pit --data_flow--> measured_grain_form --data_flow--> grain_form --data_flow--> <merge_density_grain_form>
///   +- <merge_hand_hardness_grain_form> --geldsetzer--> density --data_flow--> <merge_density_grain_form>
///     |- ...
/// ```
pub fn format_pathway(pathway: &Parameterization) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "PATHWAY to '{}':", pathway.target);
    let _ = writeln!(out, "--------------------------------------------------");

    let consumed: Vec<usize> = pathway
        .merge_points
        .iter()
        .flat_map(|m| m.upstream_merges.iter().copied())
        .collect();
    match (0..pathway.merge_points.len()).find(|i| !consumed.contains(i)) {
        Some(top) => render_merge(&mut out, pathway, top, 0),
        None => {
            for branch in &pathway.branches {
                let _ = writeln!(out, "{}", chain(&branch.segments));
            }
        }
    }
    out
}

fn render_merge(out: &mut String, pathway: &Parameterization, index: usize, level: usize) {
    let indent = "  ".repeat(level);
    let mp = &pathway.merge_points[index];
    if mp.continuation.is_empty() {
        let _ = writeln!(out, "{indent}{}", mp.merge);
    } else {
        let _ = writeln!(out, "{indent}{}", chain(&mp.continuation));
    }
    for &b in &mp.branches {
        let _ = writeln!(out, "{indent}  |- {}", chain(&pathway.branches[b].segments));
    }
    for &m in &mp.upstream_merges {
        let _ = write!(out, "{indent}  +- ");
        let mut nested = String::new();
        render_merge(&mut nested, pathway, m, level + 1);
        // The first nested line continues the "+- " marker.
        let nested = nested.strip_prefix(&"  ".repeat(level + 1)).unwrap_or(&nested);
        out.push_str(nested);
    }
}

fn chain(segments: &[Segment]) -> String {
    let Some(first) = segments.first() else {
        return String::new();
    };
    let mut s = first.from.to_string();
    for segment in segments {
        let _ = write!(s, " --{}--> {}", segment.label(), segment.to);
    }
    s
}

/// One line per pathway: status, description, and the target values or the
/// first failure.
pub fn format_summary(results: &ExecutionResults) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "RESULTS for '{}': {} pathways, {} succeeded, {} failed, cache hit rate {:.1}%",
        results.target,
        results.total,
        results.successful,
        results.failed,
        results.cache.hit_rate * 100.0
    );
    let _ = writeln!(out, "--------------------------------------------------");
    for (description, result) in &results.pathways {
        let status = if result.success { "ok" } else { "FAILED" };
        let _ = writeln!(out, "[{status:>6}] {description} => {}", outcome(result));
    }
    out
}

fn outcome(result: &PathwayResult) -> String {
    let values = result.target_values();
    if !values.is_empty() {
        return values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
    }
    match result.failures().next() {
        Some(trace) => match (trace.layer, &trace.outcome) {
            (Some(layer), Err(e)) => format!("{} (layer {layer}): {e}", trace.parameter),
            (None, Err(e)) => format!("{}: {e}", trace.parameter),
            (_, Ok(_)) => String::new(),
        },
        None => "nothing to compute".to_string(),
    }
}
