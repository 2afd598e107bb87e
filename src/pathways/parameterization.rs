//! parameterization.rs
//! The flattened, serializable form of one pathway.

use crate::graph::{Node, DATA_FLOW};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One `from -> method -> to` step. `method = None` is plain data flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    pub from: Node,
    pub method: Option<String>,
    pub to: Node,
}

impl Segment {
    pub fn label(&self) -> &str {
        self.method.as_deref().unwrap_or(DATA_FLOW)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --{}--> {}", self.from, self.label(), self.to)
    }
}

/// A linear chain of segments starting at the graph root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub segments: Vec<Segment>,
}

/// A merge node, the inputs feeding it, and the chain continuing after it.
///
/// `branches` index into [`Parameterization::branches`]; `upstream_merges`
/// index earlier entries of [`Parameterization::merge_points`] whose
/// continuation ends at this merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergePoint {
    pub merge: Node,
    pub branches: Vec<usize>,
    pub upstream_merges: Vec<usize>,
    pub continuation: Vec<Segment>,
}

/// One end-to-end way of computing `target` from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameterization {
    pub target: Node,
    pub root: Node,
    pub branches: Vec<Branch>,
    pub merge_points: Vec<MergePoint>,
}

impl Parameterization {
    /// All segments, branches first, then merge continuations, in push order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.branches
            .iter()
            .flat_map(|b| b.segments.iter())
            .chain(self.merge_points.iter().flat_map(|m| m.continuation.iter()))
    }

    /// The method chosen for each calculated parameter.
    ///
    /// Segments into the root, into a merge, or into a measured leaf (fed by
    /// the root directly) carry no choice and are skipped. A later segment
    /// overwrites an earlier one for the same parameter.
    pub fn method_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for segment in self.segments() {
            if segment.to == self.root || segment.from == self.root || segment.to.is_merge() {
                continue;
            }
            map.insert(segment.to.name().to_string(), segment.label().to_string());
        }
        map
    }

    /// Identity of the method choices, used to drop traversals that resolve
    /// to the same mapping.
    pub fn fingerprint(&self) -> String {
        self.method_map()
            .iter()
            .map(|(parameter, method)| format!("{parameter}:{method}"))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Checks structural consistency: every index resolves, every merge
    /// continuation feeds a later merge or ends at the target, and exactly
    /// one chain ends at the target.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.merge_points.is_empty() {
            return match self.branches.as_slice() {
                [] if self.target == self.root => Ok(()),
                [only] if only.segments.last().map(|s| &s.to) == Some(&self.target) => Ok(()),
                _ => Err(format!("expected one branch ending at '{}'", self.target)),
            };
        }
        for (i, mp) in self.merge_points.iter().enumerate() {
            if let Some(b) = mp.branches.iter().find(|&&b| b >= self.branches.len()) {
                return Err(format!("merge point {i} references missing branch {b}"));
            }
            if let Some(m) = mp.upstream_merges.iter().find(|&&m| m >= i) {
                return Err(format!("merge point {i} references merge point {m} that is not upstream"));
            }
            for &b in &mp.branches {
                match self.branches[b].segments.last() {
                    Some(last) if last.to == mp.merge => {}
                    _ => return Err(format!("branch {b} does not end at merge '{}'", mp.merge)),
                }
            }
        }
        let referenced: Vec<usize> = self.merge_points.iter().flat_map(|m| m.upstream_merges.iter().copied()).collect();
        for (i, mp) in self.merge_points.iter().enumerate() {
            if referenced.contains(&i) {
                continue;
            }
            // The one merge nobody consumes must lead to the target.
            let end = mp.continuation.last().map(|s| &s.to).unwrap_or(&mp.merge);
            if *end != self.target {
                return Err(format!("merge point {i} continuation ends at '{end}', not the target"));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Parameterization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.method_map();
        let parts: Vec<String> = map.iter().map(|(p, m)| format!("{p}={m}")).collect();
        write!(f, "{} [{}]", self.target, parts.join(", "))
    }
}
