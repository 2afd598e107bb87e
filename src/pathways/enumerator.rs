//! enumerator.rs
//! Backward, memoized enumeration of every way to compute a target.
//!
//! A parameter node is an OR over its incoming edges, a merge node is an AND.
//! Each resulting tree is flattened into a [`Parameterization`]; trees that
//! resolve to the same method choices are dropped.

use super::parameterization::{Branch, MergePoint, Parameterization, Segment};
use super::tree::PathTree;
use crate::error::EngineError;
use crate::graph::{EdgeId, NodeId, ParameterGraph};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::debug;

type Legs = SmallVec<[(Rc<PathTree>, EdgeId); 2]>;

pub struct PathwayEnumerator<'g> {
    graph: &'g ParameterGraph,
}

impl<'g> PathwayEnumerator<'g> {
    pub fn new(graph: &'g ParameterGraph) -> Self {
        Self { graph }
    }

    /// Number of traversal trees reaching `target`, before deduplication.
    ///
    /// Sum over incoming edges at a parameter node, product at a merge node.
    pub fn count_raw(&self, target: &str) -> Result<usize, EngineError> {
        let id = self.resolve(target)?;
        let mut memo = HashMap::new();
        Ok(self.count(id, &mut memo))
    }

    fn count(&self, node: NodeId, memo: &mut HashMap<NodeId, usize>) -> usize {
        if let Some(&n) = memo.get(&node) {
            return n;
        }
        let n = if node == self.graph.root() {
            1
        } else {
            let incoming = self.graph.incoming(node);
            if self.graph.node(node).is_merge() {
                if incoming.is_empty() {
                    0
                } else {
                    incoming.iter().fold(1usize, |acc, &(_, src)| acc.saturating_mul(self.count(src, memo)))
                }
            } else {
                incoming.iter().fold(0usize, |acc, &(_, src)| acc.saturating_add(self.count(src, memo)))
            }
        };
        memo.insert(node, n);
        n
    }

    /// Every distinct pathway to `target`, first traversal kept per
    /// fingerprint.
    pub fn find_parameterizations(&self, target: &str) -> Result<Vec<Parameterization>, EngineError> {
        let raw = self.all_parameterizations(target)?;
        let raw_count = raw.len();
        let mut seen = HashSet::new();
        let unique: Vec<_> = raw.into_iter().filter(|p| seen.insert(p.fingerprint())).collect();
        debug!(parameter = target, raw = raw_count, unique = unique.len(), "enumerated pathways");
        Ok(unique)
    }

    /// Every traversal to `target` flattened, duplicates included.
    pub fn all_parameterizations(&self, target: &str) -> Result<Vec<Parameterization>, EngineError> {
        let id = self.resolve(target)?;
        let mut memo = HashMap::new();
        let trees = self.trees(id, &mut memo);
        Ok(trees.iter().map(|t| self.flatten(t)).collect())
    }

    fn resolve(&self, target: &str) -> Result<NodeId, EngineError> {
        self.graph
            .node_id(target)
            .ok_or_else(|| EngineError::UnknownParameter(target.to_string()))
    }

    /// Trees producing `node`, computed once per node per call.
    fn trees(&self, node: NodeId, memo: &mut HashMap<NodeId, Rc<[Rc<PathTree>]>>) -> Rc<[Rc<PathTree>]> {
        if let Some(cached) = memo.get(&node) {
            return Rc::clone(cached);
        }

        let incoming = self.graph.incoming(node);
        let trees: Vec<Rc<PathTree>> = if node == self.graph.root() {
            vec![Rc::new(PathTree::leaf(node))]
        } else if self.graph.node(node).is_merge() {
            if incoming.is_empty() {
                Vec::new()
            } else {
                // Cartesian product across every incoming edge.
                let mut partial: Vec<Legs> = vec![Legs::new()];
                for (edge, source) in incoming {
                    let options = self.trees(source, memo);
                    let mut next = Vec::with_capacity(partial.len() * options.len());
                    for legs in &partial {
                        for option in options.iter() {
                            let mut extended = legs.clone();
                            extended.push((Rc::clone(option), edge));
                            next.push(extended);
                        }
                    }
                    partial = next;
                }
                partial.into_iter().map(|legs| Rc::new(PathTree::joined(node, legs))).collect()
            }
        } else {
            let mut out = Vec::new();
            for (edge, source) in incoming {
                for option in self.trees(source, memo).iter() {
                    out.push(Rc::new(PathTree::single(node, Rc::clone(option), edge)));
                }
            }
            out
        };

        let trees: Rc<[Rc<PathTree>]> = trees.into();
        memo.insert(node, Rc::clone(&trees));
        trees
    }

    fn flatten(&self, tree: &PathTree) -> Parameterization {
        let mut flat = Flattener { graph: self.graph, branches: Vec::new(), merge_points: Vec::new() };
        let (origin, segments) = flat.walk(tree);
        match origin {
            Origin::Root if !segments.is_empty() => flat.branches.push(Branch { segments }),
            Origin::Root => {}
            Origin::Merge(m) => flat.merge_points[m].continuation = segments,
        }
        Parameterization {
            target: self.graph.node(tree.node).clone(),
            root: self.graph.root_node().clone(),
            branches: flat.branches,
            merge_points: flat.merge_points,
        }
    }
}

/// Where the open chain of a walk starts.
enum Origin {
    Root,
    Merge(usize),
}

struct Flattener<'g> {
    graph: &'g ParameterGraph,
    branches: Vec<Branch>,
    merge_points: Vec<MergePoint>,
}

impl Flattener<'_> {
    /// Returns the origin of the open chain ending at `tree.node` and the
    /// segments from that origin, in forward order.
    fn walk(&mut self, tree: &PathTree) -> (Origin, Vec<Segment>) {
        if tree.is_merge {
            let mut branches = Vec::new();
            let mut upstream_merges = Vec::new();
            for (child, edge) in &tree.children {
                let (origin, mut segments) = self.walk(child);
                segments.push(self.segment(child.node, *edge, tree.node));
                match origin {
                    Origin::Root => {
                        branches.push(self.branches.len());
                        self.branches.push(Branch { segments });
                    }
                    Origin::Merge(m) => {
                        self.merge_points[m].continuation = segments;
                        upstream_merges.push(m);
                    }
                }
            }
            self.merge_points.push(MergePoint {
                merge: self.graph.node(tree.node).clone(),
                branches,
                upstream_merges,
                continuation: Vec::new(),
            });
            return (Origin::Merge(self.merge_points.len() - 1), Vec::new());
        }

        match tree.children.first() {
            None => (Origin::Root, Vec::new()),
            Some((child, edge)) => {
                let (origin, mut segments) = self.walk(child);
                segments.push(self.segment(child.node, *edge, tree.node));
                (origin, segments)
            }
        }
    }

    fn segment(&self, from: NodeId, edge: EdgeId, to: NodeId) -> Segment {
        Segment {
            from: self.graph.node(from).clone(),
            method: self.graph.edge_method(edge).map(str::to_string),
            to: self.graph.node(to).clone(),
        }
    }
}
