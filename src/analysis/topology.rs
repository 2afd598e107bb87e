use crate::error::EngineError;
use crate::graph::{NodeId, ParameterGraph};

/// Performs a Topological Sort using Depth-First Search (DFS).
///
/// Returns a list of NodeIds where every input appears before its consumer.
/// Inputs are visited in edge insertion order, so the result is deterministic
/// for a given construction sequence.
pub fn sort(graph: &ParameterGraph) -> Result<Vec<NodeId>, EngineError> {
    let count = graph.node_count();
    let mut order = Vec::with_capacity(count);
    let mut state = vec![VisitState::None; count];

    // Iterate every node so disconnected ones are ordered too.
    // Standard DFS post-order over inputs gives [input, ..., consumer].
    for id in graph.node_ids() {
        if state[id.index()] == VisitState::None {
            visit(id, graph, &mut state, &mut order)?;
        }
    }

    Ok(order)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting, // Used for cycle detection
    Visited,
}

fn visit(
    node: NodeId,
    graph: &ParameterGraph,
    state: &mut [VisitState],
    order: &mut Vec<NodeId>,
) -> Result<(), EngineError> {
    let idx = node.index();

    match state[idx] {
        VisitState::Visited => return Ok(()),
        VisitState::Visiting => {
            return Err(EngineError::CycleDetected(graph.node(node).name().to_string()))
        }
        VisitState::None => state[idx] = VisitState::Visiting,
    }

    for (_, source) in graph.incoming(node) {
        visit(source, graph, state, order)?;
    }

    state[idx] = VisitState::Visited;
    order.push(node);
    Ok(())
}

/// Positions of `names` within the graph's topological order, upstream first.
///
/// Names unknown to the graph are dropped.
pub fn order_names<'n, I>(graph: &ParameterGraph, names: I) -> Vec<&'n str>
where
    I: IntoIterator<Item = &'n str>,
{
    let mut ranked: Vec<(usize, &'n str)> = names
        .into_iter()
        .filter_map(|name| {
            let pos = graph.topological_rank(graph.node_id(name)?)?;
            Some((pos, name))
        })
        .collect();
    ranked.sort_by_key(|(pos, _)| *pos);
    ranked.into_iter().map(|(_, name)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    #[test]
    fn test_sort_diamond_dependency() {
        // Shape: R -> A, R -> B, A+B -> M -> D
        let g = ParameterGraph::from_parts(
            "R",
            vec![Node::parameter("A"), Node::parameter("B"), Node::merge("M"), Node::parameter("D")],
            vec![
                Edge::data_flow("R", "A"),
                Edge::data_flow("R", "B"),
                Edge::data_flow("A", "M"),
                Edge::data_flow("B", "M"),
                Edge::method("M", "D", "combine"),
            ],
        )
        .expect("graph");

        let res = sort(&g).expect("Sort failed");
        let pos = |name: &str| res.iter().position(|&x| x == g.node_id(name).unwrap()).unwrap();
        assert!(pos("R") < pos("A"));
        assert!(pos("R") < pos("B"));
        assert!(pos("A") < pos("M"));
        assert!(pos("B") < pos("M"));
        assert!(pos("M") < pos("D"));
    }

    #[test]
    fn test_order_names_sorts_upstream_first() {
        let g = crate::graph::definitions::authored_graph();
        let ordered = order_names(&g, ["D11", "elastic_modulus", "unknown", "density"]);
        assert_eq!(ordered, vec!["density", "elastic_modulus", "D11"]);
    }
}
