//! Name-keyed directed graph with cycle enumeration.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{DfsEvent, depth_first_search};

/// A directed graph whose vertices are identified by name.
///
/// Vertices are interned on first use, so edges may reference names that
/// were never added explicitly.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameGraph {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl NameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `name`, adding a vertex when it is new.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(index) = self.indices.get(name) {
            return *index;
        }
        let index = self.graph.add_node(name.to_owned());
        self.indices.insert(name.to_owned(), index);
        index
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.graph.update_edge(from, to, ());
    }

    /// Returns one closed path per back edge found by a depth-first traversal.
    ///
    /// Each path starts and ends with the same name, e.g. `[A, B, A]`. An
    /// acyclic graph yields no paths, including graphs where several paths
    /// converge on one vertex.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut stack: Vec<NodeIndex> = Vec::new();
        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        let mut cycles = Vec::new();

        depth_first_search(&self.graph, self.graph.node_indices(), |event| match event {
            DfsEvent::Discover(node, _) => stack.push(node),
            DfsEvent::Finish(_, _) => {
                stack.pop();
            }
            DfsEvent::BackEdge(from, to) => {
                if !seen.insert((from, to)) {
                    return;
                }
                if let Some(start) = stack.iter().position(|&node| node == to) {
                    let mut path: Vec<String> = stack[start..]
                        .iter()
                        .map(|&node| self.graph[node].clone())
                        .collect();
                    path.push(self.graph[to].clone());
                    cycles.push(path);
                }
            }
            _ => {}
        });

        cycles
    }
}
