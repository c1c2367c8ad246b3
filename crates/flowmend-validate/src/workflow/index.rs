//! Name and adjacency indices over a workflow.

use std::collections::{HashMap, HashSet, VecDeque};

use flowmend_core::workflow::{MAIN, Node, Workflow};

/// Lookups shared by the validation phases.
///
/// Adjacency only covers edges whose endpoints are both existing node names.
pub(crate) struct WorkflowIndex<'a> {
    by_name: HashMap<&'a str, &'a Node>,
    by_id: HashMap<&'a str, &'a Node>,
    incoming: HashMap<&'a str, Vec<&'a str>>,
    main_outgoing: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> WorkflowIndex<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        let by_name: HashMap<&str, &Node> = workflow
            .nodes
            .iter()
            .map(|node| (node.name.as_str(), node))
            .collect();
        let by_id = workflow
            .nodes
            .iter()
            .filter(|node| !node.id.is_empty())
            .map(|node| (node.id.as_str(), node))
            .collect();

        let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut main_outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in workflow.connections.edges() {
            let target = edge.connection.node.as_str();
            if !by_name.contains_key(edge.source) || !by_name.contains_key(target) {
                continue;
            }
            incoming.entry(target).or_default().push(edge.source);
            if edge.channel == MAIN {
                main_outgoing.entry(edge.source).or_default().push(target);
            }
        }

        Self {
            by_name,
            by_id,
            incoming,
            main_outgoing,
        }
    }

    pub fn node(&self, name: &str) -> Option<&'a Node> {
        self.by_name.get(name).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&'a Node> {
        self.by_id.get(id).copied()
    }

    pub fn has_incoming(&self, name: &str) -> bool {
        self.incoming.get(name).is_some_and(|sources| !sources.is_empty())
    }

    /// Returns every node with a path into `name`, through any channel.
    pub fn upstream_of(&self, name: &str) -> HashSet<&'a str> {
        let mut upstream = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([name]);
        while let Some(current) = queue.pop_front() {
            for &source in self.incoming.get(current).into_iter().flatten() {
                if upstream.insert(source) {
                    queue.push_back(source);
                }
            }
        }
        upstream
    }

    /// Returns the number of hops on the longest `main` path.
    ///
    /// Vertices on the active path count as dead ends, so cycles terminate.
    pub fn longest_main_chain(&self) -> usize {
        let mut memo: HashMap<&str, usize> = HashMap::new();
        let mut active: HashSet<&str> = HashSet::new();
        self.by_name
            .keys()
            .map(|name| self.chain_from(*name, &mut memo, &mut active))
            .max()
            .unwrap_or(0)
    }

    fn chain_from(
        &self,
        name: &'a str,
        memo: &mut HashMap<&'a str, usize>,
        active: &mut HashSet<&'a str>,
    ) -> usize {
        if let Some(&length) = memo.get(name) {
            return length;
        }
        if !active.insert(name) {
            return 0;
        }
        let mut longest = 0;
        for &next in self.main_outgoing.get(name).into_iter().flatten() {
            longest = longest.max(1 + self.chain_from(next, memo, active));
        }
        active.remove(name);
        memo.insert(name, longest);
        longest
    }
}

#[cfg(test)]
mod tests {
    use flowmend_core::workflow::{Connection, ERROR};

    use super::*;

    fn chain(length: usize) -> Workflow {
        let mut workflow = Workflow::new("chain");
        for i in 0..=length {
            workflow = workflow.with_node(Node::new(i.to_string(), format!("N{i}"), "n8n-nodes-base.set"));
            if i > 0 {
                workflow = workflow.with_connection(
                    format!("N{}", i - 1),
                    MAIN,
                    0,
                    Connection::main(format!("N{i}")),
                );
            }
        }
        workflow
    }

    #[test]
    fn test_longest_main_chain() {
        let workflow = chain(4);
        assert_eq!(WorkflowIndex::new(&workflow).longest_main_chain(), 4);
    }

    #[test]
    fn test_chain_is_cycle_safe() {
        let workflow = chain(2).with_connection("N2", MAIN, 0, Connection::main("N0"));
        let index = WorkflowIndex::new(&workflow);
        assert!(index.longest_main_chain() <= 3);
    }

    #[test]
    fn test_upstream_through_any_channel() {
        let workflow = chain(2)
            .with_node(Node::new("x", "Handler", "n8n-nodes-base.set"))
            .with_connection("Handler", ERROR, 0, Connection::main("N0"))
            .with_connection("N2", MAIN, 0, Connection::main("Ghost"));
        let index = WorkflowIndex::new(&workflow);

        let upstream = index.upstream_of("N2");
        assert_eq!(upstream.len(), 3);
        assert!(upstream.contains("Handler"));
        assert!(!index.has_incoming("Ghost"));
        assert!(index.node_by_id("x").is_some());
    }
}
