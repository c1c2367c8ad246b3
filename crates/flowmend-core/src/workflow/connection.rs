//! Name-keyed connection map between workflow nodes.

use std::collections::BTreeMap;

use derive_more::{Deref, DerefMut, From, Into};
use serde::{Deserialize, Serialize};

/// Primary data channel.
pub const MAIN: &str = "main";

/// Error output channel.
pub const ERROR: &str = "error";

/// Auxiliary channel attaching tool nodes to an agent node.
pub const AI_TOOL: &str = "ai_tool";

/// A directed reference to a target node's input slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Target node name.
    pub node: String,
    /// Target input channel.
    #[serde(rename = "type")]
    pub channel: String,
    /// Target input index.
    #[serde(default)]
    pub index: u32,
}

impl Connection {
    /// Creates a connection into the target's primary input.
    pub fn main(node: impl Into<String>) -> Self {
        Self::new(node, MAIN, 0)
    }

    /// Creates a connection into the given input channel and index.
    pub fn new(node: impl Into<String>, channel: impl Into<String>, index: u32) -> Self {
        Self {
            node: node.into(),
            channel: channel.into(),
            index,
        }
    }
}

/// Output slots of one channel: index-aligned, possibly sparse.
pub type OutputSlots = Vec<Option<Vec<Connection>>>;

/// Outgoing channels of one source node.
pub type NodeConnections = BTreeMap<String, OutputSlots>;

/// A single edge of the connection map, borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    /// Source node name.
    pub source: &'a str,
    /// Source output channel.
    pub channel: &'a str,
    /// Source output slot.
    pub output_index: usize,
    /// Target of the edge.
    pub connection: &'a Connection,
}

/// Connection map: `sourceName → channelName → output slots → edges`.
///
/// Every source key and edge target is a node *name*, never an id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[derive(Deref, DerefMut, From, Into)]
#[serde(transparent)]
pub struct Connections(BTreeMap<String, NodeConnections>);

impl Connections {
    /// Creates an empty connection map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an edge, growing the slot list with empty placeholders as needed.
    pub fn connect(
        &mut self,
        source: impl Into<String>,
        channel: impl Into<String>,
        output_index: usize,
        connection: Connection,
    ) {
        let slots = self
            .0
            .entry(source.into())
            .or_default()
            .entry(channel.into())
            .or_default();
        while slots.len() <= output_index {
            slots.push(Some(Vec::new()));
        }
        slots[output_index]
            .get_or_insert_with(Vec::new)
            .push(connection);
    }

    /// Returns an iterator over every edge in the map.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.0.iter().flat_map(|(source, channels)| {
            channels.iter().flat_map(move |(channel, slots)| {
                slots
                    .iter()
                    .enumerate()
                    .flat_map(|(output_index, slot)| {
                        slot.iter().flatten().map(move |connection| (output_index, connection))
                    })
                    .map(move |(output_index, connection)| EdgeRef {
                        source,
                        channel,
                        output_index,
                        connection,
                    })
            })
        })
    }

    /// Returns the number of edges in the map.
    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Returns whether any edge uses the given source channel.
    pub fn has_channel_edges(&self, channel: &str) -> bool {
        self.edges().any(|edge| edge.channel == channel)
    }

    /// Returns whether the node appears as an edge target.
    pub fn has_incoming(&self, target: &str) -> bool {
        self.edges().any(|edge| edge.connection.node == target)
    }

    /// Returns the distinct names of nodes with an edge into `target`.
    pub fn sources_of(&self, target: &str) -> Vec<&str> {
        let mut sources: Vec<&str> = self
            .edges()
            .filter(|edge| edge.connection.node == target)
            .map(|edge| edge.source)
            .collect();
        sources.dedup();
        sources
    }

    /// Returns the distinct names of nodes `source` has an edge into.
    pub fn targets_of(&self, source: &str) -> Vec<&str> {
        let mut targets: Vec<&str> = Vec::new();
        for edge in self.edges().filter(|edge| edge.source == source) {
            if !targets.contains(&edge.connection.node.as_str()) {
                targets.push(&edge.connection.node);
            }
        }
        targets
    }

    /// Returns whether an identical edge already exists.
    pub fn contains_edge(
        &self,
        source: &str,
        channel: &str,
        output_index: usize,
        connection: &Connection,
    ) -> bool {
        self.0
            .get(source)
            .and_then(|channels| channels.get(channel))
            .and_then(|slots| slots.get(output_index))
            .and_then(Option::as_ref)
            .is_some_and(|edges| edges.contains(connection))
    }

    /// Removes edges from `source` on `channel` pointing at `target`.
    ///
    /// When `output_index` is given only that slot is considered. Returns the
    /// number of removed edges; empty containers are pruned afterwards.
    pub fn disconnect(
        &mut self,
        source: &str,
        channel: &str,
        output_index: Option<usize>,
        target: &str,
    ) -> usize {
        let mut removed = 0;
        if let Some(slots) = self
            .0
            .get_mut(source)
            .and_then(|channels| channels.get_mut(channel))
        {
            for (index, slot) in slots.iter_mut().enumerate() {
                if output_index.is_some_and(|wanted| wanted != index) {
                    continue;
                }
                if let Some(edges) = slot {
                    let before = edges.len();
                    edges.retain(|connection| connection.node != target);
                    removed += before - edges.len();
                }
            }
        }
        self.prune_empty();
        removed
    }

    /// Removes every edge targeting `node` and every entry keyed by it.
    pub fn remove_node(&mut self, node: &str) {
        self.0.remove(node);
        for channels in self.0.values_mut() {
            for slots in channels.values_mut() {
                for edges in slots.iter_mut().flatten() {
                    edges.retain(|connection| connection.node != node);
                }
            }
        }
        self.prune_empty();
    }

    /// Rewrites every reference to `old` so that it points at `new`.
    pub fn rename_node(&mut self, old: &str, new: &str) {
        if let Some(channels) = self.0.remove(old) {
            self.0.insert(new.to_owned(), channels);
        }
        for channels in self.0.values_mut() {
            for slots in channels.values_mut() {
                for connection in slots.iter_mut().flatten().flatten() {
                    if connection.node == old {
                        connection.node = new.to_owned();
                    }
                }
            }
        }
    }

    /// Trims trailing empty slots and deletes empty channels and sources.
    ///
    /// Interior empty slots are kept so output indices stay stable.
    pub fn prune_empty(&mut self) {
        for channels in self.0.values_mut() {
            for slots in channels.values_mut() {
                while slots
                    .last()
                    .is_some_and(|slot| slot.as_ref().is_none_or(Vec::is_empty))
                {
                    slots.pop();
                }
            }
            channels.retain(|_, slots| !slots.is_empty());
        }
        self.0.retain(|_, channels| !channels.is_empty());
    }
}

impl FromIterator<(String, NodeConnections)> for Connections {
    fn from_iter<T: IntoIterator<Item = (String, NodeConnections)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
