//! Undirected road graph with quantized node identity

use geo::{Coord, Point};
use hashbrown::HashMap;
use petgraph::Undirected;
use petgraph::graph::{EdgeIndex, Edges, NodeIndex, UnGraph};

use super::components::{NodeKey, RoadEdge, RoadNode};

/// Road network graph.
///
/// Nodes live in a `petgraph` arena and are found by their [`NodeKey`],
/// so two coordinates that agree to `precision` decimals are one node.
/// At most one edge connects any pair of nodes.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    pub(crate) graph: UnGraph<RoadNode, RoadEdge>,
    node_lookup: HashMap<NodeKey, NodeIndex>,
    precision: u32,
}

impl RoadGraph {
    pub fn new(precision: u32) -> Self {
        Self {
            graph: UnGraph::default(),
            node_lookup: HashMap::new(),
            precision,
        }
    }

    pub fn with_capacity(precision: u32, nodes: usize, edges: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(nodes, edges),
            node_lookup: HashMap::with_capacity(nodes),
            precision,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Graph without a single node
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn key_for(&self, coord: Coord<f64>) -> NodeKey {
        NodeKey::from_coord(coord, self.precision)
    }

    /// Node with the same key as `coord`, if any
    pub fn node_at(&self, coord: Coord<f64>) -> Option<NodeIndex> {
        self.node_lookup.get(&self.key_for(coord)).copied()
    }

    /// Returns the node for `coord`, creating it on first reference
    pub fn get_or_insert_node(&mut self, coord: Coord<f64>) -> NodeIndex {
        let key = self.key_for(coord);
        *self.node_lookup.entry(key).or_insert_with(|| {
            self.graph.add_node(RoadNode {
                key,
                geometry: Point::from(coord),
            })
        })
    }

    /// Node position as a `(lon, lat)` coordinate
    pub fn node_coord(&self, index: NodeIndex) -> Option<Coord<f64>> {
        self.graph.node_weight(index).map(|node| node.geometry.into())
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&RoadEdge> {
        self.graph.edge_weight(index)
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        self.graph.edge_indices()
    }

    pub fn edge_weights(&self) -> impl Iterator<Item = &RoadEdge> {
        self.graph.edge_weights()
    }

    pub fn edge_weights_mut(&mut self) -> impl Iterator<Item = &mut RoadEdge> {
        self.graph.edge_weights_mut()
    }

    /// Edge between two nodes regardless of direction
    pub fn find_edge(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    /// Edges incident to `node`
    pub fn edges(&self, node: NodeIndex) -> Edges<'_, RoadEdge, Undirected> {
        self.graph.edges(node)
    }

    /// Inserts a new edge or replaces the weight of the existing one.
    /// Returns the edge index and whether an edge was already present.
    pub(crate) fn upsert_edge(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        edge: RoadEdge,
    ) -> (EdgeIndex, bool) {
        match self.graph.find_edge(a, b) {
            Some(existing) => {
                self.graph[existing] = edge;
                (existing, true)
            }
            None => (self.graph.add_edge(a, b, edge), false),
        }
    }

    /// Force the blocked state of a single edge
    pub fn set_blocked(&mut self, index: EdgeIndex, blocked: bool) -> bool {
        match self.graph.edge_weight_mut(index) {
            Some(edge) => {
                edge.blocked = blocked;
                true
            }
            None => false,
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.graph.edge_weights().filter(|edge| edge.blocked).count()
    }
}

impl Default for RoadGraph {
    fn default() -> Self {
        Self::new(crate::DEFAULT_COORDINATE_PRECISION)
    }
}
