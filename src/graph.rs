//! # Graph Values
//!
//! The engine treats graphs as opaque mutable values with set semantics over
//! vertices and edges. [`Graph`] is the minimal capability the windowing engine,
//! the coalescer and the analysis policies rely on, so any graph library can sit
//! behind it.
//!
//! [`SimpleGraph`] is the bundled implementation: undirected, no self loops and
//! no parallel edges. Storage is a `petgraph` [`UnGraph`] with a `BTreeMap` label
//! index beside it, so iteration order is deterministic and snapshots and logs
//! stay stable across runs.
//!
//! ## Example
//!
//! ```rust
//! use graphweave::graph::{Graph, SimpleGraph};
//!
//! let mut g = SimpleGraph::new();
//! g.add_vertex("A");
//! g.add_vertex("B");
//! assert!(g.add_edge("A", "B"));
//! assert!(g.contains_edge(&"B", &"A"));
//! ```

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// Minimal mutable graph capability.
///
/// Edges are identified by their endpoint pair. Implementations decide whether
/// `(u, v)` and `(v, u)` denote the same edge; [`SimpleGraph`] is undirected and
/// reports each edge once with its endpoints in ascending order.
pub trait Graph: Default {
  /// Vertex identifier.
  type Vertex: Clone + Debug + Eq + Hash + Ord;

  /// Returns the vertex set.
  fn vertices(&self) -> BTreeSet<Self::Vertex>;

  /// Returns the edge set as endpoint pairs.
  fn edges(&self) -> BTreeSet<(Self::Vertex, Self::Vertex)>;

  /// Adds a vertex. Returns false if it was already present.
  fn add_vertex(&mut self, v: Self::Vertex) -> bool;

  /// Adds an edge between two existing vertices.
  ///
  /// Returns false, leaving the graph unchanged, if either endpoint is missing or
  /// the edge cannot be inserted (duplicate, or a self loop in a simple graph).
  fn add_edge(&mut self, u: Self::Vertex, v: Self::Vertex) -> bool;

  /// Returns true if the vertex is present.
  fn contains_vertex(&self, v: &Self::Vertex) -> bool;

  /// Returns true if an edge joins `u` and `v`.
  fn contains_edge(&self, u: &Self::Vertex, v: &Self::Vertex) -> bool;

  /// Returns the vertices adjacent to `v`.
  fn neighbors(&self, v: &Self::Vertex) -> Vec<Self::Vertex> {
    self
      .edges()
      .into_iter()
      .filter_map(|(a, b)| {
        if &a == v {
          Some(b)
        } else if &b == v {
          Some(a)
        } else {
          None
        }
      })
      .collect()
  }

  /// Number of vertices.
  fn vertex_count(&self) -> usize {
    self.vertices().len()
  }

  /// Number of edges.
  fn edge_count(&self) -> usize {
    self.edges().len()
  }

  /// Returns true if the graph has no vertices.
  fn is_empty(&self) -> bool {
    self.vertex_count() == 0
  }

  /// Adds every vertex of `other`, then every edge of `other` onto the merged
  /// vertices. Content already present collapses.
  fn merge_from(&mut self, other: &Self) {
    for v in other.vertices() {
      self.add_vertex(v);
    }
    for (u, v) in other.edges() {
      self.add_edge(u, v);
    }
  }

  /// Undirected `petgraph` view of this graph, used by [`crate::algorithms`].
  ///
  /// The default copies vertices and edges into a fresh [`UnGraph`];
  /// implementations already stored that way lend their own.
  fn as_ungraph(&self) -> Cow<'_, UnGraph<Self::Vertex, ()>> {
    let mut graph = UnGraph::<Self::Vertex, ()>::default();
    let mut index = HashMap::new();
    for v in self.vertices() {
      let node = graph.add_node(v.clone());
      index.insert(v, node);
    }
    for (u, v) in self.edges() {
      if let (Some(&a), Some(&b)) = (index.get(&u), index.get(&v)) {
        graph.update_edge(a, b, ());
      }
    }
    Cow::Owned(graph)
  }
}

/// Undirected simple graph with deterministic iteration order.
#[derive(Clone, Serialize, Deserialize)]
#[serde(
  from = "GraphData<V>",
  into = "GraphData<V>",
  bound(
    serialize = "V: Clone + Ord + Serialize",
    deserialize = "V: Clone + Ord + Deserialize<'de>"
  )
)]
pub struct SimpleGraph<V> {
  graph: UnGraph<V, ()>,
  index: BTreeMap<V, NodeIndex>,
}

impl<V> Default for SimpleGraph<V> {
  fn default() -> Self {
    Self {
      graph: UnGraph::default(),
      index: BTreeMap::new(),
    }
  }
}

impl<V: Clone + Ord> SimpleGraph<V> {
  fn insert_vertex(&mut self, v: V) -> Option<NodeIndex> {
    if self.index.contains_key(&v) {
      return None;
    }
    let node = self.graph.add_node(v.clone());
    self.index.insert(v, node);
    Some(node)
  }

  fn insert_edge(&mut self, u: &V, v: &V) -> bool {
    if u == v {
      return false;
    }
    match (self.index.get(u), self.index.get(v)) {
      (Some(&a), Some(&b)) if !self.graph.contains_edge(a, b) => {
        self.graph.add_edge(a, b, ());
        true
      }
      _ => false,
    }
  }

  fn sorted_edges(&self) -> impl Iterator<Item = (V, V)> + '_ {
    self.graph.edge_references().map(|edge| {
      let a = &self.graph[edge.source()];
      let b = &self.graph[edge.target()];
      if a < b {
        (a.clone(), b.clone())
      } else {
        (b.clone(), a.clone())
      }
    })
  }
}

impl<V> SimpleGraph<V>
where
  V: Clone + Debug + Eq + Hash + Ord,
{
  /// Creates an empty graph.
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a graph from a vertex list and an edge list.
  ///
  /// Edge endpoints are added as vertices when missing, so an edge list alone is
  /// enough to describe a connected fragment.
  pub fn from_parts<I, E>(vertices: I, edges: E) -> Self
  where
    I: IntoIterator<Item = V>,
    E: IntoIterator<Item = (V, V)>,
  {
    let mut graph = Self::new();
    for v in vertices {
      graph.add_vertex(v);
    }
    for (u, v) in edges {
      graph.add_vertex(u.clone());
      graph.add_vertex(v.clone());
      graph.add_edge(u, v);
    }
    graph
  }

  /// Iterates over vertices in ascending order without allocating.
  pub fn iter_vertices(&self) -> impl Iterator<Item = &V> {
    self.index.keys()
  }
}

impl<V> Graph for SimpleGraph<V>
where
  V: Clone + Debug + Eq + Hash + Ord,
{
  type Vertex = V;

  fn vertices(&self) -> BTreeSet<V> {
    self.index.keys().cloned().collect()
  }

  fn edges(&self) -> BTreeSet<(V, V)> {
    self.sorted_edges().collect()
  }

  fn add_vertex(&mut self, v: V) -> bool {
    self.insert_vertex(v).is_some()
  }

  fn add_edge(&mut self, u: V, v: V) -> bool {
    self.insert_edge(&u, &v)
  }

  fn contains_vertex(&self, v: &V) -> bool {
    self.index.contains_key(v)
  }

  fn contains_edge(&self, u: &V, v: &V) -> bool {
    match (self.index.get(u), self.index.get(v)) {
      (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
      _ => false,
    }
  }

  fn neighbors(&self, v: &V) -> Vec<V> {
    let Some(&node) = self.index.get(v) else {
      return Vec::new();
    };
    let mut adjacent: Vec<V> = self
      .graph
      .neighbors(node)
      .map(|n| self.graph[n].clone())
      .collect();
    adjacent.sort();
    adjacent
  }

  fn vertex_count(&self) -> usize {
    self.graph.node_count()
  }

  fn edge_count(&self) -> usize {
    self.graph.edge_count()
  }

  fn as_ungraph(&self) -> Cow<'_, UnGraph<V, ()>> {
    Cow::Borrowed(&self.graph)
  }
}

// Equality is over the vertex and edge sets; node indices depend on insertion order.
impl<V: Clone + Ord> PartialEq for SimpleGraph<V> {
  fn eq(&self, other: &Self) -> bool {
    self.graph.edge_count() == other.graph.edge_count()
      && self.index.keys().eq(other.index.keys())
      && self
        .sorted_edges()
        .collect::<BTreeSet<_>>()
        .eq(&other.sorted_edges().collect::<BTreeSet<_>>())
  }
}

impl<V: Clone + Ord> Eq for SimpleGraph<V> {}

impl<V: Debug> Debug for SimpleGraph<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SimpleGraph")
      .field("vertices", &self.index.keys().collect::<Vec<_>>())
      .field("edge_count", &self.graph.edge_count())
      .finish()
  }
}

impl<V> Display for SimpleGraph<V>
where
  V: Clone + Debug + Display + Eq + Hash + Ord,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let vertices: Vec<String> = self.index.keys().map(ToString::to_string).collect();
    let edges: Vec<String> = self
      .edges()
      .iter()
      .map(|(u, v)| format!("{{{},{}}}", u, v))
      .collect();
    write!(f, "([{}], [{}])", vertices.join(", "), edges.join(", "))
  }
}

/// Serialized form of a [`SimpleGraph`]: `{"vertices": [...], "edges": [[u, v], ...]}`.
#[derive(Serialize, Deserialize)]
struct GraphData<V> {
  #[serde(default = "Vec::new")]
  vertices: Vec<V>,
  #[serde(default = "Vec::new")]
  edges: Vec<(V, V)>,
}

impl<V: Clone + Ord> From<GraphData<V>> for SimpleGraph<V> {
  fn from(data: GraphData<V>) -> Self {
    let mut graph = Self::default();
    for v in data.vertices {
      graph.insert_vertex(v);
    }
    for (u, v) in data.edges {
      if u == v {
        continue;
      }
      graph.insert_vertex(u.clone());
      graph.insert_vertex(v.clone());
      graph.insert_edge(&u, &v);
    }
    graph
  }
}

impl<V: Clone + Ord> From<SimpleGraph<V>> for GraphData<V> {
  fn from(graph: SimpleGraph<V>) -> Self {
    let edges: BTreeSet<(V, V)> = graph.sorted_edges().collect();
    Self {
      vertices: graph.index.into_keys().collect(),
      edges: edges.into_iter().collect(),
    }
  }
}
