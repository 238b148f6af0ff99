//! Graph metrics used by the reference analysis policies.
//!
//! All functions treat edges as unweighted (weight 1.0) and run over the
//! `petgraph` view returned by [`Graph::as_ungraph`]. Unreachable pairs have
//! distance [`f64::INFINITY`].

use crate::graph::Graph;
use petgraph::algo::{dijkstra, floyd_warshall};
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Betweenness centrality of every vertex (Brandes' algorithm).
///
/// Scores count, for each vertex, the fraction of shortest paths between other
/// vertex pairs that pass through it. For undirected graphs every pair is seen
/// from both ends, so raw sums are halved. When `normalized` is set, scores are
/// scaled by `2 / ((n - 1)(n - 2))`; graphs with fewer than three vertices are
/// left unscaled.
pub fn betweenness_centrality<G: Graph>(graph: &G, normalized: bool) -> HashMap<G::Vertex, f64> {
  let view = graph.as_ungraph();
  let n = view.node_count();
  let mut scores = vec![0.0f64; n];

  for s in view.node_indices() {
    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist: Vec<Option<usize>> = vec![None; n];
    sigma[s.index()] = 1.0;
    dist[s.index()] = Some(0);

    let mut queue = VecDeque::from([s]);
    while let Some(v) = queue.pop_front() {
      stack.push(v);
      let dv = dist[v.index()].unwrap_or_default();
      for w in view.neighbors(v) {
        if dist[w.index()].is_none() {
          dist[w.index()] = Some(dv + 1);
          queue.push_back(w);
        }
        if dist[w.index()] == Some(dv + 1) {
          sigma[w.index()] += sigma[v.index()];
          predecessors[w.index()].push(v);
        }
      }
    }

    let mut delta = vec![0.0f64; n];
    while let Some(w) = stack.pop() {
      let w = w.index();
      for v in &predecessors[w] {
        let v = v.index();
        delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
      }
      if w != s.index() {
        scores[w] += delta[w];
      }
    }
  }

  let mut scale = 0.5;
  if normalized && n > 2 {
    scale *= 2.0 / ((n - 1) as f64 * (n - 2) as f64);
  }

  view
    .node_indices()
    .map(|node| (view[node].clone(), scores[node.index()] * scale))
    .collect()
}

/// Shortest path weights between every pair of vertices (Floyd–Warshall).
///
/// Runs in `O(n^3)` time and `O(n^2)` space.
#[derive(Debug, Clone)]
pub struct AllPairsShortestPaths<V> {
  index: HashMap<V, NodeIndex>,
  dist: HashMap<(NodeIndex, NodeIndex), f64>,
}

impl<V> AllPairsShortestPaths<V>
where
  V: Clone + Eq + Hash,
{
  /// Computes all-pairs distances for `graph`.
  pub fn new<G: Graph<Vertex = V>>(graph: &G) -> Self {
    let view = graph.as_ungraph();
    let index = view
      .node_indices()
      .map(|node| (view[node].clone(), node))
      .collect();
    // Unit weights never form a negative cycle.
    let dist = floyd_warshall(&*view, |_| 1.0f64).unwrap_or_default();
    Self { index, dist }
  }

  /// Distance from `source` to `target`, infinite if unreachable or unknown.
  pub fn path_weight(&self, source: &V, target: &V) -> f64 {
    match (self.index.get(source), self.index.get(target)) {
      (Some(&i), Some(&j)) => self
        .dist
        .get(&(i, j))
        .copied()
        .filter(|d| reachable(*d))
        .unwrap_or(f64::INFINITY),
      _ => f64::INFINITY,
    }
  }

  /// Largest finite distance between any two vertices; 0.0 for an empty or
  /// edgeless graph.
  pub fn max_finite_distance(&self) -> f64 {
    self
      .dist
      .values()
      .copied()
      .filter(|d| reachable(*d))
      .fold(0.0, f64::max)
  }
}

// floyd_warshall marks unreachable pairs with the measure's maximum.
fn reachable(distance: f64) -> bool {
  distance.is_finite() && distance < f64::MAX
}

/// Distances from `source` to every vertex, or `None` if `source` is absent.
///
/// Unreachable vertices map to [`f64::INFINITY`].
pub fn shortest_distances_from<G: Graph>(
  graph: &G,
  source: &G::Vertex,
) -> Option<HashMap<G::Vertex, f64>> {
  let view = graph.as_ungraph();
  let start = view.node_indices().find(|&node| view[node] == *source)?;
  let reached = dijkstra(&*view, start, None, |_| 1.0f64);
  Some(
    view
      .node_indices()
      .map(|node| {
        let distance = reached.get(&node).copied().unwrap_or(f64::INFINITY);
        (view[node].clone(), distance)
      })
      .collect(),
  )
}
