use super::AnalysisPolicy;
use crate::algorithms::shortest_distances_from;
use crate::graph::Graph;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Closes when the shortest distance from `start` to `target` exceeds the threshold.
///
/// Comparator: `distance > threshold`. Distances from `start` are recomputed on
/// every update and cached per vertex. A target that is absent from the graph
/// being checked, or unreachable in it, has infinite distance, which exceeds any
/// finite threshold, so the window closes. A cached distance for a vertex that
/// has since been evicted never keeps the window open. When `start` itself is
/// missing from the graph, every current vertex is cached as unreachable.
///
/// The cache survives window closes unless
/// [`with_reset_on_close`](Self::with_reset_on_close) is enabled.
#[derive(Debug, Clone)]
pub struct TargetDistanceThreshold<V> {
  start: V,
  target: V,
  threshold: f64,
  reset_on_close: bool,
  distances: HashMap<V, f64>,
}

impl<V: Eq + Hash> TargetDistanceThreshold<V> {
  /// Creates a policy measuring `start → target` against `threshold`.
  pub fn new(start: V, target: V, threshold: f64) -> Self {
    Self {
      start,
      target,
      threshold,
      reset_on_close: false,
      distances: HashMap::new(),
    }
  }

  /// Clears the distance cache whenever a window closes.
  pub fn with_reset_on_close(mut self, reset: bool) -> Self {
    self.reset_on_close = reset;
    self
  }

  /// Returns the threshold.
  pub fn threshold(&self) -> f64 {
    self.threshold
  }

  /// Cached distance to `vertex`, if any.
  pub fn distance_to(&self, vertex: &V) -> Option<f64> {
    self.distances.get(vertex).copied()
  }

  /// Cached distance to the target, infinite when unknown.
  pub fn target_distance(&self) -> f64 {
    self.distance_to(&self.target).unwrap_or(f64::INFINITY)
  }
}

impl<G, V> AnalysisPolicy<G> for TargetDistanceThreshold<V>
where
  G: Graph<Vertex = V>,
  V: Clone + Debug + Eq + Hash + Ord,
{
  fn name(&self) -> &str {
    "target_distance"
  }

  fn update(&mut self, graph: &G) {
    match shortest_distances_from(graph, &self.start) {
      Some(distances) => self.distances.extend(distances),
      None => {
        for v in graph.vertices() {
          self.distances.insert(v, f64::INFINITY);
        }
      }
    }
    debug!(
      start = ?self.start,
      target = ?self.target,
      distance = self.target_distance(),
      "target distance"
    );
  }

  fn should_close(&self, graph: &G) -> bool {
    let distance = if graph.contains_vertex(&self.target) {
      self.target_distance()
    } else {
      f64::INFINITY
    };
    distance > self.threshold
  }

  fn on_window_closed(&mut self) {
    if self.reset_on_close {
      self.distances.clear();
    }
  }
}
