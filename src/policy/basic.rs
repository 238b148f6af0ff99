use super::AnalysisPolicy;
use crate::graph::Graph;

/// Policy that never closes; windows only slide through horizon eviction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverClose;

impl NeverClose {
  /// Creates a new never-closing policy.
  pub fn new() -> Self {
    Self
  }
}

impl<G: Graph> AnalysisPolicy<G> for NeverClose {
  fn name(&self) -> &str {
    "never"
  }

  fn update(&mut self, _graph: &G) {}

  fn should_close(&self, _graph: &G) -> bool {
    false
  }
}

/// Closes once the working graph holds at least `limit` vertices.
#[derive(Debug, Clone)]
pub struct VertexCountThreshold {
  limit: usize,
  current: usize,
}

impl VertexCountThreshold {
  /// Creates a policy closing at `limit` vertices.
  pub fn new(limit: usize) -> Self {
    Self { limit, current: 0 }
  }

  /// Returns the configured limit.
  pub fn limit(&self) -> usize {
    self.limit
  }

  /// Vertex count seen by the last update.
  pub fn current(&self) -> usize {
    self.current
  }
}

impl<G: Graph> AnalysisPolicy<G> for VertexCountThreshold {
  fn name(&self) -> &str {
    "vertex_count"
  }

  fn update(&mut self, graph: &G) {
    self.current = graph.vertex_count();
  }

  fn should_close(&self, _graph: &G) -> bool {
    self.current >= self.limit
  }
}
