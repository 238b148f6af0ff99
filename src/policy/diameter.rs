use super::AnalysisPolicy;
use crate::algorithms::AllPairsShortestPaths;
use crate::graph::Graph;
use tracing::debug;

/// Closes when the graph diameter exceeds the threshold.
///
/// Comparator: `diameter > threshold`. Every update runs all-pairs shortest
/// paths over the whole working graph (cubic in the vertex count) and keeps the
/// largest finite distance; disconnected pairs do not count.
#[derive(Debug, Clone)]
pub struct DiameterThreshold {
  threshold: f64,
  current_diameter: f64,
}

impl DiameterThreshold {
  /// Creates a policy with the given threshold.
  pub fn new(threshold: f64) -> Self {
    Self {
      threshold,
      current_diameter: 0.0,
    }
  }

  /// Returns the threshold.
  pub fn threshold(&self) -> f64 {
    self.threshold
  }

  /// Diameter computed by the last update.
  pub fn current_diameter(&self) -> f64 {
    self.current_diameter
  }
}

impl<G: Graph> AnalysisPolicy<G> for DiameterThreshold {
  fn name(&self) -> &str {
    "diameter"
  }

  fn update(&mut self, graph: &G) {
    self.current_diameter = AllPairsShortestPaths::new(graph).max_finite_distance();
    debug!(diameter = self.current_diameter, "graph diameter");
  }

  fn should_close(&self, _graph: &G) -> bool {
    self.current_diameter > self.threshold
  }
}
