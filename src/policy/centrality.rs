use super::AnalysisPolicy;
use crate::algorithms::betweenness_centrality;
use crate::graph::Graph;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Closes when any vertex's betweenness centrality meets or exceeds the threshold.
///
/// Comparator: `score >= threshold`. Scores are raw path counts unless
/// [`with_normalization`](Self::with_normalization) is enabled. The close check
/// reads the scores cached by the last [`update`](AnalysisPolicy::update), which
/// the engine always runs first; before any update nothing closes.
#[derive(Debug, Clone)]
pub struct CentralityThreshold<V> {
  threshold: f64,
  normalized: bool,
  scores: HashMap<V, f64>,
}

impl<V> CentralityThreshold<V> {
  /// Creates a policy with the given threshold.
  pub fn new(threshold: f64) -> Self {
    Self {
      threshold,
      normalized: false,
      scores: HashMap::new(),
    }
  }

  /// Scales scores into `[0, 1]` before comparing.
  pub fn with_normalization(mut self, normalized: bool) -> Self {
    self.normalized = normalized;
    self
  }

  /// Returns the threshold.
  pub fn threshold(&self) -> f64 {
    self.threshold
  }

  /// Scores computed by the last update.
  pub fn scores(&self) -> &HashMap<V, f64> {
    &self.scores
  }
}

impl<G, V> AnalysisPolicy<G> for CentralityThreshold<V>
where
  G: Graph<Vertex = V>,
  V: Clone + Debug + Eq + Hash + Ord,
{
  fn name(&self) -> &str {
    "centrality"
  }

  fn update(&mut self, graph: &G) {
    self.scores = betweenness_centrality(graph, self.normalized);
    for (vertex, score) in &self.scores {
      debug!(vertex = ?vertex, score, "betweenness centrality");
    }
  }

  fn should_close(&self, _graph: &G) -> bool {
    self.scores.values().any(|score| *score >= self.threshold)
  }
}
