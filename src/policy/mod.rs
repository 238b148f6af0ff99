//! # Analysis Policies
//!
//! An analysis policy inspects the working graph after every ingestion and
//! decides whether the current window is complete.
//!
//! ## Contract
//!
//! - [`AnalysisPolicy::update`] runs once per admitted element, after the working
//!   graph has absorbed the fragment and before the close check. It must tolerate
//!   being called repeatedly with a growing graph.
//! - [`AnalysisPolicy::should_close`] is a decision with no side effects outside
//!   the policy's own state.
//! - The engine never resets policy state. A policy that wants a fresh start per
//!   window does so in [`AnalysisPolicy::on_window_closed`].
//! - A policy that cannot compute its metric answers "do not close" rather than
//!   failing, unless it documents otherwise.
//!
//! ## Reference Policies
//!
//! | Policy | Metric | Closes when |
//! |--------|--------|-------------|
//! | [`CentralityThreshold`] | betweenness centrality | any score `>=` threshold |
//! | [`DiameterThreshold`] | max finite shortest path | diameter `>` threshold |
//! | [`TargetDistanceThreshold`] | distance start → target | distance `>` threshold |
//! | [`VertexCountThreshold`] | vertex count | count `>=` limit |
//! | [`NeverClose`] | none | never |

mod basic;
mod centrality;
mod diameter;
mod distance;

pub use basic::{NeverClose, VertexCountThreshold};
pub use centrality::CentralityThreshold;
pub use diameter::DiameterThreshold;
pub use distance::TargetDistanceThreshold;

use crate::graph::Graph;

/// Pluggable close decision over the working graph.
pub trait AnalysisPolicy<G: Graph> {
  /// Short name used in logs.
  fn name(&self) -> &str {
    "custom"
  }

  /// Recomputes or incrementally updates internal state from the working graph.
  fn update(&mut self, graph: &G);

  /// Returns true if the current window should close now.
  fn should_close(&self, graph: &G) -> bool;

  /// Called after a closed window was acknowledged and the engine reset.
  fn on_window_closed(&mut self) {}
}

/// Type-erased policy, as produced by [`PolicyConfig::build`](crate::config::PolicyConfig::build).
pub type BoxedPolicy<G> = Box<dyn AnalysisPolicy<G> + Send>;

impl<G, P> AnalysisPolicy<G> for Box<P>
where
  G: Graph,
  P: AnalysisPolicy<G> + ?Sized,
{
  fn name(&self) -> &str {
    (**self).name()
  }

  fn update(&mut self, graph: &G) {
    (**self).update(graph)
  }

  fn should_close(&self, graph: &G) -> bool {
    (**self).should_close(graph)
  }

  fn on_window_closed(&mut self) {
    (**self).on_window_closed()
  }
}
