//! # Window Content and Coalescing
//!
//! [`GraphContent`] accumulates the graph fragments that make up a window and
//! [`GraphContent::coalesce`] merges them into one deduplicated graph, producing
//! an immutable [`ContentSnapshot`].
//!
//! ## Merge rule
//!
//! - A single fragment is returned as-is (moved, never copied).
//! - Otherwise the merged graph receives the union of all vertex sets first and
//!   then the union of all edge sets, so every edge finds both endpoints already
//!   present. Duplicates collapse under set semantics.
//!
//! The merged membership depends only on the fragments, not on the order in
//! which they were added.

use crate::graph::Graph;
use crate::time::Timestamp;

/// Accumulating multiset of graph fragments for one window.
#[derive(Debug, Clone)]
pub struct GraphContent<G> {
  elements: Vec<G>,
  last_changed: Timestamp,
}

impl<G> Default for GraphContent<G> {
  fn default() -> Self {
    Self {
      elements: Vec::new(),
      last_changed: 0,
    }
  }
}

impl<G: Graph> GraphContent<G> {
  /// Creates empty content.
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds one fragment, recording `time` as the most recent change.
  pub fn add(&mut self, fragment: G, time: Timestamp) {
    self.elements.push(fragment);
    self.last_changed = time;
  }

  /// Number of fragments added so far.
  pub fn size(&self) -> usize {
    self.elements.len()
  }

  /// Returns true if nothing was added.
  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  /// Time of the most recent addition.
  pub fn last_changed(&self) -> Timestamp {
    self.last_changed
  }

  /// Merges all fragments into a snapshot.
  pub fn coalesce(mut self) -> ContentSnapshot<G> {
    let size = self.elements.len();
    let graph = if size == 1 {
      self.elements.pop().unwrap_or_default()
    } else {
      let mut combined = G::default();
      for fragment in &self.elements {
        for v in fragment.vertices() {
          combined.add_vertex(v);
        }
      }
      for fragment in &self.elements {
        for (u, v) in fragment.edges() {
          combined.add_edge(u, v);
        }
      }
      combined
    };

    ContentSnapshot {
      size,
      graph,
      last_changed: self.last_changed,
    }
  }
}

impl<G: Graph> FromIterator<(G, Timestamp)> for GraphContent<G> {
  fn from_iter<I: IntoIterator<Item = (G, Timestamp)>>(iter: I) -> Self {
    let mut content = Self::new();
    for (fragment, time) in iter {
      content.add(fragment, time);
    }
    content
  }
}

/// Immutable result of coalescing a window's fragments.
#[derive(Debug, Clone)]
pub struct ContentSnapshot<G> {
  size: usize,
  graph: G,
  last_changed: Timestamp,
}

impl<G: Graph> ContentSnapshot<G> {
  /// Wraps an already merged graph as a single-fragment snapshot.
  pub fn of(graph: G, last_changed: Timestamp) -> Self {
    Self {
      size: 1,
      graph,
      last_changed,
    }
  }

  pub(crate) fn from_parts(size: usize, graph: G, last_changed: Timestamp) -> Self {
    Self {
      size,
      graph,
      last_changed,
    }
  }

  /// Number of fragments that went into the merge.
  pub fn size(&self) -> usize {
    self.size
  }

  /// The merged graph.
  pub fn graph(&self) -> &G {
    &self.graph
  }

  /// Consumes the snapshot and returns the merged graph.
  pub fn into_graph(self) -> G {
    self.graph
  }

  /// Time of the last fragment added before coalescing.
  pub fn last_changed(&self) -> Timestamp {
    self.last_changed
  }

  /// Returns true if the merged graph has no vertices.
  pub fn is_empty(&self) -> bool {
    self.graph.is_empty()
  }
}

/// Two snapshots are equal when their merged graphs have the same membership
/// and they were last changed at the same time. Fragment counts are ignored.
impl<G: Graph> PartialEq for ContentSnapshot<G> {
  fn eq(&self, other: &Self) -> bool {
    self.last_changed == other.last_changed
      && self.graph.vertices() == other.graph.vertices()
      && self.graph.edges() == other.graph.edges()
  }
}

impl<G: Graph> Eq for ContentSnapshot<G> {}
