//! Window intervals and the window buffer.
//!
//! # Core Concepts
//!
//! - [`TimeWindow`]: the half-open interval `[start, end)` reported when a window
//!   closes. It is derived from the close time and the window size and is never
//!   stored by the engine.
//! - [`WindowBuffer`]: the ordered `(fragment, timestamp)` entries retained for the
//!   active window. Entries leave the buffer by horizon eviction or when a closed
//!   window is acknowledged.
//!
//! # Example
//!
//! ```rust
//! use graphweave::window::TimeWindow;
//!
//! let window = TimeWindow::ending_at(100_000, 60_000);
//! assert_eq!(window.start(), 40_000);
//! assert!(window.contains(40_000));
//! assert!(!window.contains(100_000));
//! ```

use crate::time::{StreamElement, Timestamp, Timestamped};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A time window with inclusive start and exclusive end, in logical milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
  start: Timestamp,
  end: Timestamp,
}

impl TimeWindow {
  /// Creates a new time window with the given start and end.
  pub fn new(start: Timestamp, end: Timestamp) -> Self {
    Self { start, end }
  }

  /// Window of `size` milliseconds closing at `t_e`: `[t_e - size, t_e)`.
  pub fn ending_at(t_e: Timestamp, size: i64) -> Self {
    Self::new(t_e.saturating_sub(size), t_e)
  }

  /// Returns the start time of the window.
  pub fn start(&self) -> Timestamp {
    self.start
  }

  /// Returns the end time of the window.
  pub fn end(&self) -> Timestamp {
    self.end
  }

  /// Returns the length of the window in milliseconds.
  pub fn duration(&self) -> i64 {
    self.end - self.start
  }

  /// Returns true if the given timestamp falls within this window.
  pub fn contains(&self, timestamp: Timestamp) -> bool {
    timestamp >= self.start && timestamp < self.end
  }

  /// Returns true if this window intersects with another.
  pub fn intersects(&self, other: &TimeWindow) -> bool {
    self.start < other.end && other.start < self.end
  }
}

impl PartialOrd for TimeWindow {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for TimeWindow {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .start
      .cmp(&other.start)
      .then_with(|| self.end.cmp(&other.end))
  }
}

impl fmt::Display for TimeWindow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {})", self.start, self.end)
  }
}

/// Ordered buffer of admitted fragments, oldest first.
///
/// Insertion order is preserved. Because the engine only admits non-decreasing
/// timestamps, insertion order is also timestamp order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowBuffer<G> {
  elements: Vec<StreamElement<G>>,
}

impl<G> Default for WindowBuffer<G> {
  fn default() -> Self {
    Self {
      elements: Vec::new(),
    }
  }
}

impl<G> WindowBuffer<G> {
  /// Creates an empty buffer.
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends an element.
  pub fn push(&mut self, fragment: G, time: Timestamp) {
    self.elements.push(Timestamped::new(fragment, time));
  }

  /// Removes every element with `time < horizon`. Returns how many were removed.
  pub fn evict_before(&mut self, horizon: Timestamp) -> usize {
    let before = self.elements.len();
    self.elements.retain(|e| e.time >= horizon);
    before - self.elements.len()
  }

  /// Removes every element.
  pub fn clear(&mut self) {
    self.elements.clear();
  }

  /// Number of buffered elements.
  pub fn len(&self) -> usize {
    self.elements.len()
  }

  /// Returns true if the buffer holds nothing.
  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  /// Iterates over buffered elements, oldest first.
  pub fn iter(&self) -> std::slice::Iter<'_, StreamElement<G>> {
    self.elements.iter()
  }

  /// Iterates over elements with `time >= horizon`.
  pub fn since(&self, horizon: Timestamp) -> impl Iterator<Item = &StreamElement<G>> {
    self.elements.iter().filter(move |e| e.time >= horizon)
  }

  /// Timestamp of the oldest element.
  pub fn oldest(&self) -> Option<Timestamp> {
    self.elements.first().map(|e| e.time)
  }

  /// Timestamp of the newest element.
  pub fn newest(&self) -> Option<Timestamp> {
    self.elements.last().map(|e| e.time)
  }
}

impl<'a, G> IntoIterator for &'a WindowBuffer<G> {
  type Item = &'a StreamElement<G>;
  type IntoIter = std::slice::Iter<'a, StreamElement<G>>;

  fn into_iter(self) -> Self::IntoIter {
    self.elements.iter()
  }
}
