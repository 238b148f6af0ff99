//! # Reporting and Tick Collaborators
//!
//! When a window closes the engine hands its snapshot to a [`Reporter`] and
//! waits for the answer: `true` acknowledges delivery and lets the engine reset,
//! `false` keeps the content buffered so the next close attempt reports it
//! again together with anything added in between.
//!
//! After an acknowledged report an optional [`Ticker`] is notified. Ticks are
//! fire-and-forget.
//!
//! Closures implement both traits, so simple callers need no extra types:
//!
//! ```rust
//! use graphweave::content::ContentSnapshot;
//! use graphweave::graph::SimpleGraph;
//! use graphweave::report::Reporter;
//! use graphweave::window::TimeWindow;
//!
//! type Fragment = SimpleGraph<u32>;
//!
//! let mut reporter =
//!   |window: TimeWindow, snapshot: ContentSnapshot<Fragment>, _t_e: i64, _wall: i64| {
//!     println!("{} closed with {} fragments", window, snapshot.size());
//!     true
//!   };
//! let snapshot = ContentSnapshot::of(SimpleGraph::new(), 0);
//! assert!(reporter.report(TimeWindow::new(0, 10), snapshot, 10, 0));
//! ```

use crate::content::ContentSnapshot;
use crate::time::Timestamp;
use crate::window::TimeWindow;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Receives closed windows.
pub trait Reporter<G> {
  /// Delivers one closed window. Returns true once the window is safely handed off.
  ///
  /// `close_time` is the logical timestamp that closed the window and
  /// `wall_clock_ms` the system time of the close in Unix milliseconds.
  fn report(
    &mut self,
    window: TimeWindow,
    snapshot: ContentSnapshot<G>,
    close_time: Timestamp,
    wall_clock_ms: i64,
  ) -> bool;
}

impl<G, F> Reporter<G> for F
where
  F: FnMut(TimeWindow, ContentSnapshot<G>, Timestamp, i64) -> bool,
{
  fn report(
    &mut self,
    window: TimeWindow,
    snapshot: ContentSnapshot<G>,
    close_time: Timestamp,
    wall_clock_ms: i64,
  ) -> bool {
    self(window, snapshot, close_time, wall_clock_ms)
  }
}

/// Notified after every acknowledged window.
pub trait Ticker {
  /// Signals that the window closing at `close_time` was delivered.
  fn tick(&mut self, close_time: Timestamp, window: TimeWindow);
}

impl<F> Ticker for F
where
  F: FnMut(Timestamp, TimeWindow),
{
  fn tick(&mut self, close_time: Timestamp, window: TimeWindow) {
    self(close_time, window)
  }
}

/// A closed window as delivered through [`ChannelReporter`] or kept by
/// [`CollectingReporter`].
#[derive(Debug, Clone)]
pub struct WindowReport<G> {
  /// Reported interval.
  pub window: TimeWindow,
  /// Coalesced window content.
  pub snapshot: ContentSnapshot<G>,
  /// Logical close time.
  pub close_time: Timestamp,
  /// Wall-clock close time in Unix milliseconds.
  pub wall_clock_ms: i64,
}

/// Forwards closed windows into a bounded tokio channel.
///
/// Delivery is acknowledged when the channel accepts the report. A full or
/// closed channel declines it, so the engine keeps the content buffered.
#[derive(Debug, Clone)]
pub struct ChannelReporter<G> {
  tx: mpsc::Sender<WindowReport<G>>,
}

impl<G> ChannelReporter<G> {
  /// Creates a reporter and the receiving end of its channel.
  pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<WindowReport<G>>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Self { tx }, rx)
  }

  /// Wraps an existing sender.
  pub fn new(tx: mpsc::Sender<WindowReport<G>>) -> Self {
    Self { tx }
  }
}

impl<G> Reporter<G> for ChannelReporter<G> {
  fn report(
    &mut self,
    window: TimeWindow,
    snapshot: ContentSnapshot<G>,
    close_time: Timestamp,
    wall_clock_ms: i64,
  ) -> bool {
    let report = WindowReport {
      window,
      snapshot,
      close_time,
      wall_clock_ms,
    };
    match self.tx.try_send(report) {
      Ok(()) => true,
      Err(TrySendError::Full(_)) => {
        warn!(%window, "report channel full, window not delivered");
        false
      }
      Err(TrySendError::Closed(_)) => {
        warn!(%window, "report channel closed, window not delivered");
        false
      }
    }
  }
}

/// Keeps every report in memory and answers with a fixed acknowledgment.
#[derive(Debug, Clone)]
pub struct CollectingReporter<G> {
  reports: Vec<WindowReport<G>>,
  acknowledge: bool,
}

impl<G> Default for CollectingReporter<G> {
  fn default() -> Self {
    Self {
      reports: Vec::new(),
      acknowledge: true,
    }
  }
}

impl<G> CollectingReporter<G> {
  /// Creates a reporter that acknowledges every window.
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets whether reports are acknowledged.
  pub fn with_acknowledge(mut self, acknowledge: bool) -> Self {
    self.acknowledge = acknowledge;
    self
  }

  /// Changes the acknowledgment for subsequent reports.
  pub fn set_acknowledge(&mut self, acknowledge: bool) {
    self.acknowledge = acknowledge;
  }

  /// Reports received so far, including declined ones.
  pub fn reports(&self) -> &[WindowReport<G>] {
    &self.reports
  }

  /// Takes the received reports, leaving the list empty.
  pub fn drain(&mut self) -> Vec<WindowReport<G>> {
    std::mem::take(&mut self.reports)
  }
}

impl<G> Reporter<G> for CollectingReporter<G> {
  fn report(
    &mut self,
    window: TimeWindow,
    snapshot: ContentSnapshot<G>,
    close_time: Timestamp,
    wall_clock_ms: i64,
  ) -> bool {
    self.reports.push(WindowReport {
      window,
      snapshot,
      close_time,
      wall_clock_ms,
    });
    self.acknowledge
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::{Graph, SimpleGraph};

  fn snapshot() -> ContentSnapshot<SimpleGraph<u32>> {
    ContentSnapshot::of(SimpleGraph::from_parts([1, 2], [(1, 2)]), 5)
  }

  #[test]
  fn test_channel_reporter_acknowledges_until_full() {
    let (mut reporter, mut rx) = ChannelReporter::channel(1);
    assert!(reporter.report(TimeWindow::new(0, 10), snapshot(), 10, 0));
    assert!(!reporter.report(TimeWindow::new(10, 20), snapshot(), 20, 0));

    let received = tokio_test::block_on(rx.recv()).unwrap();
    assert_eq!(received.window, TimeWindow::new(0, 10));
    assert_eq!(received.snapshot.graph().edge_count(), 1);
  }

  #[test]
  fn test_channel_reporter_declines_when_closed() {
    let (mut reporter, rx) = ChannelReporter::<SimpleGraph<u32>>::channel(4);
    drop(rx);
    assert!(!reporter.report(TimeWindow::new(0, 10), snapshot(), 10, 0));
  }

  #[test]
  fn test_collecting_reporter_records_declined_reports() {
    let mut reporter = CollectingReporter::new().with_acknowledge(false);
    assert!(!reporter.report(TimeWindow::new(0, 10), snapshot(), 10, 1));
    reporter.set_acknowledge(true);
    assert!(reporter.report(TimeWindow::new(0, 20), snapshot(), 20, 2));
    assert_eq!(reporter.reports().len(), 2);
    assert_eq!(reporter.drain().len(), 2);
    assert!(reporter.reports().is_empty());
  }

  #[test]
  fn test_closure_ticker() {
    let mut ticks = Vec::new();
    let mut ticker = |t: Timestamp, w: TimeWindow| ticks.push((t, w));
    ticker.tick(10, TimeWindow::new(0, 10));
    assert_eq!(ticks, vec![(10, TimeWindow::new(0, 10))]);
  }
}
