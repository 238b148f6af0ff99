//! Logical timestamps and the watermark.
//!
//! Timestamps are logical milliseconds carried by each stream element. They are
//! not wall-clock time: eviction and window boundaries are driven purely by the
//! timestamps embedded in the stream.
//!
//! ## Ordering contract
//!
//! The [`Watermark`] records the highest timestamp admitted so far (`app_time`).
//! It never moves backwards. [`Watermark::observe`] rejects any timestamp below
//! the current watermark with [`WindowError::OutOfOrder`] and leaves the
//! watermark untouched, so callers can run it before any other mutation and get
//! all-or-nothing ingestion.

use crate::error::{WindowError, WindowResult};

/// Logical time in milliseconds.
///
/// Signed so that horizons (`t - window_size`) below the epoch stay representable.
pub type Timestamp = i64;

/// A payload with an attached logical timestamp.
///
/// The window buffer stores graph fragments as `Timestamped<G>`; once admitted
/// an element is never mutated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Timestamped<T> {
  /// The logical time of this item.
  pub time: Timestamp,
  /// The payload.
  pub payload: T,
}

impl<T> Timestamped<T> {
  /// Creates a new timestamped item.
  #[inline]
  pub const fn new(payload: T, time: Timestamp) -> Self {
    Self { time, payload }
  }

  /// Returns a reference to the payload.
  #[inline]
  pub const fn payload(&self) -> &T {
    &self.payload
  }

  /// Returns the logical time.
  #[inline]
  pub const fn time(&self) -> Timestamp {
    self.time
  }

  /// Consumes the element and returns its payload.
  #[inline]
  pub fn into_payload(self) -> T {
    self.payload
  }
}

/// A graph fragment as admitted into the window buffer.
pub type StreamElement<G> = Timestamped<G>;

/// Highest admitted timestamp of one stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Watermark {
  app_time: Timestamp,
}

impl Watermark {
  /// Creates a watermark starting at `initial`.
  #[inline]
  pub const fn new(initial: Timestamp) -> Self {
    Self { app_time: initial }
  }

  /// Returns the highest timestamp admitted so far.
  #[inline]
  pub const fn app_time(&self) -> Timestamp {
    self.app_time
  }

  /// Returns true if `timestamp` would be rejected.
  #[inline]
  pub const fn is_late(&self, timestamp: Timestamp) -> bool {
    timestamp < self.app_time
  }

  /// Admits `timestamp`, advancing the watermark to it.
  ///
  /// Equal timestamps are admitted. An earlier timestamp fails with
  /// [`WindowError::OutOfOrder`] and the watermark is left unchanged.
  pub fn observe(&mut self, timestamp: Timestamp) -> WindowResult<()> {
    if self.is_late(timestamp) {
      return Err(WindowError::OutOfOrder {
        timestamp,
        watermark: self.app_time,
      });
    }
    self.app_time = timestamp;
    Ok(())
  }
}
