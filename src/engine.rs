//! # Windowing Engine
//!
//! [`WindowingEngine`] owns the window buffer, the working graph and the
//! watermark of one stream, and drives the analysis policy after every
//! ingestion.
//!
//! ## Ingestion sequence
//!
//! For `ingest(fragment, t)`:
//!
//! 1. The watermark admits `t` or the call fails with
//!    [`WindowError::OutOfOrder`](crate::error::WindowError::OutOfOrder) and
//!    nothing changes.
//! 2. The fragment is appended to the buffer and merged (vertices and edges) into
//!    the working graph.
//! 3. The policy updates from the working graph and is asked whether to close.
//! 4. On close, the buffered fragments are coalesced and reported over
//!    `[t - window_size, t)`. Only an acknowledged report resets the buffer and
//!    the working graph; a declined one keeps everything for the next attempt.
//! 5. Regardless of the decision, entries older than `t - window_size` are
//!    evicted and the working graph is rebuilt from what remains.
//!
//! ## Concurrency
//!
//! The engine is a single-writer structure: every mutating call takes
//! `&mut self`, so ingestion is serialized by the borrow checker. Producers on
//! several tasks should feed one engine through [`crate::runner`].

use crate::config::EngineConfig;
use crate::content::{ContentSnapshot, GraphContent};
use crate::error::{ConfigError, WindowResult};
use crate::graph::Graph;
use crate::policy::AnalysisPolicy;
use crate::report::{Reporter, Ticker};
use crate::time::{Timestamp, Watermark};
use crate::window::{TimeWindow, WindowBuffer};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

/// Counters describing what an engine has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
  /// Elements admitted past the watermark.
  pub admitted: u64,
  /// Elements rejected as out of order.
  pub rejected: u64,
  /// Buffer entries removed by horizon eviction.
  pub evicted: u64,
  /// Windows reported and acknowledged.
  pub windows_closed: u64,
  /// Close attempts the reporter declined.
  pub reports_declined: u64,
}

type BoxedTicker = Box<dyn Ticker + Send>;

/// Sliding-window engine over a stream of graph fragments.
pub struct WindowingEngine<G, P, R> {
  config: EngineConfig,
  watermark: Watermark,
  buffer: WindowBuffer<G>,
  working: G,
  policy: P,
  reporter: R,
  ticker: Option<BoxedTicker>,
  stats: EngineStats,
}

impl<G, P, R> WindowingEngine<G, P, R>
where
  G: Graph + Clone,
  P: AnalysisPolicy<G>,
  R: Reporter<G>,
{
  /// Creates an engine after validating `config`.
  pub fn new(config: EngineConfig, policy: P, reporter: R) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Self {
      config,
      watermark: Watermark::new(config.initial_app_time),
      buffer: WindowBuffer::new(),
      working: G::default(),
      policy,
      reporter,
      ticker: None,
      stats: EngineStats::default(),
    })
  }

  /// Starts a builder for the given configuration.
  pub fn builder(config: EngineConfig) -> EngineBuilder<G, P, R> {
    EngineBuilder::new(config)
  }

  /// Ingests one fragment stamped with `timestamp`.
  ///
  /// Fails with [`WindowError::OutOfOrder`](crate::error::WindowError::OutOfOrder)
  /// when `timestamp` precedes the watermark; buffer, working graph and watermark
  /// are then left exactly as they were.
  pub fn ingest(&mut self, fragment: G, timestamp: Timestamp) -> WindowResult<()> {
    debug!(
      timestamp,
      vertices = fragment.vertex_count(),
      edges = fragment.edge_count(),
      "received element"
    );

    if let Err(err) = self.watermark.observe(timestamp) {
      error!(
        timestamp,
        watermark = self.watermark.app_time(),
        "out of order element rejected"
      );
      self.stats.rejected += 1;
      return Err(err);
    }

    self.working.merge_from(&fragment);
    self.buffer.push(fragment, timestamp);
    self.stats.admitted += 1;

    self.policy.update(&self.working);
    if self.policy.should_close(&self.working) {
      self.close_window(timestamp);
    }

    self.evict(timestamp);
    Ok(())
  }

  /// Clears the buffer and the working graph, independent of the watermark.
  pub fn evict_all(&mut self) {
    debug!(entries = self.buffer.len(), "evicting all buffered elements");
    self.buffer.clear();
    self.working = G::default();
  }

  /// Snapshot of the live working graph. Engine state is not touched.
  pub fn current_snapshot(&self) -> ContentSnapshot<G> {
    ContentSnapshot::from_parts(
      self.buffer.len(),
      self.working.clone(),
      self.watermark.app_time(),
    )
  }

  /// Coalesces the buffered fragments that fall inside the window closing at `t_e`,
  /// that is every entry with `timestamp >= t_e - window_size`.
  pub fn content_at(&self, t_e: Timestamp) -> ContentSnapshot<G> {
    let horizon = self.window_at(t_e).start();
    self
      .buffer
      .since(horizon)
      .map(|e| (e.payload().clone(), e.time()))
      .collect::<GraphContent<G>>()
      .coalesce()
  }

  /// The window interval that closes at `t_e`.
  pub fn window_at(&self, t_e: Timestamp) -> TimeWindow {
    TimeWindow::ending_at(t_e, self.config.window_size)
  }

  /// Highest timestamp admitted so far.
  pub fn app_time(&self) -> Timestamp {
    self.watermark.app_time()
  }

  /// Buffered elements of the active window.
  pub fn buffer(&self) -> &WindowBuffer<G> {
    &self.buffer
  }

  /// Current working graph.
  pub fn working_graph(&self) -> &G {
    &self.working
  }

  /// The injected policy.
  pub fn policy(&self) -> &P {
    &self.policy
  }

  /// The reporting collaborator.
  pub fn reporter(&self) -> &R {
    &self.reporter
  }

  /// Mutable access to the reporting collaborator.
  pub fn reporter_mut(&mut self) -> &mut R {
    &mut self.reporter
  }

  /// Window options.
  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Counters since construction.
  pub fn stats(&self) -> EngineStats {
    self.stats
  }

  fn close_window(&mut self, t_e: Timestamp) {
    let window = self.window_at(t_e);
    let app_time = self.watermark.app_time();
    let snapshot = self
      .buffer
      .iter()
      .map(|e| (e.payload().clone(), app_time))
      .collect::<GraphContent<G>>()
      .coalesce();
    let fragments = snapshot.size();
    let wall_clock_ms = Utc::now().timestamp_millis();

    if !self.reporter.report(window, snapshot, t_e, wall_clock_ms) {
      warn!(%window, fragments, "window report not acknowledged, keeping content");
      self.stats.reports_declined += 1;
      return;
    }

    info!(%window, fragments, policy = self.policy.name(), "window closed");
    if let Some(ticker) = self.ticker.as_mut() {
      ticker.tick(t_e, window);
    }
    self.policy.on_window_closed();
    self.buffer.clear();
    self.working = G::default();
    self.stats.windows_closed += 1;
  }

  fn evict(&mut self, t_e: Timestamp) {
    let horizon = t_e.saturating_sub(self.config.window_size);
    let evicted = self.buffer.evict_before(horizon);
    if evicted == 0 {
      return;
    }
    trace!(horizon, evicted, remaining = self.buffer.len(), "evicted expired elements");
    self.stats.evicted += evicted as u64;

    let mut rebuilt = G::default();
    for element in &self.buffer {
      rebuilt.merge_from(element.payload());
    }
    self.working = rebuilt;
  }
}

/// Builder for [`WindowingEngine`].
///
/// Policy and reporter are required; the ticker is optional.
pub struct EngineBuilder<G, P, R> {
  config: EngineConfig,
  policy: Option<P>,
  reporter: Option<R>,
  ticker: Option<BoxedTicker>,
  _graph: std::marker::PhantomData<fn() -> G>,
}

impl<G, P, R> EngineBuilder<G, P, R>
where
  G: Graph + Clone,
  P: AnalysisPolicy<G>,
  R: Reporter<G>,
{
  /// Starts a builder.
  pub fn new(config: EngineConfig) -> Self {
    Self {
      config,
      policy: None,
      reporter: None,
      ticker: None,
      _graph: std::marker::PhantomData,
    }
  }

  /// Sets the analysis policy.
  pub fn policy(mut self, policy: P) -> Self {
    self.policy = Some(policy);
    self
  }

  /// Sets the reporting collaborator.
  pub fn reporter(mut self, reporter: R) -> Self {
    self.reporter = Some(reporter);
    self
  }

  /// Sets a ticker notified after every acknowledged window.
  pub fn ticker(mut self, ticker: impl Ticker + Send + 'static) -> Self {
    self.ticker = Some(Box::new(ticker));
    self
  }

  /// Validates the configuration and builds the engine.
  pub fn build(self) -> Result<WindowingEngine<G, P, R>, ConfigError> {
    let policy = self.policy.ok_or(ConfigError::Missing("policy"))?;
    let reporter = self.reporter.ok_or(ConfigError::Missing("reporter"))?;
    let mut engine = WindowingEngine::new(self.config, policy, reporter)?;
    engine.ticker = self.ticker;
    Ok(engine)
  }
}
