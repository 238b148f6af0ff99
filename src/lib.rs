//! # GraphWeave
//!
//! Sliding time windows over streams of timestamped graph fragments.
//!
//! Each element of the stream is a small graph stamped with a logical time in
//! milliseconds. The [`engine::WindowingEngine`] merges admitted fragments into
//! a working graph, asks a pluggable [`policy::AnalysisPolicy`] after every
//! ingestion whether the current window is complete, and on "yes" coalesces the
//! buffered fragments into one snapshot handed to a [`report::Reporter`].
//! Fragments older than the window size are evicted as the watermark advances.
//!
//! ## Key Features
//!
//! - **Content-driven closing**: windows close when a graph metric crosses a
//!   threshold (betweenness centrality, diameter, distance between two vertices)
//!   rather than on a fixed schedule.
//! - **Strict ordering**: elements behind the watermark are rejected before any
//!   state changes.
//! - **Acknowledged delivery**: content stays buffered until the reporter accepts it.
//! - **Async friendly**: [`runner::spawn_engine`] puts an engine on a tokio task
//!   fed by any number of producers.
//!
//! ## Quick Start
//!
//! ```rust
//! use graphweave::config::EngineConfig;
//! use graphweave::engine::WindowingEngine;
//! use graphweave::graph::SimpleGraph;
//! use graphweave::policy::TargetDistanceThreshold;
//! use graphweave::report::CollectingReporter;
//!
//! type Fragment = SimpleGraph<String>;
//!
//! let policy = TargetDistanceThreshold::new("A".to_string(), "E".to_string(), 3.0);
//! let mut engine: WindowingEngine<Fragment, _, CollectingReporter<Fragment>> =
//!   WindowingEngine::new(EngineConfig::new(60_000), policy, CollectingReporter::new()).unwrap();
//!
//! let path = SimpleGraph::from_parts(
//!   Vec::new(),
//!   [("A", "B"), ("B", "C"), ("C", "D"), ("D", "E")]
//!     .map(|(u, v)| (u.to_string(), v.to_string())),
//! );
//! engine.ingest(path, 100_000).unwrap();
//!
//! // A and E are four hops apart, so the window closed.
//! assert_eq!(engine.reporter().reports().len(), 1);
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Graph algorithms used by the reference policies.
pub mod algorithms;
/// Engine and policy configuration.
pub mod config;
/// Window content and coalescing.
pub mod content;
/// The windowing engine.
pub mod engine;
/// Error types.
pub mod error;
/// The graph capability and a simple undirected graph.
pub mod graph;
/// JSON-lines and trip-record loading.
pub mod loader;
/// Pluggable window-close policies.
pub mod policy;
/// Reporting and tick collaborators.
pub mod report;
/// Tokio task wrapper serializing ingestion.
pub mod runner;
/// Logical timestamps and the watermark.
pub mod time;
/// Window intervals and the window buffer.
pub mod window;

#[cfg(test)]
mod engine_test;
