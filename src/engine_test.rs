//! Tests for the windowing engine.

use crate::config::EngineConfig;
use crate::engine::{EngineBuilder, WindowingEngine};
use crate::error::{ConfigError, WindowError};
use crate::graph::{Graph, SimpleGraph};
use crate::policy::{
  AnalysisPolicy, CentralityThreshold, NeverClose, TargetDistanceThreshold, VertexCountThreshold,
};
use crate::report::CollectingReporter;
use crate::time::Timestamp;
use crate::window::TimeWindow;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

type G = SimpleGraph<String>;
type TestEngine<P> = WindowingEngine<G, P, CollectingReporter<G>>;
type TestBuilder = EngineBuilder<G, NeverClose, CollectingReporter<G>>;

const WINDOW: i64 = 60_000;

fn engine<P: AnalysisPolicy<G>>(policy: P) -> TestEngine<P> {
  WindowingEngine::new(EngineConfig::new(WINDOW), policy, CollectingReporter::new()).unwrap()
}

fn fragment(vertices: &[&str], edges: &[(&str, &str)]) -> G {
  SimpleGraph::from_parts(
    vertices.iter().map(|v| v.to_string()),
    edges.iter().map(|(u, v)| (u.to_string(), v.to_string())),
  )
}

fn labels(graph: &G) -> Vec<String> {
  graph.vertices().into_iter().collect()
}

// ============================================================================
// Ingestion and watermark
// ============================================================================

#[test]
fn test_ingest_merges_fragments_into_working_graph() {
  let mut engine = engine(NeverClose::new());
  engine
    .ingest(fragment(&["A", "B", "C"], &[("A", "B"), ("B", "C")]), 1_000)
    .unwrap();
  engine
    .ingest(fragment(&["C", "D", "E"], &[("C", "D"), ("D", "E")]), 2_000)
    .unwrap();

  assert_eq!(engine.app_time(), 2_000);
  assert_eq!(engine.config().window_size, WINDOW);
  assert_eq!(AnalysisPolicy::<G>::name(engine.policy()), "never");
  assert_eq!(engine.buffer().len(), 2);
  assert_eq!(labels(engine.working_graph()), vec!["A", "B", "C", "D", "E"]);
  assert_eq!(engine.working_graph().edge_count(), 4);

  let snapshot = engine.current_snapshot();
  assert_eq!(snapshot.size(), 2);
  assert_eq!(snapshot.last_changed(), 2_000);
  assert_eq!(snapshot.graph().edge_count(), 4);
}

#[test]
fn test_out_of_order_element_leaves_state_untouched() {
  let t = 1_000_000;
  let mut engine = engine(NeverClose::new());
  engine.ingest(fragment(&["A", "B"], &[("A", "B")]), t).unwrap();

  let buffer_before = engine.buffer().clone();
  let working_before = engine.working_graph().clone();

  let err = engine
    .ingest(fragment(&["X"], &[]), t - 100_000)
    .unwrap_err();
  assert_eq!(
    err,
    WindowError::OutOfOrder {
      timestamp: t - 100_000,
      watermark: t,
    }
  );
  assert_eq!(engine.buffer(), &buffer_before);
  assert_eq!(engine.working_graph(), &working_before);
  assert_eq!(engine.app_time(), t);
  assert_eq!(engine.stats().rejected, 1);
  assert_eq!(engine.stats().admitted, 1);
}

#[test]
fn test_equal_timestamp_is_admitted() {
  let mut engine = engine(NeverClose::new());
  engine.ingest(fragment(&["A"], &[]), 500).unwrap();
  engine.ingest(fragment(&["B"], &[]), 500).unwrap();
  assert_eq!(engine.buffer().len(), 2);
}

#[test]
fn test_initial_app_time_is_enforced() {
  let config = EngineConfig::new(WINDOW).with_initial_app_time(5_000);
  let mut engine: TestEngine<NeverClose> =
    WindowingEngine::new(config, NeverClose::new(), CollectingReporter::new()).unwrap();
  assert_eq!(engine.app_time(), 5_000);
  assert!(engine.ingest(fragment(&["A"], &[]), 4_000).is_err());
  assert!(engine.ingest(fragment(&["A"], &[]), 5_000).is_ok());
}

#[test]
fn test_invalid_window_size_is_rejected() {
  let result: Result<TestEngine<NeverClose>, _> =
    WindowingEngine::new(EngineConfig::new(0), NeverClose::new(), CollectingReporter::new());
  assert!(matches!(result, Err(ConfigError::InvalidWindowSize(0))));
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn test_elements_beyond_horizon_are_evicted() {
  let t = 1_000_000;
  let mut engine = engine(NeverClose::new());
  engine.ingest(fragment(&["A", "B"], &[("A", "B")]), t).unwrap();
  engine
    .ingest(fragment(&["C", "D"], &[("C", "D")]), t + 100_000)
    .unwrap();

  assert_eq!(engine.buffer().len(), 1);
  assert_eq!(engine.buffer().oldest(), Some(t + 100_000));
  assert_eq!(labels(engine.working_graph()), vec!["C", "D"]);
  assert!(!engine.working_graph().contains_edge(&"A".to_string(), &"B".to_string()));
  assert_eq!(engine.stats().evicted, 1);
}

#[test]
fn test_element_on_horizon_is_kept() {
  let mut engine = engine(NeverClose::new());
  engine.ingest(fragment(&["A"], &[]), 10_000).unwrap();
  engine.ingest(fragment(&["B"], &[]), 10_000 + WINDOW).unwrap();
  assert_eq!(engine.buffer().len(), 2);
  assert_eq!(labels(engine.working_graph()), vec!["A", "B"]);
}

#[test]
fn test_evict_all_clears_buffer_and_graph() {
  let mut engine = engine(NeverClose::new());
  engine.ingest(fragment(&["A", "B"], &[("A", "B")]), 1_000).unwrap();
  engine.evict_all();

  assert!(engine.buffer().is_empty());
  assert!(engine.working_graph().is_empty());
  assert!(engine.current_snapshot().is_empty());
  // The watermark survives.
  assert_eq!(engine.app_time(), 1_000);
}

#[test]
fn test_content_at_selects_window_range() {
  let mut engine = engine(NeverClose::new());
  engine.ingest(fragment(&["A"], &[]), 1_000).unwrap();
  engine.ingest(fragment(&["B"], &[]), 50_000).unwrap();
  engine.ingest(fragment(&["C"], &[]), 90_000).unwrap();

  // Horizon 30_000 evicted the first element.
  assert_eq!(engine.buffer().len(), 2);

  let both = engine.content_at(90_000);
  assert_eq!(both.size(), 2);
  assert_eq!(labels(both.graph()), vec!["B", "C"]);
  assert_eq!(both.last_changed(), 90_000);

  let latest = engine.content_at(120_000);
  assert_eq!(latest.size(), 1);
  assert_eq!(labels(latest.graph()), vec!["C"]);

  assert_eq!(engine.window_at(90_000), TimeWindow::new(30_000, 90_000));
}

// ============================================================================
// Closing windows
// ============================================================================

#[test]
fn test_target_distance_closes_and_reports_window() {
  let path = fragment(
    &["A", "B", "C", "D", "E"],
    &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E")],
  );
  let mut engine = engine(TargetDistanceThreshold::new(
    "A".to_string(),
    "E".to_string(),
    3.0,
  ));
  engine.ingest(path, 100_000).unwrap();

  let reports = engine.reporter().reports();
  assert_eq!(reports.len(), 1);
  assert_eq!(reports[0].window, TimeWindow::new(40_000, 100_000));
  assert_eq!(reports[0].close_time, 100_000);
  assert_eq!(reports[0].snapshot.size(), 1);
  assert_eq!(reports[0].snapshot.graph().vertex_count(), 5);
  assert!(reports[0].wall_clock_ms > 0);

  assert!(engine.buffer().is_empty());
  assert!(engine.working_graph().is_empty());
  assert_eq!(engine.stats().windows_closed, 1);
}

#[test]
fn test_target_evicted_from_window_closes_it() {
  let mut engine = engine(TargetDistanceThreshold::new(
    "A".to_string(),
    "C".to_string(),
    3.0,
  ));
  engine
    .ingest(fragment(&["A", "B", "C"], &[("A", "B"), ("B", "C")]), 1_000)
    .unwrap();
  // C is still buffered here; eviction of the first fragment runs after the check.
  engine.ingest(fragment(&["A", "X"], &[("A", "X")]), 200_000).unwrap();
  assert!(engine.reporter().reports().is_empty());
  assert_eq!(labels(engine.working_graph()), vec!["A", "X"]);

  engine.ingest(fragment(&["X", "Y"], &[("X", "Y")]), 200_001).unwrap();
  let reports = engine.reporter().reports();
  assert_eq!(reports.len(), 1);
  assert_eq!(reports[0].snapshot.size(), 2);
  assert_eq!(labels(reports[0].snapshot.graph()), vec!["A", "X", "Y"]);
  assert!(engine.buffer().is_empty());
}

#[test]
fn test_centrality_closes_once_a_bridge_appears() {
  let mut engine = engine(CentralityThreshold::<String>::new(0.5));
  engine
    .ingest(
      fragment(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]),
      1_000,
    )
    .unwrap();
  assert!(engine.reporter().reports().is_empty());

  engine.ingest(fragment(&["C", "D"], &[("C", "D")]), 2_000).unwrap();
  let reports = engine.reporter().reports();
  assert_eq!(reports.len(), 1);
  let snapshot = &reports[0].snapshot;
  assert_eq!(snapshot.size(), 2);
  assert_eq!(labels(snapshot.graph()), vec!["A", "B", "C", "D"]);
  assert_eq!(snapshot.graph().edge_count(), 4);
  assert_eq!(snapshot.last_changed(), 2_000);
}

#[test]
fn test_empty_fragment_reports_empty_snapshot() {
  let mut engine = engine(VertexCountThreshold::new(0));
  engine.ingest(G::default(), 1_000).unwrap();

  let reports = engine.reporter().reports();
  assert_eq!(reports.len(), 1);
  assert!(reports[0].snapshot.is_empty());
  assert_eq!(reports[0].snapshot.size(), 1);
}

#[test]
fn test_declined_report_keeps_content_for_next_close() {
  let mut engine: TestEngine<VertexCountThreshold> = WindowingEngine::new(
    EngineConfig::new(WINDOW),
    VertexCountThreshold::new(3),
    CollectingReporter::new().with_acknowledge(false),
  )
  .unwrap();

  engine.ingest(fragment(&["A", "B"], &[("A", "B")]), 1_000).unwrap();
  engine.ingest(fragment(&["B", "C"], &[("B", "C")]), 2_000).unwrap();

  assert_eq!(engine.reporter().reports().len(), 1);
  assert_eq!(engine.buffer().len(), 2);
  assert_eq!(engine.working_graph().vertex_count(), 3);
  assert_eq!(engine.stats().reports_declined, 1);
  assert_eq!(engine.stats().windows_closed, 0);

  engine.reporter_mut().set_acknowledge(true);
  engine.ingest(fragment(&["C", "D"], &[("C", "D")]), 3_000).unwrap();

  let reports = engine.reporter().reports();
  assert_eq!(reports.len(), 2);
  assert_eq!(reports[1].snapshot.size(), 3);
  assert_eq!(labels(reports[1].snapshot.graph()), vec!["A", "B", "C", "D"]);
  assert!(engine.buffer().is_empty());
  assert_eq!(engine.stats().windows_closed, 1);
}

#[test]
fn test_declined_content_is_still_evicted_past_the_horizon() {
  let t = 1_000_000;
  let mut engine: TestEngine<VertexCountThreshold> = WindowingEngine::new(
    EngineConfig::new(WINDOW),
    VertexCountThreshold::new(0),
    CollectingReporter::new().with_acknowledge(false),
  )
  .unwrap();

  engine.ingest(fragment(&["A"], &[]), t).unwrap();
  engine.ingest(fragment(&["B"], &[]), t + 100_000).unwrap();

  // The second close attempt still saw A; eviction dropped it afterwards.
  let reports = engine.reporter().reports();
  assert_eq!(reports.len(), 2);
  assert_eq!(labels(reports[1].snapshot.graph()), vec!["A", "B"]);
  assert_eq!(engine.buffer().len(), 1);
  assert_eq!(labels(engine.working_graph()), vec!["B"]);

  let stats = serde_json::to_value(engine.stats()).unwrap();
  assert_eq!(
    stats,
    serde_json::json!({
      "admitted": 2,
      "rejected": 0,
      "evicted": 1,
      "windows_closed": 0,
      "reports_declined": 2,
    })
  );
}

#[test]
fn test_ticker_fires_only_on_acknowledged_close() {
  let ticks = Arc::new(Mutex::new(Vec::new()));
  let sink = Arc::clone(&ticks);
  let mut engine: TestEngine<VertexCountThreshold> =
    WindowingEngine::builder(EngineConfig::new(WINDOW))
      .policy(VertexCountThreshold::new(1))
      .reporter(CollectingReporter::new().with_acknowledge(false))
      .ticker(move |t: Timestamp, w: TimeWindow| {
        if let Ok(mut ticks) = sink.lock() {
          ticks.push((t, w));
        }
      })
      .build()
      .unwrap();

  engine.ingest(fragment(&["A"], &[]), 1_000).unwrap();
  assert!(ticks.lock().unwrap().is_empty());

  engine.reporter_mut().set_acknowledge(true);
  engine.ingest(fragment(&["B"], &[]), 2_000).unwrap();
  assert_eq!(
    *ticks.lock().unwrap(),
    vec![(2_000, TimeWindow::new(2_000 - WINDOW, 2_000))]
  );
}

#[test]
fn test_builder_requires_policy_and_reporter() {
  let missing_policy = TestBuilder::new(EngineConfig::new(WINDOW))
    .reporter(CollectingReporter::new())
    .build();
  assert!(matches!(missing_policy, Err(ConfigError::Missing("policy"))));

  let missing_reporter = TestBuilder::new(EngineConfig::new(WINDOW))
    .policy(NeverClose::new())
    .build();
  assert!(matches!(missing_reporter, Err(ConfigError::Missing("reporter"))));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
  #[test]
  fn test_watermark_never_regresses(timestamps in prop::collection::vec(0i64..200_000, 1..40)) {
    let mut engine = engine(NeverClose::new());
    let mut highest = 0i64;
    for ts in timestamps {
      let result = engine.ingest(fragment(&["A"], &[]), ts);
      prop_assert_eq!(result.is_ok(), ts >= highest);
      highest = highest.max(ts);
      prop_assert_eq!(engine.app_time(), highest);
    }

    let times: Vec<Timestamp> = engine.buffer().iter().map(|e| e.time()).collect();
    prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
    prop_assert!(times.iter().all(|&t| t >= highest - WINDOW));
  }
}
