//! # Replay Demo
//!
//! Replays a fragment stream through a windowing engine running on its own task
//! and prints every closed window.
//!
//! ```text
//! cargo run --example replay -- [settings.json] [fragments.jsonl | trips.csv]
//! ```
//!
//! Without arguments a built-in stream grows a path A-B-C-D-E one edge at a
//! time under a diameter policy, so the window closes once the path is longer
//! than 3 hops.

use graphweave::config::{EngineConfig, PolicyConfig, Settings};
use graphweave::engine::WindowingEngine;
use graphweave::graph::{Graph, SimpleGraph};
use graphweave::loader::{load_fragments, read_trip_fragments};
use graphweave::report::ChannelReporter;
use graphweave::runner::spawn_engine;
use graphweave::time::{StreamElement, Timestamp, Timestamped};
use graphweave::window::TimeWindow;
use std::fs::File;
use std::path::Path;
use tracing::info;

type Fragment = SimpleGraph<String>;

fn default_settings() -> Settings {
  Settings {
    engine: EngineConfig::new(60_000),
    policy: Some(PolicyConfig::Diameter { threshold: 3.0 }),
  }
}

fn built_in_stream() -> Vec<StreamElement<Fragment>> {
  let hops = [("A", "B"), ("B", "C"), ("C", "D"), ("D", "E"), ("E", "F")];
  hops
    .iter()
    .enumerate()
    .map(|(i, (u, v))| {
      let fragment = SimpleGraph::from_parts(Vec::new(), [(u.to_string(), v.to_string())]);
      Timestamped::new(fragment, 10_000 * (i as i64 + 1))
    })
    .collect()
}

type DemoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn load_stream(path: &Path) -> DemoResult<Vec<StreamElement<Fragment>>> {
  let is_csv = path.extension().is_some_and(|ext| ext == "csv");
  let elements = if is_csv {
    read_trip_fragments(File::open(path)?, 0, 1_000)?
  } else {
    load_fragments(path)?
  };
  Ok(elements)
}

#[tokio::main]
async fn main() -> DemoResult<()> {
  tracing_subscriber::fmt::init();

  let args: Vec<String> = std::env::args().skip(1).collect();
  let settings = match args.first() {
    Some(path) => Settings::from_path(path)?,
    None => default_settings(),
  };
  let elements = match args.get(1) {
    Some(path) => load_stream(Path::new(path))?,
    None => built_in_stream(),
  };

  let policy = settings.policy_config()?.build()?;
  let (reporter, mut reports) = ChannelReporter::<Fragment>::channel(16);
  let engine: WindowingEngine<Fragment, _, _> = WindowingEngine::builder(settings.engine)
    .policy(policy)
    .reporter(reporter)
    .ticker(|close_time: Timestamp, window: TimeWindow| {
      info!(close_time, %window, "tick");
    })
    .build()?;

  let printer = tokio::spawn(async move {
    let mut closed = 0usize;
    while let Some(report) = reports.recv().await {
      closed += 1;
      println!(
        "window {} closed at {}: {} fragments, {} vertices, {} edges",
        report.window,
        report.close_time,
        report.snapshot.size(),
        report.snapshot.graph().vertex_count(),
        report.snapshot.graph().edge_count(),
      );
      println!("  {}", report.snapshot.graph());
    }
    closed
  });

  println!("Replaying {} fragments", elements.len());
  let (handle, task) = spawn_engine(engine, 64);
  for element in elements {
    let time = element.time;
    if let Err(err) = handle.ingest(element.into_payload(), time).await {
      println!("  skipped element at {}: {}", time, err);
    }
  }
  drop(handle);

  let engine = task.await?;
  let stats = engine.stats();
  let open = engine.current_snapshot();
  drop(engine);
  let closed = printer.await?;

  println!(
    "\n{} windows closed, {} admitted, {} rejected, {} evicted",
    closed, stats.admitted, stats.rejected, stats.evicted
  );
  println!(
    "open window holds {} vertices: {}",
    open.graph().vertex_count(),
    open.graph()
  );
  Ok(())
}
