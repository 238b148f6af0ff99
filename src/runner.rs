//! # Async Runner
//!
//! The engine is synchronous and single-writer. This module puts it on a tokio
//! task so that any number of producers can feed it concurrently:
//!
//! - [`spawn_engine`] moves an engine onto a task that drains a bounded request
//!   queue in arrival order. Each request is answered through a oneshot channel
//!   with the result of its `ingest` call.
//! - [`EngineHandle`] is the cloneable producer side of that queue.
//! - [`drive`] feeds a stream of timestamped fragments straight into an engine
//!   owned by the caller.
//!
//! ```rust,no_run
//! use graphweave::config::EngineConfig;
//! use graphweave::engine::WindowingEngine;
//! use graphweave::graph::SimpleGraph;
//! use graphweave::policy::NeverClose;
//! use graphweave::report::CollectingReporter;
//! use graphweave::runner::spawn_engine;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! type Fragment = SimpleGraph<u32>;
//! let config = EngineConfig::new(60_000);
//! let engine: WindowingEngine<Fragment, _, CollectingReporter<Fragment>> =
//!   WindowingEngine::new(config, NeverClose::new(), CollectingReporter::new())?;
//! let (handle, task) = spawn_engine(engine, 64);
//! handle.ingest(SimpleGraph::from_parts([1, 2], [(1, 2)]), 1_000).await?;
//! drop(handle);
//! let engine = task.await?;
//! assert_eq!(engine.buffer().len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::engine::{EngineStats, WindowingEngine};
use crate::error::{WindowError, WindowResult};
use crate::graph::Graph;
use crate::policy::AnalysisPolicy;
use crate::report::Reporter;
use crate::time::{StreamElement, Timestamp, Timestamped};
use futures::{Stream, StreamExt};
use std::pin::pin;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

struct IngestRequest<G> {
  element: StreamElement<G>,
  reply: oneshot::Sender<WindowResult<()>>,
}

/// Producer handle for an engine running on its own task.
#[derive(Debug)]
pub struct EngineHandle<G> {
  tx: mpsc::Sender<IngestRequest<G>>,
}

impl<G> Clone for EngineHandle<G> {
  fn clone(&self) -> Self {
    Self {
      tx: self.tx.clone(),
    }
  }
}

impl<G> EngineHandle<G> {
  /// Queues one fragment and waits for the engine's answer.
  ///
  /// Returns [`WindowError::EngineStopped`] if the engine task is gone.
  pub async fn ingest(&self, fragment: G, timestamp: Timestamp) -> WindowResult<()> {
    let (reply, response) = oneshot::channel();
    let request = IngestRequest {
      element: Timestamped::new(fragment, timestamp),
      reply,
    };
    self
      .tx
      .send(request)
      .await
      .map_err(|_| WindowError::EngineStopped)?;
    response.await.map_err(|_| WindowError::EngineStopped)?
  }

  /// Returns true once the engine task has stopped accepting requests.
  pub fn is_closed(&self) -> bool {
    self.tx.is_closed()
  }
}

/// Moves `engine` onto a tokio task fed through a queue of `capacity` requests.
///
/// The task runs until every [`EngineHandle`] is dropped and then hands the
/// engine back through its [`JoinHandle`].
pub fn spawn_engine<G, P, R>(
  engine: WindowingEngine<G, P, R>,
  capacity: usize,
) -> (EngineHandle<G>, JoinHandle<WindowingEngine<G, P, R>>)
where
  G: Graph + Clone + Send + 'static,
  P: AnalysisPolicy<G> + Send + 'static,
  R: Reporter<G> + Send + 'static,
{
  let (tx, rx) = mpsc::channel(capacity.max(1));
  let task = tokio::spawn(async move {
    let mut engine = engine;
    let mut requests = ReceiverStream::new(rx);
    while let Some(IngestRequest { element, reply }) = requests.next().await {
      let result = engine.ingest(element.payload, element.time);
      if reply.send(result).is_err() {
        debug!("ingest caller went away before the reply");
      }
    }
    let stats = engine.stats();
    info!(
      admitted = stats.admitted,
      rejected = stats.rejected,
      windows_closed = stats.windows_closed,
      "engine task stopped"
    );
    engine
  });
  (EngineHandle { tx }, task)
}

/// Ingests every element of `stream` in order.
///
/// Out-of-order elements are logged and skipped; the stream keeps flowing.
/// Returns the engine's counters once the stream ends.
pub async fn drive<G, P, R, S>(engine: &mut WindowingEngine<G, P, R>, stream: S) -> EngineStats
where
  G: Graph + Clone,
  P: AnalysisPolicy<G>,
  R: Reporter<G>,
  S: Stream<Item = StreamElement<G>>,
{
  let mut stream = pin!(stream);
  while let Some(element) = stream.next().await {
    let time = element.time;
    if let Err(err) = engine.ingest(element.into_payload(), time) {
      warn!(error = %err, "skipping element");
    }
  }
  engine.stats()
}
