//! Fragment loading.
//!
//! Two input formats are supported:
//!
//! - **JSON lines**: one fragment per line,
//!   `{"timestamp": 1000, "vertices": ["A", "B"], "edges": [["A", "B"]]}`.
//!   Both lists are optional and edge endpoints are added as vertices. Blank
//!   lines are skipped.
//! - **Trip records**: a CSV file with a header row where columns 5 and 6 hold
//!   the pickup longitude and latitude and columns 9 and 10 the dropoff
//!   coordinates. Every trip becomes an edge between the vertices
//!   `"lon,lat"` of its two locations.

use crate::error::LoadError;
use crate::graph::{Graph, SimpleGraph};
use crate::time::{StreamElement, Timestamp, Timestamped};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use tracing::debug;

const PICKUP_LON: usize = 5;
const PICKUP_LAT: usize = 6;
const DROPOFF_LON: usize = 9;
const DROPOFF_LAT: usize = 10;

#[derive(Debug, Serialize, Deserialize)]
struct FragmentRecord {
  timestamp: Timestamp,
  #[serde(default)]
  vertices: Vec<String>,
  #[serde(default)]
  edges: Vec<(String, String)>,
}

/// Reads JSON-lines fragments in file order.
pub fn read_fragments<R: BufRead>(
  reader: R,
) -> Result<Vec<StreamElement<SimpleGraph<String>>>, LoadError> {
  let mut elements = Vec::new();
  for (index, line) in reader.lines().enumerate() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }
    let record: FragmentRecord = serde_json::from_str(&line).map_err(|source| LoadError::Json {
      line: index + 1,
      source,
    })?;
    let graph = SimpleGraph::from_parts(record.vertices, record.edges);
    elements.push(Timestamped::new(graph, record.timestamp));
  }
  debug!(fragments = elements.len(), "read fragments");
  Ok(elements)
}

/// Opens `path` and reads JSON-lines fragments from it.
pub fn load_fragments(
  path: impl AsRef<Path>,
) -> Result<Vec<StreamElement<SimpleGraph<String>>>, LoadError> {
  let file = File::open(path)?;
  read_fragments(BufReader::new(file))
}

/// Writes fragments as JSON lines, the format [`read_fragments`] accepts.
pub fn write_fragments<'a, W, I>(mut writer: W, elements: I) -> Result<(), LoadError>
where
  W: Write,
  I: IntoIterator<Item = &'a StreamElement<SimpleGraph<String>>>,
{
  for (index, element) in elements.into_iter().enumerate() {
    let record = FragmentRecord {
      timestamp: element.time,
      vertices: element.payload.vertices().into_iter().collect(),
      edges: element.payload.edges().into_iter().collect(),
    };
    serde_json::to_writer(&mut writer, &record).map_err(|source| LoadError::Json {
      line: index + 1,
      source,
    })?;
    writer.write_all(b"\n")?;
  }
  writer.flush()?;
  Ok(())
}

fn trip_locations<R: Read>(reader: R) -> Result<Vec<(String, String)>, LoadError> {
  let mut csv_reader = ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(Trim::All)
    .from_reader(reader);

  let mut trips = Vec::new();
  for (index, record) in csv_reader.records().enumerate() {
    let record = record?;
    let field = |column: usize| {
      record
        .get(column)
        .ok_or(LoadError::MissingColumn { record: index, column })
    };
    let pickup = format!("{},{}", field(PICKUP_LON)?, field(PICKUP_LAT)?);
    let dropoff = format!("{},{}", field(DROPOFF_LON)?, field(DROPOFF_LAT)?);
    trips.push((pickup, dropoff));
  }
  Ok(trips)
}

/// Builds one graph from every trip record.
///
/// Trips that start and end at the same location add only their vertex.
pub fn read_trip_graph<R: Read>(reader: R) -> Result<SimpleGraph<String>, LoadError> {
  let trips = trip_locations(reader)?;
  debug!(trips = trips.len(), "read trip records");
  Ok(SimpleGraph::from_parts(Vec::new(), trips))
}

/// Opens `path` and builds one graph from its trip records.
pub fn load_trip_graph(path: impl AsRef<Path>) -> Result<SimpleGraph<String>, LoadError> {
  read_trip_graph(File::open(path)?)
}

/// Turns every trip record into its own fragment, stamped `start`,
/// `start + step`, `start + 2 * step` and so on in file order.
pub fn read_trip_fragments<R: Read>(
  reader: R,
  start: Timestamp,
  step: i64,
) -> Result<Vec<StreamElement<SimpleGraph<String>>>, LoadError> {
  let mut time = start;
  let mut elements = Vec::new();
  for (pickup, dropoff) in trip_locations(reader)? {
    let graph = SimpleGraph::from_parts(Vec::new(), [(pickup, dropoff)]);
    elements.push(Timestamped::new(graph, time));
    time = time.saturating_add(step);
  }
  Ok(elements)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;
  use tempfile::NamedTempFile;

  const TRIPS: &str = "\
vendor,pickup_time,dropoff_time,passengers,distance,\
  pickup_lon,pickup_lat,rate,flag,dropoff_lon,dropoff_lat
1,t0,t1,1,0.5,-73.98,40.75,1,N,-73.99,40.73
2,t2,t3,2,1.2,-73.99,40.73,1,N,-73.95,40.78
1,t4,t5,1,0.0,-73.98,40.75,1,N,-73.98,40.75
";

  #[test]
  fn test_read_fragments_parses_lines() {
    let input = r#"{"timestamp": 1000, "vertices": ["A", "B"], "edges": [["A", "B"]]}

{"timestamp": 2000, "edges": [["B", "C"]]}
{"timestamp": 3000}
"#;
    let elements = read_fragments(Cursor::new(input)).unwrap();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[0].time, 1_000);
    assert_eq!(elements[0].payload.edge_count(), 1);
    assert!(elements[1].payload.contains_vertex(&"C".to_string()));
    assert!(elements[2].payload.is_empty());
  }

  #[test]
  fn test_read_fragments_reports_bad_line() {
    let input = "{\"timestamp\": 1}\nnot json\n";
    let err = read_fragments(Cursor::new(input)).unwrap_err();
    assert!(matches!(err, LoadError::Json { line: 2, .. }));
  }

  #[test]
  fn test_fragments_survive_a_file() {
    let elements = vec![
      Timestamped::new(
        SimpleGraph::from_parts(["A".to_string()], [("B".to_string(), "C".to_string())]),
        10,
      ),
      Timestamped::new(SimpleGraph::new(), 20),
    ];
    let file = NamedTempFile::new().unwrap();
    write_fragments(file.reopen().unwrap(), &elements).unwrap();

    let loaded = load_fragments(file.path()).unwrap();
    assert_eq!(loaded, elements);
  }

  #[test]
  fn test_trip_graph_links_pickup_and_dropoff() {
    let graph = read_trip_graph(Cursor::new(TRIPS)).unwrap();
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.contains_edge(&"-73.98,40.75".to_string(), &"-73.99,40.73".to_string()));
  }

  #[test]
  fn test_trip_fragments_are_spaced_by_step() {
    let elements = read_trip_fragments(Cursor::new(TRIPS), 1_000, 500).unwrap();
    let times: Vec<_> = elements.iter().map(|e| e.time).collect();
    assert_eq!(times, vec![1_000, 1_500, 2_000]);
    assert_eq!(elements[2].payload.vertex_count(), 1);
  }

  #[test]
  fn test_short_trip_record_is_rejected() {
    let input = "a,b,c,d,e,f,g\n1,2,3,4,5,6,7\n";
    let err = read_trip_graph(Cursor::new(input)).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn { record: 0, column: 9 }));
  }

  #[test]
  fn test_load_trip_graph_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(TRIPS.as_bytes()).unwrap();
    let graph = load_trip_graph(file.path()).unwrap();
    assert_eq!(graph.vertex_count(), 3);
  }
}
