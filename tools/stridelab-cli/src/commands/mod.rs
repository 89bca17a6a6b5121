pub mod bouts;
pub mod gait;
pub mod gsi;
pub mod quality;
pub mod symmetry;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use stridelab_gait_model::record::{ensure_sorted, parse_records, serialize_records, Timestamped};

/// Read a JSONL file of records.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read a JSONL time series and check that it is sorted by time.
pub fn read_series<T: DeserializeOwned + Timestamped>(path: &Path) -> anyhow::Result<Vec<T>> {
    let rows: Vec<T> = read_records(path)?;
    ensure_sorted(&rows).with_context(|| format!("Invalid series in {}", path.display()))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Loaded series");
    Ok(rows)
}

/// Read an optional input file.
pub fn read_optional<T, F>(path: Option<&PathBuf>, read: F) -> anyhow::Result<Option<Vec<T>>>
where
    F: Fn(&Path) -> anyhow::Result<Vec<T>>,
{
    path.map(|p| read(p.as_path())).transpose()
}

/// Write records as JSONL to `output`, or to stdout.
pub fn write_records<T: Serialize>(output: Option<&Path>, records: &[T]) -> anyhow::Result<()> {
    let jsonl = serialize_records(records).context("Failed to serialize records")?;
    match output {
        Some(path) => std::fs::write(path, jsonl)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(jsonl.as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}
