// Snapshot Store - record-per-line persistence
// The only I/O boundaries of the engine: read all records at the start,
// write all records at the end. The format is NDJSON, ordered and
// append-friendly.

use crate::entry::Entry;
use crate::record::SourceRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Reads converted source records from an NDJSON file.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<SourceRecord>> {
    read_ndjson(path.as_ref())
}

/// Writes source records to an NDJSON file.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[SourceRecord]) -> Result<()> {
    write_ndjson(path.as_ref(), records)
}

/// Reads canonical entries from an NDJSON snapshot. A missing file is an
/// empty database (the first build starts from nothing).
pub fn read_entries<P: AsRef<Path>>(path: P) -> Result<Vec<Entry>> {
    if !path.as_ref().exists() {
        return Ok(Vec::new());
    }
    read_ndjson(path.as_ref())
}

/// Writes canonical entries to an NDJSON snapshot, one entry per line.
pub fn write_entries<P: AsRef<Path>>(path: P, entries: &[Entry]) -> Result<()> {
    write_ndjson(path.as_ref(), entries)
}

fn read_ndjson<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut items = Vec::new();

    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line
            .with_context(|| format!("Failed to read {} line {}", path.display(), number + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let item: T = serde_json::from_str(&line).with_context(|| {
            format!("Invalid JSON in {} on line {}", path.display(), number + 1)
        })?;
        items.push(item);
    }

    Ok(items)
}

fn write_ndjson<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for item in items {
        let line = serde_json::to_string(item).context("Failed to serialize item")?;
        writeln!(writer, "{}", line)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{SourceSense, Wordform};

    fn create_test_record(lemma: &str) -> SourceRecord {
        SourceRecord {
            head: Wordform::new(lemma),
            lemma: Wordform::new(lemma),
            category: "NA-1".to_string(),
            senses: vec![SourceSense::new("star")],
            ..SourceRecord::default()
        }
    }

    #[test]
    fn test_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");

        let records = vec![create_test_record("acâhkos"), create_test_record("apoy")];
        write_records(&path, &records).unwrap();

        let read_back = read_records(&path).unwrap();
        assert_eq!(read_back, records);
    }

    #[test]
    fn test_entry_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.ndjson");

        let mut entry = Entry::from_record("CW", create_test_record("acâhkos"));
        entry.key = Some("acâhkos".to_string());

        write_entries(&path, &[entry.clone()]).unwrap();
        let read_back = read_entries(&path).unwrap();

        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].key, entry.key);
        assert_eq!(read_back[0].data_sources, entry.data_sources);
    }

    #[test]
    fn test_missing_snapshot_is_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let entries = read_entries(dir.path().join("absent.ndjson")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_blank_lines_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");

        let record = create_test_record("acâhkos");
        let json = serde_json::to_string(&record).unwrap();
        std::fs::write(&path, format!("{}\n\n{}\n", json, json)).unwrap();

        assert_eq!(read_records(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");
        std::fs::write(&path, "not json\n").unwrap();
        assert!(read_records(&path).is_err());
    }
}
