//! Location records and their CSV persistence.
//!
//! Files are headerless CSV with rows of `(address, lat, lon)`, kept under
//! `locations/`. Captured images land under `buildings/`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory holding the CSV snapshots.
pub const LOCATIONS_DIR: &str = "locations";
/// Directory holding captured location images.
pub const BUILDINGS_DIR: &str = "buildings";

/// Longest file stem derived from an address.
pub const MAX_STEM_LEN: usize = 100;

/// One geocoded building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}

impl LocationRecord {
    /// Identity used by the set operations.
    pub fn address_key(&self) -> String {
        normalize_address(&self.address)
    }

    /// Exact row identity; floats compared bitwise so `-0.0` and `0.0` stay
    /// apart.
    pub fn row_key(&self) -> (String, u64, u64) {
        (self.address.clone(), self.lat.to_bits(), self.lon.to_bits())
    }
}

/// Lowercased, trimmed address text.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Read every record from a headerless CSV file. Malformed rows are logged
/// and skipped rather than failing the whole file, and exact duplicate rows
/// collapse to their first occurrence.
pub fn read_records(path: &Path) -> Result<Vec<LocationRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records: Vec<LocationRecord> = Vec::new();
    let mut seen = HashSet::new();
    for row in reader.deserialize() {
        match row {
            Ok(record) => {
                let record: LocationRecord = record;
                if seen.insert(record.row_key()) {
                    records.push(record);
                }
            }
            Err(e) => tracing::warn!("skipping malformed row in {}: {e}", path.display()),
        }
    }
    Ok(records)
}

/// Write records to a headerless CSV file, replacing any existing content.
pub fn write_records(path: &Path, records: &[LocationRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Appends records one at a time during a scan, flushing after every row so
/// an interrupted run keeps everything found so far.
pub struct RecordWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    written: usize,
}

impl RecordWriter {
    pub fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        Ok(Self {
            writer,
            path,
            written: 0,
        })
    }

    pub fn append(&mut self, record: &LocationRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Smallest-index unused `<prefix>{N}.csv` path under `dir`.
pub fn unique_csv_path(dir: &Path, prefix: &str) -> PathBuf {
    let mut index = 0usize;
    loop {
        let candidate = dir.join(format!("{prefix}{index}.csv"));
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

/// Replace characters that are unsafe in file names and clamp the length.
pub fn sanitize_file_stem(text: &str, max_len: usize) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .take(max_len)
        .collect();
    cleaned.trim().to_string()
}

/// Unique PNG path for `stem` under `dir`, suffixing `_{k}` on collision.
///
/// The returned path is reserved by creating the file exclusively, so
/// concurrent callers with the same stem get distinct paths instead of
/// overwriting each other.
pub fn unique_png_path(dir: &Path, stem: &str) -> Result<PathBuf> {
    let mut candidate = dir.join(format!("{stem}.png"));
    let mut index = 1usize;
    loop {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                candidate = dir.join(format!("{stem}_{index}.png"));
                index += 1;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to reserve {}", candidate.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<LocationRecord> {
        vec![
            LocationRecord {
                address: "1 Alpha St".into(),
                lat: 48.85,
                lon: 2.29,
            },
            LocationRecord {
                address: "2 Beta Ave, Unit \"B\"".into(),
                lat: -33.86,
                lon: 151.20,
            },
        ]
    }

    #[test]
    fn test_csv_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_records(&path, &sample()).unwrap();
        let back = read_records(&path).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_record_writer_appends_incrementally() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.csv");
        let mut writer = RecordWriter::create(path.clone()).unwrap();
        for record in sample() {
            writer.append(&record).unwrap();
        }
        assert_eq!(writer.written(), 2);
        assert_eq!(read_records(&path).unwrap(), sample());
    }

    #[test]
    fn test_read_skips_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mixed.csv");
        std::fs::write(&path, "1 Alpha St,48.85,2.29\nonly-an-address\n").unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, "1 Alpha St");
    }

    #[test]
    fn test_read_collapses_exact_duplicate_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dupes.csv");
        std::fs::write(
            &path,
            "1 Alpha St,1.0,2.0\n1 Alpha St,1.0,2.0\n1 Alpha St,1.5,2.0\n",
        )
        .unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lat, 1.0);
        assert_eq!(records[1].lat, 1.5);
    }

    #[test]
    fn test_unique_csv_path_picks_first_free_index() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            unique_csv_path(dir.path(), "locations"),
            dir.path().join("locations0.csv")
        );
        std::fs::write(dir.path().join("locations0.csv"), "").unwrap();
        assert_eq!(
            unique_csv_path(dir.path(), "locations"),
            dir.path().join("locations1.csv")
        );
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("a<b:c/d", 100), "a_b_c_d");
        assert_eq!(sanitize_file_stem("  padded  ", 100), "padded");
        let long = "x".repeat(300);
        assert_eq!(sanitize_file_stem(&long, 100).len(), 100);
    }

    #[test]
    fn test_unique_png_path_suffixes_on_collision() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("home.png"), "").unwrap();
        assert_eq!(
            unique_png_path(dir.path(), "home").unwrap(),
            dir.path().join("home_1.png")
        );
    }

    #[test]
    fn test_unique_png_path_reserves_the_file() {
        let dir = TempDir::new().unwrap();
        let first = unique_png_path(dir.path(), "home").unwrap();
        assert!(first.exists(), "path was not reserved");
        // A second caller with the same stem must not reuse the path, even
        // though nothing has been written to it yet.
        let second = unique_png_path(dir.path(), "home").unwrap();
        assert_eq!(first, dir.path().join("home.png"));
        assert_eq!(second, dir.path().join("home_1.png"));
    }

    #[test]
    fn test_address_key_normalizes() {
        let record = LocationRecord {
            address: "  12 High ST  ".into(),
            lat: 0.0,
            lon: 0.0,
        };
        assert_eq!(record.address_key(), "12 high st");
    }
}
