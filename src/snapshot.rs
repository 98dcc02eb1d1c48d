//! Binary report snapshots for golden-file regression testing
//!
//! A snapshot is a zstd-compressed tar archive holding two entries:
//! `metadata.json` (format version, creation time, payload checksum) and
//! `report.json` (the serialized [`ConsolidatedReport`]).

use crate::error::{DataDeltaError, Result};
use crate::report::ConsolidatedReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::{Archive, Builder};
use zstd::{Decoder, Encoder};

/// Extension given to snapshot files
pub const SNAPSHOT_EXTENSION: &str = "ddsnap";

const METADATA_ENTRY: &str = "metadata.json";
const REPORT_ENTRY: &str = "report.json";
const COMPRESSION_LEVEL: i32 = 3;

/// Snapshot metadata stored alongside the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub format_version: String,
    pub created: DateTime<Utc>,
    pub title: String,
    /// blake3 hex digest of the `report.json` entry
    pub checksum: String,
    pub payload_size: u64,
}

/// Save and load consolidated reports
pub struct ReportSnapshot;

impl ReportSnapshot {
    /// Path a snapshot is written to: `path` with its extension set to `.ddsnap`
    pub fn snapshot_path<P: AsRef<Path>>(path: P) -> PathBuf {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) == Some(SNAPSHOT_EXTENSION) {
            path.to_path_buf()
        } else {
            path.with_extension(SNAPSHOT_EXTENSION)
        }
    }

    /// Write `report` to a snapshot file.
    ///
    /// Returns `Ok(false)` without touching the file when it already exists and
    /// `overwrite` is not set.
    pub fn save<P: AsRef<Path>>(
        report: &ConsolidatedReport,
        path: P,
        overwrite: bool,
    ) -> Result<bool> {
        let path = Self::snapshot_path(path);

        if path.exists() && !overwrite {
            println!("File already exists: {}", path.display());
            log::warn!("Refusing to overwrite existing snapshot {}", path.display());
            return Ok(false);
        }

        let payload = serde_json::to_vec_pretty(report)?;
        let metadata = SnapshotMetadata {
            format_version: crate::FORMAT_VERSION.to_string(),
            created: Utc::now(),
            title: report.meta.title_text.clone(),
            checksum: blake3::hash(&payload).to_hex().to_string(),
            payload_size: payload.len() as u64,
        };
        let metadata_json = serde_json::to_vec_pretty(&metadata)?;

        write_archive(
            &path,
            &[
                (METADATA_ENTRY.to_string(), metadata_json),
                (REPORT_ENTRY.to_string(), payload),
            ],
        )?;

        println!("{} saved successfully.", path.display());
        log::info!("Saved report snapshot to {}", path.display());
        Ok(true)
    }

    /// Read a snapshot written by [`ReportSnapshot::save`], verifying its checksum
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ConsolidatedReport> {
        let path = path.as_ref();
        let (metadata, payload) = read_snapshot(path)?;

        let checksum = blake3::hash(&payload).to_hex().to_string();
        if checksum != metadata.checksum {
            return Err(DataDeltaError::invalid_snapshot(
                path,
                format!(
                    "checksum mismatch (expected {}, found {})",
                    metadata.checksum, checksum
                ),
            ));
        }

        let report = serde_json::from_slice(&payload).map_err(|e| {
            DataDeltaError::invalid_snapshot(path, format!("unreadable report: {}", e))
        })?;

        log::debug!("Loaded report snapshot from {}", path.display());
        Ok(report)
    }

    /// Read only the metadata of a snapshot
    pub fn load_metadata<P: AsRef<Path>>(path: P) -> Result<SnapshotMetadata> {
        read_snapshot(path.as_ref()).map(|(metadata, _)| metadata)
    }
}

fn read_snapshot(path: &Path) -> Result<(SnapshotMetadata, Vec<u8>)> {
    let entries = read_archive(path)
        .map_err(|e| DataDeltaError::invalid_snapshot(path, format!("unreadable archive: {}", e)))?;

    let mut metadata = None;
    let mut payload = None;
    for (name, content) in entries {
        match name.as_str() {
            METADATA_ENTRY => metadata = Some(content),
            REPORT_ENTRY => payload = Some(content),
            _ => log::debug!("Ignoring unexpected snapshot entry '{}'", name),
        }
    }

    let metadata = metadata
        .ok_or_else(|| DataDeltaError::invalid_snapshot(path, "missing metadata.json"))?;
    let payload =
        payload.ok_or_else(|| DataDeltaError::invalid_snapshot(path, "missing report.json"))?;

    let metadata: SnapshotMetadata = serde_json::from_slice(&metadata).map_err(|e| {
        DataDeltaError::invalid_snapshot(path, format!("unreadable metadata: {}", e))
    })?;

    if major_version(&metadata.format_version) != major_version(crate::FORMAT_VERSION) {
        return Err(DataDeltaError::invalid_snapshot(
            path,
            format!(
                "unsupported format version {} (expected {})",
                metadata.format_version,
                crate::FORMAT_VERSION
            ),
        ));
    }

    Ok((metadata, payload))
}

fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

fn write_archive(path: &Path, files: &[(String, Vec<u8>)]) -> Result<()> {
    let file = File::create(path)?;
    let mut encoder = Encoder::new(file, COMPRESSION_LEVEL)?;

    {
        let mut builder = Builder::new(&mut encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_slice())?;
        }
        builder.finish()?;
    }

    encoder.finish()?;
    Ok(())
}

fn read_archive(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(file)?;
    let mut archive = Archive::new(&mut decoder);

    let mut files = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().to_string();
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        files.push((name, content));
    }
    Ok(files)
}
