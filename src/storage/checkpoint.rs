//! Checkpoint store for resumable extraction runs
//!
//! The checkpoint file is the sole source of truth for "already done": a JSON
//! array of workflow records keyed by `source_url`. It is loaded once at
//! startup, grown monotonically in memory, and flushed with a
//! write-then-rename discipline so a crash mid-write never corrupts the
//! previously committed file.
//!
//! The store is owned exclusively by the pipeline's collector task; workers
//! hand records over a channel rather than touching the set directly.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::WorkflowRecord;

/// Durable mapping of task identity to completed extraction result
#[derive(Debug)]
pub struct CheckpointStore {
    /// Durable file location
    path: PathBuf,

    /// Records in first-insertion order (the output wire format)
    records: Vec<WorkflowRecord>,

    /// source_url -> index into `records`, for O(1) membership and
    /// last-write-wins dedup
    index: HashMap<String, usize>,
}

impl CheckpointStore {
    /// Load prior durable state, or start empty when no file exists
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptCheckpoint`] when the file exists but cannot
    /// be parsed. Aborting here is deliberate: proceeding would eventually
    /// overwrite progress the operator may still be able to recover.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No prior checkpoint, starting fresh");
            return Ok(Self {
                path: path.to_path_buf(),
                records: Vec::new(),
                index: HashMap::new(),
            });
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let records: Vec<WorkflowRecord> =
            serde_json::from_reader(reader).map_err(|e| Error::CorruptCheckpoint {
                path: path.to_path_buf(),
                source: e,
            })?;

        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.source_url.clone(), i))
            .collect::<HashMap<_, _>>();

        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "Loaded prior checkpoint"
        );

        Ok(Self {
            path: path.to_path_buf(),
            records,
            index,
        })
    }

    /// Membership test used to skip already-completed tasks
    pub fn contains(&self, source_url: &str) -> bool {
        self.index.contains_key(source_url)
    }

    /// Add a record to the in-memory set
    ///
    /// Dedup on `source_url`: a recurring URL replaces the earlier record in
    /// place (last-write-wins), which should not happen in normal operation
    /// given the skip filter.
    pub fn append(&mut self, record: WorkflowRecord) {
        match self.index.get(&record.source_url) {
            Some(&i) => {
                tracing::warn!(url = %record.source_url, "Duplicate source URL, replacing record");
                self.records[i] = record;
            }
            None => {
                self.index
                    .insert(record.source_url.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Atomically persist the current full set to durable storage
    ///
    /// Writes to `<path>.tmp`, fsyncs, then renames over the checkpoint path
    /// so readers only ever observe a complete file.
    pub fn flush(&self) -> Result<()> {
        let tmp_path = self.tmp_path();

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.records)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            records = self.records.len(),
            "Checkpoint flushed"
        );

        Ok(())
    }

    /// Number of records in the set
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-insertion order
    pub fn records(&self) -> &[WorkflowRecord] {
        &self.records
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
