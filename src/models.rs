//! Core data structures for the extraction pipeline
//!
//! The three lifetimes matter here: [`Task`]s are immutable inputs enumerated
//! once from the catalog snapshot, [`TextBlock`]s live only inside a single
//! extraction call, and [`WorkflowRecord`]s are append-only outputs keyed by
//! `source_url`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of extraction work: a single section of a manual
///
/// `source_url` is the stable identity key used for dedup; `manual_name`
/// carries the brand/model/document lineage through to the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Section title as listed in the manual's table of contents
    pub title: String,

    /// Page URL the section content is rendered at (primary identity)
    pub source_url: String,

    /// Denormalized manual lineage, e.g. "Marine 10-M – Owner's Manual"
    pub manual_name: String,
}

impl Task {
    /// Output name for the workflow derived from this task
    pub fn workflow_name(&self) -> String {
        format!("{} – {}", self.title, self.manual_name)
    }
}

/// A positioned text fragment extracted from a rendered manual page
///
/// `top`/`left` exist only to reconstruct reading order; `font_size` feeds the
/// heading filter. Defaults (0, 0, 16) apply when the inline style omits a
/// property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub text: String,
    pub top: i32,
    pub left: i32,
    pub font_size: i32,
}

/// Extraction output for one task, as persisted in the checkpoint file
///
/// Invariant: `source_url` is unique across the whole checkpoint set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    /// Derived from the task title and manual lineage
    pub workflow_name: String,

    /// Filtered text blocks in reading order
    pub steps: Vec<String>,

    /// Origin tag for downstream tooling, e.g. "ManualsLib"
    pub source: String,

    /// Dedup key, equal to the task's `source_url`
    pub source_url: String,

    /// When the extraction completed
    pub extracted_at: DateTime<Utc>,
}

impl WorkflowRecord {
    /// Build a record from a task and its extracted steps
    pub fn new(task: &Task, steps: Vec<String>, source: &str) -> Self {
        Self {
            workflow_name: task.workflow_name(),
            steps,
            source: source.to_string(),
            source_url: task.source_url.clone(),
            extracted_at: Utc::now(),
        }
    }

    /// Records with no steps exist only under the record-empty policy
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
