//! Task source: reads the catalog snapshot produced by the discovery crawl
//!
//! The snapshot is a JSON array of table-of-contents sections, one per manual
//! page. Enumeration is read-only and performs no network calls; a snapshot
//! that cannot be read or parsed is fatal for the whole run.

use std::path::Path;

use url::Url;

use crate::error::{Error, Result};
use crate::models::Task;

/// Section titles that never contain actionable steps (case-insensitive)
const NON_ACTIONABLE_TITLES: &[&str] = &[
    "table of contents",
    "certifications and specifications",
    "certifications",
];

/// Load the ordered task list from a catalog snapshot
///
/// Entries with a non-actionable title or an unparseable `source_url` are
/// dropped; everything else is returned in snapshot order.
///
/// # Errors
///
/// Returns [`Error::CatalogUnavailable`] when the snapshot file cannot be
/// read or is not valid JSON.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let data = std::fs::read_to_string(path).map_err(|e| Error::CatalogUnavailable {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let entries: Vec<Task> =
        serde_json::from_str(&data).map_err(|e| Error::CatalogUnavailable {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

    let total = entries.len();
    let tasks: Vec<Task> = entries.into_iter().filter(is_actionable).collect();

    tracing::info!(
        path = %path.display(),
        total,
        actionable = tasks.len(),
        "Loaded catalog snapshot"
    );

    Ok(tasks)
}

/// Whether a catalog entry describes extractable step content
fn is_actionable(task: &Task) -> bool {
    let title = task.title.trim().to_lowercase();
    if NON_ACTIONABLE_TITLES.contains(&title.as_str()) {
        tracing::debug!(title = %task.title, "Skipping non-actionable section");
        return false;
    }

    if Url::parse(&task.source_url).is_err() {
        tracing::warn!(url = %task.source_url, "Dropping task with invalid source URL");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn task(title: &str, url: &str) -> Task {
        Task {
            title: title.to_string(),
            source_url: url.to_string(),
            manual_name: "GenMax 3500 – Owner's Manual".to_string(),
        }
    }

    #[test]
    fn test_load_tasks_filters_non_actionable() {
        let entries = vec![
            task("Table of Contents", "https://example.com/m/1?page=2"),
            task("Starting The Engine", "https://example.com/m/1?page=5"),
            task("CERTIFICATIONS", "https://example.com/m/1?page=9"),
        ];

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&entries).unwrap()).unwrap();

        let tasks = load_tasks(file.path()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Starting The Engine");
    }

    #[test]
    fn test_load_tasks_drops_invalid_urls() {
        let entries = vec![
            task("Maintenance Schedule", "not a url"),
            task("Oil Change", "https://example.com/m/1?page=12"),
        ];

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&entries).unwrap()).unwrap();

        let tasks = load_tasks(file.path()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Oil Change");
    }

    #[test]
    fn test_load_tasks_preserves_order() {
        let entries = vec![
            task("First Section", "https://example.com/m/1?page=3"),
            task("Second Section", "https://example.com/m/1?page=4"),
            task("Third Section", "https://example.com/m/1?page=5"),
        ];

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&entries).unwrap()).unwrap();

        let tasks = load_tasks(file.path()).unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["First Section", "Second Section", "Third Section"]);
    }

    #[test]
    fn test_missing_snapshot_is_fatal() {
        let err = load_tasks(Path::new("/nonexistent/toc.json")).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, Error::CatalogUnavailable { .. }));
    }

    #[test]
    fn test_unparseable_snapshot_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "this is not json").unwrap();

        let err = load_tasks(file.path()).unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable { .. }));
    }
}
