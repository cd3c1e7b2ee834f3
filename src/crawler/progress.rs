//! Progress reporting for extraction runs
//!
//! Pure observer over the scheduler's counters. Omitting it changes nothing
//! about pipeline correctness.

use std::time::{Duration, Instant};

/// Derives human-readable progress lines from live counters
pub struct ProgressReporter {
    started: Instant,
    total: usize,
}

impl ProgressReporter {
    /// Start tracking a run over `total` pending tasks
    pub fn new(total: usize) -> Self {
        Self {
            started: Instant::now(),
            total,
        }
    }

    /// Render a progress line for the current counters
    pub fn line(&self, completed: u64, failures: u64) -> String {
        self.line_at(self.started.elapsed(), completed, failures)
    }

    /// Render a progress line at a given elapsed time (separated for tests)
    fn line_at(&self, elapsed: Duration, completed: u64, failures: u64) -> String {
        let total = self.total as u64;
        let pct = if total == 0 {
            100.0
        } else {
            completed as f64 / total as f64 * 100.0
        };

        let eta = match eta(elapsed, completed, total) {
            Some(eta) => format_duration(eta),
            None => "--".to_string(),
        };

        format!(
            "{completed}/{total} ({pct:.1}%) | elapsed {} | eta {eta} | failures {failures}",
            format_duration(elapsed),
        )
    }

    /// Total pending tasks this reporter tracks
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Remaining time estimate from average completion rate so far
fn eta(elapsed: Duration, completed: u64, total: u64) -> Option<Duration> {
    if completed == 0 || total <= completed {
        return None;
    }
    let per_task = elapsed.as_secs_f64() / completed as f64;
    Some(Duration::from_secs_f64(per_task * (total - completed) as f64))
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line_format() {
        let reporter = ProgressReporter::new(200);
        let line = reporter.line_at(Duration::from_secs(60), 50, 3);

        assert!(line.starts_with("50/200 (25.0%)"));
        assert!(line.contains("elapsed 1m00s"));
        assert!(line.contains("failures 3"));
    }

    #[test]
    fn test_eta_from_average_rate() {
        // 50 tasks in 60s leaves 150 tasks at 1.2s each
        let remaining = eta(Duration::from_secs(60), 50, 200).unwrap();
        assert_eq!(remaining.as_secs(), 180);
    }

    #[test]
    fn test_eta_undefined_before_first_completion() {
        assert!(eta(Duration::from_secs(10), 0, 200).is_none());
    }

    #[test]
    fn test_eta_undefined_when_done() {
        assert!(eta(Duration::from_secs(10), 200, 200).is_none());
    }

    #[test]
    fn test_empty_run_is_complete() {
        let reporter = ProgressReporter::new(0);
        let line = reporter.line_at(Duration::from_secs(1), 0, 0);
        assert!(line.starts_with("0/0 (100.0%)"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3720)), "1h02m");
    }
}
