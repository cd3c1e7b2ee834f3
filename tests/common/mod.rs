//! Common test utilities

use manualflow::config::Config;
use manualflow::models::Task;

/// Fetch settings tuned for tests: no jitter, tiny backoff, high rate limit
#[allow(dead_code)]
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.fetch.max_attempts = 3;
    config.fetch.base_delay_ms = 10;
    config.fetch.max_delay_ms = 50;
    config.fetch.jitter_ms = 0;
    config.fetch.requests_per_second = 1000;
    config.fetch.request_timeout_secs = 5;
    config
}

/// Create a task pointing at a mock-server path
#[allow(dead_code)]
pub fn task_for(path: &str, title: &str) -> Task {
    Task {
        title: title.to_string(),
        source_url: path.to_string(),
        manual_name: "GenMax 3500 – Owner's Manual".to_string(),
    }
}

/// Render a manual-viewer page with the given fragment markup
#[allow(dead_code)]
pub fn manual_page(fragments: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body><div class=\"pdf\">{fragments}</div></body></html>"
    )
}

/// A page with three positioned instructional steps
#[allow(dead_code)]
pub fn three_step_page() -> String {
    manual_page(concat!(
        "<div style=\"top:300px;left:40px;font-size:14px\">Allow the engine to warm up for several minutes.</div>",
        "<div style=\"top:100px;left:40px;font-size:14px\">Turn the fuel valve to the ON position.</div>",
        "<div style=\"top:200px;left:40px;font-size:14px\">Move the choke lever to the CLOSED position.</div>",
        "<div style=\"top:20px;left:40px;font-size:30px\">STARTING THE ENGINE SAFELY AND CORRECTLY</div>",
    ))
}
