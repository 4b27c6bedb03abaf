//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Feasibility service used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://league-feasibility.onrender.com";

/// Path appended to the base URL for every scenario query.
pub const SIMULATE_PATH: &str = "/simulate/";

/// Environment variable that overrides the stored base URL.
pub const BASE_URL_ENV: &str = "FEASIBILITY_API_URL";

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV: &str = "FEASIBILITY_LOG";

/// Wire contract version sent with every request.
pub const CONTRACT_VERSION: u32 = 1;

/// Header carrying [`CONTRACT_VERSION`].
pub const CONTRACT_HEADER: &str = "x-feasibility-contract";

/// Bounded wait for a single query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default database path: `~/.feasibility/feasibility.db`.
pub fn default_db_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".feasibility").join("feasibility.db"))
}

/// Format a probability in [0, 1] as a percentage with two decimals.
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Format a duration the way error messages and the banner show it.
pub fn format_secs(duration: Duration) -> String {
    let secs = duration.as_secs();
    if duration.subsec_millis() == 0 {
        if secs == 1 {
            "1 second".to_string()
        } else {
            format!("{secs} seconds")
        }
    } else {
        format!("{:.1} seconds", duration.as_secs_f64())
    }
}
