//! Startup banner and session summary.

use crate::config::Settings;
use crate::consts::{AUTHOR, REPO, format_secs};

/// Print the startup banner with the effective settings.
pub fn print_banner(settings: &Settings, store: &str) {
    println!("{}", banner_text(settings, store));
}

fn banner_text(settings: &Settings, store: &str) -> String {
    format!(
        r#"
   ┌───────────────────────────────────────┐
   │   L E A G U E   F E A S I B I L I T Y │
   │    can your team still get there?     │
   └───────────────────────────────────────┘

   version   {}
   by        {}
   repo      {}
   service   {} ({})
   timeout   {} ({})
   store     {}

   type a scenario, or /help
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        REPO,
        settings.base_url,
        settings.base_url_source,
        format_secs(settings.timeout),
        settings.timeout_source,
        store,
    )
}

/// Print how many scenarios were asked and how they ended.
pub fn print_session_summary(stats: &SessionStats) {
    if stats.submitted > 0 {
        println!(
            "session: {} scenario(s), {} answered, {} failed",
            stats.submitted, stats.succeeded, stats.failed
        );
    }
    println!("goodbye.");
}

/// Per-session counters kept by the REPL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub submitted: u32,
    pub succeeded: u32,
    pub failed: u32,
}
