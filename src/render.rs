//! Turning a controller [`View`] into terminal output.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde_json::json;

use crate::consts::format_percent;
use crate::controller::View;
use crate::query::{FeasibilityResult, Outcome};

const IDLE_HINT: &str = "enter a scenario, e.g. \"Can Man United still make top 4?\"";

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format: {other} (expected text or json)")),
        }
    }
}

/// Render exactly one of idle, loading, error, or result.
pub fn render(view: View<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(view),
        OutputFormat::Json => render_json(view),
    }
}

fn render_text(view: View<'_>) -> String {
    match view {
        View::Idle => IDLE_HINT.to_string(),
        View::Loading(query) => format!(
            "running simulation for \"{}\"... this may take a few moments",
            query.text()
        ),
        View::Error(err) => format!("✗ {err}"),
        View::Result(result) => render_result(result),
    }
}

/// Every view renders as one object tagged with `state`; a verdict sits
/// under `result`.
fn render_json(view: View<'_>) -> String {
    let value = match view {
        View::Idle => json!({ "state": "idle" }),
        View::Loading(query) => json!({ "state": "pending", "scenario": query.text() }),
        View::Error(err) => json!({
            "state": "failed",
            "error": { "kind": err.kind().to_string(), "message": err.to_string() },
        }),
        View::Result(result) => match serde_json::to_value(result) {
            Ok(result) => json!({ "state": "success", "result": result }),
            Err(e) => json!({
                "state": "failed",
                "error": { "kind": "render", "message": e.to_string() },
            }),
        },
    };
    format!("{value:#}")
}

fn render_result(result: &FeasibilityResult) -> String {
    let mut out = String::new();

    let verdict = if result.feasible { "yes" } else { "no" };
    out.push_str(&format!("  feasible     {verdict}\n"));
    out.push_str(&format!(
        "  probability  {}\n",
        format_percent(result.probability)
    ));
    match (&result.target_team, result.target_rank) {
        (Some(team), Some(rank)) => {
            out.push_str(&format!("  target       {team} in the top {rank}\n"))
        }
        (Some(team), None) => out.push_str(&format!("  target       {team}\n")),
        _ => {}
    }

    out.push_str("\n  explanation\n");
    for line in result.explanation.lines() {
        out.push_str(&format!("    {line}\n"));
    }

    out.push_str("\n  required outcomes\n");
    out.push_str(&render_outcomes(&result.outcomes, true));

    if !result.fixed_outcomes.is_empty() {
        out.push_str("\n  fixed by scenario\n");
        out.push_str(&render_outcomes(&result.fixed_outcomes, false));
    }

    out
}

fn render_outcomes(outcomes: &[Outcome], numbered: bool) -> String {
    if outcomes.is_empty() {
        return "    (none)\n".to_string();
    }
    let width = outcomes
        .iter()
        .map(|o| o.fixture.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        let bullet = if numbered {
            format!("{}.", i + 1)
        } else {
            "-".to_string()
        };
        out.push_str(&format!(
            "    {bullet} {:<width$}  {}\n",
            outcome.fixture, outcome.result
        ));
    }
    out
}
