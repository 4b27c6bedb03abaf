//! Built-in REPL commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`]. The registry splits the input into a trigger and an
//! argument string, resolves aliases, and generates `/help` from the
//! registered descriptions.

mod clear;
mod config;
mod format;
mod help;
mod last;
mod quit;
mod timeout;
mod url;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Settings;
use crate::controller::Controller;
use crate::render::OutputFormat;

/// Session state visible to commands.
pub struct SessionInfo<'a> {
    pub settings: &'a Settings,
    pub format: OutputFormat,
    /// Where settings are persisted, or `None` when running without a store.
    pub db_path: Option<&'a str>,
    pub controller: Option<&'a Controller>,
}

/// A change the REPL must apply after a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// New base URL (already validated and normalised).
    BaseUrl(String),
    Timeout(Duration),
    Format(OutputFormat),
    /// Return the controller to idle.
    Clear,
}

/// What the REPL should do after a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Not a command, submit the input as a scenario.
    NotACommand,
    Handled,
    StateChanged(StateChange),
    Quit,
}

#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/url"`.
    fn name(&self) -> &str;

    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Argument synopsis for `/help`, e.g. `"[URL]"`.
    fn usage(&self) -> &str {
        ""
    }

    fn description(&self) -> &str;

    /// Run with everything after the trigger, trimmed.
    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult;
}

pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(help::HelpCommand),
            Arc::new(config::ConfigCommand),
            Arc::new(url::UrlCommand),
            Arc::new(timeout::TimeoutCommand),
            Arc::new(format::FormatCommand),
            Arc::new(last::LastCommand),
            Arc::new(clear::ClearCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, info: &SessionInfo<'_>) -> CommandResult {
        let input = input.trim();
        // Only slash commands take arguments; bare aliases must be the whole line
        let (trigger, args) = match input.split_once(char::is_whitespace) {
            Some((trigger, rest)) if trigger.starts_with('/') => (trigger, rest.trim()),
            _ => (input, ""),
        };

        for command in &self.commands {
            if trigger == command.name() || command.aliases().contains(&trigger) {
                // /help needs the registry itself
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(args, info).await;
            }
        }

        if trigger.starts_with('/') {
            println!("unknown command: {trigger}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    pub fn help_text(&self) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.usage(), c.aliases()), c.description()))
            .collect();

        let max_width = entries
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out.push_str("\n  anything else is sent as a scenario\n");
        out
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases (for duplicate detection).
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn format_label(name: &str, usage: &str, aliases: &[&str]) -> String {
    let mut label = name.to_string();
    if !usage.is_empty() {
        label.push(' ');
        label.push_str(usage);
    }
    if !aliases.is_empty() {
        label.push_str(&format!(" ({})", aliases.join(", ")));
    }
    label
}
