use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::render::OutputFormat;

pub struct FormatCommand;

#[async_trait]
impl Command for FormatCommand {
    fn name(&self) -> &str {
        "/format"
    }

    fn usage(&self) -> &str {
        "[text|json]"
    }

    fn description(&self) -> &str {
        "show or switch how verdicts are printed"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        if args.is_empty() {
            println!("  {}", info.format);
            return CommandResult::Handled;
        }

        match args.parse::<OutputFormat>() {
            Ok(format) if format == info.format => CommandResult::Handled,
            Ok(format) => {
                println!("  ✓ printing verdicts as {format}");
                CommandResult::StateChanged(StateChange::Format(format))
            }
            Err(e) => {
                eprintln!("  ✗ {e}");
                CommandResult::Handled
            }
        }
    }
}
