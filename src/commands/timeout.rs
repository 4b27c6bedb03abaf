use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::config::parse_timeout_secs;
use crate::consts::format_secs;

pub struct TimeoutCommand;

#[async_trait]
impl Command for TimeoutCommand {
    fn name(&self) -> &str {
        "/timeout"
    }

    fn usage(&self) -> &str {
        "[SECS]"
    }

    fn description(&self) -> &str {
        "show or change how long to wait for a verdict"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        if args.is_empty() {
            println!("  {}", format_secs(info.settings.timeout));
            return CommandResult::Handled;
        }

        match parse_timeout_secs(args) {
            Ok(timeout) if timeout == info.settings.timeout => {
                println!("  already {}", format_secs(timeout));
                CommandResult::Handled
            }
            Ok(timeout) => CommandResult::StateChanged(StateChange::Timeout(timeout)),
            Err(e) => {
                eprintln!("  ✗ {e:#}");
                CommandResult::Handled
            }
        }
    }
}
