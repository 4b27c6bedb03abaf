use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::config::parse_base_url;

pub struct UrlCommand;

#[async_trait]
impl Command for UrlCommand {
    fn name(&self) -> &str {
        "/url"
    }

    fn usage(&self) -> &str {
        "[URL]"
    }

    fn description(&self) -> &str {
        "show or change the feasibility service base URL"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        if args.is_empty() {
            println!("  {}", info.settings.base_url);
            return CommandResult::Handled;
        }

        match parse_base_url(args) {
            Ok(url) if url == info.settings.base_url => {
                println!("  already using {url}");
                CommandResult::Handled
            }
            Ok(url) => CommandResult::StateChanged(StateChange::BaseUrl(url)),
            Err(e) => {
                eprintln!("  ✗ {e}");
                CommandResult::Handled
            }
        }
    }
}
