use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::consts::format_secs;

pub struct ConfigCommand;

#[async_trait]
impl Command for ConfigCommand {
    fn name(&self) -> &str {
        "/config"
    }

    fn description(&self) -> &str {
        "show the service URL, timeout, and where they came from"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let settings = info.settings;
        println!(
            "  url       {} ({})",
            settings.base_url, settings.base_url_source
        );
        println!(
            "  timeout   {} ({})",
            format_secs(settings.timeout),
            settings.timeout_source
        );
        println!("  format    {}", info.format);
        println!("  store     {}", info.db_path.unwrap_or("none"));
        if let Some(controller) = info.controller {
            println!("  endpoint  {}", controller.service().describe());
            println!("  state     {}", controller.state().kind());
        }
        CommandResult::Handled
    }
}
