use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::controller::View;
use crate::render::render;

pub struct LastCommand;

#[async_trait]
impl Command for LastCommand {
    fn name(&self) -> &str {
        "/last"
    }

    fn description(&self) -> &str {
        "show the most recent successful verdict again"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        match info.controller.and_then(|c| c.last_result()) {
            Some(result) => println!("{}", render(View::Result(result), info.format)),
            None => println!("  no verdict yet this session"),
        }
        CommandResult::Handled
    }
}
