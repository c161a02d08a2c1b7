//! Board view commands.

use anyhow::Result;
use clap::Subcommand;

use super::CommandContext;
use crate::output;

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Display sprints and the backlog
    Show {
        /// Print the board as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn execute(cmd: BoardCommands, ctx: &CommandContext) -> Result<()> {
    match cmd {
        BoardCommands::Show { json } => {
            let controller = ctx.open_board().await?;
            let Some(board) = controller.snapshot() else {
                anyhow::bail!("Board did not load");
            };

            if json {
                println!("{}", serde_json::to_string_pretty(board)?);
            } else {
                output::print_board(board);
            }
        }
    }

    Ok(())
}
