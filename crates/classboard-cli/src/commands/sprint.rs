//! Sprint lifecycle commands.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use classboard_core::sprint::{Destination, SprintPlan};
use colored::Colorize;
use dialoguer::Confirm;

use super::{report, start_of_day, warn_if_stale, CommandContext};

#[derive(Subcommand)]
pub enum SprintCommands {
    /// Add a new inactive sprint
    New,

    /// Start an inactive sprint
    Start(StartArgs),

    /// Complete a running sprint
    Complete(CompleteArgs),

    /// Delete a sprint; its items return to the backlog
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct StartArgs {
    /// Sprint id
    pub sprint: u64,

    /// Sprint name
    #[arg(long)]
    pub name: Option<String>,

    /// Start date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Sprint id
    pub sprint: u64,

    /// Where unfinished items go: "backlog" or a sprint id
    #[arg(long, default_value = "backlog")]
    pub to: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Sprint id
    pub sprint: u64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

fn parse_destination(s: &str) -> Result<Destination> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("backlog") {
        return Ok(Destination::Backlog);
    }
    let id = s
        .parse::<u64>()
        .with_context(|| format!("Unknown destination '{}' (backlog or a sprint id)", s))?;
    Ok(Destination::from_id(id))
}

pub async fn execute(cmd: SprintCommands, ctx: &CommandContext) -> Result<()> {
    let mut controller = ctx.open_board().await?;

    match cmd {
        SprintCommands::New => {
            let sprint = controller.create_sprint().await.map_err(report)?;
            println!(
                "{} Created {} ({})",
                "✓".green().bold(),
                sprint.display_name().cyan(),
                format!("id {}", sprint.id).dimmed()
            );
        }

        SprintCommands::Start(args) => {
            let start = args.start.unwrap_or_else(|| Utc::now().date_naive());
            let plan = SprintPlan {
                name: args.name,
                start_date: start_of_day(start),
                end_date: start_of_day(args.end),
            };
            controller
                .start_sprint(args.sprint, plan)
                .await
                .map_err(report)?;
            println!(
                "{} Started sprint {} ({} → {})",
                "✓".green().bold(),
                args.sprint.to_string().cyan(),
                start,
                args.end
            );
        }

        SprintCommands::Complete(args) => {
            let destination = parse_destination(&args.to)?;
            let moved = controller
                .complete_sprint(args.sprint, destination)
                .await
                .map_err(report)?;
            let target = match destination {
                Destination::Backlog => "the backlog".to_string(),
                Destination::Sprint(id) => format!("sprint {}", id),
            };
            println!(
                "{} Completed sprint {}, moved {} unfinished item(s) to {}",
                "✓".green().bold(),
                args.sprint.to_string().cyan(),
                moved,
                target
            );
        }

        SprintCommands::Delete(args) => {
            if !args.yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Delete sprint {}? Its items go back to the backlog.",
                        args.sprint
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
                if !confirmed {
                    println!("{}", "Nothing deleted.".dimmed());
                    return Ok(());
                }
            }

            controller.delete_sprint(args.sprint).await.map_err(report)?;
            println!("{} Deleted sprint {}", "✓".green().bold(), args.sprint);
        }
    }

    warn_if_stale(&controller);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_destination() {
        assert_eq!(parse_destination("backlog").unwrap(), Destination::Backlog);
        assert_eq!(parse_destination("0").unwrap(), Destination::Backlog);
        assert_eq!(parse_destination(" 4 ").unwrap(), Destination::Sprint(4));
        assert!(parse_destination("next").is_err());
    }
}
