//! Work item commands.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use classboard_api::HttpBoardApi;
use classboard_core::dialog::DialogScope;
use classboard_core::drag::DragAdapter;
use classboard_core::feedback::{ApprovalForm, RejectionForm};
use classboard_core::work_item::{
    AssigneeChange, WorkItemDraft, WorkItemEdit, WorkItemStatus, WorkItemType,
};
use classboard_core::{BoardController, Container, MoveOutcome, StatusOutcome};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use serde::Deserialize;
use std::path::PathBuf;

use super::{report, resolve_item, start_of_day, warn_if_stale, CommandContext};
use crate::output;

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Create a work item
    New(NewItemArgs),

    /// Create work items from a JSON file
    Import(ImportArgs),

    /// Show a work item
    Show(ItemRef),

    /// Move an item to a sprint or the backlog
    Move(MoveArgs),

    /// Change an item's status
    Status(StatusArgs),

    /// Approve an item (group leader only)
    Approve(ApproveArgs),

    /// Reject an item waiting for review (group leader only)
    Reject(RejectArgs),

    /// Edit item details
    Edit(EditArgs),

    /// Delete an item and its sub-items
    Delete(DeleteArgs),

    /// Show an item's review history
    Feedback(ItemRef),
}

#[derive(Args)]
pub struct ItemRef {
    /// Item key (WI-3) or id
    pub item: String,
}

#[derive(Args)]
pub struct NewItemArgs {
    /// Summary
    pub summary: String,

    /// Type (epic, story, task, subtask)
    #[arg(short = 't', long = "type", default_value = "task")]
    pub item_type: String,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Parent item key or id
    #[arg(long)]
    pub parent: Option<String>,

    /// Sprint id (defaults to the backlog)
    #[arg(long)]
    pub sprint: Option<u64>,

    /// Story points
    #[arg(long)]
    pub points: Option<f64>,

    /// Assignee person id
    #[arg(long)]
    pub assignee: Option<u64>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file holding an array of items
    pub file: PathBuf,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Item key (WI-3) or id
    pub item: String,

    /// Target: "backlog" or a sprint id
    pub target: String,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Item key (WI-3) or id
    pub item: String,

    /// New status (todo, in_progress, wait_for_review, done)
    pub status: String,

    /// Rating when DONE opens the approval (1-5)
    #[arg(long)]
    pub rating: Option<u8>,

    /// Approval comment
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Args)]
pub struct ApproveArgs {
    /// Item key (WI-3) or id
    pub item: String,

    /// Rating (1-5); prompted when missing
    #[arg(long)]
    pub rating: Option<u8>,

    /// Comment
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Args)]
pub struct RejectArgs {
    /// Item key (WI-3) or id
    pub item: String,

    /// Comment
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Item key (WI-3) or id
    pub item: String,

    #[arg(long)]
    pub summary: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub points: Option<f64>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Parent item key or id
    #[arg(long)]
    pub parent: Option<String>,

    /// Assignee person id (0 to unassign)
    #[arg(long)]
    pub assignee: Option<u64>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Item key (WI-3) or id
    pub item: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// One entry of an import file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ImportRow {
    #[serde(rename = "type")]
    item_type: String,
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    sprint: Option<u64>,
    #[serde(default)]
    story_points: Option<f64>,
}

type Controller = BoardController<HttpBoardApi>;

pub async fn execute(cmd: ItemCommands, ctx: &CommandContext) -> Result<()> {
    let mut controller = ctx.open_board().await?;

    match cmd {
        ItemCommands::New(args) => create(&mut controller, args).await?,
        ItemCommands::Import(args) => import(&mut controller, args).await?,

        ItemCommands::Show(args) => {
            let board = loaded(&controller)?;
            let item = resolve_item(board, &args.item)?;
            output::print_item(item, board);
        }

        ItemCommands::Move(args) => move_item(&mut controller, args).await?,

        ItemCommands::Status(args) => {
            let status = WorkItemStatus::parse(&args.status)
                .ok_or_else(|| anyhow::anyhow!("Unknown status '{}'", args.status))?;
            let item_id = item_id(&controller, &args.item)?;

            let outcome = controller
                .change_status(item_id, status)
                .await
                .map_err(report)?;
            match outcome {
                StatusOutcome::Unchanged => {
                    println!("{} Status is already {}", "·".dimmed(), status.as_str());
                }
                StatusOutcome::Updated(status) => {
                    println!(
                        "{} {} is now {}",
                        "✓".green().bold(),
                        args.item.cyan(),
                        output::status_label(status)
                    );
                }
                StatusOutcome::ApprovalRequired(dialog) => {
                    approve_in_dialog(&mut controller, dialog, args.rating, args.comment).await?;
                }
            }
        }

        ItemCommands::Approve(args) => {
            let item_id = item_id(&controller, &args.item)?;
            let outcome = controller
                .change_status(item_id, WorkItemStatus::Done)
                .await
                .map_err(report)?;
            match outcome {
                StatusOutcome::ApprovalRequired(dialog) => {
                    approve_in_dialog(&mut controller, dialog, args.rating, args.comment).await?;
                }
                _ => println!("{} {} is already done", "·".dimmed(), args.item),
            }
        }

        ItemCommands::Reject(args) => {
            let item_id = item_id(&controller, &args.item)?;
            let form = RejectionForm::new(args.comment.as_deref());
            let record = controller.reject(item_id, form).await.map_err(report)?;

            println!(
                "{} Rejected {}, back to {}",
                "✓".green().bold(),
                args.item.cyan(),
                output::status_label(classboard_core::policy::REJECTED_STATUS)
            );
            output::print_feedback(std::slice::from_ref(&record));
        }

        ItemCommands::Edit(args) => edit(&mut controller, args).await?,

        ItemCommands::Delete(args) => {
            let (item_id, key, sub_items) = {
                let board = loaded(&controller)?;
                let item = resolve_item(board, &args.item)?;
                (item.id, item.key.clone(), board.sub_items(item.id).len())
            };

            if !args.yes {
                let prompt = if sub_items > 0 {
                    format!("Delete {} and its {} sub-item(s)?", key, sub_items)
                } else {
                    format!("Delete {}?", key)
                };
                let confirmed = Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
                if !confirmed {
                    println!("{}", "Nothing deleted.".dimmed());
                    return Ok(());
                }
            }

            controller.delete_work_item(item_id).await.map_err(report)?;
            println!("{} Deleted {}", "✓".green().bold(), key.cyan());
        }

        ItemCommands::Feedback(args) => {
            let item_id = item_id(&controller, &args.item)?;
            let records = controller.feedback(item_id).await.map_err(report)?;
            output::print_feedback(&records);
        }
    }

    warn_if_stale(&controller);
    Ok(())
}

fn loaded(controller: &Controller) -> Result<&classboard_core::BoardSnapshot> {
    controller
        .snapshot()
        .ok_or_else(|| anyhow::anyhow!("Board did not load"))
}

fn item_id(controller: &Controller, reference: &str) -> Result<u64> {
    Ok(resolve_item(loaded(controller)?, reference)?.id)
}

fn parse_type(s: &str) -> Result<WorkItemType> {
    WorkItemType::parse(s).ok_or_else(|| anyhow::anyhow!("Unknown work item type '{}'", s))
}

async fn create(controller: &mut Controller, args: NewItemArgs) -> Result<()> {
    let mut draft = WorkItemDraft::new(parse_type(&args.item_type)?, args.summary);
    draft.description = args.description;
    draft.story_points = args.points;
    draft.assignee_id = args.assignee;
    draft.start_date = args.start.map(start_of_day);
    draft.end_date = args.end.map(start_of_day);
    draft.sprint_id = args.sprint;
    if let Some(parent) = &args.parent {
        draft.parent_item_id = Some(item_id(controller, parent)?);
    }

    let item = controller.create_work_item(draft).await.map_err(report)?;
    println!(
        "{} Created {} {} ({})",
        "✓".green().bold(),
        item.item_type.as_str().to_lowercase(),
        item.summary.cyan(),
        item.key.dimmed()
    );
    Ok(())
}

async fn import(controller: &mut Controller, args: ImportArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let rows: Vec<ImportRow> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of items", args.file.display()))?;

    let mut drafts = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let item_type = parse_type(&row.item_type).with_context(|| format!("row {}", i + 1))?;
        let mut draft = WorkItemDraft::new(item_type, row.summary);
        draft.description = row.description;
        draft.story_points = row.story_points;
        draft.sprint_id = row.sprint;
        if let Some(parent) = &row.parent {
            draft.parent_item_id =
                Some(item_id(controller, parent).with_context(|| format!("row {}", i + 1))?);
        }
        drafts.push(draft);
    }

    let created = controller.create_work_items(drafts).await.map_err(report)?;
    println!(
        "{} Imported {} item(s) from {}",
        "✓".green().bold(),
        created.len(),
        args.file.display().to_string().dimmed()
    );
    Ok(())
}

/// Moves run through the drag adapter so the own-container rule matches
/// a pointer drop.
async fn move_item(controller: &mut Controller, args: MoveArgs) -> Result<()> {
    let target = Container::parse(&args.target)
        .ok_or_else(|| anyhow::anyhow!("Unknown target '{}' (backlog or a sprint id)", args.target))?;

    let mut drag = DragAdapter::new();
    {
        let item = resolve_item(loaded(controller)?, &args.item)?;
        drag.on_drag_start(item);
    }
    let Some(intent) = drag.on_drag_end(Some(target)) else {
        println!("{} {} is already in {}", "·".dimmed(), args.item, target);
        return Ok(());
    };

    match controller.apply_intent(intent).await.map_err(report)? {
        MoveOutcome::Moved => println!(
            "{} Moved {} to {}",
            "✓".green().bold(),
            args.item.cyan(),
            target.to_string().cyan()
        ),
        MoveOutcome::Unchanged => println!("{} {} is already in {}", "·".dimmed(), args.item, target),
    }
    Ok(())
}

async fn edit(controller: &mut Controller, args: EditArgs) -> Result<()> {
    let target_id = item_id(controller, &args.item)?;
    let parent_item_id = match &args.parent {
        Some(parent) => Some(item_id(controller, parent)?),
        None => None,
    };

    let assignee = match args.assignee {
        Some(0) => Some(AssigneeChange::Unassign),
        Some(person_id) => {
            check_member(controller, person_id).await?;
            Some(AssigneeChange::Assign(person_id))
        }
        None => None,
    };

    let edit = WorkItemEdit {
        summary: args.summary,
        description: args.description,
        story_points: args.points,
        start_date: args.start.map(start_of_day),
        end_date: args.end.map(start_of_day),
        parent_item_id,
        assignee,
    };
    if edit.is_empty() {
        println!("{}", "Nothing to change.".dimmed());
        return Ok(());
    }

    let item = controller
        .update_work_item(target_id, edit)
        .await
        .map_err(report)?;
    println!("{} Updated {}", "✓".green().bold(), item.key.cyan());
    Ok(())
}

/// Check `person_id` against the group's member list.
async fn check_member(controller: &Controller, person_id: u64) -> Result<()> {
    let scope = DialogScope::new();
    let ticket = scope.open();
    let options = controller
        .selection_options(&scope, ticket)
        .await
        .map_err(report)?;
    scope.close();

    if let Some(options) = options {
        if !options.members.iter().any(|m| m.id == person_id) {
            anyhow::bail!("Person {} is not a member of this group", person_id);
        }
    }
    Ok(())
}

fn prompt_rating(key: &str) -> Result<Option<u8>> {
    let input: String = Input::new()
        .with_prompt(format!("Rating for {} (1-5, empty to cancel)", key))
        .allow_empty(true)
        .interact_text()
        .context("Failed to read rating")?;
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let rating = input
        .parse::<u8>()
        .with_context(|| format!("'{}' is not a rating", input))?;
    Ok(Some(rating))
}

async fn approve_in_dialog(
    controller: &mut Controller,
    dialog: classboard_core::dialog::ApprovalDialog,
    rating: Option<u8>,
    comment: Option<String>,
) -> Result<()> {
    let rating = match rating {
        Some(rating) => Some(rating),
        None => prompt_rating(&dialog.key)?,
    };
    let Some(rating) = rating else {
        controller.cancel_approval(&dialog);
        println!("{}", "Approval cancelled, nothing changed.".dimmed());
        return Ok(());
    };

    let form = ApprovalForm::new(rating, comment.as_deref());
    match controller.submit_approval(&dialog, form).await {
        Ok(record) => {
            println!(
                "{} Approved {} with rating {}",
                "✓".green().bold(),
                dialog.key.cyan(),
                rating.to_string().yellow()
            );
            output::print_feedback(std::slice::from_ref(&record));
            Ok(())
        }
        Err(e) => {
            controller.cancel_approval(&dialog);
            Err(report(e))
        }
    }
}
