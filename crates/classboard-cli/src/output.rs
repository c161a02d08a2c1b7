//! Terminal output formatting.

use classboard_api::ValidationIssue;
use classboard_core::board::BoardSnapshot;
use classboard_core::feedback::{FeedbackKind, FeedbackRecord};
use classboard_core::sprint::{Sprint, SprintStatus};
use classboard_core::work_item::{WorkItem, WorkItemStatus};
use colored::{ColoredString, Colorize};
use unicode_width::UnicodeWidthStr;

/// Colored status name.
pub fn status_label(status: WorkItemStatus) -> ColoredString {
    match status {
        WorkItemStatus::ToDo => status.as_str().blue().bold(),
        WorkItemStatus::InProgress => status.as_str().yellow().bold(),
        WorkItemStatus::WaitForReview => status.as_str().magenta().bold(),
        WorkItemStatus::Done => status.as_str().green().bold(),
    }
}

fn sprint_status_label(status: SprintStatus) -> ColoredString {
    match status {
        SprintStatus::Inactive => status.as_str().dimmed(),
        SprintStatus::InProgress => status.as_str().yellow(),
        SprintStatus::Completed => status.as_str().green(),
    }
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}

/// Short column title for narrow columns.
fn column_title(status: WorkItemStatus, max_width: usize) -> String {
    let full = status.as_str();
    if UnicodeWidthStr::width(full) <= max_width {
        return full.to_string();
    }
    match status {
        WorkItemStatus::InProgress => "IN PROG".to_string(),
        WorkItemStatus::WaitForReview => "REVIEW".to_string(),
        _ => truncate_visual(full, max_width),
    }
}

/// Item card text: key then summary, padded to `width`.
fn card_text(item: &WorkItem, width: usize) -> String {
    let text = format!("{} {}", item.key, item.summary);
    pad_right(&truncate_visual(&text, width), width)
}

fn colored_card(item: &WorkItem, width: usize) -> String {
    let card = card_text(item, width);
    match item.status {
        WorkItemStatus::InProgress => card.yellow().to_string(),
        WorkItemStatus::WaitForReview => card.magenta().to_string(),
        WorkItemStatus::Done => card.green().dimmed().to_string(),
        WorkItemStatus::ToDo if item.is_lecturer_assigned() => card.cyan().to_string(),
        WorkItemStatus::ToDo => card,
    }
}

fn sprint_heading(sprint: &Sprint) -> String {
    let dates = match (sprint.start_date, sprint.end_date) {
        (Some(start), Some(end)) => format!(
            " {} → {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
        _ => String::new(),
    };
    format!(
        "{} {} {}{}",
        sprint.display_name().bold(),
        format!("#{}", sprint.id).dimmed(),
        sprint_status_label(sprint.status),
        dates.dimmed()
    )
}

/// Print every sprint as a status board, then the backlog.
pub fn print_board(board: &BoardSnapshot) {
    if board.item_count() == 0 && board.sprints.is_empty() {
        println!(
            "{}",
            "Empty board. Create items with 'classboard item new <summary>'.".dimmed()
        );
        return;
    }

    let width = term_width();
    for sprint in &board.sprints {
        println!("{}", sprint_heading(sprint));
        if width < 60 {
            print_sprint_compact(sprint);
        } else {
            print_sprint_wide(sprint, width);
        }
        println!();
    }
    print_backlog(&board.backlog);
    print_summary(board);
}

/// Side-by-side status columns.
fn print_sprint_wide(sprint: &Sprint, term_w: usize) {
    let columns: Vec<(WorkItemStatus, Vec<&WorkItem>)> = WorkItemStatus::ALL
        .iter()
        .map(|status| {
            let items = sprint
                .work_items
                .iter()
                .filter(|i| i.status == *status)
                .collect();
            (*status, items)
        })
        .collect();

    let num_cols = columns.len();
    let available = term_w.saturating_sub(num_cols + 1);
    let col_width = (available / num_cols).clamp(12, 35);

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = (0..num_cols).map(|_| "─".repeat(col_width)).collect();
        println!(
            "{}{}{}",
            left.dimmed(),
            segments.join(mid).dimmed(),
            right.dimmed()
        );
    };

    rule("┌", "┬", "┐");
    print!("{}", "│".dimmed());
    for (i, (status, items)) in columns.iter().enumerate() {
        let suffix = if items.is_empty() {
            String::new()
        } else {
            format!(" {}", items.len())
        };
        let title = column_title(*status, col_width.saturating_sub(suffix.len()));
        let plain = format!("{}{}", title, suffix);
        let padding = col_width.saturating_sub(UnicodeWidthStr::width(plain.as_str()));
        let left_pad = padding / 2;
        let header = match status {
            WorkItemStatus::ToDo => plain.blue().bold(),
            WorkItemStatus::InProgress => plain.yellow().bold(),
            WorkItemStatus::WaitForReview => plain.magenta().bold(),
            WorkItemStatus::Done => plain.green().bold(),
        };
        print!(
            "{}{}{}",
            " ".repeat(left_pad),
            header,
            " ".repeat(padding - left_pad)
        );
        if i < num_cols - 1 {
            print!("{}", "│".dimmed());
        }
    }
    println!("{}", "│".dimmed());
    rule("├", "┼", "┤");

    let max_rows = columns.iter().map(|(_, items)| items.len()).max().unwrap_or(0);
    for row in 0..max_rows {
        print!("{}", "│".dimmed());
        for (ci, (_, items)) in columns.iter().enumerate() {
            match items.get(row) {
                Some(item) => print!("{}", colored_card(item, col_width)),
                None => print!("{}", " ".repeat(col_width)),
            }
            if ci < num_cols - 1 {
                print!("{}", "│".dimmed());
            }
        }
        println!("{}", "│".dimmed());
    }
    rule("└", "┴", "┘");
}

/// Vertical layout for narrow terminals.
fn print_sprint_compact(sprint: &Sprint) {
    if sprint.work_items.is_empty() {
        println!("   {}", "no items".dimmed());
        return;
    }
    for status in WorkItemStatus::ALL {
        let items: Vec<&WorkItem> = sprint
            .work_items
            .iter()
            .filter(|i| i.status == status)
            .collect();
        if items.is_empty() {
            continue;
        }
        println!(" {} {}", "▸".dimmed(), status_label(status));
        for item in items {
            println!("   {} {}", item.key.dimmed(), item.summary);
        }
    }
}

fn print_backlog(items: &[WorkItem]) {
    println!(
        "{} {}",
        "BACKLOG".white().bold(),
        format!("{} item(s)", items.len()).dimmed()
    );
    for item in items {
        let lock = if item.is_lecturer_assigned() { "🔒" } else { "  " };
        println!(
            "  {} {:<8} {:<8} {} {}",
            lock,
            item.key.dimmed(),
            item.item_type.as_str(),
            truncate_visual(&item.summary, 48),
            status_label(item.status)
        );
    }
}

fn print_summary(board: &BoardSnapshot) {
    let total = board.item_count();
    let done = board.items().filter(|i| i.is_done()).count();
    if total > 0 {
        println!();
        println!(
            " {} {} items {} {} done ({}%)",
            "■".cyan(),
            total.to_string().bold(),
            "·".dimmed(),
            done.to_string().green(),
            (done * 100) / total
        );
    }
}

/// Print one item's details.
pub fn print_item(item: &WorkItem, board: &BoardSnapshot) {
    println!(
        "{} {} {}",
        item.key.cyan().bold(),
        item.summary.bold(),
        format!("({})", item.item_type.as_str()).dimmed()
    );
    println!();
    if let Some(description) = &item.description {
        println!("{}", description);
        println!();
    }

    let approved = if item.approved { " ✓ approved" } else { "" };
    println!("{}: {}{}", "Status".bold(), status_label(item.status), approved.green());
    println!("{}: {}", "Location".bold(), item.container());
    println!(
        "{}: {}",
        "Assignee".bold(),
        item.assignee
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "unassigned".to_string())
    );
    println!("{}: {}", "Reporter".bold(), item.reporter.name);
    if let Some(points) = item.story_points {
        println!("{}: {}", "Story points".bold(), points);
    }
    if let (Some(start), Some(end)) = (item.start_date, item.end_date) {
        println!(
            "{}: {} → {}",
            "Dates".bold(),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
    }
    if let Some(parent) = item.parent_item_id.and_then(|id| board.find_item(id)) {
        println!("{}: {} {}", "Parent".bold(), parent.key, parent.summary);
    }
    let sub_items = board.sub_items(item.id);
    if !sub_items.is_empty() {
        println!();
        println!("{}", "Sub-items".bold());
        for sub in sub_items {
            println!("  {} {} {}", sub.key.dimmed(), sub.summary, status_label(sub.status));
        }
    }
    if item.is_lecturer_assigned() {
        println!();
        println!("{}", "Assigned by the lecturer: details and deletion are locked.".cyan());
    }
}

/// Print an item's review history.
pub fn print_feedback(records: &[FeedbackRecord]) {
    if records.is_empty() {
        println!("{}", "No feedback yet.".dimmed());
        return;
    }

    for record in records {
        let kind = match record.kind {
            FeedbackKind::Approve => "APPROVED".green().bold(),
            FeedbackKind::Reject => "REJECTED".red().bold(),
        };
        let stars = record
            .rating
            .map(|r| format!(" {}", "★".repeat(r.value() as usize)).yellow().to_string())
            .unwrap_or_default();
        println!(
            "  {}{} {} {}",
            kind,
            stars,
            format!("by {}", record.author_id).dimmed(),
            record.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        if let Some(comment) = &record.comment {
            println!("    {}", comment);
        }
    }
}

/// Print a structured validation breakdown.
pub fn print_issues(issues: &[ValidationIssue]) {
    if issues.is_empty() {
        return;
    }

    eprintln!("{}", "Problems found:".red().bold());
    eprintln!("  {:<12} {:<5} {}", "Sheet", "Row", "Cause");
    eprintln!("  {}", "─".repeat(50).dimmed());
    for issue in issues {
        eprintln!(
            "  {:<12} {:<5} {}",
            issue.sheet.as_deref().unwrap_or("-"),
            issue
                .row
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            issue.cause
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncate_visual() {
        assert_eq!(truncate_visual("short", 10), "short");
        assert_eq!(truncate_visual("a long summary", 8), "a long..");
        assert_eq!(truncate_visual("abcdef", 3), "...");
    }

    #[test]
    fn test_pad_right_uses_visual_width() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(UnicodeWidthStr::width(pad_right("日本", 6).as_str()), 6);
    }

    #[test]
    fn test_column_title_abbreviates() {
        assert_eq!(column_title(WorkItemStatus::WaitForReview, 35), "WAIT FOR REVIEW");
        assert_eq!(column_title(WorkItemStatus::WaitForReview, 10), "REVIEW");
        assert_eq!(column_title(WorkItemStatus::InProgress, 8), "IN PROG");
    }
}
