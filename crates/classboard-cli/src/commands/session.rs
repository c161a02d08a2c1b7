//! Local session commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use classboard_core::session::{Profile, Role};
use classboard_core::Session;
use colored::Colorize;

use super::CommandContext;

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Set who you are and which group board you work on
    Set(SetSessionArgs),

    /// Show the current session
    Show,
}

#[derive(Args)]
pub struct SetSessionArgs {
    /// Your person id
    #[arg(long)]
    pub user_id: u64,

    /// Your display name
    #[arg(long)]
    pub name: String,

    /// Role (student, lecturer)
    #[arg(long, default_value = "student")]
    pub role: String,

    /// Group id
    #[arg(long)]
    pub group: Option<u64>,

    /// Person id of the group leader
    #[arg(long, requires = "group")]
    pub leader: Option<u64>,

    /// Class id
    #[arg(long)]
    pub class: Option<u64>,
}

pub fn execute(cmd: SessionCommands, ctx: &CommandContext) -> Result<()> {
    match cmd {
        SessionCommands::Set(args) => {
            let session = build_session(args)?;
            let path = ctx.session_path();
            session.save(&path)?;

            println!(
                "{} Session saved to {}",
                "✓".green().bold(),
                path.display().to_string().dimmed()
            );
            print_session(&session);
        }

        SessionCommands::Show => {
            let session = ctx.load_session()?;
            print_session(&session);
        }
    }

    Ok(())
}

fn build_session(args: SetSessionArgs) -> Result<Session> {
    let role = Role::parse(&args.role)
        .ok_or_else(|| anyhow::anyhow!("Unknown role '{}' (student, lecturer)", args.role))?;

    let mut session = Session::new(Profile {
        id: args.user_id,
        name: args.name,
        role,
    });
    session.class_id = args.class;
    if let Some(group) = args.group {
        session = session.with_group(group, args.leader.unwrap_or(args.user_id));
    }
    Ok(session)
}

fn print_session(session: &Session) {
    let profile = &session.profile;
    println!(
        "{}: {} ({}, {})",
        "User".bold(),
        profile.name.cyan(),
        profile.id,
        profile.role.as_str()
    );
    match session.group {
        Some(group) => println!(
            "{}: {} (leader {}) {}",
            "Group".bold(),
            group.id,
            group.leader_id,
            format!("[{:?}]", session.actor()).dimmed()
        ),
        None => println!("{}: {}", "Group".bold(), "none".dimmed()),
    }
    if let Some(class_id) = session.class_id {
        println!("{}: {}", "Class".bold(), class_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classboard_core::Actor;
    use pretty_assertions::assert_eq;

    fn args(role: &str, group: Option<u64>, leader: Option<u64>) -> SetSessionArgs {
        SetSessionArgs {
            user_id: 4,
            name: "Dana".to_string(),
            role: role.to_string(),
            group,
            leader,
            class: Some(9),
        }
    }

    #[test]
    fn test_leader_defaults_to_user() {
        let session = build_session(args("student", Some(2), None)).unwrap();
        assert_eq!(session.actor(), Actor::Leader);
        assert_eq!(session.class_id, Some(9));
    }

    #[test]
    fn test_explicit_leader() {
        let session = build_session(args("Lecturer", Some(2), Some(1))).unwrap();
        assert_eq!(session.actor(), Actor::Member);
        assert_eq!(session.profile.role, Role::Lecturer);
    }

    #[test]
    fn test_unknown_role() {
        assert!(build_session(args("admin", None, None)).is_err());
    }
}
