//! Session context for the signed-in user.
//!
//! The session travels explicitly into the controller; nothing reads it
//! from a global.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, BoardResult};
use crate::policy::Actor;

/// Default location of the session file, relative to the working directory.
pub const SESSION_FILE: &str = ".classboard/session.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Lecturer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Self::Student),
            "lecturer" => Some(Self::Lecturer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Lecturer => "lecturer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub name: String,
    pub role: Role,
}

/// The group whose board is being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupContext {
    pub id: u64,
    pub leader_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<u64>,
    pub profile: Profile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupContext>,
}

impl Session {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            class_id: None,
            group: None,
        }
    }

    pub fn with_group(mut self, group_id: u64, leader_id: u64) -> Self {
        self.group = Some(GroupContext {
            id: group_id,
            leader_id,
        });
        self
    }

    /// The selected group, or a validation error when none is selected.
    pub fn group(&self) -> BoardResult<GroupContext> {
        self.group
            .ok_or_else(|| BoardError::validation("No group selected"))
    }

    /// Role of the current user on the current group's board.
    pub fn actor(&self) -> Actor {
        match self.group {
            Some(group) if group.leader_id == self.profile.id => Actor::Leader,
            _ => Actor::Member,
        }
    }

    pub fn load(path: &Path) -> BoardResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            BoardError::Config(format!("{}: {}", path.display(), e))
        })
    }

    pub fn save(&self, path: &Path) -> BoardResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|e| BoardError::Config(e.to_string()))?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
