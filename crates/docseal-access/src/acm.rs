//! The access control matrix: role x resource type x action.
//!
//! The matrix governs capability only; membership in a specific object's
//! recipient set is checked separately at every call site.

use serde::{Deserialize, Serialize};

/// A user holds exactly one role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Author,
    Collaborator,
    Reviewer,
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Author => "author",
            Role::Collaborator => "collaborator",
            Role::Reviewer => "reviewer",
            Role::Editor => "editor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "author" => Some(Role::Author),
            "collaborator" => Some(Role::Collaborator),
            "reviewer" => Some(Role::Reviewer),
            "editor" => Some(Role::Editor),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Paper,
    Review,
    Decision,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Paper => "paper",
            ResourceKind::Review => "review",
            ResourceKind::Decision => "decision",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Create,
    Read,
    /// Write a new payload version of an existing object.
    Append,
    /// Add a reviewer to a paper's recipient set.
    Assign,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Append => "append",
            Action::Assign => "assign",
        }
    }
}

/// The static matrix. Any triple not listed here is denied.
///
/// No side effects; call sites log and audit denials.
pub fn check(role: Role, resource: ResourceKind, action: Action) -> bool {
    use Action::*;
    use ResourceKind::*;
    use Role::*;

    matches!(
        (role, resource, action),
        (Author, Paper, Create | Read | Append)
            | (Author, Review, Read)
            | (Author, Decision, Read)
            | (Collaborator, Paper, Read | Append)
            | (Collaborator, Decision, Read)
            | (Reviewer, Paper, Read)
            | (Reviewer, Review, Create | Read)
            | (Reviewer, Decision, Read)
            | (Editor, Paper, Read | Assign)
            | (Editor, Review, Read)
            | (Editor, Decision, Create | Read)
    )
}
