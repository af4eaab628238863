//! Project access rule consumed by every task mutation.

use super::{ProjectId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a project is visible to every authenticated user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectVisibility {
    /// Only the owner and members may act on the project.
    #[default]
    Private,
    /// Any authenticated user may act on the project.
    Public,
}

/// The slice of a project the access rule needs.
///
/// The task core does not own projects. This snapshot is what an access
/// gate implementation loads to answer "may user U act on project P".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAccess {
    project_id: ProjectId,
    owner_id: UserId,
    visibility: ProjectVisibility,
    members: BTreeSet<UserId>,
}

impl ProjectAccess {
    /// Creates a private project owned by `owner_id` with no members.
    #[must_use]
    pub const fn new(project_id: ProjectId, owner_id: UserId) -> Self {
        Self {
            project_id,
            owner_id,
            visibility: ProjectVisibility::Private,
            members: BTreeSet::new(),
        }
    }

    /// Sets the project visibility.
    #[must_use]
    pub const fn with_visibility(mut self, visibility: ProjectVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Adds registered project members.
    #[must_use]
    pub fn with_members(mut self, members: impl IntoIterator<Item = UserId>) -> Self {
        self.members.extend(members);
        self
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the project owner.
    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the project visibility.
    #[must_use]
    pub const fn visibility(&self) -> ProjectVisibility {
        self.visibility
    }

    /// Returns `true` when `user_id` is a registered member.
    #[must_use]
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    /// Returns `true` when the owner, a member, or anyone on a public project
    /// is asking.
    #[must_use]
    pub fn grants(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
            || self.visibility == ProjectVisibility::Public
            || self.is_member(user_id)
    }
}
