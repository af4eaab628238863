//! Task status values and the transition table.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but work has not started.
    #[default]
    Todo,
    /// Task is being worked on.
    InProgress,
    /// Task is awaiting review.
    InReview,
    /// Task has been completed.
    Done,
    /// Completed task moved out of the active board.
    Archived,
    /// Task has been abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Every status, in board order.
    pub const ALL: [Self; 6] = [
        Self::Todo,
        Self::InProgress,
        Self::InReview,
        Self::Done,
        Self::Archived,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Done => "done",
            Self::Archived => "archived",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns the label recorded in history entries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "InProgress",
            Self::InReview => "InReview",
            Self::Done => "Done",
            Self::Archived => "Archived",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns `true` when no transition may leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` when the transition table permits `self -> target`.
    ///
    /// `Cancelled` is reachable from every non-terminal status and `Archived`
    /// only from `Done`. Staying in the same status is never a transition.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Cancelled, _) => false,
            (_, Self::Cancelled) => true,
            (Self::Done, Self::Archived) => true,
            (_, Self::Archived) => false,
            (Self::Todo, Self::InProgress)
            | (Self::InProgress, Self::InReview | Self::Todo)
            | (Self::InReview, Self::Done | Self::InProgress)
            | (Self::Done, Self::InProgress) => true,
            _ => false,
        }
    }

    /// Returns the statuses reachable from `self` in one step.
    #[must_use]
    pub fn allowed_targets(self) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|target| self.can_transition_to(*target))
            .collect()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "todo" | "to_do" => Ok(Self::Todo),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "in_review" | "inreview" => Ok(Self::InReview),
            "done" => Ok(Self::Done),
            "archived" => Ok(Self::Archived),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}
