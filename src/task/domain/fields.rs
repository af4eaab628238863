//! Validated scalar values and tracked field names.

use super::{ParseTaskFieldError, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task fields observed by the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskField {
    /// Task title.
    Title,
    /// Free-form description.
    Description,
    /// Assigned user.
    Assignee,
    /// Lifecycle status.
    Status,
    /// Priority.
    Priority,
    /// Completion percentage.
    Progress,
    /// Due date.
    DueDate,
    /// Start date.
    StartDate,
    /// Estimated effort in hours.
    EstimatedHours,
    /// Actual effort in hours.
    ActualHours,
    /// Short tag list.
    Tags,
    /// Manual ordering index.
    OrderIndex,
    /// Blocked flag.
    IsBlocked,
    /// Reason for being blocked.
    BlockedReason,
    /// Parent task reference.
    ParentTask,
}

impl TaskField {
    /// Every tracked field.
    pub const ALL: [Self; 15] = [
        Self::Title,
        Self::Description,
        Self::Assignee,
        Self::Status,
        Self::Priority,
        Self::Progress,
        Self::DueDate,
        Self::StartDate,
        Self::EstimatedHours,
        Self::ActualHours,
        Self::Tags,
        Self::OrderIndex,
        Self::IsBlocked,
        Self::BlockedReason,
        Self::ParentTask,
    ];

    /// Returns the name recorded in history entries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Assignee => "Assignee",
            Self::Status => "Status",
            Self::Priority => "Priority",
            Self::Progress => "Progress",
            Self::DueDate => "DueDate",
            Self::StartDate => "StartDate",
            Self::EstimatedHours => "EstimatedHours",
            Self::ActualHours => "ActualHours",
            Self::Tags => "Tags",
            Self::OrderIndex => "OrderIndex",
            Self::IsBlocked => "IsBlocked",
            Self::BlockedReason => "BlockedReason",
            Self::ParentTask => "ParentTask",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskField {
    type Error = ParseTaskFieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseTaskFieldError(value.to_owned()))
    }
}

/// Non-empty task title of at most [`TaskTitle::MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Maximum title length in characters, after trimming.
    pub const MAX_CHARS: usize = 200;

    /// Creates a validated, trimmed title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for [`TaskField::Title`] when
    /// the trimmed value is empty or longer than [`Self::MAX_CHARS`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::validation(
                TaskField::Title,
                "title must not be empty",
            ));
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_CHARS {
            return Err(TaskDomainError::validation(
                TaskField::Title,
                format!("title has {length} characters, maximum is {}", Self::MAX_CHARS),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional long-form description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Maximum description length in characters.
    pub const MAX_CHARS: usize = 5000;

    /// Creates a validated description.
    ///
    /// Returns `Ok(None)` for blank input so that clearing a description and
    /// setting it to whitespace are the same operation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for
    /// [`TaskField::Description`] when the value exceeds [`Self::MAX_CHARS`].
    pub fn parse(value: impl Into<String>) -> Result<Option<Self>, TaskDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let length = raw.chars().count();
        if length > Self::MAX_CHARS {
            return Err(TaskDomainError::validation(
                TaskField::Description,
                format!(
                    "description has {length} characters, maximum is {}",
                    Self::MAX_CHARS
                ),
            ));
        }
        Ok(Some(Self(raw)))
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completion percentage in the closed range `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    /// Fully complete.
    pub const COMPLETE: Self = Self(100.0);

    /// Nothing done yet.
    pub const NONE: Self = Self(0.0);

    /// Creates a validated progress value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for [`TaskField::Progress`]
    /// when the value is not a finite number between 0 and 100.
    pub fn new(value: f64) -> Result<Self, TaskDomainError> {
        if !(Self::NONE.0..=Self::COMPLETE.0).contains(&value) {
            return Err(TaskDomainError::validation(
                TaskField::Progress,
                format!("progress {value} is outside 0..=100"),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw percentage.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` once the value reaches 100.
    #[must_use]
    pub fn is_complete(self) -> bool {
        self.0 >= Self::COMPLETE.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Effort in whole hours, at most [`Hours::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(u32);

impl Hours {
    /// Largest accepted effort value.
    pub const MAX: u32 = 1000;

    /// Creates a validated hour count for `field`.
    ///
    /// `field` names the attribute being set so that the error points at
    /// [`TaskField::EstimatedHours`] or [`TaskField::ActualHours`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for `field` when the value is
    /// negative or above [`Self::MAX`].
    pub fn new(field: TaskField, value: i64) -> Result<Self, TaskDomainError> {
        if value < 0 {
            return Err(TaskDomainError::validation(
                field,
                format!("hours must not be negative, got {value}"),
            ));
        }
        let hours = u32::try_from(value)
            .ok()
            .filter(|hours| *hours <= Self::MAX)
            .ok_or_else(|| {
                TaskDomainError::validation(
                    field,
                    format!("hours must not exceed {}, got {value}", Self::MAX),
                )
            })?;
        Ok(Self(hours))
    }

    /// Returns the number of hours.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short free-form tag string, for example `"backend,auth"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(String);

impl Tags {
    /// Maximum tag string length in characters.
    pub const MAX_CHARS: usize = 500;

    /// Creates a validated tag string; blank input means "no tags".
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for [`TaskField::Tags`] when
    /// the trimmed value exceeds [`Self::MAX_CHARS`].
    pub fn parse(value: impl AsRef<str>) -> Result<Option<Self>, TaskDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > Self::MAX_CHARS {
            return Err(TaskDomainError::validation(
                TaskField::Tags,
                format!("tags must not exceed {} characters", Self::MAX_CHARS),
            ));
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    /// Returns the tags as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty explanation for a blocked task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockReason(String);

impl BlockReason {
    /// Creates a validated, trimmed block reason.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] for
    /// [`TaskField::BlockedReason`] when the trimmed value is empty.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::validation(
                TaskField::BlockedReason,
                "a blocked task needs a reason",
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reason as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
