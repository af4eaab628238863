//! Audit stamp shared by persisted task records.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who created, last changed and (soft-)deleted a record, and when.
///
/// `created_*` never changes after construction. `updated_*` moves on every
/// effective mutation. A present `deleted_at` means the record is logically
/// absent from normal reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Creating user.
    pub created_by: UserId,
    /// Latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// User behind the latest mutation.
    pub updated_by: UserId,
    /// Soft-deletion timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// User who soft-deleted the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<UserId>,
}

impl AuditStamp {
    /// Creates a stamp for a record created by `actor` at `timestamp`.
    #[must_use]
    pub const fn created(actor: UserId, timestamp: DateTime<Utc>) -> Self {
        Self {
            created_at: timestamp,
            created_by: actor,
            updated_at: timestamp,
            updated_by: actor,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Returns `true` when the record carries a deletion marker.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub(crate) const fn touch(&mut self, actor: UserId, timestamp: DateTime<Utc>) {
        self.updated_at = timestamp;
        self.updated_by = actor;
    }

    pub(crate) const fn mark_deleted(&mut self, actor: UserId, timestamp: DateTime<Utc>) {
        self.deleted_at = Some(timestamp);
        self.deleted_by = Some(actor);
        self.touch(actor, timestamp);
    }

    pub(crate) const fn clear_deletion(&mut self, actor: UserId, timestamp: DateTime<Utc>) {
        self.deleted_at = None;
        self.deleted_by = None;
        self.touch(actor, timestamp);
    }
}
