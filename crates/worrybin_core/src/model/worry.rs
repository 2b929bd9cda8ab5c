//! Worry domain model.
//!
//! # Responsibility
//! - Define the canonical worry record and its wire shape.
//! - Derive display-only values (`days_ago`) without persisting them.
//!
//! # Invariants
//! - `id` is non-nil, stable and unique within one collection.
//! - `text` and `timestamp` are immutable after construction.
//! - `text` is not validated; empty strings are accepted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for one worry.
pub type WorryId = Uuid;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Validation failures for worry records and collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorryValidationError {
    NilId,
    DuplicateId(WorryId),
}

impl Display for WorryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "worry id must not be nil"),
            Self::DuplicateId(id) => write!(f, "duplicate worry id in collection: {id}"),
        }
    }
}

impl Error for WorryValidationError {}

/// One user-entered worry.
///
/// Field names are the persisted wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worry {
    pub id: WorryId,
    pub text: String,
    /// Whether the user marked the worry as having come true.
    #[serde(default)]
    pub realized: bool,
    /// Creation instant in Unix epoch milliseconds.
    pub timestamp: i64,
}

impl Worry {
    /// Creates a worry with a fresh id, stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            realized: false,
            timestamp: now_epoch_ms(),
        }
    }

    /// Creates a worry with a caller-provided identity and creation time.
    ///
    /// Used by import and test paths where identity already exists.
    pub fn with_id(
        id: WorryId,
        text: impl Into<String>,
        timestamp: i64,
    ) -> Result<Self, WorryValidationError> {
        let worry = Self {
            id,
            text: text.into(),
            realized: false,
            timestamp,
        };
        worry.validate()?;
        Ok(worry)
    }

    pub fn validate(&self) -> Result<(), WorryValidationError> {
        if self.id.is_nil() {
            return Err(WorryValidationError::NilId);
        }
        Ok(())
    }

    /// Flips the realized flag and returns the new value.
    pub fn toggle_realized(&mut self) -> bool {
        self.realized = !self.realized;
        self.realized
    }

    /// Whole days elapsed between creation and `now_epoch_ms`.
    ///
    /// Counts complete 24-hour periods, truncated toward zero. Timestamps
    /// in the future produce zero or a negative count.
    pub fn days_ago_at(&self, now_epoch_ms: i64) -> i64 {
        now_epoch_ms.saturating_sub(self.timestamp) / MILLIS_PER_DAY
    }

    /// Whole days elapsed between creation and the current time.
    pub fn days_ago(&self) -> i64 {
        self.days_ago_at(now_epoch_ms())
    }
}

/// Validates every record and the collection-wide id uniqueness rule.
pub fn validate_collection(worries: &[Worry]) -> Result<(), WorryValidationError> {
    let mut seen = HashSet::with_capacity(worries.len());
    for worry in worries {
        worry.validate()?;
        if !seen.insert(worry.id) {
            return Err(WorryValidationError::DuplicateId(worry.id));
        }
    }
    Ok(())
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{validate_collection, Worry, WorryValidationError, MILLIS_PER_DAY};
    use uuid::Uuid;

    #[test]
    fn days_ago_truncates_partial_days() {
        let worry = Worry::with_id(Uuid::new_v4(), "deadline", 0).unwrap();
        assert_eq!(worry.days_ago_at(MILLIS_PER_DAY - 1), 0);
        assert_eq!(worry.days_ago_at(MILLIS_PER_DAY), 1);
        assert_eq!(worry.days_ago_at(3 * MILLIS_PER_DAY + 5), 3);
    }

    #[test]
    fn days_ago_for_future_timestamp_is_not_positive() {
        let worry = Worry::with_id(Uuid::new_v4(), "clock skew", 10 * MILLIS_PER_DAY).unwrap();
        assert!(worry.days_ago_at(0) <= 0);
    }

    #[test]
    fn collection_rejects_duplicate_ids() {
        let first = Worry::new("a");
        let mut second = Worry::new("b");
        second.id = first.id;

        let err = validate_collection(&[first.clone(), second]).unwrap_err();
        assert_eq!(err, WorryValidationError::DuplicateId(first.id));
    }
}
