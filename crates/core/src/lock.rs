// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// The lock state of an invoice's ledger.
///
/// Locking is a purely explicit gate: it is never triggered by a timer or
/// a status change, only by an authorized actor. While locked, the ledger
/// is frozen; regeneration, manual edits, and deletions are all rejected,
/// and the only permitted action is an explicit unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LockState {
    /// The ledger may be regenerated and edited.
    #[default]
    Unlocked,
    /// The ledger is frozen. Both fields record the explicit user action
    /// that applied the lock.
    Locked {
        /// When the lock was applied (ISO 8601, UTC).
        locked_at: String,
        /// The actor who applied the lock.
        locked_by: String,
    },
}

impl LockState {
    /// Returns whether the ledger is frozen.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    /// Converts this lock state to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unlocked => "unlocked",
            Self::Locked { .. } => "locked",
        }
    }

    /// Returns when the lock was applied, if locked.
    #[must_use]
    pub fn locked_at(&self) -> Option<&str> {
        match self {
            Self::Locked { locked_at, .. } => Some(locked_at),
            Self::Unlocked => None,
        }
    }

    /// Returns who applied the lock, if locked.
    #[must_use]
    pub fn locked_by(&self) -> Option<&str> {
        match self {
            Self::Locked { locked_by, .. } => Some(locked_by),
            Self::Unlocked => None,
        }
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unlocked() {
        let lock: LockState = LockState::default();
        assert!(!lock.is_locked());
        assert_eq!(lock.as_str(), "unlocked");
    }

    #[test]
    fn test_locked_records_actor_and_timestamp() {
        let lock: LockState = LockState::Locked {
            locked_at: String::from("2026-03-31T17:00:00Z"),
            locked_by: String::from("op-7"),
        };

        assert!(lock.is_locked());
        assert_eq!(lock.locked_at(), Some("2026-03-31T17:00:00Z"));
        assert_eq!(lock.locked_by(), Some("op-7"));
    }

    #[test]
    fn test_unlocked_has_no_lock_metadata() {
        let lock: LockState = LockState::Unlocked;

        assert_eq!(lock.locked_at(), None);
        assert_eq!(lock.locked_by(), None);
    }
}
