use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_FREEZES: usize = 7;

/// How a day should be presented. Variants are listed in display priority:
/// a day that is both frozen and learned shows as frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayStatus {
    Frozen,
    Learned,
    Idle,
}

impl DayStatus {
    pub fn action_label(self) -> &'static str {
        match self {
            DayStatus::Frozen => "Freezed",
            DayStatus::Learned => "Learned Today",
            DayStatus::Idle => "Log Today as Learned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreezeOutcome {
    Frozen { used: usize },
    Unfrozen { used: usize },
    /// The quota is exhausted; nothing changed.
    QuotaReached { max: usize },
}

impl FreezeOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, FreezeOutcome::QuotaReached { .. })
    }
}

/// Learned and frozen days for one tracker session.
///
/// The two sets are independent: freezing a learned day keeps it learned.
/// Only the frozen set is bounded, by `max_freezes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakLedger {
    streaked: BTreeSet<NaiveDate>,
    frozen: BTreeSet<NaiveDate>,
    max_freezes: usize,
}

impl StreakLedger {
    pub fn new(max_freezes: usize) -> Self {
        Self {
            streaked: BTreeSet::new(),
            frozen: BTreeSet::new(),
            max_freezes,
        }
    }

    /// Returns `true` when the day was not logged before.
    pub fn log_learned(&mut self, day: NaiveDate) -> bool {
        self.streaked.insert(day)
    }

    /// Returns `true` when the day was logged.
    pub fn unlog(&mut self, day: NaiveDate) -> bool {
        self.streaked.remove(&day)
    }

    pub fn toggle_freeze(&mut self, day: NaiveDate) -> FreezeOutcome {
        if self.frozen.remove(&day) {
            return FreezeOutcome::Unfrozen {
                used: self.frozen.len(),
            };
        }
        if self.frozen.len() >= self.max_freezes {
            return FreezeOutcome::QuotaReached {
                max: self.max_freezes,
            };
        }
        self.frozen.insert(day);
        FreezeOutcome::Frozen {
            used: self.frozen.len(),
        }
    }

    pub fn is_streaked(&self, day: NaiveDate) -> bool {
        self.streaked.contains(&day)
    }

    pub fn is_frozen(&self, day: NaiveDate) -> bool {
        self.frozen.contains(&day)
    }

    pub fn status(&self, day: NaiveDate) -> DayStatus {
        if self.is_frozen(day) {
            DayStatus::Frozen
        } else if self.is_streaked(day) {
            DayStatus::Learned
        } else {
            DayStatus::Idle
        }
    }

    pub fn streak_count(&self) -> usize {
        self.streaked.len()
    }

    pub fn freeze_count(&self) -> usize {
        self.frozen.len()
    }

    pub fn max_freezes(&self) -> usize {
        self.max_freezes
    }

    pub fn freezes_remaining(&self) -> usize {
        self.max_freezes.saturating_sub(self.frozen.len())
    }

    pub fn freeze_usage_label(&self) -> String {
        format!(
            "{} out of {} freezes used",
            self.frozen.len(),
            self.max_freezes
        )
    }

    pub fn streaked_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.streaked.iter().copied()
    }

    pub fn frozen_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.frozen.iter().copied()
    }
}

impl Default for StreakLedger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FREEZES)
    }
}
