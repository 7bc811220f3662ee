use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: usize = 7;

/// Column headings for a Sunday-first week.
pub const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] =
    ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Sunday on or before `date`. Does not depend on the host locale.
///
/// `None` when that Sunday precedes `NaiveDate::MIN`.
pub fn week_anchor(date: NaiveDate) -> Option<NaiveDate> {
    let offset = i64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_signed(Duration::days(offset))
}

/// The seven consecutive dates of the Sunday-first week containing `date`.
///
/// `None` when part of that week falls outside chrono's date range.
pub fn week_of(date: NaiveDate) -> Option<[NaiveDate; DAYS_PER_WEEK]> {
    let anchor = week_anchor(date)?;
    let mut days = [anchor; DAYS_PER_WEEK];
    let mut current = anchor;
    for slot in days.iter_mut().skip(1) {
        current = current.succ_opt()?;
        *slot = current;
    }
    Some(days)
}

/// Pages `date` by whole weeks; negative values go back in time.
pub fn shift_week(date: NaiveDate, weeks: i32) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::weeks(i64::from(weeks)))
}

pub fn day_number(date: NaiveDate) -> u32 {
    date.day()
}

pub fn is_week_start(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekView {
    days: [NaiveDate; DAYS_PER_WEEK],
}

impl WeekView {
    pub fn containing(date: NaiveDate) -> Option<Self> {
        week_of(date).map(|days| Self { days })
    }

    pub fn anchor(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.days[DAYS_PER_WEEK - 1]
    }

    pub fn days(&self) -> &[NaiveDate; DAYS_PER_WEEK] {
        &self.days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.anchor()..=self.last()).contains(&date)
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }
}

/// Reference date the tracker pages around. Seeded explicitly so the model
/// never consults the clock on its own.
///
/// The reference always lies in a complete week; moves that would leave the
/// calendar without one are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCursor {
    reference: NaiveDate,
    week: WeekView,
}

impl CalendarCursor {
    pub fn new(reference: NaiveDate) -> Option<Self> {
        let week = WeekView::containing(reference)?;
        Some(Self { reference, week })
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn week(&self) -> WeekView {
        self.week
    }

    /// Returns the new reference, or `None` with the cursor left in place.
    pub fn shift(&mut self, weeks: i32) -> Option<NaiveDate> {
        let target = shift_week(self.reference, weeks)?;
        self.jump_to(target).then_some(target)
    }

    pub fn next_week(&mut self) -> Option<NaiveDate> {
        self.shift(1)
    }

    pub fn previous_week(&mut self) -> Option<NaiveDate> {
        self.shift(-1)
    }

    pub fn jump_to(&mut self, date: NaiveDate) -> bool {
        match Self::new(date) {
            Some(moved) => {
                *self = moved;
                true
            }
            None => false,
        }
    }
}
