use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    calendar::{self, CalendarCursor, WeekView},
    goal::GoalConfig,
    notifications::{NotificationSink, SessionNotification},
    streak::{DayStatus, FreezeOutcome, StreakLedger, DEFAULT_MAX_FREEZES},
};

/// Everything a calendar cell needs to render one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day_number: u32,
    pub status: DayStatus,
    pub is_streaked: bool,
    pub is_frozen: bool,
    pub is_selected: bool,
    /// False until the first day has been tapped in this session.
    pub emphasized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Logged(NaiveDate),
    Unlogged(NaiveDate),
    NoSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub goal: GoalConfig,
    pub reference_date: NaiveDate,
    pub week_anchor: NaiveDate,
    pub streaked: Vec<NaiveDate>,
    pub frozen: Vec<NaiveDate>,
    pub selected: Option<NaiveDate>,
    pub max_freezes: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Selection {
    day: Option<NaiveDate>,
    touched: bool,
}

#[derive(Debug, Clone)]
struct TrackerState {
    goal: GoalConfig,
    cursor: CalendarCursor,
    ledger: StreakLedger,
    selection: Selection,
}

pub struct StreakService {
    state: RwLock<TrackerState>,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

impl std::fmt::Debug for StreakService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreakService")
            .field("state", &self.state)
            .field("notification_sink", &self.notification_sink.is_some())
            .finish()
    }
}

pub struct StreakServiceBuilder {
    goal: GoalConfig,
    reference_date: Option<NaiveDate>,
    max_freezes: usize,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

impl StreakServiceBuilder {
    pub fn new() -> Self {
        Self {
            goal: GoalConfig::default(),
            reference_date: None,
            max_freezes: DEFAULT_MAX_FREEZES,
            notification_sink: None,
        }
    }

    pub fn with_goal(mut self, goal: GoalConfig) -> Self {
        self.goal = goal;
        self
    }

    /// The date the calendar opens on, normally "today".
    pub fn starting_on(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_max_freezes(mut self, max_freezes: usize) -> Self {
        self.max_freezes = max_freezes;
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<StreakService> {
        let reference = self
            .reference_date
            .ok_or_else(|| anyhow!("tracker needs a reference date to open on"))?;
        let cursor = CalendarCursor::new(reference)
            .ok_or_else(|| anyhow!("no complete week around {reference}"))?;
        info!(
            topic = %self.goal.topic,
            timeframe = %self.goal.timeframe,
            %reference,
            max_freezes = self.max_freezes,
            "starting streak session"
        );
        Ok(StreakService {
            state: RwLock::new(TrackerState {
                goal: self.goal,
                cursor,
                ledger: StreakLedger::new(self.max_freezes),
                selection: Selection::default(),
            }),
            notification_sink: self.notification_sink,
        })
    }
}

impl Default for StreakServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreakService {
    pub fn builder() -> StreakServiceBuilder {
        StreakServiceBuilder::new()
    }

    pub fn goal(&self) -> GoalConfig {
        self.state.read().goal.clone()
    }

    pub fn headline(&self) -> String {
        self.state.read().goal.headline()
    }

    /// Target of the edit screen's commit. The timeframe is left alone.
    #[instrument(skip(self))]
    pub fn update_topic(&self, topic: &str) {
        self.state.write().goal.set_topic(topic);
        self.emit(SessionNotification::TopicUpdated {
            topic: topic.to_string(),
        });
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.state.read().cursor.reference()
    }

    pub fn week(&self) -> WeekView {
        self.state.read().cursor.week()
    }

    /// Pages the calendar. `None` leaves it where it was, which only happens
    /// at the edges of the supported date range.
    pub fn shift_week(&self, weeks: i32) -> Option<NaiveDate> {
        let moved = {
            let mut state = self.state.write();
            state
                .cursor
                .shift(weeks)
                .map(|reference| (reference, state.cursor.week().anchor()))
        };
        let Some((reference, anchor)) = moved else {
            warn!(weeks, "calendar is at the edge of the date range");
            return None;
        };
        debug!(weeks, %reference, "paged calendar");
        self.emit(SessionNotification::WeekChanged { anchor });
        Some(reference)
    }

    pub fn next_week(&self) -> Option<NaiveDate> {
        self.shift_week(1)
    }

    pub fn previous_week(&self) -> Option<NaiveDate> {
        self.shift_week(-1)
    }

    pub fn jump_to(&self, date: NaiveDate) -> bool {
        let anchor = {
            let mut state = self.state.write();
            state
                .cursor
                .jump_to(date)
                .then(|| state.cursor.week().anchor())
        };
        let Some(anchor) = anchor else {
            warn!(%date, "no complete week around date");
            return false;
        };
        debug!(%date, "calendar moved");
        self.emit(SessionNotification::WeekChanged { anchor });
        true
    }

    pub fn week_cells(&self) -> Vec<DayCell> {
        let state = self.state.read();
        state
            .cursor
            .week()
            .iter()
            .map(|date| DayCell {
                date,
                day_number: calendar::day_number(date),
                status: state.ledger.status(date),
                is_streaked: state.ledger.is_streaked(date),
                is_frozen: state.ledger.is_frozen(date),
                is_selected: state.selection.day == Some(date),
                emphasized: state.selection.touched,
            })
            .collect()
    }

    pub fn select_day(&self, date: NaiveDate) {
        let mut state = self.state.write();
        state.selection = Selection {
            day: Some(date),
            touched: true,
        };
        debug!(%date, status = ?state.ledger.status(date), "day selected");
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        self.state.read().selection.day
    }

    /// Status of the selected day, read from the ledger on every call.
    pub fn selection_status(&self) -> Option<DayStatus> {
        let state = self.state.read();
        state.selection.day.map(|day| state.ledger.status(day))
    }

    pub fn primary_action_label(&self) -> &'static str {
        self.selection_status()
            .unwrap_or(DayStatus::Idle)
            .action_label()
    }

    #[instrument(skip(self))]
    pub fn log_learned(&self, date: NaiveDate) -> bool {
        let inserted = self.state.write().ledger.log_learned(date);
        if inserted {
            debug!("day logged");
            self.emit(SessionNotification::DayLogged { date });
        }
        inserted
    }

    #[instrument(skip(self))]
    pub fn unlog(&self, date: NaiveDate) -> bool {
        let removed = {
            let mut state = self.state.write();
            if state.selection.day == Some(date) {
                state.selection.day = None;
            }
            state.ledger.unlog(date)
        };
        if removed {
            debug!("day unlogged");
            self.emit(SessionNotification::DayUnlogged { date });
        }
        removed
    }

    /// Logs the selected day, or unlogs it when it is already in the streak.
    pub fn primary_action(&self) -> PrimaryAction {
        let (selected, streaked) = {
            let state = self.state.read();
            match state.selection.day {
                Some(day) => (day, state.ledger.is_streaked(day)),
                None => return PrimaryAction::NoSelection,
            }
        };
        if streaked {
            self.unlog(selected);
            PrimaryAction::Unlogged(selected)
        } else {
            self.log_learned(selected);
            PrimaryAction::Logged(selected)
        }
    }

    #[instrument(skip(self))]
    pub fn toggle_freeze(&self, date: NaiveDate) -> FreezeOutcome {
        let (outcome, max) = {
            let mut state = self.state.write();
            let outcome = state.ledger.toggle_freeze(date);
            (outcome, state.ledger.max_freezes())
        };
        let notification = match outcome {
            FreezeOutcome::Frozen { used } => SessionNotification::DayFrozen { date, used, max },
            FreezeOutcome::Unfrozen { used } => {
                SessionNotification::DayUnfrozen { date, used, max }
            }
            FreezeOutcome::QuotaReached { max } => {
                warn!(max, "cannot freeze more days, quota reached");
                SessionNotification::FreezeQuotaReached { date, max }
            }
        };
        self.emit(notification);
        outcome
    }

    pub fn toggle_freeze_selected(&self) -> Option<FreezeOutcome> {
        let selected = self.selected_day()?;
        Some(self.toggle_freeze(selected))
    }

    pub fn streak_count(&self) -> usize {
        self.state.read().ledger.streak_count()
    }

    pub fn freeze_count(&self) -> usize {
        self.state.read().ledger.freeze_count()
    }

    pub fn max_freezes(&self) -> usize {
        self.state.read().ledger.max_freezes()
    }

    pub fn freeze_usage_label(&self) -> String {
        self.state.read().ledger.freeze_usage_label()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            goal: state.goal.clone(),
            reference_date: state.cursor.reference(),
            week_anchor: state.cursor.week().anchor(),
            streaked: state.ledger.streaked_days().collect(),
            frozen: state.ledger.frozen_days().collect(),
            selected: state.selection.day,
            max_freezes: state.ledger.max_freezes(),
        }
    }
}

impl StreakService {
    fn emit(&self, notification: SessionNotification) {
        if let Some(sink) = &self.notification_sink {
            sink.notify(&notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use parking_lot::Mutex;

    use super::*;
    use crate::goal::Timeframe;

    fn oct(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<SessionNotification>>>);

    impl NotificationSink for Recorder {
        fn notify(&self, notification: &SessionNotification) {
            self.0.lock().push(notification.clone());
        }
    }

    fn service() -> StreakService {
        StreakService::builder()
            .starting_on(oct(17))
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_reference_date() {
        assert!(StreakService::builder().build().is_err());
    }

    #[test]
    fn primary_action_logs_then_unlogs_selection() {
        let service = service();
        assert_eq!(service.primary_action(), PrimaryAction::NoSelection);

        service.select_day(oct(14));
        assert_eq!(service.primary_action_label(), "Log Today as Learned");
        assert_eq!(service.primary_action(), PrimaryAction::Logged(oct(14)));
        assert_eq!(service.primary_action_label(), "Learned Today");
        assert_eq!(service.streak_count(), 1);

        assert_eq!(service.primary_action(), PrimaryAction::Unlogged(oct(14)));
        assert_eq!(service.selected_day(), None);
        assert_eq!(service.streak_count(), 0);
    }

    #[test]
    fn reselecting_a_logged_day_shows_its_status() {
        let service = service();
        service.log_learned(oct(12));
        service.select_day(oct(13));
        service.select_day(oct(12));
        assert_eq!(service.selection_status(), Some(DayStatus::Learned));
    }

    #[test]
    fn frozen_wins_over_learned_in_cells() {
        let service = service();
        service.log_learned(oct(15));
        service.toggle_freeze(oct(15));
        let cell = service
            .week_cells()
            .into_iter()
            .find(|cell| cell.date == oct(15))
            .unwrap();
        assert_eq!(cell.status, DayStatus::Frozen);
        assert!(cell.is_streaked && cell.is_frozen);
        assert!(!cell.emphasized);
    }

    #[test]
    fn cells_cover_the_reference_week() {
        let service = service();
        service.select_day(oct(16));
        let cells = service.week_cells();
        let numbers: Vec<u32> = cells.iter().map(|cell| cell.day_number).collect();
        assert_eq!(numbers, vec![11, 12, 13, 14, 15, 16, 17]);
        assert!(cells.iter().all(|cell| cell.emphasized));
        assert_eq!(cells.iter().filter(|cell| cell.is_selected).count(), 1);
    }

    #[test]
    fn quota_rejection_is_reported_to_sink() {
        let recorder = Recorder::default();
        let service = StreakService::builder()
            .starting_on(oct(17))
            .with_max_freezes(1)
            .with_notification_sink(Box::new(recorder.clone()))
            .build()
            .unwrap();

        assert!(service.toggle_freeze(oct(1)).is_applied());
        let outcome = service.toggle_freeze(oct(2));
        assert_eq!(outcome, FreezeOutcome::QuotaReached { max: 1 });
        assert_eq!(service.freeze_usage_label(), "1 out of 1 freezes used");

        let events = recorder.0.lock();
        assert_eq!(
            events.last(),
            Some(&SessionNotification::FreezeQuotaReached {
                date: oct(2),
                max: 1
            })
        );
    }

    #[test]
    fn update_topic_keeps_timeframe() {
        let service = StreakService::builder()
            .with_goal(GoalConfig::new("Swift", Timeframe::Year))
            .starting_on(oct(17))
            .build()
            .unwrap();
        service.update_topic("Rust");
        assert_eq!(service.goal(), GoalConfig::new("Rust", Timeframe::Year));
        assert_eq!(service.headline(), "Learning Rust");
    }

    #[test]
    fn paging_moves_reference_by_weeks() {
        let service = service();
        assert_eq!(service.next_week(), Some(oct(24)));
        assert_eq!(service.week().anchor(), oct(18));
        assert_eq!(service.previous_week(), Some(oct(17)));
        assert!(service.jump_to(oct(1)));
        assert_eq!(service.week().anchor(), NaiveDate::from_ymd_opt(2026, 9, 27).unwrap());
    }

    fn last_date_with_full_week() -> NaiveDate {
        (0..14)
            .filter_map(|back| NaiveDate::MAX.checked_sub_signed(Duration::days(back)))
            .find(|date| calendar::week_of(*date).is_some())
            .unwrap()
    }

    #[test]
    fn build_rejects_reference_without_a_full_week() {
        let last = last_date_with_full_week();
        assert!(StreakService::builder().starting_on(last).build().is_ok());
        if let Some(past) = last.succ_opt() {
            let error = StreakService::builder().starting_on(past).build().unwrap_err();
            assert!(error.to_string().contains("no complete week"));
        }
    }

    #[test]
    fn paging_past_the_range_leaves_calendar_in_place() {
        let recorder = Recorder::default();
        let last = last_date_with_full_week();
        let service = StreakService::builder()
            .starting_on(last)
            .with_notification_sink(Box::new(recorder.clone()))
            .build()
            .unwrap();

        assert_eq!(service.next_week(), None);
        assert_eq!(service.reference_date(), last);
        if let Some(past) = last.succ_opt() {
            assert!(!service.jump_to(past));
        }
        assert!(recorder.0.lock().is_empty());

        assert_eq!(service.previous_week(), Some(last - Duration::weeks(1)));
        assert_eq!(recorder.0.lock().len(), 1);
    }
}
