use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use streak_core::{
    goal::{GoalConfig, GoalEditor, Timeframe},
    notifications::{NotificationSink, SessionNotification},
    service::{PrimaryAction, StreakService},
    streak::{DayStatus, FreezeOutcome},
};

#[derive(Clone, Default)]
struct MessageLog(Arc<Mutex<Vec<SessionNotification>>>);

impl NotificationSink for MessageLog {
    fn notify(&self, notification: &SessionNotification) {
        self.0.lock().push(notification.clone());
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn onboarding_to_tracker_to_goal_edit() {
    let mut onboarding = GoalConfig::default();
    onboarding.set_topic("Rust");
    onboarding.set_timeframe(Timeframe::Week);

    let log = MessageLog::default();
    let service = StreakService::builder()
        .with_goal(onboarding)
        .starting_on(date(2026, 10, 17))
        .with_notification_sink(Box::new(log.clone()))
        .build()
        .expect("build tracker");

    assert_eq!(service.headline(), "Learning Rust");

    service.select_day(date(2026, 10, 12));
    assert_eq!(service.primary_action(), PrimaryAction::Logged(date(2026, 10, 12)));
    service.select_day(date(2026, 10, 13));
    service.primary_action();
    assert_eq!(service.streak_count(), 2);

    assert_eq!(
        service.toggle_freeze_selected(),
        Some(FreezeOutcome::Frozen { used: 1 })
    );
    assert_eq!(service.selection_status(), Some(DayStatus::Frozen));
    assert_eq!(service.primary_action_label(), "Freezed");
    assert_eq!(service.freeze_usage_label(), "1 out of 7 freezes used");

    assert_eq!(service.previous_week(), Some(date(2026, 10, 10)));
    let cells = service.week_cells();
    assert_eq!(cells[0].date, date(2026, 10, 4));
    assert!(cells.iter().all(|cell| cell.status == DayStatus::Idle));

    let mut editor = GoalEditor::for_topic(service.goal().topic());
    editor.set_topic("Rust async");
    editor.set_timeframe(Timeframe::Year);
    editor.commit(|topic| service.update_topic(topic));

    let snapshot = service.snapshot();
    assert_eq!(snapshot.goal, GoalConfig::new("Rust async", Timeframe::Week));
    assert_eq!(snapshot.streaked, vec![date(2026, 10, 12), date(2026, 10, 13)]);
    assert_eq!(snapshot.frozen, vec![date(2026, 10, 13)]);
    assert_eq!(snapshot.reference_date, date(2026, 10, 10));

    let events = log.0.lock();
    let paged_back = SessionNotification::WeekChanged {
        anchor: date(2026, 10, 4),
    };
    assert!(events.contains(&paged_back));
    assert_eq!(
        events.last(),
        Some(&SessionNotification::TopicUpdated {
            topic: "Rust async".into()
        })
    );
}

#[test]
fn quota_holds_across_weeks() {
    let service = StreakService::builder()
        .starting_on(date(2026, 10, 1))
        .build()
        .expect("build tracker");

    for day in 1..=7 {
        assert!(service.toggle_freeze(date(2026, 10, day)).is_applied());
    }
    service.next_week();
    let rejected = service.toggle_freeze(date(2026, 10, 8));
    assert_eq!(rejected, FreezeOutcome::QuotaReached { max: 7 });
    assert_eq!(service.freeze_count(), 7);

    assert!(service.toggle_freeze(date(2026, 10, 3)).is_applied());
    assert_eq!(
        service.toggle_freeze(date(2026, 10, 8)),
        FreezeOutcome::Frozen { used: 7 }
    );
}

#[test]
fn snapshot_serializes_with_iso_dates() {
    let service = StreakService::builder()
        .starting_on(date(2026, 10, 17))
        .build()
        .expect("build tracker");
    service.log_learned(date(2026, 10, 5));

    let json = serde_json::to_value(service.snapshot()).expect("serialize snapshot");
    assert_eq!(json["goal"]["topic"], "Swift");
    assert_eq!(json["goal"]["timeframe"], "Month");
    assert_eq!(json["streaked"][0], "2026-10-05");
    assert_eq!(json["week_anchor"], "2026-10-11");
    assert_eq!(json["max_freezes"], 7);

    let notification = SessionNotification::FreezeQuotaReached {
        date: date(2026, 10, 8),
        max: 7,
    };
    let json = serde_json::to_value(&notification).expect("serialize notification");
    assert_eq!(json["type"], "freeze_quota_reached");
}
