use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use egui::{Color32, RichText};
use parking_lot::Mutex;
use streak_core::{
    calendar::{self, WEEKDAY_LABELS},
    goal::{GoalConfig, GoalEditor, Timeframe},
    notifications::{NotificationSink, SessionNotification},
    service::{DayCell, PrimaryAction},
    streak::{DayStatus, DEFAULT_MAX_FREEZES},
    StreakService,
};
use tracing::{debug, error, info, warn};

const APP_NAME: &str = "Learning Streak";
const PICK_A_DAY: &str = "Pick a day first";
const NO_MORE_WEEKS: &str = "No more weeks in that direction";

const ORANGE: Color32 = Color32::from_rgb(0xFF, 0x9F, 0x0A);
const BLUE: Color32 = Color32::from_rgb(0x0A, 0x84, 0xFF);
const LIGHT_BLUE: Color32 = Color32::from_rgb(0xC1, 0xDD, 0xFF);
const FROZEN_FILL: Color32 = Color32::from_rgb(0x02, 0x1F, 0x3D);
const LEARNED_FILL: Color32 = Color32::from_rgb(0x42, 0x28, 0x00);
const CHIP: Color32 = Color32::from_rgb(0x2C, 0x2C, 0x2E);
const CARD_STROKE: Color32 = Color32::from_rgb(0x48, 0x48, 0x4A);
const MUTED: Color32 = Color32::from_rgb(0x8E, 0x8E, 0x93);

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) goal: GoalConfig,
    pub(crate) max_freezes: usize,
    pub(crate) today: NaiveDate,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(topic) = lookup("STREAK_TOPIC") {
            config.goal.set_topic(topic);
        }
        if let Some(raw) = lookup("STREAK_TIMEFRAME") {
            match raw.parse::<Timeframe>() {
                Ok(timeframe) => config.goal.set_timeframe(timeframe),
                Err(err) => warn!(%err, "ignoring STREAK_TIMEFRAME"),
            }
        }
        if let Some(raw) = lookup("STREAK_MAX_FREEZES") {
            match raw.trim().parse::<usize>() {
                Ok(value) => config.max_freezes = value,
                Err(err) => warn!(value = %raw, %err, "ignoring STREAK_MAX_FREEZES"),
            }
        }
        if let Some(raw) = lookup("STREAK_TODAY") {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) if calendar::week_of(date).is_some() => config.today = date,
                Ok(date) => warn!(%date, "ignoring STREAK_TODAY, its week is out of range"),
                Err(err) => warn!(value = %raw, %err, "ignoring STREAK_TODAY"),
            }
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            goal: GoalConfig::default(),
            max_freezes: DEFAULT_MAX_FREEZES,
            today: Local::now().date_naive(),
        }
    }
}

/// Keeps the latest session message for the status line.
#[derive(Clone, Default)]
struct StatusBoard {
    latest: Arc<Mutex<Option<String>>>,
}

impl StatusBoard {
    fn set(&self, message: impl Into<String>) {
        *self.latest.lock() = Some(message.into());
    }

    fn current(&self) -> Option<String> {
        self.latest.lock().clone()
    }
}

impl NotificationSink for StatusBoard {
    fn notify(&self, notification: &SessionNotification) {
        self.set(notification.message());
    }
}

enum Screen {
    Onboarding,
    Tracker,
    EditGoal(GoalEditor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenAction {
    None,
    StartTracking,
    OpenGoalEditor,
    CloseGoalEditor,
    CommitGoal,
    PreviousWeek,
    NextWeek,
    JumpToToday,
    SelectDay(NaiveDate),
    Primary,
    ToggleFreeze,
}

struct StreakApp {
    config: AppConfig,
    screen: Screen,
    onboarding: GoalConfig,
    tracker: Option<StreakService>,
    status: StatusBoard,
}

impl StreakApp {
    fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self::with_config(config)
    }

    fn with_config(config: AppConfig) -> Self {
        Self {
            onboarding: config.goal.clone(),
            config,
            screen: Screen::Onboarding,
            tracker: None,
            status: StatusBoard::default(),
        }
    }

    fn start_tracker(&mut self) -> Result<()> {
        let service = StreakService::builder()
            .with_goal(self.onboarding.clone())
            .starting_on(self.config.today)
            .with_max_freezes(self.config.max_freezes)
            .with_notification_sink(Box::new(self.status.clone()))
            .build()
            .context("failed to start streak session")?;
        self.tracker = Some(service);
        self.screen = Screen::Tracker;
        Ok(())
    }

    fn apply(&mut self, action: ScreenAction) {
        if action != ScreenAction::None {
            debug!(?action, "screen action");
        }
        match action {
            ScreenAction::None => {}
            ScreenAction::StartTracking => {
                if let Err(err) = self.start_tracker() {
                    error!(%err, "unable to open tracker");
                    self.status.set(format!("Unable to start: {err}"));
                }
            }
            ScreenAction::OpenGoalEditor => {
                if let Some(service) = &self.tracker {
                    self.screen = Screen::EditGoal(GoalEditor::for_topic(service.goal().topic()));
                }
            }
            ScreenAction::CloseGoalEditor => self.screen = Screen::Tracker,
            ScreenAction::CommitGoal => {
                if let (Screen::EditGoal(editor), Some(service)) = (&self.screen, &self.tracker) {
                    editor.commit(|topic| service.update_topic(topic));
                }
            }
            action => {
                if let Some(service) = &self.tracker {
                    apply_tracker_action(service, &self.status, self.config.today, action);
                }
            }
        }
    }
}

fn apply_tracker_action(
    service: &StreakService,
    status: &StatusBoard,
    today: NaiveDate,
    action: ScreenAction,
) {
    match action {
        ScreenAction::PreviousWeek => {
            if service.previous_week().is_none() {
                status.set(NO_MORE_WEEKS);
            }
        }
        ScreenAction::NextWeek => {
            if service.next_week().is_none() {
                status.set(NO_MORE_WEEKS);
            }
        }
        ScreenAction::JumpToToday => {
            if !service.jump_to(today) {
                status.set(NO_MORE_WEEKS);
            }
        }
        ScreenAction::SelectDay(date) => service.select_day(date),
        ScreenAction::Primary => {
            if service.primary_action() == PrimaryAction::NoSelection {
                status.set(PICK_A_DAY);
            }
        }
        ScreenAction::ToggleFreeze => {
            if service.toggle_freeze_selected().is_none() {
                status.set(PICK_A_DAY);
            }
        }
        _ => {}
    }
}

impl eframe::App for StreakApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let status = self.status.current();
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let action = match &mut self.screen {
                    Screen::Onboarding => onboarding_ui(ui, &mut self.onboarding),
                    Screen::Tracker => match &self.tracker {
                        Some(service) => tracker_ui(ui, service),
                        None => ScreenAction::None,
                    },
                    Screen::EditGoal(editor) => edit_goal_ui(ui, editor),
                };
                if let Some(message) = &status {
                    ui.add_space(12.0);
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new(message).color(MUTED));
                    });
                }
                action
            })
            .inner;
        self.apply(action);
    }
}

fn onboarding_ui(ui: &mut egui::Ui, goal: &mut GoalConfig) -> ScreenAction {
    let mut action = ScreenAction::None;
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new("🔥").size(60.0));
    });
    ui.add_space(24.0);
    ui.label(RichText::new("Hello Learner!").size(32.0).strong().color(Color32::WHITE));
    ui.label(
        RichText::new("This app will help you learn everyday")
            .size(18.0)
            .color(MUTED),
    );
    ui.add_space(24.0);
    ui.label(RichText::new("I want to learn").size(18.0).strong());
    ui.text_edit_singleline(&mut goal.topic);
    ui.add_space(16.0);
    ui.label(RichText::new("I want to learn it in a").size(18.0).strong());
    timeframe_picker(ui, &mut goal.timeframe);
    ui.add_space(32.0);
    ui.vertical_centered(|ui| {
        let start = egui::Button::new(RichText::new("Start →").size(20.0).color(Color32::BLACK))
            .fill(ORANGE)
            .min_size(egui::vec2(240.0, 52.0));
        if ui.add(start).clicked() {
            action = ScreenAction::StartTracking;
        }
    });
    action
}

fn tracker_ui(ui: &mut egui::Ui, service: &StreakService) -> ScreenAction {
    let mut action = ScreenAction::None;
    let reference = service.reference_date();

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(RichText::new(format_long_date(reference)).color(MUTED));
            ui.label(RichText::new(service.headline()).size(28.0).strong());
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(RichText::new("🔥").size(28.0)).clicked() {
                action = ScreenAction::OpenGoalEditor;
            }
        });
    });
    ui.add_space(12.0);

    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, CARD_STROKE))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format_long_date(reference)).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(RichText::new(">").color(ORANGE)).clicked() {
                        action = ScreenAction::NextWeek;
                    }
                    if ui.button(RichText::new("<").color(ORANGE)).clicked() {
                        action = ScreenAction::PreviousWeek;
                    }
                    if ui.button("Today").clicked() {
                        action = ScreenAction::JumpToToday;
                    }
                });
            });
            ui.add_space(8.0);

            let cells = service.week_cells();
            egui::Grid::new("week_grid")
                .num_columns(WEEKDAY_LABELS.len())
                .spacing([6.0, 10.0])
                .show(ui, |ui| {
                    for label in WEEKDAY_LABELS {
                        ui.label(RichText::new(label).color(MUTED));
                    }
                    ui.end_row();
                    for cell in &cells {
                        let (text, fill) = cell_colors(cell);
                        let button = egui::Button::new(
                            RichText::new(cell.day_number.to_string())
                                .size(20.0)
                                .color(text),
                        )
                        .fill(fill)
                        .min_size(egui::vec2(40.0, 40.0));
                        if ui.add(button).clicked() {
                            action = ScreenAction::SelectDay(cell.date);
                        }
                    }
                    ui.end_row();
                });

            ui.separator();
            ui.horizontal(|ui| {
                counter(ui, format!("{}🔥", service.streak_count()), "Day streak");
                ui.separator();
                counter(ui, format!("{} 🧊", service.freeze_count()), "Days frozen");
            });
        });

    ui.add_space(28.0);
    ui.vertical_centered(|ui| {
        let status = service.selection_status();
        let (text, fill) = primary_colors(status);
        let primary = egui::Button::new(
            RichText::new(service.primary_action_label())
                .size(32.0)
                .strong()
                .color(text),
        )
        .fill(fill)
        .min_size(egui::vec2(274.0, 274.0));
        if ui.add(primary).clicked() {
            action = ScreenAction::Primary;
        }
        ui.add_space(28.0);

        let (text, fill) = freeze_colors(status);
        let freeze = egui::Button::new(RichText::new("Freeze Day").size(17.0).color(text))
            .fill(fill)
            .min_size(egui::vec2(274.0, 52.0));
        if ui.add(freeze).clicked() {
            action = ScreenAction::ToggleFreeze;
        }
        ui.label(RichText::new(service.freeze_usage_label()).color(MUTED));
    });
    action
}

fn edit_goal_ui(ui: &mut egui::Ui, editor: &mut GoalEditor) -> ScreenAction {
    let mut action = ScreenAction::None;
    ui.horizontal(|ui| {
        if ui.button(RichText::new("< Back").color(ORANGE)).clicked() {
            action = ScreenAction::CloseGoalEditor;
        }
        ui.label(RichText::new("Learning goal").strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(RichText::new("Update").color(ORANGE)).clicked() {
                action = ScreenAction::CommitGoal;
            }
        });
    });
    ui.add_space(20.0);
    ui.label(RichText::new("I want to learn").size(18.0).strong());
    ui.add(egui::TextEdit::singleline(editor.topic_mut()).hint_text("Enter topic"));
    ui.add_space(20.0);
    ui.label(RichText::new("I want to learn it in a").size(18.0).strong());
    timeframe_picker(ui, editor.timeframe_mut());
    action
}

fn timeframe_picker(ui: &mut egui::Ui, current: &mut Timeframe) {
    ui.horizontal(|ui| {
        for timeframe in Timeframe::ALL {
            let (text, fill) = if *current == timeframe {
                (Color32::BLACK, ORANGE)
            } else {
                (ORANGE, CHIP)
            };
            let button = egui::Button::new(RichText::new(timeframe.label()).color(text))
                .fill(fill)
                .min_size(egui::vec2(80.0, 40.0));
            if ui.add(button).clicked() {
                *current = timeframe;
            }
        }
    });
}

fn counter(ui: &mut egui::Ui, value: String, caption: &str) {
    ui.vertical(|ui| {
        ui.label(RichText::new(value).size(24.0).strong());
        ui.label(RichText::new(caption).color(MUTED));
    });
}

/// Text and fill for a calendar cell; frozen takes precedence over learned.
fn cell_colors(cell: &DayCell) -> (Color32, Color32) {
    let (text, fill) = match cell.status {
        DayStatus::Frozen => (BLUE, FROZEN_FILL),
        DayStatus::Learned => (ORANGE, LEARNED_FILL),
        DayStatus::Idle if cell.is_selected => (ORANGE, Color32::TRANSPARENT),
        DayStatus::Idle => (Color32::WHITE, Color32::TRANSPARENT),
    };
    if cell.emphasized {
        (text, fill)
    } else {
        (text, fill.gamma_multiply(0.3))
    }
}

fn primary_colors(status: Option<DayStatus>) -> (Color32, Color32) {
    match status {
        Some(DayStatus::Frozen) => (BLUE, FROZEN_FILL),
        Some(DayStatus::Learned) => (ORANGE, LEARNED_FILL),
        _ => (Color32::BLACK, ORANGE),
    }
}

fn freeze_colors(status: Option<DayStatus>) -> (Color32, Color32) {
    match status {
        Some(DayStatus::Frozen | DayStatus::Learned) => (MUTED, CHIP),
        _ => (Color32::BLUE, LIGHT_BLUE),
    }
}

fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([390.0, 844.0]),
        ..Default::default()
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    run_with_options(config, native_options())
}

pub fn run_with_options(config: AppConfig, options: eframe::NativeOptions) -> Result<()> {
    info!(today = %config.today, max_freezes = config.max_freezes, "starting eframe runtime");
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(StreakApp::new(cc, config)))),
    )
    .map_err(|err| anyhow!("UI runtime failed: {err}"))
}
