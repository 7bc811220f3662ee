use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TOPIC: &str = "Swift";

/// Target duration for a learning goal. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    Week,
    #[default]
    Month,
    Year,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Week, Timeframe::Month, Timeframe::Year];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Week => "Week",
            Timeframe::Month => "Month",
            Timeframe::Year => "Year",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown timeframe `{0}`, expected week, month or year")]
pub struct ParseTimeframeError(pub String);

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|candidate| candidate.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseTimeframeError(trimmed.to_string()))
    }
}

/// What the learner wants to study and over which timeframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub topic: String,
    pub timeframe: Timeframe,
}

impl GoalConfig {
    pub fn new(topic: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            topic: topic.into(),
            timeframe,
        }
    }

    /// Replaces the topic verbatim. Empty or padded text is accepted.
    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn headline(&self) -> String {
        format!("Learning {}", self.topic)
    }
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC, Timeframe::default())
    }
}

/// Draft state behind the "Learning goal" edit screen.
///
/// Only the topic leaves the editor on [`GoalEditor::commit`]; the timeframe
/// picked here stays local to the screen and starts from the default every
/// time the editor is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalEditor {
    draft: GoalConfig,
}

impl GoalEditor {
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            draft: GoalConfig::new(topic, Timeframe::default()),
        }
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.draft.set_topic(topic);
    }

    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.draft.set_timeframe(timeframe);
    }

    pub fn topic(&self) -> &str {
        self.draft.topic()
    }

    pub fn topic_mut(&mut self) -> &mut String {
        &mut self.draft.topic
    }

    pub fn timeframe(&self) -> Timeframe {
        self.draft.timeframe()
    }

    pub fn timeframe_mut(&mut self) -> &mut Timeframe {
        &mut self.draft.timeframe
    }

    pub fn commit<F>(&self, on_update: F)
    where
        F: FnOnce(&str),
    {
        tracing::debug!(topic = %self.draft.topic, "committing goal topic");
        on_update(&self.draft.topic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_onboarding_screen() {
        let goal = GoalConfig::default();
        assert_eq!(goal.topic(), "Swift");
        assert_eq!(goal.timeframe(), Timeframe::Month);
        assert_eq!(goal.headline(), "Learning Swift");
    }

    #[test]
    fn set_topic_keeps_text_verbatim() {
        let mut goal = GoalConfig::default();
        goal.set_topic("  Rust ");
        assert_eq!(goal.topic(), "  Rust ");
        goal.set_topic("");
        assert_eq!(goal.topic(), "");
    }

    #[test]
    fn parses_timeframes_case_insensitively() {
        assert_eq!("week".parse::<Timeframe>(), Ok(Timeframe::Week));
        assert_eq!(" YEAR ".parse::<Timeframe>(), Ok(Timeframe::Year));
        assert_eq!(
            "fortnight".parse::<Timeframe>(),
            Err(ParseTimeframeError("fortnight".into()))
        );
    }

    #[test]
    fn commit_hands_over_topic_only() {
        let mut editor = GoalEditor::for_topic("Swift");
        editor.set_topic("Rust");
        editor.set_timeframe(Timeframe::Year);

        let mut goal = GoalConfig::new("Swift", Timeframe::Week);
        editor.commit(|topic| goal.set_topic(topic));

        assert_eq!(goal.topic(), "Rust");
        assert_eq!(goal.timeframe(), Timeframe::Week);
    }

    #[test]
    fn editor_timeframe_starts_from_default() {
        let editor = GoalEditor::for_topic("Go");
        assert_eq!(editor.timeframe(), Timeframe::Month);
    }
}
