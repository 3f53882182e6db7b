//! crates/dashboard_core/src/domain.rs
//!
//! Defines the pure, core data structures for the dashboard.
//! These structs are view models rebuilt from every backend response and are
//! independent of any wire or markup format.

use chrono::NaiveDateTime;
use std::collections::VecDeque;

//=========================================================================================
// Search
//=========================================================================================

/// A server-computed reliability score for a search result, always within 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustScore(u8);

impl TrustScore {
    /// Score used when the backend omits one.
    pub const DEFAULT: TrustScore = TrustScore(50);

    /// Builds a score from whatever number the backend sent.
    /// Missing or non-finite values fall back to the default; the rest are rounded and clamped.
    pub fn from_raw(raw: Option<f64>) -> Self {
        match raw {
            Some(v) if v.is_finite() => TrustScore(v.round().clamp(0.0, 100.0) as u8),
            _ => Self::DEFAULT,
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for TrustScore {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A single material returned by the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub trust_score: TrustScore,
}

//=========================================================================================
// Deadlines
//=========================================================================================

/// How important a deadline is to the student, on a 1–5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Importance(u8);

impl Importance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Importance(level))
    }

    /// Parses a form value. An empty value means the default level.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(Self::default());
        }
        raw.parse::<u8>().ok().and_then(Self::new)
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Importance {
    fn default() -> Self {
        Importance(3)
    }
}

/// Color band for a priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    High,
    Medium,
    Neutral,
}

impl Urgency {
    /// `> 80` is high, `(50, 80]` is medium, everything else is neutral.
    pub fn from_score(score: f64) -> Self {
        if score > 80.0 {
            Urgency::High
        } else if score > 50.0 {
            Urgency::Medium
        } else {
            Urgency::Neutral
        }
    }
}

/// A deadline as listed by the schedule endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineTask {
    pub id: String,
    pub student_id: String,
    pub subject_id: String,
    pub title: String,
    pub importance: Option<Importance>,
    pub due_at: String,
    pub priority_score: f64,
}

impl DeadlineTask {
    /// The priority score rounded to one decimal place.
    pub fn score_label(&self) -> String {
        format!("{:.1}", self.priority_score)
    }

    pub fn urgency(&self) -> Urgency {
        Urgency::from_score(self.priority_score)
    }

    pub fn due_label(&self) -> String {
        display_due(&self.due_at)
    }
}

/// A deadline about to be submitted. `due_at` is already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeadline {
    pub student_id: String,
    pub subject_id: String,
    pub title: String,
    pub importance: Importance,
    pub due_at: String,
}

/// What the backend hands back after creating a deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedDeadline {
    pub priority_score: f64,
    pub task_id: Option<String>,
}

/// Wire format for due timestamps.
pub const DUE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DUE_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Normalizes a due time picked in the form (`2024-06-01T10:30`) to `2024-06-01 10:30:00`.
/// Returns `None` when the value is not a recognizable date-time.
pub fn normalize_due_input(raw: &str) -> Option<String> {
    let raw = raw.trim();
    DUE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(DUE_FORMAT).to_string())
}

/// Truncates a server timestamp to minute precision for display.
pub fn display_due(raw: &str) -> String {
    raw.replacen('T', " ", 1).chars().take(16).collect()
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message of the conversation with the chat backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// The conversation so far, holding at most `capacity` turns.
/// Pushing past the cap evicts the oldest turn.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl Transcript {
    pub const DEFAULT_CAPACITY: usize = 20;

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { turns: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// A copy of the retained turns, oldest first, ready to be sent upstream.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_input_gets_space_and_seconds() {
        assert_eq!(
            normalize_due_input("2024-06-01T10:30").as_deref(),
            Some("2024-06-01 10:30:00")
        );
        assert_eq!(
            normalize_due_input("2024-06-01 10:30:45").as_deref(),
            Some("2024-06-01 10:30:45")
        );
        assert_eq!(normalize_due_input(""), None);
        assert_eq!(normalize_due_input("tomorrow"), None);
    }

    #[test]
    fn due_display_drops_seconds_and_zone() {
        assert_eq!(display_due("2025-12-20T23:59:00+07:00"), "2025-12-20 23:59");
        assert_eq!(display_due("2025-12-20 08:05:00"), "2025-12-20 08:05");
        assert_eq!(display_due("2025-12-20"), "2025-12-20");
    }

    #[test]
    fn urgency_thresholds() {
        assert_eq!(Urgency::from_score(80.1), Urgency::High);
        assert_eq!(Urgency::from_score(80.0), Urgency::Medium);
        assert_eq!(Urgency::from_score(50.01), Urgency::Medium);
        assert_eq!(Urgency::from_score(50.0), Urgency::Neutral);
        assert_eq!(Urgency::from_score(f64::NAN), Urgency::Neutral);
    }

    #[test]
    fn score_label_has_one_decimal() {
        let task = DeadlineTask {
            id: "LT1".into(),
            student_id: "SV001".into(),
            subject_id: "AI1".into(),
            title: "Report".into(),
            importance: None,
            due_at: "2025-12-20 23:59:00".into(),
            priority_score: 83.456,
        };
        assert_eq!(task.score_label(), "83.5");
    }

    #[test]
    fn trust_score_defaults_and_clamps() {
        assert_eq!(TrustScore::from_raw(None).value(), 50);
        assert_eq!(TrustScore::from_raw(Some(99.0)).value(), 99);
        assert_eq!(TrustScore::from_raw(Some(140.0)).value(), 100);
        assert_eq!(TrustScore::from_raw(Some(-3.0)).value(), 0);
    }

    #[test]
    fn importance_range() {
        assert_eq!(Importance::parse("").map(Importance::level), Some(3));
        assert_eq!(Importance::parse(" 5 ").map(Importance::level), Some(5));
        assert_eq!(Importance::parse("0"), None);
        assert_eq!(Importance::parse("high"), None);
    }

    #[test]
    fn transcript_evicts_oldest() {
        let mut transcript = Transcript::default();
        for i in 0..25 {
            transcript.push(ConversationTurn::user(format!("m{i}")));
        }
        let history = transcript.history();
        assert_eq!(history.len(), 20);
        assert_eq!(history[0].content, "m5");
        assert_eq!(history[19].content, "m24");
    }
}
