use std::fmt;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::survey::QuestionId;

/// Coarse temporal bucket relative to a question's first and last answer selection
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Pre,
    During,
    Post,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Pre, Phase::During, Phase::Post];

    pub fn color(self) -> Color {
        match self {
            Phase::Pre => Color::Rgb(0x80, 0x80, 0x80),
            Phase::During => Color::Rgb(0x00, 0x7b, 0xff),
            Phase::Post => Color::Rgb(0x28, 0xa7, 0x45),
        }
    }
}

/// Phase of a sample, optionally scoped to the question under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseTag {
    pub phase: Phase,
    pub question: Option<QuestionId>,
}

impl PhaseTag {
    pub fn new(phase: Phase, question: Option<QuestionId>) -> Self {
        Self { phase, question }
    }

    /// Phase with the question scope stripped, used for color lookup
    pub fn base(&self) -> Phase {
        self.phase
    }

    pub fn color(&self) -> Color {
        self.phase.color()
    }
}

impl fmt::Display for PhaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.question {
            Some(q) => write!(f, "{}{}", self.phase, q),
            None => write!(f, "{}", self.phase),
        }
    }
}

/// First and last answer-selection timestamps of one question
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionWindow {
    pub first: Option<Timestamp>,
    pub last: Option<Timestamp>,
}

impl InteractionWindow {
    /// A milestone counts once it exists and is not later than `at`.
    /// Live capture passes "now", which reduces to a presence check.
    pub fn phase_at(&self, at: Timestamp) -> Phase {
        let reached = |m: Option<Timestamp>| m.is_some_and(|t| t <= at);

        if !reached(self.first) {
            Phase::Pre
        } else if !reached(self.last) {
            Phase::During
        } else {
            Phase::Post
        }
    }

    /// `last`, or `first` when there was only a single selection
    pub fn settled(&self) -> Option<Timestamp> {
        self.last.or(self.first)
    }
}

/// Anything that can answer "what are the milestones of this question"
pub trait InteractionTimeline {
    /// `None` selects the single-question window
    fn window(&self, question: Option<QuestionId>) -> InteractionWindow;
}

/// Derive the phase of a pointer sample taken at `at`
pub fn classify<T: InteractionTimeline + ?Sized>(
    timeline: &T,
    at: Timestamp,
    question: Option<QuestionId>,
) -> PhaseTag {
    PhaseTag::new(timeline.window(question).phase_at(at), question)
}
