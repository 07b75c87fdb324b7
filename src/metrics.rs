//! Phase duration breakdowns computed from a frozen session.
//!
//! Each question owns a window of time. The first question's window opens at
//! the session start; every later question's window opens at its transition,
//! the earliest sample captured over it. A window closes at the next
//! question's transition, or at submission for the last one.

use serde::Serialize;
use thiserror::Error;

use crate::clock::{elapsed_between, Timestamp};
use crate::phase::InteractionWindow;
use crate::session::FrozenSession;
use crate::survey::QuestionId;
use crate::util::percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricsUnavailable {
    #[error("survey start was never recorded")]
    MissingStart,

    #[error("question {0} was never answered")]
    MissingFirstInteraction(QuestionId),

    #[error("survey was never submitted")]
    MissingSubmit,

    #[error("question {0} took no measurable time")]
    ZeroDuration(QuestionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseShare {
    pub elapsed_ms: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionMetrics {
    pub question_id: QuestionId,
    /// `None` when the question's window has no measurable start
    pub pre: Option<PhaseShare>,
    pub during: PhaseShare,
    pub post: PhaseShare,
    pub total_ms: u64,
}

impl QuestionMetrics {
    pub fn pre_ms(&self) -> u64 {
        self.pre.map_or(0, |p| p.elapsed_ms)
    }

    pub fn percentage_sum(&self) -> f64 {
        self.pre.map_or(0.0, |p| p.percentage) + self.during.percentage + self.post.percentage
    }
}

/// Outcome per question, in questionnaire order
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyMetrics {
    pub questions: Vec<(QuestionId, Result<QuestionMetrics, MetricsUnavailable>)>,
}

impl SurveyMetrics {
    pub fn for_question(&self, id: QuestionId) -> Option<&Result<QuestionMetrics, MetricsUnavailable>> {
        self.questions.iter().find(|(q, _)| *q == id).map(|(_, m)| m)
    }

    pub fn available(&self) -> impl Iterator<Item = &QuestionMetrics> {
        self.questions.iter().filter_map(|(_, m)| m.as_ref().ok())
    }

    pub fn any_available(&self) -> bool {
        self.available().next().is_some()
    }
}

/// Break one question's window into pre/during/post.
///
/// `window_start == None` means the window opening is unknown; pre is then
/// unmeasurable and the window is taken to open at the first selection.
pub fn phase_breakdown(
    question_id: QuestionId,
    window_start: Option<Timestamp>,
    interaction: InteractionWindow,
    window_end: Timestamp,
) -> Result<QuestionMetrics, MetricsUnavailable> {
    let first = interaction
        .first
        .ok_or(MetricsUnavailable::MissingFirstInteraction(question_id))?;
    let settled = interaction.settled().unwrap_or(first);

    let pre = window_start.map(|start| elapsed_between(start, first));
    let during = elapsed_between(first, settled);
    let post = elapsed_between(settled, window_end);
    let total = pre.unwrap_or(0) + during + post;

    let share = |elapsed: u64| -> Result<PhaseShare, MetricsUnavailable> {
        Ok(PhaseShare {
            elapsed_ms: elapsed,
            percentage: percentage(elapsed, total)
                .ok_or(MetricsUnavailable::ZeroDuration(question_id))?,
        })
    };

    Ok(QuestionMetrics {
        question_id,
        pre: pre.map(&share).transpose()?,
        during: share(during)?,
        post: share(post)?,
        total_ms: total,
    })
}

/// Metrics for every question of a submitted session
pub fn compute(session: &FrozenSession) -> SurveyMetrics {
    let ids = session.question_ids();

    let questions = ids
        .iter()
        .enumerate()
        .map(|(idx, &id)| {
            let result = question_metrics(session, ids, idx);
            if let Err(reason) = &result {
                tracing::debug!(question = id, %reason, "metrics unavailable");
            }
            (id, result)
        })
        .collect();

    SurveyMetrics { questions }
}

fn question_metrics(
    session: &FrozenSession,
    ids: &[QuestionId],
    idx: usize,
) -> Result<QuestionMetrics, MetricsUnavailable> {
    let start = session.start_time().ok_or(MetricsUnavailable::MissingStart)?;
    let id = ids[idx];
    let interaction = session.interaction(id);
    if interaction.first.is_none() {
        return Err(MetricsUnavailable::MissingFirstInteraction(id));
    }
    let submit = session.submit_time().ok_or(MetricsUnavailable::MissingSubmit)?;

    let window_start = if idx == 0 {
        Some(start)
    } else {
        session.transition_into(id)
    };
    let window_end = ids
        .get(idx + 1)
        .and_then(|&next| session.transition_into(next))
        .unwrap_or(submit);

    phase_breakdown(id, window_start, interaction, window_end)
}
