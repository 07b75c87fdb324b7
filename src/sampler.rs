use crate::clock::Timestamp;
use crate::phase::classify;
use crate::session::{Sample, Session};
use crate::survey::{QuestionId, SurveyMode};

/// Resolves a pointer position to the question container underneath it
pub trait HitTest {
    fn question_at(&self, x: f64, y: f64) -> Option<QuestionId>;
}

impl<F> HitTest for F
where
    F: Fn(f64, f64) -> Option<QuestionId>,
{
    fn question_at(&self, x: f64, y: f64) -> Option<QuestionId> {
        self(x, y)
    }
}

/// Turns pointer-move events into phase-tagged samples
#[derive(Debug, Clone)]
pub struct MouseSampler {
    dedupe: bool,
    active_question: QuestionId,
}

impl MouseSampler {
    /// `initial_question` is the fallback until the pointer first crosses a question
    pub fn new(initial_question: QuestionId, dedupe: bool) -> Self {
        Self {
            dedupe,
            active_question: initial_question,
        }
    }

    pub fn active_question(&self) -> QuestionId {
        self.active_question
    }

    /// Record one pointer move. Returns the appended sample, or `None` when the
    /// session is already submitted or the move was a duplicate.
    pub fn on_pointer_move(
        &mut self,
        session: &mut Session,
        x: f64,
        y: f64,
        now: Timestamp,
        hit: &dyn HitTest,
    ) -> Option<Sample> {
        if session.is_submitted() {
            return None;
        }

        let question = match session.mode() {
            SurveyMode::Single => None,
            SurveyMode::Multi => {
                if let Some(q) = hit.question_at(x, y) {
                    self.active_question = q;
                }
                Some(self.active_question)
            }
        };

        if self.dedupe {
            if let Some(prev) = session.last_sample() {
                if prev.x == x && prev.y == y {
                    return None;
                }
            }
        }

        let sample = Sample {
            x,
            y,
            timestamp: now,
            phase: classify(session, now, question),
            question_id: question,
        };
        tracing::trace!(x, y, phase = %sample.phase, "pointer sample");
        session.push_sample(sample);
        Some(sample)
    }
}
