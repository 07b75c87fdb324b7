use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::clock::Timestamp;
use crate::phase::{InteractionTimeline, InteractionWindow, PhaseTag};
use crate::survey::{QuestionId, SurveyMode};

/// One captured pointer position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub timestamp: Timestamp,
    pub phase: PhaseTag,
    pub question_id: Option<QuestionId>,
}

/// Mutable record of one survey attempt, owned by the survey view.
///
/// Setters overwrite and never validate ordering; the caller is responsible
/// for invoking them in temporal sequence.
#[derive(Debug, Clone)]
pub struct Session {
    mode: SurveyMode,
    question_ids: Vec<QuestionId>,
    opened_at: DateTime<Local>,
    start_time: Option<Timestamp>,
    submit_time: Option<Timestamp>,
    windows: BTreeMap<QuestionId, InteractionWindow>,
    selected_answers: BTreeMap<QuestionId, String>,
    samples: Vec<Sample>,
}

impl Session {
    pub fn new(mode: SurveyMode, question_ids: Vec<QuestionId>) -> Self {
        Self {
            mode,
            question_ids,
            opened_at: Local::now(),
            start_time: None,
            submit_time: None,
            windows: BTreeMap::new(),
            selected_answers: BTreeMap::new(),
            samples: Vec::new(),
        }
    }

    pub fn set_start_time(&mut self, t: Timestamp) {
        self.start_time = Some(t);
    }

    pub fn set_first_interaction(&mut self, question: QuestionId, t: Timestamp) {
        self.windows.entry(question).or_default().first = Some(t);
    }

    pub fn set_last_interaction(&mut self, question: QuestionId, t: Timestamp) {
        self.windows.entry(question).or_default().last = Some(t);
    }

    pub fn set_submit_time(&mut self, t: Timestamp) {
        self.submit_time = Some(t);
    }

    pub fn set_selected_answer(&mut self, question: QuestionId, answer: impl Into<String>) {
        self.selected_answers.insert(question, answer.into());
    }

    pub fn push_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Back to the freshly opened state, keeping mode and question order
    pub fn reset(&mut self) {
        self.opened_at = Local::now();
        self.start_time = None;
        self.submit_time = None;
        self.windows.clear();
        self.selected_answers.clear();
        self.samples.clear();
    }

    pub fn mode(&self) -> SurveyMode {
        self.mode
    }

    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    pub fn submit_time(&self) -> Option<Timestamp> {
        self.submit_time
    }

    pub fn is_submitted(&self) -> bool {
        self.submit_time.is_some()
    }

    pub fn selected_answer(&self, question: QuestionId) -> Option<&str> {
        self.selected_answers.get(&question).map(String::as_str)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn last_sample(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Hand the attempt over to the results view; no further mutation is possible
    pub fn freeze(self) -> FrozenSession {
        FrozenSession { inner: self }
    }

    fn lookup(&self, question: Option<QuestionId>) -> InteractionWindow {
        let id = question.or_else(|| self.question_ids.first().copied());
        id.and_then(|id| self.windows.get(&id).copied())
            .unwrap_or_default()
    }
}

impl InteractionTimeline for Session {
    fn window(&self, question: Option<QuestionId>) -> InteractionWindow {
        self.lookup(question)
    }
}

/// Read-only snapshot of a submitted session
#[derive(Debug, Clone)]
pub struct FrozenSession {
    inner: Session,
}

impl FrozenSession {
    pub fn mode(&self) -> SurveyMode {
        self.inner.mode
    }

    pub fn question_ids(&self) -> &[QuestionId] {
        &self.inner.question_ids
    }

    pub fn opened_at(&self) -> DateTime<Local> {
        self.inner.opened_at
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.inner.start_time
    }

    pub fn submit_time(&self) -> Option<Timestamp> {
        self.inner.submit_time
    }

    pub fn interaction(&self, question: QuestionId) -> InteractionWindow {
        self.inner.lookup(Some(question))
    }

    pub fn selected_answer(&self, question: QuestionId) -> Option<&str> {
        self.inner.selected_answer(question)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.inner.samples
    }

    /// Timestamp of the earliest sample captured over `question`
    pub fn transition_into(&self, question: QuestionId) -> Option<Timestamp> {
        self.inner
            .samples
            .iter()
            .filter(|s| s.question_id == Some(question))
            .map(|s| s.timestamp)
            .min()
    }
}

impl InteractionTimeline for FrozenSession {
    fn window(&self, question: Option<QuestionId>) -> InteractionWindow {
        self.inner.lookup(question)
    }
}
