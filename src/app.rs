use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use serde::Serialize;

use crate::clock::Timestamp;
use crate::config::Config;
use crate::metrics::{self, QuestionMetrics, SurveyMetrics};
use crate::phase::InteractionTimeline;
use crate::replay::{ReplayEngine, ReplaySettings};
use crate::sampler::MouseSampler;
use crate::schedule::TimerQueue;
use crate::session::{FrozenSession, Session};
use crate::surface::DisplayList;
use crate::survey::{QuestionId, Questionnaire, SurveyMode};
use crate::ui::layout::SurveyLayout;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppSettings {
    pub mode: SurveyMode,
    pub replay: ReplaySettings,
    pub dedupe: bool,
}

impl From<&Config> for AppSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            mode: cfg.mode,
            replay: cfg.replay_settings(),
            dedupe: cfg.dedupe_samples,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Keyboard-focusable element of the survey form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusItem {
    Answer(QuestionId, usize),
    Submit,
}

pub struct SurveyView {
    pub questionnaire: Questionnaire,
    pub session: Session,
    pub sampler: MouseSampler,
    pub focus: usize,
}

impl SurveyView {
    fn mount(questionnaire: Questionnaire, dedupe: bool, now: Timestamp) -> Self {
        let mut session = Session::new(questionnaire.mode(), questionnaire.ids());
        session.set_start_time(now);
        let sampler = MouseSampler::new(questionnaire.first_id(), dedupe);
        tracing::info!(
            mode = %questionnaire.mode(),
            questions = questionnaire.len(),
            "survey opened"
        );
        Self {
            questionnaire,
            session,
            sampler,
            focus: 0,
        }
    }

    pub fn focus_items(&self) -> Vec<FocusItem> {
        self.questionnaire
            .questions()
            .iter()
            .flat_map(|q| (0..q.answers.len()).map(move |idx| FocusItem::Answer(q.id, idx)))
            .chain(std::iter::once(FocusItem::Submit))
            .collect()
    }

    pub fn focused(&self) -> FocusItem {
        self.focus_items()
            .get(self.focus)
            .copied()
            .unwrap_or(FocusItem::Submit)
    }

    pub fn all_answered(&self) -> bool {
        self.questionnaire
            .questions()
            .iter()
            .all(|q| self.session.selected_answer(q.id).is_some())
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.focus_items().len();
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
    }

    fn focus_on(&mut self, item: FocusItem) {
        if let Some(idx) = self.focus_items().iter().position(|i| *i == item) {
            self.focus = idx;
        }
    }

    /// First selection on a question opens its window; any later one moves its end
    fn select(&mut self, question: QuestionId, answer_idx: usize, now: Timestamp) -> bool {
        let Some(answer) = self
            .questionnaire
            .get(question)
            .and_then(|q| q.answers.get(answer_idx))
        else {
            return false;
        };

        if self.session.window(Some(question)).first.is_none() {
            self.session.set_first_interaction(question, now);
        } else {
            self.session.set_last_interaction(question, now);
        }
        self.session.set_selected_answer(question, answer.as_str());
        tracing::info!(question, answer = %answer, at = now, "answer selected");
        true
    }
}

pub struct ResultsView {
    pub questionnaire: Questionnaire,
    pub session: FrozenSession,
    pub metrics: SurveyMetrics,
    pub replay: ReplayEngine,
    pub canvas: DisplayList,
    pub show_panels: bool,
}

impl ResultsView {
    fn mount(
        questionnaire: Questionnaire,
        session: FrozenSession,
        replay: ReplaySettings,
        area: Rect,
    ) -> Self {
        let metrics = metrics::compute(&session);
        let replay = ReplayEngine::new(replay);
        let mut canvas = DisplayList::new(area.width as f64, area.height as f64);
        replay.render(&session, &mut canvas);
        Self {
            questionnaire,
            session,
            metrics,
            replay,
            canvas,
            show_panels: true,
        }
    }

    pub fn replay_available(&self) -> bool {
        !self.session.samples().is_empty()
    }
}

pub enum View {
    Survey(SurveyView),
    Results(ResultsView),
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionSummary {
    pub question_id: QuestionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<QuestionMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<String>,
}

/// JSON-friendly digest of a submitted session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub mode: SurveyMode,
    pub opened_at: DateTime<Local>,
    pub answers: BTreeMap<QuestionId, String>,
    pub samples: usize,
    pub questions: Vec<QuestionSummary>,
}

impl SessionSummary {
    fn new(session: &FrozenSession, metrics: &SurveyMetrics) -> Self {
        let answers = session
            .question_ids()
            .iter()
            .filter_map(|&q| session.selected_answer(q).map(|a| (q, a.to_string())))
            .collect();
        let questions = metrics
            .questions
            .iter()
            .map(|(id, result)| QuestionSummary {
                question_id: *id,
                metrics: result.as_ref().ok().cloned(),
                unavailable: result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();

        Self {
            mode: session.mode(),
            opened_at: session.opened_at(),
            answers,
            samples: session.samples().len(),
            questions,
        }
    }
}

/// Application controller: owns the current view and the timer queue.
///
/// Every entry point takes the current timestamp explicitly so the whole
/// controller can be driven headlessly.
pub struct App {
    settings: AppSettings,
    custom_questions: Option<Questionnaire>,
    view: View,
    timers: TimerQueue,
    area: Rect,
    summary: Option<SessionSummary>,
}

impl App {
    pub fn new(
        settings: AppSettings,
        custom_questions: Option<Questionnaire>,
        area: Rect,
        now: Timestamp,
    ) -> Self {
        let questionnaire = questionnaire_for(settings.mode, custom_questions.as_ref());
        let view = View::Survey(SurveyView::mount(questionnaire, settings.dedupe, now));
        Self {
            settings,
            custom_questions,
            view,
            timers: TimerQueue::new(),
            area,
            summary: None,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn settings(&self) -> AppSettings {
        self.settings
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Digest of the most recently submitted session, if any
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn survey_layout(&self) -> Option<SurveyLayout> {
        match &self.view {
            View::Survey(survey) => Some(SurveyLayout::compute(self.area, &survey.questionnaire)),
            View::Results(_) => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.timers.next_deadline()
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Timestamp) -> Flow {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Flow::Quit;
        }

        match &mut self.view {
            View::Survey(survey) => match key.code {
                KeyCode::Up | KeyCode::BackTab => survey.move_focus(false),
                KeyCode::Down | KeyCode::Tab => survey.move_focus(true),
                KeyCode::Char(' ') | KeyCode::Enter => match survey.focused() {
                    FocusItem::Answer(q, idx) => {
                        survey.select(q, idx, now);
                    }
                    FocusItem::Submit => {
                        self.submit(now);
                    }
                },
                _ => {}
            },
            View::Results(results) => match key.code {
                KeyCode::Char('r') => {
                    self.start_replay(now);
                }
                KeyCode::Char('n') => self.start_new_survey(now),
                KeyCode::Char('m') => self.toggle_mode(now),
                KeyCode::Char('h') => results.show_panels = !results.show_panels,
                _ => {}
            },
        }
        Flow::Continue
    }

    pub fn on_mouse(&mut self, event: MouseEvent, now: Timestamp) {
        let area = self.area;
        let View::Survey(survey) = &mut self.view else {
            return;
        };
        let layout = SurveyLayout::compute(area, &survey.questionnaire);

        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                survey.sampler.on_pointer_move(
                    &mut survey.session,
                    event.column as f64,
                    event.row as f64,
                    now,
                    &layout,
                );
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((q, idx)) = layout.answer_at(event.column, event.row) {
                    survey.focus_on(FocusItem::Answer(q, idx));
                    survey.select(q, idx, now);
                } else if layout.is_submit(event.column, event.row) {
                    survey.focus_on(FocusItem::Submit);
                    self.submit(now);
                }
            }
            _ => {}
        }
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        if let View::Results(results) = &mut self.view {
            results.replay.resize(
                &results.session,
                width as f64,
                height as f64,
                &mut results.canvas,
            );
        }
    }

    pub fn select_answer(&mut self, question: QuestionId, answer_idx: usize, now: Timestamp) -> bool {
        match &mut self.view {
            View::Survey(survey) => survey.select(question, answer_idx, now),
            View::Results(_) => false,
        }
    }

    /// Freeze the session and switch to the results view. Refused until every
    /// question has an answer.
    pub fn submit(&mut self, now: Timestamp) -> bool {
        let View::Survey(survey) = &mut self.view else {
            return false;
        };
        if !survey.all_answered() {
            tracing::debug!("submit ignored, unanswered questions remain");
            return false;
        }

        survey.session.set_submit_time(now);
        let placeholder = Session::new(survey.session.mode(), Vec::new());
        let session = std::mem::replace(&mut survey.session, placeholder).freeze();
        let questionnaire = survey.questionnaire.clone();

        let results = ResultsView::mount(questionnaire, session, self.settings.replay, self.area);
        tracing::info!(
            samples = results.session.samples().len(),
            metrics_available = results.metrics.any_available(),
            "survey submitted"
        );
        self.summary = Some(SessionSummary::new(&results.session, &results.metrics));
        self.view = View::Results(results);
        true
    }

    /// Start (or restart) the replay; false when there is nothing to replay
    pub fn start_replay(&mut self, now: Timestamp) -> bool {
        let View::Results(results) = &mut self.view else {
            return false;
        };
        let started = results.replay.start(&results.session, now, &mut self.timers);
        results.replay.render(&results.session, &mut results.canvas);
        started
    }

    /// Fire every timer due at `now`. Returns true when something was redrawn.
    pub fn fire_due_timers(&mut self, now: Timestamp) -> bool {
        let due = self.timers.take_due(now);
        let View::Results(results) = &mut self.view else {
            return false;
        };

        let mut advanced = false;
        for id in due {
            advanced |= results
                .replay
                .on_timer(id, &results.session, now, &mut self.timers);
        }
        if advanced {
            results.replay.render(&results.session, &mut results.canvas);
        }
        advanced
    }

    pub fn start_new_survey(&mut self, now: Timestamp) {
        self.unmount_results();
        let questionnaire = questionnaire_for(self.settings.mode, self.custom_questions.as_ref());
        self.view = View::Survey(SurveyView::mount(questionnaire, self.settings.dedupe, now));
    }

    pub fn toggle_mode(&mut self, now: Timestamp) {
        self.settings.mode = self.settings.mode.toggled();
        self.start_new_survey(now);
    }

    fn unmount_results(&mut self) {
        if let View::Results(results) = &mut self.view {
            results.replay.stop(&mut self.timers);
        }
        self.timers.clear();
    }
}

/// A custom question file only applies to the mode it was loaded for
fn questionnaire_for(mode: SurveyMode, custom: Option<&Questionnaire>) -> Questionnaire {
    match custom {
        Some(q) if q.mode() == mode => q.clone(),
        _ => Questionnaire::builtin(mode),
    }
}
