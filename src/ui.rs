pub mod charting;
pub mod layout;
pub mod metrics_panel;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::app::{FocusItem, ResultsView, SurveyView};
use crate::phase::Phase;
use crate::replay::ReplayState;
use crate::survey::{QuestionId, Questionnaire, SurveyMode};
use crate::ui::charting::TrailCanvas;
use crate::ui::layout::SurveyLayout;

/// The survey form as laid out by `SurveyLayout`. Also drawn muted under the
/// replay trail so the trail lines up with the questions it crossed.
struct Form<'a> {
    questionnaire: &'a Questionnaire,
    selected: &'a dyn Fn(QuestionId) -> Option<&'a str>,
    focus: Option<FocusItem>,
    submit_ready: bool,
    muted: bool,
}

impl Widget for Form<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let focus_style = Style::default().add_modifier(Modifier::REVERSED);
        let base_style = if self.muted { dim_style } else { Style::default() };

        let layout = SurveyLayout::compute(area, self.questionnaire);

        let header = match self.questionnaire.mode() {
            SurveyMode::Single => "Survey".to_string(),
            SurveyMode::Multi => format!("Survey · {} questions", self.questionnaire.len()),
        };
        Paragraph::new(Span::styled(header, base_style.fg(Color::Cyan).patch(bold_style)))
            .render(layout.header, buf);

        for (question, slot) in self.questionnaire.questions().iter().zip(&layout.questions) {
            Paragraph::new(Span::styled(question.title.clone(), base_style.patch(bold_style)))
                .wrap(Wrap { trim: true })
                .render(slot.title, buf);

            let chosen = (self.selected)(question.id);
            for (idx, (answer, row)) in question.answers.iter().zip(&slot.answers).enumerate() {
                let is_chosen = chosen == Some(answer.as_str());
                let marker = if is_chosen { "(•) " } else { "( ) " };
                let mut style = base_style;
                if is_chosen {
                    style = style.patch(bold_style);
                }
                if self.focus == Some(FocusItem::Answer(question.id, idx)) {
                    style = style.patch(focus_style);
                }
                Paragraph::new(Span::styled(format!("{marker}{answer}"), style))
                    .render(*row, buf);
            }
        }

        let mut submit_style = if self.submit_ready {
            base_style.fg(Color::Green).patch(bold_style)
        } else {
            base_style.patch(dim_style)
        };
        if self.focus == Some(FocusItem::Submit) {
            submit_style = submit_style.patch(focus_style);
        }
        Paragraph::new(Span::styled("[ Submit Survey ]", submit_style)).render(layout.submit, buf);
    }
}

fn bottom_line(area: Rect) -> Rect {
    Rect::new(area.x, area.bottom().saturating_sub(1), area.width, area.height.min(1))
}

impl Widget for &SurveyView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let selected = move |q: QuestionId| session.selected_answer(q);
        Form {
            questionnaire: &self.questionnaire,
            selected: &selected,
            focus: Some(self.focused()),
            submit_ready: self.all_answered(),
            muted: false,
        }
        .render(area, buf);

        Paragraph::new(Span::styled(
            "(↑/↓) move / (space) select / (enter) submit / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(bottom_line(area), buf);
    }
}

fn phase_key() -> Vec<Span<'static>> {
    Phase::ALL
        .iter()
        .flat_map(|phase| {
            [
                Span::styled("■ ", Style::default().fg(phase.color())),
                Span::raw(format!("{phase}  ")),
            ]
        })
        .collect()
}

fn replay_status(results: &ResultsView) -> Span<'static> {
    let muted = Style::default().fg(Color::DarkGray);
    if !results.replay_available() {
        return Span::styled("replay unavailable: no pointer samples", muted);
    }
    let total = results.session.samples().len();
    match results.replay.state() {
        ReplayState::Idle => Span::styled(format!("samples {total}"), muted),
        ReplayState::Playing { .. } => Span::styled(
            format!("replaying {}/{total}", results.replay.frame()),
            Style::default().fg(Color::Yellow),
        ),
        ReplayState::Done => Span::styled(format!("replayed {total}/{total}"), muted),
    }
}

impl Widget for &ResultsView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let selected = move |q: QuestionId| session.selected_answer(q);
        Form {
            questionnaire: &self.questionnaire,
            selected: &selected,
            focus: None,
            submit_ready: false,
            muted: true,
        }
        .render(area, buf);

        TrailCanvas::new(&self.canvas).render(area, buf);

        if self.show_panels {
            let column = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };
            metrics_panel::render_panels(self, column, buf);
        }

        let mut spans = phase_key();
        spans.push(replay_status(self));
        spans.push(Span::styled(
            format!(
                "   (r)eplay / (n)ew / (m)ode: {} / (h)ide panels / (esc)ape",
                self.session.mode().toggled()
            ),
            Style::default().add_modifier(Modifier::ITALIC),
        ));
        Paragraph::new(Line::from(spans)).render(bottom_line(area), buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, AppSettings, View};
    use crate::replay::ReplaySettings;
    use crossterm::event::{KeyModifiers, MouseEvent, MouseEventKind};

    fn rendered(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn create_test_app(mode: SurveyMode) -> App {
        let settings = AppSettings {
            mode,
            replay: ReplaySettings::default(),
            dedupe: false,
        };
        App::new(settings, None, Rect::new(0, 0, 100, 30), 0)
    }

    fn moved(app: &mut App, column: u16, row: u16, now: u64) {
        app.on_mouse(
            MouseEvent {
                kind: MouseEventKind::Moved,
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
            now,
        );
    }

    fn render_app(app: &App) -> Buffer {
        let area = app.area();
        let mut buffer = Buffer::empty(area);
        match app.view() {
            View::Survey(s) => s.render(area, &mut buffer),
            View::Results(r) => r.render(area, &mut buffer),
        }
        buffer
    }

    #[test]
    fn test_survey_shows_question_and_answers() {
        let app = create_test_app(SurveyMode::Single);
        let out = rendered(&render_app(&app));

        assert!(out.contains("How are you feeling today?"));
        assert!(out.contains("( ) Very Happy"));
        assert!(out.contains("[ Submit Survey ]"));
        assert!(out.contains("(esc)ape"));
    }

    #[test]
    fn test_selected_answer_is_marked() {
        let mut app = create_test_app(SurveyMode::Single);
        app.select_answer(1, 2, 100);
        let out = rendered(&render_app(&app));
        assert!(out.contains("(•) Neutral"));
        assert!(out.contains("( ) Very Happy"));
    }

    #[test]
    fn test_multi_header_counts_questions() {
        let app = create_test_app(SurveyMode::Multi);
        let out = rendered(&render_app(&app));
        assert!(out.contains("Survey · 2 questions"));
        assert!(out.contains("How often do you feel stressed during daily routines?"));
    }

    #[test]
    fn test_results_show_panels_and_legend() {
        let mut app = create_test_app(SurveyMode::Single);
        moved(&mut app, 40, 10, 500);
        app.select_answer(1, 0, 1000);
        app.select_answer(1, 1, 4000);
        app.submit(5000);

        let out = rendered(&render_app(&app));
        assert!(out.contains("Q1"));
        assert!(out.contains("60.0%"));
        assert!(out.contains("samples 1"));
        assert!(out.contains("(r)eplay"));
        assert!(out.contains("(m)ode: multi"));
    }

    #[test]
    fn test_results_without_samples_mark_replay_unavailable() {
        let mut app = create_test_app(SurveyMode::Single);
        app.select_answer(1, 0, 1000);
        app.submit(5000);

        let out = rendered(&render_app(&app));
        assert!(out.contains("replay unavailable"));
    }

    #[test]
    fn test_zero_duration_question_gets_no_panel() {
        let mut app = create_test_app(SurveyMode::Single);
        app.select_answer(1, 0, 0);
        app.submit(0);

        let out = rendered(&render_app(&app));
        assert!(!out.contains("Q1"));
        assert!(!out.contains("share"));
        assert!(!out.contains('%'));
        assert!(out.contains("(r)eplay"));
    }

    #[test]
    fn test_replay_progress_is_reported() {
        let mut app = create_test_app(SurveyMode::Single);
        moved(&mut app, 40, 10, 100);
        moved(&mut app, 45, 12, 200);
        moved(&mut app, 50, 14, 300);
        app.select_answer(1, 0, 400);
        app.submit(500);
        app.start_replay(1000);
        app.fire_due_timers(1010);

        let out = rendered(&render_app(&app));
        assert!(out.contains("replaying 1/3"));
    }

    #[test]
    fn test_hidden_panels_are_not_drawn() {
        let mut app = create_test_app(SurveyMode::Single);
        app.select_answer(1, 0, 1000);
        app.submit(5000);
        app.on_key(crossterm::event::KeyEvent::from(crossterm::event::KeyCode::Char('h')), 5100);

        let out = rendered(&render_app(&app));
        assert!(!out.contains("Q1"));
        assert!(!out.contains("share"));
    }

    #[test]
    fn test_tiny_area_renders_without_panic() {
        let mut app = create_test_app(SurveyMode::Multi);
        app.on_resize(4, 2);
        let _ = render_app(&app);
        app.on_resize(0, 0);
        let _ = render_app(&app);
    }
}
