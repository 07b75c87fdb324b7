use ratatui::layout::{Margin, Position, Rect};
use unicode_width::UnicodeWidthStr;

use crate::sampler::HitTest;
use crate::survey::{QuestionId, Questionnaire};

pub const HORIZONTAL_MARGIN: u16 = 5;
pub const VERTICAL_MARGIN: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSlot {
    pub id: QuestionId,
    /// title plus every answer row; the pointer hit box for the question
    pub area: Rect,
    pub title: Rect,
    pub answers: Vec<Rect>,
}

/// Screen geometry of the survey form.
///
/// Computed from the terminal size alone so the renderer and the mouse
/// hit-testing agree without sharing mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyLayout {
    pub header: Rect,
    pub questions: Vec<QuestionSlot>,
    pub submit: Rect,
}

struct Rows {
    x: u16,
    width: u16,
    y: u16,
    bottom: u16,
}

impl Rows {
    fn take(&mut self, height: u16) -> Rect {
        let y = self.y.min(self.bottom);
        let visible = height.min(self.bottom - y);
        self.y = self.y.saturating_add(height);
        Rect::new(self.x, y, self.width, visible)
    }
}

/// Rows a title takes when word-wrapped at `width`; words wider than a row
/// are broken across as many rows as they need.
fn wrapped_lines(text: &str, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    let width = width as usize;
    let mut lines = 1usize;
    let mut used = 0usize;

    for word in text.split_whitespace() {
        let w = word.width();
        if used > 0 {
            if used + 1 + w <= width {
                used += 1 + w;
                continue;
            }
            lines += 1;
        }
        let overflow = w.saturating_sub(1) / width;
        lines += overflow;
        used = w - overflow * width;
    }

    lines.min(u16::MAX as usize) as u16
}

impl SurveyLayout {
    pub fn compute(area: Rect, questionnaire: &Questionnaire) -> Self {
        let inner = area.inner(Margin::new(HORIZONTAL_MARGIN, VERTICAL_MARGIN));
        let mut rows = Rows {
            x: inner.x,
            width: inner.width,
            y: inner.y,
            bottom: inner.bottom(),
        };

        let header = rows.take(1);
        rows.take(1);

        let questions = questionnaire
            .questions()
            .iter()
            .map(|q| {
                let title = rows.take(wrapped_lines(&q.title, inner.width));
                let answers: Vec<Rect> = q.answers.iter().map(|_| rows.take(1)).collect();
                rows.take(1);

                let area = answers
                    .last()
                    .map_or(title, |last| title.union(*last));
                QuestionSlot {
                    id: q.id,
                    area,
                    title,
                    answers,
                }
            })
            .collect();

        let submit = rows.take(1);

        Self {
            header,
            questions,
            submit,
        }
    }

    pub fn question_at(&self, column: u16, row: u16) -> Option<QuestionId> {
        let pos = Position::new(column, row);
        self.questions
            .iter()
            .find(|slot| !slot.area.is_empty() && slot.area.contains(pos))
            .map(|slot| slot.id)
    }

    pub fn answer_at(&self, column: u16, row: u16) -> Option<(QuestionId, usize)> {
        let pos = Position::new(column, row);
        self.questions.iter().find_map(|slot| {
            slot.answers
                .iter()
                .position(|r| !r.is_empty() && r.contains(pos))
                .map(|idx| (slot.id, idx))
        })
    }

    pub fn is_submit(&self, column: u16, row: u16) -> bool {
        !self.submit.is_empty() && self.submit.contains(Position::new(column, row))
    }
}

impl HitTest for SurveyLayout {
    fn question_at(&self, x: f64, y: f64) -> Option<QuestionId> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        SurveyLayout::question_at(self, x as u16, y as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::{Question, SurveyMode};

    fn multi_layout() -> SurveyLayout {
        SurveyLayout::compute(
            Rect::new(0, 0, 100, 40),
            &Questionnaire::builtin(SurveyMode::Multi),
        )
    }

    #[test]
    fn questions_stack_vertically_inside_margins() {
        let layout = multi_layout();
        assert_eq!(layout.header, Rect::new(5, 2, 90, 1));
        assert_eq!(layout.questions.len(), 2);

        let q1 = &layout.questions[0];
        let q2 = &layout.questions[1];
        assert_eq!(q1.title.y, 4);
        assert_eq!(q1.answers.len(), 5);
        assert_eq!(q1.answers[0].y, 5);
        assert_eq!(q1.area.height, 6);
        assert!(q2.area.y > q1.area.bottom());
        assert!(layout.submit.y > q2.area.bottom());
    }

    #[test]
    fn hit_testing_finds_question_and_answer() {
        let layout = multi_layout();
        let q2_answer = layout.questions[1].answers[3];

        assert_eq!(layout.question_at(10, q2_answer.y), Some(2));
        assert_eq!(layout.answer_at(10, q2_answer.y), Some((2, 3)));
        assert_eq!(layout.question_at(10, layout.questions[0].title.y), Some(1));
        assert_eq!(layout.answer_at(10, layout.questions[0].title.y), None);
    }

    #[test]
    fn margins_and_gaps_hit_nothing() {
        let layout = multi_layout();
        assert_eq!(layout.question_at(0, 5), None);
        assert_eq!(layout.question_at(10, 0), None);
        let gap = layout.questions[0].area.bottom();
        assert_eq!(layout.question_at(10, gap), None);
        assert_eq!(HitTest::question_at(&layout, -1.0, 5.0), None);
    }

    #[test]
    fn submit_button_is_hit() {
        let layout = multi_layout();
        assert!(layout.is_submit(20, layout.submit.y));
        assert!(!layout.is_submit(20, layout.submit.y + 1));
    }

    #[test]
    fn long_titles_wrap() {
        assert_eq!(wrapped_lines("abcdef", 3), 2);
        assert_eq!(wrapped_lines("abcdefg", 3), 3);
        assert_eq!(wrapped_lines("", 3), 1);
        assert_eq!(wrapped_lines("abc", 0), 1);
    }

    #[test]
    fn titles_wrap_on_word_boundaries() {
        assert_eq!(wrapped_lines("aaa bbbbbb cc", 8), 3);
        assert_eq!(wrapped_lines("aaa bbbb", 8), 1);
        assert_eq!(wrapped_lines("aaa bbbbb", 8), 2);
        assert_eq!(wrapped_lines("  spaced   out  ", 20), 1);
    }

    #[test]
    fn wrapped_title_keeps_answers_below_every_title_row() {
        let questionnaire = Questionnaire::new(
            SurveyMode::Single,
            vec![Question {
                id: 1,
                title: "aaa bbbbbb cc".into(),
                answers: vec!["yes".into(), "no".into()],
            }],
        )
        .unwrap();
        // 18 columns minus the horizontal margins leaves 8
        let layout = SurveyLayout::compute(Rect::new(0, 0, 18, 20), &questionnaire);
        let slot = &layout.questions[0];

        assert_eq!(slot.title.height, 3);
        assert_eq!(slot.answers[0].y, slot.title.bottom());
    }

    #[test]
    fn tiny_terminal_clips_instead_of_panicking() {
        let layout = SurveyLayout::compute(
            Rect::new(0, 0, 12, 6),
            &Questionnaire::builtin(SurveyMode::Multi),
        );
        assert!(layout.submit.is_empty());
        assert!(!layout.is_submit(6, 3));
        assert_eq!(layout.question_at(6, 100), None);
    }
}
