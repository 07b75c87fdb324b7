use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Widget},
};

use crate::app::ResultsView;
use crate::metrics::{PhaseShare, QuestionMetrics};
use crate::phase::Phase;
use crate::survey::Question;
use crate::ui::charting::format_duration;

/// borders + answer line + header + one row per phase
pub const PANEL_HEIGHT: u16 = 2 + 1 + 1 + 3;
pub const PANEL_WIDTH: u16 = 38;

pub struct PhaseRowData {
    pub phase: Phase,
    /// `None` when the phase could not be measured
    pub share: Option<PhaseShare>,
}

/// Pure presenter for a single phase row
pub fn present_row(data: &PhaseRowData) -> Row<'static> {
    let name_style = Style::default()
        .fg(data.phase.color())
        .add_modifier(Modifier::BOLD);

    let (elapsed, percent) = match data.share {
        Some(share) => (
            format_duration(share.elapsed_ms),
            format!("{:.1}%", share.percentage),
        ),
        None => ("—".to_string(), "—".to_string()),
    };

    Row::new(vec![
        Cell::from(data.phase.to_string()).style(name_style),
        Cell::from(elapsed),
        Cell::from(percent),
    ])
}

pub fn phase_rows(metrics: &QuestionMetrics) -> Vec<PhaseRowData> {
    vec![
        PhaseRowData {
            phase: Phase::Pre,
            share: metrics.pre,
        },
        PhaseRowData {
            phase: Phase::During,
            share: Some(metrics.during),
        },
        PhaseRowData {
            phase: Phase::Post,
            share: Some(metrics.post),
        },
    ]
}

/// One bordered panel: chosen answer plus the phase table
pub fn render_panel(
    question: &Question,
    answer: Option<&str>,
    metrics: &QuestionMetrics,
    area: Rect,
    buf: &mut Buffer,
) {
    Clear.render(area, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Q{}", question.id));
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    Paragraph::new(Line::from(vec![
        Span::styled("answer ", Style::default().fg(Color::Gray)),
        Span::styled(
            answer.unwrap_or("—").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]))
    .render(chunks[0], buf);

    let header = Row::new(vec![
        Cell::from("phase"),
        Cell::from("time"),
        Cell::from("share"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = phase_rows(metrics).iter().map(present_row).collect();
    let widths = [
        Constraint::Length(7),
        Constraint::Length(14),
        Constraint::Min(6),
    ];
    Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .render(chunks[1], buf);
}

/// Stack one panel per measurable question down the right edge of `area`;
/// questions without metrics get no panel.
pub fn render_panels(results: &ResultsView, area: Rect, buf: &mut Buffer) {
    let width = PANEL_WIDTH.min(area.width);
    let mut y = area.y;

    for question in results.questionnaire.questions() {
        if y >= area.bottom() {
            break;
        }
        let Some(Ok(metrics)) = results.metrics.for_question(question.id) else {
            continue;
        };
        let height = PANEL_HEIGHT.min(area.bottom() - y);
        let panel = Rect::new(area.right() - width, y, width, height);
        render_panel(
            question,
            results.session.selected_answer(question.id),
            metrics,
            panel,
            buf,
        );
        y = y.saturating_add(PANEL_HEIGHT);
    }
}
