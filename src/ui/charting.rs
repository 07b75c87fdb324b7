use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as Segment, Points},
        Widget,
    },
};

use crate::surface::{DisplayList, DrawOp};
use crate::util::group_thousands;

const FILL_STEP: f64 = 0.25;

/// Paints a recorded display list onto a braille canvas.
///
/// Display list coordinates are terminal cells with y growing downwards; the
/// canvas grows upwards, so rows are flipped and every point is moved to the
/// centre of its cell.
pub struct TrailCanvas<'a> {
    list: &'a DisplayList,
}

impl<'a> TrailCanvas<'a> {
    pub fn new(list: &'a DisplayList) -> Self {
        Self { list }
    }
}

impl Widget for TrailCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let left = area.left() as f64;
        let right = area.right() as f64;
        let top = area.top() as f64;
        let bottom = area.bottom() as f64;
        let to_canvas = |x: f64, y: f64| (x + 0.5, bottom + top - (y + 0.5));

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([left, right])
            .y_bounds([top, bottom])
            .paint(|ctx| paint_ops(ctx, self.list.ops(), &to_canvas))
            .render(area, buf);
    }
}

fn paint_ops(ctx: &mut Context, ops: &[DrawOp], to_canvas: &dyn Fn(f64, f64) -> (f64, f64)) {
    for op in ops {
        match op {
            DrawOp::Segment { from, to, color } => {
                let (x1, y1) = to_canvas(from.0, from.1);
                let (x2, y2) = to_canvas(to.0, to.1);
                ctx.draw(&Segment::new(x1, y1, x2, y2, *color));
            }
            DrawOp::Dot {
                x,
                y,
                radius,
                color,
                opacity,
            } => {
                let (cx, cy) = to_canvas(*x, *y);
                let color = blend(*color, *opacity);
                let mut r = *radius;
                while r > 0.0 {
                    ctx.draw(&Circle {
                        x: cx,
                        y: cy,
                        radius: r,
                        color,
                    });
                    r -= FILL_STEP;
                }
                ctx.draw(&Points {
                    coords: &[(cx, cy)],
                    color,
                });
            }
            DrawOp::Text { x, y, text, color } => {
                let (tx, ty) = to_canvas(*x, *y);
                ctx.print(tx, ty, Line::styled(text.clone(), Style::default().fg(*color)));
            }
        }
    }
}

/// Blend towards a black background; named colors have no channels to scale
pub fn blend(color: Color, opacity: f64) -> Color {
    let opacity = opacity.clamp(0.0, 1.0);
    match color {
        Color::Rgb(r, g, b) => {
            let scale = |c: u8| (c as f64 * opacity).round() as u8;
            Color::Rgb(scale(r), scale(g), scale(b))
        }
        other => other,
    }
}

/// `1,234 ms`
pub fn format_duration(ms: u64) -> String {
    format!("{} ms", group_thousands(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawingSurface;

    fn rendered(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_blend_scales_rgb_channels() {
        assert_eq!(blend(Color::Rgb(200, 100, 0), 0.5), Color::Rgb(100, 50, 0));
        assert_eq!(blend(Color::Rgb(200, 100, 0), 1.0), Color::Rgb(200, 100, 0));
        assert_eq!(blend(Color::Rgb(200, 100, 0), 7.0), Color::Rgb(200, 100, 0));
        assert_eq!(blend(Color::DarkGray, 0.2), Color::DarkGray);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0 ms");
        assert_eq!(format_duration(1234567), "1,234,567 ms");
    }

    #[test]
    fn test_trail_canvas_draws_segments_and_text() {
        let mut list = DisplayList::new(20.0, 6.0);
        list.begin_path();
        list.move_to(1.0, 1.0);
        list.line_to(10.0, 4.0);
        list.stroke(Color::Blue);
        list.fill_text("2.5s", 12.0, 2.0, Color::DarkGray);

        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        TrailCanvas::new(&list).render(area, &mut buf);

        let out = rendered(&buf);
        assert!(out.contains("2.5s"));
        assert!(out.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
    }

    #[test]
    fn test_text_lands_on_its_row() {
        let mut list = DisplayList::new(20.0, 6.0);
        list.fill_text("hi", 3.0, 1.0, Color::White);

        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        TrailCanvas::new(&list).render(area, &mut buf);

        let row: String = (0..20u16).map(|x| buf[(x, 1u16)].symbol().to_string()).collect();
        assert!(row.contains("hi"));
    }

    #[test]
    fn test_empty_area_is_a_noop() {
        let list = DisplayList::new(0.0, 0.0);
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        TrailCanvas::new(&list).render(area, &mut buf);
    }
}
