use ratatui::style::Color;

/// Minimal 2D drawing context the replay engine paints onto
pub trait DrawingSurface {
    fn size(&self) -> (f64, f64);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self, color: Color);
    /// Filled full circle; `opacity` in `0.0..=1.0`
    fn fill_arc(&mut self, x: f64, y: f64, radius: f64, color: Color, opacity: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Segment {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
    },
    Dot {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        opacity: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: Color,
    },
}

/// Surface that records drawing operations so a frontend can paint them later.
///
/// There is no partial erase: any clear drops everything recorded so far.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
    cursor: Option<(f64, f64)>,
    path: Vec<((f64, f64), (f64, f64))>,
}

impl DisplayList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn segment_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Segment { .. }))
            .count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl DrawingSurface for DisplayList {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
        self.ops.clear();
        self.path.clear();
        self.cursor = None;
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.cursor = None;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if let Some(from) = self.cursor {
            self.path.push((from, (x, y)));
        }
        self.cursor = Some((x, y));
    }

    fn stroke(&mut self, color: Color) {
        for (from, to) in self.path.drain(..) {
            self.ops.push(DrawOp::Segment { from, to, color });
        }
    }

    fn fill_arc(&mut self, x: f64, y: f64, radius: f64, color: Color, opacity: f64) {
        self.ops.push(DrawOp::Dot {
            x,
            y,
            radius,
            color,
            opacity: opacity.clamp(0.0, 1.0),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}
