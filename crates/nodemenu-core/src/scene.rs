//! [`Scene`]: the list of text runs a model paints each frame.

use crate::geom::{Point, Range};

/// Colour role of a text run; drivers map tones to concrete colours.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Normal,
    /// Popup surfaces.
    Surface,
    /// Selected or hovered content.
    Highlight,
    /// Secondary text such as hints and status lines.
    Muted,
}

/// A string drawn left to right starting at `pos`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub pos: Point,
    pub text: String,
    pub tone: Tone,
}

/// Everything to show on screen for one frame, painted in order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    size: Point,
    runs: Vec<TextRun>,
}

impl Scene {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: Point::new(width.max(0), height.max(0)),
            runs: Vec::new(),
        }
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn bounds(&self) -> Range {
        Range::at(Point::ZERO, self.size)
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.size = Point::new(width.max(0), height.max(0));
    }

    /// Queue `text` at `pos`. Runs starting off screen are dropped; runs
    /// overflowing the right edge are cut.
    pub fn print(&mut self, pos: Point, text: &str, tone: Tone) {
        if !self.bounds().contains(pos) {
            return;
        }
        let room = (self.size.x - pos.x) as usize;
        let text: String = text.chars().take(room).collect();
        self.runs.push(TextRun { pos, text, tone });
    }

    /// Paint every cell of `range` (clipped to the scene) with blanks.
    pub fn fill(&mut self, range: Range, tone: Tone) {
        let r = range.intersect(self.bounds());
        if r.is_empty() {
            return;
        }
        let blank = " ".repeat(r.width() as usize);
        for y in r.min.y..r.max.y {
            self.runs.push(TextRun {
                pos: Point::new(r.min.x, y),
                text: blank.clone(),
                tone,
            });
        }
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }
}
