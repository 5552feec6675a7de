//! Line breaking and pagination.
//!
//! Pure geometry: turns a title and a body into positioned lines on pages.
//! Nothing here knows about PDF objects, which keeps the wrapping rules
//! testable on plain strings.

use super::fonts::Font;

const MM: f32 = 72.0 / 25.4;

/// Page size and margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// A4 portrait with 20 mm margins on every side.
    pub fn a4() -> Self {
        Self {
            width: 210.0 * MM,
            height: 297.0 * MM,
            margin: 20.0 * MM,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn top(&self) -> f32 {
        self.height - self.margin
    }

    fn bottom(&self) -> f32 {
        self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Paragraph style: font, size, leading, fill colour and trailing space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub leading: f32,
    /// RGB in 0.0–1.0.
    pub color: [f32; 3],
    pub space_after: f32,
}

impl TextStyle {
    /// Helvetica-Bold 20 pt in accent colour `#e26a4a`.
    pub fn title() -> Self {
        Self {
            font: Font::HelveticaBold,
            size: 20.0,
            leading: 24.0,
            color: [226.0 / 255.0, 106.0 / 255.0, 74.0 / 255.0],
            space_after: 12.0,
        }
    }

    /// Helvetica 12 pt on 16 pt leading, black.
    pub fn body() -> Self {
        Self {
            font: Font::Helvetica,
            size: 12.0,
            leading: 16.0,
            color: [0.0, 0.0, 0.0],
            space_after: 0.0,
        }
    }
}

/// Which paragraph a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Body,
}

/// One line of text placed at a baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub kind: LineKind,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Fixed vertical gap between the title block and the body.
pub const TITLE_SPACER: f32 = 10.0;

/// Greedy word wrap of one logical line (no `\n`) to `max_width` points.
///
/// Runs of whitespace collapse to a single space. A word wider than the line
/// is split between characters. An empty input yields one empty line.
pub fn wrap_line(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let space = font.text_width(" ", size);
    let mut current_width = 0.0f32;

    for word in text.split_whitespace() {
        let word_width = font.text_width(word, size);

        if word_width > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            for piece in split_word(word, font, size, max_width) {
                lines.push(piece);
            }
            // The last piece keeps filling the line.
            if let Some(last) = lines.pop() {
                current_width = font.text_width(&last, size);
                current = last;
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
        } else if current_width + space + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += space + word_width;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_width = word_width;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        let mut candidate = piece.clone();
        candidate.push(c);
        if !piece.is_empty() && font.text_width(&candidate, size) > max_width {
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        } else {
            piece = candidate;
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Break `body` into display lines: every `\n` forces a new line, and each
/// logical line is word-wrapped. Tabs expand to four spaces.
pub fn body_lines(body: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
    let normalised = body.replace("\r\n", "\n").replace('\r', "\n");
    normalised
        .split('\n')
        .flat_map(|line| {
            let line = line.replace('\t', "    ");
            wrap_line(&line, style.font, style.size, max_width)
        })
        .collect()
}

/// Lay out a title paragraph followed by a body paragraph on as many pages as
/// needed. Always returns at least one page.
pub fn layout(
    title: &str,
    body: &str,
    geometry: &PageGeometry,
    title_style: &TextStyle,
    body_style: &TextStyle,
) -> Vec<Page> {
    let width = geometry.content_width();
    let mut cursor = Cursor::new(geometry);

    let title_text = title.replace(['\r', '\n', '\t'], " ");
    for text in wrap_line(&title_text, title_style.font, title_style.size, width) {
        cursor.place(LineKind::Title, text, title_style.leading);
    }
    cursor.advance(title_style.space_after + TITLE_SPACER);

    for text in body_lines(body, body_style, width) {
        cursor.place(LineKind::Body, text, body_style.leading);
    }

    cursor.finish()
}

struct Cursor<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            y: geometry.top(),
        }
    }

    fn place(&mut self, kind: LineKind, text: String, leading: f32) {
        if self.y - leading < self.geometry.bottom() && !self.current.lines.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = self.geometry.top();
        }
        self.y -= leading;
        self.current.lines.push(PlacedLine {
            kind,
            text,
            x: self.geometry.margin,
            y: self.y,
        });
    }

    fn advance(&mut self, dy: f32) {
        // Vertical space never carries over to a new page.
        self.y = (self.y - dy).max(self.geometry.bottom());
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }
}
