use super::metrics::{text_width, Font};
use crate::rubric::error::EvaluationError;
use tracing::debug;

/// Fixed page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
}

impl PageGeometry {
    pub const fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin_top: 36.0,
            margin_bottom: 72.0,
            margin_left: 43.2,
            margin_right: 43.2,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn content_height(&self) -> f64 {
        self.height - self.margin_top - self.margin_bottom
    }

    fn top(&self) -> f64 {
        self.height - self.margin_top
    }

    fn bottom(&self) -> f64 {
        self.margin_bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f64,
    pub leading: f64,
    pub space_before: f64,
    pub space_after: f64,
}

pub const TITLE_STYLE: TextStyle = TextStyle {
    font: Font::Bold,
    size: 11.0,
    leading: 13.2,
    space_before: 0.0,
    space_after: 8.0,
};

pub const HEADING_STYLE: TextStyle = TextStyle {
    font: Font::Bold,
    size: 10.0,
    leading: 12.0,
    space_before: 8.0,
    space_after: 4.0,
};

pub const BODY_STYLE: TextStyle = TextStyle {
    font: Font::Regular,
    size: 8.0,
    leading: 10.0,
    space_before: 0.0,
    space_after: 2.0,
};

const FOOTER_SIZE: f64 = 8.0;
const FOOTER_BASELINE: f64 = 36.0;
const BULLET: &str = "•";
const BULLET_INDENT: f64 = 8.0;
const CELL_PADDING_X: f64 = 4.0;
const HEADER_PADDING_Y: f64 = 6.0;
const BODY_PADDING_Y: f64 = 3.0;
const HEADER_FILL: f64 = 0.827;
const STRIPE_FILL: f64 = 0.941;

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub font: Font,
    pub text: String,
}

impl TextRun {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            font: Font::Regular,
            text: text.into(),
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            font: Font::Bold,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub header: String,
    pub width: f64,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

/// Flow content handed to the paginator.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    /// Body-sized text that stays on the same page as the block after it.
    Label(Vec<TextRun>),
    Paragraph(Vec<TextRun>),
    Bullet(String),
    Spacer(f64),
    Table(TableBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        size: f64,
        runs: Vec<TextRun>,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        gray: f64,
    },
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
    pub footer: Option<String>,
}

impl Page {
    /// Concatenated text of every run on the page, one line per draw op.
    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        for op in &self.ops {
            if let DrawOp::Text { runs, .. } = op {
                lines.push(runs.iter().map(|run| run.text.as_str()).collect::<String>());
            }
        }
        lines.join("\n")
    }
}

/// Output of both pagination passes: every page laid out and footers stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn footer(&self, index: usize) -> Option<&str> {
        self.pages.get(index).and_then(|page| page.footer.as_deref())
    }
}

pub fn footer_label(page: usize, total: usize) -> String {
    format!("Página {page} de {total}")
}

/// Pass one: flows blocks into buffered pages. No footer is known yet.
pub fn layout(blocks: &[Block], geometry: PageGeometry) -> Result<Vec<Page>, EvaluationError> {
    let mut paginator = Paginator::new(geometry);
    for (index, block) in blocks.iter().enumerate() {
        paginator.place(block, blocks.get(index + 1))?;
    }
    let pages = paginator.finish();
    debug!(pages = pages.len(), "laid out report pages");
    Ok(pages)
}

/// Pass two: with the page total known, stamps "Página i de N" on every page.
pub fn stamp_footers(mut pages: Vec<Page>, geometry: PageGeometry) -> LaidOutDocument {
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        let label = footer_label(index + 1, total);
        let width = text_width(Font::Regular, &label, FOOTER_SIZE);
        page.ops.push(DrawOp::Text {
            x: geometry.width - geometry.margin_right - width,
            y: FOOTER_BASELINE,
            size: FOOTER_SIZE,
            runs: vec![TextRun::regular(label.clone())],
        });
        page.footer = Some(label);
    }

    LaidOutDocument { geometry, pages }
}

struct Paginator {
    geometry: PageGeometry,
    pages: Vec<Page>,
    current: Page,
    cursor: f64,
}

impl Paginator {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            cursor: geometry.top(),
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }

    fn at_page_top(&self) -> bool {
        (self.cursor - self.geometry.top()).abs() < f64::EPSILON
    }

    fn break_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor = self.geometry.top();
    }

    /// Starts a new page unless `height` still fits above the bottom margin.
    fn reserve(&mut self, height: f64) -> Result<(), EvaluationError> {
        if height > self.geometry.content_height() {
            return Err(EvaluationError::render(format!(
                "element of {height:.1}pt exceeds the {:.1}pt content area",
                self.geometry.content_height()
            )));
        }
        if self.cursor - height < self.geometry.bottom() {
            self.break_page();
        }
        Ok(())
    }

    fn advance(&mut self, amount: f64) {
        self.cursor = (self.cursor - amount).max(self.geometry.bottom());
    }

    fn place(&mut self, block: &Block, next: Option<&Block>) -> Result<(), EvaluationError> {
        let keep = next.map_or(0.0, lead_height);
        match block {
            Block::Title(text) => self.place_text(&[TextRun::bold(text.clone())], TITLE_STYLE, keep),
            Block::Heading(text) => {
                self.place_text(&[TextRun::bold(text.clone())], HEADING_STYLE, keep)
            }
            Block::Label(runs) => self.place_text(runs, BODY_STYLE, keep),
            Block::Paragraph(runs) => self.place_text(runs, BODY_STYLE, 0.0),
            Block::Bullet(text) => self.place_bullet(text),
            Block::Spacer(height) => {
                self.advance(*height);
                Ok(())
            }
            Block::Table(table) => self.place_table(table),
        }
    }

    /// Lays out wrapped text. A non-zero `keep_with_next` is the height the
    /// following block needs; the whole text is reserved together with it so
    /// headings and labels never end a page alone.
    fn place_text(
        &mut self,
        runs: &[TextRun],
        style: TextStyle,
        keep_with_next: f64,
    ) -> Result<(), EvaluationError> {
        let lines = wrap_runs(runs, style, self.geometry.content_width());

        let space_before = if self.at_page_top() {
            0.0
        } else {
            style.space_before
        };
        let leading_block = if keep_with_next > 0.0 {
            lines.len() as f64 * style.leading + style.space_after + keep_with_next
        } else {
            style.leading
        };
        self.reserve(space_before + leading_block)?;
        if !self.at_page_top() {
            self.advance(space_before);
        }

        for line in lines {
            self.reserve(style.leading)?;
            self.current.ops.push(DrawOp::Text {
                x: self.geometry.margin_left,
                y: self.cursor - style.size,
                size: style.size,
                runs: with_font(line, style.font),
            });
            self.advance(style.leading);
        }

        self.advance(style.space_after);
        Ok(())
    }

    fn place_bullet(&mut self, text: &str) -> Result<(), EvaluationError> {
        let style = BODY_STYLE;
        let width = self.geometry.content_width() - BULLET_INDENT;
        let lines = wrap_runs(&[TextRun::regular(text)], style, width);

        for (index, line) in lines.into_iter().enumerate() {
            self.reserve(style.leading)?;
            let baseline = self.cursor - style.size;
            if index == 0 {
                self.current.ops.push(DrawOp::Text {
                    x: self.geometry.margin_left,
                    y: baseline,
                    size: style.size,
                    runs: vec![TextRun::regular(BULLET)],
                });
            }
            self.current.ops.push(DrawOp::Text {
                x: self.geometry.margin_left + BULLET_INDENT,
                y: baseline,
                size: style.size,
                runs: line,
            });
            self.advance(style.leading);
        }

        self.advance(style.space_after);
        Ok(())
    }

    fn place_table(&mut self, table: &TableBlock) -> Result<(), EvaluationError> {
        let header = table_header(table);

        self.reserve(table_lead_height(table))?;
        self.place_table_row(table, &header, RowKind::Header)?;
        for (index, row) in table.rows.iter().enumerate() {
            let kind = RowKind::Body { striped: index % 2 == 1 };
            let height = row_height(table, row, kind);
            if self.cursor - height < self.geometry.bottom() {
                self.break_page();
                self.place_table_row(table, &header, RowKind::Header)?;
            }
            self.place_table_row(table, row, kind)?;
        }

        self.advance(BODY_STYLE.space_after);
        Ok(())
    }

    fn place_table_row(
        &mut self,
        table: &TableBlock,
        cells: &[String],
        kind: RowKind,
    ) -> Result<(), EvaluationError> {
        let height = row_height(table, cells, kind);
        self.reserve(height)?;

        let (font, padding_y, fill) = match kind {
            RowKind::Header => (Font::Bold, HEADER_PADDING_Y, Some(HEADER_FILL)),
            RowKind::Body { striped } => {
                (Font::Regular, BODY_PADDING_Y, striped.then_some(STRIPE_FILL))
            }
        };
        let style = TextStyle { font, ..BODY_STYLE };
        let row_top = self.cursor;
        let row_bottom = row_top - height;
        let mut x = self.geometry.margin_left;

        for (column, cell) in table.columns.iter().zip(cells) {
            if let Some(gray) = fill {
                self.current.ops.push(DrawOp::FillRect {
                    x,
                    y: row_bottom,
                    width: column.width,
                    height,
                    gray,
                });
            }
            self.current.ops.push(DrawOp::StrokeRect {
                x,
                y: row_bottom,
                width: column.width,
                height,
            });

            let inner = column.width - 2.0 * CELL_PADDING_X;
            let lines = wrap_runs(&[TextRun { font, text: cell.clone() }], style, inner);
            let mut baseline = row_top - padding_y - style.size;
            for line in lines {
                let line_width: f64 = line
                    .iter()
                    .map(|run| text_width(run.font, &run.text, style.size))
                    .sum();
                let offset = match column.align {
                    Align::Left => CELL_PADDING_X,
                    Align::Center => ((column.width - line_width) / 2.0).max(CELL_PADDING_X),
                };
                self.current.ops.push(DrawOp::Text {
                    x: x + offset,
                    y: baseline,
                    size: style.size,
                    runs: line,
                });
                baseline -= style.leading;
            }

            x += column.width;
        }

        self.advance(height);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum RowKind {
    Header,
    Body { striped: bool },
}

fn row_height(table: &TableBlock, cells: &[String], kind: RowKind) -> f64 {
    let (font, padding_y) = match kind {
        RowKind::Header => (Font::Bold, HEADER_PADDING_Y),
        RowKind::Body { .. } => (Font::Regular, BODY_PADDING_Y),
    };
    let style = TextStyle { font, ..BODY_STYLE };
    let lines = table
        .columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| {
            let inner = column.width - 2.0 * CELL_PADDING_X;
            wrap_runs(&[TextRun { font, text: cell.clone() }], style, inner).len()
        })
        .max()
        .unwrap_or(1)
        .max(1);

    lines as f64 * style.leading + 2.0 * padding_y
}

/// Height the start of `block` needs on a page: its first line, or for a
/// table the header plus the first body row.
fn lead_height(block: &Block) -> f64 {
    let text_lead = |style: TextStyle| style.space_before + style.leading;
    match block {
        Block::Title(_) => text_lead(TITLE_STYLE),
        Block::Heading(_) => text_lead(HEADING_STYLE),
        Block::Label(_) | Block::Paragraph(_) | Block::Bullet(_) => text_lead(BODY_STYLE),
        Block::Spacer(_) => 0.0,
        Block::Table(table) => table_lead_height(table),
    }
}

fn table_header(table: &TableBlock) -> Vec<String> {
    table
        .columns
        .iter()
        .map(|column| column.header.clone())
        .collect()
}

/// Header row plus the first body row, which never part on a page break.
fn table_lead_height(table: &TableBlock) -> f64 {
    let header = row_height(table, &table_header(table), RowKind::Header);
    let first = table.rows.first().map_or(0.0, |row| {
        row_height(table, row, RowKind::Body { striped: false })
    });
    header + first
}

fn with_font(line: Vec<TextRun>, font: Font) -> Vec<TextRun> {
    if font == Font::Regular {
        return line;
    }
    line.into_iter()
        .map(|run| TextRun { font, text: run.text })
        .collect()
}

#[derive(Debug)]
struct Word {
    font: Font,
    text: String,
    space_before: bool,
}

fn split_words(runs: &[TextRun]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending_space = false;

    for run in runs {
        let mut current = String::new();
        for ch in run.text.chars() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(Word {
                        font: run.font,
                        text: std::mem::take(&mut current),
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else {
                if current.is_empty() && words.is_empty() {
                    pending_space = false;
                }
                current.push(ch);
            }
        }
        if !current.is_empty() {
            words.push(Word {
                font: run.font,
                text: current,
                space_before: pending_space,
            });
            pending_space = false;
        }
    }

    words
}

/// Greedy word wrap over styled runs. Words wider than the line are split by character.
pub(crate) fn wrap_runs(runs: &[TextRun], style: TextStyle, max_width: f64) -> Vec<Vec<TextRun>> {
    let space = text_width(Font::Regular, " ", style.size);
    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    let mut line: Vec<TextRun> = Vec::new();
    let mut line_width = 0.0;

    for word in split_words(runs) {
        let word_width = text_width(word.font, &word.text, style.size);
        let gap = if word.space_before && !line.is_empty() {
            space
        } else {
            0.0
        };

        if !line.is_empty() && line_width + gap + word_width > max_width {
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
        }

        if line.is_empty() && word_width > max_width {
            for piece in split_long_word(&word.text, word.font, style.size, max_width) {
                let piece_width = text_width(word.font, &piece, style.size);
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                push_text(&mut line, word.font, &piece, false);
                line_width = piece_width;
            }
            continue;
        }

        let needs_space = word.space_before && !line.is_empty();
        if needs_space {
            line_width += space;
        }
        push_text(&mut line, word.font, &word.text, needs_space);
        line_width += word_width;
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }

    lines
}

fn push_text(line: &mut Vec<TextRun>, font: Font, text: &str, space_before: bool) {
    match line.last_mut() {
        Some(last) if last.font == font => {
            if space_before {
                last.text.push(' ');
            }
            last.text.push_str(text);
        }
        Some(last) => {
            if space_before {
                last.text.push(' ');
            }
            line.push(TextRun {
                font,
                text: text.to_string(),
            });
        }
        None => line.push(TextRun {
            font,
            text: text.to_string(),
        }),
    }
}

fn split_long_word(word: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if text_width(font, &current, size) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
