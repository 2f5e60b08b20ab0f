//! In-memory model of a WordprocessingML document body.
//!
//! The model covers the subset of the format that certificate templates use:
//! body paragraphs, styled runs, one level of tables, and section geometry.
//! Parsing and serialization of the actual package live in the backend
//! crate; everything in the generation pipeline mutates this model only, so
//! the substitution and table logic stays testable without touching a ZIP
//! container.
//!
//! Mutating helpers mirror how the pipeline works: paragraphs are rebuilt
//! from scratch during substitution (existing runs are discarded and
//! re-emitted segment by segment), table rows are cleared and re-appended
//! when a coordinate grid or roster is filled.

use crate::units::cm_to_twips;

/// Paragraph or table alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justified,
}

/// Line spacing rule for a paragraph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineSpacing {
    /// Single spacing (`w:line="240" w:lineRule="auto"`).
    Single,
    /// Multiple of single spacing (1.5, 2.0, ...).
    Multiple(f64),
}

/// Character formatting applied to a run.
///
/// `None` fields inherit whatever the document defaults or the paragraph
/// style provide; only explicit `Some` values are written out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFont {
    /// Font family name (`w:rFonts w:ascii`).
    pub name: Option<String>,
    /// Font size in points.
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub underline: Option<bool>,
}

/// A contiguous span of identically formatted text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub font: RunFont,
}

impl Run {
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, font: RunFont) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }
}

/// Paragraph-level formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphFormat {
    /// Named paragraph style id, passed through untouched.
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    /// Spacing after the paragraph, in points.
    pub space_after: Option<f64>,
    pub line_spacing: Option<LineSpacing>,
}

/// One paragraph: formatting plus an ordered list of runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub format: ParagraphFormat,
}

impl Paragraph {
    /// Paragraph holding a single styled run.
    #[must_use]
    pub fn styled(text: impl Into<String>, font: RunFont) -> Self {
        Self {
            runs: vec![Run::new(text, font)],
            format: ParagraphFormat::default(),
        }
    }

    /// Full text of the paragraph, runs concatenated in order.
    ///
    /// This is the string the substitution engine matches placeholder tokens
    /// against; a token split across runs by the editor is still found.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Replace all runs, keeping paragraph formatting.
    #[inline]
    pub fn set_runs(&mut self, runs: Vec<Run>) {
        self.runs = runs;
    }
}

/// One table cell; holds its own paragraphs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

impl TableCell {
    /// Cell with one empty paragraph (the minimum a cell can hold).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            paragraphs: vec![Paragraph::default()],
        }
    }

    /// Replace the cell content with a single styled run.
    pub fn set_styled_text(&mut self, text: &str, font: RunFont, centered: bool) {
        let mut para = Paragraph::styled(text, font);
        if centered {
            para.format.alignment = Some(Alignment::Center);
        }
        self.paragraphs = vec![para];
    }

    /// Full text of the cell, paragraphs joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One table row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Row of `n` empty cells.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self {
            cells: (0..n).map(|_| TableCell::empty()).collect(),
        }
    }
}

/// A table: a column grid plus rows of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column widths in twips; the grid length is the column count.
    pub grid: Vec<u32>,
    pub rows: Vec<TableRow>,
    pub alignment: Option<Alignment>,
    /// Uniform single borders on every edge and inner rule.
    pub bordered: bool,
}

impl Table {
    /// Number of grid columns.
    #[inline]
    #[must_use]
    pub fn columns(&self) -> usize {
        self.grid.len()
    }

    /// Grow the grid to `n` columns, each new column `width` twips wide.
    pub fn extend_columns(&mut self, n: usize, width: u32) {
        while self.grid.len() < n {
            self.grid.push(width);
        }
    }
}

/// Section geometry: page size and margins, all in twips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionProps {
    pub page_width: u32,
    pub page_height: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
}

impl Default for SectionProps {
    fn default() -> Self {
        // A4 portrait with Word's default 2.5 cm margins.
        Self {
            page_width: 11906,
            page_height: 16838,
            margin_top: cm_to_twips(2.5),
            margin_bottom: cm_to_twips(2.5),
            margin_left: cm_to_twips(2.5),
            margin_right: cm_to_twips(2.5),
        }
    }
}

impl SectionProps {
    /// Set all four margins to the same value.
    #[inline]
    pub fn set_margins(&mut self, twips: u32) {
        self.margin_top = twips;
        self.margin_bottom = twips;
        self.margin_left = twips;
        self.margin_right = twips;
    }
}

/// Top-level body content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// The document body: ordered blocks plus section geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxDocument {
    pub blocks: Vec<Block>,
    pub section: SectionProps,
}

impl DocxDocument {
    /// Append a body paragraph.
    #[inline]
    pub fn push_paragraph(&mut self, para: Paragraph) {
        self.blocks.push(Block::Paragraph(para));
    }

    /// Append a body table.
    #[inline]
    pub fn push_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Iterate over body paragraphs (tables excluded), in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Mutable access to body paragraphs (tables excluded).
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Iterate over body tables, in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Mutable access to body tables, in document order.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Number of body tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// The `index`-th body table, if it exists.
    pub fn table_mut(&mut self, index: usize) -> Option<&mut Table> {
        self.tables_mut().nth(index)
    }

    /// Concatenated text of every paragraph and table cell, in document
    /// order. Round-trip tests compare this before and after serialization.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => {
                    out.push_str(&p.text());
                    out.push('\n');
                }
                Block::Table(t) => {
                    for row in &t.rows {
                        for cell in &row.cells {
                            out.push_str(&cell.text());
                            out.push('\t');
                        }
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}
