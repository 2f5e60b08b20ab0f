//! WordprocessingML body parser.
//!
//! Event-driven parse of `word/document.xml` into the core model. There is
//! no maintained Rust reader for this format, so the package is walked by
//! hand with `quick-xml`: a state container tracks where in the body the
//! cursor is (paragraph, run, table cell, section properties) and builders
//! accumulate content until the closing tag flushes them.
//!
//! Only the template subset is modeled. Field instructions (`w:instrText`)
//! are skipped, breaks become newlines, and a table nested inside a cell is
//! flattened into that cell's paragraphs.

use delibex_core::{
    Alignment, Block, DelibexError, DocxDocument, LineSpacing, Paragraph, Result, Run, RunFont,
    Table, TableCell, TableRow,
};
use delibex_core::units::half_points_to_pt;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Extract an attribute value by key from an element.
#[inline]
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(std::result::Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Check if the `w:val` attribute is explicitly "0" or "false".
#[inline]
fn check_val_off(e: &BytesStart) -> bool {
    matches!(get_attr(e, b"w:val").as_deref(), Some("0" | "false"))
}

fn parse_alignment(val: &str) -> Option<Alignment> {
    match val {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" | "distribute" => Some(Alignment::Justified),
        _ => None,
    }
}

/// State container for walking the document body.
struct ReaderState {
    doc: DocxDocument,

    // Paragraph and run under construction
    para: Option<Paragraph>,
    run_text: String,
    run_font: RunFont,
    in_run: bool,
    in_text: bool,
    in_r_pr: bool,
    in_p_pr: bool,

    // Table under construction (one level only)
    table: Option<Table>,
    row: Option<TableRow>,
    cell: Option<TableCell>,
    table_depth: usize,
    in_tbl_pr: bool,

    in_sect_pr: bool,
}

impl ReaderState {
    fn new() -> Self {
        Self {
            doc: DocxDocument::default(),
            para: None,
            run_text: String::new(),
            run_font: RunFont::default(),
            in_run: false,
            in_text: false,
            in_r_pr: false,
            in_p_pr: false,
            table: None,
            row: None,
            cell: None,
            table_depth: 0,
            in_tbl_pr: false,
            in_sect_pr: false,
        }
    }

    /// Push a finished paragraph to its destination: the open cell if any,
    /// the body when outside tables, nowhere for stray structural content.
    fn flush_paragraph(&mut self, para: Paragraph) {
        if let Some(cell) = self.cell.as_mut() {
            cell.paragraphs.push(para);
        } else if self.table_depth == 0 {
            self.doc.blocks.push(Block::Paragraph(para));
        }
    }

    fn flush_run(&mut self) {
        if !self.run_text.is_empty() {
            if let Some(para) = self.para.as_mut() {
                para.runs.push(Run::new(
                    std::mem::take(&mut self.run_text),
                    self.run_font.clone(),
                ));
            }
        }
        self.run_text.clear();
    }

    fn handle_start(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"w:p" => {
                self.para = Some(Paragraph::default());
            }
            b"w:pPr" => self.in_p_pr = true,
            b"w:r" => {
                self.in_run = true;
                self.run_font = RunFont::default();
                self.run_text.clear();
            }
            b"w:rPr" if self.in_run => self.in_r_pr = true,
            b"w:t" if self.in_run => self.in_text = true,
            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(Table::default());
                }
            }
            b"w:tblPr" if self.table_depth == 1 => self.in_tbl_pr = true,
            b"w:tblBorders" if self.in_tbl_pr => {
                if let Some(table) = self.table.as_mut() {
                    table.bordered = true;
                }
            }
            b"w:tr" if self.table_depth == 1 => self.row = Some(TableRow::default()),
            b"w:tc" if self.table_depth == 1 => {
                self.cell = Some(TableCell { paragraphs: Vec::new() });
            }
            b"w:sectPr" => self.in_sect_pr = true,
            _ => self.handle_property(e),
        }
    }

    fn handle_empty(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            // An empty <w:p/> is still a paragraph.
            b"w:p" => self.flush_paragraph(Paragraph::default()),
            b"w:tblBorders" if self.in_tbl_pr => {
                if let Some(table) = self.table.as_mut() {
                    table.bordered = true;
                }
            }
            _ => self.handle_property(e),
        }
    }

    /// Property elements common to `Start` and `Empty` events.
    fn handle_property(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"w:pStyle" if self.in_p_pr => {
                if let Some(para) = self.para.as_mut() {
                    para.format.style = get_attr(e, b"w:val");
                }
            }
            b"w:jc" => {
                let alignment = get_attr(e, b"w:val").as_deref().and_then(parse_alignment);
                if self.in_p_pr {
                    if let Some(para) = self.para.as_mut() {
                        para.format.alignment = alignment;
                    }
                } else if self.in_tbl_pr {
                    if let Some(table) = self.table.as_mut() {
                        table.alignment = alignment;
                    }
                }
            }
            // Paragraph spacing only; w:spacing inside w:rPr is character
            // spacing and must not be confused with it.
            b"w:spacing" if self.in_p_pr && !self.in_r_pr => {
                if let Some(para) = self.para.as_mut() {
                    if let Some(after) = get_attr(e, b"w:after").and_then(|v| v.parse::<f64>().ok())
                    {
                        para.format.space_after = Some(after / 20.0);
                    }
                    let rule = get_attr(e, b"w:lineRule");
                    if matches!(rule.as_deref(), Some("auto") | None) {
                        if let Some(line) =
                            get_attr(e, b"w:line").and_then(|v| v.parse::<f64>().ok())
                        {
                            para.format.line_spacing = if (line - 240.0).abs() < f64::EPSILON {
                                Some(LineSpacing::Single)
                            } else {
                                Some(LineSpacing::Multiple(line / 240.0))
                            };
                        }
                    }
                }
            }
            b"w:b" | b"w:bCs" if self.in_r_pr => {
                self.run_font.bold = Some(!check_val_off(e));
            }
            b"w:u" if self.in_r_pr => {
                self.run_font.underline = Some(get_attr(e, b"w:val").as_deref() != Some("none"));
            }
            b"w:sz" if self.in_r_pr => {
                if let Some(half) = get_attr(e, b"w:val").and_then(|v| v.parse::<u32>().ok()) {
                    self.run_font.size = Some(half_points_to_pt(half));
                }
            }
            b"w:rFonts" if self.in_r_pr => {
                self.run_font.name = get_attr(e, b"w:ascii");
            }
            b"w:br" if self.in_run => self.run_text.push('\n'),
            b"w:tab" if self.in_run => self.run_text.push('\t'),
            b"w:gridCol" if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut() {
                    let width = get_attr(e, b"w:w")
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(1440);
                    table.grid.push(width);
                }
            }
            b"w:pgSz" if self.in_sect_pr => {
                if let Some(w) = get_attr(e, b"w:w").and_then(|v| v.parse::<u32>().ok()) {
                    self.doc.section.page_width = w;
                }
                if let Some(h) = get_attr(e, b"w:h").and_then(|v| v.parse::<u32>().ok()) {
                    self.doc.section.page_height = h;
                }
            }
            b"w:pgMar" if self.in_sect_pr => {
                let mut read = |key: &[u8], slot: fn(&mut DocxDocument, u32)| {
                    if let Some(v) = get_attr(e, key).and_then(|v| v.parse::<u32>().ok()) {
                        slot(&mut self.doc, v);
                    }
                };
                read(b"w:top", |d, v| d.section.margin_top = v);
                read(b"w:bottom", |d, v| d.section.margin_bottom = v);
                read(b"w:left", |d, v| d.section.margin_left = v);
                read(b"w:right", |d, v| d.section.margin_right = v);
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if self.in_run && self.in_text {
            self.run_text.push_str(text);
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:p" => {
                if let Some(para) = self.para.take() {
                    self.flush_paragraph(para);
                }
            }
            b"w:pPr" => self.in_p_pr = false,
            b"w:r" if self.in_run => {
                self.flush_run();
                self.in_run = false;
            }
            b"w:rPr" if self.in_r_pr => self.in_r_pr = false,
            b"w:t" if self.in_text => self.in_text = false,
            b"w:tc" if self.table_depth == 1 => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.cells.push(cell);
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.rows.push(row);
                }
            }
            b"w:tbl" => {
                if self.table_depth == 1 {
                    if let Some(table) = self.table.take() {
                        self.doc.blocks.push(Block::Table(table));
                    }
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            b"w:tblPr" => self.in_tbl_pr = false,
            b"w:sectPr" => self.in_sect_pr = false,
            _ => {}
        }
    }
}

/// Parse the XML of a `word/document.xml` part into the document model.
///
/// # Errors
/// Returns a template error on malformed XML.
pub fn parse_document_xml(xml: &str) -> Result<DocxDocument> {
    let mut state = ReaderState::new();

    let mut reader = Reader::from_str(xml);
    // Whitespace between elements is insignificant, but text inside w:t is
    // captured verbatim, so trimming stays off and w:t boundaries gate it.
    reader.trim_text(false);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => state.handle_start(&e),
            Ok(Event::Empty(e)) => state.handle_empty(&e),
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default();
                state.handle_text(&text);
            }
            Ok(Event::End(e)) => state.handle_end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DelibexError::Template(format!(
                    "error parsing document body: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(state.doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NS}><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_parse_styled_runs() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:rPr><w:b/><w:sz w:val="24"/><w:rFonts w:ascii="Times New Roman"/></w:rPr><w:t>NICAD : </w:t></w:r><w:r><w:t xml:space="preserve">«nicad»</w:t></w:r></w:p>"#,
        );
        let doc = parse_document_xml(&xml).unwrap();

        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.text(), "NICAD : «nicad»");
        assert_eq!(para.runs.len(), 2);
        assert_eq!(para.runs[0].font.bold, Some(true));
        assert_eq!(para.runs[0].font.size, Some(12.0));
        assert_eq!(para.runs[0].font.name.as_deref(), Some("Times New Roman"));
        assert_eq!(para.runs[1].font.bold, None);
    }

    #[test]
    fn test_parse_paragraph_format() {
        let xml = wrap_body(
            r#"<w:p><w:pPr><w:jc w:val="center"/><w:spacing w:after="120" w:line="240" w:lineRule="auto"/></w:pPr><w:r><w:t>Titre</w:t></w:r></w:p>"#,
        );
        let doc = parse_document_xml(&xml).unwrap();

        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.format.alignment, Some(Alignment::Center));
        assert_eq!(para.format.space_after, Some(6.0));
        assert_eq!(para.format.line_spacing, Some(LineSpacing::Single));
    }

    #[test]
    fn test_parse_table_shape() {
        let xml = wrap_body(
            r#"<w:tbl><w:tblPr><w:jc w:val="center"/><w:tblBorders><w:top w:val="single"/></w:tblBorders></w:tblPr><w:tblGrid><w:gridCol w:w="850"/><w:gridCol w:w="850"/><w:gridCol w:w="850"/></w:tblGrid><w:tr><w:tc><w:p><w:r><w:t>PT</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>X</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Y</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let doc = parse_document_xml(&xml).unwrap();

        assert_eq!(doc.table_count(), 1);
        let table = doc.tables().next().unwrap();
        assert_eq!(table.columns(), 3);
        assert!(table.bordered);
        assert_eq!(table.alignment, Some(Alignment::Center));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells[1].text(), "X");
    }

    #[test]
    fn test_parse_section_margins() {
        let xml = wrap_body(
            r#"<w:p/><w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="720" w:right="720" w:bottom="720" w:left="720"/></w:sectPr>"#,
        );
        let doc = parse_document_xml(&xml).unwrap();

        assert_eq!(doc.section.margin_top, 720);
        assert_eq!(doc.section.margin_left, 720);
        assert_eq!(doc.section.page_width, 11906);
        // The empty <w:p/> still counts as a body paragraph.
        assert_eq!(doc.paragraphs().count(), 1);
    }

    #[test]
    fn test_break_becomes_newline() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>Fatou</w:t><w:br/><w:t>Sall</w:t></w:r></w:p>"#);
        let doc = parse_document_xml(&xml).unwrap();
        assert_eq!(doc.paragraphs().next().unwrap().text(), "Fatou\nSall");
    }

    #[test]
    fn test_whitespace_between_elements_ignored() {
        let xml = wrap_body(
            "<w:p>\n  <w:r>\n    <w:rPr><w:b/></w:rPr>\n    <w:t>Village</w:t>\n  </w:r>\n</w:p>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        assert_eq!(doc.paragraphs().next().unwrap().text(), "Village");
    }

    #[test]
    fn test_malformed_xml_is_template_error() {
        let result = parse_document_xml("<w:document><w:body><w:p></w:document>");
        assert!(matches!(result, Err(DelibexError::Template(_))));
    }
}
