//! WordprocessingML body serializer.
//!
//! Regenerates `word/document.xml` from the document model. The pipeline
//! rebuilds paragraph runs and table rows wholesale, so the writer emits the
//! whole body from the model rather than patching the original XML; parts of
//! the package the model does not cover pass through the container untouched
//! (see the package module).

use std::io::Cursor;

use delibex_core::units::pt_to_half_points;
use delibex_core::{
    Alignment, Block, DelibexError, DocxDocument, LineSpacing, Paragraph, Result, Run, Table,
    TableCell,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn emit(w: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    w.write_event(event)
        .map_err(|e| DelibexError::Render(format!("XML write failed: {e}")))
}

fn start(w: &mut XmlWriter, name: &str) -> Result<()> {
    emit(w, Event::Start(BytesStart::new(name)))
}

fn end(w: &mut XmlWriter, name: &str) -> Result<()> {
    emit(w, Event::End(BytesEnd::new(name)))
}

fn empty_with(w: &mut XmlWriter, name: &str, attrs: &[(&str, String)]) -> Result<()> {
    let mut e = BytesStart::new(name);
    for (key, value) in attrs {
        e.push_attribute((*key, value.as_str()));
    }
    emit(w, Event::Empty(e))
}

const fn alignment_val(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justified => "both",
    }
}

fn write_run(w: &mut XmlWriter, run: &Run) -> Result<()> {
    start(w, "w:r")?;

    let font = &run.font;
    if font.name.is_some() || font.size.is_some() || font.bold.is_some() || font.underline.is_some()
    {
        start(w, "w:rPr")?;
        if let Some(name) = &font.name {
            empty_with(
                w,
                "w:rFonts",
                &[("w:ascii", name.clone()), ("w:hAnsi", name.clone())],
            )?;
        }
        match font.bold {
            Some(true) => empty_with(w, "w:b", &[])?,
            Some(false) => empty_with(w, "w:b", &[("w:val", "0".to_string())])?,
            None => {}
        }
        match font.underline {
            Some(true) => empty_with(w, "w:u", &[("w:val", "single".to_string())])?,
            Some(false) => empty_with(w, "w:u", &[("w:val", "none".to_string())])?,
            None => {}
        }
        if let Some(size) = font.size {
            let half = pt_to_half_points(size).to_string();
            empty_with(w, "w:sz", &[("w:val", half.clone())])?;
            empty_with(w, "w:szCs", &[("w:val", half)])?;
        }
        end(w, "w:rPr")?;
    }

    // Newlines in the model become explicit breaks.
    for (i, segment) in run.text.split('\n').enumerate() {
        if i > 0 {
            empty_with(w, "w:br", &[])?;
        }
        if !segment.is_empty() {
            let mut t = BytesStart::new("w:t");
            t.push_attribute(("xml:space", "preserve"));
            emit(w, Event::Start(t))?;
            emit(w, Event::Text(BytesText::new(segment)))?;
            end(w, "w:t")?;
        }
    }

    end(w, "w:r")
}

fn write_paragraph(w: &mut XmlWriter, para: &Paragraph) -> Result<()> {
    start(w, "w:p")?;

    let format = &para.format;
    if format.style.is_some()
        || format.alignment.is_some()
        || format.space_after.is_some()
        || format.line_spacing.is_some()
    {
        start(w, "w:pPr")?;
        if let Some(style) = &format.style {
            empty_with(w, "w:pStyle", &[("w:val", style.clone())])?;
        }
        if format.space_after.is_some() || format.line_spacing.is_some() {
            let mut attrs: Vec<(&str, String)> = Vec::new();
            if let Some(after) = format.space_after {
                attrs.push(("w:after", ((after * 20.0).round() as u32).to_string()));
            }
            if let Some(spacing) = format.line_spacing {
                let line = match spacing {
                    LineSpacing::Single => 240.0,
                    LineSpacing::Multiple(factor) => 240.0 * factor,
                };
                attrs.push(("w:line", (line.round() as u32).to_string()));
                attrs.push(("w:lineRule", "auto".to_string()));
            }
            empty_with(w, "w:spacing", &attrs)?;
        }
        if let Some(alignment) = format.alignment {
            empty_with(w, "w:jc", &[("w:val", alignment_val(alignment).to_string())])?;
        }
        end(w, "w:pPr")?;
    }

    for run in &para.runs {
        write_run(w, run)?;
    }

    end(w, "w:p")
}

fn write_cell(w: &mut XmlWriter, cell: &TableCell, width: Option<u32>) -> Result<()> {
    start(w, "w:tc")?;

    if let Some(width) = width {
        start(w, "w:tcPr")?;
        empty_with(
            w,
            "w:tcW",
            &[("w:w", width.to_string()), ("w:type", "dxa".to_string())],
        )?;
        end(w, "w:tcPr")?;
    }

    // A cell must contain at least one paragraph.
    if cell.paragraphs.is_empty() {
        empty_with(w, "w:p", &[])?;
    } else {
        for para in &cell.paragraphs {
            write_paragraph(w, para)?;
        }
    }

    end(w, "w:tc")
}

fn write_table_borders(w: &mut XmlWriter) -> Result<()> {
    start(w, "w:tblBorders")?;
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        empty_with(
            w,
            edge,
            &[
                ("w:val", "single".to_string()),
                ("w:sz", "4".to_string()),
                ("w:space", "0".to_string()),
                ("w:color", "000000".to_string()),
            ],
        )?;
    }
    end(w, "w:tblBorders")
}

fn write_table(w: &mut XmlWriter, table: &Table) -> Result<()> {
    start(w, "w:tbl")?;

    start(w, "w:tblPr")?;
    empty_with(
        w,
        "w:tblW",
        &[("w:w", "0".to_string()), ("w:type", "auto".to_string())],
    )?;
    if let Some(alignment) = table.alignment {
        empty_with(w, "w:jc", &[("w:val", alignment_val(alignment).to_string())])?;
    }
    if table.bordered {
        write_table_borders(w)?;
    }
    end(w, "w:tblPr")?;

    start(w, "w:tblGrid")?;
    for width in &table.grid {
        empty_with(w, "w:gridCol", &[("w:w", width.to_string())])?;
    }
    end(w, "w:tblGrid")?;

    for row in &table.rows {
        start(w, "w:tr")?;
        for (i, cell) in row.cells.iter().enumerate() {
            write_cell(w, cell, table.grid.get(i).copied())?;
        }
        end(w, "w:tr")?;
    }

    end(w, "w:tbl")
}

/// Serialize a document model to the bytes of a `word/document.xml` part.
///
/// # Errors
/// Returns a render error if XML serialization fails.
pub fn write_document_xml(doc: &DocxDocument) -> Result<Vec<u8>> {
    let mut w = Writer::new(Cursor::new(Vec::new()));

    emit(
        &mut w,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", W_NS));
    emit(&mut w, Event::Start(root))?;
    start(&mut w, "w:body")?;

    for block in &doc.blocks {
        match block {
            Block::Paragraph(para) => write_paragraph(&mut w, para)?,
            Block::Table(table) => write_table(&mut w, table)?,
        }
    }

    let section = &doc.section;
    start(&mut w, "w:sectPr")?;
    empty_with(
        &mut w,
        "w:pgSz",
        &[
            ("w:w", section.page_width.to_string()),
            ("w:h", section.page_height.to_string()),
        ],
    )?;
    empty_with(
        &mut w,
        "w:pgMar",
        &[
            ("w:top", section.margin_top.to_string()),
            ("w:right", section.margin_right.to_string()),
            ("w:bottom", section.margin_bottom.to_string()),
            ("w:left", section.margin_left.to_string()),
            ("w:header", "708".to_string()),
            ("w:footer", "708".to_string()),
            ("w:gutter", "0".to_string()),
        ],
    )?;
    end(&mut w, "w:sectPr")?;

    end(&mut w, "w:body")?;
    end(&mut w, "w:document")?;

    Ok(w.into_inner().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_document_xml;
    use delibex_core::units::cm_to_twips;
    use delibex_core::{ParagraphFormat, RunFont, TableRow};

    fn round_trip(doc: &DocxDocument) -> DocxDocument {
        let bytes = write_document_xml(doc).unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        parse_document_xml(&xml).unwrap()
    }

    #[test]
    fn test_round_trip_styled_paragraph() {
        let mut doc = DocxDocument::default();
        doc.push_paragraph(Paragraph {
            runs: vec![
                Run::new(
                    "Article 1 : ",
                    RunFont {
                        name: Some("Times New Roman".to_string()),
                        size: Some(12.0),
                        bold: Some(true),
                        underline: Some(true),
                    },
                ),
                Run::new(
                    "la parcelle «nicad»",
                    RunFont {
                        name: Some("Times New Roman".to_string()),
                        size: Some(11.0),
                        bold: Some(true),
                        underline: Some(false),
                    },
                ),
            ],
            format: ParagraphFormat {
                space_after: Some(3.0),
                line_spacing: Some(LineSpacing::Single),
                ..ParagraphFormat::default()
            },
        });

        let back = round_trip(&doc);
        let para = back.paragraphs().next().unwrap();
        assert_eq!(para.text(), "Article 1 : la parcelle «nicad»");
        assert_eq!(para.runs[0].font.size, Some(12.0));
        assert_eq!(para.runs[0].font.underline, Some(true));
        assert_eq!(para.runs[1].font.underline, Some(false));
        assert_eq!(para.format.space_after, Some(3.0));
        assert_eq!(para.format.line_spacing, Some(LineSpacing::Single));
    }

    #[test]
    fn test_round_trip_fractional_font_size() {
        let mut doc = DocxDocument::default();
        let font = RunFont {
            size: Some(7.5),
            ..RunFont::default()
        };
        doc.push_paragraph(Paragraph::styled("P1", font));

        let back = round_trip(&doc);
        assert_eq!(back.paragraphs().next().unwrap().runs[0].font.size, Some(7.5));
    }

    #[test]
    fn test_round_trip_table() {
        let mut table = Table {
            grid: vec![850; 3],
            bordered: true,
            alignment: Some(Alignment::Center),
            ..Table::default()
        };
        let mut row = TableRow::empty(3);
        row.cells[0].set_styled_text("PT", RunFont::default(), true);
        row.cells[1].set_styled_text("X", RunFont::default(), true);
        row.cells[2].set_styled_text("Y", RunFont::default(), true);
        table.rows.push(row);

        let mut doc = DocxDocument::default();
        doc.push_table(table);

        let back = round_trip(&doc);
        let table = back.tables().next().unwrap();
        assert!(table.bordered);
        assert_eq!(table.alignment, Some(Alignment::Center));
        assert_eq!(table.columns(), 3);
        assert_eq!(table.rows[0].cells[2].text(), "Y");
    }

    #[test]
    fn test_round_trip_margins() {
        let mut doc = DocxDocument::default();
        doc.section.set_margins(cm_to_twips(1.27));
        doc.push_paragraph(Paragraph::default());

        let back = round_trip(&doc);
        assert_eq!(back.section.margin_top, 720);
        assert_eq!(back.section.margin_right, 720);
    }

    #[test]
    fn test_newline_serialized_as_break() {
        let mut doc = DocxDocument::default();
        doc.push_paragraph(Paragraph::styled("Fatou\nSall", RunFont::default()));

        let bytes = write_document_xml(&doc).unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("<w:br/>"));

        let back = parse_document_xml(&xml).unwrap();
        assert_eq!(back.paragraphs().next().unwrap().text(), "Fatou\nSall");
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = DocxDocument::default();
        doc.push_paragraph(Paragraph::styled("superficie < 2 ha & > 1 ha", RunFont::default()));

        let back = round_trip(&doc);
        assert_eq!(
            back.paragraphs().next().unwrap().text(),
            "superficie < 2 ha & > 1 ha"
        );
    }
}
