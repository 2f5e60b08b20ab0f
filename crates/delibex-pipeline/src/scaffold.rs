//! Demo template scaffolding.
//!
//! Builds the two certificate templates (individual and collective) through
//! the document model and package writer: title block, labelled placeholder
//! fields, the article clause, and the prebuilt tables at the indices the
//! orchestrator expects (coordinates at 0 for individual; roster at 0 and
//! coordinates at 1 for collective). Handy for demos, and it gives the test
//! suite a template source that does not depend on binary fixtures.

use std::path::{Path, PathBuf};

use delibex_backend::DocxPackage;
use delibex_core::units::cm_to_twips;
use delibex_core::{
    Alignment, DocxDocument, LineSpacing, Paragraph, ParagraphFormat, Run, RunFont, Table,
    TableRow,
};

use crate::layout::NARROW_MARGIN_CM;
use crate::tokens::token;
use crate::CERT_FONT;

/// Default file name of the individual template.
pub const TEMPLATE_INDIV: &str = "Template_Indiv.docx";

/// Default file name of the collective template.
pub const TEMPLATE_COLL: &str = "Template_Coll.docx";

fn font(size: f64, bold: bool) -> RunFont {
    RunFont {
        name: Some(CERT_FONT.to_string()),
        size: Some(size),
        bold: Some(bold),
        underline: None,
    }
}

fn centered(text: &str, size: f64, bold: bool) -> Paragraph {
    Paragraph {
        runs: vec![Run::new(text, font(size, bold))],
        format: ParagraphFormat {
            alignment: Some(Alignment::Center),
            space_after: Some(4.0),
            line_spacing: Some(LineSpacing::Single),
            ..ParagraphFormat::default()
        },
    }
}

/// `Label : «token»` field line, label bold.
fn field(label: &str, column: &str) -> Paragraph {
    Paragraph {
        runs: vec![
            Run::new(format!("{label} : "), font(10.0, true)),
            Run::new(token(column), font(10.0, false)),
        ],
        format: ParagraphFormat {
            space_after: Some(2.0),
            ..ParagraphFormat::default()
        },
    }
}

fn body_text(text: &str, size: f64) -> Paragraph {
    Paragraph {
        runs: vec![Run::new(text, font(size, false))],
        format: ParagraphFormat {
            space_after: Some(3.0),
            ..ParagraphFormat::default()
        },
    }
}

/// Prebuilt coordinate grid: two blocks of PT/X/Y headers and one blank
/// data row, the shape the table builder later rebuilds in place.
fn coordinate_table() -> Table {
    let mut table = Table {
        grid: vec![cm_to_twips(1.5); 6],
        alignment: Some(Alignment::Center),
        bordered: true,
        ..Table::default()
    };

    let mut header = TableRow::empty(6);
    for (i, label) in ["PT", "X", "Y", "PT", "X", "Y"].iter().enumerate() {
        header.cells[i].set_styled_text(label, font(8.0, true), true);
    }
    table.rows.push(header);
    table.rows.push(TableRow::empty(6));
    table
}

/// Prebuilt beneficiary roster: header row only.
fn roster_table() -> Table {
    let mut table = Table {
        grid: vec![cm_to_twips(6.0), cm_to_twips(6.0), cm_to_twips(5.0)],
        bordered: true,
        ..Table::default()
    };

    let mut header = TableRow::empty(3);
    for (i, label) in ["Prénom", "Nom", "N° Pièce"].iter().enumerate() {
        header.cells[i].set_styled_text(label, font(10.0, true), true);
    }
    table.rows.push(header);
    table
}

fn signature_block(doc: &mut DocxDocument) {
    doc.push_paragraph(Paragraph::default());
    doc.push_paragraph(body_text(
        "La présente délibération a été approuvée par arrêté préfectoral.",
        10.0,
    ));
    doc.push_paragraph(body_text("CERTIFIÉ CONFORME, FAIT LE ............", 10.0));
    doc.push_paragraph(body_text("LE MAIRE", 10.0));
}

/// Demo template for individual certificates.
#[must_use]
pub fn demo_individual_template() -> DocxDocument {
    let mut doc = DocxDocument::default();
    doc.section.set_margins(cm_to_twips(NARROW_MARGIN_CM));

    doc.push_paragraph(centered("EXTRAIT DE DÉLIBÉRATION", 14.0, true));
    doc.push_paragraph(centered("PARCELLE INDIVIDUELLE", 10.0, true));

    doc.push_paragraph(field("NICAD", "nicad"));
    doc.push_paragraph(field("Prénom", "Prenom"));
    doc.push_paragraph(field("Nom", "Nom"));
    doc.push_paragraph(field("Date de naissance", "Date_naissance"));
    doc.push_paragraph(field("Téléphone", "Telephone"));
    doc.push_paragraph(field("Village", "Village"));
    doc.push_paragraph(field("Superficie (m²)", "superficie"));
    doc.push_paragraph(field("Type d'usage", "type_usag"));
    doc.push_paragraph(field("N° Pièce", "Num_piece"));
    doc.push_paragraph(field("Type Pièce", "Type_piece"));

    doc.push_paragraph(body_text(
        &format!(
            "Article 1 : La parcelle {} sise au village de {}, d'une superficie de {} m², \
             est attribuée à {} {}.",
            token("nicad"),
            token("Village"),
            token("superficie"),
            token("Prenom"),
            token("Nom"),
        ),
        11.0,
    ));

    doc.push_paragraph(centered("COORDONNÉES DE LA PARCELLE", 11.0, true));
    doc.push_table(coordinate_table());

    signature_block(&mut doc);
    doc
}

/// Demo template for collective certificates.
#[must_use]
pub fn demo_collective_template() -> DocxDocument {
    let mut doc = DocxDocument::default();
    doc.section.set_margins(cm_to_twips(NARROW_MARGIN_CM));

    doc.push_paragraph(centered("EXTRAIT DE DÉLIBÉRATION", 14.0, true));
    doc.push_paragraph(centered("PARCELLE COLLECTIVE", 10.0, true));

    doc.push_paragraph(field("NICAD", "nicad"));
    doc.push_paragraph(field("Village", "Village"));
    doc.push_paragraph(field("Superficie (m²)", "superficie"));
    doc.push_paragraph(field("Type d'usage", "type_usa"));
    doc.push_paragraph(field("N° Pièce", "Num_piece"));

    doc.push_paragraph(body_text(
        &format!(
            "Article 1 : La parcelle {} sise au village de {}, d'une superficie de {} m², \
             est attribuée collectivement aux bénéficiaires listés ci-dessous.",
            token("nicad"),
            token("Village"),
            token("superficie"),
        ),
        11.0,
    ));

    doc.push_paragraph(centered("LISTE DES BÉNÉFICIAIRES", 11.0, true));
    doc.push_table(roster_table());

    doc.push_paragraph(centered("COORDONNÉES DE LA PARCELLE", 11.0, true));
    doc.push_table(coordinate_table());

    signature_block(&mut doc);
    doc
}

/// Write both demo templates under `out_dir`, returning the created paths.
///
/// # Errors
/// Returns an error if a package cannot be serialized or written.
pub fn write_demo_templates(out_dir: &Path) -> delibex_core::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(2);
    for (name, doc) in [
        (TEMPLATE_INDIV, demo_individual_template()),
        (TEMPLATE_COLL, demo_collective_template()),
    ] {
        let path = out_dir.join(name);
        DocxPackage::from_document(&doc)?.save(&path)?;
        written.push(path);
    }
    Ok(written)
}
