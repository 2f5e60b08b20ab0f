//! Page-fit layout passes.
//!
//! A generated certificate must fit a single sheet. Three passes run after
//! substitution: narrow margins on every section, a cap on paragraph
//! spacing with single line spacing document-wide, and a font shrink on the
//! fixed certifying phrases of the legal boilerplate. None of them alter
//! text content.

use delibex_core::units::cm_to_twips;
use delibex_core::{DocxDocument, LineSpacing};

use crate::CERT_FONT;

/// Margin applied on all four sides, in centimetres.
pub const NARROW_MARGIN_CM: f64 = 1.27;

/// Paragraph spacing above this many points is capped...
const SPACE_AFTER_CAP: f64 = 6.0;
/// ...down to this value.
const SPACE_AFTER_REDUCED: f64 = 3.0;

/// Font size forced onto legal boilerplate paragraphs.
const LEGAL_FONT_SIZE: f64 = 9.0;

/// Certifying phrases whose paragraphs get the font shrink. Matching is
/// case-sensitive substring search, like the templates spell them.
pub const LEGAL_PHRASES: [&str; 7] = [
    "CERTIFIÉ CONFORME",
    "APPROUVEE",
    "SOUS-PREFET",
    "LE MAIRE",
    "FAIT LE",
    "arrêté préfectoral",
    "délibération a été approuvée",
];

/// Set every section margin to the narrow value.
pub fn apply_narrow_margins(doc: &mut DocxDocument) {
    doc.section.set_margins(cm_to_twips(NARROW_MARGIN_CM));
}

/// Cap oversized paragraph spacing and force single line spacing on every
/// body paragraph.
pub fn tighten_spacing(doc: &mut DocxDocument) {
    for para in doc.paragraphs_mut() {
        if para.format.space_after.is_some_and(|after| after > SPACE_AFTER_CAP) {
            para.format.space_after = Some(SPACE_AFTER_REDUCED);
        }
        para.format.line_spacing = Some(LineSpacing::Single);
    }
}

/// Shrink the runs of body paragraphs containing a certifying phrase.
pub fn shrink_legal_text(doc: &mut DocxDocument) {
    for para in doc.paragraphs_mut() {
        let text = para.text();
        if LEGAL_PHRASES.iter().any(|phrase| text.contains(phrase)) {
            for run in &mut para.runs {
                run.font.size = Some(LEGAL_FONT_SIZE);
                run.font.name = Some(CERT_FONT.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delibex_core::{Paragraph, RunFont};

    #[test]
    fn test_narrow_margins() {
        let mut doc = DocxDocument::default();
        apply_narrow_margins(&mut doc);
        assert_eq!(doc.section.margin_top, 720);
        assert_eq!(doc.section.margin_left, 720);
    }

    #[test]
    fn test_spacing_cap_only_above_threshold() {
        let mut doc = DocxDocument::default();
        let mut wide = Paragraph::styled("a", RunFont::default());
        wide.format.space_after = Some(12.0);
        let mut tight = Paragraph::styled("b", RunFont::default());
        tight.format.space_after = Some(2.0);
        let unset = Paragraph::styled("c", RunFont::default());
        doc.push_paragraph(wide);
        doc.push_paragraph(tight);
        doc.push_paragraph(unset);

        tighten_spacing(&mut doc);

        let spacing: Vec<Option<f64>> =
            doc.paragraphs().map(|p| p.format.space_after).collect();
        assert_eq!(spacing, [Some(3.0), Some(2.0), None]);
        assert!(doc
            .paragraphs()
            .all(|p| p.format.line_spacing == Some(LineSpacing::Single)));
    }

    #[test]
    fn test_legal_phrase_shrinks_runs() {
        let mut doc = DocxDocument::default();
        doc.push_paragraph(Paragraph::styled(
            "La présente délibération a été approuvée par le conseil.",
            RunFont {
                size: Some(11.0),
                ..RunFont::default()
            },
        ));
        doc.push_paragraph(Paragraph::styled("Texte ordinaire.", RunFont::default()));

        shrink_legal_text(&mut doc);

        let mut paras = doc.paragraphs();
        let legal = paras.next().unwrap();
        assert_eq!(legal.runs[0].font.size, Some(9.0));
        assert_eq!(legal.runs[0].font.name.as_deref(), Some(CERT_FONT));
        // Content untouched.
        assert!(legal.text().contains("délibération a été approuvée"));

        let ordinary = paras.next().unwrap();
        assert_eq!(ordinary.runs[0].font.size, None);
    }

    #[test]
    fn test_legal_matching_is_case_sensitive() {
        let mut doc = DocxDocument::default();
        doc.push_paragraph(Paragraph::styled("le maire", RunFont::default()));
        shrink_legal_text(&mut doc);
        assert_eq!(doc.paragraphs().next().unwrap().runs[0].font.size, None);
    }
}
