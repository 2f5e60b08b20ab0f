//! Placeholder substitution engine.
//!
//! Walks every body paragraph and every table cell, finds which tokens of
//! the substitution table occur in the paragraph text, and re-emits the
//! paragraph as alternating literal/value runs: substituted values bold,
//! literal text plain, everything in the certificate font. Paragraphs with
//! no matching token are left untouched, so template styling survives
//! wherever no substitution happens.
//!
//! A paragraph containing the article marker (`Article 1`) is a
//! presentation special case: the whole text is substituted in one pass,
//! then split on the first colon into an underlined bold head and a
//! slightly smaller bold clause body.
//!
//! Rebuilding runs destroys any pre-existing per-character styling inside a
//! processed paragraph; only the token-versus-literal bold distinction
//! survives. That is the accepted trade-off of matching tokens against the
//! paragraph's full text, where an editor may have split a token across
//! runs.

use delibex_core::{DelibexError, DocxDocument, Paragraph, Result, Run, RunFont};
use regex::Regex;

use crate::tokens::Replacements;
use crate::CERT_FONT;

/// Marker that switches a paragraph to the article clause rendering.
const ARTICLE_MARKER: &str = "Article 1";

/// Font size for substituted table-cell text.
const CELL_FONT_SIZE: f64 = 9.0;

/// Font sizes for the two runs of a rendered article clause.
const ARTICLE_HEAD_SIZE: f64 = 12.0;
const ARTICLE_BODY_SIZE: f64 = 11.0;

fn cert_font(bold: bool, size: Option<f64>) -> RunFont {
    RunFont {
        name: Some(CERT_FONT.to_string()),
        size,
        bold: Some(bold),
        underline: None,
    }
}

/// Tokens of the table present in `text`, longest first so that a token
/// that is a prefix of another is never matched prematurely.
fn matching_tokens<'a>(text: &str, replacements: &'a Replacements) -> Vec<&'a (String, String)> {
    let mut matched: Vec<&(String, String)> = replacements
        .iter()
        .filter(|(token, _)| text.contains(token))
        .collect();
    matched.sort_by_key(|(token, _)| std::cmp::Reverse(token.len()));
    matched
}

/// Split `text` on the matched tokens and emit one run per segment.
fn rebuild_runs(
    text: &str,
    matched: &[&(String, String)],
    size: Option<f64>,
) -> Result<Vec<Run>> {
    let pattern = matched
        .iter()
        .map(|(token, _)| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    let alternation = Regex::new(&pattern)
        .map_err(|e| DelibexError::Render(format!("token pattern failed: {e}")))?;

    let mut runs = Vec::new();
    let mut cursor = 0usize;
    for hit in alternation.find_iter(text) {
        if hit.start() > cursor {
            runs.push(Run::new(&text[cursor..hit.start()], cert_font(false, size)));
        }
        let value = matched
            .iter()
            .find(|(token, _)| token.as_str() == hit.as_str())
            .map_or("", |(_, value)| value.as_str());
        if !value.is_empty() {
            runs.push(Run::new(value, cert_font(true, size)));
        }
        cursor = hit.end();
    }
    if cursor < text.len() {
        runs.push(Run::new(&text[cursor..], cert_font(false, size)));
    }
    Ok(runs)
}

/// Render an article clause: substitute every token in one pass, then split
/// on the first colon into a bold underlined head and a bold body.
fn rebuild_article(text: &str, matched: &[&(String, String)]) -> Vec<Run> {
    let mut substituted = text.to_string();
    for (token, value) in matched {
        substituted = substituted.replace(token.as_str(), value);
    }

    match substituted.split_once(':') {
        Some((head, body)) => {
            let head_font = RunFont {
                name: Some(CERT_FONT.to_string()),
                size: Some(ARTICLE_HEAD_SIZE),
                bold: Some(true),
                underline: Some(true),
            };
            let body_font = RunFont {
                name: Some(CERT_FONT.to_string()),
                size: Some(ARTICLE_BODY_SIZE),
                bold: Some(true),
                underline: Some(false),
            };
            vec![
                Run::new(format!("{head}:"), head_font),
                Run::new(body, body_font),
            ]
        }
        None => vec![Run::new(substituted, RunFont::default())],
    }
}

fn substitute_paragraph(
    para: &mut Paragraph,
    replacements: &Replacements,
    size: Option<f64>,
    allow_article: bool,
) -> Result<()> {
    let text = para.text();
    let matched = matching_tokens(&text, replacements);
    if matched.is_empty() {
        return Ok(());
    }

    if allow_article && text.contains(ARTICLE_MARKER) && !para.runs.is_empty() {
        para.set_runs(rebuild_article(&text, &matched));
        return Ok(());
    }

    para.set_runs(rebuild_runs(&text, &matched, size)?);
    Ok(())
}

/// Replace every occurrence of every token in the document's paragraphs and
/// table cells with its value from the substitution table.
///
/// # Errors
/// Returns a render error if the token alternation cannot be compiled.
pub fn apply_replacements(doc: &mut DocxDocument, replacements: &Replacements) -> Result<()> {
    if replacements.is_empty() {
        return Ok(());
    }

    for para in doc.paragraphs_mut() {
        substitute_paragraph(para, replacements, None, true)?;
    }

    for table in doc.tables_mut() {
        for row in &mut table.rows {
            for cell in &mut row.cells {
                for para in &mut cell.paragraphs {
                    substitute_paragraph(para, replacements, Some(CELL_FONT_SIZE), false)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use delibex_core::{Table, TableCell, TableRow};

    fn table_of(replacements: &[(&str, &str)]) -> Replacements {
        replacements
            .iter()
            .map(|(t, v)| ((*t).to_string(), (*v).to_string()))
            .collect()
    }

    fn doc_with_paragraph(text: &str) -> DocxDocument {
        let mut doc = DocxDocument::default();
        doc.push_paragraph(Paragraph::styled(text, RunFont::default()));
        doc
    }

    #[test]
    fn test_substitutes_value_bold_literal_plain() {
        let mut doc = doc_with_paragraph("Village : «Village», parcelle «nicad»");
        let replacements = table_of(&[("«Village»", "Ndiaganiao"), ("«nicad»", "42")]);
        apply_replacements(&mut doc, &replacements).unwrap();

        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.text(), "Village : Ndiaganiao, parcelle 42");

        let bold: Vec<(&str, Option<bool>)> = para
            .runs
            .iter()
            .map(|r| (r.text.as_str(), r.font.bold))
            .collect();
        assert_eq!(
            bold,
            [
                ("Village : ", Some(false)),
                ("Ndiaganiao", Some(true)),
                (", parcelle ", Some(false)),
                ("42", Some(true)),
            ]
        );
        assert!(para.runs.iter().all(|r| r.font.name.as_deref() == Some(CERT_FONT)));
    }

    #[test]
    fn test_overlapping_tokens_longest_wins() {
        // «XY» must never be consumed as «X» followed by the literal "Y".
        let mut doc = doc_with_paragraph("a «XY» b «X» c");
        let replacements = table_of(&[("«X»", "one"), ("«XY»", "two")]);
        apply_replacements(&mut doc, &replacements).unwrap();

        assert_eq!(doc.paragraphs().next().unwrap().text(), "a two b one c");
    }

    #[test]
    fn test_untouched_paragraph_keeps_runs() {
        let mut doc = DocxDocument::default();
        let styled = Paragraph {
            runs: vec![Run::new(
                "CERTIFIÉ CONFORME",
                RunFont {
                    bold: Some(true),
                    underline: Some(true),
                    ..RunFont::default()
                },
            )],
            ..Paragraph::default()
        };
        doc.push_paragraph(styled.clone());

        apply_replacements(&mut doc, &table_of(&[("«nicad»", "42")])).unwrap();
        assert_eq!(doc.paragraphs().next().unwrap(), &styled);
    }

    #[test]
    fn test_null_value_renders_empty() {
        let mut doc = doc_with_paragraph("Tel : «Telephone».");
        apply_replacements(&mut doc, &table_of(&[("«Telephone»", "")])).unwrap();

        assert_eq!(doc.paragraphs().next().unwrap().text(), "Tel : .");
    }

    #[test]
    fn test_token_split_across_runs_still_matches() {
        let mut doc = DocxDocument::default();
        doc.push_paragraph(Paragraph {
            runs: vec![
                Run::new("NICAD : «ni", RunFont::default()),
                Run::new("cad»", RunFont::default()),
            ],
            ..Paragraph::default()
        });

        apply_replacements(&mut doc, &table_of(&[("«nicad»", "42")])).unwrap();
        assert_eq!(doc.paragraphs().next().unwrap().text(), "NICAD : 42");
    }

    #[test]
    fn test_article_clause_split_on_first_colon() {
        let mut doc = doc_with_paragraph("Article 1 : la parcelle «nicad» sise à «Village»");
        let replacements = table_of(&[("«nicad»", "42"), ("«Village»", "Fissel")]);
        apply_replacements(&mut doc, &replacements).unwrap();

        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.runs.len(), 2);
        assert_eq!(para.runs[0].text, "Article 1 :");
        assert_eq!(para.runs[0].font.underline, Some(true));
        assert_eq!(para.runs[0].font.size, Some(12.0));
        assert_eq!(para.runs[1].text, " la parcelle 42 sise à Fissel");
        assert_eq!(para.runs[1].font.underline, Some(false));
        assert_eq!(para.runs[1].font.size, Some(11.0));
        assert!(para.runs.iter().all(|r| r.font.bold == Some(true)));
    }

    #[test]
    fn test_article_without_colon_single_plain_run() {
        let mut doc = doc_with_paragraph("Article 1 attribue «nicad»");
        apply_replacements(&mut doc, &table_of(&[("«nicad»", "42")])).unwrap();

        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.runs.len(), 1);
        assert_eq!(para.text(), "Article 1 attribue 42");
        assert_eq!(para.runs[0].font.bold, None);
    }

    #[test]
    fn test_table_cells_substituted_at_cell_size() {
        let mut table = Table {
            grid: vec![2000, 2000],
            ..Table::default()
        };
        let mut row = TableRow {
            cells: vec![TableCell::empty(), TableCell::empty()],
        };
        row.cells[0].set_styled_text("NICAD : «nicad»", RunFont::default(), false);
        row.cells[1].set_styled_text("sans jeton", RunFont::default(), false);
        table.rows.push(row);

        let mut doc = DocxDocument::default();
        doc.push_table(table);
        apply_replacements(&mut doc, &table_of(&[("«nicad»", "42")])).unwrap();

        let table = doc.tables().next().unwrap();
        let cell = &table.rows[0].cells[0];
        assert_eq!(cell.text(), "NICAD : 42");
        for run in &cell.paragraphs[0].runs {
            assert_eq!(run.font.size, Some(9.0));
        }
        // The token-free cell keeps its original run formatting.
        assert_eq!(table.rows[0].cells[1].paragraphs[0].runs[0].font.size, None);
    }
}
