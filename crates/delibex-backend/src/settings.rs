//! Settings part filter.
//!
//! Copies `word/settings.xml` event-for-event, dropping the `w:mailMerge`
//! and `w:webSettings` subtrees a mail-merge authoring workflow leaves
//! behind. Everything else (compatibility options, default tab stops, ...)
//! passes through untouched.

use std::io::Cursor;

use delibex_core::{DelibexError, Result};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

/// Element names whose whole subtree is removed.
const DROPPED: [&[u8]; 2] = [b"w:mailMerge", b"w:webSettings"];

fn is_dropped(name: &[u8]) -> bool {
    DROPPED.contains(&name)
}

/// Return the settings XML with data-connection elements removed.
///
/// # Errors
/// Returns a template error if the part is malformed XML.
pub fn strip_data_connections_xml(xml: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut buf = Vec::new();
    // Depth inside a dropped subtree; 0 means events are copied through.
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                } else if is_dropped(e.name().as_ref()) {
                    skip_depth = 1;
                } else {
                    writer.write_event(Event::Start(e)).map_err(|err| {
                        DelibexError::Template(format!("settings rewrite failed: {err}"))
                    })?;
                }
            }
            Ok(Event::End(e)) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                } else {
                    writer.write_event(Event::End(e)).map_err(|err| {
                        DelibexError::Template(format!("settings rewrite failed: {err}"))
                    })?;
                }
            }
            Ok(Event::Empty(e)) => {
                if skip_depth == 0 && !is_dropped(e.name().as_ref()) {
                    writer.write_event(Event::Empty(e)).map_err(|err| {
                        DelibexError::Template(format!("settings rewrite failed: {err}"))
                    })?;
                }
            }
            Ok(event) => {
                if skip_depth == 0 {
                    writer.write_event(event).map_err(|err| {
                        DelibexError::Template(format!("settings rewrite failed: {err}"))
                    })?;
                }
            }
            Err(e) => {
                return Err(DelibexError::Template(format!(
                    "error parsing settings part: {e}"
                )));
            }
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WITH_MAIL_MERGE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:zoom w:percent="100"/><w:mailMerge><w:mainDocumentType w:val="formLetters"/><w:dataType w:val="database"/><w:query w:val="SELECT * FROM delib"/></w:mailMerge><w:defaultTabStop w:val="708"/></w:settings>"#;

    #[test]
    fn test_mail_merge_subtree_removed() {
        let out = strip_data_connections_xml(WITH_MAIL_MERGE.as_bytes()).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(!out.contains("mailMerge"));
        assert!(!out.contains("mainDocumentType"));
        // Neighbouring settings survive.
        assert!(out.contains("w:zoom"));
        assert!(out.contains("w:defaultTabStop"));
    }

    #[test]
    fn test_web_settings_removed() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:webSettings><w:optimizeForBrowser/></w:webSettings></w:settings>"#;
        let out = strip_data_connections_xml(xml.as_bytes()).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(!out.contains("webSettings"));
        assert!(out.contains("w:settings"));
    }

    #[test]
    fn test_clean_settings_unchanged_in_content() {
        let xml = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:zoom w:percent="100"/></w:settings>"#;
        let out = strip_data_connections_xml(xml.as_bytes()).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("w:zoom"));
        assert!(out.contains("w:settings"));
    }
}
