//! DOCX package container.
//!
//! A `.docx` file is a ZIP archive; the document body lives in
//! `word/document.xml` and everything else (content types, relationships,
//! styles, settings, media) travels alongside it. [`DocxPackage`] keeps the
//! archive as an ordered list of raw entries so that parts the model does
//! not understand pass through a read/modify/write cycle byte-identical,
//! and only the body (and the filtered settings part) are regenerated.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use delibex_core::{DelibexError, DocxDocument, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::reader::parse_document_xml;
use crate::settings::strip_data_connections_xml;
use crate::writer::write_document_xml;

/// ZIP entry name of the main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// ZIP entry name of the settings part.
pub const SETTINGS_PART: &str = "word/settings.xml";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults></w:styles>"#;

const SETTINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;

/// A DOCX archive held in memory as ordered `(entry name, bytes)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    /// Open a package from disk, keeping every entry in archive order.
    ///
    /// # Errors
    /// Returns a template error if the file is not a readable ZIP archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            DelibexError::Template(format!("{} is not a DOCX package: {e}", path.display()))
        })?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| {
                DelibexError::Template(format!("corrupt entry in {}: {e}", path.display()))
            })?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }

        Ok(Self { entries })
    }

    /// Build a minimal package around a freshly constructed document body.
    ///
    /// Used by template scaffolding: the result is a complete, openable
    /// `.docx` with default styles and empty settings.
    ///
    /// # Errors
    /// Returns a render error if the body cannot be serialized.
    pub fn from_document(doc: &DocxDocument) -> Result<Self> {
        let body = write_document_xml(doc)?;
        let entries = vec![
            ("[Content_Types].xml".to_string(), CONTENT_TYPES_XML.into()),
            ("_rels/.rels".to_string(), ROOT_RELS_XML.into()),
            (DOCUMENT_PART.to_string(), body),
            (
                "word/_rels/document.xml.rels".to_string(),
                DOCUMENT_RELS_XML.into(),
            ),
            ("word/styles.xml".to_string(), STYLES_XML.into()),
            (SETTINGS_PART.to_string(), SETTINGS_XML.into()),
        ];
        Ok(Self { entries })
    }

    /// Raw bytes of an entry, if present.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut Vec<u8>> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
    }

    /// Parse the main document part into the in-memory model.
    ///
    /// # Errors
    /// Returns a template error if the part is missing or malformed.
    pub fn document(&self) -> Result<DocxDocument> {
        let bytes = self
            .entry(DOCUMENT_PART)
            .ok_or_else(|| DelibexError::Template(format!("package has no {DOCUMENT_PART}")))?;
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| DelibexError::Template(format!("{DOCUMENT_PART} is not UTF-8: {e}")))?;
        parse_document_xml(xml)
    }

    /// Replace the main document part with a serialized model.
    ///
    /// # Errors
    /// Returns a render error if serialization fails.
    pub fn set_document(&mut self, doc: &DocxDocument) -> Result<()> {
        let body = write_document_xml(doc)?;
        match self.entry_mut(DOCUMENT_PART) {
            Some(data) => *data = body,
            None => self.entries.push((DOCUMENT_PART.to_string(), body)),
        }
        Ok(())
    }

    /// Drop residual mail-merge data connections from the settings part.
    ///
    /// Templates produced by a mail-merge workflow keep a `w:mailMerge`
    /// element (and often `w:webSettings`) pointing at the author's data
    /// source; a generated certificate must not carry either. A package
    /// without a settings part is left untouched.
    ///
    /// # Errors
    /// Returns a template error if the settings part is malformed XML.
    pub fn strip_data_connections(&mut self) -> Result<()> {
        let Some(data) = self.entry_mut(SETTINGS_PART) else {
            return Ok(());
        };
        *data = strip_data_connections_xml(data)?;
        Ok(())
    }

    /// Write the package to disk.
    ///
    /// Media entries are stored uncompressed and everything else deflated,
    /// matching the layout Word itself produces.
    ///
    /// # Errors
    /// Returns an I/O or render error if the archive cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, data) in &self.entries {
            let options = if name.starts_with("word/media/") {
                stored
            } else {
                deflated
            };
            zip.start_file(name.as_str(), options).map_err(|e| {
                DelibexError::Render(format!("cannot add {name} to {}: {e}", path.display()))
            })?;
            zip.write_all(data)?;
        }
        zip.finish()
            .map_err(|e| DelibexError::Render(format!("cannot finish {}: {e}", path.display())))?;
        Ok(())
    }
}
