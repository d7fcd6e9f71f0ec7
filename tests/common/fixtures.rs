//! Test fixtures and DOCX builders.
//!
//! Builds minimal but well-formed word-processor packages in memory so tests
//! do not depend on binary files checked into the repository.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/comments.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// A run inside a test paragraph.
#[derive(Debug, Clone)]
pub struct TestRun {
    text: String,
    bold: bool,
    italic: bool,
}

impl TestRun {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: &str) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(text: &str) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    fn xml(&self) -> String {
        let mut props = String::new();
        if self.bold {
            props.push_str("<w:b/>");
        }
        if self.italic {
            props.push_str("<w:i/>");
        }
        let r_pr = if props.is_empty() {
            String::new()
        } else {
            format!("<w:rPr>{}</w:rPr>", props)
        };
        format!("<w:r>{}<w:t xml:space=\"preserve\">{}</w:t></w:r>", r_pr, self.text)
    }
}

/// Builder for test DOCX packages.
///
/// # Example
///
/// ```no_run
/// let bytes = DocxBuilder::new()
///     .with_paragraph(&[TestRun::bold("下さ"), TestRun::plain("い")])
///     .with_text("出来ます")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    blocks: Vec<String>,
    comments: Vec<String>,
    media: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a paragraph made of the given runs.
    pub fn with_paragraph(mut self, runs: &[TestRun]) -> Self {
        let body: String = runs.iter().map(TestRun::xml).collect();
        self.blocks.push(format!("<w:p>{}</w:p>", body));
        self
    }

    /// Adds a single-run unformatted paragraph.
    pub fn with_text(self, text: &str) -> Self {
        self.with_paragraph(&[TestRun::plain(text)])
    }

    /// Adds a paragraph with a heading style and paragraph properties.
    pub fn with_styled(mut self, style: &str, text: &str) -> Self {
        self.blocks.push(format!(
            "<w:p w:rsidR=\"00A1\"><w:pPr><w:pStyle w:val=\"{}\"/><w:jc w:val=\"center\"/></w:pPr>{}</w:p>",
            style,
            TestRun::plain(text).xml()
        ));
        self
    }

    /// Adds a paragraph whose text is covered by comment `id`.
    pub fn with_commented(mut self, text: &str, id: u32, author: &str, note: &str) -> Self {
        self.blocks.push(format!(
            "<w:p><w:commentRangeStart w:id=\"{id}\"/>{}<w:commentRangeEnd w:id=\"{id}\"/><w:r><w:rPr><w:rStyle w:val=\"CommentReference\"/></w:rPr><w:commentReference w:id=\"{id}\"/></w:r></w:p>",
            TestRun::plain(text).xml(),
        ));
        self.comments.push(format!(
            "<w:comment w:id=\"{}\" w:author=\"{}\" w:date=\"2024-04-01T09:00:00Z\" w:initials=\"T\"><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:comment>",
            id, author, note
        ));
        self
    }

    /// Adds a table; each inner slice is one row of single-run cells.
    pub fn with_table(mut self, rows: &[&[&str]]) -> Self {
        let mut xml = String::from("<w:tbl><w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/></w:tblPr>");
        for row in rows {
            xml.push_str("<w:tr>");
            for cell in *row {
                xml.push_str(&format!(
                    "<w:tc><w:tcPr><w:tcW w:w=\"2000\" w:type=\"dxa\"/></w:tcPr><w:p>{}</w:p></w:tc>",
                    TestRun::plain(cell).xml()
                ));
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
        self.blocks.push(xml);
        self
    }

    /// Adds raw body XML.
    pub fn with_raw(mut self, xml: &str) -> Self {
        self.blocks.push(xml.to_string());
        self
    }

    /// Adds an image part under `word/media/`.
    pub fn with_media(mut self) -> Self {
        self.media = true;
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{}\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"><w:body>{}<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/></w:sectPr></w:body></w:document>",
            W_NS,
            self.blocks.concat()
        )
    }

    fn comments_xml(&self) -> Option<String> {
        if self.comments.is_empty() {
            return None;
        }
        Some(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:comments xmlns:w=\"{}\">{}</w:comments>",
            W_NS,
            self.comments.concat()
        ))
    }

    /// Builds the package bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), CONTENT_TYPES.as_bytes().to_vec()),
            ("_rels/.rels".to_string(), ROOT_RELS.as_bytes().to_vec()),
            ("word/document.xml".to_string(), self.document_xml().into_bytes()),
        ];
        if let Some(comments) = self.comments_xml() {
            parts.push(("word/comments.xml".to_string(), comments.into_bytes()));
        }
        if self.media {
            parts.push(("word/media/image1.png".to_string(), PNG_BYTES.to_vec()));
        }

        for (name, data) in parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(&data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// Writes the package to `dir/name` and returns the path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Builds a package around a hand-written `word/document.xml`.
pub fn docx_with_document(document_xml: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document_xml),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A 1x1 transparent PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Writes a UTF-8 text file to `dir/name` and returns the path.
pub fn write_markdown(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
