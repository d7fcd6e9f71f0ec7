//! Correction strategy trait and supporting types.
//!
//! Every supported input format has one strategy. Dispatch goes through the
//! closed [`FileKind`] enum, so an unsupported upload is rejected before any
//! strategy sees it.

use crate::domain::CorrectionMap;
use crate::error::{HyokiError, HyokiResult};
use std::path::Path;

/// MIME type of word-processor (DOCX) documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// MIME type written for corrected Markdown output.
pub const MARKDOWN_MIME: &str = "text/markdown";

const TEXT_MIMES: &[&str] = &["text/markdown", "text/x-markdown", "text/plain"];
const OCTET_STREAM_MIME: &str = "application/octet-stream";
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Word-processor document
    Docx,

    /// Markdown or plain text
    Markdown,
}

impl FileKind {
    /// Determines the kind of an upload from its declared MIME type.
    ///
    /// Browsers often send `application/octet-stream` for `.md` files, so
    /// that type is accepted when the file name has a Markdown extension.
    ///
    /// # Errors
    /// Returns `UnsupportedFileType` for anything else.
    pub fn detect(mime: &str, name: Option<&str>) -> HyokiResult<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == DOCX_MIME {
            return Ok(Self::Docx);
        }
        if TEXT_MIMES.contains(&essence.as_str()) {
            return Ok(Self::Markdown);
        }
        if essence == OCTET_STREAM_MIME && name.is_some_and(has_markdown_extension) {
            return Ok(Self::Markdown);
        }
        Err(HyokiError::UnsupportedFileType {
            mime: mime.to_string(),
        })
    }

    /// Extension of corrected output files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Markdown => "md",
        }
    }

    /// MIME type of corrected output files.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Docx => DOCX_MIME,
            Self::Markdown => MARKDOWN_MIME,
        }
    }
}

/// Guesses the MIME type a browser would declare for `path`.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("docx") => DOCX_MIME,
        Some("md") | Some("markdown") => MARKDOWN_MIME,
        Some("txt") => "text/plain",
        _ => OCTET_STREAM_MIME,
    }
}

fn has_markdown_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MARKDOWN_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// One uploaded blob as handed over by the caller.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name, if known
    pub name: Option<String>,

    /// Declared MIME type
    pub mime: String,

    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: None,
            mime: mime.to_string(),
            bytes,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Detects the kind of this upload.
    pub fn kind(&self) -> HyokiResult<FileKind> {
        FileKind::detect(&self.mime, self.name.as_deref())
    }
}

/// Result of correcting a single file.
#[derive(Debug, Clone, Default)]
pub struct CorrectedContent {
    /// Text before correction, for display
    pub original_text: String,

    /// Text with each replacement wrapped in highlight markup
    pub display_text: String,

    /// Corrected file bytes
    pub bytes: Vec<u8>,

    /// Number of substitutions applied
    pub replacements: usize,

    /// Paragraphs rebuilt (always zero for plain text)
    pub paragraphs_rewritten: usize,
}

impl CorrectedContent {
    /// Returns true if any substitution was applied.
    pub fn has_changes(&self) -> bool {
        self.replacements > 0
    }
}

/// Strategy for correcting one input format.
pub trait CorrectionStrategy: Send + Sync {
    /// Corrects `input` and returns display text and output bytes.
    fn correct(&self, input: &[u8], corrections: &CorrectionMap)
        -> HyokiResult<CorrectedContent>;

    /// Extracts the paragraph text shown to the user before correction.
    fn extract_text(&self, input: &[u8]) -> HyokiResult<String>;

    /// The format this strategy handles.
    fn kind(&self) -> FileKind;

    /// Returns a human-readable name for this strategy.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_docx() {
        assert_eq!(FileKind::detect(DOCX_MIME, None).unwrap(), FileKind::Docx);
    }

    #[test]
    fn test_detect_markdown_variants() {
        assert_eq!(
            FileKind::detect("text/markdown; charset=UTF-8", None).unwrap(),
            FileKind::Markdown
        );
        assert_eq!(
            FileKind::detect("text/plain", None).unwrap(),
            FileKind::Markdown
        );
        assert_eq!(
            FileKind::detect("application/octet-stream", Some("notes.MD")).unwrap(),
            FileKind::Markdown
        );
    }

    #[test]
    fn test_octet_stream_without_markdown_name() {
        assert!(FileKind::detect("application/octet-stream", Some("a.bin")).is_err());
        assert!(FileKind::detect("application/octet-stream", None).is_err());
    }

    #[test]
    fn test_unsupported() {
        let err = FileKind::detect("application/pdf", None).unwrap_err();
        assert!(matches!(err, HyokiError::UnsupportedFileType { .. }));
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.DOCX")), DOCX_MIME);
        assert_eq!(mime_for_path(Path::new("a.md")), MARKDOWN_MIME);
        assert_eq!(mime_for_path(Path::new("a.pdf")), "application/octet-stream");
    }
}
