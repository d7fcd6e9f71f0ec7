//! Correction pipeline for uploaded files.
//!
//! This module provides a strategy pattern over the supported formats and a
//! service that runs one request: build the correction map, correct every
//! upload in order, and package the results.

pub mod archive;
pub mod docx;
pub mod markdown;
pub mod strategy;

pub use archive::Download;
pub use docx::DocxStrategy;
pub use markdown::MarkdownStrategy;
pub use strategy::{
    mime_for_path, CorrectedContent, CorrectionStrategy, FileKind, UploadedFile, DOCX_MIME,
    MARKDOWN_MIME,
};

use crate::domain::{Correction, CorrectionMap};
use crate::error::{HyokiError, HyokiResult};
use tracing::{debug, info, warn};

/// Everything one "start" action hands over.
#[derive(Debug, Clone, Default)]
pub struct CorrectionRequest {
    pub files: Vec<UploadedFile>,

    /// Keys of the selected built-in presets
    pub presets: Vec<String>,

    /// Additional pairs from configuration, applied after the presets
    pub extra: Vec<Correction>,

    /// Raw `key:value` lines typed by the user
    pub freeform: String,
}

impl CorrectionRequest {
    pub fn new(files: Vec<UploadedFile>) -> Self {
        Self {
            files,
            ..Default::default()
        }
    }

    pub fn with_presets<S: AsRef<str>>(mut self, presets: &[S]) -> Self {
        self.presets = presets.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    pub fn with_freeform(mut self, lines: &str) -> Self {
        self.freeform = lines.to_string();
        self
    }

    /// Builds the correction map: presets, then extra pairs, then free-form
    /// lines.
    pub fn corrections(&self) -> HyokiResult<CorrectionMap> {
        let mut map = CorrectionMap::new();
        map.extend_from_presets(&self.presets)?;
        for pair in &self.extra {
            map.insert(pair.wrong.as_str(), pair.correct.as_str());
        }
        map.extend_from_lines(&self.freeform);
        Ok(map)
    }
}

/// A successfully corrected upload.
#[derive(Debug, Clone)]
pub struct CorrectedFile {
    /// Position of the upload in the request
    pub index: usize,
    pub name: Option<String>,
    pub kind: FileKind,
    pub content: CorrectedContent,
}

/// An upload that was skipped.
#[derive(Debug)]
pub struct FileError {
    pub index: usize,
    pub name: Option<String>,
    pub error: HyokiError,
}

/// Outcome of one request.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub files: Vec<CorrectedFile>,
    pub errors: Vec<FileError>,
    pub download: Option<Download>,
}

impl BatchOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total substitutions across all corrected files.
    pub fn replacements(&self) -> usize {
        self.files.iter().map(|f| f.content.replacements).sum()
    }
}

/// Correction service coordinating strategy execution.
pub struct CorrectionService {
    docx: Box<dyn CorrectionStrategy>,
    markdown: Box<dyn CorrectionStrategy>,
}

impl CorrectionService {
    /// Creates a service with the given per-format strategies.
    pub fn new(docx: Box<dyn CorrectionStrategy>, markdown: Box<dyn CorrectionStrategy>) -> Self {
        debug_assert_eq!(docx.kind(), FileKind::Docx);
        debug_assert_eq!(markdown.kind(), FileKind::Markdown);
        Self { docx, markdown }
    }

    /// Creates a service with the built-in DOCX and Markdown strategies.
    pub fn with_default_strategies() -> Self {
        Self::new(Box::new(DocxStrategy::new()), Box::new(MarkdownStrategy::new()))
    }

    fn strategy(&self, kind: FileKind) -> &dyn CorrectionStrategy {
        match kind {
            FileKind::Docx => self.docx.as_ref(),
            FileKind::Markdown => self.markdown.as_ref(),
        }
    }

    /// Corrects a single upload.
    pub fn correct_file(
        &self,
        index: usize,
        upload: &UploadedFile,
        corrections: &CorrectionMap,
    ) -> HyokiResult<CorrectedFile> {
        let kind = upload.kind()?;
        let strategy = self.strategy(kind);
        debug!(index, strategy = strategy.name(), "correcting file");
        let content = strategy.correct(&upload.bytes, corrections)?;
        Ok(CorrectedFile {
            index,
            name: upload.name.clone(),
            kind,
            content,
        })
    }

    /// Extracts the display text of an upload without correcting it.
    pub fn extract_text(&self, upload: &UploadedFile) -> HyokiResult<String> {
        let kind = upload.kind()?;
        self.strategy(kind).extract_text(&upload.bytes)
    }

    /// Runs one request.
    ///
    /// Unsupported or undecodable uploads are recorded in
    /// [`BatchOutcome::errors`] and left out of the download; the remaining
    /// uploads are still processed.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty request or an unknown preset, and
    /// `Archive` if the output cannot be packaged.
    pub fn process(&self, request: &CorrectionRequest) -> HyokiResult<BatchOutcome> {
        if request.files.is_empty() {
            return Err(HyokiError::InvalidInput {
                parameter: "files".to_string(),
                reason: "No files uploaded".to_string(),
            });
        }
        let corrections = request.corrections()?;
        self.process_files(&request.files, &corrections)
    }

    /// Corrects `files` with an already built map and packages the results.
    pub fn process_files(
        &self,
        files: &[UploadedFile],
        corrections: &CorrectionMap,
    ) -> HyokiResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        for (index, upload) in files.iter().enumerate() {
            match self.correct_file(index, upload, corrections) {
                Ok(file) => {
                    info!(
                        index,
                        kind = file.kind.extension(),
                        replacements = file.content.replacements,
                        "corrected file"
                    );
                    outcome.files.push(file);
                }
                Err(error) if error.is_per_file() => {
                    warn!(index, error = %error, "skipping file");
                    outcome.errors.push(FileError {
                        index,
                        name: upload.name.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }

        outcome.download = archive::package(files.len(), &outcome.files)?;
        Ok(outcome)
    }
}

impl Default for CorrectionService {
    fn default() -> Self {
        Self::with_default_strategies()
    }
}
