//! DOCX correction: rewrite the live document and re-encode the package.

use super::strategy::{CorrectedContent, CorrectionStrategy, FileKind};
use crate::document::{rewrite, DocxPackage};
use crate::domain::CorrectionMap;
use crate::error::HyokiResult;
use tracing::debug;

/// Corrects word-processor documents run by run.
#[derive(Debug, Clone, Default)]
pub struct DocxStrategy;

impl DocxStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl CorrectionStrategy for DocxStrategy {
    fn correct(
        &self,
        input: &[u8],
        corrections: &CorrectionMap,
    ) -> HyokiResult<CorrectedContent> {
        let mut package = DocxPackage::decode(input)?;
        let original_text = package.document().text();
        let display_text = corrections.apply_display(&original_text);

        let stats = rewrite(package.document_mut(), corrections);
        debug!(
            visited = stats.paragraphs_visited,
            rewritten = stats.paragraphs_rewritten,
            "docx rewrite finished"
        );

        Ok(CorrectedContent {
            original_text,
            display_text,
            bytes: package.encode()?,
            replacements: stats.replacements,
            paragraphs_rewritten: stats.paragraphs_rewritten,
        })
    }

    fn extract_text(&self, input: &[u8]) -> HyokiResult<String> {
        Ok(DocxPackage::decode(input)?.document().text())
    }

    fn kind(&self) -> FileKind {
        FileKind::Docx
    }

    fn name(&self) -> &str {
        "docx"
    }
}
