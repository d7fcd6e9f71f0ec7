//! Markdown and plain-text correction.

use super::strategy::{CorrectedContent, CorrectionStrategy, FileKind};
use crate::domain::CorrectionMap;
use crate::error::{HyokiError, HyokiResult};

/// Corrects UTF-8 text files as a whole.
#[derive(Debug, Clone, Default)]
pub struct MarkdownStrategy;

impl MarkdownStrategy {
    pub fn new() -> Self {
        Self
    }

    fn decode(input: &[u8]) -> HyokiResult<&str> {
        std::str::from_utf8(input).map_err(|e| HyokiError::decode("markdown", e))
    }
}

impl CorrectionStrategy for MarkdownStrategy {
    fn correct(
        &self,
        input: &[u8],
        corrections: &CorrectionMap,
    ) -> HyokiResult<CorrectedContent> {
        let text = Self::decode(input)?;
        let corrected = corrections.apply_output(text);
        Ok(CorrectedContent {
            original_text: text.to_string(),
            display_text: corrections.apply_display(text),
            replacements: corrections.count_matches(text),
            bytes: corrected.into_bytes(),
            paragraphs_rewritten: 0,
        })
    }

    fn extract_text(&self, input: &[u8]) -> HyokiResult<String> {
        Self::decode(input).map(str::to_string)
    }

    fn kind(&self) -> FileKind {
        FileKind::Markdown
    }

    fn name(&self) -> &str {
        "markdown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_markdown() {
        let map: CorrectionMap = [("出来", "でき")].into_iter().collect();
        let result = MarkdownStrategy::new()
            .correct("出来ます".as_bytes(), &map)
            .unwrap();
        assert_eq!(result.bytes, "できます".as_bytes());
        assert_eq!(result.replacements, 1);
        assert!(result.display_text.contains("<span style=\"color:red;\">でき</span>"));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let err = MarkdownStrategy::new()
            .correct(&[0xff, 0xfe, 0x00], &CorrectionMap::new())
            .unwrap_err();
        assert!(matches!(err, HyokiError::Decode { .. }));
    }
}
