//! Japanese orthographic variant correction for Markdown and DOCX files.
//!
//! This library replaces fixed spelling variants (for example "下さい" →
//! "ください") in uploaded documents. Word-processor documents are rewritten
//! paragraph by paragraph while inline formatting and review comments are
//! carried over to the corrected text.
//!
//! # Architecture
//!
//! - [`domain`]: Correction map, built-in presets, substitution engine
//! - [`document`]: Document tree, run rewriter and DOCX codec
//! - [`correction`]: Per-format strategies, batch service and packaging
//! - [`config`]: Optional TOML configuration
//! - [`error`]: Error types
//!
//! # Quick Start
//!
//! ```
//! use hyoki::{CorrectionRequest, CorrectionService, UploadedFile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let upload = UploadedFile::new("text/markdown", "出来ます".as_bytes().to_vec());
//! let request = CorrectionRequest::new(vec![upload]).with_presets(&["出来"]);
//!
//! let outcome = CorrectionService::with_default_strategies().process(&request)?;
//! let download = outcome.download.expect("one corrected file");
//! assert_eq!(download.file_name, "corrected.md");
//! assert_eq!(download.bytes, "できます".as_bytes());
//! # Ok(())
//! # }
//! ```
//!
//! # Examples
//!
//! ## Display and output renderings
//!
//! ```
//! use hyoki::CorrectionMap;
//!
//! let map = CorrectionMap::from_selection(&[], "下さ:くださ").unwrap();
//! assert_eq!(map.apply_output("お待ち下さい"), "お待ちください");
//! assert_eq!(
//!     map.apply_display("お待ち下さい"),
//!     "お待ち<span style=\"color:red;\">くださ</span>い"
//! );
//! ```
//!
//! ## Rewriting a document tree
//!
//! ```
//! use hyoki::document::{rewrite, Document, Paragraph, Run, RunFormat};
//! use hyoki::CorrectionMap;
//!
//! let mut doc = Document::new().with_paragraph(
//!     Paragraph::new()
//!         .with_run(Run::new("下さ").with_format(RunFormat::bold()))
//!         .with_run(Run::new("い")),
//! );
//! let map: CorrectionMap = [("下さ", "くださ")].into_iter().collect();
//! rewrite(&mut doc, &map);
//! assert_eq!(doc.text(), "ください");
//! ```

pub mod config;
pub mod correction;
pub mod document;
pub mod domain;
pub mod error;

pub use config::Config;
pub use correction::{
    BatchOutcome, CorrectedFile, CorrectionRequest, CorrectionService, CorrectionStrategy,
    Download, FileError, FileKind, UploadedFile,
};
pub use document::{Document, DocxPackage};
pub use domain::{Correction, CorrectionMap};
pub use error::{HyokiError, HyokiResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_creation() {
        let _service = CorrectionService::with_default_strategies();
    }

    #[test]
    fn test_builtin_preset_map() {
        let map = CorrectionMap::from_selection(&["虫歯".to_string()], "").unwrap();
        assert_eq!(map.apply_output("虫歯予防"), "むし歯予防");
    }
}
