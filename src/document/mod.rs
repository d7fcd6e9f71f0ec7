//! Word-processor document model, rewriter and DOCX codec.
//!
//! The model is an explicit ownership tree so the rewriter can be exercised
//! without any file format involved. [`DocxPackage`] converts between that
//! tree and DOCX bytes.

pub mod docx;
pub mod format;
pub mod model;
pub mod rewriter;

pub use docx::DocxPackage;
pub use format::{FontFamily, RunFormat, VerticalAlign};
pub use model::{
    Block, Cell, Comment, CommentId, CommentTable, Document, Inline, Paragraph, Row, Run,
    RunContent, Table,
};
pub use rewriter::{rewrite, rewrite_paragraph, RewriteStats};
