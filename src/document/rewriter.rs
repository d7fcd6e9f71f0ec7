//! Paragraph rewriting with run-level formatting carried over.
//!
//! A changed paragraph is rebuilt by positional remap: the corrected text is
//! cut into chunks whose lengths match the original runs, and each chunk
//! takes the formatting of the run at that position. This is not a diff, so
//! a replacement whose length differs from the source can shift formatting
//! across a run boundary. Paragraphs without a match are never touched.

use super::model::{Block, Comment, CommentId, CommentTable, Document, Inline, Paragraph, Run};
use super::format::RunFormat;
use crate::domain::CorrectionMap;
use tracing::debug;

/// Statistics about one document rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Paragraphs with at least one run
    pub paragraphs_visited: usize,

    /// Paragraphs whose text changed and were rebuilt
    pub paragraphs_rewritten: usize,

    /// Substitutions performed across all paragraphs
    pub replacements: usize,
}

impl RewriteStats {
    pub fn has_changes(&self) -> bool {
        self.paragraphs_rewritten > 0
    }
}

/// Comment anchor lifted from a run before the paragraph is cleared.
struct CapturedAnchor {
    id: CommentId,
    format: RunFormat,
    comment: Option<Comment>,
}

/// Rewrites every paragraph of `document` in place, including paragraphs in
/// table cells at any nesting depth.
pub fn rewrite(document: &mut Document, corrections: &CorrectionMap) -> RewriteStats {
    let mut stats = RewriteStats::default();
    let Document { body, comments } = document;
    rewrite_blocks(body, comments, corrections, &mut stats);
    stats
}

fn rewrite_blocks(
    blocks: &mut [Block],
    comments: &mut CommentTable,
    corrections: &CorrectionMap,
    stats: &mut RewriteStats,
) {
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => {
                if !paragraph.has_runs() {
                    continue;
                }
                stats.paragraphs_visited += 1;
                let hits = corrections.count_matches(&paragraph.text());
                if rewrite_paragraph(paragraph, comments, corrections) {
                    stats.replacements += hits;
                    stats.paragraphs_rewritten += 1;
                }
            }
            Block::Table(table) => {
                for row in &mut table.rows {
                    for cell in &mut row.cells {
                        rewrite_blocks(&mut cell.blocks, comments, corrections, stats);
                    }
                }
            }
            Block::Raw(_) => {}
        }
    }
}

/// Rewrites one paragraph. Returns true if its text changed.
pub fn rewrite_paragraph(
    paragraph: &mut Paragraph,
    comments: &mut CommentTable,
    corrections: &CorrectionMap,
) -> bool {
    if !paragraph.has_runs() {
        return false;
    }

    let original = paragraph.text();
    let corrected = corrections.apply_output(&original);
    if corrected == original {
        return false;
    }
    debug!(original = %original, corrected = %corrected, "rewriting paragraph");

    let style = paragraph.style().map(str::to_owned);
    let mut anchors = Vec::new();
    let chars: Vec<char> = corrected.chars().collect();
    let mut start = 0;

    for inline in paragraph.take_content() {
        let run = match inline {
            Inline::Run(run) => run,
            Inline::Raw(raw) => {
                paragraph.push_inline(Inline::Raw(raw));
                continue;
            }
        };

        for id in run.comment_references() {
            anchors.push(CapturedAnchor {
                id: id.clone(),
                format: run.format.clone(),
                comment: comments.get(id).cloned(),
            });
        }

        let end = (start + run.text_len()).min(chars.len());
        let (leading, trailing) = run.objects_around_text();
        if start < end || !leading.is_empty() || !trailing.is_empty() {
            let mut replacement = Run::default();
            run.format.apply_to(&mut replacement.format);
            replacement.content.extend(leading);
            let chunk: String = chars[start..end].iter().collect();
            replacement.push_text(&chunk);
            replacement.content.extend(trailing);
            paragraph.push_run(replacement);
        }
        start = end;
    }

    if start < chars.len() {
        let rest: String = chars[start..].iter().collect();
        paragraph.push_run(Run::new(&rest));
    }

    paragraph.set_style(style);

    for anchor in anchors {
        paragraph.push_run(Run::comment_anchor(anchor.id, anchor.format));
        if let Some(comment) = anchor.comment {
            comments.insert(comment);
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{Cell, Row, RunContent, Table};

    fn corrections(pairs: &[(&str, &str)]) -> CorrectionMap {
        pairs.iter().copied().collect()
    }

    fn runs(paragraph: &Paragraph) -> Vec<&Run> {
        paragraph.runs().collect()
    }

    #[test]
    fn test_positional_remap_keeps_leading_bold() {
        let mut paragraph = Paragraph::new()
            .with_run(Run::new("下さ").with_format(RunFormat::bold()))
            .with_run(Run::new("い"));
        let mut comments = CommentTable::new();

        assert!(rewrite_paragraph(
            &mut paragraph,
            &mut comments,
            &corrections(&[("下さ", "くださ")])
        ));

        assert_eq!(paragraph.text(), "ください");
        let runs = runs(&paragraph);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text(), "くだ");
        assert_eq!(runs[0].format.bold, Some(true));
        assert_eq!(runs[1].text(), "さ");
        assert_eq!(runs[1].format.bold, None);
        assert_eq!(runs[2].text(), "い");
        assert!(runs[2].format.is_empty());
    }

    #[test]
    fn test_unchanged_paragraph_untouched() {
        let original = Paragraph::new()
            .with_style("Heading1")
            .with_run(Run::new("変更なし").with_format(RunFormat::italic()));
        let mut paragraph = original.clone();
        let mut comments = CommentTable::new();

        assert!(!rewrite_paragraph(
            &mut paragraph,
            &mut comments,
            &corrections(&[("下さ", "くださ")])
        ));
        assert_eq!(paragraph, original);
    }

    #[test]
    fn test_shrinking_text_drops_empty_chunks() {
        let mut paragraph = Paragraph::new()
            .with_run(Run::new("当クリニック"))
            .with_run(Run::new("へ").with_format(RunFormat::bold()));
        let mut comments = CommentTable::new();

        rewrite_paragraph(
            &mut paragraph,
            &mut comments,
            &corrections(&[("当クリニック", "当院")]),
        );

        assert_eq!(paragraph.text(), "当院へ");
        assert_eq!(runs(&paragraph).len(), 1);
    }

    #[test]
    fn test_comment_anchor_reattached() {
        let mut paragraph = Paragraph::new()
            .with_run(Run::new("出来ます"))
            .with_run(Run::comment_anchor(CommentId::new("3"), RunFormat::default()));
        let mut comments = CommentTable::new();
        comments.insert(Comment::new("3", "校正者", "確認"));

        rewrite_paragraph(&mut paragraph, &mut comments, &corrections(&[("出来", "でき")]));

        assert_eq!(paragraph.text(), "できます");
        let ids: Vec<_> = paragraph.comment_references().cloned().collect();
        assert_eq!(ids, vec![CommentId::new("3")]);
        assert!(comments.get(&CommentId::new("3")).is_some());
    }

    #[test]
    fn test_raw_inlines_keep_their_place() {
        let mut paragraph = Paragraph::new()
            .with_inline(Inline::Raw("<w:commentRangeStart w:id=\"1\"/>".to_string()))
            .with_run(Run::new("出来"))
            .with_inline(Inline::Raw("<w:commentRangeEnd w:id=\"1\"/>".to_string()));
        let mut comments = CommentTable::new();

        rewrite_paragraph(&mut paragraph, &mut comments, &corrections(&[("出来", "でき")]));

        let content = paragraph.content();
        assert!(matches!(content[0], Inline::Raw(_)));
        assert!(matches!(content[1], Inline::Run(_)));
        assert!(matches!(content[2], Inline::Raw(_)));
    }

    #[test]
    fn test_objects_survive_rewrite() {
        let mut picture = Run::default();
        picture
            .content
            .push(RunContent::Object("<w:drawing/>".to_string()));
        let mut paragraph = Paragraph::new()
            .with_run(Run::new("出来"))
            .with_run(picture);
        let mut comments = CommentTable::new();

        rewrite_paragraph(&mut paragraph, &mut comments, &corrections(&[("出来", "でき")]));

        let runs = runs(&paragraph);
        assert_eq!(runs.len(), 2);
        assert_eq!(
            runs[1].content,
            vec![RunContent::Object("<w:drawing/>".to_string())]
        );
    }

    #[test]
    fn test_rewrite_reaches_table_cells() {
        let cell = Cell::default().with_paragraph(Paragraph::new().with_run(Run::new("虫歯")));
        let nested = Table::default().with_row(Row::default().with_cell(cell.clone()));
        let mut outer_cell = cell;
        outer_cell.blocks.push(Block::Table(nested));
        let mut document = Document::new()
            .with_paragraph(Paragraph::new().with_run(Run::new("虫歯予防")))
            .with_paragraph(Paragraph::new())
            .with_table(Table::default().with_row(Row::default().with_cell(outer_cell)));

        let stats = rewrite(&mut document, &corrections(&[("虫歯", "むし歯")]));

        assert_eq!(stats.paragraphs_visited, 3);
        assert_eq!(stats.paragraphs_rewritten, 3);
        assert_eq!(stats.replacements, 3);
        assert_eq!(document.text(), "むし歯予防\n");
    }

    #[test]
    fn test_empty_map_is_noop() {
        let mut document =
            Document::new().with_paragraph(Paragraph::new().with_run(Run::new("下さい")));
        let before = document.clone();
        let stats = rewrite(&mut document, &CorrectionMap::new());
        assert!(!stats.has_changes());
        assert_eq!(stats.paragraphs_visited, 1);
        assert_eq!(stats.paragraphs_rewritten, 0);
        assert_eq!(document, before);
    }
}
