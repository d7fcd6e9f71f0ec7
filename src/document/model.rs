//! In-memory document tree.
//!
//! A [`Document`] owns its body blocks and its comment table. Tables own rows,
//! rows own cells, cells own blocks again. Paragraphs own inline items, most
//! of which are runs of uniformly formatted text. Markup the model does not
//! interpret is carried along as raw XML so it survives a round trip.

use super::format::RunFormat;

/// Identifier of a review comment, as written in the package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A standalone review comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub author: Option<String>,
    pub initials: Option<String>,
    pub date: Option<String>,
    /// Plain text of the comment body, one line per paragraph
    pub text: String,
    /// Original XML of the comment element, when decoded from a package
    pub raw: Option<String>,
}

impl Comment {
    pub fn new(id: impl Into<String>, author: &str, text: &str) -> Self {
        Self {
            id: CommentId::new(id),
            author: Some(author.to_string()),
            initials: None,
            date: None,
            text: text.to_string(),
            raw: None,
        }
    }
}

/// Document-level table of comments, kept in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTable {
    comments: Vec<Comment>,
}

impl CommentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    /// Registers a comment under its id, replacing any comment with that id.
    pub fn insert(&mut self, comment: Comment) {
        match self.comments.iter_mut().find(|c| c.id == comment.id) {
            Some(existing) => *existing = comment,
            None => self.comments.push(comment),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

/// One piece of run content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunContent {
    Text(String),
    Tab,
    Break,
    /// Anchor tying this run to a comment in the comment table
    CommentReference(CommentId),
    /// Non-text object such as a drawing or field character
    Object(String),
}

/// Contiguous span of text sharing one formatting record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub format: RunFormat,
    pub content: Vec<RunContent>,
}

impl Run {
    /// Creates an unformatted run. Tabs and newlines become tab and break
    /// content so that [`Run::text`] returns `text` unchanged.
    pub fn new(text: &str) -> Self {
        let mut run = Self::default();
        run.push_text(text);
        run
    }

    pub fn with_format(mut self, format: RunFormat) -> Self {
        self.format = format;
        self
    }

    /// Creates a run that only carries a comment anchor.
    pub fn comment_anchor(id: CommentId, format: RunFormat) -> Self {
        Self {
            format,
            content: vec![RunContent::CommentReference(id)],
        }
    }

    pub fn push_text(&mut self, text: &str) {
        let mut pending = String::new();
        for ch in text.chars() {
            match ch {
                '\t' | '\n' => {
                    if !pending.is_empty() {
                        self.content
                            .push(RunContent::Text(std::mem::take(&mut pending)));
                    }
                    self.content.push(if ch == '\t' {
                        RunContent::Tab
                    } else {
                        RunContent::Break
                    });
                }
                _ => pending.push(ch),
            }
        }
        if !pending.is_empty() {
            self.content.push(RunContent::Text(pending));
        }
    }

    /// Visible text of the run.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for item in &self.content {
            match item {
                RunContent::Text(t) => text.push_str(t),
                RunContent::Tab => text.push('\t'),
                RunContent::Break => text.push('\n'),
                RunContent::CommentReference(_) | RunContent::Object(_) => {}
            }
        }
        text
    }

    /// Length of the visible text in characters.
    pub fn text_len(&self) -> usize {
        self.content
            .iter()
            .map(|item| match item {
                RunContent::Text(t) => t.chars().count(),
                RunContent::Tab | RunContent::Break => 1,
                RunContent::CommentReference(_) | RunContent::Object(_) => 0,
            })
            .sum()
    }

    pub fn comment_references(&self) -> impl Iterator<Item = &CommentId> {
        self.content.iter().filter_map(|item| match item {
            RunContent::CommentReference(id) => Some(id),
            _ => None,
        })
    }

    /// Non-text objects split into those before the first text content and
    /// those after it.
    pub(crate) fn objects_around_text(&self) -> (Vec<RunContent>, Vec<RunContent>) {
        let mut leading = Vec::new();
        let mut trailing = Vec::new();
        let mut seen_text = false;
        for item in &self.content {
            match item {
                RunContent::Object(_) if seen_text => trailing.push(item.clone()),
                RunContent::Object(_) => leading.push(item.clone()),
                RunContent::Text(_) | RunContent::Tab | RunContent::Break => seen_text = true,
                RunContent::CommentReference(_) => {}
            }
        }
        (leading, trailing)
    }
}

/// Item inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Run(Run),
    /// Hyperlinks, bookmarks, comment ranges and other markup kept verbatim
    Raw(String),
}

/// A paragraph of runs.
///
/// A paragraph decoded from a package remembers its source XML until it is
/// modified, so unmodified paragraphs are written back byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    attributes: String,
    style: Option<String>,
    properties: String,
    content: Vec<Inline>,
    source: Option<String>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn decoded(
        attributes: String,
        style: Option<String>,
        properties: String,
        content: Vec<Inline>,
        source: String,
    ) -> Self {
        Self {
            attributes,
            style,
            properties,
            content,
            source: Some(source),
        }
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.set_style(Some(style.to_string()));
        self
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.push_run(run);
        self
    }

    pub fn with_inline(mut self, inline: Inline) -> Self {
        self.push_inline(inline);
        self
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn set_style(&mut self, style: Option<String>) {
        self.source = None;
        self.style = style;
    }

    /// Raw attributes of the paragraph element, with a leading space.
    pub fn attributes(&self) -> &str {
        &self.attributes
    }

    /// Raw paragraph properties other than the style.
    pub fn properties(&self) -> &str {
        &self.properties
    }

    pub fn content(&self) -> &[Inline] {
        &self.content
    }

    pub fn push_run(&mut self, run: Run) {
        self.push_inline(Inline::Run(run));
    }

    pub fn push_inline(&mut self, inline: Inline) {
        self.source = None;
        self.content.push(inline);
    }

    /// Removes and returns every inline item.
    pub fn take_content(&mut self) -> Vec<Inline> {
        self.source = None;
        std::mem::take(&mut self.content)
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|inline| match inline {
            Inline::Run(run) => Some(run),
            Inline::Raw(_) => None,
        })
    }

    pub fn has_runs(&self) -> bool {
        self.runs().next().is_some()
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs().map(Run::text).collect()
    }

    pub fn comment_references(&self) -> impl Iterator<Item = &CommentId> {
        self.runs().flat_map(Run::comment_references)
    }

    /// Source XML, present while the paragraph is unmodified.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    /// Raw attributes of the cell element, with a leading space
    pub attributes: String,
    pub properties: String,
    pub blocks: Vec<Block>,
}

impl Cell {
    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.blocks.push(Block::Paragraph(paragraph));
        self
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub attributes: String,
    pub properties: String,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }
}

/// A table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub attributes: String,
    /// Raw table properties and grid
    pub properties: String,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }
}

/// Block-level body item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Section properties, content controls and other markup kept verbatim
    Raw(String),
}

impl Block {
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

/// A word-processor document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub body: Vec<Block>,
    pub comments: CommentTable,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.body.push(Block::Paragraph(paragraph));
        self
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.body.push(Block::Table(table));
        self
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.insert(comment);
        self
    }

    /// Top-level paragraphs, in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(Block::as_paragraph)
    }

    /// Top-level tables, in order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Text of the top-level paragraphs joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
