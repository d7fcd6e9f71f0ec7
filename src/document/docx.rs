//! DOCX package codec.
//!
//! Decoding reads every ZIP entry of the package, then parses the main
//! document part and the comments part into the [`Document`] tree. Encoding
//! writes the tree back into those two parts and copies every other entry
//! unchanged, in the original entry order.

use super::format::{FontFamily, RawProperty, RunFormat, VerticalAlign};
use super::model::{
    Block, Cell, Comment, CommentId, Document, Inline, Paragraph, Row, Run, RunContent, Table,
};
use crate::error::{HyokiError, HyokiResult};
use roxmltree::Node;
use std::io::{Cursor, Read, Write};
use tracing::{debug, warn};

/// WordprocessingML main namespace.
pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const DOCUMENT_PART: &str = "word/document.xml";
const COMMENTS_PART: &str = "word/comments.xml";
const MEDIA_PREFIX: &str = "word/media/";
const FORMAT_NAME: &str = "docx";

/// Child order of `w:rPr` required by the schema.
const RPR_ORDER: &[&str] = &[
    "rStyle",
    "rFonts",
    "b",
    "bCs",
    "i",
    "iCs",
    "caps",
    "smallCaps",
    "strike",
    "dstrike",
    "outline",
    "shadow",
    "emboss",
    "imprint",
    "noProof",
    "snapToGrid",
    "vanish",
    "webHidden",
    "color",
    "spacing",
    "w",
    "kern",
    "position",
    "sz",
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
    "oMath",
];

/// Text of a part before and after the element whose children are modelled.
#[derive(Debug, Clone)]
struct PartFrame {
    head: String,
    tail: String,
}

/// A decoded DOCX package.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    document: Document,
    entries: Vec<(String, Vec<u8>)>,
    body_frame: PartFrame,
    comments_frame: Option<PartFrame>,
    prefix: String,
}

impl DocxPackage {
    /// Decodes a package from its bytes.
    ///
    /// # Errors
    /// Returns `Decode` if the bytes are not a ZIP archive, the main document
    /// part is missing, or a part is not well-formed XML.
    pub fn decode(bytes: &[u8]) -> HyokiResult<Self> {
        let entries = read_entries(bytes)?;

        let document_xml = part_text(&entries, DOCUMENT_PART)?
            .ok_or_else(|| HyokiError::decode(FORMAT_NAME, "missing word/document.xml"))?;
        let xml = roxmltree::Document::parse(&document_xml)
            .map_err(|e| HyokiError::decode(FORMAT_NAME, format!("{}: {}", DOCUMENT_PART, e)))?;
        let root = xml.root_element();
        let prefix = wml_prefix(root);
        let body = wml_child(root, "body")
            .ok_or_else(|| HyokiError::decode(FORMAT_NAME, "document has no body"))?;
        let body_frame = frame(&document_xml, body, &qualify(&prefix, "body"));

        let mut document = Document {
            body: decode_blocks(&document_xml, body),
            ..Default::default()
        };

        let comments_frame = match part_text(&entries, COMMENTS_PART)? {
            Some(comments_xml) => {
                let xml = roxmltree::Document::parse(&comments_xml).map_err(|e| {
                    HyokiError::decode(FORMAT_NAME, format!("{}: {}", COMMENTS_PART, e))
                })?;
                let root = xml.root_element();
                for node in root.children().filter(|n| is_wml(*n, "comment")) {
                    document.comments.insert(decode_comment(&comments_xml, node));
                }
                Some(frame(&comments_xml, root, &qualify(&prefix, "comments")))
            }
            None => None,
        };

        debug!(
            entries = entries.len(),
            blocks = document.body.len(),
            comments = document.comments.len(),
            "decoded docx package"
        );

        Ok(Self {
            document,
            entries,
            body_frame,
            comments_frame,
            prefix,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Names of all entries, in package order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Encodes the package, with the current document tree, to bytes.
    pub fn encode(&self) -> HyokiResult<Vec<u8>> {
        let writer = WmlWriter::new(&self.prefix);
        let mut document_xml = self.body_frame.head.clone();
        for block in &self.document.body {
            writer.block(&mut document_xml, block);
        }
        document_xml.push_str(&self.body_frame.tail);

        let comments_xml = match &self.comments_frame {
            Some(frame) => {
                let mut xml = frame.head.clone();
                for comment in self.document.comments.iter() {
                    writer.comment(&mut xml, comment);
                }
                xml.push_str(&frame.tail);
                Some(xml)
            }
            None => {
                if !self.document.comments.is_empty() {
                    warn!("package has no comments part; comments are not written");
                }
                None
            }
        };

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, data) in &self.entries {
            if name.ends_with('/') {
                zip.add_directory(name.as_str(), deflated)?;
                continue;
            }
            let data = match name.as_str() {
                DOCUMENT_PART => document_xml.as_bytes(),
                COMMENTS_PART => comments_xml.as_deref().map_or(data.as_slice(), str::as_bytes),
                _ => data.as_slice(),
            };
            let options = if name.starts_with(MEDIA_PREFIX) {
                stored
            } else {
                deflated
            };
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)
                .map_err(|e| HyokiError::archive(format!("{}: {}", name, e)))?;
        }

        Ok(zip.finish()?.into_inner())
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Reads every ZIP entry into memory, preserving order.
fn read_entries(bytes: &[u8]) -> HyokiResult<Vec<(String, Vec<u8>)>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| HyokiError::decode(FORMAT_NAME, e))?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| HyokiError::decode(FORMAT_NAME, e))?;
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| HyokiError::decode(FORMAT_NAME, format!("{}: {}", name, e)))?;
        entries.push((name, data));
    }
    Ok(entries)
}

fn part_text(entries: &[(String, Vec<u8>)], part: &str) -> HyokiResult<Option<String>> {
    match entries.iter().find(|(name, _)| name == part) {
        Some((_, data)) => {
            let text = std::str::from_utf8(data)
                .map_err(|e| HyokiError::decode(FORMAT_NAME, format!("{}: {}", part, e)))?;
            Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
        }
        None => Ok(None),
    }
}

/// Prefix bound to the WordprocessingML namespace, `""` when it is the
/// default namespace.
fn wml_prefix(root: Node) -> String {
    match root.lookup_prefix(WML_NS) {
        Some(prefix) => prefix.to_string(),
        None if root.lookup_namespace_uri(None) == Some(WML_NS) => String::new(),
        None => "w".to_string(),
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}:{}", prefix, name)
    }
}

/// Splits `xml` around the children of `node`.
fn frame(xml: &str, node: Node, qname: &str) -> PartFrame {
    let range = node.range();
    let element = &xml[range.clone()];
    if element.ends_with("/>") {
        return PartFrame {
            head: format!("{}>", &xml[..range.end - 2]),
            tail: format!("</{}>{}", qname, &xml[range.end..]),
        };
    }
    let open_end = start_tag_len(element).map_or(range.end, |i| range.start + i + 1);
    let close_start = element.rfind("</").map_or(range.end, |i| range.start + i);
    PartFrame {
        head: xml[..open_end].to_string(),
        tail: xml[close_start..].to_string(),
    }
}

fn is_wml(node: Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

fn wml_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_wml(*n, name))
}

/// Reads a WML attribute. Unprefixed attributes are accepted too, which is
/// how they appear when WML is the default namespace.
fn wml_attr<'a>(node: Node<'a, 'a>, name: &str) -> Option<&'a str> {
    node.attribute((WML_NS, name)).or_else(|| node.attribute(name))
}

fn raw<'x>(xml: &'x str, node: Node) -> &'x str {
    &xml[node.range()]
}

/// Attribute text of the start tag of `node`, with its leading whitespace.
fn start_tag_attributes(xml: &str, node: Node) -> String {
    let start = node.range().start;
    let Some(len) = start_tag_len(&xml[start..]) else {
        return String::new();
    };
    let tag = xml[start + 1..start + len].trim_end_matches('/');
    match tag.find(char::is_whitespace) {
        Some(i) => tag[i..].trim_end().to_string(),
        None => String::new(),
    }
}

/// Offset of the `>` closing the start tag at the beginning of `tag`.
/// Quoted attribute values may contain `>`.
fn start_tag_len(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, ch) in tag.char_indices() {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn decode_blocks(xml: &str, parent: Node) -> Vec<Block> {
    parent.children().map(|node| decode_block(xml, node)).collect()
}

fn decode_block(xml: &str, node: Node) -> Block {
    if is_wml(node, "p") {
        Block::Paragraph(decode_paragraph(xml, node))
    } else if is_wml(node, "tbl") {
        Block::Table(decode_table(xml, node))
    } else {
        Block::Raw(raw(xml, node).to_string())
    }
}

fn decode_table(xml: &str, node: Node) -> Table {
    let mut table = Table {
        attributes: start_tag_attributes(xml, node),
        ..Default::default()
    };
    for child in node.children() {
        if is_wml(child, "tr") {
            table.rows.push(decode_row(xml, child));
        } else {
            table.properties.push_str(raw(xml, child));
        }
    }
    table
}

fn decode_row(xml: &str, node: Node) -> Row {
    let mut row = Row {
        attributes: start_tag_attributes(xml, node),
        ..Default::default()
    };
    for child in node.children() {
        if is_wml(child, "tc") {
            row.cells.push(decode_cell(xml, child));
        } else {
            row.properties.push_str(raw(xml, child));
        }
    }
    row
}

fn decode_cell(xml: &str, node: Node) -> Cell {
    let mut cell = Cell {
        attributes: start_tag_attributes(xml, node),
        ..Default::default()
    };
    for child in node.children() {
        if is_wml(child, "tcPr") {
            cell.properties.push_str(raw(xml, child));
        } else {
            cell.blocks.push(decode_block(xml, child));
        }
    }
    cell
}

fn decode_paragraph(xml: &str, node: Node) -> Paragraph {
    let mut style = None;
    let mut properties = String::new();
    let mut content = Vec::new();

    for child in node.children() {
        if is_wml(child, "pPr") {
            for prop in child.children() {
                if let Some(val) = wml_attr(prop, "val").filter(|_| is_wml(prop, "pStyle")) {
                    style = Some(val.to_string());
                } else {
                    properties.push_str(raw(xml, prop));
                }
            }
        } else if is_wml(child, "r") {
            content.push(Inline::Run(decode_run(xml, child)));
        } else {
            content.push(Inline::Raw(raw(xml, child).to_string()));
        }
    }

    Paragraph::decoded(
        start_tag_attributes(xml, node),
        style,
        properties,
        content,
        raw(xml, node).to_string(),
    )
}

fn decode_run(xml: &str, node: Node) -> Run {
    let mut run = Run::default();
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(WML_NS) {
            run.content
                .push(RunContent::Object(raw(xml, child).to_string()));
            continue;
        }
        match child.tag_name().name() {
            "rPr" => run.format = decode_format(xml, child),
            "t" => {
                if let Some(text) = child.text().filter(|t| !t.is_empty()) {
                    run.content.push(RunContent::Text(text.to_string()));
                }
            }
            "tab" => run.content.push(RunContent::Tab),
            "cr" => run.content.push(RunContent::Break),
            "br" if matches!(wml_attr(child, "type"), None | Some("textWrapping")) => {
                run.content.push(RunContent::Break)
            }
            "commentReference" => match wml_attr(child, "id") {
                Some(id) => run
                    .content
                    .push(RunContent::CommentReference(CommentId::new(id))),
                None => run
                    .content
                    .push(RunContent::Object(raw(xml, child).to_string())),
            },
            _ => run
                .content
                .push(RunContent::Object(raw(xml, child).to_string())),
        }
    }
    run
}

/// Returns true if every attribute of `node` is one of `allowed`.
fn only_attributes(node: Node, allowed: &[&str]) -> bool {
    node.attributes().all(|a| allowed.contains(&a.name()))
}

fn toggle(node: Node) -> Option<bool> {
    if !only_attributes(node, &["val"]) {
        return None;
    }
    Some(!matches!(wml_attr(node, "val"), Some("0" | "false" | "off")))
}

fn simple_val(node: Node) -> Option<String> {
    if !only_attributes(node, &["val"]) {
        return None;
    }
    wml_attr(node, "val").map(str::to_string)
}

fn decode_format(xml: &str, node: Node) -> RunFormat {
    let mut format = RunFormat::default();
    for child in node.children().filter(|n| n.is_element()) {
        let name = child.tag_name().name();
        let known = child.tag_name().namespace() == Some(WML_NS)
            && match name {
                "rStyle" => set(&mut format.style, simple_val(child)),
                "rFonts" if only_attributes(child, &["ascii", "hAnsi", "eastAsia", "cs"]) => {
                    format.fonts = FontFamily {
                        ascii: wml_attr(child, "ascii").map(str::to_string),
                        h_ansi: wml_attr(child, "hAnsi").map(str::to_string),
                        east_asia: wml_attr(child, "eastAsia").map(str::to_string),
                        cs: wml_attr(child, "cs").map(str::to_string),
                    };
                    true
                }
                "b" => set(&mut format.bold, toggle(child)),
                "i" => set(&mut format.italic, toggle(child)),
                "bCs" => set(&mut format.cs_bold, toggle(child)),
                "iCs" => set(&mut format.cs_italic, toggle(child)),
                "smallCaps" => set(&mut format.small_caps, toggle(child)),
                "strike" => set(&mut format.strike, toggle(child)),
                "outline" => set(&mut format.outline, toggle(child)),
                "shadow" => set(&mut format.shadow, toggle(child)),
                "rtl" => set(&mut format.rtl, toggle(child)),
                "color" => set(&mut format.color, simple_val(child)),
                "sz" => set(
                    &mut format.size,
                    simple_val(child).and_then(|v| v.parse().ok()),
                ),
                "highlight" => set(&mut format.highlight, simple_val(child)),
                "u" => set(&mut format.underline, simple_val(child)),
                "vertAlign" => set(
                    &mut format.vertical_align,
                    simple_val(child).and_then(|v| VerticalAlign::parse(&v)),
                ),
                _ => false,
            };
        if !known {
            format.extra.push(RawProperty {
                name: name.to_string(),
                xml: raw(xml, child).to_string(),
            });
        }
    }
    format
}

fn set<T>(field: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *field = Some(v);
            true
        }
        None => false,
    }
}

fn decode_comment(xml: &str, node: Node) -> Comment {
    let text = node
        .descendants()
        .filter(|n| is_wml(*n, "p"))
        .map(|p| {
            p.descendants()
                .filter(|n| is_wml(*n, "t"))
                .filter_map(|t| t.text())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n");
    Comment {
        id: CommentId::new(wml_attr(node, "id").unwrap_or_default()),
        author: wml_attr(node, "author").map(str::to_string),
        initials: wml_attr(node, "initials").map(str::to_string),
        date: wml_attr(node, "date").map(str::to_string),
        text,
        raw: Some(raw(xml, node).to_string()),
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

/// Serializes model nodes using the package's WordprocessingML prefix.
struct WmlWriter<'p> {
    prefix: &'p str,
}

impl<'p> WmlWriter<'p> {
    fn new(prefix: &'p str) -> Self {
        Self { prefix }
    }

    fn q(&self, name: &str) -> String {
        qualify(self.prefix, name)
    }

    fn empty(&self, out: &mut String, name: &str, attrs: &[(&str, &str)]) {
        out.push('<');
        out.push_str(&self.q(name));
        for (key, value) in attrs {
            out.push_str(&format!(" {}=\"{}\"", self.q(key), escape_attr(value)));
        }
        out.push_str("/>");
    }

    fn block(&self, out: &mut String, block: &Block) {
        match block {
            Block::Paragraph(p) => self.paragraph(out, p),
            Block::Table(t) => self.table(out, t),
            Block::Raw(xml) => out.push_str(xml),
        }
    }

    fn table(&self, out: &mut String, table: &Table) {
        let (tbl, tr, tc) = (self.q("tbl"), self.q("tr"), self.q("tc"));
        out.push_str(&format!("<{}{}>", tbl, table.attributes));
        out.push_str(&table.properties);
        for row in &table.rows {
            out.push_str(&format!("<{}{}>", tr, row.attributes));
            out.push_str(&row.properties);
            for cell in &row.cells {
                out.push_str(&format!("<{}{}>", tc, cell.attributes));
                out.push_str(&cell.properties);
                for block in &cell.blocks {
                    self.block(out, block);
                }
                out.push_str(&format!("</{}>", tc));
            }
            out.push_str(&format!("</{}>", tr));
        }
        out.push_str(&format!("</{}>", tbl));
    }

    fn paragraph(&self, out: &mut String, paragraph: &Paragraph) {
        if let Some(source) = paragraph.source() {
            out.push_str(source);
            return;
        }
        let p = self.q("p");
        out.push_str(&format!("<{}{}>", p, paragraph.attributes()));
        if paragraph.style().is_some() || !paragraph.properties().is_empty() {
            let p_pr = self.q("pPr");
            out.push_str(&format!("<{}>", p_pr));
            if let Some(style) = paragraph.style() {
                self.empty(out, "pStyle", &[("val", style)]);
            }
            out.push_str(paragraph.properties());
            out.push_str(&format!("</{}>", p_pr));
        }
        for inline in paragraph.content() {
            match inline {
                Inline::Run(run) => self.run(out, run),
                Inline::Raw(xml) => out.push_str(xml),
            }
        }
        out.push_str(&format!("</{}>", p));
    }

    fn run(&self, out: &mut String, run: &Run) {
        let r = self.q("r");
        out.push_str(&format!("<{}>", r));
        self.format(out, &run.format);
        for item in &run.content {
            match item {
                RunContent::Text(text) => {
                    let t = self.q("t");
                    out.push_str(&format!(
                        "<{} xml:space=\"preserve\">{}</{}>",
                        t,
                        escape_text(text),
                        t
                    ));
                }
                RunContent::Tab => self.empty(out, "tab", &[]),
                RunContent::Break => self.empty(out, "br", &[]),
                RunContent::CommentReference(id) => {
                    self.empty(out, "commentReference", &[("id", id.as_str())])
                }
                RunContent::Object(xml) => out.push_str(xml),
            }
        }
        out.push_str(&format!("</{}>", r));
    }

    fn format(&self, out: &mut String, format: &RunFormat) {
        if format.is_empty() {
            return;
        }
        let mut props: Vec<(&str, String)> = Vec::new();
        let mut push_val = |name: &'static str, value: &Option<String>| {
            if let Some(v) = value {
                let mut xml = String::new();
                self.empty(&mut xml, name, &[("val", v.as_str())]);
                props.push((name, xml));
            }
        };
        push_val("rStyle", &format.style);
        push_val("color", &format.color);
        push_val("highlight", &format.highlight);
        push_val("u", &format.underline);
        push_val("sz", &format.size.map(|s| s.to_string()));
        push_val(
            "vertAlign",
            &format.vertical_align.map(|v| v.as_str().to_string()),
        );

        let toggles = [
            ("b", format.bold),
            ("i", format.italic),
            ("bCs", format.cs_bold),
            ("iCs", format.cs_italic),
            ("smallCaps", format.small_caps),
            ("strike", format.strike),
            ("outline", format.outline),
            ("shadow", format.shadow),
            ("rtl", format.rtl),
        ];
        for (name, value) in toggles {
            let mut xml = String::new();
            match value {
                Some(true) => self.empty(&mut xml, name, &[]),
                Some(false) => self.empty(&mut xml, name, &[("val", "0")]),
                None => continue,
            }
            props.push((name, xml));
        }

        if !format.fonts.is_empty() {
            let fonts = &format.fonts;
            let attrs: Vec<(&str, &str)> = [
                ("ascii", fonts.ascii.as_deref()),
                ("hAnsi", fonts.h_ansi.as_deref()),
                ("eastAsia", fonts.east_asia.as_deref()),
                ("cs", fonts.cs.as_deref()),
            ]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
            let mut xml = String::new();
            self.empty(&mut xml, "rFonts", &attrs);
            props.push(("rFonts", xml));
        }

        for extra in &format.extra {
            props.push((extra.name.as_str(), extra.xml.clone()));
        }

        let rank = |name: &str| {
            RPR_ORDER
                .iter()
                .position(|n| *n == name)
                .unwrap_or(RPR_ORDER.len())
        };
        props.sort_by_key(|(name, _)| rank(name));

        let r_pr = self.q("rPr");
        out.push_str(&format!("<{}>", r_pr));
        for (_, xml) in props {
            out.push_str(&xml);
        }
        out.push_str(&format!("</{}>", r_pr));
    }

    fn comment(&self, out: &mut String, comment: &Comment) {
        if let Some(raw) = &comment.raw {
            out.push_str(raw);
            return;
        }
        let tag = self.q("comment");
        out.push_str(&format!(
            "<{} {}=\"{}\"",
            tag,
            self.q("id"),
            escape_attr(comment.id.as_str())
        ));
        let optional = [
            ("author", &comment.author),
            ("date", &comment.date),
            ("initials", &comment.initials),
        ];
        for (name, value) in optional {
            if let Some(v) = value {
                out.push_str(&format!(" {}=\"{}\"", self.q(name), escape_attr(v)));
            }
        }
        out.push('>');
        for line in comment.text.split('\n') {
            let p = self.q("p");
            out.push_str(&format!("<{}>", p));
            self.run(out, &Run::new(line));
            out.push_str(&format!("</{}>", p));
        }
        out.push_str(&format!("</{}>", tag));
    }
}
