//! Package inspection helpers and custom assertions.

use hyoki::document::{Document, Run};
use hyoki::DocxPackage;
use std::io::{Cursor, Read};

/// Names of every entry in a ZIP archive, in archive order.
pub fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Raw bytes of one archive entry.
pub fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut entry = zip
        .by_name(name)
        .unwrap_or_else(|_| panic!("entry '{}' should exist", name));
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

/// One archive entry as UTF-8 text.
pub fn read_part(bytes: &[u8], name: &str) -> String {
    String::from_utf8(read_entry(bytes, name)).expect("utf-8 part")
}

/// Decodes DOCX bytes into the document tree.
pub fn decode(bytes: &[u8]) -> Document {
    DocxPackage::decode(bytes)
        .expect("corrected output should decode")
        .into_document()
}

/// Runs of the `index`-th top-level paragraph that carry visible text.
pub fn text_runs(document: &Document, index: usize) -> Vec<Run> {
    document
        .paragraphs()
        .nth(index)
        .unwrap_or_else(|| panic!("paragraph {} should exist", index))
        .runs()
        .filter(|r| r.text_len() > 0)
        .cloned()
        .collect()
}

/// Asserts that `fragment` appears verbatim in the document part of `bytes`.
///
/// # Panics
/// Panics if the fragment is missing.
pub fn assert_document_contains(bytes: &[u8], fragment: &str) {
    let xml = read_part(bytes, "word/document.xml");
    assert!(
        xml.contains(fragment),
        "document.xml should contain '{}'.\nDocument:\n{}",
        fragment,
        xml
    );
}
