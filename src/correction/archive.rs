//! Packaging of corrected files for download.
//!
//! A request with exactly one upload yields that file directly. A request with
//! several uploads yields one deflated ZIP archive holding every file that was
//! corrected, named after its position in the request.

use super::CorrectedFile;
use crate::error::{HyokiError, HyokiResult};
use std::io::{Cursor, Write};

/// File name of the archive produced for multi-file requests.
pub const ARCHIVE_NAME: &str = "corrected_files.zip";
pub const ARCHIVE_MIME: &str = "application/zip";

/// Artifact offered to the caller for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Name of a single corrected file, e.g. `corrected.docx`.
pub fn single_name(file: &CorrectedFile) -> String {
    format!("corrected.{}", file.kind.extension())
}

/// Name of a file inside the archive, e.g. `corrected_2.md`.
pub fn entry_name(file: &CorrectedFile) -> String {
    format!("corrected_{}.{}", file.index, file.kind.extension())
}

/// Wraps a single corrected file.
pub fn single(file: &CorrectedFile) -> Download {
    Download {
        file_name: single_name(file),
        mime: file.kind.mime().to_string(),
        bytes: file.content.bytes.clone(),
    }
}

/// Builds a ZIP archive with one entry per corrected file, in input order.
pub fn archive(files: &[CorrectedFile]) -> HyokiResult<Download> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for file in files {
        let name = entry_name(file);
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&file.content.bytes)
            .map_err(|e| HyokiError::archive(format!("{}: {}", name, e)))?;
    }

    Ok(Download {
        file_name: ARCHIVE_NAME.to_string(),
        mime: ARCHIVE_MIME.to_string(),
        bytes: zip.finish()?.into_inner(),
    })
}

/// Chooses the download for a request of `inputs` uploads.
///
/// Returns `None` when nothing was corrected.
pub fn package(inputs: usize, files: &[CorrectedFile]) -> HyokiResult<Option<Download>> {
    match (inputs, files) {
        (_, []) => Ok(None),
        (1, [file]) => Ok(Some(single(file))),
        _ => archive(files).map(Some),
    }
}
