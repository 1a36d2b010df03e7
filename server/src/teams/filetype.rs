//! Submission file-type allow-list.

use std::io::Cursor;

use zip::ZipArchive;

pub const DOC: &str = "application/msword";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PPT: &str = "application/vnd.ms-powerpoint";
pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const TEXT: &str = "text/plain";
pub const JPEG: &str = "image/jpeg";
pub const PNG: &str = "image/png";

const ALLOWED: [&str; 7] = [DOC, DOCX, PPT, PPTX, TEXT, JPEG, PNG];

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const WORD_PART: &str = "word/document.xml";
const PPT_PART: &str = "ppt/presentation.xml";

/// Resolves the content type of an upload, or `None` if it is not allowed.
///
/// A known extension decides on its own, so `.zip` or `.exe` are refused
/// whatever they contain. Only files without a recognised extension are
/// opened as zip containers and checked for the docx or pptx parts.
pub fn detect(filename: &str, body: &[u8]) -> Option<&'static str> {
    let mime = match mime_guess::from_path(filename).first_raw() {
        Some(m) => m,
        None => sniff(body)?,
    };
    ALLOWED.iter().copied().find(|allowed| *allowed == mime)
}

fn sniff(body: &[u8]) -> Option<&'static str> {
    let archive = ZipArchive::new(Cursor::new(body)).ok()?;
    let has = |part: &str| archive.file_names().any(|name| name == part);

    if !has(CONTENT_TYPES_PART) {
        return None;
    }
    if has(WORD_PART) {
        Some(DOCX)
    } else if has(PPT_PART) {
        Some(PPTX)
    } else {
        None
    }
}
