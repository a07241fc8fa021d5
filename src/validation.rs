//! Input validation before any network activity.
//!
//! The declared media type of a selected file is only a claim. Browsers and file
//! pickers derive it from the extension, so a renamed image arrives as
//! `application/pdf`. The validator sniffs the content signature and requires it
//! to agree with the declaration.

use crate::config::ValidationConfig;
use crate::error::OutcomeError;
use crate::types::{MediaType, SubmissionInput};
use std::io::Cursor;

/// Message for a submission without a file
pub const NO_FILE_SELECTED: &str = "no file selected";
/// Message for a zero-byte file
pub const FILE_EMPTY: &str = "file is empty";
/// Message for a file over the size limit
pub const FILE_TOO_LARGE: &str = "file too large";
/// Message for anything that is not a pdf, doc or docx document
pub const UNSUPPORTED_FILE_TYPE: &str = "unsupported file type";
/// Message for a blank job role
pub const JOB_ROLE_REQUIRED: &str = "job role required";

const ACCEPTED_FORMATS: &str = "accepted formats: PDF, DOC, DOCX";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const PDF_MAGIC: &[u8] = b"%PDF-";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const DOCX_MAIN_PART: &str = "word/document.xml";

/// Checks a [`SubmissionInput`] without side effects
#[derive(Clone, Debug)]
pub struct InputValidator {
    max_file_bytes: u64,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl InputValidator {
    /// Create a validator with the configured limits
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            max_file_bytes: config.max_file_bytes,
        }
    }

    /// Validate an input, returning the resolved media type of the file
    ///
    /// Checks run in order: file presence, emptiness, size, type, job role.
    /// Every failure is an [`ErrorKind::ValidationError`](crate::error::ErrorKind).
    pub fn validate(&self, input: &SubmissionInput) -> Result<MediaType, OutcomeError> {
        let file = input
            .file
            .as_ref()
            .ok_or_else(|| OutcomeError::validation(NO_FILE_SELECTED))?;

        if file.is_empty() {
            return Err(OutcomeError::validation(FILE_EMPTY));
        }

        if file.len() > self.max_file_bytes {
            return Err(OutcomeError::validation(FILE_TOO_LARGE).with_detail(format!(
                "{} is {} bytes; the limit is {} bytes",
                file.name,
                file.len(),
                self.max_file_bytes
            )));
        }

        let sniffed = sniff_media_type(&file.content);
        let declared = file
            .declared_type
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let resolved = match declared {
            Some(declared) => {
                let declared_type = MediaType::from_mime(declared).ok_or_else(|| {
                    OutcomeError::validation(UNSUPPORTED_FILE_TYPE)
                        .with_detail(format!("{} is {}; {}", file.name, declared, ACCEPTED_FORMATS))
                })?;
                if sniffed != Some(declared_type) {
                    return Err(OutcomeError::validation(UNSUPPORTED_FILE_TYPE).with_detail(
                        format!(
                            "{} does not contain a {} document; {}",
                            file.name, declared_type, ACCEPTED_FORMATS
                        ),
                    ));
                }
                declared_type
            }
            None => sniffed.ok_or_else(|| {
                OutcomeError::validation(UNSUPPORTED_FILE_TYPE)
                    .with_detail(format!("{}: {}", file.name, ACCEPTED_FORMATS))
            })?,
        };

        if input.job_role.trim().is_empty() {
            return Err(OutcomeError::validation(JOB_ROLE_REQUIRED));
        }

        Ok(resolved)
    }
}

/// Identify a supported document format from its content
pub fn sniff_media_type(content: &[u8]) -> Option<MediaType> {
    // Only a BOM and leading whitespace may precede the PDF header
    let body = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    if body[start..].starts_with(PDF_MAGIC) {
        return Some(MediaType::Pdf);
    }

    if content.starts_with(OLE2_MAGIC) {
        return Some(MediaType::Doc);
    }

    if content.starts_with(ZIP_MAGIC) && zip_contains(content, DOCX_MAIN_PART) {
        return Some(MediaType::Docx);
    }

    None
}

fn zip_contains(content: &[u8], entry: &str) -> bool {
    match zip::ZipArchive::new(Cursor::new(content)) {
        Ok(mut archive) => archive.by_name(entry).is_ok(),
        Err(e) => {
            tracing::debug!(error = %e, "zip signature present but archive unreadable");
            false
        }
    }
}
