//! crates/studylens_core/src/extract.rs
//!
//! The text extractor: turns an uploaded file's raw bytes into plain text
//! plus lightweight metadata, keyed off the declared MIME type and filename.

use bytes::Bytes;
use regex::Regex;
use serde::Serialize;

use crate::domain::SourceType;
use crate::ports::{PortError, PortResult};

/// Uploads above this size are rejected before extraction.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "text/plain", "text/markdown"];

/// An uploaded file as received from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Lightweight per-file metadata computed during extraction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_size: usize,
    pub original_name: String,
    pub mime_type: String,
    pub word_count: usize,
    pub char_count: usize,
}

/// The result of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub metadata: FileMetadata,
}

/// Extracts plain text from `.txt`, `.md`, and (nominally) PDF uploads.
///
/// Constructed once at startup and shared through the application state.
pub struct FileProcessor {
    heading: Regex,
    bold: Regex,
    italic: Regex,
    inline_code: Regex,
    fenced_code: Regex,
    link: Regex,
}

impl FileProcessor {
    pub fn new() -> Self {
        // Hard-coded patterns; a failure here is a programming error.
        Self {
            heading: Regex::new(r"(?m)^#{1,6}\s+").unwrap(),
            bold: Regex::new(r"\*\*(.*?)\*\*").unwrap(),
            italic: Regex::new(r"\*(.*?)\*").unwrap(),
            inline_code: Regex::new(r"`([^`\n]*)`").unwrap(),
            fenced_code: Regex::new(r"(?s)```.*?```").unwrap(),
            link: Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap(),
        }
    }

    /// Checks size and declared type before any decoding happens.
    ///
    /// Note the deliberate asymmetry: PDF passes validation here but is
    /// rejected later by [`FileProcessor::extract`].
    pub fn validate(&self, file: &UploadedFile) -> PortResult<()> {
        if file.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(PortError::Validation(
                "File size exceeds 10MB limit".to_string(),
            ));
        }

        let valid_type = ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str())
            || file.name.ends_with(".txt")
            || file.name.ends_with(".md");
        if !valid_type {
            return Err(PortError::UnsupportedFormat(
                "Unsupported file type. Please use PDF, TXT, or MD files.".to_string(),
            ));
        }

        Ok(())
    }

    /// Produces `{text, metadata}` for a validated upload, dispatching on
    /// the declared MIME type and the filename extension.
    pub fn extract(&self, file: &UploadedFile) -> PortResult<ExtractedText> {
        if file.mime_type == "application/pdf" {
            return Err(PortError::ExternalService(
                "PDF processing requires additional setup. Please convert to text file first."
                    .to_string(),
            ));
        }
        if file.mime_type == "text/plain" || file.name.ends_with(".txt") {
            let text = decode_utf8(file)?.trim().to_string();
            return Ok(self.with_metadata(file, text));
        }
        if file.mime_type == "text/markdown" || file.name.ends_with(".md") {
            let text = self.strip_markdown(decode_utf8(file)?.as_str());
            return Ok(self.with_metadata(file, text));
        }
        Err(PortError::UnsupportedFormat(format!(
            "Unsupported file type: {}",
            file.mime_type
        )))
    }

    /// Derives the stored content-type tag for a validated upload.
    pub fn source_type(&self, file: &UploadedFile) -> SourceType {
        if file.mime_type.contains("pdf") {
            SourceType::Pdf
        } else if file.name.ends_with(".md") {
            SourceType::Md
        } else {
            SourceType::Txt
        }
    }

    /// Reduces Markdown syntax to approximate plain prose: headings, bold,
    /// italic, code spans, and link targets are stripped; link text is kept.
    /// Idempotent, so re-stripping cleaned text is a no-op.
    fn strip_markdown(&self, text: &str) -> String {
        let text = self.fenced_code.replace_all(text, "");
        let text = self.heading.replace_all(&text, "");
        let text = self.bold.replace_all(&text, "$1");
        let text = self.italic.replace_all(&text, "$1");
        let text = self.inline_code.replace_all(&text, "$1");
        let text = self.link.replace_all(&text, "$1");
        text.trim().to_string()
    }

    fn with_metadata(&self, file: &UploadedFile, text: String) -> ExtractedText {
        let metadata = FileMetadata {
            file_size: file.bytes.len(),
            original_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        };
        ExtractedText { text, metadata }
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_utf8(file: &UploadedFile) -> PortResult<String> {
    String::from_utf8(file.bytes.to_vec())
        .map_err(|_| PortError::Validation("Uploaded file is not valid UTF-8 text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str, body: &[u8]) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            mime_type: mime.to_string(),
            bytes: Bytes::copy_from_slice(body),
        }
    }

    #[test]
    fn txt_extraction_trims_and_counts_words() {
        let processor = FileProcessor::new();
        let upload = file("notes.txt", "text/plain", b"  Hello world. Test.  \n");

        let extracted = processor.extract(&upload).unwrap();
        assert_eq!(extracted.text, "Hello world. Test.");
        assert_eq!(extracted.metadata.word_count, 3);
        assert_eq!(extracted.metadata.char_count, 18);
        assert_eq!(extracted.metadata.original_name, "notes.txt");
    }

    #[test]
    fn extension_fallback_applies_when_mime_is_generic() {
        let processor = FileProcessor::new();
        let upload = file("notes.txt", "application/octet-stream", b"plain enough");

        assert!(processor.validate(&upload).is_ok());
        assert_eq!(processor.extract(&upload).unwrap().text, "plain enough");
    }

    #[test]
    fn markdown_syntax_is_stripped() {
        let processor = FileProcessor::new();
        let body = "# Title\n\nSome **bold** and *italic* text with `code`.\n\n\
                    ```\nfn ignored() {}\n```\n\nA [link](https://example.com) too.";
        let upload = file("doc.md", "text/markdown", body.as_bytes());

        let extracted = processor.extract(&upload).unwrap();
        assert!(!extracted.text.contains('#'));
        assert!(!extracted.text.contains('*'));
        assert!(!extracted.text.contains('`'));
        assert!(!extracted.text.contains("example.com"));
        assert!(extracted.text.contains("Some bold and italic text with code."));
        assert!(extracted.text.contains("A link too."));
        assert!(!extracted.text.contains("fn ignored"));
    }

    #[test]
    fn markdown_stripping_is_idempotent() {
        let processor = FileProcessor::new();
        let body = "## Heading\n**strong** [text](http://x) `span`";
        let once = processor.strip_markdown(body);
        let twice = processor.strip_markdown(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn oversized_upload_fails_validation_regardless_of_type() {
        let processor = FileProcessor::new();
        let upload = UploadedFile {
            name: "big.txt".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: Bytes::from(vec![b'a'; MAX_UPLOAD_BYTES + 1]),
        };

        match processor.validate(&upload) {
            Err(PortError::Validation(msg)) => assert!(msg.contains("10MB")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_type_fails_validation() {
        let processor = FileProcessor::new();
        let upload = file("image.png", "image/png", b"\x89PNG");

        assert!(matches!(
            processor.validate(&upload),
            Err(PortError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn pdf_passes_validation_but_fails_extraction() {
        let processor = FileProcessor::new();
        let upload = file("paper.pdf", "application/pdf", b"%PDF-1.4");

        assert!(processor.validate(&upload).is_ok());
        match processor.extract(&upload) {
            Err(PortError::ExternalService(msg)) => {
                assert!(msg.contains("requires additional setup"))
            }
            other => panic!("expected extraction failure, got {:?}", other),
        }
    }

    #[test]
    fn invalid_utf8_is_a_validation_error() {
        let processor = FileProcessor::new();
        let upload = file("notes.txt", "text/plain", &[0xff, 0xfe, 0x00]);

        assert!(matches!(
            processor.extract(&upload),
            Err(PortError::Validation(_))
        ));
    }

    #[test]
    fn source_type_tagging_matches_upload_kind() {
        let processor = FileProcessor::new();
        assert_eq!(
            processor.source_type(&file("a.pdf", "application/pdf", b"")),
            SourceType::Pdf
        );
        assert_eq!(
            processor.source_type(&file("a.md", "text/markdown", b"")),
            SourceType::Md
        );
        assert_eq!(
            processor.source_type(&file("a.txt", "text/plain", b"")),
            SourceType::Txt
        );
    }
}
