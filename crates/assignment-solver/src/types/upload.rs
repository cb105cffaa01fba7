//! Uploaded file type

use bytes::Bytes;

/// A file attached to a single request.
///
/// Owned by the request; it is moved into the interpreter and dropped there.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename
    pub filename: String,
    /// Declared MIME type, or one guessed from the extension
    pub content_type: String,
    /// Raw bytes
    pub data: Bytes,
}

impl UploadedFile {
    /// Create an upload, guessing the content type when none was declared
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        Self {
            filename,
            content_type,
            data: data.into(),
        }
    }

    /// Lowercased extension without the dot, empty if none
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
