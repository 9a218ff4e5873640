//! Uploaded image descriptor.

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// MIME types the estimator accepts for uploads.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// Image extracted from a multipart request.
///
/// # Examples
/// ```
/// use carbon_api::domain::UploadedImage;
///
/// let image = UploadedImage::new(vec![0x89, b'P', b'N', b'G'], "image/png", None);
/// assert_eq!(image.size(), 4);
/// assert_eq!(image.content_type(), "image/png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    content_type: String,
    file_name: Option<String>,
}

impl UploadedImage {
    /// Wrap raw image bytes with their declared MIME type.
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
        file_name: Option<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            file_name,
        }
    }

    /// Raw payload.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared MIME type, as sent by the client.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    /// Client-supplied file name, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
