//! Selected Image
//!
//! The user's chosen file and the preview handle that displays it.

use serde::{Deserialize, Serialize};

/// Raw file picked by the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Original file name, forwarded in the multipart part
    pub name: String,

    /// Media type reported by the browser (e.g. `image/jpeg`)
    pub mime_type: String,

    /// File contents
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Whether the media type starts with `image/`
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Media type check used for file selection
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Locally-displayable, revocable reference to a selected image
///
/// Implementations release the underlying resource in `Drop`
/// (the browser build revokes its object URL there).
pub trait PreviewHandle: Send + Sync {
    /// URL usable as an `<img src>`
    fn url(&self) -> &str;
}

/// An accepted selection: the file plus its preview
pub struct SelectedImage {
    file: ImageFile,
    preview: Box<dyn PreviewHandle>,
}

impl SelectedImage {
    pub fn new(file: ImageFile, preview: Box<dyn PreviewHandle>) -> Self {
        Self { file, preview }
    }

    pub const fn file(&self) -> &ImageFile {
        &self.file
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }
}

impl std::fmt::Debug for SelectedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedImage")
            .field("name", &self.file.name)
            .field("mime_type", &self.file.mime_type)
            .field("size", &self.file.len())
            .field("preview", &self.preview.url())
            .finish()
    }
}
