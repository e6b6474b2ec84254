//! Browser-side file handling

use js_sys::{ArrayBuffer, Uint8Array};
use plantdoc_core::{image::is_image_mime, ImageFile, PreviewHandle};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, Url};

/// Object URL for a selected file, revoked when dropped
pub struct ObjectUrl {
    url: String,
}

impl ObjectUrl {
    pub fn for_file(file: &File) -> Self {
        let url = Url::create_object_url_with_blob(file).unwrap_or_else(|e| {
            web_sys::console::error_1(&format!("Failed to create preview: {e:?}").into());
            String::new()
        });
        Self { url }
    }
}

impl PreviewHandle for ObjectUrl {
    fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if !self.url.is_empty() {
            Url::revoke_object_url(&self.url).ok();
        }
    }
}

/// Orders file picks so only the latest read reaches the controller
#[derive(Clone, Copy, Debug, Default)]
pub struct Picks {
    latest: u64,
}

impl Picks {
    /// Register a new pick and return its ticket
    pub const fn next(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub const fn is_latest(&self, ticket: u64) -> bool {
        self.latest == ticket
    }
}

/// Load a picked file
///
/// Only `image/*` payloads are read; anything else comes back empty and is
/// rejected by the controller on selection.
pub async fn read_image(file: &File) -> Result<ImageFile, String> {
    let mime_type = file.type_();
    if !is_image_mime(&mime_type) {
        return Ok(ImageFile::new(file.name(), mime_type, Vec::new()));
    }

    let buffer: ArrayBuffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Failed to read file: {e:?}"))?
        .dyn_into()
        .map_err(|_| "Failed to convert to ArrayBuffer")?;

    Ok(ImageFile::new(
        file.name(),
        mime_type,
        Uint8Array::new(&buffer).to_vec(),
    ))
}
