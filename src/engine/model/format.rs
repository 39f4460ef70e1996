use crate::error::ViewerError;

/// Codecs the viewer can hand to the asset server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Gltf,
    Glb,
}

impl ModelFormat {
    /// Classify a model URL by its final extension, case-insensitively.
    ///
    /// The suffix after the last `.` decides the codec; a URL without any
    /// dot is treated as being all extension, so the rejection message still
    /// names what the user typed. `ifc` is recognised but disabled and maps
    /// to a notice rather than a plain format error.
    pub fn classify(url: &str) -> Result<Self, ViewerError> {
        let extension = extension_of(url).to_ascii_lowercase();
        match extension.as_str() {
            "gltf" => Ok(ModelFormat::Gltf),
            "glb" => Ok(ModelFormat::Glb),
            "ifc" => Err(ViewerError::IfcUnavailable),
            _ => Err(ViewerError::UnsupportedFormat { extension }),
        }
    }
}

fn extension_of(url: &str) -> &str {
    match url.rsplit_once('.') {
        Some((_, suffix)) => suffix,
        None => url,
    }
}
