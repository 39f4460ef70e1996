//! Error types for the viewer.

use thiserror::Error;

/// Errors surfaced while resolving or loading a model.
///
/// None of these are fatal: the render loop and every control surface stay
/// usable after any of them, the viewer is simply left without an attached
/// model where the failure implies one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// IFC is recognised but deliberately disabled in this build.
    #[error(
        "IFC loading is unavailable here: cross-origin restrictions block the \
         required resources in this environment, use a GLTF or GLB model instead"
    )]
    IfcUnavailable,

    /// File extension matches no supported codec.
    #[error("unsupported model format `{extension}`")]
    UnsupportedFormat { extension: String },

    /// The asset server reported a failure for an in-flight load.
    #[error("failed to load `{url}`: {reason}")]
    LoadFailed { url: String, reason: String },
}

impl ViewerError {
    /// Notices are user guidance rather than faults; they are surfaced once
    /// and logged at warn level instead of error.
    pub fn is_notice(&self) -> bool {
        matches!(self, ViewerError::IfcUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_the_extension() {
        let err = ViewerError::UnsupportedFormat {
            extension: "obj".to_string(),
        };
        assert!(err.to_string().contains("obj"));
    }

    #[test]
    fn ifc_is_a_notice_and_load_failure_is_not() {
        assert!(ViewerError::IfcUnavailable.is_notice());
        let failed = ViewerError::LoadFailed {
            url: "duck.gltf".into(),
            reason: "connection reset".into(),
        };
        assert!(!failed.is_notice());
    }
}
