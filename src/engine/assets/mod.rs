//! Bundled asset catalogues for the viewer.
//!
//! Handles the sample model catalogue shipped alongside the application,
//! used by the keyboard cycle shortcut and the host page model picker.

/// Sample model catalogue asset and its polling loader.
pub mod sample_catalog;
