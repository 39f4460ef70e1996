use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::render_settings::SAMPLE_CATALOG_PATH;

/// One entry of the bundled sample-model catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleModel {
    pub name: String,
    pub url: String,
}

/// Catalog of models the viewer can cycle through without the host page
/// supplying a URL. Mirrors the JSON structure exactly.
#[derive(Asset, Debug, Clone, Serialize, Deserialize, TypePath)]
pub struct SampleCatalog {
    pub models: Vec<SampleModel>,
}

#[derive(Resource, Default)]
pub struct SampleCatalogLoader {
    handle: Option<Handle<SampleCatalog>>,
    catalog: Option<SampleCatalog>,
    next_index: usize,
}

impl SampleCatalogLoader {
    /// Entries of the loaded catalog, empty until the JSON arrives.
    pub fn models(&self) -> &[SampleModel] {
        self.catalog
            .as_ref()
            .map(|catalog| catalog.models.as_slice())
            .unwrap_or(&[])
    }

    /// Next sample in rotation, wrapping at the end of the catalog.
    pub fn advance(&mut self) -> Option<SampleModel> {
        let models = self.catalog.as_ref()?.models.as_slice();
        if models.is_empty() {
            return None;
        }
        let sample = models[self.next_index % models.len()].clone();
        self.next_index = (self.next_index + 1) % models.len();
        Some(sample)
    }

    #[cfg(test)]
    fn with_catalog(catalog: SampleCatalog) -> Self {
        Self {
            handle: None,
            catalog: Some(catalog),
            next_index: 0,
        }
    }
}

pub fn start_catalog_loading(
    mut loader: ResMut<SampleCatalogLoader>,
    asset_server: Res<AssetServer>,
) {
    loader.handle = Some(asset_server.load(SAMPLE_CATALOG_PATH));
}

/// Adopt the catalog once the JSON asset has been parsed.
pub fn poll_sample_catalog(
    mut loader: ResMut<SampleCatalogLoader>,
    catalogs: Res<Assets<SampleCatalog>>,
) {
    if loader.catalog.is_some() {
        return;
    }
    if let Some(ref handle) = loader.handle {
        if let Some(catalog) = catalogs.get(handle) {
            info!("✓ Sample catalog loaded ({} models)", catalog.models.len());
            loader.catalog = Some(catalog.clone());
        }
    }
}
