use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use geoguess_shared::catalog::LocationCatalog;
use geoguess_shared::geo::is_within_region;
use geoguess_shared::models::Variant;

pub const LOCATIONS_FILE: &str = "locations.json";

pub struct Assets {
    pub catalog: Arc<LocationCatalog>,
}

impl Assets {
    /// Load the target catalog from `locations.json` in `assets_dir`, or fall
    /// back to the variant's built-in list when the file is absent.
    pub fn load(assets_dir: &Path, variant: Variant) -> anyhow::Result<Self> {
        let path = assets_dir.join(LOCATIONS_FILE);

        let catalog = if path.is_file() {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            LocationCatalog::from_json(&data)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            tracing::info!(%variant, "No {} found, using built-in catalog", LOCATIONS_FILE);
            LocationCatalog::for_variant(variant)
        };

        let region = variant.region();
        let outside = catalog
            .locations()
            .iter()
            .filter(|c| !is_within_region(**c, &region))
            .count();
        if outside > 0 {
            tracing::warn!(
                outside,
                %variant,
                "Catalog has targets outside the playable region; guesses at them will be rejected"
            );
        }

        tracing::info!(locations = catalog.len(), "Loaded location catalog");

        Ok(Assets {
            catalog: Arc::new(catalog),
        })
    }
}
