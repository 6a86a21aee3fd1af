use std::path::{Path, PathBuf};

use crate::geofile::{
    gdal_geofile::{list_layers, read_layer},
    geojson::write_geojson,
};

use super::merge::{merge_collections, to_wgs84};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted { feature_count: usize },
    /// Every layer was empty or unreadable, no output was written.
    NoFeatures,
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("could not read {path:?} as KML/KMZ: {cause:#}")]
    UnreadableInput { path: PathBuf, cause: anyhow::Error },
    #[error("could not read layer '{layer}': {cause:#}")]
    LayerRead { layer: String, cause: anyhow::Error },
    #[error("could not reproject features of {path:?} to EPSG:4326: {cause:#}")]
    Reprojection { path: PathBuf, cause: anyhow::Error },
    #[error("could not write {path:?}: {cause:#}")]
    Write { path: PathBuf, cause: anyhow::Error },
}

/// Convert all layers of a KML/KMZ file into a single GeoJSON FeatureCollection in EPSG:4326.
///
/// Layers are read one by one. Empty layers and layers that fail to read are skipped; only when
/// no layer yields a feature is the file reported as `NoFeatures`, in which case nothing is
/// written.
pub fn convert_kml_to_geojson(
    input_filepath: &Path,
    output_filepath: &Path,
) -> Result<ConversionOutcome, ConversionError> {
    let layer_names =
        list_layers(input_filepath).map_err(|cause| ConversionError::UnreadableInput {
            path: input_filepath.to_path_buf(),
            cause,
        })?;
    convert_layers(input_filepath, &layer_names, output_filepath)
}

/// Read, merge and write the named layers of an input that is already known to open.
fn convert_layers(
    input_filepath: &Path,
    layer_names: &[String],
    output_filepath: &Path,
) -> Result<ConversionOutcome, ConversionError> {
    let mut collections = Vec::new();
    for layer_name in layer_names {
        match read_layer(input_filepath, layer_name) {
            Ok(collection) if collection.is_empty() => {}
            Ok(collection) => {
                log::info!(
                    "   Found {} features in layer: '{}'",
                    collection.len(),
                    layer_name
                );
                collections.push(collection);
            }
            Err(cause) => {
                let error = ConversionError::LayerRead {
                    layer: layer_name.clone(),
                    cause,
                };
                log::debug!("Skipping layer, {}", error);
            }
        }
    }

    if collections.is_empty() {
        return Ok(ConversionOutcome::NoFeatures);
    }

    let reprojection_error = |cause| ConversionError::Reprojection {
        path: input_filepath.to_path_buf(),
        cause,
    };
    let merged = merge_collections(collections).map_err(reprojection_error)?;
    let merged = to_wgs84(merged).map_err(reprojection_error)?;

    write_geojson(&merged, output_filepath).map_err(|cause| ConversionError::Write {
        path: output_filepath.to_path_buf(),
        cause,
    })?;
    Ok(ConversionOutcome::Converted {
        feature_count: merged.len(),
    })
}
