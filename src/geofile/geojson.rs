use anyhow::Context;
use std::{fs, path::Path};

use super::feature::{Feature, FeatureCollection};

fn to_geojson_feature(feature: &Feature, schema: &[String]) -> geojson::Feature {
    // Every feature carries the full schema, fields it does not have are written as null.
    let properties: geojson::JsonObject = schema
        .iter()
        .map(|field_name| {
            let value = feature
                .attributes
                .get(field_name)
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            (field_name.clone(), value)
        })
        .collect();
    geojson::Feature {
        bbox: None,
        geometry: feature
            .geometry
            .as_ref()
            .map(|geometry| geojson::Geometry::new(geojson::Value::from(geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn to_geojson(collection: &FeatureCollection) -> geojson::GeoJson {
    let feature_collection = geojson::FeatureCollection {
        bbox: None,
        features: collection
            .features
            .iter()
            .map(|feature| to_geojson_feature(feature, &collection.schema))
            .collect(),
        foreign_members: None,
    };
    geojson::GeoJson::from(feature_collection)
}

/// Write the collection as a GeoJSON FeatureCollection, replacing any existing file.
pub fn write_geojson(collection: &FeatureCollection, output_filepath: &Path) -> anyhow::Result<()> {
    log::debug!(
        "Writing {} features to {:?}",
        collection.len(),
        output_filepath
    );
    fs::write(output_filepath, to_geojson(collection).to_string())
        .with_context(|| format!("Writing GeoJSON to {:?}", output_filepath))
}
