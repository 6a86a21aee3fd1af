use anyhow::{anyhow, Context};
use gdal::vector::{FieldValue, LayerAccess};
use std::path::Path;

use super::{
    drivers::enable_kml_drivers,
    feature::{Feature, FeatureCollection, FeatureMap},
};

fn open_kml_dataset(filepath: &Path) -> anyhow::Result<gdal::Dataset> {
    let driver_names: Vec<&str> = enable_kml_drivers()
        .iter()
        .map(|driver| driver.driver_type.name())
        .collect();
    if driver_names.is_empty() {
        return Err(anyhow!("No KML driver is available in this GDAL build"));
    }
    let open_options = gdal::DatasetOptions {
        open_flags: gdal::GdalOpenFlags::GDAL_OF_VECTOR,
        allowed_drivers: Some(driver_names.as_slice()),
        ..Default::default()
    };
    gdal::Dataset::open_ex(filepath, open_options)
        .with_context(|| format!("Opening {:?} as KML/KMZ", filepath))
}

/// Names of all layers in a KML/KMZ file. Nested folders show up as separate layers.
pub fn list_layers(filepath: &Path) -> anyhow::Result<Vec<String>> {
    let dataset = open_kml_dataset(filepath)?;
    let layer_names = dataset.layers().map(|layer| layer.name()).collect();
    Ok(layer_names)
}

/// Read a single named layer into memory. The dataset is opened for this layer only.
pub fn read_layer(filepath: &Path, layer_name: &str) -> anyhow::Result<FeatureCollection> {
    let dataset = open_kml_dataset(filepath)?;
    let mut layer = dataset
        .layer_by_name(layer_name)
        .with_context(|| format!("Getting layer '{}'", layer_name))?;

    let mut collection = FeatureCollection::new(layer.spatial_ref().ok());
    let field_names: Vec<String> = layer.defn().fields().map(|field| field.name()).collect();
    collection.extend_schema(&field_names);

    for gdal_feature in layer.features() {
        // Checked through the C API because the safe accessor assumes a geometry is present.
        let has_geometry =
            !unsafe { gdal_sys::OGR_F_GetGeometryRef(gdal_feature.c_feature()) }.is_null();
        let geometry = if has_geometry {
            match gdal_feature.geometry_by_index(0) {
                Ok(gdal_geometry) => geometry_or_none(gdal_geometry, layer_name),
                Err(err) => {
                    log::debug!(
                        "Keeping feature of layer '{}' without geometry, {}",
                        layer_name,
                        err
                    );
                    None
                }
            }
        } else {
            None
        };

        let mut attributes = FeatureMap::new();
        for field_name in &field_names {
            let value = gdal_feature
                .field(field_name)
                .with_context(|| format!("Reading field '{}'", field_name))?;
            attributes.insert(field_name.clone(), field_value_to_json(value));
        }
        collection.features.push(Feature {
            geometry,
            attributes,
        });
    }
    Ok(collection)
}

/// A geometry that cannot be converted drops out of its feature; the feature itself is kept.
fn geometry_or_none(
    geometry: &gdal::vector::Geometry,
    layer_name: &str,
) -> Option<geo::Geometry> {
    match gdal_geometry_to_geo(geometry) {
        Ok(geometry) => Some(geometry),
        Err(err) => {
            log::debug!(
                "Keeping feature of layer '{}' without geometry, {}",
                layer_name,
                err
            );
            None
        }
    }
}

fn field_value_to_json(value: Option<FieldValue>) -> serde_json::Value {
    use serde_json::Value;
    match value {
        None => Value::Null,
        Some(FieldValue::IntegerValue(value)) => Value::from(value),
        Some(FieldValue::Integer64Value(value)) => Value::from(value),
        // NaN and infinities have no JSON representation and become null.
        Some(FieldValue::RealValue(value)) => Value::from(value),
        Some(FieldValue::StringValue(value)) => Value::String(value),
        Some(FieldValue::IntegerListValue(values)) => Value::from(values),
        Some(FieldValue::Integer64ListValue(values)) => Value::from(values),
        Some(FieldValue::RealListValue(values)) => Value::from(values),
        Some(FieldValue::StringListValue(values)) => Value::from(values),
        Some(other) => other.into_string().map_or(Value::Null, Value::String),
    }
}

fn point_coords(geometry: &gdal::vector::Geometry) -> Vec<geo::Coord> {
    geometry
        .get_point_vec()
        .into_iter()
        .map(|(x, y, _)| geo::Coord { x, y })
        .collect()
}

fn polygon_from_gdal(geometry: &gdal::vector::Geometry) -> geo::Polygon {
    let mut rings = (0..geometry.geometry_count()).map(|ring_index| {
        geo::LineString::from(point_coords(&geometry.get_geometry(ring_index)))
    });
    let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(Vec::new()));
    geo::Polygon::new(exterior, rings.collect())
}

/// Convert a GDAL geometry into a 2D `geo` geometry. Z and M values, which KML uses for altitude,
/// are dropped.
pub fn gdal_geometry_to_geo(geometry: &gdal::vector::Geometry) -> anyhow::Result<geo::Geometry> {
    use gdal::vector::OGRwkbGeometryType::*;
    let geometry_type = unsafe { gdal_sys::OGR_GT_Flatten(geometry.geometry_type()) };
    let members = || {
        (0..geometry.geometry_count()).map(move |index| geometry.get_geometry(index))
    };

    let converted = match geometry_type {
        wkbPoint => {
            let coord = point_coords(geometry)
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("Cannot convert an empty point"))?;
            geo::Geometry::Point(coord.into())
        }
        wkbLineString | wkbLinearRing => {
            geo::Geometry::LineString(geo::LineString::from(point_coords(geometry)))
        }
        wkbPolygon => geo::Geometry::Polygon(polygon_from_gdal(geometry)),
        wkbMultiPoint => geo::Geometry::MultiPoint(
            members()
                .flat_map(|point| point_coords(&point))
                .map(geo::Point::from)
                .collect(),
        ),
        wkbMultiLineString => geo::Geometry::MultiLineString(geo::MultiLineString::new(
            members()
                .map(|line| geo::LineString::from(point_coords(&line)))
                .collect(),
        )),
        wkbMultiPolygon => geo::Geometry::MultiPolygon(geo::MultiPolygon::new(
            members().map(|polygon| polygon_from_gdal(&polygon)).collect(),
        )),
        wkbGeometryCollection => geo::Geometry::GeometryCollection(geo::GeometryCollection(
            members()
                .map(|member| gdal_geometry_to_geo(&member))
                .collect::<anyhow::Result<Vec<geo::Geometry>>>()?,
        )),
        _ => {
            return Err(anyhow!(
                "Cannot read OGR geometry type {} from KML",
                geometry_type
            ))
        }
    };
    Ok(converted)
}
