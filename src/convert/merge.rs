use gdal::spatial_ref::SpatialRef;

use crate::{
    crs::crs_utils::{epsg_4326, is_wgs84, project_geometry, projection_between, proj_definition},
    geofile::feature::FeatureCollection,
};

/// Project every geometry of the collection into `to_crs`. Collections without a CRS are returned
/// as is.
pub fn project_collection(
    mut collection: FeatureCollection,
    to_crs: &SpatialRef,
) -> anyhow::Result<FeatureCollection> {
    let Some(from_crs) = collection.spatial_ref.clone() else {
        return Ok(collection);
    };
    let projection = projection_between(&from_crs, to_crs)?;
    for feature in collection.features.iter_mut() {
        if let Some(geometry) = feature.geometry.as_mut() {
            project_geometry(geometry, &projection)?;
        }
    }
    collection.spatial_ref = Some(to_crs.clone());
    Ok(collection)
}

/// Concatenate layers into one collection, keeping layer order and the feature order within each
/// layer. The schema is the union of all layer schemas.
///
/// The merged CRS is the CRS of the first layer that has one. Layers in a different CRS are
/// projected into it, layers without a CRS are taken over unchanged.
pub fn merge_collections(collections: Vec<FeatureCollection>) -> anyhow::Result<FeatureCollection> {
    let mut merged = FeatureCollection::new(None);
    for collection in collections {
        if merged.spatial_ref.is_none() {
            merged.spatial_ref = collection.spatial_ref.clone();
        }
        let collection = match (&merged.spatial_ref, &collection.spatial_ref) {
            (Some(merged_crs), Some(layer_crs)) if merged_crs != layer_crs => {
                log::debug!(
                    "Projecting layer from {} to {}",
                    proj_definition(layer_crs)?,
                    proj_definition(merged_crs)?
                );
                project_collection(collection, merged_crs)?
            }
            _ => collection,
        };
        merged.extend_schema(&collection.schema);
        merged.features.extend(collection.features);
    }
    Ok(merged)
}

/// Bring the collection into EPSG:4326.
///
/// A collection without a CRS is passed through untouched and stays untagged: its coordinates are
/// assumed to be WGS84 already, which is not verified.
pub fn to_wgs84(collection: FeatureCollection) -> anyhow::Result<FeatureCollection> {
    let needs_projection = match &collection.spatial_ref {
        None => {
            log::debug!("No CRS found, writing coordinates without reprojection");
            false
        }
        Some(spatial_ref) => !is_wgs84(spatial_ref),
    };
    if needs_projection {
        project_collection(collection, &epsg_4326()?)
    } else {
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use gdal::spatial_ref::SpatialRef;

    use crate::{
        crs::crs_utils::is_wgs84,
        geofile::feature::{Feature, FeatureCollection, FeatureMap},
    };

    use super::{merge_collections, to_wgs84};

    fn point_collection(
        points: &[(f64, f64)],
        field_name: &str,
        spatial_ref: Option<SpatialRef>,
    ) -> FeatureCollection {
        let mut collection = FeatureCollection::new(spatial_ref);
        collection.extend_schema(&vec![field_name.to_string()]);
        for (index, (x, y)) in points.iter().enumerate() {
            collection.features.push(Feature {
                geometry: Some(geo::Geometry::Point(geo::Point::new(*x, *y))),
                attributes: FeatureMap::from_iter([(field_name.to_string(), index.into())]),
            });
        }
        collection
    }

    fn points(collection: &FeatureCollection) -> Vec<geo::Point> {
        collection
            .features
            .iter()
            .map(|feature| match &feature.geometry {
                Some(geo::Geometry::Point(point)) => *point,
                other => panic!("Expected a point, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_merge_keeps_layer_and_feature_order() {
        let wgs84 = SpatialRef::from_epsg(4326).unwrap();
        let first = point_collection(&[(1.0, 1.0), (2.0, 2.0)], "a", Some(wgs84.clone()));
        let second = point_collection(&[(3.0, 3.0)], "b", Some(wgs84));

        let merged = merge_collections(vec![first, second]).unwrap();

        assert_eq!(3, merged.len());
        assert_eq!(
            vec![
                geo::Point::new(1.0, 1.0),
                geo::Point::new(2.0, 2.0),
                geo::Point::new(3.0, 3.0)
            ],
            points(&merged)
        );
        assert_eq!(vec!["a", "b"], merged.schema);
        assert!(merged.features[2].attributes.get("a").is_none());
    }

    #[test]
    fn test_merge_takes_crs_of_first_tagged_layer() {
        let untagged = point_collection(&[(1.0, 1.0)], "a", None);
        let tagged = point_collection(
            &[(2.0, 2.0)],
            "a",
            Some(SpatialRef::from_epsg(4326).unwrap()),
        );

        let merged = merge_collections(vec![untagged, tagged]).unwrap();

        assert!(is_wgs84(merged.spatial_ref.as_ref().unwrap()));
        assert_eq!(
            vec![geo::Point::new(1.0, 1.0), geo::Point::new(2.0, 2.0)],
            points(&merged)
        );
    }

    #[test]
    fn test_merge_projects_layers_into_merged_crs() {
        let wgs84_layer = point_collection(
            &[(139.7895073, 35.6862101)],
            "a",
            Some(SpatialRef::from_epsg(4326).unwrap()),
        );
        // UTM zone 54N coordinates of a point in Tokyo.
        let utm_layer = point_collection(
            &[(390631.113, 3949907.576)],
            "a",
            Some(SpatialRef::from_epsg(32654).unwrap()),
        );

        let merged = merge_collections(vec![wgs84_layer, utm_layer]).unwrap();

        let merged_points = points(&merged);
        assert_abs_diff_eq!(
            merged_points[1],
            geo::Point::new(139.7912979, 35.6870132),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_to_wgs84_projects_tagged_collection() {
        let utm = SpatialRef::from_epsg(32654).unwrap();
        let collection = point_collection(
            &[(390467.986, 3949820.494), (390685.694, 3949820.653)],
            "a",
            Some(utm),
        );

        let projected = to_wgs84(collection).unwrap();

        assert!(is_wgs84(projected.spatial_ref.as_ref().unwrap()));
        for point in points(&projected) {
            assert!((-180.0..=180.0).contains(&point.x()));
            assert!((-90.0..=90.0).contains(&point.y()));
        }
        assert_abs_diff_eq!(
            points(&projected)[1],
            geo::Point::new(139.7919128, 35.6862357),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_to_wgs84_passes_untagged_collection_through() {
        // Not valid lon/lat, but untagged coordinates are never touched.
        let input = [(390467.986, 3949820.494), (-12.5, 7.25)];
        let collection = point_collection(&input, "a", None);

        let passed_through = to_wgs84(collection).unwrap();

        assert!(passed_through.spatial_ref.is_none());
        let expected: Vec<geo::Point> = input
            .iter()
            .map(|(x, y)| geo::Point::new(*x, *y))
            .collect();
        assert_eq!(expected, points(&passed_through));
    }

    #[test]
    fn test_to_wgs84_keeps_wgs84_coordinates() {
        let collection = point_collection(
            &[(10.0, 50.0)],
            "a",
            Some(SpatialRef::from_epsg(4326).unwrap()),
        );
        let unchanged = to_wgs84(collection).unwrap();
        assert_eq!(vec![geo::Point::new(10.0, 50.0)], points(&unchanged));
    }
}
