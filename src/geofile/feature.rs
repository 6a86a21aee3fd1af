/// Attribute values of a feature, keyed by field name. Insertion order is the field order.
pub type FeatureMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// KML placemarks are allowed to have no geometry.
    pub geometry: Option<geo::Geometry>,
    pub attributes: FeatureMap,
}

impl From<geo::Geometry> for Feature {
    fn from(value: geo::Geometry) -> Self {
        Self {
            geometry: Some(value),
            attributes: FeatureMap::new(),
        }
    }
}

/// Ordered features read from one or more layers, together with the union of their field names
/// and the coordinate reference system the geometries are expressed in, if known.
#[derive(Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub schema: Vec<String>,
    pub spatial_ref: Option<gdal::spatial_ref::SpatialRef>,
}

impl FeatureCollection {
    pub fn new(spatial_ref: Option<gdal::spatial_ref::SpatialRef>) -> Self {
        Self {
            features: Vec::new(),
            schema: Vec::new(),
            spatial_ref,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Add field names to the schema, keeping first-seen order and skipping known names.
    pub fn extend_schema<'a>(&mut self, field_names: impl IntoIterator<Item = &'a String>) {
        for field_name in field_names {
            if !self.schema.contains(field_name) {
                self.schema.push(field_name.clone());
            }
        }
    }
}
