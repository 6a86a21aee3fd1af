//! KML fixtures written to scratch directories by tests.

use std::path::{Path, PathBuf};

use gdal::vector::LayerAccess;

pub enum KmlGeometryKind {
    Point,
    Line,
}

pub struct KmlFolder {
    pub name: String,
    pub kind: KmlGeometryKind,
    pub count: usize,
    /// Placemark elements appended verbatim after the generated ones.
    pub raw_placemarks: Vec<String>,
}

impl KmlFolder {
    pub fn points(name: &str, count: usize) -> Self {
        Self {
            name: name.to_string(),
            kind: KmlGeometryKind::Point,
            count,
            raw_placemarks: Vec::new(),
        }
    }

    pub fn lines(name: &str, count: usize) -> Self {
        Self {
            name: name.to_string(),
            kind: KmlGeometryKind::Line,
            count,
            raw_placemarks: Vec::new(),
        }
    }

    pub fn empty(name: &str) -> Self {
        Self::points(name, 0)
    }

    pub fn with_raw_placemark(mut self, placemark: &str) -> Self {
        self.raw_placemarks.push(placemark.to_string());
        self
    }

    fn placemark(&self, index: usize) -> String {
        let offset = index as f64 * 0.1;
        let geometry = match self.kind {
            KmlGeometryKind::Point => format!(
                "<Point><coordinates>{},{},0</coordinates></Point>",
                10.0 + offset,
                50.0 + offset
            ),
            KmlGeometryKind::Line => format!(
                "<LineString><coordinates>{},{},0 {},{},0</coordinates></LineString>",
                10.0 + offset,
                50.0,
                11.0 + offset,
                51.0
            ),
        };
        format!(
            "<Placemark><name>{} {}</name><description>feature {}</description>{}</Placemark>",
            self.name, index, index, geometry
        )
    }

    fn to_kml(&self) -> String {
        let placemarks: String = (0..self.count).map(|index| self.placemark(index)).collect();
        format!(
            "<Folder><name>{}</name>{}{}</Folder>",
            self.name,
            placemarks,
            self.raw_placemarks.concat()
        )
    }
}

pub fn kml_document(folders: &[KmlFolder]) -> String {
    let folders: String = folders.iter().map(|folder| folder.to_kml()).collect();
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#,
            "<Document><name>test</name>{}</Document></kml>"
        ),
        folders
    )
}

pub fn write_kml(dir: &Path, filename: &str, folders: &[KmlFolder]) -> PathBuf {
    let filepath = dir.join(filename);
    std::fs::write(&filepath, kml_document(folders)).unwrap();
    filepath
}

/// Write a KMZ archive through GDAL's LIBKML driver, one layer per entry of `layers` holding that
/// many points. Callers check that LIBKML is enabled first.
pub fn write_kmz(dir: &Path, filename: &str, layers: &[(&str, usize)]) -> PathBuf {
    let filepath = dir.join(filename);
    let driver = gdal::DriverManager::get_driver_by_name("LIBKML").unwrap();
    let mut dataset = driver.create_vector_only(&filepath).unwrap();
    let wgs84 = gdal::spatial_ref::SpatialRef::from_epsg(4326).unwrap();
    for &(layer_name, count) in layers {
        let mut layer = dataset
            .create_layer(gdal::LayerOptions {
                name: layer_name,
                srs: Some(&wgs84),
                ty: gdal::vector::OGRwkbGeometryType::wkbPoint,
                options: None,
            })
            .unwrap();
        for index in 0..count {
            let offset = index as f64 * 0.1;
            let wkt = format!("POINT ({} {})", 10.0 + offset, 50.0 + offset);
            layer
                .create_feature(gdal::vector::Geometry::from_wkt(&wkt).unwrap())
                .unwrap();
        }
    }
    // Dropping the dataset writes the archive.
    drop(dataset);
    filepath
}
