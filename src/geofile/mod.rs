pub mod drivers;
pub mod feature;
pub mod gdal_geofile;
pub mod geojson;

#[cfg(test)]
pub mod test_kml;
