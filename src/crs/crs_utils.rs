use anyhow::{anyhow, Context};
use gdal::spatial_ref::SpatialRef;
use proj::Transform;

pub type EpsgCode = u32;

pub const WGS84_EPSG_CODE: EpsgCode = 4326;

pub fn epsg_4326() -> anyhow::Result<SpatialRef> {
    SpatialRef::from_epsg(WGS84_EPSG_CODE).context("Creating EPSG:4326 spatial ref")
}

pub fn epsg_code_to_authority_string(code: EpsgCode) -> String {
    format!("EPSG:{}", code)
}

/// Returns true if the spatial ref is WGS84 geographic, either by its authority code or by
/// being equivalent to EPSG:4326.
pub fn is_wgs84(spatial_ref: &SpatialRef) -> bool {
    let is_epsg_authority = spatial_ref
        .auth_name()
        .map(|name| name.eq_ignore_ascii_case("EPSG"))
        .unwrap_or(false);
    if is_epsg_authority && spatial_ref.auth_code().ok() == Some(WGS84_EPSG_CODE as i32) {
        return true;
    }
    match epsg_4326() {
        Ok(wgs84) => *spatial_ref == wgs84,
        Err(_) => false,
    }
}

/// Definition string understood by PROJ. Prefers an "AUTHORITY:CODE" string and falls back to WKT
/// for spatial refs without an authority.
pub fn proj_definition(spatial_ref: &SpatialRef) -> anyhow::Result<String> {
    if let (Ok(auth_name), Ok(auth_code)) = (spatial_ref.auth_name(), spatial_ref.auth_code()) {
        if auth_name.eq_ignore_ascii_case("EPSG") {
            return Ok(epsg_code_to_authority_string(auth_code as EpsgCode));
        }
        return Ok(format!("{}:{}", auth_name, auth_code));
    }
    spatial_ref
        .to_wkt()
        .map_err(|err| anyhow!("Spatial ref has neither authority nor WKT, {}", err))
}

pub fn projection_between(from_crs: &SpatialRef, to_crs: &SpatialRef) -> anyhow::Result<proj::Proj> {
    let from_definition = proj_definition(from_crs)?;
    let to_definition = proj_definition(to_crs)?;
    proj::Proj::new_known_crs(&from_definition, &to_definition, None).map_err(|err| {
        anyhow!(
            "Could not create projection from {} to {}, {}",
            from_definition,
            to_definition,
            err
        )
    })
}

/// Project a geometry in place. Coordinates are expected in lon/lat (x/y) order for geographic
/// CRSs, which is what `Proj::new_known_crs` normalizes to.
pub fn project_geometry(geometry: &mut geo::Geometry, projection: &proj::Proj) -> anyhow::Result<()> {
    match geometry {
        geo::Geometry::Point(point) => point.transform(projection)?,
        geo::Geometry::LineString(line) => line.transform(projection)?,
        geo::Geometry::Polygon(polygon) => polygon.transform(projection)?,
        geo::Geometry::MultiPoint(points) => points.transform(projection)?,
        geo::Geometry::MultiLineString(lines) => lines.transform(projection)?,
        geo::Geometry::MultiPolygon(polygons) => polygons.transform(projection)?,
        geo::Geometry::GeometryCollection(collection) => {
            for member in collection.0.iter_mut() {
                project_geometry(member, projection)?;
            }
        }
        other => return Err(anyhow!("Cannot project geometry type {:?}", other)),
    }
    Ok(())
}
