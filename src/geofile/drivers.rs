use std::sync::OnceLock;

use gdal::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmlDriverType {
    LibKml,
    Kml,
}

impl KmlDriverType {
    /// In order of preference when opening a file. LIBKML also reads KMZ archives.
    pub const ALL: [KmlDriverType; 2] = [KmlDriverType::LibKml, KmlDriverType::Kml];

    pub fn name(&self) -> &'static str {
        match self {
            KmlDriverType::LibKml => "LIBKML",
            KmlDriverType::Kml => "KML",
        }
    }
}

/// A KML driver present in the GDAL build. Every registered driver can read; `writable` is set
/// when the driver also advertises dataset creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledKmlDriver {
    pub driver_type: KmlDriverType,
    pub writable: bool,
}

static ENABLED_KML_DRIVERS: OnceLock<Vec<EnabledKmlDriver>> = OnceLock::new();

/// Register the GDAL drivers and return the KML drivers this GDAL build provides, in order of
/// preference.
///
/// Registration happens once per process; later calls return the same list. A missing driver is
/// only logged, opening a file without any KML driver fails at read time.
pub fn enable_kml_drivers() -> &'static [EnabledKmlDriver] {
    ENABLED_KML_DRIVERS.get_or_init(|| {
        gdal::DriverManager::register_all();
        KmlDriverType::ALL
            .into_iter()
            .filter_map(|driver_type| {
                match gdal::DriverManager::get_driver_by_name(driver_type.name()) {
                    Ok(driver) => {
                        let writable = driver.metadata_item("DCAP_CREATE", "").is_some();
                        log::debug!(
                            "Enabled GDAL driver {} (read{})",
                            driver_type.name(),
                            if writable { "/write" } else { " only" }
                        );
                        Some(EnabledKmlDriver {
                            driver_type,
                            writable,
                        })
                    }
                    Err(_) => {
                        log::warn!("GDAL driver {} is not available", driver_type.name());
                        None
                    }
                }
            })
            .collect()
    })
}

pub fn is_driver_enabled(driver_type: KmlDriverType) -> bool {
    enable_kml_drivers()
        .iter()
        .any(|driver| driver.driver_type == driver_type)
}
