use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

use crate::convert::converter::{convert_kml_to_geojson, ConversionError, ConversionOutcome};

use super::scan::{find_kml_files, output_path_for};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Input directory '{}' not found.", .path.display())]
    MissingInputDirectory { path: PathBuf },
    #[error("Could not create output directory '{}'", .path.display())]
    CreateOutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not list input directory '{}'", .path.display())]
    ReadInputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub empty: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Log the result of converting `name` and count it.
    pub fn record(&mut self, name: &str, result: &Result<ConversionOutcome, ConversionError>) {
        match result {
            Ok(ConversionOutcome::Converted { feature_count }) => {
                log::info!("Success: {} -> {} features saved.", name, feature_count);
                self.converted += 1;
            }
            Ok(ConversionOutcome::NoFeatures) => {
                log::warn!(
                    "Warning: {} contains no geometry features in any layer.",
                    name
                );
                self.empty += 1;
            }
            Err(err) => {
                log::error!("Error converting {}: {}", name, err);
                self.failed += 1;
            }
        }
    }
}

fn display_name(filepath: &Path) -> String {
    filepath
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| filepath.display().to_string())
}

/// Convert every KML/KMZ file directly inside `input_dir` into a GeoJSON file in `output_dir`.
///
/// Files are converted one at a time. A file that fails to convert is reported and the batch
/// moves on; only a missing or unlistable input directory, or an output directory that cannot be
/// created, stops the batch.
pub fn run_batch(input_dir: &Path, output_dir: &Path) -> Result<BatchSummary, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::MissingInputDirectory {
            path: input_dir.to_path_buf(),
        });
    }
    std::fs::create_dir_all(output_dir).map_err(|source| BatchError::CreateOutputDirectory {
        path: output_dir.to_path_buf(),
        source,
    })?;

    log::info!("Scanning '{}' for KML/KMZ files...", input_dir.display());
    let kml_files = find_kml_files(input_dir).map_err(|source| BatchError::ReadInputDirectory {
        path: input_dir.to_path_buf(),
        source,
    })?;
    let mut summary = BatchSummary::default();
    if kml_files.is_empty() {
        log::info!("No KML files found.");
        return Ok(summary);
    }

    let bar = ProgressBar::new(kml_files.len() as u64);
    for input_filepath in &kml_files {
        let name = display_name(input_filepath);
        let output_filepath = output_path_for(input_filepath, output_dir);
        // Log lines and the bar share stderr, keep the bar hidden while a file is converted.
        bar.suspend(|| {
            let result = convert_kml_to_geojson(input_filepath, &output_filepath);
            summary.record(&name, &result);
        });
        bar.inc(1);
    }
    bar.finish_and_clear();

    log::info!(
        "Converted {} of {} files ({} without features, {} failed)",
        summary.converted,
        kml_files.len(),
        summary.empty,
        summary.failed
    );
    Ok(summary)
}
