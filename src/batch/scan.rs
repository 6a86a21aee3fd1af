use std::{
    fs, io,
    path::{Path, PathBuf},
};

const KML_EXTENSIONS: [&str; 2] = [".kml", ".kmz"];

pub fn is_kml_filename(filename: &str) -> bool {
    let filename = filename.to_lowercase();
    KML_EXTENSIONS
        .iter()
        .any(|extension| filename.ends_with(extension))
}

/// Files directly inside `input_dir` with a `.kml` or `.kmz` extension, in directory listing order.
pub fn find_kml_files(input_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut kml_files = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let is_kml = entry
            .file_name()
            .to_str()
            .map(is_kml_filename)
            .unwrap_or(false);
        if is_kml && entry.file_type()?.is_file() {
            kml_files.push(entry.path());
        }
    }
    Ok(kml_files)
}

/// `<output_dir>/<input stem>.geojson`
pub fn output_path_for(input_filepath: &Path, output_dir: &Path) -> PathBuf {
    let stem = input_filepath.file_stem().unwrap_or_default();
    let mut output_filename = stem.to_os_string();
    output_filename.push(".geojson");
    output_dir.join(output_filename)
}
