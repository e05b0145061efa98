use std::path::Path;

/// Placeholder in crop save path templates
pub const EXTENSION_SLOT: &str = "%s";

/// Fills the extension slot of a crop save path template
///
/// Only the first slot is replaced. A template without a slot is returned
/// unchanged.
pub fn fill_template(template: &str, extension: &str) -> String {
    template.replacen(EXTENSION_SLOT, extension, 1)
}

/// Extension of the final path component (text after the last `.`)
///
/// `None` when the file name has no `.` or nothing follows it.
pub fn extension_of(path: &str) -> Option<&str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

pub fn default_camera_path(files_dir: &Path, camera_file_name: &str) -> String {
    files_dir.join(camera_file_name).to_string_lossy().into_owned()
}

pub fn default_crop_template(files_dir: &Path, crop_file_template: &str) -> String {
    files_dir.join(crop_file_template).to_string_lossy().into_owned()
}
