// Path helpers for storing library-relative paths portably
use std::path::{Path, PathBuf};

/// Suffix of the file name including the period, e.g. ".mp3".
/// Empty for names without a period or whose only period is the leading one.
pub fn suffix_of(path: &Path) -> String {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return String::new(),
    };

    match name.rfind('.') {
        Some(index) if index > 0 => name[index..].to_string(),
        _ => String::new(),
    }
}

/// Normalise a relative path to `/`-separated form for the database, so a
/// library cached on one platform stays valid on another.
pub fn to_db_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Convert a `/`-separated database path to a platform path
pub fn from_db_path(path: &str) -> PathBuf {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Database path of `file` relative to `root`, if it lives under it
pub fn relative_db_path(root: &Path, file: &Path) -> Option<String> {
    file.strip_prefix(root).ok().map(to_db_path)
}
