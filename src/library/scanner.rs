use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::metadata::ProviderRegistry;

/// Scanner for finding audio files in a directory tree
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Scan a directory recursively and return every file some provider in
    /// `registry` is installed for, in a stable order
    pub fn scan<P: AsRef<Path>>(
        directory: P,
        registry: &ProviderRegistry,
    ) -> Result<Vec<PathBuf>, anyhow::Error> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            anyhow::bail!("library root {} is not a directory", directory.display());
        }

        let mut audio_files = Vec::new();

        for entry in WalkDir::new(directory)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable library entry");
                    continue;
                }
            };

            // Skip directories
            if !entry.file_type().is_file() {
                continue;
            }

            if registry.handles(entry.path()) {
                audio_files.push(entry.into_path());
            }
        }

        Ok(audio_files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::with_builtin(&[".mp3".to_string(), ".ogg".to_string()]).unwrap()
    }

    #[test]
    fn scan_filters_unregistered_suffixes_recursively() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("Artist").join("Album");
        fs::create_dir_all(&sub).unwrap();

        fs::write(dir.path().join("b.MP3"), b"x").unwrap();
        fs::write(dir.path().join("a.ogg"), b"x").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"x").unwrap();
        fs::write(sub.join("01.mp3"), b"x").unwrap();
        fs::write(sub.join(".mp3"), b"x").unwrap();

        let files = DirectoryScanner::scan(dir.path(), &registry()).unwrap();
        let names: Vec<PathBuf> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("Artist").join("Album").join("01.mp3"),
                PathBuf::from("a.ogg"),
                PathBuf::from("b.MP3"),
            ]
        );
    }

    #[test]
    fn scan_rejects_missing_root() {
        let dir = tempdir().unwrap();
        assert!(DirectoryScanner::scan(dir.path().join("absent"), &registry()).is_err());
    }
}
