// Metadata provider interface and the suffix-keyed registry
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use super::TrackMetadata;
use crate::library::paths::suffix_of;

/// Reads tag metadata from one kind of audio file
pub trait MetadataProvider: Send + Sync {
    /// Called only for files that exist and end with a suffix the provider
    /// was registered for. Returns `None` when nothing could be extracted.
    fn read_metadata(&self, path: &Path) -> Option<TrackMetadata>;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("file suffix \"{0}\" already occupied")]
    SuffixOccupied(String),

    #[error("file suffix \"{0}\" must start with a period")]
    InvalidSuffix(String),
}

/// Maps lower-cased file suffixes (".mp3") to the provider handling them
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Box<dyn MetadataProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in lofty provider installed for each suffix
    pub fn with_builtin(suffixes: &[String]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for suffix in suffixes {
            registry.register(suffix, Box::new(super::LoftyProvider))?;
        }
        Ok(registry)
    }

    /// Install `provider` for `suffix`. A suffix can only be taken once.
    pub fn register(
        &mut self,
        suffix: &str,
        provider: Box<dyn MetadataProvider>,
    ) -> Result<(), RegistryError> {
        if !suffix.starts_with('.') || suffix.len() < 2 {
            return Err(RegistryError::InvalidSuffix(suffix.to_string()));
        }

        let key = suffix.to_lowercase();
        if self.providers.contains_key(&key) {
            return Err(RegistryError::SuffixOccupied(key));
        }

        self.providers.insert(key, provider);
        Ok(())
    }

    /// Provider responsible for `path`, if its suffix is registered
    pub fn provider_for(&self, path: &Path) -> Option<&dyn MetadataProvider> {
        let suffix = suffix_of(path).to_lowercase();
        self.providers.get(&suffix).map(|p| p.as_ref())
    }

    pub fn handles(&self, path: &Path) -> bool {
        self.provider_for(path).is_some()
    }

    /// Read metadata with the matching provider, or `None` for unknown suffixes
    pub fn read_metadata(&self, path: &Path) -> Option<TrackMetadata> {
        self.provider_for(path)?.read_metadata(path)
    }

    pub fn suffixes(&self) -> Vec<&str> {
        let mut suffixes: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        suffixes.sort_unstable();
        suffixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTitle(&'static str);

    impl MetadataProvider for FixedTitle {
        fn read_metadata(&self, _path: &Path) -> Option<TrackMetadata> {
            Some(TrackMetadata {
                mime: "audio/test".to_string(),
                title: Some(self.0.to_string()),
                ..TrackMetadata::default()
            })
        }
    }

    #[test]
    fn dispatches_by_suffix_case_insensitive() {
        let mut registry = ProviderRegistry::new();
        registry.register(".mp3", Box::new(FixedTitle("mp3"))).unwrap();
        registry.register(".OGG", Box::new(FixedTitle("ogg"))).unwrap();

        let read = |p: &str| registry.read_metadata(Path::new(p)).and_then(|m| m.title);
        assert_eq!(read("/music/a.MP3").as_deref(), Some("mp3"));
        assert_eq!(read("/music/b.ogg").as_deref(), Some("ogg"));
        assert_eq!(read("/music/c.flac"), None);
        assert_eq!(read("/music/.mp3"), None);
        assert_eq!(registry.suffixes(), vec![".mp3", ".ogg"]);
    }

    #[test]
    fn occupied_suffix_is_rejected() {
        let mut registry = ProviderRegistry::new();
        registry.register(".mp3", Box::new(FixedTitle("a"))).unwrap();
        assert_eq!(
            registry.register(".MP3", Box::new(FixedTitle("b"))).unwrap_err(),
            RegistryError::SuffixOccupied(".mp3".to_string())
        );
    }

    #[test]
    fn suffix_needs_leading_period() {
        let mut registry = ProviderRegistry::new();
        assert!(matches!(
            registry.register("mp3", Box::new(FixedTitle("a"))),
            Err(RegistryError::InvalidSuffix(_))
        ));
        assert!(matches!(
            registry.register(".", Box::new(FixedTitle("a"))),
            Err(RegistryError::InvalidSuffix(_))
        ));
    }

    #[test]
    fn builtin_registry_rejects_duplicate_configuration() {
        let suffixes = vec![".mp3".to_string(), ".Mp3".to_string()];
        assert!(ProviderRegistry::with_builtin(&suffixes).is_err());

        let suffixes = vec![".mp3".to_string(), ".flac".to_string()];
        let registry = ProviderRegistry::with_builtin(&suffixes).unwrap();
        assert!(registry.handles(Path::new("x.flac")));
        assert!(!registry.handles(Path::new("x.txt")));
    }
}
