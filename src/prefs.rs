use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Client-local key-value persistence; only the language preference lives
/// here.  Writes are best effort, a failed write never fails the caller.
pub trait Preferences {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

pub const LANGUAGE_KEY: &str = "app.language";

pub struct FilePreferences {
    path: PathBuf,
    cache: Mutex<HashMap<String, String>>,
}

impl FilePreferences {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            cache: Mutex::new(cache),
        }
    }
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut guard = self.cache.lock().unwrap();
        guard.insert(key.to_string(), value.to_string());

        let raw = match serde_json::to_string_pretty(&*guard) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("cannot serialize preferences: {}", e);
                return;
            },
        };
        if let Err(e) = std::fs::write(&self.path, raw) {
            tracing::warn!("cannot write preferences to {:?}: {}", self.path, e);
        }
    }
}

#[derive(Default)]
pub struct InMemoryPreferences(Mutex<HashMap<String, String>>);

impl InMemoryPreferences {
    pub fn new() -> Self { Self::default() }
}

impl Preferences for InMemoryPreferences {
    fn get(&self, key: &str) -> Option<String> { self.0.lock().unwrap().get(key).cloned() }

    fn set(&self, key: &str, value: &str) {
        self.0
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_on_disk() {
        let dir = std::env::temp_dir().join(format!("coursette-prefs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prefs.json");

        let prefs = FilePreferences::open(&path);
        assert_eq!(prefs.get(LANGUAGE_KEY), None);

        prefs.set(LANGUAGE_KEY, "ar");

        let reopened = FilePreferences::open(&path);
        assert_eq!(reopened.get(LANGUAGE_KEY), Some("ar".to_string()));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
