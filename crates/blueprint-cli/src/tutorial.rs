//! File-backed tutorial flag.
//!
//! The only durable preference: whether to show the tutorial banner when a
//! session starts. Dismissing it writes `false` to a small file next to the
//! config; a missing file means the tutorial has never been dismissed.

use std::path::PathBuf;

use anyhow::{Context, Result};

use blueprint_core::session::TutorialFlagStore;

pub struct FileTutorialFlagStore {
    path: PathBuf,
}

impl FileTutorialFlagStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location inside the config directory.
    pub fn default_location() -> Self {
        Self::new(crate::config::config_dir().join("show_tutorial"))
    }
}

impl TutorialFlagStore for FileTutorialFlagStore {
    fn load(&self) -> Result<bool> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.trim() != "false"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e).with_context(|| {
                format!("failed to read tutorial flag at {}", self.path.display())
            }),
        }
    }

    fn store(&self, show: bool) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        std::fs::write(&self.path, if show { "true" } else { "false" })
            .with_context(|| format!("failed to write tutorial flag at {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_show_the_tutorial() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileTutorialFlagStore::new(tmp.path().join("show_tutorial"));
        assert!(store.load().unwrap());
    }

    #[test]
    fn dismissal_survives_a_reload() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("show_tutorial");
        let store = FileTutorialFlagStore::new(path.clone());

        store.store(false).unwrap();
        assert!(!store.load().unwrap());

        // A second store instance sees the same flag.
        let reopened = FileTutorialFlagStore::new(path);
        assert!(!reopened.load().unwrap());
    }

    #[test]
    fn flag_can_be_turned_back_on() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileTutorialFlagStore::new(tmp.path().join("show_tutorial"));
        store.store(false).unwrap();
        store.store(true).unwrap();
        assert!(store.load().unwrap());
    }
}
