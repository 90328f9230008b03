use crate::clock::DecayConfig;
use crate::error::StorageError;
use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const NAME_MAX: usize = 18;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fps_cap: u32,
    pub enable_color: bool,
    pub seed: u64,
    pub decay: DecayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            seed: 0xC0FFEE_u64,
            decay: DecayConfig::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Paths {
    pub save_path: PathBuf,
    pub settings_path: PathBuf,
    pub log_path: PathBuf,
}

impl Paths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            save_path: dir.join("save.json"),
            settings_path: dir.join("settings.json"),
            log_path: dir.join("petling.log"),
        }
    }
}

pub fn project_paths() -> Result<Paths, StorageError> {
    let proj = ProjectDirs::from("com", "petling", "Petling").ok_or(StorageError::NoDataDir)?;
    let dir = proj.data_local_dir();
    fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
    Ok(Paths::in_dir(dir))
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    let Ok(raw) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("ignoring corrupt settings at {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings_atomic(path: &Path, settings: &Settings) -> Result<(), StorageError> {
    write_json_atomic(path, settings)
}

pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, data).map_err(|e| StorageError::io(&tmp, e))?;
    atomic_rename(&tmp, path)
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<(), StorageError> {
    // rename replaces the target atomically on unix; windows refuses an existing target
    #[cfg(windows)]
    if to.exists() {
        fs::remove_file(to).map_err(|e| StorageError::io(to, e))?;
    }
    fs::rename(from, to).map_err(|e| StorageError::io(to, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"fps_cap": 60, "decay": {"hunger_per_minute": 2.0}}"#).unwrap();

        let s = load_settings(&path);
        assert_eq!(s.fps_cap, 60);
        assert!(s.enable_color);
        assert_eq!(s.decay.hunger_per_minute, 2.0);
        assert_eq!(s.decay.decay_interval_ms, DecayConfig::default().decay_interval_ms);
    }

    #[test]
    fn corrupt_or_missing_settings_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(load_settings(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn rename_replaces_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("save.json");
        let staged = dir.path().join("save.json.tmp");
        fs::write(&target, "old").unwrap();
        fs::write(&staged, "new").unwrap();

        atomic_rename(&staged, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!staged.exists());
    }

    #[test]
    fn failed_rename_keeps_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("save.json");
        fs::write(&target, "old").unwrap();

        let err = atomic_rename(&dir.path().join("missing.tmp"), &target).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
    }

    #[test]
    fn settings_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let s = Settings {
            enable_color: false,
            seed: 9,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
