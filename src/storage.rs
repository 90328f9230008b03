use crate::config::{write_json_atomic, Settings};
use crate::error::StorageError;
use crate::evolution::EvolutionProgress;
use crate::model::{GameState, SaveFile, SAVE_VERSION};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::{fs, path::Path};

/// Load the saved game, or start fresh when there is nothing usable.
///
/// A save is a best-effort cache: unreadable, corrupt, or foreign-version
/// files are logged and replaced by a new pet rather than reported.
pub fn load_or_init_save(
    path: &Path,
    settings: &Settings,
    now_ms: i64,
) -> (GameState, Option<DateTime<Utc>>) {
    let fresh = || (GameState::new(settings.seed, now_ms), None);

    let Ok(raw) = fs::read_to_string(path) else {
        info!("no save at {}, hatching a new pet", path.display());
        return fresh();
    };
    let save = match serde_json::from_str::<SaveFile>(&raw) {
        Ok(save) => save,
        Err(e) => {
            warn!("discarding corrupt save {}: {e}", path.display());
            return fresh();
        }
    };
    if save.version != SAVE_VERSION {
        warn!(
            "discarding save {} with version {} (expected {SAVE_VERSION})",
            path.display(),
            save.version
        );
        return fresh();
    }

    let mut state = save.state;
    state.pet.normalize();
    if !state.progress.is_consistent() {
        warn!(
            "evolution history in {} is inconsistent, restarting from the first stage",
            path.display()
        );
        state.progress = EvolutionProgress::new(&state.pet, now_ms);
    }
    (state, Some(save.last_seen_utc))
}

pub fn snapshot(state: &GameState, now: DateTime<Utc>) -> SaveFile {
    SaveFile {
        version: SAVE_VERSION,
        last_seen_utc: now,
        state: state.clone(),
    }
}

pub fn save_atomic(path: &Path, save: &SaveFile) -> Result<(), StorageError> {
    write_json_atomic(path, save)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::{evolve, StageId};
    use crate::model::Stats;

    #[test]
    fn missing_save_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let (state, last_seen) =
            load_or_init_save(&dir.path().join("save.json"), &Settings::default(), 500);
        assert!(last_seen.is_none());
        assert_eq!(state.pet.last_update_ms, 500);
        assert_eq!(state.progress.current_stage_id(), StageId::Baby);
    }

    #[test]
    fn corrupt_save_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "{\"version\": 1, \"state\": 12}").unwrap();
        let (state, last_seen) = load_or_init_save(&path, &Settings::default(), 0);
        assert!(last_seen.is_none());
        assert_eq!(state.pet.name, "Pip");
    }

    #[test]
    fn save_round_trips_pet_and_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut state = GameState::new(3, 0);
        state.pet.name = "Biscuit".to_string();
        state.pet = state.pet.clone().with_stats(Stats {
            happiness: 60.0,
            hunger: 10.0,
            energy: 60.0,
            level: 3,
        });
        let out = evolve(&state.pet, &state.progress, 10);
        state.pet = out.pet;
        state.progress = out.progress;

        let now = Utc::now();
        save_atomic(&path, &snapshot(&state, now)).unwrap();

        let (loaded, last_seen) = load_or_init_save(&path, &Settings::default(), 0);
        assert_eq!(last_seen, Some(now));
        assert_eq!(loaded.pet, state.pet);
        assert_eq!(loaded.progress, state.progress);
        assert_eq!(loaded.progress.current_stage_id(), StageId::Child);
    }

    #[test]
    fn broken_evolution_history_restarts_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        save_atomic(&path, &snapshot(&GameState::new(3, 0), Utc::now())).unwrap();

        let mut raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        raw["state"]["progress"]["current_stage_id"] = "elder".into();
        raw["state"]["progress"]["history"] = serde_json::json!([]);
        fs::write(&path, raw.to_string()).unwrap();

        let (loaded, last_seen) = load_or_init_save(&path, &Settings::default(), 777);
        assert!(last_seen.is_some());
        assert_eq!(loaded.progress.current_stage_id(), StageId::Baby);
        assert_eq!(loaded.progress.history().len(), 1);
        assert_eq!(loaded.progress.last_evolution_ms(), 777);
        assert!(loaded.progress.is_consistent());
    }

    #[test]
    fn other_version_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        let mut save = snapshot(&GameState::new(3, 0), Utc::now());
        save.version = SAVE_VERSION + 1;
        save_atomic(&path, &save).unwrap();

        let (_, last_seen) = load_or_init_save(&path, &Settings::default(), 0);
        assert!(last_seen.is_none());
    }
}
