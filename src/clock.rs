use crate::model::{clamp_stat, PetRecord};
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::Cell;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Wall-clock source in epoch milliseconds.
pub trait TimeSource {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    pub decay_interval_ms: u64,
    pub minimum_elapsed_ms: u64,
    pub happiness_per_minute: f32,
    pub hunger_per_minute: f32,
    pub energy_per_minute: f32,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            decay_interval_ms: 30_000,
            minimum_elapsed_ms: 10_000,
            happiness_per_minute: 0.5,
            hunger_per_minute: 0.8,
            energy_per_minute: 0.3,
        }
    }
}

/// Drift the pet's meters by the real time elapsed since its last update.
///
/// Returns `None` when less than `minimum_elapsed_ms` has passed. A record
/// stamped in the future is re-anchored to `now_ms` with no drift, so a
/// clock that ran ahead costs nothing and does not stall later ticks.
pub fn apply_decay_tick(pet: &PetRecord, config: &DecayConfig, now_ms: i64) -> Option<PetRecord> {
    if now_ms < pet.last_update_ms {
        debug!(
            "clock skew of {} ms for {}, re-anchoring",
            pet.last_update_ms.saturating_sub(now_ms),
            pet.name
        );
        let mut next = pet.clone();
        next.last_update_ms = now_ms;
        return Some(next);
    }
    let elapsed_ms = now_ms.saturating_sub(pet.last_update_ms);
    let minimum = i64::try_from(config.minimum_elapsed_ms).unwrap_or(i64::MAX);
    if elapsed_ms < minimum {
        return None;
    }

    let minutes = elapsed_ms as f64 / MS_PER_MINUTE;
    let drift = |rate: f32| (f64::from(rate) * minutes) as f32;

    let mut next = pet.clone();
    next.stats.happiness = clamp_stat(pet.stats.happiness - drift(config.happiness_per_minute));
    next.stats.hunger = clamp_stat(pet.stats.hunger + drift(config.hunger_per_minute));
    next.stats.energy = clamp_stat(pet.stats.energy - drift(config.energy_per_minute));
    next.last_update_ms = now_ms;
    next.refresh_expression();
    Some(next)
}

/// Owned decay timer.
///
/// A clock does nothing until started and stops for good when dropped, so a
/// torn-down view can never leave a tick pending.
pub struct StatClock {
    config: DecayConfig,
    next_due_ms: Option<i64>,
}

impl StatClock {
    pub fn new(config: DecayConfig) -> Self {
        Self {
            config,
            next_due_ms: None,
        }
    }

    pub fn config(&self) -> &DecayConfig {
        &self.config
    }

    fn interval_ms(&self) -> i64 {
        i64::try_from(self.config.decay_interval_ms.max(1)).unwrap_or(i64::MAX)
    }

    pub fn start(&mut self, now_ms: i64) {
        self.next_due_ms = Some(now_ms.saturating_add(self.interval_ms()));
        debug!(
            "decay clock started, interval {} ms",
            self.config.decay_interval_ms
        );
    }

    pub fn stop(&mut self) {
        if self.next_due_ms.take().is_some() {
            debug!("decay clock stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    /// Fire if the interval has elapsed. `on_update` receives the decayed
    /// record; the clock never stores it. Returns whether it fired.
    pub fn tick<F>(&mut self, pet: &PetRecord, now_ms: i64, on_update: F) -> bool
    where
        F: FnOnce(PetRecord),
    {
        let Some(due) = self.next_due_ms else {
            return false;
        };
        if now_ms < due {
            return false;
        }
        self.next_due_ms = Some(now_ms.saturating_add(self.interval_ms()));

        match apply_decay_tick(pet, &self.config, now_ms) {
            Some(next) => {
                debug!(
                    "decay: happiness {:.1} hunger {:.1} energy {:.1}",
                    next.stats.happiness, next.stats.hunger, next.stats.energy
                );
                on_update(next);
                true
            }
            None => false,
        }
    }
}

impl Drop for StatClock {
    fn drop(&mut self) {
        self.stop();
    }
}
