use crate::chatter::RngState;
use crate::evolution::EvolutionProgress;
use crate::expression::{resolve_expression, Expression};
use crate::progression::experience_for_level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SAVE_VERSION: u32 = 1;
pub const GAME_VERSION: u32 = 1;

pub const STAT_MIN: f32 = 0.0;
pub const STAT_MAX: f32 = 100.0;
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;

/// Clamp a stat into `[0, 100]`. NaN collapses to zero.
pub fn clamp_stat(v: f32) -> f32 {
    if v.is_nan() {
        STAT_MIN
    } else {
        v.clamp(STAT_MIN, STAT_MAX)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub happiness: f32,
    pub hunger: f32,
    pub energy: f32,
    pub level: u8,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            happiness: 80.0,
            hunger: 20.0,
            energy: 80.0,
            level: MIN_LEVEL,
        }
    }
}

impl Stats {
    /// Health is never stored; it is the mirror image of hunger.
    pub fn health(&self) -> f32 {
        STAT_MAX - self.hunger
    }

    /// Add deltas to the three meters, clamping each independently.
    pub fn adjust(&mut self, happiness: f32, hunger: f32, energy: f32) {
        self.happiness = clamp_stat(self.happiness + happiness);
        self.hunger = clamp_stat(self.hunger + hunger);
        self.energy = clamp_stat(self.energy + energy);
    }

    pub(crate) fn normalize(&mut self) {
        self.adjust(0.0, 0.0, 0.0);
        self.level = self.level.clamp(MIN_LEVEL, MAX_LEVEL);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyColor {
    #[default]
    Mint,
    Peach,
    Sky,
    Lilac,
    Sunny,
}

impl BodyColor {
    pub const ALL: [BodyColor; 5] = [
        BodyColor::Mint,
        BodyColor::Peach,
        BodyColor::Sky,
        BodyColor::Lilac,
        BodyColor::Sunny,
    ];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            BodyColor::Mint => "Mint",
            BodyColor::Peach => "Peach",
            BodyColor::Sky => "Sky",
            BodyColor::Lilac => "Lilac",
            BodyColor::Sunny => "Sunny",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessory {
    #[default]
    None,
    Bow,
    Hat,
    Glasses,
    Scarf,
}

impl Accessory {
    pub const ALL: [Accessory; 5] = [
        Accessory::None,
        Accessory::Bow,
        Accessory::Hat,
        Accessory::Glasses,
        Accessory::Scarf,
    ];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|a| *a == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Accessory::None => "None",
            Accessory::Bow => "Bow",
            Accessory::Hat => "Hat",
            Accessory::Glasses => "Glasses",
            Accessory::Scarf => "Scarf",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub color: BodyColor,
    pub accessory: Accessory,
}

/// The single pet of a session.
///
/// `expression` is derived from `stats` and can only be refreshed, never set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PetRecord {
    pub id: String,
    pub name: String,
    pub species: String,
    pub stats: Stats,
    pub experience: u32,
    pub last_update_ms: i64,
    #[serde(default)]
    pub appearance: Appearance,
    #[serde(default)]
    expression: Expression,
}

impl PetRecord {
    pub fn new(name: &str, now_ms: i64) -> Self {
        let mut pet = Self {
            id: format!("pet-{:x}", now_ms.max(0)),
            name: name.to_string(),
            species: "blob".to_string(),
            stats: Stats::default(),
            experience: 0,
            last_update_ms: now_ms,
            appearance: Appearance::default(),
            expression: Expression::Neutral,
        };
        pet.refresh_expression();
        pet
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self.refresh_expression();
        self
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn refresh_expression(&mut self) {
        self.expression = resolve_expression(&self.stats);
    }

    /// Repair anything out of range, e.g. after loading a hand-edited save.
    pub fn normalize(&mut self) {
        self.stats.normalize();
        let cost = experience_for_level(self.stats.level);
        if cost == 0 || self.experience >= cost {
            self.experience = cost.saturating_sub(1).min(self.experience);
        }
        self.refresh_expression();
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Scene {
    #[default]
    Main,
    Settings,
    Help,
    Rename,
    Away(AwaySummary),
}

/// Short-lived display overrides. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reaction {
    pub expression: Expression,
    pub until_ms: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub text: String,
    pub until_ms: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub version: u32,
    pub pet: PetRecord,
    pub progress: EvolutionProgress,
    pub rng: RngState,
    #[serde(skip)]
    pub scene: Scene,
    #[serde(skip)]
    pub settings_cursor: usize,
    #[serde(skip)]
    pub name_edit: String,
    #[serde(skip)]
    pub reaction: Option<Reaction>,
    #[serde(skip)]
    pub toast: Option<Toast>,
}

impl GameState {
    pub fn new(seed: u64, now_ms: i64) -> Self {
        let pet = PetRecord::new("Pip", now_ms);
        let progress = EvolutionProgress::new(&pet, now_ms);
        Self {
            version: GAME_VERSION,
            pet,
            progress,
            rng: RngState::new(seed),
            scene: Scene::Main,
            settings_cursor: 0,
            name_edit: String::new(),
            reaction: None,
            toast: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub last_seen_utc: DateTime<Utc>,
    pub state: GameState,
}

/// What passive decay did while the app was closed.
#[derive(Clone, Debug, PartialEq)]
pub struct AwaySummary {
    pub elapsed_minutes: f64,
    pub before: Stats,
    pub after: Stats,
}

impl AwaySummary {
    pub fn has_anything(&self) -> bool {
        (self.before.happiness - self.after.happiness).abs() >= 1.0
            || (self.before.hunger - self.after.hunger).abs() >= 1.0
            || (self.before.energy - self.after.energy).abs() >= 1.0
    }
}
