//! Stage ladder and the evolution state machine.
//!
//! Stages form a strict chain, baby -> child -> teen -> adult -> elder. A pet
//! only ever moves one step forward, and only when [`evolve`] is asked to.

use crate::error::UnknownStage;
use crate::model::PetRecord;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageId {
    Baby,
    Child,
    Teen,
    Adult,
    Elder,
}

impl StageId {
    pub fn as_str(self) -> &'static str {
        match self {
            StageId::Baby => "baby",
            StageId::Child => "child",
            StageId::Teen => "teen",
            StageId::Adult => "adult",
            StageId::Elder => "elder",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STAGES
            .iter()
            .map(|stage| stage.id)
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Thresholds and bonuses share a shape. Health means `100 - hunger`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageStats {
    pub happiness: f32,
    pub energy: f32,
    pub health: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageLook {
    pub title: &'static str,
    /// Sprite rows the renderer uses for this stage.
    pub size: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvolutionStage {
    pub id: StageId,
    pub name: &'static str,
    pub required_level: u8,
    pub required_stats: StageStats,
    pub bonuses: StageStats,
    pub look: StageLook,
    pub unlocks: &'static [&'static str],
}

const fn stage_stats(happiness: f32, energy: f32, health: f32) -> StageStats {
    StageStats {
        happiness,
        energy,
        health,
    }
}

/// Indexed by `StageId`; keep the order in sync with the enum.
pub static STAGES: [EvolutionStage; 5] = [
    EvolutionStage {
        id: StageId::Baby,
        name: "Baby",
        required_level: 1,
        required_stats: stage_stats(0.0, 0.0, 0.0),
        bonuses: stage_stats(0.0, 0.0, 0.0),
        look: StageLook {
            title: "a wobbly hatchling",
            size: 3,
        },
        unlocks: &["feed", "rest"],
    },
    EvolutionStage {
        id: StageId::Child,
        name: "Child",
        required_level: 3,
        required_stats: stage_stats(20.0, 15.0, 15.0),
        bonuses: stage_stats(5.0, 5.0, 5.0),
        look: StageLook {
            title: "a curious sprout",
            size: 4,
        },
        unlocks: &["play"],
    },
    EvolutionStage {
        id: StageId::Teen,
        name: "Teen",
        required_level: 5,
        required_stats: stage_stats(30.0, 25.0, 20.0),
        bonuses: stage_stats(10.0, 5.0, 5.0),
        look: StageLook {
            title: "a restless rascal",
            size: 5,
        },
        unlocks: &["accessories"],
    },
    EvolutionStage {
        id: StageId::Adult,
        name: "Adult",
        required_level: 7,
        required_stats: stage_stats(45.0, 35.0, 35.0),
        bonuses: stage_stats(10.0, 10.0, 10.0),
        look: StageLook {
            title: "a steady companion",
            size: 6,
        },
        unlocks: &["colors"],
    },
    EvolutionStage {
        id: StageId::Elder,
        name: "Elder",
        required_level: 10,
        required_stats: stage_stats(60.0, 45.0, 50.0),
        bonuses: stage_stats(15.0, 10.0, 15.0),
        look: StageLook {
            title: "a wise old soul",
            size: 6,
        },
        unlocks: &["wisdom"],
    },
];

pub fn stage(id: StageId) -> &'static EvolutionStage {
    &STAGES[id.index()]
}

pub fn first_stage() -> &'static EvolutionStage {
    &STAGES[0]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEvent {
    #[serde(with = "stage_or_none")]
    pub from_stage_id: Option<StageId>,
    pub to_stage_id: StageId,
    pub timestamp_ms: i64,
    pub level_at_transition: u8,
}

/// Where a pet sits on the ladder and how it got there.
///
/// History only grows; [`EvolutionProgress::reset`] replaces it wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionProgress {
    current_stage_id: StageId,
    last_evolution_ms: i64,
    history: Vec<EvolutionEvent>,
}

impl EvolutionProgress {
    /// Fresh progress always starts at the first stage, whatever the level.
    pub fn new(pet: &PetRecord, now_ms: i64) -> Self {
        Self::starting_at(first_stage().id, pet, now_ms)
    }

    /// Progress seeded at an explicit stage, with a single `none -> stage`
    /// history entry.
    pub fn starting_at(stage_id: StageId, pet: &PetRecord, now_ms: i64) -> Self {
        Self {
            current_stage_id: stage_id,
            last_evolution_ms: now_ms,
            history: vec![EvolutionEvent {
                from_stage_id: None,
                to_stage_id: stage_id,
                timestamp_ms: now_ms,
                level_at_transition: pet.stats.level,
            }],
        }
    }

    pub fn reset(&mut self, pet: &PetRecord, now_ms: i64) {
        info!("evolution progress reset for {}", pet.name);
        *self = Self::new(pet, now_ms);
    }

    pub fn current_stage_id(&self) -> StageId {
        self.current_stage_id
    }

    pub fn last_evolution_ms(&self) -> i64 {
        self.last_evolution_ms
    }

    pub fn history(&self) -> &[EvolutionEvent] {
        &self.history
    }

    /// Whether the history reads as one unbroken chain that starts from
    /// `none` and ends at the current stage.
    pub fn is_consistent(&self) -> bool {
        let Some((first, rest)) = self.history.split_first() else {
            return false;
        };
        if first.from_stage_id.is_some() {
            return false;
        }
        let mut at = first.to_stage_id;
        for event in rest {
            if event.from_stage_id != Some(at) {
                return false;
            }
            at = event.to_stage_id;
        }
        at == self.current_stage_id
    }
}

pub fn current_stage(progress: &EvolutionProgress) -> &'static EvolutionStage {
    stage(progress.current_stage_id)
}

/// The stage after the current one, or `None` at the end of the ladder.
pub fn next_stage(progress: &EvolutionProgress) -> Option<&'static EvolutionStage> {
    STAGES.get(progress.current_stage_id.index() + 1)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelCheck {
    pub required: u8,
    pub actual: u8,
    pub met: bool,
    pub deficit: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatCheck {
    pub required: f32,
    pub actual: f32,
    pub met: bool,
    /// How much is still missing, never negative.
    pub deficit: f32,
}

impl StatCheck {
    fn new(required: f32, actual: f32) -> Self {
        Self {
            required,
            actual,
            met: actual >= required,
            deficit: (required - actual).max(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvolutionRequirements {
    pub level: LevelCheck,
    pub happiness: StatCheck,
    pub energy: StatCheck,
    pub health: StatCheck,
    pub can_evolve: bool,
}

pub fn check_requirements(pet: &PetRecord, target: &EvolutionStage) -> EvolutionRequirements {
    let s = &pet.stats;
    let level = LevelCheck {
        required: target.required_level,
        actual: s.level,
        met: s.level >= target.required_level,
        deficit: target.required_level.saturating_sub(s.level),
    };
    let happiness = StatCheck::new(target.required_stats.happiness, s.happiness);
    let energy = StatCheck::new(target.required_stats.energy, s.energy);
    let health = StatCheck::new(target.required_stats.health, s.health());

    EvolutionRequirements {
        can_evolve: level.met && happiness.met && energy.met && health.met,
        level,
        happiness,
        energy,
        health,
    }
}

fn percent_of(actual: f32, required: f32) -> f32 {
    if required <= 0.0 {
        return 100.0;
    }
    (actual / required * 100.0).clamp(0.0, 100.0)
}

/// Percent progress toward the next stage, gated by the weakest dimension.
/// Always 100 at the final stage.
pub fn progress_fraction(pet: &PetRecord, progress: &EvolutionProgress) -> u8 {
    let Some(next) = next_stage(progress) else {
        return 100;
    };
    let s = &pet.stats;
    let req = &next.required_stats;
    let worst = [
        percent_of(f32::from(s.level), f32::from(next.required_level)),
        percent_of(s.happiness, req.happiness),
        percent_of(s.energy, req.energy),
        percent_of(s.health(), req.health),
    ]
    .into_iter()
    .fold(100.0_f32, f32::min);

    worst.round() as u8
}

#[derive(Clone, Debug, PartialEq)]
pub struct Evolution {
    pub pet: PetRecord,
    pub progress: EvolutionProgress,
    /// `Some` only when the pet actually moved up a stage.
    pub event: Option<EvolutionEvent>,
}

/// Move the pet one stage forward if every requirement holds.
pub fn evolve(pet: &PetRecord, progress: &EvolutionProgress, now_ms: i64) -> Evolution {
    let unchanged = || Evolution {
        pet: pet.clone(),
        progress: progress.clone(),
        event: None,
    };

    let Some(next) = next_stage(progress) else {
        return unchanged();
    };
    if !check_requirements(pet, next).can_evolve {
        return unchanged();
    }

    let mut evolved = pet.clone();
    evolved
        .stats
        .adjust(next.bonuses.happiness, -next.bonuses.health, next.bonuses.energy);
    evolved.refresh_expression();

    let event = EvolutionEvent {
        from_stage_id: Some(progress.current_stage_id),
        to_stage_id: next.id,
        timestamp_ms: now_ms,
        level_at_transition: pet.stats.level,
    };

    let mut advanced = progress.clone();
    advanced.current_stage_id = next.id;
    advanced.last_evolution_ms = now_ms;
    advanced.history.push(event);

    info!(
        "{} evolved {} -> {} at level {}",
        pet.name, progress.current_stage_id, next.id, pet.stats.level
    );

    Evolution {
        pet: evolved,
        progress: advanced,
        event: Some(event),
    }
}

mod stage_or_none {
    use super::StageId;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NONE: &str = "none";

    pub(super) fn serialize<S: Serializer>(v: &Option<StageId>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(v.map_or(NONE, StageId::as_str))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<StageId>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw == NONE {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(de::Error::custom)
    }
}
