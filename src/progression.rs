use crate::model::{PetRecord, MAX_LEVEL, MIN_LEVEL};
use log::info;

pub const LEVEL_UP_HAPPINESS_BONUS: f32 = 5.0;
pub const LEVEL_UP_ENERGY_BONUS: f32 = 3.0;

/// Experience needed to advance from `level` to `level + 1`.
///
/// Zero at the level cap and for anything outside `1..=10`.
pub fn experience_for_level(level: u8) -> u32 {
    match level {
        MIN_LEVEL..=9 => 100 + 50 * (u32::from(level) - 1),
        _ => 0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelResolution {
    pub level: u8,
    pub experience: u32,
    pub levels_gained: u8,
    pub happiness_bonus: f32,
    pub energy_bonus: f32,
}

/// Fold an experience gain into `(level, experience)`, crossing as many
/// levels as the total pays for. Negative gains count as zero.
pub fn resolve_levels(experience: u32, level: u8, amount: i64) -> LevelResolution {
    let start = level.clamp(MIN_LEVEL, MAX_LEVEL);
    let mut level = start;
    let mut total = u64::from(experience) + amount.max(0).unsigned_abs();

    while level < MAX_LEVEL {
        let cost = u64::from(experience_for_level(level));
        if total < cost {
            break;
        }
        total -= cost;
        level += 1;
    }

    let levels_gained = level - start;
    let experience = if level == MAX_LEVEL {
        0
    } else {
        u32::try_from(total).unwrap_or(u32::MAX)
    };

    LevelResolution {
        level,
        experience,
        levels_gained,
        happiness_bonus: LEVEL_UP_HAPPINESS_BONUS * f32::from(levels_gained),
        energy_bonus: LEVEL_UP_ENERGY_BONUS * f32::from(levels_gained),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceGain {
    pub pet: PetRecord,
    pub leveled_up: bool,
    pub levels_gained: u8,
}

/// Apply an experience gain to a pet, returning the new record.
///
/// A zero gain still returns a fresh record so callers can treat every
/// action uniformly. `last_update_ms` is left alone: only decay moves it.
pub fn gain_experience(pet: &PetRecord, amount: i64) -> ExperienceGain {
    let resolved = resolve_levels(pet.experience, pet.stats.level, amount);

    let mut next = pet.clone();
    next.stats.level = resolved.level;
    next.experience = resolved.experience;
    next.stats
        .adjust(resolved.happiness_bonus, 0.0, resolved.energy_bonus);
    next.refresh_expression();

    if resolved.levels_gained > 0 {
        info!(
            "{} gained {} level(s), now level {}",
            next.name, resolved.levels_gained, resolved.level
        );
    }

    ExperienceGain {
        pet: next,
        leveled_up: resolved.levels_gained > 0,
        levels_gained: resolved.levels_gained,
    }
}

/// Fraction of the way to the next level, in `[0, 1]`. Always 1 at the cap.
pub fn level_progress(pet: &PetRecord) -> f32 {
    let cost = experience_for_level(pet.stats.level);
    if cost == 0 {
        return 1.0;
    }
    (pet.experience as f32 / cost as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stats;

    #[test]
    fn cost_table() {
        assert_eq!(experience_for_level(1), 100);
        assert_eq!(experience_for_level(2), 150);
        assert_eq!(experience_for_level(3), 200);
        assert_eq!(experience_for_level(9), 500);
        assert_eq!(experience_for_level(10), 0);
        assert_eq!(experience_for_level(0), 0);
        assert_eq!(experience_for_level(11), 0);
    }

    #[test]
    fn gain_below_threshold_accumulates() {
        let r = resolve_levels(40, 1, 50);
        assert_eq!((r.level, r.experience, r.levels_gained), (1, 90, 0));
        assert_eq!(r.happiness_bonus, 0.0);
    }

    #[test]
    fn exact_threshold_levels_up_with_no_remainder() {
        let r = resolve_levels(0, 1, 100);
        assert_eq!((r.level, r.experience, r.levels_gained), (2, 0, 1));
    }

    #[test]
    fn multi_level_bonuses_accumulate() {
        let r = resolve_levels(0, 1, 350);
        assert_eq!((r.level, r.experience, r.levels_gained), (3, 100, 2));
        assert_eq!(r.happiness_bonus, 10.0);
        assert_eq!(r.energy_bonus, 6.0);
    }

    #[test]
    fn negative_gain_is_ignored() {
        let r = resolve_levels(70, 4, -500);
        assert_eq!((r.level, r.experience, r.levels_gained), (4, 70, 0));
    }

    #[test]
    fn cap_discards_remainder() {
        let r = resolve_levels(0, 9, 10_000);
        assert_eq!((r.level, r.experience, r.levels_gained), (10, 0, 1));
        let r = resolve_levels(0, 10, 1);
        assert_eq!((r.level, r.experience, r.levels_gained), (10, 0, 0));
    }

    #[test]
    fn huge_gain_from_level_one_reaches_cap() {
        let r = resolve_levels(0, 1, i64::MAX);
        assert_eq!((r.level, r.experience, r.levels_gained), (10, 0, 9));
    }

    #[test]
    fn gain_experience_applies_clamped_bonuses() {
        let pet = PetRecord::new("Pip", 0).with_stats(Stats {
            happiness: 97.0,
            hunger: 30.0,
            energy: 50.0,
            level: 1,
        });
        let out = gain_experience(&pet, 350);
        assert!(out.leveled_up);
        assert_eq!(out.levels_gained, 2);
        assert_eq!(out.pet.stats.happiness, 100.0);
        assert_eq!(out.pet.stats.energy, 56.0);
        assert_eq!(out.pet.stats.hunger, 30.0);
        assert_eq!(out.pet.last_update_ms, pet.last_update_ms);
    }

    #[test]
    fn zero_gain_still_returns_record() {
        let pet = PetRecord::new("Pip", 0);
        let out = gain_experience(&pet, 0);
        assert!(!out.leveled_up);
        assert_eq!(out.pet, pet);
    }

    #[test]
    fn level_progress_fraction() {
        let mut pet = PetRecord::new("Pip", 0);
        pet.experience = 50;
        assert_eq!(level_progress(&pet), 0.5);
        pet.stats.level = 10;
        assert_eq!(level_progress(&pet), 1.0);
    }
}
