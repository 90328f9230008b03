use crate::chatter::line_for;
use crate::clock::{apply_decay_tick, DecayConfig};
use crate::config::NAME_MAX;
use crate::evolution::{current_stage, evolve, next_stage, progress_fraction};
use crate::expression::Expression;
use crate::model::{AwaySummary, GameState, PetRecord, Reaction, Scene, Toast};
use crate::progression::gain_experience;

pub const REACTION_MS: i64 = 2_000;
pub const TOAST_MS: i64 = 3_000;

pub const SETTINGS_ITEMS: [&str; 6] = [
    "Name",
    "Color",
    "Accessory",
    "Color output",
    "Reset evolution",
    "New pet",
];
/// Terminal colour output lives in `Settings`, so the app handles this row.
pub const COLOR_OUTPUT_ITEM: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CareAction {
    Feed,
    Play,
    Rest,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CareEffect {
    pub happiness: f32,
    pub hunger: f32,
    pub energy: f32,
    pub experience: i64,
    pub reaction: Expression,
}

impl CareAction {
    pub fn effect(self) -> CareEffect {
        match self {
            CareAction::Feed => CareEffect {
                happiness: 5.0,
                hunger: -25.0,
                energy: 0.0,
                experience: 10,
                reaction: Expression::Happy,
            },
            CareAction::Play => CareEffect {
                happiness: 15.0,
                hunger: 10.0,
                energy: -10.0,
                experience: 15,
                reaction: Expression::Excited,
            },
            CareAction::Rest => CareEffect {
                happiness: 0.0,
                hunger: 5.0,
                energy: 30.0,
                experience: 5,
                reaction: Expression::Neutral,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlayerAction {
    Care(CareAction),
    Talk,
    Evolve,
    ResetProgress,
    HelpToggle,
    SettingsOpen,
    SettingsMove(i32),
    SettingsSelect,
    CycleColor,
    CycleAccessory,
    RenameOpen,
    RenameChar(char),
    RenameBackspace,
    RenameCommit,
    RenameCancel,
    Back,
    Quit,
    NewGame,
}

impl GameState {
    /// Reduce one player action into the state.
    ///
    /// Anything that touches stats first folds in the decay owed since the
    /// last update, so an action never overwrites drift it did not see.
    pub fn apply(&mut self, action: PlayerAction, now_ms: i64, decay: &DecayConfig) {
        match action {
            PlayerAction::Care(care) => {
                self.catch_up_decay(now_ms, decay);
                self.care(care, now_ms);
            }
            PlayerAction::Talk => {
                let stage = current_stage(&self.progress).id;
                let line = line_for(self.displayed_expression(now_ms), stage, &mut self.rng);
                self.show_toast(format!("{}: \"{line}\"", self.pet.name), now_ms);
            }
            PlayerAction::Evolve => {
                self.catch_up_decay(now_ms, decay);
                self.try_evolve(now_ms);
            }
            PlayerAction::ResetProgress => {
                self.progress.reset(&self.pet, now_ms);
                self.show_toast("Evolution progress reset.".to_string(), now_ms);
            }
            PlayerAction::HelpToggle => {
                self.scene = match self.scene {
                    Scene::Help => Scene::Main,
                    _ => Scene::Help,
                };
            }
            PlayerAction::SettingsOpen => {
                self.scene = Scene::Settings;
                self.settings_cursor = 0;
            }
            PlayerAction::SettingsMove(delta) => {
                let len = SETTINGS_ITEMS.len() as i32;
                self.settings_cursor = (self.settings_cursor as i32 + delta).rem_euclid(len) as usize;
            }
            PlayerAction::SettingsSelect => {
                let follow_up = match self.settings_cursor {
                    0 => Some(PlayerAction::RenameOpen),
                    1 => Some(PlayerAction::CycleColor),
                    2 => Some(PlayerAction::CycleAccessory),
                    4 => Some(PlayerAction::ResetProgress),
                    5 => Some(PlayerAction::NewGame),
                    _ => None,
                };
                if let Some(next) = follow_up {
                    self.apply(next, now_ms, decay);
                }
            }
            PlayerAction::CycleColor => {
                self.pet.appearance.color = self.pet.appearance.color.next();
            }
            PlayerAction::CycleAccessory => {
                self.pet.appearance.accessory = self.pet.appearance.accessory.next();
            }
            PlayerAction::RenameOpen => {
                self.name_edit = self.pet.name.clone();
                self.scene = Scene::Rename;
            }
            PlayerAction::RenameChar(ch) => {
                if self.name_edit.chars().count() < NAME_MAX {
                    self.name_edit.push(ch);
                }
            }
            PlayerAction::RenameBackspace => {
                self.name_edit.pop();
            }
            PlayerAction::RenameCommit => {
                let trimmed = self.name_edit.trim();
                if !trimmed.is_empty() {
                    self.pet.name = trimmed.to_string();
                }
                self.scene = Scene::Settings;
            }
            PlayerAction::RenameCancel => {
                self.scene = Scene::Settings;
            }
            PlayerAction::Back => self.scene = Scene::Main,
            PlayerAction::Quit => {}
            PlayerAction::NewGame => {
                let seed = self.rng.seed;
                *self = GameState::new(seed, now_ms);
                self.show_toast("A new pet hatched!".to_string(), now_ms);
            }
        }
    }

    /// Commit a record produced by the decay clock.
    pub fn on_decay(&mut self, pet: PetRecord) {
        self.pet = pet;
        self.reaction = None;
    }

    /// What the pet looks like right now: a live reaction, else its mood.
    pub fn displayed_expression(&self, now_ms: i64) -> Expression {
        match self.reaction {
            Some(r) if r.until_ms > now_ms => r.expression,
            _ => self.pet.expression(),
        }
    }

    pub fn expire_transients(&mut self, now_ms: i64) {
        if self.reaction.is_some_and(|r| r.until_ms <= now_ms) {
            self.reaction = None;
        }
        if self.toast.as_ref().is_some_and(|t| t.until_ms <= now_ms) {
            self.toast = None;
        }
    }

    fn show_toast(&mut self, text: String, now_ms: i64) {
        self.toast = Some(Toast {
            text,
            until_ms: now_ms + TOAST_MS,
        });
    }

    fn catch_up_decay(&mut self, now_ms: i64, decay: &DecayConfig) {
        if let Some(next) = apply_decay_tick(&self.pet, decay, now_ms) {
            self.pet = next;
        }
    }

    fn care(&mut self, care: CareAction, now_ms: i64) {
        let effect = care.effect();
        let mut pet = self.pet.clone();
        pet.stats
            .adjust(effect.happiness, effect.hunger, effect.energy);

        let gain = gain_experience(&pet, effect.experience);
        self.pet = gain.pet;
        self.reaction = Some(Reaction {
            expression: effect.reaction,
            until_ms: now_ms + REACTION_MS,
        });
        if gain.leveled_up {
            self.show_toast(
                format!("Level up! {} is now level {}.", self.pet.name, self.pet.stats.level),
                now_ms,
            );
        }
    }

    fn try_evolve(&mut self, now_ms: i64) {
        let outcome = evolve(&self.pet, &self.progress, now_ms);
        match outcome.event {
            Some(event) => {
                self.pet = outcome.pet;
                self.progress = outcome.progress;
                let name = crate::evolution::stage(event.to_stage_id).name;
                self.show_toast(format!("{} evolved into a {name}!", self.pet.name), now_ms);
            }
            None => {
                let text = match next_stage(&self.progress) {
                    Some(next) => format!(
                        "Not ready yet: {}% of the way to {}.",
                        progress_fraction(&self.pet, &self.progress),
                        next.name
                    ),
                    None => format!("{} is fully grown.", self.pet.name),
                };
                self.show_toast(text, now_ms);
            }
        }
    }
}

/// Apply the decay owed since the pet was last updated, e.g. after loading
/// a save. Returns what changed, if decay ran at all.
pub fn catch_up(state: &mut GameState, decay: &DecayConfig, now_ms: i64) -> Option<AwaySummary> {
    let before = state.pet.stats;
    let since = state.pet.last_update_ms;
    let next = apply_decay_tick(&state.pet, decay, now_ms)?;
    let summary = AwaySummary {
        elapsed_minutes: (next.last_update_ms - since).max(0) as f64 / 60_000.0,
        before,
        after: next.stats,
    };
    state.on_decay(next);
    Some(summary)
}
