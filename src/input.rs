use crate::model::Scene;
use crate::sim::{CareAction, PlayerAction};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

const MAX_EVENTS_PER_FRAME: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub key: KeyCode,
    pub mods: KeyModifiers,
}

impl InputEvent {
    pub fn key(key: KeyCode) -> Self {
        Self {
            key,
            mods: KeyModifiers::NONE,
        }
    }
}

/// Drain pending key presses without blocking the frame.
pub fn collect_input_nonblocking(max_wait: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();
    let timeout = max_wait.min(Duration::from_millis(1));
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if matches!(k.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= MAX_EVENTS_PER_FRAME {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub fn map_event_to_action(scene: &Scene, ev: InputEvent) -> Option<PlayerAction> {
    if *scene == Scene::Rename {
        return match ev.key {
            KeyCode::Enter => Some(PlayerAction::RenameCommit),
            KeyCode::Esc => Some(PlayerAction::RenameCancel),
            KeyCode::Backspace => Some(PlayerAction::RenameBackspace),
            KeyCode::Char(ch) if !ch.is_control() => Some(PlayerAction::RenameChar(ch)),
            _ => None,
        };
    }
    if ev.key == KeyCode::Char('c') && ev.mods.contains(KeyModifiers::CONTROL) {
        return Some(PlayerAction::Quit);
    }
    if matches!(scene, Scene::Away(_)) {
        return match ev.key {
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(PlayerAction::Quit),
            _ => None,
        };
    }
    let key = match ev.key {
        KeyCode::Char(ch) => KeyCode::Char(ch.to_ascii_lowercase()),
        other => other,
    };
    match key {
        KeyCode::Char('h') => return Some(PlayerAction::HelpToggle),
        KeyCode::Char('q') => return Some(PlayerAction::Quit),
        KeyCode::Esc => return Some(PlayerAction::Back),
        _ => {}
    }

    match scene {
        Scene::Main => match key {
            KeyCode::Char('f') => Some(PlayerAction::Care(CareAction::Feed)),
            KeyCode::Char('p') => Some(PlayerAction::Care(CareAction::Play)),
            KeyCode::Char('r') => Some(PlayerAction::Care(CareAction::Rest)),
            KeyCode::Char('t') => Some(PlayerAction::Talk),
            KeyCode::Char('e') => Some(PlayerAction::Evolve),
            KeyCode::Tab => Some(PlayerAction::SettingsOpen),
            _ => None,
        },
        Scene::Settings => match key {
            KeyCode::Up => Some(PlayerAction::SettingsMove(-1)),
            KeyCode::Down => Some(PlayerAction::SettingsMove(1)),
            KeyCode::Enter => Some(PlayerAction::SettingsSelect),
            KeyCode::Tab => Some(PlayerAction::Back),
            _ => None,
        },
        Scene::Help | Scene::Rename | Scene::Away(_) => None,
    }
}
