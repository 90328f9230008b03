use crate::clock::{StatClock, SystemClock, TimeSource};
use crate::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action};
use crate::model::{GameState, Scene};
use crate::render::{render_frame, Terminal};
use crate::sim::{catch_up, PlayerAction, COLOR_OUTPUT_ITEM};
use crate::storage::{load_or_init_save, save_atomic, snapshot};
use anyhow::Context;
use log::{info, warn};
use std::time::{Duration, Instant};

const AUTOSAVE_EVERY: Duration = Duration::from_secs(10);

pub struct App {
    settings: Settings,
    state: GameState,
    paths: Paths,
    time: SystemClock,
    clock: StatClock,
    term: Terminal,
    should_quit: bool,
    autosave_at: Instant,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths().context("could not prepare the data directory")?;
        if let Err(e) = crate::logging::init(&paths.log_path) {
            eprintln!("petling: logging disabled: {e:#}");
        }

        let settings = load_settings(&paths.settings_path);
        let time = SystemClock;
        let now = time.now_ms();

        let (mut state, last_seen) = load_or_init_save(&paths.save_path, &settings, now);
        if let Some(last_seen) = last_seen {
            info!("welcome back, last seen {last_seen}");
            if let Some(summary) = catch_up(&mut state, &settings.decay, now) {
                if summary.has_anything() {
                    state.scene = Scene::Away(summary);
                }
            }
        }

        let mut clock = StatClock::new(settings.decay);
        clock.start(now);

        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            state,
            paths,
            time,
            clock,
            term,
            should_quit: false,
            autosave_at: Instant::now() + AUTOSAVE_EVERY,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        while !self.should_quit {
            let frame_start = Instant::now();
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                let now = self.time.now_ms();
                match map_event_to_action(&self.state.scene, ev) {
                    Some(PlayerAction::Quit) => {
                        self.should_quit = true;
                        break;
                    }
                    Some(PlayerAction::SettingsSelect)
                        if self.state.settings_cursor == COLOR_OUTPUT_ITEM =>
                    {
                        self.settings.enable_color = !self.settings.enable_color;
                    }
                    Some(action) => self.state.apply(action, now, &self.settings.decay),
                    None => {
                        if matches!(self.state.scene, Scene::Away(_)) {
                            self.state.scene = Scene::Main;
                        }
                    }
                }
            }

            let now = self.time.now_ms();
            let mut decayed = None;
            self.clock.tick(&self.state.pet, now, |pet| decayed = Some(pet));
            if let Some(pet) = decayed {
                self.state.on_decay(pet);
            }
            self.state.expire_transients(now);

            render_frame(&mut self.term.frame, &self.state, &self.settings, now);
            self.term.present()?;

            if Instant::now() >= self.autosave_at {
                self.save_now();
                self.autosave_at = Instant::now() + AUTOSAVE_EVERY;
            }

            let spent = frame_start.elapsed();
            if spent < frame_dt {
                std::thread::sleep(frame_dt - spent);
            }
        }

        self.clock.stop();
        self.save_now();
        self.term.end()?;
        if let Err(e) = save_settings_atomic(&self.paths.settings_path, &self.settings) {
            warn!("could not save settings: {e}");
        }
        Ok(())
    }

    /// Saving is best effort; the in-memory pet stays authoritative.
    fn save_now(&self) {
        let save = snapshot(&self.state, chrono::Utc::now());
        if let Err(e) = save_atomic(&self.paths.save_path, &save) {
            warn!("autosave failed: {e}");
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    let result = app.run();
    if result.is_err() {
        // leave the terminal usable even when the loop bails out
        let _ = app.term.end();
    }
    result
}
