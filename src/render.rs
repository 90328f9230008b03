use crate::config::{Settings, NAME_MAX};
use crate::evolution::{check_requirements, current_stage, next_stage, progress_fraction};
use crate::expression::Expression;
use crate::model::{Accessory, BodyColor, GameState, Scene};
use crate::progression::experience_for_level;
use crate::sim::{COLOR_OUTPUT_ITEM, SETTINGS_ITEMS};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

const BG: Color = Color::Black;
const FG: Color = Color::White;
const HILITE: Color = Color::Yellow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: FG,
            bg: BG,
        }
    }
}

pub struct CellBuffer {
    pub w: u16,
    pub h: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); usize::from(w) * usize::from(h)],
        }
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.w) + usize::from(x)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }

    pub fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

/// Double-buffered alternate-screen terminal; only changed cells are sent.
pub struct Terminal {
    out: io::Stdout,
    pub cols: u16,
    pub rows: u16,
    shown: CellBuffer,
    pub frame: CellBuffer,
}

impl Terminal {
    pub fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            shown: CellBuffer::new(cols, rows),
            frame: CellBuffer::new(cols, rows),
        })
    }

    pub fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn resize_if_needed(&mut self) -> anyhow::Result<()> {
        let (cols, rows) = terminal::size()?;
        if (cols, rows) != (self.cols, self.rows) {
            self.cols = cols;
            self.rows = rows;
            self.shown = CellBuffer::new(cols, rows);
            self.frame = CellBuffer::new(cols, rows);
            queue!(self.out, Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        let mut pen: Option<(Color, Color)> = None;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.frame.idx(x, y);
                let c = self.frame.cells[i];
                if c == self.shown.cells[i] {
                    continue;
                }
                queue!(self.out, cursor::MoveTo(x, y))?;
                if pen != Some((c.fg, c.bg)) {
                    queue!(self.out, SetForegroundColor(c.fg), SetBackgroundColor(c.bg))?;
                    pen = Some((c.fg, c.bg));
                }
                queue!(self.out, Print(c.ch))?;
            }
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.shown.cells.copy_from_slice(&self.frame.cells);
        Ok(())
    }
}

pub fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg: BG });
    }
}

fn bar(value01: f32, width: usize) -> String {
    let fill = (value01.clamp(0.0, 1.0) * width as f32 + 0.5) as usize;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

fn body_color(color: BodyColor, enable_color: bool) -> Color {
    if !enable_color {
        return FG;
    }
    match color {
        BodyColor::Mint => Color::Rgb {
            r: 140,
            g: 240,
            b: 200,
        },
        BodyColor::Peach => Color::Rgb {
            r: 255,
            g: 190,
            b: 150,
        },
        BodyColor::Sky => Color::Rgb {
            r: 150,
            g: 190,
            b: 250,
        },
        BodyColor::Lilac => Color::Rgb {
            r: 200,
            g: 160,
            b: 255,
        },
        BodyColor::Sunny => Color::Rgb {
            r: 250,
            g: 225,
            b: 110,
        },
    }
}

fn face(expression: Expression) -> (&'static str, &'static str) {
    match expression {
        Expression::Happy => ("^ ^", "\\_/"),
        Expression::Neutral => ("o o", "---"),
        Expression::Sad => ("T T", "/-\\"),
        Expression::Excited => ("* *", "\\O/"),
        Expression::Tired => ("- -", "~~~"),
    }
}

fn centered(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.chars().take(width).collect();
    }
    let left = (width - len) / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(width - len - left))
}

/// Build the pet sprite. Taller stages get a taller body.
pub fn pet_sprite(size: u8, expression: Expression, accessory: Accessory) -> Vec<String> {
    let inner = usize::from(size) * 2 + 3;
    let (mut eyes, mouth) = face(expression);
    if accessory == Accessory::Glasses {
        eyes = "O-O";
    }

    let mut rows = Vec::new();
    match accessory {
        Accessory::Bow => rows.push(format!(" {} ", centered(">o<", inner))),
        Accessory::Hat => {
            rows.push(format!(" {} ", centered("___", inner)));
            rows.push(format!(" {} ", centered("_|___|_", inner)));
        }
        _ => {}
    }
    rows.push(format!(" {} ", "_".repeat(inner)));
    rows.push(format!("/{}\\", " ".repeat(inner)));
    rows.push(format!("|{}|", centered(eyes, inner)));
    rows.push(format!("|{}|", centered(mouth, inner)));
    for _ in 3..size {
        rows.push(format!("|{}|", " ".repeat(inner)));
    }
    if accessory == Accessory::Scarf {
        rows.push(format!("|{}|", "~".repeat(inner)));
    }
    rows.push(format!("\\{}/", "_".repeat(inner)));
    rows
}

fn draw_pet(
    buf: &mut CellBuffer,
    st: &GameState,
    settings: &Settings,
    now_ms: i64,
    cx: i32,
    cy: i32,
) {
    let stage = current_stage(&st.progress);
    let sprite = pet_sprite(
        stage.look.size,
        st.displayed_expression(now_ms),
        st.pet.appearance.accessory,
    );
    let fg = body_color(st.pet.appearance.color, settings.enable_color);

    // gentle idle bob
    let bob = if (now_ms / 700) % 2 == 0 { 0 } else { 1 };
    let h = sprite.len() as i32;
    let w = sprite.first().map_or(0, |r| r.chars().count()) as i32;
    let (x0, y0) = (cx - w / 2, cy - h / 2 + bob);

    for (dy, row) in sprite.iter().enumerate() {
        let y = y0 + dy as i32;
        for (dx, ch) in row.chars().enumerate() {
            let x = x0 + dx as i32;
            if ch == ' ' || x < 0 || y < 0 {
                continue;
            }
            buf.set(x as u16, y as u16, Cell { ch, fg, bg: BG });
        }
    }
}

fn status_lines(st: &GameState) -> Vec<String> {
    let s = &st.pet.stats;
    let mut lines = Vec::new();
    for (name, val) in [
        ("Happy ", s.happiness),
        ("Hunger", s.hunger),
        ("Energy", s.energy),
        ("Health", s.health()),
    ] {
        lines.push(format!("{name}: {} {:>5.1}", bar(val / 100.0, 14), val));
    }

    let cost = experience_for_level(s.level);
    lines.push(String::new());
    if cost == 0 {
        lines.push(format!("Level {} (max)", s.level));
    } else {
        lines.push(format!(
            "Level {}  XP {} {}/{}",
            s.level,
            bar(st.pet.experience as f32 / cost as f32, 10),
            st.pet.experience,
            cost
        ));
    }

    let stage = current_stage(&st.progress);
    lines.push(format!("Stage: {} ({})", stage.name, stage.look.title));
    match next_stage(&st.progress) {
        Some(next) => {
            let pct = progress_fraction(&st.pet, &st.progress);
            lines.push(format!(
                "Next: {} {} {pct:>3}%",
                next.name,
                bar(f32::from(pct) / 100.0, 10)
            ));
            let req = check_requirements(&st.pet, next);
            if !req.level.met {
                lines.push(format!("  needs {} more level(s)", req.level.deficit));
            }
            for (name, check) in [
                ("happiness", req.happiness),
                ("energy", req.energy),
                ("health", req.health),
            ] {
                if !check.met {
                    lines.push(format!("  needs +{:.0} {name}", check.deficit.ceil()));
                }
            }
            if req.can_evolve {
                lines.push("  ready! press e to evolve".to_string());
            }
        }
        None => lines.push("Fully grown.".to_string()),
    }
    lines
}

pub fn ui_overlay(buf: &mut CellBuffer, st: &GameState, settings: &Settings, now_ms: i64) {
    let title = format!(
        "Petling  |  {} the {}  |  Mood: {}",
        st.pet.name,
        current_stage(&st.progress).name,
        st.displayed_expression(now_ms)
    );
    draw_text(buf, 1, 0, &title, FG);

    for (i, line) in status_lines(st).iter().enumerate() {
        draw_text(buf, 1, 2 + i as u16, line, FG);
    }

    if let Some(toast) = &st.toast {
        draw_text(buf, 1, buf.h.saturating_sub(3), &toast.text, HILITE);
    }

    let help = match st.scene {
        Scene::Main => {
            "Keys: f feed | p play | r rest | t talk | e evolve | tab settings | h help | q quit"
        }
        Scene::Settings => "Settings: ↑↓ select | enter apply | esc/tab back",
        Scene::Help => "Help: esc back | h close | q quit",
        Scene::Rename => "Rename: type name | enter save | esc cancel",
        Scene::Away(_) => "Any key to continue",
    };
    draw_text(buf, 1, buf.h.saturating_sub(1), help, FG);

    if st.scene == Scene::Settings {
        draw_settings(buf, st, settings);
    }
}

fn draw_settings(buf: &mut CellBuffer, st: &GameState, settings: &Settings) {
    let y0 = 17;
    draw_text(buf, 1, y0, "Settings", FG);
    for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
        let value = match i {
            0 => st.pet.name.clone(),
            1 => st.pet.appearance.color.label().to_string(),
            2 => st.pet.appearance.accessory.label().to_string(),
            COLOR_OUTPUT_ITEM => if settings.enable_color { "On" } else { "Off" }.to_string(),
            _ => String::new(),
        };
        let selected = i == st.settings_cursor;
        let marker = if selected { ">" } else { " " };
        let line = if value.is_empty() {
            format!("{marker} {item}")
        } else {
            format!("{marker} {item}: {value}")
        };
        let fg = if selected { HILITE } else { FG };
        draw_text(buf, 1, y0 + 2 + i as u16, &line, fg);
    }
}

/// Bordered dialog centred on screen.
pub fn draw_box(buf: &mut CellBuffer, title: &str, body: &str) {
    let bw = 60.min(buf.w.saturating_sub(4));
    let bh = 16.min(buf.h.saturating_sub(4));
    if bw < 4 || bh < 4 {
        return;
    }
    let x0 = (buf.w - bw) / 2;
    let y0 = (buf.h - bh) / 2;
    let x1 = x0 + bw - 1;
    let y1 = y0 + bh - 1;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let ch = match (x, y) {
                _ if x == x0 && y == y0 => '┌',
                _ if x == x1 && y == y0 => '┐',
                _ if x == x0 && y == y1 => '└',
                _ if x == x1 && y == y1 => '┘',
                _ if y == y0 || y == y1 => '─',
                _ if x == x0 || x == x1 => '│',
                _ => ' ',
            };
            buf.set(x, y, Cell { ch, fg: FG, bg: BG });
        }
    }

    draw_text(buf, x0 + 2, y0 + 1, title, HILITE);
    for (i, line) in body.lines().enumerate() {
        let y = y0 + 3 + i as u16;
        if y >= y1 {
            break;
        }
        let clipped: String = line.chars().take(usize::from(bw - 4)).collect();
        draw_text(buf, x0 + 2, y, &clipped, FG);
    }
}

pub fn render_frame(buf: &mut CellBuffer, st: &GameState, settings: &Settings, now_ms: i64) {
    buf.clear();

    let panel_w = 46.max(i32::from(buf.w) / 3).min(i32::from(buf.w) - 10);
    let pet_w = i32::from(buf.w) - panel_w;
    draw_pet(buf, st, settings, now_ms, panel_w + pet_w / 2, i32::from(buf.h) / 2);

    ui_overlay(buf, st, settings, now_ms);

    match &st.scene {
        Scene::Help => draw_box(
            buf,
            "How to play",
            "Keep your pet fed, rested and entertained.\n\
             Stats drift on their own while time passes.\n\n\
             F Feed: less hungry, a little happier.\n\
             P Play: much happier, costs energy.\n\
             R Rest: recover energy.\n\
             T Talk: hear what your pet has to say.\n\
             E Evolve: grow up once level and stats allow.\n\n\
             Every action earns experience; levels add bonuses.\n\
             Tab opens settings (name, color, accessory).",
        ),
        Scene::Rename => {
            let mut preview = st.name_edit.clone();
            if preview.chars().count() < NAME_MAX {
                preview.push('_');
            }
            draw_box(
                buf,
                "Rename pet",
                &format!(
                    "Type a name (max {NAME_MAX} chars).\n\nName: {preview}\n\nEnter save | Esc cancel"
                ),
            );
        }
        Scene::Away(s) => draw_box(
            buf,
            "While you were away…",
            &format!(
                "{:.0} minutes passed.\n\nHappiness: {:.1} -> {:.1}\nHunger:    {:.1} -> {:.1}\nEnergy:    {:.1} -> {:.1}\n\nPress any key",
                s.elapsed_minutes,
                s.before.happiness,
                s.after.happiness,
                s.before.hunger,
                s.after.hunger,
                s.before.energy,
                s.after.energy
            ),
        ),
        Scene::Main | Scene::Settings => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &CellBuffer, y: u16) -> String {
        (0..buf.w).filter_map(|x| buf.get(x, y)).map(|c| c.ch).collect()
    }

    #[test]
    fn sprite_grows_with_stage_size() {
        let small = pet_sprite(3, Expression::Happy, Accessory::None);
        let big = pet_sprite(6, Expression::Happy, Accessory::None);
        assert!(big.len() > small.len());
        let width = small[0].chars().count();
        assert!(small.iter().all(|r| r.chars().count() == width));
    }

    #[test]
    fn sprite_shows_face_and_accessory() {
        let rows = pet_sprite(4, Expression::Sad, Accessory::Hat);
        assert!(rows.iter().any(|r| r.contains("T T")));
        assert!(rows[1].contains("_|___|_"));

        let rows = pet_sprite(4, Expression::Sad, Accessory::Glasses);
        assert!(rows.iter().any(|r| r.contains("O-O")));
    }

    #[test]
    fn text_is_clipped_to_buffer() {
        let mut buf = CellBuffer::new(5, 1);
        draw_text(&mut buf, 2, 0, "hello", FG);
        assert_eq!(row_text(&buf, 0), "  hel");
    }

    #[test]
    fn frame_renders_name_and_stage() {
        let st = GameState::new(1, 0);
        let mut buf = CellBuffer::new(100, 30);
        render_frame(&mut buf, &st, &Settings::default(), 0);
        let title = row_text(&buf, 0);
        assert!(title.contains("Pip the Baby"));
        assert!(title.contains("Mood: happy"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let st = GameState::new(1, 0);
        let mut buf = CellBuffer::new(3, 2);
        render_frame(&mut buf, &st, &Settings::default(), 0);
    }
}
