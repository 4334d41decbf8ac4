use crate::config::{Rgb, BACKGROUND, TITLE, WIN_H, WIN_W};
use crate::entity::Rect;
use crate::error::PongError;
use crate::input::{HeldKeys, HoldTimeout, Input, Key, KeyTracker, RepeatFilter};
use crate::renderer::Renderer;
use crate::scene::{DrawCommand, Scene, TextAnchor};
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Smallest terminal the playfield is still recognizable on.
pub const MIN_COLS: u16 = 40;
pub const MIN_ROWS: u16 = 12;

/// How long a key counts as held when the terminal can't report releases.
/// A fresh press has to outlast the OS delay before auto-repeat starts
/// (250 to 660 ms), each repeat only the gap to the next one.
const HOLD_FALLBACK: HoldTimeout = HoldTimeout {
    initial_ms: 600.0,
    repeat_ms: 120.0,
};

/// Each character cell shows two stacked samples: the glyph's foreground
/// paints the top half, the background the bottom half.
const HALF_BLOCK: char = '▀';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

/// The playfield scaled down onto a grid of terminal cells.
pub struct Raster {
    cols: u16,
    rows: u16,
    /// `cols` x `rows * 2` samples, row-major
    samples: Vec<Rgb>,
    labels: Vec<(u16, u16, String, Rgb)>,
}

impl Raster {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            samples: vec![BACKGROUND; cols as usize * rows as usize * 2],
            labels: Vec::new(),
        }
    }

    pub fn draw(&mut self, scene: &Scene) {
        for command in &scene.commands {
            match command {
                DrawCommand::Clear(color) => {
                    self.samples.fill(*color);
                    self.labels.clear();
                }
                DrawCommand::FillRect { rect, color } => self.fill(rect, *color),
                // Corners are far below one cell at terminal resolution
                DrawCommand::FillRoundRect { rect, color, .. } => self.fill(rect, *color),
                DrawCommand::Text {
                    text,
                    anchor,
                    color,
                } => self.label(text, *anchor, *color),
            }
        }
    }

    /// Paints every sample whose area the rectangle touches, so thin shapes
    /// like the center dashes never vanish.
    fn fill(&mut self, rect: &Rect, color: Rgb) {
        let sample_rows = self.rows as i32 * 2;
        let (c0, c1) = span(rect.left(), rect.right(), WIN_W, self.cols as i32);
        let (r0, r1) = span(rect.top(), rect.bottom(), WIN_H, sample_rows);
        for r in r0..r1 {
            for c in c0..c1 {
                self.samples[r as usize * self.cols as usize + c as usize] = color;
            }
        }
    }

    fn label(&mut self, text: &str, anchor: TextAnchor, color: Rgb) {
        if self.rows == 0 {
            return;
        }
        let row = match anchor {
            TextAnchor::Top(y) => (y * self.rows as i32 / WIN_H) as u16,
            TextAnchor::Middle => self.rows / 2,
        };
        let width = text.chars().count() as u16;
        let col = self.cols.saturating_sub(width) / 2;
        self.labels.push((row.min(self.rows - 1), col, text.to_string(), color));
    }

    fn sample(&self, col: u16, sample_row: u16) -> Rgb {
        self.samples[sample_row as usize * self.cols as usize + col as usize]
    }

    /// Rows of terminal cells, labels printed over the graphics.
    pub fn cells(&self) -> Vec<Vec<Cell>> {
        let mut grid: Vec<Vec<Cell>> = (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| Cell {
                        ch: HALF_BLOCK,
                        fg: self.sample(col, row * 2),
                        bg: self.sample(col, row * 2 + 1),
                    })
                    .collect()
            })
            .collect();

        for (row, col, text, color) in &self.labels {
            let line = &mut grid[*row as usize];
            for (i, ch) in text.chars().enumerate() {
                let Some(cell) = line.get_mut(*col as usize + i) else {
                    break;
                };
                *cell = Cell {
                    ch,
                    fg: *color,
                    bg: cell.bg,
                };
            }
        }
        grid
    }
}

/// Cell range `[start, end)` covered by `[lo, hi)` in field units.
fn span(lo: i32, hi: i32, field: i32, cells: i32) -> (i32, i32) {
    let start = (lo * cells).div_euclid(field);
    let end = (hi * cells + field - 1).div_euclid(field);
    (start.clamp(0, cells), end.clamp(0, cells))
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

fn movement_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::W),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Key::S),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        _ => None,
    }
}

fn discrete_input(code: KeyCode, modifiers: KeyModifiers) -> Option<Input> {
    match code {
        KeyCode::Esc => Some(Input::Quit),
        // Raw mode swallows SIGINT; treat Ctrl+C as closing the window
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Quit),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Input::TogglePause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::Restart),
        _ => None,
    }
}

pub struct CliRenderer {
    started: Instant,
    keys: KeyTracker,
    /// Set when auto-repeats arrive as plain presses
    repeats: Option<RepeatFilter>,
    reports_releases: bool,
    active: bool,
    last_size: (u16, u16),
}

impl CliRenderer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            keys: KeyTracker::new(),
            repeats: None,
            reports_releases: false,
            active: false,
            last_size: (0, 0),
        }
    }

    /// Checks the terminal and takes it over. Any failure means the game
    /// has nowhere to draw.
    pub fn open(&mut self) -> crate::error::Result<()> {
        let (cols, rows) = terminal::size().map_err(PongError::Display)?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            return Err(PongError::TerminalTooSmall {
                cols,
                rows,
                min_cols: MIN_COLS,
                min_rows: MIN_ROWS,
            });
        }
        self.init().map_err(PongError::Display)
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn use_key_reports(&mut self, reports_releases: bool) {
        self.reports_releases = reports_releases;
        if reports_releases {
            self.keys = KeyTracker::new();
            self.repeats = None;
        } else {
            self.keys = KeyTracker::with_hold_timeout(HOLD_FALLBACK);
            self.repeats = Some(RepeatFilter::new(HOLD_FALLBACK));
        }
    }

    fn handle_event(&mut self, event: Event, now_ms: f64, events: &mut Vec<Input>) {
        match event {
            Event::Key(key) => self.handle_key(key, now_ms, events),
            // Releases that happen while unfocused never arrive
            Event::FocusLost => self.keys.release_all(),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now_ms: f64, events: &mut Vec<Input>) {
        let KeyEvent {
            code,
            modifiers,
            kind,
            ..
        } = key;

        if let Some(movement) = movement_key(code) {
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => self.keys.press(movement, now_ms),
                KeyEventKind::Release => self.keys.release(movement),
            }
            return;
        }

        if kind != KeyEventKind::Press {
            return;
        }
        let Some(input) = discrete_input(code, modifiers) else {
            return;
        };
        if let Some(filter) = &mut self.repeats {
            if !filter.accept(input, now_ms) {
                return;
            }
        }
        events.push(input);
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            terminal::SetTitle(TITLE),
            cursor::Hide,
            EnableFocusChange
        )?;

        let reports_releases = terminal::supports_keyboard_enhancement().unwrap_or(false);
        self.use_key_reports(reports_releases);
        if reports_releases {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        } else {
            warn!("terminal does not report key releases; keys use a hold timeout");
        }

        info!(reports_releases = self.reports_releases, "terminal display opened");
        Ok(())
    }

    fn render(&mut self, scene: &Scene) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let mut stdout = io::stdout();

        if (cols, rows) != self.last_size {
            queue!(stdout, terminal::Clear(ClearType::All))?;
            self.last_size = (cols, rows);
        }

        let mut raster = Raster::new(cols, rows);
        raster.draw(scene);

        let mut colors: Option<(Rgb, Rgb)> = None;
        for (row, line) in raster.cells().iter().enumerate() {
            queue!(stdout, cursor::MoveTo(0, row as u16))?;
            for cell in line {
                if colors != Some((cell.fg, cell.bg)) {
                    queue!(
                        stdout,
                        SetForegroundColor(to_color(cell.fg)),
                        SetBackgroundColor(to_color(cell.bg))
                    )?;
                    colors = Some((cell.fg, cell.bg));
                }
                queue!(stdout, Print(cell.ch))?;
            }
        }
        queue!(stdout, ResetColor)?;

        stdout.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();
        if self.reports_releases {
            execute!(stdout, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            stdout,
            DisableFocusChange,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        info!("terminal display closed");
        Ok(())
    }

    fn poll_events(&mut self) -> io::Result<Vec<Input>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            let event = event::read()?;
            let now = self.now_ms();
            self.handle_event(event, now, &mut events);
        }
        Ok(events)
    }

    fn held_keys(&self) -> HeldKeys {
        self.keys.held(self.now_ms())
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACCENT, FOREGROUND};
    use crate::game::Game;

    #[test]
    fn test_span_covers_partial_cells() {
        // 900 px over 90 cells: 10 px per cell
        assert_eq!(span(448, 452, 900, 90), (44, 46));
        assert_eq!(span(0, 10, 900, 90), (0, 1));
        assert_eq!(span(-20, 5, 900, 90), (0, 1));
        assert_eq!(span(895, 920, 900, 90), (89, 90));
    }

    #[test]
    fn test_dashes_survive_downscaling() {
        let mut raster = Raster::new(MIN_COLS, MIN_ROWS);
        let game = Game::seeded(2);
        raster.draw(&Scene::compose(&game));

        let center = MIN_COLS / 2 - 1;
        let cells = raster.cells();
        // The bottom row's upper half holds the dash at y 504
        assert_eq!(cells[MIN_ROWS as usize - 1][center as usize].fg, ACCENT);
        assert!(cells
            .iter()
            .any(|line| line[center as usize].fg == ACCENT || line[center as usize].bg == ACCENT));
    }

    #[test]
    fn test_paddles_are_painted() {
        let mut raster = Raster::new(90, 27);
        let game = Game::seeded(2);
        raster.draw(&Scene::compose(&game));

        // Left paddle spans x 30..42 and y 215..325: columns 3..5, samples 21..33
        let cells = raster.cells();
        assert_eq!(cells[12][3].fg, FOREGROUND);
        assert_eq!(cells[12][4].bg, FOREGROUND);
        assert_eq!(cells[0][3].fg, BACKGROUND);
    }

    #[test]
    fn test_score_label_is_centered() {
        let mut raster = Raster::new(41, 20);
        let mut game = Game::seeded(2);
        game.score_left = 7;
        game.score_right = 2;
        raster.draw(&Scene::compose(&game));

        let cells = raster.cells();
        let line: String = cells[0].iter().map(|c| c.ch).collect();
        assert_eq!(&line[..], &format!("{}7   2{}", "▀".repeat(18), "▀".repeat(18)));
        assert_eq!(cells[0][18].fg, FOREGROUND);
    }

    #[test]
    fn test_pause_label_on_middle_row() {
        let mut raster = Raster::new(60, 20);
        let mut game = Game::seeded(2);
        game.paused = true;
        raster.draw(&Scene::compose(&game));

        let line: String = raster.cells()[10].iter().map(|c| c.ch).collect();
        assert!(line.contains("PAUSED (P)"));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(movement_key(KeyCode::Char('W')), Some(Key::W));
        assert_eq!(movement_key(KeyCode::Down), Some(Key::Down));
        assert_eq!(movement_key(KeyCode::Char('p')), None);
        assert_eq!(
            discrete_input(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Input::Quit)
        );
        assert_eq!(discrete_input(KeyCode::Char('c'), KeyModifiers::NONE), None);
        assert_eq!(
            discrete_input(KeyCode::Char('R'), KeyModifiers::SHIFT),
            Some(Input::Restart)
        );
        assert_eq!(discrete_input(KeyCode::Esc, KeyModifiers::NONE), Some(Input::Quit));
    }

    #[test]
    fn test_repeat_does_not_retrigger_pause() {
        let mut renderer = CliRenderer::new();
        let mut events = Vec::new();
        let mut press = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE);
        renderer.handle_key(press, 0.0, &mut events);
        press.kind = KeyEventKind::Repeat;
        renderer.handle_key(press, 500.0, &mut events);
        assert_eq!(events, vec![Input::TogglePause]);
    }

    #[test]
    fn test_fallback_drops_repeats_sent_as_presses() {
        let mut renderer = CliRenderer::new();
        renderer.use_key_reports(false);
        let mut events = Vec::new();
        let press = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE);

        // Held P: first press, then auto-repeats every 33 ms from 500 ms
        renderer.handle_key(press, 0.0, &mut events);
        for i in 0..15 {
            renderer.handle_key(press, 500.0 + f64::from(i) * 33.0, &mut events);
        }
        assert_eq!(events, vec![Input::TogglePause]);

        // Released and pressed again later
        renderer.handle_key(press, 2_000.0, &mut events);
        assert_eq!(events, vec![Input::TogglePause, Input::TogglePause]);
    }

    #[test]
    fn test_fallback_holds_through_repeat_delay() {
        let mut renderer = CliRenderer::new();
        renderer.use_key_reports(false);
        let mut events = Vec::new();
        let press = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);

        renderer.handle_key(press, 0.0, &mut events);
        assert!(renderer.keys.held(483.0).left_down);
        renderer.handle_key(press, 500.0, &mut events);
        assert!(renderer.keys.held(600.0).left_down);
        assert!(!renderer.keys.held(621.0).left_down);
    }

    #[test]
    fn test_focus_lost_releases_keys() {
        let mut renderer = CliRenderer::new();
        renderer.use_key_reports(true);
        let mut events = Vec::new();
        let press = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE);
        renderer.handle_event(Event::Key(press), 0.0, &mut events);
        assert!(renderer.keys.held(1_000.0).left_up);

        renderer.handle_event(Event::FocusLost, 10.0, &mut events);
        assert_eq!(renderer.keys.held(1_000.0), HeldKeys::none());
        assert!(events.is_empty());
    }

    #[test]
    fn test_movement_press_and_release() {
        let mut renderer = CliRenderer::new();
        let mut events = Vec::new();
        let mut key = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        renderer.handle_key(key, 0.0, &mut events);
        assert!(renderer.held_keys().right_up);

        key.kind = KeyEventKind::Release;
        renderer.handle_key(key, 5.0, &mut events);
        assert!(!renderer.held_keys().right_up);
        assert!(events.is_empty());
    }
}
