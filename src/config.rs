//! Gameplay and presentation constants.
//!
//! Everything that shapes how the game plays or looks lives here so it can
//! be tuned in one place.

/// Logical playfield size in pixels.
pub const WIN_W: i32 = 900;
pub const WIN_H: i32 = 540;

pub const FPS: u32 = 60;

pub const PADDLE_W: i32 = 12;
pub const PADDLE_H: i32 = 110;
/// Distance between each paddle and its side wall.
pub const PADDLE_MARGIN: i32 = 30;
/// Paddle travel in pixels per frame while a key is held.
pub const PADDLE_SPEED: f64 = 7.0;

pub const BALL_SIZE: i32 = 14;
/// Horizontal serve speed in pixels per frame.
pub const BALL_SPEED: f64 = 6.0;
/// Serves are at most this fraction of `BALL_SPEED` vertically.
pub const SERVE_SPREAD: f64 = 0.75;
/// Vertical serve speeds below this are replaced by `MIN_SERVE_VY`.
pub const SERVE_VY_THRESHOLD: f64 = 1.0;
pub const MIN_SERVE_VY: f64 = 1.2;

/// Horizontal speed-up applied on every paddle hit.
pub const HIT_SPEEDUP: f64 = 1.03;
/// Vertical speed added per unit of hit offset from the paddle center.
pub const SPIN: f64 = 2.0;

pub const SCORE_TO_WIN: u32 = 10;

pub const TITLE: &str = "Pong — 2 Players";

/// Center line: one `DASH_W`x`DASH_H` bar every `DASH_GAP` pixels.
pub const DASH_W: i32 = 4;
pub const DASH_H: i32 = 10;
pub const DASH_GAP: i32 = 18;

pub const PADDLE_RADIUS: i32 = 4;
pub const BALL_RADIUS: i32 = 3;

/// Top edge of the score line.
pub const SCORE_Y: i32 = 18;
pub const FONT_PX: u32 = 48;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS hex form, e.g. `#232323`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

pub const FOREGROUND: Rgb = Rgb(245, 245, 245);
pub const BACKGROUND: Rgb = Rgb(35, 35, 35);
pub const ACCENT: Rgb = Rgb(120, 120, 120);
