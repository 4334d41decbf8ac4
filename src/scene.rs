//! Backend-independent description of one frame.
//!
//! A [`Scene`] is an ordered list of draw commands composed from the game
//! state. Backends replay it in order; composing never touches the game.

use crate::config::{
    Rgb, ACCENT, BACKGROUND, BALL_RADIUS, DASH_GAP, DASH_H, DASH_W, FOREGROUND, PADDLE_RADIUS,
    SCORE_Y, WIN_H, WIN_W,
};
use crate::entity::Rect;
use crate::game::{Game, GameState};
use rand::Rng;

/// Where a line of text sits on the playfield. Text is always centered
/// horizontally; backends measure it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Top edge at the given y
    Top(i32),
    /// Centered vertically on the field
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    FillRoundRect {
        rect: Rect,
        radius: i32,
        color: Rgb,
    },
    Text {
        text: String,
        anchor: TextAnchor,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn compose<R: Rng>(game: &Game<R>) -> Self {
        let mut scene = Scene::default();

        scene.push(DrawCommand::Clear(BACKGROUND));
        for rect in center_dashes() {
            scene.push(DrawCommand::FillRect { rect, color: ACCENT });
        }

        for rect in [game.left.rect(), game.right.rect()] {
            scene.push(DrawCommand::FillRoundRect {
                rect,
                radius: PADDLE_RADIUS,
                color: FOREGROUND,
            });
        }
        scene.push(DrawCommand::FillRoundRect {
            rect: game.ball.rect(),
            radius: BALL_RADIUS,
            color: FOREGROUND,
        });

        scene.text(
            format!("{}   {}", game.score_left, game.score_right),
            TextAnchor::Top(SCORE_Y),
        );

        match game.state() {
            GameState::Won(side) => {
                scene.text(format!("{} wins!  (R — restart)", side.name()), TextAnchor::Middle)
            }
            GameState::Paused => scene.text("PAUSED (P)".to_string(), TextAnchor::Middle),
            GameState::Playing => {}
        }

        scene
    }

    /// The overlay message, if one is shown.
    pub fn overlay(&self) -> Option<&str> {
        self.commands.iter().find_map(|cmd| match cmd {
            DrawCommand::Text {
                text,
                anchor: TextAnchor::Middle,
                ..
            } => Some(text.as_str()),
            _ => None,
        })
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn text(&mut self, text: String, anchor: TextAnchor) {
        self.push(DrawCommand::Text {
            text,
            anchor,
            color: FOREGROUND,
        });
    }
}

/// Dashed center line: short bars from the top of the field down.
pub fn center_dashes() -> impl Iterator<Item = Rect> {
    (0..WIN_H)
        .step_by(DASH_GAP as usize)
        .map(|y| Rect::new(WIN_W / 2 - DASH_W / 2, y, DASH_W, DASH_H))
}
