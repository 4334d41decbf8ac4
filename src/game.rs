use crate::config::SCORE_TO_WIN;
use crate::entity::{Ball, Paddle, Side};
use crate::input::{HeldKeys, Input};
use crate::physics::{check_score, resolve_paddle_collisions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// What the overlay should show. Win takes precedence over pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    Won(Side),
}

/// One game session: both paddles, the ball, the score and control flags.
///
/// Serves draw from the injected random source, so a seeded generator
/// makes a whole session reproducible.
pub struct Game<R: Rng = StdRng> {
    pub left: Paddle,
    pub right: Paddle,
    pub ball: Ball,
    pub score_left: u32,
    pub score_right: u32,
    pub paused: bool,
    pub running: bool,
    rng: R,
}

impl Game<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    /// Starts a session with centered paddles and the ball already served.
    pub fn new(mut rng: R) -> Self {
        let ball = Ball::new(&mut rng);
        Self {
            left: Paddle::for_side(Side::Left),
            right: Paddle::for_side(Side::Right),
            ball,
            score_left: 0,
            score_right: 0,
            paused: false,
            running: true,
            rng,
        }
    }

    /// Runs one frame of simulation: discrete events, then paddle movement,
    /// then (unless paused) ball physics and scoring.
    pub fn tick(&mut self, events: &[Input], held: HeldKeys) {
        for &event in events {
            self.handle_input(event);
        }
        self.apply_held_keys(held);
        self.update();
    }

    pub fn handle_input(&mut self, input: Input) {
        match input {
            Input::Quit => {
                info!("quit requested");
                self.running = false;
            }
            Input::TogglePause => {
                self.paused = !self.paused;
                debug!(paused = self.paused, "pause toggled");
            }
            Input::Restart => {
                debug!("ball restarted");
                self.serve();
            }
        }
    }

    /// Paddles respond even while paused.
    pub fn apply_held_keys(&mut self, held: HeldKeys) {
        if held.left_up {
            self.left.move_by(-self.left.speed);
        }
        if held.left_down {
            self.left.move_by(self.left.speed);
        }
        if held.right_up {
            self.right.move_by(-self.right.speed);
        }
        if held.right_down {
            self.right.move_by(self.right.speed);
        }
    }

    /// Advances the ball and resolves hits and points. Does nothing while paused.
    pub fn update(&mut self) {
        if self.paused {
            return;
        }

        self.ball.update();
        if let Some(side) = resolve_paddle_collisions(&mut self.ball, &self.left, &self.right) {
            debug!(paddle = side.name(), vx = self.ball.vx, vy = self.ball.vy, "paddle hit");
        }

        if let Some(scorer) = check_score(&self.ball) {
            self.award_point(scorer);
        }
    }

    pub fn award_point(&mut self, scorer: Side) {
        match scorer {
            Side::Left => self.score_left += 1,
            Side::Right => self.score_right += 1,
        }
        info!(
            scorer = scorer.name(),
            left = self.score_left,
            right = self.score_right,
            "point scored"
        );
        if let Some(winner) = self.winner() {
            info!(winner = winner.name(), "match won");
        }
        self.serve();
    }

    pub fn serve(&mut self) {
        self.ball.reset(true, &mut self.rng);
    }

    /// The winning side once either score reaches the target.
    pub fn winner(&self) -> Option<Side> {
        if self.score_left < SCORE_TO_WIN && self.score_right < SCORE_TO_WIN {
            return None;
        }
        if self.score_left > self.score_right {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    pub fn state(&self) -> GameState {
        match self.winner() {
            Some(side) => GameState::Won(side),
            None if self.paused => GameState::Paused,
            None => GameState::Playing,
        }
    }
}
