//! Paddle bounces and scoring.

use crate::config::{BALL_SIZE, HIT_SPEEDUP, PADDLE_H, SPIN, WIN_W};
use crate::entity::{Ball, Paddle, Side};

/// Bounces the ball off whichever paddle it overlaps while moving toward it.
///
/// A hit reverses the horizontal direction with a small speed-up and adds
/// spin proportional to how far from the paddle's center the ball struck.
/// Returns the side whose paddle was hit, if any.
pub fn resolve_paddle_collisions(ball: &mut Ball, left: &Paddle, right: &Paddle) -> Option<Side> {
    let mut hit = None;

    let left_rect = left.rect();
    if ball.rect().intersects(&left_rect) && ball.vx < 0.0 {
        ball.x = f64::from(left_rect.right());
        ball.vx = ball.vx.abs() * HIT_SPEEDUP;
        add_spin(ball, left);
        hit = Some(Side::Left);
    }

    // Checked independently of the left paddle
    let right_rect = right.rect();
    if ball.rect().intersects(&right_rect) && ball.vx > 0.0 {
        ball.x = f64::from(right_rect.left() - BALL_SIZE);
        ball.vx = -ball.vx.abs() * HIT_SPEEDUP;
        add_spin(ball, right);
        hit = Some(Side::Right);
    }

    hit
}

fn add_spin(ball: &mut Ball, paddle: &Paddle) {
    let offset = f64::from(ball.rect().center_y() - paddle.rect().center_y())
        / (f64::from(PADDLE_H) / 2.0);
    ball.vy += offset * SPIN;
}

/// Returns the side that earns a point when the ball has fully left the field.
pub fn check_score(ball: &Ball) -> Option<Side> {
    if ball.x < f64::from(-BALL_SIZE) {
        Some(Side::Right)
    } else if ball.x > f64::from(WIN_W + BALL_SIZE) {
        Some(Side::Left)
    } else {
        None
    }
}
