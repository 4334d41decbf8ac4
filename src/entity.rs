use crate::config::{
    BALL_SIZE, BALL_SPEED, MIN_SERVE_VY, PADDLE_H, PADDLE_MARGIN, PADDLE_SPEED, PADDLE_W, SERVE_SPREAD,
    SERVE_VY_THRESHOLD, WIN_H, WIN_W,
};
use rand::Rng;

/// Bounds `v` to `[low, high]`.
pub fn clamp(v: f64, low: f64, high: f64) -> f64 {
    if v < low {
        return low;
    }
    if v > high {
        return high;
    }
    v
}

/// Integer rectangle used for collisions and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Paddle {
    pub x: i32,
    pub y: f64,
    pub speed: f64,
}

impl Paddle {
    pub fn new(x: i32, y: f64) -> Self {
        Self {
            x,
            y,
            speed: PADDLE_SPEED,
        }
    }

    /// A vertically centered paddle on the given side of the field.
    pub fn for_side(side: Side) -> Self {
        let x = match side {
            Side::Left => PADDLE_MARGIN,
            Side::Right => WIN_W - PADDLE_MARGIN - PADDLE_W,
        };
        Self::new(x, f64::from(WIN_H) / 2.0 - f64::from(PADDLE_H) / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y.floor() as i32, PADDLE_W, PADDLE_H)
    }

    /// Moves by `dy`, staying fully inside the field.
    pub fn move_by(&mut self, dy: f64) {
        self.y = clamp(self.y + dy, 0.0, f64::from(WIN_H - PADDLE_H));
    }
}

#[derive(Debug, Clone)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Ball {
    /// Creates a ball at the center, already served.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut ball = Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
        };
        ball.reset(true, rng);
        ball
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            BALL_SIZE,
            BALL_SIZE,
        )
    }

    /// Re-centers the ball. With `kick`, serves it toward a random side;
    /// otherwise it comes to rest.
    pub fn reset<R: Rng + ?Sized>(&mut self, kick: bool, rng: &mut R) {
        self.x = f64::from(WIN_W) / 2.0 - f64::from(BALL_SIZE) / 2.0;
        self.y = f64::from(WIN_H) / 2.0 - f64::from(BALL_SIZE) / 2.0;

        if !kick {
            self.vx = 0.0;
            self.vy = 0.0;
            return;
        }

        self.vx = BALL_SPEED * random_sign(rng);

        let spread = BALL_SPEED * SERVE_SPREAD;
        self.vy = rng.gen_range(-spread..=spread);
        // Near-horizontal serves make for dull rallies
        if self.vy.abs() < SERVE_VY_THRESHOLD {
            self.vy = MIN_SERVE_VY * random_sign(rng);
        }
    }

    /// Advances one frame and bounces off the top and bottom walls.
    /// Leaving through the left or right edge is a score, not a bounce.
    pub fn update(&mut self) {
        self.x += self.vx;
        self.y += self.vy;

        let floor = f64::from(WIN_H - BALL_SIZE);
        if self.y <= 0.0 {
            self.y = 0.0;
            self.vy = self.vy.abs();
        } else if self.y >= floor {
            self.y = floor;
            self.vy = -self.vy.abs();
        }
    }
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(30, 215, 12, 110);
        assert_eq!(r.right(), 42);
        assert_eq!(r.bottom(), 325);
        assert_eq!(r.center_y(), 270);
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9, 9, 10, 10)));
    }

    #[test]
    fn test_rect_floors_negative_positions() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ball = Ball::new(&mut rng);
        ball.x = -3.5;
        assert_eq!(ball.rect().x, -4);
    }

    #[test]
    fn test_paddles_start_centered() {
        let left = Paddle::for_side(Side::Left);
        let right = Paddle::for_side(Side::Right);
        assert_eq!(left.x, 30);
        assert_eq!(right.x, 900 - 30 - 12);
        assert_eq!(left.y, 215.0);
        assert_eq!(right.y, 215.0);
    }

    #[test]
    fn test_paddle_stops_at_walls() {
        let mut paddle = Paddle::for_side(Side::Left);
        paddle.move_by(-1000.0);
        assert_eq!(paddle.y, 0.0);
        paddle.move_by(1000.0);
        assert_eq!(paddle.y, f64::from(WIN_H - PADDLE_H));
    }

    #[test]
    fn test_reset_without_kick_is_at_rest() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ball = Ball::new(&mut rng);
        ball.x = 12.0;
        ball.y = 99.0;
        ball.reset(false, &mut rng);
        assert_eq!(ball.x, 443.0);
        assert_eq!(ball.y, 263.0);
        assert_eq!(ball.vx, 0.0);
        assert_eq!(ball.vy, 0.0);
    }

    #[test]
    fn test_bottom_wall_bounce() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ball = Ball::new(&mut rng);
        ball.y = f64::from(WIN_H - BALL_SIZE) - 2.0;
        ball.vy = 5.0;
        ball.update();
        assert_eq!(ball.y, f64::from(WIN_H - BALL_SIZE));
        assert_eq!(ball.vy, -5.0);
    }

    #[test]
    fn test_top_wall_bounce() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ball = Ball::new(&mut rng);
        ball.y = 2.0;
        ball.vy = -4.0;
        ball.update();
        assert_eq!(ball.y, 0.0);
        assert_eq!(ball.vy, 4.0);
    }

    #[test]
    fn test_side_walls_do_not_bounce() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ball = Ball::new(&mut rng);
        ball.x = 2.0;
        ball.vx = -6.0;
        ball.vy = 0.0;
        ball.update();
        assert_eq!(ball.x, -4.0);
        assert_eq!(ball.vx, -6.0);
    }

    proptest! {
        #[test]
        fn prop_clamp_within_bounds(v in -1e6f64..1e6, low in -1e3f64..1e3, width in 0f64..1e3) {
            let high = low + width;
            let c = clamp(v, low, high);
            prop_assert!(c >= low && c <= high);
            if v >= low && v <= high {
                prop_assert_eq!(c, v);
            }
        }

        #[test]
        fn prop_clamp_monotonic(a in -1e6f64..1e6, b in -1e6f64..1e6, low in -1e3f64..0.0, high in 0f64..1e3) {
            let (lo_v, hi_v) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(clamp(lo_v, low, high) <= clamp(hi_v, low, high));
        }

        #[test]
        fn prop_paddle_stays_on_field(moves in prop::collection::vec(-50f64..50.0, 1..200)) {
            let mut paddle = Paddle::for_side(Side::Right);
            for dy in moves {
                paddle.move_by(dy);
                prop_assert!(paddle.y >= 0.0);
                prop_assert!(paddle.y <= f64::from(WIN_H - PADDLE_H));
            }
        }

        #[test]
        fn prop_kick_serves_at_full_speed(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ball = Ball::new(&mut rng);
            ball.reset(true, &mut rng);
            prop_assert_eq!(ball.vx.abs(), BALL_SPEED);
            prop_assert!(ball.vy.abs() >= SERVE_VY_THRESHOLD);
            prop_assert!(ball.vy.abs() <= BALL_SPEED * SERVE_SPREAD);
            prop_assert_eq!(ball.x, 443.0);
            prop_assert_eq!(ball.y, 263.0);
        }

        #[test]
        fn prop_ball_stays_between_walls(seed in any::<u64>(), frames in 1usize..500) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ball = Ball::new(&mut rng);
            for _ in 0..frames {
                ball.update();
                prop_assert!(ball.y >= 0.0);
                prop_assert!(ball.y <= f64::from(WIN_H - BALL_SIZE));
            }
        }
    }
}
