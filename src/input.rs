//! The two input models: one-shot events and held keys.
//!
//! Pause, restart and quit fire once per key press. Paddle movement reads
//! whichever keys are down at the start of each frame.

/// A discrete, edge-triggered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Quit,
    TogglePause,
    Restart,
}

/// A key that moves a paddle while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Left paddle up
    W,
    /// Left paddle down
    S,
    /// Right paddle up
    Up,
    /// Right paddle down
    Down,
}

impl Key {
    const ALL: [Key; 4] = [Key::W, Key::S, Key::Up, Key::Down];

    fn index(self) -> usize {
        match self {
            Key::W => 0,
            Key::S => 1,
            Key::Up => 2,
            Key::Down => 3,
        }
    }
}

/// Snapshot of the movement keys held during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left_up: bool,
    pub left_down: bool,
    pub right_up: bool,
    pub right_down: bool,
}

impl HeldKeys {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: Key) -> Self {
        match key {
            Key::W => self.left_up = true,
            Key::S => self.left_down = true,
            Key::Up => self.right_up = true,
            Key::Down => self.right_down = true,
        }
        self
    }
}

/// How long a key counts as held when the source never reports releases.
///
/// The OS waits a while before auto-repeating a held key, so a fresh press
/// gets the long `initial_ms` window. Presses arriving while the key is
/// still held are repeats and only need to bridge the short gap to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldTimeout {
    pub initial_ms: f64,
    pub repeat_ms: f64,
}

#[derive(Debug, Clone, Copy)]
struct Hold {
    at: f64,
    window: f64,
}

impl Hold {
    fn covers(&self, now_ms: f64) -> bool {
        now_ms - self.at <= self.window
    }
}

/// Tracks which movement keys are down from press and release notifications.
///
/// Timestamps are milliseconds on any monotonic clock. When the source can't
/// report releases, a [`HoldTimeout`] treats a key as down for a while after
/// its last press or auto-repeat.
#[derive(Debug, Clone)]
pub struct KeyTracker {
    holds: [Option<Hold>; 4],
    timeout: Option<HoldTimeout>,
}

impl KeyTracker {
    /// For sources that report key releases.
    pub fn new() -> Self {
        Self {
            holds: [None; 4],
            timeout: None,
        }
    }

    /// For sources that only report presses and auto-repeats.
    pub fn with_hold_timeout(timeout: HoldTimeout) -> Self {
        Self {
            holds: [None; 4],
            timeout: Some(timeout),
        }
    }

    pub fn press(&mut self, key: Key, now_ms: f64) {
        let window = match self.timeout {
            None => f64::INFINITY,
            Some(timeout) if self.is_held(key, now_ms) => timeout.repeat_ms,
            Some(timeout) => timeout.initial_ms,
        };
        self.holds[key.index()] = Some(Hold { at: now_ms, window });
    }

    pub fn release(&mut self, key: Key) {
        self.holds[key.index()] = None;
    }

    /// Forget every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.holds = [None; 4];
    }

    pub fn held(&self, now_ms: f64) -> HeldKeys {
        Key::ALL
            .iter()
            .filter(|key| self.is_held(**key, now_ms))
            .fold(HeldKeys::none(), |held, key| held.with(*key))
    }

    fn is_held(&self, key: Key, now_ms: f64) -> bool {
        self.holds[key.index()].is_some_and(|hold| hold.covers(now_ms))
    }
}

impl Default for KeyTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops auto-repeats of discrete keys for sources that report them as
/// fresh presses. A second press inside the hold window is indistinguishable
/// from a repeat and is dropped too.
#[derive(Debug, Clone)]
pub struct RepeatFilter {
    last: [Option<Hold>; 3],
    timeout: HoldTimeout,
}

impl RepeatFilter {
    pub fn new(timeout: HoldTimeout) -> Self {
        Self {
            last: [None; 3],
            timeout,
        }
    }

    /// Whether `input` pressed at `now_ms` is a new press rather than a repeat.
    pub fn accept(&mut self, input: Input, now_ms: f64) -> bool {
        let slot = &mut self.last[match input {
            Input::Quit => 0,
            Input::TogglePause => 1,
            Input::Restart => 2,
        }];
        let repeat = slot.is_some_and(|hold| hold.covers(now_ms));
        let window = if repeat {
            self.timeout.repeat_ms
        } else {
            self.timeout.initial_ms
        };
        *slot = Some(Hold { at: now_ms, window });
        !repeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut tracker = KeyTracker::new();
        tracker.press(Key::W, 0.0);
        tracker.press(Key::Down, 0.0);

        let held = tracker.held(10_000.0);
        assert_eq!(held, HeldKeys::none().with(Key::W).with(Key::Down));

        tracker.release(Key::W);
        assert_eq!(tracker.held(10_000.0), HeldKeys::none().with(Key::Down));
    }

    const TIMEOUT: HoldTimeout = HoldTimeout {
        initial_ms: 600.0,
        repeat_ms: 120.0,
    };

    #[test]
    fn test_hold_bridges_auto_repeat_delay() {
        let mut tracker = KeyTracker::with_hold_timeout(TIMEOUT);
        tracker.press(Key::W, 0.0);

        // Auto-repeat kicks in at 500 ms and fires every 33 ms until 1 s
        let mut repeats = (0..).map(|i| 500.0 + f64::from(i) * 33.0);
        let mut next_repeat = repeats.next().unwrap_or(f64::MAX);
        for frame in 0..=60 {
            let now = f64::from(frame) * 1000.0 / 60.0;
            while next_repeat <= now && next_repeat <= 1_000.0 {
                tracker.press(Key::W, next_repeat);
                next_repeat = repeats.next().unwrap_or(f64::MAX);
            }
            assert!(tracker.held(now).left_up, "not held at {} ms", now);
        }
    }

    #[test]
    fn test_repeat_window_expires_after_release() {
        let mut tracker = KeyTracker::with_hold_timeout(TIMEOUT);
        tracker.press(Key::Up, 1_000.0);
        tracker.press(Key::Up, 1_500.0);

        // Repeats only keep the key alive for the short window
        assert!(tracker.held(1_620.0).right_up);
        assert!(!tracker.held(1_621.0).right_up);

        // The next press after expiry is fresh again
        tracker.press(Key::Up, 3_000.0);
        assert!(tracker.held(3_590.0).right_up);
    }

    #[test]
    fn test_repeat_filter_drops_auto_repeats() {
        let mut filter = RepeatFilter::new(TIMEOUT);
        assert!(filter.accept(Input::TogglePause, 0.0));
        assert!(!filter.accept(Input::TogglePause, 500.0));
        assert!(!filter.accept(Input::TogglePause, 533.0));
        // Other keys are independent
        assert!(filter.accept(Input::Restart, 540.0));
        // Released: the repeat window lapsed
        assert!(filter.accept(Input::TogglePause, 700.0));
    }

    #[test]
    fn test_release_all() {
        let mut tracker = KeyTracker::new();
        tracker.press(Key::S, 0.0);
        tracker.press(Key::Up, 0.0);
        tracker.release_all();
        assert_eq!(tracker.held(0.0), HeldKeys::none());
    }
}
