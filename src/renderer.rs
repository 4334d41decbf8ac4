use crate::input::{HeldKeys, Input};
use crate::scene::Scene;
use std::io;

/// Trait that abstracts the display and keyboard.
/// This allows for different backends (terminal, browser canvas).
pub trait Renderer {
    /// Acquire the display. Failure here is fatal.
    fn init(&mut self) -> io::Result<()>;

    /// Draw one composed frame
    fn render(&mut self, scene: &Scene) -> io::Result<()>;

    /// Release the display
    fn cleanup(&mut self) -> io::Result<()>;

    /// Drain the discrete events that arrived since the last call
    fn poll_events(&mut self) -> io::Result<Vec<Input>>;

    /// Movement keys held right now
    fn held_keys(&self) -> HeldKeys;
}
