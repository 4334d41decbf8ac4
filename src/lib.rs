pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod scene;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli_renderer;
#[cfg(not(target_arch = "wasm32"))]
pub mod frame;
#[cfg(not(target_arch = "wasm32"))]
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod web_main;
#[cfg(target_arch = "wasm32")]
pub mod web_renderer;

pub use entity::{clamp, Ball, Paddle, Rect, Side};
pub use error::PongError;
pub use game::{Game, GameState};
pub use input::{HeldKeys, HoldTimeout, Input, Key, KeyTracker, RepeatFilter};
pub use physics::{check_score, resolve_paddle_collisions};
pub use renderer::Renderer;
pub use scene::{DrawCommand, Scene, TextAnchor};

#[cfg(not(target_arch = "wasm32"))]
pub use cli_renderer::CliRenderer;
#[cfg(not(target_arch = "wasm32"))]
pub use frame::FrameLimiter;
#[cfg(target_arch = "wasm32")]
pub use web_renderer::WebRenderer;
