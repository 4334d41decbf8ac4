//! The native frame loop.

use crate::error::Result;
use crate::frame::FrameLimiter;
use crate::game::Game;
use crate::renderer::Renderer;
use crate::scene::Scene;
use rand::Rng;
use std::io;
use tracing::{info, warn};

/// Runs frames until the game stops running and returns how many ran.
///
/// Each frame drains discrete events, reads the held keys, advances the
/// game, draws it and then sleeps out the rest of the frame budget. The
/// renderer must already be initialized; releasing it is up to the caller.
pub fn run<R: Rng, B: Renderer>(
    game: &mut Game<R>,
    renderer: &mut B,
    limiter: &mut FrameLimiter,
) -> Result<u64> {
    info!("session started");
    let mut frames = 0u64;

    while game.running {
        let events = renderer.poll_events()?;
        let held = renderer.held_keys();
        game.tick(&events, held);

        renderer.render(&Scene::compose(game))?;
        limiter.wait();
        frames += 1;
    }

    info!(
        frames,
        left = game.score_left,
        right = game.score_right,
        "session ended"
    );
    Ok(frames)
}

/// Combines the outcome of [`run`] with releasing the display afterwards.
///
/// A session error wins over a cleanup error, which is only logged then.
pub fn finish(result: Result<u64>, cleanup: io::Result<()>) -> Result<u64> {
    match (result, cleanup) {
        (Err(err), Err(cleanup_err)) => {
            warn!(error = %cleanup_err, "display cleanup failed after session error");
            Err(err)
        }
        (result, cleanup) => {
            cleanup?;
            result
        }
    }
}
