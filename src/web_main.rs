use crate::config::FPS;
use crate::{Game, Renderer, Scene, WebRenderer};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// requestAnimationFrame timestamps jitter around the display refresh, so
/// frames that arrive a hair early still count.
const FRAME_SLACK_MS: f64 = 1.0;

struct GameLoop {
    game: Game,
    renderer: WebRenderer,
    frame_ms: f64,
    last_frame: f64,
}

impl GameLoop {
    fn new() -> Result<Self, JsValue> {
        let game = Game::from_entropy();
        let mut renderer = WebRenderer::new("gameCanvas")?;
        renderer.init().map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = web_sys::window().ok_or("no window")?;
        let performance = window.performance().ok_or("no performance")?;

        Ok(Self {
            game,
            renderer,
            frame_ms: 1000.0 / f64::from(FPS),
            last_frame: performance.now(),
        })
    }

    /// Returns false once the game has stopped running.
    fn update_frame(&mut self, current_time: f64) -> Result<bool, JsValue> {
        if current_time - self.last_frame < self.frame_ms - FRAME_SLACK_MS {
            return Ok(true);
        }
        self.last_frame = current_time;

        let events = self
            .renderer
            .poll_events()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let held = self.renderer.held_keys();
        self.game.tick(&events, held);

        self.renderer
            .render(&Scene::compose(&self.game))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(self.game.running)
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.renderer.cleanup() {
            web_sys::console::error_1(&format!("[WASM] Cleanup failed: {}", e).into());
        }
        web_sys::console::log_1(
            &format!(
                "[WASM] Game over at {} - {}",
                self.game.score_left, self.game.score_right
            )
            .into(),
        );
    }
}

fn request_frame(callback: &Closure<dyn FnMut()>) {
    let scheduled = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))
        .and_then(|window| window.request_animation_frame(callback.as_ref().unchecked_ref()));
    if let Err(e) = scheduled {
        web_sys::console::error_1(&e);
    }
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    web_sys::console::log_1(&"[WASM] Starting Pong...".into());
    let game_loop = match GameLoop::new() {
        Ok(gl) => Rc::new(RefCell::new(gl)),
        Err(e) => {
            web_sys::console::error_1(&format!("[WASM] Failed to open canvas: {:?}", e).into());
            return Err(e);
        }
    };

    let window = web_sys::window().ok_or("no window")?;
    let performance = window.performance().ok_or("no performance")?;

    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let current_time = performance.now();

        let keep_running = match game_loop.borrow_mut().update_frame(current_time) {
            Ok(running) => running,
            Err(e) => {
                web_sys::console::error_1(&e);
                false
            }
        };

        if !keep_running {
            // Not rescheduling ends the loop
            game_loop.borrow_mut().shutdown();
            return;
        }

        if let Some(callback) = f.borrow().as_ref() {
            request_frame(callback);
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        request_frame(callback);
    }

    web_sys::console::log_1(&"[WASM] Game loop started".into());
    Ok(())
}
