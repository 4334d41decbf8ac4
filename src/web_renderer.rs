use crate::config::{FONT_PX, TITLE, WIN_H, WIN_W};
use crate::entity::Rect;
use crate::input::{HeldKeys, Input, Key, KeyTracker};
use crate::renderer::Renderer;
use crate::scene::{DrawCommand, Scene, TextAnchor};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent};

type Listener = Closure<dyn FnMut(Event)>;

fn js_error(err: JsValue) -> io::Error {
    io::Error::other(format!("{:?}", err))
}

fn movement_key(code: &str) -> Option<Key> {
    match code {
        "KeyW" => Some(Key::W),
        "KeyS" => Some(Key::S),
        "ArrowUp" => Some(Key::Up),
        "ArrowDown" => Some(Key::Down),
        _ => None,
    }
}

fn discrete_input(code: &str) -> Option<Input> {
    match code {
        "Escape" => Some(Input::Quit),
        "KeyP" => Some(Input::TogglePause),
        "KeyR" => Some(Input::Restart),
        _ => None,
    }
}

pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    window: web_sys::Window,
    performance: web_sys::Performance,
    device_pixel_ratio: f64,

    // Input state shared with the DOM listeners
    keys: Rc<RefCell<KeyTracker>>,
    pending_input: Rc<RefCell<Vec<Input>>>,
    listeners: Vec<(&'static str, Listener)>,
}

impl WebRenderer {
    pub fn new(canvas_id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let performance = window.performance().ok_or("no performance")?;
        let device_pixel_ratio = window.device_pixel_ratio();

        Ok(Self {
            canvas,
            context,
            window,
            performance,
            device_pixel_ratio,
            keys: Rc::new(RefCell::new(KeyTracker::new())),
            pending_input: Rc::new(RefCell::new(Vec::new())),
            listeners: Vec::new(),
        })
    }

    fn size_canvas(&self) -> Result<(), JsValue> {
        let width = f64::from(WIN_W);
        let height = f64::from(WIN_H);

        // Internal resolution is scaled for high DPI displays
        self.canvas
            .set_width((width * self.device_pixel_ratio) as u32);
        self.canvas
            .set_height((height * self.device_pixel_ratio) as u32);

        let element: &HtmlElement = self.canvas.unchecked_ref();
        element.style().set_property("width", &format!("{}px", WIN_W))?;
        element.style().set_property("height", &format!("{}px", WIN_H))?;

        // Setting width/height resets the context transform
        self.context
            .scale(self.device_pixel_ratio, self.device_pixel_ratio)?;
        Ok(())
    }

    fn listen(&mut self, event: &'static str, listener: Listener) -> Result<(), JsValue> {
        self.window
            .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        self.listeners.push((event, listener));
        Ok(())
    }

    fn setup_keyboard_listeners(&mut self) -> Result<(), JsValue> {
        let keys = self.keys.clone();
        let pending_input = self.pending_input.clone();
        let performance = self.performance.clone();
        let keydown = Closure::wrap(Box::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let code = event.code();

            if let Some(key) = movement_key(&code) {
                keys.borrow_mut().press(key, performance.now());
                event.prevent_default();
            } else if let Some(input) = discrete_input(&code) {
                // Holding P must not flicker the pause
                if !event.repeat() {
                    pending_input.borrow_mut().push(input);
                }
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>);
        self.listen("keydown", keydown)?;

        let keys = self.keys.clone();
        let keyup = Closure::wrap(Box::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(key) = movement_key(&event.code()) {
                keys.borrow_mut().release(key);
            }
        }) as Box<dyn FnMut(Event)>);
        self.listen("keyup", keyup)?;

        // Key releases are lost while the page is unfocused
        let keys = self.keys.clone();
        let blur = Closure::wrap(Box::new(move |_event: Event| {
            keys.borrow_mut().release_all();
        }) as Box<dyn FnMut(Event)>);
        self.listen("blur", blur)?;

        Ok(())
    }

    fn fill_round_rect(&self, rect: &Rect, radius: i32) -> Result<(), JsValue> {
        let (x, y) = (f64::from(rect.x), f64::from(rect.y));
        let (w, h) = (f64::from(rect.w), f64::from(rect.h));
        let r = f64::from(radius).min(w / 2.0).min(h / 2.0);

        let ctx = &self.context;
        ctx.begin_path();
        ctx.move_to(x + r, y);
        ctx.arc_to(x + w, y, x + w, y + h, r)?;
        ctx.arc_to(x + w, y + h, x, y + h, r)?;
        ctx.arc_to(x, y + h, x, y, r)?;
        ctx.arc_to(x, y, x + w, y, r)?;
        ctx.close_path();
        ctx.fill();
        Ok(())
    }

    fn draw_text(&self, text: &str, anchor: TextAnchor) -> Result<(), JsValue> {
        let ctx = &self.context;
        ctx.set_font(&format!("{}px sans-serif", FONT_PX));
        ctx.set_text_align("center");

        let center_x = f64::from(WIN_W / 2);
        match anchor {
            TextAnchor::Top(y) => {
                ctx.set_text_baseline("top");
                ctx.fill_text(text, center_x, f64::from(y))
            }
            TextAnchor::Middle => {
                ctx.set_text_baseline("middle");
                ctx.fill_text(text, center_x, f64::from(WIN_H / 2))
            }
        }
    }

    fn draw(&self, command: &DrawCommand) -> Result<(), JsValue> {
        match command {
            DrawCommand::Clear(color) => {
                self.context.set_fill_style_str(&color.to_hex());
                self.context
                    .fill_rect(0.0, 0.0, f64::from(WIN_W), f64::from(WIN_H));
            }
            DrawCommand::FillRect { rect, color } => {
                self.context.set_fill_style_str(&color.to_hex());
                self.context.fill_rect(
                    f64::from(rect.x),
                    f64::from(rect.y),
                    f64::from(rect.w),
                    f64::from(rect.h),
                );
            }
            DrawCommand::FillRoundRect {
                rect,
                radius,
                color,
            } => {
                self.context.set_fill_style_str(&color.to_hex());
                self.fill_round_rect(rect, *radius)?;
            }
            DrawCommand::Text {
                text,
                anchor,
                color,
            } => {
                self.context.set_fill_style_str(&color.to_hex());
                self.draw_text(text, *anchor)?;
            }
        }
        Ok(())
    }
}

impl Renderer for WebRenderer {
    fn init(&mut self) -> io::Result<()> {
        self.size_canvas().map_err(js_error)?;
        self.setup_keyboard_listeners().map_err(js_error)?;
        if let Some(document) = self.window.document() {
            document.set_title(TITLE);
        }
        Ok(())
    }

    fn render(&mut self, scene: &Scene) -> io::Result<()> {
        for command in &scene.commands {
            self.draw(command).map_err(js_error)?;
        }
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        for (event, listener) in self.listeners.drain(..) {
            self.window
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .map_err(js_error)?;
        }
        self.keys.borrow_mut().release_all();
        Ok(())
    }

    fn poll_events(&mut self) -> io::Result<Vec<Input>> {
        Ok(std::mem::take(&mut *self.pending_input.borrow_mut()))
    }

    fn held_keys(&self) -> HeldKeys {
        self.keys.borrow().held(self.performance.now())
    }
}
