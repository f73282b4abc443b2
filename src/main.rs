//! PlayChannel entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, KeyboardEvent,
        MouseEvent, TouchEvent,
    };

    use playchannel::PlayChannel;
    use playchannel::Tuning;
    use playchannel::persistence::BrowserSessionStore;
    use playchannel::platform::InputCollector;
    use playchannel::renderer::{CanvasRenderer, SPRITE_PATHS};

    /// Game instance holding all state
    struct Game {
        channel: PlayChannel<BrowserSessionStore>,
        input: InputCollector,
        renderer: CanvasRenderer,
        sprites_pending: usize,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let input = self.input.poll(time);
            if let Some(snapshot) = self.channel.frame(&input, time) {
                if let Err(e) = self.renderer.render(&snapshot) {
                    log::warn!("Render error: {:?}", e);
                }
            }
        }

        fn sprite_settled(&mut self) {
            self.sprites_pending = self.sprites_pending.saturating_sub(1);
            if self.sprites_pending == 0 {
                self.channel.mark_assets_loaded();
            }
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Optional `<script id="playchannel-tuning" type="application/json">`
    fn load_tuning(document: &web_sys::Document) -> Tuning {
        document
            .get_element_by_id("playchannel-tuning")
            .and_then(|el| el.text_content())
            .map(|json| Tuning::from_json_or_default(&json))
            .unwrap_or_default()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("PlayChannel starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Without a surface the loop never starts
        let Some(canvas) = document
            .get_element_by_id("playchannel")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::warn!("No #playchannel canvas, not starting");
            return;
        };

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
            Ok(Some(ctx)) => ctx.dyn_into().expect("not a 2d context"),
            _ => {
                log::warn!("Canvas 2D context unavailable, not starting");
                return;
            }
        };

        let tuning = load_tuning(&document);
        let seed = js_sys::Date::now() as u64;
        let mut channel = PlayChannel::new(BrowserSessionStore::new(), tuning.clone(), seed, now());
        channel.attach_surface();

        let game = Rc::new(RefCell::new(Game {
            channel,
            input: InputCollector::new(&tuning),
            renderer: CanvasRenderer::new(ctx, width as f64, height as f64),
            sprites_pending: SPRITE_PATHS.len(),
        }));

        preload_sprites(game.clone());
        setup_input_handlers(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("PlayChannel running!");
    }

    fn preload_sprites(game: Rc<RefCell<Game>>) {
        let mut sprites = Vec::with_capacity(SPRITE_PATHS.len());
        for path in SPRITE_PATHS {
            let Ok(img) = HtmlImageElement::new() else {
                game.borrow_mut().sprite_settled();
                continue;
            };
            // Errors count as settled too; the renderer falls back to rectangles
            for event in ["load", "error"] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut()>::new(move || {
                    game.borrow_mut().sprite_settled();
                });
                let _ = img.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
                closure.forget();
            }
            img.set_src(path);
            sprites.push(img);
        }
        game.borrow_mut().renderer.set_sprites(sprites);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse hold + click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.pointer_down();
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.pointer_up();
            });
            let _ = window.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.click();
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch hold + swipe
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().input.touch_start(touch.client_y() as f32);
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().input.touch_move(touch.client_y() as f32, now());
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().input.touch_end();
            });
            let _ = canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize keeps the backing store at device resolution
        {
            let game = game.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let dpr = window.device_pixel_ratio();
                let width = (canvas.client_width() as f64 * dpr) as u32;
                let height = (canvas.client_height() as f64 * dpr) as u32;
                canvas.set_width(width);
                canvas.set_height(height);
                game.borrow_mut().renderer.resize(width as f64, height as f64);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur drops every hold so nothing sticks
        {
            let closure = Closure::<dyn FnMut()>::new(move || {
                game.borrow_mut().input.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("PlayChannel (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play");

    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run with a simple autopilot, logging the result
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use playchannel::persistence::MemoryStore;
    use playchannel::sim::{ObstacleType, StepOutcome, TickInput};
    use playchannel::{PlayChannel, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 120;

    let mut game = PlayChannel::new(MemoryStore::new(), Tuning::default(), 7, 0.0);
    game.attach_surface();
    game.mark_assets_loaded();

    let mut now = 0.0;
    let start = TickInput {
        primary: true,
        ..Default::default()
    };
    game.frame(&start, now);

    for _ in 0..MAX_FRAMES {
        now += FRAME_MS;
        let state = game.state();
        let actor_x = state.actor.x + state.actor.width;
        // Look at the nearest obstacle still ahead of the actor
        let ahead = state
            .obstacles
            .iter()
            .find(|o| o.x + o.width > state.actor.x && o.x - actor_x < 25.0);
        let input = match ahead.map(|o| o.obstacle_type()) {
            Some(ObstacleType::Floor) => TickInput {
                ascend: true,
                ..Default::default()
            },
            Some(ObstacleType::Ceiling) | Some(ObstacleType::Middle) => TickInput {
                descend: true,
                ..Default::default()
            },
            _ => TickInput::default(),
        };

        let Some(frame) = game.frame(&input, now) else {
            break;
        };
        if game.last_outcome() == StepOutcome::Crashed {
            log::info!("Demo run ended at distance {}", frame.score);
            break;
        }
    }

    // Let the recap play out
    for _ in 0..(60 * 5) {
        now += FRAME_MS;
        game.frame(&TickInput::default(), now);
    }
    let state = game.state();
    log::info!(
        "Demo finished: distance {}, sticks {}, session best {}",
        state.run.score,
        state.run.sticks,
        state.high_score.best
    );
}
