//! Tank Arena entry point
//!
//! Handles platform-specific initialization and runs the game loop. The web
//! build drives the simulation from requestAnimationFrame and wires DOM
//! input/HUD; the native build runs the campaign headless under the
//! autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    //! Browser driver. Expects a page with a `canvas` element, HUD items
    //! (`#hud-health`, `#hud-score`, `#hud-enemies`, `#hud-level`,
    //! `#hud-fps`, each with a `.hud-value` child), a `#level-banner`
    //! element, a `#game-over` overlay with `#game-over-text`, and a
    //! `#restart-btn` button.

    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use glam::Vec2;
    use tank_arena::audio::AudioManager;
    use tank_arena::consts::*;
    use tank_arena::renderer;
    use tank_arena::settings::Settings;
    use tank_arena::sim::{
        GameEvent, GamePhase, Outcome, TickInput, WorldState, builtin_campaign, tick,
    };

    /// How long the level banner stays visible (wall-clock ms)
    const LEVEL_BANNER_MS: f64 = 3000.0;

    /// Game instance holding all state
    struct Game {
        world: WorldState,
        input: TickInput,
        audio: AudioManager,
        settings: Settings,
        ctx: CanvasRenderingContext2d,
        accumulator: f64,
        last_time: f64,
        /// Wall-clock deadline for hiding the level banner; 0 when hidden
        banner_until: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(ctx: CanvasRenderingContext2d, settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                world: WorldState::new(builtin_campaign()),
                input: TickInput::default(),
                audio,
                settings,
                ctx,
                accumulator: 0.0,
                last_time: 0.0,
                banner_until: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks for the elapsed real time
        fn update(&mut self, dt: f64, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let step = MS_PER_TICK / 1000.0;
            let mut substeps = 0;
            while self.accumulator >= step && substeps < MAX_SUBSTEPS {
                if self.world.is_running() {
                    tick(&mut self.world, &self.input);
                }
                self.accumulator -= step;
                substeps += 1;
            }

            for event in self.world.drain_events() {
                self.audio.play_event(event);
                if let GameEvent::LevelStarted(level) = event {
                    self.show_banner(level, time);
                }
            }
            if self.banner_until > 0.0 && time >= self.banner_until {
                set_class("level-banner", "hidden");
                self.banner_until = 0.0;
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn show_banner(&mut self, level: usize, time: f64) {
            let text = format!("Level {}: {}", level, self.world.current_level_name());
            set_text("level-banner", &text);
            set_class("level-banner", "");
            self.banner_until = time + LEVEL_BANNER_MS;
        }

        /// Render the current frame
        fn render(&self) {
            renderer::draw_frame(&self.ctx, &self.world, &self.settings);
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self) {
            set_hud_value("hud-health", &self.world.player.health.to_string());
            set_hud_value("hud-score", &self.world.score.to_string());
            set_hud_value("hud-enemies", &self.world.enemies_alive().to_string());
            set_hud_value("hud-level", &self.world.level.to_string());
            if self.settings.show_fps {
                set_hud_value("hud-fps", &self.fps.to_string());
            }

            match self.world.phase {
                GamePhase::Ended(outcome) => {
                    let text = match outcome {
                        Outcome::Victory => "Congratulations! You completed all levels!",
                        Outcome::Defeat => "Game Over! Your tank was destroyed!",
                    };
                    set_text("game-over-text", text);
                    set_class("game-over", "");
                }
                GamePhase::Running => set_class("game-over", "hidden"),
            }
        }

        fn restart(&mut self) {
            self.world.restart();
            self.accumulator = 0.0;
            log::info!("Game restarted");
        }
    }

    fn document() -> web_sys::Document {
        web_sys::window().expect("no window").document().expect("no document")
    }

    fn set_text(id: &str, value: &str) {
        if let Some(el) = document().get_element_by_id(id) {
            el.set_text_content(Some(value));
        }
    }

    fn set_class(id: &str, class: &str) {
        if let Some(el) = document().get_element_by_id(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    fn set_hud_value(id: &str, value: &str) {
        let selector = format!("#{id} .hud-value");
        if let Some(el) = document().query_selector(&selector).ok().flatten() {
            el.set_text_content(Some(value));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Tank Arena starting...");

        let canvas: HtmlCanvasElement = document()
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(WORLD_WIDTH as u32);
        canvas.set_height(WORLD_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .expect("context request failed")
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(ctx, settings)));

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_focus_mute(game.clone());

        request_animation_frame(game);

        log::info!("Tank Arena running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard: held-control state
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().to_lowercase().as_str() {
                    "w" => g.input.forward = true,
                    "s" => g.input.backward = true,
                    "a" => g.input.rotate_left = true,
                    "d" => g.input.rotate_right = true,
                    " " => g.input.fire = true,
                    "i" => {
                        g.input.demo = !g.input.demo;
                        log::info!("Demo mode: {}", g.input.demo);
                    }
                    "g" => {
                        g.settings.show_grid = !g.settings.show_grid;
                        g.settings.save();
                    }
                    "r" => {
                        if !g.world.is_running() {
                            g.restart();
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().to_lowercase().as_str() {
                    "w" => g.input.forward = false,
                    "s" => g.input.backward = false,
                    "a" => g.input.rotate_left = false,
                    "d" => g.input.rotate_right = false,
                    " " => g.input.fire = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer position in world coordinates (canvas is unscaled)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.input.pointer = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse button fires; also unlocks audio on first gesture
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.input.fire = true;
                g.audio.resume();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.fire = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        if let Some(btn) = document().get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
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
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                (time - g.last_time) / 1000.0
            } else {
                MS_PER_TICK / 1000.0
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tank_arena::consts::TICK_RATE;
    use tank_arena::sim::{
        GameEvent, GamePhase, Outcome, TickInput, WorldState, builtin_campaign, tick,
    };

    env_logger::init();
    log::info!("Tank Arena (headless) starting...");

    let mut world = WorldState::new(builtin_campaign());
    let input = TickInput {
        demo: true,
        ..TickInput::default()
    };

    // Ten minutes of logical time is plenty for the autopilot
    let max_ticks = TICK_RATE as u64 * 600;
    while world.is_running() && world.time_ticks < max_ticks {
        tick(&mut world, &input);
        for event in world.drain_events() {
            match event {
                GameEvent::LevelStarted(level) => {
                    log::info!("level {level}: {}", world.current_level_name());
                }
                GameEvent::Explosion => {
                    log::debug!("enemy destroyed, score {}", world.score);
                }
                _ => {}
            }
        }
    }

    match world.phase {
        GamePhase::Ended(Outcome::Victory) => {
            log::info!("campaign complete, final score {}", world.score);
        }
        GamePhase::Ended(Outcome::Defeat) => {
            log::info!(
                "tank destroyed on level {} ({}), score {}",
                world.level,
                world.current_level_name(),
                world.score
            );
        }
        GamePhase::Running => {
            log::info!(
                "time limit reached on level {}, score {}",
                world.level,
                world.score
            );
        }
    }
}
