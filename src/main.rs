//! Santa Flappy entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use santa_flappy::audio::AudioManager;
    use santa_flappy::persistence::LocalLeaderboard;
    use santa_flappy::platform::{KeyValueStore, LocalStore, web};
    use santa_flappy::renderer::RenderState;
    use santa_flappy::sim::{GamePhase, Playfield};
    use santa_flappy::{GameSession, Settings, Tuning};

    /// LocalStorage key holding the 4-character player id
    const PLAYER_ID_KEY: &str = "santa_flappy_player_id";

    /// Session plus the GPU surface it draws to
    struct Game {
        session: GameSession,
        render_state: Option<RenderState>,
        last_phase: GamePhase,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let snapshot = self.session.on_frame(time);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&snapshot) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            if snapshot.phase != self.last_phase {
                self.last_phase = snapshot.phase;
                update_hud(&self.session);
            } else if snapshot.phase.is_active() {
                update_score(snapshot.score);
            }
        }
    }

    fn update_score(score: u32) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("score") {
            el.set_text_content(Some(&score.to_string()));
        }
    }

    /// Show or hide overlays on phase changes
    fn update_hud(session: &GameSession) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let phase = session.state().phase;
        update_score(session.state().score);

        let toggle = |id: &str, visible: bool| {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        };
        toggle("start-prompt", phase == GamePhase::Idle);
        toggle("game-over", phase == GamePhase::Ended);

        if phase == GamePhase::Ended {
            if let Some(el) = document.get_element_by_id("best-score") {
                el.set_text_content(Some(&session.high_score().to_string()));
            }
            if let Some(list) = document.get_element_by_id("leaderboard") {
                let rows: Vec<String> = session
                    .leaderboard_top()
                    .iter()
                    .map(|e| format!("{} {}", e.player_id, e.score))
                    .collect();
                list.set_text_content(Some(&rows.join("\n")));
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Santa Flappy starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (client_w, client_h, width, height) = fit_canvas(&window, &canvas);

        // Profile, settings and balance are fixed for the lifetime of the page
        let store = LocalStore::new();
        let settings = Settings::load(&store);
        let profile = settings.resolve_profile(web::detect_profile());
        let tuning = Tuning::for_profile(profile);
        let volume = settings.effective_volume();
        let player_id = store.get(PLAYER_ID_KEY).ok().flatten();

        let seed = js_sys::Date::now() as u64;
        let mut session = GameSession::new(
            seed,
            tuning,
            Playfield::new(client_w, client_h),
            settings,
            Box::new(store),
        )
        .with_audio(Box::new(AudioManager::new(volume)))
        .with_leaderboard(Box::new(LocalLeaderboard::new(LocalStore::new())));

        if let Some(id) = player_id
            && let Err(e) = session.set_player_id(&id)
        {
            log::warn!("Ignoring stored player id: {}", e);
        }

        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = match RenderState::new(surface, &adapter, width, height).await {
            Ok(state) => Some(state),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                None
            }
        };

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state,
            last_phase: GamePhase::Idle,
        }));
        update_hud(&game.borrow().session);

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_auto_pause(game.clone());
        setup_resize(canvas, game.clone());

        request_animation_frame(game);

        log::info!("Santa Flappy running!");
    }

    /// Match the canvas backing store to its CSS size; returns CSS and device sizes
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (f32, f32, u32, u32) {
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (client_w as f32, client_h as f32, width, height)
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().session.primary_action();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().session.primary_action();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "Space" | "ArrowUp" => {
                        event.prevent_default();
                        if !event.repeat() {
                            g.session.primary_action();
                        }
                    }
                    "KeyD" => g.session.toggle_hitbox(),
                    "KeyM" => {
                        let muted = !g.session.settings().muted;
                        g.session.set_muted(muted);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
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

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.session.reset() {
                    update_hud(&g.session);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Freeze the world while the tab is hidden
    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                g.session.pause();
            } else {
                g.session.resume();
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (client_w, client_h, width, height) = fit_canvas(&window_clone, &canvas);
            let mut g = game.borrow_mut();
            if let Some(ref mut render_state) = g.render_state {
                render_state.resize(width, height);
            }
            g.session.resize(client_w, client_h);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Santa Flappy (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    demo_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run with a naive autopilot that flaps whenever it sinks below the gap
#[cfg(not(target_arch = "wasm32"))]
fn demo_run() {
    use santa_flappy::consts::NOMINAL_TICK_MS;
    use santa_flappy::persistence::LocalLeaderboard;
    use santa_flappy::platform::MemoryStore;
    use santa_flappy::sim::{GamePhase, Playfield};
    use santa_flappy::{GameSession, PerformanceProfile, Settings, Tuning};

    let seed = santa_flappy::platform::unix_time_ms();
    let tuning = Tuning::for_profile(PerformanceProfile::Desktop);
    let playfield = Playfield::reference(&tuning);
    let mut session = GameSession::new(
        seed,
        tuning,
        playfield,
        Settings::default(),
        Box::new(MemoryStore::default()),
    )
    .with_leaderboard(Box::new(LocalLeaderboard::new(MemoryStore::default())));

    if let Err(e) = session.set_player_id("DEMO") {
        log::warn!("Demo player id rejected: {}", e);
    }

    // 60 Hz display for at most two simulated minutes
    let mut now = 0.0;
    let mut last_jump = f64::NEG_INFINITY;
    session.on_frame(now);
    session.jump();
    for _ in 0..7200 {
        now += NOMINAL_TICK_MS;
        let snapshot = session.on_frame(now);
        if snapshot.phase == GamePhase::Ended {
            break;
        }

        let target = snapshot
            .obstacles
            .iter()
            .find(|o| o.x + o.width > snapshot.player.x)
            .map(|o| o.gap_top + o.gap * 0.5)
            .unwrap_or(snapshot.height * 0.4);
        let centre = snapshot.player.y + snapshot.player.size * 0.5;
        if centre > target && now - last_jump > 250.0 {
            session.jump();
            last_jump = now;
        }
    }

    let state = session.state();
    println!(
        "Demo run: phase {:?}, score {}, obstacles {}, gifts {}, jumps {}",
        state.phase, state.score, state.obstacles_passed, state.collectibles, state.jumps
    );
    match session.last_submission() {
        Some(Ok(outcome)) => println!("Leaderboard: {:?}", outcome),
        Some(Err(e)) => println!("Leaderboard submission rejected: {}", e),
        None => println!("No submission (run did not end)"),
    }
}
