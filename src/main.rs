//! Dots entry point
//!
//! Wires the browser page (canvases, keyboard, HUD, modals, leaderboard) to
//! the [`Game`](dots_game::Game) orchestrator. Natively it runs a short
//! headless session and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, HtmlInputElement,
        KeyboardEvent, Window,
    };

    use dots_game::leaderboard::{
        self, DEFAULT_API_URL, LeaderboardPager, ScoreEntry, ScoreSubmission,
    };
    use dots_game::platform::{FrameHandle, FrameScheduler, LoopTarget, apply_key, is_restart_code};
    use dots_game::renderer::CanvasSurface;
    use dots_game::sim::{GameEvent, TickInput};
    use dots_game::{Game, Settings};

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
    type Shared = Rc<RefCell<App>>;

    /// `requestAnimationFrame` scheduler with one persistent callback per loop
    struct RafScheduler {
        window: Window,
        game_cb: FrameCallback,
        preview_cb: FrameCallback,
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self, target: LoopTarget) -> FrameHandle {
            let cb = match target {
                LoopTarget::Game => &self.game_cb,
                LoopTarget::Preview => &self.preview_cb,
            };
            let id = cb
                .borrow()
                .as_ref()
                .and_then(|c| {
                    self.window
                        .request_animation_frame(c.as_ref().unchecked_ref())
                        .ok()
                })
                .unwrap_or(0);
            FrameHandle(id)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            let _ = self.window.cancel_animation_frame(handle.0);
        }
    }

    /// Everything the page callbacks share
    struct App {
        game: Game,
        scheduler: RafScheduler,
        game_surface: CanvasSurface,
        preview_surface: CanvasSurface,
        input: TickInput,
        pager: LeaderboardPager,
        api_url: String,
    }

    impl App {
        fn restart(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.game
                .restart_game(seed, &mut self.scheduler, &mut self.game_surface);
            reset_hud();
        }

        fn stop(&mut self) {
            self.game.stop_preview(&mut self.scheduler);
            self.game
                .stop_game(&mut self.scheduler, &mut self.game_surface);
            reset_hud();
        }
    }

    // === DOM helpers ===

    fn window() -> Result<Window, JsValue> {
        web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
    }

    fn document() -> Result<Document, JsValue> {
        window()?
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))
    }

    fn element<T: JsCast>(id: &str) -> Result<T, JsValue> {
        document()?
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
            .dyn_into::<T>()
            .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong type")))
    }

    fn set_text(id: &str, text: &str) {
        if let Ok(el) = element::<HtmlElement>(id) {
            el.set_inner_text(text);
        }
    }

    fn set_style(id: &str, property: &str, value: &str) {
        if let Ok(el) = element::<HtmlElement>(id) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn show(id: &str, visible: bool) {
        set_style(id, "display", if visible { "block" } else { "none" });
    }

    fn hide_modals() {
        for id in [
            "modal-backdrop",
            "modal-results-screen",
            "modal-change-stats",
            "modal-leaderboard",
        ] {
            show(id, false);
        }
    }

    fn show_modal(id: &str) {
        hide_modals();
        show("modal-backdrop", true);
        show(id, true);
    }

    /// Attach a listener that lives as long as the page
    fn on(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_id(id: &str, event: &str, handler: impl FnMut(Event) + 'static) {
        match element::<EventTarget>(id) {
            Ok(target) => on(&target, event, handler),
            Err(_) => log::warn!("No #{} to listen on", id),
        }
    }

    fn slider_value(id: &str) -> f32 {
        element::<HtmlInputElement>(id)
            .ok()
            .and_then(|input| input.value().parse().ok())
            .unwrap_or(0.0)
    }

    fn set_slider(id: &str, value: f32) {
        if let Ok(input) = element::<HtmlInputElement>(id) {
            input.set_value(&value.to_string());
        }
    }

    // === HUD ===

    fn reset_hud() {
        set_text("current-score", "0");
        set_style("power-meter", "transition", "none");
        set_style("power-meter", "width", "0%");
    }

    fn update_stats_meter(settings: &Settings) {
        let percent = settings.stats_meter_remaining() * 100.0;
        set_style("stats-meter", "width", &format!("{percent}%"));
    }

    fn handle_events(events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::ScoreChanged { score } => {
                    set_text("current-score", &score.to_string());
                }
                GameEvent::PowerChanged {
                    percent,
                    transition_ms,
                } => {
                    set_style("power-meter", "transition", &format!("width {transition_ms}ms ease"));
                    set_style("power-meter", "width", &format!("{percent}%"));
                }
                GameEvent::GameEnded {
                    score,
                    time_ms,
                    collected,
                } => {
                    reset_hud();
                    set_text("results-collected", &collected.to_string());
                    set_text("results-time", &format!("{:.2}s", time_ms as f64 / 1000.0));
                    set_text("results-score", &score.to_string());
                    show_modal("modal-results-screen");
                }
            }
        }
    }

    // === Frames ===

    fn on_game_frame(app: &Shared, now_ms: f64) {
        let events = {
            let mut guard = app.borrow_mut();
            let app = &mut *guard;
            app.game.next_game_frame(
                now_ms,
                &app.input,
                &mut app.scheduler,
                &mut app.game_surface,
            );
            app.game.drain_events()
        };
        handle_events(events);
    }

    fn on_preview_frame(app: &Shared, now_ms: f64) {
        let mut guard = app.borrow_mut();
        let app = &mut *guard;
        app.game.next_preview_frame(
            now_ms,
            &app.input,
            &mut app.scheduler,
            &mut app.preview_surface,
        );
    }

    /// Size the main canvas to the space left under the UI bar
    fn resize(app: &Shared) {
        let Ok(window) = window() else {
            return;
        };
        let inner_w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let inner_h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let bar_h = element::<HtmlElement>("UI-bar")
            .map(|bar| bar.get_bounding_client_rect().height())
            .unwrap_or(0.0);

        let width = inner_w as f32;
        let height = ((inner_h - bar_h) * 0.9) as f32;

        let mut guard = app.borrow_mut();
        let app = &mut *guard;
        app.game_surface.resize(width as u32, height as u32);
        let viewport = app.game.resize_game(width, height, &mut app.game_surface);
        set_style("UI-bar", "padding", &format!("0 {}px", viewport.offset_x));
        log::debug!("Resized to {}x{} (scale {})", width, height, viewport.scale);
    }

    fn resize_preview(app: &Shared) {
        let Ok(container) = element::<HtmlElement>("container-stats-canvas") else {
            return;
        };
        let rect = container.get_bounding_client_rect();
        let width = (rect.width() * 0.98) as f32;
        let height = rect.height() as f32;

        let mut guard = app.borrow_mut();
        let app = &mut *guard;
        app.preview_surface.resize(width as u32, height as u32);
        app.game
            .resize_preview(width, height, &mut app.preview_surface);
    }

    // === Leaderboard ===

    fn render_rows(pager: &LeaderboardPager, rows: &[ScoreEntry]) -> Result<(), JsValue> {
        let document = document()?;
        let body = element::<HtmlElement>("leaderboard-table-body")?;
        body.set_inner_text("");

        let now = (js_sys::Date::now() / 1000.0) as u64;
        for (i, row) in rows.iter().enumerate() {
            let tr = document.create_element("tr")?;
            let cells = [
                pager.rank_of(i).to_string(),
                row.name.clone(),
                row.score.to_string(),
                leaderboard::format_time_taken(row.time_taken),
                leaderboard::format_submitted(row.time_submitted, now),
            ];
            for text in cells {
                let td = document.create_element("td")?;
                td.set_text_content(Some(&text));
                tr.append_child(&td)?;
            }
            body.append_child(&tr)?;
        }
        Ok(())
    }

    fn load_leaderboard(app: &Shared) {
        let (api_url, query) = {
            let app = app.borrow();
            (app.api_url.clone(), app.pager.query())
        };
        set_text("text-leaderboard-load", "Loading...");
        show("text-leaderboard-load", true);

        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match leaderboard::fetch_scores(&api_url, &query).await {
                Ok(page) => {
                    show("text-leaderboard-load", false);
                    let mut guard = app.borrow_mut();
                    if guard.pager.on_page_loaded(page.results.len()) {
                        if let Err(e) = render_rows(&guard.pager, &page.results) {
                            log::error!("Failed to render leaderboard: {:?}", e);
                        }
                    }
                }
                Err(e) => {
                    log::error!("Failed to load leaderboard: {}", e);
                    set_text("text-leaderboard-load", "Could not load scores");
                }
            }
        });
    }

    fn submit(app: &Shared) {
        let (api_url, submission) = {
            let app = app.borrow();
            let Some((score, time_ms)) = app.game.results() else {
                return;
            };
            let name = element::<HtmlInputElement>("input-name")
                .map(|input| input.value())
                .unwrap_or_default();
            (
                app.api_url.clone(),
                ScoreSubmission::from_results(score, time_ms, &name),
            )
        };
        set_text("text-score-submit", "Submitting...");

        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match leaderboard::submit_score(&api_url, &submission).await {
                Ok(()) => {
                    set_text("text-score-submit", "");
                    app.borrow_mut().pager.reset();
                    show_modal("modal-leaderboard");
                    load_leaderboard(&app);
                }
                Err(e) => {
                    log::error!("Failed to submit score: {}", e);
                    set_text("text-score-submit", "Submission failed");
                }
            }
        });
    }

    // === Wiring ===

    fn bind_keyboard(app: &Shared, window: &Window) {
        let keydown_app = app.clone();
        on(window, "keydown", move |event: Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if is_restart_code(&event.code()) {
                let typing = document()
                    .ok()
                    .and_then(|d| d.active_element())
                    .is_some_and(|el| el.id() == "input-name");
                if !typing {
                    event.prevent_default();
                    hide_modals();
                    keydown_app.borrow_mut().restart();
                }
                return;
            }
            if apply_key(&mut keydown_app.borrow_mut().input, &event.key(), true) {
                event.prevent_default();
            }
        });

        let keyup_app = app.clone();
        on(window, "keyup", move |event: Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                apply_key(&mut keyup_app.borrow_mut().input, &event.key(), false);
            }
        });
    }

    /// A shared-budget slider; moves that overspend the budget snap back
    fn bind_budget_slider(app: &Shared, id: &'static str, apply: fn(&mut Game, f32)) {
        let app = app.clone();
        on_id(id, "input", move |_| {
            let speed = slider_value("slider-speed");
            let inv = slider_value("slider-inv-time");
            let charges = slider_value("slider-charges-needed");

            let mut app = app.borrow_mut();
            if !Settings::fits_shared_budget(speed, inv, charges) {
                let settings = app.game.settings();
                let previous = match id {
                    "slider-speed" => settings.player_speed,
                    "slider-inv-time" => settings.player_inv_time,
                    _ => settings.charges_slider(),
                };
                set_slider(id, previous);
                return;
            }
            apply(&mut app.game, slider_value(id));
            update_stats_meter(app.game.settings());
        });
    }

    fn bind_stats(app: &Shared) {
        {
            let settings = app.borrow().game.settings().clone();
            set_slider("slider-size", settings.player_size);
            set_slider("slider-speed", settings.player_speed);
            set_slider("slider-inv-time", settings.player_inv_time);
            set_slider("slider-charges-needed", settings.charges_slider());
            if let Ok(input) = element::<HtmlInputElement>("input-change-colour") {
                input.set_value(settings.player_colour.trim_start_matches('#'));
            }
            update_stats_meter(&settings);
        }

        let size_app = app.clone();
        on_id("slider-size", "input", move |_| {
            size_app
                .borrow_mut()
                .game
                .update_player_size(slider_value("slider-size"));
        });
        bind_budget_slider(app, "slider-speed", Game::update_player_speed);
        bind_budget_slider(app, "slider-inv-time", Game::update_player_inv_time);
        bind_budget_slider(app, "slider-charges-needed", Game::update_charges_needed);

        let colour_app = app.clone();
        on_id("input-change-colour", "input", move |_| {
            if let Ok(input) = element::<HtmlInputElement>("input-change-colour") {
                colour_app.borrow_mut().game.update_colour(&input.value());
            }
        });

        let open_app = app.clone();
        on_id("btn-change-stats", "click", move |_| {
            {
                let mut guard = open_app.borrow_mut();
                let app = &mut *guard;
                app.stop();
                app.game
                    .start_preview(js_sys::Date::now() as u64, &mut app.scheduler);
            }
            show_modal("modal-change-stats");
            resize_preview(&open_app);
        });
    }

    fn bind_modals(app: &Shared) -> Result<(), JsValue> {
        let restart_buttons = document()?.query_selector_all(".btn-restart")?;
        for i in 0..restart_buttons.length() {
            let Some(button) = restart_buttons.item(i) else {
                continue;
            };
            let app = app.clone();
            on(&button, "click", move |_| {
                hide_modals();
                app.borrow_mut().restart();
            });
        }

        let backdrop_app = app.clone();
        on_id("modal-backdrop", "click", move |event: Event| {
            let on_backdrop = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlElement>().ok())
                .is_some_and(|el| el.id() == "modal-backdrop");
            if on_backdrop {
                hide_modals();
                backdrop_app.borrow_mut().restart();
            }
        });

        let board_app = app.clone();
        on_id("btn-leaderboard", "click", move |_| {
            {
                let mut app = board_app.borrow_mut();
                app.stop();
                app.pager.reset();
            }
            show_modal("modal-leaderboard");
            load_leaderboard(&board_app);
        });

        let next_app = app.clone();
        on_id("btn-score-next", "click", move |_| {
            next_app.borrow_mut().pager.next();
            load_leaderboard(&next_app);
        });

        let back_app = app.clone();
        on_id("btn-score-back", "click", move |_| {
            let moved = back_app.borrow_mut().pager.back();
            if moved {
                load_leaderboard(&back_app);
            }
        });

        let submit_app = app.clone();
        on_id("btn-submit", "click", move |_| submit(&submit_app));
        Ok(())
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Dots starting...");
        if let Err(e) = start() {
            log::error!("Failed to start: {:?}", e);
        }
    }

    fn start() -> Result<(), JsValue> {
        let window = window()?;
        let game_surface = CanvasSurface::new(element::<HtmlCanvasElement>("game-canvas")?)?;
        let preview_surface = CanvasSurface::new(element::<HtmlCanvasElement>("stats-canvas")?)?;

        let game_cb: FrameCallback = Rc::new(RefCell::new(None));
        let preview_cb: FrameCallback = Rc::new(RefCell::new(None));

        let app: Shared = Rc::new(RefCell::new(App {
            game: Game::new(Settings::load()),
            scheduler: RafScheduler {
                window: window.clone(),
                game_cb: game_cb.clone(),
                preview_cb: preview_cb.clone(),
            },
            game_surface,
            preview_surface,
            input: TickInput::default(),
            pager: LeaderboardPager::default(),
            api_url: DEFAULT_API_URL.to_string(),
        }));

        let frame_app = app.clone();
        *game_cb.borrow_mut() = Some(Closure::new(move |now: f64| {
            on_game_frame(&frame_app, now);
        }));
        let frame_app = app.clone();
        *preview_cb.borrow_mut() = Some(Closure::new(move |now: f64| {
            on_preview_frame(&frame_app, now);
        }));

        bind_keyboard(&app, &window);
        bind_stats(&app);
        bind_modals(&app)?;

        let resize_app = app.clone();
        on(&window, "resize", move |_| resize(&resize_app));
        resize(&app);

        hide_modals();
        app.borrow_mut().restart();
        log::info!("Dots initialized");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Headless session: steer toward the collectable for a few simulated
/// seconds and log every notification.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dots_game::platform::{LoopTarget, QueuedScheduler};
    use dots_game::renderer::{Surface, Viewport};
    use dots_game::sim::{Colour, TickInput};
    use dots_game::{Game, Settings};
    use glam::Vec2;

    /// Surface that draws nothing
    struct NullSurface;

    impl Surface for NullSurface {
        fn set_transform(&mut self, _: &Viewport) {}
        fn fill_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: Colour) {}
        fn stroke_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Colour) {}
        fn fill_circle(&mut self, _: Vec2, _: f32, _: Colour) {}
        fn stroke_line(&mut self, _: Vec2, _: Vec2, _: f32, _: Colour) {}
        fn measure_text(&mut self, text: &str, _: &str) -> f32 {
            text.len() as f32 * 10.0
        }
        fn fill_text(&mut self, _: &str, _: &str, _: Vec2, _: Colour) {}
        fn stroke_text(&mut self, _: &str, _: &str, _: Vec2, _: f32, _: Colour) {}
    }

    env_logger::init();
    log::info!("Dots (native) - running a headless session");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let mut game = Game::new(Settings::load());
    let mut scheduler = QueuedScheduler::new();
    let mut surface = NullSurface;
    game.resize_game(1280.0, 720.0, &mut surface);
    game.start_game(seed, &mut scheduler);

    let frame_ms = 1000.0 / 60.0;
    let mut now = 0.0;
    for _ in 0..60 * 30 {
        if game.has_ended() {
            break;
        }
        let input = game.state().map(steer).unwrap_or_default();
        for (_, target) in scheduler.take_pending() {
            if target == LoopTarget::Game {
                game.next_game_frame(now, &input, &mut scheduler, &mut surface);
            }
        }
        for event in game.drain_events() {
            log::info!("{:?}", event);
        }
        now += frame_ms;
    }

    if let Some((score, time_ms)) = game.results() {
        log::info!("Run over: score {} in {} ms", score, time_ms);
    } else if let Some(state) = game.state() {
        log::info!("Still alive after {:.1}s with score {}", state.elapsed, state.score);
    }
    game.stop_game(&mut scheduler, &mut surface);

    /// Hold the arrow keys that point at the collectable
    fn steer(state: &dots_game::sim::GameState) -> TickInput {
        let delta = state.collectable.body.pos - state.player.body.pos;
        TickInput {
            up: delta.y < -1.0,
            down: delta.y > 1.0,
            left: delta.x < -1.0,
            right: delta.x > 1.0,
            pause: false,
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
