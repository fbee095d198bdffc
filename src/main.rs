//! Candy Dodge entry point
//!
//! Browser builds run the DOM shell; native builds run a seeded headless
//! autopilot session and print its summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_shell {
    use std::cell::RefCell;
    use std::fmt::Write as _;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent, MouseEvent, TouchEvent};

    use candy_dodge::audio::{AudioManager, Melody, SoundCue};
    use candy_dodge::consts::*;
    use candy_dodge::persistence::{LocalStorage, MemoryStorage, Storage};
    use candy_dodge::platform::{Direction, dispatch};
    use candy_dodge::sim::{GameEvent, ObstacleShape};
    use candy_dodge::{Difficulty, Leaderboard, RunSummary, Session, Settings};

    type Store = Box<dyn Storage>;

    /// localStorage when the page has it, otherwise a throwaway map
    fn open_storage() -> Store {
        match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => {
                log::warn!("localStorage unavailable - scores will not persist");
                Box::new(MemoryStorage::new())
            }
        }
    }

    fn ask_name(summary: &RunSummary) -> Option<String> {
        let message = format!(
            "NEW HIGH SCORE!\nYour cotton candy survived {} seconds!\nFinal Score: {} (Level {})\n\nEnter your name for the leaderboard:",
            summary.elapsed_seconds, summary.score, summary.level
        );
        web_sys::window()?
            .prompt_with_message_and_default(&message, "")
            .ok()
            .flatten()
    }

    /// Rendered width of the play field, if it is on the page
    fn measured_track_width() -> Option<f32> {
        let field = web_sys::window()?.document()?.get_element_by_id("game")?;
        Some(field.client_width() as f32)
    }

    fn new_session(settings: &Settings) -> Session<Store> {
        let settings = match measured_track_width() {
            Some(width) => settings.clone().with_track_width(width),
            None => settings.clone(),
        };
        let seed = js_sys::Date::now() as u64;
        Session::new(&settings, open_storage(), Box::new(ask_name), seed)
    }

    /// Browser game instance
    struct Game {
        session: Session<Store>,
        settings: Settings,
        audio: AudioManager,
        melody: Melody,
        last_time: f64,
        /// Sub-millisecond remainder carried between frames
        carry_ms: f64,
        touch_start: Option<(f32, f32)>,
        shown_game_over: bool,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            Self {
                session: new_session(&settings),
                audio: AudioManager::new(&settings),
                settings,
                melody: Melody::new(),
                last_time: 0.0,
                carry_ms: 0.0,
                touch_start: None,
                shown_game_over: false,
            }
        }

        fn restart(&mut self) {
            self.session = new_session(&self.settings);
            self.melody.reset();
            self.shown_game_over = false;
            log::info!("Game restarted");
        }

        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                0.0
            };
            self.last_time = time;

            self.carry_ms += dt.max(0.0);
            let whole = self.carry_ms.floor();
            self.carry_ms -= whole;

            let mut events = self.session.drain_events();
            events.extend(self.session.advance(whole as u64));
            self.handle_events(&events);

            if self.session.state().is_running() {
                for note in self.melody.advance(whole as u64) {
                    self.audio.play_note(note);
                }
            }
        }

        fn handle_events(&self, events: &[GameEvent]) {
            for event in events {
                if let Some(cue) = SoundCue::for_event(event) {
                    self.audio.play(cue);
                }
                if let GameEvent::LevelUp {
                    level,
                    shield_granted,
                } = event
                {
                    log::info!("Level {} (shield: {})", level, shield_granted);
                }
            }
        }

        fn set_difficulty(&mut self, difficulty: Difficulty) {
            if self.session.select_difficulty(difficulty) {
                self.settings.difficulty = difficulty;
                self.settings.save(&mut open_storage());
            }
        }

        fn toggle_music(&mut self) {
            self.settings.music_enabled = !self.settings.music_enabled;
            self.audio.apply_settings(&self.settings);
            self.settings.save(&mut open_storage());
        }

        fn toggle_sfx(&mut self) {
            self.settings.sfx_enabled = !self.settings.sfx_enabled;
            self.audio.apply_settings(&self.settings);
            self.settings.save(&mut open_storage());
        }

        /// Redraw the play field and HUD
        fn render(&mut self, document: &Document) {
            let state = self.session.state();

            if let Some(player) = document.get_element_by_id("player") {
                let class = if state.progression.is_shielded {
                    "shielded"
                } else {
                    ""
                };
                let _ = player.set_attribute("class", class);
                let _ = player.set_attribute(
                    "style",
                    &format!("left:{}px;top:{}px", state.player.x, PLAYER_Y),
                );
            }

            if let Some(layer) = document.get_element_by_id("candies") {
                let mut html = String::new();
                for o in &state.obstacles {
                    let shape = match o.shape {
                        ObstacleShape::Square => "square",
                        ObstacleShape::Circle => "circle",
                        ObstacleShape::Diamond => "diamond",
                        ObstacleShape::Triangle => "triangle",
                    };
                    let bounce = if o.bouncing { " bouncing" } else { "" };
                    let _ = write!(
                        html,
                        r#"<div class="candy {shape}{bounce}" style="left:{}px;top:{}px;width:{}px;height:{}px"></div>"#,
                        o.pos.x, o.pos.y, o.size, o.size
                    );
                }
                layer.set_inner_html(&html);
            }

            let p = &state.progression;
            set_text(document, "time", &state.elapsed_seconds.to_string());
            set_text(document, "score", &state.score.to_string());
            set_text(document, "level", &p.level.to_string());
            set_text(document, "currentLevel", &p.level.to_string());
            set_text(document, "currentExp", &p.current_exp.to_string());
            set_text(document, "maxExp", &p.max_exp.to_string());
            set_text(document, "accuracyBonus", &p.accuracy_bonus.to_string());
            set_text(
                document,
                "scoreMultiplier",
                &format!("{:.1}", p.score_multiplier),
            );
            set_text(document, "shieldCharges", &p.shield_charges.to_string());
            set_text(document, "difficulty", state.difficulty.as_str());
            if let Some(fill) = document.get_element_by_id("expFill") {
                let _ = fill.set_attribute(
                    "style",
                    &format!("width:{:.1}%", p.exp_fraction() * 100.0),
                );
            }
            set_text(
                document,
                "musicBtn",
                if self.settings.music_enabled {
                    "Music: On"
                } else {
                    "Music: Off"
                },
            );
            set_text(
                document,
                "sfxBtn",
                if self.settings.sfx_enabled {
                    "SFX: On"
                } else {
                    "SFX: Off"
                },
            );
            set_text(
                document,
                "pauseBtn",
                if state.is_paused { "Resume" } else { "Pause" },
            );

            if let Some(summary) = self.session.summary().cloned() {
                if !self.shown_game_over {
                    self.show_game_over(document, &summary);
                    self.shown_game_over = true;
                }
            }
        }

        fn show_game_over(&self, document: &Document, summary: &RunSummary) {
            set_text(document, "final-score", &summary.score.to_string());
            set_text(document, "final-time", &summary.elapsed_seconds.to_string());
            set_text(document, "final-level", &summary.level.to_string());
            set_text(
                document,
                "final-rank",
                &summary
                    .rank
                    .map(|r| format!("#{}", r))
                    .unwrap_or_else(|| "-".to_string()),
            );

            render_leaderboard(document, self.session.leaderboard());
            if let Some(el) = document.get_element_by_id("game-over") {
                let _ = el.set_attribute("class", "");
            }
        }
    }

    fn render_leaderboard(document: &Document, board: &Leaderboard) {
        let Some(list) = document.get_element_by_id("leaderboard") else {
            return;
        };
        let mut html = String::new();
        for (i, entry) in board.entries.iter().enumerate() {
            let _ = write!(
                html,
                "<li><span>{}. {}</span><span>{}</span></li>",
                i + 1,
                escape_html(&entry.name),
                entry.score
            );
        }
        list.set_inner_html(&html);
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn escape_html(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '&' => out.push_str("&amp;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Candy Dodge starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load(&open_storage());
        let game = Rc::new(RefCell::new(Game::new(settings)));
        render_leaderboard(&document, game.borrow().session.leaderboard());

        // Obstacle layer inside the play field
        if let Some(field) = document.get_element_by_id("game") {
            if document.get_element_by_id("candies").is_none() {
                if let Ok(layer) = document.create_element("div") {
                    layer.set_id("candies");
                    let _ = field.append_child(&layer);
                }
            }
        }

        setup_keyboard(game.clone());
        setup_touch(&document, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(&document, game.clone());

        request_animation_frame(game);

        log::info!("Candy Dodge running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                dispatch(&game, |g| {
                    g.audio.resume();
                    match event.key().as_str() {
                        "ArrowLeft" => g.session.press(Direction::Left),
                        "ArrowRight" => g.session.press(Direction::Right),
                        " " | "Spacebar" => {
                            event.prevent_default();
                            g.session.activate_shield();
                        }
                        "p" | "P" | "Escape" => g.session.toggle_pause(),
                        "1" => g.set_difficulty(Difficulty::Easy),
                        "2" => g.set_difficulty(Difficulty::Normal),
                        "3" => g.set_difficulty(Difficulty::Hard),
                        "4" => g.set_difficulty(Difficulty::Insane),
                        "Enter" if g.session.is_over() => g.restart(),
                        _ => {}
                    }
                });
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                dispatch(&game, |g| match event.key().as_str() {
                    "ArrowLeft" => g.session.release(Direction::Left),
                    "ArrowRight" => g.session.release(Direction::Right),
                    _ => {}
                });
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(field) = document.get_element_by_id("game") else {
            return;
        };

        // Swipe start, or two-finger shield
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                dispatch(&game, |g| {
                    g.audio.resume();
                    let touches = event.touches();
                    if touches.length() == 2 {
                        event.prevent_default();
                        g.touch_start = None;
                        g.session.activate_shield();
                    } else if let Some(touch) = touches.get(0) {
                        g.touch_start = Some((touch.client_x() as f32, touch.client_y() as f32));
                    }
                });
            });
            let _ = field
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Swipe end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                dispatch(&game, |g| {
                    let Some((x0, y0)) = g.touch_start.take() else {
                        return;
                    };
                    if let Some(touch) = event.changed_touches().get(0) {
                        let dx = touch.client_x() as f32 - x0;
                        let dy = touch.client_y() as f32 - y0;
                        g.session.swipe(dx, dy);
                    }
                });
            });
            let _ =
                field.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Hold-to-move on-screen buttons (touch and mouse)
    fn bind_hold(button: &Element, game: &Rc<RefCell<Game>>, dir: Direction) {
        for (name, down) in [
            ("touchstart", true),
            ("mousedown", true),
            ("touchend", false),
            ("mouseup", false),
            ("mouseleave", false),
        ] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
                dispatch(&game, |g| {
                    if down {
                        g.audio.resume();
                        g.session.press(dir);
                    } else {
                        g.session.release(dir);
                    }
                });
            });
            let _ = button.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, mut action: impl FnMut() + 'static) {
        let Some(button) = document.get_element_by_id(id) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| action());
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("leftBtn") {
            bind_hold(&btn, &game, Direction::Left);
        }
        if let Some(btn) = document.get_element_by_id("rightBtn") {
            bind_hold(&btn, &game, Direction::Right);
        }

        {
            let game = game.clone();
            on_click(document, "shieldBtn", move || {
                dispatch(&game, |g| g.session.activate_shield());
            });
        }
        {
            let game = game.clone();
            on_click(document, "pauseBtn", move || {
                dispatch(&game, |g| g.session.toggle_pause());
            });
        }
        {
            let game = game.clone();
            on_click(document, "musicBtn", move || {
                dispatch(&game, |g| g.toggle_music());
            });
        }
        {
            let game = game.clone();
            on_click(document, "sfxBtn", move || {
                dispatch(&game, |g| g.toggle_sfx());
            });
        }
        for tier in Difficulty::ALL {
            let game = game.clone();
            let id = format!("difficulty-{}", tier.as_str());
            on_click(document, &id, move || {
                dispatch(&game, |g| g.set_difficulty(tier));
            });
        }
        {
            let game = game.clone();
            on_click(document, "restart-btn", move || {
                if dispatch(&game, |g| g.restart()).is_none() {
                    return;
                }
                if let Some(el) = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.get_element_by_id("game-over"))
                {
                    let _ = el.set_attribute("class", "hidden");
                }
            });
        }
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    if dispatch(&game, |g| g.session.suspend()).is_some() {
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur drops held keys so nothing sticks
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if dispatch(&game, |g| g.session.suspend()).is_some() {
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
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
        {
            let mut g = game.borrow_mut();
            g.update(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.render(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_shell::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use candy_dodge::consts::*;
    use candy_dodge::persistence::MemoryStorage;
    use candy_dodge::platform::Direction;
    use candy_dodge::sim::{GameEvent, GameState};
    use candy_dodge::{Difficulty, RunSummary, Session, Settings};

    /// Look-ahead band above the player
    const WATCH_DISTANCE: f32 = 150.0;
    /// Give up after this much game time
    const MAX_RUN_MS: u64 = 10 * 60 * 1000;

    /// Pick a direction away from the lowest obstacle in the player's lane.
    /// Also reports whether that obstacle is about to land.
    pub fn steer(state: &GameState) -> (Option<Direction>, bool) {
        let player = state.player.hitbox();
        let threat = state
            .obstacles
            .iter()
            .filter(|o| {
                o.pos.y + o.size > PLAYER_Y - WATCH_DISTANCE && o.pos.y < PLAYER_Y + PLAYER_HEIGHT
            })
            .filter(|o| o.pos.x < player.max.x + MIN_OVERLAP && o.pos.x + o.size > player.min.x - MIN_OVERLAP)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        let Some(threat) = threat else {
            return (None, false);
        };
        let imminent = threat.pos.y + threat.size > PLAYER_Y - 2.0 * threat.fall_speed;

        let room_left = threat.pos.x;
        let room_right = state.track.width - (threat.pos.x + threat.size);
        let threat_center = threat.pos.x + threat.size / 2.0;
        let go_left = room_left >= PLAYER_WIDTH
            && (player.center().x < threat_center || room_right < PLAYER_WIDTH);
        let dir = if go_left {
            Direction::Left
        } else {
            Direction::Right
        };
        (Some(dir), imminent)
    }

    /// Play one session to the end and return its summary
    pub fn run(seed: u64, difficulty: Difficulty) -> Option<RunSummary> {
        let settings = Settings::with_difficulty(difficulty);
        let prompt = Box::new(|summary: &RunSummary| {
            log::info!("High score {} qualifies", summary.score);
            Some("Autopilot".to_string())
        });
        let mut session = Session::new(&settings, MemoryStorage::new(), prompt, seed);

        let mut held: Option<Direction> = None;
        while !session.is_over() && session.now() < MAX_RUN_MS {
            let (dir, imminent) = steer(session.state());
            if dir != held {
                if let Some(old) = held {
                    session.release(old);
                }
                if let Some(new) = dir {
                    session.press(new);
                }
                held = dir;
            }
            if imminent && !session.state().progression.is_shielded {
                session.activate_shield();
            }

            for event in session.advance(MOTION_TICK_MS) {
                match event {
                    GameEvent::LevelUp {
                        level,
                        shield_granted,
                    } => log::debug!("Level {} (shield: {})", level, shield_granted),
                    GameEvent::ShieldAbsorbed { id, .. } => {
                        log::debug!("Shield absorbed obstacle {}", id)
                    }
                    _ => {}
                }
            }
        }

        if !session.is_over() {
            log::warn!("Stopped after {} ms without a collision", MAX_RUN_MS);
        }
        session.summary().cloned()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Candy Dodge (native) starting...");
    log::info!("Native mode runs a headless autopilot - serve the wasm build to play");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    let difficulty = args
        .next()
        .and_then(|s| candy_dodge::Difficulty::from_str(&s))
        .unwrap_or_default();

    match autopilot::run(seed, difficulty) {
        Some(summary) => {
            println!(
                "Seed {} on {}: score {}, survived {}s, level {}, avoided {}, rank {}",
                seed,
                summary.difficulty.as_str(),
                summary.score,
                summary.elapsed_seconds,
                summary.level,
                summary.avoided,
                summary
                    .rank
                    .map(|r| format!("#{}", r))
                    .unwrap_or_else(|| "-".to_string())
            );
        }
        None => println!("Seed {}: autopilot survived the whole run", seed),
    }
}
