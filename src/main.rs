//! Reflex Arcade entry point
//!
//! Handles platform-specific initialization. The web build wires DOM events
//! to the session and paints its signals; the native build plays every level
//! headless with the demo player.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement};

    use reflex_arcade::consts::ROUNDS_PER_LEVEL;
    use reflex_arcade::persistence::default_store;
    use reflex_arcade::platform::MonotonicClock;
    use reflex_arcade::sim::games::memory::{CardFace, MemoryEvent};
    use reflex_arcade::sim::games::reaction::ReactionEvent;
    use reflex_arcade::sim::games::simon::SimonEvent;
    use reflex_arcade::sim::games::stroop::StroopEvent;
    use reflex_arcade::sim::{Action, GameInput, LevelResult, Screen, Session, Signal};

    /// Navigation buttons and the action each one sends
    const BUTTONS: [(&str, Action); 12] = [
        ("btn-start", Action::Start),
        ("btn-menu-back", Action::MenuBack),
        ("btn-prep-back", Action::PrepBack),
        ("btn-begin", Action::BeginLevel),
        ("btn-leave", Action::LeaveLevel),
        ("btn-retry", Action::Retry),
        ("btn-next", Action::NextLevel),
        ("btn-results-menu", Action::ResultsToMenu),
        ("btn-end-restart", Action::EndRestart),
        ("btn-end-menu", Action::EndToMenu),
        ("btn-reset", Action::ResetProgress),
        ("btn-end-results", Action::ShowEndResults(true)),
    ];

    const SCREENS: [Screen; 7] = [
        Screen::Start,
        Screen::Menu,
        Screen::LevelPrep,
        Screen::Countdown,
        Screen::Game,
        Screen::Results,
        Screen::EndMenu,
    ];

    /// Browser app holding the session and its DOM bindings
    struct App {
        session: Session,
        clock: MonotonicClock,
        document: Document,
        confetti_ctx: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
    }

    impl App {
        fn dispatch(&mut self, action: Action) {
            let now = self.clock.now_ms();
            self.session.dispatch(action, now);
            self.flush();
        }

        fn frame(&mut self) {
            let now = self.clock.now_ms();
            self.session.frame(now);
            self.flush();
            self.draw_confetti();
        }

        /// Apply every pending signal to the DOM
        fn flush(&mut self) {
            let mut remeasure = false;
            for signal in self.session.drain_signals() {
                remeasure |= matches!(
                    signal,
                    Signal::Screen(Screen::Countdown) | Signal::Screen(Screen::Game)
                );
                self.apply(signal);
            }
            // The game area only has a layout box once its screen is up
            if remeasure {
                self.measure();
            }
        }

        fn apply(&self, signal: Signal) {
            let doc = &self.document;
            match signal {
                Signal::Screen(screen) => {
                    for s in SCREENS {
                        set_hidden(doc, &format!("screen-{}", s.as_str()), s != screen);
                    }
                }
                Signal::Levels(unlocked) => {
                    for (i, open) in unlocked.iter().enumerate() {
                        let selector = format!("[data-level=\"{}\"]", i + 1);
                        if let Some(btn) = doc.query_selector(&selector).ok().flatten() {
                            let _ = btn.class_list().toggle_with_force("locked", !open);
                        }
                    }
                }
                Signal::LevelPrep {
                    level,
                    name,
                    description,
                    max_time_ms,
                } => {
                    set_text(doc, "prep-title", &format!("Level {}: {}", level.id(), name));
                    set_text(doc, "prep-description", description);
                    set_text(doc, "prep-max-time", &format!("Max time: {} ms", max_time_ms));
                }
                Signal::Countdown(text) => set_text(doc, "countdown-text", text),
                Signal::Round { level, round } => {
                    set_text(doc, "game-title", &format!("Level {}: {}", level.id(), level.name()));
                    set_text(
                        doc,
                        "game-round",
                        &format!("Round {}/{}", round, ROUNDS_PER_LEVEL),
                    );
                    for game in ["reaction", "stroop", "simon", "memory"] {
                        let id = format!("game-{}", game);
                        let active = game == level_key(level.id());
                        set_hidden(doc, &id, !active);
                    }
                }
                Signal::Status(text) => set_text(doc, "game-status", &text),
                Signal::Notice(text) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(&text);
                    }
                }
                Signal::Result(result) => show_result(doc, &result),
                Signal::EndResults(rows) => {
                    set_hidden(doc, "end-results", rows.is_none());
                    if let Some(rows) = rows {
                        let html: String = rows
                            .iter()
                            .map(|r| {
                                format!(
                                    "<li>{}: {}</li>",
                                    r.level.name(),
                                    r.time_text()
                                )
                            })
                            .collect();
                        if let Some(list) = doc.get_element_by_id("end-results-list") {
                            list.set_inner_html(&html);
                        }
                    }
                }
                Signal::Confetti(on) => {
                    set_hidden(doc, "confetti", !on);
                    if !on {
                        if let Some((canvas, ctx)) = &self.confetti_ctx {
                            ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
                        }
                    }
                }
                Signal::Reaction(event) => apply_reaction(doc, event),
                Signal::Stroop(event) => apply_stroop(doc, event),
                Signal::Simon(event) => apply_simon(doc, event),
                Signal::Memory(event) => apply_memory(doc, event),
            }
        }

        fn draw_confetti(&self) {
            let (Some(confetti), Some((canvas, ctx))) =
                (self.session.confetti(), self.confetti_ctx.as_ref())
            else {
                return;
            };
            let bounds = confetti.bounds();
            if canvas.width() != bounds.x as u32 || canvas.height() != bounds.y as u32 {
                canvas.set_width(bounds.x as u32);
                canvas.set_height(bounds.y as u32);
            }
            ctx.clear_rect(0.0, 0.0, bounds.x as f64, bounds.y as f64);
            for piece in confetti.pieces() {
                ctx.save();
                let _ = ctx.translate(piece.pos.x as f64, piece.pos.y as f64);
                let _ = ctx.rotate(piece.rot as f64);
                ctx.set_fill_style_str(piece.color);
                let s = piece.size as f64;
                ctx.fill_rect(-s, -s * 0.5, s * 2.0, s);
                ctx.restore();
            }
        }

        /// Measure the window and the game area and tell the session
        fn measure(&mut self) {
            if let Some(window) = web_sys::window() {
                let width = window.inner_width().ok().and_then(|v| v.as_f64());
                let height = window.inner_height().ok().and_then(|v| v.as_f64());
                if let (Some(width), Some(height)) = (width, height) {
                    self.dispatch(Action::ResizeScreen {
                        width: width as f32,
                        height: height as f32,
                    });
                }
            }
            if let Some(area) = self.document.get_element_by_id("game-area") {
                let rect = area.get_bounding_client_rect();
                if rect.width() > 0.0 && rect.height() > 0.0 {
                    self.dispatch(Action::Resize {
                        width: rect.width() as f32,
                        height: rect.height() as f32,
                    });
                }
            }
        }
    }

    fn level_key(id: u8) -> &'static str {
        match id {
            1 => "reaction",
            2 => "stroop",
            3 => "simon",
            _ => "memory",
        }
    }

    fn set_text(doc: &Document, id: &str, text: &str) {
        if let Some(el) = doc.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(doc: &Document, id: &str, hidden: bool) {
        if let Some(el) = doc.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_disabled(doc: &Document, id: &str, disabled: bool) {
        if let Some(el) = doc.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("disabled", disabled);
        }
    }

    fn style(el: &Element, prop: &str, value: &str) {
        if let Some(el) = el.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(prop, value);
        }
    }

    fn show_result(doc: &Document, result: &LevelResult) {
        set_text(doc, "result-stats", &result.stats_text());
        set_text(doc, "result-status", result.status_text());
        if let Some(el) = doc.get_element_by_id("result-status") {
            let _ = el.class_list().toggle_with_force("passed", result.passed);
        }
        set_hidden(doc, "result-new-best", !result.new_best);
        set_hidden(doc, "btn-next", !result.has_next());
    }

    fn apply_reaction(doc: &Document, event: ReactionEvent) {
        let Some(target) = doc.get_element_by_id("reaction-target") else {
            return;
        };
        match event {
            ReactionEvent::Waiting | ReactionEvent::TargetHit => {
                let _ = target.class_list().add_1("hidden");
            }
            ReactionEvent::TargetShown { pos, size } => {
                style(&target, "left", &format!("{}px", pos.x));
                style(&target, "top", &format!("{}px", pos.y));
                style(&target, "width", &format!("{}px", size));
                style(&target, "height", &format!("{}px", size));
                let _ = target.class_list().remove_1("hidden");
            }
        }
    }

    fn apply_stroop(doc: &Document, event: StroopEvent) {
        match event {
            StroopEvent::Word { word, color } => {
                set_text(doc, "stroop-word", word);
                if let Some(el) = doc.get_element_by_id("stroop-word") {
                    style(&el, "color", color);
                }
                set_disabled(doc, "stroop-answers", false);
            }
            StroopEvent::Answered { .. } => set_disabled(doc, "stroop-answers", true),
        }
    }

    fn apply_simon(doc: &Document, event: SimonEvent) {
        match event {
            SimonEvent::Flash { panel, on } | SimonEvent::Press { panel, on } => {
                let selector = format!("[data-panel=\"{}\"]", panel);
                if let Some(el) = doc.query_selector(&selector).ok().flatten() {
                    let _ = el.class_list().toggle_with_force("lit", on);
                }
            }
            SimonEvent::InputEnabled(on) => set_disabled(doc, "simon-board", !on),
        }
    }

    fn card_element(doc: &Document, index: usize) -> Option<Element> {
        let selector = format!("[data-card=\"{}\"]", index);
        doc.query_selector(&selector).ok().flatten()
    }

    fn apply_memory(doc: &Document, event: MemoryEvent) {
        let Some(board) = doc.get_element_by_id("memory-board") else {
            return;
        };
        match event {
            MemoryEvent::Board { layout, symbols } => {
                board.set_inner_html("");
                style(
                    &board,
                    "grid-template-columns",
                    &format!("repeat({}, {}px)", layout.cols, layout.card_w),
                );
                for (i, symbol) in symbols.iter().enumerate() {
                    let Ok(card) = doc.create_element("div") else {
                        continue;
                    };
                    card.set_class_name("card");
                    let _ = card.set_attribute("data-card", &i.to_string());
                    let _ = card.set_attribute("data-symbol", &symbol.to_string());
                    style(&card, "width", &format!("{}px", layout.card_w));
                    style(&card, "height", &format!("{}px", layout.card_h));
                    let _ = board.append_child(&card);
                }
                let _ = board.class_list().add_1("disabled");
            }
            MemoryEvent::Preview(on) => {
                if let Ok(cards) = board.query_selector_all(".card") {
                    for i in 0..cards.length() {
                        let Some(card) = cards.get(i).and_then(|n| n.dyn_into::<Element>().ok())
                        else {
                            continue;
                        };
                        show_card(&card, if on { CardFace::Up } else { CardFace::Down });
                    }
                }
            }
            MemoryEvent::Card { index, face } => {
                if let Some(card) = card_element(doc, index) {
                    show_card(&card, face);
                }
            }
            MemoryEvent::Highlight { a, b, on } => {
                for i in [a, b] {
                    if let Some(card) = card_element(doc, i) {
                        let _ = card.class_list().toggle_with_force("pulse", on);
                    }
                }
            }
            MemoryEvent::InputEnabled(on) => {
                let _ = board.class_list().toggle_with_force("disabled", !on);
            }
        }
    }

    fn show_card(card: &Element, face: CardFace) {
        let up = face != CardFace::Down;
        let symbol = card.get_attribute("data-symbol").unwrap_or_default();
        card.set_text_content(Some(if up { symbol.as_str() } else { "" }));
        let _ = card.class_list().toggle_with_force("up", up);
        let _ = card.class_list().toggle_with_force("matched", face == CardFace::Matched);
    }

    /// Attribute `attr` of the nearest element under the event target carrying it
    fn target_attr(event: &web_sys::Event, attr: &str) -> Option<String> {
        let target = event.target()?.dyn_into::<Element>().ok()?;
        let holder = target.closest(&format!("[{}]", attr)).ok()??;
        holder.get_attribute(attr)
    }

    fn listen(
        el: &web_sys::EventTarget,
        events: &[&str],
        app: &Rc<RefCell<App>>,
        handler: impl Fn(&web_sys::Event) -> Option<Action> + 'static,
    ) {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            if let Some(action) = handler(&event) {
                app.borrow_mut().dispatch(action);
            }
        });
        for name in events {
            let _ = el.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
        closure.forget();
    }

    /// Touch screens fire both; the session drops the duplicate
    const TAP_EVENTS: [&str; 2] = ["pointerup", "click"];

    fn setup_input_handlers(doc: &Document, app: &Rc<RefCell<App>>) {
        for (id, action) in BUTTONS {
            match doc.get_element_by_id(id) {
                Some(btn) => listen(&btn, &TAP_EVENTS, app, move |_| Some(action)),
                None => log::warn!("Missing button #{}", id),
            }
        }
        if let Some(el) = doc.get_element_by_id("btn-end-results-close") {
            listen(&el, &TAP_EVENTS, app, |_| Some(Action::ShowEndResults(false)));
        }

        if let Some(list) = doc.get_element_by_id("level-list") {
            listen(&list, &TAP_EVENTS, app, |e| {
                let id = target_attr(e, "data-level")?.parse().ok()?;
                Some(Action::SelectLevel(id))
            });
        }

        // In-game controls react on press, never de-duplicated
        if let Some(target) = doc.get_element_by_id("reaction-target") {
            listen(&target, &["pointerdown"], app, |_| {
                Some(Action::Game(GameInput::TargetHit))
            });
        }
        for (id, says_match) in [("btn-match", true), ("btn-no-match", false)] {
            if let Some(btn) = doc.get_element_by_id(id) {
                listen(&btn, &["pointerdown"], app, move |_| {
                    Some(Action::Game(GameInput::Answer(says_match)))
                });
            }
        }
        if let Some(board) = doc.get_element_by_id("simon-board") {
            listen(&board, &["pointerdown"], app, |e| {
                let panel = target_attr(e, "data-panel")?.parse().ok()?;
                Some(Action::Game(GameInput::Panel(panel)))
            });
        }
        if let Some(board) = doc.get_element_by_id("memory-board") {
            listen(&board, &["pointerdown"], app, |e| {
                let card = target_attr(e, "data-card")?.parse().ok()?;
                Some(Action::Game(GameInput::Card(card)))
            });
        }
    }

    fn setup_resize(app: &Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().measure();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn confetti_context(doc: &Document) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
        let canvas: HtmlCanvasElement = doc.get_element_by_id("confetti")?.dyn_into().ok()?;
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some((canvas, ctx))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Reflex Arcade starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let seed = js_sys::Date::now() as u64;
        let clock = MonotonicClock::new();
        let session = Session::new(default_store(), seed, clock.now_ms());
        let confetti_ctx = confetti_context(&document);
        if confetti_ctx.is_none() {
            log::warn!("No confetti canvas, celebration will not be drawn");
        }

        let app = Rc::new(RefCell::new(App {
            session,
            clock,
            document: document.clone(),
            confetti_ctx,
        }));
        log::info!("Session initialized with seed: {}", seed);

        setup_input_handlers(&document, &app);
        setup_resize(&app);
        {
            let mut a = app.borrow_mut();
            a.flush();
            a.measure();
        }

        request_animation_frame(app);
        log::info!("Reflex Arcade running!");
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            app.borrow_mut().frame();
            request_animation_frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Reflex Arcade (native) starting...");
    log::info!("The browser build is the playable one - run with `trunk serve`");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: the autoplayer clears all four levels on virtual time
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use reflex_arcade::persistence::MemoryStorage;
    use reflex_arcade::sim::{Action, Level, Screen, Session, Signal, autoplay_input};

    /// Thinking time of the demo player per move
    const MOVE_MS: f64 = 280.0;

    pub fn run(seed: u64) {
        let mut session = Session::new(Box::new(MemoryStorage::new()), seed, 0.0);
        let mut now = 0.0;

        for level in Level::ALL {
            if let Err(e) = session.start_level(level) {
                log::error!("Could not start level {}: {}", level.id(), e);
                return;
            }
            while session.screen() == Screen::Game {
                match session.game().and_then(autoplay_input) {
                    Some(input) => {
                        now += MOVE_MS;
                        session.dispatch(Action::Game(input), now);
                    }
                    None => match session.next_due() {
                        Some(due) => {
                            now = due.max(now);
                            session.advance_to(now);
                        }
                        None => {
                            log::error!("Level {} stalled", level.id());
                            return;
                        }
                    },
                }
            }

            for signal in session.drain_signals() {
                if let Signal::Result(result) = signal {
                    println!(
                        "Level {} ({}): {} - {}",
                        level.id(),
                        level.name(),
                        result.status_text(),
                        result.stats_text().replace('\n', ", ")
                    );
                }
            }
        }

        println!(
            "Completed {} of {} levels",
            session.progress().completed_ids().len(),
            Level::ALL.len()
        );
    }
}
