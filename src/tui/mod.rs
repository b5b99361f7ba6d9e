mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::chat::ChatSession;
use crate::error::{Result, ShopError};
use crate::pipeline::{Recommendation, Recommender};

/// Event poll interval; also drives the loading animation.
const TICK: Duration = Duration::from_millis(120);
const PAGE: u16 = 5;

pub struct App {
    session: ChatSession,
    recommender: Arc<Recommender>,
    runtime: Runtime,
    inflight: Option<JoinHandle<Result<Recommendation>>>,
    /// Turn whose show-more toggle Ctrl-E acts on
    selected_turn: Option<String>,
    scroll: u16,
    follow_tail: bool,
    tick: usize,
}

impl App {
    pub fn new(recommender: Recommender, runtime: Runtime) -> App {
        App {
            session: ChatSession::new(),
            recommender: Arc::new(recommender),
            runtime,
            inflight: None,
            selected_turn: None,
            scroll: 0,
            follow_tail: true,
            tick: 0,
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        loop {
            self.poll_inflight();

            let size = terminal.size()?;
            self.sync_scroll(Rect::new(0, 0, size.width, size.height));

            terminal.draw(|f| {
                if self.session.is_open() {
                    ui::render_chat(f, self)
                } else {
                    ui::render_launcher(f)
                }
            })?;

            if !event::poll(TICK)? {
                self.tick = self.tick.wrapping_add(1);
                continue;
            }

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if self.handle_key(key) {
                    return Ok(());
                }
            }
        }
    }

    /// Hand a finished pipeline run back to the session.
    fn poll_inflight(&mut self) {
        if !self.inflight.as_ref().is_some_and(|h| h.is_finished()) {
            return;
        }
        if let Some(handle) = self.inflight.take() {
            let outcome = self
                .runtime
                .block_on(handle)
                .unwrap_or_else(|e| Err(ShopError::Task(e.to_string())));
            self.session.resolve(outcome);
        }
    }

    fn start_search(&mut self, query: String) {
        let recommender = Arc::clone(&self.recommender);
        self.inflight = Some(
            self.runtime
                .spawn(async move { recommender.search(&query).await }),
        );
    }

    /// Pin the transcript to the newest turn whenever the turn list changed.
    fn sync_scroll(&mut self, area: Rect) {
        if self.session.take_scroll_request() {
            self.follow_tail = true;
        }
        let viewport = ui::transcript_viewport(area);
        let total = ui::transcript_lines(
            &self.session,
            self.selected_turn.as_deref(),
            self.tick,
            viewport.width,
        )
        .len() as u16;
        let max = total.saturating_sub(viewport.height);
        if self.follow_tail || self.scroll >= max {
            self.scroll = max;
            self.follow_tail = true;
        }
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return true;
        }

        if !self.session.is_open() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('o') => {
                    self.session.toggle();
                    false
                }
                KeyCode::Char('q') | KeyCode::Esc => true,
                _ => false,
            };
        }

        match key.code {
            KeyCode::Esc => {
                self.session.toggle();
            }
            KeyCode::Enter => {
                if let Some(query) = self.session.submit() {
                    self.start_search(query);
                }
            }
            KeyCode::Backspace => {
                self.session.backspace();
            }
            KeyCode::Tab => self.cycle_selection(true),
            KeyCode::BackTab => self.cycle_selection(false),
            KeyCode::Char('e') if ctrl => {
                if let Some(id) = self.selected_turn.clone() {
                    self.session.toggle_products(&id);
                }
            }
            KeyCode::PageUp | KeyCode::Up => {
                let step = if key.code == KeyCode::Up { 1 } else { PAGE };
                self.follow_tail = false;
                self.scroll = self.scroll.saturating_sub(step);
            }
            KeyCode::PageDown | KeyCode::Down => {
                let step = if key.code == KeyCode::Down { 1 } else { PAGE };
                self.scroll = self.scroll.saturating_add(step);
            }
            KeyCode::Char(c) if !ctrl => {
                self.session.type_char(c);
            }
            _ => {}
        }
        false
    }

    /// Move the show-more selection between turns that have hidden products.
    fn cycle_selection(&mut self, forward: bool) {
        let ids: Vec<&str> = self
            .session
            .turns()
            .iter()
            .filter(|t| ChatSession::has_more_products(t))
            .map(|t| t.id.as_str())
            .collect();
        if ids.is_empty() {
            self.selected_turn = None;
            return;
        }

        let current = self
            .selected_turn
            .as_deref()
            .and_then(|sel| ids.iter().position(|id| *id == sel));
        let next = match (current, forward) {
            (None, _) => ids.len() - 1,
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
        };
        self.selected_turn = Some(ids[next].to_string());
    }
}

/// Entry point: set up terminal, run app, restore terminal.
pub fn run_tui(recommender: Recommender) -> Result<()> {
    if !io::IsTerminal::is_terminal(&io::stdin()) {
        return Err(ShopError::Io(io::Error::other(
            "chat requires an interactive terminal (stdin must be a TTY)",
        )));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(recommender, runtime);
    let result = app.run(&mut terminal);

    terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(result?)
}
