//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! The Elm-runtime boundary: the reducer stays pure and returns effects;
//! this module executes them. Async fetch results come back through an
//! "inbox" channel that the loop drains each frame, so handlers are plain
//! async functions returning a [`UiEvent`].

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tav_core::FeedbackClient;
use tav_core::config::Config;
use tokio::sync::mpsc;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::markdown::SyntectHighlighter;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Frame interval while something is happening (~60fps).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll interval when nothing is in flight; keeps idle CPU low.
const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop, panic,
/// or Ctrl+C.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    client: Arc<FeedbackClient>,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    pub fn new(config: Config) -> Result<Self> {
        // Panic hook goes in before we enter the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let client = Arc::new(FeedbackClient::new(&config)?);
        let state = AppState::new(config, Box::new(SyntectHighlighter::new()));
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            client,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Submits a search before the first frame (`--student` flag).
    pub fn submit_initial_search(&mut self, student_id: String) {
        self.state.search.input = student_id;
        let effects = update::submit_search(&mut self.state);
        self.execute_effects(effects);
    }

    /// Runs the main event loop until quit.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Frame goes first so layout-dependent state (viewer re-render,
            // scroll clamping) is settled before other events apply.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Only Tick triggers a render; input batches to tick cadence.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Collects terminal, inbox, and tick events for one loop iteration.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Fast polling while a request is in flight (spinner) or the user is
        // actively typing/scrolling; slow otherwise.
        let recent_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let loading = self.state.status == crate::state::SessionStatus::Loading;
        let tick_interval = if loading || recent_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler whose result event lands in the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::FetchFeedbackList {
                generation,
                student_id,
            } => {
                let client = Arc::clone(&self.client);
                self.spawn_effect(move || async move {
                    let result = client.list_feedback(&student_id).await;
                    UiEvent::FeedbackListLoaded {
                        generation,
                        student_id,
                        result,
                    }
                });
            }
            UiEffect::FetchFeedbackContent {
                generation,
                student_id,
                assignment,
            } => {
                let client = Arc::clone(&self.client);
                self.spawn_effect(move || async move {
                    let result = client.feedback_content(&student_id, &assignment).await;
                    UiEvent::FeedbackContentLoaded { generation, result }
                });
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
