use cardtris_engine::{Command, GameSession};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    tui::{App, RenderMode, Runtime},
    view::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay},
};

/// Ticks per second; one session tick is 16 ms of game time.
const TICK_RATE: f64 = 60.0;

const PLAYING_KEYS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["Space"], "Hard Drop"),
    (&["↑", "X"], "Rotate"),
    (&["Z"], "Rotate Left"),
    (&["C"], "Hold"),
    (&["1", "2", "3"], "Card"),
    (&["P"], "Pause"),
    (&["Q"], "Quit"),
];
const PAUSED_KEYS: &[KeyBinding] = &[(&["P"], "Resume"), (&["Q"], "Quit")];
const GAME_OVER_KEYS: &[KeyBinding] = &[(&["Q"], "Quit")];

#[derive(Debug)]
pub struct PlayApp {
    session: GameSession,
    key_release_events: bool,
}

impl PlayApp {
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            key_release_events: false,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Commands for a key event.
    ///
    /// Without release events, a horizontal move is released right away and
    /// the terminal's key repeat stands in for auto-repeat.
    fn commands(&self, key: &KeyEvent) -> Vec<Command> {
        let press = matches!(key.kind, KeyEventKind::Press);
        let repeat = matches!(key.kind, KeyEventKind::Repeat);
        let release = matches!(key.kind, KeyEventKind::Release);

        match key.code {
            KeyCode::Left | KeyCode::Char('a') => self.horizontal(
                press,
                release,
                Command::MoveLeft,
                Command::ReleaseLeft,
            ),
            KeyCode::Right | KeyCode::Char('d') => self.horizontal(
                press,
                release,
                Command::MoveRight,
                Command::ReleaseRight,
            ),
            KeyCode::Down if press || repeat => vec![Command::SoftDrop],
            _ if !press => vec![],
            KeyCode::Char(' ') => vec![Command::HardDrop],
            KeyCode::Up | KeyCode::Char('x' | 'r') => vec![Command::RotateClockwise],
            KeyCode::Char('z') => vec![Command::RotateCounterclockwise],
            KeyCode::Char('c') => vec![Command::Hold],
            KeyCode::Char('1') => vec![Command::UseCard(0)],
            KeyCode::Char('2') => vec![Command::UseCard(1)],
            KeyCode::Char('3') => vec![Command::UseCard(2)],
            KeyCode::Char('p') => vec![Command::TogglePause],
            KeyCode::Char('q') | KeyCode::Esc => vec![Command::Exit],
            _ => vec![],
        }
    }

    fn horizontal(&self, press: bool, release: bool, down: Command, up: Command) -> Vec<Command> {
        match (self.key_release_events, press, release) {
            (true, true, _) => vec![down],
            (true, _, true) => vec![up],
            (false, true, _) => vec![down, up],
            _ => vec![],
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        self.key_release_events = runtime.reports_key_release();
        runtime.set_tick_rate(Some(TICK_RATE));
        runtime.set_render_mode(RenderMode::throttled_from_rate(TICK_RATE));
    }

    fn should_exit(&self) -> bool {
        self.session.session_state().is_exited()
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        for command in self.commands(&key) {
            if let Err(err) = self.session.handle_command(command) {
                log::trace!("{command:?} rejected: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let bindings = match self.session.session_state() {
            state if state.is_paused() => PAUSED_KEYS,
            state if state.is_playing() => PLAYING_KEYS,
            _ => GAME_OVER_KEYS,
        };
        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(25), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(SessionDisplay::new(&self.session), main_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime) {
        self.session.tick();
    }
}
