//! Terminal runtime: a tick clock, a render clock and crossterm input.

use crossterm::event::Event;
use ratatui::Frame;

pub use self::{event_loop::RenderMode, runtime::Runtime};

mod event_loop;
mod runtime;

/// Application driven by [`Runtime::run`].
pub trait App {
    /// Called once the terminal is set up, before the first event.
    ///
    /// Use this to configure the tick rate and render mode.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Handles key input, resize and other terminal events.
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances the application by one tick.
    fn update(&mut self, runtime: &mut Runtime);
}
