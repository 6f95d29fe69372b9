//! Dashboard events.

use crossterm::event::Event;
use relay_core::controller::Action;

/// Everything the dashboard reducer reacts to.
#[derive(Debug)]
pub enum UiEvent {
    /// Raw terminal input or resize.
    Terminal(Event),
    /// Result of an effect, delivered through the inbox.
    Relay(Action),
}
