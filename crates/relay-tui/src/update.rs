//! Dashboard reducer.
//!
//! Translates terminal input into controller actions and returns the
//! controller's effects for the runtime to execute.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use relay_core::controller::{Action, Effect};
use relay_core::page::Button;
use relay_core::session::Mode;

use crate::events::UiEvent;
use crate::state::DashboardState;

const MODAL_PAGE: u16 = 10;

pub fn update(state: &mut DashboardState, event: UiEvent) -> Vec<Effect> {
    let effects = match event {
        UiEvent::Terminal(Event::Key(key)) => handle_key(state, key),
        UiEvent::Terminal(Event::Paste(text)) => {
            paste(state, &text);
            Vec::new()
        }
        UiEvent::Terminal(_) => Vec::new(),
        UiEvent::Relay(action) => dispatch(state, action),
    };
    state.revalidate_focus();
    effects
}

fn dispatch(state: &mut DashboardState, action: Action) -> Vec<Effect> {
    let opens_modal = matches!(action, Action::SummaryFetched { .. } | Action::CloseModal);
    let effects = state.controller.update(action);
    if opens_modal {
        state.modal_scroll = 0;
    }
    effects
}

fn handle_key(state: &mut DashboardState, key: KeyEvent) -> Vec<Effect> {
    if key.kind == KeyEventKind::Release {
        return Vec::new();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return vec![Effect::StopPolling];
    }

    // A notice blocks everything else until dismissed.
    if state.notice().is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            state.dismiss_notice();
        }
        return Vec::new();
    }

    if state.controller.page().top_modal().is_some() {
        return handle_modal_key(state, key);
    }

    match key.code {
        KeyCode::F(1) => dispatch(state, Action::Press(Button::StartMode(Mode::ExpertPanel))),
        KeyCode::F(2) => dispatch(state, Action::Press(Button::StartMode(Mode::ConferenceChain))),
        KeyCode::Tab => {
            state.cycle_focus(true);
            Vec::new()
        }
        KeyCode::BackTab => {
            state.cycle_focus(false);
            Vec::new()
        }
        KeyCode::Enter => match state.focus {
            Some(button) => dispatch(state, Action::Press(button)),
            None => Vec::new(),
        },
        KeyCode::Backspace if state.prompt_focused() => {
            if let Some(prompt) = state.controller.page_mut().prompt_mut() {
                prompt.pop();
            }
            Vec::new()
        }
        KeyCode::Char(c)
            if state.prompt_focused()
                && !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            if let Some(prompt) = state.controller.page_mut().prompt_mut() {
                prompt.push(c);
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_modal_key(state: &mut DashboardState, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        KeyCode::Esc => dispatch(state, Action::CloseModal),
        KeyCode::Char('c') => dispatch(state, Action::CopyModal),
        KeyCode::Up | KeyCode::Char('k') => {
            state.modal_scroll = state.modal_scroll.saturating_sub(1);
            Vec::new()
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.modal_scroll = state.modal_scroll.saturating_add(1);
            Vec::new()
        }
        KeyCode::PageUp => {
            state.modal_scroll = state.modal_scroll.saturating_sub(MODAL_PAGE);
            Vec::new()
        }
        KeyCode::PageDown => {
            state.modal_scroll = state.modal_scroll.saturating_add(MODAL_PAGE);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn paste(state: &mut DashboardState, text: &str) {
    if state.notice().is_some() || state.controller.page().top_modal().is_some() {
        return;
    }
    if state.prompt_focused()
        && let Some(prompt) = state.controller.page_mut().prompt_mut()
    {
        // The prompt is a single line.
        prompt.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
    }
}
