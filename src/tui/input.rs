// Keyboard and mouse input handling.
//
// Translates crossterm events into UserCommand messages for the app
// orchestrator, or into local ViewState mutations (form editing, picker
// interaction, focus movement). Returns `Some(command)` only when the event
// must reach the orchestrator.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Position;

use crate::bets::validate::validate_top3;
use crate::protocol::{AlertLevel, BetStatus, RegisterRequest, Screen, UserCommand};

use super::ViewState;

/// Handle a keyboard event.
pub fn handle_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    match state.screen {
        Screen::Login => handle_login_keys(key_event, state),
        Screen::Register => handle_register_keys(key_event, state),
        Screen::Bets => handle_bets_keys(key_event, state),
        Screen::Payment => handle_payment_keys(key_event, state),
        Screen::Profile => handle_profile_keys(key_event, state),
    }
}

/// Whether a character key should be typed into a form field (no control
/// chords).
fn is_typable(key_event: &KeyEvent) -> bool {
    !key_event.modifiers.contains(KeyModifiers::CONTROL)
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

fn handle_login_keys(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('r')
    {
        return Some(UserCommand::ShowScreen(Screen::Register));
    }

    match key_event.code {
        KeyCode::Tab | KeyCode::Down => {
            state.login_form.focus = (state.login_form.focus + 1) % 2;
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.login_form.focus = (state.login_form.focus + 1) % 2;
            None
        }
        KeyCode::Enter => Some(UserCommand::SubmitLogin {
            email: state.login_form.email.value().trim().to_string(),
            password: state.login_form.password.value().to_string(),
        }),
        KeyCode::Esc => {
            state.alert = None;
            None
        }
        KeyCode::Backspace => {
            state.login_form.focused_mut().backspace();
            None
        }
        KeyCode::Char(c) if is_typable(&key_event) => {
            state.login_form.focused_mut().push(c);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

fn handle_register_keys(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    const FIELDS: usize = 6;
    match key_event.code {
        KeyCode::Tab | KeyCode::Down => {
            state.register_form.focus = (state.register_form.focus + 1) % FIELDS;
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.register_form.focus = (state.register_form.focus + FIELDS - 1) % FIELDS;
            None
        }
        KeyCode::Enter => {
            let form = &state.register_form;
            // The confirmation field never leaves the TUI, so the match
            // check happens here; everything else is validated by the
            // orchestrator before any request is sent.
            if form.password.value() != form.confirm.value() {
                state.show_alert(AlertLevel::Danger, "Passwords do not match.");
                return None;
            }
            Some(UserCommand::SubmitRegister(RegisterRequest {
                nombre: form.first_name.value().trim().to_string(),
                apellido: form.last_name.value().trim().to_string(),
                email: form.email.value().trim().to_string(),
                fecha_nacimiento: form.birth_date.value().trim().to_string(),
                password: form.password.value().to_string(),
            }))
        }
        KeyCode::Esc => Some(UserCommand::ShowScreen(Screen::Login)),
        KeyCode::Backspace => {
            state.register_form.focused_mut().backspace();
            None
        }
        KeyCode::Char(c) if is_typable(&key_event) => {
            state.register_form.focused_mut().push(c);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Bets
// ---------------------------------------------------------------------------

fn handle_bets_keys(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    let slot = state.focused_slot;
    match key_event.code {
        KeyCode::Tab => {
            state.focused_slot = (slot + 1) % state.picker.slot_count();
            None
        }
        KeyCode::BackTab => {
            let n = state.picker.slot_count();
            state.focused_slot = (slot + n - 1) % n;
            None
        }
        KeyCode::Down => {
            if state.picker.is_open(slot) {
                state.picker.highlight_down(slot);
            } else {
                state.focused_slot = (slot + 1) % state.picker.slot_count();
            }
            None
        }
        KeyCode::Up => {
            if state.picker.is_open(slot) {
                state.picker.highlight_up(slot);
            } else {
                let n = state.picker.slot_count();
                state.focused_slot = (slot + n - 1) % n;
            }
            None
        }
        KeyCode::Enter => {
            if state.picker.is_open(slot) {
                state.picker.select_highlighted(slot);
            } else {
                state.picker.toggle_open(slot);
            }
            None
        }
        KeyCode::Esc => {
            state.picker.close_on_escape(slot);
            None
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            if state.busy {
                return None;
            }
            match validate_top3(&state.picker.selections()) {
                Ok((top1, top2, top3)) => Some(UserCommand::PlaceBet { top1, top2, top3 }),
                Err(e) => {
                    state.show_alert(AlertLevel::Danger, e.to_string());
                    None
                }
            }
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            state.picker.reset();
            None
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            // Re-activating the screen re-fetches the roster and history.
            Some(UserCommand::ShowScreen(Screen::Bets))
        }
        KeyCode::Char('p') | KeyCode::Char('P') => {
            Some(UserCommand::ShowScreen(Screen::Payment))
        }
        KeyCode::Char('o') | KeyCode::Char('O') => {
            Some(UserCommand::ShowScreen(Screen::Profile))
        }
        KeyCode::Char('l') | KeyCode::Char('L') => Some(UserCommand::Logout),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(UserCommand::Quit),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

fn handle_payment_keys(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    // Confirm/reject only act on a loaded, still-pending bet, and never
    // while a request is in flight (the controls render disabled).
    let pending = state
        .payment_bet
        .as_ref()
        .is_some_and(|b| b.status == BetStatus::Pending);

    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') if pending && !state.busy => {
            Some(UserCommand::ConfirmPayment(BetStatus::Active))
        }
        KeyCode::Char('n') | KeyCode::Char('N') if pending && !state.busy => {
            Some(UserCommand::ConfirmPayment(BetStatus::Rejected))
        }
        KeyCode::Char('b') | KeyCode::Char('B') => Some(UserCommand::ShowScreen(Screen::Bets)),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(UserCommand::Quit),
        KeyCode::Esc => {
            state.alert = None;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

fn handle_profile_keys(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    const FIELDS: usize = 3;
    match key_event.code {
        KeyCode::Tab | KeyCode::Down => {
            state.profile_form.focus = (state.profile_form.focus + 1) % FIELDS;
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.profile_form.focus = (state.profile_form.focus + FIELDS - 1) % FIELDS;
            None
        }
        KeyCode::Enter => {
            let form = &state.profile_form;
            if form.new_password.value() != form.confirm.value() {
                state.show_alert(AlertLevel::Danger, "Passwords do not match.");
                return None;
            }
            Some(UserCommand::SubmitPasswordChange {
                current_password: form.current.value().to_string(),
                new_password: form.new_password.value().to_string(),
            })
        }
        KeyCode::Esc => Some(UserCommand::ShowScreen(Screen::Bets)),
        KeyCode::Backspace => {
            state.profile_form.focused_mut().backspace();
            None
        }
        KeyCode::Char(c) if is_typable(&key_event) => {
            state.profile_form.focused_mut().push(c);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Mouse
// ---------------------------------------------------------------------------

/// Handle a mouse event.
///
/// Every left-button press anywhere on screen first runs the picker's
/// close-on-outside pass, then resolves clicks on option rows (selection)
/// or slot headers (toggle). Option rows win over headers so a list
/// overlaying a neighbouring header doesn't toggle it.
pub fn handle_mouse(mouse_event: MouseEvent, state: &mut ViewState) -> Option<UserCommand> {
    if mouse_event.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }

    // The close-on-outside pass runs for every press, whatever screen is
    // showing, so a slot left open can never stay open behind another view.
    let pointer = Position::new(mouse_event.column, mouse_event.row);
    state.picker.close_outside(pointer);

    if state.screen != Screen::Bets {
        return None;
    }

    if let Some((slot, option_id)) = state.picker.option_at(pointer) {
        state.picker.select(slot, option_id);
        state.focused_slot = slot;
    } else if let Some(slot) = state.picker.slot_at(pointer) {
        state.picker.toggle_open(slot);
        state.focused_slot = slot;
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
