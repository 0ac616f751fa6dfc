// TUI: view state, input handling, and screen rendering.
//
// The TUI owns a `ViewState` that mirrors the parts of the application state
// the screens need. The app orchestrator pushes `UiUpdate` messages over an
// mpsc channel; the TUI applies them to `ViewState` and re-renders at
// ~30 fps. All widget state (forms, picker group) lives here; the screen is
// a pure projection of it.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyModifiers,
};
use futures_util::StreamExt;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::bets::PickerGroup;
use crate::protocol::{AlertLevel, Bet, BetSummary, Driver, Screen, UiUpdate, UserCommand};

use layout::{bets_layout, build_layout, centered_form};
use widgets::text_field::TextField;

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Login form fields and focus.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: TextField,
    pub password: TextField,
    pub focus: usize,
}

impl Default for LoginForm {
    fn default() -> Self {
        LoginForm {
            email: TextField::new(" Email "),
            password: TextField::masked(" Password "),
            focus: 0,
        }
    }
}

impl LoginForm {
    pub fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            0 => &mut self.email,
            _ => &mut self.password,
        }
    }
}

/// Registration form fields and focus.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub first_name: TextField,
    pub last_name: TextField,
    pub email: TextField,
    pub birth_date: TextField,
    pub password: TextField,
    pub confirm: TextField,
    pub focus: usize,
}

impl Default for RegisterForm {
    fn default() -> Self {
        RegisterForm {
            first_name: TextField::new(" First name "),
            last_name: TextField::new(" Last name "),
            email: TextField::new(" Email "),
            birth_date: TextField::new(" Birth date (YYYY-MM-DD) "),
            password: TextField::masked(" Password "),
            confirm: TextField::masked(" Confirm password "),
            focus: 0,
        }
    }
}

impl RegisterForm {
    pub fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            0 => &mut self.first_name,
            1 => &mut self.last_name,
            2 => &mut self.email,
            3 => &mut self.birth_date,
            4 => &mut self.password,
            _ => &mut self.confirm,
        }
    }
}

/// Change-password form fields and focus.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub current: TextField,
    pub new_password: TextField,
    pub confirm: TextField,
    pub focus: usize,
}

impl Default for ProfileForm {
    fn default() -> Self {
        ProfileForm {
            current: TextField::masked(" Current password "),
            new_password: TextField::masked(" New password "),
            confirm: TextField::masked(" Confirm new password "),
            focus: 0,
        }
    }
}

impl ProfileForm {
    pub fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            0 => &mut self.current,
            1 => &mut self.new_password,
            _ => &mut self.confirm,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator
/// and directly by input handling (form editing, picker interaction).
pub struct ViewState {
    pub screen: Screen,
    /// Logged-in user's display name for the status bar.
    pub user_name: Option<String>,
    /// Active inline alert, if any.
    pub alert: Option<(AlertLevel, String)>,
    /// Whether a submission is in flight (submit controls disabled).
    pub busy: bool,
    /// The podium picker group (3 slots sharing the driver roster).
    pub picker: PickerGroup,
    /// Which picker slot has keyboard focus on the betting screen.
    pub focused_slot: usize,
    /// Driver roster for label lookups.
    pub drivers: Vec<Driver>,
    /// The user's bet history.
    pub bets: Vec<BetSummary>,
    /// The bet shown on the payment screen.
    pub payment_bet: Option<Bet>,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub profile_form: ProfileForm,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            screen: Screen::Login,
            user_name: None,
            alert: None,
            busy: false,
            picker: PickerGroup::new(3, "Select a driver"),
            focused_slot: 0,
            drivers: Vec::new(),
            bets: Vec::new(),
            payment_bet: None,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            profile_form: ProfileForm::default(),
        }
    }
}

impl ViewState {
    /// Resolve a driver id to its display name, falling back to the raw id
    /// when the roster doesn't know it (e.g. a bet on a since-removed
    /// driver).
    pub fn driver_name(&self, id: u32) -> String {
        self.drivers
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    /// Show a locally generated alert (validation feedback).
    pub fn show_alert(&mut self, level: AlertLevel, message: impl Into<String>) {
        self.alert = Some((level, message.into()));
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Screen(screen) => {
            state.screen = screen;
            if screen == Screen::Payment {
                // Stale detail from a previous visit; a fresh load follows.
                state.payment_bet = None;
            }
        }
        UiUpdate::SessionUser(name) => {
            state.user_name = name;
        }
        UiUpdate::DriversLoaded(drivers) => {
            state
                .picker
                .set_options(drivers.iter().cloned().map(Into::into).collect());
            state.drivers = drivers;
        }
        UiUpdate::BetsLoaded(bets) => {
            state.bets = bets;
        }
        UiUpdate::BetDetailLoaded(bet) => {
            state.payment_bet = Some(*bet);
        }
        UiUpdate::Alert { level, message } => {
            state.alert = Some((level, message));
        }
        UiUpdate::ClearAlert => {
            state.alert = None;
        }
        UiUpdate::Busy(busy) => {
            state.busy = busy;
        }
        UiUpdate::FormCleared(screen) => match screen {
            Screen::Login => state.login_form = LoginForm::default(),
            Screen::Register => state.register_form = RegisterForm::default(),
            Screen::Profile => state.profile_form = ProfileForm::default(),
            Screen::Bets => state.picker.reset(),
            Screen::Payment => {}
        },
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame for the current screen.
fn render_frame(frame: &mut Frame, state: &mut ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::alert::render(frame, layout.alert, state.alert.as_ref());

    match state.screen {
        Screen::Login => render_login(frame, layout.body, state),
        Screen::Register => render_register(frame, layout.body, state),
        Screen::Bets => {
            let (picker_col, bets_col) = bets_layout(layout.body);
            widgets::bets_table::render(frame, bets_col, state);
            // Picker renders last so open lists overlay neighbouring panels.
            widgets::picker::render(frame, picker_col, state);
        }
        Screen::Payment => widgets::payment::render(frame, layout.body, state),
        Screen::Profile => render_profile(frame, layout.body, state),
    }

    render_help_bar(frame, layout.help_bar, state.screen);
}

/// Stack `fields` vertically, three rows each, inside `area`, highlighting
/// the focused one.
fn render_fields(frame: &mut Frame, area: Rect, fields: &[&TextField], focus: usize) {
    let constraints: Vec<Constraint> =
        fields.iter().map(|_| Constraint::Length(3)).collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    for (i, field) in fields.iter().enumerate() {
        if let Some(row) = rows.get(i) {
            field.render(frame, *row, i == focus);
        }
    }
}

fn render_login(frame: &mut Frame, body: Rect, state: &ViewState) {
    let form = centered_form(body, 50, 6);
    let f = &state.login_form;
    render_fields(frame, form, &[&f.email, &f.password], f.focus);
}

fn render_register(frame: &mut Frame, body: Rect, state: &ViewState) {
    let form = centered_form(body, 56, 18);
    let f = &state.register_form;
    render_fields(
        frame,
        form,
        &[
            &f.first_name,
            &f.last_name,
            &f.email,
            &f.birth_date,
            &f.password,
            &f.confirm,
        ],
        f.focus,
    );
}

fn render_profile(frame: &mut Frame, body: Rect, state: &ViewState) {
    let form = centered_form(body, 50, 9);
    let f = &state.profile_form;
    render_fields(
        frame,
        form,
        &[&f.current, &f.new_password, &f.confirm],
        f.focus,
    );
}

fn render_help_bar(frame: &mut Frame, area: Rect, screen: Screen) {
    let text = match screen {
        Screen::Login => " Tab: next field | Enter: log in | Ctrl+R: register | Ctrl+C: quit",
        Screen::Register => " Tab: next field | Enter: submit | Esc: back to login | Ctrl+C: quit",
        Screen::Bets => {
            " Tab: slot | Enter: open/select | S: bet | R: refresh | P: payment | O: profile | L: logout | Q: quit"
        }
        Screen::Payment => " Y: pay | N: reject | B: back to bets | Q: quit",
        Screen::Profile => " Tab: next field | Enter: submit | Esc: back to bets | Ctrl+C: quit",
    };
    let paragraph = ratatui::widgets::Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal (raw mode, alternate screen, mouse capture),
/// installs a panic hook that restores it, then selects over UI updates,
/// terminal events, and a ~30 fps render tick until the user quits or the
/// update channel closes.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    // Pointer interactions anywhere on screen drive the picker's
    // close-on-outside behavior, so mouse capture is required.
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break, // app shutting down
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        // Ctrl+C always quits, regardless of screen or focus.
                        if key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            let _ = cmd_tx.send(UserCommand::Quit).await;
                            break;
                        }
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(Event::Mouse(mouse_event))) => {
                        if let Some(cmd) = input::handle_mouse(mouse_event, &mut view_state) {
                            let _ = cmd_tx.send(cmd).await;
                        }
                    }
                    Some(Ok(_)) => {
                        // Resize and focus events: the next render tick
                        // picks up the new dimensions.
                    }
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &mut view_state))?;
            }
        }
    }

    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
