// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI and
// completion events from spawned API request tasks. Owns the session store
// and the API client, and pushes UI updates to the TUI render loop.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::bets::validate::{
    validate_login, validate_password_change, validate_registration, validate_top3,
};
use crate::config::Config;
use crate::protocol::{
    AlertLevel, ApiEvent, ApiFailure, Bet, BetStatus, ChangePasswordRequest, LoginRequest,
    PlaceBetRequest, Screen, UiUpdate, UpdateBetStatusRequest, UserCommand,
};
use crate::session::SessionStore;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Generic message for transport failures. Server-side rejections show the
/// server's own message instead.
pub const MSG_COMM_ERROR: &str =
    "Could not reach the server. Check your connection and try again.";

// ---------------------------------------------------------------------------
// Request sequencing
// ---------------------------------------------------------------------------

/// Per-kind monotonic counters identifying the latest in-flight request.
///
/// Every spawned task captures the counter value current at spawn time and
/// echoes it in its completion event; completions whose value no longer
/// matches are from superseded requests and are discarded. Loads (drivers,
/// bet history, bet detail) are tracked separately because they may run
/// concurrently; submissions share one counter since the busy flag
/// serializes them.
#[derive(Debug, Default)]
struct RequestSeq {
    drivers: u64,
    bets: u64,
    detail: u64,
    submit: u64,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    /// API client shared with spawned request tasks.
    pub api: Arc<ApiClient>,
    /// Sender for API completion events; spawned tasks use a clone to report
    /// back to the main event loop.
    pub api_tx: mpsc::Sender<ApiEvent>,
    seq: RequestSeq,
    /// Whether a submission (login, register, bet, payment, password) is in
    /// flight. While set, further submissions are ignored — the TUI renders
    /// the submit control disabled.
    pub busy: bool,
    pub screen: Screen,
}

impl AppState {
    pub fn new(
        config: Config,
        session: SessionStore,
        api: ApiClient,
        api_tx: mpsc::Sender<ApiEvent>,
    ) -> Self {
        AppState {
            config,
            session,
            api: Arc::new(api),
            api_tx,
            seq: RequestSeq::default(),
            busy: false,
            screen: Screen::Login,
        }
    }

    /// The screen to show on startup: straight to the betting screen when a
    /// session already exists, the login screen otherwise.
    pub fn initial_screen(&self) -> Screen {
        match self.session.user_id() {
            Ok(Some(_)) => Screen::Bets,
            _ => Screen::Login,
        }
    }

    // -- Task spawning ------------------------------------------------------
    //
    // Each helper bumps its counter, captures the new value, and spawns a
    // task that sends exactly one completion event. That single guaranteed
    // event is what re-enables the submit control on every path, success or
    // failure.

    fn spawn_fetch_drivers(&mut self) {
        self.seq.drivers += 1;
        let generation = self.seq.drivers;
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_drivers().await.map_err(|e| e.into_failure());
            let _ = tx.send(ApiEvent::Drivers { result, generation }).await;
        });
    }

    fn spawn_fetch_bets(&mut self, user_id: i64) {
        self.seq.bets += 1;
        let generation = self.seq.bets;
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_bets(user_id).await.map_err(|e| e.into_failure());
            let _ = tx.send(ApiEvent::Bets { result, generation }).await;
        });
    }

    fn spawn_fetch_bet_detail(&mut self, bet_id: i64) {
        self.seq.detail += 1;
        let generation = self.seq.detail;
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_bet_detail(bet_id)
                .await
                .map_err(|e| e.into_failure());
            let _ = tx.send(ApiEvent::BetDetail { result, generation }).await;
        });
    }

    fn next_submit_generation(&mut self) -> u64 {
        self.seq.submit += 1;
        self.seq.submit
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`: user commands from the
/// TUI and completion events from API request tasks. Pushes UI updates
/// through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut api_rx: mpsc::Receiver<ApiEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    // Restore the previous session, if any.
    let screen = state.initial_screen();
    if let Ok(Some(name)) = state.session.user_name() {
        let _ = ui_tx.send(UiUpdate::SessionUser(Some(name))).await;
    }
    show_screen(&mut state, screen, &ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            event = api_rx.recv() => {
                match event {
                    Some(event) => handle_api_event(&mut state, event, &ui_tx).await,
                    None => {
                        info!("API event channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handling
// ---------------------------------------------------------------------------

/// Switch to a screen and kick off the loads that screen needs.
async fn show_screen(state: &mut AppState, screen: Screen, ui_tx: &mpsc::Sender<UiUpdate>) {
    state.screen = screen;
    let _ = ui_tx.send(UiUpdate::Screen(screen)).await;
    let _ = ui_tx.send(UiUpdate::ClearAlert).await;

    match screen {
        Screen::Bets => {
            // The roster is re-fetched every time the betting screen is
            // activated so late roster changes show up.
            state.spawn_fetch_drivers();
            match state.session.user_id() {
                Ok(Some(user_id)) => state.spawn_fetch_bets(user_id),
                Ok(None) => {}
                Err(e) => warn!("failed to read session: {e}"),
            }
        }
        Screen::Payment => match state.session.pending_bet_id() {
            Ok(Some(bet_id)) => {
                let _ = ui_tx
                    .send(UiUpdate::Alert {
                        level: AlertLevel::Info,
                        message: "Loading bet details...".to_string(),
                    })
                    .await;
                state.spawn_fetch_bet_detail(bet_id);
            }
            Ok(None) => {
                let _ = ui_tx
                    .send(UiUpdate::Alert {
                        level: AlertLevel::Warning,
                        message:
                            "No pending bet to pay. Go back to the betting screen and place one."
                                .to_string(),
                    })
                    .await;
            }
            Err(e) => warn!("failed to read session: {e}"),
        },
        Screen::Login | Screen::Register | Screen::Profile => {}
    }
}

/// Handle a user command from the TUI.
pub async fn handle_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::ShowScreen(screen) => {
            show_screen(state, screen, ui_tx).await;
        }

        UserCommand::LoadDrivers => {
            state.spawn_fetch_drivers();
        }

        UserCommand::LoadBets => match state.session.user_id() {
            Ok(Some(user_id)) => state.spawn_fetch_bets(user_id),
            _ => {
                alert(ui_tx, AlertLevel::Warning, "You must be logged in.").await;
            }
        },

        UserCommand::SubmitLogin { email, password } => {
            if state.busy {
                debug!("ignoring login submit while busy");
                return;
            }
            if let Err(e) = validate_login(&email, &password) {
                alert(ui_tx, AlertLevel::Danger, &e.to_string()).await;
                return;
            }
            begin_submission(state, ui_tx).await;
            let generation = state.seq.submit;
            let api = Arc::clone(&state.api);
            let tx = state.api_tx.clone();
            tokio::spawn(async move {
                let result = api
                    .login(&LoginRequest { email, password })
                    .await
                    .map_err(|e| e.into_failure());
                let _ = tx.send(ApiEvent::Login { result, generation }).await;
            });
        }

        UserCommand::SubmitRegister(request) => {
            if state.busy {
                debug!("ignoring register submit while busy");
                return;
            }
            // The confirmation field never leaves the TUI; the request the
            // TUI builds already passed the match check there, but the
            // policy and age rules are enforced here so no invalid request
            // is ever sent.
            let today = Local::now().date_naive();
            if let Err(e) = validate_registration(
                &request.nombre,
                &request.apellido,
                &request.email,
                &request.fecha_nacimiento,
                &request.password,
                &request.password,
                today,
            ) {
                alert(ui_tx, AlertLevel::Danger, &e.to_string()).await;
                return;
            }
            begin_submission(state, ui_tx).await;
            let generation = state.seq.submit;
            let api = Arc::clone(&state.api);
            let tx = state.api_tx.clone();
            tokio::spawn(async move {
                let result = api.register(&request).await.map_err(|e| e.into_failure());
                let _ = tx.send(ApiEvent::Registered { result, generation }).await;
            });
        }

        UserCommand::SubmitPasswordChange {
            current_password,
            new_password,
        } => {
            if state.busy {
                debug!("ignoring password change while busy");
                return;
            }
            let user_id = match state.session.user_id() {
                Ok(Some(id)) => id,
                _ => {
                    alert(
                        ui_tx,
                        AlertLevel::Warning,
                        "You must be logged in to change your password.",
                    )
                    .await;
                    return;
                }
            };
            if let Err(e) =
                validate_password_change(&current_password, &new_password, &new_password)
            {
                alert(ui_tx, AlertLevel::Danger, &e.to_string()).await;
                return;
            }
            begin_submission(state, ui_tx).await;
            let generation = state.seq.submit;
            let api = Arc::clone(&state.api);
            let tx = state.api_tx.clone();
            tokio::spawn(async move {
                let result = api
                    .change_password(&ChangePasswordRequest {
                        user_id,
                        current_password,
                        new_password,
                    })
                    .await
                    .map_err(|e| e.into_failure());
                let _ = tx
                    .send(ApiEvent::PasswordChanged { result, generation })
                    .await;
            });
        }

        UserCommand::PlaceBet { top1, top2, top3 } => {
            if state.busy {
                debug!("ignoring bet submit while busy");
                return;
            }
            let user_id = match state.session.user_id() {
                Ok(Some(id)) => id,
                _ => {
                    alert(
                        ui_tx,
                        AlertLevel::Warning,
                        "You must be logged in to place a bet.",
                    )
                    .await;
                    return;
                }
            };
            if let Err(e) = validate_top3(&[Some(top1), Some(top2), Some(top3)]) {
                alert(ui_tx, AlertLevel::Danger, &e.to_string()).await;
                return;
            }
            begin_submission(state, ui_tx).await;
            let generation = state.seq.submit;
            let api = Arc::clone(&state.api);
            let tx = state.api_tx.clone();
            tokio::spawn(async move {
                let result = api
                    .place_bet(&PlaceBetRequest {
                        user_id,
                        top1,
                        top2,
                        top3,
                    })
                    .await
                    .map_err(|e| e.into_failure());
                let _ = tx.send(ApiEvent::BetPlaced { result, generation }).await;
            });
        }

        UserCommand::ConfirmPayment(status) => {
            if state.busy {
                debug!("ignoring payment action while busy");
                return;
            }
            let user_id = match state.session.user_id() {
                Ok(Some(id)) => id,
                _ => {
                    alert(
                        ui_tx,
                        AlertLevel::Warning,
                        "Log in again to continue with the payment.",
                    )
                    .await;
                    return;
                }
            };
            let bet_id = match state.session.pending_bet_id() {
                Ok(Some(id)) => id,
                _ => {
                    alert(ui_tx, AlertLevel::Warning, "No pending bet to pay.").await;
                    return;
                }
            };
            begin_submission(state, ui_tx).await;
            let generation = state.seq.submit;
            let api = Arc::clone(&state.api);
            let tx = state.api_tx.clone();
            tokio::spawn(async move {
                let result = api
                    .update_bet_status(&UpdateBetStatusRequest {
                        bet_id,
                        user_id,
                        status,
                    })
                    .await
                    .map_err(|e| e.into_failure());
                let _ = tx
                    .send(ApiEvent::BetStatusUpdated { result, generation })
                    .await;
            });
        }

        UserCommand::Logout => {
            if let Err(e) = state.session.clear() {
                warn!("failed to clear session: {e}");
            }
            let _ = ui_tx.send(UiUpdate::SessionUser(None)).await;
            show_screen(state, Screen::Login, ui_tx).await;
        }

        UserCommand::Quit => {
            // Handled in the main loop.
        }
    }
}

/// Mark a submission as in flight and tell the TUI to disable the submit
/// control. Cleared when the matching completion event arrives.
async fn begin_submission(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    state.busy = true;
    state.next_submit_generation();
    let _ = ui_tx.send(UiUpdate::ClearAlert).await;
    let _ = ui_tx.send(UiUpdate::Busy(true)).await;
}

async fn alert(ui_tx: &mpsc::Sender<UiUpdate>, level: AlertLevel, message: &str) {
    let _ = ui_tx
        .send(UiUpdate::Alert {
            level,
            message: message.to_string(),
        })
        .await;
}

/// Render an API failure for the banner: server messages verbatim, a
/// per-operation fallback when the server sent none, and the generic
/// communication-error string for transport failures.
fn failure_message(failure: &ApiFailure, fallback: &str) -> String {
    match failure {
        ApiFailure::Rejected {
            message: Some(message),
        } => message.clone(),
        ApiFailure::Rejected { message: None } => fallback.to_string(),
        ApiFailure::Transport(detail) => {
            debug!("transport failure: {detail}");
            MSG_COMM_ERROR.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// API event handling
// ---------------------------------------------------------------------------

/// Finish a submission: clear the busy flag and re-enable the submit
/// control. Runs on every completion path before the outcome is inspected.
async fn end_submission(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    state.busy = false;
    let _ = ui_tx.send(UiUpdate::Busy(false)).await;
}

/// Apply the payment-screen consequences of a bet's status: a terminal
/// status clears the stored pending bet id and picks the banner message.
async fn apply_bet_status(state: &mut AppState, bet: &Bet, ui_tx: &mpsc::Sender<UiUpdate>) {
    match bet.status {
        BetStatus::Pending => {
            alert(
                ui_tx,
                AlertLevel::Warning,
                "Review the details and confirm the payment to activate your bet.",
            )
            .await;
        }
        BetStatus::Active => {
            if let Err(e) = state.session.clear_pending_bet_id() {
                warn!("failed to clear pending bet id: {e}");
            }
            alert(
                ui_tx,
                AlertLevel::Success,
                "The bet is active. You can go back to the betting screen to follow it.",
            )
            .await;
        }
        BetStatus::Rejected => {
            if let Err(e) = state.session.clear_pending_bet_id() {
                warn!("failed to clear pending bet id: {e}");
            }
            alert(
                ui_tx,
                AlertLevel::Danger,
                "The payment was rejected. You can place a new bet whenever you like.",
            )
            .await;
        }
    }
}

/// Handle a completion event from an API task.
///
/// Every event carries the counter value captured at spawn time; events
/// from superseded requests are discarded so a slow response cannot
/// overwrite the outcome of a newer one.
pub async fn handle_api_event(
    state: &mut AppState,
    event: ApiEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        ApiEvent::Drivers { result, generation } => {
            if generation != state.seq.drivers {
                debug!("discarding stale drivers response (gen {generation})");
                return;
            }
            match result {
                Ok(drivers) => {
                    info!("loaded {} drivers", drivers.len());
                    let _ = ui_tx.send(UiUpdate::DriversLoaded(drivers)).await;
                }
                Err(failure) => {
                    alert(
                        ui_tx,
                        AlertLevel::Danger,
                        &failure_message(&failure, "Could not load the driver roster."),
                    )
                    .await;
                }
            }
        }

        ApiEvent::Bets { result, generation } => {
            if generation != state.seq.bets {
                debug!("discarding stale bets response (gen {generation})");
                return;
            }
            match result {
                Ok(bets) => {
                    let _ = ui_tx.send(UiUpdate::BetsLoaded(bets)).await;
                }
                Err(failure) => {
                    alert(
                        ui_tx,
                        AlertLevel::Danger,
                        &failure_message(&failure, "Could not load your bets."),
                    )
                    .await;
                }
            }
        }

        ApiEvent::BetDetail { result, generation } => {
            if generation != state.seq.detail {
                debug!("discarding stale bet detail response (gen {generation})");
                return;
            }
            match result {
                Ok(bet) => {
                    let _ = ui_tx
                        .send(UiUpdate::BetDetailLoaded(Box::new(bet.clone())))
                        .await;
                    apply_bet_status(state, &bet, ui_tx).await;
                }
                Err(failure) => {
                    alert(
                        ui_tx,
                        AlertLevel::Danger,
                        &failure_message(&failure, "Could not load the bet."),
                    )
                    .await;
                }
            }
        }

        ApiEvent::Login { result, generation } => {
            if generation != state.seq.submit {
                debug!("discarding stale login response (gen {generation})");
                return;
            }
            end_submission(state, ui_tx).await;
            match result {
                Ok(ok) => {
                    info!("login succeeded for user {}", ok.user_id);
                    if let Some(token) = &ok.token {
                        if let Err(e) = state.session.set_auth_token(token) {
                            warn!("failed to persist auth token: {e}");
                        }
                    }
                    if let Err(e) = state.session.set_user_id(ok.user_id) {
                        warn!("failed to persist user id: {e}");
                    }
                    if let Err(e) = state.session.set_user_name(&ok.user_name) {
                        warn!("failed to persist user name: {e}");
                    }
                    let _ = ui_tx
                        .send(UiUpdate::SessionUser(Some(ok.user_name.clone())))
                        .await;
                    show_screen(state, Screen::Bets, ui_tx).await;
                    alert(
                        ui_tx,
                        AlertLevel::Success,
                        &format!("Welcome, {}!", ok.user_name),
                    )
                    .await;
                }
                Err(failure) => {
                    alert(
                        ui_tx,
                        AlertLevel::Danger,
                        &failure_message(&failure, "Could not log in."),
                    )
                    .await;
                }
            }
        }

        ApiEvent::Registered { result, generation } => {
            if generation != state.seq.submit {
                debug!("discarding stale register response (gen {generation})");
                return;
            }
            end_submission(state, ui_tx).await;
            match result {
                Ok(()) => {
                    let _ = ui_tx.send(UiUpdate::FormCleared(Screen::Register)).await;
                    alert(
                        ui_tx,
                        AlertLevel::Success,
                        "Registration complete. You can now log in.",
                    )
                    .await;
                }
                Err(failure) => {
                    alert(
                        ui_tx,
                        AlertLevel::Danger,
                        &failure_message(&failure, "Could not complete the registration."),
                    )
                    .await;
                }
            }
        }

        ApiEvent::PasswordChanged { result, generation } => {
            if generation != state.seq.submit {
                debug!("discarding stale password change response (gen {generation})");
                return;
            }
            end_submission(state, ui_tx).await;
            match result {
                Ok(()) => {
                    let _ = ui_tx.send(UiUpdate::FormCleared(Screen::Profile)).await;
                    alert(ui_tx, AlertLevel::Success, "Password updated.").await;
                }
                Err(failure) => {
                    alert(
                        ui_tx,
                        AlertLevel::Danger,
                        &failure_message(&failure, "Could not update the password."),
                    )
                    .await;
                }
            }
        }

        ApiEvent::BetPlaced { result, generation } => {
            if generation != state.seq.submit {
                debug!("discarding stale bet response (gen {generation})");
                return;
            }
            end_submission(state, ui_tx).await;
            match result {
                Ok(bet) => {
                    info!("bet {} placed, awaiting payment", bet.id);
                    if let Err(e) = state.session.set_pending_bet_id(bet.id) {
                        warn!("failed to persist pending bet id: {e}");
                    }
                    show_screen(state, Screen::Payment, ui_tx).await;
                }
                Err(failure) => {
                    alert(
                        ui_tx,
                        AlertLevel::Danger,
                        &failure_message(&failure, "Could not place the bet."),
                    )
                    .await;
                }
            }
        }

        ApiEvent::BetStatusUpdated { result, generation } => {
            if generation != state.seq.submit {
                debug!("discarding stale status update response (gen {generation})");
                return;
            }
            end_submission(state, ui_tx).await;
            match result {
                Ok(bet) => {
                    let _ = ui_tx
                        .send(UiUpdate::BetDetailLoaded(Box::new(bet.clone())))
                        .await;
                    apply_bet_status(state, &bet, ui_tx).await;
                }
                Err(failure) => {
                    alert(
                        ui_tx,
                        AlertLevel::Danger,
                        &failure_message(&failure, "Could not update the payment status."),
                    )
                    .await;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, SessionConfig};
    use crate::protocol::{LoginOk, RegisterRequest};

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                timeout_secs: 1,
            },
            session: SessionConfig {
                db_path: ":memory:".to_string(),
            },
        }
    }

    fn test_state() -> (AppState, mpsc::Receiver<ApiEvent>) {
        let config = test_config();
        let session = SessionStore::open(":memory:").unwrap();
        let api = ApiClient::from_config(&config.api).unwrap();
        let (api_tx, api_rx) = mpsc::channel(32);
        (AppState::new(config, session, api, api_tx), api_rx)
    }

    fn drain(rx: &mut mpsc::Receiver<UiUpdate>) -> Vec<UiUpdate> {
        let mut updates = Vec::new();
        while let Ok(u) = rx.try_recv() {
            updates.push(u);
        }
        updates
    }

    fn find_alert(updates: &[UiUpdate]) -> Option<(AlertLevel, String)> {
        updates.iter().find_map(|u| match u {
            UiUpdate::Alert { level, message } => Some((*level, message.clone())),
            _ => None,
        })
    }

    #[tokio::test]
    async fn invalid_login_never_reaches_the_network() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        handle_command(
            &mut state,
            UserCommand::SubmitLogin {
                email: String::new(),
                password: "pw".into(),
            },
            &ui_tx,
        )
        .await;

        let updates = drain(&mut ui_rx);
        let (level, message) = find_alert(&updates).expect("expected a validation alert");
        assert_eq!(level, AlertLevel::Danger);
        assert!(message.contains("every field"));
        // No busy toggle: the request was never spawned.
        assert!(!updates.contains(&UiUpdate::Busy(true)));
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn underage_registration_is_rejected_locally() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        let today = Local::now().date_naive();
        let birth = today
            .checked_sub_days(chrono::Days::new(365 * 17))
            .unwrap()
            .format("%Y-%m-%d")
            .to_string();

        handle_command(
            &mut state,
            UserCommand::SubmitRegister(RegisterRequest {
                nombre: "Ana".into(),
                apellido: "García".into(),
                email: "ana@example.com".into(),
                fecha_nacimiento: birth,
                password: "Abc123".into(),
            }),
            &ui_tx,
        )
        .await;

        let updates = drain(&mut ui_rx);
        let (level, message) = find_alert(&updates).expect("expected a validation alert");
        assert_eq!(level, AlertLevel::Danger);
        assert!(message.contains("18"));
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn duplicate_pick_is_rejected_locally() {
        let (mut state, _api_rx) = test_state();
        state.session.set_user_id(3).unwrap();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        handle_command(
            &mut state,
            UserCommand::PlaceBet {
                top1: 1,
                top2: 1,
                top3: 3,
            },
            &ui_tx,
        )
        .await;

        let updates = drain(&mut ui_rx);
        let (level, _) = find_alert(&updates).expect("expected a validation alert");
        assert_eq!(level, AlertLevel::Danger);
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn bet_without_session_asks_for_login() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        handle_command(
            &mut state,
            UserCommand::PlaceBet {
                top1: 1,
                top2: 2,
                top3: 3,
            },
            &ui_tx,
        )
        .await;

        let (level, message) = find_alert(&drain(&mut ui_rx)).unwrap();
        assert_eq!(level, AlertLevel::Warning);
        assert!(message.contains("logged in"));
    }

    #[tokio::test]
    async fn submissions_are_serialized_by_the_busy_flag() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        handle_command(
            &mut state,
            UserCommand::SubmitLogin {
                email: "a@b.c".into(),
                password: "pw".into(),
            },
            &ui_tx,
        )
        .await;
        assert!(state.busy);
        let first = drain(&mut ui_rx);
        assert!(first.contains(&UiUpdate::Busy(true)));

        // A second submit while busy is dropped without UI traffic.
        handle_command(
            &mut state,
            UserCommand::SubmitLogin {
                email: "a@b.c".into(),
                password: "pw".into(),
            },
            &ui_tx,
        )
        .await;
        assert!(drain(&mut ui_rx).is_empty());
    }

    #[tokio::test]
    async fn login_success_persists_session_and_switches_screen() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        state.busy = true;
        state.seq.submit = 5;
        handle_api_event(
            &mut state,
            ApiEvent::Login {
                result: Ok(LoginOk {
                    token: Some("token_3_a@b.c".into()),
                    user_id: 3,
                    user_name: "Ana García".into(),
                }),
                generation: 5,
            },
            &ui_tx,
        )
        .await;

        assert!(!state.busy);
        assert_eq!(state.session.user_id().unwrap(), Some(3));
        assert_eq!(
            state.session.auth_token().unwrap().as_deref(),
            Some("token_3_a@b.c")
        );
        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::Busy(false)));
        assert!(updates.contains(&UiUpdate::Screen(Screen::Bets)));
        assert!(updates.contains(&UiUpdate::SessionUser(Some("Ana García".into()))));
        assert_eq!(state.screen, Screen::Bets);
    }

    #[tokio::test]
    async fn stale_submission_response_is_discarded() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        state.busy = true;
        state.seq.submit = 7;
        handle_api_event(
            &mut state,
            ApiEvent::Login {
                result: Ok(LoginOk {
                    token: None,
                    user_id: 1,
                    user_name: "Old".into(),
                }),
                generation: 6,
            },
            &ui_tx,
        )
        .await;

        // Nothing applied: still busy, no session, no UI traffic.
        assert!(state.busy);
        assert_eq!(state.session.user_id().unwrap(), None);
        assert!(drain(&mut ui_rx).is_empty());
    }

    #[tokio::test]
    async fn server_rejection_message_is_shown_verbatim() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        state.busy = true;
        state.seq.submit = 1;
        handle_api_event(
            &mut state,
            ApiEvent::Login {
                result: Err(ApiFailure::Rejected {
                    message: Some("Email o contraseña incorrectos".into()),
                }),
                generation: 1,
            },
            &ui_tx,
        )
        .await;

        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::Busy(false)));
        let (level, message) = find_alert(&updates).unwrap();
        assert_eq!(level, AlertLevel::Danger);
        assert_eq!(message, "Email o contraseña incorrectos");
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn transport_failure_shows_generic_message() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        state.busy = true;
        state.seq.submit = 1;
        handle_api_event(
            &mut state,
            ApiEvent::BetPlaced {
                result: Err(ApiFailure::Transport("connection refused".into())),
                generation: 1,
            },
            &ui_tx,
        )
        .await;

        let (_, message) = find_alert(&drain(&mut ui_rx)).unwrap();
        assert_eq!(message, MSG_COMM_ERROR);
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn placed_bet_stores_pending_id_and_opens_payment() {
        let (mut state, _api_rx) = test_state();
        state.session.set_user_id(3).unwrap();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        state.busy = true;
        state.seq.submit = 2;
        handle_api_event(
            &mut state,
            ApiEvent::BetPlaced {
                result: Ok(Bet {
                    id: 12,
                    top1: 1,
                    top2: 2,
                    top3: 3,
                    status: BetStatus::Pending,
                }),
                generation: 2,
            },
            &ui_tx,
        )
        .await;

        assert_eq!(state.session.pending_bet_id().unwrap(), Some(12));
        assert_eq!(state.screen, Screen::Payment);
        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::Screen(Screen::Payment)));
    }

    #[tokio::test]
    async fn terminal_status_clears_pending_bet() {
        let (mut state, _api_rx) = test_state();
        state.session.set_pending_bet_id(12).unwrap();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        state.busy = true;
        state.seq.submit = 3;
        handle_api_event(
            &mut state,
            ApiEvent::BetStatusUpdated {
                result: Ok(Bet {
                    id: 12,
                    top1: 1,
                    top2: 2,
                    top3: 3,
                    status: BetStatus::Active,
                }),
                generation: 3,
            },
            &ui_tx,
        )
        .await;

        assert_eq!(state.session.pending_bet_id().unwrap(), None);
        let updates = drain(&mut ui_rx);
        let (level, _) = find_alert(&updates).unwrap();
        assert_eq!(level, AlertLevel::Success);
    }

    #[tokio::test]
    async fn payment_screen_without_pending_bet_warns() {
        let (mut state, _api_rx) = test_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        handle_command(
            &mut state,
            UserCommand::ShowScreen(Screen::Payment),
            &ui_tx,
        )
        .await;

        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::Screen(Screen::Payment)));
        let (level, message) = find_alert(&updates).unwrap();
        assert_eq!(level, AlertLevel::Warning);
        assert!(message.contains("No pending bet"));
    }

    #[tokio::test]
    async fn logout_clears_session_and_returns_to_login() {
        let (mut state, _api_rx) = test_state();
        state.session.set_user_id(3).unwrap();
        state.session.set_user_name("Ana").unwrap();
        let (ui_tx, mut ui_rx) = mpsc::channel(32);

        handle_command(&mut state, UserCommand::Logout, &ui_tx).await;

        assert_eq!(state.session.user_id().unwrap(), None);
        assert_eq!(state.screen, Screen::Login);
        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::SessionUser(None)));
        assert!(updates.contains(&UiUpdate::Screen(Screen::Login)));
    }

    #[test]
    fn initial_screen_follows_session() {
        let (state, _api_rx) = test_state();
        assert_eq!(state.initial_screen(), Screen::Login);
        state.session.set_user_id(3).unwrap();
        assert_eq!(state.initial_screen(), Screen::Bets);
    }
}
