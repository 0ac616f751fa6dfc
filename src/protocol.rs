// Message types shared across the crate: wire DTOs for the betting API and
// the channel messages exchanged between the TUI, the app orchestrator, and
// the spawned API tasks.
//
// Wire field names follow the server's contract verbatim (`pilotos`,
// `apuestas`, `fecha_nacimiento`, Spanish status values); everything else
// uses this crate's naming.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain wire types
// ---------------------------------------------------------------------------

/// One selectable driver from `GET /api/pilotos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Driver {
    pub id: u32,
    pub name: String,
}

/// Lifecycle status of a bet. Serialized with the server's Spanish values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum BetStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "activa")]
    Active,
    #[serde(rename = "rechazada")]
    Rejected,
}

impl BetStatus {
    /// Human-readable label for status columns and the payment screen.
    pub fn label(&self) -> &'static str {
        match self {
            BetStatus::Pending => "In progress",
            BetStatus::Active => "Active",
            BetStatus::Rejected => "Rejected",
        }
    }

    /// The wire value sent in status-update requests.
    pub fn as_wire(&self) -> &'static str {
        match self {
            BetStatus::Pending => "pendiente",
            BetStatus::Active => "activa",
            BetStatus::Rejected => "rechazada",
        }
    }
}

/// A bet as returned by `POST /apuestas/top3` and the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bet {
    pub id: i64,
    pub top1: u32,
    pub top2: u32,
    pub top3: u32,
    pub status: BetStatus,
}

/// One row of the user's bet history (`GET /apuestas/top3?user_id=`).
///
/// The listing endpoint does not promise an id, and older rows may lack a
/// creation timestamp, so both are optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BetSummary {
    #[serde(default)]
    pub id: Option<i64>,
    pub top1: u32,
    pub top2: u32,
    pub top3: u32,
    pub status: BetStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration payload. Field names match the server contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub fecha_nacimiento: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub user_id: i64,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaceBetRequest {
    pub user_id: i64,
    pub top1: u32,
    pub top2: u32,
    pub top3: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateBetStatusRequest {
    pub bet_id: i64,
    pub user_id: i64,
    pub status: BetStatus,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------
//
// Every endpoint wraps its payload in `{success: bool, ...}` and reports
// failures as `{success: false, message}`. Payload fields are optional so a
// failure body deserializes into the same envelope.

#[derive(Debug, Clone, Deserialize)]
pub struct StatusEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriversEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pilotos: Vec<Driver>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub bet: Option<Bet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub apuestas: Vec<BetSummary>,
}

/// Successful login, extracted from `LoginEnvelope`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOk {
    pub token: Option<String>,
    pub user_id: i64,
    pub user_name: String,
}

// ---------------------------------------------------------------------------
// Channel messages
// ---------------------------------------------------------------------------

/// The application's screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Bets,
    Payment,
    Profile,
}

/// Severity of the inline alert banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Danger,
}

/// Commands sent from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    ShowScreen(Screen),
    LoadDrivers,
    LoadBets,
    SubmitLogin {
        email: String,
        password: String,
    },
    SubmitRegister(RegisterRequest),
    SubmitPasswordChange {
        current_password: String,
        new_password: String,
    },
    PlaceBet {
        top1: u32,
        top2: u32,
        top3: u32,
    },
    /// Confirm or reject the pending payment (`Active` or `Rejected`).
    ConfirmPayment(BetStatus),
    Logout,
    Quit,
}

/// How an API request failed, reduced to what the UI needs to render.
///
/// `Rejected` carries the server's own message when it sent one; the UI
/// substitutes a per-operation generic string when it did not. `Transport`
/// covers network and decode failures, always rendered generically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    Transport(String),
    Rejected { message: Option<String> },
}

/// Completion events sent by spawned API tasks back to the orchestrator.
///
/// Every spawned task sends exactly one of these. Each carries the
/// generation counter assigned when the task was spawned; the orchestrator
/// discards events from superseded generations.
#[derive(Debug)]
pub enum ApiEvent {
    Drivers {
        result: Result<Vec<Driver>, ApiFailure>,
        generation: u64,
    },
    Login {
        result: Result<LoginOk, ApiFailure>,
        generation: u64,
    },
    Registered {
        result: Result<(), ApiFailure>,
        generation: u64,
    },
    PasswordChanged {
        result: Result<(), ApiFailure>,
        generation: u64,
    },
    BetPlaced {
        result: Result<Bet, ApiFailure>,
        generation: u64,
    },
    Bets {
        result: Result<Vec<BetSummary>, ApiFailure>,
        generation: u64,
    },
    BetDetail {
        result: Result<Bet, ApiFailure>,
        generation: u64,
    },
    BetStatusUpdated {
        result: Result<Bet, ApiFailure>,
        generation: u64,
    },
}

/// Updates pushed from the app orchestrator to the TUI render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Switch the visible screen.
    Screen(Screen),
    /// The logged-in user's display name (`None` after logout).
    SessionUser(Option<String>),
    /// Replace the driver roster shown by the picker group.
    DriversLoaded(Vec<Driver>),
    /// Replace the bet history table.
    BetsLoaded(Vec<BetSummary>),
    /// The pending bet's detail for the payment screen.
    BetDetailLoaded(Box<Bet>),
    /// Show the inline alert banner.
    Alert { level: AlertLevel, message: String },
    /// Hide the inline alert banner.
    ClearAlert,
    /// Disable (true) or re-enable (false) the screen's submit control.
    Busy(bool),
    /// Reset the given screen's form fields (e.g. after registration).
    FormCleared(Screen),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
