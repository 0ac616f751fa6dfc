// JSON client for the remote betting API using reqwest.
//
// One method per endpoint. Every response is an envelope with a `success`
// flag; a request only counts as successful when the HTTP status is 2xx AND
// the body carries `success: true`. Anything else surfaces the server's
// `message` (when present) so the UI can show it verbatim.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::protocol::{
    ApiFailure, Bet, BetEnvelope, BetSummary, BetsEnvelope, ChangePasswordRequest, Driver,
    DriversEnvelope, LoginEnvelope, LoginOk, LoginRequest, PlaceBetRequest, RegisterRequest,
    StatusEnvelope, UpdateBetStatusRequest,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a parseable response (connection refused,
    /// timeout, DNS failure, ...).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered but the body was not the expected JSON envelope.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server processed the request and refused it
    /// (`success: false` or a non-2xx status).
    #[error("request rejected by server")]
    Rejected { message: Option<String> },

    /// The envelope reported success but the expected payload was absent.
    #[error("response missing expected payload")]
    MissingPayload,
}

impl ApiError {
    /// Reduce this error to the protocol-level failure the UI consumes.
    pub fn into_failure(self) -> ApiFailure {
        match self {
            ApiError::Rejected { message } => ApiFailure::Rejected { message },
            other => ApiFailure::Transport(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Client for the betting API. Cheap to clone is not needed; the app wraps
/// it in an `Arc` and shares it with spawned request tasks.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from the API section of the app config.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and parse the body as `E`.
    async fn get_envelope<E: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(reqwest::StatusCode, E), ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let envelope = serde_json::from_str(&body)?;
        Ok((status, envelope))
    }

    /// POST `body` as JSON to `path` and parse the response as `E`.
    async fn post_envelope<B: Serialize, E: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(reqwest::StatusCode, E), ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let envelope = serde_json::from_str(&text)?;
        Ok((status, envelope))
    }

    // -- Endpoints ----------------------------------------------------------

    /// GET `/api/pilotos` — the driver roster for the picker group.
    pub async fn fetch_drivers(&self) -> Result<Vec<Driver>, ApiError> {
        let (status, env): (_, DriversEnvelope) = self.get_envelope("/api/pilotos").await?;
        if !status.is_success() || !env.success {
            return Err(ApiError::Rejected {
                message: env.message,
            });
        }
        Ok(env.pilotos)
    }

    /// POST `/login`.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOk, ApiError> {
        let (status, env): (_, LoginEnvelope) = self.post_envelope("/login", request).await?;
        if !status.is_success() || !env.success {
            return Err(ApiError::Rejected {
                message: env.message,
            });
        }
        let user_id = env.user_id.ok_or(ApiError::MissingPayload)?;
        let user_name = env.user_name.ok_or(ApiError::MissingPayload)?;
        Ok(LoginOk {
            token: env.token,
            user_id,
            user_name,
        })
    }

    /// POST `/register`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let (status, env): (_, StatusEnvelope) = self.post_envelope("/register", request).await?;
        if !status.is_success() || !env.success {
            return Err(ApiError::Rejected {
                message: env.message,
            });
        }
        Ok(())
    }

    /// POST `/change-password`.
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let (status, env): (_, StatusEnvelope) =
            self.post_envelope("/change-password", request).await?;
        if !status.is_success() || !env.success {
            return Err(ApiError::Rejected {
                message: env.message,
            });
        }
        Ok(())
    }

    /// POST `/apuestas/top3` — submit a new top-3 bet.
    pub async fn place_bet(&self, request: &PlaceBetRequest) -> Result<Bet, ApiError> {
        let (status, env): (_, BetEnvelope) =
            self.post_envelope("/apuestas/top3", request).await?;
        if !status.is_success() || !env.success {
            return Err(ApiError::Rejected {
                message: env.message,
            });
        }
        env.bet.ok_or(ApiError::MissingPayload)
    }

    /// GET `/apuestas/top3?user_id=` — the user's bet history.
    pub async fn fetch_bets(&self, user_id: i64) -> Result<Vec<BetSummary>, ApiError> {
        let path = format!("/apuestas/top3?user_id={user_id}");
        let (status, env): (_, BetsEnvelope) = self.get_envelope(&path).await?;
        if !status.is_success() || !env.success {
            return Err(ApiError::Rejected {
                message: env.message,
            });
        }
        Ok(env.apuestas)
    }

    /// GET `/apuestas/top3/detalle?bet_id=` — one bet for the payment screen.
    pub async fn fetch_bet_detail(&self, bet_id: i64) -> Result<Bet, ApiError> {
        let path = format!("/apuestas/top3/detalle?bet_id={bet_id}");
        let (status, env): (_, BetEnvelope) = self.get_envelope(&path).await?;
        if !status.is_success() || !env.success {
            return Err(ApiError::Rejected {
                message: env.message,
            });
        }
        env.bet.ok_or(ApiError::MissingPayload)
    }

    /// POST `/apuestas/top3/status` — flip a bet's payment status.
    pub async fn update_bet_status(
        &self,
        request: &UpdateBetStatusRequest,
    ) -> Result<Bet, ApiError> {
        let (status, env): (_, BetEnvelope) =
            self.post_envelope("/apuestas/top3/status", request).await?;
        if !status.is_success() || !env.success {
            return Err(ApiError::Rejected {
                message: env.message,
            });
        }
        env.bet.ok_or(ApiError::MissingPayload)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
