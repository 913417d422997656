//! Bounded upload client — ships a stored photo to the IRIS extraction server.
//!
//! One POST of `{"image": "<base64>"}` raced against a hard timer. There is
//! no retry loop: the losing side of the race is discarded (dropping the
//! request future aborts it client-side; the server sees fire-and-forget),
//! and every retry is a fresh user-initiated capture.

use std::future::Future;
use std::time::Duration;

use base64::Engine as _;
use serde::Serialize;

use crate::config;
use crate::photo_store::StoredPhoto;

/// Upload endpoint path on the IRIS server.
const UPLOAD_PATH: &str = "/upload_archi_image_to_iris";

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Result of one bounded upload attempt. Never both a success and a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 2xx response; carries the raw body for interpretation.
    Success(String),
    /// The timer fired before the server answered.
    Timeout,
    /// Non-2xx status, connection failure, or unreadable photo.
    TransportFailure(String),
}

/// Seam between the workflow and the network. The production implementation
/// is [`UploadClient`]; tests substitute mocks.
pub trait UploadBackend: Send + Sync {
    fn upload(&self, photo: &StoredPhoto) -> impl Future<Output = UploadOutcome> + Send;
}

/// Request body for the IRIS upload endpoint.
#[derive(Serialize)]
struct UploadRequest<'a> {
    image: &'a str,
}

// ═══════════════════════════════════════════════════════════
// UploadClient
// ═══════════════════════════════════════════════════════════

/// HTTP client for the IRIS extraction server.
pub struct UploadClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl UploadClient {
    /// Create a client for the given server. The HTTP client itself carries
    /// no per-request timeout — the bound is the explicit race in
    /// [`upload`](UploadBackend::upload).
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        }
    }

    /// Client configured from the environment (ARCHIFIELD_SERVER_URL,
    /// ARCHIFIELD_UPLOAD_TIMEOUT_SECS), falling back to the built-in defaults.
    pub fn from_env() -> Self {
        Self::new(&config::server_url(), config::upload_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }

    /// The single POST attempt, without the timer.
    async fn post_image(&self, encoded: &str) -> UploadOutcome {
        let body = UploadRequest { image: encoded };

        let response = match self.client.post(self.endpoint()).json(&body).send().await {
            Ok(r) => r,
            Err(e) if e.is_connect() => {
                return UploadOutcome::TransportFailure(format!(
                    "Could not reach extraction server at {}: {e}",
                    self.base_url
                ));
            }
            Err(e) => return UploadOutcome::TransportFailure(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return UploadOutcome::TransportFailure(format!(
                "Extraction server returned status {}",
                status.as_u16()
            ));
        }

        match response.text().await {
            Ok(body) => UploadOutcome::Success(body),
            Err(e) => UploadOutcome::TransportFailure(format!("Could not read response: {e}")),
        }
    }
}

impl UploadBackend for UploadClient {
    async fn upload(&self, photo: &StoredPhoto) -> UploadOutcome {
        let bytes = match tokio::fs::read(photo.path()).await {
            Ok(b) => b,
            Err(e) => {
                return UploadOutcome::TransportFailure(format!(
                    "Could not read stored photo {}: {e}",
                    photo.path().display()
                ));
            }
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

        tracing::info!(
            photo = %photo.display_name(),
            image_size = bytes.len(),
            timeout_secs = self.timeout.as_secs(),
            "Uploading capture for extraction"
        );
        let start = std::time::Instant::now();

        let outcome = bounded(self.timeout, self.post_image(&encoded)).await;

        tracing::info!(
            photo = %photo.display_name(),
            elapsed_ms = %start.elapsed().as_millis(),
            outcome = ?outcome_tag(&outcome),
            "Upload settled"
        );
        outcome
    }
}

/// Race a request against the timer; first to settle wins. On expiry the
/// request future is dropped and `Timeout` is declared — no result from the
/// loser is ever observed afterwards.
async fn bounded<F>(bound: Duration, request: F) -> UploadOutcome
where
    F: Future<Output = UploadOutcome>,
{
    match tokio::time::timeout(bound, request).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(bound_secs = bound.as_secs(), "Upload exceeded timeout bound");
            UploadOutcome::Timeout
        }
    }
}

fn outcome_tag(outcome: &UploadOutcome) -> &'static str {
    match outcome {
        UploadOutcome::Success(_) => "success",
        UploadOutcome::Timeout => "timeout",
        UploadOutcome::TransportFailure(_) => "transport_failure",
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
