//! Capture workflow controller — the Idle/Captured/Saving state machine.
//!
//! Orchestrates one nameplate capture end to end: camera → local photo store
//! → bounded upload → interpretation → session merge → routing. The machine
//! is cyclic by design: every terminal outcome returns to `Idle` with the
//! camera reactivated, and exactly one outcome fires per save.
//!
//! The camera's active/inactive state is the sole concurrency guard — it is
//! advisory (UI-level), not a hard lock, so the session store underneath
//! still tolerates a hypothetical concurrent second save as last-write-wins.

use std::sync::Arc;

use crate::extraction::{classify, interpret_response, CompletenessClass};
use crate::photo_store::{CapturedImage, PhotoStore};
use crate::session::SessionStore;
use crate::upload::{UploadBackend, UploadOutcome};

// ═══════════════════════════════════════════════════════════
// Ports (external collaborators)
// ═══════════════════════════════════════════════════════════

/// Camera capture primitive. Yields a transient image handle, or nothing
/// when the capture was aborted or the hardware failed.
pub trait CameraPort: Send + Sync {
    fn take_photo(&self) -> Option<CapturedImage>;
}

/// Navigation and user-facing notices, implemented by the UI shell.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
    fn show_notice(&self, notice: &Notice);
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn navigate(&self, destination: Destination) {
        (**self).navigate(destination);
    }

    fn show_notice(&self, notice: &Notice) {
        (**self).show_notice(notice);
    }
}

/// Symbolic navigation targets the workflow can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Back to a fresh capture: the extraction was insufficient.
    RetakeCapture,
    /// Forward to the confirmation screen, which reads the session snapshot.
    Confirmation,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetakeCapture => "retake-capture",
            Self::Confirmation => "confirmation",
        }
    }
}

/// User-facing failure notices. Timeout is deliberately distinct from a
/// general upload failure — the surveyor's remedy differs (move closer to
/// the access point vs. report the server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    StorageFailed(String),
    UploadTimedOut,
    UploadFailed(String),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageFailed(cause) => {
                write!(f, "The photo could not be saved: {cause}")
            }
            Self::UploadTimedOut => {
                write!(
                    f,
                    "The extraction server did not answer in time. \
                     Check the connection and take the photo again."
                )
            }
            Self::UploadFailed(cause) => {
                write!(f, "Uploading the photo failed: {cause}")
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// State machine
// ═══════════════════════════════════════════════════════════

/// Observable phase of the workflow (the camera view binds to this).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Camera live, accepting a capture.
    Idle,
    /// Image taken, awaiting user save or cancel.
    Captured,
    /// Store + upload in flight.
    Saving,
}

enum CaptureState {
    Idle,
    Captured(CapturedImage),
    Saving,
}

/// Terminal outcome of one save attempt. Exactly one per `Saving` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Fields merged; routed to confirmation. `warning` mirrors the flag
    /// written to the session store (true only for a partial extraction).
    Confirmed {
        classification: CompletenessClass,
        warning: bool,
    },
    /// Extraction insufficient; routed back to a fresh capture.
    Retake,
    /// Local persistence failed; no upload was attempted.
    StorageFailed(String),
    /// The upload timer fired first.
    UploadTimedOut,
    /// Non-2xx or network failure.
    UploadFailed(String),
    /// `confirm_save` was invoked with no capture pending.
    NothingToSave,
}

/// The capture-to-decision workflow controller.
pub struct CaptureWorkflow<C, U, N>
where
    C: CameraPort,
    U: UploadBackend,
    N: Navigator,
{
    camera: C,
    photos: PhotoStore,
    uploader: U,
    navigator: N,
    session: Arc<SessionStore>,
    state: CaptureState,
}

impl<C, U, N> CaptureWorkflow<C, U, N>
where
    C: CameraPort,
    U: UploadBackend,
    N: Navigator,
{
    pub fn new(
        camera: C,
        photos: PhotoStore,
        uploader: U,
        navigator: N,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            camera,
            photos,
            uploader,
            navigator,
            session,
            state: CaptureState::Idle,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        match self.state {
            CaptureState::Idle => CapturePhase::Idle,
            CaptureState::Captured(_) => CapturePhase::Captured,
            CaptureState::Saving => CapturePhase::Saving,
        }
    }

    /// The camera is live only while idle — no concurrent capture while a
    /// save is pending.
    pub fn camera_active(&self) -> bool {
        matches!(self.state, CaptureState::Idle)
    }

    /// `Idle → Captured`: invoke the capture primitive.
    ///
    /// Returns false (and stays put) when not idle or when the camera
    /// produced nothing.
    pub fn capture(&mut self) -> bool {
        if !matches!(self.state, CaptureState::Idle) {
            tracing::warn!(phase = ?self.phase(), "Capture rejected: not idle");
            return false;
        }
        match self.camera.take_photo() {
            Some(image) => {
                tracing::debug!(source = %image.source().display(), "Image captured");
                self.state = CaptureState::Captured(image);
                true
            }
            None => {
                tracing::warn!("Camera produced no capture");
                false
            }
        }
    }

    /// `Captured → Idle`: discard the transient image. No store or network
    /// call is made; the file is left for the OS to reclaim.
    pub fn cancel(&mut self) -> bool {
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Captured(image) => {
                tracing::info!(source = %image.source().display(), "Capture discarded");
                true
            }
            other => {
                self.state = other;
                tracing::warn!(phase = ?self.phase(), "Cancel rejected: nothing captured");
                false
            }
        }
    }

    /// `Captured → Saving → Idle`: persist, upload, interpret, route.
    ///
    /// Store, upload and interpretation run in strict sequence, each gated
    /// on the prior step. Every exit path returns to `Idle` with the camera
    /// reactivated; failures surface as notices, never as panics. Once
    /// saving has begun there is no cancellation.
    pub async fn confirm_save(&mut self, display_name: Option<&str>) -> SaveOutcome {
        let image = match std::mem::replace(&mut self.state, CaptureState::Saving) {
            CaptureState::Captured(image) => image,
            other => {
                self.state = other;
                tracing::warn!(phase = ?self.phase(), "Save rejected: nothing captured");
                return SaveOutcome::NothingToSave;
            }
        };

        let outcome = self.run_save(image, display_name).await;
        self.state = CaptureState::Idle;
        tracing::info!(outcome = ?outcome, "Save settled, camera reactivated");
        outcome
    }

    async fn run_save(&mut self, image: CapturedImage, display_name: Option<&str>) -> SaveOutcome {
        let photo = match self.photos.store(image, display_name) {
            Ok(photo) => photo,
            Err(e) => {
                tracing::warn!(error = %e, "Local persistence failed; upload skipped");
                let notice = Notice::StorageFailed(e.to_string());
                self.navigator.show_notice(&notice);
                return SaveOutcome::StorageFailed(e.to_string());
            }
        };

        match self.uploader.upload(&photo).await {
            UploadOutcome::Timeout => {
                self.navigator.show_notice(&Notice::UploadTimedOut);
                SaveOutcome::UploadTimedOut
            }
            UploadOutcome::TransportFailure(cause) => {
                self.navigator.show_notice(&Notice::UploadFailed(cause.clone()));
                SaveOutcome::UploadFailed(cause)
            }
            UploadOutcome::Success(body) => {
                let fields = interpret_response(&body);
                match classify(&fields) {
                    CompletenessClass::Insufficient => {
                        // Identity triple incomplete: nothing is merged, the
                        // session keeps its prior values for a fresh attempt.
                        tracing::info!(
                            photo = %photo.display_name(),
                            "Extraction insufficient, routing to retake"
                        );
                        self.navigator.navigate(Destination::RetakeCapture);
                        SaveOutcome::Retake
                    }
                    classification => {
                        let warning = classification == CompletenessClass::Partial;
                        self.session.merge(&fields);
                        self.session.set_warning(warning);
                        tracing::info!(
                            photo = %photo.display_name(),
                            classification = ?classification,
                            warning,
                            "Extraction accepted, routing to confirmation"
                        );
                        self.navigator.navigate(Destination::Confirmation);
                        SaveOutcome::Confirmed {
                            classification,
                            warning,
                        }
                    }
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
