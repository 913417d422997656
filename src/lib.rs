//! ArchiField capture core — photograph an equipment nameplate, persist the
//! capture, extract identification fields via the IRIS service, and route
//! the surveyor to confirmation or retake.
//!
//! The UI shell (screens, camera view, router) sits outside this crate and
//! plugs in through the [`workflow::CameraPort`], [`upload::UploadBackend`]
//! and [`workflow::Navigator`] seams.

pub mod config;
pub mod extraction; // Response interpreter + completeness classification
pub mod photo_store; // Transient capture → durable storage
pub mod session; // Shared identification-field state
pub mod upload; // Bounded upload to the IRIS extraction server
pub mod workflow; // Idle/Captured/Saving controller

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the host application.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
