//! # Tracing Setup
//!
//! The framework logs through the `tracing` macros and never installs a
//! subscriber itself. Binaries call [`setup_tracing`] once at startup.
//!
//! ## What gets logged
//!
//! - `warn`: an `_embedded` key with no usable embedded definition
//! - `debug`: model declarations installed, explicit property registrations
//! - `trace`: every routed property, skipped keys, ignored partials, resolved
//!   deferred types
//!
//! Every event carries a `class` field with the short model name, so output can
//! be narrowed to one model with an `EnvFilter` field directive.

/// Initializes structured logging for the application.
///
/// Verbosity is controlled by the `RUST_LOG` environment variable:
/// - `RUST_LOG=warn` - Only embedded-key warnings
/// - `RUST_LOG=model_framework=debug` - Declarations and registrations
/// - `RUST_LOG=model_framework=trace` - Every property routed
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
