//! Logging integration for plugform.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating the span that
//! wraps one form assembly.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level` (e.g. "debug", "info",
/// "plugform_models=debug"). In debug mode a pretty, human-readable format is
/// used; otherwise a structured JSON format is used. Installing a second
/// subscriber is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for assembling (and validating) one configured form.
///
/// # Examples
///
/// ```
/// use plugform_core::logging::assembly_span;
///
/// let span = assembly_span(7, "contact");
/// let _guard = span.enter();
/// tracing::info!("assembling form");
/// ```
pub fn assembly_span(configured_form_id: i64, form_type: &str) -> tracing::Span {
    tracing::info_span!("assembly", configured_form = configured_form_id, form_type)
}
