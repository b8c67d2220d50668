//! Settings for plugform.
//!
//! This module provides the [`Settings`] struct, which holds all
//! configuration, and [`LazySettings`], a globally-accessible,
//! lazily-initialized settings instance.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database file path, or `:memory:`.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("plugform.sqlite3"),
        }
    }
}

/// Configuration of the enhanced dropdown widget used by select fields.
///
/// The values are rendered as `data-*` attributes and consumed by the
/// client-side Select2 library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Select2Settings {
    /// Number of characters typed before searching starts.
    pub minimum_input_length: u32,
    /// Maximum number of characters in the search input.
    pub maximum_input_length: u32,
    /// Text shown while nothing is selected.
    pub placeholder: String,
    /// Whether the dropdown closes after a selection.
    pub close_on_select: bool,
    /// Whether a clear icon is shown.
    pub allow_clear: bool,
    /// The widget locale.
    pub language: String,
}

impl Default for Select2Settings {
    fn default() -> Self {
        Self {
            minimum_input_length: 0,
            maximum_input_length: 1000,
            placeholder: "Click to select".to_string(),
            close_on_select: true,
            allow_clear: true,
            language: "en".to_string(),
        }
    }
}

/// The complete set of settings.
///
/// Use [`SETTINGS`] to access the global instance.
///
/// # Examples
///
/// ```
/// use plugform_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.textarea_rows, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The language code (e.g. "en-us").
    pub language_code: String,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level filter (e.g. "info", "plugform_models=debug").
    pub log_level: String,

    // ── Storage ──────────────────────────────────────────────────────

    /// Where editor-authored plugin rows are stored.
    pub database: DatabaseSettings,

    // ── Widgets ──────────────────────────────────────────────────────

    /// Enhanced dropdown configuration for select fields.
    pub select2: Select2Settings,
    /// Visible rows of multiline text fields.
    pub textarea_rows: u32,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            language_code: "en-us".to_string(),
            log_level: "info".to_string(),
            database: DatabaseSettings::default(),
            select2: Select2Settings::default(),
            textarea_rows: 5,
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup. Code that
/// runs before that (or in tests) sees the defaults through
/// [`get_or_default`](LazySettings::get_or_default).
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, falling back to (and freezing)
    /// the defaults when nothing was configured.
    pub fn get_or_default(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
