use std::path::Path;

use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_PRODUCT_ID, ENV_PREFIX, ENV_SEPARATOR};
use crate::error::{CoreError, CoreResult};


#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Value written to the calendar's `PRODID` line.
    pub product_id: String,
    /// IANA identifier used for events that carry no timezone. Falls back to
    /// host detection when unset.
    pub local_timezone: Option<String>,
    pub escape_text: bool,
    pub fold_lines: bool,
    /// Namespace for deterministic per-event `UID`s. No `UID` lines are written
    /// when unset.
    pub uid_namespace: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, an optional TOML file and `CALFORGE__`
    /// environment variables, in increasing order of precedence.
    ///
    /// When `path` is `None` the file `calforge.toml` in the working directory is
    /// used if it exists.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it or
    /// validating it fails.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_FILE_NAME).required(false),
        };

        let settings = Self::builder()?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;

        settings.validate()?;
        Ok(settings)
    }

    fn builder() -> CoreResult<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("calendar.product_id", DEFAULT_PRODUCT_ID)?
            .set_default("calendar.escape_text", false)?
            .set_default("calendar.fold_lines", false)?
            .set_default("logging.level", "info")?)
    }

    /// ## Summary
    /// Checks values that deserialize fine but cannot produce a usable calendar.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` naming the offending key.
    pub fn validate(&self) -> CoreResult<()> {
        if self.calendar.product_id.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "calendar.product_id must not be empty".to_string(),
            ));
        }

        if let Some(tz) = &self.calendar.local_timezone
            && tz.trim().is_empty()
        {
            return Err(CoreError::ValidationError(
                "calendar.local_timezone must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables, a `.env` file and the
/// optional configuration file.
///
/// ## Errors
/// Returns an error if loading or validating the configuration fails.
pub fn load_config(path: Option<&Path>) -> CoreResult<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::trace!(error = %e, "No .env file loaded");
    }

    Settings::load(path)
}
