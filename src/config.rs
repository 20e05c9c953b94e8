//! Session configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const DEFAULT_THUMBNAIL_MAX_PX: f64 = 128.0;
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
pub const DEFAULT_MAX_ZOOM: f64 = 30.0;
pub const DEFAULT_STATE_PATH: &str = "sketchboard.json";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Quiet window before a persisted snapshot is written.
    pub persist_debounce: Duration,
    /// Image uploads above this size are rejected before decode.
    pub max_image_bytes: usize,
    /// Longest side of the cursor preview thumbnail.
    pub thumbnail_max_px: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// File used by the file-backed store.
    pub state_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist_debounce: Duration::from_millis(DEFAULT_PERSIST_DEBOUNCE_MS),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            thumbnail_max_px: DEFAULT_THUMBNAIL_MAX_PX,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

impl SessionConfig {
    /// Build typed session config from environment variables.
    ///
    /// Optional:
    /// - `SKETCHBOARD_PERSIST_DEBOUNCE_MS`: default 300
    /// - `SKETCHBOARD_MAX_IMAGE_BYTES`: default 2097152
    /// - `SKETCHBOARD_THUMBNAIL_MAX_PX`: default 128
    /// - `SKETCHBOARD_MIN_ZOOM`: default 0.1
    /// - `SKETCHBOARD_MAX_ZOOM`: default 30
    /// - `SKETCHBOARD_STATE_PATH`: default `sketchboard.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the zoom range or thumbnail cap is unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Same as [`SessionConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the zoom range or thumbnail cap is unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let config = Self {
            persist_debounce: Duration::from_millis(env_parse(
                &lookup,
                "SKETCHBOARD_PERSIST_DEBOUNCE_MS",
                DEFAULT_PERSIST_DEBOUNCE_MS,
            )),
            max_image_bytes: env_parse(&lookup, "SKETCHBOARD_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES),
            thumbnail_max_px: env_parse(&lookup, "SKETCHBOARD_THUMBNAIL_MAX_PX", DEFAULT_THUMBNAIL_MAX_PX),
            min_zoom: env_parse(&lookup, "SKETCHBOARD_MIN_ZOOM", DEFAULT_MIN_ZOOM),
            max_zoom: env_parse(&lookup, "SKETCHBOARD_MAX_ZOOM", DEFAULT_MAX_ZOOM),
            state_path: lookup("SKETCHBOARD_STATE_PATH").map_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH), PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// `ZoomRange` unless `0 < min_zoom < max_zoom`; `NotPositive` for a
    /// non-positive thumbnail cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom < self.max_zoom) {
            return Err(ConfigError::ZoomRange { min: self.min_zoom, max: self.max_zoom });
        }
        if self.thumbnail_max_px <= 0.0 {
            return Err(ConfigError::NotPositive { var: "SKETCHBOARD_THUMBNAIL_MAX_PX" });
        }
        Ok(())
    }
}

fn env_parse<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Result<String, VarError>,
    T: FromStr + Copy,
{
    lookup(key).map_or(default, |v| v.trim().parse::<T>().unwrap_or(default))
}
