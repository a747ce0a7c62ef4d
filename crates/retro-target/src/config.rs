//! Session configuration.
//!
//! Two on-disk formats are accepted: a JSON object, and the line-based
//! `key = value` parameter file used on the tracker host
//! (`chillOut_params.txt`). Both go through the same per-key assignment, so
//! every field is defaulted independently: a missing, unknown or malformed
//! entry is logged and leaves the compiled-in default in place.

use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use retro_target_core::ColorRange;
use retro_target_detector::{SelectionParams, TargetDetectorParams, DEFAULT_DILATION_RADIUS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ConfigError;

/// Everything the tracker reads at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// `host:port` of the remote controller's telemetry server.
    pub remote_address: String,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Candidates must be strictly larger than this (square pixels).
    pub min_area: f64,
    /// Advisory only; selection does not enforce it.
    pub max_area: f64,
    pub color_range: ColorRange,
    pub dilation_radius: u32,
    /// Absolute exposure used in manual mode. Auto-targeting uses `0`.
    pub max_exposure: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let selection = SelectionParams::default();
        Self {
            remote_address: "roborio.local:8081".to_string(),
            frame_width: 640,
            frame_height: 480,
            min_area: selection.min_area,
            max_area: selection.max_area,
            color_range: ColorRange::default(),
            dilation_radius: DEFAULT_DILATION_RADIUS,
            max_exposure: 100.0,
        }
    }
}

fn assign<T: DeserializeOwned>(slot: &mut T, key: &str, value: &Value) {
    match T::deserialize(value) {
        Ok(v) => *slot = v,
        Err(err) => log::warn!("ignoring config value {key} = {value}: {err}"),
    }
}

impl SessionConfig {
    /// Parse a JSON object. Keys may use either the snake_case field names or
    /// the camelCase names of the parameter file.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let Value::Object(entries) = serde_json::from_str::<Value>(raw)? else {
            return Err(ConfigError::NotAnObject);
        };
        let mut cfg = Self::default();
        cfg.apply_entries(&entries);
        Ok(cfg)
    }

    /// Parse the line-based `key = value` parameter file.
    ///
    /// Blank lines and lines starting with `#` are skipped. Values are read as
    /// JSON scalars when possible and as bare strings otherwise.
    pub fn parse_params(text: &str) -> Self {
        let mut entries = Map::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, raw)) = line.split_once('=') else {
                log::warn!("config line {}: expected `key = value`, got {line:?}", lineno + 1);
                continue;
            };
            let raw = raw.trim();
            let value = serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            entries.insert(key.trim().to_string(), value);
        }
        let mut cfg = Self::default();
        cfg.apply_entries(&entries);
        cfg
    }

    /// Load a config file, JSON when the extension is `.json`, the parameter
    /// file format otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&raw)
        } else {
            Ok(Self::parse_params(&raw))
        }
    }

    /// Like [`SessionConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::warn!("config {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Detector parameters for one cycle.
    pub fn detector_params(&self) -> TargetDetectorParams {
        TargetDetectorParams {
            color: self.color_range,
            dilation_radius: self.dilation_radius,
            selection: SelectionParams {
                min_area: self.min_area,
                max_area: self.max_area,
            },
        }
    }

    /// Log the effective configuration, one value per line.
    pub fn log_summary(&self) {
        log::info!("remote_address = {}", self.remote_address);
        log::info!("frame = {}x{}", self.frame_width, self.frame_height);
        log::info!("min_area = {} max_area = {}", self.min_area, self.max_area);
        log::info!(
            "color_range h=[{}, {}] s=[{}, {}] v=[{}, {}]",
            self.color_range.min[0],
            self.color_range.max[0],
            self.color_range.min[1],
            self.color_range.max[1],
            self.color_range.min[2],
            self.color_range.max[2]
        );
        log::info!("dilation_radius = {}", self.dilation_radius);
        log::info!("max_exposure = {}", self.max_exposure);
        if !self.color_range.is_satisfiable() {
            log::warn!("color range has min > max on some channel; nothing will match");
        }
    }

    fn apply_entries(&mut self, entries: &Map<String, Value>) {
        for (key, value) in entries {
            let k = key.as_str();
            match k {
                "remote_address" | "roborio_ipaddr" => match value {
                    // bare numeric hosts parse as JSON numbers in the params file
                    Value::Number(n) => self.remote_address = n.to_string(),
                    _ => assign(&mut self.remote_address, k, value),
                },
                "frame_width" | "frameWidth" => assign(&mut self.frame_width, k, value),
                "frame_height" | "frameHeight" => assign(&mut self.frame_height, k, value),
                "min_area" | "minArea" => assign(&mut self.min_area, k, value),
                "max_area" | "maxArea" => assign(&mut self.max_area, k, value),
                "dilation_radius" | "dilationFactor" => assign(&mut self.dilation_radius, k, value),
                "max_exposure" | "maxExposure" => assign(&mut self.max_exposure, k, value),
                "color_range" => self.apply_color_range(value),
                "minColor_h" => assign(&mut self.color_range.min[0], k, value),
                "maxColor_h" => assign(&mut self.color_range.max[0], k, value),
                "minColor_s" => assign(&mut self.color_range.min[1], k, value),
                "maxColor_s" => assign(&mut self.color_range.max[1], k, value),
                "minColor_v" => assign(&mut self.color_range.min[2], k, value),
                "maxColor_v" => assign(&mut self.color_range.max[2], k, value),
                _ => log::warn!("ignoring unknown config key {k}"),
            }
        }
    }

    fn apply_color_range(&mut self, value: &Value) {
        let Value::Object(range) = value else {
            log::warn!("ignoring config value color_range = {value}: expected an object");
            return;
        };
        for (key, bounds) in range {
            match key.as_str() {
                "min" => assign(&mut self.color_range.min, "color_range.min", bounds),
                "max" => assign(&mut self.color_range.max, "color_range.max", bounds),
                other => log::warn!("ignoring unknown config key color_range.{other}"),
            }
        }
    }
}

/// Configuration shared between the frame loop and a tuning front end.
///
/// The loop takes one [`SharedConfig::snapshot`] per cycle, so an update never
/// lands in the middle of a frame.
#[derive(Clone, Debug, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<SessionConfig>>,
}

impl SharedConfig {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> SessionConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate the configuration; visible from the next snapshot on.
    pub fn update(&self, f: impl FnOnce(&mut SessionConfig)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}
