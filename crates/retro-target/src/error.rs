use std::path::PathBuf;

/// Errors produced while loading or saving a [`crate::SessionConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("config root must be a JSON object")]
    NotAnObject,
}

/// Errors produced by a [`crate::FrameSource`].
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("frame source unavailable: {0}")]
    Unavailable(String),
    #[error("no frames to replay")]
    NoFrames,
    #[error("gave up opening frame source after {attempts} attempts: {last}")]
    OpenExhausted { attempts: usize, last: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Errors produced by an [`crate::ExposureController`].
#[derive(thiserror::Error, Debug)]
pub enum ExposureError {
    #[error("exposure control rejected {control}: {reason}")]
    Rejected {
        control: &'static str,
        reason: String,
    },
}

/// Errors produced by a [`crate::TelemetryLink`].
#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors that stop the tracker before or between cycles.
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}
