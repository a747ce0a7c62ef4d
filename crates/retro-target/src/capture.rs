//! Frame acquisition.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use image::imageops::{self, FilterType};

use crate::{CaptureError, Frame};

/// A camera or anything that behaves like one.
pub trait FrameSource {
    /// Try to open the device. Called again after a failure.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Request a capture resolution for subsequent frames.
    fn set_resolution(&mut self, width: u32, height: u32) -> Result<(), CaptureError>;

    /// Block until the next frame. `None` means the device is closed and no
    /// further frames will come.
    fn read(&mut self) -> Option<Frame>;
}

/// Backoff policy for [`open_with_retry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenRetry {
    /// Pause between failed attempts.
    pub backoff: Duration,
    /// Stop after this many attempts; `None` retries forever.
    pub max_attempts: Option<usize>,
}

impl Default for OpenRetry {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

/// Open `source`, sleeping `retry.backoff` between failures.
///
/// With the default policy this only returns once the device opens. Returns
/// the number of attempts it took.
pub fn open_with_retry<S: FrameSource + ?Sized>(
    source: &mut S,
    retry: &OpenRetry,
) -> Result<usize, CaptureError> {
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        match source.open() {
            Ok(()) => {
                log::info!("frame source open after {attempts} attempt(s)");
                return Ok(attempts);
            }
            Err(err) => {
                log::warn!("frame source open failed (attempt {attempts}): {err}");
                if retry.max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(CaptureError::OpenExhausted {
                        attempts,
                        last: err.to_string(),
                    });
                }
                thread::sleep(retry.backoff);
            }
        }
    }
}

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "ppm"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Replays still images as a camera feed.
///
/// The source reports itself closed after the last image, which ends the
/// frame loop the same way an unplugged camera does.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    opened: bool,
    resolution: Option<(u32, u32)>,
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            next: 0,
            opened: false,
            resolution: None,
        }
    }

    /// Build from files and directories. Directories contribute their image
    /// files in name order; plain paths are taken as given.
    pub fn from_paths<I, P>(inputs: I) -> Result<Self, CaptureError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut paths = Vec::new();
        for input in inputs {
            let input = input.as_ref();
            if input.is_dir() {
                let mut entries: Vec<PathBuf> = std::fs::read_dir(input)?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| p.is_file() && is_image_file(p))
                    .collect();
                entries.sort();
                paths.extend(entries);
            } else {
                paths.push(input.to_path_buf());
            }
        }
        Ok(Self::new(paths))
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Frames not yet replayed.
    pub fn remaining(&self) -> usize {
        self.paths.len().saturating_sub(self.next)
    }

    fn conform(&self, frame: Frame) -> Frame {
        match self.resolution {
            Some((w, h)) if frame.dimensions() != (w, h) && w > 0 && h > 0 => {
                imageops::resize(&frame, w, h, FilterType::Triangle)
            }
            _ => frame,
        }
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.paths.is_empty() {
            return Err(CaptureError::NoFrames);
        }
        if !self.paths.iter().any(|p| p.is_file()) {
            return Err(CaptureError::Unavailable(format!(
                "none of {} frame paths exist",
                self.paths.len()
            )));
        }
        self.opened = true;
        self.next = 0;
        Ok(())
    }

    fn set_resolution(&mut self, width: u32, height: u32) -> Result<(), CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::Unavailable(format!(
                "invalid resolution {width}x{height}"
            )));
        }
        self.resolution = Some((width, height));
        Ok(())
    }

    fn read(&mut self) -> Option<Frame> {
        if !self.opened {
            return None;
        }
        while let Some(path) = self.paths.get(self.next) {
            self.next += 1;
            match image::open(path) {
                Ok(img) => return Some(self.conform(img.to_rgb8())),
                Err(err) => log::warn!("skipping frame {}: {err}", path.display()),
            }
        }
        log::info!("image sequence exhausted after {} paths", self.paths.len());
        self.opened = false;
        None
    }
}
