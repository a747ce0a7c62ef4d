use serde::{Deserialize, Serialize};

use crate::{
    consolidate, extract, score, segment, select, Candidate, Frame, SelectionResult,
    TargetDetectorParams,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything the detector learned from one frame.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TargetDetection {
    pub width: u32,
    pub height: u32,
    /// All scored hulls in border discovery order.
    pub candidates: Vec<Candidate>,
    pub selection: SelectionResult,
}

impl TargetDetection {
    #[inline]
    pub fn detected(&self) -> bool {
        self.selection.detected()
    }

    /// The selected candidate, if any.
    pub fn target(&self) -> Option<&Candidate> {
        self.selection.candidate.as_ref()
    }
}

/// Stateless single-frame target detector.
#[derive(Clone, Debug, Default)]
pub struct TargetDetector {
    params: TargetDetectorParams,
}

impl TargetDetector {
    pub fn new(params: TargetDetectorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &TargetDetectorParams {
        &self.params
    }

    /// Run segmentation, dilation, hull extraction, scoring and selection.
    ///
    /// Total: any frame, including an empty one, produces a result.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect(&self, frame: &Frame) -> TargetDetection {
        let raw = segment(frame, &self.params.color);
        let mask = consolidate(&raw, self.params.dilation_radius);
        let candidates = score(extract(&mask));
        let selection = select(&candidates, &self.params.selection);

        match selection.candidate.as_ref() {
            Some(c) => log::debug!(
                "target {}/{}: area={:.1} centroid={:?}",
                selection.index.unwrap_or_default(),
                candidates.len(),
                c.area,
                c.centroid.map(|p| (p.x, p.y))
            ),
            None => log::debug!("no target among {} candidates", candidates.len()),
        }

        TargetDetection {
            width: frame.width(),
            height: frame.height(),
            candidates,
            selection,
        }
    }
}
