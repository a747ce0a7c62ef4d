use serde::{Deserialize, Serialize};

use crate::Candidate;

fn default_min_area() -> f64 {
    100.0
}

fn default_max_area() -> f64 {
    30_000.0
}

/// Area thresholds for target selection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionParams {
    /// Candidates must have `area > min_area` (strict).
    #[serde(default = "default_min_area")]
    pub min_area: f64,
    /// Advisory upper bound. Reported alongside the configuration but never
    /// used to reject a candidate.
    #[serde(default = "default_max_area")]
    pub max_area: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            min_area: default_min_area(),
            max_area: default_max_area(),
        }
    }
}

/// Outcome of selection for one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Position of the selected candidate in the scored list.
    pub index: Option<usize>,
    pub candidate: Option<Candidate>,
}

impl SelectionResult {
    #[inline]
    pub fn detected(&self) -> bool {
        self.candidate.is_some()
    }
}

/// Pick the largest candidate with `area > min_area`.
///
/// Candidates are visited in order and a later one replaces the current best
/// only when its area is strictly larger, so equal areas resolve to the
/// earliest candidate. Degenerate candidates never qualify.
pub fn select(candidates: &[Candidate], params: &SelectionParams) -> SelectionResult {
    let best = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_degenerate() && c.area > params.min_area)
        .fold(None::<(usize, &Candidate)>, |best, (i, c)| match best {
            Some((_, b)) if c.area <= b.area => best,
            _ => Some((i, c)),
        });

    match best {
        Some((index, candidate)) => SelectionResult {
            index: Some(index),
            candidate: Some(candidate.clone()),
        },
        None => SelectionResult::default(),
    }
}
