use foundation::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::edit::EditResult;
use crate::track::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeMode {
    /// Every point in the region moves by the full offset.
    Translate,
    /// The point at `pointer` moves by the full offset; the offset tapers
    /// linearly with distance to nothing at both region ends.
    Stretch { pointer: usize },
}

/// Moves the marker region in the plane, optionally raising or lowering it.
///
/// `offset` is expected to be capped already; see `Operation::nudge`.
pub fn nudge(track: &Track, offset: Vec2, height_m: f64, mode: NudgeMode) -> Option<EditResult> {
    let region = track.region();
    if region.is_empty() {
        return None;
    }
    let points = track.points();
    let shift = Vec3::new(offset.x, offset.y, height_m);

    let weights: Vec<f64> = match mode {
        NudgeMode::Translate => vec![1.0; region.len()],
        NudgeMode::Stretch { pointer } => {
            if pointer <= region.start || pointer >= region.end {
                return None;
            }
            let d_start = points[region.start].distance_from_start;
            let d_pointer = points[pointer].distance_from_start;
            let d_end = points[region.end].distance_from_start;
            if d_pointer - d_start <= f64::EPSILON || d_end - d_pointer <= f64::EPSILON {
                return None;
            }
            points[region.start..=region.end]
                .iter()
                .map(|p| {
                    let d = p.distance_from_start;
                    if p.index <= pointer {
                        (d - d_start) / (d_pointer - d_start)
                    } else {
                        (d_end - d) / (d_end - d_pointer)
                    }
                })
                .collect()
        }
    };

    let edited = points[region.start..=region.end]
        .iter()
        .zip(weights)
        .map(|(p, w)| p.position + shift.scale(w))
        .collect();

    Some(EditResult::replace(
        points,
        region.start,
        region.end,
        edited,
        track.frame(),
    ))
}
