use foundation::math::{StableF64, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EditorConfig;
use crate::edit::EditResult;
use crate::point::{polyline_length, positions};
use crate::track::Track;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickFixParams {
    pub spacing_m: f64,
    pub max_passes: usize,
    pub bezier_samples: usize,
    pub centroid_passes: usize,
}

impl QuickFixParams {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            spacing_m: config.quick_fix_spacing_m,
            max_passes: config.quick_fix_max_passes,
            bezier_samples: config.bezier_samples_per_span.max(1),
            centroid_passes: config.centroid_passes,
        }
    }
}

/// Decimate, fit Bezier spans, then centroid-average, over the whole track.
///
/// Returns `None` when decimation removes no points: the track is already
/// as sparse as the target spacing allows.
pub fn quick_fix(track: &Track, params: &QuickFixParams) -> Option<EditResult> {
    let original = positions(track.points());

    let mut fixed = decimate(&original, params.spacing_m, params.max_passes);
    if fixed.len() == original.len() {
        debug!(points = original.len(), "quick fix: nothing to decimate");
        return None;
    }
    fixed = bezier_approximation(&fixed, params.bezier_samples);
    for _ in 0..params.centroid_passes {
        fixed = centroid_average(&fixed);
    }

    if fixed == original {
        return None;
    }
    debug!(
        before = original.len(),
        after = fixed.len(),
        "quick fix composed"
    );
    Some(EditResult::whole(fixed, track.frame()))
}

/// Drops the least significant points until the mean spacing reaches
/// `spacing_m`, a pass removes nothing, or `max_passes` is spent.
pub fn decimate(points: &[Vec3], spacing_m: f64, max_passes: usize) -> Vec<Vec3> {
    let mut current = points.to_vec();
    for pass in 0..max_passes {
        if current.len() < 3 {
            break;
        }
        let length = polyline_length(&current);
        let mean = length / (current.len() - 1) as f64;
        if mean >= spacing_m {
            break;
        }

        let target = ((length / spacing_m).floor() as usize + 1).max(2);
        let interior = current.len() - 2;
        let budget = (current.len() - target).min((interior / 4).max(1));
        let next = simplify_pass(&current, budget);
        if next.len() == current.len() {
            debug!(pass, "decimation converged");
            break;
        }
        current = next;
    }
    current
}

/// Removes up to `budget` interior points with the smallest triangle area,
/// never two neighbours in the same pass.
fn simplify_pass(points: &[Vec3], budget: usize) -> Vec<Vec3> {
    let mut candidates: Vec<(f64, usize)> = (1..points.len() - 1)
        .map(|i| (triangle_area(points[i - 1], points[i], points[i + 1]), i))
        .collect();
    candidates.sort_by_key(|&(area, i)| (StableF64(area), i));

    let mut drop = vec![false; points.len()];
    let mut dropped = 0;
    for (_, i) in candidates {
        if dropped == budget {
            break;
        }
        if drop[i - 1] || drop[i + 1] {
            continue;
        }
        drop[i] = true;
        dropped += 1;
    }

    points
        .iter()
        .zip(drop)
        .filter(|(_, dropped)| !dropped)
        .map(|(p, _)| *p)
        .collect()
}

fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    (b - a).cross(c - a).length() * 0.5
}

/// Approximating quadratic Bezier spline: each interior point is the control
/// point of a span joining the midpoints of its two legs. Ends are kept.
pub fn bezier_approximation(points: &[Vec3], samples: usize) -> Vec<Vec3> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let samples = samples.max(1);
    let last = points.len() - 1;
    let mut out = vec![points[0]];

    for i in 1..last {
        let from = if i == 1 {
            points[0]
        } else {
            points[i - 1].lerp(points[i], 0.5)
        };
        let to = if i == last - 1 {
            points[last]
        } else {
            points[i].lerp(points[i + 1], 0.5)
        };
        let control = points[i];
        for s in 1..=samples {
            let t = s as f64 / samples as f64;
            let u = 1.0 - t;
            out.push(from.scale(u * u) + control.scale(2.0 * u * t) + to.scale(t * t));
        }
    }
    // The final span ends exactly on the last point.
    if let Some(end) = out.last_mut() {
        *end = points[last];
    }
    out
}

/// Replaces each interior point by the centroid of itself and its neighbours.
pub fn centroid_average(points: &[Vec3]) -> Vec<Vec3> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    for w in points.windows(3) {
        out.push((w[0] + w[1] + w[2]).scale(1.0 / 3.0));
    }
    out.push(points[points.len() - 1]);
    out
}
