use tracing::debug;

use crate::edit::EditResult;
use crate::track::Track;

/// Pulls altitudes in the region towards the straight slope between its ends.
///
/// `bumpiness` of 0 lays every point on the average slope, 1 leaves the
/// altitudes as they were. Planar positions never change.
pub fn smooth_gradient(track: &Track, bumpiness: f64) -> Option<EditResult> {
    let region = track.region();
    if region.len() < 3 {
        debug!("gradient smoothing needs interior points");
        return None;
    }

    let points = track.points();
    let first = &points[region.start];
    let last = &points[region.end];
    let span = last.distance_from_start - first.distance_from_start;
    if span <= f64::EPSILON {
        return None;
    }

    let bumpiness = bumpiness.clamp(0.0, 1.0);
    let rise = last.altitude() - first.altitude();
    let edited = points[region.start..=region.end]
        .iter()
        .map(|p| {
            let fraction = (p.distance_from_start - first.distance_from_start) / span;
            let average = first.altitude() + rise * fraction;
            let altitude = average + (p.altitude() - average) * bumpiness;
            p.position.with_z(altitude)
        })
        .collect();

    Some(EditResult::replace(
        points,
        region.start,
        region.end,
        edited,
        track.frame(),
    ))
}
