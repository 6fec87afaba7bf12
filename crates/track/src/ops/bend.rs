use foundation::math::{Vec2, Vec3};
use tracing::debug;

use crate::edit::EditResult;
use crate::point::polyline_length;
use crate::track::Track;

// Road directions closer to parallel than this have no usable arc.
const MIN_TURN_SINE: f64 = 1e-6;
// Beyond this turn the bend doubles back and the incircle degenerates.
const MAX_TURN_RAD: f64 = std::f64::consts::PI - 1e-3;
const COINCIDENT_M: f64 = 1e-3;
/// Most points a single bend may be resampled into.
pub const MAX_BEND_POINTS: usize = 10_000;

/// Geometry of a circular bend tangent to the entry and exit roads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BendArc {
    pub centre: Vec2,
    pub radius: f64,
    /// Tangent point on the entry road.
    pub entry: Vec2,
    /// Tangent point on the exit road.
    pub exit: Vec2,
    /// Signed turn in radians; positive turns left.
    pub turn: f64,
}

/// Fits an arc between the road leaving the first marker and the road
/// arriving at the second.
///
/// The entry road runs from `points[start]` to `points[start + 1]`, the exit
/// road from `points[end - 1]` to `points[end]`. The arc touches both roads at
/// the same distance from where they meet, as far out as the nearer marker.
pub fn fit_bend(track: &Track) -> Option<BendArc> {
    let region = track.region();
    if region.len() < 3 {
        return None;
    }
    let points = track.points();
    let a = points[region.start].position.xy();
    let b = points[region.start + 1].position.xy();
    let c = points[region.end - 1].position.xy();
    let d = points[region.end].position.xy();

    let entry_dir = (b - a).normalized()?;
    let exit_dir = (d - c).normalized()?;
    let cross = entry_dir.perp_dot(exit_dir);
    if cross.abs() < MIN_TURN_SINE {
        return None;
    }

    // Meeting point `m = a + entry_dir * s = d + exit_dir * u`.
    let s = (d - a).perp_dot(exit_dir) / cross;
    let u = (d - a).perp_dot(entry_dir) / cross;
    if s <= 0.0 || u >= 0.0 {
        // The roads meet behind the first marker or beyond the second.
        return None;
    }
    let meet = a + entry_dir.scale(s);

    let turn = cross.atan2(entry_dir.dot(exit_dir));
    if turn.abs() >= MAX_TURN_RAD {
        return None;
    }

    let tangent = s.min(-u);
    if tangent <= COINCIDENT_M {
        return None;
    }
    let radius = tangent / (turn.abs() * 0.5).tan();
    let entry = meet - entry_dir.scale(tangent);
    let exit = meet + exit_dir.scale(tangent);
    let left_normal = Vec2::new(-entry_dir.y, entry_dir.x);
    let centre = entry + left_normal.scale(radius * turn.signum());

    Some(BendArc {
        centre,
        radius,
        entry,
        exit,
        turn,
    })
}

/// Replaces the points between the markers with a resampled circular bend.
///
/// Returns `None` when no arc fits; the caller leaves the track alone.
pub fn smooth_bend(track: &Track, spacing_m: f64) -> Option<EditResult> {
    if !(spacing_m.is_finite() && spacing_m > 0.0) {
        return None;
    }
    let Some(arc) = fit_bend(track) else {
        debug!("no bend arc fits between the markers");
        return None;
    };

    let region = track.region();
    let points = track.points();
    let first = points[region.start].position;
    let last = points[region.end].position;

    let mut planar = vec![first.xy()];
    if (arc.entry - first.xy()).length() > COINCIDENT_M {
        planar.push(arc.entry);
    }

    let sweep = arc.radius * arc.turn.abs();
    let steps = (sweep / spacing_m).ceil();
    if steps > MAX_BEND_POINTS as f64 {
        debug!(sweep, spacing_m, "bend spacing too fine to resample");
        return None;
    }
    let steps = (steps as usize).max(1);
    let from = arc.entry - arc.centre;
    let start_angle = from.y.atan2(from.x);
    for step in 1..steps {
        let angle = start_angle + arc.turn * step as f64 / steps as f64;
        planar.push(arc.centre + Vec2::new(angle.cos(), angle.sin()).scale(arc.radius));
    }

    if (last.xy() - arc.exit).length() > COINCIDENT_M {
        planar.push(arc.exit);
    }
    planar.push(last.xy());

    // Altitude climbs evenly with distance along the new path.
    let flat: Vec<Vec3> = planar.iter().map(|p| Vec3::new(p.x, p.y, 0.0)).collect();
    let total = polyline_length(&flat);
    let mut travelled = 0.0;
    let mut edited = Vec::with_capacity(flat.len());
    for (i, p) in flat.iter().enumerate() {
        if i > 0 {
            travelled += flat[i - 1].distance(*p);
        }
        let fraction = if total > 0.0 { travelled / total } else { 0.0 };
        edited.push(p.with_z(first.z + (last.z - first.z) * fraction));
    }

    Some(EditResult::replace(
        points,
        region.start,
        region.end,
        edited,
        track.frame(),
    ))
}

#[cfg(test)]
mod tests {
    use super::{MAX_BEND_POINTS, fit_bend, smooth_bend};
    use crate::markers::Cursor;
    use crate::ops::fixtures::{assert_close, straight, track};
    use foundation::math::{Vec2, Vec3};

    /// Lead-in, then a right-angled left turn at (30, 0).
    fn corner() -> crate::track::Track {
        let mut positions = vec![Vec3::new(-10.0, 0.0, 0.0)];
        positions.extend((0..=3).map(|i| Vec3::new(i as f64 * 10.0, 0.0, 0.0)));
        positions.extend((1..=3).map(|i| Vec3::new(30.0, i as f64 * 10.0, 6.0 * i as f64)));
        positions.push(Vec3::new(30.0, 40.0, 18.0));
        let mut t = track(positions);
        // Markers on (0, 0) and (30, 30).
        t.set_cursor(Cursor::new(1, Some(7)));
        t
    }

    #[test]
    fn fits_quarter_circle() {
        let arc = fit_bend(&corner()).expect("arc");
        assert_close(arc.radius, 30.0, 1e-9);
        assert_close(arc.turn, std::f64::consts::FRAC_PI_2, 1e-12);
        assert_close(arc.centre.x, 0.0, 1e-9);
        assert_close(arc.centre.y, 30.0, 1e-9);
        assert!((arc.entry - Vec2::new(0.0, 0.0)).length() < 1e-9);
        assert!((arc.exit - Vec2::new(30.0, 30.0)).length() < 1e-9);
    }

    #[test]
    fn resampled_points_lie_on_the_arc() {
        let t = corner();
        let result = smooth_bend(&t, 5.0).expect("result");
        assert_eq!(result.before.len(), 1);
        assert_eq!(result.after.len(), 1);
        // Quarter circle of radius 30 is ~47.1 m: ten 4.7 m steps.
        assert_eq!(result.edited.len(), 11);
        for p in &result.edited {
            let r = (p.position.xy() - Vec2::new(0.0, 30.0)).length();
            assert_close(r, 30.0, 1e-9);
        }
        assert_eq!(result.edited[0].position, Vec3::new(0.0, 0.0, 0.0));
        assert_close(result.edited[10].position.z, 18.0, 1e-9);
        assert!(result.edited.windows(2).all(|w| w[0].position.z <= w[1].position.z));
    }

    #[test]
    fn resampling_is_capped() {
        let t = corner();
        // About 47.1 m of arc.
        let sweep = 30.0 * std::f64::consts::FRAC_PI_2;
        let at_cap = sweep / MAX_BEND_POINTS as f64;
        let result = smooth_bend(&t, at_cap * 1.001).expect("result");
        assert!(result.edited.len() <= MAX_BEND_POINTS + 3);
        assert!(smooth_bend(&t, at_cap * 0.5).is_none());
        assert!(smooth_bend(&t, 1e-12).is_none());
    }

    #[test]
    fn colinear_markers_have_no_arc() {
        let mut t = straight(8, 10.0);
        t.set_cursor(Cursor::new(1, Some(6)));
        assert!(smooth_bend(&t, 5.0).is_none());
    }

    #[test]
    fn adjacent_markers_have_no_arc() {
        let mut t = corner();
        t.set_cursor(Cursor::new(3, Some(4)));
        assert!(smooth_bend(&t, 5.0).is_none());
    }

    #[test]
    fn roads_meeting_behind_the_marker_have_no_arc() {
        // Extending the exit road backwards crosses y = 0 at x = -10.
        let mut t = track(vec![
            Vec3::new(-10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 20.0, 0.0),
            Vec3::new(20.0, 30.0, 0.0),
            Vec3::new(30.0, 40.0, 0.0),
        ]);
        t.set_cursor(Cursor::new(1, Some(4)));
        assert!(smooth_bend(&t, 5.0).is_none());
    }
}
