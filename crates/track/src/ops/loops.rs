use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::edit::EditResult;
use crate::point::{TrackPoint, positions};
use crate::track::Track;

/// How close the track's ends are to meeting.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Loopiness {
    IsLoop,
    AlmostLoop(f64),
    NotLoop(f64),
}

/// Classifies by the 3D gap between the first and last point.
pub fn classify(track: &Track, threshold_m: f64, tolerance_m: f64) -> Loopiness {
    let gap = track.first().position.distance(track.last().position);
    if track.len() < 3 {
        return Loopiness::NotLoop(gap);
    }
    if gap <= tolerance_m {
        Loopiness::IsLoop
    } else if gap < threshold_m {
        Loopiness::AlmostLoop(gap)
    } else {
        Loopiness::NotLoop(gap)
    }
}

/// Closes a loop whose ends are within `threshold_m`.
///
/// Ends within `tolerance_m` are merged by making the last point a copy of the
/// first. A wider gap gets a short closing leg: a point one metre behind the
/// start, against its outgoing direction, then a copy of the start.
pub fn close_loop(track: &Track, threshold_m: f64, tolerance_m: f64) -> Option<EditResult> {
    let points = track.points();
    let first = track.first();
    let last_index = points.len() - 1;

    match classify(track, threshold_m, tolerance_m) {
        Loopiness::IsLoop => {
            if track.last().position == first.position {
                debug!("loop already closed");
                return None;
            }
            Some(EditResult::replace(
                points,
                last_index,
                last_index,
                vec![first.position],
                track.frame(),
            ))
        }
        Loopiness::AlmostLoop(gap) => {
            // Leading duplicate fixes have no direction; look past them.
            let Some(outward) = points
                .iter()
                .skip(1)
                .find_map(|p| (p.position - first.position).normalized())
            else {
                debug!("every point sits on the start");
                return None;
            };
            let behind = first.position - outward;
            debug!(gap, "closing loop with a short leg");
            Some(EditResult {
                before: points.to_vec(),
                edited: vec![TrackPoint::at(behind), TrackPoint::at(first.position)],
                after: Vec::new(),
                frame: track.frame(),
            })
        }
        Loopiness::NotLoop(gap) => {
            debug!(gap, "ends too far apart to close");
            None
        }
    }
}

/// Rotates a closed loop so `index` becomes the start, then re-closes it.
pub fn change_start(
    track: &Track,
    index: usize,
    threshold_m: f64,
    tolerance_m: f64,
) -> Option<EditResult> {
    if classify(track, threshold_m, tolerance_m) != Loopiness::IsLoop {
        return None;
    }
    // The last point duplicates the first, so it is not part of the cycle.
    let body = &positions(track.points())[..track.len() - 1];
    if index == 0 || index >= body.len() {
        return None;
    }

    let mut rotated = Vec::with_capacity(track.len());
    rotated.extend_from_slice(&body[index..]);
    rotated.extend_from_slice(&body[..index]);
    rotated.push(body[index]);
    Some(EditResult::whole(rotated, track.frame()))
}

/// Runs the whole track in the opposite direction.
pub fn reverse(track: &Track) -> Option<EditResult> {
    if track.len() < 2 {
        return None;
    }
    let mut reversed = positions(track.points());
    reversed.reverse();
    Some(EditResult::whole(reversed, track.frame()))
}

#[cfg(test)]
mod tests {
    use super::{Loopiness, change_start, classify, close_loop, reverse};
    use crate::ops::fixtures::{assert_close, track};
    use foundation::math::Vec3;

    /// Square loop of 400 m sides, ending `gap` metres short of the start.
    fn open_square(gap: f64) -> crate::track::Track {
        track(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(400.0, 0.0, 0.0),
            Vec3::new(400.0, 400.0, 0.0),
            Vec3::new(0.0, 400.0, 0.0),
            Vec3::new(0.0, gap, 0.0),
        ])
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(&open_square(0.5), 200.0, 1.0), Loopiness::IsLoop);
        assert_eq!(
            classify(&open_square(150.0), 200.0, 1.0),
            Loopiness::AlmostLoop(150.0)
        );
        assert_eq!(
            classify(&open_square(250.0), 200.0, 1.0),
            Loopiness::NotLoop(250.0)
        );
    }

    #[test]
    fn tiny_gap_is_merged_exactly() {
        let t = open_square(0.5);
        let result = close_loop(&t, 200.0, 1.0).expect("result");
        assert_eq!(result.len(), t.len());
        assert_eq!(result.edited.len(), 1);
        assert_eq!(result.edited[0].position, Vec3::ZERO);
    }

    #[test]
    fn almost_loop_gains_one_point_plus_start_copy() {
        let t = open_square(150.0);
        let result = close_loop(&t, 200.0, 1.0).expect("result");
        assert_eq!(result.len(), t.len() + 2);
        assert_eq!(result.edited[0].position, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(result.edited[1].position, Vec3::ZERO);
    }

    #[test]
    fn almost_loop_closes_past_duplicate_start_fixes() {
        let t = track(vec![
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::new(400.0, 0.0, 0.0),
            Vec3::new(400.0, 400.0, 0.0),
            Vec3::new(0.0, 400.0, 0.0),
            Vec3::new(0.0, 150.0, 0.0),
        ]);
        assert_eq!(classify(&t, 200.0, 1.0), Loopiness::AlmostLoop(150.0));
        let result = close_loop(&t, 200.0, 1.0).expect("result");
        assert_eq!(result.len(), t.len() + 2);
        assert_eq!(result.edited[0].position, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(result.edited[1].position, Vec3::ZERO);
    }

    #[test]
    fn closed_and_distant_tracks_are_left_alone() {
        let closed = track(vec![
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 0.0),
            Vec3::ZERO,
        ]);
        assert!(close_loop(&closed, 200.0, 1.0).is_none());
        assert!(close_loop(&open_square(250.0), 200.0, 1.0).is_none());
    }

    #[test]
    fn change_start_rotates_and_recloses() {
        let t = track(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 1.0),
            Vec3::new(10.0, 10.0, 2.0),
            Vec3::new(0.0, 10.0, 3.0),
            Vec3::new(0.0, 0.0, 0.0),
        ]);
        let result = change_start(&t, 2, 200.0, 1.0).expect("result");
        let got: Vec<Vec3> = result.edited.iter().map(|p| p.position).collect();
        assert_eq!(
            got,
            vec![
                Vec3::new(10.0, 10.0, 2.0),
                Vec3::new(0.0, 10.0, 3.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 1.0),
                Vec3::new(10.0, 10.0, 2.0),
            ]
        );
        assert!(change_start(&t, 0, 200.0, 1.0).is_none());
        assert!(change_start(&open_square(150.0), 2, 200.0, 1.0).is_none());
    }

    #[test]
    fn reverse_flips_order() {
        let t = open_square(150.0);
        let result = reverse(&t).expect("result");
        assert_eq!(result.edited[0].position, Vec3::new(0.0, 150.0, 0.0));
        assert_close(result.edited[4].position.x, 0.0, 0.0);
    }
}
