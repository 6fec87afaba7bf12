use foundation::math::{Vec2, Vec3};

/// One point of a track with its derived metrics.
///
/// Points are never edited in place. Edits produce new positions, and
/// [`derive_points`] rebuilds the whole sequence so that `index` stays dense and
/// `distance_from_start` stays monotonic.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub index: usize,
    pub position: Vec3,
    pub distance_from_start: f64,
    /// Unit vector from the previous point; `None` at the start or after a zero-length step.
    pub direction_before: Option<Vec3>,
    /// Unit vector to the next point; `None` at the end or before a zero-length step.
    pub direction_after: Option<Vec3>,
    /// `(distance_from_start, altitude)` for the elevation profile.
    pub profile: Vec2,
    /// Percent gradient of the step to the next point.
    pub gradient_after: Option<f64>,
}

impl TrackPoint {
    /// A point whose metrics are not yet derived. Only valid inside an edit result.
    pub fn at(position: Vec3) -> Self {
        Self {
            index: 0,
            position,
            distance_from_start: 0.0,
            direction_before: None,
            direction_after: None,
            profile: Vec2::new(0.0, position.z),
            gradient_after: None,
        }
    }

    pub fn altitude(&self) -> f64 {
        self.position.z
    }

    /// Compass bearing of the outgoing direction in degrees, 0 = north, clockwise.
    pub fn bearing_after(&self) -> Option<f64> {
        let dir = self.direction_after?;
        let planar = dir.xy().normalized()?;
        Some(planar.x.atan2(planar.y).to_degrees().rem_euclid(360.0))
    }
}

/// Builds a fully derived, densely indexed point sequence.
pub fn derive_points<I>(positions: I) -> Vec<TrackPoint>
where
    I: IntoIterator<Item = Vec3>,
{
    let positions: Vec<Vec3> = positions.into_iter().collect();
    let mut points = Vec::with_capacity(positions.len());
    let mut distance = 0.0;

    for (index, &position) in positions.iter().enumerate() {
        if index > 0 {
            distance += positions[index - 1].distance(position);
        }

        let direction_before = index
            .checked_sub(1)
            .and_then(|prev| (position - positions[prev]).normalized());
        let next = positions.get(index + 1).copied();
        let direction_after = next.and_then(|n| (n - position).normalized());
        let gradient_after = next.and_then(|n| {
            let run = (n - position).xy().length();
            (run > f64::EPSILON).then(|| 100.0 * (n.z - position.z) / run)
        });

        points.push(TrackPoint {
            index,
            position,
            distance_from_start: distance,
            direction_before,
            direction_after,
            profile: Vec2::new(distance, position.z),
            gradient_after,
        });
    }

    points
}

/// Re-derives metrics for a spliced sequence.
pub fn renumber(points: Vec<TrackPoint>) -> Vec<TrackPoint> {
    derive_points(points.into_iter().map(|p| p.position))
}

pub fn positions(points: &[TrackPoint]) -> Vec<Vec3> {
    points.iter().map(|p| p.position).collect()
}

/// Total 3D length of a polyline.
pub fn polyline_length(positions: &[Vec3]) -> f64 {
    positions.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::{TrackPoint, derive_points, polyline_length, renumber};
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn derives_dense_indices_and_distances() {
        let points = derive_points([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(3.0, 14.0, 1.0),
        ]);
        let idx: Vec<usize> = points.iter().map(|p| p.index).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert_eq!(points[1].distance_from_start, 5.0);
        assert_eq!(points[2].distance_from_start, 5.0);
        assert_close(points[3].distance_from_start, 5.0 + 101.0f64.sqrt(), 1e-12);
        assert!(points.windows(2).all(|w| w[0].distance_from_start <= w[1].distance_from_start));
    }

    #[test]
    fn directions_skip_zero_length_steps() {
        let points = derive_points([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
        ]);
        assert_eq!(points[0].direction_before, None);
        assert_eq!(points[0].direction_after, Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(points[1].direction_after, None);
        assert_eq!(points[2].direction_before, None);
        assert_eq!(points[2].direction_after, None);
    }

    #[test]
    fn gradient_and_bearing() {
        let points = derive_points([Vec3::new(0.0, 0.0, 0.0), Vec3::new(100.0, 0.0, 5.0)]);
        assert_close(points[0].gradient_after.expect("gradient"), 5.0, 1e-12);
        assert_close(points[0].bearing_after().expect("bearing"), 90.0, 1e-9);
        assert_eq!(points[1].gradient_after, None);
    }

    #[test]
    fn renumber_recomputes_stale_metrics() {
        let spliced = vec![
            TrackPoint::at(Vec3::new(0.0, 0.0, 0.0)),
            TrackPoint::at(Vec3::new(0.0, 2.0, 0.0)),
        ];
        let points = renumber(spliced);
        assert_eq!(points[1].index, 1);
        assert_eq!(points[1].distance_from_start, 2.0);
        assert_eq!(polyline_length(&[Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)]), 2.0);
    }
}
