use foundation::math::{LocalFrame, Vec3};
use serde::{Deserialize, Serialize};

use crate::point::TrackPoint;

/// Three-way split produced by a transform.
///
/// `before` and `after` are copied straight from the source track; only
/// `edited` holds new points. Their concatenation, renumbered, is the new track.
#[derive(Debug, Clone, PartialEq)]
pub struct EditResult {
    pub before: Vec<TrackPoint>,
    pub edited: Vec<TrackPoint>,
    pub after: Vec<TrackPoint>,
    pub frame: LocalFrame,
}

impl EditResult {
    /// Replaces `points[start..=end]` with `edited`.
    pub fn replace(
        points: &[TrackPoint],
        start: usize,
        end: usize,
        edited: Vec<Vec3>,
        frame: LocalFrame,
    ) -> Self {
        Self {
            before: points[..start].to_vec(),
            edited: edited.into_iter().map(TrackPoint::at).collect(),
            after: points[end + 1..].to_vec(),
            frame,
        }
    }

    /// Replaces every point.
    pub fn whole(edited: Vec<Vec3>, frame: LocalFrame) -> Self {
        Self {
            before: Vec::new(),
            edited: edited.into_iter().map(TrackPoint::at).collect(),
            after: Vec::new(),
            frame,
        }
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.edited.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captures the change against `source` so it can be replayed either way.
    pub fn splice_against(&self, source: &[TrackPoint]) -> Splice {
        let start = self.before.len();
        let removed_end = source.len() - self.after.len();
        Splice {
            start,
            removed: source[start..removed_end]
                .iter()
                .map(|p| p.position.as_array())
                .collect(),
            inserted: self.edited.iter().map(|p| p.position.as_array()).collect(),
        }
    }
}

/// A recorded replacement of `removed` by `inserted` at `start`.
///
/// Positions are stored as plain arrays so history entries serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Splice {
    pub start: usize,
    pub removed: Vec<[f64; 3]>,
    pub inserted: Vec<[f64; 3]>,
}

impl Splice {
    /// Applies the splice forwards to a track in its pre-edit state.
    pub fn forward(&self, points: &[TrackPoint], frame: LocalFrame) -> EditResult {
        splice(points, self.start, self.removed.len(), &self.inserted, frame)
    }

    /// Applies the splice backwards to a track in its post-edit state.
    pub fn backward(&self, points: &[TrackPoint], frame: LocalFrame) -> EditResult {
        splice(points, self.start, self.inserted.len(), &self.removed, frame)
    }
}

fn splice(
    points: &[TrackPoint],
    start: usize,
    take: usize,
    put: &[[f64; 3]],
    frame: LocalFrame,
) -> EditResult {
    let start = start.min(points.len());
    let stop = (start + take).min(points.len());
    EditResult {
        before: points[..start].to_vec(),
        edited: put
            .iter()
            .map(|&[x, y, z]| TrackPoint::at(Vec3::new(x, y, z)))
            .collect(),
        after: points[stop..].to_vec(),
        frame,
    }
}
