use foundation::math::{Geodetic, LocalFrame, Vec2, Vec3};

use crate::edit::EditResult;
use crate::error::TrackError;
use crate::markers::Cursor;
use crate::point::{TrackPoint, derive_points, renumber};
use crate::region::EditRegion;
use crate::spatial::{IndexParams, Ray, SpatialIndex};

/// A loaded route: points, markers, reference origin and spatial index.
///
/// Invariants:
/// - `points` is never empty and indexed `0..len`.
/// - Markers always refer to valid indices.
/// - `index` always matches `points`; it is rebuilt on every structural change.
#[derive(Debug, Clone)]
pub struct Track {
    name: String,
    points: Vec<TrackPoint>,
    cursor: Cursor,
    frame: LocalFrame,
    index: SpatialIndex,
}

impl PartialEq for Track {
    // The spatial index is derived from `points`.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.points == other.points
            && self.cursor == other.cursor
            && self.frame == other.frame
    }
}

impl Track {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        frame: LocalFrame,
        params: IndexParams,
    ) -> Result<Self, TrackError> {
        if positions.is_empty() {
            return Err(TrackError::Empty);
        }
        if let Some(index) = positions.iter().position(|p| !p.is_finite()) {
            return Err(TrackError::NonFinitePoint { index });
        }

        let points = derive_points(positions);
        let index = SpatialIndex::build(&points, params);
        Ok(Self {
            name: name.into(),
            points,
            cursor: Cursor::at(0),
            frame,
            index,
        })
    }

    /// Projects geodetic points about `origin`, or about the first point when
    /// no origin is supplied.
    pub fn from_geodetic(
        name: impl Into<String>,
        points: &[Geodetic],
        origin: Option<Geodetic>,
        params: IndexParams,
    ) -> Result<Self, TrackError> {
        let origin = origin.or_else(|| points.first().copied()).ok_or(TrackError::Empty)?;
        let frame = LocalFrame::new(Geodetic::new(origin.lon_deg, origin.lat_deg, 0.0));
        let positions = points.iter().map(|&g| frame.to_local(g)).collect();
        Self::new(name, positions, frame, params)
    }

    pub fn to_geodetic(&self) -> Vec<Geodetic> {
        self.points
            .iter()
            .map(|p| self.frame.to_geodetic(p.position))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&TrackPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &TrackPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &TrackPoint {
        &self.points[self.points.len() - 1]
    }

    pub fn length(&self) -> f64 {
        self.last().distance_from_start
    }

    pub fn frame(&self) -> LocalFrame {
        self.frame
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn region(&self) -> EditRegion {
        EditRegion::resolve(self.cursor, self.points.len())
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor.clamp(self.points.len());
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn nearest_along_ray(&self, ray: Ray) -> Option<&TrackPoint> {
        self.index
            .nearest_along_ray(ray)
            .and_then(|i| self.points.get(i))
    }

    pub fn all_near(&self, p: Vec2) -> Vec<&TrackPoint> {
        self.index
            .all_near(p)
            .into_iter()
            .filter_map(|i| self.points.get(i))
            .collect()
    }

    /// Installs an edit: concatenates, renumbers, rebuilds the index and sets
    /// the markers.
    ///
    /// An empty result is refused and leaves the track untouched.
    pub fn install(&mut self, result: EditResult, cursor: Cursor) -> bool {
        if result.is_empty() {
            return false;
        }
        let EditResult {
            before,
            edited,
            after,
            frame,
        } = result;

        let mut points = before;
        points.extend(edited);
        points.extend(after);

        self.points = renumber(points);
        self.frame = frame;
        self.index = SpatialIndex::build(&self.points, self.index.params());
        self.cursor = cursor.clamp(self.points.len());
        true
    }
}
