use foundation::bounds::Aabb3;
use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{Vec2, Vec3};

use crate::point::TrackPoint;
use crate::spatial::bvh::{Bvh, Item};

/// A pick ray in the local frame, typically from the camera through the pointer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// Distance from `p` to the closest point of the ray. `dir` must be unit length.
    fn distance_to(&self, p: Vec3) -> f64 {
        let t = (p - self.origin).dot(self.dir).max(0.0);
        p.distance(self.origin + self.dir.scale(t))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IndexParams {
    pub pick_radius_m: f64,
    pub contains_half_size_m: f64,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            pick_radius_m: 5.0,
            contains_half_size_m: 10.0,
        }
    }
}

// Each miss grows the search radius by this factor.
const RADIUS_GROWTH: f64 = 4.0;
const MAX_WIDENINGS: usize = 64;

/// Read-only snapshot of point positions for pointer queries.
///
/// Rebuilt wholesale after every structural edit; never updated incrementally.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    bvh: Bvh,
    positions: Vec<Vec3>,
    params: IndexParams,
}

impl SpatialIndex {
    pub fn build(points: &[TrackPoint], params: IndexParams) -> Self {
        let items = points
            .iter()
            .map(|p| Item {
                point: p.index,
                bounds: Aabb3::point(p.position),
            })
            .collect();
        Self {
            bvh: Bvh::build(items),
            positions: points.iter().map(|p| p.position).collect(),
            params,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn params(&self) -> IndexParams {
        self.params
    }

    /// Index of the point closest to the ray, measured perpendicular to it.
    ///
    /// Only points whose boxes fall within a search radius of the ray are
    /// examined; the radius widens until a point inside it is found. Ties go to
    /// the lowest index.
    pub fn nearest_along_ray(&self, ray: Ray) -> Option<usize> {
        let dir = ray.dir.normalized()?;
        let ray = Ray::new(ray.origin, dir);
        let bounds = self.bvh.root_bounds()?;

        // Once the radius covers this, every point is a candidate.
        let centre = Vec3::new(
            (bounds.min[0] + bounds.max[0]) * 0.5,
            (bounds.min[1] + bounds.max[1]) * 0.5,
            (bounds.min[2] + bounds.max[2]) * 0.5,
        );
        let covering = ray.origin.distance(centre) + bounds.diagonal();

        let mut radius = self.params.pick_radius_m.max(f64::MIN_POSITIVE);
        for _ in 0..MAX_WIDENINGS {
            let best = self
                .bvh
                .query_ray(ray.origin.as_array(), dir.as_array(), radius)
                .into_iter()
                .map(|idx| (ray.distance_to(self.positions[idx]), idx))
                .filter(|(d, _)| *d <= radius)
                .min_by(|a, b| stable_total_cmp_f64(a.0, b.0).then_with(|| a.1.cmp(&b.1)));

            if let Some((_, idx)) = best {
                return Some(idx);
            }
            if radius >= covering {
                break;
            }
            radius *= RADIUS_GROWTH;
        }
        None
    }

    /// Points whose planar cell contains `p`, in index order.
    pub fn all_near(&self, p: Vec2) -> Vec<usize> {
        self.bvh
            .query_aabb(&Aabb3::column(p.x, p.y, self.params.contains_half_size_m))
    }
}
