use crate::math::Vec3;

/// Axis-aligned bounding box in the local frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Degenerate box holding exactly one point.
    pub fn point(p: Vec3) -> Self {
        Aabb3::new(p.as_array(), p.as_array())
    }

    /// Vertical column of half-width `half` around `(x, y)`, unbounded in z.
    pub fn column(x: f64, y: f64, half: f64) -> Self {
        Aabb3::new(
            [x - half, y - half, f64::NEG_INFINITY],
            [x + half, y + half, f64::INFINITY],
        )
    }

    pub fn inflate(&self, by: f64) -> Self {
        Aabb3::new(
            [self.min[0] - by, self.min[1] - by, self.min[2] - by],
            [self.max[0] + by, self.max[1] + by, self.max[2] + by],
        )
    }

    pub fn union(&self, other: &Self) -> Self {
        Aabb3::new(
            [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        )
    }

    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    /// Length of the box diagonal; zero for a point box.
    pub fn diagonal(&self) -> f64 {
        let dx = self.max[0] - self.min[0];
        let dy = self.max[1] - self.min[1];
        let dz = self.max[2] - self.min[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
