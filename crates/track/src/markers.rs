use serde::{Deserialize, Serialize};

/// The two interaction markers.
///
/// `current` is the orange marker and always points at a valid index.
/// `marked` is the optional purple marker bounding a region.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub current: usize,
    pub marked: Option<usize>,
}

impl Cursor {
    pub fn new(current: usize, marked: Option<usize>) -> Self {
        Self { current, marked }
    }

    pub fn at(current: usize) -> Self {
        Self::new(current, None)
    }

    /// Pulls both markers into `0..len`. A purple marker that lands on the
    /// orange one no longer bounds anything and is dropped.
    pub fn clamp(self, len: usize) -> Self {
        let last = len.saturating_sub(1);
        let current = self.current.min(last);
        let marked = self.marked.map(|m| m.min(last)).filter(|&m| m != current);
        Self { current, marked }
    }

    /// Follows the points a marker referred to across a splice that replaced
    /// `removed` points starting at `start` with `inserted` new ones.
    ///
    /// Markers before the splice stay put, markers after it shift by the size
    /// change, and markers inside it collapse onto the start of the splice.
    pub fn remap(self, start: usize, removed: usize, inserted: usize, new_len: usize) -> Self {
        let follow = |i: usize| {
            if i < start {
                i
            } else if i >= start + removed {
                i - removed + inserted
            } else {
                start
            }
        };
        Self {
            current: follow(self.current),
            marked: self.marked.map(follow),
        }
        .clamp(new_len)
    }

    /// Follows the markers across a splice that rewrote `removed` points at
    /// `start` as `inserted` new ones, such as a smoothed or moved region.
    ///
    /// Unlike [`Cursor::remap`], the span keeps its ends: a marker on its first
    /// point stays there, one on its last point moves to the last inserted
    /// point, and markers in between are spread proportionally.
    pub fn replaced(self, start: usize, removed: usize, inserted: usize, new_len: usize) -> Self {
        let follow = |i: usize| {
            if i < start {
                i
            } else if i >= start + removed {
                i - removed + inserted
            } else if removed <= 1 || inserted == 0 {
                start
            } else {
                start + (i - start) * (inserted - 1) / (removed - 1)
            }
        };
        Self {
            current: follow(self.current),
            marked: self.marked.map(follow),
        }
        .clamp(new_len)
    }

    /// Mirrors both markers for a reversed track of `len` points.
    pub fn reversed(self, len: usize) -> Self {
        let last = len.saturating_sub(1);
        Self {
            current: last - self.current.min(last),
            marked: self.marked.map(|m| last - m.min(last)),
        }
    }
}
