use serde::{Deserialize, Serialize};

use crate::markers::Cursor;

/// Inclusive index range between the two markers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRegion {
    pub start: usize,
    pub end: usize,
}

impl EditRegion {
    /// Resolves the region for a track of `len` points.
    ///
    /// A missing purple marker gives a single-point region. A region covering
    /// the whole track starts at 1 instead, so destructive edits always leave
    /// the first point behind. On a one-point track that leaves an empty region.
    pub fn resolve(cursor: Cursor, len: usize) -> Self {
        let other = cursor.marked.unwrap_or(cursor.current);
        let start = cursor.current.min(other);
        let end = cursor.current.max(other);

        if len > 0 && start == 0 && end == len - 1 {
            return Self { start: 1, end };
        }
        Self { start, end }
    }

    /// Number of points in the region; zero once the whole-track clamp has
    /// emptied it.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::EditRegion;
    use crate::markers::Cursor;

    #[test]
    fn orders_markers() {
        let region = EditRegion::resolve(Cursor::new(7, Some(3)), 10);
        assert_eq!(region, EditRegion { start: 3, end: 7 });
        assert_eq!(region.len(), 5);
    }

    #[test]
    fn single_marker_is_single_point() {
        let region = EditRegion::resolve(Cursor::at(4), 10);
        assert_eq!(region, EditRegion { start: 4, end: 4 });
        assert!(region.contains(4));
    }

    #[test]
    fn whole_track_keeps_first_point() {
        let region = EditRegion::resolve(Cursor::new(4, Some(0)), 5);
        assert_eq!(region, EditRegion { start: 1, end: 4 });
    }

    #[test]
    fn one_point_track_has_nothing_to_edit() {
        let region = EditRegion::resolve(Cursor::at(0), 1);
        assert!(region.is_empty());
    }
}
