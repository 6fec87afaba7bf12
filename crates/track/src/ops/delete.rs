use tracing::debug;

use crate::edit::EditResult;
use crate::track::Track;

/// Removes the marker region. The whole-track clamp guarantees a survivor.
pub fn delete_region(track: &Track) -> Option<EditResult> {
    let region = track.region();
    if region.is_empty() {
        debug!("delete refused: region empty on a {} point track", track.len());
        return None;
    }
    Some(EditResult::replace(
        track.points(),
        region.start,
        region.end,
        Vec::new(),
        track.frame(),
    ))
}

#[cfg(test)]
mod tests {
    use super::delete_region;
    use crate::markers::Cursor;
    use crate::ops::fixtures::straight;

    #[test]
    fn deletes_inclusive_region() {
        let mut track = straight(5, 10.0);
        track.set_cursor(Cursor::new(1, Some(3)));
        let result = delete_region(&track).expect("result");
        assert_eq!(result.before.len(), 1);
        assert!(result.edited.is_empty());
        assert_eq!(result.after.len(), 1);
        assert_eq!(result.after[0].index, 4);
    }

    #[test]
    fn whole_track_delete_leaves_first_point() {
        let mut track = straight(5, 10.0);
        track.set_cursor(Cursor::new(0, Some(4)));
        let result = delete_region(&track).expect("result");
        assert_eq!(result.len(), 1);
        assert_eq!(result.before[0].index, 0);
    }

    #[test]
    fn single_point_track_cannot_be_emptied() {
        let track = straight(1, 10.0);
        assert!(delete_region(&track).is_none());
    }

    #[test]
    fn single_marker_deletes_one_point() {
        let mut track = straight(5, 10.0);
        track.set_cursor(Cursor::at(2));
        assert_eq!(delete_region(&track).expect("result").len(), 4);
    }
}
