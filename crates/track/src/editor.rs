use foundation::math::{Geodetic, Vec2};
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::edit::EditResult;
use crate::error::TrackError;
use crate::history::{History, HistoryLabels, UndoEntry};
use crate::markers::Cursor;
use crate::ops::loops;
use crate::ops::{Loopiness, Operation, SplitOptions, SplitPlan, split_track};
use crate::point::TrackPoint;
use crate::spatial::Ray;
use crate::track::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    /// The operation had nothing to do; track and history are untouched.
    Unchanged,
}

/// Owns a track and its history. Every edit goes through here.
#[derive(Debug, Clone)]
pub struct Editor {
    track: Track,
    history: History,
    config: EditorConfig,
}

impl Editor {
    pub fn new(track: Track, config: EditorConfig) -> Self {
        Self {
            track,
            history: History::new(config.history_limit),
            config,
        }
    }

    pub fn from_geodetic(
        name: impl Into<String>,
        points: &[Geodetic],
        origin: Option<Geodetic>,
        config: EditorConfig,
    ) -> Result<Self, TrackError> {
        let track = Track::from_geodetic(name, points, origin, config.index_params())?;
        Ok(Self::new(track, config))
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_track(self) -> Track {
        self.track
    }

    pub fn cursor(&self) -> Cursor {
        self.track.cursor()
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.track.set_cursor(cursor);
    }

    pub fn set_current(&mut self, index: usize) {
        let marked = self.track.cursor().marked;
        self.track.set_cursor(Cursor::new(index, marked));
    }

    pub fn set_marked(&mut self, index: Option<usize>) {
        let current = self.track.cursor().current;
        self.track.set_cursor(Cursor::new(current, index));
    }

    pub fn nearest_along_ray(&self, ray: Ray) -> Option<&TrackPoint> {
        self.track.nearest_along_ray(ray)
    }

    pub fn all_near(&self, p: Vec2) -> Vec<&TrackPoint> {
        self.track.all_near(p)
    }

    pub fn loopiness(&self) -> Loopiness {
        loops::classify(
            &self.track,
            self.config.loop_threshold_m,
            self.config.loop_exact_tolerance_m,
        )
    }

    pub fn split(&self, limit_m: f64, pen_buffers: bool) -> Option<SplitPlan> {
        split_track(
            &self.track,
            &SplitOptions::new(limit_m, pen_buffers, &self.config),
        )
    }

    /// Computes an edit without committing it, for live previews.
    pub fn preview(&self, operation: &Operation) -> Option<EditResult> {
        operation.apply(&self.track)
    }

    pub fn commit(&mut self, operation: Operation) -> CommitOutcome {
        let label = operation.label();
        let Some(result) = operation.apply(&self.track) else {
            warn!(%label, "operation produced no result");
            return CommitOutcome::Unchanged;
        };
        if result.is_empty() {
            warn!(%label, "refusing an edit that leaves no points");
            return CommitOutcome::Unchanged;
        }

        let cursor_before = self.track.cursor();
        let cursor = operation.cursor_after(&self.track, &result);
        let splice = result.splice_against(self.track.points());
        let before = self.track.len();
        if !self.track.install(result, cursor) {
            return CommitOutcome::Unchanged;
        }
        debug!(%label, before, after = self.track.len(), "committed");

        self.history.push(UndoEntry {
            label,
            operation,
            splice,
            cursor_before,
            cursor_after: self.track.cursor(),
        });
        CommitOutcome::Applied
    }

    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo() else {
            return false;
        };
        let result = entry.invert(&self.track);
        let cursor = entry.cursor_before;
        debug!(label = %entry.label, "undo");
        self.track.install(result, cursor)
    }

    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo() else {
            return false;
        };
        let result = entry.apply(&self.track);
        let cursor = entry.cursor_after;
        debug!(label = %entry.label, "redo");
        self.track.install(result, cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    pub fn history_labels(&self) -> HistoryLabels {
        self.history.labels()
    }
}

#[cfg(test)]
mod tests {
    use super::{CommitOutcome, Editor};
    use crate::config::EditorConfig;
    use crate::markers::Cursor;
    use crate::ops::fixtures::{assert_close, straight, track};
    use crate::ops::{Loopiness, NudgeMode, Operation};
    use crate::track::Track;
    use foundation::math::{Vec2, Vec3};
    use pretty_assertions::assert_eq;

    fn editor(track: Track) -> Editor {
        Editor::new(track, EditorConfig::default())
    }

    fn hilly(count: usize) -> Track {
        track(
            (0..count)
                .map(|i| Vec3::new(i as f64 * 10.0, 0.0, (i % 3) as f64 * 2.0))
                .collect(),
        )
    }

    fn corner() -> Track {
        let mut positions = vec![Vec3::new(-10.0, 0.0, 0.0)];
        positions.extend((0..=3).map(|i| Vec3::new(i as f64 * 10.0, 0.0, 0.0)));
        positions.extend((1..=4).map(|i| Vec3::new(30.0, i as f64 * 10.0, 0.0)));
        let mut t = track(positions);
        t.set_cursor(Cursor::new(1, Some(7)));
        t
    }

    fn square(gap: f64) -> Track {
        track(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(400.0, 0.0, 0.0),
            Vec3::new(400.0, 400.0, 0.0),
            Vec3::new(0.0, 400.0, 0.0),
            Vec3::new(0.0, gap, 0.0),
        ])
    }

    fn zigzag() -> Track {
        track(
            (0..201)
                .map(|i| Vec3::new(i as f64 * 2.0, if i % 2 == 0 { 0.0 } else { 0.5 }, 0.0))
                .collect(),
        )
    }

    fn with_cursor(mut t: Track, cursor: Cursor) -> Track {
        t.set_cursor(cursor);
        t
    }

    fn assert_well_formed(t: &Track) {
        for (i, p) in t.points().iter().enumerate() {
            assert_eq!(p.index, i);
        }
        assert!(
            t.points()
                .windows(2)
                .all(|w| w[0].distance_from_start <= w[1].distance_from_start)
        );
        assert!(t.cursor().current < t.len());
        if let Some(m) = t.cursor().marked {
            assert!(m < t.len());
        }
    }

    /// Track, operation, and where the markers should sit afterwards.
    fn cases() -> Vec<(Track, Operation, Cursor)> {
        let config = EditorConfig::default();
        vec![
            (
                with_cursor(hilly(8), Cursor::new(2, Some(5))),
                Operation::Delete,
                Cursor::at(2),
            ),
            (
                with_cursor(hilly(8), Cursor::at(3)),
                Operation::Delete,
                Cursor::at(3),
            ),
            (
                with_cursor(hilly(12), Cursor::new(1, Some(10))),
                Operation::smooth_gradient(0.0),
                Cursor::new(1, Some(10)),
            ),
            // Seven points become an eleven-point arc.
            (
                corner(),
                Operation::smooth_bend(&config),
                Cursor::new(1, Some(11)),
            ),
            (square(0.5), Operation::close_loop(&config), Cursor::at(0)),
            (square(150.0), Operation::close_loop(&config), Cursor::at(0)),
            (
                square(0.0),
                Operation::change_start(2, &config),
                Cursor::at(0),
            ),
            (
                with_cursor(hilly(6), Cursor::new(1, Some(4))),
                Operation::Reverse,
                Cursor::new(4, Some(1)),
            ),
            (
                with_cursor(hilly(8), Cursor::new(2, Some(5))),
                Operation::nudge(Vec2::new(3.0, 4.0), 1.5, NudgeMode::Translate, &config),
                Cursor::new(2, Some(5)),
            ),
            (
                with_cursor(hilly(9), Cursor::new(1, Some(7))),
                Operation::nudge(
                    Vec2::new(0.0, 250.0),
                    0.0,
                    NudgeMode::Stretch { pointer: 3 },
                    &config,
                ),
                Cursor::new(1, Some(7)),
            ),
            (zigzag(), Operation::quick_fix(&config), Cursor::at(0)),
        ]
    }

    #[test]
    fn undo_restores_every_operation() {
        for (original, op, expected_cursor) in cases() {
            let label = op.label();
            let mut e = editor(original.clone());
            assert_eq!(e.commit(op), CommitOutcome::Applied, "{label}");
            assert_well_formed(e.track());
            assert_eq!(e.cursor(), expected_cursor, "{label}");
            assert_eq!(e.undo_label(), Some(label.as_str()));

            let committed = e.track().clone();
            assert!(e.undo(), "{label}");
            assert_eq!(e.track(), &original, "{label}");

            assert!(e.redo(), "{label}");
            assert_eq!(e.track(), &committed, "{label}");
            assert_eq!(e.cursor(), expected_cursor, "{label}");
            assert_well_formed(e.track());
        }
    }

    #[test]
    fn repeated_moves_shift_the_whole_region() {
        let mut e = editor(with_cursor(straight(10, 10.0), Cursor::new(2, Some(6))));
        for _ in 0..2 {
            let op = Operation::nudge(Vec2::new(0.0, 5.0), 0.0, NudgeMode::Translate, e.config());
            assert_eq!(e.commit(op), CommitOutcome::Applied);
            assert_eq!(e.cursor(), Cursor::new(2, Some(6)));
        }
        let ys: Vec<f64> = e.track().points().iter().map(|p| p.position.y).collect();
        assert_eq!(ys, vec![0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 10.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn whole_track_delete_keeps_one_point() {
        let mut e = editor(with_cursor(straight(5, 10.0), Cursor::new(0, Some(4))));
        assert_eq!(e.commit(Operation::Delete), CommitOutcome::Applied);
        assert_eq!(e.track().len(), 1);
        assert_eq!(e.track().first().position, Vec3::ZERO);
        assert_eq!(e.cursor(), Cursor::at(0));

        // Nothing deletable remains.
        assert_eq!(e.commit(Operation::Delete), CommitOutcome::Unchanged);
        assert_eq!(e.history().undo_depth(), 1);
    }

    #[test]
    fn delete_between_markers_and_undo() {
        let original = with_cursor(straight(5, 10.0), Cursor::new(1, Some(3)));
        let mut e = editor(original.clone());
        assert_eq!(e.commit(Operation::Delete), CommitOutcome::Applied);

        let kept: Vec<Vec3> = e.track().points().iter().map(|p| p.position).collect();
        assert_eq!(kept, vec![Vec3::ZERO, Vec3::new(40.0, 0.0, 0.0)]);
        assert_eq!(e.track().points()[1].index, 1);
        assert_eq!(e.cursor(), Cursor::at(1));

        assert!(e.undo());
        assert_eq!(e.track(), &original);
        assert_eq!(e.cursor(), Cursor::new(1, Some(3)));
    }

    #[test]
    fn new_commit_discards_redo() {
        let mut e = editor(with_cursor(hilly(10), Cursor::new(2, Some(4))));
        e.commit(Operation::Delete);
        e.undo();
        assert!(e.can_redo());
        e.commit(Operation::Reverse);
        assert!(!e.can_redo());
        assert!(!e.redo());
        assert_eq!(e.history_labels().undo, vec!["Reverse track".to_string()]);
    }

    #[test]
    fn undo_and_redo_on_empty_history() {
        let mut e = editor(hilly(4));
        assert!(!e.can_undo());
        assert!(!e.undo());
        assert!(!e.redo());
    }

    #[test]
    fn no_result_leaves_track_and_history_alone() {
        let original = with_cursor(straight(8, 10.0), Cursor::new(1, Some(6)));
        let mut e = editor(original.clone());
        let op = Operation::smooth_bend(e.config());
        assert_eq!(e.commit(op), CommitOutcome::Unchanged);
        assert_eq!(e.track(), &original);
        assert!(!e.can_undo());
    }

    #[test]
    fn preview_does_not_commit() {
        let original = with_cursor(hilly(8), Cursor::new(2, Some(5)));
        let e = editor(original.clone());
        let preview = e.preview(&Operation::Delete).expect("preview");
        assert_eq!(preview.len(), 4);
        assert_eq!(e.track(), &original);
        assert!(!e.can_undo());
    }

    #[test]
    fn history_limit_comes_from_config() {
        let config = EditorConfig {
            history_limit: Some(2),
            ..EditorConfig::default()
        };
        let mut e = Editor::new(hilly(6), config);
        for _ in 0..3 {
            e.commit(Operation::Reverse);
        }
        assert_eq!(e.history().undo_depth(), 2);
    }

    #[test]
    fn marker_setters_clamp() {
        let mut e = editor(hilly(5));
        e.set_current(9);
        assert_eq!(e.cursor(), Cursor::at(4));
        e.set_marked(Some(1));
        assert_eq!(e.cursor(), Cursor::new(4, Some(1)));
        e.set_marked(Some(4));
        assert_eq!(e.cursor(), Cursor::at(4));
    }

    #[test]
    fn loopiness_and_close() {
        let mut e = editor(square(150.0));
        assert_eq!(e.loopiness(), Loopiness::AlmostLoop(150.0));
        let op = Operation::close_loop(e.config());
        assert_eq!(e.commit(op), CommitOutcome::Applied);
        assert_eq!(e.track().len(), 7);
        assert_eq!(e.loopiness(), Loopiness::IsLoop);
    }

    #[test]
    fn splits_through_the_editor() {
        let e = editor(straight(251, 1000.0));
        let plan = e.split(100_000.0, false).expect("plan");
        assert_eq!(plan.count, 3);
        assert_close(plan.segment_length, 83_333.333_333, 1e-5);
    }

    #[test]
    fn gradient_flattens_to_average_slope() {
        let mut positions: Vec<Vec3> = (0..=11)
            .map(|i| Vec3::new(i as f64 * 100.0 - 100.0, 0.0, if i % 2 == 0 { 9.0 } else { -3.0 }))
            .collect();
        positions[1].z = 0.0;
        positions[11].z = 100.0;
        let mut e = editor(with_cursor(track(positions), Cursor::new(1, Some(11))));
        let start = e.track().points()[1].distance_from_start;
        let span = e.track().points()[11].distance_from_start - start;
        let original = e.track().clone();

        assert_eq!(e.commit(Operation::smooth_gradient(0.0)), CommitOutcome::Applied);
        // Fractions come from the distances before smoothing.
        for (p, q) in e.track().points()[1..=11].iter().zip(&original.points()[1..=11]) {
            let fraction = (q.distance_from_start - start) / span;
            assert_close(p.altitude(), 100.0 * fraction, 1e-9);
        }

        e.undo();
        assert_eq!(e.commit(Operation::smooth_gradient(1.0)), CommitOutcome::Applied);
        for (p, q) in e.track().points().iter().zip(original.points()) {
            assert_close(p.altitude(), q.altitude(), 1e-12);
        }
    }
}
