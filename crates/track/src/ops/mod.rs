//! Transform library.
//!
//! Every transform is a pure function of the track and its parameters that
//! yields an [`EditResult`], or `None` when it has nothing sensible to do.
//! [`Operation`] is the tagged descriptor the history records.

pub mod bend;
pub mod delete;
pub mod gradient;
pub mod loops;
pub mod nudge;
pub mod quick_fix;
pub mod split;

use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::edit::EditResult;
use crate::markers::Cursor;
use crate::track::Track;

pub use loops::Loopiness;
pub use nudge::NudgeMode;
pub use quick_fix::QuickFixParams;
pub use split::{SplitOptions, SplitPlan, SplitSegment, split_track};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    Delete,
    SmoothGradient {
        bumpiness: f64,
    },
    SmoothBend {
        spacing_m: f64,
    },
    CloseLoop {
        threshold_m: f64,
        tolerance_m: f64,
    },
    ChangeStart {
        index: usize,
        threshold_m: f64,
        tolerance_m: f64,
    },
    Reverse,
    Nudge {
        offset: [f64; 2],
        height_m: f64,
        mode: NudgeMode,
    },
    QuickFix(QuickFixParams),
}

impl Operation {
    pub fn smooth_gradient(bumpiness: f64) -> Self {
        Operation::SmoothGradient {
            bumpiness: bumpiness.clamp(0.0, 1.0),
        }
    }

    pub fn smooth_bend(config: &EditorConfig) -> Self {
        Operation::SmoothBend {
            spacing_m: config.bend_spacing_m,
        }
    }

    pub fn close_loop(config: &EditorConfig) -> Self {
        Operation::CloseLoop {
            threshold_m: config.loop_threshold_m,
            tolerance_m: config.loop_exact_tolerance_m,
        }
    }

    pub fn change_start(index: usize, config: &EditorConfig) -> Self {
        Operation::ChangeStart {
            index,
            threshold_m: config.loop_threshold_m,
            tolerance_m: config.loop_exact_tolerance_m,
        }
    }

    /// Builds a move or stretch from a drag vector, capped to `move_max_m`.
    pub fn nudge(drag: Vec2, height_m: f64, mode: NudgeMode, config: &EditorConfig) -> Self {
        let offset = drag.clamp_length(config.move_max_m);
        Operation::Nudge {
            offset: [offset.x, offset.y],
            height_m,
            mode,
        }
    }

    pub fn quick_fix(config: &EditorConfig) -> Self {
        Operation::QuickFix(QuickFixParams::from_config(config))
    }

    /// Text for undo/redo menus.
    pub fn label(&self) -> String {
        match self {
            Operation::Delete => "Delete points".to_string(),
            Operation::SmoothGradient { bumpiness } => {
                format!("Smooth gradient ({:.0}% bumpiness)", bumpiness * 100.0)
            }
            Operation::SmoothBend { spacing_m } => format!("Smooth bend ({spacing_m} m)"),
            Operation::CloseLoop { .. } => "Close loop".to_string(),
            Operation::ChangeStart { index, .. } => format!("Move start to {index}"),
            Operation::Reverse => "Reverse track".to_string(),
            Operation::Nudge {
                mode: NudgeMode::Translate,
                ..
            } => "Move points".to_string(),
            Operation::Nudge {
                mode: NudgeMode::Stretch { .. },
                ..
            } => "Stretch points".to_string(),
            Operation::QuickFix(_) => "Quick fix".to_string(),
        }
    }

    /// Runs the transform without touching the track.
    pub fn apply(&self, track: &Track) -> Option<EditResult> {
        match self {
            Operation::Delete => delete::delete_region(track),
            Operation::SmoothGradient { bumpiness } => gradient::smooth_gradient(track, *bumpiness),
            Operation::SmoothBend { spacing_m } => bend::smooth_bend(track, *spacing_m),
            Operation::CloseLoop {
                threshold_m,
                tolerance_m,
            } => loops::close_loop(track, *threshold_m, *tolerance_m),
            Operation::ChangeStart {
                index,
                threshold_m,
                tolerance_m,
            } => loops::change_start(track, *index, *threshold_m, *tolerance_m),
            Operation::Reverse => loops::reverse(track),
            Operation::Nudge {
                offset,
                height_m,
                mode,
            } => nudge::nudge(track, Vec2::new(offset[0], offset[1]), *height_m, *mode),
            Operation::QuickFix(params) => quick_fix::quick_fix(track, params),
        }
    }

    /// Where the markers go once `result` has been installed over `track`.
    pub fn cursor_after(&self, track: &Track, result: &EditResult) -> Cursor {
        let new_len = result.len();
        match self {
            Operation::ChangeStart { .. } => Cursor::at(0),
            Operation::Reverse => track.cursor().reversed(new_len),
            // Whole-track rewrites keep markers at the same indices.
            Operation::QuickFix(_) => track.cursor().clamp(new_len),
            Operation::Delete => {
                let start = result.before.len();
                let removed = track.len() - start - result.after.len();
                track
                    .cursor()
                    .remap(start, removed, result.edited.len(), new_len)
            }
            _ => {
                let start = result.before.len();
                let removed = track.len() - start - result.after.len();
                track
                    .cursor()
                    .replaced(start, removed, result.edited.len(), new_len)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::spatial::IndexParams;
    use crate::track::Track;
    use foundation::math::{Geodetic, LocalFrame, Vec3};

    pub fn frame() -> LocalFrame {
        LocalFrame::new(Geodetic::new(-1.0, 52.0, 0.0))
    }

    pub fn track(positions: Vec<Vec3>) -> Track {
        Track::new("fixture", positions, frame(), IndexParams::default()).expect("track")
    }

    /// Straight line along x with `spacing` metres between points.
    pub fn straight(count: usize, spacing: f64) -> Track {
        track(
            (0..count)
                .map(|i| Vec3::new(i as f64 * spacing, 0.0, 0.0))
                .collect(),
        )
    }

    pub fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }
}

#[cfg(test)]
mod tests {
    use super::{NudgeMode, Operation};
    use crate::config::EditorConfig;
    use foundation::math::Vec2;

    #[test]
    fn descriptors_serialize_with_a_kind_tag() {
        let op = Operation::smooth_gradient(0.25);
        let json = serde_json::to_string(&op).expect("serialize");
        assert_eq!(json, r#"{"kind":"smooth_gradient","bumpiness":0.25}"#);
        let back: Operation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, op);
    }

    #[test]
    fn nudge_caps_the_drag_vector() {
        let config = EditorConfig::default();
        let op = Operation::nudge(Vec2::new(300.0, 400.0), 0.0, NudgeMode::Translate, &config);
        match op {
            Operation::Nudge { offset, .. } => assert_eq!(offset, [60.0, 80.0]),
            other => panic!("unexpected op: {other:?}"),
        }
    }

    #[test]
    fn bumpiness_is_clamped() {
        assert_eq!(
            Operation::smooth_gradient(3.0),
            Operation::SmoothGradient { bumpiness: 1.0 }
        );
        assert_eq!(Operation::smooth_gradient(0.0).label(), "Smooth gradient (0% bumpiness)");
    }
}
