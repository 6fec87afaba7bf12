use foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EditorConfig;
use crate::point::TrackPoint;
use crate::track::Track;

/// Most segments a single split may produce.
pub const MAX_SEGMENTS: usize = 1_000;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    pub limit_m: f64,
    /// Pad each segment so a rider can join and leave it off-route.
    pub pen_buffers: bool,
    pub start_buffer_m: f64,
    pub end_buffer_m: f64,
}

impl SplitOptions {
    pub fn new(limit_m: f64, pen_buffers: bool, config: &EditorConfig) -> Self {
        Self {
            limit_m,
            pen_buffers,
            start_buffer_m: config.split_start_buffer_m,
            end_buffer_m: config.split_end_buffer_m,
        }
    }

    /// Length each segment may cover once buffers are paid for.
    pub fn effective_limit(&self) -> f64 {
        if self.pen_buffers {
            self.limit_m - (self.start_buffer_m + self.end_buffer_m)
        } else {
            self.limit_m
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitSegment {
    /// One-based, for display.
    pub number: usize,
    pub start_m: f64,
    pub end_m: f64,
    pub name: String,
    pub positions: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    pub count: usize,
    pub segment_length: f64,
    pub segments: Vec<SplitSegment>,
}

/// Cuts the track into equal-length pieces no longer than the limit.
///
/// Segment ends are interpolated so each piece covers exactly its share of
/// the distance. Returns `None` when the limit leaves no room or the track
/// has no length.
pub fn split_track(track: &Track, options: &SplitOptions) -> Option<SplitPlan> {
    let effective = options.effective_limit();
    if !(effective.is_finite() && effective > 0.0) {
        debug!(limit = options.limit_m, "split limit leaves no room");
        return None;
    }
    let total = track.length();
    if total <= 0.0 {
        return None;
    }

    let count = (total / effective).ceil();
    if count > MAX_SEGMENTS as f64 {
        debug!(total, limit = options.limit_m, "split limit too small for this track");
        return None;
    }
    let count = count as usize;
    let segment_length = total / count as f64;
    let (pad_start, pad_end) = if options.pen_buffers {
        (options.start_buffer_m, options.end_buffer_m)
    } else {
        (0.0, 0.0)
    };

    let points = track.points();
    let segments = (0..count)
        .map(|k| {
            let start_m = (k as f64 * segment_length - pad_start).max(0.0);
            let end_m = if k + 1 == count {
                total
            } else {
                ((k + 1) as f64 * segment_length + pad_end).min(total)
            };
            SplitSegment {
                number: k + 1,
                start_m,
                end_m,
                name: format!("{} ({} of {count})", track.name(), k + 1),
                positions: extract(points, start_m, end_m),
            }
        })
        .collect();

    debug!(count, segment_length, "track split");
    Some(SplitPlan {
        count,
        segment_length,
        segments,
    })
}

fn extract(points: &[TrackPoint], from: f64, to: f64) -> Vec<Vec3> {
    let mut out = vec![position_at(points, from)];
    out.extend(
        points
            .iter()
            .filter(|p| p.distance_from_start > from && p.distance_from_start < to)
            .map(|p| p.position),
    );
    out.push(position_at(points, to));
    out
}

fn position_at(points: &[TrackPoint], distance: f64) -> Vec3 {
    let i = points.partition_point(|p| p.distance_from_start < distance);
    if i == 0 {
        return points[0].position;
    }
    let Some(b) = points.get(i) else {
        return points[points.len() - 1].position;
    };
    let a = &points[i - 1];
    let span = b.distance_from_start - a.distance_from_start;
    if span <= 0.0 {
        return b.position;
    }
    a.position
        .lerp(b.position, (distance - a.distance_from_start) / span)
}
