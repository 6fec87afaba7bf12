pub mod config;
pub mod edit;
pub mod editor;
pub mod error;
pub mod history;
pub mod markers;
pub mod ops;
pub mod point;
pub mod region;
pub mod spatial;
pub mod track;

pub use config::*;
pub use edit::*;
pub use editor::*;
pub use error::*;
pub use history::*;
pub use markers::*;
pub use ops::{
    Loopiness, NudgeMode, Operation, QuickFixParams, SplitOptions, SplitPlan, SplitSegment, split_track,
};
pub use point::*;
pub use region::*;
pub use spatial::{IndexParams, Ray, SpatialIndex};
pub use track::*;
