pub mod bvh;
pub mod index;

pub use bvh::{Bvh, Item};
pub use index::{IndexParams, Ray, SpatialIndex};
