pub mod gpx_file;
pub mod loader;

pub use gpx_file::*;
pub use loader::*;
