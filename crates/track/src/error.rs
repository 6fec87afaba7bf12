use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A track needs at least one point.
    Empty,
    NonFinitePoint { index: usize },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::Empty => write!(f, "track has no points"),
            TrackError::NonFinitePoint { index } => {
                write!(f, "point {index} has a non-finite coordinate")
            }
        }
    }
}

impl std::error::Error for TrackError {}
