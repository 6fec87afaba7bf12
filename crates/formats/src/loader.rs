use std::fs;
use std::path::{Path, PathBuf};

use foundation::math::Geodetic;
use track::{EditorConfig, SplitSegment, Track, TrackError};
use tracing::debug;

use crate::gpx_file::{GpxError, GpxTrack};

/// Rejections at the load boundary. The engine never sees these inputs.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: std::io::Error },
    Gpx(GpxError),
    Empty,
    InvalidCoordinate { index: usize, point: Geodetic },
    Track(TrackError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            LoadError::Gpx(e) => write!(f, "{e}"),
            LoadError::Empty => write!(f, "track has no points"),
            LoadError::InvalidCoordinate { index, point } => write!(
                f,
                "point {index} has invalid coordinates (lon {}, lat {}, ele {})",
                point.lon_deg, point.lat_deg, point.alt_m
            ),
            LoadError::Track(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug)]
pub enum SaveError {
    Gpx(GpxError),
    Io { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Gpx(e) => write!(f, "{e}"),
            SaveError::Io { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SaveError {}

/// Projects a GPX track into the engine. Without an explicit `origin` the
/// first point anchors the local frame.
pub fn track_from_gpx(
    doc: &GpxTrack,
    origin: Option<Geodetic>,
    config: &EditorConfig,
) -> Result<Track, LoadError> {
    if doc.points.is_empty() {
        return Err(LoadError::Empty);
    }
    if let Some((index, point)) = doc.points.iter().enumerate().find(|(_, p)| !p.is_valid()) {
        return Err(LoadError::InvalidCoordinate {
            index,
            point: *point,
        });
    }

    let track = Track::from_geodetic(&doc.name, &doc.points, origin, config.index_params())
        .map_err(LoadError::Track)?;
    debug!(name = %doc.name, points = track.len(), length_m = track.length(), "loaded track");
    Ok(track)
}

pub fn read_gpx_file(path: impl AsRef<Path>) -> Result<GpxTrack, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    GpxTrack::read(bytes.as_slice()).map_err(LoadError::Gpx)
}

pub fn load_track(path: impl AsRef<Path>, config: &EditorConfig) -> Result<Track, LoadError> {
    let doc = read_gpx_file(path)?;
    track_from_gpx(&doc, None, config)
}

pub fn track_to_gpx(track: &Track) -> GpxTrack {
    GpxTrack::new(track.name(), track.to_geodetic())
}

/// Converts one split segment back to geodetic coordinates in the track's
/// frame.
pub fn segment_to_gpx(track: &Track, segment: &SplitSegment) -> GpxTrack {
    let frame = track.frame();
    GpxTrack::new(
        segment.name.clone(),
        segment
            .positions
            .iter()
            .map(|&p| frame.to_geodetic(p))
            .collect(),
    )
}

/// Hex blake3 digest used to identify written files in logs.
pub fn content_digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Writes `doc` to `path` and returns the digest of the bytes written.
pub fn save_gpx(path: impl AsRef<Path>, doc: &GpxTrack) -> Result<String, SaveError> {
    let path = path.as_ref();
    let bytes = doc.to_gpx_bytes().map_err(SaveError::Gpx)?;
    fs::write(path, &bytes).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content_digest(&bytes))
}
