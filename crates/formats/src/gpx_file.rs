use std::fmt;
use std::io::{Read, Write};

use foundation::math::Geodetic;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Metadata, TrackSegment, Waypoint};

pub const CREATOR: &str = "trackedit";
const UNTITLED: &str = "Untitled";

/// One named track as it appears in a GPX file: longitude, latitude and
/// elevation per point, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct GpxTrack {
    pub name: String,
    pub points: Vec<Geodetic>,
}

#[derive(Debug)]
pub enum GpxError {
    Parse(gpx::errors::GpxError),
    Write(gpx::errors::GpxError),
    /// The document has no track or route with points.
    NoTrack,
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for GpxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpxError::Parse(err) => write!(f, "GPX parse error: {err}"),
            GpxError::Write(err) => write!(f, "GPX write error: {err}"),
            GpxError::NoTrack => write!(f, "GPX document has no track points"),
            GpxError::Utf8(err) => write!(f, "GPX output is not UTF-8: {err}"),
        }
    }
}

impl std::error::Error for GpxError {}

impl GpxTrack {
    pub fn new(name: impl Into<String>, points: Vec<Geodetic>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Reads the first track with points, joining its segments. Documents
    /// without tracks fall back to their first route.
    pub fn read<R: Read>(reader: R) -> Result<Self, GpxError> {
        let doc = gpx::read(reader).map_err(GpxError::Parse)?;
        let fallback_name = doc
            .metadata
            .as_ref()
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| UNTITLED.to_string());

        if let Some(trk) = doc
            .tracks
            .iter()
            .find(|t| t.segments.iter().any(|s| !s.points.is_empty()))
        {
            let points = trk
                .segments
                .iter()
                .flat_map(|s| s.points.iter())
                .map(waypoint_to_geodetic)
                .collect();
            return Ok(Self {
                name: trk.name.clone().unwrap_or(fallback_name),
                points,
            });
        }

        if let Some(rte) = doc.routes.iter().find(|r| !r.points.is_empty()) {
            return Ok(Self {
                name: rte.name.clone().unwrap_or(fallback_name),
                points: rte.points.iter().map(waypoint_to_geodetic).collect(),
            });
        }

        Err(GpxError::NoTrack)
    }

    pub fn from_gpx_str(payload: &str) -> Result<Self, GpxError> {
        Self::read(payload.as_bytes())
    }

    /// Writes a GPX 1.1 document with metadata and a single track segment.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), GpxError> {
        let mut segment = TrackSegment::default();
        segment.points = self.points.iter().map(geodetic_to_waypoint).collect();

        let mut trk = gpx::Track::default();
        trk.name = Some(self.name.clone());
        trk.segments.push(segment);

        let doc = Gpx {
            version: GpxVersion::Gpx11,
            creator: Some(CREATOR.to_string()),
            metadata: Some(Metadata {
                name: Some(self.name.clone()),
                ..Metadata::default()
            }),
            tracks: vec![trk],
            ..Gpx::default()
        };
        gpx::write(&doc, writer).map_err(GpxError::Write)
    }

    pub fn to_gpx_bytes(&self) -> Result<Vec<u8>, GpxError> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }

    pub fn to_gpx_string(&self) -> Result<String, GpxError> {
        String::from_utf8(self.to_gpx_bytes()?).map_err(GpxError::Utf8)
    }
}

fn waypoint_to_geodetic(wp: &Waypoint) -> Geodetic {
    let p = wp.point();
    Geodetic::new(p.x(), p.y(), wp.elevation.unwrap_or(0.0))
}

fn geodetic_to_waypoint(g: &Geodetic) -> Waypoint {
    let mut wp = Waypoint::new(Point::new(g.lon_deg, g.lat_deg));
    wp.elevation = Some(g.alt_m);
    wp
}
