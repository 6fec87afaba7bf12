use super::Vec3;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Geodetic coordinates in degrees and meters, as they appear in GPX.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lon_deg: f64, lat_deg: f64, alt_m: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            alt_m,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lon_deg.is_finite()
            && self.lat_deg.is_finite()
            && self.alt_m.is_finite()
            && (-90.0..=90.0).contains(&self.lat_deg)
            && (-180.0..=180.0).contains(&self.lon_deg)
    }
}

/// Local east/north/up frame anchored at a reference origin.
///
/// Horizontal axes use the WGS84 radii of curvature at the origin, so the
/// projection is exact to invert and accurate over the extent of a ride or run.
/// `z` is the elevation unchanged, which keeps gradients honest.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalFrame {
    origin: Geodetic,
    metres_per_deg_lon: f64,
    metres_per_deg_lat: f64,
}

impl LocalFrame {
    pub fn new(origin: Geodetic) -> Self {
        let lat = origin.lat_deg.to_radians();
        let sin_lat = lat.sin();
        let w = (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        // Prime vertical and meridional radii of curvature.
        let n = WGS84_A / w;
        let m = WGS84_A * (1.0 - WGS84_E2) / (w * w * w);
        let deg = std::f64::consts::PI / 180.0;

        Self {
            origin,
            metres_per_deg_lon: n * lat.cos() * deg,
            metres_per_deg_lat: m * deg,
        }
    }

    pub fn origin(&self) -> Geodetic {
        self.origin
    }

    pub fn to_local(&self, geo: Geodetic) -> Vec3 {
        Vec3::new(
            (geo.lon_deg - self.origin.lon_deg) * self.metres_per_deg_lon,
            (geo.lat_deg - self.origin.lat_deg) * self.metres_per_deg_lat,
            geo.alt_m,
        )
    }

    pub fn to_geodetic(&self, local: Vec3) -> Geodetic {
        let lon = if self.metres_per_deg_lon.abs() <= f64::EPSILON {
            self.origin.lon_deg
        } else {
            self.origin.lon_deg + local.x / self.metres_per_deg_lon
        };
        Geodetic::new(
            lon,
            self.origin.lat_deg + local.y / self.metres_per_deg_lat,
            local.z,
        )
    }
}
