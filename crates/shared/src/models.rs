use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// A point on the globe in decimal degrees.
///
/// Always valid once constructed: latitude in [-90, 90], longitude in
/// [-180, 180], both finite. Deserialization runs the same checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GameError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(GameError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Coordinate {
            latitude,
            longitude,
        })
    }

    /// For compile-time tables whose entries are known to be in range.
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Axis-aligned latitude/longitude box used for coarse containment checks.
///
/// Boxes crossing the antimeridian (`west > east`) are accepted but never
/// contain anything; there is no wrap handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRegion")]
pub struct Region {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

#[derive(Deserialize)]
struct RawRegion {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl TryFrom<RawRegion> for Region {
    type Error = GameError;

    fn try_from(raw: RawRegion) -> Result<Self> {
        Region::new(raw.north, raw.south, raw.east, raw.west)
    }
}

impl Region {
    pub const WORLD: Region = Region {
        north: 90.0,
        south: -90.0,
        east: 180.0,
        west: -180.0,
    };

    pub const NETHERLANDS: Region = Region {
        north: 53.5550,
        south: 50.7503,
        east: 7.2275,
        west: 3.3580,
    };

    pub const AMSTERDAM: Region = Region {
        north: 52.4308,
        south: 52.3182,
        east: 5.0219,
        west: 4.7287,
    };

    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self> {
        let corners = [(north, east), (north, west), (south, east), (south, west)];
        if corners
            .iter()
            .any(|&(lat, lon)| Coordinate::new(lat, lon).is_err())
        {
            return Err(GameError::InvalidRegion(format!(
                "bounds (n={north}, s={south}, e={east}, w={west}) out of range"
            )));
        }
        if south >= north {
            return Err(GameError::InvalidRegion(format!(
                "south ({south}) must be below north ({north})"
            )));
        }
        Ok(Region {
            north,
            south,
            east,
            west,
        })
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    /// The four corners, clockwise from north-west.
    pub fn corners(&self) -> [Coordinate; 4] {
        [
            Coordinate::new_unchecked(self.north, self.west),
            Coordinate::new_unchecked(self.north, self.east),
            Coordinate::new_unchecked(self.south, self.east),
            Coordinate::new_unchecked(self.south, self.west),
        ]
    }
}

/// A named deployment of the game: where it is played and how strict the scoring is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    World,
    Netherlands,
    Amsterdam,
}

impl Variant {
    pub fn region(&self) -> Region {
        match self {
            Variant::World => Region::WORLD,
            Variant::Netherlands => Region::NETHERLANDS,
            Variant::Amsterdam => Region::AMSTERDAM,
        }
    }

    pub fn default_win_threshold_km(&self) -> f64 {
        match self {
            Variant::World => 500.0,
            Variant::Netherlands => 25.0,
            Variant::Amsterdam => 1.0,
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::World => write!(f, "world"),
            Variant::Netherlands => write!(f, "netherlands"),
            Variant::Amsterdam => write!(f, "amsterdam"),
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "world" => Ok(Variant::World),
            "netherlands" | "nl" => Ok(Variant::Netherlands),
            "amsterdam" | "ams" => Ok(Variant::Amsterdam),
            other => Err(format!(
                "unknown game variant '{other}' (expected world, netherlands or amsterdam)"
            )),
        }
    }
}

/// Playable region plus the maximum distance that still counts as a win.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameRules {
    region: Region,
    win_threshold_km: f64,
}

impl GameRules {
    pub fn new(region: Region, win_threshold_km: f64) -> Result<Self> {
        if !win_threshold_km.is_finite() || win_threshold_km < 0.0 {
            return Err(GameError::InvalidThreshold(win_threshold_km));
        }
        Ok(GameRules {
            region,
            win_threshold_km,
        })
    }

    pub fn for_variant(variant: Variant) -> Self {
        GameRules {
            region: variant.region(),
            win_threshold_km: variant.default_win_threshold_km(),
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn win_threshold_km(&self) -> f64 {
        self.win_threshold_km
    }
}
