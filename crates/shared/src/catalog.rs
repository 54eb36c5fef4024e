use rand::Rng;

use crate::error::{GameError, Result};
use crate::models::{Coordinate, Variant};

/// Source of uniformly distributed indices for catalog sampling.
pub trait RandomSource {
    /// Return an index in `0..len`. `len` is never zero.
    ///
    /// Out-of-range results are reduced modulo `len` by the catalog.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Thread-local system randomness.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn next_index(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

impl RandomSource for rand::rngs::StdRng {
    fn next_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

// Points with good street-level panorama coverage.
const WORLD_LOCATIONS: [Coordinate; 16] = [
    Coordinate::new_unchecked(40.7128, -74.006),   // New York
    Coordinate::new_unchecked(34.0522, -118.2437), // Los Angeles
    Coordinate::new_unchecked(41.8781, -87.6298),  // Chicago
    Coordinate::new_unchecked(49.2827, -123.1207), // Vancouver
    Coordinate::new_unchecked(51.5074, -0.1278),   // London
    Coordinate::new_unchecked(48.8566, 2.3522),    // Paris
    Coordinate::new_unchecked(52.5200, 13.4050),   // Berlin
    Coordinate::new_unchecked(41.9028, 12.4964),   // Rome
    Coordinate::new_unchecked(40.4168, -3.7038),   // Madrid
    Coordinate::new_unchecked(35.6762, 139.6503),  // Tokyo
    Coordinate::new_unchecked(22.3193, 114.1694),  // Hong Kong
    Coordinate::new_unchecked(1.3521, 103.8198),   // Singapore
    Coordinate::new_unchecked(-33.8688, 151.2093), // Sydney
    Coordinate::new_unchecked(-37.8136, 144.9631), // Melbourne
    Coordinate::new_unchecked(-22.9068, -43.1729), // Rio de Janeiro
    Coordinate::new_unchecked(-34.6037, -58.3816), // Buenos Aires
];

const NETHERLANDS_LOCATIONS: [Coordinate; 12] = [
    Coordinate::new_unchecked(52.3676, 4.9041), // Amsterdam
    Coordinate::new_unchecked(51.9225, 4.4792), // Rotterdam
    Coordinate::new_unchecked(52.0907, 5.1214), // Utrecht
    Coordinate::new_unchecked(52.0705, 4.3007), // The Hague
    Coordinate::new_unchecked(51.4416, 5.4697), // Eindhoven
    Coordinate::new_unchecked(53.2194, 6.5665), // Groningen
    Coordinate::new_unchecked(50.8514, 5.6910), // Maastricht
    Coordinate::new_unchecked(52.3874, 4.6462), // Haarlem
    Coordinate::new_unchecked(52.1601, 4.4970), // Leiden
    Coordinate::new_unchecked(52.0116, 4.3571), // Delft
    Coordinate::new_unchecked(52.5168, 6.0830), // Zwolle
    Coordinate::new_unchecked(51.8126, 5.8372), // Nijmegen
];

const AMSTERDAM_LOCATIONS: [Coordinate; 10] = [
    Coordinate::new_unchecked(52.3731, 4.8926), // Dam Square
    Coordinate::new_unchecked(52.3600, 4.8852), // Rijksmuseum
    Coordinate::new_unchecked(52.3580, 4.8686), // Vondelpark
    Coordinate::new_unchecked(52.3745, 4.8840), // Westerkerk
    Coordinate::new_unchecked(52.3791, 4.9003), // Centraal Station
    Coordinate::new_unchecked(52.3556, 4.8936), // Albert Cuypmarkt
    Coordinate::new_unchecked(52.3603, 4.9196), // Oosterpark
    Coordinate::new_unchecked(52.4011, 4.8927), // NDSM Werf
    Coordinate::new_unchecked(52.3383, 4.8730), // Zuidas
    Coordinate::new_unchecked(52.3675, 4.9020), // Waterlooplein
];

/// Fixed, non-empty list of candidate round targets. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCatalog {
    locations: Vec<Coordinate>,
}

impl LocationCatalog {
    pub fn new(locations: Vec<Coordinate>) -> Result<Self> {
        if locations.is_empty() {
            return Err(GameError::EmptyCatalog);
        }
        Ok(LocationCatalog { locations })
    }

    /// Parse a JSON array of `{"latitude": .., "longitude": ..}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let locations: Vec<Coordinate> =
            serde_json::from_str(json).map_err(|e| GameError::InvalidCatalog(e.to_string()))?;
        Self::new(locations)
    }

    pub fn world() -> Self {
        LocationCatalog {
            locations: WORLD_LOCATIONS.to_vec(),
        }
    }

    pub fn netherlands() -> Self {
        LocationCatalog {
            locations: NETHERLANDS_LOCATIONS.to_vec(),
        }
    }

    pub fn amsterdam() -> Self {
        LocationCatalog {
            locations: AMSTERDAM_LOCATIONS.to_vec(),
        }
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::World => Self::world(),
            Variant::Netherlands => Self::netherlands(),
            Variant::Amsterdam => Self::amsterdam(),
        }
    }

    /// Pick a location uniformly at random. Consecutive picks may repeat.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Coordinate {
        let len = self.locations.len();
        self.locations[rng.next_index(len) % len]
    }

    pub fn locations(&self) -> &[Coordinate] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::is_within_region;
    use rand::SeedableRng;
    use std::collections::HashSet;

    /// Replays a fixed list of indices.
    struct Scripted(Vec<usize>);

    impl RandomSource for Scripted {
        fn next_index(&mut self, _len: usize) -> usize {
            self.0.remove(0)
        }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(LocationCatalog::new(Vec::new()), Err(GameError::EmptyCatalog));
    }

    #[test]
    fn test_sample_follows_random_source() {
        let catalog = LocationCatalog::world();
        let mut rng = Scripted(vec![0, 4, 4, 15]);
        assert_eq!(catalog.sample(&mut rng), WORLD_LOCATIONS[0]);
        assert_eq!(catalog.sample(&mut rng), WORLD_LOCATIONS[4]);
        // Repeats are allowed
        assert_eq!(catalog.sample(&mut rng), WORLD_LOCATIONS[4]);
        assert_eq!(catalog.sample(&mut rng), WORLD_LOCATIONS[15]);
    }

    #[test]
    fn test_out_of_range_index_wraps() {
        let catalog = LocationCatalog::world();
        let mut rng = Scripted(vec![16, 21]);
        assert_eq!(catalog.sample(&mut rng), WORLD_LOCATIONS[0]);
        assert_eq!(catalog.sample(&mut rng), WORLD_LOCATIONS[5]);
    }

    #[test]
    fn test_sample_single_entry() {
        let only = Coordinate::new(52.3676, 4.9041).unwrap();
        let catalog = LocationCatalog::new(vec![only]).unwrap();
        let mut rng = SystemRandom;
        for _ in 0..10 {
            assert_eq!(catalog.sample(&mut rng), only);
        }
    }

    #[test]
    fn test_seeded_sampling_reaches_every_entry() {
        let catalog = LocationCatalog::amsterdam();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let c = catalog.sample(&mut rng);
            seen.insert((c.latitude().to_bits(), c.longitude().to_bits()));
        }
        assert_eq!(seen.len(), catalog.len());
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let catalog = LocationCatalog::world();
        let mut a = rand::rngs::StdRng::seed_from_u64(42);
        let mut b = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(catalog.sample(&mut a), catalog.sample(&mut b));
        }
    }

    #[test]
    fn test_builtin_catalogs_are_valid_and_in_region() {
        for variant in [Variant::World, Variant::Netherlands, Variant::Amsterdam] {
            let catalog = LocationCatalog::for_variant(variant);
            assert!(!catalog.is_empty());
            for c in catalog.locations() {
                assert!(Coordinate::new(c.latitude(), c.longitude()).is_ok());
                assert!(
                    is_within_region(*c, &variant.region()),
                    "{c} outside {variant}"
                );
            }
        }
    }

    #[test]
    fn test_from_json() {
        let catalog = LocationCatalog::from_json(
            r#"[{"latitude": 52.3731, "longitude": 4.8926},
                {"latitude": -33.8688, "longitude": 151.2093}]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.locations()[1].longitude(), 151.2093);
    }

    #[test]
    fn test_from_json_rejects_invalid_entries() {
        assert_eq!(LocationCatalog::from_json("[]"), Err(GameError::EmptyCatalog));
        assert!(matches!(
            LocationCatalog::from_json(r#"[{"latitude": 91.0, "longitude": 0.0}]"#),
            Err(GameError::InvalidCatalog(_))
        ));
        assert!(matches!(
            LocationCatalog::from_json("not json"),
            Err(GameError::InvalidCatalog(_))
        ));
    }
}
