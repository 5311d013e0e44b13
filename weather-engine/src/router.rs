//! Region routing: coordinate → provider.
//!
//! A pure, ordered routing table. Regional providers claim
//! latitude/longitude boxes; the first match wins and everything else
//! falls through to the global provider, so routing is total: every
//! valid coordinate resolves to exactly one provider. Sub-region
//! disambiguation (e.g. Iberian mainland vs Canary Islands) happens
//! inside the provider's adapter, not here.

use crate::domain::{Coordinate, ProviderId};

/// Inclusive latitude/longitude box.
#[derive(Debug, Clone, Copy)]
struct LatLonBox {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl LatLonBox {
    fn contains(&self, coord: Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&coord.lat())
            && (self.lon_min..=self.lon_max).contains(&coord.lon())
    }
}

/// Fennoscandia and the surrounding Nordic seas.
const NORDIC: LatLonBox = LatLonBox {
    lat_min: 54.0,
    lat_max: 72.0,
    lon_min: 4.0,
    lon_max: 32.0,
};

/// Iberian mainland.
const IBERIAN_MAINLAND: LatLonBox = LatLonBox {
    lat_min: 35.5,
    lat_max: 44.0,
    lon_min: -10.0,
    lon_max: 4.5,
};

/// Canary Islands, geographically distant from the mainland but
/// served by the same provider.
const CANARY_ISLANDS: LatLonBox = LatLonBox {
    lat_min: 27.0,
    lat_max: 29.5,
    lon_min: -18.5,
    lon_max: -13.0,
};

/// Ordered routing table; first match wins.
const ROUTES: &[(LatLonBox, ProviderId)] = &[
    (NORDIC, ProviderId::Nordic),
    (IBERIAN_MAINLAND, ProviderId::Iberian),
    (CANARY_ISLANDS, ProviderId::Iberian),
];

/// Select the provider responsible for a coordinate.
///
/// Total and pure: evaluates the routing table in priority order and
/// falls back to [`ProviderId::Global`] when no regional provider
/// claims the coordinate.
pub fn select_provider(coord: Coordinate) -> ProviderId {
    for (bounds, provider) in ROUTES {
        if bounds.contains(coord) {
            return *provider;
        }
    }
    ProviderId::Global
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Routing is total: every valid coordinate resolves to
        /// exactly one known provider.
        #[test]
        fn routing_is_total(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let provider = select_provider(Coordinate::new(lat, lon).unwrap());
            prop_assert!(ProviderId::all().contains(&provider));
        }

        /// Routing is deterministic.
        #[test]
        fn routing_is_deterministic(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let c = Coordinate::new(lat, lon).unwrap();
            prop_assert_eq!(select_provider(c), select_provider(c));
        }
    }
}
