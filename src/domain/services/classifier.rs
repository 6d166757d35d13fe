use crate::domain::model::{Classification, CustomRegion, LatLng};
use crate::domain::ports::{CountryNameResolver, ReverseGeocoder};
use crate::utils::error::Result;

/// Rectangles patching places the boundary data gets wrong. Checked in this order.
pub fn default_regions() -> Vec<CustomRegion> {
    vec![
        // 整座島
        CustomRegion::new("Puerto Rico", 17.8, 18.6, -67.5, -65.1),
        // Edge of Rovinj
        CustomRegion::new("Croatia", 45.0952677, 45.0552677, 13.6214077, 13.6514077),
        // Edge of California
        CustomRegion::new(
            "United States of America",
            36.2510416,
            38.2510416,
            -120.7834097,
            -122.7834097,
        ),
        // Tenerife
        CustomRegion::new("Spain", 28.6039895, 28.00039895, -16.9307323, -15.9307323),
    ]
}

pub fn match_region(regions: &[CustomRegion], point: LatLng) -> Option<&CustomRegion> {
    regions.iter().find(|region| region.contains(point))
}

/// Resolves coordinates to a country name.
///
/// The geocoder is asked first and its last candidate wins, since candidates
/// come ordered by ascending specificity (`["USA", "PRI"]` for San Juan). Only
/// when that yields nothing usable are the custom regions scanned; a region
/// hit is never confident.
pub struct CountryClassifier<'a, G: ReverseGeocoder, N: CountryNameResolver> {
    geocoder: &'a G,
    names: &'a N,
    regions: Vec<CustomRegion>,
}

impl<'a, G: ReverseGeocoder, N: CountryNameResolver> CountryClassifier<'a, G, N> {
    pub fn new(geocoder: &'a G, names: &'a N, regions: Vec<CustomRegion>) -> Self {
        Self {
            geocoder,
            names,
            regions,
        }
    }

    pub fn regions(&self) -> &[CustomRegion] {
        &self.regions
    }

    pub fn classify(&self, point: LatLng) -> Result<Classification> {
        let codes = self.geocoder.lookup(point.lat, point.lng)?;

        if let Some(code) = codes.last() {
            match self.names.resolve(code) {
                Some(country) => {
                    return Ok(Classification {
                        country,
                        confident: true,
                    })
                }
                None => tracing::debug!("No country name for code {}", code),
            }
        }

        Ok(match match_region(&self.regions, point) {
            Some(region) => Classification {
                country: region.name.clone(),
                confident: false,
            },
            None => Classification::unknown(),
        })
    }
}
