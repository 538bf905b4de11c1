//! Map pins for jobs and services.
//!
//! The browser front end drops these on a Leaflet map; a terminal shows them
//! as a table plus the bounding box the map would have zoomed to. Jobs and
//! services share one pin type — the payloads differ only in which detail
//! field they carry (employer vs. payment offer).

use serde::Deserialize;

/// One map marker from `/api/map/jobs` or `/api/map/services`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MapPin {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub payment_offer: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Longest description shown in a pin's popup line.
const BLURB_LEN: usize = 100;

impl MapPin {
    /// Pins without a full coordinate pair never make it onto the map.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Employer for a job pin, payment offer for a service pin.
    pub fn detail(&self) -> String {
        if let Some(company) = &self.company_name {
            return company.clone();
        }
        if let Some(offer) = self.payment_offer {
            return format!("₱{offer:.2}");
        }
        String::new()
    }

    /// Description shortened for a single popup line.
    pub fn blurb(&self) -> String {
        let mut chars = self.description.chars();
        let short: String = chars.by_ref().take(BLURB_LEN).collect();
        if chars.next().is_some() {
            format!("{short}…")
        } else {
            short
        }
    }
}

/// Bounding box over every placed pin, the terminal stand-in for the map's
/// zoom-to-fit step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// `None` when no pin carries coordinates.
pub fn pin_bounds<'a, I>(pins: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a MapPin>,
{
    let mut bounds: Option<Bounds> = None;
    for pin in pins {
        let (Some(lat), Some(lon)) = (pin.latitude, pin.longitude) else {
            continue;
        };
        bounds = Some(match bounds {
            None => Bounds {
                min_lat: lat,
                max_lat: lat,
                min_lon: lon,
                max_lon: lon,
            },
            Some(b) => Bounds {
                min_lat: b.min_lat.min(lat),
                max_lat: b.max_lat.max(lat),
                min_lon: b.min_lon.min(lon),
                max_lon: b.max_lon.max(lon),
            },
        });
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pin(lat: Option<f64>, lon: Option<f64>) -> MapPin {
        MapPin {
            title: "t".into(),
            latitude: lat,
            longitude: lon,
            ..MapPin::default()
        }
    }

    #[test]
    fn job_payload_deserializes() {
        let pin: MapPin = serde_json::from_value(json!({
            "id": 7,
            "title": "Store clerk",
            "company_name": "Island Grill",
            "description": "Part-time front counter work",
            "latitude": 13.58,
            "longitude": 124.23
        }))
        .unwrap();

        assert!(pin.has_coordinates());
        assert_eq!(pin.detail(), "Island Grill");
    }

    #[test]
    fn service_detail_formats_the_offer() {
        let pin: MapPin = serde_json::from_value(json!({
            "title": "Fence repair",
            "payment_offer": 1500.0
        }))
        .unwrap();
        assert_eq!(pin.detail(), "₱1500.00");
        assert!(!pin.has_coordinates());
    }

    #[test]
    fn pins_missing_either_coordinate_are_unplaced() {
        assert!(!pin(Some(13.5), None).has_coordinates());
        assert!(!pin(None, Some(124.0)).has_coordinates());
        assert!(pin(Some(13.5), Some(124.0)).has_coordinates());
    }

    #[test]
    fn blurb_truncates_long_descriptions() {
        let long = MapPin {
            description: "x".repeat(150),
            ..MapPin::default()
        };
        assert_eq!(long.blurb().chars().count(), 101);
        assert!(long.blurb().ends_with('…'));

        let short = MapPin {
            description: "short".into(),
            ..MapPin::default()
        };
        assert_eq!(short.blurb(), "short");
    }

    #[test]
    fn bounds_cover_placed_pins_only() {
        let pins = vec![
            pin(Some(13.0), Some(124.0)),
            pin(Some(13.6), Some(124.4)),
            pin(None, None),
        ];
        let bounds = pin_bounds(&pins).unwrap();
        assert_eq!(bounds.min_lat, 13.0);
        assert_eq!(bounds.max_lat, 13.6);
        assert_eq!(bounds.min_lon, 124.0);
        assert_eq!(bounds.max_lon, 124.4);
    }

    #[test]
    fn bounds_of_unplaced_pins_is_none() {
        assert!(pin_bounds(&[pin(None, None)]).is_none());
        assert!(pin_bounds(&[]).is_none());
    }
}
