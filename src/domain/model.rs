use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 無法判定國家時使用的名稱
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A coordinate exactly as it appears in the export, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCoordinate {
    /// `latitudeE7` / `longitudeE7` fixed-point integers (degrees * 10^7).
    E7 { lat: Option<i64>, lng: Option<i64> },
    /// `"<lat>°, <lng>°"` strings.
    Degrees(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// ISO 8601 timestamp; its first ten characters are the calendar date.
    Iso(String),
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
}

/// One entry of the location history, reduced to the shapes the ledger understands.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    Visit {
        start: EventTime,
        end: EventTime,
        place: Option<RawCoordinate>,
    },
    Activity {
        start: EventTime,
        end: EventTime,
        from: Option<RawCoordinate>,
        to: Option<RawCoordinate>,
    },
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub position: Option<LatLng>,
    pub expected_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub country: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "guess")]
    pub is_guess: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub country: String,
    pub confident: bool,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            country: UNKNOWN_COUNTRY.to_string(),
            confident: false,
        }
    }
}

/// Axis-aligned rectangle; corners may be given in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRegion {
    pub name: String,
    pub lat1: f64,
    pub lat2: f64,
    pub lng1: f64,
    pub lng2: f64,
}

impl CustomRegion {
    pub fn new(name: &str, lat1: f64, lat2: f64, lng1: f64, lng2: f64) -> Self {
        Self {
            name: name.to_string(),
            lat1,
            lat2,
            lng1,
            lng2,
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        let (lat_min, lat_max) = min_max(self.lat1, self.lat2);
        let (lng_min, lng_max) = min_max(self.lng1, self.lng2);
        point.lat >= lat_min && point.lat <= lat_max && point.lng >= lng_min && point.lng <= lng_max
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Counters collected while building the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub events: usize,
    pub unrecognized_events: usize,
    pub observations_recorded: usize,
    pub discarded_year_mismatch: usize,
    pub discarded_missing_coordinate: usize,
    pub discarded_unopened_day: usize,
    pub flagged_by_preference: usize,
    pub days_filled: usize,
    pub future_days_trimmed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// 以年份（或 "total"）為 key 的國家天數統計
    pub country_counter: BTreeMap<String, BTreeMap<String, u32>>,
    pub days_in_year: usize,
    pub days_missing: usize,
    pub days_guessed: usize,
    pub missing: Vec<NaiveDate>,
    pub guessed: Vec<NaiveDate>,
}

/// Result of the transform step, handed to the load step.
#[derive(Debug, Clone)]
pub struct CountryTimeline {
    pub years: Vec<i32>,
    pub days: BTreeMap<NaiveDate, Option<DaySlot>>,
    pub summary: Summary,
    pub stats: RunStats,
}
