use crate::domain::model::{EventTime, LatLng, Observation, RawCoordinate, RawEvent};
use crate::utils::error::{Result, TimelineError};
use chrono::{DateTime, NaiveDate};

const E7_SCALE: f64 = 10_000_000.0;

/// One end of an event after normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub date: NaiveDate,
    pub position: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventEndpoints {
    pub start: Endpoint,
    pub end: Endpoint,
}

impl EventEndpoints {
    /// Start observation first, then end.
    pub fn observations(&self, expected_year: i32) -> [Observation; 2] {
        [self.start, self.end].map(|endpoint| Observation {
            date: endpoint.date,
            position: endpoint.position,
            expected_year,
        })
    }
}

/// 將事件正規化為起點與終點；無法辨識的事件回傳 `None`
///
/// A visit puts both endpoints at its single place. Timestamps or coordinate
/// strings that cannot be parsed are input errors; absent coordinates are not.
pub fn normalize(event: &RawEvent) -> Result<Option<EventEndpoints>> {
    let endpoints = match event {
        RawEvent::Visit { start, end, place } => {
            let position = place.as_ref().map(to_lat_lng).transpose()?.flatten();
            EventEndpoints {
                start: Endpoint {
                    date: event_date(start)?,
                    position,
                },
                end: Endpoint {
                    date: event_date(end)?,
                    position,
                },
            }
        }
        RawEvent::Activity {
            start,
            end,
            from,
            to,
        } => EventEndpoints {
            start: Endpoint {
                date: event_date(start)?,
                position: from.as_ref().map(to_lat_lng).transpose()?.flatten(),
            },
            end: Endpoint {
                date: event_date(end)?,
                position: to.as_ref().map(to_lat_lng).transpose()?.flatten(),
            },
        },
        RawEvent::Unrecognized => return Ok(None),
    };
    Ok(Some(endpoints))
}

/// Zero or two observations for `year`.
pub fn extract(event: &RawEvent, year: i32) -> Result<Vec<Observation>> {
    Ok(normalize(event)?
        .map(|endpoints| endpoints.observations(year).to_vec())
        .unwrap_or_default())
}

/// `None` when either axis is absent.
pub fn to_lat_lng(coordinate: &RawCoordinate) -> Result<Option<LatLng>> {
    match coordinate {
        RawCoordinate::E7 { lat, lng } => Ok(match (lat, lng) {
            (Some(lat), Some(lng)) => Some(from_e7(*lat, *lng)),
            _ => None,
        }),
        RawCoordinate::Degrees(text) if text.trim().is_empty() => Ok(None),
        RawCoordinate::Degrees(text) => parse_degrees(text).map(Some),
    }
}

pub fn from_e7(lat: i64, lng: i64) -> LatLng {
    LatLng::new(lat as f64 / E7_SCALE, lng as f64 / E7_SCALE)
}

/// Parses `"40.7128°, -74.0060°"`; the degree signs are optional.
pub fn parse_degrees(text: &str) -> Result<LatLng> {
    let (lat, lng) = text
        .split_once(',')
        .ok_or_else(|| TimelineError::malformed(format!("coordinate '{}' has no comma", text)))?;

    Ok(LatLng::new(parse_axis(lat, text)?, parse_axis(lng, text)?))
}

fn parse_axis(axis: &str, whole: &str) -> Result<f64> {
    let value: f64 = axis
        .trim()
        .trim_end_matches('°')
        .trim()
        .parse()
        .map_err(|_| TimelineError::malformed(format!("coordinate '{}' is not numeric", whole)))?;
    if !value.is_finite() {
        return Err(TimelineError::malformed(format!(
            "coordinate '{}' is not finite",
            whole
        )));
    }
    Ok(value)
}

/// Calendar date of a timestamp: ISO strings are cut to `YYYY-MM-DD` as
/// written, epoch milliseconds are taken in UTC.
pub fn event_date(time: &EventTime) -> Result<NaiveDate> {
    match time {
        EventTime::Iso(text) => {
            let day = text.get(..10).ok_or_else(|| {
                TimelineError::malformed(format!("timestamp '{}' is too short", text))
            })?;
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|e| TimelineError::malformed(format!("timestamp '{}': {}", text, e)))
        }
        EventTime::EpochMillis(millis) => DateTime::from_timestamp_millis(*millis)
            .map(|instant| instant.date_naive())
            .ok_or_else(|| {
                TimelineError::malformed(format!("timestamp {}ms is out of range", millis))
            }),
    }
}
