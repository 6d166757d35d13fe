//! Decoding of location-history exports.
//!
//! Two generations of the export are understood:
//!
//! * `semanticSegments`: on-device exports with `visit` / `activity` segments
//!   and `"<lat>°, <lng>°"` strings.
//! * `timelineObjects`: Takeout exports with `placeVisit` / `activitySegment`
//!   and `latitudeE7` / `longitudeE7` integers.
//!
//! Segments of any other kind (`timelinePath`, `timelineMemory`, ...) become
//! [`RawEvent::Unrecognized`]. A recognized segment missing its structure is
//! an error for the whole document.

use crate::domain::model::{EventTime, RawCoordinate, RawEvent};
use crate::utils::error::{Result, TimelineError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineDocument {
    semantic_segments: Option<Vec<SemanticSegment>>,
    timeline_objects: Option<Vec<TimelineObject>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SemanticSegment {
    start_time: Option<String>,
    end_time: Option<String>,
    visit: Option<Visit>,
    activity: Option<Activity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Visit {
    top_candidate: TopCandidate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopCandidate {
    place_location: LatLngText,
}

#[derive(Debug, Deserialize)]
struct Activity {
    start: LatLngText,
    end: LatLngText,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatLngText {
    lat_lng: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineObject {
    place_visit: Option<PlaceVisit>,
    activity_segment: Option<ActivitySegment>,
}

#[derive(Debug, Deserialize)]
struct PlaceVisit {
    location: E7Location,
    duration: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivitySegment {
    start_location: E7Location,
    end_location: E7Location,
    duration: Duration,
}

#[derive(Debug, Deserialize)]
struct E7Location {
    #[serde(rename = "latitudeE7")]
    latitude_e7: Option<i64>,
    #[serde(rename = "longitudeE7")]
    longitude_e7: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Duration {
    start_timestamp: Option<String>,
    end_timestamp: Option<String>,
    start_timestamp_ms: Option<Millis>,
    end_timestamp_ms: Option<Millis>,
}

/// 舊版匯出的毫秒時間戳，可能是字串也可能是數字
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Millis {
    Number(i64),
    Text(String),
}

/// Decodes an export into events, in document order (semantic segments first).
pub fn decode_timeline(bytes: &[u8]) -> Result<Vec<RawEvent>> {
    let document: TimelineDocument = serde_json::from_slice(bytes)?;

    if document.semantic_segments.is_none() && document.timeline_objects.is_none() {
        return Err(TimelineError::malformed(
            "document has neither semanticSegments nor timelineObjects",
        ));
    }

    let mut events = Vec::new();
    for (index, segment) in document.semantic_segments.into_iter().flatten().enumerate() {
        events.push(
            segment
                .into_event()
                .map_err(|e| TimelineError::malformed(format!("semanticSegments[{}]: {}", index, e)))?,
        );
    }
    for (index, object) in document.timeline_objects.into_iter().flatten().enumerate() {
        events.push(
            object
                .into_event()
                .map_err(|e| TimelineError::malformed(format!("timelineObjects[{}]: {}", index, e)))?,
        );
    }

    tracing::debug!("Decoded {} timeline events", events.len());
    Ok(events)
}

impl SemanticSegment {
    fn into_event(self) -> std::result::Result<RawEvent, String> {
        let degrees = |text: Option<String>| text.map(RawCoordinate::Degrees);

        if let Some(visit) = self.visit {
            let (start, end) = iso_pair(self.start_time, self.end_time)?;
            return Ok(RawEvent::Visit {
                start,
                end,
                place: degrees(visit.top_candidate.place_location.lat_lng),
            });
        }
        if let Some(activity) = self.activity {
            let (start, end) = iso_pair(self.start_time, self.end_time)?;
            return Ok(RawEvent::Activity {
                start,
                end,
                from: degrees(activity.start.lat_lng),
                to: degrees(activity.end.lat_lng),
            });
        }
        Ok(RawEvent::Unrecognized)
    }
}

fn iso_pair(
    start: Option<String>,
    end: Option<String>,
) -> std::result::Result<(EventTime, EventTime), String> {
    let start = start.ok_or("missing startTime")?;
    let end = end.ok_or("missing endTime")?;
    Ok((EventTime::Iso(start), EventTime::Iso(end)))
}

impl TimelineObject {
    fn into_event(self) -> std::result::Result<RawEvent, String> {
        if let Some(visit) = self.place_visit {
            let (start, end) = visit.duration.into_times()?;
            return Ok(RawEvent::Visit {
                start,
                end,
                place: Some(visit.location.into()),
            });
        }
        if let Some(segment) = self.activity_segment {
            let (start, end) = segment.duration.into_times()?;
            return Ok(RawEvent::Activity {
                start,
                end,
                from: Some(segment.start_location.into()),
                to: Some(segment.end_location.into()),
            });
        }
        Ok(RawEvent::Unrecognized)
    }
}

impl From<E7Location> for RawCoordinate {
    fn from(location: E7Location) -> Self {
        RawCoordinate::E7 {
            lat: location.latitude_e7,
            lng: location.longitude_e7,
        }
    }
}

impl Duration {
    fn into_times(self) -> std::result::Result<(EventTime, EventTime), String> {
        let start = pick_time(self.start_timestamp, self.start_timestamp_ms)
            .ok_or("duration has no start timestamp")??;
        let end = pick_time(self.end_timestamp, self.end_timestamp_ms)
            .ok_or("duration has no end timestamp")??;
        Ok((start, end))
    }
}

fn pick_time(
    iso: Option<String>,
    millis: Option<Millis>,
) -> Option<std::result::Result<EventTime, String>> {
    if let Some(text) = iso {
        return Some(Ok(EventTime::Iso(text)));
    }
    millis.map(|millis| match millis {
        Millis::Number(value) => Ok(EventTime::EpochMillis(value)),
        Millis::Text(text) => text
            .trim()
            .parse()
            .map(EventTime::EpochMillis)
            .map_err(|_| format!("timestamp '{}' is not epoch milliseconds", text)),
    })
}
