use crate::adapters::decode_timeline;
use crate::domain::model::{CountryTimeline, DaySlot, Observation, RawEvent};
use crate::domain::ports::{ConfigProvider, CountryNameResolver, Pipeline, ReverseGeocoder, Storage};
use crate::domain::services::extractor;
use crate::domain::services::{parse_years, summarize, CountryClassifier, DayLedger};
use crate::utils::error::{Result, TimelineError};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// 讀取位置紀錄、逐日判定國家並寫出結果
pub struct TimelinePipeline<S, C, G>
where
    S: Storage,
    C: ConfigProvider,
    G: ReverseGeocoder + CountryNameResolver,
{
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) geocoder: G,
}

impl<S, C, G> TimelinePipeline<S, C, G>
where
    S: Storage,
    C: ConfigProvider,
    G: ReverseGeocoder + CountryNameResolver,
{
    pub fn new(storage: S, config: C, geocoder: G) -> Self {
        Self {
            storage,
            config,
            geocoder,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn today(&self) -> NaiveDate {
        self.config
            .as_of()
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Runs the day-resolution engine over decoded events.
///
/// Every event is extracted for every year before the ledger is touched, so a
/// corrupt input fails the run without producing anything. Years are processed in the given
/// order, events in input order, and the gap fill runs once at the end.
pub fn resolve_days<G, N>(
    events: &[RawEvent],
    years: &[i32],
    classifier: &CountryClassifier<'_, G, N>,
    preferred_country: Option<&str>,
    today: NaiveDate,
) -> Result<CountryTimeline>
where
    G: ReverseGeocoder,
    N: CountryNameResolver,
{
    let mut batches: Vec<(i32, Vec<Observation>)> = Vec::with_capacity(years.len());
    for &year in years {
        let mut batch = Vec::with_capacity(events.len() * 2);
        for event in events {
            batch.extend(extractor::extract(event, year)?);
        }
        batches.push((year, batch));
    }

    let mut ledger = DayLedger::new(preferred_country.map(str::to_string));
    for (year, batch) in &batches {
        tracing::info!("📅 Processing {}", year);
        ledger.open_year(*year)?;
        for observation in batch {
            ledger.insert(observation, classifier)?;
        }
    }

    ledger.fill_gaps(today);

    let (days, mut stats) = ledger.into_parts();
    stats.events = events.len();
    stats.unrecognized_events = events
        .iter()
        .filter(|event| matches!(event, RawEvent::Unrecognized))
        .count();
    let summary = summarize(&days, years);

    Ok(CountryTimeline {
        years: years.to_vec(),
        days,
        summary,
        stats,
    })
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    country: Option<&'a str>,
    lat: Option<f64>,
    lng: Option<f64>,
    guess: bool,
    missing: bool,
}

/// `YYYY-MM-DD` → record, or `null` for days nothing is known about.
pub fn render_days_json(days: &BTreeMap<NaiveDate, Option<DaySlot>>) -> Result<Vec<u8>> {
    let keyed: BTreeMap<String, Option<&DaySlot>> = days
        .iter()
        .map(|(day, slot)| (day.format("%Y-%m-%d").to_string(), slot.as_ref()))
        .collect();
    Ok(serde_json::to_vec_pretty(&keyed)?)
}

pub fn render_days_csv(days: &BTreeMap<NaiveDate, Option<DaySlot>>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (day, slot) in days {
        writer.serialize(CsvRow {
            date: day.format("%Y-%m-%d").to_string(),
            country: slot.as_ref().map(|s| s.country.as_str()),
            lat: slot.as_ref().map(|s| s.latitude),
            lng: slot.as_ref().map(|s| s.longitude),
            guess: slot.as_ref().is_some_and(|s| s.is_guess),
            missing: slot.is_none(),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| TimelineError::IoError(e.into_error()))
}

fn sibling_with_extension(path: &str, extension: &str) -> String {
    Path::new(path)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}

#[async_trait::async_trait]
impl<S, C, G> Pipeline for TimelinePipeline<S, C, G>
where
    S: Storage,
    C: ConfigProvider,
    G: ReverseGeocoder + CountryNameResolver,
{
    async fn extract(&self) -> Result<Vec<RawEvent>> {
        tracing::info!("📂 Reading location history from {}", self.config.input_path());
        let raw = self.storage.read_file(self.config.input_path()).await?;
        let events = decode_timeline(&raw)?;
        tracing::info!("📊 Extracted {} events", events.len());
        Ok(events)
    }

    async fn transform(&self, events: Vec<RawEvent>) -> Result<CountryTimeline> {
        let years = parse_years(self.config.years())?;
        let today = self.today();
        tracing::info!(
            "🔧 Resolving {} year(s) up to {}{}",
            years.len(),
            today,
            self.config
                .preferred_country()
                .map(|c| format!(", preferring {}", c))
                .unwrap_or_default()
        );

        let classifier = CountryClassifier::new(
            &self.geocoder,
            &self.geocoder,
            self.config.custom_regions(),
        );
        let timeline = resolve_days(
            &events,
            &years,
            &classifier,
            self.config.preferred_country(),
            today,
        )?;

        tracing::debug!("Run stats: {:?}", timeline.stats);
        Ok(timeline)
    }

    async fn load(&self, result: CountryTimeline) -> Result<String> {
        let formats = self.config.output_formats();
        let mut written = Vec::new();

        if formats.iter().any(|f| f == "json") {
            let path = self.config.output_path().to_string();
            self.storage
                .write_file(&path, &render_days_json(&result.days)?)
                .await?;
            written.push(path);
        }
        if formats.iter().any(|f| f == "csv") {
            let path = sibling_with_extension(self.config.output_path(), "csv");
            self.storage
                .write_file(&path, &render_days_csv(&result.days)?)
                .await?;
            written.push(path);
        }
        if let Some(path) = self.config.summary_path() {
            self.storage
                .write_file(path, &serde_json::to_vec_pretty(&result.summary)?)
                .await?;
            written.push(path.to_string());
        }

        for (key, countries) in &result.summary.country_counter {
            tracing::info!("🌍 {}: {:?}", key, countries);
        }
        tracing::info!(
            "days_in_year: {}, days_missing: {}, days_guessed: {}",
            result.summary.days_in_year,
            result.summary.days_missing,
            result.summary.days_guessed
        );

        written.into_iter().next().ok_or_else(|| TimelineError::ConfigError {
            message: "no output format selected".to_string(),
        })
    }
}
