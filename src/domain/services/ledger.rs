use crate::domain::model::{Classification, DaySlot, LatLng, Observation, RunStats};
use crate::domain::ports::{CountryNameResolver, ReverseGeocoder};
use crate::domain::services::classifier::CountryClassifier;
use crate::utils::error::{Result, TimelineError};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// What a single observation did to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Recorded,
    /// The slot holds the preferred country and was only flagged as a guess.
    Flagged,
    DiscardedYearMismatch,
    DiscardedMissingCoordinate,
    /// The day belongs to no opened year.
    DiscardedUnopenedDay,
}

/// Decision for one slot, see [`resolve_slot`].
#[derive(Debug, Clone, PartialEq)]
pub enum SlotUpdate {
    Replace(DaySlot),
    FlagExisting,
}

/// Last observation wins, except that a slot already holding the preferred
/// country keeps it when the newcomer resolves elsewhere; it is flagged as a
/// guess instead.
pub fn resolve_slot(
    existing: Option<&DaySlot>,
    candidate: DaySlot,
    preferred_country: Option<&str>,
) -> SlotUpdate {
    if let Some(preferred) = preferred_country {
        if candidate.country != preferred
            && existing.is_some_and(|slot| slot.country == preferred)
        {
            return SlotUpdate::FlagExisting;
        }
    }
    SlotUpdate::Replace(candidate)
}

/// One slot per calendar day of every opened year.
#[derive(Debug, Clone, Default)]
pub struct DayLedger {
    slots: BTreeMap<NaiveDate, Option<DaySlot>>,
    preferred_country: Option<String>,
    stats: RunStats,
}

impl DayLedger {
    pub fn new(preferred_country: Option<String>) -> Self {
        Self {
            slots: BTreeMap::new(),
            preferred_country,
            stats: RunStats::default(),
        }
    }

    pub fn preferred_country(&self) -> Option<&str> {
        self.preferred_country.as_deref()
    }

    /// 建立該年度每一天的空白紀錄
    ///
    /// Opening a year again resets its days to empty.
    pub fn open_year(&mut self, year: i32) -> Result<()> {
        let invalid = || TimelineError::InvalidYearRange {
            expression: year.to_string(),
            reason: "not a representable calendar year".to_string(),
        };
        let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;

        for day in first.iter_days().take_while(|day| *day <= last) {
            self.slots.insert(day, None);
        }
        Ok(())
    }

    pub fn insert<G, N>(
        &mut self,
        observation: &Observation,
        classifier: &CountryClassifier<'_, G, N>,
    ) -> Result<InsertOutcome>
    where
        G: ReverseGeocoder,
        N: CountryNameResolver,
    {
        if observation.date.year() != observation.expected_year {
            self.stats.discarded_year_mismatch += 1;
            return Ok(InsertOutcome::DiscardedYearMismatch);
        }
        let Some(position) = observation.position else {
            self.stats.discarded_missing_coordinate += 1;
            return Ok(InsertOutcome::DiscardedMissingCoordinate);
        };
        if !self.slots.contains_key(&observation.date) {
            self.stats.discarded_unopened_day += 1;
            return Ok(InsertOutcome::DiscardedUnopenedDay);
        }

        tracing::debug!("Processing: {}", observation.date);
        let classification = classifier.classify(position)?;
        Ok(self.record(observation.date, position, classification))
    }

    /// Applies an already classified observation to its day. Days outside
    /// every opened year are left alone.
    pub fn record(
        &mut self,
        date: NaiveDate,
        position: LatLng,
        classification: Classification,
    ) -> InsertOutcome {
        let candidate = DaySlot {
            date,
            country: classification.country,
            latitude: position.lat,
            longitude: position.lng,
            is_guess: !classification.confident,
        };

        let Some(slot) = self.slots.get_mut(&date) else {
            self.stats.discarded_unopened_day += 1;
            return InsertOutcome::DiscardedUnopenedDay;
        };
        match resolve_slot(slot.as_ref(), candidate, self.preferred_country.as_deref()) {
            SlotUpdate::Replace(candidate) => {
                *slot = Some(candidate);
                self.stats.observations_recorded += 1;
                InsertOutcome::Recorded
            }
            SlotUpdate::FlagExisting => {
                if let Some(existing) = slot.as_mut() {
                    existing.is_guess = true;
                }
                tracing::warn!(
                    "⚠️ Keeping {} for {} over a conflicting observation",
                    self.preferred_country.as_deref().unwrap_or_default(),
                    date
                );
                self.stats.flagged_by_preference += 1;
                InsertOutcome::Flagged
            }
        }
    }

    /// Carries the last known day forward into empty days and drops days
    /// after `today`. Empty days before the first known day stay empty.
    pub fn fill_gaps(&mut self, today: NaiveDate) {
        let future: Vec<NaiveDate> = self
            .slots
            .keys()
            .filter(|day| **day > today)
            .copied()
            .collect();
        for day in &future {
            self.slots.remove(day);
        }
        self.stats.future_days_trimmed += future.len();

        let mut last: Option<DaySlot> = None;
        for (day, slot) in self.slots.iter_mut() {
            match slot {
                Some(known) => last = Some(known.clone()),
                None => {
                    if let Some(previous) = &last {
                        let filled = DaySlot {
                            date: *day,
                            is_guess: true,
                            ..previous.clone()
                        };
                        *slot = Some(filled.clone());
                        last = Some(filled);
                        self.stats.days_filled += 1;
                    }
                }
            }
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DaySlot> {
        self.slots.get(&date).and_then(Option::as_ref)
    }

    pub fn contains_day(&self, date: NaiveDate) -> bool {
        self.slots.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn days(&self) -> &BTreeMap<NaiveDate, Option<DaySlot>> {
        &self.slots
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn into_parts(self) -> (BTreeMap<NaiveDate, Option<DaySlot>>, RunStats) {
        (self.slots, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::UNKNOWN_COUNTRY;
    use crate::domain::services::classifier::default_regions;
    use crate::domain::services::classifier::tests::StubGeocoder;

    const USA: &str = "United States of America";

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    fn observation(day: &str, lat: f64, lng: f64) -> Observation {
        let date = date(day);
        Observation {
            date,
            position: Some(LatLng::new(lat, lng)),
            expected_year: date.year(),
        }
    }

    fn confident(country: &str) -> Classification {
        Classification {
            country: country.to_string(),
            confident: true,
        }
    }

    #[test]
    fn test_open_year_has_every_day_once() {
        let mut ledger = DayLedger::new(None);
        ledger.open_year(2020).unwrap();
        ledger.open_year(2021).unwrap();
        ledger.open_year(2021).unwrap();

        assert_eq!(ledger.len(), 366 + 365);
        assert!(ledger.contains_day(date("2020-02-29")));
        assert!(ledger.contains_day(date("2021-12-31")));
        assert!(!ledger.contains_day(date("2022-01-01")));
        assert!(ledger.days().values().all(Option::is_none));
    }

    #[test]
    fn test_cross_year_observation_is_discarded() {
        let geo = StubGeocoder::new_york_and_san_juan();
        let classifier = CountryClassifier::new(&geo, &geo, default_regions());
        let mut ledger = DayLedger::new(None);
        ledger.open_year(2020).unwrap();

        let mut late = observation("2021-01-01", 40.7, -74.0);
        late.expected_year = 2020;
        assert_eq!(
            ledger.insert(&late, &classifier).unwrap(),
            InsertOutcome::DiscardedYearMismatch
        );
        assert!(!ledger.contains_day(date("2021-01-01")));
        assert_eq!(ledger.stats().discarded_year_mismatch, 1);
    }

    #[test]
    fn test_missing_coordinate_is_discarded() {
        let geo = StubGeocoder::new_york_and_san_juan();
        let classifier = CountryClassifier::new(&geo, &geo, default_regions());
        let mut ledger = DayLedger::new(None);
        ledger.open_year(2020).unwrap();

        let mut blind = observation("2020-05-05", 0.0, 0.0);
        blind.position = None;
        assert_eq!(
            ledger.insert(&blind, &classifier).unwrap(),
            InsertOutcome::DiscardedMissingCoordinate
        );
        assert!(ledger.get(date("2020-05-05")).is_none());
    }

    #[test]
    fn test_last_observation_wins() {
        let geo = StubGeocoder::new_york_and_san_juan();
        let classifier = CountryClassifier::new(&geo, &geo, default_regions());
        let mut ledger = DayLedger::new(None);
        ledger.open_year(2020).unwrap();

        ledger
            .insert(&observation("2020-07-01", 40.7, -74.0), &classifier)
            .unwrap();
        ledger
            .insert(&observation("2020-07-01", 46.0, -75.0), &classifier)
            .unwrap();

        let slot = ledger.get(date("2020-07-01")).unwrap();
        assert_eq!(slot.country, "Canada");
        assert!(!slot.is_guess);
    }

    #[test]
    fn test_insert_twice_is_idempotent() {
        let geo = StubGeocoder::new_york_and_san_juan();
        let classifier = CountryClassifier::new(&geo, &geo, default_regions());
        let seen = observation("2020-07-01", 40.7, -74.0);

        let mut once = DayLedger::new(Some(USA.to_string()));
        once.open_year(2020).unwrap();
        once.insert(&seen, &classifier).unwrap();

        let mut twice = DayLedger::new(Some(USA.to_string()));
        twice.open_year(2020).unwrap();
        twice.insert(&seen, &classifier).unwrap();
        twice.insert(&seen, &classifier).unwrap();

        assert_eq!(once.days(), twice.days());
    }

    #[test]
    fn test_region_hit_is_recorded_as_guess() {
        let geo = StubGeocoder::new_york_and_san_juan();
        let classifier = CountryClassifier::new(&geo, &geo, default_regions());
        let mut ledger = DayLedger::new(None);
        ledger.open_year(2020).unwrap();

        ledger
            .insert(&observation("2020-02-02", 18.2, -66.5), &classifier)
            .unwrap();
        ledger
            .insert(&observation("2020-02-03", -33.9, 151.2), &classifier)
            .unwrap();

        let island = ledger.get(date("2020-02-02")).unwrap();
        assert_eq!(island.country, "Puerto Rico");
        assert!(island.is_guess);

        let nowhere = ledger.get(date("2020-02-03")).unwrap();
        assert_eq!(nowhere.country, UNKNOWN_COUNTRY);
        assert!(nowhere.is_guess);
    }

    #[test]
    fn test_preferred_country_survives_later_observation() {
        let mut ledger = DayLedger::new(Some(USA.to_string()));
        ledger.open_year(2020).unwrap();
        let day = date("2020-08-15");
        let here = LatLng::new(40.7, -74.0);
        let there = LatLng::new(46.0, -75.0);

        assert_eq!(ledger.record(day, here, confident(USA)), InsertOutcome::Recorded);
        assert_eq!(
            ledger.record(day, there, confident("Canada")),
            InsertOutcome::Flagged
        );

        let slot = ledger.get(day).unwrap();
        assert_eq!(slot.country, USA);
        assert_eq!(slot.latitude, 40.7);
        assert!(slot.is_guess);
        assert_eq!(ledger.stats().flagged_by_preference, 1);
    }

    #[test]
    fn test_preferred_country_overwrites_other_country() {
        let mut ledger = DayLedger::new(Some(USA.to_string()));
        ledger.open_year(2020).unwrap();
        let day = date("2020-08-15");

        ledger.record(day, LatLng::new(46.0, -75.0), confident("Canada"));
        ledger.record(day, LatLng::new(40.7, -74.0), confident(USA));

        let slot = ledger.get(day).unwrap();
        assert_eq!(slot.country, USA);
        assert!(!slot.is_guess);
    }

    #[test]
    fn test_second_preferred_observation_resets_guess() {
        let mut ledger = DayLedger::new(Some(USA.to_string()));
        ledger.open_year(2020).unwrap();
        let day = date("2020-08-15");

        ledger.record(day, LatLng::new(40.7, -74.0), confident(USA));
        ledger.record(day, LatLng::new(46.0, -75.0), confident("Canada"));
        ledger.record(day, LatLng::new(41.0, -73.0), confident(USA));

        let slot = ledger.get(day).unwrap();
        assert_eq!(slot.latitude, 41.0);
        assert!(!slot.is_guess);
    }

    #[test]
    fn test_without_preference_non_preferred_simply_wins() {
        let existing = DaySlot {
            date: date("2020-01-01"),
            country: USA.to_string(),
            latitude: 40.7,
            longitude: -74.0,
            is_guess: false,
        };
        let candidate = DaySlot {
            country: "Canada".to_string(),
            ..existing.clone()
        };

        assert_eq!(
            resolve_slot(Some(&existing), candidate.clone(), None),
            SlotUpdate::Replace(candidate.clone())
        );
        assert_eq!(
            resolve_slot(Some(&existing), candidate.clone(), Some(USA)),
            SlotUpdate::FlagExisting
        );
        assert_eq!(
            resolve_slot(None, candidate.clone(), Some(USA)),
            SlotUpdate::Replace(candidate)
        );
    }

    #[test]
    fn test_fill_gaps_copies_previous_day() {
        let mut ledger = DayLedger::new(None);
        ledger.open_year(2020).unwrap();
        ledger.record(
            date("2020-03-01"),
            LatLng::new(40.7, -74.0),
            confident(USA),
        );
        ledger.record(
            date("2020-03-05"),
            LatLng::new(46.0, -75.0),
            confident("Canada"),
        );

        ledger.fill_gaps(date("2020-12-31"));

        for day in ["2020-03-02", "2020-03-03", "2020-03-04"] {
            let slot = ledger.get(date(day)).unwrap();
            assert_eq!(slot.country, USA);
            assert_eq!(slot.date, date(day));
            assert!(slot.is_guess);
        }
        assert!(!ledger.get(date("2020-03-05")).unwrap().is_guess);
        assert_eq!(ledger.get(date("2020-12-31")).unwrap().country, "Canada");
        // Nothing known before March 1st.
        assert!(ledger.get(date("2020-02-29")).is_none());
        assert!(ledger.contains_day(date("2020-02-29")));
    }

    #[test]
    fn test_fill_gaps_trims_future_days() {
        let mut ledger = DayLedger::new(None);
        ledger.open_year(2020).unwrap();
        ledger.record(
            date("2020-06-01"),
            LatLng::new(40.7, -74.0),
            confident(USA),
        );

        ledger.fill_gaps(date("2020-06-10"));

        assert!(ledger.contains_day(date("2020-06-10")));
        assert!(!ledger.contains_day(date("2020-06-11")));
        assert_eq!(ledger.len(), 162);
        assert_eq!(ledger.stats().future_days_trimmed, 366 - 162);
        assert_eq!(ledger.stats().days_filled, 9);
    }

    #[test]
    fn test_day_outside_opened_years_is_discarded() {
        let geo = StubGeocoder::new_york_and_san_juan();
        let classifier = CountryClassifier::new(&geo, &geo, default_regions());
        let mut ledger = DayLedger::new(None);
        ledger.open_year(2020).unwrap();

        assert_eq!(
            ledger
                .insert(&observation("2021-05-01", 40.7, -74.0), &classifier)
                .unwrap(),
            InsertOutcome::DiscardedUnopenedDay
        );
        assert_eq!(
            ledger.record(date("2019-12-31"), LatLng::new(40.7, -74.0), confident(USA)),
            InsertOutcome::DiscardedUnopenedDay
        );

        assert_eq!(ledger.len(), 366);
        assert!(!ledger.contains_day(date("2021-05-01")));
        assert!(!ledger.contains_day(date("2019-12-31")));
        assert_eq!(ledger.stats().discarded_unopened_day, 2);
        assert_eq!(ledger.stats().observations_recorded, 0);
    }
}
