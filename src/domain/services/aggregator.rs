use crate::domain::model::{DaySlot, Summary};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

pub const TOTAL_KEY: &str = "total";

/// 統計每年各國天數，並列出缺漏與推測的日期
///
/// Every processed year gets a (possibly empty) entry; a `total` entry is
/// added when more than one year was processed. Guessed days still count
/// toward their country, missing days do not.
pub fn summarize(days: &BTreeMap<NaiveDate, Option<DaySlot>>, years: &[i32]) -> Summary {
    let mut summary = Summary::default();
    let with_total = years.len() > 1;

    if with_total {
        summary.country_counter.insert(TOTAL_KEY.to_string(), BTreeMap::new());
    }
    for year in years {
        summary.country_counter.entry(year.to_string()).or_default();
    }

    for (day, slot) in days {
        let Some(slot) = slot else {
            summary.missing.push(*day);
            continue;
        };
        if slot.is_guess {
            summary.guessed.push(*day);
        }

        if with_total {
            bump(&mut summary.country_counter, TOTAL_KEY, &slot.country);
        }
        bump(&mut summary.country_counter, &day.year().to_string(), &slot.country);
    }

    summary.days_in_year = days.len();
    summary.days_missing = summary.missing.len();
    summary.days_guessed = summary.guessed.len();
    summary
}

fn bump(counter: &mut BTreeMap<String, BTreeMap<String, u32>>, key: &str, country: &str) {
    *counter
        .entry(key.to_string())
        .or_default()
        .entry(country.to_string())
        .or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    fn slot(day: &str, country: &str, is_guess: bool) -> Option<DaySlot> {
        Some(DaySlot {
            date: date(day),
            country: country.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            is_guess,
        })
    }

    #[test]
    fn test_single_year_has_no_total() {
        let days = BTreeMap::from([
            (date("2020-01-01"), None),
            (date("2020-01-02"), slot("2020-01-02", "Spain", false)),
            (date("2020-01-03"), slot("2020-01-03", "Spain", true)),
        ]);

        let summary = summarize(&days, &[2020]);

        assert!(!summary.country_counter.contains_key(TOTAL_KEY));
        assert_eq!(summary.country_counter["2020"]["Spain"], 2);
        assert_eq!(summary.missing, vec![date("2020-01-01")]);
        assert_eq!(summary.guessed, vec![date("2020-01-03")]);
        assert_eq!(summary.days_in_year, 3);
        assert_eq!(summary.days_missing, 1);
        assert_eq!(summary.days_guessed, 1);
    }

    #[test]
    fn test_multiple_years_add_total() {
        let days = BTreeMap::from([
            (date("2019-12-31"), slot("2019-12-31", "Spain", false)),
            (date("2020-01-01"), slot("2020-01-01", "Croatia", false)),
            (date("2020-01-02"), slot("2020-01-02", "Spain", true)),
        ]);

        let summary = summarize(&days, &[2019, 2020]);

        assert_eq!(summary.country_counter[TOTAL_KEY]["Spain"], 2);
        assert_eq!(summary.country_counter[TOTAL_KEY]["Croatia"], 1);
        assert_eq!(summary.country_counter["2019"]["Spain"], 1);
        assert_eq!(summary.country_counter["2020"]["Spain"], 1);
        assert!(summary.missing.is_empty());
    }

    #[test]
    fn test_years_without_days_still_appear() {
        let summary = summarize(&BTreeMap::new(), &[2030]);
        assert!(summary.country_counter["2030"].is_empty());
        assert_eq!(summary.days_in_year, 0);
    }
}
