use crate::utils::error::{Result, TimelineError};

/// Years chrono can represent as full calendar years.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// 將 "2014,2016-2018" 展開為 `[2014, 2016, 2017, 2018]`
///
/// Tokens keep their order and duplicates are kept. A range whose start is
/// after its end is rejected.
pub fn parse_years(expression: &str) -> Result<Vec<i32>> {
    let invalid = |reason: String| TimelineError::InvalidYearRange {
        expression: expression.to_string(),
        reason,
    };

    if expression.trim().is_empty() {
        return Err(invalid("no years given".to_string()));
    }

    let mut years = Vec::new();
    for token in expression.split(',').map(str::trim) {
        if token.is_empty() {
            return Err(invalid("empty entry between commas".to_string()));
        }

        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_year(start.trim()).map_err(&invalid)?;
                let end = parse_year(end.trim()).map_err(&invalid)?;
                if start > end {
                    return Err(invalid(format!("range {}-{} starts after it ends", start, end)));
                }
                years.extend(start..=end);
            }
            None => years.push(parse_year(token).map_err(&invalid)?),
        }
    }

    Ok(years)
}

fn parse_year(token: &str) -> std::result::Result<i32, String> {
    let year: i32 = token
        .parse()
        .map_err(|_| format!("'{}' is not a year", token))?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(format!("{} is outside {}..={}", year, MIN_YEAR, MAX_YEAR));
    }
    Ok(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_expression() {
        assert_eq!(
            parse_years("2014,2016-2018").unwrap(),
            vec![2014, 2016, 2017, 2018]
        );
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        assert_eq!(
            parse_years("2020, 2018-2019,2020").unwrap(),
            vec![2020, 2018, 2019, 2020]
        );
    }

    #[test]
    fn test_single_year_range() {
        assert_eq!(parse_years("2021-2021").unwrap(), vec![2021]);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let err = parse_years("2018-2016").unwrap_err();
        assert!(matches!(err, TimelineError::InvalidYearRange { .. }));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_years("").is_err());
        assert!(parse_years("twenty").is_err());
        assert!(parse_years("2014,,2015").is_err());
        assert!(parse_years("2014-").is_err());
        assert!(parse_years("0").is_err());
    }
}
