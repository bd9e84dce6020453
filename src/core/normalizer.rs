// Repairs the UTC offset separator in the `datetime` query parameter.
//
// A transport layer in front of the function decodes the `%2B` in values such as
// `1990-05-14T10:30:00%2B05:30` into a space before we see the query string. The provider
// rejects the resulting timestamp, so the separator is put back before forwarding.

use crate::utils::error::{ProxyError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Parameters forwarded to the provider, in this order
pub const FORWARDED_PARAMS: [&str; 3] = ["datetime", "coordinates", "ayanamsa"];

const ENCODED_PLUS: &str = "%2B";

// HH:MM:SS[.fff] <sep> HH:MM，<sep> 可能是空白、form 編碼的 '+' 或 %20
static OFFSET_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2}(?:\.\d+)?)(?: |\+|%20)(\d{2}:\d{2})")
        .expect("offset separator pattern is valid")
});

/// 將原始 query string 轉成固定順序的三個參數，並修復 datetime 的時區分隔符
pub fn normalize(raw_query: &str) -> Result<String> {
    let pairs = parse_pairs(raw_query);

    let mut values = Vec::with_capacity(FORWARDED_PARAMS.len());
    for name in FORWARDED_PARAMS {
        let value = lookup(&pairs, name).ok_or_else(|| ProxyError::missing_parameter(name))?;
        values.push(value);
    }

    let datetime = repair_offset_separator(values[0]);
    let coordinates = values[1];
    let ayanamsa = values[2];

    if ayanamsa.parse::<i64>().is_err() {
        return Err(ProxyError::validation(format!(
            "ayanamsa must be an integer, got '{}'",
            ayanamsa
        )));
    }

    if datetime != values[0] {
        tracing::debug!("🔧 Repaired datetime offset separator: {} -> {}", values[0], datetime);
    }

    Ok(format!(
        "datetime={}&coordinates={}&ayanamsa={}",
        datetime, coordinates, ayanamsa
    ))
}

/// Replaces the first corrupted offset separator with `%2B`, leaving every other character as-is.
pub fn repair_offset_separator(datetime: &str) -> String {
    OFFSET_SEPARATOR
        .replacen(datetime, 1, format!("${{1}}{}${{2}}", ENCODED_PLUS))
        .into_owned()
}

fn parse_pairs(raw_query: &str) -> Vec<(&str, &str)> {
    raw_query
        .trim_start_matches('?')
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
        .collect()
}

// 重複的 key 取第一個；空值視為缺少
fn lookup<'a>(pairs: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| *value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repairs_space_before_offset() {
        let normalized =
            normalize("datetime=1990-05-14T10:30:00 05:30&coordinates=12.97,77.59&ayanamsa=1")
                .unwrap();

        assert_eq!(
            normalized,
            "datetime=1990-05-14T10:30:00%2B05:30&coordinates=12.97,77.59&ayanamsa=1"
        );
    }

    #[test]
    fn test_only_separator_changes_for_many_times() {
        for (time, offset) in [
            ("00:00:00", "00:00"),
            ("23:59:59", "14:00"),
            ("07:05:09", "05:45"),
            ("12:00:00", "09:30"),
        ] {
            let input = format!("2001-02-03T{} {}", time, offset);
            let repaired = repair_offset_separator(&input);

            assert_eq!(repaired, format!("2001-02-03T{}%2B{}", time, offset));
            assert_eq!(repaired.replacen("%2B", " ", 1), input);
        }
    }

    #[test]
    fn test_form_encoded_plus_and_percent_space_are_repaired() {
        assert_eq!(
            repair_offset_separator("2024-01-01T06:15:00+05:30"),
            "2024-01-01T06:15:00%2B05:30"
        );
        assert_eq!(
            repair_offset_separator("2024-01-01T06:15:00%2005:30"),
            "2024-01-01T06:15:00%2B05:30"
        );
        assert_eq!(
            repair_offset_separator("2024-01-01T06:15:00.250 05:30"),
            "2024-01-01T06:15:00.250%2B05:30"
        );
    }

    #[test]
    fn test_well_formed_values_are_untouched() {
        for value in [
            "2024-01-01T06:15:00%2B05:30",
            "2024-01-01T06:15:00-05:00",
            "2024-01-01T06:15:00Z",
        ] {
            assert_eq!(repair_offset_separator(value), value);
        }
    }

    #[test]
    fn test_missing_parameters_are_named() {
        let cases = [
            ("coordinates=1,2&ayanamsa=1", "datetime"),
            ("datetime=2024-01-01T06:15:00 05:30&ayanamsa=1", "coordinates"),
            ("datetime=2024-01-01T06:15:00 05:30&coordinates=1,2", "ayanamsa"),
            ("", "datetime"),
            ("datetime=&coordinates=1,2&ayanamsa=1", "datetime"),
        ];

        for (raw, missing) in cases {
            match normalize(raw) {
                Err(ProxyError::ValidationError { message }) => {
                    assert!(message.contains("missing required parameter"));
                    assert!(message.contains(missing), "{} should name {}", message, missing);
                }
                other => panic!("expected validation error for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_extra_parameters_are_dropped_and_order_is_canonical() {
        let normalized = normalize(
            "?ayanamsa=1&la=en&coordinates=12.97,77.59&timezone=Asia/Kolkata&datetime=2024-01-01T06:15:00 05:30",
        )
        .unwrap();

        assert_eq!(
            normalized,
            "datetime=2024-01-01T06:15:00%2B05:30&coordinates=12.97,77.59&ayanamsa=1"
        );
    }

    #[test]
    fn test_coordinates_are_forwarded_verbatim() {
        let normalized =
            normalize("datetime=2024-01-01T06:15:00Z&coordinates=-33.86,151.20&ayanamsa=3")
                .unwrap();
        assert!(normalized.contains("coordinates=-33.86,151.20"));
    }

    #[test]
    fn test_non_integer_ayanamsa_is_rejected() {
        let err = normalize("datetime=2024-01-01T06:15:00Z&coordinates=1,2&ayanamsa=lahiri")
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
