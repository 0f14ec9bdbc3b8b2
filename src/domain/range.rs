// Time range selection for dashboard queries
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const PREDEFINED_RANGES: [&str; 8] = ["1h", "3h", "6h", "12h", "24h", "7d", "30d", "90d"];

const CUSTOM_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("unknown range '{0}', expected one of 1h, 3h, 6h, 12h, 24h, 7d, 30d, 90d")]
    UnknownRange(String),
    #[error("custom range starts after it ends ({from} > {to})")]
    Inverted { from: NaiveDateTime, to: NaiveDateTime },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RangeSelection {
    Predefined { range: String },
    Custom { from: NaiveDateTime, to: NaiveDateTime },
}

impl RangeSelection {
    pub fn predefined(range: &str) -> Result<Self, RangeError> {
        if PREDEFINED_RANGES.contains(&range) {
            Ok(Self::Predefined {
                range: range.to_string(),
            })
        } else {
            Err(RangeError::UnknownRange(range.to_string()))
        }
    }

    pub fn custom(from: NaiveDateTime, to: NaiveDateTime) -> Result<Self, RangeError> {
        if from > to {
            return Err(RangeError::Inverted { from, to });
        }
        Ok(Self::Custom { from, to })
    }

    /// Re-check a selection that arrived over the wire.
    pub fn validated(self) -> Result<Self, RangeError> {
        match self {
            Self::Predefined { range } => Self::predefined(&range),
            Self::Custom { from, to } => Self::custom(from, to),
        }
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Predefined { range } => vec![("range", range.clone())],
            Self::Custom { from, to } => vec![
                ("from", from.format(CUSTOM_FORMAT).to_string()),
                ("to", to.format(CUSTOM_FORMAT).to_string()),
            ],
        }
    }
}

impl fmt::Display for RangeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predefined { range } => write!(f, "last {}", range),
            Self::Custom { from, to } => write!(
                f,
                "{} - {}",
                from.format(CUSTOM_FORMAT),
                to.format(CUSTOM_FORMAT)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_predefined_range_params() {
        let range = RangeSelection::predefined("24h").unwrap();
        assert_eq!(range.query_params(), vec![("range", "24h".to_string())]);
        assert_eq!(
            RangeSelection::predefined("2w"),
            Err(RangeError::UnknownRange("2w".to_string()))
        );
    }

    #[test]
    fn test_custom_range_params() {
        let range = RangeSelection::custom(at(28, 9), at(28, 17)).unwrap();
        assert_eq!(
            range.query_params(),
            vec![
                ("from", "2025-07-28T09:00".to_string()),
                ("to", "2025-07-28T17:00".to_string())
            ]
        );
        assert!(RangeSelection::custom(at(29, 0), at(28, 0)).is_err());
    }

    #[test]
    fn test_wire_selection_is_validated() {
        let range: RangeSelection =
            serde_json::from_str(r#"{"type":"predefined","range":"5y"}"#).unwrap();
        assert!(range.validated().is_err());

        let range: RangeSelection = serde_json::from_str(
            r#"{"type":"custom","from":"2025-07-28T09:00:00","to":"2025-07-28T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(range.validated().unwrap().to_string(), "2025-07-28T09:00 - 2025-07-28T10:00");
    }
}
