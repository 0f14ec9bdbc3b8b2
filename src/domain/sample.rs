// Sample and dataset domain models
use chrono::{DateTime, NaiveTime, Timelike};
use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Record keys that never carry a series value.
const RESERVED_KEYS: [&str; 2] = ["time", "ExecutionTime"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeLabelError {
    #[error("empty time label")]
    Empty,
    #[error("malformed time label '{0}', expected HH:MM or an RFC 3339 timestamp")]
    Malformed(String),
}

/// Wall-clock time of a sample, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn from_hm(hours: u32, minutes: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hours, minutes, 0).map(Self)
    }

    pub fn minutes_since_midnight(&self) -> i64 {
        i64::from(self.0.hour()) * 60 + i64::from(self.0.minute())
    }
}

impl FromStr for ClockTime {
    type Err = TimeLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.is_empty() {
            return Err(TimeLabelError::Empty);
        }

        // Backend already formats most timestamps as HH:MM, raw ones still show up
        if let Ok(time) = NaiveTime::parse_from_str(label, "%H:%M") {
            return Ok(Self(time));
        }
        if let Ok(time) = NaiveTime::parse_from_str(label, "%H:%M:%S") {
            return Ok(Self(time.with_second(0).unwrap_or(time)));
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(label) {
            let time = stamp.time();
            return Self::from_hm(time.hour(), time.minute())
                .ok_or_else(|| TimeLabelError::Malformed(label.to_string()));
        }

        Err(TimeLabelError::Malformed(label.to_string()))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// One observation: a clock time plus named series values (`None` marks a gap).
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: ClockTime,
    pub series: IndexMap<String, Option<f64>>,
}

impl Sample {
    pub fn new(time: ClockTime) -> Self {
        Self {
            time,
            series: IndexMap::new(),
        }
    }

    pub fn with_value(mut self, name: &str, value: Option<f64>) -> Self {
        self.series.insert(name.to_string(), value);
        self
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.series.get(name).copied().flatten()
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        map.serialize_entry("time", &self.time.to_string())?;
        for (name, value) in &self.series {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SampleVisitor;

        impl<'de> Visitor<'de> for SampleVisitor {
            type Value = Sample;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sensor record with a time field")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Sample, A::Error> {
                let mut time = None;
                let mut series = IndexMap::new();

                while let Some(key) = access.next_key::<String>()? {
                    let value: serde_json::Value = access.next_value()?;
                    if key == "time" {
                        let label = value
                            .as_str()
                            .ok_or_else(|| de::Error::custom("time must be a string"))?;
                        time = Some(label.parse::<ClockTime>().map_err(de::Error::custom)?);
                    } else if RESERVED_KEYS.contains(&key.as_str()) {
                        continue;
                    } else if value.is_null() {
                        series.insert(key, None);
                    } else if let Some(number) = value.as_f64() {
                        series.insert(key, Some(number));
                    }
                    // Non-numeric fields (tags, labels) are not plottable
                }

                let time = time.ok_or_else(|| de::Error::missing_field("time"))?;
                Ok(Sample { time, series })
            }
        }

        deserializer.deserialize_map(SampleVisitor)
    }
}

/// Ordered, immutable sequence of samples for one chart.
///
/// Cloning is cheap; widgets showing the same chart share one allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Arc<[Sample]>,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Series names carried by the first record, in record order.
    ///
    /// Later records do not add series; reserved keys were dropped at ingestion.
    pub fn detect_series(&self) -> Vec<String> {
        self.samples
            .first()
            .map(|sample| sample.series.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Sample>::deserialize(deserializer).map(Dataset::new)
    }
}
