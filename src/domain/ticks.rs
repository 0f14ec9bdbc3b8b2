// Time-axis tick labels derived from the visible slice
use super::sample::{MINUTES_PER_DAY, Sample};

/// Upper bound of the visible range (minutes) paired with the tick step used for it.
const INTERVAL_STEPS: [(i64, i64); 5] = [(10, 1), (30, 2), (60, 5), (180, 10), (360, 15)];
const WIDEST_INTERVAL: i64 = 20;

/// Tick step in minutes for a visible range of `range_minutes`.
pub fn tick_interval(range_minutes: i64) -> i64 {
    INTERVAL_STEPS
        .iter()
        .find(|(limit, _)| range_minutes <= *limit)
        .map(|(_, interval)| *interval)
        .unwrap_or(WIDEST_INTERVAL)
}

/// `HH:MM` labels for the time axis of `visible`.
///
/// Runs from the first sample rounded down to the interval through one
/// interval past the last sample. A slice whose last time is earlier than its
/// first is read as crossing midnight once.
pub fn generate_ticks(visible: &[Sample]) -> Vec<String> {
    let (Some(first), Some(last)) = (visible.first(), visible.last()) else {
        return Vec::new();
    };

    let start = first.time.minutes_since_midnight();
    let mut end = last.time.minutes_since_midnight();
    if end < start {
        end += MINUTES_PER_DAY;
    }

    let interval = tick_interval(end - start);
    let rounded_start = (start / interval) * interval;

    (rounded_start..=end + interval)
        .step_by(interval as usize)
        .map(format_minutes)
        .collect()
}

fn format_minutes(total: i64) -> String {
    let wrapped = total.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}
