use crate::prelude::{MergeError, MergeResult};
use chrono::{DateTime, Duration, NaiveDateTime, Timelike};

/// Default nominal acquisition interval, in minutes.
pub const ACQUISITION_UPDATE_MINUTES: u32 = 6;

const DATE_FORMAT: &str = "%Y%m%d";
const TIME_FORMAT: &str = "%H%M%S";

/// Quantizes acquisition times onto a regular cycle starting at minute 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    interval_minutes: u32,
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self {
            interval_minutes: ACQUISITION_UPDATE_MINUTES,
        }
    }
}

impl TimeNormalizer {
    pub fn new(interval_minutes: u32) -> MergeResult<Self> {
        if interval_minutes == 0 {
            return Err(MergeError::InvalidInterval);
        }
        Ok(Self { interval_minutes })
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    /// Rounds to the nearest interval boundary, ties going to the later one.
    ///
    /// Half the interval is added first, then the instant is truncated by
    /// `minute % interval` minutes with seconds cleared.
    pub fn round(&self, date: &str, time: &str) -> MergeResult<(String, String)> {
        let interval = i64::from(self.interval_minutes);
        let shifted = parse_date_time(date, time)? + Duration::seconds(interval * 30);
        let truncated = shifted - Duration::minutes(i64::from(shifted.minute()) % interval);
        let truncated = truncated
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| MergeError::InvalidDateTime(format!("{}{}", date, time)))?;
        Ok(format_date_time(&truncated))
    }

    /// `YYYYMMDDHHMMSS` label of the interval an acquisition falls in,
    /// floored within the hour. Used to group files of one cycle.
    pub fn nominal_label(&self, date: &str, time: &str) -> MergeResult<String> {
        let instant = parse_date_time(date, time)?;
        let minute = instant.minute() - instant.minute() % self.interval_minutes;
        let floored = instant
            .with_minute(minute)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| MergeError::InvalidDateTime(format!("{}{}", date, time)))?;
        Ok(floored.format("%Y%m%d%H%M%S").to_string())
    }

    /// Floors to a multiple of the interval counted in seconds since the epoch (UTC).
    pub fn cycle_floor(&self, date: &str, time: &str) -> MergeResult<(String, String)> {
        let seconds = parse_date_time(date, time)?.and_utc().timestamp();
        let cycle = i64::from(self.interval_minutes) * 60;
        let floored = DateTime::from_timestamp(seconds - seconds.rem_euclid(cycle), 0)
            .ok_or_else(|| MergeError::InvalidDateTime(format!("{}{}", date, time)))?;
        Ok(format_date_time(&floored.naive_utc()))
    }
}

/// Rounds `date`/`time` to the nearest `interval_minutes` boundary.
pub fn normalize(date: &str, time: &str, interval_minutes: u32) -> MergeResult<(String, String)> {
    TimeNormalizer::new(interval_minutes)?.round(date, time)
}

pub(crate) fn parse_date_time(date: &str, time: &str) -> MergeResult<NaiveDateTime> {
    let joined = format!("{}{}", date, time);
    if date.len() != 8 || time.len() != 6 {
        return Err(MergeError::InvalidDateTime(joined));
    }
    NaiveDateTime::parse_from_str(&joined, "%Y%m%d%H%M%S")
        .map_err(|_| MergeError::InvalidDateTime(joined))
}

fn format_date_time(instant: &NaiveDateTime) -> (String, String) {
    (
        instant.format(DATE_FORMAT).to_string(),
        instant.format(TIME_FORMAT).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rounds_across_midnight() {
        assert_eq!(
            normalize("20171222", "235914", 6).unwrap(),
            ("20171223".to_string(), "000000".to_string())
        );
    }

    #[test]
    fn below_half_interval_rounds_down() {
        assert_eq!(
            normalize("20200101", "000200", 6).unwrap(),
            ("20200101".to_string(), "000000".to_string())
        );
    }

    #[test]
    fn exact_half_interval_rounds_up() {
        assert_eq!(
            normalize("20200101", "000300", 6).unwrap(),
            ("20200101".to_string(), "000600".to_string())
        );
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(matches!(
            normalize("20200101", "000300", 0),
            Err(MergeError::InvalidInterval)
        ));
    }

    #[test]
    fn malformed_time_is_rejected() {
        assert!(matches!(
            normalize("20200101", "0003", 6),
            Err(MergeError::InvalidDateTime(_))
        ));
        assert!(normalize("20201301", "000300", 6).is_err());
    }

    #[test]
    fn nominal_label_floors_within_hour() {
        let normalizer = TimeNormalizer::new(15).unwrap();
        assert_eq!(
            normalizer.nominal_label("20161017", "151459").unwrap(),
            "20161017150000"
        );
        assert_eq!(
            normalizer.nominal_label("20161017", "151500").unwrap(),
            "20161017151500"
        );
    }

    #[test]
    fn cycle_floor_uses_epoch_multiples() {
        let normalizer = TimeNormalizer::new(5).unwrap();
        assert_eq!(
            normalizer.cycle_floor("20151209", "165459").unwrap(),
            ("20151209".to_string(), "165000".to_string())
        );
        assert_eq!(
            normalizer.cycle_floor("20151209", "165500").unwrap(),
            ("20151209".to_string(), "165500".to_string())
        );
    }

    proptest! {
        #[test]
        fn rounded_time_sits_on_a_boundary(
            secs in 0i64..4_102_444_800,
            interval in 1u32..=60,
        ) {
            let instant = DateTime::from_timestamp(secs, 0).unwrap().naive_utc();
            let (date, time) = format_date_time(&instant);
            let (_, rounded) = normalize(&date, &time, interval).unwrap();
            let minute: u32 = rounded[2..4].parse().unwrap();
            prop_assert_eq!(minute % interval, 0);
            prop_assert_eq!(&rounded[4..], "00");
        }

        #[test]
        fn cycle_floor_never_moves_forward(secs in 0i64..4_102_444_800, interval in 1u32..=60) {
            let instant = DateTime::from_timestamp(secs, 0).unwrap().naive_utc();
            let (date, time) = format_date_time(&instant);
            let (d, t) = TimeNormalizer::new(interval).unwrap().cycle_floor(&date, &time).unwrap();
            let floored = parse_date_time(&d, &t).unwrap().and_utc().timestamp();
            prop_assert!(floored <= secs);
            prop_assert!(secs - floored < i64::from(interval) * 60);
            prop_assert_eq!(floored % (i64::from(interval) * 60), 0);
        }
    }
}
