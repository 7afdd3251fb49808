use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A concrete (calendar date, time-of-day) pair at which a dose is due.
///
/// `slot` is the index of the originating entry in the medication's
/// `times` list; it identifies the reminder tag the instant maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseInstant {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub slot: usize,
}

impl DoseInstant {
    pub fn new(date: NaiveDate, time: NaiveTime, slot: usize) -> Self {
        Self { date, time, slot }
    }

    /// The instant as a wall-clock datetime.
    pub fn at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_combines_date_and_time() {
        let instant = DoseInstant::new(
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            1,
        );
        assert_eq!(
            instant.at(),
            NaiveDate::from_ymd_opt(2024, 1, 3)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap()
        );
    }
}
