use aqfr_utils::dates::sub_days;
use chrono::NaiveDate;

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// The `day_range + 1` days ending on `end`, i.e. `[end - day_range, end]`.
    ///
    /// `None` when the first day would precede the earliest representable date.
    pub fn trailing(end: NaiveDate, day_range: u32) -> Option<Self> {
        sub_days(end, i64::from(day_range)).map(|begin| DateRange(begin, end))
    }

    /// Number of days the range covers; zero when start is after end.
    pub fn len_days(&self) -> usize {
        let days = (self.1 - self.0).num_days() + 1;
        days.max(0) as usize
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 > self.1 {
            return None;
        }
        let current = self.0;
        match current.succ_opt() {
            Some(next) => self.0 = next,
            // Last representable day: close the range behind it.
            None => self.1 = current.pred_opt().unwrap_or(current),
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_date_range_iteration() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 1, 5).unwrap();
        let range = DateRange(start, end);
        assert_eq!(range.len_days(), 5);
        let dates: Vec<NaiveDate> = range.collect();
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[0], start);
        assert_eq!(dates[4], end);
    }

    #[test]
    fn test_date_range_single_day() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        let range = DateRange::trailing(start, 0).unwrap();
        let dates: Vec<NaiveDate> = range.collect();
        assert_eq!(dates, vec![start]);
    }

    #[test]
    fn test_date_range_empty() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 3, 14).unwrap();
        let range = DateRange(start, end);
        assert_eq!(range.len_days(), 0);
        assert_eq!(range.count(), 0);
    }

    #[test]
    fn test_trailing_crosses_month() {
        let end = NaiveDate::from_ymd_opt(2022, 3, 2).unwrap();
        let dates: Vec<NaiveDate> = DateRange::trailing(end, 3).unwrap().collect();
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2022, 2, 27).unwrap());
        assert_eq!(dates[3], end);
    }

    #[test]
    fn test_trailing_beyond_calendar() {
        let end = NaiveDate::from_ymd_opt(2022, 2, 15).unwrap();
        assert!(DateRange::trailing(end, u32::MAX).is_none());
    }

    #[test]
    fn test_iteration_stops_at_last_date() {
        let before = NaiveDate::MAX.pred_opt().unwrap();
        let dates: Vec<NaiveDate> = DateRange(before, NaiveDate::MAX).collect();
        assert_eq!(dates, vec![before, NaiveDate::MAX]);
    }
}
