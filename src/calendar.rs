use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::GeneratorConfig;

/// Date-derived and operational fields of one row. No randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub date: NaiveDate,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u32,
    pub is_sunday: bool,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub is_vacation: bool,
    pub is_gym_open: bool,
}

/// Operating rules: the weekday the gym closes and the vacation months.
#[derive(Debug, Clone)]
pub struct OperatingCalendar {
    pub closed_weekday: Weekday,
    pub vacation_months: Vec<u32>,
}

impl OperatingCalendar {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            closed_weekday: config.closed_weekday,
            vacation_months: config.vacation_months.clone(),
        }
    }

    pub fn is_vacation(&self, month: u32) -> bool {
        self.vacation_months.contains(&month)
    }

    pub fn derive(&self, date: NaiveDate) -> CalendarFields {
        let weekday = date.weekday();
        let month = date.month();
        let is_sunday = weekday == Weekday::Sun;
        let is_vacation = self.is_vacation(month);
        let is_closed_day = weekday == self.closed_weekday;
        CalendarFields {
            date,
            day_of_week: weekday.num_days_from_monday(),
            is_sunday,
            day: date.day(),
            month,
            year: date.year(),
            is_vacation,
            is_gym_open: !is_closed_day && !is_vacation,
        }
    }

    /// One row per day from `start` to `end` inclusive.
    pub fn derive_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<CalendarFields> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| self.derive(d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> OperatingCalendar {
        OperatingCalendar::from_config(&GeneratorConfig::default())
    }

    #[test]
    fn derives_weekday_index_from_monday() {
        // 2024-05-15 was a Wednesday.
        let fields = calendar().derive(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
        assert_eq!(fields.day_of_week, 2);
        assert_eq!(fields.month, 5);
        assert_eq!(fields.year, 2024);
        assert!(fields.is_vacation);
        assert!(!fields.is_gym_open);
    }

    #[test]
    fn sundays_are_closed() {
        let fields = calendar().derive(NaiveDate::from_ymd_opt(2023, 3, 5).unwrap());
        assert!(fields.is_sunday);
        assert_eq!(fields.day_of_week, 6);
        assert!(!fields.is_gym_open);

        let monday = calendar().derive(NaiveDate::from_ymd_opt(2023, 3, 6).unwrap());
        assert!(monday.is_gym_open);
    }

    #[test]
    fn range_is_contiguous_and_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let rows = calendar().derive_range(start, end);
        assert_eq!(rows.len(), 5); // leap day included
        assert_eq!(rows.first().unwrap().date, start);
        assert_eq!(rows.last().unwrap().date, end);
        for pair in rows.windows(2) {
            assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
        }
    }

    #[test]
    fn open_iff_not_sunday_and_not_vacation() {
        let cal = calendar();
        let rows = cal.derive_range(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        );
        for r in rows {
            assert_eq!(r.is_gym_open, !r.is_sunday && !r.is_vacation, "{}", r.date);
        }
    }
}
