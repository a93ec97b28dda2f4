//! Wedding month calendar and D-day countdown.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// False for the leading/trailing days of neighbouring months
    pub in_month: bool,
    pub is_sunday: bool,
    pub is_wedding_day: bool,
}

/// Sunday-first grid of whole weeks covering the wedding month.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[CalendarDay; 7]>,
}

pub const WEEKDAY_LABELS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

impl MonthGrid {
    pub fn for_date(wedding: NaiveDate) -> Self {
        let first = wedding.with_day(1).unwrap_or(wedding);
        let lead = i64::from(first.weekday().num_days_from_sunday());
        let mut day = first - Duration::days(lead);

        let mut weeks = Vec::new();
        loop {
            let mut week = [CalendarDay {
                date: day,
                in_month: false,
                is_sunday: false,
                is_wedding_day: false,
            }; 7];
            for slot in week.iter_mut() {
                *slot = CalendarDay {
                    date: day,
                    in_month: day.month() == wedding.month() && day.year() == wedding.year(),
                    is_sunday: day.weekday() == Weekday::Sun,
                    is_wedding_day: day == wedding,
                };
                day += Duration::days(1);
            }
            weeks.push(week);
            // Stop once the grid has passed the end of the month
            if day.month() != wedding.month() || day.year() != wedding.year() {
                break;
            }
        }

        Self {
            year: wedding.year(),
            month: wedding.month(),
            weeks,
        }
    }

    /// "6월"
    pub fn month_title(&self) -> String {
        format!("{}월", self.month)
    }

    /// "June, 2026"
    pub fn english_caption(&self) -> String {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1);
        match first {
            Some(date) => format!("{}, {}", date.format("%B"), self.year),
            None => self.year.to_string(),
        }
    }
}

/// Days-to-go label: "D-3", "D-Day", or "D+2" once the date has passed.
pub fn dday_label(today: NaiveDate, wedding: NaiveDate) -> String {
    let diff = (wedding - today).num_days();
    match diff {
        d if d > 0 => format!("D-{}", d),
        0 => "D-Day".to_string(),
        d => format!("D+{}", d.abs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_june_2026_grid() {
        let grid = MonthGrid::for_date(date(2026, 6, 6));

        // June 1st 2026 is a Monday, so the grid opens with May 31st
        let first = grid.weeks[0][0];
        assert_eq!(first.date, date(2026, 5, 31));
        assert!(!first.in_month);
        assert!(first.is_sunday);

        let wedding: Vec<_> = grid
            .weeks
            .iter()
            .flatten()
            .filter(|d| d.is_wedding_day)
            .collect();
        assert_eq!(wedding.len(), 1);
        assert_eq!(wedding[0].date.weekday(), Weekday::Sat);

        assert_eq!(grid.weeks.len(), 5);
        let last = grid.weeks[4][6];
        assert_eq!(last.date, date(2026, 7, 4));
        assert!(!last.in_month);
        assert_eq!(grid.weeks.iter().flatten().filter(|d| d.in_month).count(), 30);
    }

    #[test]
    fn test_month_starting_on_sunday() {
        // February 2026 starts on a Sunday and fills exactly four weeks
        let grid = MonthGrid::for_date(date(2026, 2, 14));
        assert_eq!(grid.weeks[0][0].date, date(2026, 2, 1));
        assert_eq!(grid.weeks.len(), 4);
    }

    #[test]
    fn test_captions() {
        let grid = MonthGrid::for_date(date(2026, 6, 6));
        assert_eq!(grid.month_title(), "6월");
        assert_eq!(grid.english_caption(), "June, 2026");
    }

    #[test]
    fn test_dday_label() {
        let wedding = date(2026, 6, 6);
        assert_eq!(dday_label(date(2026, 6, 3), wedding), "D-3");
        assert_eq!(dday_label(wedding, wedding), "D-Day");
        assert_eq!(dday_label(date(2026, 6, 8), wedding), "D+2");
        assert_eq!(dday_label(date(2025, 12, 31), wedding), "D-157");
    }
}
