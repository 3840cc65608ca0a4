use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Six-day work week: every weekday except one rest day is a workday.
///
/// [`WorkdayCalendar::is_workday`] is the only place that decides what a
/// workday is; every other method walks dates through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkdayCalendar {
    rest_day: Weekday,
}

impl Default for WorkdayCalendar {
    fn default() -> Self {
        Self::new(Weekday::Sun)
    }
}

impl WorkdayCalendar {
    pub fn new(rest_day: Weekday) -> Self {
        Self { rest_day }
    }

    pub fn is_workday(&self, date: NaiveDate) -> bool {
        date.weekday() != self.rest_day
    }

    pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
        date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
    }

    /// Workdays in `[start, end]`, both ends included. Zero when `end` is
    /// before `start`.
    pub fn count_workdays_inclusive(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if end < start {
            return 0;
        }
        let total_days = (end - start).num_days() as u64 + 1;
        let full_weeks = total_days / 7;

        // Any seven consecutive days hold the same number of workdays.
        let per_week = self.workdays_in(start, 7);
        let tail = self.workdays_in(Self::add_days(start, full_weeks * 7), total_days % 7);

        u32::try_from(full_weeks * per_week + tail).unwrap_or(u32::MAX)
    }

    fn workdays_in(&self, from: NaiveDate, days: u64) -> u64 {
        from.iter_days()
            .take(days as usize)
            .filter(|day| self.is_workday(*day))
            .count() as u64
    }

    /// The moment the `n`-th workday counted from `start` (inclusive) ends.
    ///
    /// Terminates within `7 * n` days because at most one day in seven is a
    /// rest day. `n` of zero is treated as one.
    pub fn nth_workday_from(&self, start: NaiveDate, n: u32) -> NaiveDateTime {
        debug_assert!(n > 0, "workday ordinal starts at 1");
        let target = n.max(1);

        let mut seen = 0;
        let mut day = start;
        loop {
            if self.is_workday(day) {
                seen += 1;
                if seen == target {
                    return end_of_day(day);
                }
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => return end_of_day(day),
            };
        }
    }

    /// Date of the `n`-th workday counted from the day after `today`.
    pub fn forward_workday_from_tomorrow(&self, today: NaiveDate, n: u32) -> NaiveDate {
        self.nth_workday_from(Self::add_days(today, 1), n).date()
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last_milli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn only_sunday_is_a_rest_day() {
        let calendar = WorkdayCalendar::default();
        // 2024-01-07 is a Sunday.
        let week_start = date(2024, 1, 7);
        for offset in 0..14 {
            let day = WorkdayCalendar::add_days(week_start, offset);
            assert_eq!(calendar.is_workday(day), day.weekday() != Weekday::Sun, "{day}");
        }
    }

    #[test]
    fn count_is_inclusive_and_skips_sundays() {
        let calendar = WorkdayCalendar::default();
        // Mon 8th .. Sun 14th: six workdays.
        assert_eq!(calendar.count_workdays_inclusive(date(2024, 1, 8), date(2024, 1, 14)), 6);
        // Single workday.
        assert_eq!(calendar.count_workdays_inclusive(date(2024, 1, 10), date(2024, 1, 10)), 1);
        // Single Sunday.
        assert_eq!(calendar.count_workdays_inclusive(date(2024, 1, 14), date(2024, 1, 14)), 0);
        // Sat 13th .. Mon 15th.
        assert_eq!(calendar.count_workdays_inclusive(date(2024, 1, 13), date(2024, 1, 15)), 2);
    }

    #[test]
    fn count_matches_brute_force_over_a_year() {
        let calendar = WorkdayCalendar::default();
        let start = date(2024, 1, 1);
        for len in [0u64, 1, 6, 7, 30, 365] {
            let end = WorkdayCalendar::add_days(start, len);
            let expected = (0..=len)
                .map(|i| WorkdayCalendar::add_days(start, i))
                .filter(|d| d.weekday() != Weekday::Sun)
                .count() as u32;
            assert_eq!(calendar.count_workdays_inclusive(start, end), expected);
        }
    }

    #[test]
    fn very_long_range_is_counted_without_walking_it() {
        let calendar = WorkdayCalendar::default();
        let start = date(2024, 1, 15);
        let end = date(9999, 12, 31);
        let days = (end - start).num_days() as u64 + 1;
        let count = calendar.count_workdays_inclusive(start, end);
        // Six workdays a week, give or take the partial last week.
        assert!((days * 6 / 7).abs_diff(count as u64) <= 1);
        // Window arithmetic agrees with a short brute-force tail.
        let tail_start = date(9999, 12, 20);
        let brute = tail_start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| d.weekday() != Weekday::Sun)
            .count() as u32;
        assert_eq!(calendar.count_workdays_inclusive(tail_start, end), brute);
    }

    #[test]
    fn reversed_range_counts_zero() {
        let calendar = WorkdayCalendar::default();
        assert_eq!(calendar.count_workdays_inclusive(date(2024, 1, 10), date(2024, 1, 9)), 0);
    }

    #[test]
    fn nth_workday_lands_on_workday_at_end_of_day() {
        let calendar = WorkdayCalendar::default();
        for start_day in 1..=14 {
            let start = date(2024, 1, start_day);
            for n in 1..=10 {
                let due = calendar.nth_workday_from(start, n);
                assert!(calendar.is_workday(due.date()));
                assert_eq!(due.time(), NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap());
                assert_eq!(calendar.count_workdays_inclusive(start, due.date()), n);
                assert!(due.date() <= WorkdayCalendar::add_days(start, 7 * n as u64));
            }
        }
    }

    #[test]
    fn third_workday_skips_sunday() {
        let calendar = WorkdayCalendar::default();
        // Fri 12th, Sat 13th, (Sun 14th), Mon 15th.
        let due = calendar.nth_workday_from(date(2024, 1, 12), 3);
        assert_eq!(due.date(), date(2024, 1, 15));
        // Starting on a Sunday does not count the start.
        let due = calendar.nth_workday_from(date(2024, 1, 14), 1);
        assert_eq!(due.date(), date(2024, 1, 15));
    }

    #[test]
    fn forward_walk_starts_tomorrow() {
        let calendar = WorkdayCalendar::default();
        // Today Wed 10th: Thu 11th, Fri 12th, Sat 13th.
        assert_eq!(calendar.forward_workday_from_tomorrow(date(2024, 1, 10), 3), date(2024, 1, 13));
        // Today Fri 12th: Sat 13th, Mon 15th, Tue 16th.
        assert_eq!(calendar.forward_workday_from_tomorrow(date(2024, 1, 12), 3), date(2024, 1, 16));
    }

    #[test]
    fn rest_day_is_configurable() {
        let calendar = WorkdayCalendar::new(Weekday::Fri);
        assert!(!calendar.is_workday(date(2024, 1, 12)));
        assert!(calendar.is_workday(date(2024, 1, 14)));
    }
}
