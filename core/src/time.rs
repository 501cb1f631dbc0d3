//! Calendar clock
//!
//! The payment-simulation engine this crate is descended from advances a
//! tick counter and derives `current_day = current_tick / ticks_per_day`.
//! This domain has no intra-day ticks — one simulated step is one calendar
//! day — so the clock here advances a `NaiveDate` directly instead.

use chrono::NaiveDate;

/// Tracks the current day of a running simulation and its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarClock {
    start: NaiveDate,
    end: NaiveDate,
    current: NaiveDate,
}

impl CalendarClock {
    /// Create a clock positioned at `start`. `end` is the last day the
    /// simulation will process, inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            current: start,
        }
    }

    pub fn current_day(&self) -> NaiveDate {
        self.current
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_first_day(&self) -> bool {
        self.current == self.start
    }

    pub fn is_last_day(&self) -> bool {
        self.current == self.end
    }

    /// Total number of days in [start, end], inclusive.
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// 1-based index of the current day within [start, end].
    pub fn day_index(&self) -> i64 {
        (self.current - self.start).num_days() + 1
    }

    /// Advance to the next calendar day. Returns `false` once past `end`.
    pub fn advance(&mut self) -> bool {
        if self.is_last_day() {
            return false;
        }
        self.current = self.current.succ_opt().expect("date overflow");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_total_days_inclusive() {
        let clock = CalendarClock::new(d("2024-01-01"), d("2024-01-05"));
        assert_eq!(clock.total_days(), 5);
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut clock = CalendarClock::new(d("2024-01-01"), d("2024-01-02"));
        assert!(clock.is_first_day());
        assert!(clock.advance());
        assert!(clock.is_last_day());
        assert!(!clock.advance());
        assert_eq!(clock.current_day(), d("2024-01-02"));
    }

    #[test]
    fn test_day_index() {
        let mut clock = CalendarClock::new(d("2024-01-01"), d("2024-01-05"));
        assert_eq!(clock.day_index(), 1);
        clock.advance();
        assert_eq!(clock.day_index(), 2);
    }
}
