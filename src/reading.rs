//! Reading progress and yearly goal arithmetic.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Whole-number percentage of `current` over `total`, rounded half up.
///
/// A book without a page count reads as 0%.
pub fn progress_percent(current_page: u32, total_pages: u32) -> u32 {
    if total_pages == 0 {
        return 0;
    }
    ((f64::from(current_page) / f64::from(total_pages)) * 100.0).round() as u32
}

/// Page reached at `percent` of a `total_pages` book.
pub fn page_from_percent(percent: f64, total_pages: u32) -> u32 {
    let page = ((percent / 100.0) * f64::from(total_pages)).round();
    page.clamp(0.0, f64::from(total_pages)) as u32
}

/// Progress toward a yearly goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub books_read: u32,
    pub goal: u32,
    /// Capped at 100.
    pub percent: f64,
    pub achieved: bool,
}

impl GoalProgress {
    pub fn new(books_read: u32, goal: u32) -> Self {
        let percent = if goal == 0 {
            100.0
        } else {
            (f64::from(books_read) / f64::from(goal) * 100.0).min(100.0)
        };
        Self {
            books_read,
            goal,
            percent,
            achieved: books_read >= goal,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.books_read)
    }
}

/// Where a reader stands against an even pace through the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "books", rename_all = "snake_case")]
pub enum Schedule {
    Ahead(u32),
    Behind(u32),
    OnTrack,
}

impl Schedule {
    /// Compare `books_read` with the books expected by `today` for `goal`.
    pub fn on(today: NaiveDate, books_read: u32, goal: u32) -> Self {
        let expected = expected_books(today, goal);
        match books_read.cmp(&expected) {
            std::cmp::Ordering::Greater => Self::Ahead(books_read - expected),
            std::cmp::Ordering::Less => Self::Behind(expected - books_read),
            std::cmp::Ordering::Equal => Self::OnTrack,
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: u32| if n > 1 { "s" } else { "" };
        match *self {
            Self::Ahead(n) => write!(f, "You're {n} book{} ahead of schedule!", plural(n)),
            Self::Behind(n) => write!(f, "{n} book{} behind schedule", plural(n)),
            Self::OnTrack => write!(f, "Right on track!"),
        }
    }
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Books an even pace would have finished by `today` (days elapsed since Jan 1).
pub fn expected_books(today: NaiveDate, goal: u32) -> u32 {
    let days_passed = f64::from(today.ordinal0());
    let fraction = days_passed / f64::from(days_in_year(today.year()));
    (fraction * f64::from(goal)).floor() as u32
}
