use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: usize = 7;

/// Column headers in grid order. The week always starts on Sunday, regardless of locale.
pub const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Seven consecutive dates, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Week {
    days: [NaiveDate; DAYS_PER_WEEK],
}

impl Week {
    /// Week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self::starting(start_of_week(date))
    }

    fn starting(sunday: NaiveDate) -> Self {
        let mut days = [sunday; DAYS_PER_WEEK];
        for (offset, day) in days.iter_mut().enumerate() {
            *day = sunday + Duration::days(offset as i64);
        }
        Self { days }
    }

    pub fn days(&self) -> &[NaiveDate; DAYS_PER_WEEK] {
        &self.days
    }

    pub fn first(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.days[DAYS_PER_WEEK - 1]
    }

    pub fn day(&self, column: usize) -> Option<NaiveDate> {
        self.days.get(column).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first() <= date && date <= self.last()
    }

    /// Zero-based column of `date`, if it falls inside this week.
    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.first()).num_days() as usize)
        } else {
            None
        }
    }
}

/// One date cell of the rendered month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_today: bool,
}

/// The weeks rendered for one month, padded with adjacent-month dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWindow {
    month_start: NaiveDate,
    month_end: NaiveDate,
    weeks: Vec<Week>,
}

impl CalendarWindow {
    /// Builds the window for the month containing `reference`. Any valid date works.
    pub fn for_date(reference: NaiveDate) -> Self {
        let month_start = first_of_month(reference);
        let month_end = last_of_month(reference);
        let window_start = start_of_week(month_start);
        let window_end = end_of_week(month_end);

        let mut weeks = Vec::with_capacity(6);
        let mut sunday = window_start;
        while sunday <= window_end {
            weeks.push(Week::starting(sunday));
            sunday = sunday + Duration::days(DAYS_PER_WEEK as i64);
        }

        Self {
            month_start,
            month_end,
            weeks,
        }
    }

    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub fn month_start(&self) -> NaiveDate {
        self.month_start
    }

    pub fn month_end(&self) -> NaiveDate {
        self.month_end
    }

    pub fn first_date(&self) -> NaiveDate {
        self.weeks[0].first()
    }

    pub fn last_date(&self) -> NaiveDate {
        self.weeks[self.weeks.len() - 1].last()
    }

    pub fn is_current_month(&self, date: NaiveDate) -> bool {
        self.month_start <= date && date <= self.month_end
    }

    /// Day cells of one week, flagged against the viewed month and `today`.
    pub fn day_cells(&self, week_index: usize, today: NaiveDate) -> Vec<DayCell> {
        self.weeks
            .get(week_index)
            .map(|week| {
                week.days()
                    .iter()
                    .map(|&date| DayCell {
                        date,
                        in_current_month: self.is_current_month(date),
                        is_today: date == today,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Heading such as `July 2024`.
    pub fn title(&self) -> String {
        self.month_start.format("%B %Y").to_string()
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    let next_month = add_months(first, 1);
    next_month - Duration::days(1)
}

/// Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Saturday on or after `date`.
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    date + Duration::days(6 - date.weekday().num_days_from_sunday() as i64)
}

/// Shifts by whole months, clamping the day to the target month's length
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let mut day = date.day();
    loop {
        if let Some(shifted) = NaiveDate::from_ymd_opt(year, month, day) {
            return shifted;
        }
        day -= 1;
    }
}

pub fn next_month(date: NaiveDate) -> NaiveDate {
    add_months(date, 1)
}

pub fn previous_month(date: NaiveDate) -> NaiveDate {
    add_months(date, -1)
}

/// Short tab/label name such as `Jul 2024`.
pub fn month_label(year: i32, month: u32) -> String {
    let idx = (month.clamp(1, 12) - 1) as usize;
    format!("{} {}", MONTH_ABBREVIATIONS[idx], year)
}

pub fn is_week_start(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}
