//! Automatic date ticks with concise labels

use chrono::{Datelike, Duration, NaiveDate};

/// Granularity the locator settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickUnit {
    Days(u32),
    Months(u32),
    Years(i32),
}

const DAY_STEPS: [u32; 5] = [1, 2, 7, 14, 28];
const MONTH_STEPS: [u32; 3] = [1, 3, 6];
const YEAR_STEPS: [i32; 6] = [1, 2, 5, 10, 20, 50];

/// Picks the finest step that keeps the tick count within `max_ticks`.
pub fn choose_unit(first: NaiveDate, last: NaiveDate, max_ticks: usize) -> TickUnit {
    let max_ticks = max_ticks.max(2) as i64;
    let days = (last - first).num_days().max(0);

    for step in DAY_STEPS {
        if days / i64::from(step) + 1 <= max_ticks {
            return TickUnit::Days(step);
        }
    }

    let months = months_between(first, last);
    for step in MONTH_STEPS {
        if months / i64::from(step) + 1 <= max_ticks {
            return TickUnit::Months(step);
        }
    }

    let years = i64::from(last.year() - first.year());
    for step in YEAR_STEPS {
        if years / i64::from(step) + 1 <= max_ticks {
            return TickUnit::Years(step);
        }
    }
    TickUnit::Years(100)
}

fn months_between(first: NaiveDate, last: NaiveDate) -> i64 {
    i64::from(last.year() - first.year()) * 12 + i64::from(last.month0())
        - i64::from(first.month0())
}

/// Tick dates within `[first, last]` for the chosen unit.
pub fn tick_dates(first: NaiveDate, last: NaiveDate, unit: TickUnit) -> Vec<NaiveDate> {
    let mut ticks = Vec::new();
    match unit {
        TickUnit::Days(step) => {
            let mut date = first;
            while date <= last {
                ticks.push(date);
                date += Duration::days(i64::from(step));
            }
        }
        TickUnit::Months(step) => {
            let (mut year, mut month0) = (first.year(), first.month0());
            loop {
                if month0 % step == 0 {
                    if let Some(date) = NaiveDate::from_ymd_opt(year, month0 + 1, 1) {
                        if date > last {
                            break;
                        }
                        if date >= first {
                            ticks.push(date);
                        }
                    }
                }
                month0 += 1;
                if month0 == 12 {
                    month0 = 0;
                    year += 1;
                }
            }
        }
        TickUnit::Years(step) => {
            let mut year = first.year();
            while year <= last.year() {
                if year.rem_euclid(step) == 0 {
                    if let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) {
                        if date >= first {
                            ticks.push(date);
                        }
                    }
                }
                year += 1;
            }
        }
    }

    // Ranges shorter than one step still get a label.
    if ticks.is_empty() {
        ticks.push(first);
    }
    ticks
}

/// Short labels: day ticks show `Mar 04`, month ticks show the month name
/// (or the year in January), year ticks show the year.
pub fn concise_label(date: NaiveDate, unit: TickUnit) -> String {
    match unit {
        TickUnit::Days(_) => date.format("%b %d").to_string(),
        TickUnit::Months(_) if date.month() == 1 => date.format("%Y").to_string(),
        TickUnit::Months(_) => date.format("%b").to_string(),
        TickUnit::Years(_) => date.format("%Y").to_string(),
    }
}

/// Context the concise labels leave out, shown once beside the axis.
pub fn offset_label(first: NaiveDate, last: NaiveDate, unit: TickUnit) -> Option<String> {
    match unit {
        TickUnit::Days(_) | TickUnit::Months(_) if first.year() == last.year() => {
            Some(first.year().to_string())
        }
        TickUnit::Days(_) => Some(format!("{}–{}", first.year(), last.year())),
        TickUnit::Months(_) | TickUnit::Years(_) => None,
    }
}
