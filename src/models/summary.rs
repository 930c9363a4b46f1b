use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::activity::ActivityRecord;

pub const DEFAULT_SUMMARY_DAYS: u32 = 7;
pub const MAX_SUMMARY_DAYS: u32 = 366;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Trailing window of whole UTC calendar days ending today.
///
/// `start` is midnight of the first day and `end` is midnight after today, so every
/// record with `start <= end_time < end` lands on exactly one of the `days` dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryWindow {
    pub days: u32,
    pub first_day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SummaryWindow {
    pub fn ending_at(now: DateTime<Utc>, days: u32) -> Result<Self, AppError> {
        if days == 0 || days > MAX_SUMMARY_DAYS {
            return Err(AppError::BadRequest(format!(
                "Days must be between 1 and {}",
                MAX_SUMMARY_DAYS
            )));
        }

        let today = now.date_naive();
        let out_of_range = || AppError::BadRequest("Summary window is out of range".to_string());
        let first_day = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(out_of_range)?;
        let tomorrow = today.checked_add_days(Days::new(1)).ok_or_else(out_of_range)?;

        Ok(SummaryWindow {
            days,
            first_day,
            start: first_day.and_time(NaiveTime::MIN).and_utc(),
            end: tomorrow.and_time(NaiveTime::MIN).and_utc(),
        })
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.first_day.iter_days().take(self.days as usize)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TopActivity {
    pub title: String,
    pub total_seconds: i64,
    pub record_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActivitySummary {
    pub days: u32,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub daily_total_summary: BTreeMap<String, i64>,
    pub daily_stack_breakdown: BTreeMap<String, BTreeMap<String, i64>>,
    pub top_activities: Vec<TopActivity>,
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Buckets records by the UTC date of their end time and by title.
///
/// Records ending outside the window are ignored by all three views, which keeps
/// the daily totals and the top-activity totals summing to the same value.
/// Ties in `top_activities` keep the order in which titles were first seen.
pub fn summarize(records: &[ActivityRecord], window: &SummaryWindow) -> ActivitySummary {
    let mut daily_total_summary: BTreeMap<String, i64> = BTreeMap::new();
    let mut daily_stack_breakdown: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for date in window.dates() {
        daily_total_summary.insert(date_key(date), 0);
        daily_stack_breakdown.insert(date_key(date), BTreeMap::new());
    }

    let mut top_activities: Vec<TopActivity> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = date_key(record.end_time.date_naive());
        let Some(day_total) = daily_total_summary.get_mut(&key) else {
            continue;
        };
        *day_total += record.duration_seconds;

        if let Some(stack) = daily_stack_breakdown.get_mut(&key) {
            *stack.entry(record.title.clone()).or_insert(0) += record.duration_seconds;
        }

        let index = *positions.entry(record.title.as_str()).or_insert_with(|| {
            top_activities.push(TopActivity {
                title: record.title.clone(),
                total_seconds: 0,
                record_count: 0,
            });
            top_activities.len() - 1
        });
        top_activities[index].total_seconds += record.duration_seconds;
        top_activities[index].record_count += 1;
    }

    // sort_by is stable, so equal totals stay in encounter order.
    top_activities.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));

    ActivitySummary {
        days: window.days,
        window_start: window.start,
        window_end: window.end,
        daily_total_summary,
        daily_stack_breakdown,
        top_activities,
    }
}
